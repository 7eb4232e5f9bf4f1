//! The switch-windows scanner panel.
//!
//! Ties the scan list, selection gate, docking and focus watchdog to the
//! rendering collaborator. All methods run on the panel's event thread and
//! return only after the view state is consistent again, so the next render
//! read always sees a settled page. Outcomes for the outer application are
//! posted to a channel and never awaited.

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::commands::{Actuation, Control, Dispatch, KeyPress, PanelCommand};
use crate::dock::{DockAnchor, DockState, DockSync, PanelWindow};
use crate::focus_watchdog::{FocusTarget, FocusWatchdog};
use crate::list_ops::SortOrder;
use crate::panel_bus::{PanelBus, PanelEvent, PanelId, Subscription};
use crate::scan_list::ScanList;
use crate::selection::{self, Prompter, SelectionOutcome};
use crate::window_source::{WindowEntry, WindowHandle, WindowSource};

/// Placeholder shown in the first row when nothing matches.
pub const NO_WINDOWS_TEXT: &str = "------------- NO ACTIVE WINDOWS -------------";

const CLEAR_FILTER_PROMPT: &str = "Clear filter?";
const DEFAULT_TITLE_WIDTH: usize = 60;

/// Results raised to the outer application.
#[derive(Debug, Clone, PartialEq)]
pub enum PanelOutcome {
    /// Bring this window to the foreground
    ActivateWindow(WindowEntry),
    /// The panel is finished
    Done,
    /// Show the search scanner so the user can type a filter
    ShowSearchScanner,
}

/// Trait for the rendering collaborator.
///
/// The view owns the row widgets and the filter text box.
pub trait PanelView {
    /// Number of selectable row slots. Zero until layout is done.
    fn row_slot_count(&self) -> usize;

    /// Fill row `index`. `entry` is what a pick on this row selects.
    fn set_row_content(&mut self, index: usize, text: &str, entry: Option<&WindowEntry>);

    fn set_page_label(&mut self, text: &str);

    fn set_sort_label(&mut self, text: &str);

    fn set_status(&mut self, text: &str);

    fn filter_text(&self) -> String;

    fn clear_filter_text(&mut self);
}

#[derive(Debug, Clone)]
pub struct PanelOptions {
    pub id: PanelId,
    pub process_filter: Option<String>,
    pub anchor: DockAnchor,
    /// Row titles longer than this are cut with "..."
    pub title_width: usize,
}

impl Default for PanelOptions {
    fn default() -> Self {
        PanelOptions {
            id: PanelId(0),
            process_filter: None,
            anchor: DockAnchor::default(),
            title_width: DEFAULT_TITLE_WIDTH,
        }
    }
}

/// Host collaborators the panel drives.
pub struct PanelParts {
    pub view: Box<dyn PanelView>,
    pub prompter: Box<dyn Prompter>,
    pub window: Box<dyn PanelWindow>,
    pub focus: Box<dyn FocusTarget>,
}

pub struct SwitchWindowsPanel<S: WindowSource> {
    id: PanelId,
    list: ScanList<S>,
    view: Box<dyn PanelView>,
    prompter: Box<dyn Prompter>,
    dock: DockSync,
    focus: Option<Box<dyn FocusTarget>>,
    watchdog: Option<FocusWatchdog>,
    subscription: Option<Subscription>,
    outcomes: mpsc::UnboundedSender<PanelOutcome>,
    title_width: usize,
    closed: bool,
}

impl<S: WindowSource> SwitchWindowsPanel<S> {
    pub fn new(
        source: S,
        options: PanelOptions,
        parts: PanelParts,
        outcomes: mpsc::UnboundedSender<PanelOutcome>,
    ) -> Self {
        SwitchWindowsPanel {
            id: options.id,
            list: ScanList::new(source, options.process_filter),
            view: parts.view,
            prompter: parts.prompter,
            dock: DockSync::new(options.id, options.anchor, parts.window),
            focus: Some(parts.focus),
            watchdog: None,
            subscription: None,
            outcomes,
            title_width: options.title_width,
            closed: false,
        }
    }

    pub fn id(&self) -> PanelId {
        self.id
    }

    pub fn list(&self) -> &ScanList<S> {
        &self.list
    }

    pub fn dock_state(&self) -> DockState {
        self.dock.state()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn has_watchdog(&self) -> bool {
        self.watchdog.as_ref().is_some_and(FocusWatchdog::is_active)
    }

    /// Subscribe to panel shown/closed broadcasts.
    pub fn attach(&mut self, bus: &PanelBus) {
        self.subscription = Some(bus.subscribe());
    }

    /// Wait for the next panel broadcast. Pending forever when detached.
    pub async fn next_panel_event(&mut self) -> Option<PanelEvent> {
        match self.subscription.as_mut() {
            Some(sub) => sub.recv().await,
            None => std::future::pending().await,
        }
    }

    /// Handle every broadcast that is already queued.
    pub fn drain_panel_events(&mut self) -> usize {
        let mut handled = 0;
        while let Some(event) = self.subscription.as_mut().and_then(Subscription::try_recv) {
            self.on_panel_event(event);
            handled += 1;
        }
        handled
    }

    /// Panel is being shown: start the watchdog, fetch windows, render,
    /// and sit next to whatever panel is current.
    pub fn load(&mut self, current_panel: Option<PanelId>) {
        if self.closed {
            return;
        }

        if self.watchdog.is_none()
            && let Some(target) = self.focus.take()
        {
            self.watchdog = Some(FocusWatchdog::new(target));
        }

        self.list.apply_filter(&self.view.filter_text());
        self.reload();
        self.dock.place_next_to(current_panel);
        info!("Panel {:?} loaded with {} windows", self.id, self.list.filtered_entries().len());
    }

    /// Re-fetch the window snapshot and render page one.
    pub fn reload(&mut self) {
        if let Err(e) = self.list.load() {
            warn!("Keeping previous window list: {:#}", e);
        }
        self.refresh();
    }

    /// The filter text box changed.
    pub fn on_filter_changed(&mut self) {
        let text = self.view.filter_text();
        self.list.apply_filter(&text);
        self.refresh();
    }

    /// Dispatch one actuation.
    pub fn actuate(&mut self, actuation: Actuation) -> Dispatch {
        match actuation {
            Actuation::Row(entry) => {
                self.select_window(&entry);
                Dispatch::Handled
            }
            Actuation::Command(value) => match value.parse::<PanelCommand>() {
                Ok(command) => {
                    self.run_command(command);
                    Dispatch::Handled
                }
                Err(e) => {
                    debug!("{}", e);
                    Dispatch::NotHandled
                }
            },
        }
    }

    /// Pick whatever entry is bound to row `slot` on the current page.
    pub fn pick_row(&mut self, slot: usize) -> Dispatch {
        match self.list.entry_at_slot(slot).cloned() {
            Some(entry) => self.actuate(Actuation::Row(entry)),
            None => {
                debug!("Row {} has no window bound", slot);
                Dispatch::NotHandled
            }
        }
    }

    pub fn run_command(&mut self, command: PanelCommand) {
        debug!("Running {:?}", command);
        match command {
            PanelCommand::Quit => self.post(PanelOutcome::Done),
            PanelCommand::ToggleSort => {
                if let Err(e) = self.list.toggle_sort() {
                    warn!("Reload after sort toggle failed: {:#}", e);
                }
                self.refresh();
            }
            PanelCommand::NextPage => {
                if self.list.next_page() {
                    self.refresh();
                }
            }
            PanelCommand::PreviousPage => {
                if self.list.previous_page() {
                    self.refresh();
                }
            }
            PanelCommand::OpenSearch => self.post(PanelOutcome::ShowSearchScanner),
            PanelCommand::ClearFilter => self.clear_filter(),
        }
    }

    /// Key given by name, such as `escape` or `page-down`. Names that do
    /// not map to a key are not handled.
    pub fn on_key_name(&mut self, name: &str) -> Dispatch {
        match KeyPress::from_name(name) {
            Some(key) => self.on_key(key),
            None => {
                debug!("No key named {:?}", name);
                Dispatch::NotHandled
            }
        }
    }

    /// Keyboard actuator input.
    pub fn on_key(&mut self, key: KeyPress) -> Dispatch {
        match key {
            KeyPress::Escape => self.run_command(PanelCommand::Quit),
            KeyPress::PageUp => self.run_command(PanelCommand::PreviousPage),
            KeyPress::PageDown => self.run_command(PanelCommand::NextPage),
            KeyPress::Char(_) => return Dispatch::NotHandled,
        }
        Dispatch::Handled
    }

    /// Clear the filter text if the user confirms. Declining is a no-op.
    pub fn clear_filter(&mut self) {
        if self.view.filter_text().is_empty() {
            return;
        }

        if self.prompter.confirm(CLEAR_FILTER_PROMPT) {
            self.view.clear_filter_text();
            self.on_filter_changed();
        }
    }

    pub fn select_window(&mut self, entry: &WindowEntry) -> SelectionOutcome {
        let outcome = selection::select(self.list.source_mut(), self.prompter.as_mut(), entry);
        if let SelectionOutcome::Activated(entry) = &outcome {
            info!("Activating window {} ({:?})", entry.handle, entry.title);
            self.post(PanelOutcome::ActivateWindow(entry.clone()));
        }
        outcome
    }

    pub fn is_enabled(&self, control: Control) -> bool {
        match control {
            Control::PreviousPage => self.list.can_previous_page(),
            Control::NextPage => self.list.can_next_page(),
            Control::Back | Control::DeletePreviousWord | Control::ClearFilter => {
                !self.view.filter_text().is_empty()
            }
            Control::Sort | Control::Search => !self.list.is_empty(),
            Control::PrevChar | Control::NextChar => true,
        }
    }

    /// Enablement by control name. None if the control is not ours.
    pub fn is_enabled_by_name(&self, name: &str) -> Option<bool> {
        name.parse::<Control>().ok().map(|c| self.is_enabled(c))
    }

    pub fn on_panel_event(&mut self, event: PanelEvent) {
        if !self.closed {
            self.dock.handle(event);
        }
    }

    pub fn on_position_changed(&mut self) {
        if !self.closed {
            self.dock.on_position_changed();
        }
    }

    pub fn on_focus_changed(&mut self, focused: WindowHandle) {
        if let Some(watchdog) = self.watchdog.as_mut() {
            watchdog.on_focus_changed(focused);
        }
    }

    /// Tear down: dispose the watchdog, undock and leave the bus.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }

        if let Some(mut watchdog) = self.watchdog.take() {
            watchdog.dispose();
        }
        self.dock.teardown();
        self.subscription = None;
        self.closed = true;
        info!("Panel {:?} closed", self.id);
    }

    /// Repaint rows and labels from the current page.
    fn refresh(&mut self) {
        let slots = self.view.row_slot_count();
        self.list.set_page_size(slots);
        if slots == 0 || !self.list.is_ready() {
            debug!("Row slots not laid out yet, deferring render");
            return;
        }

        for index in 0..slots {
            self.view.set_row_content(index, "", None);
        }
        self.update_labels();

        if self.list.is_empty() {
            self.view.set_row_content(0, NO_WINDOWS_TEXT, None);
            return;
        }

        for (index, entry) in self.list.current_page_entries().iter().take(slots).enumerate() {
            let text = truncate_title(&entry.title, self.title_width);
            self.view.set_row_content(index, &text, Some(entry));
        }
    }

    fn update_labels(&mut self) {
        if self.list.is_empty() {
            self.view.set_page_label("");
            self.view.set_sort_label("A-Z");
            self.view.set_status("");
            return;
        }

        let page = format!("Page {} of {}", self.list.page_index() + 1, self.list.page_count());
        self.view.set_page_label(&page);

        let (sort, status) = match self.list.sort_order() {
            SortOrder::Ascending => ("A-Z", "Sort Order:  ALPHABETICAL"),
            SortOrder::Descending => ("Z-A", "Sort Order:  REVERSE ALPHABETICAL"),
        };
        self.view.set_sort_label(sort);
        self.view.set_status(status);
    }

    fn post(&self, outcome: PanelOutcome) {
        debug!("Posting {:?}", outcome);
        if let Err(e) = self.outcomes.send(outcome) {
            warn!("Dropped panel outcome, nobody is listening: {:?}", e.0);
        }
    }
}

fn truncate_title(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        // Keep at least one character so narrow widths stay readable
        let kept: String = s.chars().take(max_len.saturating_sub(3).max(1)).collect();
        format!("{}...", kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dock::fake::{RecordingWindow, WindowLog};
    use crate::dock::Rect;
    use crate::focus_watchdog::fake::CountingTarget;
    use crate::selection::fake::ScriptedPrompter;
    use crate::window_source::fake::FakeSource;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    const OWN: PanelId = PanelId(1);
    const ALPHABET: PanelId = PanelId(2);

    #[derive(Debug, Default)]
    struct ViewLog {
        slots: usize,
        rows: Vec<(String, Option<WindowHandle>)>,
        page_label: String,
        sort_label: String,
        status: String,
        filter: String,
    }

    struct RecordingView(Rc<RefCell<ViewLog>>);

    impl PanelView for RecordingView {
        fn row_slot_count(&self) -> usize {
            self.0.borrow().slots
        }

        fn set_row_content(&mut self, index: usize, text: &str, entry: Option<&WindowEntry>) {
            let mut log = self.0.borrow_mut();
            if log.rows.len() <= index {
                log.rows.resize(index + 1, (String::new(), None));
            }
            log.rows[index] = (text.to_string(), entry.map(|e| e.handle));
        }

        fn set_page_label(&mut self, text: &str) {
            self.0.borrow_mut().page_label = text.to_string();
        }

        fn set_sort_label(&mut self, text: &str) {
            self.0.borrow_mut().sort_label = text.to_string();
        }

        fn set_status(&mut self, text: &str) {
            self.0.borrow_mut().status = text.to_string();
        }

        fn filter_text(&self) -> String {
            self.0.borrow().filter.clone()
        }

        fn clear_filter_text(&mut self) {
            self.0.borrow_mut().filter.clear();
        }
    }

    /// Prompter sharing its script with the test.
    struct SharedPrompter(Rc<RefCell<ScriptedPrompter>>);

    impl Prompter for SharedPrompter {
        fn confirm(&mut self, prompt: &str) -> bool {
            self.0.borrow_mut().confirm(prompt)
        }

        fn notify(&mut self, message: &str) {
            self.0.borrow_mut().notify(message)
        }
    }

    struct Harness {
        panel: SwitchWindowsPanel<FakeSource>,
        view: Rc<RefCell<ViewLog>>,
        prompter: Rc<RefCell<ScriptedPrompter>>,
        window: Rc<RefCell<WindowLog>>,
        releases: Rc<Cell<usize>>,
        outcomes: mpsc::UnboundedReceiver<PanelOutcome>,
    }

    impl Harness {
        fn row_titles(&self) -> Vec<String> {
            self.view
                .borrow()
                .rows
                .iter()
                .map(|(t, _)| t.clone())
                .filter(|t| !t.is_empty())
                .collect()
        }

        fn answer(&self, answers: &[bool]) {
            self.prompter.borrow_mut().answers.extend(answers.iter().copied());
        }
    }

    fn make_panel(source: FakeSource, slots: usize) -> Harness {
        let view = Rc::new(RefCell::new(ViewLog {
            slots,
            ..Default::default()
        }));
        let prompter = Rc::new(RefCell::new(ScriptedPrompter::default()));
        let window_log = Rc::new(RefCell::new(WindowLog::default()));
        let mut window = RecordingWindow::new(window_log.clone());
        window.bounds.insert(ALPHABET, Rect {
            x: 10,
            y: 10,
            width: 200,
            height: 100,
        });
        let focus = CountingTarget::new(None);
        let releases = focus.releases.clone();
        let (tx, rx) = mpsc::unbounded_channel();

        let panel = SwitchWindowsPanel::new(
            source,
            PanelOptions {
                id: OWN,
                title_width: 12,
                ..Default::default()
            },
            PanelParts {
                view: Box::new(RecordingView(view.clone())),
                prompter: Box::new(SharedPrompter(prompter.clone())),
                window: Box::new(window),
                focus: Box::new(focus),
            },
            tx,
        );

        Harness {
            panel,
            view,
            prompter,
            window: window_log,
            releases,
            outcomes: rx,
        }
    }

    fn loaded_panel(titles: &[&str], slots: usize) -> Harness {
        let mut h = make_panel(FakeSource::with_titles(titles), slots);
        h.panel.load(None);
        h
    }

    // ==================== load and render tests ====================

    #[test]
    fn test_load_renders_first_page() {
        let h = loaded_panel(&["Zeta", "alpha", "Beta"], 2);

        assert_eq!(h.row_titles(), vec!["alpha", "Beta"]);
        let view = h.view.borrow();
        assert_eq!(view.page_label, "Page 1 of 2");
        assert_eq!(view.sort_label, "A-Z");
        assert_eq!(view.status, "Sort Order:  ALPHABETICAL");
        assert_eq!(view.rows[0].1, Some(WindowHandle(2)));
    }

    #[test]
    fn test_load_starts_watchdog_once() {
        let mut h = loaded_panel(&["a"], 2);
        assert!(h.panel.has_watchdog());
        h.panel.load(None);
        assert!(h.panel.has_watchdog());
        assert_eq!(h.releases.get(), 0);
    }

    #[test]
    fn test_load_without_slots_defers_render() {
        let mut h = loaded_panel(&["a", "b"], 0);
        assert!(h.view.borrow().rows.is_empty());
        assert_eq!(h.panel.list().page_count(), 0);

        // Layout finishes later; the next reload picks the slot count up
        h.view.borrow_mut().slots = 1;
        h.panel.reload();
        assert_eq!(h.row_titles(), vec!["a"]);
        assert_eq!(h.panel.list().page_count(), 2);
    }

    #[test]
    fn test_late_layout_renders_on_filter_change() {
        let mut h = loaded_panel(&["ab", "ac", "b"], 0);
        assert!(h.view.borrow().rows.is_empty());

        h.view.borrow_mut().slots = 1;
        h.view.borrow_mut().filter = "a".to_string();
        h.panel.on_filter_changed();

        assert_eq!(h.row_titles(), vec!["ab"]);
        assert_eq!(h.panel.list().page_count(), 2);

        // The page size stays fixed once known
        h.view.borrow_mut().slots = 3;
        h.panel.run_command(PanelCommand::NextPage);
        assert_eq!(h.panel.list().page_size(), 1);
        assert_eq!(h.row_titles(), vec!["ac"]);
    }

    #[test]
    fn test_load_places_next_to_current_panel() {
        let mut h = make_panel(FakeSource::with_titles(&["a"]), 2);
        h.panel.load(Some(ALPHABET));

        assert_eq!(h.window.borrow().moves.len(), 1);
        assert_eq!(h.panel.dock_state(), DockState::Undocked);
    }

    #[test]
    fn test_long_titles_truncated() {
        let h = loaded_panel(&["A very long window title"], 2);
        assert_eq!(h.row_titles(), vec!["A very lo..."]);
    }

    #[test]
    fn test_truncate_title_multibyte() {
        assert_eq!(truncate_title("日本語のウィンドウ", 5), "日本...");
        assert_eq!(truncate_title("short", 5), "short");
    }

    #[test]
    fn test_truncate_title_narrow_width() {
        assert_eq!(truncate_title("Terminal", 2), "T...");
        assert_eq!(truncate_title("Terminal", 0), "T...");
        assert_eq!(truncate_title("", 0), "");
    }

    #[test]
    fn test_filter_with_no_match_shows_placeholder() {
        let mut h = loaded_panel(&["Calculator", "Notepad", "Paint"], 3);
        h.view.borrow_mut().filter = "a".to_string();
        h.panel.on_filter_changed();

        assert_eq!(h.row_titles(), vec![NO_WINDOWS_TEXT]);
        assert_eq!(h.view.borrow().rows[0].1, None);
        assert_eq!(h.view.borrow().page_label, "");
        assert_eq!(h.view.borrow().status, "");
        assert!(!h.panel.is_enabled(Control::NextPage));
        assert!(!h.panel.is_enabled(Control::PreviousPage));
        assert!(!h.panel.is_enabled(Control::Sort));
        assert!(!h.panel.is_enabled(Control::Search));
        assert!(h.panel.is_enabled(Control::ClearFilter));
    }

    #[test]
    fn test_refresh_clears_stale_rows() {
        let mut h = loaded_panel(&["a", "b", "c"], 2);
        h.panel.run_command(PanelCommand::NextPage);

        let view = h.view.borrow();
        assert_eq!(view.rows[0], ("c".to_string(), Some(WindowHandle(3))));
        assert_eq!(view.rows[1], (String::new(), None));
        assert_eq!(view.page_label, "Page 2 of 2");
    }

    // ==================== command tests ====================

    #[test]
    fn test_command_strings_dispatch() {
        let mut h = loaded_panel(&["a", "b", "c"], 2);

        let d = h.panel.actuate(Actuation::Command("@WindowListNextPage".to_string()));
        assert_eq!(d, Dispatch::Handled);
        assert_eq!(h.panel.list().page_index(), 1);

        let d = h.panel.actuate(Actuation::Command("@WindowListPrevPage".to_string()));
        assert_eq!(d, Dispatch::Handled);
        assert_eq!(h.panel.list().page_index(), 0);
    }

    #[test]
    fn test_unknown_command_not_handled() {
        let mut h = loaded_panel(&["a"], 2);
        let d = h.panel.actuate(Actuation::Command("@SpeakNow".to_string()));
        assert_eq!(d, Dispatch::NotHandled);
        assert!(h.outcomes.try_recv().is_err());
    }

    #[test]
    fn test_quit_and_search_post_outcomes() {
        let mut h = loaded_panel(&["a"], 2);
        h.panel.run_command(PanelCommand::Quit);
        h.panel.run_command(PanelCommand::OpenSearch);

        assert_eq!(h.outcomes.try_recv().unwrap(), PanelOutcome::Done);
        assert_eq!(h.outcomes.try_recv().unwrap(), PanelOutcome::ShowSearchScanner);
    }

    #[test]
    fn test_outcome_with_dropped_receiver_is_not_fatal() {
        let mut h = loaded_panel(&["a"], 2);
        let Harness { panel, outcomes, .. } = &mut h;
        outcomes.close();
        panel.run_command(PanelCommand::Quit);
        assert!(!panel.is_closed());
    }

    #[test]
    fn test_toggle_sort_rerenders_descending() {
        let mut h = loaded_panel(&["Zeta", "alpha", "Beta"], 2);
        h.panel.run_command(PanelCommand::NextPage);
        h.panel.run_command(PanelCommand::ToggleSort);

        assert_eq!(h.panel.list().page_index(), 0);
        assert_eq!(h.row_titles(), vec!["Zeta", "Beta"]);
        assert_eq!(h.view.borrow().sort_label, "Z-A");
        assert_eq!(h.view.borrow().status, "Sort Order:  REVERSE ALPHABETICAL");
    }

    #[test]
    fn test_failed_sort_reload_labels_match_rows() {
        let mut h = loaded_panel(&["Zeta", "alpha", "Beta"], 2);
        h.panel.list.source_mut().fail_enumerate = true;
        h.panel.run_command(PanelCommand::ToggleSort);

        assert_eq!(h.row_titles(), vec!["Zeta", "Beta"]);
        assert_eq!(h.view.borrow().sort_label, "Z-A");
        assert_eq!(h.view.borrow().status, "Sort Order:  REVERSE ALPHABETICAL");
    }

    #[test]
    fn test_key_names() {
        let mut h = loaded_panel(&["a", "b"], 1);
        assert_eq!(h.panel.on_key_name("page-down"), Dispatch::Handled);
        assert_eq!(h.panel.list().page_index(), 1);
        assert_eq!(h.panel.on_key_name("F13"), Dispatch::NotHandled);
        assert_eq!(h.panel.on_key_name("q"), Dispatch::NotHandled);
        assert!(h.outcomes.try_recv().is_err());

        assert_eq!(h.panel.on_key_name("escape"), Dispatch::Handled);
        assert_eq!(h.outcomes.try_recv().unwrap(), PanelOutcome::Done);
    }

    #[test]
    fn test_keys() {
        let mut h = loaded_panel(&["a", "b", "c"], 1);
        assert_eq!(h.panel.on_key(KeyPress::PageDown), Dispatch::Handled);
        assert_eq!(h.panel.list().page_index(), 1);
        assert_eq!(h.panel.on_key(KeyPress::PageUp), Dispatch::Handled);
        assert_eq!(h.panel.list().page_index(), 0);
        assert_eq!(h.panel.on_key(KeyPress::Char('x')), Dispatch::NotHandled);

        assert_eq!(h.panel.on_key(KeyPress::from_char('\u{1b}')), Dispatch::Handled);
        assert_eq!(h.outcomes.try_recv().unwrap(), PanelOutcome::Done);
    }

    // ==================== clear filter tests ====================

    #[test]
    fn test_clear_filter_confirmed() {
        let mut h = loaded_panel(&["Calculator", "Notepad"], 2);
        h.view.borrow_mut().filter = "n".to_string();
        h.panel.on_filter_changed();
        assert_eq!(h.row_titles(), vec!["Notepad"]);

        h.answer(&[true]);
        h.panel.run_command(PanelCommand::ClearFilter);

        assert_eq!(h.prompter.borrow().prompts, vec![CLEAR_FILTER_PROMPT]);
        assert_eq!(h.view.borrow().filter, "");
        assert_eq!(h.row_titles(), vec!["Calculator", "Notepad"]);
        assert!(!h.panel.is_enabled(Control::ClearFilter));
    }

    #[test]
    fn test_clear_filter_declined_is_noop() {
        let mut h = loaded_panel(&["Calculator", "Notepad"], 2);
        h.view.borrow_mut().filter = "n".to_string();
        h.panel.on_filter_changed();

        h.answer(&[false]);
        h.panel.run_command(PanelCommand::ClearFilter);

        assert_eq!(h.view.borrow().filter, "n");
        assert_eq!(h.row_titles(), vec!["Notepad"]);
    }

    #[test]
    fn test_clear_empty_filter_does_not_prompt() {
        let mut h = loaded_panel(&["a"], 2);
        h.panel.clear_filter();
        assert!(h.prompter.borrow().prompts.is_empty());
    }

    // ==================== selection tests ====================

    #[test]
    fn test_pick_row_activates_after_confirm() {
        let mut h = loaded_panel(&["Mail", "Editor"], 2);
        h.answer(&[true]);

        assert_eq!(h.panel.pick_row(0), Dispatch::Handled);
        match h.outcomes.try_recv().unwrap() {
            PanelOutcome::ActivateWindow(entry) => assert_eq!(entry.title, "Editor"),
            other => panic!("unexpected outcome {:?}", other),
        }
        assert_eq!(h.prompter.borrow().prompts, vec!["Switch to Editor?"]);
    }

    #[test]
    fn test_pick_empty_row_not_handled() {
        let mut h = loaded_panel(&["Mail"], 3);
        assert_eq!(h.panel.pick_row(2), Dispatch::NotHandled);
    }

    #[test]
    fn test_pick_stale_row_reports_gone() {
        let mut h = loaded_panel(&["Mail", "Editor"], 2);
        h.answer(&[true]);

        // Editor closes after the snapshot was taken
        let editor = h.panel.list().entry_at_slot(0).cloned().unwrap();
        h.panel.list.source_mut().close(editor.handle);
        let outcome = h.panel.select_window(&editor);

        assert_eq!(outcome, SelectionOutcome::NotFound);
        assert!(h.outcomes.try_recv().is_err());
        assert_eq!(h.prompter.borrow().notices, vec![selection::WINDOW_GONE_MESSAGE]);
    }

    #[test]
    fn test_pick_declined_posts_nothing() {
        let mut h = loaded_panel(&["Mail"], 2);
        h.answer(&[false]);
        h.panel.pick_row(0);
        assert!(h.outcomes.try_recv().is_err());
    }

    // ==================== enablement tests ====================

    #[test]
    fn test_enablement_by_name() {
        let mut h = loaded_panel(&["a", "b", "c"], 2);
        assert_eq!(h.panel.is_enabled_by_name("PreviousPage"), Some(false));
        assert_eq!(h.panel.is_enabled_by_name("NextPage"), Some(true));
        assert_eq!(h.panel.is_enabled_by_name("Sort"), Some(true));
        assert_eq!(h.panel.is_enabled_by_name("Back"), Some(false));
        assert_eq!(h.panel.is_enabled_by_name("NextChar"), Some(true));
        assert_eq!(h.panel.is_enabled_by_name("Talk"), None);

        h.panel.run_command(PanelCommand::NextPage);
        assert_eq!(h.panel.is_enabled_by_name("PreviousPage"), Some(true));
        assert_eq!(h.panel.is_enabled_by_name("NextPage"), Some(false));
    }

    // ==================== docking and lifecycle tests ====================

    #[test]
    fn test_bus_events_dock_panel() {
        let bus = PanelBus::new();
        let mut h = loaded_panel(&["a"], 2);
        h.panel.attach(&bus);

        bus.publish(PanelEvent::Shown(ALPHABET));
        assert_eq!(h.panel.drain_panel_events(), 1);
        assert_eq!(h.panel.dock_state(), DockState::Docked(ALPHABET));

        h.panel.on_position_changed();
        assert_eq!(h.window.borrow().moves.len(), 2);

        bus.publish(PanelEvent::Closed(ALPHABET));
        h.panel.drain_panel_events();
        assert_eq!(h.panel.dock_state(), DockState::Undocked);

        h.panel.on_position_changed();
        assert_eq!(h.window.borrow().moves.len(), 2);
    }

    #[tokio::test]
    async fn test_next_panel_event() {
        let bus = PanelBus::new();
        let mut h = loaded_panel(&["a"], 2);
        h.panel.attach(&bus);

        bus.publish(PanelEvent::Shown(ALPHABET));
        assert_eq!(h.panel.next_panel_event().await, Some(PanelEvent::Shown(ALPHABET)));
    }

    #[test]
    fn test_close_tears_down_once() {
        let bus = PanelBus::new();
        let mut h = loaded_panel(&["a"], 2);
        h.panel.attach(&bus);
        h.panel.on_panel_event(PanelEvent::Shown(ALPHABET));

        h.panel.close();
        h.panel.close();

        assert!(h.panel.is_closed());
        assert!(!h.panel.has_watchdog());
        assert_eq!(h.releases.get(), 1);
        assert_eq!(h.panel.dock_state(), DockState::Undocked);
        assert_eq!(bus.subscriber_count(), 0);

        // Broadcasts after close are ignored
        h.panel.on_panel_event(PanelEvent::Shown(ALPHABET));
        assert_eq!(h.panel.dock_state(), DockState::Undocked);
    }
}
