//! Text rendering and stdin dialogs for the reference host.
//!
//! The panel renders into a shared row buffer; the daemon prints it to stderr
//! after every actuation, the same way a widget layer would repaint.

use std::cell::RefCell;
use std::fmt::Write as _;
use std::io::{self, BufRead, Write};
use std::rc::Rc;
use tracing::warn;

use crate::panel::PanelView;
use crate::selection::Prompter;
use crate::window_source::{WindowEntry, WindowHandle};

#[derive(Debug, Default)]
struct Screen {
    slots: usize,
    rows: Vec<(String, Option<WindowHandle>)>,
    page_label: String,
    sort_label: String,
    status: String,
    filter: String,
}

/// Row buffer shared between the panel and the daemon.
#[derive(Debug, Clone, Default)]
pub struct TerminalView {
    screen: Rc<RefCell<Screen>>,
}

impl TerminalView {
    pub fn new(slots: usize) -> Self {
        let screen = Screen {
            slots,
            rows: vec![(String::new(), None); slots],
            ..Default::default()
        };
        TerminalView {
            screen: Rc::new(RefCell::new(screen)),
        }
    }

    /// Replace the filter text, as if the user typed it.
    pub fn set_filter_text(&self, text: &str) {
        self.screen.borrow_mut().filter = text.to_string();
    }

    /// Handle bound to row `slot`, if any.
    pub fn bound_handle(&self, slot: usize) -> Option<WindowHandle> {
        self.screen.borrow().rows.get(slot).and_then(|(_, h)| *h)
    }

    pub fn render(&self) -> String {
        let screen = self.screen.borrow();
        let mut out = String::new();

        let _ = writeln!(out, "\n=== Switch Windows [{}] ===", screen.sort_label);
        if !screen.filter.is_empty() {
            let _ = writeln!(out, "Filter: {}", screen.filter);
        }
        for (i, (text, handle)) in screen.rows.iter().enumerate() {
            match handle {
                Some(h) => {
                    let _ = writeln!(out, "{:>3}  {} [{}]", i, text, h);
                }
                None if !text.is_empty() => {
                    let _ = writeln!(out, "     {}", text);
                }
                None => {}
            }
        }
        if !screen.page_label.is_empty() {
            let _ = writeln!(out, "{}", screen.page_label);
        }
        if !screen.status.is_empty() {
            let _ = writeln!(out, "{}", screen.status);
        }
        out.push_str("===========================\n");
        out
    }
}

impl PanelView for TerminalView {
    fn row_slot_count(&self) -> usize {
        self.screen.borrow().slots
    }

    fn set_row_content(&mut self, index: usize, text: &str, entry: Option<&WindowEntry>) {
        let mut screen = self.screen.borrow_mut();
        if let Some(row) = screen.rows.get_mut(index) {
            *row = (text.to_string(), entry.map(|e| e.handle));
        }
    }

    fn set_page_label(&mut self, text: &str) {
        self.screen.borrow_mut().page_label = text.to_string();
    }

    fn set_sort_label(&mut self, text: &str) {
        self.screen.borrow_mut().sort_label = text.to_string();
    }

    fn set_status(&mut self, text: &str) {
        self.screen.borrow_mut().status = text.to_string();
    }

    fn filter_text(&self) -> String {
        self.screen.borrow().filter.clone()
    }

    fn clear_filter_text(&mut self) {
        self.screen.borrow_mut().filter.clear();
    }
}

/// Yes/no prompts on stdin. With `assume_yes` every prompt is accepted.
pub struct StdinPrompter {
    assume_yes: bool,
}

impl StdinPrompter {
    pub fn new(assume_yes: bool) -> Self {
        StdinPrompter { assume_yes }
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

impl Prompter for StdinPrompter {
    fn confirm(&mut self, prompt: &str) -> bool {
        if self.assume_yes {
            eprintln!("{} [auto-confirmed]", prompt);
            return true;
        }

        eprint!("{} [y/N] ", prompt);
        let _ = io::stderr().flush();

        let mut line = String::new();
        match io::stdin().lock().read_line(&mut line) {
            Ok(_) => is_yes(&line),
            Err(e) => {
                warn!("Failed to read confirmation: {}", e);
                false
            }
        }
    }

    fn notify(&mut self, message: &str) {
        eprintln!("*** {} ***", message);
    }
}
