use crate::config::Config;
use crate::ipc::{IpcCommand, IpcResponse};
use crate::socket_server::IpcRequest;
use anyhow::Result;
use futures_lite::stream::StreamExt;
use scan_switcher::sway_source::{
    RealSwayClient, SwayClient, SwayFocus, SwayPanelWindow, SwayWindowSource,
};
use scan_switcher::terminal_view::{StdinPrompter, TerminalView};
use scan_switcher::{
    Actuation, Dispatch, PanelBus, PanelCommand, PanelEvent, PanelId, PanelOptions, PanelOutcome,
    PanelParts, SwitchWindowsPanel, WindowHandle,
};
use swayipc_async::{Connection, Event, EventType, WindowChange};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

// Never a Sway container ID, so no broadcast is mistaken for our own
const DETACHED_PANEL_ID: PanelId = PanelId(u64::MAX);

/// Panel identity on the bus: the hosting container, if there is one
fn own_panel_id(panel_window: Option<i64>) -> PanelId {
    panel_window
        .and_then(|c| u64::try_from(c).ok())
        .map(PanelId)
        .unwrap_or(DETACHED_PANEL_ID)
}

#[derive(Debug, Clone)]
enum WindowEvent {
    Focus(i64), // Window ID that received focus
}

/// Whether the event loop keeps running after a message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Stop,
}

pub struct Daemon {
    panel: SwitchWindowsPanel<SwayWindowSource>,
    view: TerminalView,
    bus: PanelBus,
    activator: RealSwayClient,
}

impl Daemon {
    pub fn new(config: &Config, outcomes: mpsc::UnboundedSender<PanelOutcome>) -> Result<Self> {
        let view = TerminalView::new(config.rows);
        let id = own_panel_id(config.panel_window);

        let options = PanelOptions {
            id,
            process_filter: config.process.clone(),
            anchor: config.anchor,
            title_width: config.title_width,
        };
        let parts = PanelParts {
            view: Box::new(view.clone()),
            prompter: Box::new(StdinPrompter::new(config.assume_yes)),
            window: Box::new(SwayPanelWindow::new(RealSwayClient::new()?, config.panel_window)),
            focus: Box::new(SwayFocus::new(RealSwayClient::new()?, config.panel_window)),
        };

        let panel = SwitchWindowsPanel::new(SwayWindowSource::new()?, options, parts, outcomes);

        Ok(Daemon {
            panel,
            view,
            bus: PanelBus::new(),
            activator: RealSwayClient::new()?,
        })
    }

    /// Main event loop
    pub async fn run(
        mut self,
        mut ipc_rx: mpsc::UnboundedReceiver<IpcRequest>,
        mut outcome_rx: mpsc::UnboundedReceiver<PanelOutcome>,
    ) -> Result<()> {
        info!("Starting daemon event loop");

        // Create channel for window events
        let (window_tx, mut window_rx) = mpsc::unbounded_channel();

        let sway_events = tokio::spawn(async move {
            if let Err(e) = Self::monitor_sway_events(window_tx).await {
                error!("Sway event monitoring error: {}", e);
            }
        });

        self.panel.attach(&self.bus);
        self.panel.load(None);
        self.print_panel();

        loop {
            tokio::select! {
                Some((command, reply)) = ipc_rx.recv() => {
                    let (response, flow) = self.handle_ipc_command(command);
                    if reply.send(response).is_err() {
                        debug!("IPC client went away before the response");
                    }
                    if flow == Flow::Stop {
                        break;
                    }
                }
                Some(window_event) = window_rx.recv() => {
                    self.handle_window_event(window_event);
                }
                Some(panel_event) = self.panel.next_panel_event() => {
                    self.panel.on_panel_event(panel_event);
                }
                Some(outcome) = outcome_rx.recv() => {
                    if self.handle_outcome(outcome) == Flow::Stop {
                        break;
                    }
                }
                else => {
                    info!("All channels closed, shutting down");
                    break;
                }
            }
        }

        self.panel.close();
        sway_events.abort();
        Ok(())
    }

    fn handle_ipc_command(&mut self, command: IpcCommand) -> (IpcResponse, Flow) {
        debug!("IPC command: {:?}", command);

        let dispatch = match command {
            IpcCommand::Sort => self.actuate(PanelCommand::ToggleSort),
            IpcCommand::NextPage => self.actuate(PanelCommand::NextPage),
            IpcCommand::PrevPage => self.actuate(PanelCommand::PreviousPage),
            IpcCommand::Search => self.actuate(PanelCommand::OpenSearch),
            IpcCommand::ClearFilter => self.actuate(PanelCommand::ClearFilter),
            IpcCommand::Quit => self.actuate(PanelCommand::Quit),
            IpcCommand::Pick(slot) => self.panel.pick_row(slot),
            IpcCommand::Filter(text) => {
                self.view.set_filter_text(&text);
                self.panel.on_filter_changed();
                Dispatch::Handled
            }
            IpcCommand::Reload => {
                self.panel.reload();
                Dispatch::Handled
            }
            IpcCommand::PanelShown(id) => {
                self.bus.publish(PanelEvent::Shown(PanelId(id)));
                Dispatch::Handled
            }
            IpcCommand::PanelClosed(id) => {
                self.bus.publish(PanelEvent::Closed(PanelId(id)));
                Dispatch::Handled
            }
            IpcCommand::Moved => {
                self.panel.on_position_changed();
                Dispatch::Handled
            }
            IpcCommand::Key(name) => self.panel.on_key_name(&name),
            IpcCommand::Status => return (self.status(), Flow::Continue),
            IpcCommand::Shutdown => {
                info!("Shutdown requested");
                return (IpcResponse::Ok, Flow::Stop);
            }
        };

        self.print_panel();
        let response = match dispatch {
            Dispatch::Handled => IpcResponse::Ok,
            Dispatch::NotHandled => IpcResponse::NotHandled,
        };
        (response, Flow::Continue)
    }

    /// Route a button command through the panel's widget vocabulary
    fn actuate(&mut self, command: PanelCommand) -> Dispatch {
        self.panel.actuate(Actuation::Command(command.to_string()))
    }

    fn handle_window_event(&mut self, event: WindowEvent) {
        match event {
            WindowEvent::Focus(window_id) => {
                self.panel.on_focus_changed(WindowHandle(window_id));
            }
        }
    }

    fn handle_outcome(&mut self, outcome: PanelOutcome) -> Flow {
        match outcome {
            PanelOutcome::ActivateWindow(entry) => {
                info!("Switching to {} (ID: {})", entry.title, entry.handle);
                if let Err(e) = self.activator.focus_window(entry.handle.0) {
                    warn!("Failed to activate window {}: {:#}", entry.handle, e);
                    return Flow::Continue;
                }
                Flow::Stop
            }
            PanelOutcome::Done => {
                info!("Panel finished");
                Flow::Stop
            }
            PanelOutcome::ShowSearchScanner => {
                info!("Search requested; send `filter <text>` to narrow the list");
                Flow::Continue
            }
        }
    }

    fn status(&self) -> IpcResponse {
        let list = self.panel.list();
        IpcResponse::Status {
            page: list.page_index(),
            page_count: list.page_count(),
            entries: list.filtered_entries().len(),
            filter: list.filter_text().to_string(),
            docked: match self.panel.dock_state() {
                scan_switcher::DockState::Docked(panel) => Some(panel.0),
                scan_switcher::DockState::Undocked => None,
            },
        }
    }

    fn print_panel(&self) {
        eprint!("{}", self.view.render());
    }

    /// Monitor Sway events for focus changes
    async fn monitor_sway_events(window_tx: mpsc::UnboundedSender<WindowEvent>) -> Result<()> {
        let subs = [EventType::Window];
        let mut events = Connection::new().await?.subscribe(subs).await?;

        info!("Subscribed to Sway window events");

        while let Some(event) = events.next().await {
            if let Event::Window(e) = event?
                && e.change == WindowChange::Focus
            {
                debug!("Sway focus moved to container {}", e.container.id);
                if window_tx.send(WindowEvent::Focus(e.container.id)).is_err() {
                    return Ok(());
                }
            }
        }

        Ok(())
    }
}
