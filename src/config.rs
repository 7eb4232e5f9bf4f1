use clap::{Parser, Subcommand};
use scan_switcher::DockAnchor;

use crate::ipc::IpcCommand;

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Run as daemon hosting the panel (default if no command specified)
    Daemon,
    /// Toggle between A-Z and Z-A
    Sort,
    /// Show the next page of windows
    NextPage,
    /// Show the previous page of windows
    PrevPage,
    /// Ask for the search scanner
    Search,
    /// Clear the filter text
    ClearFilter,
    /// Close the panel and stop the daemon
    Quit,
    /// Pick the window on a visible row
    Pick {
        /// Row slot, counted from 0
        slot: usize,
    },
    /// Set the filter text (empty clears it without asking)
    Filter {
        #[arg(default_value = "")]
        text: String,
    },
    /// Re-fetch the window list
    Reload,
    /// Tell the panel another panel was shown (Sway container ID)
    PanelShown { id: u64 },
    /// Tell the panel another panel was closed (Sway container ID)
    PanelClosed { id: u64 },
    /// Tell the panel its window moved
    Moved,
    /// Send a key press (escape, page-up, page-down or a character)
    Key { name: String },
    /// Query daemon status
    Status,
    /// Shutdown the daemon
    Shutdown,
}

#[derive(Debug, Clone, Parser)]
#[command(name = "scan-switcher")]
#[command(about = "Switch-actuated window switcher panel for Sway", long_about = None)]
pub struct Config {
    /// Only list windows owned by this process name
    #[arg(short, long)]
    pub process: Option<String>,

    /// Side of a companion panel to dock on
    #[arg(short, long, value_enum, default_value = "below")]
    pub anchor: DockAnchor,

    /// Number of window rows per page
    #[arg(short, long, default_value_t = 8)]
    pub rows: usize,

    /// Truncate window titles longer than this
    #[arg(long, default_value_t = 60)]
    pub title_width: usize,

    /// Sway container ID of the window hosting the panel.
    /// Enables docking moves and focus retention.
    #[arg(long)]
    pub panel_window: Option<i64>,

    /// Accept every confirmation prompt without asking
    #[arg(short = 'y', long)]
    pub assume_yes: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Command to execute
    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Config {
    pub fn parse() -> Self {
        <Config as Parser>::parse()
    }

    /// Get the command, defaulting to Daemon if none specified
    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Daemon)
    }
}

impl Command {
    /// The request a client command sends. None for the daemon itself.
    pub fn ipc_command(&self) -> Option<IpcCommand> {
        let cmd = match self {
            Command::Daemon => return None,
            Command::Sort => IpcCommand::Sort,
            Command::NextPage => IpcCommand::NextPage,
            Command::PrevPage => IpcCommand::PrevPage,
            Command::Search => IpcCommand::Search,
            Command::ClearFilter => IpcCommand::ClearFilter,
            Command::Quit => IpcCommand::Quit,
            Command::Pick { slot } => IpcCommand::Pick(*slot),
            Command::Filter { text } => IpcCommand::Filter(text.clone()),
            Command::Reload => IpcCommand::Reload,
            Command::PanelShown { id } => IpcCommand::PanelShown(*id),
            Command::PanelClosed { id } => IpcCommand::PanelClosed(*id),
            Command::Moved => IpcCommand::Moved,
            Command::Key { name } => IpcCommand::Key(name.clone()),
            Command::Status => IpcCommand::Status,
            Command::Shutdown => IpcCommand::Shutdown,
        };
        Some(cmd)
    }
}
