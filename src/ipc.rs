use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Actuation requests sent from switch drivers and the CLI to the daemon
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum IpcCommand {
    /// Toggle A-Z / Z-A
    Sort,
    NextPage,
    PrevPage,
    /// Request the search scanner
    Search,
    /// Clear the filter text (asks for confirmation)
    ClearFilter,
    /// Close the panel
    Quit,
    /// Pick the window on a visible row
    Pick(usize),
    /// Replace the filter text
    Filter(String),
    /// Re-fetch the window list
    Reload,
    /// Panel manager broadcast: a panel was shown
    PanelShown(u64),
    /// Panel manager broadcast: a panel was closed
    PanelClosed(u64),
    /// The panel's window was moved
    Moved,
    /// A key from the keyboard actuator
    Key(String),
    /// Query daemon status (for debugging)
    Status,
    /// Shutdown the daemon gracefully
    Shutdown,
}

/// Response from daemon to client
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum IpcResponse {
    /// Command executed successfully
    Ok,
    /// The panel did not handle the command
    NotHandled,
    /// Error occurred
    Error(String),
    /// Status response
    Status {
        page: usize,
        page_count: usize,
        entries: usize,
        filter: String,
        docked: Option<u64>,
    },
}

/// Get the path to the Unix socket
pub fn get_socket_path() -> Result<PathBuf> {
    let runtime_dir = dirs::runtime_dir()
        .or_else(dirs::cache_dir)
        .context("Could not determine runtime directory")?;

    Ok(runtime_dir.join("scan-switcher.sock"))
}

/// Error returned when parsing an invalid IpcCommand string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIpcCommandError;

impl fmt::Display for ParseIpcCommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid IPC command")
    }
}

impl std::error::Error for ParseIpcCommandError {}

fn parse_number<T: FromStr>(arg: Option<&str>) -> Option<T> {
    arg.and_then(|a| a.trim().parse().ok())
}

impl FromStr for IpcCommand {
    type Err = ParseIpcCommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim_end_matches(['\r', '\n']).trim_start();
        let (name, arg) = match s.split_once(' ') {
            Some((name, arg)) if !arg.trim().is_empty() => (name, Some(arg)),
            Some((name, _)) => (name, None),
            None => (s, None),
        };

        match (name.to_lowercase().as_str(), arg) {
            ("sort", None) => Ok(IpcCommand::Sort),
            ("next-page", None) => Ok(IpcCommand::NextPage),
            ("prev-page", None) => Ok(IpcCommand::PrevPage),
            ("search", None) => Ok(IpcCommand::Search),
            ("clear-filter", None) => Ok(IpcCommand::ClearFilter),
            ("quit", None) => Ok(IpcCommand::Quit),
            ("reload", None) => Ok(IpcCommand::Reload),
            ("moved", None) => Ok(IpcCommand::Moved),
            ("status", None) => Ok(IpcCommand::Status),
            ("shutdown", None) => Ok(IpcCommand::Shutdown),
            ("key", Some(arg)) => Ok(IpcCommand::Key(arg.trim().to_string())),
            ("filter", arg) => Ok(IpcCommand::Filter(arg.unwrap_or_default().to_string())),
            ("pick", arg) => parse_number(arg).map(IpcCommand::Pick).ok_or(ParseIpcCommandError),
            ("panel-shown", arg) => parse_number(arg).map(IpcCommand::PanelShown).ok_or(ParseIpcCommandError),
            ("panel-closed", arg) => parse_number(arg).map(IpcCommand::PanelClosed).ok_or(ParseIpcCommandError),
            _ => Err(ParseIpcCommandError),
        }
    }
}

impl fmt::Display for IpcCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IpcCommand::Sort => write!(f, "sort"),
            IpcCommand::NextPage => write!(f, "next-page"),
            IpcCommand::PrevPage => write!(f, "prev-page"),
            IpcCommand::Search => write!(f, "search"),
            IpcCommand::ClearFilter => write!(f, "clear-filter"),
            IpcCommand::Quit => write!(f, "quit"),
            IpcCommand::Pick(slot) => write!(f, "pick {}", slot),
            IpcCommand::Filter(text) => write!(f, "filter {}", text),
            IpcCommand::Reload => write!(f, "reload"),
            IpcCommand::PanelShown(id) => write!(f, "panel-shown {}", id),
            IpcCommand::PanelClosed(id) => write!(f, "panel-closed {}", id),
            IpcCommand::Moved => write!(f, "moved"),
            IpcCommand::Key(name) => write!(f, "key {}", name),
            IpcCommand::Status => write!(f, "status"),
            IpcCommand::Shutdown => write!(f, "shutdown"),
        }
    }
}
