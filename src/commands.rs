//! Actuation vocabulary of the switcher panel.
//!
//! The rendering layer identifies buttons by their widget value strings
//! (`@WindowListSort` and friends) and asks about enablement by control
//! name. Anything this panel does not know about is reported as not handled
//! so an outer dispatcher can offer it to another handler.

use std::fmt;
use std::str::FromStr;

use crate::window_source::WindowEntry;

/// Navigation commands carried by non-row buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelCommand {
    /// Close the panel
    Quit,
    /// Flip between A-Z and Z-A
    ToggleSort,
    NextPage,
    PreviousPage,
    /// Ask the host to show the search scanner
    OpenSearch,
    /// Clear the filter text after confirmation
    ClearFilter,
}

/// One actuation delivered to the panel.
#[derive(Debug, Clone, PartialEq)]
pub enum Actuation {
    /// A row button bound to a window was picked
    Row(WindowEntry),
    /// A command button, identified by its widget value
    Command(String),
}

/// Whether the panel consumed an actuation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    Handled,
    NotHandled,
}

impl Dispatch {
    pub fn is_handled(self) -> bool {
        self == Dispatch::Handled
    }
}

/// Keys raised by the keyboard actuator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyPress {
    Escape,
    PageUp,
    PageDown,
    Char(char),
}

impl KeyPress {
    /// Map a raw key character the way the keyboard actuator reports it.
    pub fn from_char(c: char) -> Self {
        match c {
            '\u{1b}' => KeyPress::Escape,
            other => KeyPress::Char(other),
        }
    }

    /// Parse a key name such as `escape`, `page-up` or a single character.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "escape" | "esc" => Some(KeyPress::Escape),
            "page-up" | "pageup" => Some(KeyPress::PageUp),
            "page-down" | "pagedown" => Some(KeyPress::PageDown),
            _ => {
                let mut chars = name.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Some(KeyPress::from_char(c)),
                    _ => None,
                }
            }
        }
    }
}

/// Controls whose enabled state the renderer polls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    PreviousPage,
    NextPage,
    Back,
    DeletePreviousWord,
    ClearFilter,
    Sort,
    Search,
    PrevChar,
    NextChar,
}

/// Error returned when parsing an unknown command or control name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseCommandError(pub String);

impl fmt::Display for ParseCommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unrecognized command: {}", self.0)
    }
}

impl std::error::Error for ParseCommandError {}

impl FromStr for PanelCommand {
    type Err = ParseCommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "@Quit" => Ok(PanelCommand::Quit),
            "@WindowListSort" => Ok(PanelCommand::ToggleSort),
            "@WindowListNextPage" => Ok(PanelCommand::NextPage),
            "@WindowListPrevPage" => Ok(PanelCommand::PreviousPage),
            "@WindowListSearch" => Ok(PanelCommand::OpenSearch),
            "@WindowListClearFilter" => Ok(PanelCommand::ClearFilter),
            other => Err(ParseCommandError(other.to_string())),
        }
    }
}

impl fmt::Display for PanelCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PanelCommand::Quit => "@Quit",
            PanelCommand::ToggleSort => "@WindowListSort",
            PanelCommand::NextPage => "@WindowListNextPage",
            PanelCommand::PreviousPage => "@WindowListPrevPage",
            PanelCommand::OpenSearch => "@WindowListSearch",
            PanelCommand::ClearFilter => "@WindowListClearFilter",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for Control {
    type Err = ParseCommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "PreviousPage" => Ok(Control::PreviousPage),
            "NextPage" => Ok(Control::NextPage),
            "Back" => Ok(Control::Back),
            "DeletePreviousWord" => Ok(Control::DeletePreviousWord),
            "ClearFilter" => Ok(Control::ClearFilter),
            "Sort" => Ok(Control::Sort),
            "Search" => Ok(Control::Search),
            "PrevChar" => Ok(Control::PrevChar),
            "NextChar" => Ok(Control::NextChar),
            other => Err(ParseCommandError(other.to_string())),
        }
    }
}
