//! Selection gate: last check before a picked window is activated.
//!
//! The list snapshot may be arbitrarily old by the time a row is picked, so
//! the window is re-validated against the source here, immediately before
//! asking the user to confirm.

use tracing::{debug, info, warn};

use crate::window_source::{WindowEntry, WindowSource};

/// Message shown when a picked window vanished since the snapshot.
pub const WINDOW_GONE_MESSAGE: &str = "Window does not exist";

/// Trait for blocking user dialogs.
pub trait Prompter {
    /// Modal yes/no question. Returns true if the user accepted.
    fn confirm(&mut self, prompt: &str) -> bool;

    /// Informational message that dismisses itself after a while.
    fn notify(&mut self, message: &str);
}

#[derive(Debug, Clone, PartialEq)]
pub enum SelectionOutcome {
    /// User confirmed; the entry should be activated
    Activated(WindowEntry),
    /// User declined the confirmation
    Declined,
    /// The window no longer exists or is hidden
    NotFound,
}

/// Validate `entry`, then ask the user to confirm switching to it.
///
/// A source error during validation counts as the window being gone.
pub fn select<S: WindowSource + ?Sized>(
    source: &mut S,
    prompter: &mut dyn Prompter,
    entry: &WindowEntry,
) -> SelectionOutcome {
    if !is_live(source, entry) {
        info!("Window {} ({:?}) is gone", entry.handle, entry.title);
        prompter.notify(WINDOW_GONE_MESSAGE);
        return SelectionOutcome::NotFound;
    }

    if prompter.confirm(&switch_prompt(entry)) {
        debug!("Switch to window {} confirmed", entry.handle);
        SelectionOutcome::Activated(entry.clone())
    } else {
        debug!("Switch to window {} declined", entry.handle);
        SelectionOutcome::Declined
    }
}

fn is_live<S: WindowSource + ?Sized>(source: &mut S, entry: &WindowEntry) -> bool {
    let exists = source.exists(entry.handle).and_then(|exists| {
        if exists {
            source.is_visible(entry.handle)
        } else {
            Ok(false)
        }
    });

    match exists {
        Ok(live) => live,
        Err(e) => {
            warn!("Failed to validate window {}: {}", entry.handle, e);
            false
        }
    }
}

fn switch_prompt(entry: &WindowEntry) -> String {
    format!("Switch to {}?", entry.title)
}
