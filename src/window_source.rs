//! Window enumeration abstraction.
//!
//! The panel never talks to a windowing system directly. Everything it needs
//! to know about open windows comes through the [`WindowSource`] trait, which
//! keeps the list logic testable with in-memory fakes.

use anyhow::Result;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Opaque identifier of a top-level window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WindowHandle(pub i64);

impl fmt::Display for WindowHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One row of the switcher list.
///
/// Entries are immutable once obtained from a [`WindowSource`]. Two entries
/// are the same window when their handles match, whatever their titles.
#[derive(Debug, Clone)]
pub struct WindowEntry {
    pub handle: WindowHandle,
    pub title: String,
}

impl WindowEntry {
    pub fn new(handle: WindowHandle, title: impl Into<String>) -> Self {
        WindowEntry {
            handle,
            title: title.into(),
        }
    }
}

impl PartialEq for WindowEntry {
    fn eq(&self, other: &Self) -> bool {
        self.handle == other.handle
    }
}

impl Eq for WindowEntry {}

impl Hash for WindowEntry {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.handle.hash(state);
    }
}

/// Title of the synthetic entry that minimizes everything.
pub const SHOW_DESKTOP_TITLE: &str = "Show Desktop";

/// Trait for the native window-enumeration primitive.
///
/// All calls are synchronous and are made from the panel's event thread.
pub trait WindowSource {
    /// Snapshot of the currently open top-level windows.
    fn enumerate(&mut self) -> Result<Vec<WindowEntry>>;

    /// Name of the process that owns `handle`, if it can be determined.
    fn owner_process_name(&mut self, handle: WindowHandle) -> Result<Option<String>>;

    /// Whether `handle` still refers to a live window.
    fn exists(&mut self, handle: WindowHandle) -> Result<bool>;

    /// Whether `handle` is currently visible.
    fn is_visible(&mut self, handle: WindowHandle) -> Result<bool>;

    /// Handle that stands for "the desktop", when the platform has one.
    fn desktop_handle(&mut self) -> Option<WindowHandle> {
        None
    }
}
