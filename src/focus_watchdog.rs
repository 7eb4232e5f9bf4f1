//! Keeps input focus on the panel while it is open.
//!
//! Switch users cannot click the panel back into focus, so whenever focus
//! moves to another window the watchdog asks the host to take it back.

use tracing::{debug, info};

use crate::window_source::WindowHandle;

/// Trait for the host side of focus handling.
pub trait FocusTarget {
    /// Window the panel lives in, if the host knows it.
    fn own_window(&self) -> Option<WindowHandle>;

    /// Bring the panel back to the foreground.
    fn reclaim(&mut self);

    /// Called once when the watchdog is disposed.
    fn release(&mut self) {}
}

/// Exists while the panel is open. Disposed exactly once.
pub struct FocusWatchdog {
    target: Option<Box<dyn FocusTarget>>,
}

impl FocusWatchdog {
    pub fn new(target: Box<dyn FocusTarget>) -> Self {
        info!("Focus watchdog started");
        FocusWatchdog {
            target: Some(target),
        }
    }

    pub fn is_active(&self) -> bool {
        self.target.is_some()
    }

    /// Focus moved to `focused`. Reclaim it if that is not the panel.
    pub fn on_focus_changed(&mut self, focused: WindowHandle) {
        let Some(target) = self.target.as_mut() else {
            return;
        };
        let Some(own) = target.own_window() else {
            return;
        };

        if focused != own {
            debug!("Focus moved to {}, reclaiming for {}", focused, own);
            target.reclaim();
        }
    }

    pub fn dispose(&mut self) {
        if let Some(mut target) = self.target.take() {
            target.release();
            info!("Focus watchdog disposed");
        }
    }
}

impl Drop for FocusWatchdog {
    fn drop(&mut self) {
        self.dispose();
    }
}
