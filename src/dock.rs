//! Docking of the switcher panel to a companion scanner panel.
//!
//! While docked, the panel's own position is pinned next to the companion:
//! any local move snaps it back. The companion is whichever panel was shown
//! last, and docking ends when exactly that panel closes.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::panel_bus::{PanelEvent, PanelId};

/// Side of the companion the panel attaches to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DockAnchor {
    Above,
    #[default]
    Below,
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

/// Trait for the window-geometry side of the host.
pub trait PanelWindow {
    /// Screen bounds of another panel. None if it cannot be docked to.
    fn bounds_of(&mut self, panel: PanelId) -> Option<Rect>;

    /// Current size of this panel, if known.
    fn own_size(&mut self) -> Option<Size>;

    /// Move this panel's top-left corner.
    fn move_to(&mut self, origin: Point);

    /// Let the host place this panel where it normally would.
    fn auto_position(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DockState {
    Undocked,
    Docked(PanelId),
}

/// Where a panel of `size` goes to sit on `anchor` side of `companion`.
#[must_use]
pub fn docked_origin(companion: Rect, size: Size, anchor: DockAnchor) -> Point {
    match anchor {
        DockAnchor::Above => Point {
            x: companion.x,
            y: companion.y.saturating_sub(size.height),
        },
        DockAnchor::Below => Point {
            x: companion.x,
            y: companion.y.saturating_add(companion.height),
        },
        DockAnchor::Left => Point {
            x: companion.x.saturating_sub(size.width),
            y: companion.y,
        },
        DockAnchor::Right => Point {
            x: companion.x.saturating_add(companion.width),
            y: companion.y,
        },
    }
}

pub struct DockSync {
    own: PanelId,
    anchor: DockAnchor,
    state: DockState,
    window: Box<dyn PanelWindow>,
}

impl DockSync {
    pub fn new(own: PanelId, anchor: DockAnchor, window: Box<dyn PanelWindow>) -> Self {
        DockSync {
            own,
            anchor,
            state: DockState::Undocked,
            window,
        }
    }

    pub fn state(&self) -> DockState {
        self.state
    }

    pub fn companion(&self) -> Option<PanelId> {
        match self.state {
            DockState::Docked(p) => Some(p),
            DockState::Undocked => None,
        }
    }

    pub fn handle(&mut self, event: PanelEvent) {
        match event {
            PanelEvent::Shown(panel) => self.on_shown(panel),
            PanelEvent::Closed(panel) => self.on_closed(panel),
        }
    }

    /// A sibling panel was shown: it becomes the companion.
    pub fn on_shown(&mut self, panel: PanelId) {
        if panel == self.own {
            return;
        }

        debug!("Docking to panel {:?}", panel);
        self.state = DockState::Docked(panel);
        self.dock_to(panel);
    }

    /// A sibling panel closed. Undock if it was the companion, then fall
    /// back to automatic placement.
    pub fn on_closed(&mut self, panel: PanelId) {
        if panel == self.own {
            return;
        }

        if self.state == DockState::Docked(panel) {
            debug!("Companion panel {:?} closed, undocking", panel);
            self.state = DockState::Undocked;
        }
        self.window.auto_position();
    }

    /// This panel moved. While docked, snap back next to the companion.
    pub fn on_position_changed(&mut self) {
        if let DockState::Docked(panel) = self.state {
            self.dock_to(panel);
        }
    }

    /// Place the panel next to `current` once, without docking to it.
    pub fn place_next_to(&mut self, current: Option<PanelId>) {
        if let Some(panel) = current
            && panel != self.own
        {
            self.dock_to(panel);
        }
    }

    pub fn teardown(&mut self) {
        self.state = DockState::Undocked;
    }

    fn dock_to(&mut self, panel: PanelId) -> bool {
        let Some(bounds) = self.window.bounds_of(panel) else {
            debug!("Panel {:?} is not dockable, skipping", panel);
            return false;
        };
        let Some(size) = self.window.own_size() else {
            debug!("Own panel size unknown, skipping dock");
            return false;
        };

        let origin = docked_origin(bounds, size, self.anchor);
        self.window.move_to(origin);
        true
    }
}
