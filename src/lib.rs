//! Switch-actuated window switcher panel.
//!
//! The panel lists open windows and lets a switch user filter, sort, page
//! through and pick one using a handful of discrete commands. The core talks
//! to its surroundings only through traits: [`WindowSource`] for windows,
//! [`PanelView`] for rendering, [`Prompter`] for dialogs, [`PanelWindow`]
//! for geometry and [`FocusTarget`] for focus. Outcomes go out on a channel.
//!
//! The `sway_source` and `terminal_view` modules implement those traits for
//! the reference host binary.

pub mod commands;
pub mod dock;
pub mod focus_watchdog;
pub mod list_ops;
pub mod panel;
pub mod panel_bus;
pub mod scan_list;
pub mod selection;
pub mod sway_source;
pub mod terminal_view;
pub mod window_source;

pub use commands::{Actuation, Control, Dispatch, KeyPress, PanelCommand};
pub use dock::{DockAnchor, DockState, PanelWindow};
pub use focus_watchdog::FocusTarget;
pub use panel::{PanelOptions, PanelOutcome, PanelParts, PanelView, SwitchWindowsPanel};
pub use panel_bus::{PanelBus, PanelEvent, PanelId};
pub use selection::{Prompter, SelectionOutcome};
pub use window_source::{WindowEntry, WindowHandle, WindowSource};
