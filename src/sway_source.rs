//! Sway IPC backed collaborators for the reference host.
//!
//! Provides the window source, panel geometry and focus handling on top of
//! a synchronous Sway connection. The panel's own window is the Sway
//! container given on the command line; without it, docking moves and focus
//! retention are logged and skipped.

use anyhow::{Context, Result};
use std::fs;
use swayipc::{Connection, Node, NodeType};
use tracing::{debug, warn};

use crate::dock::{PanelWindow, Point, Rect, Size};
use crate::focus_watchdog::FocusTarget;
use crate::panel_bus::PanelId;
use crate::window_source::{WindowEntry, WindowHandle, WindowSource};

/// Trait for Sway IPC operations.
///
/// This abstraction allows for mock implementations in tests.
pub trait SwayClient {
    /// Get the full window tree from Sway
    fn get_tree(&mut self) -> Result<Node>;

    /// Run a Sway command, failing if any part of it fails
    fn run_command(&mut self, command: &str) -> Result<()>;

    /// Focus a window by its container ID
    fn focus_window(&mut self, window_id: i64) -> Result<()> {
        self.run_command(&focus_command(window_id))
    }
}

/// Real implementation using swayipc
pub struct RealSwayClient {
    connection: Connection,
}

impl RealSwayClient {
    /// Create a new connection to Sway
    pub fn new() -> Result<Self> {
        let connection = Connection::new().context("Failed to connect to Sway")?;
        Ok(RealSwayClient { connection })
    }
}

impl SwayClient for RealSwayClient {
    fn get_tree(&mut self) -> Result<Node> {
        Ok(self.connection.get_tree()?)
    }

    fn run_command(&mut self, command: &str) -> Result<()> {
        debug!("Sway command: {}", command);
        for outcome in self.connection.run_command(command)? {
            outcome.with_context(|| format!("Sway rejected '{}'", command))?;
        }
        Ok(())
    }
}

fn focus_command(con_id: i64) -> String {
    format!("[con_id={}] focus", con_id)
}

fn move_command(con_id: i64, origin: Point) -> String {
    format!(
        "[con_id={}] floating enable, move absolute position {} {}",
        con_id, origin.x, origin.y
    )
}

fn center_command(con_id: i64) -> String {
    format!("[con_id={}] move position center", con_id)
}

/// Whether a node is an application window rather than a container.
/// Windows have a pid, containers don't.
fn is_window(node: &Node) -> bool {
    matches!(node.node_type, NodeType::Con | NodeType::FloatingCon) && node.pid.is_some()
}

/// Recursively collect all application windows from a Sway node tree.
#[must_use]
fn collect_windows(node: &Node) -> Vec<WindowEntry> {
    let mut windows = Vec::new();

    if is_window(node) {
        windows.push(WindowEntry::new(
            WindowHandle(node.id),
            node.name.clone().unwrap_or_default(),
        ));
    }

    for child in node.nodes.iter().chain(node.floating_nodes.iter()) {
        windows.extend(collect_windows(child));
    }

    windows
}

/// Find a node by container ID anywhere in the tree.
#[must_use]
fn find_node(node: &Node, id: i64) -> Option<&Node> {
    if node.id == id {
        return Some(node);
    }

    node.nodes
        .iter()
        .chain(node.floating_nodes.iter())
        .find_map(|child| find_node(child, id))
}

/// Short process name for `pid`, as the kernel reports it.
fn process_name(pid: i32) -> Result<Option<String>> {
    let path = format!("/proc/{}/comm", pid);
    match fs::read_to_string(&path) {
        Ok(name) => Ok(Some(name.trim().to_string()).filter(|n| !n.is_empty())),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e).with_context(|| format!("Failed to read {}", path)),
    }
}

fn to_rect(rect: &swayipc::Rect) -> Rect {
    Rect {
        x: rect.x,
        y: rect.y,
        width: rect.width,
        height: rect.height,
    }
}

/// Window source over the Sway tree.
pub struct SwayWindowSource<C: SwayClient = RealSwayClient> {
    client: C,
}

impl SwayWindowSource<RealSwayClient> {
    pub fn new() -> Result<Self> {
        Ok(Self::with_client(RealSwayClient::new()?))
    }
}

impl<C: SwayClient> SwayWindowSource<C> {
    /// Create a source with a custom SwayClient (for testing)
    pub fn with_client(client: C) -> Self {
        SwayWindowSource { client }
    }

    fn with_window<T>(&mut self, handle: WindowHandle, f: impl FnOnce(Option<&Node>) -> T) -> Result<T> {
        let tree = self.client.get_tree()?;
        let node = find_node(&tree, handle.0).filter(|n| is_window(n));
        Ok(f(node))
    }
}

impl<C: SwayClient> WindowSource for SwayWindowSource<C> {
    fn enumerate(&mut self) -> Result<Vec<WindowEntry>> {
        let tree = self.client.get_tree()?;
        let windows = collect_windows(&tree);
        debug!("Sway reports {} windows", windows.len());
        Ok(windows)
    }

    fn owner_process_name(&mut self, handle: WindowHandle) -> Result<Option<String>> {
        match self.with_window(handle, |node| node.and_then(|n| n.pid))? {
            Some(pid) => process_name(pid),
            None => Ok(None),
        }
    }

    fn exists(&mut self, handle: WindowHandle) -> Result<bool> {
        self.with_window(handle, |node| node.is_some())
    }

    fn is_visible(&mut self, handle: WindowHandle) -> Result<bool> {
        self.with_window(handle, |node| node.and_then(|n| n.visible).unwrap_or(false))
    }
}

/// Panel geometry through Sway. Panel IDs are Sway container IDs.
pub struct SwayPanelWindow<C: SwayClient = RealSwayClient> {
    client: C,
    own: Option<i64>,
}

impl<C: SwayClient> SwayPanelWindow<C> {
    pub fn new(client: C, own: Option<i64>) -> Self {
        SwayPanelWindow { client, own }
    }

    fn bounds(&mut self, id: i64) -> Option<Rect> {
        match self.client.get_tree() {
            Ok(tree) => find_node(&tree, id).map(|n| to_rect(&n.rect)),
            Err(e) => {
                warn!("Failed to read Sway tree: {}", e);
                None
            }
        }
    }

    fn run(&mut self, command: String) {
        if let Err(e) = self.client.run_command(&command) {
            warn!("{:#}", e);
        }
    }
}

impl<C: SwayClient> PanelWindow for SwayPanelWindow<C> {
    fn bounds_of(&mut self, panel: PanelId) -> Option<Rect> {
        let id = i64::try_from(panel.0).ok()?;
        self.bounds(id)
    }

    fn own_size(&mut self) -> Option<Size> {
        let own = self.own?;
        self.bounds(own).map(|r| Size {
            width: r.width,
            height: r.height,
        })
    }

    fn move_to(&mut self, origin: Point) {
        match self.own {
            Some(own) => self.run(move_command(own, origin)),
            None => debug!("No panel window configured, not moving to {:?}", origin),
        }
    }

    fn auto_position(&mut self) {
        if let Some(own) = self.own {
            self.run(center_command(own));
        }
    }
}

/// Focus retention through Sway.
pub struct SwayFocus<C: SwayClient = RealSwayClient> {
    client: C,
    own: Option<i64>,
}

impl<C: SwayClient> SwayFocus<C> {
    pub fn new(client: C, own: Option<i64>) -> Self {
        SwayFocus { client, own }
    }
}

impl<C: SwayClient> FocusTarget for SwayFocus<C> {
    fn own_window(&self) -> Option<WindowHandle> {
        self.own.map(WindowHandle)
    }

    fn reclaim(&mut self) {
        if let Some(own) = self.own
            && let Err(e) = self.client.focus_window(own)
        {
            warn!("Failed to reclaim focus: {:#}", e);
        }
    }
}

// Note: swayipc::Node is #[non_exhaustive], so the tree walkers cannot be fed
// hand-built nodes here. They are exercised against a live Sway session.
