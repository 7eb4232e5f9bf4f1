use crate::ipc::{get_socket_path, IpcCommand, IpcResponse};
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tokio::io::{AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info, warn};

/// A parsed command and the slot its response goes back through
pub type IpcRequest = (IpcCommand, oneshot::Sender<IpcResponse>);

/// Owns the socket file for as long as the daemon listens on it
pub struct SocketGuard {
    path: PathBuf,
}

impl Drop for SocketGuard {
    fn drop(&mut self) {
        match fs::remove_file(&self.path) {
            Ok(()) => info!("Socket {} removed", self.path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => error!("Could not remove socket {}: {}", self.path.display(), e),
        }
    }
}

fn bind(path: &Path) -> Result<UnixListener> {
    if path.exists() {
        info!("Replacing leftover socket {}", path.display());
        fs::remove_file(path)
            .with_context(|| format!("Failed to remove old socket {}", path.display()))?;
    }

    UnixListener::bind(path).with_context(|| format!("Failed to bind socket at {}", path.display()))
}

/// Bind the actuation socket and start accepting switch drivers.
///
/// Each request arrives on the returned receiver paired with a reply slot.
/// The daemon answers after the panel has settled, so a client sees the
/// result of its own actuation.
pub async fn start_server() -> Result<(mpsc::UnboundedReceiver<IpcRequest>, SocketGuard)> {
    let path = get_socket_path()?;
    let listener = bind(&path)?;
    info!("Accepting actuations on {}", path.display());

    let (tx, rx) = mpsc::unbounded_channel();
    tokio::spawn(accept_loop(listener, tx));

    Ok((rx, SocketGuard { path }))
}

async fn accept_loop(listener: UnixListener, requests: mpsc::UnboundedSender<IpcRequest>) {
    loop {
        let stream = match listener.accept().await {
            Ok((stream, _)) => stream,
            Err(e) => {
                error!("Accept on actuation socket failed: {}", e);
                continue;
            }
        };

        let requests = requests.clone();
        tokio::spawn(async move {
            if let Err(e) = serve_connection(stream, requests).await {
                debug!("Actuation client dropped: {:#}", e);
            }
        });
    }
}

/// One request line in, one JSON line out.
async fn serve_connection(
    stream: UnixStream,
    requests: mpsc::UnboundedSender<IpcRequest>,
) -> Result<()> {
    let (read_half, mut write_half) = stream.into_split();
    let mut line = String::new();
    BufReader::new(read_half).read_line(&mut line).await?;

    let response = match line.parse::<IpcCommand>() {
        Ok(command) => forward(command, &requests).await,
        Err(e) => {
            warn!("Rejected request {:?}: {}", line.trim(), e);
            IpcResponse::Error(format!("Unknown command: {}", line.trim()))
        }
    };

    write_response(&mut write_half, &response).await
}

async fn forward(command: IpcCommand, requests: &mpsc::UnboundedSender<IpcRequest>) -> IpcResponse {
    debug!("Forwarding {:?} to the panel", command);
    let (reply, answer) = oneshot::channel();
    if requests.send((command, reply)).is_err() {
        return IpcResponse::Error("Panel is shutting down".to_string());
    }

    answer
        .await
        .unwrap_or_else(|_| IpcResponse::Error("Panel closed before answering".to_string()))
}

async fn write_response<W: AsyncWrite + Unpin>(writer: &mut W, response: &IpcResponse) -> Result<()> {
    let mut json = serde_json::to_string(response)?;
    json.push('\n');
    writer.write_all(json.as_bytes()).await?;
    writer.flush().await?;
    Ok(())
}
