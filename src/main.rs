mod config;
mod daemon;
mod ipc;
mod socket_client;
mod socket_server;

use anyhow::{Context, Result};
use config::Config;
use daemon::Daemon;
use std::fs;
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;
use tracing::{error, info};

/// Single-instance lock: a pidfile in the runtime dir, removed on drop
struct Pidfile {
    path: PathBuf,
}

impl Pidfile {
    fn path() -> Result<PathBuf> {
        let dir = dirs::runtime_dir()
            .or_else(dirs::cache_dir)
            .context("Could not determine runtime directory")?;
        Ok(dir.join("scan-switcher.pid"))
    }

    /// Claim the lock, clearing it first if its owner has died
    fn acquire() -> Result<Self> {
        let path = Self::path()?;

        if let Some(pid) = Self::owner(&path)? {
            // Sway only runs on Linux, so /proc is available
            if Path::new(&format!("/proc/{}", pid)).exists() {
                anyhow::bail!(
                    "A switch windows panel is already running (PID {}). \
                     Remove {} if that is wrong.",
                    pid,
                    path.display()
                );
            }
            info!("Clearing pidfile of dead process {}", pid);
        }

        let pid = std::process::id();
        fs::write(&path, pid.to_string())
            .with_context(|| format!("Failed to write pidfile {}", path.display()))?;
        info!("Holding pidfile {} as PID {}", path.display(), pid);

        Ok(Pidfile { path })
    }

    fn owner(path: &Path) -> Result<Option<u32>> {
        match fs::read_to_string(path) {
            Ok(text) => Ok(Some(text.trim().parse().context("Invalid PID in pidfile")?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).context("Failed to read pidfile"),
        }
    }
}

impl Drop for Pidfile {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path) {
            error!("Failed to remove pidfile {}: {}", self.path.display(), e);
        }
    }
}

fn main() -> Result<()> {
    let config = Config::parse();

    // Initialize logging
    let log_level = if config.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let command = config.command();
    if let Some(request) = command.ipc_command() {
        socket_client::send_command_and_exit(request);
    }

    info!("Starting scan-switcher panel");
    if let Some(process) = &config.process {
        info!("Listing windows of process {:?} only", process);
    }

    let _pidfile = Pidfile::acquire()?;

    // Every panel transition runs on this one thread
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to create Tokio runtime")?;

    rt.block_on(async move {
        match run_daemon(config).await {
            Ok(_) => info!("Daemon exited normally"),
            Err(e) => error!("Daemon error: {:#}", e),
        }
    });

    Ok(())
}

/// Start the socket server and run the panel until it is done
async fn run_daemon(config: Config) -> Result<()> {
    let (ipc_rx, _socket_guard) = socket_server::start_server().await?;
    let (outcome_tx, outcome_rx) = mpsc::unbounded_channel();

    let daemon = Daemon::new(&config, outcome_tx)?;
    daemon.run(ipc_rx, outcome_rx).await
}
