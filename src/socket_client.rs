use crate::ipc::{get_socket_path, IpcCommand, IpcResponse};
use anyhow::{Context, Result};
use std::io::{BufRead, BufReader, Write};
use std::os::unix::net::UnixStream;
use std::time::Duration;

// A confirmation prompt holds the reply until the user answers
const REPLY_TIMEOUT: Duration = Duration::from_secs(60);
const SEND_TIMEOUT: Duration = Duration::from_secs(5);

/// Deliver one actuation and wait for the panel's answer
pub fn send_command(command: &IpcCommand) -> Result<IpcResponse> {
    let path = get_socket_path()?;
    let stream = UnixStream::connect(&path).with_context(|| {
        format!("No panel listening at {}. Start one with `scan-switcher`.", path.display())
    })?;
    stream.set_read_timeout(Some(REPLY_TIMEOUT))?;
    stream.set_write_timeout(Some(SEND_TIMEOUT))?;

    let mut writer = &stream;
    writeln!(writer, "{}", command)?;
    writer.flush()?;

    let mut line = String::new();
    BufReader::new(&stream)
        .read_line(&mut line)
        .context("Panel did not answer")?;

    serde_json::from_str(&line).with_context(|| format!("Unexpected reply: {:?}", line.trim()))
}

/// Print a response and pick the process exit code for it.
///
/// 0 on success, 2 when the panel did not handle the actuation, 1 on error.
fn report(response: &IpcResponse) -> i32 {
    match response {
        IpcResponse::Ok => 0,
        IpcResponse::NotHandled => {
            eprintln!("Not handled by the switch windows panel");
            2
        }
        IpcResponse::Error(e) => {
            eprintln!("Error: {}", e);
            1
        }
        IpcResponse::Status {
            page,
            page_count,
            entries,
            filter,
            docked,
        } => {
            println!("Switch windows panel");
            println!("  Page: {} of {}", page + 1, page_count);
            println!("  Windows listed: {}", entries);
            println!("  Filter: {:?}", filter);
            match docked {
                Some(id) => println!("  Docked to: {}", id),
                None => println!("  Docked to: nothing"),
            }
            0
        }
    }
}

/// Run a client subcommand to completion
pub fn send_command_and_exit(command: IpcCommand) -> ! {
    let code = match send_command(&command) {
        Ok(response) => report(&response),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            1
        }
    };
    std::process::exit(code)
}
