//! Control socket: server (during `cadence run`) and client (for `cadence pause`).
//! Protocol: one line per command, "pause <queue_id>"; the server answers
//! "ok" when that queue is running here and "unknown" otherwise.

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use cadence_core::control::RunControl;
use cadence_core::queue_db::QueueId;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{UnixListener, UnixStream};

/// Parse one protocol line; `None` for anything malformed.
pub fn parse_command(line: &str) -> Option<QueueId> {
    line.trim().strip_prefix("pause ")?.trim().parse().ok()
}

/// Spawns a task that listens on `path` and calls `control.request_pause(id)`
/// for each "pause <id>" line. Malformed lines get no answer.
pub fn spawn_control_listener(
    control: Arc<RunControl>,
    path: impl AsRef<Path>,
) -> Result<tokio::task::JoinHandle<()>> {
    let path = path.as_ref().to_path_buf();
    let _ = std::fs::remove_file(&path);
    let listener = UnixListener::bind(&path)?;
    let handle = tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((stream, _)) => {
                    let control = Arc::clone(&control);
                    tokio::spawn(async move {
                        let (read, mut write) = stream.into_split();
                        let mut lines = BufReader::new(read).lines();
                        while let Ok(Some(line)) = lines.next_line().await {
                            let reply = match parse_command(&line) {
                                Some(id) if control.request_pause(id) => {
                                    tracing::info!(queue = id, "pause requested over control socket");
                                    "ok\n"
                                }
                                Some(id) => {
                                    tracing::debug!(queue = id, "pause for a queue that is not running");
                                    "unknown\n"
                                }
                                None => {
                                    tracing::debug!(line = %line, "ignoring control line");
                                    continue;
                                }
                            };
                            if let Err(e) = write.write_all(reply.as_bytes()).await {
                                tracing::debug!("control socket reply: {}", e);
                                break;
                            }
                        }
                    });
                }
                Err(e) => tracing::debug!("control socket accept: {}", e),
            }
        }
    });
    Ok(handle)
}

/// Sends "pause <queue_id>\n" to the control socket.
///
/// Returns true only when a live run acknowledged the pause. A missing socket
/// means nothing is running (`Ok(false)`).
pub async fn send_pause(socket_path: &Path, queue_id: QueueId) -> Result<bool> {
    if !socket_path.exists() {
        return Ok(false);
    }
    let stream = UnixStream::connect(socket_path).await?;
    let (read, mut write) = stream.into_split();
    write
        .write_all(format!("pause {queue_id}\n").as_bytes())
        .await?;
    let reply = BufReader::new(read).lines().next_line().await?;
    Ok(reply.as_deref().map(str::trim) == Some("ok"))
}
