use super::SOCKET_PATH;
use crate::events::AppEvent;
use std::io::Write;
use std::os::unix::net::UnixStream;

/// Sends one control line to a running daemon.
pub fn send_command(event: &AppEvent) -> anyhow::Result<()> {
    let mut stream = UnixStream::connect(SOCKET_PATH).map_err(|e| {
        anyhow::anyhow!(
            "Failed to connect to ringd daemon at {}: {}. Is ringd running?",
            SOCKET_PATH,
            e
        )
    })?;

    writeln!(stream, "{}", event.to_line())?;
    Ok(())
}
