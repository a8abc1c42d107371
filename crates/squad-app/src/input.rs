//! Player commands read as JSON lines, one `PlayerCommand` per line.
//!
//! Blank lines and lines starting with `#` are skipped. A line that does not
//! parse is logged and dropped; the rest of the stream still counts.

use std::io::{self, BufRead};
use std::sync::mpsc;
use std::thread::JoinHandle;

use tracing::{debug, warn};

use squad_core::commands::PlayerCommand;

use crate::state::GameLoopCommand;

pub fn parse_line(line: &str) -> Result<Option<PlayerCommand>, serde_json::Error> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }
    serde_json::from_str(line).map(Some)
}

/// Forward every command in `reader` to the game loop. Returns how many were
/// sent; stops early once the loop has gone away.
pub fn forward_commands(reader: impl BufRead, tx: &mpsc::Sender<GameLoopCommand>) -> usize {
    let mut sent = 0;
    for (number, line) in reader.lines().enumerate() {
        let line = match line {
            Ok(line) => line,
            Err(err) => {
                warn!(target: "squad::input", error = %err, "command stream closed");
                break;
            }
        };
        match parse_line(&line) {
            Ok(Some(command)) => {
                debug!(target: "squad::input", ?command, "command read");
                if tx.send(GameLoopCommand::PlayerCommand(command)).is_err() {
                    break;
                }
                sent += 1;
            }
            Ok(None) => {}
            Err(err) => warn!(target: "squad::input", line = number + 1, error = %err, "bad command"),
        }
    }
    sent
}

/// Read commands from stdin on a background thread.
pub fn spawn_stdin_reader(tx: mpsc::Sender<GameLoopCommand>) -> io::Result<JoinHandle<usize>> {
    std::thread::Builder::new()
        .name("squad-stdin".into())
        .spawn(move || forward_commands(io::stdin().lock(), &tx))
}
