use std::{
    io::{self, BufRead},
    thread::{self, JoinHandle},
};

use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::reminder::event_loop::UiEvent;

const CLOSE_COMMANDS: [&str; 3] = ["close", "q", "quit"];

/// Maps one typed line to the event it represents.
pub fn parse_line(line: &str) -> UiEvent {
    let trimmed = line.trim();
    if CLOSE_COMMANDS
        .iter()
        .any(|command| trimmed.eq_ignore_ascii_case(command))
    {
        UiEvent::CloseRequested
    } else {
        UiEvent::Submit(trimmed.to_string())
    }
}

/// Forwards lines from `reader` into the reminder loop until either side is gone. The loop is
/// told with [UiEvent::InputClosed] when the input ends.
pub fn forward_lines(reader: impl BufRead, sender: &mpsc::Sender<UiEvent>) {
    for line in reader.lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                info!("Stopped reading input {e:?}");
                break;
            }
        };
        debug!("Read input line {line:?}");
        if sender.blocking_send(parse_line(&line)).is_err() {
            return;
        }
    }
    debug!("Input reached end of file");
    let _ = sender.blocking_send(UiEvent::InputClosed);
}

/// Reads stdin on a dedicated thread. Blocking reads can't be cancelled, so the thread is left
/// to die with the process.
pub fn spawn_stdin_reader(sender: mpsc::Sender<UiEvent>) -> io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("waterbreak-input".into())
        .spawn(move || forward_lines(io::stdin().lock(), &sender))
}
