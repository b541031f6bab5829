use std::io::{self, Write};

use ansi_term::{Colour, Style};
use chrono::{DateTime, Local};
use tracing::warn;

use crate::{storage::entities::IntakeStats, utils::time::clock_display};

use super::PromptView;

/// Renders reminders into a terminal. Rendering problems are logged and otherwise ignored since
/// there's nowhere else to show them.
pub struct TerminalView<W: Write> {
    out: W,
    colored: bool,
}

impl TerminalView<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout(), true)
    }
}

impl<W: Write> TerminalView<W> {
    pub fn new(out: W, colored: bool) -> Self {
        Self { out, colored }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn paint(&self, style: Style, text: &str) -> String {
        if self.colored {
            style.paint(text).to_string()
        } else {
            text.to_string()
        }
    }

    fn write(&mut self, text: &str) {
        let result = self
            .out
            .write_all(text.as_bytes())
            .and_then(|_| self.out.flush());
        if let Err(e) = result {
            warn!("Failed to write to terminal {e:?}");
        }
    }
}

impl<W: Write> PromptView for TerminalView<W> {
    fn open(&mut self, now: DateTime<Local>, stats: IntakeStats) {
        let title = self.paint(Colour::Cyan.bold(), "Time to drink some water!");
        let time = format!("Current time: {}", clock_display(&now));
        let stats = self.paint(Style::new().dimmed(), &stats.to_string());
        self.write(&format!("\n{title}\n{time}\n{stats}\n"));
    }

    fn render_countdown(&mut self, now: DateTime<Local>, remaining: u32) {
        self.write(&format!(
            "\r\x1b[2K[{}] {remaining} seconds until you can close this reminder",
            clock_display(&now)
        ));
    }

    fn show_input(&mut self) {
        let prompt = self.paint(
            Colour::Green.normal(),
            "How much did you drink (ml)? Type 'close' to dismiss.",
        );
        self.write(&format!("\r\x1b[2K{prompt}\n> "));
    }

    fn report_error(&mut self, message: &str) {
        let message = self.paint(Colour::Red.bold(), message);
        self.write(&format!("{message}\n> "));
    }

    fn close(&mut self) {
        self.write("Reminder closed.\n");
    }
}
