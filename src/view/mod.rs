//! Contains the surfaces a reminder can be shown on. [PromptView] is the contract the
//! presenter drives; [terminal::TerminalView] renders it into the controlling terminal and
//! [input] turns typed lines into loop events.

pub mod input;
pub mod terminal;

use chrono::{DateTime, Local};

use crate::storage::entities::IntakeStats;

/// The "window" of a single reminder session. Calls always arrive from the reminder loop, in the
/// order open, countdown updates, input, close.
#[cfg_attr(test, mockall::automock)]
pub trait PromptView {
    /// Shows the reminder together with what has been logged today.
    fn open(&mut self, now: DateTime<Local>, stats: IntakeStats);

    /// Refreshes the clock and the number of seconds left before the prompt can be dismissed.
    fn render_countdown(&mut self, now: DateTime<Local>, remaining: u32);

    /// Clears the countdown and asks for the amount drunk. Closing is allowed from here on.
    fn show_input(&mut self);

    /// Reports a problem to the user. Input typed so far is kept.
    fn report_error(&mut self, message: &str);

    fn close(&mut self);
}
