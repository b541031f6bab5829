/// Seconds a reminder has to stay on screen before it can be dismissed.
pub const COUNTDOWN_SECONDS: u32 = 30;

/// Transient state of one reminder, from opening the prompt until it's closed. Whether a reminder
/// is showing at all is tracked by [ReminderScheduler](super::scheduler::ReminderScheduler).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderSession {
    pub countdown_remaining: u32,
    pub enable_recurrence: bool,
}

impl ReminderSession {
    pub fn new(enable_recurrence: bool) -> Self {
        Self {
            countdown_remaining: COUNTDOWN_SECONDS,
            enable_recurrence,
        }
    }
}
