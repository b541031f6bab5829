use std::{sync::Arc, time::Duration};

use tokio::{sync::mpsc, task::JoinHandle};
use tracing::{debug, info, warn};

use crate::utils::clock::Clock;

use super::{event_loop::UiEvent, session::ReminderSession};

/// Time between a reminder being closed and the next one showing up.
pub const REMINDER_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// What the reminder loop should do after a session is over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextStep {
    Rearmed,
    Exit,
}

/// Decides when reminders are shown. It's owned by the reminder loop and only ever mutated
/// there; the background timer it arms communicates back by posting [UiEvent::Trigger].
pub struct ReminderScheduler {
    is_showing: bool,
    enable_recurrence: bool,
    interval: Duration,
    trigger: mpsc::Sender<UiEvent>,
    clock: Arc<dyn Clock>,
    armed: Option<JoinHandle<()>>,
}

impl ReminderScheduler {
    pub fn new(
        trigger: mpsc::Sender<UiEvent>,
        clock: Arc<dyn Clock>,
        enable_recurrence: bool,
        interval: Duration,
    ) -> Self {
        Self {
            is_showing: false,
            enable_recurrence,
            interval,
            trigger,
            clock,
            armed: None,
        }
    }

    pub fn is_showing(&self) -> bool {
        self.is_showing
    }

    /// Whether a timer is armed and hasn't fired yet.
    pub fn is_armed(&self) -> bool {
        self.armed.as_ref().is_some_and(|timer| !timer.is_finished())
    }

    /// Shows the first reminder right away.
    pub fn start(&mut self) -> Option<ReminderSession> {
        info!(
            "Starting reminders, recurrence {}",
            if self.enable_recurrence { "enabled" } else { "disabled" }
        );
        self.trigger_reminder()
    }

    /// Returns a new session unless a reminder is already showing.
    pub fn trigger_reminder(&mut self) -> Option<ReminderSession> {
        if self.is_showing {
            debug!("Reminder already showing, ignoring trigger");
            return None;
        }
        self.is_showing = true;
        Some(ReminderSession::new(self.enable_recurrence))
    }

    /// Called once the prompt of the current session is gone.
    pub fn session_closed(&mut self) -> NextStep {
        self.is_showing = false;
        if self.enable_recurrence {
            self.schedule_next();
            NextStep::Rearmed
        } else {
            info!("Single reminder finished");
            NextStep::Exit
        }
    }

    /// Arms a one-shot timer that triggers the next reminder after the interval. Firings missed
    /// while the process was suspended are not made up for.
    pub fn schedule_next(&mut self) {
        if let Some(previous) = self.armed.take() {
            previous.abort();
        }

        let clock = self.clock.clone();
        let trigger = self.trigger.clone();
        let interval = self.interval;
        debug!("Next reminder in {interval:?}");
        self.armed = Some(tokio::spawn(async move {
            clock.sleep(interval).await;
            if trigger.send(UiEvent::Trigger).await.is_err() {
                warn!("Reminder loop is gone, dropping timer");
            }
        }));
    }
}

impl Drop for ReminderScheduler {
    fn drop(&mut self) {
        if let Some(timer) = self.armed.take() {
            timer.abort();
        }
    }
}
