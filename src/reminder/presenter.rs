use std::num::IntErrorKind;

use thiserror::Error;
use tracing::{debug, error, info, trace};

use crate::{
    storage::{
        entities::{IntakeRecord, IntakeStats},
        error::StorageError,
        intake_store::IntakeStore,
    },
    utils::{clock::Clock, time::local_day_start},
    view::PromptView,
};

use super::session::ReminderSession;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresenterState {
    /// Seconds left before input is accepted and the prompt can be closed.
    Countdown(u32),
    AwaitingInput,
    Closed,
}

/// Largest amount accepted for a single drink. Keeps daily sums far away from integer overflow.
pub const MAX_AMOUNT_ML: i64 = 5_000;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("'{0}' is not a whole number of milliliters")]
    NotANumber(String),
    #[error("'{0}' is far too large to be an amount of water")]
    OutOfRange(String),
    #[error("Amount must be positive, got {0}")]
    NotPositive(i64),
    #[error("Amount must be at most {max} ml, got {0}", max = MAX_AMOUNT_ML)]
    TooLarge(i64),
}

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("Input is not accepted in state {0:?}")]
    NotAccepting(PresenterState),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Couldn't save the record: {0}")]
    Storage(#[from] StorageError),
}

/// Parses an amount typed by the user. Only whole numbers between 1 and [MAX_AMOUNT_ML] are
/// accepted.
pub fn parse_amount(input: &str) -> Result<i64, ValidationError> {
    let input = input.trim();
    let amount = input.parse::<i64>().map_err(|e| match e.kind() {
        IntErrorKind::PosOverflow => ValidationError::OutOfRange(input.to_string()),
        IntErrorKind::NegOverflow => ValidationError::NotPositive(i64::MIN),
        _ => ValidationError::NotANumber(input.to_string()),
    })?;
    if amount <= 0 {
        return Err(ValidationError::NotPositive(amount));
    }
    if amount > MAX_AMOUNT_ML {
        return Err(ValidationError::TooLarge(amount));
    }
    Ok(amount)
}

/// Drives a single reminder: countdown, amount input, close. The view and store are passed into
/// each call so that the presenter itself only holds the session state.
#[derive(Debug)]
pub struct ReminderPresenter {
    session: ReminderSession,
    state: PresenterState,
}

impl ReminderPresenter {
    /// Shows the prompt along with today's intake and starts the countdown.
    pub fn open(
        session: ReminderSession,
        view: &mut impl PromptView,
        store: &impl IntakeStore,
        clock: &dyn Clock,
    ) -> Self {
        let cutoff = local_day_start(clock.time());
        let stats = store.stats_since(cutoff).unwrap_or_else(|e| {
            error!("Failed to load stats since {cutoff}: {e:?}");
            view.report_error(&format!("Couldn't load today's intake: {e}"));
            IntakeStats::default()
        });

        let now = clock.local_time();
        view.open(now, stats);

        let state = if session.countdown_remaining == 0 {
            view.show_input();
            PresenterState::AwaitingInput
        } else {
            view.render_countdown(now, session.countdown_remaining);
            PresenterState::Countdown(session.countdown_remaining)
        };
        info!("Opened reminder with {stats}");

        Self { session, state }
    }

    pub fn state(&self) -> PresenterState {
        self.state
    }

    pub fn session(&self) -> &ReminderSession {
        &self.session
    }

    /// Advances the countdown by one second. Does nothing outside of the countdown.
    pub fn tick(&mut self, view: &mut impl PromptView, clock: &dyn Clock) -> PresenterState {
        let PresenterState::Countdown(remaining) = self.state else {
            trace!("Tick in state {:?}", self.state);
            return self.state;
        };

        let remaining = remaining.saturating_sub(1);
        self.session.countdown_remaining = remaining;
        if remaining == 0 {
            debug!("Countdown finished");
            view.show_input();
            self.state = PresenterState::AwaitingInput;
        } else {
            view.render_countdown(clock.local_time(), remaining);
            self.state = PresenterState::Countdown(remaining);
        }
        self.state
    }

    /// Handles a confirmed amount. Problems are reported through the view and the prompt stays
    /// open so the user can correct them.
    pub fn submit(
        &mut self,
        input: &str,
        view: &mut impl PromptView,
        store: &impl IntakeStore,
    ) -> Result<IntakeRecord, SubmitError> {
        if self.state != PresenterState::AwaitingInput {
            debug!("Ignoring input {input:?} in state {:?}", self.state);
            return Err(SubmitError::NotAccepting(self.state));
        }

        let amount = parse_amount(input).inspect_err(|e| {
            info!("Rejected input {input:?}: {e}");
            view.report_error(&e.to_string());
        })?;

        let record = store.save(amount).map_err(|e| {
            error!("Failed to save {amount} ml: {e:?}");
            let e = SubmitError::from(e);
            view.report_error(&e.to_string());
            e
        })?;

        self.close(view);
        Ok(record)
    }

    /// Closes the prompt without recording anything. Returns whether the prompt is closed now;
    /// requests during the countdown are ignored.
    pub fn request_close(&mut self, view: &mut impl PromptView) -> bool {
        match self.state {
            PresenterState::Countdown(remaining) => {
                debug!("Close requested with {remaining} seconds left, ignoring");
                false
            }
            PresenterState::AwaitingInput => {
                self.close(view);
                true
            }
            PresenterState::Closed => true,
        }
    }

    fn close(&mut self, view: &mut impl PromptView) {
        view.close();
        self.state = PresenterState::Closed;
    }
}
