use std::{sync::Arc, time::Duration};

use anyhow::Result;
use tokio::{sync::mpsc, time::Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, info_span, warn};

use crate::{storage::intake_store::IntakeStore, utils::clock::Clock, view::PromptView};

use super::{
    presenter::{PresenterState, ReminderPresenter},
    scheduler::{NextStep, ReminderScheduler},
    session::ReminderSession,
};

const TICK: Duration = Duration::from_secs(1);

/// Everything that can happen to the reminder loop from outside of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    /// The recurrence timer fired.
    Trigger,
    /// The user confirmed a line of input.
    Submit(String),
    CloseRequested,
    /// Input reached its end, so nothing can answer a reminder anymore.
    InputClosed,
}

struct ActiveReminder {
    presenter: ReminderPresenter,
    next_tick: Instant,
}

enum Step {
    Shutdown,
    Event(Option<UiEvent>),
    Tick,
}

/// The single thread that owns the prompt. Timer firings and user input arrive as [UiEvent]s and
/// the countdown is driven by one second deadlines, so every state change happens here.
pub struct ReminderLoop<S, V> {
    receiver: mpsc::Receiver<UiEvent>,
    scheduler: ReminderScheduler,
    store: S,
    view: V,
    clock: Arc<dyn Clock>,
    shutdown: CancellationToken,
    active: Option<ActiveReminder>,
}

impl<S: IntakeStore, V: PromptView> ReminderLoop<S, V> {
    pub fn new(
        receiver: mpsc::Receiver<UiEvent>,
        scheduler: ReminderScheduler,
        store: S,
        view: V,
        clock: Arc<dyn Clock>,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            receiver,
            scheduler,
            store,
            view,
            clock,
            shutdown,
            active: None,
        }
    }

    /// Shows the first reminder and processes events until single reminder mode is done or the
    /// loop is shut down.
    pub async fn run(mut self) -> Result<()> {
        if let Some(session) = self.scheduler.start() {
            self.open(session);
        }

        loop {
            let countdown_deadline = self
                .active
                .as_ref()
                .filter(|active| matches!(active.presenter.state(), PresenterState::Countdown(_)))
                .map(|active| active.next_tick);

            // The sleep is only polled while counting down, but select! still builds it.
            let deadline = countdown_deadline.unwrap_or_else(|| self.clock.instant());
            let step = tokio::select! {
                _ = self.shutdown.cancelled() => Step::Shutdown,
                event = self.receiver.recv() => Step::Event(event),
                _ = self.clock.sleep_until(deadline), if countdown_deadline.is_some() => Step::Tick,
            };

            match step {
                Step::Shutdown => {
                    info!("Shutting down reminder loop");
                    self.close_active();
                    return Ok(());
                }
                Step::Event(None) => {
                    warn!("Event queue closed, stopping reminder loop");
                    return Ok(());
                }
                Step::Event(Some(event)) => {
                    if !self.handle(event) {
                        self.close_active();
                        return Ok(());
                    }
                }
                Step::Tick => self.tick(),
            }

            let closed = self
                .active
                .as_ref()
                .is_some_and(|active| active.presenter.state() == PresenterState::Closed);
            if closed {
                self.active = None;
                if self.scheduler.session_closed() == NextStep::Exit {
                    return Ok(());
                }
            }
        }
    }

    fn open(&mut self, session: ReminderSession) {
        let _span = info_span!("Opening reminder").entered();
        let presenter =
            ReminderPresenter::open(session, &mut self.view, &self.store, self.clock.as_ref());
        self.active = Some(ActiveReminder {
            presenter,
            next_tick: self.clock.instant() + TICK,
        });
    }

    /// Returns false once the loop should stop.
    fn handle(&mut self, event: UiEvent) -> bool {
        debug!("Handling event {:?}", event);
        match event {
            UiEvent::Trigger => {
                if let Some(session) = self.scheduler.trigger_reminder() {
                    self.open(session);
                }
            }
            UiEvent::Submit(input) => match self.active.as_mut() {
                Some(active) => {
                    if let Ok(record) = active.presenter.submit(&input, &mut self.view, &self.store)
                    {
                        info!("Recorded {} ml", record.amount);
                    }
                }
                None => debug!("No reminder showing, dropping input {input:?}"),
            },
            UiEvent::CloseRequested => {
                if let Some(active) = self.active.as_mut() {
                    active.presenter.request_close(&mut self.view);
                }
            }
            UiEvent::InputClosed => {
                warn!("Input closed, stopping reminder loop");
                return false;
            }
        }
        true
    }

    fn close_active(&mut self) {
        if let Some(mut active) = self.active.take() {
            active.presenter.request_close(&mut self.view);
        }
    }

    fn tick(&mut self) {
        if let Some(active) = self.active.as_mut() {
            active.next_tick += TICK;
            active.presenter.tick(&mut self.view, self.clock.as_ref());
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use anyhow::Result;
    use chrono::{
        DateTime, Duration as ChronoDuration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc,
    };
    use tokio::sync::mpsc;
    use tokio_util::sync::CancellationToken;

    use crate::{
        reminder::{create_loop, scheduler::REMINDER_INTERVAL, session::COUNTDOWN_SECONDS},
        storage::{
            entities::IntakeStats,
            intake_store::{IntakeStore, SqliteIntakeStore},
        },
        utils::{clock::test_clock::TestClock, logging::TEST_LOGGING},
        view::MockPromptView,
    };

    use super::{ReminderLoop, UiEvent};

    const TEST_START_DATE: NaiveDateTime =
        NaiveDateTime::new(NaiveDate::from_ymd_opt(2018, 7, 4).unwrap(), NaiveTime::MIN);

    fn noon() -> DateTime<Utc> {
        Utc.from_utc_datetime(&TEST_START_DATE) + ChronoDuration::hours(12)
    }

    fn long_ago() -> DateTime<Utc> {
        noon() - ChronoDuration::days(2)
    }

    fn create_test_loop<'a>(
        store: &'a SqliteIntakeStore,
        view: MockPromptView,
        clock: TestClock,
        enable_recurrence: bool,
        shutdown: &CancellationToken,
    ) -> (ReminderLoop<&'a SqliteIntakeStore, MockPromptView>, mpsc::Sender<UiEvent>) {
        let (sender, receiver) = mpsc::channel(10);
        let reminder_loop = create_loop(
            receiver,
            sender.clone(),
            store,
            view,
            clock,
            shutdown,
            enable_recurrence,
        );
        (reminder_loop, sender)
    }

    fn session_view(sessions: usize) -> MockPromptView {
        let mut view = MockPromptView::new();
        view.expect_open().times(sessions).return_const(());
        view.expect_render_countdown()
            .times(sessions * COUNTDOWN_SECONDS as usize)
            .return_const(());
        view.expect_show_input().times(sessions).return_const(());
        view.expect_close().times(sessions).return_const(());
        view
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_reminder_saves_and_exits() -> Result<()> {
        *TEST_LOGGING;
        let clock = TestClock::starting_at(noon());
        let store = SqliteIntakeStore::open_in_memory(Box::new(clock.clone()))?;
        store.ensure_schema()?;

        let mut view = session_view(1);
        view.expect_report_error().times(1).return_const(());

        let shutdown = CancellationToken::new();
        let (reminder_loop, sender) = create_test_loop(&store, view, clock, false, &shutdown);

        let (result, _) = tokio::join!(reminder_loop.run(), async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            // Neither of these does anything while counting down.
            sender.send(UiEvent::CloseRequested).await.unwrap();
            sender.send(UiEvent::Submit("100".into())).await.unwrap();
            sender.send(UiEvent::Trigger).await.unwrap();

            tokio::time::sleep(Duration::from_secs(26)).await;
            sender.send(UiEvent::Submit("lots".into())).await.unwrap();
            sender.send(UiEvent::Submit("250".into())).await.unwrap();
        });
        result?;

        assert_eq!(
            store.stats_since(long_ago())?,
            IntakeStats {
                count: 1,
                total_ml: 250
            }
        );
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn test_recurring_reminders_show_again_after_interval() -> Result<()> {
        *TEST_LOGGING;
        let clock = TestClock::starting_at(noon());
        let store = SqliteIntakeStore::open_in_memory(Box::new(clock.clone()))?;
        store.ensure_schema()?;

        let view = session_view(2);

        let shutdown = CancellationToken::new();
        let (reminder_loop, sender) = create_test_loop(&store, view, clock, true, &shutdown);

        let (result, _) = tokio::join!(reminder_loop.run(), async {
            tokio::time::sleep(Duration::from_secs(31)).await;
            sender.send(UiEvent::Submit("200".into())).await.unwrap();

            tokio::time::sleep(REMINDER_INTERVAL + Duration::from_secs(31)).await;
            sender.send(UiEvent::Submit("150".into())).await.unwrap();

            tokio::time::sleep(Duration::from_secs(1)).await;
            shutdown.cancel();
        });
        result?;

        assert_eq!(
            store.stats_since(long_ago())?,
            IntakeStats {
                count: 2,
                total_ml: 350
            }
        );
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn test_closing_without_amount_rearms() -> Result<()> {
        *TEST_LOGGING;
        let clock = TestClock::starting_at(noon());
        let store = SqliteIntakeStore::open_in_memory(Box::new(clock.clone()))?;
        store.ensure_schema()?;

        let view = session_view(2);
        let shutdown = CancellationToken::new();
        let (reminder_loop, sender) = create_test_loop(&store, view, clock, true, &shutdown);

        let (result, _) = tokio::join!(reminder_loop.run(), async {
            tokio::time::sleep(Duration::from_secs(31)).await;
            sender.send(UiEvent::CloseRequested).await.unwrap();

            // A trigger between reminders opens the next one early.
            tokio::time::sleep(Duration::from_secs(60)).await;
            sender.send(UiEvent::Trigger).await.unwrap();
            tokio::time::sleep(Duration::from_secs(31)).await;
            sender.send(UiEvent::CloseRequested).await.unwrap();

            tokio::time::sleep(Duration::from_secs(1)).await;
            shutdown.cancel();
        });
        result?;

        assert_eq!(store.stats_since(long_ago())?, IntakeStats::default());
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn test_input_closed_stops_recurring_loop() -> Result<()> {
        *TEST_LOGGING;
        let clock = TestClock::starting_at(noon());
        let store = SqliteIntakeStore::open_in_memory(Box::new(clock.clone()))?;
        store.ensure_schema()?;

        let view = session_view(1);
        let shutdown = CancellationToken::new();
        let (reminder_loop, sender) = create_test_loop(&store, view, clock, true, &shutdown);

        let (result, _) = tokio::join!(reminder_loop.run(), async {
            tokio::time::sleep(Duration::from_secs(40)).await;
            sender.send(UiEvent::InputClosed).await.unwrap();
        });
        result?;

        assert!(!shutdown.is_cancelled());
        assert_eq!(store.stats_since(long_ago())?, IntakeStats::default());
        Ok(())
    }
}
