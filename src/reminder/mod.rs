use std::{path::PathBuf, sync::Arc};

use anyhow::Result;
use event_loop::{ReminderLoop, UiEvent};
use scheduler::{ReminderScheduler, REMINDER_INTERVAL};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::error;

use crate::{
    storage::intake_store::{IntakeStore, SqliteIntakeStore, DATABASE_FILE},
    utils::clock::{Clock, DefaultClock},
    view::{input::spawn_stdin_reader, terminal::TerminalView, PromptView},
};

pub mod args;
pub mod event_loop;
pub mod presenter;
pub mod scheduler;
pub mod session;
pub mod shutdown;

/// Represents the starting point for the reminder. Shows a reminder right away and, when
/// recurrence is enabled, keeps running until Ctrl-C.
pub async fn start_reminder(dir: PathBuf, enable_recurrence: bool) -> Result<()> {
    let (sender, receiver) = mpsc::channel::<UiEvent>(16);
    let store = SqliteIntakeStore::open(&dir.join(DATABASE_FILE), Box::new(DefaultClock))?;
    let mut view = TerminalView::stdout();

    prepare_store(&store, &mut view);

    spawn_stdin_reader(sender.clone())?;

    let shutdown_token = CancellationToken::new();
    let reminder_loop = create_loop(
        receiver,
        sender,
        store,
        view,
        DefaultClock,
        &shutdown_token,
        enable_recurrence,
    );

    let (result, _) = tokio::join!(
        async {
            let result = reminder_loop.run().await;
            shutdown_token.cancel();
            result
        },
        shutdown::detect_shutdown(shutdown_token.clone()),
    );

    result.inspect_err(|e| error!("Reminder loop got an error {e:?}"))
}

/// Makes sure the intake table exists. A failure is shown to the user but isn't fatal; every save
/// afterwards reports its own error.
pub fn prepare_store(store: &impl IntakeStore, view: &mut impl PromptView) {
    if let Err(e) = store.ensure_schema() {
        error!("Failed to prepare intake table {e:?}");
        view.report_error(&format!("Couldn't prepare the intake log: {e}"));
    }
}

pub fn create_loop<S: IntakeStore, V: PromptView>(
    receiver: mpsc::Receiver<UiEvent>,
    sender: mpsc::Sender<UiEvent>,
    store: S,
    view: V,
    clock: impl Clock,
    shutdown_token: &CancellationToken,
    enable_recurrence: bool,
) -> ReminderLoop<S, V> {
    let clock: Arc<dyn Clock> = Arc::new(clock);
    let scheduler =
        ReminderScheduler::new(sender, clock.clone(), enable_recurrence, REMINDER_INTERVAL);
    ReminderLoop::new(
        receiver,
        scheduler,
        store,
        view,
        clock,
        shutdown_token.clone(),
    )
}
