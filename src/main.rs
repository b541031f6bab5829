use anyhow::Result;
use clap::Parser;
use tracing::error;
use waterbreak::{
    reminder::{args::ReminderArgs, start_reminder},
    utils::{
        dir::{create_application_default_path, ensure_dir},
        logging::{enable_logging, LOG_PREFIX},
        runtime::single_thread_runtime,
    },
};

fn main() -> Result<()> {
    run(ReminderArgs::parse())
}

fn run(args: ReminderArgs) -> Result<()> {
    let enable_recurrence = args.enable_recurrence();
    let app_dir = args
        .dir
        .map_or_else(create_application_default_path, ensure_dir)?;
    enable_logging(LOG_PREFIX, &app_dir, args.log, args.log_console)?;

    single_thread_runtime()?
        .block_on(async move { start_reminder(app_dir, enable_recurrence).await })
        .inspect_err(|e| {
            error!("Error running reminder {e:?}");
        })
}
