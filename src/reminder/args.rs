use std::path::PathBuf;

use clap::Parser;
use tracing::level_filters::LevelFilter;

#[derive(Parser, Debug)]
#[command(name = "waterbreak", version, long_about = None)]
#[command(about = "Reminds you to drink water every hour and keeps a daily log")]
pub struct ReminderArgs {
    #[arg(long = "no-timer", help = "Show a single reminder and exit once it's closed")]
    pub no_timer: bool,
    #[arg(
        long,
        help = "Application directory. By default tries to save into $XDG_STATE_HOME or $HOME/.local/state"
    )]
    pub dir: Option<PathBuf>,
    /// This option is for debugging purposes only.
    #[arg(long = "log-console")]
    pub log_console: bool,
    #[arg(long = "log-filter")]
    pub log: Option<LevelFilter>,
}

impl ReminderArgs {
    pub fn enable_recurrence(&self) -> bool {
        !self.no_timer
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use tracing::level_filters::LevelFilter;

    use super::ReminderArgs;

    #[test]
    fn test_recurrence_is_on_by_default() {
        let args = ReminderArgs::parse_from(["waterbreak"]);
        assert!(args.enable_recurrence());
        assert!(args.dir.is_none());
        assert!(args.log.is_none());
    }

    #[test]
    fn test_no_timer_disables_recurrence() {
        let args = ReminderArgs::parse_from([
            "waterbreak",
            "--no-timer",
            "--dir",
            "/tmp/water",
            "--log-filter",
            "info",
        ]);
        assert!(!args.enable_recurrence());
        assert_eq!(args.dir.as_deref(), Some(std::path::Path::new("/tmp/water")));
        assert_eq!(args.log, Some(LevelFilter::INFO));
    }

    #[test]
    fn test_unknown_flags_are_rejected() {
        assert!(ReminderArgs::try_parse_from(["waterbreak", "--interval", "10"]).is_err());
    }
}
