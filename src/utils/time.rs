use chrono::{DateTime, Local, NaiveTime, TimeZone, Utc};

/// Format used for the clock line on the prompt.
pub fn clock_display<Tz: TimeZone>(time: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    time.format("%H:%M:%S").to_string()
}

/// Returns the start of the day `date` falls in, in the timezone of `date`.
///
/// On days where midnight doesn't exist (DST jumps at 00:00) the earliest valid time of that day
/// is used instead.
pub fn day_start<Tz: TimeZone>(date: DateTime<Tz>) -> DateTime<Tz> {
    match date.with_time(NaiveTime::MIN).earliest() {
        Some(start) => start,
        None => {
            let timezone = date.timezone();
            let midnight = date.date_naive().and_time(NaiveTime::MIN);
            (0..24)
                .find_map(|hour| {
                    timezone
                        .from_local_datetime(&(midnight + chrono::Duration::hours(hour)))
                        .earliest()
                })
                .unwrap_or(date)
        }
    }
}

/// Start of the user's local day containing `now`, expressed in UTC. This is the cutoff for
/// "today" statistics.
pub fn local_day_start(now: DateTime<Utc>) -> DateTime<Utc> {
    day_start(now.with_timezone(&Local)).with_timezone(&Utc)
}
