//! Time-based rollover schedule

use chrono::{DateTime, Duration, Local, NaiveDate, NaiveTime, TimeZone, Utc};

use crate::domain::RolloverWhen;

/// First scheduled rollover strictly after `now`.
///
/// `Midnight` rolls at the next day boundary (UTC or local) and then every
/// `interval` days; the other units add `interval` units to `now`.
pub fn next_rollover(
    now: DateTime<Utc>,
    when: RolloverWhen,
    interval: u32,
    utc: bool,
) -> DateTime<Utc> {
    let interval = i64::from(interval.max(1));
    match when {
        RolloverWhen::Seconds => now + Duration::seconds(interval),
        RolloverWhen::Minutes => now + Duration::minutes(interval),
        RolloverWhen::Hours => now + Duration::hours(interval),
        RolloverWhen::Days => now + Duration::days(interval),
        RolloverWhen::Midnight => next_day_boundary(now, utc) + Duration::days(interval - 1),
    }
}

fn next_day_boundary(now: DateTime<Utc>, utc: bool) -> DateTime<Utc> {
    if utc {
        let tomorrow = following_day(now.date_naive());
        Utc.from_utc_datetime(&tomorrow.and_time(NaiveTime::MIN))
    } else {
        let local = now.with_timezone(&Local);
        let midnight = following_day(local.date_naive()).and_time(NaiveTime::MIN);
        // A DST gap can swallow local midnight; fall back to the UTC reading
        Local
            .from_local_datetime(&midnight)
            .earliest()
            .map(|t| t.with_timezone(&Utc))
            .unwrap_or_else(|| Utc.from_utc_datetime(&midnight))
    }
}

fn following_day(date: NaiveDate) -> NaiveDate {
    date.succ_opt().unwrap_or(NaiveDate::MAX)
}
