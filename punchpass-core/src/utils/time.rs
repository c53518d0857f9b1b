// File: punchpass-core/src/utils/time.rs

use chrono::{DateTime, Days, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

use crate::Error;

/// UTC bounds `[start, end)` of the calendar day containing `now` in
/// the given IANA timezone.
pub fn local_day_bounds(
    tz_name: &str,
    now: DateTime<Utc>,
) -> Result<(DateTime<Utc>, DateTime<Utc>), Error> {
    let tz: Tz = tz_name
        .parse()
        .map_err(|_| Error::Timezone(format!("unrecognized timezone '{tz_name}'")))?;

    let day = now.with_timezone(&tz).date_naive();
    let next = day
        .checked_add_days(Days::new(1))
        .ok_or_else(|| Error::Timezone(format!("no day after {day}")))?;

    Ok((local_midnight(tz, day)?, local_midnight(tz, next)?))
}

fn local_midnight(tz: Tz, day: NaiveDate) -> Result<DateTime<Utc>, Error> {
    let naive = day.and_time(NaiveTime::MIN);
    // a DST jump can skip midnight entirely; fall forward one hour
    tz.from_local_datetime(&naive)
        .earliest()
        .or_else(|| {
            tz.from_local_datetime(&(naive + Duration::hours(1)))
                .earliest()
        })
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| Error::Timezone(format!("no valid midnight on {day} in {tz}")))
}
