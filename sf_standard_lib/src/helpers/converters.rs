use chrono::{DateTime, Datelike, Duration, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Timelike, Utc};
use chrono_tz::Tz;
use crate::errors::CalendarError;
use crate::standardized_types::resolution::Resolution;

/// Session offsets are stored as seconds since local midnight, this value encodes 24:00:00.
pub const SECONDS_PER_DAY: u32 = 86_400;

/// Seconds since midnight for a wall clock time, usable in const contexts.
pub const fn hms(hour: u32, minute: u32, second: u32) -> u32 {
    hour * 3600 + minute * 60 + second
}

pub fn day_start(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::default())
}

/// The local date time `offset` seconds after midnight of `date`, an offset of 24:00:00 is the next midnight.
pub fn at_offset(date: NaiveDate, offset: u32) -> NaiveDateTime {
    day_start(date) + Duration::seconds(offset as i64)
}

/// Whole seconds elapsed since local midnight, sub second precision is truncated.
pub fn seconds_of_day(time: &NaiveDateTime) -> u32 {
    time.time().num_seconds_from_midnight()
}

pub fn format_offset(offset: u32) -> String {
    format!(
        "{:02}:{:02}:{:02}",
        offset / 3600,
        (offset % 3600) / 60,
        offset % 60
    )
}

/// Parses `HH:MM` or `HH:MM:SS`, `24:00:00` is accepted as the end of the day.
pub fn parse_offset(value: &str) -> Result<u32, CalendarError> {
    let parts: Vec<&str> = value.trim().split(':').collect();
    if parts.len() < 2 || parts.len() > 3 {
        return Err(CalendarError::InvalidTimeOfDay(value.to_string()));
    }
    let mut numbers = [0u32; 3];
    for (index, part) in parts.iter().enumerate() {
        numbers[index] = part
            .parse::<u32>()
            .map_err(|_| CalendarError::InvalidTimeOfDay(value.to_string()))?;
    }
    let [hour, minute, second] = numbers;
    if minute > 59 || second > 59 {
        return Err(CalendarError::InvalidTimeOfDay(value.to_string()));
    }
    let offset = hms(hour, minute, second);
    if offset > SECONDS_PER_DAY {
        return Err(CalendarError::InvalidTimeOfDay(value.to_string()));
    }
    Ok(offset)
}

pub fn parse_date(value: &str) -> Result<NaiveDate, CalendarError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| CalendarError::InvalidDate(value.to_string()))
}

/// Resolve a local exchange time to utc.
/// Ambiguous times during fall back take the first occurrence, times skipped by spring forward move an hour later.
pub fn local_to_utc(time_zone: &Tz, local: NaiveDateTime) -> Result<DateTime<Utc>, CalendarError> {
    match time_zone.from_local_datetime(&local) {
        LocalResult::Single(dt) => Ok(dt.with_timezone(&Utc)),
        LocalResult::Ambiguous(earliest, _latest) => Ok(earliest.with_timezone(&Utc)),
        LocalResult::None => time_zone
            .from_local_datetime(&(local + Duration::hours(1)))
            .earliest()
            .map(|dt| dt.with_timezone(&Utc))
            .ok_or_else(|| CalendarError::UnresolvableLocalTime {
                local,
                time_zone: time_zone.name().to_string(),
            }),
    }
}

/// Convert utc time to local wall clock time, adjusting the actual hour
pub fn utc_to_local(time_zone: &Tz, utc_time: DateTime<Utc>) -> NaiveDateTime {
    utc_time.with_timezone(time_zone).naive_local()
}

/// Returns the open time for a bar of `resolution` containing `time`.
/// Intraday resolutions are aligned to local midnight, weeks start on monday.
pub fn open_time(resolution: &Resolution, time: NaiveDateTime) -> NaiveDateTime {
    let date = time.date();
    match resolution {
        Resolution::Seconds(_) | Resolution::Minutes(_) | Resolution::Hours(_) => {
            let step = resolution.as_seconds().max(1) as u32;
            let offset = seconds_of_day(&time);
            at_offset(date, offset - offset % step)
        }
        Resolution::Days(_) => day_start(date),
        Resolution::Weeks(_) => {
            let days_from_monday = date.weekday().num_days_from_monday() as i64;
            day_start(date - Duration::days(days_from_monday))
        }
    }
}

/// Returns the first day of the month following `date`.
pub fn next_month(date: NaiveDate) -> Option<NaiveDate> {
    if date.month() == 12 {
        NaiveDate::from_ymd_opt(date.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(date.year(), date.month() + 1, 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::America::New_York;

    fn datetime(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(h, min, s).unwrap()
    }

    #[test]
    fn test_parse_offset_accepts_end_of_day() {
        assert_eq!(parse_offset("09:30").unwrap(), hms(9, 30, 0));
        assert_eq!(parse_offset("16:15:30").unwrap(), hms(16, 15, 30));
        assert_eq!(parse_offset("24:00:00").unwrap(), SECONDS_PER_DAY);
        assert!(parse_offset("24:00:01").is_err());
        assert!(parse_offset("09:61").is_err());
        assert!(parse_offset("nine").is_err());
    }

    #[test]
    fn test_format_offset() {
        assert_eq!(format_offset(hms(16, 30, 0)), "16:30:00");
        assert_eq!(format_offset(SECONDS_PER_DAY), "24:00:00");
    }

    #[test]
    fn test_at_offset_end_of_day_is_next_midnight() {
        let date = NaiveDate::from_ymd_opt(2013, 10, 7).unwrap();
        assert_eq!(at_offset(date, SECONDS_PER_DAY), datetime(2013, 10, 8, 0, 0, 0));
    }

    #[test]
    fn test_local_to_utc_handles_dst_transitions() {
        // 2013-03-10 02:30 does not exist in New York
        let skipped = local_to_utc(&New_York, datetime(2013, 3, 10, 2, 30, 0)).unwrap();
        assert_eq!(skipped, Utc.with_ymd_and_hms(2013, 3, 10, 7, 30, 0).unwrap());

        // 2013-11-03 01:30 happens twice, the first is EDT
        let ambiguous = local_to_utc(&New_York, datetime(2013, 11, 3, 1, 30, 0)).unwrap();
        assert_eq!(ambiguous, Utc.with_ymd_and_hms(2013, 11, 3, 5, 30, 0).unwrap());
    }

    #[test]
    fn test_open_time_rounds_down() {
        let time = datetime(2013, 10, 9, 16, 47, 12);
        assert_eq!(open_time(&Resolution::Minutes(15), time), datetime(2013, 10, 9, 16, 45, 0));
        assert_eq!(open_time(&Resolution::Hours(4), time), datetime(2013, 10, 9, 16, 0, 0));
        assert_eq!(open_time(&Resolution::Days(1), time), datetime(2013, 10, 9, 0, 0, 0));
        assert_eq!(open_time(&Resolution::Weeks(1), time), datetime(2013, 10, 7, 0, 0, 0));
    }

    #[test]
    fn test_next_month_rolls_year() {
        let december = NaiveDate::from_ymd_opt(2013, 12, 14).unwrap();
        assert_eq!(next_month(december), NaiveDate::from_ymd_opt(2014, 1, 1));
    }
}
