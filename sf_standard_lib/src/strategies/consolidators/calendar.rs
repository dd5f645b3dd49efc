use std::sync::Arc;
use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};
use crate::errors::CalendarError;
use crate::helpers::converters::{day_start, next_month};
use crate::standardized_types::market_hours::SecurityExchangeHours;

/// A bucket window, `[start, start + period)` in exchange local time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CalendarInfo {
    pub start: NaiveDateTime,
    pub period: Duration,
}

impl CalendarInfo {
    pub fn new(start: NaiveDateTime, period: Duration) -> Self {
        CalendarInfo { start, period }
    }

    pub fn from_span(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        CalendarInfo { start, period: end - start }
    }

    pub fn end(&self) -> NaiveDateTime {
        self.start + self.period
    }
}

/// Maps an observation time to the window containing it.
pub type CalendarFn = Box<dyn Fn(NaiveDateTime) -> Result<CalendarInfo, CalendarError> + Send + Sync>;

pub fn daily(time: NaiveDateTime) -> Result<CalendarInfo, CalendarError> {
    Ok(CalendarInfo::new(day_start(time.date()), Duration::days(1)))
}

/// Weeks start on monday.
pub fn weekly(time: NaiveDateTime) -> Result<CalendarInfo, CalendarError> {
    let date = time.date();
    let monday = date - Duration::days(date.weekday().num_days_from_monday() as i64);
    Ok(CalendarInfo::new(day_start(monday), Duration::weeks(1)))
}

pub fn monthly(time: NaiveDateTime) -> Result<CalendarInfo, CalendarError> {
    let first = first_of_month(time, time.month())?;
    let next = next_month(first).ok_or(CalendarError::DateOutOfRange(time))?;
    Ok(CalendarInfo::from_span(day_start(first), day_start(next)))
}

pub fn quarterly(time: NaiveDateTime) -> Result<CalendarInfo, CalendarError> {
    let quarter_month = (time.month() - 1) / 3 * 3 + 1;
    let first = first_of_month(time, quarter_month)?;
    let mut end = first;
    for _ in 0..3 {
        end = next_month(end).ok_or(CalendarError::DateOutOfRange(time))?;
    }
    Ok(CalendarInfo::from_span(day_start(first), day_start(end)))
}

pub fn yearly(time: NaiveDateTime) -> Result<CalendarInfo, CalendarError> {
    let first = NaiveDate::from_ymd_opt(time.year(), 1, 1).ok_or(CalendarError::DateOutOfRange(time))?;
    let next = NaiveDate::from_ymd_opt(time.year() + 1, 1, 1).ok_or(CalendarError::DateOutOfRange(time))?;
    Ok(CalendarInfo::from_span(day_start(first), day_start(next)))
}

fn first_of_month(time: NaiveDateTime, month: u32) -> Result<NaiveDate, CalendarError> {
    NaiveDate::from_ymd_opt(time.year(), month, 1).ok_or(CalendarError::DateOutOfRange(time))
}

/// One window per trading session: from the next market open after the observation to the close that follows it.
pub fn market_session(hours: Arc<SecurityExchangeHours>, extended_market_hours: bool) -> CalendarFn {
    Box::new(move |time: NaiveDateTime| {
        let start = hours.get_next_market_open(time, extended_market_hours)?;
        let end = hours.get_next_market_close(start, extended_market_hours)?;
        Ok(CalendarInfo::from_span(start, end))
    })
}
