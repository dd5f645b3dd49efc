use chrono::{DateTime, NaiveDateTime, Utc};
use chrono_tz::Tz;
use crate::errors::CalendarError;
use crate::helpers::converters::local_to_utc;
use crate::standardized_types::new_types::{Price, Volume};
use crate::standardized_types::subscriptions::Symbol;

/// Properties consolidators need from a data point.
/// Times are exchange local wall clock times.
pub trait BaseData {
    fn symbol(&self) -> &Symbol;

    /// The time the data point opened.
    fn time(&self) -> NaiveDateTime;

    /// The time the data point closed, equal to `time` for instantaneous data.
    fn end_time(&self) -> NaiveDateTime;

    fn open(&self) -> Price;
    fn high(&self) -> Price;
    fn low(&self) -> Price;
    fn close(&self) -> Price;
    fn volume(&self) -> Volume;

    /// The close resolved to utc in the exchange time zone.
    fn end_time_utc(&self, time_zone: &Tz) -> Result<DateTime<Utc>, CalendarError> {
        local_to_utc(time_zone, self.end_time())
    }
}
