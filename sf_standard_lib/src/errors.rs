use std::io;
use chrono::{Duration, NaiveDate, NaiveDateTime, Weekday};
use thiserror::Error;

/// Errors raised while building or querying exchange session calendars.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CalendarError {
    #[error("Invalid segment {start}-{end}: start must precede end and end must not pass 24:00:00")]
    InvalidSegment { start: String, end: String },

    #[error("Overlapping segments on {weekday}: {first} overlaps {second}")]
    OverlappingSegments {
        weekday: Weekday,
        first: String,
        second: String,
    },

    #[error("Duplicate schedule for {0}")]
    DuplicateWeekday(Weekday),

    #[error("No market open found within {days} days after {after}")]
    NoMarketOpen { after: NaiveDateTime, days: u32 },

    #[error("No market close found within {days} days after {after}")]
    NoMarketClose { after: NaiveDateTime, days: u32 },

    #[error("No trading day found within {days} days of {from}")]
    NoTradingDay { from: NaiveDate, days: u32 },

    #[error("Local time {local} can not be resolved in {time_zone}")]
    UnresolvableLocalTime { local: NaiveDateTime, time_zone: String },

    #[error("Invalid time of day: {0}")]
    InvalidTimeOfDay(String),

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Unknown time zone: {0}")]
    UnknownTimeZone(String),

    #[error("Date out of range after {0}")]
    DateOutOfRange(NaiveDateTime),
}

/// Errors raised by consolidators while bucketing data.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConsolidatorError {
    #[error("Out of order data for {symbol}: {time} precedes {last}")]
    OutOfOrder {
        symbol: String,
        time: NaiveDateTime,
        last: NaiveDateTime,
    },

    #[error("Symbol mismatch: consolidator for {expected} received {received}")]
    SymbolMismatch { expected: String, received: String },

    #[error("Bucket rule returned a non-positive period {period} for {time}")]
    InvalidPeriod { time: NaiveDateTime, period: Duration },

    #[error("Bucket {start} to {end} closes before data at {time}")]
    StaleWindow {
        time: NaiveDateTime,
        start: NaiveDateTime,
        end: NaiveDateTime,
    },

    #[error("Count consolidator requires a positive count")]
    InvalidCount,

    #[error(transparent)]
    Calendar(#[from] CalendarError),
}

#[derive(Debug, Error)]
pub enum SessionForgeError {
    #[error(transparent)]
    Calendar(#[from] CalendarError),

    #[error(transparent)]
    Consolidator(#[from] ConsolidatorError),

    #[error("IO error occurred: {0}")]
    Io(#[from] io::Error),

    #[error("TOML parsing error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Unknown symbol: {0}")]
    UnknownSymbol(String),

    #[error("Unknown consolidator: {0}")]
    UnknownConsolidator(u64),

    #[error("Strategy event receiver dropped")]
    ReceiverDropped,
}
