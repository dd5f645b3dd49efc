use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use ahash::AHashMap;
use chrono::Weekday;
use chrono_tz::Tz;
use serde_derive::{Deserialize, Serialize};
use crate::errors::{CalendarError, SessionForgeError};
use crate::helpers::converters::{format_offset, parse_date, parse_offset};
use crate::standardized_types::enums::MarketType;
use crate::standardized_types::market_hours::{LocalMarketHours, MarketHoursSegment, MarketHoursState, SecurityExchangeHours};

pub mod product_trading_hours;

/// Entries keyed this way apply to every symbol of a market type.
pub const WILDCARD_SYMBOL: &str = "*";

/// The database key for a symbol root, eg: `futures-cme-ES`
pub fn hours_key(market_type: &MarketType, symbol: &str) -> String {
    format!("{}-{}", market_type.code(), symbol)
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct SegmentEntry {
    pub state: MarketHoursState,
    /// `HH:MM[:SS]`, local exchange time.
    pub start: String,
    /// `HH:MM[:SS]`, `24:00:00` runs to midnight.
    pub end: String,
}

/// The serialized form of a [`SecurityExchangeHours`].
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct MarketHoursEntry {
    pub time_zone: String,
    #[serde(default)]
    pub monday: Vec<SegmentEntry>,
    #[serde(default)]
    pub tuesday: Vec<SegmentEntry>,
    #[serde(default)]
    pub wednesday: Vec<SegmentEntry>,
    #[serde(default)]
    pub thursday: Vec<SegmentEntry>,
    #[serde(default)]
    pub friday: Vec<SegmentEntry>,
    #[serde(default)]
    pub saturday: Vec<SegmentEntry>,
    #[serde(default)]
    pub sunday: Vec<SegmentEntry>,
    /// `YYYY-MM-DD`
    #[serde(default)]
    pub holidays: Vec<String>,
    /// `YYYY-MM-DD` to `HH:MM[:SS]`
    #[serde(default)]
    pub early_closes: BTreeMap<String, String>,
    #[serde(default)]
    pub late_opens: BTreeMap<String, String>,
}

impl MarketHoursEntry {
    fn days(&self) -> [(Weekday, &Vec<SegmentEntry>); 7] {
        [
            (Weekday::Mon, &self.monday),
            (Weekday::Tue, &self.tuesday),
            (Weekday::Wed, &self.wednesday),
            (Weekday::Thu, &self.thursday),
            (Weekday::Fri, &self.friday),
            (Weekday::Sat, &self.saturday),
            (Weekday::Sun, &self.sunday),
        ]
    }

    pub fn to_exchange_hours(&self) -> Result<SecurityExchangeHours, CalendarError> {
        let time_zone: Tz = self
            .time_zone
            .parse()
            .map_err(|_| CalendarError::UnknownTimeZone(self.time_zone.clone()))?;

        let mut days = Vec::with_capacity(7);
        for (weekday, entries) in self.days() {
            let mut segments = Vec::with_capacity(entries.len());
            for entry in entries {
                segments.push(MarketHoursSegment::new(entry.state, parse_offset(&entry.start)?, parse_offset(&entry.end)?));
            }
            days.push(LocalMarketHours::new(weekday, segments)?);
        }

        let holidays = self
            .holidays
            .iter()
            .map(|date| parse_date(date))
            .collect::<Result<Vec<_>, _>>()?;

        let mut hours = SecurityExchangeHours::new(time_zone, days, holidays, AHashMap::new(), AHashMap::new())?;
        for (date, time) in &self.early_closes {
            hours.add_early_close(parse_date(date)?, offset_to_time(date, parse_offset(time)?)?);
        }
        for (date, time) in &self.late_opens {
            hours.add_late_open(parse_date(date)?, offset_to_time(date, parse_offset(time)?)?);
        }
        Ok(hours)
    }

    pub fn from_exchange_hours(hours: &SecurityExchangeHours) -> Self {
        let segments_of = |weekday: Weekday| -> Vec<SegmentEntry> {
            hours
                .weekly_hours(weekday)
                .segments()
                .iter()
                .map(|segment| SegmentEntry {
                    state: segment.state,
                    start: format_offset(segment.start),
                    end: format_offset(segment.end),
                })
                .collect()
        };
        let mut holidays: Vec<String> = hours.holidays().map(|date| date.format("%Y-%m-%d").to_string()).collect();
        holidays.sort();
        MarketHoursEntry {
            time_zone: hours.time_zone.name().to_string(),
            monday: segments_of(Weekday::Mon),
            tuesday: segments_of(Weekday::Tue),
            wednesday: segments_of(Weekday::Wed),
            thursday: segments_of(Weekday::Thu),
            friday: segments_of(Weekday::Fri),
            saturday: segments_of(Weekday::Sat),
            sunday: segments_of(Weekday::Sun),
            holidays,
            early_closes: hours
                .early_closes()
                .map(|(date, offset)| (date.format("%Y-%m-%d").to_string(), format_offset(offset)))
                .collect(),
            late_opens: hours
                .late_opens()
                .map(|(date, offset)| (date.format("%Y-%m-%d").to_string(), format_offset(offset)))
                .collect(),
        }
    }
}

// Early closes and late opens are wall clock times, 24:00 is not one.
fn offset_to_time(date: &str, offset: u32) -> Result<chrono::NaiveTime, CalendarError> {
    chrono::NaiveTime::from_num_seconds_from_midnight_opt(offset, 0)
        .ok_or_else(|| CalendarError::InvalidTimeOfDay(format!("{} on {}", format_offset(offset), date)))
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct MarketHoursFile {
    pub entries: BTreeMap<String, MarketHoursEntry>,
}

/// Exchange hours by `market-symbol` key, eg: `futures-cme-ES` or `equities-*`.
#[derive(Clone, Debug, Default)]
pub struct MarketHoursDatabase {
    entries: AHashMap<String, SecurityExchangeHours>,
}

impl MarketHoursDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    /// The calendars shipped with the library.
    pub fn with_builtin() -> Self {
        let entries = product_trading_hours::TRADING_HOURS
            .iter()
            .map(|(key, hours)| (key.clone(), (*hours).clone()))
            .collect();
        MarketHoursDatabase { entries }
    }

    pub fn from_json_str(json: &str) -> Result<Self, SessionForgeError> {
        let file: MarketHoursFile = serde_json::from_str(json)?;
        let mut entries = AHashMap::with_capacity(file.entries.len());
        for (key, entry) in file.entries {
            entries.insert(key, entry.to_exchange_hours()?);
        }
        Ok(MarketHoursDatabase { entries })
    }

    pub fn from_file(path: &Path) -> Result<Self, SessionForgeError> {
        let json = fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// The built in calendars overridden by the entries of `path`, when that file exists.
    pub fn load(path: &Path) -> Result<Self, SessionForgeError> {
        let mut database = Self::with_builtin();
        if path.exists() {
            log::info!("Loading market hours from: {:?}", path);
            database.extend(Self::from_file(path)?);
        }
        Ok(database)
    }

    pub fn to_json_string(&self) -> Result<String, SessionForgeError> {
        let file = MarketHoursFile {
            entries: self
                .entries
                .iter()
                .map(|(key, hours)| (key.clone(), MarketHoursEntry::from_exchange_hours(hours)))
                .collect(),
        };
        Ok(serde_json::to_string_pretty(&file)?)
    }

    pub fn extend(&mut self, other: MarketHoursDatabase) {
        self.entries.extend(other.entries);
    }

    pub fn insert(&mut self, market_type: &MarketType, symbol: &str, hours: SecurityExchangeHours) {
        self.entries.insert(hours_key(market_type, symbol), hours);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The exact symbol entry, falling back to the wildcard entry of the market type.
    pub fn get(&self, market_type: &MarketType, symbol: &str) -> Result<&SecurityExchangeHours, SessionForgeError> {
        self.entries
            .get(&hours_key(market_type, symbol))
            .or_else(|| self.entries.get(&hours_key(market_type, WILDCARD_SYMBOL)))
            .ok_or_else(|| SessionForgeError::UnknownSymbol(hours_key(market_type, symbol)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use crate::standardized_types::enums::Exchange;

    const JSON: &str = r#"{
        "entries": {
            "futures-eurex-*": {
                "time_zone": "Europe/Berlin",
                "monday": [{ "state": "market", "start": "08:00", "end": "22:00" }],
                "holidays": ["2013-12-24"],
                "early_closes": { "2013-12-31": "14:00" }
            },
            "futures-eurex-FDAX": {
                "time_zone": "Europe/Berlin",
                "monday": [
                    { "state": "pre_market", "start": "01:10", "end": "08:00" },
                    { "state": "market", "start": "08:00", "end": "22:00" }
                ]
            }
        }
    }"#;

    #[test]
    fn test_exact_entry_wins_over_wildcard() {
        let database = MarketHoursDatabase::from_json_str(JSON).unwrap();
        let eurex = MarketType::Futures(Exchange::EUREX);
        assert_eq!(database.len(), 2);

        let fdax = database.get(&eurex, "FDAX").unwrap();
        assert_eq!(fdax.weekly_hours(Weekday::Mon).segments().len(), 2);

        let fesx = database.get(&eurex, "FESX").unwrap();
        assert_eq!(fesx.time_zone, chrono_tz::Europe::Berlin);
        assert!(fesx.is_holiday(NaiveDate::from_ymd_opt(2013, 12, 24).unwrap()));
        assert_eq!(fesx.early_close(NaiveDate::from_ymd_opt(2013, 12, 31).unwrap()), Some(14 * 3600));

        let missing = database.get(&MarketType::Futures(Exchange::CME), "ES");
        assert!(matches!(missing, Err(SessionForgeError::UnknownSymbol(key)) if key == "futures-cme-ES"));
    }

    #[test]
    fn test_invalid_entries_are_rejected() {
        let bad_zone = r#"{ "entries": { "futures-cme-ES": { "time_zone": "Mars/Olympus" } } }"#;
        assert!(matches!(
            MarketHoursDatabase::from_json_str(bad_zone),
            Err(SessionForgeError::Calendar(CalendarError::UnknownTimeZone(_)))
        ));

        let overlapping = r#"{ "entries": { "futures-cme-ES": {
            "time_zone": "America/New_York",
            "monday": [
                { "state": "market", "start": "09:30", "end": "16:15" },
                { "state": "post_market", "start": "16:00", "end": "17:00" }
            ]
        } } }"#;
        assert!(MarketHoursDatabase::from_json_str(overlapping).is_err());
        assert!(matches!(MarketHoursDatabase::from_json_str("{"), Err(SessionForgeError::Json(_))));
    }

    #[test]
    fn test_builtin_calendars_survive_json() {
        let builtin = MarketHoursDatabase::with_builtin();
        let json = builtin.to_json_string().unwrap();
        let reloaded = MarketHoursDatabase::from_json_str(&json).unwrap();
        assert_eq!(reloaded.len(), builtin.len());

        let es = MarketType::Futures(Exchange::CME);
        let original = builtin.get(&es, "ES").unwrap();
        let parsed = reloaded.get(&es, "ES").unwrap();
        let after = NaiveDate::from_ymd_opt(2013, 11, 28).unwrap().and_hms_opt(8, 0, 0).unwrap();
        assert_eq!(
            original.get_next_market_close(after, false).unwrap(),
            parsed.get_next_market_close(after, false).unwrap()
        );
    }

    #[test]
    fn test_load_without_file_uses_builtin() {
        let dir = tempfile::tempdir().unwrap();
        let database = MarketHoursDatabase::load(&dir.path().join("missing.json")).unwrap();
        assert!(database.get(&MarketType::Equities, "AAPL").is_ok());

        let path = dir.path().join("market_hours_database.json");
        fs::write(&path, JSON).unwrap();
        let database = MarketHoursDatabase::load(&path).unwrap();
        assert!(database.get(&MarketType::Futures(Exchange::EUREX), "FESX").is_ok());
        assert!(database.get(&MarketType::Futures(Exchange::CME), "ES").is_ok());
    }
}
