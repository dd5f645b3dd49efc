//! Exchange trading calendars.
//!
//! Every query takes and returns exchange local wall clock times ([`NaiveDateTime`]); the
//! `_utc` wrappers convert at the edges using the exchange time zone.
//!
//! A trading day is a sorted list of [`MarketHoursSegment`]s, each holding an offset in
//! seconds since local midnight. A segment ending at 24:00:00 followed by a segment starting
//! at 00:00:00 on the next day is a single overnight session: it is not re-opened at
//! midnight and it does not close there.
use std::borrow::Cow;
use std::fmt;
use ahash::{AHashMap, AHashSet};
use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Utc, Weekday};
use chrono_tz::Tz;
use serde_derive::{Deserialize, Serialize};
use strum_macros::Display;
use crate::errors::CalendarError;
use crate::helpers::converters::{at_offset, format_offset, local_to_utc, seconds_of_day, utc_to_local, SECONDS_PER_DAY};

/// Upper bound of local days searched for the next open or close.
pub const MAX_SEARCH_DAYS: u32 = 15;

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, Display)]
#[serde(rename_all = "snake_case")]
pub enum MarketHoursState {
    Closed,
    PreMarket,
    Market,
    PostMarket,
}

impl MarketHoursState {
    /// Pre and post market only count as trading when extended market hours are requested.
    pub fn is_trading(&self, extended_market_hours: bool) -> bool {
        match self {
            MarketHoursState::Closed => false,
            MarketHoursState::Market => true,
            MarketHoursState::PreMarket | MarketHoursState::PostMarket => extended_market_hours,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MarketHoursSegment {
    pub state: MarketHoursState,
    /// Seconds since local midnight, inclusive.
    pub start: u32,
    /// Seconds since local midnight, exclusive. `SECONDS_PER_DAY` runs to midnight.
    pub end: u32,
}

impl MarketHoursSegment {
    pub const fn new(state: MarketHoursState, start: u32, end: u32) -> Self {
        MarketHoursSegment { state, start, end }
    }

    pub const fn pre_market(start: u32, end: u32) -> Self {
        Self::new(MarketHoursState::PreMarket, start, end)
    }

    pub const fn market(start: u32, end: u32) -> Self {
        Self::new(MarketHoursState::Market, start, end)
    }

    pub const fn post_market(start: u32, end: u32) -> Self {
        Self::new(MarketHoursState::PostMarket, start, end)
    }

    pub fn contains(&self, offset: u32) -> bool {
        offset >= self.start && offset < self.end
    }

    pub fn runs_to_midnight(&self) -> bool {
        self.end == SECONDS_PER_DAY
    }

    pub fn duration(&self) -> Duration {
        Duration::seconds((self.end - self.start) as i64)
    }
}

impl fmt::Display for MarketHoursSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}-{}", self.state, format_offset(self.start), format_offset(self.end))
    }
}

/// The trading segments of a single weekday. Closed periods are the gaps between segments.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LocalMarketHours {
    pub weekday: Weekday,
    segments: Vec<MarketHoursSegment>,
}

impl LocalMarketHours {
    /// Sorts and validates `segments`. Explicitly closed segments are dropped.
    pub fn new(weekday: Weekday, mut segments: Vec<MarketHoursSegment>) -> Result<Self, CalendarError> {
        segments.retain(|segment| segment.state != MarketHoursState::Closed);
        for segment in &segments {
            if segment.start >= segment.end || segment.end > SECONDS_PER_DAY {
                return Err(CalendarError::InvalidSegment {
                    start: format_offset(segment.start),
                    end: format_offset(segment.end),
                });
            }
        }
        segments.sort_by_key(|segment| segment.start);
        for pair in segments.windows(2) {
            if pair[0].end > pair[1].start {
                return Err(CalendarError::OverlappingSegments {
                    weekday,
                    first: pair[0].to_string(),
                    second: pair[1].to_string(),
                });
            }
        }
        Ok(LocalMarketHours { weekday, segments })
    }

    /// For segments already known to be sorted and disjoint, as with the built in product maps
    /// and schedules derived from a validated one.
    pub(crate) fn from_sorted(weekday: Weekday, segments: Vec<MarketHoursSegment>) -> Self {
        debug_assert!(segments.windows(2).all(|pair| pair[0].end <= pair[1].start));
        LocalMarketHours { weekday, segments }
    }

    pub fn closed_all_day(weekday: Weekday) -> Self {
        LocalMarketHours {
            weekday,
            segments: Vec::new(),
        }
    }

    /// A single regular session covering the whole day.
    pub fn open_all_day(weekday: Weekday) -> Self {
        Self::from_sorted(weekday, vec![MarketHoursSegment::market(0, SECONDS_PER_DAY)])
    }

    pub fn segments(&self) -> &[MarketHoursSegment] {
        &self.segments
    }

    pub fn is_closed_all_day(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn has_market_segment(&self) -> bool {
        self.segments.iter().any(|segment| segment.state == MarketHoursState::Market)
    }

    pub fn is_open(&self, offset: u32, extended_market_hours: bool) -> bool {
        self.segments
            .iter()
            .any(|segment| segment.state.is_trading(extended_market_hours) && segment.contains(offset))
    }

    pub fn first_trading_segment(&self, extended_market_hours: bool) -> Option<&MarketHoursSegment> {
        self.segments.iter().find(|segment| segment.state.is_trading(extended_market_hours))
    }

    pub fn last_trading_segment(&self, extended_market_hours: bool) -> Option<&MarketHoursSegment> {
        self.segments.iter().rev().find(|segment| segment.state.is_trading(extended_market_hours))
    }

    /// Total duration of the regular (non extended) segments.
    pub fn market_duration(&self) -> Duration {
        self.segments
            .iter()
            .filter(|segment| segment.state == MarketHoursState::Market)
            .fold(Duration::zero(), |total, segment| total + segment.duration())
    }

    /// Start of the first session opening strictly after `after`, or from midnight when `after` is `None`.
    /// A trading segment beginning exactly where the previous trading segment ended continues that
    /// session and is not an open.
    pub(crate) fn market_open(
        &self,
        after: Option<u32>,
        extended_market_hours: bool,
        continues_from_previous_day: bool,
    ) -> Option<u32> {
        let mut previous_end = continues_from_previous_day.then_some(0);
        for segment in &self.segments {
            if !segment.state.is_trading(extended_market_hours) {
                previous_end = None;
                continue;
            }
            let is_continuation = previous_end == Some(segment.start);
            previous_end = Some(segment.end);
            if is_continuation {
                continue;
            }
            match after {
                Some(offset) if segment.start <= offset => continue,
                _ => return Some(segment.start),
            }
        }
        None
    }

    /// End of the first session closing strictly after `after`. Contiguous trading segments close
    /// together, `None` is returned when the remaining session carries on into the next day.
    pub(crate) fn market_close(
        &self,
        after: u32,
        extended_market_hours: bool,
        continues_into_next_day: bool,
    ) -> Option<u32> {
        let trading: Vec<&MarketHoursSegment> = self
            .segments
            .iter()
            .filter(|segment| segment.state.is_trading(extended_market_hours))
            .collect();
        for (index, segment) in trading.iter().enumerate() {
            if segment.end <= after {
                continue;
            }
            match trading.get(index + 1) {
                Some(next) if next.start == segment.end => continue,
                Some(_) => return Some(segment.end),
                None if segment.runs_to_midnight() && continues_into_next_day => return None,
                None => return Some(segment.end),
            }
        }
        None
    }
}

/// The full trading calendar of an exchange: a weekly schedule plus dated exceptions.
#[derive(Clone, Debug)]
pub struct SecurityExchangeHours {
    pub time_zone: Tz,
    week: [LocalMarketHours; 7],
    holidays: AHashSet<NaiveDate>,
    early_closes: AHashMap<NaiveDate, u32>,
    late_opens: AHashMap<NaiveDate, u32>,
}

impl SecurityExchangeHours {
    /// Weekdays without an entry in `days` are closed all day.
    pub fn new(
        time_zone: Tz,
        days: Vec<LocalMarketHours>,
        holidays: impl IntoIterator<Item = NaiveDate>,
        early_closes: AHashMap<NaiveDate, NaiveTime>,
        late_opens: AHashMap<NaiveDate, NaiveTime>,
    ) -> Result<Self, CalendarError> {
        let mut week = empty_week();
        let mut seen = AHashSet::new();
        for day in days {
            if !seen.insert(day.weekday) {
                return Err(CalendarError::DuplicateWeekday(day.weekday));
            }
            let index = day.weekday.num_days_from_monday() as usize;
            week[index] = day;
        }
        let to_offsets = |map: AHashMap<NaiveDate, NaiveTime>| -> AHashMap<NaiveDate, u32> {
            map.into_iter()
                .map(|(date, time)| (date, time.num_seconds_from_midnight()))
                .collect()
        };
        Ok(SecurityExchangeHours {
            time_zone,
            week,
            holidays: holidays.into_iter().collect(),
            early_closes: to_offsets(early_closes),
            late_opens: to_offsets(late_opens),
        })
    }

    /// Regular trading around the clock every day, as for crypto venues.
    pub fn always_open(time_zone: Tz) -> Self {
        let mut week = empty_week();
        for (index, day) in week.iter_mut().enumerate() {
            *day = LocalMarketHours::open_all_day(weekday_from_index(index));
        }
        SecurityExchangeHours {
            time_zone,
            week,
            holidays: AHashSet::new(),
            early_closes: AHashMap::new(),
            late_opens: AHashMap::new(),
        }
    }

    /// Used by the built in product maps, offsets are already in seconds.
    pub(crate) fn from_week(
        time_zone: Tz,
        week: [LocalMarketHours; 7],
        holidays: &[NaiveDate],
        early_closes: &[(NaiveDate, u32)],
    ) -> Self {
        SecurityExchangeHours {
            time_zone,
            week,
            holidays: holidays.iter().copied().collect(),
            early_closes: early_closes.iter().copied().collect(),
            late_opens: AHashMap::new(),
        }
    }

    pub fn weekly_hours(&self, weekday: Weekday) -> &LocalMarketHours {
        &self.week[weekday.num_days_from_monday() as usize]
    }

    pub fn is_holiday(&self, date: NaiveDate) -> bool {
        self.holidays.contains(&date)
    }

    pub fn early_close(&self, date: NaiveDate) -> Option<u32> {
        self.early_closes.get(&date).copied()
    }

    pub fn late_open(&self, date: NaiveDate) -> Option<u32> {
        self.late_opens.get(&date).copied()
    }

    pub fn holidays(&self) -> impl Iterator<Item = &NaiveDate> {
        self.holidays.iter()
    }

    /// Dates with their close offset, unordered.
    pub fn early_closes(&self) -> impl Iterator<Item = (NaiveDate, u32)> + '_ {
        self.early_closes.iter().map(|(date, offset)| (*date, *offset))
    }

    pub fn late_opens(&self) -> impl Iterator<Item = (NaiveDate, u32)> + '_ {
        self.late_opens.iter().map(|(date, offset)| (*date, *offset))
    }

    pub fn add_holiday(&mut self, date: NaiveDate) {
        self.holidays.insert(date);
    }

    pub fn add_early_close(&mut self, date: NaiveDate, close: NaiveTime) {
        self.early_closes.insert(date, close.num_seconds_from_midnight());
    }

    pub fn add_late_open(&mut self, date: NaiveDate, open: NaiveTime) {
        self.late_opens.insert(date, open.num_seconds_from_midnight());
    }

    /// The schedule in effect on a local date.
    /// Holidays are closed all day, an early close truncates every segment at the close
    /// and a late open removes trading before the open.
    pub fn market_hours(&self, date: NaiveDate) -> Cow<'_, LocalMarketHours> {
        let weekday = date.weekday();
        if self.holidays.contains(&date) {
            return Cow::Owned(LocalMarketHours::closed_all_day(weekday));
        }
        let hours = self.weekly_hours(weekday);
        let early_close = self.early_close(date);
        let late_open = self.late_open(date);
        if early_close.is_none() && late_open.is_none() {
            return Cow::Borrowed(hours);
        }
        let segments = hours
            .segments()
            .iter()
            .filter_map(|segment| {
                let mut segment = *segment;
                if let Some(close) = early_close {
                    segment.end = segment.end.min(close);
                }
                if let Some(open) = late_open {
                    segment.start = segment.start.max(open);
                }
                (segment.start < segment.end).then_some(segment)
            })
            .collect();
        Cow::Owned(LocalMarketHours::from_sorted(weekday, segments))
    }

    fn continues_from_previous_day(&self, date: NaiveDate, extended_market_hours: bool) -> bool {
        date.pred_opt().is_some_and(|previous| {
            self.market_hours(previous)
                .last_trading_segment(extended_market_hours)
                .is_some_and(|segment| segment.runs_to_midnight())
        })
    }

    fn continues_into_next_day(&self, date: NaiveDate, extended_market_hours: bool) -> bool {
        date.succ_opt().is_some_and(|next| {
            self.market_hours(next)
                .first_trading_segment(extended_market_hours)
                .is_some_and(|segment| segment.start == 0)
        })
    }

    /// The first market open strictly after `local`.
    pub fn get_next_market_open(
        &self,
        local: NaiveDateTime,
        extended_market_hours: bool,
    ) -> Result<NaiveDateTime, CalendarError> {
        let mut date = local.date();
        for day in 0..MAX_SEARCH_DAYS {
            let hours = self.market_hours(date);
            if !hours.is_closed_all_day() {
                let after = (day == 0).then(|| seconds_of_day(&local));
                let continues = self.continues_from_previous_day(date, extended_market_hours);
                if let Some(open) = hours.market_open(after, extended_market_hours, continues) {
                    return Ok(at_offset(date, open));
                }
            }
            date = date.succ_opt().ok_or(CalendarError::DateOutOfRange(local))?;
        }
        Err(CalendarError::NoMarketOpen {
            after: local,
            days: MAX_SEARCH_DAYS,
        })
    }

    /// The first market close strictly after `local`.
    pub fn get_next_market_close(
        &self,
        local: NaiveDateTime,
        extended_market_hours: bool,
    ) -> Result<NaiveDateTime, CalendarError> {
        let mut date = local.date();
        for day in 0..MAX_SEARCH_DAYS {
            let hours = self.market_hours(date);
            if !hours.is_closed_all_day() {
                let after = if day == 0 { seconds_of_day(&local) } else { 0 };
                let continues = self.continues_into_next_day(date, extended_market_hours);
                if let Some(close) = hours.market_close(after, extended_market_hours, continues) {
                    return Ok(at_offset(date, close));
                }
            }
            date = date.succ_opt().ok_or(CalendarError::DateOutOfRange(local))?;
        }
        Err(CalendarError::NoMarketClose {
            after: local,
            days: MAX_SEARCH_DAYS,
        })
    }

    pub fn is_open(&self, local: NaiveDateTime, extended_market_hours: bool) -> bool {
        self.market_hours(local.date())
            .is_open(seconds_of_day(&local), extended_market_hours)
    }

    /// True if the market is open at any point in `[start, end)`.
    pub fn is_open_between(&self, start: NaiveDateTime, end: NaiveDateTime, extended_market_hours: bool) -> bool {
        if start >= end {
            return false;
        }
        if self.is_open(start, extended_market_hours) {
            return true;
        }
        self.get_next_market_open(start, extended_market_hours)
            .map(|open| open < end)
            .unwrap_or(false)
    }

    /// True if the date has a regular trading session.
    pub fn is_date_open(&self, date: NaiveDate) -> bool {
        self.market_hours(date).has_market_segment()
    }

    pub fn get_next_trading_day(&self, date: NaiveDate) -> Result<NaiveDate, CalendarError> {
        let mut candidate = date;
        for _ in 0..MAX_SEARCH_DAYS {
            candidate = candidate.succ_opt().ok_or(CalendarError::NoTradingDay { from: date, days: MAX_SEARCH_DAYS })?;
            if self.is_date_open(candidate) {
                return Ok(candidate);
            }
        }
        Err(CalendarError::NoTradingDay {
            from: date,
            days: MAX_SEARCH_DAYS,
        })
    }

    pub fn get_previous_trading_day(&self, date: NaiveDate) -> Result<NaiveDate, CalendarError> {
        let mut candidate = date;
        for _ in 0..MAX_SEARCH_DAYS {
            candidate = candidate.pred_opt().ok_or(CalendarError::NoTradingDay { from: date, days: MAX_SEARCH_DAYS })?;
            if self.is_date_open(candidate) {
                return Ok(candidate);
            }
        }
        Err(CalendarError::NoTradingDay {
            from: date,
            days: MAX_SEARCH_DAYS,
        })
    }

    pub fn regular_market_duration(&self, date: NaiveDate) -> Duration {
        self.market_hours(date).market_duration()
    }

    pub fn is_open_utc(&self, time: DateTime<Utc>, extended_market_hours: bool) -> bool {
        self.is_open(utc_to_local(&self.time_zone, time), extended_market_hours)
    }

    pub fn next_market_open_utc(
        &self,
        time: DateTime<Utc>,
        extended_market_hours: bool,
    ) -> Result<DateTime<Utc>, CalendarError> {
        let open = self.get_next_market_open(utc_to_local(&self.time_zone, time), extended_market_hours)?;
        local_to_utc(&self.time_zone, open)
    }

    pub fn next_market_close_utc(
        &self,
        time: DateTime<Utc>,
        extended_market_hours: bool,
    ) -> Result<DateTime<Utc>, CalendarError> {
        let close = self.get_next_market_close(utc_to_local(&self.time_zone, time), extended_market_hours)?;
        local_to_utc(&self.time_zone, close)
    }
}

fn weekday_from_index(index: usize) -> Weekday {
    match index {
        0 => Weekday::Mon,
        1 => Weekday::Tue,
        2 => Weekday::Wed,
        3 => Weekday::Thu,
        4 => Weekday::Fri,
        5 => Weekday::Sat,
        _ => Weekday::Sun,
    }
}

fn empty_week() -> [LocalMarketHours; 7] {
    std::array::from_fn(|index| LocalMarketHours::closed_all_day(weekday_from_index(index)))
}

/// Builds a full week from the listed days, every other weekday is closed.
pub(crate) fn week_of(days: Vec<LocalMarketHours>) -> [LocalMarketHours; 7] {
    let mut week = empty_week();
    for day in days {
        let index = day.weekday.num_days_from_monday() as usize;
        week[index] = day;
    }
    week
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono_tz::America::New_York;
    use crate::helpers::converters::hms;

    fn datetime(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(h, min, s).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    /// Mon-Fri 09:30-16:00 with pre market 04:00-09:30 and post market 16:00-20:00.
    fn equity_hours() -> SecurityExchangeHours {
        let days = [Weekday::Mon, Weekday::Tue, Weekday::Wed, Weekday::Thu, Weekday::Fri]
            .into_iter()
            .map(|weekday| {
                LocalMarketHours::new(
                    weekday,
                    vec![
                        MarketHoursSegment::post_market(hms(16, 0, 0), hms(20, 0, 0)),
                        MarketHoursSegment::pre_market(hms(4, 0, 0), hms(9, 30, 0)),
                        MarketHoursSegment::market(hms(9, 30, 0), hms(16, 0, 0)),
                    ],
                )
                .unwrap()
            })
            .collect();
        SecurityExchangeHours::new(New_York, days, Vec::new(), AHashMap::new(), AHashMap::new()).unwrap()
    }

    /// Sunday 18:00 through Friday 17:00 with a daily 17:00-18:00 break, all regular hours.
    fn overnight_hours() -> SecurityExchangeHours {
        let mut days = vec![LocalMarketHours::new(
            Weekday::Sun,
            vec![MarketHoursSegment::market(hms(18, 0, 0), SECONDS_PER_DAY)],
        )
        .unwrap()];
        for weekday in [Weekday::Mon, Weekday::Tue, Weekday::Wed, Weekday::Thu] {
            days.push(
                LocalMarketHours::new(
                    weekday,
                    vec![
                        MarketHoursSegment::market(0, hms(17, 0, 0)),
                        MarketHoursSegment::market(hms(18, 0, 0), SECONDS_PER_DAY),
                    ],
                )
                .unwrap(),
            );
        }
        days.push(LocalMarketHours::new(Weekday::Fri, vec![MarketHoursSegment::market(0, hms(17, 0, 0))]).unwrap());
        SecurityExchangeHours::new(New_York, days, Vec::new(), AHashMap::new(), AHashMap::new()).unwrap()
    }

    #[test]
    fn test_segments_are_sorted_and_validated() {
        let hours = LocalMarketHours::new(
            Weekday::Mon,
            vec![
                MarketHoursSegment::market(hms(9, 30, 0), hms(16, 0, 0)),
                MarketHoursSegment::new(MarketHoursState::Closed, hms(16, 0, 0), hms(17, 0, 0)),
                MarketHoursSegment::pre_market(hms(4, 0, 0), hms(9, 30, 0)),
            ],
        )
        .unwrap();
        assert_eq!(hours.segments().len(), 2);
        assert_eq!(hours.segments()[0].state, MarketHoursState::PreMarket);

        let overlapping = LocalMarketHours::new(
            Weekday::Mon,
            vec![
                MarketHoursSegment::market(hms(9, 30, 0), hms(16, 0, 0)),
                MarketHoursSegment::post_market(hms(15, 0, 0), hms(20, 0, 0)),
            ],
        );
        assert!(matches!(overlapping, Err(CalendarError::OverlappingSegments { .. })));

        let inverted = LocalMarketHours::new(Weekday::Mon, vec![MarketHoursSegment::market(hms(16, 0, 0), hms(9, 0, 0))]);
        assert!(matches!(inverted, Err(CalendarError::InvalidSegment { .. })));

        let past_midnight = LocalMarketHours::new(Weekday::Mon, vec![MarketHoursSegment::market(0, SECONDS_PER_DAY + 1)]);
        assert!(past_midnight.is_err());
    }

    #[test]
    fn test_duplicate_weekday_is_rejected() {
        let days = vec![
            LocalMarketHours::open_all_day(Weekday::Mon),
            LocalMarketHours::closed_all_day(Weekday::Mon),
        ];
        let result = SecurityExchangeHours::new(New_York, days, Vec::new(), AHashMap::new(), AHashMap::new());
        assert_eq!(result.unwrap_err(), CalendarError::DuplicateWeekday(Weekday::Mon));
    }

    #[test]
    fn test_next_open_is_strictly_after() {
        let hours = equity_hours();
        // Monday 2013-10-07
        assert_eq!(hours.get_next_market_open(datetime(2013, 10, 7, 9, 0, 0), false).unwrap(), datetime(2013, 10, 7, 9, 30, 0));
        assert_eq!(hours.get_next_market_open(datetime(2013, 10, 7, 9, 30, 0), false).unwrap(), datetime(2013, 10, 8, 9, 30, 0));
        assert_eq!(hours.get_next_market_open(datetime(2013, 10, 7, 12, 0, 0), false).unwrap(), datetime(2013, 10, 8, 9, 30, 0));
    }

    #[test]
    fn test_extended_open_skips_contiguous_segments() {
        let hours = equity_hours();
        assert_eq!(hours.get_next_market_open(datetime(2013, 10, 7, 0, 0, 0), true).unwrap(), datetime(2013, 10, 7, 4, 0, 0));
        // 09:30 continues the pre market session when extended hours are included
        assert_eq!(hours.get_next_market_open(datetime(2013, 10, 7, 5, 0, 0), true).unwrap(), datetime(2013, 10, 8, 4, 0, 0));
        assert_eq!(hours.get_next_market_close(datetime(2013, 10, 7, 5, 0, 0), true).unwrap(), datetime(2013, 10, 7, 20, 0, 0));
        assert_eq!(hours.get_next_market_close(datetime(2013, 10, 7, 5, 0, 0), false).unwrap(), datetime(2013, 10, 7, 16, 0, 0));
    }

    #[test]
    fn test_weekend_rolls_to_monday() {
        let hours = equity_hours();
        // Friday 2013-10-11 after the close
        assert_eq!(hours.get_next_market_open(datetime(2013, 10, 11, 16, 30, 0), false).unwrap(), datetime(2013, 10, 14, 9, 30, 0));
        assert_eq!(hours.get_next_market_close(datetime(2013, 10, 12, 10, 0, 0), false).unwrap(), datetime(2013, 10, 14, 16, 0, 0));
    }

    #[test]
    fn test_close_at_boundary_moves_to_next_day() {
        let hours = equity_hours();
        assert_eq!(hours.get_next_market_close(datetime(2013, 10, 7, 16, 0, 0), false).unwrap(), datetime(2013, 10, 8, 16, 0, 0));
        assert_eq!(hours.get_next_market_close(datetime(2013, 10, 7, 15, 59, 59), false).unwrap(), datetime(2013, 10, 7, 16, 0, 0));
    }

    #[test]
    fn test_overnight_session_is_continuous_across_midnight() {
        let hours = overnight_hours();
        // Sunday evening: the session opened at 18:00 and runs to Monday 17:00
        assert_eq!(hours.get_next_market_close(datetime(2013, 10, 6, 20, 0, 0), false).unwrap(), datetime(2013, 10, 7, 17, 0, 0));
        // Midnight is not a new open
        assert_eq!(hours.get_next_market_open(datetime(2013, 10, 6, 20, 0, 0), false).unwrap(), datetime(2013, 10, 7, 18, 0, 0));
        assert_eq!(hours.get_next_market_open(datetime(2013, 10, 6, 0, 0, 0), false).unwrap(), datetime(2013, 10, 6, 18, 0, 0));
        // Thursday evening rolls into the Friday close
        assert_eq!(hours.get_next_market_close(datetime(2013, 10, 10, 18, 0, 0), false).unwrap(), datetime(2013, 10, 11, 17, 0, 0));
        // Friday after the close waits for the Sunday open
        assert_eq!(hours.get_next_market_open(datetime(2013, 10, 11, 17, 0, 0), false).unwrap(), datetime(2013, 10, 13, 18, 0, 0));
        assert!(hours.is_open(datetime(2013, 10, 8, 0, 0, 0), false));
        assert!(!hours.is_open(datetime(2013, 10, 8, 17, 30, 0), false));
    }

    #[test]
    fn test_holiday_breaks_overnight_continuity() {
        let mut hours = overnight_hours();
        hours.add_holiday(date(2013, 10, 8));
        // Monday's evening session can not continue into a closed Tuesday
        assert_eq!(hours.get_next_market_close(datetime(2013, 10, 7, 19, 0, 0), false).unwrap(), datetime(2013, 10, 8, 0, 0, 0));
        // Wednesday midnight opens fresh after the holiday
        assert_eq!(hours.get_next_market_open(datetime(2013, 10, 8, 12, 0, 0), false).unwrap(), datetime(2013, 10, 9, 0, 0, 0));
        assert!(!hours.is_date_open(date(2013, 10, 8)));
        assert_eq!(hours.get_next_trading_day(date(2013, 10, 7)).unwrap(), date(2013, 10, 9));
        assert_eq!(hours.get_previous_trading_day(date(2013, 10, 9)).unwrap(), date(2013, 10, 7));
    }

    #[test]
    fn test_early_close_and_late_open() {
        let mut hours = equity_hours();
        hours.add_early_close(date(2013, 11, 29), NaiveTime::from_hms_opt(13, 0, 0).unwrap());
        hours.add_late_open(date(2013, 12, 2), NaiveTime::from_hms_opt(10, 30, 0).unwrap());

        assert_eq!(hours.get_next_market_close(datetime(2013, 11, 29, 10, 0, 0), false).unwrap(), datetime(2013, 11, 29, 13, 0, 0));
        // The post market session is dropped by the early close
        assert_eq!(hours.get_next_market_close(datetime(2013, 11, 29, 10, 0, 0), true).unwrap(), datetime(2013, 11, 29, 13, 0, 0));
        assert!(!hours.is_open(datetime(2013, 11, 29, 14, 0, 0), true));
        assert_eq!(hours.regular_market_duration(date(2013, 11, 29)), Duration::minutes(210));

        assert_eq!(hours.get_next_market_open(datetime(2013, 12, 2, 0, 0, 0), false).unwrap(), datetime(2013, 12, 2, 10, 30, 0));
        assert_eq!(hours.get_next_market_open(datetime(2013, 12, 2, 0, 0, 0), true).unwrap(), datetime(2013, 12, 2, 10, 30, 0));
    }

    #[test]
    fn test_always_open_has_no_next_open() {
        let hours = SecurityExchangeHours::always_open(chrono_tz::UTC);
        let now = datetime(2013, 10, 7, 12, 0, 0);
        assert!(hours.is_open(now, false));
        assert_eq!(
            hours.get_next_market_open(now, false).unwrap_err(),
            CalendarError::NoMarketOpen { after: now, days: MAX_SEARCH_DAYS }
        );
        assert!(matches!(hours.get_next_market_close(now, false), Err(CalendarError::NoMarketClose { .. })));
    }

    #[test]
    fn test_is_open_between() {
        let hours = equity_hours();
        assert!(hours.is_open_between(datetime(2013, 10, 7, 9, 0, 0), datetime(2013, 10, 7, 9, 31, 0), false));
        assert!(!hours.is_open_between(datetime(2013, 10, 7, 16, 0, 0), datetime(2013, 10, 7, 20, 0, 0), false));
        assert!(hours.is_open_between(datetime(2013, 10, 7, 16, 0, 0), datetime(2013, 10, 7, 20, 0, 0), true));
    }

    #[test]
    fn test_utc_wrappers_use_exchange_time_zone() {
        let hours = equity_hours();
        // 2013-10-07 12:00 UTC is 08:00 EDT
        let time = chrono::Utc.with_ymd_and_hms(2013, 10, 7, 12, 0, 0).unwrap();
        assert!(!hours.is_open_utc(time, false));
        assert!(hours.is_open_utc(time, true));
        assert_eq!(
            hours.next_market_open_utc(time, false).unwrap(),
            chrono::Utc.with_ymd_and_hms(2013, 10, 7, 13, 30, 0).unwrap()
        );
        assert_eq!(
            hours.next_market_close_utc(time, false).unwrap(),
            chrono::Utc.with_ymd_and_hms(2013, 10, 7, 20, 0, 0).unwrap()
        );
    }
}
