use chrono::{Duration, NaiveDateTime};
use log::debug;
use crate::strategies::consolidators::calendar::{CalendarFn, CalendarInfo};
use crate::strategies::consolidators::{ConsolidatedData, ConsolidatedHandler, Handlers};
use crate::errors::{CalendarError, ConsolidatorError};
use crate::helpers::converters::{at_offset, seconds_of_day};
use crate::standardized_types::base_data::candle::Candle;
use crate::standardized_types::base_data::traits::BaseData;
use crate::standardized_types::rolling_window::RollingWindow;
use crate::standardized_types::subscriptions::Symbol;

/// How a bucket window is chosen for an observation.
pub enum BucketRule {
    /// Fixed length windows aligned to local midnight.
    Period(Duration),
    Calendar(CalendarFn),
}

impl BucketRule {
    pub fn calendar<F>(calendar: F) -> Self
    where
        F: Fn(NaiveDateTime) -> Result<CalendarInfo, CalendarError> + Send + Sync + 'static,
    {
        BucketRule::Calendar(Box::new(calendar))
    }

    pub fn window(&self, time: NaiveDateTime) -> Result<CalendarInfo, ConsolidatorError> {
        match self {
            BucketRule::Period(period) => {
                let seconds = period.num_seconds();
                if seconds <= 0 {
                    return Err(ConsolidatorError::InvalidPeriod { time, period: *period });
                }
                let offset = seconds_of_day(&time) as i64;
                let start = at_offset(time.date(), (offset - offset % seconds) as u32);
                Ok(CalendarInfo::new(start, *period))
            }
            BucketRule::Calendar(calendar) => Ok(calendar(time)?),
        }
    }
}

impl std::fmt::Debug for BucketRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BucketRule::Period(period) => write!(f, "Period({})", period),
            BucketRule::Calendar(_) => write!(f, "Calendar"),
        }
    }
}

/// Groups observations of one symbol into consecutive, non overlapping windows.
/// A window is closed when data at or after its end arrives, or when the clock passes its end.
pub struct TimeBucketConsolidator {
    symbol: Symbol,
    rule: BucketRule,
    working: Option<Candle>,
    last_time: Option<NaiveDateTime>,
    /// End of the last emitted bar, a new window never starts before it.
    last_end: Option<NaiveDateTime>,
    handlers: Handlers,
    history: RollingWindow<Candle>,
}

impl TimeBucketConsolidator {
    pub fn new(symbol: Symbol, rule: BucketRule, history_to_retain: usize) -> Self {
        TimeBucketConsolidator {
            symbol,
            rule,
            working: None,
            last_time: None,
            last_end: None,
            handlers: Handlers::default(),
            history: RollingWindow::new(history_to_retain),
        }
    }

    pub fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    pub fn rule(&self) -> &BucketRule {
        &self.rule
    }

    pub fn working(&self) -> Option<&Candle> {
        self.working.as_ref()
    }

    pub fn history(&self) -> &RollingWindow<Candle> {
        &self.history
    }

    pub fn on_consolidated(&mut self, handler: ConsolidatedHandler) {
        self.handlers.push(handler);
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }

    pub fn update<D: BaseData>(&mut self, data: &D) -> Result<ConsolidatedData, ConsolidatorError> {
        if data.symbol() != &self.symbol {
            return Err(ConsolidatorError::SymbolMismatch {
                expected: self.symbol.to_string(),
                received: data.symbol().to_string(),
            });
        }
        let time = data.time();
        if let Some(last) = self.last_time {
            if time < last {
                return Err(ConsolidatorError::OutOfOrder {
                    symbol: self.symbol.name.clone(),
                    time,
                    last,
                });
            }
        }

        let mut closed = None;
        if self.working.as_ref().is_some_and(|working| time >= working.end_time) {
            closed = self.close_working();
        }

        if let Some(working) = self.working.as_mut() {
            working.update(data);
        } else {
            let window = self.rule.window(time)?;
            if window.period <= Duration::zero() {
                return Err(ConsolidatorError::InvalidPeriod { time, period: window.period });
            }
            let start = match self.last_end {
                Some(last_end) if last_end > window.start => last_end,
                _ => window.start,
            };
            if window.end() <= time || window.end() <= start {
                return Err(ConsolidatorError::StaleWindow {
                    time,
                    start,
                    end: window.end(),
                });
            }
            self.working = Some(Candle::from_data(data, start, window.end()));
        }
        self.last_time = Some(time);

        Ok(ConsolidatedData {
            open_data: self.working.clone(),
            closed_data: closed,
        })
    }

    /// Closes the working bar once `now` reaches its end.
    pub fn update_time(&mut self, now: NaiveDateTime) -> Option<Candle> {
        if self.working.as_ref().is_some_and(|working| now >= working.end_time) {
            self.close_working()
        } else {
            None
        }
    }

    fn close_working(&mut self) -> Option<Candle> {
        let mut bar = self.working.take()?;
        bar.is_closed = true;
        debug!("{}: consolidated {} to {}", self.symbol, bar.time, bar.end_time);
        self.last_end = Some(bar.end_time);
        self.handlers.emit(&bar);
        self.history.add(bar.clone());
        Some(bar)
    }
}
