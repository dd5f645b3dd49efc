use std::fmt;
use std::fmt::{Display, Formatter};
use chrono::{Duration, NaiveDateTime};
use crate::standardized_types::base_data::traits::BaseData;
use crate::standardized_types::new_types::{Price, Volume};
use crate::standardized_types::subscriptions::Symbol;

/// Represents a single candlestick, used both for the raw bars fed into consolidators
/// and for the buckets they emit.
///
/// # Fields
///
/// - `symbol`: The trading symbol of the asset.
/// - `high`: The highest price.
/// - `low`: The lowest price.
/// - `open`: The opening price.
/// - `close`: The closing price.
/// - `volume`: The trading volume.
/// - `range`: The difference between the high and low prices.
/// - `time`: The exchange local opening time of the candle.
/// - `end_time`: The exchange local closing time of the candle, exclusive.
/// - `is_closed`: Indicates whether the candle is closed.
#[derive(Clone, PartialEq, Debug)]
pub struct Candle {
    pub symbol: Symbol,
    pub high: Price,
    pub low: Price,
    pub open: Price,
    pub close: Price,
    pub volume: Volume,
    pub range: Price,
    pub time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub is_closed: bool,
}

impl Candle {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        symbol: Symbol,
        open: Price,
        high: Price,
        low: Price,
        close: Price,
        volume: Volume,
        time: NaiveDateTime,
        end_time: NaiveDateTime,
    ) -> Self {
        Candle {
            symbol,
            high,
            low,
            open,
            close,
            volume,
            range: high - low,
            time,
            end_time,
            is_closed: false,
        }
    }

    /// Opens a new candle spanning `time` to `end_time` from the first data point of the bucket.
    pub fn from_data<D: BaseData>(data: &D, time: NaiveDateTime, end_time: NaiveDateTime) -> Self {
        Candle::new(
            data.symbol().clone(),
            data.open(),
            data.high(),
            data.low(),
            data.close(),
            data.volume(),
            time,
            end_time,
        )
    }

    /// Folds a later data point into this candle.
    pub fn update<D: BaseData>(&mut self, data: &D) {
        self.high = self.high.max(data.high());
        self.low = self.low.min(data.low());
        self.close = data.close();
        self.volume += data.volume();
        self.range = self.high - self.low;
    }

    pub fn period(&self) -> Duration {
        self.end_time - self.time
    }
}

impl BaseData for Candle {
    fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    fn time(&self) -> NaiveDateTime {
        self.time
    }

    fn end_time(&self) -> NaiveDateTime {
        self.end_time
    }

    fn open(&self) -> Price {
        self.open
    }

    fn high(&self) -> Price {
        self.high
    }

    fn low(&self) -> Price {
        self.low
    }

    fn close(&self) -> Price {
        self.close
    }

    fn volume(&self) -> Volume {
        self.volume
    }
}

impl Display for Candle {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{},{},{},{},{},{},{},{},{}",
            self.symbol.name,
            self.time,
            self.end_time,
            self.open,
            self.high,
            self.low,
            self.close,
            self.volume,
            self.range,
            self.is_closed,
        )
    }
}
