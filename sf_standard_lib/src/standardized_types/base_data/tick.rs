use std::fmt;
use chrono::NaiveDateTime;
use crate::standardized_types::base_data::traits::BaseData;
use crate::standardized_types::new_types::{Price, Volume};
use crate::standardized_types::subscriptions::Symbol;

/// A `Tick` is a single trade in a financial market.
#[derive(Clone, PartialEq, Debug)]
pub struct Tick {
    pub symbol: Symbol,
    pub price: Price,
    pub time: NaiveDateTime,
    pub volume: Volume,
}

impl Tick {
    pub fn new(symbol: Symbol, price: Price, volume: Volume, time: NaiveDateTime) -> Self {
        Tick {
            symbol,
            price,
            time,
            volume,
        }
    }
}

impl BaseData for Tick {
    fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    fn time(&self) -> NaiveDateTime {
        self.time
    }

    fn end_time(&self) -> NaiveDateTime {
        self.time
    }

    fn open(&self) -> Price {
        self.price
    }

    fn high(&self) -> Price {
        self.price
    }

    fn low(&self) -> Price {
        self.price
    }

    fn close(&self) -> Price {
        self.price
    }

    fn volume(&self) -> Volume {
        self.volume
    }
}

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{},{}", self.symbol.name, self.price, self.volume, self.time)
    }
}
