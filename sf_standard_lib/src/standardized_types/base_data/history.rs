use chrono::NaiveDateTime;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;
use crate::helpers::converters::open_time;
use crate::standardized_types::base_data::candle::Candle;
use crate::standardized_types::market_hours::SecurityExchangeHours;
use crate::standardized_types::new_types::{Price, Volume};
use crate::standardized_types::resolution::Resolution;
use crate::standardized_types::subscriptions::Symbol;

/// Produces a reproducible random walk of candles for a symbol, one for each period in which its market trades.
/// Every price is a whole number of ticks.
pub struct CandleGenerator {
    rng: StdRng,
    tick_size: Price,
    last_close: Price,
}

impl CandleGenerator {
    pub fn new(seed: u64, start_price: Price, tick_size: Price) -> Self {
        let last_close = if tick_size.is_zero() {
            start_price
        } else {
            (start_price / tick_size).round() * tick_size
        };
        CandleGenerator {
            rng: StdRng::seed_from_u64(seed),
            tick_size,
            last_close,
        }
    }

    fn ticks(&self, count: i64) -> Price {
        self.tick_size * Decimal::from(count)
    }

    fn next_candle(&mut self, symbol: &Symbol, time: NaiveDateTime, end_time: NaiveDateTime) -> Candle {
        let open = self.last_close;
        let walk = self.rng.gen_range(-4..=4);
        let mut close = open + self.ticks(walk);
        // keep the walk above zero
        if close <= Decimal::ZERO {
            close = open;
        }
        let (upper_wick, lower_wick) = (self.rng.gen_range(0..=2), self.rng.gen_range(0..=2));
        let high = open.max(close) + self.ticks(upper_wick);
        let body_low = open.min(close);
        let low = (body_low - self.ticks(lower_wick)).max(self.tick_size).min(body_low);
        let volume: Volume = Decimal::from(self.rng.gen_range(1..=500i64));
        self.last_close = close;
        let mut candle = Candle::new(symbol.clone(), open, high, low, close, volume, time, end_time);
        candle.is_closed = true;
        candle
    }

    /// Candles of `resolution` opening in `[from, to)`, exchange local time.
    /// A period gets a candle if the market is open at any point inside it.
    pub fn generate(
        &mut self,
        symbol: &Symbol,
        hours: &SecurityExchangeHours,
        resolution: Resolution,
        from: NaiveDateTime,
        to: NaiveDateTime,
        extended_market_hours: bool,
    ) -> Vec<Candle> {
        let step = resolution.as_duration();
        let mut candles = Vec::new();
        let mut time = open_time(&resolution, from);
        if time < from {
            time += step;
        }
        while time < to {
            let end_time = time + step;
            if hours.is_open_between(time, end_time, extended_market_hours) {
                candles.push(self.next_candle(symbol, time, end_time));
            }
            time += step;
        }
        candles
    }
}

pub fn generate_candles(
    symbol: &Symbol,
    hours: &SecurityExchangeHours,
    resolution: Resolution,
    from: NaiveDateTime,
    to: NaiveDateTime,
    extended_market_hours: bool,
    seed: u64,
) -> Vec<Candle> {
    let mut generator = CandleGenerator::new(seed, Decimal::from(1_680), Decimal::new(25, 2));
    generator.generate(symbol, hours, resolution, from, to, extended_market_hours)
}
