use std::collections::BTreeMap;
use std::path::Path;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use log::{debug, info, warn};
use tokio::sync::mpsc::Sender;
use crate::app::settings::BacktestSettings;
use crate::errors::SessionForgeError;
use crate::helpers::converters::{day_start, local_to_utc, utc_to_local};
use crate::standardized_types::base_data::candle::Candle;
use crate::standardized_types::base_data::traits::BaseData;
use crate::standardized_types::base_data::history::generate_candles;
use crate::standardized_types::enums::MarketType;
use crate::standardized_types::market_maps::MarketHoursDatabase;
use crate::standardized_types::subscriptions::Symbol;
use crate::strategies::consolidators::consolidator_enum::ConsolidatorEnum;
use crate::strategies::consolidators::time_bucket::BucketRule;
use crate::strategies::consolidators::ConsolidatedHandler;
use crate::strategies::securities::Security;
use crate::strategies::strategy_events::{ConsolidatorId, StrategyEvent};

struct RegisteredConsolidator {
    time_zone: Tz,
    consolidator: ConsolidatorEnum,
}

/// Replays generated history for the registered securities through their consolidators.
///
/// The clock runs in utc so securities on different exchanges stay in step. It advances by the
/// data resolution, stopping early at any bar close that falls between two steps. At each stop
/// the bars closed by then are fed to the consolidators of their symbol, then every consolidator
/// is scanned with the clock in its exchange local time.
pub struct HistoricalEngine {
    settings: BacktestSettings,
    database: MarketHoursDatabase,
    securities: BTreeMap<Symbol, Security>,
    consolidators: BTreeMap<ConsolidatorId, RegisteredConsolidator>,
    next_id: ConsolidatorId,
}

impl HistoricalEngine {
    /// Uses the built in market hours, merged with the settings' market hours file if one is set.
    pub fn new(settings: BacktestSettings) -> Result<Self, SessionForgeError> {
        settings.validate()?;
        let database = match &settings.market_hours_database {
            Some(path) => MarketHoursDatabase::load(Path::new(path))?,
            None => MarketHoursDatabase::with_builtin(),
        };
        Ok(Self::with_database(settings, database))
    }

    pub fn with_database(settings: BacktestSettings, database: MarketHoursDatabase) -> Self {
        HistoricalEngine {
            settings,
            database,
            securities: BTreeMap::new(),
            consolidators: BTreeMap::new(),
            next_id: 0,
        }
    }

    pub fn settings(&self) -> &BacktestSettings {
        &self.settings
    }

    /// Registers a security, resolving its exchange hours from the market hours database.
    pub fn add_security(&mut self, name: &str, market_type: MarketType) -> Result<Security, SessionForgeError> {
        let symbol = Symbol::new(name.to_string(), market_type);
        if let Some(security) = self.securities.get(&symbol) {
            return Ok(security.clone());
        }
        let hours = self.database.get(&market_type, name)?.clone();
        let security = Security::new(symbol.clone(), hours);
        info!("Engine: Added security {} trading in {}", symbol, security.exchange.hours.time_zone);
        self.securities.insert(symbol, security.clone());
        Ok(security)
    }

    pub fn security(&self, symbol: &Symbol) -> Option<&Security> {
        self.securities.get(symbol)
    }

    fn register(&mut self, consolidator: ConsolidatorEnum) -> Result<ConsolidatorId, SessionForgeError> {
        let security = self
            .securities
            .get(consolidator.symbol())
            .ok_or_else(|| SessionForgeError::UnknownSymbol(consolidator.symbol().to_string()))?;
        let id = self.next_id;
        self.next_id += 1;
        self.consolidators.insert(
            id,
            RegisteredConsolidator {
                time_zone: security.exchange.hours.time_zone,
                consolidator,
            },
        );
        Ok(id)
    }

    /// Consolidates the symbol's data into time buckets chosen by `rule`.
    pub fn consolidate(&mut self, symbol: &Symbol, rule: BucketRule) -> Result<ConsolidatorId, SessionForgeError> {
        let consolidator = ConsolidatorEnum::time_bucket(symbol.clone(), rule, self.settings.history_to_retain);
        self.register(consolidator)
    }

    /// Consolidates every `number` bars of the symbol into one.
    pub fn consolidate_count(&mut self, symbol: &Symbol, number: u64) -> Result<ConsolidatorId, SessionForgeError> {
        let consolidator = ConsolidatorEnum::count(symbol.clone(), number, self.settings.history_to_retain)?;
        self.register(consolidator)
    }

    pub fn on_consolidated(&mut self, id: ConsolidatorId, handler: ConsolidatedHandler) -> Result<(), SessionForgeError> {
        let registered = self
            .consolidators
            .get_mut(&id)
            .ok_or(SessionForgeError::UnknownConsolidator(id))?;
        registered.consolidator.on_consolidated(handler);
        Ok(())
    }

    pub fn consolidator(&self, id: ConsolidatorId) -> Option<&ConsolidatorEnum> {
        self.consolidators.get(&id).map(|registered| &registered.consolidator)
    }

    /// Generated bars of every security keyed by their utc close, and the utc span of the replay.
    fn prepare_history(&self) -> Result<(BTreeMap<DateTime<Utc>, Vec<Candle>>, DateTime<Utc>, DateTime<Utc>), SessionForgeError> {
        let start_date = self.settings.start_date()?;
        let end_date = self.settings.end_date()?;
        let after_end = end_date
            .succ_opt()
            .ok_or_else(|| SessionForgeError::InvalidConfig(format!("end_date {} is out of range", end_date)))?;
        let resolution = self.settings.resolution()?;
        let (from, to) = (day_start(start_date), day_start(after_end));

        let mut feed: BTreeMap<DateTime<Utc>, Vec<Candle>> = BTreeMap::new();
        let mut span: Option<(DateTime<Utc>, DateTime<Utc>)> = None;
        for (index, security) in self.securities.values().enumerate() {
            let hours = &security.exchange.hours;
            let start_utc = local_to_utc(&hours.time_zone, from)?;
            let end_utc = local_to_utc(&hours.time_zone, to)?;
            span = Some(match span {
                Some((start, end)) => (start.min(start_utc), end.max(end_utc)),
                None => (start_utc, end_utc),
            });

            let seed = self.settings.seed.wrapping_add(index as u64);
            let candles = generate_candles(&security.symbol, hours, resolution, from, to, self.settings.extended_market_hours, seed);
            debug!("Engine: Generated {} bars for {}", candles.len(), security.symbol);
            for candle in candles {
                let closed_at = candle.end_time_utc(&hours.time_zone)?;
                feed.entry(closed_at).or_default().push(candle);
            }
        }
        let (start, end) = span.ok_or_else(|| SessionForgeError::InvalidConfig("no securities added".to_string()))?;
        Ok((feed, start, end))
    }

    /// Runs the replay to the end of the backtest range, then sends `ShutdownEvent`.
    /// Fails if a consolidator rejects data or the receiver is dropped.
    pub async fn run(mut self, sender: Sender<StrategyEvent>) -> Result<(), SessionForgeError> {
        let (mut feed, start, end) = self.prepare_history()?;
        let step = self.settings.resolution()?.as_duration();
        info!("Engine: Starting replay from {} to {} in {} steps", start, end, self.settings.resolution);

        let mut clock = start;
        loop {
            let mut events = Vec::new();
            while let Some(entry) = feed.first_entry() {
                if *entry.key() > clock {
                    break;
                }
                let bars = entry.remove();
                for bar in &bars {
                    for (id, registered) in self.consolidators.iter_mut() {
                        if registered.consolidator.symbol() != &bar.symbol {
                            continue;
                        }
                        if let Some(closed) = registered.consolidator.update(bar)?.closed_data {
                            events.push(StrategyEvent::Consolidated { consolidator: *id, bar: closed });
                        }
                    }
                }
            }
            for (id, registered) in self.consolidators.iter_mut() {
                let local = utc_to_local(&registered.time_zone, clock);
                if let Some(closed) = registered.consolidator.update_time(local) {
                    events.push(StrategyEvent::Consolidated { consolidator: *id, bar: closed });
                }
            }
            for event in events {
                send(&sender, event).await?;
            }
            if clock >= end {
                break;
            }
            let next_step = clock + step;
            clock = match feed.keys().next() {
                Some(close) if *close < next_step => *close,
                _ => next_step,
            }
            .min(end);
        }
        if !feed.is_empty() {
            warn!("Engine: {} bar closes fell after the end of the replay", feed.len());
        }

        info!("Engine: Replay complete");
        send(&sender, StrategyEvent::ShutdownEvent("Backtest Complete".to_string())).await
    }
}

async fn send(sender: &Sender<StrategyEvent>, event: StrategyEvent) -> Result<(), SessionForgeError> {
    sender.send(event).await.map_err(|_| SessionForgeError::ReceiverDropped)
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};
    use super::*;
    use chrono::{Duration, NaiveDate};
    use tokio::sync::mpsc;
    use crate::standardized_types::enums::Exchange;

    fn settings(start: &str, end: &str) -> BacktestSettings {
        BacktestSettings {
            start_date: start.to_string(),
            end_date: end.to_string(),
            ..BacktestSettings::default()
        }
    }

    async fn collect(engine: HistoricalEngine) -> (Result<(), SessionForgeError>, Vec<StrategyEvent>) {
        let (sender, mut receiver) = mpsc::channel(16);
        let handle = tokio::spawn(engine.run(sender));
        let mut events = Vec::new();
        while let Some(event) = receiver.recv().await {
            events.push(event);
        }
        (handle.await.unwrap(), events)
    }

    #[test]
    fn test_unknown_symbols_are_rejected() {
        let mut engine = HistoricalEngine::new(BacktestSettings::default()).unwrap();
        let missing = engine.add_security("CL", MarketType::Futures(Exchange::NYMEX));
        assert!(matches!(missing, Err(SessionForgeError::UnknownSymbol(_))));

        let es = Symbol::new("ES".to_string(), MarketType::Futures(Exchange::CME));
        assert!(matches!(engine.consolidate(&es, BucketRule::Period(Duration::hours(1))), Err(SessionForgeError::UnknownSymbol(_))));
        assert!(matches!(engine.on_consolidated(7, Box::new(|_: &Candle| {})), Err(SessionForgeError::UnknownConsolidator(7))));
    }

    #[tokio::test]
    async fn test_hourly_buckets_over_one_day() {
        let mut engine = HistoricalEngine::new(settings("2013-10-08", "2013-10-08")).unwrap();
        let security = engine.add_security("ES", MarketType::Futures(Exchange::CME)).unwrap();
        let id = engine.consolidate(&security.symbol, BucketRule::Period(Duration::hours(1))).unwrap();

        let seen = Arc::new(Mutex::new(0usize));
        let counter = seen.clone();
        engine.on_consolidated(id, Box::new(move |_: &Candle| *counter.lock().unwrap() += 1)).unwrap();

        let (result, events) = collect(engine).await;
        result.unwrap();
        assert_eq!(events.last(), Some(&StrategyEvent::ShutdownEvent("Backtest Complete".to_string())));

        let bars: Vec<&Candle> = events
            .iter()
            .filter_map(|event| match event {
                StrategyEvent::Consolidated { consolidator, bar } if *consolidator == id => Some(bar),
                _ => None,
            })
            .collect();
        // 09:00 through 16:00 buckets hold regular session data
        let day = NaiveDate::from_ymd_opt(2013, 10, 8).unwrap();
        let starts: Vec<u32> = bars.iter().map(|bar| chrono::Timelike::hour(&bar.time)).collect();
        assert_eq!(starts, vec![9, 10, 11, 12, 13, 14, 15, 16]);
        assert!(bars.iter().all(|bar| bar.time.date() == day && bar.is_closed));
        assert_eq!(*seen.lock().unwrap(), bars.len());
    }

    #[tokio::test]
    async fn test_count_consolidation() {
        let mut engine = HistoricalEngine::new(settings("2013-10-07", "2013-10-07")).unwrap();
        let security = engine.add_security("ES", MarketType::Futures(Exchange::CME)).unwrap();
        let id = engine.consolidate_count(&security.symbol, 15).unwrap();
        let (result, events) = collect(engine).await;
        result.unwrap();
        let count = events
            .iter()
            .filter(|event| matches!(event, StrategyEvent::Consolidated { consolidator, .. } if *consolidator == id))
            .count();
        // 435 regular session minutes
        assert_eq!(count, 29);
    }

    #[tokio::test]
    async fn test_daily_bars_are_all_delivered_across_the_dst_change() {
        let settings = BacktestSettings {
            resolution: "1-D".to_string(),
            extended_market_hours: true,
            ..settings("2013-10-28", "2013-11-08")
        };
        let mut engine = HistoricalEngine::new(settings).unwrap();
        let security = engine.add_security("ES", MarketType::Futures(Exchange::CME)).unwrap();
        let id = engine.consolidate_count(&security.symbol, 1).unwrap();
        let (result, events) = collect(engine).await;
        result.unwrap();

        let days: Vec<NaiveDate> = events
            .iter()
            .filter_map(|event| match event {
                StrategyEvent::Consolidated { consolidator, bar } if *consolidator == id => Some(bar.time.date()),
                _ => None,
            })
            .collect();
        // new york leaves daylight saving on sunday 2013-11-03, the sunday evening session gives it a bar
        let expected: Vec<NaiveDate> = [28, 29, 30, 31]
            .into_iter()
            .map(|day| NaiveDate::from_ymd_opt(2013, 10, day).unwrap())
            .chain([1, 3, 4, 5, 6, 7, 8].into_iter().map(|day| NaiveDate::from_ymd_opt(2013, 11, day).unwrap()))
            .collect();
        assert_eq!(days, expected);
    }

    #[tokio::test]
    async fn test_dropped_receiver_stops_the_replay() {
        let mut engine = HistoricalEngine::new(settings("2013-10-07", "2013-10-07")).unwrap();
        let security = engine.add_security("ES", MarketType::Futures(Exchange::CME)).unwrap();
        engine.consolidate(&security.symbol, BucketRule::Period(Duration::minutes(5))).unwrap();
        let (sender, receiver) = mpsc::channel(1);
        drop(receiver);
        assert!(matches!(engine.run(sender).await, Err(SessionForgeError::ReceiverDropped)));
    }
}
