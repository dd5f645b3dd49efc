use std::collections::VecDeque;
use std::path::PathBuf;
use chrono::NaiveDateTime;
use colored::Colorize;
use log::{debug, error, info};
use sf_standard_lib::app::settings::BacktestSettings;
use sf_standard_lib::errors::SessionForgeError;
use sf_standard_lib::helpers::get_toml_file_path;
use sf_standard_lib::standardized_types::base_data::candle::Candle;
use sf_standard_lib::standardized_types::enums::{Exchange, MarketType};
use sf_standard_lib::strategies::consolidators::calendar::market_session;
use sf_standard_lib::strategies::consolidators::time_bucket::BucketRule;
use sf_standard_lib::strategies::historical_engine::HistoricalEngine;
use sf_standard_lib::strategies::strategy_events::StrategyEvent;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinError;

/// Market opens of the ES regular session after the 16:15 halt, exchange local time.
const EXPECTED_OPENS: [&str; 6] = [
    "2013-10-07 16:30:00",
    "2013-10-08 16:30:00",
    "2013-10-09 16:30:00",
    "2013-10-10 16:30:00",
    "2013-10-11 16:30:00",
    "2013-10-14 16:30:00",
];

const EXPECTED_CLOSES: [&str; 6] = [
    "2013-10-07 17:00:00",
    "2013-10-08 17:00:00",
    "2013-10-09 17:00:00",
    "2013-10-10 17:00:00",
    "2013-10-11 17:00:00",
    "2013-10-14 17:00:00",
];

#[derive(Debug, Error)]
pub enum RegressionError {
    #[error("Bar span was expected to be from {open} to {close}. But was from {time} to {end_time}.")]
    BarSpanMismatch {
        open: NaiveDateTime,
        close: NaiveDateTime,
        time: NaiveDateTime,
        end_time: NaiveDateTime,
    },

    #[error("Unexpected bar from {time} to {end_time}, all expected windows were already consolidated")]
    UnexpectedBar {
        time: NaiveDateTime,
        end_time: NaiveDateTime,
    },

    #[error("{0} expected windows were never consolidated")]
    MissingBars(usize),

    #[error(transparent)]
    Engine(#[from] SessionForgeError),

    #[error("Engine task did not complete: {0}")]
    EngineTask(#[from] JoinError),
}

/// The expected bar spans, consumed in arrival order.
pub struct ExpectedWindows {
    opens: VecDeque<NaiveDateTime>,
    closes: VecDeque<NaiveDateTime>,
}

impl ExpectedWindows {
    pub fn from_literals(opens: &[&str], closes: &[&str]) -> Result<Self, RegressionError> {
        let parse = |values: &[&str]| -> Result<VecDeque<NaiveDateTime>, RegressionError> {
            values
                .iter()
                .map(|value| {
                    NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S")
                        .map_err(|_| SessionForgeError::InvalidConfig(format!("invalid expected time: {}", value)).into())
                })
                .collect()
        };
        Ok(ExpectedWindows {
            opens: parse(opens)?,
            closes: parse(closes)?,
        })
    }

    pub fn es_market_open() -> Result<Self, RegressionError> {
        Self::from_literals(&EXPECTED_OPENS, &EXPECTED_CLOSES)
    }

    pub fn check(&mut self, bar: &Candle) -> Result<(), RegressionError> {
        let (open, close) = match (self.opens.pop_front(), self.closes.pop_front()) {
            (Some(open), Some(close)) => (open, close),
            _ => {
                return Err(RegressionError::UnexpectedBar {
                    time: bar.time,
                    end_time: bar.end_time,
                })
            }
        };
        if bar.time != open || bar.end_time != close {
            return Err(RegressionError::BarSpanMismatch {
                open,
                close,
                time: bar.time,
                end_time: bar.end_time,
            });
        }
        debug!("Consolidator Event span. Start {} End : {}", bar.time, bar.end_time);
        Ok(())
    }

    pub fn remaining(&self) -> usize {
        self.opens.len().max(self.closes.len())
    }

    pub fn finish(&self) -> Result<(), RegressionError> {
        match self.remaining() {
            0 => Ok(()),
            missing => Err(RegressionError::MissingBars(missing)),
        }
    }
}

/// Replays ES through a market open to market close consolidator and checks every bar it emits.
/// Returns the number of bars checked.
pub async fn run_regression(settings: BacktestSettings) -> Result<usize, RegressionError> {
    let buffer_size = settings.buffer_size;
    let mut engine = HistoricalEngine::new(settings)?;
    let es = engine.add_security("ES", MarketType::Futures(Exchange::CME))?;
    let rule = BucketRule::Calendar(market_session(es.exchange.hours.clone(), false));
    let consolidator_id = engine.consolidate(&es.symbol, rule)?;

    let mut expected = ExpectedWindows::es_market_open()?;
    let (strategy_event_sender, mut strategy_event_receiver) = mpsc::channel(buffer_size);
    let engine_task = tokio::spawn(engine.run(strategy_event_sender));

    let mut checked = 0;
    'strategy_loop: while let Some(strategy_event) = strategy_event_receiver.recv().await {
        match strategy_event {
            StrategyEvent::Consolidated { consolidator, bar } => {
                if consolidator != consolidator_id {
                    continue;
                }
                expected.check(&bar)?;
                checked += 1;
            }
            StrategyEvent::ShutdownEvent(message) => {
                info!("{}", message);
                break 'strategy_loop;
            }
        }
    }

    engine_task.await??;
    expected.finish()?;
    Ok(checked)
}

#[tokio::main]
async fn main() {
    env_logger::init();
    let settings_path = std::env::args().nth(1).map(PathBuf::from).unwrap_or_else(get_toml_file_path);
    let settings = match BacktestSettings::initialise_settings(&settings_path) {
        Ok(settings) => settings,
        Err(e) => {
            error!("Failed to load settings from {:?}: {}", settings_path, e);
            std::process::exit(1);
        }
    };

    match run_regression(settings).await {
        Ok(checked) => {
            let msg = format!("Market open regression passed: {} session bars matched", checked);
            println!("{}", msg.as_str().bright_green());
        }
        Err(e) => {
            error!("{}", e);
            println!("{}", e.to_string().as_str().bright_red());
            std::process::exit(1);
        }
    }
}
