use std::collections::VecDeque;
use chrono::{NaiveDate, NaiveDateTime};
use sf_standard_lib::app::settings::BacktestSettings;
use sf_standard_lib::standardized_types::enums::{Exchange, MarketType};
use sf_standard_lib::strategies::consolidators::calendar::market_session;
use sf_standard_lib::strategies::consolidators::time_bucket::BucketRule;
use sf_standard_lib::strategies::historical_engine::HistoricalEngine;
use sf_standard_lib::strategies::strategy_events::StrategyEvent;
use tokio::sync::mpsc;

fn session(day: u32, hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2013, 10, day).unwrap().and_hms_opt(hour, minute, 0).unwrap()
}

async fn consolidated_spans(settings: BacktestSettings, extended: bool) -> Vec<(NaiveDateTime, NaiveDateTime)> {
    let mut engine = HistoricalEngine::new(settings).unwrap();
    let es = engine.add_security("ES", MarketType::Futures(Exchange::CME)).unwrap();
    let rule = BucketRule::Calendar(market_session(es.exchange.hours.clone(), extended));
    engine.consolidate(&es.symbol, rule).unwrap();

    let (sender, mut receiver) = mpsc::channel(50);
    let engine_task = tokio::spawn(engine.run(sender));
    let mut spans = Vec::new();
    while let Some(event) = receiver.recv().await {
        match event {
            StrategyEvent::Consolidated { bar, .. } => spans.push((bar.time, bar.end_time)),
            StrategyEvent::ShutdownEvent(_) => break,
        }
    }
    engine_task.await.unwrap().unwrap();
    spans
}

#[tokio::test]
async fn es_market_open_windows_match_expected_sequence() {
    let mut expected: VecDeque<(NaiveDateTime, NaiveDateTime)> = [7, 8, 9, 10, 11, 14]
        .into_iter()
        .map(|day| (session(day, 16, 30), session(day, 17, 0)))
        .collect();

    for (time, end_time) in consolidated_spans(BacktestSettings::default(), false).await {
        let (open, close) = expected.pop_front().expect("more bars than expected windows");
        assert_eq!((time, end_time), (open, close));
    }
    assert!(expected.is_empty(), "missing windows: {:?}", expected);
}

#[tokio::test]
async fn es_extended_data_folds_into_the_next_session_open() {
    // the evening session continues overnight into the regular session, so the only
    // opens are after the 16:15-16:30 halt
    let settings = BacktestSettings {
        start_date: "2013-10-06".to_string(),
        end_date: "2013-10-08".to_string(),
        extended_market_hours: true,
        ..BacktestSettings::default()
    };
    let spans = consolidated_spans(settings, true).await;
    assert_eq!(
        spans,
        vec![
            (session(7, 16, 30), session(7, 17, 0)),
            (session(8, 16, 30), session(8, 17, 0)),
        ]
    );
}
