pub mod consolidators;
pub mod historical_engine;
pub mod securities;
pub mod strategy_events;
