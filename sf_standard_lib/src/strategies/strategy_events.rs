use crate::standardized_types::base_data::candle::Candle;

/// Identifies a consolidator registered with the engine, in registration order.
pub type ConsolidatorId = u64;

/// Events sent from the engine to the strategy loop, in clock order.
#[derive(Clone, PartialEq, Debug)]
pub enum StrategyEvent {
    /// A consolidator completed a bar.
    Consolidated {
        consolidator: ConsolidatorId,
        bar: Candle,
    },

    /// The replay reached the end of the backtest range, no further events follow.
    ShutdownEvent(String),
}
