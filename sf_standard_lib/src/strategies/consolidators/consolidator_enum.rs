use chrono::NaiveDateTime;
use crate::strategies::consolidators::count::CountConsolidator;
use crate::strategies::consolidators::time_bucket::{BucketRule, TimeBucketConsolidator};
use crate::strategies::consolidators::{ConsolidatedData, ConsolidatedHandler};
use crate::errors::ConsolidatorError;
use crate::standardized_types::base_data::candle::Candle;
use crate::standardized_types::base_data::traits::BaseData;
use crate::standardized_types::rolling_window::RollingWindow;
use crate::standardized_types::subscriptions::Symbol;

pub enum ConsolidatorEnum {
    TimeBucket(TimeBucketConsolidator),
    Count(CountConsolidator),
}

impl ConsolidatorEnum {
    pub fn time_bucket(symbol: Symbol, rule: BucketRule, history_to_retain: usize) -> Self {
        ConsolidatorEnum::TimeBucket(TimeBucketConsolidator::new(symbol, rule, history_to_retain))
    }

    pub fn count(symbol: Symbol, number: u64, history_to_retain: usize) -> Result<Self, ConsolidatorError> {
        Ok(ConsolidatorEnum::Count(CountConsolidator::new(symbol, number, history_to_retain)?))
    }

    /// Updates the consolidator with the new data point.
    pub fn update<D: BaseData>(&mut self, base_data: &D) -> Result<ConsolidatedData, ConsolidatorError> {
        match self {
            ConsolidatorEnum::TimeBucket(consolidator) => consolidator.update(base_data),
            ConsolidatorEnum::Count(consolidator) => consolidator.update(base_data),
        }
    }

    /// Count consolidators only close on data.
    pub fn update_time(&mut self, time: NaiveDateTime) -> Option<Candle> {
        match self {
            ConsolidatorEnum::TimeBucket(consolidator) => consolidator.update_time(time),
            ConsolidatorEnum::Count(_) => None,
        }
    }

    pub fn symbol(&self) -> &Symbol {
        match self {
            ConsolidatorEnum::TimeBucket(consolidator) => consolidator.symbol(),
            ConsolidatorEnum::Count(consolidator) => consolidator.symbol(),
        }
    }

    pub fn history(&self) -> &RollingWindow<Candle> {
        match self {
            ConsolidatorEnum::TimeBucket(consolidator) => consolidator.history(),
            ConsolidatorEnum::Count(consolidator) => consolidator.history(),
        }
    }

    pub fn on_consolidated(&mut self, handler: ConsolidatedHandler) {
        match self {
            ConsolidatorEnum::TimeBucket(consolidator) => consolidator.on_consolidated(handler),
            ConsolidatorEnum::Count(consolidator) => consolidator.on_consolidated(handler),
        }
    }
}
