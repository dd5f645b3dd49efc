use crate::standardized_types::base_data::candle::Candle;

pub mod calendar;
pub mod consolidator_enum;
pub mod count;
pub mod time_bucket;

/// Callback invoked with each consolidated bar.
pub type ConsolidatedHandler = Box<dyn FnMut(&Candle) + Send>;

/// The bar still being built and the bar completed by the last update, if any.
#[derive(Debug, Clone, PartialEq)]
pub struct ConsolidatedData {
    pub open_data: Option<Candle>,
    pub closed_data: Option<Candle>,
}

impl ConsolidatedData {
    pub fn with_closed(open_data: Option<Candle>, closed_data: Candle) -> Self {
        Self {
            open_data,
            closed_data: Some(closed_data),
        }
    }
}

/// Subscribers of a consolidator, called in registration order.
#[derive(Default)]
pub(crate) struct Handlers {
    handlers: Vec<ConsolidatedHandler>,
}

impl Handlers {
    pub(crate) fn push(&mut self, handler: ConsolidatedHandler) {
        self.handlers.push(handler);
    }

    pub(crate) fn emit(&mut self, bar: &Candle) {
        for handler in self.handlers.iter_mut() {
            handler(bar);
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.handlers.len()
    }
}
