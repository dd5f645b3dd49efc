use crate::strategies::consolidators::{ConsolidatedData, ConsolidatedHandler, Handlers};
use crate::errors::ConsolidatorError;
use crate::standardized_types::base_data::candle::Candle;
use crate::standardized_types::base_data::traits::BaseData;
use crate::standardized_types::rolling_window::RollingWindow;
use crate::standardized_types::subscriptions::Symbol;

/// A consolidator that produces a new candle after a certain number of data points have been added.
/// The candle spans the first observation's time to the last observation's end time.
pub struct CountConsolidator {
    symbol: Symbol,
    number: u64,
    counter: u64,
    current_data: Option<Candle>,
    last_time: Option<chrono::NaiveDateTime>,
    handlers: Handlers,
    history: RollingWindow<Candle>,
}

impl CountConsolidator {
    pub fn new(symbol: Symbol, number: u64, history_to_retain: usize) -> Result<Self, ConsolidatorError> {
        if number == 0 {
            return Err(ConsolidatorError::InvalidCount);
        }
        Ok(CountConsolidator {
            symbol,
            number,
            counter: 0,
            current_data: None,
            last_time: None,
            handlers: Handlers::default(),
            history: RollingWindow::new(history_to_retain),
        })
    }

    pub fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    pub fn history(&self) -> &RollingWindow<Candle> {
        &self.history
    }

    pub fn on_consolidated(&mut self, handler: ConsolidatedHandler) {
        self.handlers.push(handler);
    }

    /// Returns a closed candle when the count is reached.
    pub fn update<D: BaseData>(&mut self, data: &D) -> Result<ConsolidatedData, ConsolidatorError> {
        if data.symbol() != &self.symbol {
            return Err(ConsolidatorError::SymbolMismatch {
                expected: self.symbol.to_string(),
                received: data.symbol().to_string(),
            });
        }
        if let Some(last) = self.last_time {
            if data.time() < last {
                return Err(ConsolidatorError::OutOfOrder {
                    symbol: self.symbol.name.clone(),
                    time: data.time(),
                    last,
                });
            }
        }
        self.last_time = Some(data.time());

        if let Some(candle) = self.current_data.as_mut() {
            candle.update(data);
            candle.end_time = data.end_time();
        } else {
            self.current_data = Some(Candle::from_data(data, data.time(), data.end_time()));
        }
        self.counter += 1;

        if self.counter < self.number {
            return Ok(ConsolidatedData {
                open_data: self.current_data.clone(),
                closed_data: None,
            });
        }
        self.counter = 0;
        match self.current_data.take() {
            Some(mut consolidated) => {
                consolidated.is_closed = true;
                self.handlers.emit(&consolidated);
                self.history.add(consolidated.clone());
                Ok(ConsolidatedData::with_closed(None, consolidated))
            }
            None => Ok(ConsolidatedData {
                open_data: None,
                closed_data: None,
            }),
        }
    }
}
