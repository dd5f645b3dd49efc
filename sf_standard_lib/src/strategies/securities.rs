use std::sync::Arc;
use crate::standardized_types::market_hours::SecurityExchangeHours;
use crate::standardized_types::subscriptions::Symbol;

#[derive(Clone, Debug)]
pub struct SecurityExchange {
    pub hours: Arc<SecurityExchangeHours>,
}

/// A security registered with the engine, along with the calendar of the exchange it trades on.
#[derive(Clone, Debug)]
pub struct Security {
    pub symbol: Symbol,
    pub exchange: SecurityExchange,
}

impl Security {
    pub fn new(symbol: Symbol, hours: SecurityExchangeHours) -> Self {
        Security {
            symbol,
            exchange: SecurityExchange {
                hours: Arc::new(hours),
            },
        }
    }
}
