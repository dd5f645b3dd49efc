use std::fmt;
use serde_derive::{Deserialize, Serialize};
use crate::standardized_types::enums::MarketType;

pub type SymbolName = String;

#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Hash, Debug, PartialOrd, Ord)]
pub struct Symbol {
    pub name: SymbolName,
    pub market_type: MarketType,
}

impl Symbol {
    pub fn new(name: SymbolName, market_type: MarketType) -> Self {
        Symbol {
            name,
            market_type,
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.market_type.code(), self.name)
    }
}
