use std::fmt::Debug;
use std::str::FromStr;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter};

// Enum for exchanges
#[derive(Serialize, Deserialize, Clone, PartialOrd, Eq, Ord, PartialEq, Copy, Debug, Display, EnumIter, Hash)]
pub enum Exchange {
    CBOT,
    CME,
    COMEX,
    NYMEX,
    EUREX,
}

#[derive(Serialize, Deserialize, Clone, PartialOrd, Eq, Ord, PartialEq, Copy, Debug, Display, Hash)]
pub enum MarketType {
    Forex,
    Futures(Exchange),
    Equities,
    Crypto,
}

impl MarketType {
    /// The lower case code used to key market hours entries, eg: `futures-cme`
    pub fn code(&self) -> String {
        match self {
            MarketType::Forex => "forex".to_string(),
            MarketType::Futures(exchange) => format!("futures-{}", exchange.to_string().to_lowercase()),
            MarketType::Equities => "equities".to_string(),
            MarketType::Crypto => "crypto".to_string(),
        }
    }
}

impl FromStr for MarketType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_lowercase();
        match lowered.as_str() {
            "forex" => return Ok(MarketType::Forex),
            "equities" => return Ok(MarketType::Equities),
            "crypto" => return Ok(MarketType::Crypto),
            _ => {}
        }
        let exchange = lowered
            .strip_prefix("futures-")
            .or_else(|| lowered.strip_prefix("futures_"))
            .ok_or_else(|| format!("Unknown market type: {}", s))?;
        let exchange = match exchange {
            "cbot" => Exchange::CBOT,
            "cme" => Exchange::CME,
            "comex" => Exchange::COMEX,
            "nymex" => Exchange::NYMEX,
            "eurex" => Exchange::EUREX,
            _ => return Err(format!("Unknown futures exchange in: {}", s)),
        };
        Ok(MarketType::Futures(exchange))
    }
}
