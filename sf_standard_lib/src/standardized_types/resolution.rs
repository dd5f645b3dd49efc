use std::fmt;
use std::str::FromStr;
use chrono::Duration;
use serde_derive::{Deserialize, Serialize};

///The resolution of a data point, which determines the time period it covers.
#[derive(Serialize, Deserialize, Clone, PartialOrd, Eq, Ord, PartialEq, Copy, Debug, Hash)]
pub enum Resolution {
    Seconds(u64),
    Minutes(u64),
    Hours(u64),
    Days(u64),
    Weeks(u64),
}

impl Default for Resolution {
    fn default() -> Self {
        Resolution::Minutes(1)
    }
}

impl FromStr for Resolution {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let resolution_string = s.to_uppercase();

        // Handle both "-" and "_" separators
        let parts: Vec<&str> = if resolution_string.contains('-') {
            resolution_string.split('-').collect()
        } else if resolution_string.contains('_') {
            resolution_string.split('_').collect()
        } else {
            return Err(format!("Invalid format: no separator found in {}", s));
        };

        if parts.len() != 2 {
            return Err(format!("Invalid format: expected 2 parts in {}", s));
        }

        let number = parts[0].trim().parse::<u64>()
            .map_err(|_| format!("Invalid number in {}", s))?;
        if number == 0 {
            return Err(format!("Resolution must be positive in {}", s));
        }

        match parts[1].trim().chars().next() {
            Some('S') => Ok(Resolution::Seconds(number)),
            Some('M') => Ok(Resolution::Minutes(number)),
            Some('H') => Ok(Resolution::Hours(number)),
            Some('D') => Ok(Resolution::Days(number)),
            Some('W') => Ok(Resolution::Weeks(number)),
            Some(c) => Err(format!("Invalid resolution type '{}' in {}", c, s)),
            None => Err(format!("Empty resolution type in {}", s)),
        }
    }
}

impl Resolution {
    pub fn as_duration(&self) -> Duration {
        match self {
            Resolution::Seconds(val) => Duration::seconds(*val as i64),
            Resolution::Minutes(val) => Duration::minutes(*val as i64),
            Resolution::Hours(val) => Duration::hours(*val as i64),
            Resolution::Days(val) => Duration::days(*val as i64),
            Resolution::Weeks(val) => Duration::weeks(*val as i64),
        }
    }

    pub fn as_seconds(&self) -> i64 {
        self.as_duration().num_seconds()
    }

    /// The short form accepted by `from_str`, eg: `1-M`
    pub fn code(&self) -> String {
        match self {
            Resolution::Seconds(val) => format!("{}-S", val),
            Resolution::Minutes(val) => format!("{}-M", val),
            Resolution::Hours(val) => format!("{}-H", val),
            Resolution::Days(val) => format!("{}-D", val),
            Resolution::Weeks(val) => format!("{}-W", val),
        }
    }
}

/// eg: Second(5) would represent a 5-Second resolution
impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resolution::Seconds(val) => write!(f, "{}-Second", val),
            Resolution::Minutes(val) => write!(f, "{}-Minute", val),
            Resolution::Hours(val) => write!(f, "{}-Hour", val),
            Resolution::Days(val) => write!(f, "{}-Days", val),
            Resolution::Weeks(val) => write!(f, "{}-Week", val),
        }
    }
}
