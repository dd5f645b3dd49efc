use std::fs;
use std::path::Path;
use std::str::FromStr;
use chrono::NaiveDate;
use log::info;
use serde_derive::{Deserialize, Serialize};
use crate::errors::SessionForgeError;
use crate::helpers::converters::parse_date;
use crate::standardized_types::resolution::Resolution;

/// Replay parameters, stored as `resources/backtest_settings.toml`.
///
/// Dates are `YYYY-MM-DD` in the exchange local time of the securities, the replay covers
/// `start_date` through the whole of `end_date`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct BacktestSettings {
    pub start_date: String,
    pub end_date: String,
    /// The resolution of the generated data, eg: `1-M`
    pub resolution: String,
    pub extended_market_hours: bool,
    pub seed: u64,
    /// Capacity of the strategy event channel.
    pub buffer_size: usize,
    /// Consolidated bars kept by each consolidator.
    pub history_to_retain: usize,
    /// An optional json file of market hours entries, merged over the built in calendars.
    #[serde(default)]
    pub market_hours_database: Option<String>,
}

impl Default for BacktestSettings {
    fn default() -> Self {
        BacktestSettings {
            start_date: "2013-10-06".to_string(),
            end_date: "2013-10-14".to_string(),
            resolution: "1-M".to_string(),
            extended_market_hours: false,
            seed: 1,
            buffer_size: 100,
            history_to_retain: 10,
            market_hours_database: None,
        }
    }
}

impl BacktestSettings {
    /// Loads the settings at `path`, writing and returning the defaults when the file does not exist.
    pub fn initialise_settings(path: &Path) -> Result<Self, SessionForgeError> {
        if !path.exists() {
            let default_settings = BacktestSettings::default();
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent)?;
                }
            }
            let toml_content = toml::to_string(&default_settings)?;
            fs::write(path, toml_content)?;
            info!("Created default backtest settings at: {:?}", path);
            return Ok(default_settings);
        }
        Self::load(path)
    }

    pub fn load(path: &Path) -> Result<Self, SessionForgeError> {
        let toml_content = fs::read_to_string(path)?;
        let settings: BacktestSettings = toml::from_str(&toml_content)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn start_date(&self) -> Result<NaiveDate, SessionForgeError> {
        Ok(parse_date(&self.start_date)?)
    }

    pub fn end_date(&self) -> Result<NaiveDate, SessionForgeError> {
        Ok(parse_date(&self.end_date)?)
    }

    pub fn resolution(&self) -> Result<Resolution, SessionForgeError> {
        Resolution::from_str(&self.resolution).map_err(SessionForgeError::InvalidConfig)
    }

    pub fn validate(&self) -> Result<(), SessionForgeError> {
        let start = self.start_date()?;
        let end = self.end_date()?;
        if start > end {
            return Err(SessionForgeError::InvalidConfig(format!(
                "start_date {} is after end_date {}",
                start, end
            )));
        }
        self.resolution()?;
        if self.buffer_size == 0 {
            return Err(SessionForgeError::InvalidConfig("buffer_size must be positive".to_string()));
        }
        Ok(())
    }
}
