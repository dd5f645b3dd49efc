use std::path::PathBuf;

pub mod converters;

/// this just points to the resources folder, where the backtest settings and any market hours database files are located.
pub fn get_resources() -> PathBuf {
    PathBuf::from("./resources")
}

pub fn get_toml_file_path() -> PathBuf {
    let resources = get_resources();
    resources.join("backtest_settings.toml")
}

pub fn get_market_hours_database_path() -> PathBuf {
    get_resources().join("market_hours_database.json")
}
