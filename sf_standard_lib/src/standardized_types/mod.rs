pub mod base_data;
pub mod enums;
pub mod market_hours;
pub mod market_maps;
pub mod new_types;
pub mod resolution;
pub mod rolling_window;
pub mod subscriptions;
