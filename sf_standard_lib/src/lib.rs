pub mod app;
pub mod errors;
pub mod helpers;
pub mod standardized_types;
pub mod strategies;
