pub mod candle;
pub mod history;
pub mod tick;
pub mod traits;
