use rust_decimal::Decimal;

pub type Price = Decimal;
pub type Volume = Decimal;
