use std::path::PathBuf;
use chrono::NaiveDateTime;
use log::{error, info};
use sf_standard_lib::errors::SessionForgeError;
use sf_standard_lib::helpers::get_market_hours_database_path;
use sf_standard_lib::standardized_types::enums::MarketType;
use sf_standard_lib::standardized_types::market_maps::MarketHoursDatabase;
use structopt::StructOpt;

/// Prints the session calendar around an exchange local time.
#[derive(Debug, StructOpt, Clone)]
struct SessionQueryOptions {
    #[structopt(short = "s", long = "symbol", default_value = "ES")]
    pub symbol: String,

    /// eg: futures-cme, equities, forex, crypto
    #[structopt(short = "m", long = "market", default_value = "futures-cme")]
    pub market_type: MarketType,

    /// Exchange local time, eg: 2013-10-07T09:30:00
    #[structopt(short = "t", long = "time")]
    pub time: NaiveDateTime,

    #[structopt(short = "e", long = "extended")]
    pub extended_market_hours: bool,

    /// Market hours json merged over the built in calendars
    #[structopt(short = "d", long = "database", parse(from_os_str))]
    pub database: Option<PathBuf>,
}

fn print_sessions(options: &SessionQueryOptions) -> Result<(), SessionForgeError> {
    let path = options.database.clone().unwrap_or_else(get_market_hours_database_path);
    let database = MarketHoursDatabase::load(&path)?;
    let hours = database.get(&options.market_type, &options.symbol)?;
    info!("{} entries loaded, querying {} in {}", database.len(), options.symbol, hours.time_zone);

    let extended = options.extended_market_hours;
    let open = hours.get_next_market_open(options.time, extended)?;
    let close = hours.get_next_market_close(open, extended)?;
    println!("{} {}: {}", options.market_type, options.symbol, options.time);
    println!("  open now:    {}", hours.is_open(options.time, extended));
    println!("  next open:   {}", open);
    println!("  next close:  {}", close);
    println!("  next day:    {}", hours.get_next_trading_day(options.time.date())?);
    Ok(())
}

fn main() {
    env_logger::init();
    let options = SessionQueryOptions::from_args();
    if let Err(e) = print_sessions(&options) {
        error!("{}", e);
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
