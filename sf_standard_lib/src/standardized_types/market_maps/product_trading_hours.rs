use ahash::AHashMap;
use chrono::{NaiveDate, Weekday};
use lazy_static::lazy_static;
use crate::helpers::converters::{hms, SECONDS_PER_DAY};
use crate::standardized_types::enums::{Exchange, MarketType};
use crate::standardized_types::market_hours::{week_of, LocalMarketHours, MarketHoursSegment, SecurityExchangeHours};
use crate::standardized_types::market_maps::{hours_key, WILDCARD_SYMBOL};

lazy_static! {
    pub static ref TRADING_HOURS: AHashMap<String, &'static SecurityExchangeHours> = {
        let mut m = AHashMap::new();
        let cme = MarketType::Futures(Exchange::CME);
        let cbot = MarketType::Futures(Exchange::CBOT);
        let eurex = MarketType::Futures(Exchange::EUREX);

        // E-mini Equity Index Futures
        m.insert(hours_key(&cme, "ES"), &*CME_EQUITY_INDEX_HOURS);  // E-mini S&P 500
        m.insert(hours_key(&cme, "NQ"), &*CME_EQUITY_INDEX_HOURS);  // E-mini Nasdaq
        m.insert(hours_key(&cme, "RTY"), &*CME_EQUITY_INDEX_HOURS); // E-mini Russell 2000
        m.insert(hours_key(&cme, "YM"), &*CME_EQUITY_INDEX_HOURS);  // E-mini Dow

        // Micro E-mini Equity Index Futures
        m.insert(hours_key(&cme, "MES"), &*CME_EQUITY_INDEX_HOURS); // Micro S&P 500
        m.insert(hours_key(&cme, "MNQ"), &*CME_EQUITY_INDEX_HOURS); // Micro Nasdaq
        m.insert(hours_key(&cme, "M2K"), &*CME_EQUITY_INDEX_HOURS); // Micro Russell 2000
        m.insert(hours_key(&cme, "MYM"), &*CME_EQUITY_INDEX_HOURS); // Micro Dow

        // Agricultural products use the CBOT grains schedule
        m.insert(hours_key(&cbot, "ZC"), &*CBOT_GRAINS_HOURS); // Corn
        m.insert(hours_key(&cbot, "ZS"), &*CBOT_GRAINS_HOURS); // Soybeans
        m.insert(hours_key(&cbot, "ZW"), &*CBOT_GRAINS_HOURS); // Wheat
        m.insert(hours_key(&cbot, "ZL"), &*CBOT_GRAINS_HOURS); // Soybean Oil
        m.insert(hours_key(&cbot, "ZM"), &*CBOT_GRAINS_HOURS); // Soybean Meal

        // German and European Index Products
        m.insert(hours_key(&eurex, WILDCARD_SYMBOL), &*EUREX_HOURS);

        m.insert(hours_key(&MarketType::Equities, WILDCARD_SYMBOL), &*NYSE_HOURS);
        m.insert(hours_key(&MarketType::Forex, WILDCARD_SYMBOL), &*FOREX_HOURS);
        m.insert(hours_key(&MarketType::Crypto, WILDCARD_SYMBOL), &*CRYPTO_HOURS);
        m
    };

    /// Globex equity index futures in exchange local New York time.
    /// Regular trading 09:30-16:15 and 16:30-17:00, extended trading overnight from 18:00.
    static ref CME_EQUITY_INDEX_HOURS: SecurityExchangeHours = {
        let mut days = vec![LocalMarketHours::from_sorted(
            Weekday::Sun,
            vec![MarketHoursSegment::post_market(hms(18, 0, 0), SECONDS_PER_DAY)],
        )];
        for weekday in [Weekday::Mon, Weekday::Tue, Weekday::Wed, Weekday::Thu] {
            days.push(LocalMarketHours::from_sorted(
                weekday,
                vec![
                    MarketHoursSegment::pre_market(0, hms(9, 30, 0)),
                    MarketHoursSegment::market(hms(9, 30, 0), hms(16, 15, 0)),
                    MarketHoursSegment::market(hms(16, 30, 0), hms(17, 0, 0)),
                    MarketHoursSegment::post_market(hms(18, 0, 0), SECONDS_PER_DAY),
                ],
            ));
        }
        days.push(LocalMarketHours::from_sorted(
            Weekday::Fri,
            vec![
                MarketHoursSegment::pre_market(0, hms(9, 30, 0)),
                MarketHoursSegment::market(hms(9, 30, 0), hms(16, 15, 0)),
                MarketHoursSegment::market(hms(16, 30, 0), hms(17, 0, 0)),
            ],
        ));
        SecurityExchangeHours::from_week(chrono_tz::America::New_York, week_of(days), &CME_HOLIDAYS_2013, &CME_EARLY_CLOSES_2013)
    };

    /// CBOT grains, Chicago time. Night session 19:00-07:45, day session 08:30-13:20.
    static ref CBOT_GRAINS_HOURS: SecurityExchangeHours = {
        let mut days = vec![LocalMarketHours::from_sorted(
            Weekday::Sun,
            vec![MarketHoursSegment::market(hms(19, 0, 0), SECONDS_PER_DAY)],
        )];
        for weekday in [Weekday::Mon, Weekday::Tue, Weekday::Wed, Weekday::Thu, Weekday::Fri] {
            let mut segments = vec![
                MarketHoursSegment::market(0, hms(7, 45, 0)),
                MarketHoursSegment::market(hms(8, 30, 0), hms(13, 20, 0)),
            ];
            if weekday != Weekday::Fri {
                segments.push(MarketHoursSegment::market(hms(19, 0, 0), SECONDS_PER_DAY));
            }
            days.push(LocalMarketHours::from_sorted(weekday, segments));
        }
        SecurityExchangeHours::from_week(chrono_tz::America::Chicago, week_of(days), &CME_HOLIDAYS_2013, &[])
    };

    /// EUREX index derivatives, Berlin time.
    static ref EUREX_HOURS: SecurityExchangeHours = {
        let days = [Weekday::Mon, Weekday::Tue, Weekday::Wed, Weekday::Thu, Weekday::Fri]
            .into_iter()
            .map(|weekday| {
                LocalMarketHours::from_sorted(
                    weekday,
                    vec![
                        MarketHoursSegment::pre_market(hms(1, 10, 0), hms(8, 0, 0)),
                        MarketHoursSegment::market(hms(8, 0, 0), hms(22, 0, 0)),
                    ],
                )
            })
            .collect();
        SecurityExchangeHours::from_week(chrono_tz::Europe::Berlin, week_of(days), &EUREX_HOLIDAYS_2013, &[])
    };

    static ref NYSE_HOURS: SecurityExchangeHours = {
        let days = [Weekday::Mon, Weekday::Tue, Weekday::Wed, Weekday::Thu, Weekday::Fri]
            .into_iter()
            .map(|weekday| {
                LocalMarketHours::from_sorted(
                    weekday,
                    vec![
                        MarketHoursSegment::pre_market(hms(4, 0, 0), hms(9, 30, 0)),
                        MarketHoursSegment::market(hms(9, 30, 0), hms(16, 0, 0)),
                        MarketHoursSegment::post_market(hms(16, 0, 0), hms(20, 0, 0)),
                    ],
                )
            })
            .collect();
        SecurityExchangeHours::from_week(chrono_tz::America::New_York, week_of(days), &NYSE_HOLIDAYS_2013, &NYSE_EARLY_CLOSES_2013)
    };

    /// Sunday 17:00 to Friday 17:00 New York time without a daily break.
    static ref FOREX_HOURS: SecurityExchangeHours = {
        let mut days = vec![LocalMarketHours::from_sorted(
            Weekday::Sun,
            vec![MarketHoursSegment::market(hms(17, 0, 0), SECONDS_PER_DAY)],
        )];
        for weekday in [Weekday::Mon, Weekday::Tue, Weekday::Wed, Weekday::Thu] {
            days.push(LocalMarketHours::open_all_day(weekday));
        }
        days.push(LocalMarketHours::from_sorted(Weekday::Fri, vec![MarketHoursSegment::market(0, hms(17, 0, 0))]));
        SecurityExchangeHours::from_week(chrono_tz::America::New_York, week_of(days), &[], &[])
    };

    static ref CRYPTO_HOURS: SecurityExchangeHours = SecurityExchangeHours::always_open(chrono_tz::UTC);

    static ref CME_HOLIDAYS_2013: Vec<NaiveDate> = dates(&[(1, 1), (3, 29), (12, 25)]);

    static ref CME_EARLY_CLOSES_2013: Vec<(NaiveDate, u32)> = {
        let mut closes: Vec<(NaiveDate, u32)> = dates(&[(1, 21), (2, 18), (5, 27), (7, 4), (9, 2), (11, 28)])
            .into_iter()
            .map(|date| (date, hms(13, 0, 0)))
            .collect();
        closes.extend(dates(&[(11, 29), (12, 24)]).into_iter().map(|date| (date, hms(13, 15, 0))));
        closes
    };

    static ref NYSE_HOLIDAYS_2013: Vec<NaiveDate> =
        dates(&[(1, 1), (1, 21), (2, 18), (3, 29), (5, 27), (7, 4), (9, 2), (11, 28), (12, 25)]);

    static ref NYSE_EARLY_CLOSES_2013: Vec<(NaiveDate, u32)> = dates(&[(7, 3), (11, 29), (12, 24)])
        .into_iter()
        .map(|date| (date, hms(13, 0, 0)))
        .collect();

    static ref EUREX_HOLIDAYS_2013: Vec<NaiveDate> = dates(&[(1, 1), (3, 29), (4, 1), (5, 1), (12, 24), (12, 25), (12, 26), (12, 31)]);
}

fn dates(month_days: &[(u32, u32)]) -> Vec<NaiveDate> {
    month_days
        .iter()
        .filter_map(|(month, day)| NaiveDate::from_ymd_opt(2013, *month, *day))
        .collect()
}

pub fn get_futures_trading_hours(exchange: Exchange, symbol: &str) -> Option<&'static SecurityExchangeHours> {
    let market_type = MarketType::Futures(exchange);
    TRADING_HOURS
        .get(&hours_key(&market_type, symbol))
        .or_else(|| TRADING_HOURS.get(&hours_key(&market_type, WILDCARD_SYMBOL)))
        .copied()
}
