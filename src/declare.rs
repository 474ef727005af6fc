use std::{fmt, str::FromStr};

use anyhow::{anyhow, Result};

/// 交易所代號，格式為 `SYMBOL:EXCHANGE`，例如 `MSFT:NASDAQ`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Ticker {
    pub symbol: String,
    pub exchange: String,
}

impl Ticker {
    pub fn new(symbol: &str, exchange: &str) -> Self {
        Ticker {
            symbol: symbol.trim().to_uppercase(),
            exchange: exchange.trim().to_uppercase(),
        }
    }

    /// Parses every entry, logging and dropping the ones that are malformed.
    pub fn parse_all<I, S>(items: I) -> Vec<Ticker>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        items
            .into_iter()
            .filter_map(|item| match item.as_ref().parse::<Ticker>() {
                Ok(t) => Some(t),
                Err(why) => {
                    crate::logging::warn_console(format!("Skip ticker because {}", why));
                    None
                }
            })
            .collect()
    }
}

impl FromStr for Ticker {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let (symbol, exchange) = s
            .split_once(':')
            .ok_or_else(|| anyhow!("'{}' is not in SYMBOL:EXCHANGE form", s))?;

        if symbol.trim().is_empty() || exchange.trim().is_empty() || exchange.contains(':') {
            return Err(anyhow!("'{}' is not in SYMBOL:EXCHANGE form", s));
        }

        Ok(Ticker::new(symbol, exchange))
    }
}

impl fmt::Display for Ticker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.symbol, self.exchange)
    }
}

/// 從報價頁面擷取到的一筆資料
#[derive(Debug, Clone, PartialEq)]
pub struct StockQuote {
    pub ticker: Ticker,
    /// 公司名稱，原樣保留
    pub company: String,
    /// 頁面上的原始價格文字（含貨幣符號）
    pub raw_price: String,
    /// 去除貨幣符號後的價格，無法解析時為空字串
    pub price: String,
    /// 漲跌，原樣保留
    pub change: String,
}

impl StockQuote {
    /// A quote may enter the collection only when none of the persisted fields are empty.
    pub fn is_complete(&self) -> bool {
        !self.company.is_empty() && !self.price.is_empty() && !self.change.is_empty()
    }

    /// Price as a number; anything unparseable counts as zero.
    pub fn price_value(&self) -> f64 {
        self.price
            .parse::<f64>()
            .ok()
            .filter(|p| p.is_finite())
            .unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quote(company: &str, price: &str, change: &str) -> StockQuote {
        StockQuote {
            ticker: Ticker::new("AAPL", "NASDAQ"),
            company: company.to_string(),
            raw_price: format!("${}", price),
            price: price.to_string(),
            change: change.to_string(),
        }
    }

    #[test]
    fn test_parse_ticker() {
        let t: Ticker = "msft:nasdaq".parse().unwrap();
        assert_eq!(t.symbol, "MSFT");
        assert_eq!(t.exchange, "NASDAQ");
        assert_eq!(t.to_string(), "MSFT:NASDAQ");

        assert!("MSFT".parse::<Ticker>().is_err());
        assert!(":NASDAQ".parse::<Ticker>().is_err());
        assert!("MSFT:".parse::<Ticker>().is_err());
        assert!("A:B:C".parse::<Ticker>().is_err());
    }

    #[test]
    fn test_parse_all_skips_malformed() {
        let tickers = Ticker::parse_all(["AAPL:NASDAQ", "bogus", " tsla : nasdaq "]);
        assert_eq!(
            tickers,
            vec![Ticker::new("AAPL", "NASDAQ"), Ticker::new("TSLA", "NASDAQ")]
        );
    }

    #[test]
    fn test_is_complete() {
        assert!(quote("Apple Inc.", "227.55", "+1.2%").is_complete());
        assert!(!quote("", "227.55", "+1.2%").is_complete());
        assert!(!quote("Apple Inc.", "", "+1.2%").is_complete());
        assert!(!quote("Apple Inc.", "227.55", "").is_complete());
    }

    #[test]
    fn test_price_value() {
        assert_eq!(quote("A", "89.50", "+1").price_value(), 89.5);
        assert_eq!(quote("A", "abc", "+1").price_value(), 0.0);
        assert_eq!(quote("A", "NaN", "+1").price_value(), 0.0);
    }
}
