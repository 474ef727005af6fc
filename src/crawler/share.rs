use anyhow::Result;
use scraper::{Html, Selector};

use crate::{
    config,
    declare::{StockQuote, Ticker},
    util::{http::element, text},
};

/// 報價頁面上公司名稱、價格、漲跌三個欄位的解析器
#[derive(Debug, Clone)]
pub struct QuoteSelectors {
    company: Selector,
    price: Selector,
    change: Selector,
    currency_symbol: String,
}

impl QuoteSelectors {
    /// Compiles the configured selectors. An invalid selector is a configuration
    /// error and is reported up front instead of silently matching nothing.
    pub fn new(selector: &config::Selector, currency_symbol: &str) -> Result<Self> {
        Ok(QuoteSelectors {
            company: element::parse_selector(&selector.company)?,
            price: element::parse_selector(&selector.price)?,
            change: element::parse_selector(&selector.change)?,
            currency_symbol: currency_symbol.to_string(),
        })
    }

    /// Builds a candidate quote from a page body. Missing nodes leave the
    /// corresponding field empty; validation happens in the collector.
    pub fn extract(&self, ticker: &Ticker, page: &str) -> StockQuote {
        let document = Html::parse_document(page);
        let raw_price = element::child_text(&document, &self.price);
        let price = text::normalize_price(&raw_price, &self.currency_symbol);

        StockQuote {
            ticker: ticker.clone(),
            company: element::child_text(&document, &self.company),
            raw_price,
            price,
            change: element::child_text(&document, &self.change),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<!doctype html><html><body>
        <main>
          <div class="zzDege">Apple Inc</div>
          <div class="rPF6Lc"><div class="YMlKec fxKbKc">$227.55</div></div>
          <div class="P6K39c">+1.2%</div>
        </main>
    </body></html>"#;

    fn selectors() -> QuoteSelectors {
        QuoteSelectors::new(&config::Selector::default(), "$").unwrap()
    }

    #[test]
    fn test_extract() {
        let ticker = Ticker::new("AAPL", "NASDAQ");
        let quote = selectors().extract(&ticker, PAGE);

        assert_eq!(quote.ticker, ticker);
        assert_eq!(quote.company, "Apple Inc");
        assert_eq!(quote.raw_price, "$227.55");
        assert_eq!(quote.price, "227.55");
        assert_eq!(quote.change, "+1.2%");
        assert!(quote.is_complete());
    }

    #[test]
    fn test_extract_markup_drift_yields_empty_fields() {
        let page = r#"<html><body><div class="renamed">Apple Inc</div></body></html>"#;
        let quote = selectors().extract(&Ticker::new("AAPL", "NASDAQ"), page);

        assert_eq!(quote.company, "");
        assert_eq!(quote.raw_price, "");
        assert_eq!(quote.price, "");
        assert!(!quote.is_complete());
    }

    #[test]
    fn test_extract_thousands_separator_is_not_normalized() {
        let page = PAGE.replace("$227.55", "$1,234.56");
        let quote = selectors().extract(&Ticker::new("AAPL", "NASDAQ"), &page);

        assert_eq!(quote.raw_price, "$1,234.56");
        assert_eq!(quote.price, "");
        assert!(!quote.is_complete());
    }

    #[test]
    fn test_invalid_selector_is_config_error() {
        let selector = config::Selector {
            company: "div..zz".to_string(),
            ..Default::default()
        };
        assert!(QuoteSelectors::new(&selector, "$").is_err());
    }
}
