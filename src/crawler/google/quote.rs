use anyhow::Result;
use async_trait::async_trait;

use crate::{
    crawler::{google::GoogleFinance, QuoteSource},
    declare::{StockQuote, Ticker},
};

#[async_trait]
impl QuoteSource for GoogleFinance {
    fn quote_url(&self, ticker: &Ticker) -> String {
        self.url_template
            .replace("{ticker}", &ticker.to_string())
            .replace("{symbol}", &ticker.symbol)
            .replace("{exchange}", &ticker.exchange)
    }

    async fn fetch_page(&self, url: &str) -> Result<String> {
        self.http.get(url).await
    }

    fn extract(&self, ticker: &Ticker, page: &str) -> StockQuote {
        self.selectors.extract(ticker, page)
    }
}
