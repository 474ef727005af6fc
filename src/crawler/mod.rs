use anyhow::Result;
use async_trait::async_trait;
use futures::{stream, StreamExt};

use crate::{
    collector::Collector,
    declare::{StockQuote, Ticker},
    logging,
};

/// Google 財經
pub mod google;
/// 共用的報價頁面解析
pub(crate) mod share;

/// A page that serves one quote per ticker.
#[async_trait]
pub trait QuoteSource: Sync {
    /// URL the quote page of `ticker` lives at.
    fn quote_url(&self, ticker: &Ticker) -> String;

    /// Downloads the page body.
    async fn fetch_page(&self, url: &str) -> Result<String>;

    /// Builds a candidate quote from a downloaded page.
    fn extract(&self, ticker: &Ticker, page: &str) -> StockQuote;
}

/// 逐一（或依 `concurrency` 並行）抓取報價並交給 collector
///
/// A failed request is logged and the ticker skipped; nothing is retried.
/// With `concurrency <= 1` requests run one after another in ticker order.
/// Returns the number of pages that were downloaded.
pub async fn fetch_quotes<S>(
    source: &S,
    tickers: &[Ticker],
    concurrency: usize,
    collector: &Collector,
) -> usize
where
    S: QuoteSource + ?Sized,
{
    stream::iter(tickers)
        .map(|ticker| visit(source, ticker, collector))
        .buffer_unordered(concurrency.max(1))
        .filter(|fetched| futures::future::ready(*fetched))
        .count()
        .await
}

async fn visit<S>(source: &S, ticker: &Ticker, collector: &Collector) -> bool
where
    S: QuoteSource + ?Sized,
{
    let url = source.quote_url(ticker);
    logging::info_console(format!("Visiting: {}", url));

    match source.fetch_page(&url).await {
        Ok(page) => {
            collector.add_if_valid(source.extract(ticker, &page));
            true
        }
        Err(why) => {
            let msg = format!("Error visiting {}: {:?}", url, why);
            logging::error_console(msg.clone());
            logging::error_file_async(msg);
            false
        }
    }
}
