//! # Google 財經採集模組
//!
//! 從 Google Finance 的個股報價頁抓取公司名稱、最新價格與漲跌。
//!
//! - 來源網址：`https://www.google.com/finance/quote/{SYMBOL}:{EXCHANGE}`
//! - 抓取技術：HTTP GET 搭配 CSS Selector 解析，selector 由設定檔提供。

use anyhow::Result;

use crate::{config::App, crawler::share::QuoteSelectors, util::http::HttpClient};

/// 即時報價採集子模組
pub mod quote;

/// Google 財經採集器
pub struct GoogleFinance {
    url_template: String,
    selectors: QuoteSelectors,
    http: HttpClient,
}

impl GoogleFinance {
    pub fn new(app: &App) -> Result<Self> {
        Ok(GoogleFinance {
            url_template: app.crawler.url_template.clone(),
            selectors: QuoteSelectors::new(&app.selector, &app.crawler.currency_symbol)?,
            http: HttpClient::new(&app.crawler)?,
        })
    }
}
