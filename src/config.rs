use std::{env, path::PathBuf, str::FromStr};

use anyhow::Result;
use config::{Config as config_config, File as config_file};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::{declare::Ticker, logging};

const CONFIG_PATH: &str = "app.json";

#[derive(Serialize, Deserialize, Default, Debug, Clone)]
pub struct App {
    #[serde(default)]
    pub crawler: Crawler,
    #[serde(default)]
    pub selector: Selector,
    #[serde(default)]
    pub output: Output,
    #[serde(default)]
    pub chart: Chart,
}

const QUOTE_TICKERS: &str = "QUOTE_TICKERS";
const QUOTE_URL_TEMPLATE: &str = "QUOTE_URL_TEMPLATE";
const QUOTE_CONCURRENCY: &str = "QUOTE_CONCURRENCY";
const QUOTE_TIMEOUT_SECS: &str = "QUOTE_TIMEOUT_SECS";
const QUOTE_USER_AGENT: &str = "QUOTE_USER_AGENT";

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct Crawler {
    /// 支援 `{ticker}`、`{symbol}`、`{exchange}` 三種替換字
    pub url_template: String,
    pub tickers: Vec<String>,
    pub currency_symbol: String,
    /// 1 代表逐一抓取
    pub concurrency: usize,
    pub timeout_secs: u64,
    pub connect_timeout_secs: u64,
    /// 空字串時每次啟動隨機產生
    pub user_agent: String,
}

impl Default for Crawler {
    fn default() -> Self {
        Crawler {
            url_template: "https://www.google.com/finance/quote/{ticker}".to_string(),
            tickers: [
                "MSFT:NASDAQ",
                "AAPL:NASDAQ",
                "GOOGL:NASDAQ",
                "TSLA:NASDAQ",
                "AMZN:NASDAQ",
                "NVDA:NASDAQ",
            ]
            .iter()
            .map(|t| t.to_string())
            .collect(),
            currency_symbol: "$".to_string(),
            concurrency: 1,
            timeout_secs: 15,
            connect_timeout_secs: 8,
            user_agent: String::new(),
        }
    }
}

impl Crawler {
    pub fn tickers(&self) -> Vec<Ticker> {
        Ticker::parse_all(&self.tickers)
    }
}

const QUOTE_SELECTOR_COMPANY: &str = "QUOTE_SELECTOR_COMPANY";
const QUOTE_SELECTOR_PRICE: &str = "QUOTE_SELECTOR_PRICE";
const QUOTE_SELECTOR_CHANGE: &str = "QUOTE_SELECTOR_CHANGE";

/// 報價頁面上三個欄位的 CSS selector，頁面改版時只需調整這裡
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct Selector {
    pub company: String,
    pub price: String,
    pub change: String,
}

impl Default for Selector {
    fn default() -> Self {
        Selector {
            company: "div.zzDege".to_string(),
            price: "div.YMlKec.fxKbKc".to_string(),
            change: "div.P6K39c".to_string(),
        }
    }
}

const QUOTE_CSV_PATH: &str = "QUOTE_CSV_PATH";
const QUOTE_CHART_PATH: &str = "QUOTE_CHART_PATH";
const QUOTE_CONTINUE_ON_CSV_FAILURE: &str = "QUOTE_CONTINUE_ON_CSV_FAILURE";
const QUOTE_CHART_FONT: &str = "QUOTE_CHART_FONT";

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct Output {
    pub csv_path: PathBuf,
    pub chart_path: PathBuf,
    /// false: CSV 建檔失敗即結束; true: 仍嘗試產生圖表
    pub continue_on_csv_failure: bool,
}

impl Default for Output {
    fn default() -> Self {
        Output {
            csv_path: PathBuf::from("stocks.csv"),
            chart_path: PathBuf::from("stocks_graph.png"),
            continue_on_csv_failure: false,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct Chart {
    pub title: String,
    pub x_desc: String,
    pub y_desc: String,
    pub width_inch: f64,
    pub height_inch: f64,
    pub dpi: f64,
    /// TTF/OTF 字型檔，空字串時從常見的系統字型路徑中尋找
    pub font_path: String,
}

impl Default for Chart {
    fn default() -> Self {
        Chart {
            title: "Stock Prices".to_string(),
            x_desc: "Companies".to_string(),
            y_desc: "Price (USD)".to_string(),
            width_inch: 12.0,
            height_inch: 6.0,
            dpi: 96.0,
            font_path: String::new(),
        }
    }
}

impl Chart {
    /// Pixel size of the rendered image.
    pub fn size(&self) -> (u32, u32) {
        let px = |inch: f64| (inch * self.dpi).round().max(1.0) as u32;
        (px(self.width_inch), px(self.height_inch))
    }
}

pub static SETTINGS: Lazy<App> = Lazy::new(|| match App::get() {
    Ok(app) => app,
    Err(why) => {
        logging::error_file_async(format!(
            "I can't read the config context because {:?}",
            why
        ));
        App::default().override_with_env()
    }
});

impl App {
    fn get() -> Result<Self> {
        let config_path = config_path();
        if config_path.exists() {
            let config: App = config_config::builder()
                .add_source(config_file::from(config_path))
                .build()?
                .try_deserialize()?;
            return Ok(config.override_with_env());
        }

        Ok(App::default().override_with_env())
    }

    /// 將來自於 env 的設定值覆蓋掉 json 上的設定值
    fn override_with_env(mut self) -> Self {
        if let Ok(tickers) = env::var(QUOTE_TICKERS) {
            self.crawler.tickers = split_list(&tickers);
        }

        if let Ok(template) = env::var(QUOTE_URL_TEMPLATE) {
            self.crawler.url_template = template;
        }

        if let Ok(concurrency) = env::var(QUOTE_CONCURRENCY) {
            self.crawler.concurrency = usize::from_str(&concurrency).unwrap_or(1);
        }

        if let Ok(timeout) = env::var(QUOTE_TIMEOUT_SECS) {
            self.crawler.timeout_secs = u64::from_str(&timeout).unwrap_or(15);
        }

        if let Ok(ua) = env::var(QUOTE_USER_AGENT) {
            self.crawler.user_agent = ua;
        }

        if let Ok(company) = env::var(QUOTE_SELECTOR_COMPANY) {
            self.selector.company = company;
        }

        if let Ok(price) = env::var(QUOTE_SELECTOR_PRICE) {
            self.selector.price = price;
        }

        if let Ok(change) = env::var(QUOTE_SELECTOR_CHANGE) {
            self.selector.change = change;
        }

        if let Ok(path) = env::var(QUOTE_CSV_PATH) {
            self.output.csv_path = PathBuf::from(path);
        }

        if let Ok(path) = env::var(QUOTE_CHART_PATH) {
            self.output.chart_path = PathBuf::from(path);
        }

        if let Ok(flag) = env::var(QUOTE_CONTINUE_ON_CSV_FAILURE) {
            self.output.continue_on_csv_failure = bool::from_str(&flag).unwrap_or(false);
        }

        if let Ok(font) = env::var(QUOTE_CHART_FONT) {
            self.chart.font_path = font;
        }

        self
    }

    /// Replaces the ticker list with command-line arguments when any were given.
    pub fn with_args<I: IntoIterator<Item = String>>(mut self, args: I) -> Self {
        let args: Vec<String> = args.into_iter().collect();
        if !args.is_empty() {
            self.crawler.tickers = args.iter().flat_map(|a| split_list(a)).collect();
        }

        self
    }
}

fn split_list(s: &str) -> Vec<String> {
    s.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(String::from)
        .collect()
}

/// 回傳設定檔的路徑
fn config_path() -> PathBuf {
    PathBuf::from(CONFIG_PATH)
}
