use anyhow::Result;
use serde::Serialize;

use crate::{
    collector::Collector,
    config::App,
    crawler::{self, google::GoogleFinance, QuoteSource},
    logging, output,
};

/// What one run produced.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct Summary {
    /// 設定中有效的代號數
    pub requested: usize,
    /// 成功下載的頁面數
    pub fetched: usize,
    /// 通過驗證的報價數
    pub collected: usize,
    /// 寫入 CSV 的資料列數，未寫入時為 None
    pub csv_rows: Option<usize>,
    /// 圖表中的長條數，未產生圖表時為 None
    pub chart_bars: Option<usize>,
}

/// 從 Google 財經抓取設定中的代號，寫入 CSV 並產生價格長條圖
pub async fn execute(app: &App) -> Result<Summary> {
    let source = GoogleFinance::new(app)?;
    run(&source, app).await
}

/// fetch → extract → collect → {CSV, chart}
///
/// Per-ticker failures are logged and skipped. A CSV that cannot be created
/// aborts the run unless `output.continue_on_csv_failure` is set. A chart
/// failure always aborts. The chart is skipped when nothing was collected.
pub async fn run<S>(source: &S, app: &App) -> Result<Summary>
where
    S: QuoteSource + ?Sized,
{
    let tickers = app.crawler.tickers();
    let collector = Collector::new();
    let fetched =
        crawler::fetch_quotes(source, &tickers, app.crawler.concurrency, &collector).await;
    logging::info_file_async(format!(
        "fetched {} of {} pages, {} quotes are valid",
        fetched,
        tickers.len(),
        collector.len()
    ));

    // 所有抓取都已結束，之後才會排序
    let mut quotes = collector.into_quotes();
    let mut summary = Summary {
        requested: tickers.len(),
        fetched,
        collected: quotes.len(),
        ..Default::default()
    };

    let csv_path = &app.output.csv_path;
    match output::table::write_csv(csv_path, &quotes) {
        Ok(rows) => {
            summary.csv_rows = Some(rows);
            logging::info_console(format!(
                "Data has been successfully written to {}",
                csv_path.display()
            ));
        }
        Err(why) if app.output.continue_on_csv_failure => {
            let msg = format!("{:?}. Continue to the graph", why);
            logging::error_console(msg.clone());
            logging::error_file_async(msg);
        }
        Err(why) => return Err(why),
    }

    if quotes.is_empty() {
        logging::warn_console("No valid quotes were collected, skip the graph".to_string());
    } else {
        let chart_path = &app.output.chart_path;
        let bars = output::chart::render(&mut quotes, chart_path, &app.chart)?;
        summary.chart_bars = Some(bars);
        logging::info_console(format!(
            "Graph has been successfully saved as {}",
            chart_path.display()
        ));
    }

    match serde_json::to_string(&summary) {
        Ok(json) => logging::info_file_async(format!("stock quote summary: {}", json)),
        Err(why) => {
            logging::error_file_async(format!("Failed to serialize summary because {:?}", why))
        }
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use std::{collections::HashMap, path::Path};

    use anyhow::anyhow;
    use async_trait::async_trait;

    use super::*;
    use crate::{
        crawler::share::QuoteSelectors,
        declare::{StockQuote, Ticker},
    };

    struct PagesSource {
        pages: HashMap<String, String>,
        selectors: QuoteSelectors,
    }

    #[async_trait]
    impl QuoteSource for PagesSource {
        fn quote_url(&self, ticker: &Ticker) -> String {
            format!("mem://{}", ticker)
        }

        async fn fetch_page(&self, url: &str) -> Result<String> {
            self.pages
                .get(url)
                .cloned()
                .ok_or_else(|| anyhow!("connection refused: {}", url))
        }

        fn extract(&self, ticker: &Ticker, page: &str) -> StockQuote {
            self.selectors.extract(ticker, page)
        }
    }

    fn page(company: &str, price: &str, change: &str) -> String {
        format!(
            r#"<html><body><div class="zzDege">{}</div><div class="YMlKec fxKbKc">{}</div><div class="P6K39c">{}</div></body></html>"#,
            company, price, change
        )
    }

    fn setup(dir: &Path, tickers: &[&str], pages: &[(&str, String)]) -> (App, PagesSource) {
        let mut app = App::default();
        app.crawler.tickers = tickers.iter().map(|t| t.to_string()).collect();
        app.output.csv_path = dir.join("stocks.csv");
        app.output.chart_path = dir.join("stocks_graph.png");

        let source = PagesSource {
            pages: pages
                .iter()
                .map(|(t, p)| (format!("mem://{}", t), p.clone()))
                .collect(),
            selectors: QuoteSelectors::new(&app.selector, &app.crawler.currency_symbol).unwrap(),
        };

        (app, source)
    }

    fn csv_lines(path: &Path) -> Vec<String> {
        std::fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(String::from)
            .collect()
    }

    #[tokio::test]
    async fn test_empty_company_is_discarded_and_chart_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let (app, source) = setup(
            dir.path(),
            &["XXXX:NASDAQ"],
            &[("XXXX:NASDAQ", page("", "$10.00", "+0.5%"))],
        );

        let summary = run(&source, &app).await.unwrap();

        assert_eq!(
            summary,
            Summary {
                requested: 1,
                fetched: 1,
                collected: 0,
                csv_rows: Some(0),
                chart_bars: None,
            }
        );
        assert_eq!(csv_lines(&app.output.csv_path), vec!["Company Name,Price,Change"]);
        assert!(!app.output.chart_path.exists());
    }

    #[tokio::test]
    async fn test_fetch_errors_and_bad_prices_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let (app, source) = setup(
            dir.path(),
            &["GONE:NYSE", "BIG:NASDAQ", "bad ticker"],
            &[("BIG:NASDAQ", page("Big Co", "$1,234.56", "+0.1%"))],
        );

        let summary = run(&source, &app).await.unwrap();

        assert_eq!(summary.requested, 2);
        assert_eq!(summary.fetched, 1);
        assert_eq!(summary.collected, 0);
        assert_eq!(summary.chart_bars, None);
        assert_eq!(csv_lines(&app.output.csv_path).len(), 1);
    }

    #[tokio::test]
    async fn test_csv_failure_aborts_by_default() {
        let dir = tempfile::tempdir().unwrap();
        let (mut app, source) = setup(dir.path(), &[], &[]);
        app.output.csv_path = dir.path().join("missing").join("stocks.csv");

        assert!(run(&source, &app).await.is_err());
    }

    #[tokio::test]
    async fn test_csv_failure_can_continue() {
        let dir = tempfile::tempdir().unwrap();
        let (mut app, source) = setup(dir.path(), &[], &[]);
        app.output.csv_path = dir.path().join("missing").join("stocks.csv");
        app.output.continue_on_csv_failure = true;

        let summary = run(&source, &app).await.unwrap();
        assert_eq!(summary.csv_rows, None);
        assert_eq!(summary.chart_bars, None);
    }

    #[tokio::test]
    async fn test_single_quote_run() {
        if output::chart::find_font("").is_err() {
            return;
        }

        let dir = tempfile::tempdir().unwrap();
        let (app, source) = setup(
            dir.path(),
            &["AAPL:NASDAQ"],
            &[("AAPL:NASDAQ", page("Apple Inc.", "$227.55", "+1.2%"))],
        );

        let summary = run(&source, &app).await.unwrap();

        assert_eq!(summary.csv_rows, Some(1));
        assert_eq!(summary.chart_bars, Some(1));
        assert_eq!(
            csv_lines(&app.output.csv_path),
            vec!["Company Name,Price,Change", "Apple Inc.,227.55,+1.2%"]
        );
        assert!(app.output.chart_path.exists());
    }

    #[tokio::test]
    async fn test_full_run() {
        if output::chart::find_font("").is_err() {
            return;
        }

        let dir = tempfile::tempdir().unwrap();
        let (app, source) = setup(
            dir.path(),
            &["MSFT:NASDAQ", "AAPL:NASDAQ"],
            &[
                ("MSFT:NASDAQ", page("Microsoft Corp", "$150.00", "-0.4%")),
                ("AAPL:NASDAQ", page("Apple Inc.", "$89.50", "+1.2%")),
            ],
        );

        let summary = run(&source, &app).await.unwrap();

        assert_eq!(summary.collected, 2);
        assert_eq!(summary.csv_rows, Some(2));
        assert_eq!(summary.chart_bars, Some(2));
        // CSV 保留收集順序，圖表才依價格排序
        assert_eq!(
            csv_lines(&app.output.csv_path),
            vec![
                "Company Name,Price,Change",
                "Microsoft Corp,150.00,-0.4%",
                "Apple Inc.,89.50,+1.2%",
            ]
        );
        assert!(app.output.chart_path.exists());
    }
}
