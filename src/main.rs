use std::{env, process::ExitCode};

pub mod collector;
pub mod config;
pub mod crawler;
pub mod declare;
pub mod event;
pub mod logging;
pub mod output;
pub mod util;

/// reqwest 只啟用 rustls-no-provider，必須在建立 client 之前安裝加密實作
pub(crate) fn install_crypto_provider() {
    // 已安裝過時會回傳 Err，忽略即可
    let _ = rustls::crypto::ring::default_provider().install_default();
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();
    install_crypto_provider();

    let app = config::SETTINGS.clone().with_args(env::args().skip(1));

    logging::info_file_async(format!(
        "QuoteCrawler 已啟動 Rust OS/Arch: {}/{} tickers: {:?}",
        env::consts::OS,
        env::consts::ARCH,
        app.crawler.tickers
    ));

    let code = match event::stock_quote::execute(&app).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(why) => {
            logging::error_console(format!("{:?}", why));
            logging::error_file_async(format!("{:?}", why));
            ExitCode::FAILURE
        }
    };

    logging::flush_and_wait();

    code
}
