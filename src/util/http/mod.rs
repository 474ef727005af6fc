use std::time::{Duration, Instant};

use anyhow::{anyhow, Result};
use once_cell::sync::Lazy;
use reqwest::{Client, Response};
use tokio::sync::Semaphore;

use crate::{config, logging::Logger};

pub mod element;
pub mod user_agent;

static LOGGER: Lazy<Logger> = Lazy::new(|| Logger::new("http"));

/// A reqwest client together with the semaphore that bounds its in-flight
/// requests.
///
/// Built from the `crawler` section of the settings the run was started with,
/// so timeouts, User-Agent and concurrency always match that run.
pub struct HttpClient {
    client: Client,
    /// 與設定的抓取並行數一致，逐一抓取時只有一個許可
    permits: Semaphore,
    user_agent: String,
}

impl HttpClient {
    pub fn new(crawler: &config::Crawler) -> Result<Self> {
        let user_agent = if crawler.user_agent.is_empty() {
            user_agent::gen_random_ua()
        } else {
            crawler.user_agent.clone()
        };

        let client = Client::builder()
            // ===== 壓縮 =====
            .brotli(true)
            .gzip(true)
            .zstd(true)
            // ===== 超時設置 =====
            .connect_timeout(Duration::from_secs(crawler.connect_timeout_secs))
            .timeout(Duration::from_secs(crawler.timeout_secs))
            // ===== TCP =====
            .tcp_nodelay(true)
            .tcp_keepalive(Duration::from_secs(60))
            // ===== Cookie 和重定向 =====
            .cookie_store(true)
            .redirect(reqwest::redirect::Policy::limited(5))
            // ===== Headers =====
            .referer(true)
            .user_agent(user_agent.as_str())
            .build()
            .map_err(|e| anyhow!("Failed to create reqwest client: {:?}", e))?;

        Ok(HttpClient {
            client,
            permits: Semaphore::new(crawler.concurrency.max(1)),
            user_agent,
        })
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// Performs an HTTP GET request and returns the response as text.
    ///
    /// Fails when the request cannot be sent, the server answers with a
    /// non-success status, or the body cannot be read.
    pub async fn get(&self, url: &str) -> Result<String> {
        self.send(url)
            .await?
            .error_for_status()
            .map_err(|e| anyhow!("Unexpected response status from {}: {:?}", url, e))?
            .text()
            .await
            .map_err(|e| anyhow!("Error parsing response text: {:?}", e))
    }

    /// Sends a single GET request. There is no retry: a failure is reported to
    /// the caller, which decides whether to skip the target.
    async fn send(&self, url: &str) -> Result<Response> {
        let permit = self
            .permits
            .acquire()
            .await
            .map_err(|why| anyhow!("Failed to acquire request permit because {:?}", why))?;
        let start = Instant::now();
        let res = self.client.get(url).send().await;
        let elapsed = start.elapsed().as_millis();
        drop(permit);

        match res {
            Ok(response) => {
                LOGGER.info(format!("GET:{} {} {} ms", url, response.status(), elapsed));
                Ok(response)
            }
            Err(why) => {
                LOGGER.error(format!("GET:{} failed because {:?}. {} ms", url, why, elapsed));
                Err(anyhow!("Failed to send request to {} because {:?}", url, why))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging;

    #[test]
    fn test_new_follows_crawler_settings() {
        crate::install_crypto_provider();

        let mut crawler = config::Crawler::default();
        crawler.concurrency = 3;
        crawler.user_agent = "quote-crawler-test/1.0".to_string();
        let http = HttpClient::new(&crawler).unwrap();
        assert_eq!(http.permits.available_permits(), 3);
        assert_eq!(http.user_agent(), "quote-crawler-test/1.0");

        crawler.concurrency = 0;
        crawler.user_agent = String::new();
        let http = HttpClient::new(&crawler).unwrap();
        assert_eq!(http.permits.available_permits(), 1);
        assert!(http.user_agent().starts_with("Mozilla/5.0"));
    }

    #[tokio::test]
    #[ignore]
    async fn test_get() {
        crate::install_crypto_provider();

        let http = HttpClient::new(&config::Crawler::default()).unwrap();
        match http.get("https://www.google.com/finance/quote/MSFT:NASDAQ").await {
            Ok(text) => {
                logging::debug_file_async(format!("body length: {}", text.len()));
                assert!(!text.is_empty());
            }
            Err(why) => {
                logging::error_file_async(format!("Failed to get because {:?}", why));
            }
        }
    }

    #[tokio::test]
    async fn test_get_unreachable_host_is_error() {
        crate::install_crypto_provider();

        let mut crawler = config::Crawler::default();
        crawler.connect_timeout_secs = 2;
        crawler.timeout_secs = 3;
        let http = HttpClient::new(&crawler).unwrap();

        let result = http.get("http://127.0.0.1:9/finance/quote/MSFT:NASDAQ").await;
        assert!(result.is_err());
        assert_eq!(http.permits.available_permits(), 1);
    }
}
