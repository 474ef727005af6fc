use std::sync::{Mutex, MutexGuard};

use crate::{declare::StockQuote, logging};

/// Append-only collection of validated quotes.
///
/// Every append goes through one lock, so fetches may report back from any
/// number of tasks. Insertion order is completion order, which only matches
/// the ticker order when fetches run one at a time.
#[derive(Debug, Default)]
pub struct Collector {
    quotes: Mutex<Vec<StockQuote>>,
}

impl Collector {
    pub fn new() -> Self {
        Default::default()
    }

    /// Appends `quote` when company, price and change are all non-empty.
    ///
    /// Returns whether the quote was kept. A rejected quote is logged and dropped.
    pub fn add_if_valid(&self, quote: StockQuote) -> bool {
        if !quote.is_complete() {
            let msg = format!(
                "Failed to fetch valid data for {}. Check the selectors. company:'{}' price:'{}'(raw '{}') change:'{}'",
                quote.ticker, quote.company, quote.price, quote.raw_price, quote.change
            );
            logging::warn_console(msg.clone());
            logging::warn_file_async(msg);
            return false;
        }

        logging::info_console(format!(
            "Fetched - Company: {}, Price: {}, Change: {}",
            quote.company, quote.price, quote.change
        ));
        self.lock().push(quote);

        true
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Consumes the collector once every fetch has finished.
    pub fn into_quotes(self) -> Vec<StockQuote> {
        self.quotes
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn lock(&self) -> MutexGuard<'_, Vec<StockQuote>> {
        // 寫入只有 push，就算其他執行緒 panic 資料仍是完整的
        self.quotes
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
