use std::{fs::File, io, path::Path};

use anyhow::{anyhow, Result};

use crate::{declare::StockQuote, logging};

pub const HEADER: [&str; 3] = ["Company Name", "Price", "Change"];

/// 將報價依收集順序寫入 CSV 檔
///
/// Failing to create the file or to write the header is fatal and returned as
/// an error. A row that cannot be written is logged and skipped. Returns the
/// number of data rows written.
pub fn write_csv(path: &Path, quotes: &[StockQuote]) -> Result<usize> {
    let file = File::create(path).map_err(|why| {
        anyhow!(
            "Failed to create output CSV file {} because {:?}",
            path.display(),
            why
        )
    })?;

    write_quotes(csv::Writer::from_writer(file), quotes)
}

/// Writes the header and one `(company, price, change)` row per quote.
pub fn write_quotes<W: io::Write>(
    mut writer: csv::Writer<W>,
    quotes: &[StockQuote],
) -> Result<usize> {
    writer
        .write_record(HEADER)
        .map_err(|why| anyhow!("Failed to write CSV header because {:?}", why))?;

    let mut written = 0;
    for quote in quotes {
        match writer.write_record([&quote.company, &quote.price, &quote.change]) {
            Ok(_) => written += 1,
            Err(why) => {
                let msg = format!(
                    "Error writing stock data of {} to CSV because {:?}",
                    quote.ticker, why
                );
                logging::error_console(msg.clone());
                logging::error_file_async(msg);
            }
        }
    }

    writer
        .flush()
        .map_err(|why| anyhow!("Failed to flush CSV writer because {:?}", why))?;

    Ok(written)
}
