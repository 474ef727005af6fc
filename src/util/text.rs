/// Strips the currency decoration from a raw price string.
///
/// The text is split on `currency_symbol`, each segment is trimmed, and the
/// first segment that parses as a finite base-10 float is returned unchanged.
/// When no segment parses an empty string is returned so the quote is later
/// discarded by the collector.
///
/// Thousands separators are not handled: `"$1,234.56"` yields `""`.
///
/// # Example
///
/// ```
/// let price = normalize_price("$227.55", "$");
/// assert_eq!(price, "227.55");
/// ```
pub fn normalize_price(raw: &str, currency_symbol: &str) -> String {
    if currency_symbol.is_empty() {
        return first_decimal([raw]);
    }

    first_decimal(raw.split(currency_symbol))
}

fn first_decimal<'a>(segments: impl IntoIterator<Item = &'a str>) -> String {
    segments
        .into_iter()
        .map(str::trim)
        .find(|part| is_decimal(part))
        .map(String::from)
        .unwrap_or_default()
}

/// 只接受一般的十進位寫法，`NaN`、`inf` 不算數字
fn is_decimal(s: &str) -> bool {
    if !s.bytes().any(|b| b.is_ascii_digit()) {
        return false;
    }

    s.parse::<f64>().map(f64::is_finite).unwrap_or(false)
}
