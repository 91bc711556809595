//! Human-readable byte sizes and percentages, in integer arithmetic.

/// Binary unit prefixes, smallest first.
const UNITS: [&str; 5] = ["", "K", "M", "G", "T"];

/// Scale a byte count to the largest 1024-based unit below it.
///
/// `1253656` becomes `"1.20MB"`, `1253656678` becomes `"1.17GB"`. Returns
/// `None` at or beyond 1024 TB.
pub fn format_size(bytes: u64) -> Option<String> {
    let bytes = u128::from(bytes);
    let mut divisor: u128 = 1;

    for unit in UNITS {
        if bytes < divisor * 1024 {
            let hundredths = (bytes * 100 + divisor / 2) / divisor;
            return Some(format!("{}.{:02}{}B", hundredths / 100, hundredths % 100, unit));
        }
        divisor *= 1024;
    }
    None
}

/// `part / total` as a percentage with one decimal, e.g. `"45.3%"`.
///
/// A zero total reads as `"0.0%"`.
pub fn format_percent(part: u64, total: u64) -> String {
    if total == 0 {
        return "0.0%".to_string();
    }
    let tenths = (u128::from(part) * 1000 + u128::from(total) / 2) / u128::from(total);
    format!("{}.{}%", tenths / 10, tenths % 10)
}
