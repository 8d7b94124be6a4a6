const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

/// Human readable file size: `0 Bytes`, `1.5 KB`, `10 MB`.
///
/// Values are rounded to two decimals; sizes past the GB range stay in GB.
pub fn format_file_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let rounded = (value * 100.0).round() / 100.0;
    format!("{} {}", rounded, UNITS[unit])
}
