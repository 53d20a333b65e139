const UNITS: [&str; 5] = ["K", "M", "G", "T", "P"];

/// Scale a byte count on the 1024 ladder, e.g. `1024` => `"1.0K"`.
///
/// Counts below one kilobyte are shown as-is with a `B` suffix. Anything
/// beyond petabytes stays in `P`.
pub fn human_size(bytes: u64) -> String {
    if bytes < 1024 {
        return format!("{}B", bytes);
    }

    let mut value = bytes as f64 / 1024.0;
    let mut unit = UNITS[0];
    for &next in UNITS.iter().skip(1) {
        if value < 1024.0 {
            break;
        }
        value /= 1024.0;
        unit = next;
    }
    format!("{:.1}{}", value, unit)
}
