//! Duration formatting for progress output.

/// Formats whole minutes as `1h30m`, `2h`, `45m` or `0m`.
pub fn format_minutes(minutes: u32) -> String {
    let hours = minutes / 60;
    let rest = minutes % 60;

    match (hours, rest) {
        (0, rest) => format!("{}m", rest),
        (hours, 0) => format!("{}h", hours),
        (hours, rest) => format!("{}h{}m", hours, rest),
    }
}
