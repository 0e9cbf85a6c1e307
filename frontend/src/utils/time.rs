/// Milliseconds since the Unix epoch, from the environment the code is
/// actually running in. Session bookkeeping is done in whole milliseconds so
/// the countdown math stays integer-only.
#[cfg(target_arch = "wasm32")]
pub fn now_ms() -> u64 {
    js_sys::Date::now() as u64
}

#[cfg(not(target_arch = "wasm32"))]
pub fn now_ms() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

pub fn format_countdown(remaining_ms: u64) -> String {
    let total_seconds = remaining_ms / 1000;
    format!("{}:{:02}", total_seconds / 60, total_seconds % 60)
}

#[cfg(test)]
mod tests {
    use super::format_countdown;

    #[test]
    fn countdown_formats_minutes_and_seconds() {
        assert_eq!(format_countdown(0), "0:00");
        assert_eq!(format_countdown(59_000), "0:59");
        assert_eq!(format_countdown(61_000), "1:01");
        assert_eq!(format_countdown(300_000), "5:00");
    }

    #[test]
    fn countdown_truncates_partial_seconds() {
        assert_eq!(format_countdown(1999), "0:01");
    }
}
