use std::time::{SystemTime, UNIX_EPOCH};

/// Get current Unix timestamp in milliseconds
///
/// A clock set before the epoch reads as zero.
pub fn current_timestamp_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_current_timestamp_millis() {
        let ts1 = current_timestamp_millis();
        assert!(ts1 > 0);

        thread::sleep(Duration::from_millis(20));
        let ts2 = current_timestamp_millis();
        assert!(ts2 >= ts1 + 20);
    }
}
