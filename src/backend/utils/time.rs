use crate::models::common::{TimestampMs, TimestampNs};

/// Returns the current Internet Computer time as nanoseconds since epoch.
pub fn get_current_time_ns() -> TimestampNs {
    ic_cdk::api::time()
}

/// Current time in the millisecond resolution stored on notes.
pub fn get_current_time_ms() -> TimestampMs {
    ns_to_ms(get_current_time_ns())
}

pub fn ns_to_ms(ns: TimestampNs) -> TimestampMs {
    (ns / 1_000_000) as TimestampMs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_nanos_to_millis() {
        assert_eq!(ns_to_ms(1_700_000_000_123_456_789), 1_700_000_000_123);
        assert_eq!(ns_to_ms(999_999), 0);
    }
}
