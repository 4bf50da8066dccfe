use chrono::{SecondsFormat, Utc};

/// Returns the current UTC instant in ISO-8601 form, suitable for the
/// `registered_at` field of a roster document.
pub fn utc_timestamp_iso8601() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamp_is_utc_iso8601() {
        let stamp = utc_timestamp_iso8601();
        assert!(stamp.ends_with('Z'));
        let parsed = chrono::DateTime::parse_from_rfc3339(&stamp).expect("parse");
        assert_eq!(parsed.timezone().utc_minus_local(), 0);
    }
}
