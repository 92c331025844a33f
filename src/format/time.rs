use chrono::{DateTime, Local};

pub(crate) fn format_display_time(millis: i64) -> String {
    match DateTime::from_timestamp_millis(millis) {
        Some(timestamp) => timestamp
            .with_timezone(&Local)
            .format("%Y-%m-%d %H:%M")
            .to_string(),
        None => millis.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_as_local_minutes() {
        let formatted = format_display_time(0);
        assert_eq!(formatted.len(), "1970-01-01 00:00".len());
        assert!(formatted.starts_with("19"));
    }

    #[test]
    fn out_of_range_falls_back_to_number() {
        assert_eq!(format_display_time(i64::MAX), i64::MAX.to_string());
    }
}
