//! Human-readable timestamps for notifications.

use chrono::{
    format::{Item, StrftimeItems},
    DateTime, FixedOffset, SecondsFormat,
};

use crate::config::ConfigError;

/// Renders epoch timestamps in a fixed local offset.
#[derive(Debug, Clone)]
pub struct DisplayClock {
    offset: FixedOffset,
    format: String,
}

impl DisplayClock {
    /// `offset_minutes` is east of UTC, so Buenos Aires is `-180`.
    pub fn new(offset_minutes: i32, format: impl Into<String>) -> Result<Self, ConfigError> {
        let offset = offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| ConfigError::Invalid {
                name: "DISPLAY_UTC_OFFSET_MINUTES",
                reason: format!("{offset_minutes} is not a valid UTC offset"),
            })?;

        let format = format.into();
        if StrftimeItems::new(&format).any(|item| matches!(item, Item::Error)) {
            return Err(ConfigError::Invalid {
                name: "DISPLAY_TIME_FORMAT",
                reason: format!("'{format}' is not a valid strftime format"),
            });
        }

        Ok(Self { offset, format })
    }

    pub fn format_millis(&self, epoch_ms: i64) -> String {
        match DateTime::from_timestamp_millis(epoch_ms) {
            Some(utc) => utc.with_timezone(&self.offset).format(&self.format).to_string(),
            None => epoch_ms.to_string(),
        }
    }

    pub fn format_seconds(&self, epoch_s: u32) -> String {
        self.format_millis(i64::from(epoch_s) * 1000)
    }
}

/// ISO-8601 UTC with millisecond precision, e.g. `2023-11-14T22:13:20.000Z`.
pub fn iso_utc_seconds(epoch_s: u32) -> String {
    match DateTime::from_timestamp(i64::from(epoch_s), 0) {
        Some(utc) => utc.to_rfc3339_opts(SecondsFormat::Millis, true),
        None => epoch_s.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buenos_aires() -> DisplayClock {
        DisplayClock::new(-180, "%M/%H %d/%m/%Y").unwrap()
    }

    #[test]
    fn millis_rendered_in_offset() {
        // 2023-11-14T22:13:20Z
        assert_eq!(buenos_aires().format_millis(1_700_000_000_000), "13/19 14/11/2023");
    }

    #[test]
    fn seconds_rendered_in_offset() {
        assert_eq!(buenos_aires().format_seconds(0), "00/21 31/12/1969");
    }

    #[test]
    fn out_of_range_millis_fall_back_to_number() {
        assert_eq!(buenos_aires().format_millis(i64::MAX), i64::MAX.to_string());
    }

    #[test]
    fn custom_format_and_utc() {
        let clock = DisplayClock::new(0, "%Y-%m-%d %H:%M").unwrap();
        assert_eq!(clock.format_seconds(1_700_000_000), "2023-11-14 22:13");
    }

    #[test]
    fn invalid_offset_rejected() {
        assert!(matches!(
            DisplayClock::new(24 * 60, "%H"),
            Err(ConfigError::Invalid { name: "DISPLAY_UTC_OFFSET_MINUTES", .. })
        ));
    }

    #[test]
    fn invalid_format_rejected() {
        assert!(matches!(
            DisplayClock::new(0, "%H:%M %"),
            Err(ConfigError::Invalid { name: "DISPLAY_TIME_FORMAT", .. })
        ));
    }

    #[test]
    fn iso_utc_has_millis_and_z() {
        assert_eq!(iso_utc_seconds(1_700_000_000), "2023-11-14T22:13:20.000Z");
    }
}
