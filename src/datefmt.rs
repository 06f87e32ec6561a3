//! Timestamp parsing and display.
//!
//! The API stores UTC and sometimes omits the offset, so naive timestamps are
//! read as UTC. Display happens in a fixed offset taken from config.

use chrono::{DateTime, FixedOffset, NaiveDateTime, Offset, Utc};

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Parse an API timestamp, with or without an offset.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

#[derive(Debug, Clone, Copy)]
pub struct DateFormatter {
    offset: FixedOffset,
}

impl Default for DateFormatter {
    fn default() -> Self {
        Self::with_offset_hours(9)
    }
}

impl DateFormatter {
    /// Out-of-range offsets fall back to UTC.
    pub fn with_offset_hours(hours: i32) -> Self {
        let offset = hours
            .checked_mul(3600)
            .and_then(FixedOffset::east_opt)
            .unwrap_or_else(|| {
                tracing::warn!("Invalid UTC offset {}h, using UTC", hours);
                Utc.fix()
            });
        Self { offset }
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// Full date and time, e.g. `2025-01-15 21:00:00`.
    pub fn full(&self, dt: &DateTime<Utc>) -> String {
        dt.with_timezone(&self.offset)
            .format("%Y-%m-%d %H:%M:%S")
            .to_string()
    }

    /// Date and time without seconds.
    pub fn short(&self, dt: &DateTime<Utc>) -> String {
        dt.with_timezone(&self.offset)
            .format("%Y-%m-%d %H:%M")
            .to_string()
    }

    /// Long date, e.g. `Jan 15, 2025`.
    pub fn date(&self, dt: &DateTime<Utc>) -> String {
        dt.with_timezone(&self.offset)
            .format("%b %-d, %Y")
            .to_string()
    }

    pub fn time_ago(&self, dt: &DateTime<Utc>) -> String {
        self.time_ago_from(dt, Utc::now())
    }

    /// Relative label measured from `now`; a week or older shows the date.
    pub fn time_ago_from(&self, dt: &DateTime<Utc>, now: DateTime<Utc>) -> String {
        let diff = now.signed_duration_since(*dt);

        let seconds = diff.num_seconds();
        if seconds < 60 {
            return "just now".to_string();
        }

        let minutes = diff.num_minutes();
        if minutes < 60 {
            return format!("{}m ago", minutes);
        }

        let hours = diff.num_hours();
        if hours < 24 {
            return format!("{}h ago", hours);
        }

        let days = diff.num_days();
        if days < 7 {
            return format!("{}d ago", days);
        }

        self.date(dt)
    }

    /// Format a raw API string. Empty input gives an empty string and
    /// unparseable input is returned as-is.
    pub fn full_raw(&self, raw: &str) -> String {
        if raw.trim().is_empty() {
            return String::new();
        }
        match parse_timestamp(raw) {
            Some(dt) => self.full(&dt),
            None => {
                tracing::debug!("Unparseable timestamp: {}", raw);
                raw.to_string()
            }
        }
    }

    pub fn time_ago_raw(&self, raw: &str) -> String {
        if raw.trim().is_empty() {
            return String::new();
        }
        parse_timestamp(raw)
            .map(|dt| self.time_ago(&dt))
            .unwrap_or_else(|| raw.to_string())
    }
}

/// Serde adapter for required timestamps.
pub mod utc_timestamp {
    use chrono::{DateTime, Utc};
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(dt: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&dt.to_rfc3339())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(d)?;
        super::parse_timestamp(&raw)
            .ok_or_else(|| de::Error::custom(format!("invalid timestamp: {}", raw)))
    }
}

/// Serde adapter for nullable timestamps.
pub mod opt_utc_timestamp {
    use chrono::{DateTime, Utc};
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(dt: &Option<DateTime<Utc>>, s: S) -> Result<S::Ok, S::Error> {
        match dt {
            Some(dt) => s.serialize_some(&dt.to_rfc3339()),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        d: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        match Option::<String>::deserialize(d)? {
            None => Ok(None),
            Some(raw) => super::parse_timestamp(&raw)
                .map(Some)
                .ok_or_else(|| de::Error::custom(format!("invalid timestamp: {}", raw))),
        }
    }
}
