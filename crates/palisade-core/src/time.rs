use crate::error::{CoreError, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use time::{OffsetDateTime, UtcOffset, macros::offset};

/// Fixed regional offset used for all audit timestamps (UTC+7).
///
/// Audit records and operational log entries are stamped in the deployment
/// region's wall-clock time rather than UTC so that operators reading raw
/// records see local time directly.
pub const AUDIT_OFFSET: UtcOffset = offset!(+7);

/// Timestamp newtype pinned to the audit offset.
///
/// Wraps [`OffsetDateTime`] with RFC 3339 serialization so records carry the
/// offset explicitly and survive round trips through JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EventTime(pub OffsetDateTime);

impl EventTime {
    pub fn new(datetime: OffsetDateTime) -> Self {
        Self(datetime.to_offset(AUDIT_OFFSET))
    }

    /// Current instant in the audit offset.
    pub fn now() -> Self {
        Self(OffsetDateTime::now_utc().to_offset(AUDIT_OFFSET))
    }

    pub fn inner(&self) -> &OffsetDateTime {
        &self.0
    }

    pub fn into_inner(self) -> OffsetDateTime {
        self.0
    }

    pub fn unix_timestamp(&self) -> i64 {
        self.0.unix_timestamp()
    }
}

impl fmt::Display for EventTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let formatted = self
            .0
            .format(&time::format_description::well_known::Rfc3339)
            .map_err(|_| fmt::Error)?;
        write!(f, "{formatted}")
    }
}

impl FromStr for EventTime {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        let datetime = OffsetDateTime::parse(s, &time::format_description::well_known::Rfc3339)
            .map_err(|e| {
                CoreError::invalid_timestamp(format!("Failed to parse timestamp '{s}': {e}"))
            })?;
        Ok(EventTime::new(datetime))
    }
}

impl Serialize for EventTime {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for EventTime {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        EventTime::from_str(&s).map_err(serde::de::Error::custom)
    }
}

impl From<OffsetDateTime> for EventTime {
    fn from(datetime: OffsetDateTime) -> Self {
        Self::new(datetime)
    }
}

/// Current instant in the audit offset, as a bare [`OffsetDateTime`].
pub fn now_local() -> OffsetDateTime {
    OffsetDateTime::now_utc().to_offset(AUDIT_OFFSET)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_now_carries_audit_offset() {
        let now = EventTime::now();
        assert_eq!(now.inner().offset(), AUDIT_OFFSET);
    }

    #[test]
    fn test_display_round_trip() {
        let ts = EventTime::now();
        let parsed: EventTime = ts.to_string().parse().unwrap();
        // RFC 3339 output truncates below nanosecond precision identically
        assert_eq!(parsed.unix_timestamp(), ts.unix_timestamp());
        assert_eq!(parsed.inner().offset(), AUDIT_OFFSET);
    }

    #[test]
    fn test_serde_as_string() {
        let ts: EventTime = "2024-03-01T12:30:00+07:00".parse().unwrap();
        let json = serde_json::to_string(&ts).unwrap();
        assert_eq!(json, "\"2024-03-01T12:30:00+07:00\"");
        let back: EventTime = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ts);
    }

    #[test]
    fn test_utc_input_normalized_to_offset() {
        let ts: EventTime = "2024-03-01T05:30:00Z".parse().unwrap();
        assert_eq!(ts.inner().offset(), AUDIT_OFFSET);
        assert_eq!(ts.inner().hour(), 12);
    }

    #[test]
    fn test_invalid_timestamp_rejected() {
        let err = "not-a-time".parse::<EventTime>().unwrap_err();
        assert!(matches!(err, CoreError::InvalidTimestamp(_)));
    }
}
