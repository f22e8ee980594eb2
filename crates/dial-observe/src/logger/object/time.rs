use std::{
    fmt,
    str::FromStr,
    sync::{OnceLock, RwLock},
};

use serde::{Deserialize, Serialize};
use time::{OffsetDateTime, UtcOffset, format_description::well_known::Rfc3339};
use tracing_subscriber::fmt::{format::Writer, time::FormatTime};

use crate::logger::error::LoggerError;

/// Cached local UTC offset, written once by [`init_local_offset`].
static LOCAL_OFFSET: RwLock<UtcOffset> = RwLock::new(UtcOffset::UTC);

/// Tracks whether offset detection has been attempted.
static INIT_DONE: OnceLock<()> = OnceLock::new();

/// Timezone used for log timestamps.
///
/// - `Utc`: timestamps in UTC (always works, default)
/// - `Local`: system timezone; requires [`init_local_offset`] before any
///   threads are spawned
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
pub enum LoggerTimeZone {
    /// UTC timezone.
    Utc,
    /// Local system timezone.
    Local,
}

impl Default for LoggerTimeZone {
    fn default() -> Self {
        Self::Utc
    }
}

impl FromStr for LoggerTimeZone {
    type Err = LoggerError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "utc" => Ok(Self::Utc),
            "local" => Ok(Self::Local),
            _ => Err(LoggerError::InvalidTimeZone(s.to_string())),
        }
    }
}

impl fmt::Display for LoggerTimeZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LoggerTimeZone::Utc => "utc",
            LoggerTimeZone::Local => "local",
        };
        f.write_str(s)
    }
}

/// Detects and caches the local UTC offset.
///
/// Must run in `main()` before spawning any threads (that includes the tokio
/// runtime): offset detection fails in multi-threaded processes on most Unix
/// platforms. Falls back to UTC silently on failure.
pub fn init_local_offset() {
    let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
    if let Ok(mut guard) = LOCAL_OFFSET.write() {
        *guard = offset;
    }
    let _ = INIT_DONE.set(());
}

/// Returns the cached local offset, attempting one lazy detection.
pub(crate) fn local_offset() -> UtcOffset {
    INIT_DONE.get_or_init(|| {
        if let Ok(detected) = UtcOffset::current_local_offset() {
            if let Ok(mut guard) = LOCAL_OFFSET.write() {
                *guard = detected;
            }
        }
    });

    LOCAL_OFFSET.read().map(|guard| *guard).unwrap_or(UtcOffset::UTC)
}

/// RFC3339 timestamp formatter for the fmt layers.
///
/// Reads the cached local offset on every invocation and falls back to UTC
/// when detection never succeeded.
#[derive(Debug, Clone, Copy)]
pub struct LoggerRfc3339;

impl FormatTime for LoggerRfc3339 {
    fn format_time(&self, w: &mut Writer<'_>) -> fmt::Result {
        let local = OffsetDateTime::now_utc().to_offset(local_offset());

        match local.format(&Rfc3339) {
            Ok(ts) => write!(w, "{} ", ts),
            Err(_) => write!(w, "<invalid-time> "),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_utc() {
        assert_eq!(LoggerTimeZone::default(), LoggerTimeZone::Utc);
    }

    #[test]
    fn parses_case_insensitive() {
        assert_eq!(LoggerTimeZone::from_str("UTC").unwrap(), LoggerTimeZone::Utc);
        assert_eq!(
            LoggerTimeZone::from_str("Local").unwrap(),
            LoggerTimeZone::Local
        );
    }

    #[test]
    fn rejects_invalid_timezone() {
        assert!(LoggerTimeZone::from_str("pst").is_err());
        assert!(LoggerTimeZone::from_str("").is_err());
    }

    #[test]
    fn display_returns_canonical_names() {
        assert_eq!(LoggerTimeZone::Utc.to_string(), "utc");
        assert_eq!(LoggerTimeZone::Local.to_string(), "local");
    }

    #[test]
    fn local_offset_is_sane_after_init() {
        init_local_offset();
        let offset = local_offset();
        assert!(offset.whole_hours().abs() <= 14);
    }
}
