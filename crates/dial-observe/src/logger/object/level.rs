use std::{convert::TryFrom, str::FromStr};

use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

use crate::logger::LoggerError;

/// Wrapper around a `tracing_subscriber::EnvFilter` expression.
///
/// Stores the raw filter string (e.g. `"info"`,
/// `"dial_core=debug,dial_api=trace,info"`), validated with
/// `EnvFilter::try_new` at construction so conversion can never fail later.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String")]
#[serde(into = "String")]
pub struct LoggerLevel(String);

impl LoggerLevel {
    /// Creates a new `LoggerLevel` from a string-like value.
    pub fn new(s: impl Into<String>) -> Result<Self, LoggerError> {
        Self::try_from(s.into())
    }

    /// Returns the underlying filter string exactly as configured.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parses the underlying string into a `tracing_subscriber::EnvFilter`.
    pub fn to_env_filter(&self) -> EnvFilter {
        EnvFilter::try_new(self.as_str()).expect("LoggerLevel is always valid after construction")
    }
}

impl Default for LoggerLevel {
    fn default() -> Self {
        Self::try_from("info".to_string()).expect("default log level must be valid")
    }
}

impl FromStr for LoggerLevel {
    type Err = LoggerError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_from(s.to_owned())
    }
}

impl TryFrom<String> for LoggerLevel {
    type Error = LoggerError;
    fn try_from(s: String) -> Result<Self, Self::Error> {
        match EnvFilter::try_new(&s) {
            Ok(_) => Ok(LoggerLevel(s)),
            Err(e) => Err(LoggerError::InvalidLevel(format!("{}: {}", s, e))),
        }
    }
}

impl From<LoggerLevel> for String {
    fn from(l: LoggerLevel) -> Self {
        l.0
    }
}

#[cfg(test)]
mod tests {
    use super::LoggerLevel;

    #[test]
    fn accepts_valid_levels() {
        for lvl in ["info", "warn", "trace", "dial_core=debug,info"] {
            assert!(lvl.parse::<LoggerLevel>().is_ok(), "expected Ok for {lvl}");
        }
    }

    #[test]
    fn rejects_invalid_levels() {
        for lvl in ["dial_core=lol", "other=trace,another=wat"] {
            assert!(lvl.parse::<LoggerLevel>().is_err(), "expected Err for {lvl}");
        }
    }

    #[test]
    fn default_is_info_and_convertible() {
        let lvl = LoggerLevel::default();
        assert_eq!(lvl.as_str(), "info");
        let _filter = lvl.to_env_filter();
    }

    #[test]
    fn serde_accepts_plain_string() {
        let lvl: LoggerLevel = serde_json::from_str(r#""debug""#).unwrap();
        assert_eq!(lvl.as_str(), "debug");
    }

    #[test]
    fn serde_roundtrip_preserves_expression() {
        let original: LoggerLevel = "dial_api=trace,info".parse().unwrap();
        let json = serde_json::to_string(&original).unwrap();
        let restored: LoggerLevel = serde_json::from_str(&json).unwrap();
        assert_eq!(original.as_str(), restored.as_str());
    }
}
