mod config;
mod error;
mod log;
mod object;

pub use config::LoggerConfig;
pub use error::LoggerError;
pub use object::LoggerFormat;
pub use object::LoggerLevel;
pub use object::{LoggerTimeZone, init_local_offset};

/// Installs the global tracing subscriber described by the given config.
///
/// After this call every `tracing` macro (`info!`, `debug!`, ...) in the
/// process goes through the selected format and level filter.
///
/// For `LoggerTimeZone::Local`, call [`init_local_offset`] in `main()`
/// before spawning any threads; offset detection fails once the process is
/// multi-threaded and the logger then falls back to UTC.
///
/// # Examples
/// ```rust
/// use dial_observe::{LoggerConfig, init_logger};
///
/// let config = LoggerConfig::default();
/// init_logger(&config).expect("failed to initialize logger");
/// tracing::info!("logger initialized");
/// ```
pub fn init_logger(cfg: &LoggerConfig) -> Result<(), LoggerError> {
    match cfg.format {
        LoggerFormat::Text => log::logger_text(cfg),
        LoggerFormat::Json => log::logger_json(cfg),
        LoggerFormat::Journald => log::logger_journald(cfg),
    }
}
