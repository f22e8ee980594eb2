mod format;
mod level;
mod time;

pub use format::LoggerFormat;
pub use level::LoggerLevel;
pub use time::{LoggerRfc3339, LoggerTimeZone, init_local_offset};
