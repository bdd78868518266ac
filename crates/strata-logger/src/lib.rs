pub mod log;
pub mod systime;

pub use log::{log, set_min_severity, LogSeverity};
