use crate::systime::now;
use once_cell::sync::OnceCell;
use std::fmt;

/// Ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogSeverity {
    Debug,
    Info,
    Warning,
    Error,
    Fatal,
}

impl LogSeverity {
    pub fn label(self) -> &'static str {
        match self {
            LogSeverity::Debug => "DEBUG",
            LogSeverity::Info => "INFO",
            LogSeverity::Warning => "WARNING",
            LogSeverity::Error => "ERROR",
            LogSeverity::Fatal => "FATAL",
        }
    }

    /// Error and above are written to stderr.
    pub fn to_stderr(self) -> bool {
        self >= LogSeverity::Error
    }
}

impl fmt::Display for LogSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

static MIN_SEVERITY: OnceCell<LogSeverity> = OnceCell::new();

/// Sets the least severe level that still gets printed. Only the first call
/// has an effect; returns false if the level was already set.
pub fn set_min_severity(severity: LogSeverity) -> bool {
    MIN_SEVERITY.set(severity).is_ok()
}

pub fn min_severity() -> LogSeverity {
    MIN_SEVERITY.get().copied().unwrap_or(LogSeverity::Info)
}

pub fn enabled(severity: LogSeverity) -> bool {
    severity >= min_severity()
}

pub fn format_line(msg: &str, log_severity: LogSeverity, time: &str) -> String {
    format!("[{}] {} {}", log_severity, time, msg)
}

pub fn log(msg: String, log_severity: LogSeverity) {
    if !enabled(log_severity) {
        return;
    }
    let line = format_line(&msg, log_severity, &now());
    if log_severity.to_stderr() {
        eprintln!("{}", line);
    } else {
        println!("{}", line);
    }
}
