/// Structured logging for the flood grid engine.
///
/// Provides context-rich logging with subsystem tags, an optional point
/// identifier (formatted coordinates), timestamps, and severity levels.
/// Supports both console output and file-based logging for headless
/// operation.

use chrono::Utc;
use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::sync::Mutex;

// ---------------------------------------------------------------------------
// Log Levels
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Debug => write!(f, "DEBUG"),
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Warning => write!(f, "WARN"),
            LogLevel::Error => write!(f, "ERROR"),
        }
    }
}

impl LogLevel {
    /// Parses the configuration form ("debug" / "info" / "warn" / "error").
    pub fn parse(s: &str) -> Option<LogLevel> {
        match s.trim().to_lowercase().as_str() {
            "debug" => Some(LogLevel::Debug),
            "info" => Some(LogLevel::Info),
            "warn" | "warning" => Some(LogLevel::Warning),
            "error" => Some(LogLevel::Error),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Subsystems
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Subsystem {
    /// Grid load / refresh traffic.
    Grid,
    /// Per-point enrichment fetches.
    Detail,
    /// Third-party place search.
    Places,
    /// Scheduler, configuration, process lifecycle.
    System,
}

impl fmt::Display for Subsystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Subsystem::Grid => write!(f, "GRID"),
            Subsystem::Detail => write!(f, "DETAIL"),
            Subsystem::Places => write!(f, "PLACES"),
            Subsystem::System => write!(f, "SYS"),
        }
    }
}

// ---------------------------------------------------------------------------
// Logger
// ---------------------------------------------------------------------------

/// Global logger instance
static LOGGER: Mutex<Option<Logger>> = Mutex::new(None);

pub struct Logger {
    /// Minimum log level to display
    min_level: LogLevel,
    /// Optional file path for logging
    log_file: Option<String>,
}

impl Logger {
    /// Initialize the global logger
    pub fn init(min_level: LogLevel, log_file: Option<String>) {
        let logger = Logger { min_level, log_file };
        *LOGGER.lock().unwrap() = Some(logger);
    }

    fn log(&self, level: LogLevel, subsystem: Subsystem, point_id: Option<&str>, message: &str) {
        if level < self.min_level {
            return;
        }

        let timestamp = Utc::now().format("%Y-%m-%d %H:%M:%S UTC");
        let point_part = point_id.map(|p| format!(" [{}]", p)).unwrap_or_default();
        let log_entry = format!("{} {} {}{}: {}", timestamp, level, subsystem, point_part, message);

        match level {
            LogLevel::Error | LogLevel::Warning => eprintln!("{}", log_entry),
            LogLevel::Info | LogLevel::Debug => println!("{}", log_entry),
        }

        if let Some(ref path) = self.log_file {
            if let Err(e) = Self::append_to_file(path, &log_entry) {
                eprintln!("Failed to write to log file {}: {}", path, e);
            }
        }
    }

    fn append_to_file(path: &str, entry: &str) -> std::io::Result<()> {
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        writeln!(file, "{}", entry)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Public Logging Functions
// ---------------------------------------------------------------------------

/// Initialize the global logger
pub fn init_logger(min_level: LogLevel, log_file: Option<&str>) {
    Logger::init(min_level, log_file.map(String::from));
}

/// Log a general informational message
pub fn info(subsystem: Subsystem, point_id: Option<&str>, message: &str) {
    if let Some(logger) = LOGGER.lock().unwrap().as_ref() {
        logger.log(LogLevel::Info, subsystem, point_id, message);
    }
}

/// Log a warning message
pub fn warn(subsystem: Subsystem, point_id: Option<&str>, message: &str) {
    if let Some(logger) = LOGGER.lock().unwrap().as_ref() {
        logger.log(LogLevel::Warning, subsystem, point_id, message);
    }
}

/// Log an error message
pub fn error(subsystem: Subsystem, point_id: Option<&str>, message: &str) {
    if let Some(logger) = LOGGER.lock().unwrap().as_ref() {
        logger.log(LogLevel::Error, subsystem, point_id, message);
    }
}

/// Log a debug message
pub fn debug(subsystem: Subsystem, point_id: Option<&str>, message: &str) {
    if let Some(logger) = LOGGER.lock().unwrap().as_ref() {
        logger.log(LogLevel::Debug, subsystem, point_id, message);
    }
}

/// Formats a coordinate pair as the point identifier used in log lines.
pub fn point_id(lat: f64, lon: f64) -> String {
    format!("{:.3},{:.3}", lat, lon)
}

// ---------------------------------------------------------------------------
// Failure Classification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureType {
    /// Expected failure - backend still warming up, transient network blip
    Expected,
    /// Unexpected failure - indicates backend degradation or a contract change
    Unexpected,
}

impl fmt::Display for FailureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureType::Expected => write!(f, "EXPECTED"),
            FailureType::Unexpected => write!(f, "UNEXPECTED"),
        }
    }
}

/// Classify a backend failure based on its error shape.
pub fn classify_backend_failure(err: &crate::model::EngineError) -> FailureType {
    use crate::model::EngineError;
    match err {
        // Connection refused / timeout usually means the backend is starting;
        // the one-shot retry covers it.
        EngineError::Network(_) => FailureType::Expected,
        // 5xx during regeneration is common; everything else is suspicious.
        EngineError::Http(code) if *code == 503 => FailureType::Expected,
        EngineError::Http(_) => FailureType::Unexpected,
        // Shape changes point at an API drift, never transient.
        EngineError::Contract(_) => FailureType::Unexpected,
        EngineError::NoPlaceFound(_) => FailureType::Expected,
    }
}

/// Log a backend failure with automatic classification.
pub fn log_backend_failure(
    subsystem: Subsystem,
    point_id: Option<&str>,
    operation: &str,
    err: &crate::model::EngineError,
) {
    let failure_type = classify_backend_failure(err);
    let message = format!("{} failed [{}]: {}", operation, failure_type, err);
    match failure_type {
        FailureType::Expected => warn(subsystem, point_id, &message),
        FailureType::Unexpected => error(subsystem, point_id, &message),
    }
}
