//! Scoped, level-tagged logging.
//!
//! A [`Logger`] collects text through [`std::fmt::Write`] and emits exactly one
//! line when it is dropped:
//!
//! ```text
//! GHL:[<module>]<tag><message>
//! ```
//!
//! Lines go to the process-wide [`LogSink`] installed with [`set_sink`], or to
//! the `log` crate facade when no sink was installed.

use std::{
    fmt,
    sync::{Arc, OnceLock},
};

/// Severity of a log line, from most to least severe.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LogLevel {
    Fatal,
    Error,
    Warning,
    Info,
    Verbose,
    Debug,
}

impl LogLevel {
    /// The fixed-width tag written between the module name and the message.
    pub fn tag(self) -> &'static str {
        match self {
            LogLevel::Fatal => ": FATAL :",
            LogLevel::Error => ": ERROR :",
            LogLevel::Warning => ":WARNING:",
            LogLevel::Info => ": INFO  :",
            LogLevel::Verbose => ":VERBOSE:",
            LogLevel::Debug => ": DEBUG :",
        }
    }
}

impl From<LogLevel> for log::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Fatal | LogLevel::Error => log::Level::Error,
            LogLevel::Warning => log::Level::Warn,
            LogLevel::Info => log::Level::Info,
            LogLevel::Verbose => log::Level::Debug,
            LogLevel::Debug => log::Level::Trace,
        }
    }
}

/// Destination for finished log lines.
pub trait LogSink: Send + Sync {
    /// Receives one fully formatted line. Failures are swallowed by the sink.
    fn log(&self, level: LogLevel, line: &str);
}

/// The default sink, forwarding every line to the `log` crate under the `ghl` target.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogCrateSink;

impl LogSink for LogCrateSink {
    fn log(&self, level: LogLevel, line: &str) {
        log::log!(target: "ghl", log::Level::from(level), "{line}");
    }
}

static SINK: OnceLock<Box<dyn LogSink>> = OnceLock::new();

/// Installs the process-wide sink. Only the first call wins; later calls get
/// their sink handed back.
pub fn set_sink(sink: Box<dyn LogSink>) -> Result<(), Box<dyn LogSink>> {
    let mut sink = Some(sink);
    SINK.get_or_init(|| sink.take().unwrap_or_else(|| Box::new(LogCrateSink)));
    match sink {
        Some(rejected) => Err(rejected),
        None => Ok(()),
    }
}

fn global_sink() -> &'static dyn LogSink {
    match SINK.get() {
        Some(sink) => sink.as_ref(),
        None => &LogCrateSink,
    }
}

/// Collects one log line and emits it when dropped.
pub struct Logger {
    level: LogLevel,
    line: String,
    sink: Option<Arc<dyn LogSink>>,
}

impl Logger {
    /// Starts a line for the global sink.
    pub fn new(level: LogLevel, module: &str) -> Self {
        Self {
            level,
            line: format!("GHL:[{module}]{}", level.tag()),
            sink: None,
        }
    }

    /// Starts a line that goes to `sink` instead of the global one.
    pub fn with_sink(level: LogLevel, module: &str, sink: Arc<dyn LogSink>) -> Self {
        let mut logger = Self::new(level, module);
        logger.sink = Some(sink);
        logger
    }

    pub fn level(&self) -> LogLevel {
        self.level
    }
}

impl fmt::Write for Logger {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.line.push_str(s);
        Ok(())
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        match &self.sink {
            Some(sink) => sink.log(self.level, &self.line),
            None => global_sink().log(self.level, &self.line),
        }
    }
}

/// Emits one GHL log line: `ghl_log!(Error, "Net", "conn lost: {}", reason)`.
#[macro_export]
macro_rules! ghl_log {
    ($level:ident, $module:expr, $($arg:tt)+) => {{
        use ::std::fmt::Write as _;
        let mut logger = $crate::logger::Logger::new($crate::logger::LogLevel::$level, $module);
        let _ = ::std::write!(logger, $($arg)+);
    }};
}

#[macro_export]
macro_rules! ghl_fatal {
    ($module:expr, $($arg:tt)+) => { $crate::ghl_log!(Fatal, $module, $($arg)+) };
}

#[macro_export]
macro_rules! ghl_error {
    ($module:expr, $($arg:tt)+) => { $crate::ghl_log!(Error, $module, $($arg)+) };
}

#[macro_export]
macro_rules! ghl_warning {
    ($module:expr, $($arg:tt)+) => { $crate::ghl_log!(Warning, $module, $($arg)+) };
}

#[macro_export]
macro_rules! ghl_info {
    ($module:expr, $($arg:tt)+) => { $crate::ghl_log!(Info, $module, $($arg)+) };
}

#[macro_export]
macro_rules! ghl_verbose {
    ($module:expr, $($arg:tt)+) => { $crate::ghl_log!(Verbose, $module, $($arg)+) };
}

#[macro_export]
macro_rules! ghl_debug {
    ($module:expr, $($arg:tt)+) => { $crate::ghl_log!(Debug, $module, $($arg)+) };
}
