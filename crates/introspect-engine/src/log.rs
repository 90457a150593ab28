//! Logging collaborator
//!
//! The engine never logs through a hidden global: every [`Reflector`] holds
//! an `Arc<dyn ReflectLog>`. [`TracingLog`] forwards to `tracing` and is the
//! default; [`MemoryLog`] keeps records so callers can assert on them.
//!
//! [`Reflector`]: crate::reflect::Reflector

use std::error::Error;
use std::fmt;

use parking_lot::Mutex;

/// Log severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    /// Absorbed metadata faults
    Trace,
    /// Informational
    Info,
    /// Recoverable problems (access could not be relaxed)
    Warning,
    /// Swallowed invocation faults
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Trace => write!(f, "TRACE"),
            Severity::Info => write!(f, "INFO"),
            Severity::Warning => write!(f, "WARNING"),
            Severity::Error => write!(f, "ERROR"),
        }
    }
}

/// Sink for engine log events. Fire-and-forget.
pub trait ReflectLog: Send + Sync {
    /// Emit an event. `origin` names the component or runtime type the event
    /// concerns. When `use_cause` is set the fault's source is logged instead
    /// of the fault itself.
    fn log(
        &self,
        severity: Severity,
        origin: &str,
        message: &str,
        fault: Option<&(dyn Error + 'static)>,
        use_cause: bool,
    );

    /// Log a warning
    fn warn(&self, origin: &str, message: &str, fault: Option<&(dyn Error + 'static)>) {
        self.log(Severity::Warning, origin, message, fault, false);
    }

    /// Log an error
    fn error(&self, origin: &str, message: &str, fault: Option<&(dyn Error + 'static)>) {
        self.log(Severity::Error, origin, message, fault, false);
    }

    /// Log an informational event
    fn info(&self, origin: &str, message: &str, fault: Option<&(dyn Error + 'static)>) {
        self.log(Severity::Info, origin, message, fault, false);
    }
}

/// Pick the fault to report, unwrapping one level when `use_cause` is set
fn reported_fault<'a>(
    fault: Option<&'a (dyn Error + 'static)>,
    use_cause: bool,
) -> Option<&'a (dyn Error + 'static)> {
    if use_cause {
        fault.and_then(|f| f.source())
    } else {
        fault
    }
}

/// Forwards events to `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLog;

impl ReflectLog for TracingLog {
    fn log(
        &self,
        severity: Severity,
        origin: &str,
        message: &str,
        fault: Option<&(dyn Error + 'static)>,
        use_cause: bool,
    ) {
        let fault = reported_fault(fault, use_cause).map(|f| f.to_string());
        match severity {
            Severity::Trace => tracing::trace!(origin, fault = ?fault, "{}", message),
            Severity::Info => tracing::info!(origin, fault = ?fault, "{}", message),
            Severity::Warning => tracing::warn!(origin, fault = ?fault, "{}", message),
            Severity::Error => tracing::error!(origin, fault = ?fault, "{}", message),
        }
    }
}

/// A recorded log event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    /// Event severity
    pub severity: Severity,
    /// Originating component or type
    pub origin: String,
    /// Event message
    pub message: String,
    /// Rendered fault (after cause unwrapping)
    pub fault: Option<String>,
}

/// Keeps every event in memory
#[derive(Debug, Default)]
pub struct MemoryLog {
    records: Mutex<Vec<LogRecord>>,
}

impl MemoryLog {
    /// Create an empty log
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all records so far
    pub fn records(&self) -> Vec<LogRecord> {
        self.records.lock().clone()
    }

    /// Records with the given severity
    pub fn with_severity(&self, severity: Severity) -> Vec<LogRecord> {
        self.records
            .lock()
            .iter()
            .filter(|r| r.severity == severity)
            .cloned()
            .collect()
    }

    /// Drop all records
    pub fn clear(&self) {
        self.records.lock().clear();
    }
}

impl ReflectLog for MemoryLog {
    fn log(
        &self,
        severity: Severity,
        origin: &str,
        message: &str,
        fault: Option<&(dyn Error + 'static)>,
        use_cause: bool,
    ) {
        let fault = reported_fault(fault, use_cause).map(|f| f.to_string());
        self.records.lock().push(LogRecord {
            severity,
            origin: origin.to_string(),
            message: message.to_string(),
            fault,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Fault;

    #[test]
    fn test_memory_log_records() {
        let log = MemoryLog::new();
        log.warn("Animal", "cannot relax access", None);
        log.error("Animal", "Error calling feed", Some(&Fault::new("boom")));

        let records = log.records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].severity, Severity::Warning);
        assert_eq!(records[1].fault.as_deref(), Some("boom"));
        assert_eq!(log.with_severity(Severity::Error).len(), 1);

        log.clear();
        assert!(log.records().is_empty());
    }

    #[test]
    fn test_use_cause_unwraps_one_level() {
        let log = MemoryLog::new();
        let fault = Fault::caused_by("wrapper", Fault::new("root cause"));

        log.log(Severity::Error, "Dog", "failed", Some(&fault), true);
        log.log(Severity::Error, "Dog", "failed", Some(&fault), false);
        // No cause to unwrap
        log.log(Severity::Error, "Dog", "failed", Some(&Fault::new("flat")), true);

        let records = log.records();
        assert_eq!(records[0].fault.as_deref(), Some("root cause"));
        assert_eq!(records[1].fault.as_deref(), Some("wrapper"));
        assert_eq!(records[2].fault, None);
    }

    #[test]
    fn test_tracing_log_does_not_panic_without_subscriber() {
        TracingLog.log(Severity::Error, "Cat", "msg", Some(&Fault::new("x")), false);
        TracingLog.info("Cat", "msg", None);
    }
}
