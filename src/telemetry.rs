//! Error tracking events emitted by the console flows.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::error;
use uuid::Uuid;

use crate::error::Error;

/// Numeric event ids shared with the console's error dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCode {
    /// 804: Error processing a transaction
    TxExecution,
}

impl ErrorCode {
    pub fn id(&self) -> u16 {
        match self {
            ErrorCode::TxExecution => 804,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::TxExecution => "Error processing a transaction",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.id(), self.description())
    }
}

/// A recorded error event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackedError {
    pub id: Uuid,
    pub code: ErrorCode,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl TrackedError {
    pub fn new(code: ErrorCode, err: &Error) -> Self {
        Self {
            id: Uuid::new_v4(),
            code,
            message: err.to_string(),
            timestamp: Utc::now(),
        }
    }
}

/// Sink for unexpected errors
pub trait ErrorTracker: Send + Sync {
    fn track_error(&self, code: ErrorCode, err: &Error) -> TrackedError;
}

/// Tracker that reports events through `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct LogErrorTracker;

impl ErrorTracker for LogErrorTracker {
    fn track_error(&self, code: ErrorCode, err: &Error) -> TrackedError {
        let event = TrackedError::new(code, err);
        error!(event_id = %event.id, code = code.id(), "{}: {}", code, event.message);
        event
    }
}
