//! Error taxonomy (spec §7).
//!
//! `BackpressureDrop`, `LifecycleMisuse`, and `ParserAnomaly` never surface
//! as `Error` values: they are absorbed and counted on the receiver that
//! observed them. Only invalid-argument failures at the call site
//! ([`ProducerError`]) and sink failures ([`SinkError`]) are represented as
//! types here.

use std::fmt;

/// Invalid arguments at emission time. Fails synchronously at the call
/// site; never crosses into the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProducerError {
    /// `sender_name` is mandatory and was empty.
    MissingSenderName,
}

impl fmt::Display for ProducerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProducerError::MissingSenderName => {
                write!(f, "log message requires a non-empty sender_name")
            }
        }
    }
}

impl std::error::Error for ProducerError {}

/// A sink-side failure caught by the receiver worker. Counted on an
/// `errors` counter and printed to stderr; never propagated back through
/// the dispatcher (spec §7).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkError {
    Write { reason: String },
    Flush { reason: String },
    Close { reason: String },
}

impl fmt::Display for SinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SinkError::Write { reason } => write!(f, "sink write failed: {reason}"),
            SinkError::Flush { reason } => write!(f, "sink flush failed: {reason}"),
            SinkError::Close { reason } => write!(f, "sink close failed: {reason}"),
        }
    }
}

impl std::error::Error for SinkError {}
