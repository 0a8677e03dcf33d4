//! The immutable record of one emission event (spec §3, §4.2).

use chrono::{DateTime, Local};

use crate::level::LogLevel;
use crate::text::LogText;

/// Optional call-site information, normally captured via the `file!()`,
/// `module_path!()`, `line!()` macros at the `send` call site rather than by
/// runtime stack inspection (spec §9).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallSite {
    pub source_file: Option<String>,
    pub source_member: Option<String>,
    pub source_line: Option<u32>,
}

impl CallSite {
    pub fn new(
        source_file: Option<impl Into<String>>,
        source_member: Option<impl Into<String>>,
        source_line: Option<u32>,
    ) -> Self {
        Self {
            source_file: source_file.map(Into::into),
            source_member: source_member.map(Into::into),
            source_line,
        }
    }
}

/// An optional exception carried by a [`LogMessage`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exception {
    pub message: String,
    pub type_name: String,
    /// A pre-rendered stack trace, opaque to the core (spec: "stack
    /// rendering").
    pub stack: String,
}

impl Exception {
    pub fn new(
        message: impl Into<String>,
        type_name: impl Into<String>,
        stack: impl Into<String>,
    ) -> Self {
        Self {
            message: message.into(),
            type_name: type_name.into(),
            stack: stack.into(),
        }
    }
}

/// Immutable record of one emission event.
///
/// Created by a producer at emission time; never mutated; dropped once
/// every receiver has processed it and no external holder retains it (the
/// fan-out queue and receiver queues share it via `Arc`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogMessage {
    pub date_time: DateTime<Local>,
    pub sender_name: String,
    pub sender_type: Option<String>,
    pub level: LogLevel,
    pub content: LogText,
    pub exception: Option<Exception>,
    pub call_site: CallSite,
}

impl LogMessage {
    /// Construct a message stamped with the current local time.
    ///
    /// `sender_name` is mandatory per spec §3; an empty name is a
    /// [`crate::error::ProducerError`] at the call site, not a dispatcher
    /// concern.
    pub fn new(
        sender_name: impl Into<String>,
        sender_type: Option<impl Into<String>>,
        level: LogLevel,
        content: LogText,
        exception: Option<Exception>,
        call_site: CallSite,
    ) -> Result<Self, crate::error::ProducerError> {
        let sender_name = sender_name.into();
        if sender_name.is_empty() {
            return Err(crate::error::ProducerError::MissingSenderName);
        }
        Ok(Self {
            date_time: Local::now(),
            sender_name,
            sender_type: sender_type.map(Into::into),
            level,
            content,
            exception,
            call_site,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_sender_name() {
        let err = LogMessage::new(
            "",
            None::<String>,
            LogLevel::Information,
            LogText::new(),
            None,
            CallSite::default(),
        )
        .unwrap_err();
        assert_eq!(err, crate::error::ProducerError::MissingSenderName);
    }

    #[test]
    fn accepts_well_formed_message() {
        let msg = LogMessage::new(
            "Worker",
            Some("Worker"),
            LogLevel::Information,
            LogText::parse("hello"),
            None,
            CallSite::default(),
        )
        .unwrap();
        assert_eq!(msg.sender_name, "Worker");
        assert_eq!(msg.level, LogLevel::Information);
    }
}
