//! Producer handle (spec §4.3): attaches a stable `sender_name`/
//! `sender_type` to emissions and routes them to the dispatcher.

mod options;

pub use options::LoggerOptions;

use std::sync::Arc;

use crate::dispatcher::Dispatcher;
use crate::error::ProducerError;
use crate::level::LogLevel;
use crate::message::{CallSite, Exception, LogMessage};
use crate::text::LogText;

/// A lightweight handle producers hold; cheap to clone, safe to share
/// across threads. All operations except `flush`/`close` are non-blocking
/// from the caller's perspective.
#[derive(Debug, Clone)]
pub struct Logger {
    pub(crate) sender_name: String,
    pub(crate) sender_type: Option<String>,
}

impl Logger {
    /// Start building a globally-registered logger and its receivers.
    pub fn init() -> LoggerOptions {
        LoggerOptions::new()
    }

    /// A standalone producer handle, independent of the global singleton.
    /// `sender_name` is mandatory; an empty name is a [`ProducerError`] at
    /// the call site.
    pub fn new(sender_name: impl Into<String>) -> Result<Self, ProducerError> {
        let sender_name = sender_name.into();
        if sender_name.is_empty() {
            return Err(ProducerError::MissingSenderName);
        }
        Ok(Self {
            sender_name,
            sender_type: None,
        })
    }

    pub fn with_sender_type(mut self, sender_type: impl Into<String>) -> Self {
        self.sender_type = Some(sender_type.into());
        self
    }

    /// Build and route a message. Fast-path rejected without allocating a
    /// `LogMessage` if no registered receiver's level could ever accept it.
    pub fn send(
        &self,
        level: LogLevel,
        content: impl Into<LogText>,
        exception: Option<Exception>,
        call_site: CallSite,
    ) {
        let dispatcher = Dispatcher::global();
        let Some(min_level) = dispatcher.global_min_level() else {
            return;
        };
        if level > min_level {
            return;
        }

        // `sender_name` was validated non-empty at construction and never
        // mutated afterward.
        let message = LogMessage::new(
            self.sender_name.clone(),
            self.sender_type.clone(),
            level,
            content.into(),
            exception,
            call_site,
        )
        .expect("Logger's sender_name is always non-empty");

        dispatcher.enqueue(Arc::new(message));
    }

    pub fn emergency(&self, content: impl Into<LogText>) {
        self.send(LogLevel::Emergency, content, None, CallSite::default());
    }

    pub fn alert(&self, content: impl Into<LogText>) {
        self.send(LogLevel::Alert, content, None, CallSite::default());
    }

    pub fn critical(&self, content: impl Into<LogText>) {
        self.send(LogLevel::Critical, content, None, CallSite::default());
    }

    pub fn error(&self, content: impl Into<LogText>) {
        self.send(LogLevel::Error, content, None, CallSite::default());
    }

    pub fn warning(&self, content: impl Into<LogText>) {
        self.send(LogLevel::Warning, content, None, CallSite::default());
    }

    pub fn notice(&self, content: impl Into<LogText>) {
        self.send(LogLevel::Notice, content, None, CallSite::default());
    }

    pub fn info(&self, content: impl Into<LogText>) {
        self.send(LogLevel::Information, content, None, CallSite::default());
    }

    pub fn debug(&self, content: impl Into<LogText>) {
        self.send(LogLevel::Debug, content, None, CallSite::default());
    }

    pub fn verbose(&self, content: impl Into<LogText>) {
        self.send(LogLevel::Verbose, content, None, CallSite::default());
    }

    /// Wait until every message emitted before this call has reached every
    /// receiver's sink and that sink has flushed (spec §4.8).
    pub fn flush(&self) {
        Dispatcher::global().flush();
    }

    /// Stop the dispatcher and every receiver. Idempotent.
    pub fn close(&self) {
        Dispatcher::global().close();
    }
}
