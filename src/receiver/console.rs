//! Terminal reference sink (spec §4.9, §6).

use std::io::Write;
use std::sync::Arc;

use is_terminal::IsTerminal;

use crate::error::SinkError;
use crate::message::LogMessage;

use super::Receiver;

/// Writes already-rendered lines to a `Write` sink, normally stdout or
/// stderr. `force_color` overrides the TTY auto-detection, mirroring the
/// stderr-TTY override used by sinks in the wider corpus.
pub struct ConsoleReceiver<W: Write + Send + 'static> {
    sink: W,
    force_color: Option<bool>,
}

impl ConsoleReceiver<std::io::Stderr> {
    /// A console receiver over `stderr`, auto-detecting color support.
    pub fn stderr() -> Self {
        Self {
            sink: std::io::stderr(),
            force_color: None,
        }
    }
}

impl<W: Write + Send + 'static> ConsoleReceiver<W> {
    pub fn new(sink: W) -> Self {
        Self {
            sink,
            force_color: None,
        }
    }

    pub fn with_forced_color(mut self, enabled: bool) -> Self {
        self.force_color = Some(enabled);
        self
    }

    fn supports_color(&self) -> bool {
        self.force_color.unwrap_or_else(|| std::io::stderr().is_terminal())
    }
}

impl<W: Write + Send + 'static> Receiver for ConsoleReceiver<W> {
    /// `styled` is expected to already carry ANSI SGR sequences (the
    /// receiver should be configured with `RenderProfile::Ansi`); they are
    /// stripped here when the destination turns out not to be a color
    /// terminal, so a single formatted line serves both cases.
    fn write_one(&mut self, _message: &Arc<LogMessage>, styled: &str) -> Result<(), SinkError> {
        let result = if self.supports_color() {
            write!(self.sink, "{styled}")
        } else {
            write!(self.sink, "{}", strip_ansi(styled))
        };
        result.map_err(|e| SinkError::Write { reason: e.to_string() })
    }

    fn flush(&mut self) -> Result<(), SinkError> {
        self.sink.flush().map_err(|e| SinkError::Flush { reason: e.to_string() })
    }

    fn close(&mut self) -> Result<(), SinkError> {
        self.flush()
    }
}

/// Remove ANSI SGR escape sequences (`ESC [ ... m`) from a rendered line.
fn strip_ansi(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\x1b' && chars.peek() == Some(&'[') {
            chars.next();
            for next in chars.by_ref() {
                if next == 'm' {
                    break;
                }
            }
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::LogLevel;
    use crate::message::CallSite;
    use crate::text::LogText;

    #[test]
    fn writes_styled_text_verbatim() {
        let mut receiver = ConsoleReceiver::new(Vec::<u8>::new()).with_forced_color(false);
        let message = Arc::new(
            LogMessage::new(
                "Worker",
                None::<String>,
                LogLevel::Information,
                LogText::parse("hello"),
                None,
                CallSite::default(),
            )
            .unwrap(),
        );
        receiver.write_one(&message, "hello\n").unwrap();
        assert_eq!(receiver.sink, b"hello\n");
    }

    #[test]
    fn strips_ansi_when_color_is_not_forced_on() {
        let mut receiver = ConsoleReceiver::new(Vec::<u8>::new()).with_forced_color(false);
        let message = Arc::new(
            LogMessage::new(
                "Worker",
                None::<String>,
                LogLevel::Information,
                LogText::parse("hello"),
                None,
                CallSite::default(),
            )
            .unwrap(),
        );
        receiver
            .write_one(&message, "\x1b[0m\x1b[31malert\x1b[0m\n")
            .unwrap();
        assert_eq!(receiver.sink, b"alert\n");
    }
}
