//! HTML file reference sink (spec §4.9, §6).

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::SinkError;
use crate::message::LogMessage;

use super::Receiver;

const HTML_HEADER: &str = "<!DOCTYPE html>\n<html><head><meta charset=\"utf-8\"><title>log</title></head><body><pre>\n";
const HTML_FOOTER: &str = "</pre></body></html>\n";

/// Buffers formatted, already-HTML-rendered lines (one `<span>` run per
/// transition, `<br/>` for newlines, per `RenderProfile::Html`) and writes a
/// well-formed HTML5 fragment on `flush`/`close`.
pub struct HtmlFileReceiver {
    path: PathBuf,
    buffer: String,
}

impl HtmlFileReceiver {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            buffer: String::new(),
        }
    }

    fn write_document(&self) -> std::io::Result<()> {
        let file = File::create(&self.path)?;
        let mut writer = BufWriter::new(file);
        writer.write_all(HTML_HEADER.as_bytes())?;
        writer.write_all(self.buffer.as_bytes())?;
        writer.write_all(HTML_FOOTER.as_bytes())?;
        writer.flush()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Receiver for HtmlFileReceiver {
    fn write_one(&mut self, _message: &Arc<LogMessage>, styled: &str) -> Result<(), SinkError> {
        self.buffer.push_str(styled);
        Ok(())
    }

    fn flush(&mut self) -> Result<(), SinkError> {
        self.write_document().map_err(|e| SinkError::Flush { reason: e.to_string() })
    }

    fn close(&mut self) -> Result<(), SinkError> {
        self.write_document().map_err(|e| SinkError::Close { reason: e.to_string() })
    }
}
