//! JSON lines event stream
//!
//! Writes every [`CouncilEvent`] as one JSON object per line, flushed
//! immediately so a consumer can render progress as it happens.

use council_application::CouncilEventSink;
use council_domain::CouncilEvent;
use std::io::{self, Stdout, Write};
use std::sync::Mutex;

/// Event sink that serializes events as JSON lines
pub struct JsonLinesEventSink<W: Write + Send = Stdout> {
    writer: Mutex<W>,
}

impl JsonLinesEventSink<Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send> JsonLinesEventSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    /// Give back the underlying writer.
    pub fn into_inner(self) -> W {
        match self.writer.into_inner() {
            Ok(writer) => writer,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl<W: Write + Send> CouncilEventSink for JsonLinesEventSink<W> {
    fn emit(&self, event: &CouncilEvent) {
        let Ok(mut writer) = self.writer.lock() else {
            return;
        };
        // A closed pipe must not abort the run.
        let _ = writeln!(writer, "{}", event.to_json_line()).and_then(|_| writer.flush());
    }
}
