//! `tracing` output delivered line by line to a level-aware sink.
//!
//! # Design
//! - Formatting stays with `tracing_subscriber::fmt`; the writer only splits
//!   its output into lines and tags each line with the event level.
//! - The browser build installs a console sink; tests install a recording one.

use std::io::{self, Write};

use tracing::level_filters::LevelFilter;
use tracing::{Level, Metadata, Subscriber};
use tracing_subscriber::fmt::MakeWriter;

/// Destination for formatted log lines.
pub trait LineSink: Clone + Send + Sync + 'static {
    /// Receive one complete line, without its trailing newline.
    fn write_line(&self, level: Level, line: &str);
}

/// `tracing_subscriber` writer factory feeding a [`LineSink`].
#[derive(Clone, Debug)]
pub struct LineMakeWriter<S> {
    sink: S,
}

impl<S: LineSink> LineMakeWriter<S> {
    /// Wrap `sink`.
    pub const fn new(sink: S) -> Self {
        Self { sink }
    }
}

impl<'a, S: LineSink> MakeWriter<'a> for LineMakeWriter<S> {
    type Writer = LineWriter<S>;

    fn make_writer(&'a self) -> Self::Writer {
        LineWriter::new(self.sink.clone(), Level::INFO)
    }

    fn make_writer_for(&'a self, meta: &Metadata<'_>) -> Self::Writer {
        LineWriter::new(self.sink.clone(), *meta.level())
    }
}

/// Per-event writer; a trailing partial line is flushed on drop.
pub struct LineWriter<S: LineSink> {
    sink: S,
    level: Level,
    buffer: Vec<u8>,
}

impl<S: LineSink> LineWriter<S> {
    const fn new(sink: S, level: Level) -> Self {
        Self {
            sink,
            level,
            buffer: Vec::new(),
        }
    }

    fn emit(&self, bytes: &[u8]) {
        let text = String::from_utf8_lossy(bytes);
        let line = text.trim_end_matches(['\r', '\n']);
        if !line.is_empty() {
            self.sink.write_line(self.level, line);
        }
    }
}

impl<S: LineSink> Write for LineWriter<S> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.extend_from_slice(buf);
        while let Some(end) = self.buffer.iter().position(|byte| *byte == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=end).collect();
            self.emit(&line);
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<S: LineSink> Drop for LineWriter<S> {
    fn drop(&mut self) {
        if !self.buffer.is_empty() {
            let rest = std::mem::take(&mut self.buffer);
            self.emit(&rest);
        }
    }
}

/// Plain-text subscriber writing to `sink`. No timestamps: the wasm target has
/// no system clock and the console stamps lines itself.
pub fn subscriber<S: LineSink>(
    sink: S,
    max_level: LevelFilter,
) -> impl Subscriber + Send + Sync + 'static {
    tracing_subscriber::fmt()
        .with_writer(LineMakeWriter::new(sink))
        .with_max_level(max_level)
        .without_time()
        .finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::testing::RecordingLines;

    #[test]
    fn events_arrive_as_levelled_lines() {
        let sink = RecordingLines::default();
        tracing::subscriber::with_default(subscriber(sink.clone(), LevelFilter::INFO), || {
            tracing::warn!(key = "prefs", "storage failed");
            tracing::debug!("filtered out");
        });
        let lines = sink.lines();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].0, Level::WARN);
        assert!(lines[0].1.contains("storage failed"));
        assert!(lines[0].1.contains("key="));
    }

    #[test]
    fn partial_writes_are_joined_into_lines() {
        let sink = RecordingLines::default();
        let mut writer = LineWriter::new(sink.clone(), Level::ERROR);
        writer.write_all(b"al").unwrap();
        writer.write_all(b"pha\r\nbe").unwrap();
        assert_eq!(sink.lines(), vec![(Level::ERROR, "alpha".to_string())]);
        drop(writer);
        assert_eq!(sink.lines()[1], (Level::ERROR, "beta".to_string()));
    }
}
