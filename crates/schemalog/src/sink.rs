//! Sinks: destinations that receive finished log records.

use std::io::{self, Write};
use std::sync::Mutex;

use chrono::Local;
use colored::Colorize;
use serde_json::Value;

use crate::{Level, Record};

/// A destination for finished log records.
pub trait Sink: Send + Sync {
    /// Deliver one record.
    fn emit(&self, record: &Record);

    /// Push any buffered records out. Unbuffered sinks do nothing.
    fn flush(&self) {}
}

/// Human-oriented console output.
///
/// Renders one line per record: local time, service, coloured level tag,
/// message key, then the metadata JSON (coloured by value type). Colour can
/// be disabled and the writer swapped, which the tests use.
pub struct ConsoleSink {
    writer: Mutex<Box<dyn Write + Send>>,
    ansi: bool,
}

impl ConsoleSink {
    /// Console sink writing coloured output to stdout.
    #[must_use]
    pub fn new() -> Self {
        Self::with_writer(Box::new(io::stdout()))
    }

    /// Console sink writing to the given writer.
    #[must_use]
    pub fn with_writer(writer: Box<dyn Write + Send>) -> Self {
        Self {
            writer: Mutex::new(writer),
            ansi: true,
        }
    }

    /// Disable ANSI colours.
    #[must_use]
    pub fn without_ansi(mut self) -> Self {
        self.ansi = false;
        self
    }

    fn level_tag(&self, level: Level) -> String {
        if !self.ansi {
            return level.to_string();
        }
        match level {
            Level::Debug => level.as_str().magenta(),
            Level::Info => level.as_str().green(),
            Level::Warn => level.as_str().yellow(),
            Level::Error => level.as_str().red(),
        }
        .to_string()
    }

    fn render(&self, record: &Record) -> String {
        let time = record.timestamp.with_timezone(&Local).format("%-I:%M:%S %p");
        let meta = if record.meta.is_null() {
            String::new()
        } else if self.ansi {
            format!(" {}", colour_json(&record.meta))
        } else {
            format!(" {}", record.meta)
        };
        format!(
            "{time} [{service}] [{level}]: {message}{meta}",
            service = record.service,
            level = self.level_tag(record.level),
            message = record.message,
        )
    }
}

impl Default for ConsoleSink {
    fn default() -> Self {
        Self::new()
    }
}

impl Sink for ConsoleSink {
    fn emit(&self, record: &Record) {
        let line = self.render(record);
        if let Ok(mut writer) = self.writer.lock() {
            // Console delivery is best effort; a broken pipe is not ours to report.
            let _ = writeln!(writer, "{line}");
        }
    }

    fn flush(&self) {
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writer.flush();
        }
    }
}

/// Colourize a JSON value by token type.
fn colour_json(value: &Value) -> String {
    match value {
        Value::Null => "null".bright_black().to_string(),
        Value::Bool(b) => b.to_string().yellow().to_string(),
        Value::Number(n) => n.to_string().cyan().to_string(),
        Value::String(_) => value.to_string().green().to_string(),
        Value::Array(items) => {
            let inner: Vec<String> = items.iter().map(colour_json).collect();
            format!("[{}]", inner.join(","))
        }
        Value::Object(map) => {
            let inner: Vec<String> = map
                .iter()
                .map(|(key, value)| {
                    format!("{}:{}", format!("\"{key}\"").blue(), colour_json(value))
                })
                .collect();
            format!("{{{}}}", inner.join(","))
        }
    }
}

/// Forwards records into the `tracing` ecosystem.
///
/// Each record becomes a `tracing` event carrying the serialized record, so
/// level filtering, formatting and delivery become the installed
/// subscriber's concern.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl TracingSink {
    /// Create a tracing sink.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Sink for TracingSink {
    fn emit(&self, record: &Record) {
        let Ok(json) = serde_json::to_string(record) else {
            return;
        };
        match record.level {
            Level::Debug => {
                tracing::debug!(target: "schemalog", record = %json, "{}", record.message);
            }
            Level::Info => {
                tracing::info!(target: "schemalog", record = %json, "{}", record.message);
            }
            Level::Warn => {
                tracing::warn!(target: "schemalog", record = %json, "{}", record.message);
            }
            Level::Error => {
                tracing::error!(target: "schemalog", record = %json, "{}", record.message);
            }
        }
    }
}
