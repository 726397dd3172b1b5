//! Log file registry and subscriber setup.
//!
//! Each logical stream writes to one file per calendar day,
//! `{folder}/{stream}_{YYYYMMDD}.log`. The registry is built once in `main`
//! and opens each stream's file the first time it is asked for; later requests
//! share the same append-mode handle.

use crate::error::Result;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::{Event, Subscriber};
use tracing_subscriber::fmt::format::{self, DefaultFields, FormatEvent, FormatFields};
use tracing_subscriber::fmt::time::{FormatTime, UtcTime};
use tracing_subscriber::fmt::writer::MakeWriter;
use tracing_subscriber::fmt::FmtContext;
use tracing_subscriber::prelude::*;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{EnvFilter, fmt as tfmt};

/// Opens dated log files on demand, at most once per stream name.
#[derive(Debug)]
pub struct LogRegistry {
    folder: PathBuf,
    date: NaiveDate,
    streams: HashMap<String, LogStream>,
}

/// A shared, append-only handle on one stream's log file.
#[derive(Debug, Clone)]
pub struct LogStream {
    path: PathBuf,
    file: Arc<Mutex<File>>,
}

/// Writer handed out to `tracing-subscriber` for each event.
pub struct LogStreamWriter {
    file: Arc<Mutex<File>>,
}

impl LogRegistry {
    pub fn new(folder: impl Into<PathBuf>, date: NaiveDate) -> Self {
        Self {
            folder: folder.into(),
            date,
            streams: HashMap::new(),
        }
    }

    /// Path of the file backing `name` for this registry's date.
    pub fn path_for(&self, name: &str) -> PathBuf {
        self.folder
            .join(format!("{}_{}.log", name, self.date.format("%Y%m%d")))
    }

    /// The stream called `name`, opening its file (and the folder) on first use.
    pub fn stream(&mut self, name: &str) -> io::Result<LogStream> {
        if let Some(stream) = self.streams.get(name) {
            return Ok(stream.clone());
        }
        fs::create_dir_all(&self.folder)?;
        let path = self.path_for(name);
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let stream = LogStream {
            path,
            file: Arc::new(Mutex::new(file)),
        };
        self.streams.insert(name.to_string(), stream.clone());
        Ok(stream)
    }
}

impl LogStream {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl<'a> MakeWriter<'a> for LogStream {
    type Writer = LogStreamWriter;

    fn make_writer(&'a self) -> Self::Writer {
        LogStreamWriter {
            file: Arc::clone(&self.file),
        }
    }
}

impl Write for LogStreamWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut file = self.file.lock().unwrap_or_else(|e| e.into_inner());
        file.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        let mut file = self.file.lock().unwrap_or_else(|e| e.into_inner());
        file.flush()
    }
}

/// Log file line layout: `<timestamp> <LEVEL> <message> <fields>`, without
/// span context.
pub struct FileLine;

impl<S, N> FormatEvent<S, N> for FileLine
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: format::Writer<'_>,
        event: &Event<'_>,
    ) -> std::fmt::Result {
        UtcTime::rfc_3339().format_time(&mut writer)?;
        write!(writer, " {:>5} ", event.metadata().level())?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

/// The fmt layer writing [`FileLine`]s to `stream`.
pub fn file_layer<S>(stream: LogStream) -> tfmt::Layer<S, DefaultFields, FileLine, LogStream>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    tfmt::layer()
        .with_writer(stream)
        .with_ansi(false)
        .event_format(FileLine)
}

/// Install the global subscriber: stderr plus the given log file stream.
///
/// `RUST_LOG` overrides the default `info` filter for both outputs.
pub fn init(stream: LogStream) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let stderr_layer = tfmt::layer()
        .with_writer(io::stderr)
        .with_target(true)
        .with_timer(UtcTime::rfc_3339());

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer(stream))
        .try_init()?;
    Ok(())
}
