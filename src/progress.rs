//! Catalog load progress reporting.
//!
//! Large catalogs take a moment to index, so `neo` reports what it is
//! reading and how many records it has indexed. Progress is emitted on
//! **stderr** so stdout stays parseable for scripts.

use std::io::Write;

/// A single progress event for a catalog load.
#[derive(Clone, Debug, PartialEq)]
pub enum LoadProgressEvent {
    /// The catalog file was opened and its header accepted.
    Reading { path: String },
    /// `records` data rows have been consumed so far.
    Indexing { records: usize },
    /// The load finished.
    Done {
        entries: usize,
        events: usize,
        skipped: usize,
    },
}

/// Reports load progress. Implementations write to stderr (human or JSON).
pub trait LoadProgressReporter: Send + Sync {
    fn report(&self, event: LoadProgressEvent);
}

/// Human-friendly progress on stderr: "load  indexing  10,000 records".
pub struct StderrProgress;

impl LoadProgressReporter for StderrProgress {
    fn report(&self, event: LoadProgressEvent) {
        let line = match &event {
            LoadProgressEvent::Reading { path } => format!("load {}  reading...\n", path),
            LoadProgressEvent::Indexing { records } => {
                format!("load  indexing  {} records\n", format_number(*records))
            }
            LoadProgressEvent::Done {
                entries,
                events,
                skipped,
            } => {
                let mut line = format!(
                    "load  done  {} objects, {} approaches",
                    format_number(*entries),
                    format_number(*events)
                );
                if *skipped > 0 {
                    line.push_str(&format!(", {} skipped", format_number(*skipped)));
                }
                line.push('\n');
                line
            }
        };
        let _ = std::io::stderr().lock().write_all(line.as_bytes());
        let _ = std::io::stderr().lock().flush();
    }
}

/// Machine-readable progress: one JSON object per line on stderr.
pub struct JsonProgress;

impl JsonProgress {
    fn to_json(event: &LoadProgressEvent) -> serde_json::Value {
        match event {
            LoadProgressEvent::Reading { path } => serde_json::json!({
                "event": "progress",
                "phase": "reading",
                "path": path
            }),
            LoadProgressEvent::Indexing { records } => serde_json::json!({
                "event": "progress",
                "phase": "indexing",
                "records": records
            }),
            LoadProgressEvent::Done {
                entries,
                events,
                skipped,
            } => serde_json::json!({
                "event": "progress",
                "phase": "done",
                "entries": entries,
                "events": events,
                "skipped": skipped
            }),
        }
    }
}

impl LoadProgressReporter for JsonProgress {
    fn report(&self, event: LoadProgressEvent) {
        if let Ok(line) = serde_json::to_string(&Self::to_json(&event)) {
            let _ = writeln!(std::io::stderr().lock(), "{}", line);
            let _ = std::io::stderr().lock().flush();
        }
    }
}

/// No-op reporter when progress is disabled.
pub struct NoProgress;

impl LoadProgressReporter for NoProgress {
    fn report(&self, _event: LoadProgressEvent) {}
}

fn format_number(n: usize) -> String {
    let s = n.to_string();
    let mut result = String::with_capacity(s.len() + (s.len() - 1) / 3);
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result.chars().rev().collect()
}

/// Progress mode for the CLI: off, human (stderr), or JSON (stderr).
#[derive(Clone, Copy, Debug, Eq, PartialEq, clap::ValueEnum)]
pub enum ProgressMode {
    Off,
    Human,
    Json,
}

impl ProgressMode {
    /// Default: human progress when stderr is a TTY, otherwise off.
    pub fn default_for_tty() -> Self {
        if atty::is(atty::Stream::Stderr) {
            ProgressMode::Human
        } else {
            ProgressMode::Off
        }
    }

    pub fn reporter(&self) -> Box<dyn LoadProgressReporter> {
        match self {
            ProgressMode::Off => Box::new(NoProgress),
            ProgressMode::Human => Box::new(StderrProgress),
            ProgressMode::Json => Box::new(JsonProgress),
        }
    }
}
