//! Append-only log of finished training sessions.
//!
//! Summaries are appended to a JSONL (JSON Lines) file with file locking
//! so that concurrent CLI invocations never interleave partial lines.
//! A record torn by a crash only costs its own line: the next append
//! starts on a fresh line, and reads skip anything that does not parse.

use crate::{Result, SessionSummary};
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// File name of the session log inside the data directory
pub const SESSION_LOG_FILE: &str = "sessions.jsonl";

/// Destination for finished session summaries
pub trait SummarySink {
    fn append(&mut self, summary: &SessionSummary) -> Result<()>;
}

/// JSONL-based summary log with file locking
pub struct JsonlSessionLog {
    path: PathBuf,
}

impl JsonlSessionLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Log stored at the standard location under `data_dir`
    pub fn in_data_dir(data_dir: &Path) -> Self {
        Self::new(data_dir.join(SESSION_LOG_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn ensure_parent_dir(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(())
    }
}

/// True when the file has content that does not end in a newline
fn ends_mid_line(file: &mut File) -> Result<bool> {
    let len = file.metadata()?.len();
    if len == 0 {
        return Ok(false);
    }
    let mut last = [0u8; 1];
    file.seek(SeekFrom::Start(len - 1))?;
    file.read_exact(&mut last)?;
    Ok(last[0] != b'\n')
}

impl SummarySink for JsonlSessionLog {
    fn append(&mut self, summary: &SessionSummary) -> Result<()> {
        self.ensure_parent_dir()?;

        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&self.path)?;

        file.lock_exclusive()?;
        let result = write_record(&mut file, summary);
        file.unlock()?;
        result?;

        tracing::debug!("Appended session {} to {:?}", summary.id, self.path);
        Ok(())
    }
}

/// Write one summary line; caller holds the exclusive lock
fn write_record(file: &mut File, summary: &SessionSummary) -> Result<()> {
    let mut record = Vec::new();
    if ends_mid_line(file)? {
        tracing::warn!("Session log ends with a partial record, starting a new line");
        record.push(b'\n');
    }
    serde_json::to_writer(&mut record, summary)?;
    record.push(b'\n');

    file.write_all(&record)?;
    file.flush()?;
    Ok(())
}

/// Read all summaries from a log file, oldest first
///
/// Lines that are not valid UTF-8 JSON are skipped with a warning.
pub fn read_summaries(path: &Path) -> Result<Vec<SessionSummary>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let file = File::open(path)?;
    file.lock_shared()?;
    let result = parse_summaries(BufReader::new(&file));
    file.unlock()?;

    let summaries = result?;
    tracing::debug!("Read {} sessions from {:?}", summaries.len(), path);
    Ok(summaries)
}

fn parse_summaries<R: BufRead>(reader: R) -> Result<Vec<SessionSummary>> {
    let mut summaries = Vec::new();

    for (line_num, line) in reader.split(b'\n').enumerate() {
        let line = line?;
        if line.iter().all(u8::is_ascii_whitespace) {
            continue;
        }

        match serde_json::from_slice::<SessionSummary>(&line) {
            Ok(summary) => summaries.push(summary),
            Err(e) => {
                tracing::warn!("Skipping session log line {}: {}", line_num + 1, e);
            }
        }
    }

    Ok(summaries)
}
