use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::record::RunSummary;
use super::UsageLogError;

/// Append-only JSON-lines log. Lines are never rewritten; appends are serialized by a mutex.
#[derive(Debug)]
pub struct UsageLog {
    path: PathBuf,
    lock: Mutex<()>,
}

impl UsageLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append a client-supplied body. Anything that is not JSON is dropped and reported as
    /// `Ok(false)`; valid JSON is re-serialized compactly onto one line.
    pub fn append_raw(&self, body: &[u8]) -> Result<bool, UsageLogError> {
        let payload: serde_json::Value = match serde_json::from_slice(body) {
            Ok(value) => value,
            Err(err) => {
                tracing::debug!(%err, "dropping malformed usage record");
                return Ok(false);
            }
        };
        let line = serde_json::to_string(&payload)?;
        self.append_line(&line)?;
        Ok(true)
    }

    pub fn append_record(&self, record: &RunSummary) -> Result<(), UsageLogError> {
        let line = serde_json::to_string(record)?;
        self.append_line(&line)
    }

    fn append_line(&self, line: &str) -> Result<(), UsageLogError> {
        let _guard = self.lock.lock().map_err(|_| UsageLogError::Poisoned)?;
        let mut file = self.open()?;
        let mut buf = String::with_capacity(line.len() + 1);
        buf.push_str(line);
        buf.push('\n');
        file.write_all(buf.as_bytes()).map_err(|source| UsageLogError::Io {
            path: self.path.clone(),
            source,
        })
    }

    fn open(&self) -> Result<File, UsageLogError> {
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|source| UsageLogError::Io {
                path: self.path.clone(),
                source,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_bodies_are_dropped() {
        let dir = tempfile::tempdir().expect("tempdir");
        let log = UsageLog::new(dir.path().join("usage.jsonl"));
        assert!(!log.append_raw(b"{not json").expect("append"));
        assert!(!log.path().exists());
    }

    #[test]
    fn valid_bodies_are_compacted_onto_one_line() {
        let dir = tempfile::tempdir().expect("tempdir");
        let log = UsageLog::new(dir.path().join("usage.jsonl"));
        assert!(log
            .append_raw(b"{\n  \"event\": \"sim_run\",\n  \"uid\": \"u1\"\n}")
            .expect("append"));
        assert!(log.append_raw(b"[1, 2]").expect("append"));
        let text = std::fs::read_to_string(log.path()).expect("read");
        assert_eq!(text, "{\"event\":\"sim_run\",\"uid\":\"u1\"}\n[1,2]\n");
    }
}
