//! Player to administrator mail log.
//!
//! - Storage: one UTF-8 line per message appended to a plain text file
//! - Format: `<epoch seconds, 2 decimals>: <sender> (<address>): <message>`
//! - Rate limit: one message per sender per cooldown window
//! - Concurrency: appends serialized by an in-process mutex plus an fs2 exclusive lock

use crate::logutil::escape_line;
use chrono::{DateTime, Utc};
use fs2::FileExt;
use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;
use thiserror::Error;

/// Default cooldown between two messages of the same sender.
pub const DEFAULT_DELAY: Duration = Duration::from_secs(90);

#[derive(Debug, Error)]
pub enum MailError {
    #[error("Do not send empty messages (admins can see your IP)")]
    Empty,
    #[error("Do not write too often: wait {remaining:.1} seconds")]
    TooSoon { remaining: f64 },
    #[error("mail log write failed: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, PartialEq)]
pub struct MailEntry {
    pub timestamp: DateTime<Utc>,
    pub sender: String,
    pub address: String,
    pub message: String,
}

impl MailEntry {
    /// The line written to the log, newline included.
    pub fn to_line(&self) -> String {
        let seconds = self.timestamp.timestamp_millis() as f64 / 1000.0;
        format!(
            "{:.2}: {} ({}): {}\n",
            seconds,
            escape_line(&self.sender),
            self.address,
            escape_line(&self.message)
        )
    }
}

#[derive(Debug)]
pub struct Mailbox {
    path: PathBuf,
    cooldown: Duration,
    // TODO: drop entries older than the cooldown; the map grows with every distinct sender
    last_sent: Mutex<HashMap<String, DateTime<Utc>>>,
}

impl Mailbox {
    pub fn new(path: impl Into<PathBuf>, cooldown: Duration) -> Self {
        Self {
            path: path.into(),
            cooldown,
            last_sent: Mutex::new(HashMap::new()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    /// Validate, rate limit and append one message.
    ///
    /// The cooldown slot is only taken once the line is on disk, so a failed write does not
    /// lock the sender out.
    pub fn submit(&self, sender: &str, address: &str, message: &str, now: DateTime<Utc>) -> Result<MailEntry, MailError> {
        let message = message.trim();
        if message.is_empty() {
            return Err(MailError::Empty);
        }

        // A poisoned lock only means another writer panicked mid-append; the map is still usable
        let mut last_sent = self.last_sent.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(last) = last_sent.get(sender) {
            let elapsed = (now - *last).to_std().unwrap_or_default();
            if elapsed < self.cooldown {
                let remaining = (self.cooldown - elapsed).as_secs_f64();
                return Err(MailError::TooSoon { remaining });
            }
        }

        let entry = MailEntry {
            timestamp: now,
            sender: sender.to_string(),
            address: address.to_string(),
            message: message.to_string(),
        };
        self.append(&entry.to_line())?;
        last_sent.insert(sender.to_string(), now);
        Ok(entry)
    }

    fn append(&self, line: &str) -> std::io::Result<()> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        let mut f = OpenOptions::new().create(true).append(true).open(&self.path)?;
        f.lock_exclusive()?;
        let result = f.write_all(line.as_bytes()).and_then(|_| f.flush());
        let _ = f.unlock();
        result
    }

    /// All lines currently in the log.
    pub fn read_log(&self) -> std::io::Result<Vec<String>> {
        match fs::read_to_string(&self.path) {
            Ok(s) => Ok(s.lines().map(str::to_string).collect()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn at(secs: i64, millis: u32) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, millis * 1_000_000).unwrap()
    }

    #[test]
    fn line_format() {
        let entry = MailEntry {
            timestamp: at(1_700_000_000, 250),
            sender: "Deuce".into(),
            address: "10.1.2.3".into(),
            message: "spawn\nkilling".into(),
        };
        assert_eq!(entry.to_line(), "1700000000.25: Deuce (10.1.2.3): spawn\\nkilling\n");
    }

    #[test]
    fn empty_message_rejected() {
        let dir = TempDir::new().unwrap();
        let mailbox = Mailbox::new(dir.path().join("mail.txt"), DEFAULT_DELAY);
        let err = mailbox.submit("Deuce", "10.1.2.3", "   ", at(0, 0)).unwrap_err();
        assert_eq!(err.to_string(), "Do not send empty messages (admins can see your IP)");
        assert!(mailbox.read_log().unwrap().is_empty());
    }

    #[test]
    fn cooldown_is_per_sender() {
        let dir = TempDir::new().unwrap();
        let mailbox = Mailbox::new(dir.path().join("mail.txt"), Duration::from_secs(90));
        mailbox.submit("Deuce", "10.1.2.3", "first", at(100, 0)).unwrap();
        let err = mailbox.submit("Deuce", "10.1.2.3", "second", at(130, 0)).unwrap_err();
        assert_eq!(err.to_string(), "Do not write too often: wait 60.0 seconds");
        mailbox.submit("Bravo", "10.1.2.4", "other sender", at(131, 0)).unwrap();
        mailbox.submit("Deuce", "10.1.2.3", "third", at(190, 0)).unwrap();
        assert_eq!(
            mailbox.read_log().unwrap(),
            vec![
                "100.00: Deuce (10.1.2.3): first",
                "131.00: Bravo (10.1.2.4): other sender",
                "190.00: Deuce (10.1.2.3): third",
            ]
        );
    }
}
