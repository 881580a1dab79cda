use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Local;
use log::debug;
use serde::{Deserialize, Serialize};

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One logged exchange. `bot` holds the response split into lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogRecord {
    pub timestamp: String,
    pub user: String,
    pub bot: Vec<String>,
}

impl LogRecord {
    pub fn new(user: &str, bot: &str) -> Self {
        Self {
            timestamp: Local::now().format(TIMESTAMP_FORMAT).to_string(),
            user: user.to_string(),
            bot: split_lines(bot),
        }
    }
}

/// Split on `\n` only, so joining with `\n` gives the text back unchanged (`\r` included).
fn split_lines(text: &str) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }
    text.split('\n').map(str::to_string).collect()
}

/// Append-only record of every exchange, kept as a text log and a JSON array.
///
/// The JSON file is read and rewritten whole on each append; two processes
/// sharing the same files will lose records.
#[derive(Debug, Clone)]
pub struct InteractionLog {
    text_path: PathBuf,
    json_path: PathBuf,
}

impl InteractionLog {
    pub fn new(text_path: impl Into<PathBuf>, json_path: impl Into<PathBuf>) -> Self {
        Self {
            text_path: text_path.into(),
            json_path: json_path.into(),
        }
    }

    #[allow(dead_code)]
    pub fn text_path(&self) -> &Path {
        &self.text_path
    }

    #[allow(dead_code)]
    pub fn json_path(&self) -> &Path {
        &self.json_path
    }

    /// Persist one exchange to both logs.
    pub fn record(&self, user: &str, bot: &str) -> Result<LogRecord> {
        let record = LogRecord::new(user, bot);
        self.append_text(&record.timestamp, user, bot)?;
        self.append_json(&record)?;
        debug!(
            "Logged exchange to {} and {}",
            self.text_path.display(),
            self.json_path.display()
        );
        Ok(record)
    }

    /// Every record in the JSON log, oldest first. A missing file is an empty log.
    pub fn load(&self) -> Result<Vec<LogRecord>> {
        if !self.json_path.exists() {
            return Ok(Vec::new());
        }
        let contents = fs::read_to_string(&self.json_path)
            .with_context(|| format!("Failed to read {}", self.json_path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse {}", self.json_path.display()))
    }

    fn append_text(&self, timestamp: &str, user: &str, bot: &str) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.text_path)
            .with_context(|| format!("Failed to open {}", self.text_path.display()))?;
        write!(file, "[{}]\nYou: {}\nBot:\n{}\n\n", timestamp, user, bot)
            .with_context(|| format!("Failed to write {}", self.text_path.display()))
    }

    fn append_json(&self, record: &LogRecord) -> Result<()> {
        let mut records = self.load()?;
        records.push(record.clone());
        let contents =
            serde_json::to_string_pretty(&records).context("Failed to serialize interaction log")?;
        fs::write(&self.json_path, contents)
            .with_context(|| format!("Failed to write {}", self.json_path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;
    use tempfile::TempDir;

    fn log_in(dir: &TempDir) -> InteractionLog {
        InteractionLog::new(
            dir.path().join("interaction_logs.txt"),
            dir.path().join("interaction_logs.json"),
        )
    }

    #[test]
    fn test_text_log_block_format() {
        let dir = TempDir::new().unwrap();
        let log = log_in(&dir);
        let record = log.record("add 1 and 2", "🧮 1 + 2 = 3\nsecond line").unwrap();

        let text = fs::read_to_string(log.text_path()).unwrap();
        assert_eq!(
            text,
            format!(
                "[{}]\nYou: add 1 and 2\nBot:\n🧮 1 + 2 = 3\nsecond line\n\n",
                record.timestamp
            )
        );
        assert!(NaiveDateTime::parse_from_str(&record.timestamp, TIMESTAMP_FORMAT).is_ok());
    }

    #[test]
    fn test_json_log_appends_records() {
        let dir = TempDir::new().unwrap();
        let log = log_in(&dir);
        assert!(log.load().unwrap().is_empty());

        log.record("first", "one").unwrap();
        let records = log.load().unwrap();
        assert_eq!(records.len(), 1);

        log.record("second", "two\nthree").unwrap();
        let records = log.load().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].user, "first");
        assert_eq!(records[1].bot, vec!["two", "three"]);
    }

    #[test]
    fn test_bot_lines_round_trip() {
        let dir = TempDir::new().unwrap();
        let log = log_in(&dir);
        let response = "🇩🇪 German Translation: hallo\n🧮 2 + 3 = 5\nLLM Error: timeout";
        log.record("mixed", response).unwrap();

        let records = log.load().unwrap();
        let expected: Vec<&str> = response.split('\n').collect();
        assert_eq!(records[0].bot, expected);
        assert_eq!(records[0].bot.join("\n"), response);
    }

    #[test]
    fn test_crlf_reply_round_trips() {
        let dir = TempDir::new().unwrap();
        let log = log_in(&dir);
        let response = "Line one\r\nLine two\r\nLine three";
        log.record("windows", response).unwrap();

        let records = log.load().unwrap();
        assert_eq!(records[0].bot, vec!["Line one\r", "Line two\r", "Line three"]);
        assert_eq!(records[0].bot.join("\n"), response);
        assert!(split_lines("").is_empty());
    }

    #[test]
    fn test_unwritable_location_is_an_error() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("no_such_dir");
        let log = InteractionLog::new(missing.join("log.txt"), missing.join("log.json"));
        assert!(log.record("hi", "there").is_err());
    }
}
