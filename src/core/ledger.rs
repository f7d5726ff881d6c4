//! Resume ledger for the transcription stage.
//!
//! The ledger maps a day identifier to the last outcome of transcribing
//! that day. A transcription driver opens it once per run, asks
//! [`ResumeLedger::should_process`] for every day, and calls
//! [`ResumeLedger::record`] after each one; every record is persisted
//! immediately with an atomic replace.
//!
//! The ledger is an optimization. A missing or corrupt ledger file is
//! treated as empty and only logged.
//!
//! One process is assumed to own the ledger file for a run. Concurrent
//! runs against the same path must serialize the load-modify-persist
//! cycle themselves, for example with [`FileLedgerStore::lock`] (feature
//! `file-lock`).
//!
//! # File format
//!
//! ```json
//! {
//!   "2022-10-18": {
//!     "input": "output/raw/BoardMeeting-2022-10-18.txt",
//!     "output": "output/transcripts/Board-MeetingTranscript-2022-10-18.md",
//!     "status": "failed",
//!     "error": "HTTP 429",
//!     "provider": "openai",
//!     "model": "gpt-4o",
//!     "updated_at": "2024-05-01T09:30:00Z"
//!   }
//! }
//! ```

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::atomic::write_atomic;
use super::day::DayFile;
use crate::error::{ChatminutesError, Result};

/// Default ledger file name, placed next to the transcripts.
pub const DEFAULT_LEDGER_FILE_NAME: &str = "ledger.json";

/// Ledger path colocated with a transcription output directory.
pub fn default_ledger_path(transcript_dir: &Path) -> PathBuf {
    transcript_dir.join(DEFAULT_LEDGER_FILE_NAME)
}

/// Persisted status of one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayStatus {
    Success,
    Failed,
    Skipped,
}

impl fmt::Display for DayStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DayStatus::Success => write!(f, "success"),
            DayStatus::Failed => write!(f, "failed"),
            DayStatus::Skipped => write!(f, "skipped"),
        }
    }
}

/// Terminal result of processing one day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Success,
    /// Failed with a message
    Failed(String),
    Skipped,
}

impl Outcome {
    pub fn status(&self) -> DayStatus {
        match self {
            Outcome::Success => DayStatus::Success,
            Outcome::Failed(_) => DayStatus::Failed,
            Outcome::Skipped => DayStatus::Skipped,
        }
    }
}

/// Everything the driver reports about one processed day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayOutcome {
    pub input: PathBuf,
    pub output: PathBuf,
    pub provider: String,
    pub model: String,
    pub outcome: Outcome,
}

impl DayOutcome {
    pub fn new(
        input: impl Into<PathBuf>,
        output: impl Into<PathBuf>,
        provider: impl Into<String>,
        model: impl Into<String>,
        outcome: Outcome,
    ) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            provider: provider.into(),
            model: model.into(),
            outcome,
        }
    }
}

/// One ledger entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerRecord {
    pub input: PathBuf,
    pub output: PathBuf,
    pub status: DayStatus,
    /// Present only when `status` is `failed`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub provider: String,
    pub model: String,
    pub updated_at: DateTime<Utc>,
}

impl LedgerRecord {
    /// Builds a record, keeping the error iff the outcome failed.
    pub fn from_outcome(outcome: DayOutcome, updated_at: DateTime<Utc>) -> Self {
        let status = outcome.outcome.status();
        let error = match outcome.outcome {
            Outcome::Failed(message) => Some(message),
            Outcome::Success | Outcome::Skipped => None,
        };
        Self {
            input: outcome.input,
            output: outcome.output,
            status,
            error,
            provider: outcome.provider,
            model: outcome.model,
            updated_at,
        }
    }
}

/// Ledger contents: day identifier to record, ordered by identifier.
pub type LedgerEntries = BTreeMap<String, LedgerRecord>;

/// Which days a run processes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResumeMode {
    /// Every day
    #[default]
    All,
    /// Every day not already recorded as `success`
    RetryFailed,
}

/// Backing storage for a ledger.
pub trait LedgerStore {
    /// Loads all entries. A store with nothing saved yet returns an empty
    /// map.
    fn load(&self) -> Result<LedgerEntries>;

    /// Replaces all entries.
    fn save(&self, entries: &LedgerEntries) -> Result<()>;

    /// Human-readable location, for logs.
    fn describe(&self) -> String;
}

/// A JSON ledger file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileLedgerStore {
    path: PathBuf,
}

impl FileLedgerStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path of the advisory lock file, `<ledger>.lock`.
    pub fn lock_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".lock");
        PathBuf::from(name)
    }

    /// Takes an exclusive advisory lock for the duration of the guard.
    ///
    /// Blocks until any other holder releases it.
    #[cfg(feature = "file-lock")]
    pub fn lock(&self) -> Result<LedgerLock> {
        use fs2::FileExt;

        let lock_path = self.lock_path();
        if let Some(parent) = lock_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| ChatminutesError::ledger(&self.path, e))?;
        }
        let file = fs::OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&lock_path)
            .map_err(|e| ChatminutesError::ledger(&self.path, e))?;
        file.lock_exclusive()
            .map_err(|e| ChatminutesError::ledger(&self.path, e))?;
        Ok(LedgerLock { _file: file })
    }
}

/// Guard returned by [`FileLedgerStore::lock`]; the lock is released on drop.
#[cfg(feature = "file-lock")]
#[derive(Debug)]
pub struct LedgerLock {
    _file: fs::File,
}

impl LedgerStore for FileLedgerStore {
    fn load(&self) -> Result<LedgerEntries> {
        let data = match fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(LedgerEntries::new()),
            Err(e) => return Err(ChatminutesError::ledger(&self.path, e)),
        };
        if data.trim().is_empty() {
            return Ok(LedgerEntries::new());
        }
        serde_json::from_str(&data).map_err(|e| ChatminutesError::ledger(&self.path, e))
    }

    fn save(&self, entries: &LedgerEntries) -> Result<()> {
        let mut json = serde_json::to_string_pretty(entries)?;
        json.push('\n');
        write_atomic(&self.path, json.as_bytes()).map_err(|e| ChatminutesError::ledger(&self.path, e))
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// An in-memory store, for tests and for embedding the ledger elsewhere.
#[derive(Debug, Default)]
pub struct MemoryLedgerStore {
    entries: RefCell<LedgerEntries>,
    saves: RefCell<usize>,
}

impl MemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store preloaded with entries.
    pub fn with_entries(entries: LedgerEntries) -> Self {
        Self {
            entries: RefCell::new(entries),
            saves: RefCell::new(0),
        }
    }

    /// Snapshot of the stored entries.
    pub fn entries(&self) -> LedgerEntries {
        self.entries.borrow().clone()
    }

    /// Number of `save` calls so far.
    pub fn save_count(&self) -> usize {
        *self.saves.borrow()
    }
}

impl LedgerStore for MemoryLedgerStore {
    fn load(&self) -> Result<LedgerEntries> {
        Ok(self.entries.borrow().clone())
    }

    fn save(&self, entries: &LedgerEntries) -> Result<()> {
        *self.entries.borrow_mut() = entries.clone();
        *self.saves.borrow_mut() += 1;
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}

/// The loaded ledger plus the store it persists to.
#[derive(Debug)]
pub struct ResumeLedger<S: LedgerStore> {
    store: S,
    entries: LedgerEntries,
}

impl ResumeLedger<FileLedgerStore> {
    /// Opens the JSON ledger at `path`.
    pub fn open_file(path: impl Into<PathBuf>) -> Self {
        Self::open(FileLedgerStore::new(path))
    }
}

impl<S: LedgerStore> ResumeLedger<S> {
    /// Loads the ledger. Never fails: an unreadable or malformed ledger is
    /// logged and treated as empty.
    pub fn open(store: S) -> Self {
        let entries = match store.load() {
            Ok(entries) => {
                debug!(ledger = %store.describe(), days = entries.len(), "loaded ledger");
                entries
            }
            Err(err) => {
                warn!(ledger = %store.describe(), error = %err, "ignoring unusable ledger, starting empty");
                LedgerEntries::new()
            }
        };
        Self { store, entries }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn entries(&self) -> &LedgerEntries {
        &self.entries
    }

    pub fn get(&self, day_id: &str) -> Option<&LedgerRecord> {
        self.entries.get(day_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether a run in `mode` should process `day_id`.
    pub fn should_process(&self, day_id: &str, mode: ResumeMode) -> bool {
        match mode {
            ResumeMode::All => true,
            ResumeMode::RetryFailed => self
                .entries
                .get(day_id)
                .is_none_or(|record| record.status != DayStatus::Success),
        }
    }

    /// The subset of `days` a run in `mode` should process, in order.
    pub fn plan<'a>(&self, days: &'a [DayFile], mode: ResumeMode) -> Vec<&'a DayFile> {
        days.iter()
            .filter(|day| self.should_process(&day.day_id, mode))
            .collect()
    }

    /// Records an outcome stamped with the current time and persists.
    pub fn record(&mut self, day_id: impl Into<String>, outcome: DayOutcome) -> Result<()> {
        self.record_at(day_id, outcome, Utc::now())
    }

    /// Records an outcome with an explicit timestamp and persists.
    ///
    /// The in-memory entry is updated even when persisting fails.
    pub fn record_at(
        &mut self,
        day_id: impl Into<String>,
        outcome: DayOutcome,
        updated_at: DateTime<Utc>,
    ) -> Result<()> {
        let day_id = day_id.into();
        let record = LedgerRecord::from_outcome(outcome, updated_at);
        debug!(day = %day_id, status = %record.status, "recording outcome");
        self.entries.insert(day_id, record);
        self.store.save(&self.entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap()
    }

    fn outcome(outcome: Outcome) -> DayOutcome {
        DayOutcome::new(
            "raw/Board-2022-10-18.txt",
            "transcripts/Board-MeetingTranscript-2022-10-18.md",
            "openai",
            "gpt-4o",
            outcome,
        )
    }

    fn day(id: &str) -> DayFile {
        DayFile::from_path(format!("raw/Board-{id}.txt")).unwrap()
    }

    #[test]
    fn test_record_error_only_when_failed() {
        let failed = LedgerRecord::from_outcome(outcome(Outcome::Failed("HTTP 429".into())), ts());
        assert_eq!(failed.status, DayStatus::Failed);
        assert_eq!(failed.error.as_deref(), Some("HTTP 429"));

        let ok = LedgerRecord::from_outcome(outcome(Outcome::Success), ts());
        assert_eq!(ok.status, DayStatus::Success);
        assert_eq!(ok.error, None);

        let skipped = LedgerRecord::from_outcome(outcome(Outcome::Skipped), ts());
        assert_eq!(skipped.status, DayStatus::Skipped);
        assert_eq!(skipped.error, None);
    }

    #[test]
    fn test_record_serialized_keys() {
        let record = LedgerRecord::from_outcome(outcome(Outcome::Success), ts());
        let value = serde_json::to_value(&record).unwrap();
        let obj = value.as_object().unwrap();
        let mut keys: Vec<_> = obj.keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(
            keys,
            ["input", "model", "output", "provider", "status", "updated_at"]
        );
        assert_eq!(obj["status"], "success");
        assert_eq!(obj["updated_at"], "2024-05-01T09:30:00Z");
    }

    #[test]
    fn test_should_process_modes() {
        let mut ledger = ResumeLedger::open(MemoryLedgerStore::new());
        ledger
            .record_at("2022-10-18", outcome(Outcome::Failed("timeout".into())), ts())
            .unwrap();
        ledger
            .record_at("2022-10-19", outcome(Outcome::Success), ts())
            .unwrap();
        ledger
            .record_at("2022-10-20", outcome(Outcome::Skipped), ts())
            .unwrap();

        for id in ["2022-10-18", "2022-10-19", "2022-10-20", "2022-10-21"] {
            assert!(ledger.should_process(id, ResumeMode::All));
        }
        assert!(ledger.should_process("2022-10-18", ResumeMode::RetryFailed));
        assert!(!ledger.should_process("2022-10-19", ResumeMode::RetryFailed));
        assert!(ledger.should_process("2022-10-20", ResumeMode::RetryFailed));
        assert!(ledger.should_process("2022-10-21", ResumeMode::RetryFailed));
    }

    #[test]
    fn test_plan_retries_only_failed() {
        let mut entries = LedgerEntries::new();
        entries.insert(
            "2022-10-18".into(),
            LedgerRecord::from_outcome(outcome(Outcome::Failed("boom".into())), ts()),
        );
        entries.insert(
            "2022-10-19".into(),
            LedgerRecord::from_outcome(outcome(Outcome::Success), ts()),
        );
        let ledger = ResumeLedger::open(MemoryLedgerStore::with_entries(entries));
        let days = [day("2022-10-18"), day("2022-10-19")];

        let planned: Vec<_> = ledger
            .plan(&days, ResumeMode::RetryFailed)
            .into_iter()
            .map(|d| d.day_id.as_str())
            .collect();
        assert_eq!(planned, ["2022-10-18"]);
        assert_eq!(ledger.plan(&days, ResumeMode::All).len(), 2);
    }

    #[test]
    fn test_record_persists_every_time_and_upserts() {
        let mut ledger = ResumeLedger::open(MemoryLedgerStore::new());
        ledger
            .record_at("2022-10-18", outcome(Outcome::Failed("x".into())), ts())
            .unwrap();
        ledger
            .record_at("2022-10-18", outcome(Outcome::Success), ts())
            .unwrap();

        assert_eq!(ledger.store().save_count(), 2);
        let stored = ledger.store().entries();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored["2022-10-18"].status, DayStatus::Success);
        assert_eq!(stored["2022-10-18"].error, None);
    }

    #[test]
    fn test_record_stamps_current_time() {
        let before = Utc::now();
        let mut ledger = ResumeLedger::open(MemoryLedgerStore::new());
        ledger.record("2022-10-18", outcome(Outcome::Success)).unwrap();
        assert!(ledger.get("2022-10-18").unwrap().updated_at >= before);
    }

    #[test]
    fn test_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("transcripts").join(DEFAULT_LEDGER_FILE_NAME);

        let mut ledger = ResumeLedger::open_file(&path);
        assert!(ledger.is_empty());
        ledger
            .record_at("2022-10-18", outcome(Outcome::Failed("HTTP 500".into())), ts())
            .unwrap();

        let reopened = ResumeLedger::open_file(&path);
        let record = reopened.get("2022-10-18").unwrap();
        assert_eq!(record.status, DayStatus::Failed);
        assert_eq!(record.error.as_deref(), Some("HTTP 500"));
        assert_eq!(record.updated_at, ts());
    }

    #[test]
    fn test_corrupt_file_is_empty_ledger() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.json");
        fs::write(&path, "{ not json").unwrap();

        let store = FileLedgerStore::new(&path);
        assert!(store.load().unwrap_err().is_malformed_ledger());

        let mut ledger = ResumeLedger::open(store);
        assert!(ledger.is_empty());
        assert!(ledger.should_process("2022-10-18", ResumeMode::RetryFailed));

        // The next record replaces the corrupt file with a valid one
        ledger
            .record_at("2022-10-18", outcome(Outcome::Success), ts())
            .unwrap();
        assert_eq!(FileLedgerStore::new(&path).load().unwrap().len(), 1);
    }

    #[test]
    fn test_empty_file_is_empty_ledger() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.json");
        fs::write(&path, "").unwrap();
        assert!(FileLedgerStore::new(&path).load().unwrap().is_empty());
    }

    #[test]
    fn test_lock_path() {
        let store = FileLedgerStore::new("out/ledger.json");
        assert_eq!(store.lock_path(), PathBuf::from("out/ledger.json.lock"));
    }

    #[cfg(feature = "file-lock")]
    #[test]
    fn test_lock_acquires_and_releases() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileLedgerStore::new(dir.path().join("ledger.json"));
        let guard = store.lock().unwrap();
        assert!(store.lock_path().exists());
        drop(guard);
        let _again = store.lock().unwrap();
    }
}
