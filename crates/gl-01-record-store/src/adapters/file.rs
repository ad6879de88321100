//! # File-Backed Ledger
//!
//! ```text
//! <data_dir>/
//!   LOCK          exclusive lock, holder's PID
//!   log.bin       write log, one frame per accepted write, never rewritten
//!   journal.bin   values written since the last checkpoint
//!   state.bin     checkpoint: live world state through a log sequence
//! ```
//!
//! A write appends its journal record, then its log entry, syncing each,
//! before it becomes visible. Every `checkpoint_interval` writes the live
//! state goes to `state.bin` (temp file + rename) and the journal is
//! emptied. Per-write cost is two appends whatever the ledger's age; only
//! the log grows with history, by one fixed-size entry per write.
//!
//! Frames are a little-endian `u32` length followed by bincode bytes. A
//! torn frame at the tail of either file is dropped on open.

use crate::adapters::lock::DataDirLock;
use crate::adapters::memory::InMemoryLedger;
use crate::domain::entities::{LogEntry, Version, VersionedValue};
use crate::domain::errors::StoreError;
use crate::domain::selector::Selector;
use crate::domain::value_objects::{StoreConfig, WriteCondition};
use crate::domain::world_state::{StagedWrite, WorldState};
use crate::domain::write_log::WriteLog;
use crate::ports::iterator::StateQueryIterator;
use crate::ports::ledger::LedgerStore;
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

const LOG_FILE: &str = "log.bin";
const JOURNAL_FILE: &str = "journal.bin";
const CHECKPOINT_FILE: &str = "state.bin";
const FRAME_HEADER: usize = 4;

/// Writes between checkpoints unless overridden.
pub const DEFAULT_CHECKPOINT_INTERVAL: u64 = 1024;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct JournalRecord {
    sequence: u64,
    key: String,
    value: Vec<u8>,
}

#[derive(Serialize)]
struct CheckpointRef<'a> {
    through: u64,
    entries: &'a BTreeMap<String, VersionedValue>,
}

#[derive(Deserialize)]
struct Checkpoint {
    through: u64,
    entries: BTreeMap<String, VersionedValue>,
}

fn io_error(path: &Path, e: std::io::Error) -> StoreError {
    StoreError::unavailable(format!("{}: {e}", path.display()))
}

fn serialization(e: bincode::Error) -> StoreError {
    StoreError::Serialization {
        message: e.to_string(),
    }
}

fn encode_frame<T: Serialize>(item: &T) -> Result<Vec<u8>, StoreError> {
    let body = bincode::serialize(item).map_err(serialization)?;
    let len = u32::try_from(body.len()).map_err(|_| StoreError::Serialization {
        message: format!("frame of {} bytes exceeds u32", body.len()),
    })?;
    let mut frame = Vec::with_capacity(FRAME_HEADER + body.len());
    frame.extend_from_slice(&len.to_le_bytes());
    frame.extend_from_slice(&body);
    Ok(frame)
}

/// Complete frames in `path`, each with the byte offset just past it.
/// Stops at the first short frame.
fn read_frames<T: DeserializeOwned>(path: &Path) -> Result<Vec<(T, u64)>, StoreError> {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(io_error(path, e)),
    };

    let mut frames = Vec::new();
    let mut cursor = 0usize;
    while cursor < bytes.len() {
        let Some(header) = bytes
            .get(cursor..cursor + FRAME_HEADER)
            .and_then(|h| <[u8; FRAME_HEADER]>::try_from(h).ok())
        else {
            break;
        };
        let start = cursor + FRAME_HEADER;
        let Some(body) = start
            .checked_add(u32::from_le_bytes(header) as usize)
            .and_then(|end| bytes.get(start..end))
        else {
            break;
        };
        let item = bincode::deserialize(body).map_err(serialization)?;
        cursor = start + body.len();
        frames.push((item, cursor as u64));
    }

    if cursor < bytes.len() {
        tracing::warn!(
            path = %path.display(),
            dropped_bytes = bytes.len() - cursor,
            "[gl-01] torn frame at end of file"
        );
    }
    Ok(frames)
}

/// One append-only file of frames.
struct FrameFile {
    path: PathBuf,
    file: File,
    len: u64,
}

impl FrameFile {
    /// Open for appending, cutting anything past `valid_len`.
    fn open(path: PathBuf, valid_len: u64) -> Result<Self, StoreError> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| io_error(&path, e))?;
        let mut frames = Self {
            path,
            file,
            len: valid_len,
        };
        let actual = frames
            .file
            .metadata()
            .map_err(|e| io_error(&frames.path, e))?
            .len();
        if actual != valid_len {
            frames.truncate(valid_len)?;
        }
        Ok(frames)
    }

    fn append<T: Serialize>(&mut self, item: &T) -> Result<(), StoreError> {
        let frame = encode_frame(item)?;
        self.file
            .write_all(&frame)
            .and_then(|()| self.file.sync_data())
            .map_err(|e| io_error(&self.path, e))?;
        self.len += frame.len() as u64;
        Ok(())
    }

    fn truncate(&mut self, len: u64) -> Result<(), StoreError> {
        self.file
            .set_len(len)
            .and_then(|()| self.file.sync_all())
            .map_err(|e| io_error(&self.path, e))?;
        self.len = len;
        Ok(())
    }
}

/// On-disk side of the ledger. Guarded by one mutex so appends and
/// checkpoints never interleave.
struct LedgerFiles {
    log: FrameFile,
    journal: FrameFile,
    checkpoint_path: PathBuf,
    since_checkpoint: u64,
    interval: u64,
    /// Set when a failed write could not be rolled back.
    damaged: Option<String>,
}

impl LedgerFiles {
    fn record(&mut self, staged: &StagedWrite) -> Result<(), StoreError> {
        if let Some(reason) = &self.damaged {
            return Err(StoreError::unavailable(format!(
                "ledger files need recovery, reopen the ledger: {reason}"
            )));
        }

        let (log_len, journal_len) = (self.log.len, self.journal.len);
        let record = JournalRecord {
            sequence: staged.entry.sequence,
            key: staged.entry.key.clone(),
            value: staged.value.clone(),
        };
        let appended = self
            .journal
            .append(&record)
            .and_then(|()| self.log.append(&staged.entry));

        if let Err(e) = appended {
            // The sequence is reused by the next write, so no trace may remain.
            let rollback = self
                .journal
                .truncate(journal_len)
                .and_then(|()| self.log.truncate(log_len));
            if let Err(rollback) = rollback {
                tracing::error!(error = %rollback, "[gl-01] ❌ rollback after failed write failed");
                self.damaged = Some(rollback.to_string());
            }
            return Err(e);
        }

        self.since_checkpoint += 1;
        Ok(())
    }

    fn checkpoint_due(&self) -> bool {
        self.since_checkpoint >= self.interval
    }

    fn checkpoint(
        &mut self,
        entries: &BTreeMap<String, VersionedValue>,
        through: u64,
    ) -> Result<(), StoreError> {
        let bytes =
            bincode::serialize(&CheckpointRef { through, entries }).map_err(serialization)?;

        let path = &self.checkpoint_path;
        let temp_path = path.with_extension("tmp");
        let mut file = File::create(&temp_path).map_err(|e| io_error(&temp_path, e))?;
        file.write_all(&bytes)
            .and_then(|()| file.sync_all())
            .map_err(|e| io_error(&temp_path, e))?;
        std::fs::rename(&temp_path, path).map_err(|e| io_error(path, e))?;

        // Records up to `through` are skipped on replay, so a crash before
        // this truncate is harmless.
        self.journal.truncate(0)?;
        self.since_checkpoint = 0;
        tracing::debug!(through, keys = entries.len(), "[gl-01] checkpoint written");
        Ok(())
    }
}

pub struct FileBackedLedger {
    inner: InMemoryLedger,
    files: Mutex<LedgerFiles>,
    data_dir: PathBuf,
    _lock: DataDirLock,
}

impl FileBackedLedger {
    /// Open (or create) the ledger in `data_dir`.
    ///
    /// Fails with `Locked` if another handle holds the directory and with
    /// `TamperDetected` if the stored state does not match its write log.
    pub fn open<P: AsRef<Path>>(data_dir: P, config: StoreConfig) -> Result<Self, StoreError> {
        let data_dir = data_dir.as_ref();
        std::fs::create_dir_all(data_dir).map_err(|e| io_error(data_dir, e))?;

        let lock = DataDirLock::acquire(data_dir)?;
        let log_path = data_dir.join(LOG_FILE);
        let journal_path = data_dir.join(JOURNAL_FILE);
        let checkpoint_path = data_dir.join(CHECKPOINT_FILE);

        let (through, mut entries) = match Self::load_checkpoint(&checkpoint_path)? {
            Some(checkpoint) => (checkpoint.through, checkpoint.entries),
            None => (0, BTreeMap::new()),
        };

        let log_frames: Vec<(LogEntry, u64)> = read_frames(&log_path)?;
        let log_len = log_frames.last().map_or(0, |(_, end)| *end);
        let log_entries: Vec<LogEntry> = log_frames.into_iter().map(|(entry, _)| entry).collect();
        let logged = log_entries.len() as u64;
        if through > logged {
            return Err(StoreError::TamperDetected {
                sequence: logged + 1,
            });
        }

        let mut journal_len = 0;
        let mut replayed = 0;
        for (record, end) in read_frames::<JournalRecord>(&journal_path)? {
            // Journalled but never logged: the write was not accepted.
            if record.sequence > logged {
                break;
            }
            journal_len = end;
            if record.sequence <= through {
                continue;
            }
            entries.insert(
                record.key,
                VersionedValue {
                    value: record.value,
                    version: record.sequence,
                },
            );
            replayed += 1;
        }

        let state = WorldState::restore(entries, WriteLog::from_entries(log_entries), &config)?;
        tracing::info!(
            "[gl-01] 💾 Opened {} ({} keys, {} log entries, {} replayed)",
            data_dir.display(),
            state.len(),
            state.log().len(),
            replayed
        );

        let files = LedgerFiles {
            log: FrameFile::open(log_path, log_len)?,
            journal: FrameFile::open(journal_path, journal_len)?,
            checkpoint_path,
            since_checkpoint: replayed,
            interval: DEFAULT_CHECKPOINT_INTERVAL,
            damaged: None,
        };

        Ok(Self {
            inner: InMemoryLedger::from_state(state),
            files: Mutex::new(files),
            data_dir: data_dir.to_path_buf(),
            _lock: lock,
        })
    }

    /// Checkpoint every `interval` writes (minimum 1).
    pub fn with_checkpoint_interval(self, interval: u64) -> Self {
        self.files.lock().interval = interval.max(1);
        self
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn load_checkpoint(path: &Path) -> Result<Option<Checkpoint>, StoreError> {
        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(io_error(path, e)),
        };
        bincode::deserialize(&bytes).map(Some).map_err(serialization)
    }

    fn write(&self, key: &str, value: &[u8], condition: WriteCondition) -> Result<Version, StoreError> {
        let mut files = self.files.lock();
        let version = self
            .inner
            .write_staged(key, value, condition, |staged| files.record(staged))
            .inspect_err(|e| {
                if !matches!(e, StoreError::WriteConflict { .. }) {
                    tracing::warn!(key, error = %e, "[gl-01] write not persisted");
                }
            })?;
        tracing::debug!(key, version, "[gl-01] write persisted");

        if files.checkpoint_due() {
            let (entries, through) = self.inner.checkpoint_view();
            if let Err(e) = files.checkpoint(&entries, through) {
                tracing::warn!(error = %e, "[gl-01] checkpoint failed, journal kept");
            }
        }
        Ok(version)
    }
}

impl LedgerStore for FileBackedLedger {
    fn put(&self, key: &str, value: &[u8]) -> Result<Version, StoreError> {
        self.write(key, value, WriteCondition::Always)
    }

    fn put_if_version(
        &self,
        key: &str,
        value: &[u8],
        expected: Option<Version>,
    ) -> Result<Version, StoreError> {
        self.write(key, value, WriteCondition::from_expected(expected))
    }

    fn get_versioned(&self, key: &str) -> Result<VersionedValue, StoreError> {
        self.inner.get_versioned(key)
    }

    fn range_scan(&self, start: &str, end: &str) -> Result<StateQueryIterator, StoreError> {
        self.inner.range_scan(start, end)
    }

    fn query_by_predicate(&self, selector: &Selector) -> Result<StateQueryIterator, StoreError> {
        self.inner.query_by_predicate(selector)
    }

    fn history(&self, key: &str) -> Result<Vec<LogEntry>, StoreError> {
        self.inner.history(key)
    }

    fn verify_write_log(&self) -> Result<(), StoreError> {
        self.inner.verify_write_log()
    }

    fn open_cursors(&self) -> usize {
        self.inner.open_cursors()
    }
}
