//! File-backed metadata store.
//!
//! The store keeps an append-only JSON Lines log next to an advisory lock
//! file:
//!
//! ```text
//! <dir>/
//! ├─ meta.jsonl        # {"op":"set","entity":42,"key":"_html_code","value":"..."}
//! └─ meta.jsonl.lock   # Advisory lock for single-writer
//! ```
//!
//! On open the log is replayed into memory; reads never touch the disk.
//! A final line without a trailing newline is a torn append and is dropped.

use crate::error::{MetaError, MetaResult};
use crate::id::EntityId;
use crate::memory::{check_key, Table};
use crate::store::MetaStore;
use fs2::FileExt;
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
enum Record {
    Set {
        entity: EntityId,
        key: String,
        value: String,
    },
    Delete {
        entity: EntityId,
        key: String,
    },
    Purge {
        entity: EntityId,
    },
}

impl Record {
    fn apply(self, table: &mut Table) {
        match self {
            Record::Set { entity, key, value } => table.set(entity, &key, &value),
            Record::Delete { entity, key } => {
                table.delete(entity, &key);
            }
            Record::Purge { entity } => {
                table.purge(entity);
            }
        }
    }
}

/// A file-backed metadata store.
///
/// # Durability
///
/// - every write appends one line to the log before it becomes visible
/// - `flush()` calls `File::sync_data()` on the log
///
/// # Thread Safety
///
/// This store is thread-safe. A lock file guards against a second process
/// opening the same log.
///
/// # Example
///
/// ```no_run
/// use codepage_meta::{EntityId, FileMetaStore, MetaStore};
/// use std::path::Path;
///
/// let store = FileMetaStore::open(Path::new("site/meta.jsonl")).unwrap();
/// store.set(EntityId::new(42), "_js_code", "alert(1)").unwrap();
/// store.flush().unwrap();
/// ```
#[derive(Debug)]
pub struct FileMetaStore {
    path: PathBuf,
    log: Mutex<File>,
    table: RwLock<Table>,
    _lock_file: File,
}

impl FileMetaStore {
    /// Opens or creates the log at `path`, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Another process holds the lock (returns `Locked`)
    /// - A complete log line cannot be decoded (returns `Corrupted`)
    /// - I/O errors occur
    pub fn open(path: &Path) -> MetaResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let lock_path = lock_path(path);
        let lock_file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)?;
        if lock_file.try_lock_exclusive().is_err() {
            return Err(MetaError::Locked(path.to_path_buf()));
        }

        let mut log = OpenOptions::new()
            .read(true)
            .append(true)
            .create(true)
            .open(path)?;

        let mut bytes = Vec::new();
        log.read_to_end(&mut bytes)?;
        let contents = complete_lines(&bytes)?;
        let table = replay(contents)?;

        if contents.len() < bytes.len() {
            warn!(
                path = %path.display(),
                dropped = bytes.len() - contents.len(),
                "dropping torn metadata log tail"
            );
            log.set_len(contents.len() as u64)?;
        }
        debug!(path = %path.display(), entities = table.entities().len(), "metadata log opened");

        Ok(Self {
            path: path.to_path_buf(),
            log: Mutex::new(log),
            table: RwLock::new(table),
            _lock_file: lock_file,
        })
    }

    /// Returns the path to the log file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Rewrites the log so it holds one `set` line per live key.
    ///
    /// The new log is written to a temporary file and renamed over the old
    /// one.
    ///
    /// # Errors
    ///
    /// Returns an error if the rewrite fails; the old log is left in place.
    pub fn compact(&self) -> MetaResult<()> {
        let mut log = self.log.lock();
        let table = self.table.read();

        let tmp_path = self.path.with_extension("jsonl.tmp");
        {
            let mut tmp = File::create(&tmp_path)?;
            for entity in table.entities() {
                for key in table.keys(entity) {
                    let value = table.get(entity, &key).unwrap_or_default();
                    let line = encode(&Record::Set { entity, key, value })?;
                    tmp.write_all(line.as_bytes())?;
                }
            }
            tmp.sync_all()?;
        }
        fs::rename(&tmp_path, &self.path)?;

        *log = OpenOptions::new().read(true).append(true).open(&self.path)?;
        debug!(path = %self.path.display(), "metadata log compacted");
        Ok(())
    }

    fn append(&self, record: Record) -> MetaResult<()> {
        let line = encode(&record)?;
        let mut log = self.log.lock();
        append_line(&mut *log, line.as_bytes())?;
        record.apply(&mut self.table.write());
        Ok(())
    }
}

/// The append end of a log.
trait LogWriter: Write {
    fn log_len(&self) -> io::Result<u64>;
    fn truncate(&mut self, len: u64) -> io::Result<()>;
}

impl LogWriter for File {
    fn log_len(&self) -> io::Result<u64> {
        Ok(self.metadata()?.len())
    }

    fn truncate(&mut self, len: u64) -> io::Result<()> {
        self.set_len(len)
    }
}

/// Appends one line. A failed write is cut back off the log so the next
/// append starts on a fresh line.
fn append_line<W: LogWriter>(log: &mut W, line: &[u8]) -> MetaResult<()> {
    let len = log.log_len()?;
    if let Err(e) = log.write_all(line) {
        if let Err(undo) = log.truncate(len) {
            warn!(error = %undo, "failed to roll back partial metadata append");
        }
        return Err(e.into());
    }
    Ok(())
}

fn lock_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".lock");
    PathBuf::from(name)
}

fn encode(record: &Record) -> MetaResult<String> {
    let mut line = serde_json::to_string(record)?;
    line.push('\n');
    Ok(line)
}

/// Returns the newline-terminated prefix of the log as text. The torn tail
/// after the last newline is not decoded.
fn complete_lines(bytes: &[u8]) -> MetaResult<&str> {
    let end = bytes.iter().rposition(|b| *b == b'\n').map_or(0, |pos| pos + 1);
    let complete = &bytes[..end];
    std::str::from_utf8(complete).map_err(|e| MetaError::Corrupted {
        line: complete[..e.valid_up_to()].iter().filter(|b| **b == b'\n').count() + 1,
        message: e.to_string(),
    })
}

/// Replays complete log lines into a table.
fn replay(contents: &str) -> MetaResult<Table> {
    let mut table = Table::default();

    for (index, line) in contents.lines().enumerate() {
        let trimmed = line.trim_end_matches(['\n', '\r']);
        if trimmed.is_empty() {
            continue;
        }
        let record: Record = serde_json::from_str(trimmed).map_err(|e| MetaError::Corrupted {
            line: index + 1,
            message: e.to_string(),
        })?;
        record.apply(&mut table);
    }

    Ok(table)
}

impl MetaStore for FileMetaStore {
    fn get(&self, entity: EntityId, key: &str) -> MetaResult<Option<String>> {
        Ok(self.table.read().get(entity, key))
    }

    fn set(&self, entity: EntityId, key: &str, value: &str) -> MetaResult<()> {
        check_key(key)?;
        self.append(Record::Set {
            entity,
            key: key.to_string(),
            value: value.to_string(),
        })
    }

    fn delete(&self, entity: EntityId, key: &str) -> MetaResult<bool> {
        if self.table.read().get(entity, key).is_none() {
            return Ok(false);
        }
        self.append(Record::Delete {
            entity,
            key: key.to_string(),
        })?;
        Ok(true)
    }

    fn keys(&self, entity: EntityId) -> MetaResult<Vec<String>> {
        Ok(self.table.read().keys(entity))
    }

    fn entities(&self) -> MetaResult<Vec<EntityId>> {
        Ok(self.table.read().entities())
    }

    fn purge(&self, entity: EntityId) -> MetaResult<usize> {
        let count = self.table.read().keys(entity).len();
        if count == 0 {
            return Ok(0);
        }
        self.append(Record::Purge { entity })?;
        Ok(count)
    }

    fn flush(&self) -> MetaResult<()> {
        let mut log = self.log.lock();
        log.flush()?;
        log.sync_data()?;
        Ok(())
    }
}
