// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Write-ahead log for durable storage
//!
//! Each line of the log is one transaction: a checksummed batch of
//! operations. Replay applies a whole line or nothing, and stops at the
//! first line that is truncated or fails its checksum.

use crate::operation::Operation;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

/// Errors that can occur in WAL operations
#[derive(Debug, Error)]
pub enum WalError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to lock store: {0}")]
    Lock(#[source] io::Error),
    #[error("journal rejected the write: {0}")]
    Rejected(String),
}

/// One committed transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalEntry {
    /// Monotonically increasing sequence number, starting at 1
    pub seq: u64,
    /// Microseconds since Unix epoch
    pub timestamp_micros: u64,
    pub ops: Vec<Operation>,
    /// CRC32 of the serialized operations
    pub checksum: u32,
}

impl WalEntry {
    pub fn new(seq: u64, ops: Vec<Operation>) -> Result<Self, WalError> {
        let checksum = Self::calculate_checksum(&ops)?;
        let timestamp_micros = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_micros() as u64)
            .unwrap_or(0);
        Ok(Self {
            seq,
            timestamp_micros,
            ops,
            checksum,
        })
    }

    fn calculate_checksum(ops: &[Operation]) -> Result<u32, WalError> {
        let json = serde_json::to_string(ops)?;
        Ok(crc32fast::hash(json.as_bytes()))
    }

    /// Verify the checksum matches the operations
    pub fn verify(&self) -> bool {
        Self::calculate_checksum(&self.ops).is_ok_and(|c| c == self.checksum)
    }
}

/// Result of scanning a log file
#[derive(Debug, Default)]
pub struct WalScan {
    pub entries: Vec<WalEntry>,
    /// Byte offset just past the last valid line
    pub valid_len: u64,
    /// True when bytes after `valid_len` could not be read back
    pub corrupted: bool,
}

/// Append-only store of transactions
pub trait Journal: Send {
    /// Durably append one transaction, returning its sequence number
    fn append(&mut self, ops: &[Operation]) -> Result<u64, WalError>;

    /// Read transactions with a sequence number greater than `after`
    fn read_after(&mut self, after: u64) -> Result<Vec<WalEntry>, WalError>;

    /// Cut off a partial transaction left behind by a crashed writer.
    ///
    /// Called under the store's exclusive lock before every append, so a
    /// new transaction never lands after damaged bytes. Returns the number
    /// of bytes removed.
    fn repair_tail(&mut self) -> Result<u64, WalError>;

    /// Sequence number of the last transaction seen by this journal
    fn sequence(&self) -> u64;
}

/// Write-ahead log backed by a JSON-lines file
pub struct Wal {
    path: PathBuf,
    file: File,
    sequence: u64,
    /// Last scan found bytes past the final valid line
    damaged: bool,
}

impl Wal {
    /// Open or create a WAL at the given path
    pub fn open(path: &Path) -> Result<Self, WalError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;

        let scan = Self::scan(path)?;
        let sequence = scan.entries.last().map(|e| e.seq).unwrap_or(0);

        Ok(Self {
            path: path.to_path_buf(),
            file,
            sequence,
            damaged: scan.corrupted,
        })
    }

    /// Read every valid entry, stopping at the first damaged line
    pub fn scan(path: &Path) -> Result<WalScan, WalError> {
        let file = match File::open(path) {
            Ok(f) => f,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(WalScan::default()),
            Err(e) => return Err(e.into()),
        };

        let mut reader = BufReader::new(file);
        let mut scan = WalScan::default();
        let mut line = String::new();
        let mut offset: u64 = 0;

        loop {
            line.clear();
            let read = match reader.read_line(&mut line) {
                Ok(0) => break,
                Ok(n) => n as u64,
                Err(e) => {
                    tracing::warn!(offset, error = %e, "stopping WAL scan due to read error");
                    scan.corrupted = true;
                    break;
                }
            };

            // A line without its newline is a write that never finished
            if !line.ends_with('\n') {
                tracing::warn!(offset, "truncated WAL entry");
                scan.corrupted = true;
                break;
            }

            let trimmed = line.trim();
            if trimmed.is_empty() {
                offset += read;
                scan.valid_len = offset;
                continue;
            }

            match serde_json::from_str::<WalEntry>(trimmed) {
                Ok(entry) if entry.verify() => {
                    offset += read;
                    scan.valid_len = offset;
                    scan.entries.push(entry);
                }
                Ok(entry) => {
                    tracing::warn!(offset, seq = entry.seq, "WAL checksum mismatch");
                    scan.corrupted = true;
                    break;
                }
                Err(e) => {
                    tracing::warn!(offset, error = %e, "unparseable WAL entry");
                    scan.corrupted = true;
                    break;
                }
            }
        }

        Ok(scan)
    }

    /// Replay all committed operations from the log
    pub fn replay(path: &Path) -> Result<Vec<Operation>, WalError> {
        Ok(Self::scan(path)?
            .entries
            .into_iter()
            .flat_map(|e| e.ops)
            .collect())
    }

    /// Cut off damaged bytes after the last valid entry.
    ///
    /// Only safe while holding the store's exclusive lock. Returns the
    /// number of bytes removed.
    pub fn repair(path: &Path) -> Result<u64, WalError> {
        let scan = Self::scan(path)?;
        if !scan.corrupted {
            return Ok(0);
        }
        let file = OpenOptions::new().write(true).open(path)?;
        let len = file.metadata()?.len();
        file.set_len(scan.valid_len)?;
        file.sync_all()?;
        let removed = len.saturating_sub(scan.valid_len);
        tracing::warn!(
            path = %path.display(),
            valid_len = scan.valid_len,
            removed,
            "WAL truncated at corruption point"
        );
        Ok(removed)
    }
}

impl Journal for Wal {
    fn append(&mut self, ops: &[Operation]) -> Result<u64, WalError> {
        let seq = self.sequence + 1;
        let entry = WalEntry::new(seq, ops.to_vec())?;
        let mut line = serde_json::to_string(&entry)?;
        line.push('\n');

        // One write per transaction so a crash leaves at most one partial line
        let start = self.file.metadata()?.len();
        if let Err(e) = self
            .file
            .write_all(line.as_bytes())
            .and_then(|()| self.file.sync_all())
        {
            if let Err(trunc) = self.file.set_len(start) {
                tracing::error!(error = %trunc, "failed to roll back partial WAL write");
            }
            return Err(e.into());
        }

        self.sequence = seq;
        Ok(seq)
    }

    fn read_after(&mut self, after: u64) -> Result<Vec<WalEntry>, WalError> {
        let scan = Self::scan(&self.path)?;
        self.damaged = scan.corrupted;
        let entries: Vec<WalEntry> = scan
            .entries
            .into_iter()
            .filter(|e| e.seq > after)
            .collect();
        if let Some(last) = entries.last() {
            self.sequence = self.sequence.max(last.seq);
        }
        Ok(entries)
    }

    fn repair_tail(&mut self) -> Result<u64, WalError> {
        if !self.damaged {
            return Ok(0);
        }
        let removed = Self::repair(&self.path)?;
        self.damaged = false;
        Ok(removed)
    }

    fn sequence(&self) -> u64 {
        self.sequence
    }
}

#[cfg(test)]
#[path = "wal_tests.rs"]
mod tests;
