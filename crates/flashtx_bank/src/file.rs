//! File-backed flash bank for host-side persistence.

use crate::bank::{FlashBank, Position};
use crate::error::{BankError, BankResult};
use parking_lot::Mutex;
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// A file-backed flash bank.
///
/// This bank maps one fixed-capacity file to one flash sector, for daemons
/// and simulators that want the same storage format on a host filesystem.
/// Data survives process restarts.
///
/// # Durability
///
/// Real flash programs and erases are blocking and durable on return, so
/// `write_chunk` and `erase` call `File::sync_data()` before returning.
///
/// # Thread Safety
///
/// Positioned reads require seeking, so the file handle lives behind a
/// `Mutex`. The bank itself follows the engine's single-writer model.
///
/// # Example
///
/// ```no_run
/// use flashtx_bank::{FlashBank, FileBank};
/// use std::path::Path;
///
/// let mut bank: FileBank = FileBank::open(Path::new("bank0.bin"), 4096).unwrap();
/// bank.write_chunk(0, b"conf").unwrap();
/// ```
#[derive(Debug)]
pub struct FileBank<const EMPTY: u8 = 0xFF> {
    path: PathBuf,
    file: Mutex<File>,
    capacity: Position,
}

impl<const EMPTY: u8> FileBank<EMPTY> {
    /// Opens or creates a file bank of exactly `capacity` bytes.
    ///
    /// A new file is created erased (filled with the empty value). An
    /// existing file must already be exactly `capacity` bytes long; its
    /// contents are preserved so a previously written log survives reopen.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or created, or if an
    /// existing file's size differs from `capacity`.
    pub fn open(path: &Path, capacity: Position) -> BankResult<Self> {
        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;

        let len = file.metadata()?.len();
        if len == 0 {
            file.write_all(&vec![EMPTY; capacity as usize])?;
            file.sync_data()?;
        } else if len != u64::from(capacity) {
            return Err(BankError::CapacityMismatch {
                expected: capacity,
                actual: len,
            });
        }

        Ok(Self {
            path: path.to_path_buf(),
            file: Mutex::new(file),
            capacity,
        })
    }

    /// Returns the path to the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn check_range(&self, position: Position, len: usize) -> BankResult<()> {
        let end = (position as usize).saturating_add(len);
        if end > self.capacity as usize {
            return Err(BankError::OutOfBounds {
                position,
                len,
                capacity: self.capacity,
            });
        }
        Ok(())
    }
}

impl<const EMPTY: u8> FlashBank for FileBank<EMPTY> {
    const EMPTY_VALUE: u8 = EMPTY;

    fn capacity(&self) -> Position {
        self.capacity
    }

    fn erase(&mut self) -> BankResult<()> {
        let mut file = self.file.lock();
        file.seek(SeekFrom::Start(0))?;
        file.write_all(&vec![EMPTY; self.capacity as usize])?;
        file.sync_data()?;
        Ok(())
    }

    fn read_chunk(&self, position: Position, dst: &mut [u8]) -> BankResult<()> {
        self.check_range(position, dst.len())?;
        if dst.is_empty() {
            return Ok(());
        }

        let mut file = self.file.lock();
        file.seek(SeekFrom::Start(u64::from(position)))?;
        file.read_exact(dst)?;
        Ok(())
    }

    fn write_chunk(&mut self, position: Position, src: &[u8]) -> BankResult<()> {
        self.check_range(position, src.len())?;
        if src.is_empty() {
            return Ok(());
        }

        let mut file = self.file.lock();
        file.seek(SeekFrom::Start(u64::from(position)))?;
        file.write_all(src)?;
        file.sync_data()?;
        Ok(())
    }
}
