//! The two-bank transactional commit engine.

use crate::error::{EngineError, EngineResult};
use crate::record::{self, Header};
use crate::types::{BankId, ScanOutcome};
use flashtx_bank::{BankResult, FlashBank, Position};
use std::fmt;
use tracing::{debug, warn};

/// Transactional storage of one configuration blob over two flash banks.
///
/// New configurations are appended to a log in the active bank; when the
/// bank runs out of room the log migrates to the other bank, and only after
/// the new record is durable is a stale bank erased. The record header byte
/// is programmed last, making the single-byte program the commit point: a
/// power cut at any moment leaves either the previous configuration or the
/// new one readable on the next boot.
///
/// Construction scans the existing log and relocates the cursors. An empty
/// log is seeded with the default payload; an unreadable log is silently
/// [`reset`](Self::reset), so a constructed engine is always consistent.
///
/// The default payload is borrowed for the engine's lifetime and re-read on
/// every reset. An empty default is allowed: construction over empty flash
/// then commits an empty record and [`length`](Self::length) reads zero. A
/// default too large for the banks leaves the log empty; callers in that
/// situation must [`write`](Self::write) before [`read`](Self::read).
///
/// The engine is single-threaded and synchronous; callers that share it
/// must serialize access externally.
pub struct TxFlash<'a, B0: FlashBank, B1: FlashBank> {
    bank0: B0,
    bank1: B1,
    default_payload: &'a [u8],
    read_bank: BankId,
    write_bank: BankId,
    read_position: Position,
    write_position: Position,
}

impl<'a, B0: FlashBank, B1: FlashBank> TxFlash<'a, B0, B1> {
    /// The erased byte value shared by both banks.
    ///
    /// Evaluating this constant rejects, at compile time, bank pairs whose
    /// erased values differ.
    const EMPTY_VALUE: u8 = {
        assert!(
            B0::EMPTY_VALUE == B1::EMPTY_VALUE,
            "flash banks with different empty values"
        );
        B0::EMPTY_VALUE
    };

    /// Creates an engine over the given banks, taking ownership of both.
    ///
    /// Runs the recovery scan. A fully erased log is seeded with
    /// `default_payload`; an invalid log is erased and re-seeded. A log
    /// holding committed records is left untouched.
    ///
    /// # Errors
    ///
    /// Returns an error only when a bank operation fails; log corruption is
    /// recovered silently.
    pub fn new(bank0: B0, bank1: B1, default_payload: &'a [u8]) -> EngineResult<Self> {
        let mut engine = Self {
            bank0,
            bank1,
            default_payload,
            read_bank: BankId::Bank0,
            write_bank: BankId::Bank0,
            read_position: 0,
            write_position: 0,
        };
        engine.initialize()?;
        Ok(engine)
    }

    /// Returns the length of the currently stored payload.
    ///
    /// Re-reads the on-flash length field on every call.
    ///
    /// # Errors
    ///
    /// Returns an error if the bank read fails.
    pub fn length(&self) -> EngineResult<Position> {
        let length = match self.read_bank {
            BankId::Bank0 => record::read_length(&self.bank0, self.read_position)?,
            BankId::Bank1 => record::read_length(&self.bank1, self.read_position)?,
        };
        Ok(length)
    }

    /// Copies the currently stored payload into `dst`.
    ///
    /// `dst` must hold at least [`length`](Self::length) bytes; extra bytes
    /// are left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::BufferTooSmall`] if `dst` cannot hold the
    /// payload, or a bank error if the read fails.
    pub fn read(&self, dst: &mut [u8]) -> EngineResult<()> {
        let length = self.length()? as usize;
        if dst.len() < length {
            return Err(EngineError::BufferTooSmall {
                needed: length,
                provided: dst.len(),
            });
        }

        let at = record::payload_offset(self.read_position);
        match self.read_bank {
            BankId::Bank0 => self.bank0.read_chunk(at, &mut dst[..length])?,
            BankId::Bank1 => self.bank1.read_chunk(at, &mut dst[..length])?,
        }
        Ok(())
    }

    /// Commits a new configuration.
    ///
    /// Appends a record after the current one when the active bank has
    /// room; otherwise erases the inactive bank and restarts the log there.
    /// Once `write` returns `Ok(true)` the payload is durable: a
    /// reconstruction over the same banks reads it back.
    ///
    /// Returns `Ok(false)` without touching flash when the framed payload
    /// cannot fit either bank.
    ///
    /// # Errors
    ///
    /// Returns an error if a bank erase or program fails.
    pub fn write(&mut self, payload: &[u8]) -> EngineResult<bool> {
        let needed = record::frame_len_for(payload) + 1;
        let smallest = self.bank0.capacity().min(self.bank1.capacity()) as usize;
        if needed > smallest {
            debug!("payload of {} bytes exceeds bank capacity", payload.len());
            return Ok(false);
        }

        if needed <= self.remaining(self.write_bank, self.write_position) as usize {
            let at = self.write_position;
            let next = match self.write_bank {
                BankId::Bank0 => record::emit(&mut self.bank0, at, payload)?,
                BankId::Bank1 => record::emit(&mut self.bank1, at, payload)?,
            };

            self.read_bank = self.write_bank;
            self.read_position = at;
            self.write_position = next;

            debug!(
                "committed {} bytes at {} in {}",
                payload.len(),
                at,
                self.read_bank
            );
            return Ok(true);
        }

        let target = self.write_bank.other();
        debug!("{} is full, migrating log to {}", self.write_bank, target);
        self.write_position = 0;

        match target {
            BankId::Bank1 => {
                self.bank1.erase()?;
                self.write_bank = BankId::Bank1;
                // Bank0 keeps its last record: recovery prefers bank1
                // whenever both banks open with a record header.
                self.write(payload)
            }
            BankId::Bank0 => {
                self.bank0.erase()?;
                self.write_bank = BankId::Bank0;
                let committed = self.write(payload)?;
                // Bank1 must stay intact until the record is durable in
                // bank0; at no moment are both banks erased.
                if committed {
                    self.bank1.erase()?;
                }
                Ok(committed)
            }
        }
    }

    /// Erases both banks and stores the default payload in bank 0.
    ///
    /// # Errors
    ///
    /// Returns an error if a bank erase or program fails.
    pub fn reset(&mut self) -> EngineResult<()> {
        debug!("resetting log to the default payload");

        self.bank0.erase()?;
        self.bank1.erase()?;

        self.read_bank = BankId::Bank0;
        self.write_bank = BankId::Bank0;
        self.read_position = 0;
        self.write_position = 0;

        self.write(self.default_payload)?;
        Ok(())
    }

    /// Returns the bank holding the current configuration.
    #[must_use]
    pub fn active_bank(&self) -> BankId {
        self.read_bank
    }

    /// Returns shared references to both banks.
    ///
    /// Intended for diagnostics and tests that assert on raw bank
    /// contents.
    #[must_use]
    pub fn banks(&self) -> (&B0, &B1) {
        (&self.bank0, &self.bank1)
    }

    fn initialize(&mut self) -> EngineResult<()> {
        let outcome = self.scan()?;
        debug!(
            "scanned log: {:?}, read cursor {}@{}, write cursor {}@{}",
            outcome, self.read_position, self.read_bank, self.write_position, self.write_bank
        );

        match outcome {
            ScanOutcome::Invalid => {
                warn!("log content is invalid, restoring the default payload");
                self.reset()?;
            }
            ScanOutcome::Empty => {
                debug!("empty log, storing the default payload");
                self.write(self.default_payload)?;
            }
            ScanOutcome::Valid => {}
        }
        Ok(())
    }

    /// Selects the starting bank from the two byte-0 headers, then
    /// fast-forwards to the last committed record.
    fn scan(&mut self) -> EngineResult<ScanOutcome> {
        self.read_bank = BankId::Bank0;
        self.write_bank = BankId::Bank0;
        self.read_position = 0;
        self.write_position = 0;

        let header0 = Header::classify(self.read_byte(BankId::Bank0, 0)?, Self::EMPTY_VALUE);
        let header1 = Header::classify(self.read_byte(BankId::Bank1, 0)?, Self::EMPTY_VALUE);

        match (header0, header1) {
            (Header::Empty, Header::Empty) => Ok(ScanOutcome::Empty),
            (Header::Record, Header::Empty) => self.fast_forward(),
            (Header::Empty, Header::Record) => {
                self.select(BankId::Bank1);
                self.fast_forward()
            }
            // Both banks open with a record whenever the log last migrated
            // into bank1, or power was lost before a migration back into
            // bank0 scrubbed it. Either way bank1 holds the newer
            // generation.
            (Header::Record, Header::Record) => {
                self.select(BankId::Bank1);
                self.fast_forward()
            }
            _ => Ok(ScanOutcome::Invalid),
        }
    }

    /// Walks the record chain in the selected bank until the erased
    /// terminator, leaving the read cursor on the last committed record
    /// and the write cursor on the terminator.
    fn fast_forward(&mut self) -> EngineResult<ScanOutcome> {
        loop {
            let Some(frame) = self.parse_at(self.read_bank, self.read_position)? else {
                debug!(
                    "open record at {}@{}",
                    self.read_position, self.read_bank
                );
                return Ok(ScanOutcome::Invalid);
            };

            self.write_position = frame.next;
            let next_header =
                Header::classify(self.read_byte(self.read_bank, frame.next)?, Self::EMPTY_VALUE);

            match next_header {
                Header::Empty => return Ok(ScanOutcome::Valid),
                Header::Record => self.read_position = frame.next,
                Header::Unrecognized => {
                    debug!("unexpected header at {}@{}", frame.next, self.read_bank);
                    return Ok(ScanOutcome::Invalid);
                }
            }
        }
    }

    fn select(&mut self, bank: BankId) {
        self.read_bank = bank;
        self.write_bank = bank;
    }

    fn parse_at(&self, bank: BankId, at: Position) -> BankResult<Option<record::Frame>> {
        match bank {
            BankId::Bank0 => record::parse(&self.bank0, at),
            BankId::Bank1 => record::parse(&self.bank1, at),
        }
    }

    fn read_byte(&self, bank: BankId, at: Position) -> BankResult<u8> {
        let mut byte = [0u8; 1];
        match bank {
            BankId::Bank0 => self.bank0.read_chunk(at, &mut byte)?,
            BankId::Bank1 => self.bank1.read_chunk(at, &mut byte)?,
        }
        Ok(byte[0])
    }

    fn remaining(&self, bank: BankId, position: Position) -> Position {
        match bank {
            BankId::Bank0 => self.bank0.capacity() - position,
            BankId::Bank1 => self.bank1.capacity() - position,
        }
    }
}

impl<B0: FlashBank, B1: FlashBank> fmt::Debug for TxFlash<'_, B0, B1> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TxFlash")
            .field("read_bank", &self.read_bank)
            .field("read_position", &self.read_position)
            .field("write_bank", &self.write_bank)
            .field("write_position", &self.write_position)
            .finish_non_exhaustive()
    }
}
