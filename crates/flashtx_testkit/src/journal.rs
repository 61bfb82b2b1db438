//! Operation journaling and power-loss replay.
//!
//! [`JournalBank`] records every mutating flash operation an engine
//! issues. [`crash_cuts`] enumerates all the points at which power could
//! be lost - between operations, and between the bytes of a multi-byte
//! program, since only the single-byte program is atomic. [`replay`]
//! rebuilds the bank images a reboot would find at any such cut.
//!
//! Erases carry no byte-level cuts: a sector erase either completes or
//! leaves the device faulted, so the model applies them atomically.

use flashtx_bank::{BankResult, FlashBank, MemoryBank, Position};
use flashtx_core::BankId;
use parking_lot::Mutex;
use std::sync::Arc;

/// One mutating flash operation, as issued by the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlashOp {
    /// A whole-bank erase.
    Erase {
        /// The bank that was erased.
        bank: BankId,
    },
    /// A ranged program.
    Program {
        /// The bank that was programmed.
        bank: BankId,
        /// Start position of the programmed range.
        position: Position,
        /// The programmed bytes.
        bytes: Vec<u8>,
    },
}

/// A shared, ordered journal of flash operations.
///
/// Clone one handle per bank wrapper and keep one in the test to inspect
/// and clear the stream between phases.
#[derive(Debug, Clone, Default)]
pub struct OpJournal {
    ops: Arc<Mutex<Vec<FlashOp>>>,
}

impl OpJournal {
    /// Creates an empty journal.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the recorded operations, in issue order.
    #[must_use]
    pub fn ops(&self) -> Vec<FlashOp> {
        self.ops.lock().clone()
    }

    /// Number of recorded operations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ops.lock().len()
    }

    /// Returns `true` when nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ops.lock().is_empty()
    }

    /// Discards all recorded operations.
    pub fn clear(&self) {
        self.ops.lock().clear();
    }

    fn record(&self, op: FlashOp) {
        self.ops.lock().push(op);
    }
}

/// A bank wrapper that journals every mutating operation.
///
/// Reads pass through unrecorded; they cannot affect what a reboot finds.
#[derive(Debug)]
pub struct JournalBank<B> {
    inner: B,
    id: BankId,
    journal: OpJournal,
}

impl<B> JournalBank<B> {
    /// Wraps a bank, tagging its operations with `id` in `journal`.
    pub fn new(inner: B, id: BankId, journal: OpJournal) -> Self {
        Self { inner, id, journal }
    }

    /// Returns the wrapped bank.
    pub fn inner(&self) -> &B {
        &self.inner
    }
}

impl<B: FlashBank> FlashBank for JournalBank<B> {
    const EMPTY_VALUE: u8 = B::EMPTY_VALUE;

    fn capacity(&self) -> Position {
        self.inner.capacity()
    }

    fn erase(&mut self) -> BankResult<()> {
        self.journal.record(FlashOp::Erase { bank: self.id });
        self.inner.erase()
    }

    fn read_chunk(&self, position: Position, dst: &mut [u8]) -> BankResult<()> {
        self.inner.read_chunk(position, dst)
    }

    fn write_chunk(&mut self, position: Position, src: &[u8]) -> BankResult<()> {
        self.journal.record(FlashOp::Program {
            bank: self.id,
            position,
            bytes: src.to_vec(),
        });
        self.inner.write_chunk(position, src)
    }
}

/// One point at which power can be lost during an operation stream.
///
/// The first `ops` operations are fully applied; `bytes` leading bytes of
/// the next operation (which must be a program) land as well.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrashCut {
    /// Number of fully applied operations.
    pub ops: usize,
    /// Bytes of the following program that still landed.
    pub bytes: usize,
}

/// Enumerates every crash cut of an operation stream.
///
/// Includes the empty cut (power lost before anything landed), a cut after
/// every operation, and every byte split inside each multi-byte program.
#[must_use]
pub fn crash_cuts(ops: &[FlashOp]) -> Vec<CrashCut> {
    let mut cuts = vec![CrashCut { ops: 0, bytes: 0 }];
    for (index, op) in ops.iter().enumerate() {
        if let FlashOp::Program { bytes, .. } = op {
            for split in 1..bytes.len() {
                cuts.push(CrashCut {
                    ops: index,
                    bytes: split,
                });
            }
        }
        cuts.push(CrashCut {
            ops: index + 1,
            bytes: 0,
        });
    }
    cuts
}

/// Rebuilds both bank images as a reboot would find them at `cut`.
///
/// `base0` and `base1` are the bank contents from before the operation
/// stream began.
///
/// # Panics
///
/// Panics if `cut` splits an erase, names an operation beyond the stream,
/// or an operation falls outside its base image - all of which indicate a
/// malformed test, not a crashed engine.
#[must_use]
pub fn replay<const EMPTY: u8>(
    base0: &[u8],
    base1: &[u8],
    ops: &[FlashOp],
    cut: CrashCut,
) -> (MemoryBank<EMPTY>, MemoryBank<EMPTY>) {
    let mut image0 = base0.to_vec();
    let mut image1 = base1.to_vec();

    for op in &ops[..cut.ops] {
        apply::<EMPTY>(&mut image0, &mut image1, op, usize::MAX);
    }
    if cut.bytes > 0 {
        let op = &ops[cut.ops];
        assert!(
            matches!(op, FlashOp::Program { .. }),
            "crash cut splits a non-program operation"
        );
        apply::<EMPTY>(&mut image0, &mut image1, op, cut.bytes);
    }

    (
        MemoryBank::with_contents(image0),
        MemoryBank::with_contents(image1),
    )
}

fn apply<const EMPTY: u8>(image0: &mut [u8], image1: &mut [u8], op: &FlashOp, limit: usize) {
    match op {
        FlashOp::Erase { bank } => {
            let image = match bank {
                BankId::Bank0 => image0,
                BankId::Bank1 => image1,
            };
            image.fill(EMPTY);
        }
        FlashOp::Program {
            bank,
            position,
            bytes,
        } => {
            let image = match bank {
                BankId::Bank0 => image0,
                BankId::Bank1 => image1,
            };
            let landed = bytes.len().min(limit);
            let start = *position as usize;
            image[start..start + landed].copy_from_slice(&bytes[..landed]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn journaled_pair(
        capacity: Position,
    ) -> (
        JournalBank<MemoryBank<0x00>>,
        JournalBank<MemoryBank<0x00>>,
        OpJournal,
    ) {
        let journal = OpJournal::new();
        let bank0 = JournalBank::new(MemoryBank::new(capacity), BankId::Bank0, journal.clone());
        let bank1 = JournalBank::new(MemoryBank::new(capacity), BankId::Bank1, journal.clone());
        (bank0, bank1, journal)
    }

    #[test]
    fn journal_records_in_issue_order() {
        let (mut bank0, mut bank1, journal) = journaled_pair(16);

        bank0.write_chunk(2, &[0xAA]).unwrap();
        bank1.erase().unwrap();
        bank0.write_chunk(5, &[0xBB, 0xCC]).unwrap();

        let ops = journal.ops();
        assert_eq!(ops.len(), 3);
        assert_eq!(
            ops[0],
            FlashOp::Program {
                bank: BankId::Bank0,
                position: 2,
                bytes: vec![0xAA],
            }
        );
        assert_eq!(ops[1], FlashOp::Erase { bank: BankId::Bank1 });
        assert_eq!(
            ops[2],
            FlashOp::Program {
                bank: BankId::Bank0,
                position: 5,
                bytes: vec![0xBB, 0xCC],
            }
        );
    }

    #[test]
    fn reads_are_not_recorded() {
        let (bank0, _bank1, journal) = journaled_pair(16);

        let mut buf = [0u8; 4];
        bank0.read_chunk(0, &mut buf).unwrap();
        assert!(journal.is_empty());
    }

    #[test]
    fn clear_discards_earlier_phases() {
        let (mut bank0, _bank1, journal) = journaled_pair(16);

        bank0.write_chunk(0, &[1]).unwrap();
        journal.clear();
        bank0.write_chunk(1, &[2]).unwrap();

        assert_eq!(journal.len(), 1);
    }

    #[test]
    fn crash_cuts_cover_byte_splits() {
        let ops = vec![
            FlashOp::Program {
                bank: BankId::Bank0,
                position: 0,
                bytes: vec![1, 2, 3],
            },
            FlashOp::Erase { bank: BankId::Bank1 },
        ];

        let cuts = crash_cuts(&ops);
        // Empty cut, two byte splits of the program, after-program,
        // after-erase.
        assert_eq!(cuts.len(), 5);
        assert!(cuts.contains(&CrashCut { ops: 0, bytes: 0 }));
        assert!(cuts.contains(&CrashCut { ops: 0, bytes: 1 }));
        assert!(cuts.contains(&CrashCut { ops: 0, bytes: 2 }));
        assert!(cuts.contains(&CrashCut { ops: 1, bytes: 0 }));
        assert!(cuts.contains(&CrashCut { ops: 2, bytes: 0 }));
    }

    #[test]
    fn replay_full_stream_matches_live_bank() {
        let (mut bank0, mut bank1, journal) = journaled_pair(16);
        let base0 = bank0.inner().contents().to_vec();
        let base1 = bank1.inner().contents().to_vec();

        bank0.write_chunk(1, &[9, 8, 7]).unwrap();
        bank1.write_chunk(0, &[5]).unwrap();
        bank1.erase().unwrap();
        bank0.write_chunk(10, &[4]).unwrap();

        let ops = journal.ops();
        let cut = CrashCut {
            ops: ops.len(),
            bytes: 0,
        };
        let (replayed0, replayed1) = replay::<0x00>(&base0, &base1, &ops, cut);

        assert_eq!(replayed0.contents(), bank0.inner().contents());
        assert_eq!(replayed1.contents(), bank1.inner().contents());
    }

    #[test]
    fn replay_partial_program_lands_prefix_only() {
        let base = vec![0x00u8; 8];
        let ops = vec![FlashOp::Program {
            bank: BankId::Bank0,
            position: 2,
            bytes: vec![0xAA, 0xBB, 0xCC],
        }];

        let (bank0, _bank1) = replay::<0x00>(&base, &base, &ops, CrashCut { ops: 0, bytes: 2 });
        assert_eq!(&bank0.contents()[2..5], &[0xAA, 0xBB, 0x00]);
    }
}
