//! # FlashTx Testkit
//!
//! Test instrumentation for FlashTx.
//!
//! This crate provides:
//! - [`SpyBank`] - a wrapper bank that counts erase/read/program calls
//! - [`JournalBank`] - a wrapper bank that records the byte-level
//!   operation stream, for power-loss replay
//! - [`replay`] - reconstruction of bank images from any crash cut of a
//!   recorded operation stream
//! - Property-based test generators using proptest
//!
//! ## Power-loss testing
//!
//! A commit is crash-safe when reconstructing an engine over *any*
//! interrupted prefix of its flash operations yields either the previous
//! payload or the new one. [`JournalBank`] records the operations a commit
//! issues; [`crash_cuts`] enumerates every interruption point, including
//! mid-program byte splits; [`replay`] builds the bank images a reboot
//! would find.
//!
//! ```rust
//! use flashtx_bank::MemoryBank;
//! use flashtx_core::{BankId, TxFlash};
//! use flashtx_testkit::{crash_cuts, replay, JournalBank, OpJournal};
//!
//! let journal = OpJournal::new();
//! let bank0 = JournalBank::new(MemoryBank::<0xFF>::new(32), BankId::Bank0, journal.clone());
//! let bank1 = JournalBank::new(MemoryBank::<0xFF>::new(32), BankId::Bank1, journal.clone());
//!
//! let mut flash = TxFlash::new(bank0, bank1, b"old\0").unwrap();
//! let pre0 = flash.banks().0.inner().contents().to_vec();
//! let pre1 = flash.banks().1.inner().contents().to_vec();
//! journal.clear();
//!
//! flash.write(b"new\0").unwrap();
//!
//! let ops = journal.ops();
//! for cut in crash_cuts(&ops) {
//!     let (bank0, bank1) = replay::<0xFF>(&pre0, &pre1, &ops, cut);
//!     let reborn = TxFlash::new(bank0, bank1, b"????\0").unwrap();
//!     let mut buf = vec![0u8; reborn.length().unwrap() as usize];
//!     reborn.read(&mut buf).unwrap();
//!     assert!(buf == b"old\0" || buf == b"new\0");
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod generators;
mod journal;
mod spy;

pub use generators::{payload_sequence_strategy, payload_strategy};
pub use journal::{crash_cuts, replay, CrashCut, FlashOp, JournalBank, OpJournal};
pub use spy::SpyBank;
