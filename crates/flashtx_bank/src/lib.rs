//! # FlashTx Bank
//!
//! Flash bank trait and implementations for FlashTx.
//!
//! This crate provides the lowest-level storage abstraction for FlashTx.
//! A bank is one independently erasable flash region exposed as an **opaque
//! byte store** - banks do not interpret the data they hold.
//!
//! ## Design Principles
//!
//! - Banks are simple byte stores (erase, read, program)
//! - No knowledge of the FlashTx record format or commit protocol
//! - The erased byte value is a compile-time property of the bank type
//! - FlashTx owns all format interpretation
//!
//! ## Available Banks
//!
//! - [`MemoryBank`] - For testing and flash emulation
//! - [`FileBank`] - For host-side persistence using OS file APIs
//!
//! Real MCU flash drivers implement [`FlashBank`] directly over their HAL.
//!
//! ## Example
//!
//! ```rust
//! use flashtx_bank::{FlashBank, MemoryBank};
//!
//! let mut bank: MemoryBank = MemoryBank::new(64);
//! bank.write_chunk(0, b"hello").unwrap();
//! let mut buf = [0u8; 5];
//! bank.read_chunk(0, &mut buf).unwrap();
//! assert_eq!(&buf, b"hello");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod bank;
mod error;
mod file;
mod memory;

pub use bank::{FlashBank, Position};
pub use error::{BankError, BankResult};
pub use file::FileBank;
pub use memory::MemoryBank;
