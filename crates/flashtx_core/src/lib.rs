//! # FlashTx Core
//!
//! Transactional storage of a single configuration blob on two-bank flash.
//!
//! The engine layers a log-structured record format over two independently
//! erasable flash banks. A new configuration is appended after the current
//! one; when the active bank runs out of room the log migrates to the other
//! bank (ping-pong). The record header byte is programmed last, so a power
//! loss at any point leaves either the previous configuration or the new
//! one readable - never a partial blob.
//!
//! This crate provides:
//! - The on-flash record codec (header byte + little-endian length framing)
//! - The boot-time recovery scan that relocates the read/write cursors
//! - The commit engine with its two-bank migration protocol
//! - The [`TxFlash`] API: `length`, `read`, `write`, `reset`
//!
//! ## Example
//!
//! ```rust
//! use flashtx_bank::MemoryBank;
//! use flashtx_core::TxFlash;
//!
//! let bank0: MemoryBank = MemoryBank::new(50);
//! let bank1: MemoryBank = MemoryBank::new(50);
//!
//! let default_conf = b"default configuration\0";
//! let mut flash = TxFlash::new(bank0, bank1, default_conf).unwrap();
//!
//! // An empty log boots into the default configuration.
//! assert_eq!(flash.length().unwrap() as usize, default_conf.len());
//!
//! // Commit a replacement and read it back.
//! let new_conf = b"another configuration\0";
//! assert!(flash.write(new_conf).unwrap());
//!
//! let mut buf = vec![0u8; flash.length().unwrap() as usize];
//! flash.read(&mut buf).unwrap();
//! assert_eq!(&buf, new_conf);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod engine;
mod error;
mod record;
mod types;

pub use engine::TxFlash;
pub use error::{EngineError, EngineResult};
pub use flashtx_bank::Position;
pub use types::BankId;
