//! Operation-counting bank wrapper.

use flashtx_bank::{BankResult, FlashBank, Position};
use std::sync::atomic::{AtomicUsize, Ordering};

/// A bank wrapper that counts erase, read, and program calls.
///
/// Wrap the banks handed to an engine, then assert on the counters through
/// the engine's bank accessors. Counts let tests verify *how* the engine
/// reached a state: that a boot over a clean log erased nothing, or that a
/// migration erased exactly one bank.
///
/// # Example
///
/// ```rust
/// use flashtx_bank::{FlashBank, MemoryBank};
/// use flashtx_testkit::SpyBank;
///
/// let mut bank = SpyBank::new(MemoryBank::<0xFF>::new(16));
/// bank.erase().unwrap();
/// bank.write_chunk(0, &[1]).unwrap();
/// assert_eq!(bank.erase_count(), 1);
/// assert_eq!(bank.write_count(), 1);
/// ```
#[derive(Debug)]
pub struct SpyBank<B> {
    inner: B,
    erases: AtomicUsize,
    reads: AtomicUsize,
    writes: AtomicUsize,
}

impl<B> SpyBank<B> {
    /// Wraps a bank with fresh counters.
    pub fn new(inner: B) -> Self {
        Self {
            inner,
            erases: AtomicUsize::new(0),
            reads: AtomicUsize::new(0),
            writes: AtomicUsize::new(0),
        }
    }

    /// Returns the wrapped bank.
    pub fn inner(&self) -> &B {
        &self.inner
    }

    /// Number of `erase` calls observed.
    pub fn erase_count(&self) -> usize {
        self.erases.load(Ordering::SeqCst)
    }

    /// Number of `read_chunk` calls observed.
    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    /// Number of `write_chunk` calls observed.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

impl<B: FlashBank> FlashBank for SpyBank<B> {
    const EMPTY_VALUE: u8 = B::EMPTY_VALUE;

    fn capacity(&self) -> Position {
        self.inner.capacity()
    }

    fn erase(&mut self) -> BankResult<()> {
        self.erases.fetch_add(1, Ordering::SeqCst);
        self.inner.erase()
    }

    fn read_chunk(&self, position: Position, dst: &mut [u8]) -> BankResult<()> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.inner.read_chunk(position, dst)
    }

    fn write_chunk(&mut self, position: Position, src: &[u8]) -> BankResult<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.write_chunk(position, src)
    }
}
