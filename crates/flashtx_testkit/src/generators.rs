//! Property-based test generators using proptest.

use proptest::prelude::*;

/// Strategy for a payload of up to `max_len` arbitrary bytes.
///
/// Size the bound so the framed payload (header + length field + payload +
/// terminator) fits the banks under test.
pub fn payload_strategy(max_len: usize) -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..=max_len)
}

/// Strategy for a sequence of payloads, for last-writer-wins properties.
pub fn payload_sequence_strategy(
    max_len: usize,
    max_writes: usize,
) -> impl Strategy<Value = Vec<Vec<u8>>> {
    prop::collection::vec(payload_strategy(max_len), 1..=max_writes)
}
