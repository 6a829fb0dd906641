//! Slot codec: one (key, value) pair packed into a single 64-bit word.
//!
//! The key lives in the high half and the value in the low half, so a slot is
//! read and written with one atomic access and can never be observed torn.
//! The all-zero word marks an empty slot.

/// Word stored in a slot that holds no entry.
pub const EMPTY: u64 = 0;

/// Pack a key/value pair into a slot word.
#[inline]
pub const fn pack(key: u32, value: u32) -> u64 {
    (key as u64) << 32 | value as u64
}

/// Key half of a slot word.
#[inline]
pub const fn key(word: u64) -> u32 {
    (word >> 32) as u32
}

/// Value half of a slot word.
#[inline]
pub const fn value(word: u64) -> u32 {
    word as u32
}

/// Split a slot word back into `(key, value)`.
#[inline]
pub const fn unpack(word: u64) -> (u32, u32) {
    (key(word), value(word))
}

/// Whether the word is the empty sentinel.
#[inline]
pub const fn is_empty(word: u64) -> bool {
    word == EMPTY
}
