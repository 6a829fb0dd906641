//! Per-bucket recency register
//!
//! A bucket's recency state is one `u32` split into eight 4-bit nibbles, one
//! per slot index. Nibble `i` holds the rank of slot `i`: `7` is the most
//! recently touched slot and `0` the least recently touched one, which is the
//! eviction victim. Once every slot of a bucket has been touched at least
//! once the nibbles form a permutation of `0..8`.
//!
//! A freshly zeroed register ranks every slot `0`. Filling the bucket from
//! index 0 upward promotes each new slot to the top, so after the eighth
//! insert the ranks are exactly `0..8` with slot 0 as the victim.

use std::fmt;

/// Slots per bucket.
pub const WAYS: usize = 8;

/// Rank of the most recently touched slot.
pub const TOP: u32 = WAYS as u32 - 1;

const NIBBLE_BITS: usize = 4;
const NIBBLE_MASK: u32 = 0xF;

/// Packed LRU ranking of the slots in one bucket
#[derive(Clone, Copy, Default, PartialEq, Eq)]
pub struct Register(u32);

impl Register {
    /// Wrap a raw register word
    #[inline]
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    /// Raw register word
    #[inline]
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Rank of `slot`
    #[inline]
    pub const fn rank(self, slot: usize) -> u32 {
        (self.0 >> (slot * NIBBLE_BITS)) & NIBBLE_MASK
    }

    /// All eight ranks, indexed by slot
    pub fn ranks(self) -> [u32; WAYS] {
        let mut out = [0; WAYS];
        for (slot, rank) in out.iter_mut().enumerate() {
            *rank = self.rank(slot);
        }
        out
    }

    /// Move `slot` to the top of the ranking.
    ///
    /// Every other slot ranked above the touched slot's old rank moves down
    /// by one; slots at or below it keep their rank. The relative order of
    /// the untouched slots is preserved.
    #[must_use]
    pub fn touch(self, slot: usize) -> Self {
        debug_assert!(slot < WAYS, "slot index {} out of range", slot);

        let old_rank = self.rank(slot);
        let mut bits = self.0;
        for i in 0..WAYS {
            let shift = i * NIBBLE_BITS;
            let rank = if i == slot {
                TOP
            } else {
                let rank = (bits >> shift) & NIBBLE_MASK;
                if rank > old_rank {
                    rank - 1
                } else {
                    continue;
                }
            };
            bits = (bits & !(NIBBLE_MASK << shift)) | (rank << shift);
        }
        Self(bits)
    }

    /// Slot to evict: the one ranked `0`.
    ///
    /// A register damaged by a lost concurrent update may have no rank `0`
    /// or several; the lowest-indexed slot with the smallest rank is chosen.
    pub fn victim(self) -> usize {
        let mut victim = 0;
        let mut lowest = u32::MAX;
        for slot in 0..WAYS {
            let rank = self.rank(slot);
            if rank == 0 {
                return slot;
            }
            if rank < lowest {
                lowest = rank;
                victim = slot;
            }
        }
        victim
    }

    /// Slot holding the highest rank, the lowest index winning ties
    pub fn most_recent(self) -> usize {
        let mut best = 0;
        for slot in 1..WAYS {
            if self.rank(slot) > self.rank(best) {
                best = slot;
            }
        }
        best
    }

    /// Whether the ranks are exactly a permutation of `0..8`
    pub fn is_permutation(self) -> bool {
        let mut seen = 0u32;
        for rank in self.ranks() {
            if rank > TOP {
                return false;
            }
            seen |= 1 << rank;
        }
        seen == (1 << WAYS) - 1
    }
}

impl fmt::Debug for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Register({:#010x})", self.0)
    }
}
