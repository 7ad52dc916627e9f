//! Block driver
//!
//! Walks the input in 16-byte blocks aligned to 16-byte addresses. The
//! partial blocks at either end are copied into a zeroed block at the same
//! lane offsets they occupy in memory, so no load ever touches bytes outside
//! the slice. Zero padding classifies as ASCII: it is neutral before the
//! first byte and fails any continuation still owed after the last one.

use super::classify::LaneTables;
use super::lanes::{ByteLanes, LANES};
use super::propagate::{Propagation, propagate};
use crate::core::category::Category;

/// Validate `data` with lane type `V`.
///
/// # Safety
///
/// The CPU must support the instructions `V` is implemented with.
#[inline(always)]
pub(crate) unsafe fn validate_lanes<V: ByteLanes>(data: &[u8]) -> bool {
    if data.is_empty() {
        return true;
    }
    unsafe { walk::<V>(data).is_some() }
}

struct BlockState<V> {
    tables: LaneTables<V>,
    carry: V,
}

impl<V: ByteLanes> BlockState<V> {
    /// Check one block; `None` as soon as a lane misses its requirement.
    #[inline(always)]
    unsafe fn feed(&mut self, block: V) -> Option<()> {
        unsafe {
            let categories = self.tables.categories(block);
            let states = self.tables.states(block, categories);
            let Propagation { required, carry } = propagate(&self.tables, states, self.carry);
            if !required.and(categories).all_eq(required) {
                return None;
            }
            self.carry = carry;
            Some(())
        }
    }
}

#[inline(always)]
unsafe fn walk<V: ByteLanes>(data: &[u8]) -> Option<()> {
    unsafe {
        let skew = data.as_ptr().addr() % LANES;
        let tables = LaneTables::<V>::new();

        // The first real byte must start a sequence.
        let mut seed = [0u8; LANES];
        seed[skew] = Category::START.bits();
        let mut state = BlockState { tables, carry: V::from_array(&seed) };

        let head_len = (LANES - skew).min(data.len());
        let (head, rest) = data.split_at(head_len);
        let mut block = [0u8; LANES];
        block[skew..skew + head_len].copy_from_slice(head);
        state.feed(V::from_array(&block))?;

        let mut chunks = rest.chunks_exact(LANES);
        for chunk in &mut chunks {
            state.feed(V::load_aligned(chunk.as_ptr()))?;
        }

        let tail = chunks.remainder();
        if !tail.is_empty() {
            let mut block = [0u8; LANES];
            block[..tail.len()].copy_from_slice(tail);
            state.feed(V::from_array(&block))?;
        }

        // Input ended on a block boundary with a sequence still open.
        let zero = state.tables.zero;
        if !state.carry.all_eq(zero) {
            state.feed(zero)?;
        }

        Some(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simd::lanes::Portable;

    fn portable(data: &[u8]) -> bool {
        unsafe { validate_lanes::<Portable>(data) }
    }

    /// Copy `data` to `offset` bytes past a 64-byte aligned address.
    fn at_offset(data: &[u8], offset: usize, check: impl Fn(&[u8]) -> bool) -> bool {
        let mut buffer = vec![0u8; data.len() + offset + 64];
        let base = buffer.as_ptr().align_offset(64);
        let start = base + offset;
        buffer[start..start + data.len()].copy_from_slice(data);
        check(&buffer[start..start + data.len()])
    }

    #[test]
    fn test_sequence_straddling_every_block_boundary() {
        let text = "aaaaaaaaaaaaaa\u{1F600}bbbbbbbbbbbbbb\u{20AC}\u{E9}".as_bytes();
        for offset in 0..LANES {
            assert!(at_offset(text, offset, portable), "offset {}", offset);
        }
    }

    #[test]
    fn test_truncation_at_block_end_is_caught_by_drain() {
        let mut data = vec![b'a'; 15];
        data.push(0xC3);
        for offset in 0..LANES {
            assert!(!at_offset(&data, offset, portable), "offset {}", offset);
        }
    }

    #[test]
    fn test_leading_continuation_rejected_at_any_skew() {
        for offset in 0..LANES {
            assert!(!at_offset(&[0x80, b'a'], offset, portable), "offset {}", offset);
            assert!(!at_offset(&[0xA9], offset, portable), "offset {}", offset);
        }
    }

    #[test]
    fn test_matches_std_on_short_inputs_at_all_skews() {
        let samples: [&[u8]; 8] = [
            b"",
            b"a",
            "\u{E9}".as_bytes(),
            "\u{10FFFF}".as_bytes(),
            &[0xF4, 0x90, 0x80, 0x80],
            &[0xED, 0xBF, 0xBF],
            &[0xE0, 0x9F, 0xBF],
            &[0xEF, 0xBF],
        ];
        for sample in samples {
            let expected = std::str::from_utf8(sample).is_ok();
            for offset in 0..LANES {
                assert_eq!(at_offset(sample, offset, portable), expected, "{:02x?} at {}", sample, offset);
            }
        }
    }
}
