//! x86_64 lanes using SSSE3
//!
//! `pshufb` provides the 16-entry table lookups; everything else is SSE2.

use std::arch::x86_64::*;

use super::driver::validate_lanes;
use super::lanes::{ByteLanes, LANES};

impl ByteLanes for __m128i {
    #[inline(always)]
    unsafe fn splat(byte: u8) -> Self {
        unsafe { _mm_set1_epi8(byte as i8) }
    }

    #[inline(always)]
    unsafe fn load(ptr: *const u8) -> Self {
        unsafe { _mm_loadu_si128(ptr as *const __m128i) }
    }

    #[inline(always)]
    unsafe fn load_aligned(ptr: *const u8) -> Self {
        unsafe { _mm_load_si128(ptr as *const __m128i) }
    }

    #[inline(always)]
    unsafe fn store(self, out: &mut [u8; LANES]) {
        unsafe { _mm_storeu_si128(out.as_mut_ptr() as *mut __m128i, self) }
    }

    #[inline(always)]
    unsafe fn and(self, other: Self) -> Self {
        unsafe { _mm_and_si128(self, other) }
    }

    #[inline(always)]
    unsafe fn or(self, other: Self) -> Self {
        unsafe { _mm_or_si128(self, other) }
    }

    #[inline(always)]
    unsafe fn select(mask: Self, if_set: Self, otherwise: Self) -> Self {
        unsafe { _mm_or_si128(_mm_and_si128(mask, if_set), _mm_andnot_si128(mask, otherwise)) }
    }

    #[inline(always)]
    unsafe fn eq(self, other: Self) -> Self {
        unsafe { _mm_cmpeq_epi8(self, other) }
    }

    #[inline(always)]
    unsafe fn lt_signed(self, other: Self) -> Self {
        unsafe { _mm_cmplt_epi8(self, other) }
    }

    #[inline(always)]
    unsafe fn sub(self, other: Self) -> Self {
        unsafe { _mm_sub_epi8(self, other) }
    }

    #[inline(always)]
    unsafe fn high_nibbles(self) -> Self {
        // No 8-bit shift on SSE: shift 16-bit lanes and mask off the spill.
        unsafe { _mm_and_si128(_mm_srli_epi16::<4>(self), _mm_set1_epi8(0x0F)) }
    }

    #[inline(always)]
    unsafe fn lookup(table: Self, index: Self) -> Self {
        unsafe { _mm_shuffle_epi8(table, index) }
    }

    #[inline(always)]
    unsafe fn shift_up<const N: usize>(self) -> Self {
        const { assert!(N >= 1 && N <= 4) };
        unsafe {
            match N {
                1 => _mm_slli_si128::<1>(self),
                2 => _mm_slli_si128::<2>(self),
                3 => _mm_slli_si128::<3>(self),
                _ => _mm_slli_si128::<4>(self),
            }
        }
    }

    #[inline(always)]
    unsafe fn spill<const N: usize>(self) -> Self {
        const { assert!(N >= 1 && N <= 4) };
        unsafe {
            match N {
                1 => _mm_srli_si128::<15>(self),
                2 => _mm_srli_si128::<14>(self),
                3 => _mm_srli_si128::<13>(self),
                _ => _mm_srli_si128::<12>(self),
            }
        }
    }

    #[inline(always)]
    unsafe fn all_eq(self, other: Self) -> bool {
        unsafe { _mm_movemask_epi8(_mm_cmpeq_epi8(self, other)) == 0xFFFF }
    }
}

/// SSSE3 entry point.
///
/// # Safety
///
/// The CPU must support SSSE3.
#[target_feature(enable = "ssse3")]
pub(crate) unsafe fn validate_ssse3(data: &[u8]) -> bool {
    unsafe { validate_lanes::<__m128i>(data) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simd::classify::classify_block;
    use crate::simd::has_ssse3;
    use crate::simd::lanes::Portable;

    #[test]
    fn test_lane_ops_match_portable() {
        if !has_ssse3() {
            eprintln!("SSSE3 not available, skipping test");
            return;
        }
        let bytes: [u8; LANES] = std::array::from_fn(|i| (i as u8).wrapping_mul(37).wrapping_add(5));
        unsafe {
            let v = __m128i::from_array(&bytes);
            let p = Portable(bytes);
            let mut out = [0u8; LANES];

            v.shift_up::<3>().store(&mut out);
            assert_eq!(out, p.shift_up::<3>().0);
            v.spill::<4>().store(&mut out);
            assert_eq!(out, p.spill::<4>().0);
            v.high_nibbles().store(&mut out);
            assert_eq!(out, p.high_nibbles().0);
            v.lt_signed(__m128i::splat(0x10)).store(&mut out);
            assert_eq!(out, p.lt_signed(Portable::splat(0x10)).0);
            assert!(v.all_eq(v));
            assert!(!v.all_eq(__m128i::splat(0)));
        }
    }

    #[test]
    fn test_classification_matches_portable() {
        if !has_ssse3() {
            eprintln!("SSSE3 not available, skipping test");
            return;
        }
        for base in (0..=0xFFu8).step_by(LANES) {
            let block: [u8; LANES] = std::array::from_fn(|i| base + i as u8);
            assert_eq!(classify_block::<__m128i>(&block), classify_block::<Portable>(&block));
        }
    }

    #[test]
    fn test_ssse3_matches_std() {
        if !has_ssse3() {
            eprintln!("SSSE3 not available, skipping test");
            return;
        }
        let text = "plain ascii, then \u{E9}t\u{E9}, \u{4E2D}\u{6587} and \u{1F980} at the end".as_bytes();
        assert!(unsafe { validate_ssse3(text) });
        for cut in 0..text.len() {
            let prefix = &text[..cut];
            assert_eq!(
                unsafe { validate_ssse3(prefix) },
                std::str::from_utf8(prefix).is_ok(),
                "prefix {}",
                cut
            );
        }
    }
}
