//! aarch64 lanes using NEON
//!
//! NEON is part of the aarch64 baseline, so no runtime check is needed.

use std::arch::aarch64::*;

use super::driver::validate_lanes;
use super::lanes::{ByteLanes, LANES};

impl ByteLanes for uint8x16_t {
    #[inline(always)]
    unsafe fn splat(byte: u8) -> Self {
        unsafe { vdupq_n_u8(byte) }
    }

    #[inline(always)]
    unsafe fn load(ptr: *const u8) -> Self {
        unsafe { vld1q_u8(ptr) }
    }

    #[inline(always)]
    unsafe fn load_aligned(ptr: *const u8) -> Self {
        unsafe { vld1q_u8(ptr) }
    }

    #[inline(always)]
    unsafe fn store(self, out: &mut [u8; LANES]) {
        unsafe { vst1q_u8(out.as_mut_ptr(), self) }
    }

    #[inline(always)]
    unsafe fn and(self, other: Self) -> Self {
        unsafe { vandq_u8(self, other) }
    }

    #[inline(always)]
    unsafe fn or(self, other: Self) -> Self {
        unsafe { vorrq_u8(self, other) }
    }

    #[inline(always)]
    unsafe fn select(mask: Self, if_set: Self, otherwise: Self) -> Self {
        unsafe { vbslq_u8(mask, if_set, otherwise) }
    }

    #[inline(always)]
    unsafe fn eq(self, other: Self) -> Self {
        unsafe { vceqq_u8(self, other) }
    }

    #[inline(always)]
    unsafe fn lt_signed(self, other: Self) -> Self {
        unsafe { vcltq_s8(vreinterpretq_s8_u8(self), vreinterpretq_s8_u8(other)) }
    }

    #[inline(always)]
    unsafe fn sub(self, other: Self) -> Self {
        unsafe { vsubq_u8(self, other) }
    }

    #[inline(always)]
    unsafe fn high_nibbles(self) -> Self {
        unsafe { vshrq_n_u8::<4>(self) }
    }

    #[inline(always)]
    unsafe fn lookup(table: Self, index: Self) -> Self {
        unsafe { vqtbl1q_u8(table, index) }
    }

    #[inline(always)]
    unsafe fn shift_up<const N: usize>(self) -> Self {
        const { assert!(N >= 1 && N <= 4) };
        unsafe {
            let zero = vdupq_n_u8(0);
            match N {
                1 => vextq_u8::<15>(zero, self),
                2 => vextq_u8::<14>(zero, self),
                3 => vextq_u8::<13>(zero, self),
                _ => vextq_u8::<12>(zero, self),
            }
        }
    }

    #[inline(always)]
    unsafe fn spill<const N: usize>(self) -> Self {
        const { assert!(N >= 1 && N <= 4) };
        unsafe {
            let zero = vdupq_n_u8(0);
            match N {
                1 => vextq_u8::<15>(self, zero),
                2 => vextq_u8::<14>(self, zero),
                3 => vextq_u8::<13>(self, zero),
                _ => vextq_u8::<12>(self, zero),
            }
        }
    }

    #[inline(always)]
    unsafe fn all_eq(self, other: Self) -> bool {
        unsafe { vminvq_u8(vceqq_u8(self, other)) == 0xFF }
    }
}

/// NEON entry point.
///
/// # Safety
///
/// Always sound on aarch64; `unsafe` only to mirror the x86_64 entry point.
#[target_feature(enable = "neon")]
pub(crate) unsafe fn validate_neon(data: &[u8]) -> bool {
    unsafe { validate_lanes::<uint8x16_t>(data) }
}
