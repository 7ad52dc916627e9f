//! 16-lane byte vector abstraction
//!
//! The classifier, propagator and block driver are written once against
//! [`ByteLanes`]. Each instruction set provides an implementation whose
//! methods are `#[inline(always)]`, so the generic code collapses into the
//! `#[target_feature]` entry point that instantiates it.
//!
//! Methods are `unsafe` because the hardware implementations are only sound
//! once the matching CPU feature has been verified.

/// Bytes per block
pub(crate) const LANES: usize = 16;

pub(crate) trait ByteLanes: Copy {
    unsafe fn splat(byte: u8) -> Self;

    /// Unaligned load of 16 bytes
    unsafe fn load(ptr: *const u8) -> Self;

    /// Load of 16 bytes from a 16-byte aligned address
    unsafe fn load_aligned(ptr: *const u8) -> Self;

    unsafe fn store(self, out: &mut [u8; LANES]);

    unsafe fn and(self, other: Self) -> Self;

    unsafe fn or(self, other: Self) -> Self;

    /// Lane-wise `mask ? if_set : otherwise`; mask lanes are 0x00 or 0xFF
    unsafe fn select(mask: Self, if_set: Self, otherwise: Self) -> Self;

    /// 0xFF where lanes are equal
    unsafe fn eq(self, other: Self) -> Self;

    /// 0xFF where `self < other`, both read as `i8`
    unsafe fn lt_signed(self, other: Self) -> Self;

    /// Wrapping lane-wise subtraction
    unsafe fn sub(self, other: Self) -> Self;

    /// Each lane shifted right by four bits
    unsafe fn high_nibbles(self) -> Self;

    /// `table[index]` per lane; index lanes must be below 16
    unsafe fn lookup(table: Self, index: Self) -> Self;

    /// Lane `j` takes lane `j - N`; the low `N` lanes become zero
    unsafe fn shift_up<const N: usize>(self) -> Self;

    /// The top `N` lanes moved down to lanes `0..N`; the rest become zero
    unsafe fn spill<const N: usize>(self) -> Self;

    unsafe fn all_eq(self, other: Self) -> bool;

    #[inline(always)]
    unsafe fn from_array(bytes: &[u8; LANES]) -> Self {
        unsafe { Self::load(bytes.as_ptr()) }
    }
}

/// Plain array lanes, used where no vector unit is available
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Portable(pub(crate) [u8; LANES]);

impl Portable {
    #[inline(always)]
    fn map(self, f: impl Fn(u8) -> u8) -> Self {
        Portable(self.0.map(f))
    }

    #[inline(always)]
    fn zip(self, other: Self, f: impl Fn(u8, u8) -> u8) -> Self {
        Portable(std::array::from_fn(|i| f(self.0[i], other.0[i])))
    }
}

impl ByteLanes for Portable {
    #[inline(always)]
    unsafe fn splat(byte: u8) -> Self {
        Portable([byte; LANES])
    }

    #[inline(always)]
    unsafe fn load(ptr: *const u8) -> Self {
        // SAFETY: caller guarantees 16 readable bytes at `ptr`
        Portable(unsafe { ptr.cast::<[u8; LANES]>().read_unaligned() })
    }

    #[inline(always)]
    unsafe fn load_aligned(ptr: *const u8) -> Self {
        unsafe { Self::load(ptr) }
    }

    #[inline(always)]
    unsafe fn store(self, out: &mut [u8; LANES]) {
        *out = self.0;
    }

    #[inline(always)]
    unsafe fn and(self, other: Self) -> Self {
        self.zip(other, |a, b| a & b)
    }

    #[inline(always)]
    unsafe fn or(self, other: Self) -> Self {
        self.zip(other, |a, b| a | b)
    }

    #[inline(always)]
    unsafe fn select(mask: Self, if_set: Self, otherwise: Self) -> Self {
        Portable(std::array::from_fn(|i| {
            (mask.0[i] & if_set.0[i]) | (!mask.0[i] & otherwise.0[i])
        }))
    }

    #[inline(always)]
    unsafe fn eq(self, other: Self) -> Self {
        self.zip(other, |a, b| if a == b { 0xFF } else { 0 })
    }

    #[inline(always)]
    unsafe fn lt_signed(self, other: Self) -> Self {
        self.zip(other, |a, b| if (a as i8) < (b as i8) { 0xFF } else { 0 })
    }

    #[inline(always)]
    unsafe fn sub(self, other: Self) -> Self {
        self.zip(other, u8::wrapping_sub)
    }

    #[inline(always)]
    unsafe fn high_nibbles(self) -> Self {
        self.map(|b| b >> 4)
    }

    #[inline(always)]
    unsafe fn lookup(table: Self, index: Self) -> Self {
        index.map(|i| table.0[(i & 0x0F) as usize])
    }

    #[inline(always)]
    unsafe fn shift_up<const N: usize>(self) -> Self {
        Portable(std::array::from_fn(|j| if j >= N { self.0[j - N] } else { 0 }))
    }

    #[inline(always)]
    unsafe fn spill<const N: usize>(self) -> Self {
        Portable(std::array::from_fn(|j| if j < N { self.0[LANES - N + j] } else { 0 }))
    }

    #[inline(always)]
    unsafe fn all_eq(self, other: Self) -> bool {
        self.0 == other.0
    }
}
