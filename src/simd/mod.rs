//! SIMD UTF-8 validation
//!
//! The automaton from [`crate::core`] evaluated 16 bytes at a time. Runtime
//! CPU feature detection picks the best lane implementation; the portable
//! array lanes run the same algorithm everywhere else.

#[cfg(target_arch = "x86_64")]
use std::sync::OnceLock;

mod classify;
mod driver;
pub(crate) mod lanes;
mod propagate;

#[cfg(all(feature = "simd", target_arch = "x86_64"))]
mod x86_64;

#[cfg(all(feature = "simd", target_arch = "aarch64"))]
mod aarch64;

// CPU feature detection cache
#[cfg(target_arch = "x86_64")]
static HAS_SSSE3: OnceLock<bool> = OnceLock::new();

/// Check if SSSE3 is available (cached after first call)
#[cfg(target_arch = "x86_64")]
pub fn has_ssse3() -> bool {
    *HAS_SSSE3.get_or_init(|| is_x86_feature_detected!("ssse3"))
}

#[cfg(not(target_arch = "x86_64"))]
pub fn has_ssse3() -> bool {
    false
}

/// Check if NEON is available (aarch64 only)
#[cfg(target_arch = "aarch64")]
pub fn has_neon() -> bool {
    true // NEON is mandatory on aarch64
}

#[cfg(not(target_arch = "aarch64"))]
pub fn has_neon() -> bool {
    false
}

/// True when [`validate`] runs on vector instructions rather than the
/// portable lanes.
pub fn is_accelerated() -> bool {
    cfg!(feature = "simd") && (has_ssse3() || has_neon())
}

/// Name of the lane implementation [`validate`] dispatches to.
pub fn backend_name() -> &'static str {
    if !cfg!(feature = "simd") {
        "portable"
    } else if has_ssse3() {
        "ssse3"
    } else if has_neon() {
        "neon"
    } else {
        "portable"
    }
}

/// Validate `data` as UTF-8 with the best available lane implementation.
#[allow(unreachable_code)]
pub fn validate(data: &[u8]) -> bool {
    #[cfg(all(feature = "simd", target_arch = "x86_64"))]
    {
        if has_ssse3() {
            // SAFETY: SSSE3 support was just verified
            return unsafe { x86_64::validate_ssse3(data) };
        }
    }

    #[cfg(all(feature = "simd", target_arch = "aarch64"))]
    {
        // SAFETY: NEON is part of the aarch64 baseline
        return unsafe { aarch64::validate_neon(data) };
    }

    validate_portable(data)
}

/// Validate `data` with the portable array lanes.
///
/// Same block algorithm as [`validate`], without vector instructions.
pub fn validate_portable(data: &[u8]) -> bool {
    // SAFETY: the portable lanes use no CPU-specific instructions
    unsafe { driver::validate_lanes::<lanes::Portable>(data) }
}
