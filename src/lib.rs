//! UTF-8 validation as an automaton over byte categories.
//!
//! Every byte is classified on its own into a small set of categories, and
//! every lead byte imposes category requirements on the bytes that follow
//! it. Input is valid exactly when each position's categories cover what is
//! required there. Because both steps are context free, they run 16 bytes at
//! a time with nibble table lookups, see [`simd`].
//!
//! ```
//! assert!(utf8_lanes::validate("naïve café".as_bytes()));
//! assert!(!utf8_lanes::validate(&[0xED, 0xA0, 0x80]));
//! ```

pub mod bench;
pub mod core;
pub mod harness;
pub mod scalar;
pub mod simd;

pub use crate::core::category::{Category, classify};
pub use crate::core::config::HarnessConfig;
pub use crate::core::requirement::{MAX_REACH, Requirement, requirement_after};

/// Validate `data` as UTF-8 using the fastest implementation available.
pub fn validate(data: &[u8]) -> bool {
    simd::validate(data)
}

/// Validate `data` with the scalar implementation, emitting a `trace` event
/// for every position examined.
pub fn validate_traced(data: &[u8]) -> bool {
    scalar::validate_traced(data)
}
