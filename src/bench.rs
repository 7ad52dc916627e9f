//! Benchmarking utilities for comparing validation paths.
//!
//! This module exposes the internal validation paths for performance
//! comparison:
//! - Scalar: per-position arrays, no blocks
//! - Portable: the block algorithm on plain arrays
//! - Simd: the block algorithm on the best vector unit available
//!
//! # Example
//!
//! ```
//! use utf8_lanes::bench::{detect_available_paths, validate_with_path};
//!
//! for path in detect_available_paths() {
//!     assert!(validate_with_path("crème brûlée".as_bytes(), path));
//! }
//! ```

/// Available validation paths for benchmarking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidationPath {
    /// Scalar reference implementation
    Scalar,
    /// Block algorithm without vector instructions
    Portable,
    /// Block algorithm on SSSE3 or NEON
    Simd,
}

impl std::fmt::Display for ValidationPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationPath::Scalar => write!(f, "Scalar"),
            ValidationPath::Portable => write!(f, "Portable"),
            ValidationPath::Simd => write!(f, "SIMD"),
        }
    }
}

/// Platform capabilities for SIMD.
#[derive(Debug, Clone)]
pub struct PlatformInfo {
    pub arch: &'static str,
    pub simd_features: Vec<&'static str>,
}

impl PlatformInfo {
    /// Detect current platform capabilities.
    pub fn detect() -> Self {
        let arch = std::env::consts::ARCH;
        let mut simd_features = Vec::new();

        if crate::simd::has_ssse3() {
            simd_features.push("SSSE3");
        }
        if crate::simd::has_neon() {
            simd_features.push("NEON");
        }

        PlatformInfo { arch, simd_features }
    }

    /// Format as display string.
    pub fn display(&self) -> String {
        if self.simd_features.is_empty() {
            self.arch.to_string()
        } else {
            format!("{} ({})", self.arch, self.simd_features.join(", "))
        }
    }
}

/// Detect which validation paths are available on this machine.
pub fn detect_available_paths() -> Vec<ValidationPath> {
    let mut paths = vec![ValidationPath::Scalar, ValidationPath::Portable];
    if crate::simd::is_accelerated() {
        paths.push(ValidationPath::Simd);
    }
    paths
}

/// Validate using a specific path.
///
/// `Simd` falls back to the portable lanes where no vector unit is
/// available, the same way [`crate::validate`] does.
pub fn validate_with_path(data: &[u8], path: ValidationPath) -> bool {
    match path {
        ValidationPath::Scalar => crate::scalar::validate(data),
        ValidationPath::Portable => crate::simd::validate_portable(data),
        ValidationPath::Simd => crate::simd::validate(data),
    }
}
