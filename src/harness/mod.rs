//! Comparison harness
//!
//! Feeds test items from several sources through every validator, places
//! them at chosen alignments, and reports where the validators disagree.

pub mod error;
pub mod pool;
pub mod random;
pub mod runner;
pub mod testset;
pub mod validators;

pub use error::HarnessError;
pub use pool::{BlockPool, Placed, Placement};
pub use random::{RandomSample, RandomSet};
pub use runner::{AlignmentMode, ItemReport, Runner, RunnerOptions, Totals, Verdict};
pub use testset::{FileSet, StandardSet, TestItem};
pub use validators::{Validator, create_all};
