//! Type synthesis and checking of terms that are already elaborated
//!
//! These are used by the unifier to make sure that a candidate solution of a metavariable
//! satisfies its requirement.

mod double_checker;
mod synthesizer;

pub use double_checker::DoubleChecker;
pub use synthesizer::Synthesizer;
