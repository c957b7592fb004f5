//! Definitional equality, unification and the supporting machinery of the elaborator.
//!
//! The entry point is [Unifier], which compares terms in a [LocalCtx](ast::LocalCtx) and
//! solves metavariables in a shared [TyckState]. Problems are sent to a [Reporter].

pub mod conversion_checking;
mod normalizer;
pub mod result;
pub mod state;
pub mod typechecker;

#[cfg(test)]
mod test_util;

pub use conversion_checking::{Decision, FailureData, Ordering, RelDec, Unifier, UnifierCfg};
pub use result::{BufferedReporter, Reporter, TypeError};
pub use state::{Eqn, TyckState};
pub use typechecker::{DoubleChecker, Synthesizer};
