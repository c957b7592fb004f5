mod find_usage;
mod subst;
mod visit;

pub use find_usage::*;
pub use subst::*;
pub use visit::*;
