//! The core language of Tessera.
//!
//! Terms are locally nameless: variables bound by a binder that has not been opened yet are
//! de-Bruijn indices ([LocalTerm]), while variables of the typing context are unique names
//! ([FreeTerm]). Binders store their body as a [Closure], which is opened with
//! [Closure::apply].

pub mod ctx;
pub mod decls;
mod meta;
pub mod term;
pub mod traits;
mod var;

pub use ctx::*;
pub use decls::*;
pub use meta::*;
pub use term::*;
pub use traits::*;
pub use var::*;

pub type HashMap<K, V> = fxhash::FxHashMap<K, V>;
pub type HashSet<V> = fxhash::FxHashSet<V>;
