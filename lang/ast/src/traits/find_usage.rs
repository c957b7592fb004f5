//! Queries about the variables and metavariables a term mentions.

use crate::{FreeTerm, HashSet, LetFreeTerm, LocalVar, MetaVar, Term};

use super::walk;

/// Free variables of a term that are not allowed to occur in it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StrayVars {
    /// Occurrences outside any metavariable spine.
    pub in_term: Vec<LocalVar>,
    /// Occurrences that only appear in the spine of a metavariable.
    ///
    /// These may disappear once the metavariable is solved.
    pub in_meta: Vec<LocalVar>,
}

impl StrayVars {
    pub fn is_empty(&self) -> bool {
        self.in_term.is_empty() && self.in_meta.is_empty()
    }
}

/// Find the free variables of `term` for which `allowed` does not hold.
pub fn stray_vars(term: &Term, allowed: &dyn Fn(&LocalVar) -> bool) -> StrayVars {
    fn go(term: &Term, in_meta: bool, allowed: &dyn Fn(&LocalVar) -> bool, out: &mut StrayVars) {
        match term {
            Term::Free(FreeTerm { var }) | Term::LetFree(LetFreeTerm { var, .. })
                if !var.is_placeholder() && !allowed(var) =>
            {
                let list = if in_meta { &mut out.in_meta } else { &mut out.in_term };
                if !list.contains(var) {
                    list.push(var.clone());
                }
            }
            Term::Meta(call) => {
                for arg in &call.args {
                    go(arg, true, allowed, out);
                }
            }
            _ => term.visit(&mut |sub| go(sub, in_meta, allowed, out)),
        }
    }

    let mut out = StrayVars::default();
    go(term, false, allowed, &mut out);
    out.in_meta.retain(|var| !out.in_term.contains(var));
    out
}

/// The free variables of `term`, in order of first occurrence.
pub fn free_vars(term: &Term) -> Vec<LocalVar> {
    let StrayVars { in_term, in_meta } = stray_vars(term, &|_| false);
    in_term.into_iter().chain(in_meta).collect()
}

pub fn uses_var(term: &Term, var: &LocalVar) -> bool {
    let mut found = false;
    walk(term, &mut |sub| {
        if let Term::Free(FreeTerm { var: v }) | Term::LetFree(LetFreeTerm { var: v, .. }) = sub {
            found |= v == var;
        }
    });
    found
}

/// The metavariables applied somewhere in `term`.
pub fn metas(term: &Term) -> HashSet<MetaVar> {
    let mut out = HashSet::default();
    walk(term, &mut |sub| {
        if let Term::Meta(call) = sub {
            out.insert(call.meta.clone());
        }
    });
    out
}

pub fn uses_meta(term: &Term, meta: &MetaVar) -> bool {
    let mut found = false;
    walk(term, &mut |sub| {
        if let Term::Meta(call) = sub {
            found |= call.meta == *meta;
        }
    });
    found
}
