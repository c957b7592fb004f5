//! Substitution on locally nameless terms.
//!
//! All operations are instances of [Rewrite]: a rewrite looks at the nodes it cares about
//! and hands everything else back to [Term::descend]. The `depth` argument counts the index
//! binders that have been entered since the rewrite started, so that `LocalTerm { idx }` with
//! `idx < depth` is bound inside the term being rewritten and `idx >= depth` dangles.

use std::rc::Rc;

use crate::{Closure, FreeTerm, LocalTerm, LocalVar, Term};

pub trait Rewrite: Clone + 'static {
    fn rewrite(&self, depth: usize, term: &Term) -> Term;

    fn rewrite_boxed(&self, depth: usize, term: &Term) -> Box<Term> {
        Box::new(self.rewrite(depth, term))
    }

    fn rewrite_all(&self, depth: usize, terms: &[Term]) -> Vec<Term> {
        terms.iter().map(|term| self.rewrite(depth, term)).collect()
    }
}

/// Structural recursion for a [Rewrite].
pub trait Descend: Sized {
    /// Rebuild `self` with `rw` applied to every immediate subterm.
    fn descend<R: Rewrite>(&self, depth: usize, rw: &R) -> Self;
}

impl Descend for Closure {
    fn descend<R: Rewrite>(&self, depth: usize, rw: &R) -> Self {
        Closure::descend(self, depth, rw)
    }
}

impl<T: Descend> Descend for Vec<T> {
    fn descend<R: Rewrite>(&self, depth: usize, rw: &R) -> Self {
        self.iter().map(|x| x.descend(depth, rw)).collect()
    }
}

/// Replace the outermost dangling indices by `args`, the last argument being index 0.
#[derive(Clone)]
struct Instantiate {
    args: Rc<[Term]>,
}

impl Rewrite for Instantiate {
    fn rewrite(&self, depth: usize, term: &Term) -> Term {
        match term {
            Term::Local(LocalTerm { idx }) if *idx >= depth => {
                let n = self.args.len();
                let j = idx - depth;
                if j < n {
                    self.args[n - 1 - j].shift(depth)
                } else {
                    Term::Local(LocalTerm { idx: idx - n })
                }
            }
            _ => term.descend(depth, self),
        }
    }
}

/// Turn free variables into dangling indices, the last variable becoming index 0.
#[derive(Clone)]
struct Abstract {
    vars: Rc<[LocalVar]>,
}

impl Rewrite for Abstract {
    fn rewrite(&self, depth: usize, term: &Term) -> Term {
        let n = self.vars.len();
        match term {
            Term::Free(FreeTerm { var }) => match self.vars.iter().rposition(|v| v == var) {
                Some(i) => Term::Local(LocalTerm { idx: depth + n - 1 - i }),
                None => term.clone(),
            },
            Term::Local(LocalTerm { idx }) if *idx >= depth => {
                Term::Local(LocalTerm { idx: idx + n })
            }
            _ => term.descend(depth, self),
        }
    }
}

#[derive(Clone)]
struct Replace {
    var: LocalVar,
    with: Rc<Term>,
}

impl Rewrite for Replace {
    fn rewrite(&self, depth: usize, term: &Term) -> Term {
        match term {
            Term::Free(FreeTerm { var }) if *var == self.var => self.with.shift(depth),
            _ => term.descend(depth, self),
        }
    }
}

#[derive(Clone)]
struct Shift {
    by: usize,
}

impl Rewrite for Shift {
    fn rewrite(&self, depth: usize, term: &Term) -> Term {
        match term {
            Term::Local(LocalTerm { idx }) if *idx >= depth => {
                Term::Local(LocalTerm { idx: idx + self.by })
            }
            _ => term.descend(depth, self),
        }
    }
}

/// Lift every universe and every call by `lift` levels.
#[derive(Clone)]
struct Elevate {
    lift: u32,
}

impl Rewrite for Elevate {
    fn rewrite(&self, depth: usize, term: &Term) -> Term {
        let lift = self.lift;
        match term.descend(depth, self) {
            Term::Sort(sort) => Term::Sort(sort.elevate(lift)),
            Term::Data(mut call) => {
                call.ulift += lift;
                Term::Data(call)
            }
            Term::Con(mut call) => {
                call.ulift += lift;
                Term::Con(call)
            }
            Term::Fn(mut call) => {
                call.ulift += lift;
                Term::Fn(call)
            }
            Term::Prim(mut call) => {
                call.ulift += lift;
                Term::Prim(call)
            }
            Term::Class(mut call) => {
                call.ulift += lift;
                Term::Class(call)
            }
            Term::Member(mut call) => {
                call.ulift += lift;
                Term::Member(call)
            }
            other => other,
        }
    }
}

impl Term {
    /// Fill the outermost dangling indices with `args`. The last argument replaces index 0.
    pub fn instantiate(&self, args: &[Term]) -> Term {
        if args.is_empty() {
            return self.clone();
        }
        Instantiate { args: args.into() }.rewrite(0, self)
    }

    /// The inverse of [Term::instantiate]: abstract over `vars`, the last one becoming index 0.
    pub fn bind_tele(&self, vars: &[LocalVar]) -> Term {
        if vars.is_empty() {
            return self.clone();
        }
        Abstract { vars: vars.into() }.rewrite(0, self)
    }

    pub fn bind(&self, var: &LocalVar) -> Closure {
        Closure::Named(Box::new(self.clone()), var.clone())
    }

    pub fn replace(&self, var: &LocalVar, with: &Term) -> Term {
        Replace { var: var.clone(), with: Rc::new(with.clone()) }.rewrite(0, self)
    }

    /// Make room for `by` more binders around the term.
    pub fn shift(&self, by: usize) -> Term {
        if by == 0 {
            return self.clone();
        }
        Shift { by }.rewrite(0, self)
    }

    pub fn elevate(&self, lift: u32) -> Term {
        if lift == 0 {
            return self.clone();
        }
        Elevate { lift }.rewrite(0, self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::*;

    fn local(idx: usize) -> Term {
        Term::Local(LocalTerm { idx })
    }

    fn tup(lhs: Term, rhs: Term) -> Term {
        Term::Tup(TupTerm { lhs: Box::new(lhs), rhs: Box::new(rhs) })
    }

    #[test]
    fn instantiate_fills_nearest_last() {
        let names = NameGenerator::new();
        let x = names.fresh("x");
        let y = names.fresh("y");
        let t = tup(local(1), local(0));
        assert_eq!(t.instantiate(&[Term::free(&x), Term::free(&y)]), tup(Term::free(&x), Term::free(&y)));
    }

    #[test]
    fn instantiate_under_binder_skips_bound_index() {
        let names = NameGenerator::new();
        let x = names.fresh("x");
        let lam = Term::Lam(LamTerm { body: Closure::Idx(Box::new(tup(local(0), local(1)))) });
        let expected =
            Term::Lam(LamTerm { body: Closure::Idx(Box::new(tup(local(0), Term::free(&x)))) });
        assert_eq!(lam.instantiate(&[Term::free(&x)]), expected);
    }

    #[test]
    fn bind_tele_inverts_instantiate() {
        let names = NameGenerator::new();
        let x = names.fresh("x");
        let y = names.fresh("y");
        let t = tup(Term::free(&y), Term::free(&x));
        let bound = t.bind_tele(&[x.clone(), y.clone()]);
        assert_eq!(bound, tup(local(0), local(1)));
        assert_eq!(bound.instantiate(&[Term::free(&x), Term::free(&y)]), t);
    }

    #[test]
    fn elevate_lifts_sorts_and_calls() {
        let t = Term::Sort(SortTerm::TYPE0).elevate(2);
        assert_eq!(t, Term::Sort(SortTerm { kind: SortKind::Type, lift: 2 }));
        assert_eq!(Term::Sort(SortTerm::ISET).elevate(1), Term::Sort(SortTerm::ISET));
    }

    #[test]
    fn native_closures_are_rewritten_lazily() {
        let names = NameGenerator::new();
        let x = names.fresh("x");
        let y = names.fresh("y");
        let x2 = x.clone();
        let lam = Term::Lam(LamTerm {
            body: Closure::native(move |arg| tup(arg, Term::free(&x2))),
        });
        let z = names.fresh("z");
        let Term::Lam(replaced) = lam.replace(&x, &Term::free(&y)) else { panic!("not a lambda") };
        assert_eq!(replaced.body.apply(Term::free(&z)), tup(Term::free(&z), Term::free(&y)));
    }
}
