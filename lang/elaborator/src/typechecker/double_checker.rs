use ast::*;

use crate::conversion_checking::{Decision, Unifier};
use crate::result::TypeError;

use super::Synthesizer;

/// Checks a term against a type, falling back to synthesis and subtyping.
pub struct DoubleChecker<'u, 'a> {
    unifier: &'u mut Unifier<'a>,
}

impl<'u, 'a> DoubleChecker<'u, 'a> {
    /// `unifier` decides subtyping; it should compare with [crate::conversion_checking::Ordering::Lt].
    pub fn new(unifier: &'u mut Unifier<'a>) -> Self {
        DoubleChecker { unifier }
    }

    pub fn synthesizer(&mut self) -> Synthesizer<'_, 'a> {
        Synthesizer::new(&mut *self.unifier)
    }

    pub fn inherit(&mut self, term: &Term, expected: &Term) -> bool {
        match term {
            Term::DepType(dt) => {
                // The sort of the domain does not matter, but synthesizing it may solve metavariables.
                self.synthesizer().try_synth(&dt.param);
                self.unifier.with_fresh("x", (*dt.param).clone(), |unifier, x| {
                    DoubleChecker::new(unifier).inherit(&dt.body.apply(x), expected)
                })
            }
            Term::Tup(TupTerm { lhs, rhs }) => match self.unifier.whnf(expected) {
                Term::DepType(DepTypeTerm { kind: DTKind::Sigma, param, body }) => {
                    self.inherit(lhs, &param) && self.inherit(rhs, &body.apply((**lhs).clone()))
                }
                _ => self.synth_and_compare(term, expected),
            },
            Term::Lam(lam) => match self.unifier.whnf(expected) {
                Term::DepType(DepTypeTerm { kind: DTKind::Pi, param, body }) => {
                    self.unifier.with_fresh("x", *param, |unifier, x| {
                        DoubleChecker::new(unifier).inherit(&lam.body.apply(x.clone()), &body.apply(x))
                    })
                }
                Term::Eq(eq) => {
                    let body_ok = self.unifier.with_fresh("i", Term::DimTy(DimTyTerm), |unifier, i| {
                        DoubleChecker::new(unifier).inherit(&lam.body.apply(i.clone()), &eq.app_a(i))
                    });
                    body_ok
                        && self.boundary(&lam.body, DimTerm::I0, &eq.lhs, &eq)
                        && self.boundary(&lam.body, DimTerm::I1, &eq.rhs, &eq)
                }
                expected => {
                    let err = TypeError::ill_typed(term, &expected, self.unifier.pos);
                    self.unifier.report(err);
                    false
                }
            },
            Term::Meta(call) if !call.meta.req.is_typed() => self.retag(call, expected),
            Term::LetFree(LetFreeTerm { value, .. }) => self.inherit(value, expected),
            Term::Partial(PartialTerm { element }) => match self.unifier.whnf(expected) {
                Term::PartialTy(pt) => {
                    let checked = self.unifier.with_connection(&pt.lhs, &pt.rhs, |unifier| {
                        unifier.state.is_inconsistent() || DoubleChecker::new(unifier).inherit(element, &pt.typ)
                    });
                    match checked {
                        Some(ok) => ok,
                        None => self.inherit(element, &pt.typ),
                    }
                }
                _ => self.synth_and_compare(term, expected),
            },
            _ => self.synth_and_compare(term, expected),
        }
    }

    /// The path `body` has the endpoint `expected` at `end`.
    fn boundary(&mut self, body: &Closure, end: DimTerm, expected: &Term, eq: &EqTerm) -> bool {
        let typ = eq.app_a(Term::Dim(end));
        self.unifier.compare(&body.apply(Term::Dim(end)), expected, Some(&typ)) != Decision::No
    }

    /// Tag an untyped metavariable with the expected type by forwarding it to a typed copy.
    fn retag(&mut self, call: &MetaCall, expected: &Term) -> bool {
        let ctx_size = call.meta.ctx_size.min(call.args.len());
        let mut vars = Vec::with_capacity(ctx_size);
        for arg in &call.args[..ctx_size] {
            match self.unifier.whnf(arg) {
                Term::Free(FreeTerm { var }) if !vars.contains(&var) => vars.push(var),
                _ => return self.synth_and_compare(&Term::Meta(call.clone()), expected),
            }
        }
        // Arguments beyond the context are not part of the type.
        let mut extra = Vec::new();
        for arg in &call.args[ctx_size..] {
            match self.unifier.whnf(arg) {
                Term::Free(FreeTerm { var }) => extra.push(var),
                _ => return self.synth_and_compare(&Term::Meta(call.clone()), expected),
            }
        }
        if extra.iter().any(|var| uses_var(expected, var)) {
            return self.synth_and_compare(&Term::Meta(call.clone()), expected);
        }
        let req = Requirement::OfType(Box::new(expected.bind_tele(&vars)));
        let typed = MetaCall { meta: call.meta.with_req(&self.unifier.state.names, req), args: call.args.clone() };
        self.unifier.compare(&Term::Meta(call.clone()), &Term::Meta(typed), None) != Decision::No
    }

    fn synth_and_compare(&mut self, term: &Term, expected: &Term) -> bool {
        match self.synthesizer().try_synth(term) {
            Some(actual) => self.unifier.compare(&actual, expected, None) != Decision::No,
            None => false,
        }
    }
}
