//! Weak-head normalization
//!
//! Terms are only reduced as far as needed to expose their outermost former. Solved
//! metavariables, function bodies and let-bound variables are unfolded on the way.

use std::rc::Rc;

use log::trace;

use ast::*;
use printer::Print;

use crate::state::TyckState;

impl TyckState {
    pub fn whnf(&self, term: &Term) -> Term {
        match term {
            Term::App(AppTerm { fun, arg }) => match self.whnf(fun) {
                Term::Lam(lam) => self.whnf(&lam.body.apply((**arg).clone())),
                fun => AppTerm::make(fun, (**arg).clone()),
            },
            Term::Proj(ProjTerm { of, index }) => match ProjTerm::make(self.whnf(of), *index) {
                proj @ Term::Proj(_) => proj,
                other => self.whnf(&other),
            },
            Term::PApp(PAppTerm { fun, arg, a0, a1 }) => {
                match PAppTerm::make(self.whnf(fun), self.whnf(arg), (**a0).clone(), (**a1).clone()) {
                    papp @ Term::PApp(_) => papp,
                    other => self.whnf(&other),
                }
            }
            Term::Member(MemberCall { of, class, index, ulift }) => {
                match MemberCall::make(self.whnf(of), class.clone(), *index, *ulift) {
                    member @ Term::Member(_) => member,
                    other => self.whnf(&other),
                }
            }
            Term::Fn(call) => match &call.def.body {
                Some(body) => self.whnf(&body.instantiate(&call.args).elevate(call.ulift)),
                None => term.clone(),
            },
            Term::Prim(call) => self.reduce_prim(call).unwrap_or_else(|| term.clone()),
            Term::LetFree(LetFreeTerm { value, .. }) => self.whnf(value),
            Term::Free(FreeTerm { var }) => match self.endpoint(var) {
                Some(end) => Term::Dim(end),
                None => term.clone(),
            },
            Term::Meta(call) => match self.solution(&call.meta) {
                Some(solution) => self.whnf(&MetaCall::app(solution, &call.args, call.meta.ctx_size)),
                None => term.clone(),
            },
            Term::Coe(coe) => self.reduce_coe(coe).unwrap_or_else(|| term.clone()),
            Term::Local(_)
            | Term::DepType(_)
            | Term::Sort(_)
            | Term::Eq(_)
            | Term::PartialTy(_)
            | Term::DimTy(_)
            | Term::Data(_)
            | Term::Class(_)
            | Term::Lam(_)
            | Term::Tup(_)
            | Term::Con(_)
            | Term::New(_)
            | Term::Str(_)
            | Term::Int(_)
            | Term::List(_)
            | Term::Partial(_)
            | Term::Dim(_)
            | Term::ClassCast(_) => term.clone(),
        }
    }

    fn reduce_prim(&self, call: &PrimCall) -> Option<Term> {
        match call.id {
            PrimId::String => None,
            PrimId::StringConcat => match (self.whnf(call.args.first()?), self.whnf(call.args.get(1)?)) {
                (Term::Str(lhs), Term::Str(rhs)) => Some(Term::Str(StringTerm { value: lhs.value + &rhs.value })),
                _ => None,
            },
        }
    }

    /// Coercions reduce to a function once the family is known.
    fn reduce_coe(&self, coe: &CoeTerm) -> Option<Term> {
        let r = self.whnf(&coe.r);
        let s = self.whnf(&coe.s);
        if r == s || self.is_connected(&r, &s) {
            return Some(LamTerm::id());
        }
        let i = self.names.fresh("i");
        let family = self.whnf(&coe.typ.apply_var(&i));
        if !uses_var(&family, &i) {
            return Some(LamTerm::id());
        }
        trace!("Reducing coercion along {}", family.print_trace());
        match family {
            Term::Sort(_) | Term::DimTy(_) => Some(LamTerm::id()),
            Term::DepType(dt) => Some(match dt.kind {
                DTKind::Pi => coe.reduce_pi(&i, &dt),
                DTKind::Sigma => coe.reduce_sigma(&i, &dt),
            }),
            _ => None,
        }
    }

    /// Inline the solutions of all solved metavariables.
    pub fn freeze_holes(&self, term: &Term) -> Term {
        Zonk { solutions: self.solutions_snapshot(), unfold_lets: false }.rewrite(0, term)
    }

    /// Like [TyckState::freeze_holes], but also replaces let-bound variables by their values.
    pub(crate) fn inline_lets(&self, term: &Term) -> Term {
        Zonk { solutions: self.solutions_snapshot(), unfold_lets: true }.rewrite(0, term)
    }
}

#[derive(Clone)]
struct Zonk {
    solutions: Rc<HashMap<MetaVar, Term>>,
    unfold_lets: bool,
}

impl Rewrite for Zonk {
    fn rewrite(&self, depth: usize, term: &Term) -> Term {
        match term {
            Term::Meta(call) => match self.solutions.get(&call.meta) {
                Some(solution) => {
                    let args = self.rewrite_all(depth, &call.args);
                    self.rewrite(depth, &MetaCall::app(solution, &args, call.meta.ctx_size))
                }
                None => term.descend(depth, self),
            },
            Term::LetFree(LetFreeTerm { value, .. }) if self.unfold_lets => self.rewrite(depth, value),
            _ => term.descend(depth, self),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::*;

    #[test]
    fn beta_and_delta() {
        let sig = Sig::new();
        let state = TyckState::new();
        let x = state.names.fresh("x");
        // (\y. suc y) x
        let app = Term::App(AppTerm {
            fun: Box::new(Term::Lam(LamTerm { body: Closure::Idx(Box::new(sig.suc(local(0)))) })),
            arg: Box::new(Term::free(&x)),
        });
        assert_eq!(state.whnf(&app), sig.suc(Term::free(&x)));
        // id Nat (suc x) unfolds through the body of `id`
        assert_eq!(state.whnf(&sig.id(sig.nat(), sig.suc(Term::free(&x)))), sig.suc(Term::free(&x)));
    }

    #[test]
    fn string_concat_reduces_on_literals() {
        let state = TyckState::new();
        let concat = Term::Prim(PrimCall { id: PrimId::StringConcat, ulift: 0, args: vec![string("ab"), string("c")] });
        assert_eq!(state.whnf(&concat), string("abc"));
    }

    #[test]
    fn solved_metas_unfold() {
        let mut state = TyckState::new();
        let meta = state.fresh_meta("m", None, 1, Requirement::Whatever);
        let x = state.names.fresh("x");
        state.solve(&meta, local(0));
        let call = Term::Meta(MetaCall { meta, args: vec![Term::free(&x)] });
        assert_eq!(state.whnf(&call), Term::free(&x));
        let under_binder = Term::Lam(LamTerm { body: Closure::constant(call) });
        assert_eq!(
            state.freeze_holes(&under_binder),
            Term::Lam(LamTerm { body: Closure::constant(Term::free(&x)) })
        );
    }

    #[test]
    fn coercion_along_constant_family_is_identity() {
        let sig = Sig::new();
        let state = TyckState::new();
        let r = Term::free(&state.names.fresh("r"));
        let coe = Term::Coe(CoeTerm::new(Closure::constant(sig.nat()), r, Term::Dim(DimTerm::I1)));
        assert_eq!(state.whnf(&coe), LamTerm::id());
    }

    #[test]
    fn coercion_along_function_family_is_a_lambda() {
        let state = TyckState::new();
        let a = state.names.fresh("A");
        // \i. Pi (x : A i) -> A i
        let family = Closure::native({
            let a = a.clone();
            move |i| {
                let ai = AppTerm::make(Term::free(&a), i);
                DepTypeTerm::pi(ai.clone(), Closure::constant(ai))
            }
        });
        let coe = Term::Coe(CoeTerm::new(family, Term::Dim(DimTerm::I0), Term::Dim(DimTerm::I1)));
        assert!(matches!(state.whnf(&coe), Term::Lam(_)));
    }

    #[test]
    fn whnf_is_idempotent() {
        let sig = Sig::new();
        let state = TyckState::new();
        let x = state.names.fresh("x");
        let term = sig.id(sig.nat(), sig.id(sig.nat(), sig.suc(Term::free(&x))));
        let once = state.whnf(&term);
        assert_eq!(state.whnf(&once), once);
    }
}
