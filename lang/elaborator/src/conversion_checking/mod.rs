//! Definitional equality and metavariable solving
//!
//! [Unifier::compare] decides whether two terms are the same, possibly at a given type.
//! Comparison proceeds in two phases:
//!
//! 1. An approximate pass that compares calls with the same head by their arguments,
//!    without unfolding anything. Metavariables are not solved during this pass; the
//!    equations that would solve them are collected and only solved if the pass succeeds.
//! 2. A full pass on weak-head normal forms, directed by the type if one is known.
//!
//! Whenever one side is an unsolved metavariable, the other side is used to solve it by
//! pattern unification (see `solve.rs`). Equations that cannot be solved yet are postponed
//! to the [TyckState], and the comparison reports [Decision::Unsure].

use log::trace;
use miette_util::codespan::Span;

use ast::*;
use printer::Print;

use crate::result::{Reporter, TypeError};
use crate::state::{Eqn, TyckState};

mod compare;
mod dec;
mod solve;

pub use dec::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnifierCfg {
    /// Postpone equations which are not in the pattern fragment yet.
    pub allow_delay: bool,
    /// Solve equations outside the pattern fragment, picking one of several solutions.
    pub allow_vague: bool,
}

impl Default for UnifierCfg {
    fn default() -> Self {
        Self { allow_delay: true, allow_vague: false }
    }
}

/// The first pair of subterms found to be different.
#[derive(Debug, Clone, PartialEq)]
pub struct FailureData {
    pub lhs: Term,
    pub rhs: Term,
}

pub struct Unifier<'a> {
    pub(crate) state: &'a mut TyckState,
    pub(crate) ctx: LocalCtx,
    pub(crate) reporter: &'a mut dyn Reporter,
    pub(crate) pos: Option<Span>,
    pub(crate) cmp: Ordering,
    pub(crate) cfg: UnifierCfg,
    /// If false, metavariable equations are recorded in the innermost approximation batch
    /// instead of being solved.
    solve_meta: bool,
    failure: Option<FailureData>,
    approx_batches: Vec<Vec<Eqn>>,
    /// Number of equations postponed by this unifier so far.
    postponed: usize,
}

impl ContextHolder for Unifier<'_> {
    fn ctx_mut(&mut self) -> &mut LocalCtx {
        &mut self.ctx
    }
}

impl<'a> Unifier<'a> {
    pub fn new(
        state: &'a mut TyckState,
        ctx: LocalCtx,
        reporter: &'a mut dyn Reporter,
        pos: Option<Span>,
        cmp: Ordering,
    ) -> Self {
        Unifier {
            state,
            ctx,
            reporter,
            pos,
            cmp,
            cfg: UnifierCfg::default(),
            solve_meta: true,
            failure: None,
            approx_batches: Vec::new(),
            postponed: 0,
        }
    }

    pub fn with_cfg(self, cfg: UnifierCfg) -> Self {
        Unifier { cfg, ..self }
    }

    pub fn ctx(&self) -> &LocalCtx {
        &self.ctx
    }

    pub fn state(&self) -> &TyckState {
        self.state
    }

    /// A unifier for a sub-obligation, sharing the state but not the context.
    pub fn derive(&mut self, pos: Option<Span>, cmp: Ordering) -> Unifier<'_> {
        Unifier::new(&mut *self.state, self.ctx.clone(), &mut *self.reporter, pos, cmp).with_cfg(self.cfg)
    }

    /// Decide whether `lhs` and `rhs` are the same, at type `typ` if it is known.
    pub fn compare(&mut self, lhs: &Term, rhs: &Term, typ: Option<&Term>) -> Decision {
        let postponed = self.postponed;
        let ok = self.compare_inner(lhs, rhs, typ);
        self.decide(ok, postponed)
    }

    /// Compare without type information. On success, the witness is the type of both sides.
    pub fn compare_untyped(&mut self, lhs: &Term, rhs: &Term) -> RelDec<Term> {
        let postponed = self.postponed;
        match self.compare_untyped_inner(lhs, rhs) {
            Some(typ) => RelDec::Yes(typ).lub(self.decide(true, postponed)),
            None => RelDec::No,
        }
    }

    /// Check a postponed equation again.
    pub fn check_eqn(&mut self, eqn: &Eqn) -> Decision {
        trace!("Checking {}", eqn.print_trace());
        self.compare(&Term::Meta(eqn.lhs.clone()), &eqn.rhs, eqn.typ.as_ref())
    }

    pub fn create_eqn(&self, lhs: &MetaCall, rhs: &Term, typ: Option<&Term>) -> Eqn {
        Eqn {
            lhs: lhs.clone(),
            rhs: rhs.clone(),
            typ: typ.cloned(),
            cmp: self.cmp,
            pos: self.pos,
            ctx: self.ctx.clone(),
        }
    }

    /// The first failure this unifier ran into, with all solved metavariables inlined.
    pub fn get_failure(&self) -> Option<FailureData> {
        self.failure.as_ref().map(|FailureData { lhs, rhs }| FailureData {
            lhs: self.state.freeze_holes(lhs),
            rhs: self.state.freeze_holes(rhs),
        })
    }

    pub(crate) fn postponed(&self) -> usize {
        self.postponed
    }

    fn decide(&self, ok: bool, postponed_before: usize) -> Decision {
        if !ok {
            Decision::No
        } else if self.postponed > postponed_before {
            Decision::Unsure
        } else {
            Decision::Yes
        }
    }

    pub(crate) fn whnf(&self, term: &Term) -> Term {
        self.state.whnf(term)
    }

    pub(crate) fn report(&mut self, err: Box<TypeError>) {
        // Problems found by the approximate pass are discarded together with its result.
        if self.approx_batches.is_empty() {
            self.reporter.report(err);
        }
    }

    fn fail_with(&mut self, lhs: &Term, rhs: &Term) {
        if self.failure.is_none() {
            self.failure = Some(FailureData { lhs: lhs.clone(), rhs: rhs.clone() });
        }
    }

    pub(crate) fn postpone(&mut self, meta: &MetaCall, rhs: &Term, typ: Option<&Term>) {
        let eqn = self.create_eqn(meta, rhs, typ);
        self.postponed += 1;
        self.state.add_eqn(eqn);
    }

    /// Run `f` with a fresh variable of type `typ` in scope.
    pub(crate) fn with_fresh<O>(&mut self, hint: &str, typ: Term, f: impl FnOnce(&mut Self, Term) -> O) -> O {
        let var = self.state.names.fresh(hint);
        let term = Term::free(&var);
        self.bind_single(var, typ, |this| f(this, term))
    }

    /// A fresh type metavariable over the current context.
    pub(crate) fn fresh_type_meta(&mut self, name: &str) -> Term {
        let meta = self.state.fresh_meta(name, self.pos, self.ctx.len(), Requirement::IsType);
        Term::Meta(MetaCall { meta, args: self.ctx.as_args() })
    }

    /// Run `f` assuming `lhs` and `rhs` are the same point of the interval.
    ///
    /// Returns `None` if they are not interval variables or endpoints.
    pub(crate) fn with_connection<O>(&mut self, lhs: &Term, rhs: &Term, f: impl FnOnce(&mut Self) -> O) -> Option<O> {
        let lhs = self.whnf(lhs);
        let rhs = self.whnf(rhs);
        let is_atom = |t: &Term| matches!(t, Term::Free(_) | Term::Dim(_));
        if !is_atom(&lhs) || !is_atom(&rhs) {
            return None;
        }
        self.state.connect(&lhs, &rhs);
        let res = f(self);
        self.state.disconnect(&lhs, &rhs);
        Some(res)
    }

    fn with_ordering<O>(&mut self, cmp: Ordering, f: impl FnOnce(&mut Self) -> O) -> O {
        let saved = std::mem::replace(&mut self.cmp, cmp);
        let res = f(self);
        self.cmp = saved;
        res
    }

    /// Run `f` with the ordering inverted.
    fn swapped<O>(&mut self, f: impl FnOnce(&mut Self) -> O) -> O {
        self.with_ordering(self.cmp.invert(), f)
    }

    /// Run `f` without solving metavariables.
    fn without_solving<O>(&mut self, f: impl FnOnce(&mut Self) -> O) -> O {
        let saved = self.solve_meta;
        self.solve_meta = false;
        let res = f(self);
        self.solve_meta = saved;
        res
    }

    /// Run `f` in the context and ordering an equation was created with.
    fn in_eqn_scope<O>(&mut self, eqn: &Eqn, f: impl FnOnce(&mut Self) -> O) -> O {
        let ctx = std::mem::replace(&mut self.ctx, eqn.ctx.clone());
        let cmp = std::mem::replace(&mut self.cmp, eqn.cmp);
        let res = f(self);
        self.ctx = ctx;
        self.cmp = cmp;
        res
    }

    /// The type of a metavariable application, if its requirement determines one.
    pub(crate) fn meta_type(&self, call: &MetaCall) -> Option<Term> {
        match &call.meta.req {
            Requirement::OfType(typ) => self.app_type(&call.meta, typ, &call.args),
            _ => None,
        }
    }

    /// Instantiate the type of a metavariable with its spine.
    ///
    /// Arguments beyond the context of the metavariable are applied to the function type
    /// the instantiated type has to be.
    pub(crate) fn app_type(&self, meta: &MetaVar, typ: &Term, args: &[Term]) -> Option<Term> {
        let (ctx, rest) = args.split_at(meta.ctx_size.min(args.len()));
        let mut typ = typ.instantiate(ctx);
        for arg in rest {
            match self.whnf(&typ) {
                Term::DepType(DepTypeTerm { kind: DTKind::Pi, body, .. }) => typ = body.apply(arg.clone()),
                _ => return None,
            }
        }
        Some(typ)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::BufferedReporter;
    use crate::test_util::*;

    struct Fixture {
        state: TyckState,
        ctx: LocalCtx,
        reporter: BufferedReporter,
    }

    impl Fixture {
        fn new() -> Self {
            init_logging();
            Fixture { state: TyckState::new(), ctx: LocalCtx::new(), reporter: BufferedReporter::new() }
        }

        /// Bring a fresh variable of type `typ` into scope.
        fn var(&mut self, name: &str, typ: Term) -> Term {
            let var = self.state.names.fresh(name);
            self.ctx.push(var.clone(), typ);
            Term::free(&var)
        }

        fn meta(&self, name: &str, req: Requirement) -> MetaVar {
            self.state.fresh_meta(name, None, 0, req)
        }

        fn unifier(&mut self, cmp: Ordering) -> Unifier<'_> {
            Unifier::new(&mut self.state, self.ctx.clone(), &mut self.reporter, None, cmp)
        }

        fn compare(&mut self, lhs: &Term, rhs: &Term, typ: Option<&Term>) -> Decision {
            self.unifier(Ordering::Eq).compare(lhs, rhs, typ)
        }

        fn problems(&self) -> &[Box<TypeError>] {
            self.reporter.problems()
        }
    }

    fn lam(body: Term) -> Term {
        Term::Lam(LamTerm { body: Closure::Idx(Box::new(body)) })
    }

    fn call(meta: &MetaVar, args: Vec<Term>) -> Term {
        Term::Meta(MetaCall { meta: meta.clone(), args })
    }

    fn type1() -> Term {
        Term::Sort(SortTerm::TYPE0.succ())
    }

    /// Check that `[x : Nat] |- x =? x` holds.
    #[test]
    fn convert_var_var_1() {
        let sig = Sig::new();
        let mut fx = Fixture::new();
        let x = fx.var("x", sig.nat());
        assert_eq!(fx.compare(&x, &x, None), Decision::Yes);
    }

    /// Check that `[x y : Nat] |- suc x =? suc y` does not hold, and that the failure
    /// points at the variables.
    #[test]
    fn convert_var_var_2() {
        let sig = Sig::new();
        let mut fx = Fixture::new();
        let x = fx.var("x", sig.nat());
        let y = fx.var("y", sig.nat());
        let mut unifier = fx.unifier(Ordering::Eq);
        assert_eq!(unifier.compare(&sig.suc(x.clone()), &sig.suc(y.clone()), Some(&sig.nat())), Decision::No);
        assert_eq!(unifier.get_failure(), Some(FailureData { lhs: x, rhs: y }));
    }

    /// Check that `\y. suc y =? \y. id Nat (suc y) : Nat -> Nat` holds.
    #[test]
    fn convert_eta_equal_lambdas() {
        let sig = Sig::new();
        let mut fx = Fixture::new();
        let typ = DepTypeTerm::pi(sig.nat(), Closure::constant(sig.nat()));
        let lhs = lam(sig.suc(local(0)));
        let rhs = lam(sig.id(sig.nat(), sig.suc(local(0))));
        assert_eq!(fx.compare(&lhs, &rhs, Some(&typ)), Decision::Yes);
    }

    /// Check that `[f : Nat -> Nat] |- \y. f y =? f` holds.
    #[test]
    fn convert_eta_function() {
        let sig = Sig::new();
        let mut fx = Fixture::new();
        let typ = DepTypeTerm::pi(sig.nat(), Closure::constant(sig.nat()));
        let f = fx.var("f", typ.clone());
        let expanded = lam(Term::App(AppTerm { fun: Box::new(f.clone()), arg: Box::new(local(0)) }));
        assert_eq!(fx.compare(&expanded, &f, Some(&typ)), Decision::Yes);
        assert_eq!(fx.compare(&f, &expanded, Some(&typ)), Decision::Yes);
    }

    /// Check that `[p : Nat * Nat] |- (p.0, p.1) =? p` holds.
    #[test]
    fn convert_eta_pair() {
        let sig = Sig::new();
        let mut fx = Fixture::new();
        let typ = DepTypeTerm::sigma(sig.nat(), Closure::constant(sig.nat()));
        let p = fx.var("p", typ.clone());
        let proj = |index| Term::Proj(ProjTerm { of: Box::new(p.clone()), index });
        let expanded = Term::Tup(TupTerm { lhs: Box::new(proj(0)), rhs: Box::new(proj(1)) });
        assert_eq!(fx.compare(&expanded, &p, Some(&typ)), Decision::Yes);
    }

    /// Check that `[p : Path Nat 0 0] |- \i. p @ i =? p` holds.
    #[test]
    fn convert_eta_path() {
        let sig = Sig::new();
        let mut fx = Fixture::new();
        let typ = Term::Eq(EqTerm {
            a: Closure::constant(sig.nat()),
            lhs: Box::new(sig.zero()),
            rhs: Box::new(sig.zero()),
        });
        let p = fx.var("p", typ.clone());
        let expanded = lam(Term::PApp(PAppTerm {
            fun: Box::new(p.clone()),
            arg: Box::new(local(0)),
            a0: Box::new(sig.zero()),
            a1: Box::new(sig.zero()),
        }));
        assert_eq!(fx.compare(&expanded, &p, Some(&typ)), Decision::Yes);
    }

    /// Whatever `a =? b` decides under `Eq`, `b =? a` decides the same.
    #[test]
    fn equality_is_symmetric() {
        let sig = Sig::new();
        let mut fx = Fixture::new();
        let nat_to_nat = DepTypeTerm::pi(sig.nat(), Closure::constant(sig.nat()));
        let f = fx.var("f", nat_to_nat.clone());
        let x = fx.var("x", sig.nat());
        let eta = lam(Term::App(AppTerm { fun: Box::new(f.clone()), arg: Box::new(local(0)) }));
        let pointed = Term::Class(sig.pointed(vec![sig.zero()]));
        let cases = [
            (sig.lit(2), sig.suc(sig.suc(sig.zero())), Some(sig.nat())),
            (sig.id(sig.nat(), x.clone()), x.clone(), None),
            (eta, f, Some(nat_to_nat)),
            (sig.new_pointed(sig.zero(), sig.lit(1)), sig.new_pointed(sig.lit(3), sig.lit(1)), Some(pointed)),
            (sig.suc(x.clone()), sig.lit(1), Some(sig.nat())),
            (Term::TYPE0, type1(), None),
        ];
        for (a, b, typ) in &cases {
            let there = fx.compare(a, b, typ.as_ref());
            let back = fx.compare(b, a, typ.as_ref());
            assert_eq!(there, back, "{} vs {}", a.print_trace(), b.print_trace());
        }
    }

    /// A term is always equal to its weak-head normal form, coercions along type formers
    /// included.
    #[test]
    fn whnf_preserves_equality() {
        let sig = Sig::new();
        let mut fx = Fixture::new();
        let family_type = DepTypeTerm::pi(Term::DimTy(DimTyTerm), Closure::constant(Term::TYPE0));
        let a = fx.var("A", family_type);
        let x = fx.var("x", sig.nat());
        let j = fx.var("j", Term::DimTy(DimTyTerm));
        // \i. A i -> A i and \i. A i ** A i
        let family = |kind: DTKind| {
            let a = a.clone();
            Closure::native(move |i| {
                let ai = AppTerm::make(a.clone(), i);
                Term::DepType(DepTypeTerm { kind, param: Box::new(ai.clone()), body: Closure::constant(ai) })
            })
        };
        let coe = |kind| Term::Coe(CoeTerm::new(family(kind), Term::Dim(DimTerm::I0), Term::Dim(DimTerm::I1)));
        let terms = [
            coe(DTKind::Pi),
            coe(DTKind::Sigma),
            sig.id(sig.nat(), sig.suc(x.clone())),
            Term::Coe(CoeTerm::new(Closure::constant(sig.nat()), j.clone(), j)),
        ];
        for term in &terms {
            let whnf = fx.state.whnf(term);
            assert_eq!(fx.compare(&whnf, term, None), Decision::Yes, "{}", term.print_trace());
        }
        assert!(fx.reporter.is_empty());
    }

    #[test]
    fn literals_agree_with_constructors() {
        let sig = Sig::new();
        let mut fx = Fixture::new();
        let two = sig.suc(sig.suc(sig.zero()));
        assert_eq!(fx.compare(&sig.lit(2), &two, Some(&sig.nat())), Decision::Yes);
        assert_eq!(fx.compare(&two, &sig.lit(2), None), Decision::Yes);
        assert_eq!(fx.compare(&sig.lit(1), &two, Some(&sig.nat())), Decision::No);

        let list = sig.list_lit(sig.nat(), vec![sig.zero()]);
        let conses = sig.cons(sig.nat(), sig.zero(), sig.nil(sig.nat()));
        assert_eq!(fx.compare(&list, &conses, Some(&sig.list(sig.nat()))), Decision::Yes);
    }

    #[test]
    fn primitives_reduce_before_comparison() {
        let mut fx = Fixture::new();
        let concat = Term::Prim(PrimCall { id: PrimId::StringConcat, ulift: 0, args: vec![string("a"), string("b")] });
        assert_eq!(fx.compare(&concat, &string("ab"), Some(&PrimCall::string())), Decision::Yes);
        assert_eq!(fx.compare(&concat, &string("ba"), Some(&PrimCall::string())), Decision::No);
    }

    /// `Type 0 <= Type 1` holds, `Type 1 <= Type 0` is a level error.
    #[test]
    fn compare_sort_respects_cumulativity() {
        let mut fx = Fixture::new();
        let type0 = SortTerm::TYPE0;
        let type1 = type0.succ();
        let mut unifier = fx.unifier(Ordering::Lt);
        assert!(unifier.compare_sort(type0, type1));
        assert!(!unifier.compare_sort(type1, type0));
        assert!(matches!(fx.problems(), [err] if matches!(**err, TypeError::LevelError { .. })));
    }

    #[test]
    fn sorts_are_only_equal_to_themselves() {
        let mut fx = Fixture::new();
        assert_eq!(fx.compare(&Term::TYPE0, &Term::TYPE0, None), Decision::Yes);
        assert_eq!(fx.compare(&Term::TYPE0, &type1(), None), Decision::No);
        assert_eq!(fx.unifier(Ordering::Lt).compare(&Term::TYPE0, &type1(), None), Decision::Yes);
        assert_eq!(fx.unifier(Ordering::Gt).compare(&type1(), &Term::TYPE0, None), Decision::Yes);
    }

    /// Function type domains are compared in the same direction as the function types.
    #[test]
    fn pi_domains_follow_the_ordering() {
        let sig = Sig::new();
        let mut fx = Fixture::new();
        let from = |dom: Term| DepTypeTerm::pi(dom, Closure::constant(sig.nat()));
        assert_eq!(fx.unifier(Ordering::Lt).compare(&from(Term::TYPE0), &from(type1()), None), Decision::Yes);
        assert_eq!(fx.unifier(Ordering::Lt).compare(&from(type1()), &from(Term::TYPE0), None), Decision::No);
        assert_eq!(fx.unifier(Ordering::Gt).compare(&from(type1()), &from(Term::TYPE0), None), Decision::Yes);
    }

    #[test]
    fn derived_unifier_has_its_own_ordering() {
        let sig = Sig::new();
        let mut fx = Fixture::new();
        let x = fx.var("x", sig.nat());
        let mut unifier = fx.unifier(Ordering::Lt);
        assert_eq!(unifier.compare(&Term::TYPE0, &type1(), None), Decision::Yes);
        let mut derived = unifier.derive(None, Ordering::Eq);
        assert_eq!(derived.compare(&Term::TYPE0, &type1(), None), Decision::No);
        assert_eq!(derived.compare_untyped(&x, &x), RelDec::Yes(sig.nat()));
    }

    /// A class type fixing more members is a subtype of one fixing fewer.
    #[test]
    fn class_types_are_ordered_by_fixed_members() {
        let sig = Sig::new();
        let mut fx = Fixture::new();
        let fixed = Term::Class(sig.pointed(vec![sig.zero()]));
        let open = Term::Class(sig.pointed(vec![]));
        assert_eq!(fx.unifier(Ordering::Lt).compare(&fixed, &open, None), Decision::Yes);
        assert_eq!(fx.unifier(Ordering::Lt).compare(&open, &fixed, None), Decision::No);
        assert_eq!(fx.compare(&fixed, &open, None), Decision::No);
        let other = Term::Class(sig.pointed(vec![sig.lit(1)]));
        assert_eq!(fx.compare(&fixed, &other, None), Decision::No);
    }

    /// Instances only need to agree on the members their type leaves open.
    #[test]
    fn instances_compare_by_open_members() {
        let sig = Sig::new();
        let mut fx = Fixture::new();
        let lhs = sig.new_pointed(sig.zero(), sig.zero());
        let rhs = sig.new_pointed(sig.lit(1), sig.zero());
        let pt_fixed = Term::Class(sig.pointed(vec![sig.zero()]));
        let open = Term::Class(sig.pointed(vec![]));
        assert_eq!(fx.compare(&lhs, &rhs, Some(&pt_fixed)), Decision::Yes);
        assert_eq!(fx.compare(&lhs, &rhs, Some(&open)), Decision::No);
    }

    /// On an impossible face, every two partial elements are equal.
    #[test]
    fn partial_elements_on_faces() {
        let sig = Sig::new();
        let mut fx = Fixture::new();
        let i = fx.var("i", Term::DimTy(DimTyTerm));
        let partial = |lhs: Term, rhs: Term| Term::PartialTy(PartialTyTerm {
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
            typ: Box::new(sig.nat()),
        });
        let elem = |t: Term| Term::Partial(PartialTerm { element: Box::new(t) });
        let i0 = Term::Dim(DimTerm::I0);
        let i1 = Term::Dim(DimTerm::I1);

        let nowhere = partial(i0.clone(), i1);
        assert_eq!(fx.compare(&elem(sig.zero()), &elem(sig.lit(1)), Some(&nowhere)), Decision::Yes);
        let at_i0 = partial(i.clone(), i0.clone());
        assert_eq!(fx.compare(&elem(sig.zero()), &elem(sig.lit(1)), Some(&at_i0)), Decision::No);
        assert!(!fx.state.is_connected(&i, &i0));
    }

    /// Partial types are equal if their faces entail each other.
    #[test]
    fn partial_types_compare_faces() {
        let sig = Sig::new();
        let mut fx = Fixture::new();
        let i = fx.var("i", Term::DimTy(DimTyTerm));
        let j = fx.var("j", Term::DimTy(DimTyTerm));
        let partial = |lhs: Term, rhs: Term| Term::PartialTy(PartialTyTerm {
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
            typ: Box::new(sig.nat()),
        });
        let i0 = Term::Dim(DimTerm::I0);
        assert_eq!(fx.compare(&partial(i.clone(), i0.clone()), &partial(i0.clone(), i.clone()), None), Decision::Yes);
        assert_eq!(fx.compare(&partial(i, i0.clone()), &partial(j, i0), None), Decision::No);
    }

    /// `?m x y =? x` is solved by `?m := \a b. a`.
    #[test]
    fn pattern_unification() {
        let sig = Sig::new();
        let mut fx = Fixture::new();
        let x = fx.var("x", sig.nat());
        let y = fx.var("y", sig.nat());
        let m = fx.meta("m", Requirement::Whatever);
        let lhs = call(&m, vec![x.clone(), y]);
        assert_eq!(fx.compare(&lhs, &x, None), Decision::Yes);
        assert_eq!(fx.state.solution(&m), Some(&LamTerm::make(2, local(1))));
        assert_eq!(fx.compare(&lhs, &x, None), Decision::Yes);
        assert!(fx.reporter.is_empty());
    }

    /// `?m x x =? x` has two solutions.
    #[test]
    fn duplicate_spine_is_rejected() {
        let sig = Sig::new();
        let mut fx = Fixture::new();
        let x = fx.var("x", sig.nat());
        let m = fx.meta("m", Requirement::Whatever);
        let cfg = UnifierCfg { allow_delay: false, allow_vague: false };
        let decision = fx.unifier(Ordering::Eq).with_cfg(cfg).compare(&call(&m, vec![x.clone(), x.clone()]), &x, None);
        assert_eq!(decision, Decision::No);
        assert!(matches!(fx.problems(), [err] if matches!(**err, TypeError::BadSpine { .. })));
        assert!(!fx.state.is_solved(&m));
    }

    /// `?m x =? y` cannot be solved, `y` is not in scope of `?m`.
    #[test]
    fn out_of_scope_variables_are_rejected() {
        let sig = Sig::new();
        let mut fx = Fixture::new();
        let x = fx.var("x", sig.nat());
        let y = fx.var("y", sig.nat());
        let m = fx.meta("m", Requirement::Whatever);
        assert_eq!(fx.compare(&call(&m, vec![x]), &y, None), Decision::No);
        assert!(matches!(fx.problems(), [err] if matches!(**err, TypeError::BadlyScoped { .. })));
    }

    /// `?m x =? suc (?n y)` cannot be solved without postponing: `y` only occurs in the
    /// spine of `?n`, which may or may not use it.
    #[test]
    fn variables_in_other_spines_are_rejected_without_delay() {
        let sig = Sig::new();
        let mut fx = Fixture::new();
        let x = fx.var("x", sig.nat());
        let y = fx.var("y", sig.nat());
        let m = fx.meta("m", Requirement::Whatever);
        let n = fx.meta("n", Requirement::Whatever);
        let lhs = call(&m, vec![x]);
        let rhs = sig.suc(call(&n, vec![y]));

        let cfg = UnifierCfg { allow_delay: false, allow_vague: false };
        assert_eq!(fx.unifier(Ordering::Eq).with_cfg(cfg).compare(&lhs, &rhs, None), Decision::No);
        assert!(matches!(fx.problems(), [err] if matches!(**err, TypeError::BadlyScoped { .. })));
        assert!(!fx.state.is_solved(&m));

        assert_eq!(fx.compare(&lhs, &rhs, None), Decision::Unsure);
        assert_eq!(fx.state.eqns().len(), 1);
    }

    /// `?m x =? suc (?m x)` fails the occurs check.
    #[test]
    fn recursive_solutions_are_rejected() {
        let sig = Sig::new();
        let mut fx = Fixture::new();
        let x = fx.var("x", sig.nat());
        let m = fx.meta("m", Requirement::Whatever);
        let lhs = call(&m, vec![x]);
        assert_eq!(fx.compare(&lhs, &sig.suc(lhs.clone()), None), Decision::No);
        assert!(matches!(fx.problems(), [err] if matches!(**err, TypeError::Recursion { .. })));
    }

    /// `opaque ?m =? opaque zero` solves `?m` by comparing the arguments.
    #[test]
    fn approximation_solves_arguments() {
        let sig = Sig::new();
        let mut fx = Fixture::new();
        let m = fx.meta("m", Requirement::Whatever);
        let lhs = sig.opaque(call(&m, vec![]));
        assert_eq!(fx.compare(&lhs, &sig.opaque(sig.zero()), Some(&sig.nat())), Decision::Yes);
        assert_eq!(fx.state.solution(&m), Some(&sig.zero()));
        assert!(fx.state.eqns().is_empty());
    }

    /// When the approximation fails, both sides are unfolded.
    #[test]
    fn approximation_falls_back_to_unfolding() {
        let sig = Sig::new();
        let mut fx = Fixture::new();
        let x = fx.var("x", sig.nat());
        let lhs = sig.id(sig.nat(), sig.id(sig.nat(), x.clone()));
        let rhs = sig.id(sig.nat(), x);
        assert_eq!(fx.compare(&lhs, &rhs, Some(&sig.nat())), Decision::Yes);
        assert_eq!(fx.compare(&sig.opaque(sig.zero()), &sig.opaque(sig.lit(1)), None), Decision::No);
    }

    /// Of two metavariables, the one with the weaker requirement is solved.
    #[test]
    fn metas_solve_by_requirement() {
        let sig = Sig::new();
        let mut fx = Fixture::new();
        let whatever = fx.meta("a", Requirement::Whatever);
        let typed = fx.meta("b", Requirement::OfType(Box::new(sig.nat())));
        assert_eq!(fx.compare(&call(&typed, vec![]), &call(&whatever, vec![]), None), Decision::Yes);
        assert!(fx.state.is_solved(&whatever));
        assert!(!fx.state.is_solved(&typed));

        let l = fx.meta("l", Requirement::Whatever);
        let r = fx.meta("r", Requirement::Whatever);
        assert_eq!(fx.compare(&call(&l, vec![]), &call(&r, vec![]), None), Decision::Yes);
        assert!(fx.state.is_solved(&r));
        assert!(!fx.state.is_solved(&l));
    }

    #[test]
    fn type_metas_only_accept_types() {
        let sig = Sig::new();
        let mut fx = Fixture::new();
        let t = fx.meta("T", Requirement::IsType);
        assert_eq!(fx.compare(&call(&t, vec![]), &sig.zero(), None), Decision::No);
        assert!(matches!(fx.problems(), [err] if matches!(**err, TypeError::IllTyped { .. })));
        assert_eq!(fx.compare(&call(&t, vec![]), &sig.nat(), None), Decision::Yes);
        assert_eq!(fx.state.solution(&t), Some(&sig.nat()));
    }

    #[test]
    fn typed_metas_report_their_type() {
        let sig = Sig::new();
        let mut fx = Fixture::new();
        let n = fx.meta("n", Requirement::OfType(Box::new(sig.nat())));
        let result = fx.unifier(Ordering::Eq).compare_untyped(&call(&n, vec![]), &sig.zero());
        assert_eq!(result, RelDec::Yes(sig.nat()));
        assert_eq!(fx.state.solution(&n), Some(&sig.zero()));
    }

    #[test]
    fn check_eqn_solves_the_equation() {
        let sig = Sig::new();
        let mut fx = Fixture::new();
        let x = fx.var("x", sig.nat());
        let m = fx.meta("m", Requirement::Whatever);
        let Term::Meta(lhs) = call(&m, vec![x.clone()]) else { unreachable!() };
        let mut unifier = fx.unifier(Ordering::Eq);
        let eqn = unifier.create_eqn(&lhs, &sig.suc(x), None);
        assert_eq!(unifier.check_eqn(&eqn), Decision::Yes);
        assert_eq!(fx.state.solution(&m), Some(&LamTerm::make(1, sig.suc(local(0)))));
    }

    /// `?m (suc x) =? zero` is postponed, and solved outside the pattern fragment at the end.
    #[test]
    fn postponed_equations_are_solved_at_the_end() {
        let sig = Sig::new();
        let mut fx = Fixture::new();
        let x = fx.var("x", sig.nat());
        let m = fx.meta("m", Requirement::Whatever);
        assert_eq!(fx.compare(&call(&m, vec![sig.suc(x)]), &sig.zero(), None), Decision::Unsure);
        assert_eq!(fx.state.eqns().len(), 1);
        assert!(!fx.state.is_solved(&m));

        fx.state.solve_metas(&mut fx.reporter);
        assert_eq!(fx.state.solution(&m), Some(&LamTerm::make(1, sig.zero())));
        assert!(fx.state.eqns().is_empty());
        assert!(matches!(fx.problems(), [err] if matches!(**err, TypeError::VagueSolution { .. })));
    }

    /// `?m (suc x) =? y` stays unsolvable.
    #[test]
    fn stuck_equations_are_reported() {
        let sig = Sig::new();
        let mut fx = Fixture::new();
        let x = fx.var("x", sig.nat());
        let y = fx.var("y", sig.nat());
        let m = fx.meta("m", Requirement::Whatever);
        assert_eq!(fx.compare(&call(&m, vec![sig.suc(x)]), &y, None), Decision::Unsure);

        fx.state.solve_metas(&mut fx.reporter);
        assert!(!fx.state.is_solved(&m));
        assert!(matches!(
            fx.problems(),
            [scope, stuck]
                if matches!(**scope, TypeError::BadlyScoped { .. })
                    && matches!(**stuck, TypeError::CannotSolveEquations { count: 1, .. })
        ));
    }
}
