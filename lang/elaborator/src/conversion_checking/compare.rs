use log::trace;

use ast::*;
use printer::Print;

use crate::result::{TypeError, impossible};
use crate::typechecker::Synthesizer;

use super::{Ordering, Unifier};

impl Unifier<'_> {
    /// Returns whether `lhs` and `rhs` are the same. Solves metavariables on the way.
    pub(super) fn compare_inner(&mut self, pre_lhs: &Term, pre_rhs: &Term, typ: Option<&Term>) -> bool {
        trace!(
            "{} |- {} {} {}{}",
            self.ctx.print_trace(),
            pre_lhs.print_trace(),
            self.cmp.symbol(),
            pre_rhs.print_trace(),
            typ.map(|typ| format!(" : {}", typ.print_trace())).unwrap_or_default()
        );
        if pre_lhs == pre_rhs {
            return true;
        }
        if self.check_approx_result(typ, pre_lhs, pre_rhs) {
            return true;
        }
        let lhs = self.whnf(pre_lhs);
        let rhs = self.whnf(pre_rhs);
        if (lhs != *pre_lhs || rhs != *pre_rhs) && (lhs == rhs || self.check_approx_result(typ, &lhs, &rhs)) {
            return true;
        }

        match (&lhs, &rhs) {
            // Solve the metavariable whose requirement says less, the right one on ties.
            (Term::Meta(l), Term::Meta(r)) if l.meta.req.rank() < r.meta.req.rank() => {
                return self.solve_meta(l, &rhs, typ).is_some();
            }
            (_, Term::Meta(r)) => return self.swapped(|this| this.solve_meta(r, &lhs, typ)).is_some(),
            (Term::Meta(l), _) => return self.solve_meta(l, &rhs, typ).is_some(),
            _ => {}
        }

        let ok = match typ {
            None => self.compare_untyped_inner(&lhs, &rhs).is_some(),
            Some(typ) => {
                let typ = self.whnf(typ);
                self.do_compare_typed(&lhs, &rhs, &typ)
            }
        };
        if !ok {
            self.fail_with(&lhs, &rhs);
        }
        ok
    }

    /// Run the approximate pass and, if it succeeds, check the type it found against `typ`.
    fn check_approx_result(&mut self, typ: Option<&Term>, lhs: &Term, rhs: &Term) -> bool {
        let Some(approx) = self.compare_approx(lhs, rhs) else { return false };
        // Only done for the side effect of solving metavariables in the types.
        if let Some(typ) = typ {
            if !matches!(lhs, Term::Meta(_)) {
                self.compare_inner(&approx, typ, None);
            }
        }
        true
    }

    /// Compare calls with the same head by their arguments, without unfolding anything.
    ///
    /// Metavariables met on the way are not solved. Their equations are collected and only
    /// solved once the whole pass succeeded.
    fn compare_approx(&mut self, lhs: &Term, rhs: &Term) -> Option<Term> {
        let same_head = match (lhs, rhs) {
            (Term::Fn(l), Term::Fn(r)) => l.def == r.def,
            (Term::Prim(l), Term::Prim(r)) => l.id == r.id,
            (Term::Con(l), Term::Con(r)) => l.con == r.con,
            (Term::Int(_), Term::Int(_)) => true,
            (Term::Meta(l), Term::Meta(r)) => l.meta == r.meta,
            _ => false,
        };
        if !same_head {
            return None;
        }

        let failure = self.failure.take();
        self.approx_batches.push(Vec::new());
        let result = self.without_solving(|this| this.do_compare_approx(lhs, rhs));
        let batch = self.approx_batches.pop().unwrap_or_default();
        // The approximate pass never reports a failure of its own.
        self.failure = failure;

        let typ = result?;
        match self.approx_batches.last_mut() {
            Some(outer) => outer.extend(batch),
            None if self.solve_meta => {
                trace!("Solving {} equations of the approximate pass", batch.len());
                for eqn in &batch {
                    let ok = self.in_eqn_scope(eqn, |this| {
                        this.compare_inner(&Term::Meta(eqn.lhs.clone()), &eqn.rhs, eqn.typ.as_ref())
                    });
                    if !ok {
                        self.failure = None;
                        return None;
                    }
                }
            }
            None => {}
        }
        Some(typ)
    }

    fn do_compare_approx(&mut self, lhs: &Term, rhs: &Term) -> Option<Term> {
        match (lhs, rhs) {
            (Term::Fn(l), Term::Fn(r)) => self.compare_many(&l.args, &r.args, l.ulift, &l.def.signature),
            (Term::Prim(l), Term::Prim(r)) => self.compare_many(&l.args, &r.args, l.ulift, &l.id.signature()),
            (Term::Con(l), Term::Con(r)) => self.compare_con(l, r),
            (Term::Int(l), Term::Int(r)) => (l.repr == r.repr).then(|| Term::Data(l.typ.clone())),
            (Term::Meta(l), Term::Meta(r)) => {
                if l.args.len() != r.args.len() {
                    return None;
                }
                for (l_arg, r_arg) in l.args.iter().zip(&r.args) {
                    if !self.compare_inner(l_arg, r_arg, None) {
                        return None;
                    }
                }
                Some(self.meta_type(l).unwrap_or(Term::TYPE0))
            }
            _ => None,
        }
    }

    /// Record an equation of the approximate pass instead of solving it.
    pub(super) fn record_approx_eqn(&mut self, meta: &MetaCall, rhs: &Term, typ: Option<&Term>) -> Option<Term> {
        let result_type = typ.cloned().or_else(|| self.meta_type(meta))?;
        let eqn = self.create_eqn(meta, rhs, typ);
        self.approx_batches.last_mut()?.push(eqn);
        Some(result_type)
    }

    fn compare_con(&mut self, lhs: &ConCall, rhs: &ConCall) -> Option<Term> {
        if lhs.con != rhs.con {
            return None;
        }
        self.compare_many(&lhs.full_args(), &rhs.full_args(), lhs.ulift, &lhs.con.signature)
    }

    /// Compare two telescopes of arguments. Returns the result type of the signature.
    pub(super) fn compare_many(&mut self, lhs: &[Term], rhs: &[Term], ulift: u32, sig: &Signature) -> Option<Term> {
        if lhs.len() != rhs.len() || lhs.len() != sig.arity() {
            return None;
        }
        let mut args = Vec::with_capacity(lhs.len());
        for (i, (l, r)) in lhs.iter().zip(rhs).enumerate() {
            let typ = self.whnf(&sig.param(i, &args).elevate(ulift));
            if !self.compare_inner(l, r, Some(&typ)) {
                return None;
            }
            args.push(l.clone());
        }
        Some(self.whnf(&sig.result(&args).elevate(ulift)))
    }

    /// Compare at a type in weak-head normal form.
    fn do_compare_typed(&mut self, lhs: &Term, rhs: &Term, typ: &Term) -> bool {
        match typ {
            Term::Lam(_) | Term::Con(_) | Term::Tup(_) | Term::New(_) => {
                impossible(format!("{} is used as a type", typ.print_trace()), self.pos)
            }
            Term::Class(class) => self.compare_members(lhs, rhs, class),
            Term::DepType(dt) if dt.kind == DTKind::Pi => match (lhs, rhs) {
                (Term::Lam(l), Term::Lam(r)) => self.with_fresh("x", (*dt.param).clone(), |this, x| {
                    let typ = dt.body.apply(x.clone());
                    this.compare_inner(&l.body.apply(x.clone()), &r.body.apply(x), Some(&typ))
                }),
                (Term::Lam(lam), other) | (other, Term::Lam(lam)) => {
                    let lam_is_lhs = matches!(lhs, Term::Lam(_));
                    self.with_fresh("x", (*dt.param).clone(), |this, x| {
                        let typ = dt.body.apply(x.clone());
                        let body = lam.body.apply(x.clone());
                        let applied = AppTerm::make(other.clone(), x);
                        if lam_is_lhs {
                            this.compare_inner(&body, &applied, Some(&typ))
                        } else {
                            this.compare_inner(&applied, &body, Some(&typ))
                        }
                    })
                }
                _ => self.compare_untyped_inner(lhs, rhs).is_some(),
            },
            Term::Eq(eq) => match (lhs, rhs) {
                (Term::Lam(l), Term::Lam(r)) => self.with_fresh("i", Term::DimTy(DimTyTerm), |this, i| {
                    let typ = eq.app_a(i.clone());
                    this.compare_inner(&l.body.apply(i.clone()), &r.body.apply(i), Some(&typ))
                }),
                (Term::Lam(lam), other) | (other, Term::Lam(lam)) => {
                    let lam_is_lhs = matches!(lhs, Term::Lam(_));
                    self.with_fresh("i", Term::DimTy(DimTyTerm), |this, i| {
                        let typ = eq.app_a(i.clone());
                        let body = lam.body.apply(i.clone());
                        let applied =
                            PAppTerm::make(other.clone(), i, (*eq.lhs).clone(), (*eq.rhs).clone());
                        if lam_is_lhs {
                            this.compare_inner(&body, &applied, Some(&typ))
                        } else {
                            this.compare_inner(&applied, &body, Some(&typ))
                        }
                    })
                }
                _ => self.compare_untyped_inner(lhs, rhs).is_some(),
            },
            Term::DepType(dt) => {
                let l0 = ProjTerm::make(lhs.clone(), 0);
                let r0 = ProjTerm::make(rhs.clone(), 0);
                if !self.compare_inner(&l0, &r0, Some(&dt.param)) {
                    return false;
                }
                let snd = dt.body.apply(l0);
                self.compare_inner(&ProjTerm::make(lhs.clone(), 1), &ProjTerm::make(rhs.clone(), 1), Some(&snd))
            }
            Term::PartialTy(pt) => match (lhs, rhs) {
                (Term::Partial(l), Term::Partial(r)) => self
                    .with_connection(&pt.lhs, &pt.rhs, |this| {
                        this.state.is_inconsistent() || this.compare_inner(&l.element, &r.element, Some(&pt.typ))
                    })
                    .unwrap_or_else(|| self.compare_inner(&l.element, &r.element, Some(&pt.typ))),
                _ => self.compare_untyped_inner(lhs, rhs).is_some(),
            },
            _ => self.compare_untyped_inner(lhs, rhs).is_some(),
        }
    }

    /// Instances of a class are equal if all members not fixed by the class type are.
    fn compare_members(&mut self, lhs: &Term, rhs: &Term, class: &ClassCall) -> bool {
        if class.is_complete() {
            return true;
        }
        for index in class.args.len()..class.class.members.len() {
            let l = MemberCall::make(lhs.clone(), class.class.clone(), index, class.ulift);
            let r = MemberCall::make(rhs.clone(), class.class.clone(), index, class.ulift);
            let typ = class.class.members[index].typ.apply(lhs.clone()).elevate(class.ulift);
            if !self.compare_inner(&l, &r, Some(&typ)) {
                return false;
            }
        }
        true
    }

    /// Compare without type information. Returns the type of both sides.
    pub(super) fn compare_untyped_inner(&mut self, pre_lhs: &Term, pre_rhs: &Term) -> Option<Term> {
        if let Some(typ) = self.compare_approx(pre_lhs, pre_rhs) {
            return Some(typ);
        }
        let lhs = self.whnf(pre_lhs);
        let rhs = self.whnf(pre_rhs);
        if lhs != *pre_lhs || rhs != *pre_rhs {
            if let Some(typ) = self.compare_approx(&lhs, &rhs) {
                return Some(typ);
            }
        }
        let result = match rhs {
            Term::Meta(_) => self.swapped(|this| this.do_compare_untyped(&rhs, &lhs)),
            _ => self.do_compare_untyped(&lhs, &rhs),
        };
        match result {
            Some(typ) => Some(self.whnf(&typ)),
            None => {
                self.fail_with(&lhs, &rhs);
                None
            }
        }
    }

    fn do_compare_untyped(&mut self, lhs: &Term, rhs: &Term) -> Option<Term> {
        if lhs.is_formation() {
            if !self.do_compare_type(lhs, rhs) {
                return None;
            }
            let lhs = self.state.freeze_holes(lhs);
            return Some(Synthesizer::new(self).synth_dont_normalize(&lhs).unwrap_or(Term::TYPE0));
        }
        match lhs {
            Term::App(AppTerm { fun: l_fun, arg: l_arg }) => {
                let Term::App(AppTerm { fun: r_fun, arg: r_arg }) = rhs else { return None };
                let fun_type = self.compare_untyped_inner(l_fun, r_fun)?;
                let pi = match fun_type {
                    Term::DepType(dt) if dt.kind == DTKind::Pi => dt,
                    Term::Meta(call) => self.split_meta(&call, DTKind::Pi)?,
                    _ => return None,
                };
                if !self.compare_inner(l_arg, r_arg, Some(&pi.param)) {
                    return None;
                }
                Some(pi.body.apply((**l_arg).clone()))
            }
            Term::PApp(PAppTerm { fun: l_fun, arg: l_arg, .. }) => {
                let Term::PApp(PAppTerm { fun: r_fun, arg: r_arg, .. }) = rhs else { return None };
                let Term::Eq(eq) = self.compare_untyped_inner(l_fun, r_fun)? else { return None };
                if !self.compare_inner(l_arg, r_arg, Some(&Term::DimTy(DimTyTerm))) {
                    return None;
                }
                Some(eq.app_a((**l_arg).clone()))
            }
            Term::Coe(l) => {
                let Term::Coe(r) = rhs else { return None };
                let interval = Term::DimTy(DimTyTerm);
                if !self.compare_inner(&l.r, &r.r, Some(&interval)) || !self.compare_inner(&l.s, &r.s, Some(&interval)) {
                    return None;
                }
                let same_family = self.with_fresh("i", interval, |this, i| {
                    this.compare_inner(&l.typ.apply(i.clone()), &r.typ.apply(i), None)
                });
                same_family.then(|| l.family())
            }
            Term::Proj(ProjTerm { of: l_of, index: l_index }) => {
                let Term::Proj(ProjTerm { of: r_of, index: r_index }) = rhs else { return None };
                let Term::DepType(sigma) = self.compare_untyped_inner(l_of, r_of)? else { return None };
                if sigma.kind != DTKind::Sigma || l_index != r_index {
                    return None;
                }
                Some(if *l_index == 0 {
                    *sigma.param
                } else {
                    sigma.body.apply(ProjTerm::make((**l_of).clone(), 0))
                })
            }
            Term::Member(l) => {
                let Term::Member(r) = rhs else { return None };
                if l.class != r.class || l.index != r.index {
                    return None;
                }
                match self.compare_untyped_inner(&l.of, &r.of)? {
                    Term::Class(class) if class.class == l.class => Some(l.member_type()),
                    _ => None,
                }
            }
            Term::Free(FreeTerm { var }) => match rhs {
                Term::Free(FreeTerm { var: other }) if var == other => match self.ctx.get(var) {
                    Some(typ) => Some(typ.clone()),
                    None => self.state.is_connected(lhs, rhs).then_some(Term::DimTy(DimTyTerm)),
                },
                Term::Free(_) | Term::Dim(_) => self.state.is_connected(lhs, rhs).then_some(Term::DimTy(DimTyTerm)),
                _ => None,
            },
            Term::Dim(l) => match rhs {
                Term::Dim(r) => (l == r).then_some(Term::DimTy(DimTyTerm)),
                Term::Free(_) => self.state.is_connected(lhs, rhs).then_some(Term::DimTy(DimTyTerm)),
                _ => None,
            },
            Term::Int(l) => match rhs {
                Term::Int(r) => (l.repr == r.repr).then(|| Term::Data(l.typ.clone())),
                Term::Con(_) => self.compare_untyped_inner(&Term::Con(l.constructor_form()), rhs),
                _ => None,
            },
            Term::List(l) => match rhs {
                Term::List(r) => {
                    if l.repr.len() != r.repr.len() {
                        return None;
                    }
                    for (l_elem, r_elem) in l.repr.iter().zip(&r.repr) {
                        if !self.compare_inner(l_elem, r_elem, None) {
                            return None;
                        }
                    }
                    Some(Term::Data(l.typ.clone()))
                }
                Term::Con(_) => self.compare_untyped_inner(&Term::Con(l.constructor_form()), rhs),
                _ => None,
            },
            Term::Con(l) => match rhs {
                Term::Con(r) => self.compare_con(l, r),
                Term::Int(r) => self.compare_untyped_inner(lhs, &Term::Con(r.constructor_form())),
                Term::List(r) => self.compare_untyped_inner(lhs, &Term::Con(r.constructor_form())),
                _ => None,
            },
            Term::Str(l) => match rhs {
                Term::Str(r) => (l.value == r.value).then(PrimCall::string),
                _ => None,
            },
            Term::New(l) => {
                let Term::New(r) = rhs else { return None };
                let ok = self.with_ordering(Ordering::Eq, |this| this.compare_class_call(&l.inner, &r.inner));
                ok.then(|| Term::Class(l.inner.clone()))
            }
            Term::ClassCast(l) => {
                let Term::ClassCast(r) = rhs else { return None };
                if l.class != r.class || l.remember.len() != r.remember.len() {
                    return None;
                }
                self.compare_untyped_inner(&l.subterm, &r.subterm)?;
                let call = l.class_call();
                for (index, (l_member, r_member)) in l.remember.iter().zip(&r.remember).enumerate() {
                    if !self.compare_member_closures(&call, index, l_member, r_member) {
                        return None;
                    }
                }
                Some(Term::Class(call))
            }
            // Coercions unfold to lambdas and pairs without annotations, so these can meet
            // without a type. The domain is left to a fresh type metavariable.
            Term::Lam(l) => {
                let Term::Lam(r) = rhs else { return None };
                let dom = self.fresh_type_meta("A");
                let var = self.state.names.fresh("x");
                let cod = self.bind_single(var.clone(), dom.clone(), |this| {
                    this.compare_untyped_inner(&l.body.apply_var(&var), &r.body.apply_var(&var))
                })?;
                Some(DepTypeTerm::pi(dom, Closure::Named(Box::new(cod), var)))
            }
            Term::Tup(TupTerm { lhs: l_fst, rhs: l_snd }) => {
                let Term::Tup(TupTerm { lhs: r_fst, rhs: r_snd }) = rhs else { return None };
                let fst = self.compare_untyped_inner(l_fst, r_fst)?;
                let snd = self.compare_untyped_inner(l_snd, r_snd)?;
                Some(DepTypeTerm::sigma(fst, Closure::constant(snd)))
            }
            // The witness is the type of the payload, the face is not known here.
            Term::Partial(l) => {
                let Term::Partial(r) = rhs else { return None };
                self.compare_untyped_inner(&l.element, &r.element)
            }
            Term::Fn(_) | Term::Prim(_) => None,
            Term::Meta(call) => self.solve_meta(call, rhs, None),
            Term::LetFree(_) => impossible("let-bound variable survived weak-head normalization", self.pos),
            Term::Local(_)
            | Term::DepType(_)
            | Term::Sort(_)
            | Term::Eq(_)
            | Term::PartialTy(_)
            | Term::DimTy(_)
            | Term::Data(_)
            | Term::Class(_) => impossible(format!("no rule to compare {} without a type", lhs.print_trace()), self.pos),
        }
    }

    /// The function type an unsolved type metavariable has to be.
    fn split_meta(&mut self, call: &MetaCall, kind: DTKind) -> Option<DepTypeTerm> {
        let dt = {
            let state = &*self.state;
            call.meta.as_dt(&state.names, kind, |t| state.whnf(&t), &call.args)?
        };
        self.compare_inner(&Term::Meta(call.clone()), &Term::DepType(dt.clone()), None).then_some(dt)
    }

    /// Compare two type formers.
    fn do_compare_type(&mut self, lhs: &Term, rhs: &Term) -> bool {
        match (lhs, rhs) {
            (Term::Data(l), Term::Data(r)) => {
                l.data == r.data && self.compare_many(&l.args, &r.args, l.ulift, &l.data.signature).is_some()
            }
            (Term::Class(l), Term::Class(r)) => self.compare_class_call(l, r),
            (Term::DimTy(_), Term::DimTy(_)) => true,
            (Term::DepType(l), Term::DepType(r)) if l.kind == r.kind => {
                self.compare_inner(&l.param, &r.param, None)
                    && self.with_fresh("x", (*l.param).clone(), |this, x| {
                        this.compare_inner(&l.body.apply(x.clone()), &r.body.apply(x), None)
                    })
            }
            (Term::Sort(l), Term::Sort(r)) => self.compare_sort(*l, *r),
            (Term::Eq(l), Term::Eq(r)) => {
                let same_family = self.with_fresh("i", Term::DimTy(DimTyTerm), |this, i| {
                    this.compare_inner(&l.app_a(i.clone()), &r.app_a(i), None)
                });
                same_family
                    && self.compare_inner(&l.lhs, &r.lhs, Some(&l.app_a(Term::Dim(DimTerm::I0))))
                    && self.compare_inner(&l.rhs, &r.rhs, Some(&l.app_a(Term::Dim(DimTerm::I1))))
            }
            (Term::PartialTy(l), Term::PartialTy(r)) => {
                self.compare_inner(&l.typ, &r.typ, None) && self.same_face(l, r)
            }
            (Term::Prim(l), Term::Prim(r)) => l.id == r.id,
            _ => false,
        }
    }

    /// Whether the faces of two partial types entail each other.
    fn same_face(&mut self, lhs: &PartialTyTerm, rhs: &PartialTyTerm) -> bool {
        self.face_entails(lhs, rhs) && self.face_entails(rhs, lhs)
    }

    fn face_entails(&mut self, assumed: &PartialTyTerm, target: &PartialTyTerm) -> bool {
        self.with_connection(&assumed.lhs, &assumed.rhs, |this| {
            let lhs = this.whnf(&target.lhs);
            let rhs = this.whnf(&target.rhs);
            this.state.is_inconsistent() || lhs == rhs || this.state.is_connected(&lhs, &rhs)
        })
        .unwrap_or(false)
    }

    /// Class types are ordered by how many members they fix.
    fn compare_class_call(&mut self, lhs: &ClassCall, rhs: &ClassCall) -> bool {
        if lhs.class != rhs.class {
            return false;
        }
        let counts_ok = match self.cmp {
            Ordering::Eq => lhs.args.len() == rhs.args.len(),
            Ordering::Lt => lhs.args.len() >= rhs.args.len(),
            Ordering::Gt => lhs.args.len() <= rhs.args.len(),
        };
        if !counts_ok {
            return false;
        }
        for (index, (l, r)) in lhs.args.iter().zip(&rhs.args).enumerate() {
            if !self.compare_member_closures(lhs, index, l, r) {
                return false;
            }
        }
        true
    }

    /// Compare the values two class types fix for member `index`, at an arbitrary instance.
    fn compare_member_closures(&mut self, call: &ClassCall, index: usize, lhs: &Closure, rhs: &Closure) -> bool {
        let instance_type = Term::Class(ClassCall { class: call.class.clone(), ulift: call.ulift, args: vec![] });
        self.with_fresh("self", instance_type, |this, instance| {
            let typ = call.class.members[index].typ.apply(instance.clone()).elevate(call.ulift);
            this.compare_inner(&lhs.apply(instance.clone()), &rhs.apply(instance), Some(&typ))
        })
    }

    /// Compare two universes according to the current ordering.
    pub(crate) fn compare_sort(&mut self, lhs: SortTerm, rhs: SortTerm) -> bool {
        let ok = match self.cmp {
            Ordering::Lt => lhs.is_sub(rhs),
            Ordering::Eq => lhs == rhs,
            Ordering::Gt => rhs.is_sub(lhs),
        };
        if !ok {
            let err = match self.cmp {
                Ordering::Gt => TypeError::level_error(rhs, lhs, false, self.pos),
                Ordering::Eq => TypeError::level_error(lhs, rhs, true, self.pos),
                Ordering::Lt => TypeError::level_error(lhs, rhs, false, self.pos),
            };
            self.report(err);
        }
        ok
    }
}
