//! Pattern unification
//!
//! An equation `?m x_1 ... x_n = rhs` where the `x_i` are distinct variables has the unique
//! solution `?m := \x_1 ... x_n. rhs`, provided that `rhs` only mentions the `x_i` and does
//! not mention `?m` itself.

use log::trace;

use ast::*;
use printer::Print;

use crate::result::TypeError;
use crate::typechecker::{DoubleChecker, Synthesizer};

use super::{Ordering, Unifier};

impl Unifier<'_> {
    /// Solve `meta` with `rhs`. Returns the type of both sides on success.
    pub(super) fn solve_meta(&mut self, meta: &MetaCall, rhs: &Term, typ: Option<&Term>) -> Option<Term> {
        let result = if self.solve_meta {
            let rhs = self.whnf(rhs);
            self.do_solve_meta(meta, &rhs, typ)
        } else {
            self.record_approx_eqn(meta, rhs, typ)
        };
        if result.is_none() {
            self.fail_with(&Term::Meta(meta.clone()), rhs);
        }
        result
    }

    fn do_solve_meta(&mut self, meta: &MetaCall, rhs: &Term, typ: Option<&Term>) -> Option<Term> {
        trace!("Solving {} with {}", Term::Meta(meta.clone()).print_trace(), rhs.print_trace());

        let mut inverted = Vec::with_capacity(meta.args.len());
        let mut overlap = Vec::new();
        for arg in &meta.args {
            match self.whnf(arg) {
                Term::Free(FreeTerm { var }) => {
                    if inverted.contains(&var) {
                        overlap.push(var.clone());
                    }
                    inverted.push(var);
                }
                // Any variable will do; the argument is not mentioned by the solution.
                _ if self.cfg.allow_vague => inverted.push(self.state.names.fresh("_")),
                _ if self.cfg.allow_delay => {
                    self.postpone(meta, rhs, typ);
                    return Some(self.postponed_type(meta, typ));
                }
                _ => {
                    self.report(TypeError::bad_spine(meta, self.pos));
                    return None;
                }
            }
        }

        let return_type = self.compute_return_type(meta, rhs, typ)?;

        if !self.cfg.allow_vague && overlap.iter().any(|var| uses_var(rhs, var)) {
            if self.cfg.allow_delay {
                self.postpone(meta, rhs, Some(&return_type));
                return Some(return_type);
            }
            self.report(TypeError::bad_spine(meta, self.pos));
            return None;
        }

        let rhs = self.state.inline_lets(rhs);
        let candidate = rhs.bind_tele(&inverted);
        let stray = stray_vars(&candidate, &|_| false);
        if !stray.in_term.is_empty() {
            self.report(TypeError::badly_scoped(meta, &rhs, &stray.in_term, self.pos));
            return None;
        }
        if !stray.in_meta.is_empty() {
            // Solving the metavariables first may make these variables disappear.
            if self.cfg.allow_delay {
                self.postpone(meta, &rhs, Some(&return_type));
                return Some(return_type);
            }
            self.report(TypeError::badly_scoped(meta, &rhs, &stray.in_meta, self.pos));
            return None;
        }
        if uses_meta(&candidate, &meta.meta) {
            self.report(TypeError::recursion(meta, &rhs, self.pos));
            return None;
        }

        let extra_args = meta.args.len().saturating_sub(meta.meta.ctx_size);
        self.state.solve(&meta.meta, LamTerm::make(extra_args, candidate));
        Some(return_type)
    }

    /// The type reported for an equation that has been postponed.
    fn postponed_type(&mut self, meta: &MetaCall, typ: Option<&Term>) -> Term {
        if let Some(typ) = typ.cloned().or_else(|| self.meta_type(meta)) {
            return typ;
        }
        self.fresh_type_meta("T")
    }

    /// Check `rhs` against the requirement of `meta`. Returns the type of the solution.
    fn compute_return_type(&mut self, meta: &MetaCall, rhs: &Term, typ: Option<&Term>) -> Option<Term> {
        let mut return_type = typ.cloned();
        match &meta.meta.req {
            Requirement::Whatever => {}
            Requirement::IsType => match rhs {
                _ if rhs.is_formation() => {}
                Term::Meta(other) => {
                    if !Synthesizer::new(self).is_type_meta(&other.meta.req) {
                        self.report(TypeError::ill_typed(rhs, &Term::TYPE0, self.pos));
                        return None;
                    }
                }
                _ => match Synthesizer::new(self).try_synth(rhs) {
                    Some(sort @ Term::Sort(_)) => {
                        return_type.get_or_insert(sort);
                    }
                    _ => {
                        self.report(TypeError::ill_typed(rhs, &Term::TYPE0, self.pos));
                        return None;
                    }
                },
            },
            Requirement::OfType(target) => {
                let Some(target) = self.app_type(&meta.meta, target, &meta.args) else {
                    self.report(TypeError::bad_spine(meta, self.pos));
                    return None;
                };
                if let Some(typ) = typ {
                    if !self.compare_inner(typ, &target, None) {
                        self.report(TypeError::ill_typed(rhs, &target, self.pos));
                        return None;
                    }
                }
                if !self.with_checker(|checker| checker.inherit(rhs, &target)) {
                    self.report(TypeError::ill_typed(rhs, &target, self.pos));
                }
                return_type = Some(self.state.freeze_holes(&target));
            }
            Requirement::PiDom(sort) => {
                if !Synthesizer::new(self).inherit_pi_dom(rhs, *sort) {
                    self.report(TypeError::ill_typed(rhs, &Term::Sort(*sort), self.pos));
                }
                if return_type.is_none() {
                    return_type = Some(Synthesizer::new(self).try_synth(rhs).unwrap_or(Term::Sort(*sort)));
                }
            }
        }
        Some(return_type.unwrap_or(Term::TYPE0))
    }

    /// Run `f` with a checker for the current context.
    ///
    /// Equations the checker postpones count as postponed by this unifier.
    fn with_checker<O>(&mut self, f: impl FnOnce(&mut DoubleChecker<'_, '_>) -> O) -> O {
        let pos = self.pos;
        let (res, postponed) = {
            let mut unifier = self.derive(pos, Ordering::Lt);
            let res = f(&mut DoubleChecker::new(&mut unifier));
            (res, unifier.postponed())
        };
        self.postponed += postponed;
        res
    }
}
