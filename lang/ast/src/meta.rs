use std::rc::Rc;

use derivative::Derivative;
use miette_util::codespan::Span;

use crate::{Closure, DTKind, DepTypeTerm, LocalTerm, MetaCall, NameGenerator, SortKind, SortTerm, Term};

/// What a solution of a metavariable has to satisfy.
#[derive(Debug, Clone, PartialEq)]
pub enum Requirement {
    /// No constraint; an untyped placeholder.
    Whatever,
    /// The solution must be a type.
    IsType,
    /// The solution must have the given type.
    ///
    /// The type is open in the `ctx_size` variables of the metavariable's context.
    OfType(Box<Term>),
    /// The solution must be a valid domain of a Pi type living in the given sort.
    PiDom(SortTerm),
}

impl Requirement {
    /// How much a requirement says about the solution.
    ///
    /// When two metavariables are equated, the one with the lower rank is solved.
    pub fn rank(&self) -> u8 {
        match self {
            Requirement::Whatever => 0,
            Requirement::IsType => 1,
            Requirement::PiDom(_) => 2,
            Requirement::OfType(_) => 3,
        }
    }

    pub fn is_typed(&self) -> bool {
        matches!(self, Requirement::OfType(_))
    }
}

/// A metavariable. Two metavariables are the same iff their ids agree.
#[derive(Debug, Clone, Derivative)]
#[derivative(PartialEq, Eq, Hash)]
pub struct MetaVar {
    pub id: u64,
    #[derivative(PartialEq = "ignore", Hash = "ignore")]
    pub name: Rc<str>,
    #[derivative(PartialEq = "ignore", Hash = "ignore")]
    pub pos: Option<Span>,
    /// Number of context variables the metavariable may depend on.
    /// These are always the first arguments of its spine.
    #[derivative(PartialEq = "ignore", Hash = "ignore")]
    pub ctx_size: usize,
    #[derivative(PartialEq = "ignore", Hash = "ignore")]
    pub req: Requirement,
}

impl MetaVar {
    pub fn new(id: u64, name: &str, pos: Option<Span>, ctx_size: usize, req: Requirement) -> MetaVar {
        MetaVar { id, name: name.into(), pos, ctx_size, req }
    }

    /// A copy of this metavariable with a new identity and requirement.
    pub fn with_req(&self, names: &NameGenerator, req: Requirement) -> MetaVar {
        MetaVar { id: names.next_id(), req, ..self.clone() }
    }

    /// The solution that makes this metavariable an alias of `other`.
    ///
    /// `other` has to live in a context of the same size.
    pub fn forward_to(&self, other: &MetaVar) -> Term {
        let args = (0..self.ctx_size).rev().map(|idx| Term::Local(LocalTerm { idx })).collect();
        Term::Meta(MetaCall { meta: other.clone(), args })
    }

    /// A metavariable standing for the same type, which must be a valid Pi domain in `sort`.
    ///
    /// The caller is responsible for solving `self` with [MetaVar::forward_to].
    pub fn as_pi_dom(&self, names: &NameGenerator, sort: SortTerm) -> MetaVar {
        self.with_req(names, Requirement::PiDom(sort))
    }

    /// Split a type metavariable applied to `args` into a dependent type of fresh metavariables.
    ///
    /// Returns `None` when the requirement rules out that the metavariable is a dependent type.
    pub fn as_dt(
        &self,
        names: &NameGenerator,
        kind: DTKind,
        whnf: impl FnOnce(Term) -> Term,
        args: &[Term],
    ) -> Option<DepTypeTerm> {
        let req = match &self.req {
            Requirement::Whatever | Requirement::IsType => Requirement::IsType,
            Requirement::OfType(typ) => {
                let ctx_args = &args[..self.ctx_size.min(args.len())];
                match whnf(typ.instantiate(ctx_args)) {
                    Term::Sort(sort) if sort.kind != SortKind::ISet => Requirement::OfType(Box::new(Term::Sort(sort))),
                    _ => return None,
                }
            }
            Requirement::PiDom(_) => return None,
        };
        let dom = MetaVar {
            id: names.next_id(),
            name: format!("{}_dom", self.name).into(),
            pos: self.pos,
            ctx_size: args.len(),
            req: req.clone(),
        };
        let cod = MetaVar {
            id: names.next_id(),
            name: format!("{}_cod", self.name).into(),
            pos: self.pos,
            ctx_size: args.len() + 1,
            req,
        };
        let args = args.to_vec();
        let param = Term::Meta(MetaCall { meta: dom, args: args.clone() });
        let body = Closure::native(move |arg| {
            let mut args = args.clone();
            args.push(arg);
            Term::Meta(MetaCall { meta: cod.clone(), args })
        });
        Some(DepTypeTerm { kind, param: Box::new(param), body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metas_compare_by_id() {
        let names = NameGenerator::new();
        let m = MetaVar::new(names.next_id(), "m", None, 0, Requirement::Whatever);
        let typed = m.with_req(&names, Requirement::IsType);
        assert_ne!(m, typed);
        assert_eq!(m, MetaVar { name: "renamed".into(), ..m.clone() });
    }

    #[test]
    fn rank_orders_requirements() {
        let reqs = [
            Requirement::Whatever,
            Requirement::IsType,
            Requirement::PiDom(SortTerm::TYPE0),
            Requirement::OfType(Box::new(Term::TYPE0)),
        ];
        assert!(reqs.windows(2).all(|w| w[0].rank() < w[1].rank()));
    }

    #[test]
    fn forward_to_uses_identity_spine() {
        let names = NameGenerator::new();
        let m = MetaVar::new(names.next_id(), "m", None, 2, Requirement::IsType);
        let n = m.as_pi_dom(&names, SortTerm::TYPE0);
        let x = Term::free(&names.fresh("x"));
        let y = Term::free(&names.fresh("y"));
        let solution = m.forward_to(&n);
        let applied = MetaCall::app(&solution, &[x.clone(), y.clone()], 2);
        assert_eq!(applied, Term::Meta(MetaCall { meta: n, args: vec![x, y] }));
    }

    #[test]
    fn as_dt_splits_type_meta() {
        let names = NameGenerator::new();
        let m = MetaVar::new(names.next_id(), "A", None, 1, Requirement::IsType);
        let x = Term::free(&names.fresh("x"));
        let dt = m.as_dt(&names, DTKind::Pi, |t| t, &[x.clone()]).expect("type metas split");
        let Term::Meta(dom) = *dt.param else { panic!("domain is not a metavariable") };
        assert_eq!(dom.args, vec![x.clone()]);
        let y = Term::free(&names.fresh("y"));
        let Term::Meta(cod) = dt.body.apply(y.clone()) else { panic!("codomain is not a metavariable") };
        assert_eq!(cod.args, vec![x, y]);
        assert_eq!(cod.meta.ctx_size, 2);
    }

    #[test]
    fn as_dt_rejects_interval_sort() {
        let names = NameGenerator::new();
        let m = MetaVar::new(names.next_id(), "A", None, 0, Requirement::OfType(Box::new(Term::Sort(SortTerm::ISET))));
        assert!(m.as_dt(&names, DTKind::Sigma, |t| t, &[]).is_none());
    }
}
