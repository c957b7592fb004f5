use ast::*;
use printer::Print;

use crate::conversion_checking::Unifier;
use crate::result::impossible;

/// Computes the type of a well-typed term, where possible without annotations.
pub struct Synthesizer<'u, 'a> {
    tycker: &'u mut Unifier<'a>,
}

impl<'u, 'a> Synthesizer<'u, 'a> {
    pub fn new(tycker: &'u mut Unifier<'a>) -> Self {
        Synthesizer { tycker }
    }

    /// The type of `term` in weak-head normal form, if it can be synthesized.
    pub fn try_synth(&mut self, term: &Term) -> Option<Term> {
        let typ = self.synthesize(term)?;
        Some(self.tycker.whnf(&typ))
    }

    pub fn synth_dont_normalize(&mut self, term: &Term) -> Option<Term> {
        self.synthesize(term)
    }

    fn synth_sort(&mut self, term: &Term) -> Option<SortTerm> {
        match self.try_synth(term)? {
            Term::Sort(sort) => Some(sort),
            _ => None,
        }
    }

    fn synthesize(&mut self, term: &Term) -> Option<Term> {
        match term {
            Term::App(AppTerm { fun, arg }) => match self.try_synth(fun)? {
                Term::DepType(DepTypeTerm { kind: DTKind::Pi, body, .. }) => Some(body.apply((**arg).clone())),
                _ => None,
            },
            Term::DepType(dt) => {
                let param = self.synth_sort(&dt.param)?;
                let body = self
                    .tycker
                    .with_fresh("x", (*dt.param).clone(), |tycker, x| Synthesizer::new(tycker).synth_sort(&dt.body.apply(x)))?;
                Some(Term::Sort(match dt.kind {
                    DTKind::Pi => SortTerm::lub_pi(param, body),
                    DTKind::Sigma => SortTerm::lub_sigma(param, body),
                }))
            }
            Term::Lam(_) | Term::Tup(_) | Term::Partial(_) => None,
            Term::Free(FreeTerm { var }) => self.tycker.ctx.get(var).cloned(),
            Term::LetFree(LetFreeTerm { typ, .. }) => Some((**typ).clone()),
            Term::Local(_) => impossible(format!("dangling index in {}", term.print_trace()), self.tycker.pos),
            Term::Proj(ProjTerm { of, index }) => match self.try_synth(of)? {
                Term::DepType(DepTypeTerm { kind: DTKind::Sigma, param, body }) => Some(if *index == 0 {
                    *param
                } else {
                    body.apply(ProjTerm::make((**of).clone(), 0))
                }),
                _ => None,
            },
            Term::Int(IntegerTerm { typ, .. }) | Term::List(ListTerm { typ, .. }) => Some(Term::Data(typ.clone())),
            Term::Data(call) => Some(call.data.signature.result(&call.args).elevate(call.ulift)),
            Term::Fn(call) => Some(call.def.signature.result(&call.args).elevate(call.ulift)),
            Term::Prim(call) => Some(call.id.signature().result(&call.args).elevate(call.ulift)),
            Term::Con(call) => Some(call.con.signature.result(&call.full_args()).elevate(call.ulift)),
            Term::Class(call) => Some(Term::Sort(call.class.sort.elevate(call.ulift))),
            Term::Member(member) => Some(member.member_type()),
            Term::Meta(call) => {
                if self.tycker.state.is_solved(&call.meta) {
                    let solved = self.tycker.whnf(term);
                    self.synthesize(&solved)
                } else {
                    self.tycker.meta_type(call)
                }
            }
            Term::Coe(coe) => Some(coe.family()),
            Term::Eq(eq) => self.try_synth(&eq.app_a(Term::Dim(DimTerm::I0))),
            Term::PApp(PAppTerm { fun, arg, .. }) => match self.try_synth(fun)? {
                Term::Eq(eq) => Some(eq.app_a((**arg).clone())),
                _ => None,
            },
            Term::Sort(sort) => Some(Term::Sort(sort.succ())),
            Term::Dim(_) => Some(Term::DimTy(DimTyTerm)),
            Term::DimTy(_) => Some(Term::Sort(SortTerm::ISET)),
            Term::Str(_) => Some(PrimCall::string()),
            Term::ClassCast(cast) => Some(Term::Class(cast.class_call())),
            Term::New(new) => Some(Term::Class(new.inner.clone())),
            Term::PartialTy(pt) => self.try_synth(&pt.typ),
        }
    }

    /// Whether `typ` can be the domain of a function type living in `expected`.
    ///
    /// A type metavariable is narrowed down to exactly that.
    pub fn inherit_pi_dom(&mut self, typ: &Term, expected: SortTerm) -> bool {
        if let Term::Meta(call) = typ {
            if call.meta.req == Requirement::IsType && !self.tycker.state.is_solved(&call.meta) {
                let dom = call.meta.as_pi_dom(&self.tycker.state.names, expected);
                self.tycker.state.solve(&call.meta, call.meta.forward_to(&dom));
                return true;
            }
        }
        let Some(actual) = self.synth_sort(typ) else { return false };
        match actual.kind {
            SortKind::Type => expected.kind == SortKind::Type && actual.lift <= expected.lift,
            SortKind::Set => expected.kind == SortKind::Set && actual.lift <= expected.lift,
            SortKind::ISet => impossible("the interval is never the domain of a function type", self.tycker.pos),
        }
    }

    /// Whether a metavariable with this requirement stands for a type.
    pub fn is_type_meta(&mut self, req: &Requirement) -> bool {
        match req {
            Requirement::Whatever => false,
            Requirement::IsType | Requirement::PiDom(_) => true,
            Requirement::OfType(typ) => matches!(self.tycker.whnf(typ), Term::Sort(_)),
        }
    }
}
