//! The interval and the terms built on top of it.

use std::rc::Rc;

use pretty::DocAllocator;
use printer::theme::ThemeExt;
use printer::tokens::{AT, COE, DOT, EQUALS, I0, I1, INTERVAL, LAMBDA, PARTIAL, PATH};
use printer::util::ParensIfExt;
use printer::{Alloc, Builder, PREC_ARG, PREC_ARROW, PREC_NONE, Precedence};

use crate::traits::{Descend, Rewrite, Visit};
use crate::{AppTerm, Closure, DepTypeTerm, LamTerm, LocalVar, ProjTerm, Term, TupTerm};

use super::{Doc, DocCx};

/// An endpoint of the interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DimTerm {
    I0,
    I1,
}

/// The interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DimTyTerm;

/// The type of paths `a` from `lhs` to `rhs`, where `a` is a family over the interval.
#[derive(Debug, Clone, PartialEq)]
pub struct EqTerm {
    pub a: Closure,
    pub lhs: Box<Term>,
    pub rhs: Box<Term>,
}

impl EqTerm {
    pub fn app_a(&self, dim: Term) -> Term {
        self.a.apply(dim)
    }
}

/// Application of a path to a point of the interval.
///
/// The endpoints are kept so that the application reduces even if `fun` is stuck.
#[derive(Debug, Clone, PartialEq)]
pub struct PAppTerm {
    pub fun: Box<Term>,
    pub arg: Box<Term>,
    pub a0: Box<Term>,
    pub a1: Box<Term>,
}

impl PAppTerm {
    pub fn make(fun: Term, arg: Term, a0: Term, a1: Term) -> Term {
        match (fun, arg) {
            (_, Term::Dim(DimTerm::I0)) => a0,
            (_, Term::Dim(DimTerm::I1)) => a1,
            (Term::Lam(lam), arg) => lam.body.apply(arg),
            (fun, arg) => Term::PApp(PAppTerm {
                fun: Box::new(fun),
                arg: Box::new(arg),
                a0: Box::new(a0),
                a1: Box::new(a1),
            }),
        }
    }
}

/// The type `typ` restricted to the face where `lhs` equals `rhs`.
#[derive(Debug, Clone, PartialEq)]
pub struct PartialTyTerm {
    pub lhs: Box<Term>,
    pub rhs: Box<Term>,
    pub typ: Box<Term>,
}

/// An element of a partial type.
#[derive(Debug, Clone, PartialEq)]
pub struct PartialTerm {
    pub element: Box<Term>,
}

/// Transport along the family `typ` from `r` to `s`. A function `typ(r) -> typ(s)`.
#[derive(Debug, Clone, PartialEq)]
pub struct CoeTerm {
    pub typ: Closure,
    pub r: Box<Term>,
    pub s: Box<Term>,
}

/// A family of dependent types, opened at arbitrary points of the interval.
type DepFamily = Rc<dyn Fn(&Term) -> DepTypeTerm>;

fn open_family(i: &LocalVar, dt: &DepTypeTerm) -> DepFamily {
    let i = i.clone();
    let dt = Term::DepType(dt.clone());
    Rc::new(move |at: &Term| match dt.replace(&i, at) {
        Term::DepType(dt) => dt,
        _ => unreachable!("substitution changed the shape of a term"),
    })
}

fn domain_family(family: &DepFamily) -> Closure {
    let family = family.clone();
    Closure::native(move |at| *family(&at).param)
}

impl CoeTerm {
    pub fn new(typ: Closure, r: Term, s: Term) -> CoeTerm {
        CoeTerm { typ, r: Box::new(r), s: Box::new(s) }
    }

    /// The type of the coercion, `typ(r) -> typ(s)`.
    pub fn family(&self) -> Term {
        let dom = self.typ.apply((*self.r).clone());
        let cod = self.typ.apply((*self.s).clone());
        DepTypeTerm::pi(dom, Closure::constant(cod))
    }

    pub fn inverse(&self) -> CoeTerm {
        CoeTerm { typ: self.typ.clone(), r: self.s.clone(), s: self.r.clone() }
    }

    pub fn app(self, arg: Term) -> Term {
        AppTerm::make(Term::Coe(self), arg)
    }

    /// Coercion along a family of function types, where `pi` is the family opened at `i`.
    ///
    /// ```text
    /// coe r s (\i. Pi (x : A i) -> B i x) f
    ///   = \a. coe r s (\j. B j (coe s j A a)) (f (coe s r A a))
    /// ```
    pub fn reduce_pi(&self, i: &LocalVar, pi: &DepTypeTerm) -> Term {
        let family = open_family(i, pi);
        let r = (*self.r).clone();
        let s = (*self.s).clone();
        Term::Lam(LamTerm {
            body: Closure::native(move |f| {
                let family = family.clone();
                let r = r.clone();
                let s = s.clone();
                Term::Lam(LamTerm {
                    body: Closure::native(move |a| {
                        let dom = domain_family(&family);
                        let a_at_r = CoeTerm::new(dom.clone(), s.clone(), r.clone()).app(a.clone());
                        let family = family.clone();
                        let s_cod = s.clone();
                        let cod = Closure::native(move |j| {
                            let a_at_j =
                                CoeTerm::new(dom.clone(), s_cod.clone(), j.clone()).app(a.clone());
                            family(&j).body.apply(a_at_j)
                        });
                        CoeTerm::new(cod, r.clone(), s.clone()).app(AppTerm::make(f.clone(), a_at_r))
                    }),
                })
            }),
        })
    }

    /// Coercion along a family of pair types, where `sigma` is the family opened at `i`.
    ///
    /// ```text
    /// coe r s (\i. Sig (x : A i) ** B i x) p
    ///   = (coe r s A p.0, coe r s (\j. B j (coe r j A p.0)) p.1)
    /// ```
    pub fn reduce_sigma(&self, i: &LocalVar, sigma: &DepTypeTerm) -> Term {
        let family = open_family(i, sigma);
        let r = (*self.r).clone();
        let s = (*self.s).clone();
        Term::Lam(LamTerm {
            body: Closure::native(move |p| {
                let dom = domain_family(&family);
                let fst = ProjTerm::make(p.clone(), 0);
                let snd = ProjTerm::make(p, 1);
                let family = family.clone();
                let r_cod = r.clone();
                let fst_cod = fst.clone();
                let dom_cod = dom.clone();
                let cod = Closure::native(move |j| {
                    let fst_at_j =
                        CoeTerm::new(dom_cod.clone(), r_cod.clone(), j.clone()).app(fst_cod.clone());
                    family(&j).body.apply(fst_at_j)
                });
                Term::Tup(TupTerm {
                    lhs: Box::new(CoeTerm::new(dom, r.clone(), s.clone()).app(fst)),
                    rhs: Box::new(CoeTerm::new(cod, r.clone(), s.clone()).app(snd)),
                })
            }),
        })
    }
}

impl From<DimTerm> for Term {
    fn from(val: DimTerm) -> Self {
        Term::Dim(val)
    }
}

impl From<DimTyTerm> for Term {
    fn from(val: DimTyTerm) -> Self {
        Term::DimTy(val)
    }
}

impl From<EqTerm> for Term {
    fn from(val: EqTerm) -> Self {
        Term::Eq(val)
    }
}

impl From<PAppTerm> for Term {
    fn from(val: PAppTerm) -> Self {
        Term::PApp(val)
    }
}

impl From<PartialTyTerm> for Term {
    fn from(val: PartialTyTerm) -> Self {
        Term::PartialTy(val)
    }
}

impl From<PartialTerm> for Term {
    fn from(val: PartialTerm) -> Self {
        Term::Partial(val)
    }
}

impl From<CoeTerm> for Term {
    fn from(val: CoeTerm) -> Self {
        Term::Coe(val)
    }
}

impl Descend for DimTerm {
    fn descend<R: Rewrite>(&self, _depth: usize, _rw: &R) -> Self {
        *self
    }
}

impl Descend for DimTyTerm {
    fn descend<R: Rewrite>(&self, _depth: usize, _rw: &R) -> Self {
        DimTyTerm
    }
}

impl Descend for EqTerm {
    fn descend<R: Rewrite>(&self, depth: usize, rw: &R) -> Self {
        EqTerm {
            a: self.a.descend(depth, rw),
            lhs: rw.rewrite_boxed(depth, &self.lhs),
            rhs: rw.rewrite_boxed(depth, &self.rhs),
        }
    }
}

impl Descend for PAppTerm {
    fn descend<R: Rewrite>(&self, depth: usize, rw: &R) -> Self {
        PAppTerm {
            fun: rw.rewrite_boxed(depth, &self.fun),
            arg: rw.rewrite_boxed(depth, &self.arg),
            a0: rw.rewrite_boxed(depth, &self.a0),
            a1: rw.rewrite_boxed(depth, &self.a1),
        }
    }
}

impl Descend for PartialTyTerm {
    fn descend<R: Rewrite>(&self, depth: usize, rw: &R) -> Self {
        PartialTyTerm {
            lhs: rw.rewrite_boxed(depth, &self.lhs),
            rhs: rw.rewrite_boxed(depth, &self.rhs),
            typ: rw.rewrite_boxed(depth, &self.typ),
        }
    }
}

impl Descend for PartialTerm {
    fn descend<R: Rewrite>(&self, depth: usize, rw: &R) -> Self {
        PartialTerm { element: rw.rewrite_boxed(depth, &self.element) }
    }
}

impl Descend for CoeTerm {
    fn descend<R: Rewrite>(&self, depth: usize, rw: &R) -> Self {
        CoeTerm {
            typ: self.typ.descend(depth, rw),
            r: rw.rewrite_boxed(depth, &self.r),
            s: rw.rewrite_boxed(depth, &self.s),
        }
    }
}

impl Visit for DimTerm {
    fn visit(&self, _f: &mut dyn FnMut(&Term)) {}
}

impl Visit for DimTyTerm {
    fn visit(&self, _f: &mut dyn FnMut(&Term)) {}
}

impl Visit for EqTerm {
    fn visit(&self, f: &mut dyn FnMut(&Term)) {
        self.a.visit(f);
        f(&self.lhs);
        f(&self.rhs);
    }
}

impl Visit for PAppTerm {
    fn visit(&self, f: &mut dyn FnMut(&Term)) {
        f(&self.fun);
        f(&self.arg);
        f(&self.a0);
        f(&self.a1);
    }
}

impl Visit for PartialTyTerm {
    fn visit(&self, f: &mut dyn FnMut(&Term)) {
        f(&self.lhs);
        f(&self.rhs);
        f(&self.typ);
    }
}

impl Visit for PartialTerm {
    fn visit(&self, f: &mut dyn FnMut(&Term)) {
        f(&self.element);
    }
}

impl Visit for CoeTerm {
    fn visit(&self, f: &mut dyn FnMut(&Term)) {
        self.typ.visit(f);
        f(&self.r);
        f(&self.s);
    }
}

fn doc_family<'a>(family: &Closure, cx: &mut DocCx<'_>, alloc: &'a Alloc<'a>) -> Builder<'a> {
    let (name, body) = family.doc_open(cx, alloc, "i", PREC_NONE);
    alloc.keyword(LAMBDA).append(name).append(DOT).append(alloc.space()).append(body).group().parens()
}

impl Doc for DimTerm {
    fn doc<'a>(&self, _cx: &mut DocCx<'_>, alloc: &'a Alloc<'a>, _prec: Precedence) -> Builder<'a> {
        match self {
            DimTerm::I0 => alloc.ctor(I0),
            DimTerm::I1 => alloc.ctor(I1),
        }
    }
}

impl Doc for DimTyTerm {
    fn doc<'a>(&self, _cx: &mut DocCx<'_>, alloc: &'a Alloc<'a>, _prec: Precedence) -> Builder<'a> {
        alloc.typ(INTERVAL)
    }
}

impl Doc for EqTerm {
    fn doc<'a>(&self, cx: &mut DocCx<'_>, alloc: &'a Alloc<'a>, prec: Precedence) -> Builder<'a> {
        alloc
            .typ(PATH)
            .append(alloc.space())
            .append(doc_family(&self.a, cx, alloc))
            .append(alloc.space())
            .append(self.lhs.doc(cx, alloc, PREC_ARG))
            .append(alloc.space())
            .append(self.rhs.doc(cx, alloc, PREC_ARG))
            .group()
            .parens_if(prec >= PREC_ARG)
    }
}

impl Doc for PAppTerm {
    fn doc<'a>(&self, cx: &mut DocCx<'_>, alloc: &'a Alloc<'a>, prec: Precedence) -> Builder<'a> {
        self.fun
            .doc(cx, alloc, PREC_ARROW)
            .append(alloc.space())
            .append(AT)
            .append(alloc.space())
            .append(self.arg.doc(cx, alloc, PREC_ARG))
            .group()
            .parens_if(prec >= PREC_ARG)
    }
}

impl Doc for PartialTyTerm {
    fn doc<'a>(&self, cx: &mut DocCx<'_>, alloc: &'a Alloc<'a>, prec: Precedence) -> Builder<'a> {
        let face = self
            .lhs
            .doc(cx, alloc, PREC_NONE)
            .append(alloc.space())
            .append(EQUALS)
            .append(alloc.space())
            .append(self.rhs.doc(cx, alloc, PREC_NONE))
            .parens();
        alloc
            .typ(PARTIAL)
            .append(alloc.space())
            .append(face)
            .append(alloc.space())
            .append(self.typ.doc(cx, alloc, PREC_ARG))
            .group()
            .parens_if(prec >= PREC_ARG)
    }
}

impl Doc for PartialTerm {
    fn doc<'a>(&self, cx: &mut DocCx<'_>, alloc: &'a Alloc<'a>, _prec: Precedence) -> Builder<'a> {
        alloc
            .text("{|")
            .append(alloc.space())
            .append(self.element.doc(cx, alloc, PREC_NONE))
            .append(alloc.space())
            .append("|}")
            .group()
    }
}

impl Doc for CoeTerm {
    fn doc<'a>(&self, cx: &mut DocCx<'_>, alloc: &'a Alloc<'a>, prec: Precedence) -> Builder<'a> {
        alloc
            .keyword(COE)
            .append(alloc.space())
            .append(self.r.doc(cx, alloc, PREC_ARG))
            .append(alloc.space())
            .append(self.s.doc(cx, alloc, PREC_ARG))
            .append(alloc.space())
            .append(doc_family(&self.typ, cx, alloc))
            .group()
            .parens_if(prec >= PREC_ARG)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{NameGenerator, SortTerm};

    #[test]
    fn papp_at_endpoints() {
        let names = NameGenerator::new();
        let p = Term::free(&names.fresh("p"));
        let a = Term::free(&names.fresh("a"));
        let b = Term::free(&names.fresh("b"));
        let at0 = PAppTerm::make(p.clone(), Term::Dim(DimTerm::I0), a.clone(), b.clone());
        let at1 = PAppTerm::make(p, Term::Dim(DimTerm::I1), a.clone(), b.clone());
        assert_eq!(at0, a);
        assert_eq!(at1, b);
    }

    #[test]
    fn coe_family_is_a_function_type() {
        let names = NameGenerator::new();
        let i = names.fresh("i");
        let coe = CoeTerm::new(
            Closure::constant(Term::Sort(SortTerm::TYPE0)),
            Term::free(&i),
            Term::Dim(DimTerm::I1),
        );
        let Term::DepType(family) = coe.family() else { panic!("expected a Pi type") };
        assert_eq!(*family.param, Term::Sort(SortTerm::TYPE0));
    }

    #[test]
    fn coe_sigma_projects_components() {
        let names = NameGenerator::new();
        let i = names.fresh("i");
        let a = names.fresh("A");
        let b = names.fresh("B");
        // \i. Sig (x : A) ** B
        let sigma = DepTypeTerm {
            kind: crate::DTKind::Sigma,
            param: Box::new(Term::free(&a)),
            body: Closure::constant(Term::free(&b)),
        };
        let coe = CoeTerm::new(
            Term::DepType(sigma.clone()).bind(&i),
            Term::Dim(DimTerm::I0),
            Term::Dim(DimTerm::I1),
        );
        let reduced = coe.reduce_sigma(&i, &sigma);
        let p = Term::free(&names.fresh("p"));
        let Term::Tup(tup) = AppTerm::make(reduced, p) else { panic!("expected a pair") };
        assert!(matches!(*tup.lhs, Term::App(_)));
    }
}
