use pretty::DocAllocator;
use printer::theme::ThemeExt;
use printer::tokens::{ARROW, COLON, COMMA, DOT, LAMBDA, PI, SIGMA, TIMES};
use printer::util::ParensIfExt;
use printer::{Alloc, Builder, PREC_ARG, PREC_ARROW, PREC_NONE, Precedence};

use crate::traits::{Descend, Rewrite, Visit};
use crate::{Closure, LocalTerm, Term};

use super::{Doc, DocCx};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DTKind {
    Pi,
    Sigma,
}

/// A dependent function or pair type.
#[derive(Debug, Clone, PartialEq)]
pub struct DepTypeTerm {
    pub kind: DTKind,
    pub param: Box<Term>,
    pub body: Closure,
}

impl DepTypeTerm {
    pub fn pi(param: Term, body: Closure) -> Term {
        Term::DepType(DepTypeTerm { kind: DTKind::Pi, param: Box::new(param), body })
    }

    pub fn sigma(param: Term, body: Closure) -> Term {
        Term::DepType(DepTypeTerm { kind: DTKind::Sigma, param: Box::new(param), body })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LamTerm {
    pub body: Closure,
}

impl LamTerm {
    /// `\x. x`
    pub fn id() -> Term {
        Term::Lam(LamTerm { body: Closure::Idx(Box::new(Term::Local(LocalTerm { idx: 0 }))) })
    }

    /// Bind the `n` outermost dangling indices of `body` with lambdas.
    pub fn make(n: usize, body: Term) -> Term {
        (0..n).fold(body, |body, _| Term::Lam(LamTerm { body: Closure::Idx(Box::new(body)) }))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TupTerm {
    pub lhs: Box<Term>,
    pub rhs: Box<Term>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppTerm {
    pub fun: Box<Term>,
    pub arg: Box<Term>,
}

impl AppTerm {
    /// Apply `fun` to `arg`, reducing if `fun` is a lambda.
    ///
    /// Metavariable applications take the argument into their spine.
    pub fn make(fun: Term, arg: Term) -> Term {
        match fun {
            Term::Lam(lam) => lam.body.apply(arg),
            Term::Meta(mut call) => {
                call.args.push(arg);
                Term::Meta(call)
            }
            fun => Term::App(AppTerm { fun: Box::new(fun), arg: Box::new(arg) }),
        }
    }

    pub fn make_many(fun: Term, args: impl IntoIterator<Item = Term>) -> Term {
        args.into_iter().fold(fun, AppTerm::make)
    }
}

/// The first (`index == 0`) or second (`index == 1`) component of a pair.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjTerm {
    pub of: Box<Term>,
    pub index: usize,
}

impl ProjTerm {
    pub fn make(of: Term, index: usize) -> Term {
        match of {
            Term::Tup(TupTerm { lhs, rhs }) => {
                if index == 0 {
                    *lhs
                } else {
                    *rhs
                }
            }
            of => Term::Proj(ProjTerm { of: Box::new(of), index }),
        }
    }
}

impl From<DepTypeTerm> for Term {
    fn from(val: DepTypeTerm) -> Self {
        Term::DepType(val)
    }
}

impl From<LamTerm> for Term {
    fn from(val: LamTerm) -> Self {
        Term::Lam(val)
    }
}

impl From<TupTerm> for Term {
    fn from(val: TupTerm) -> Self {
        Term::Tup(val)
    }
}

impl From<AppTerm> for Term {
    fn from(val: AppTerm) -> Self {
        Term::App(val)
    }
}

impl From<ProjTerm> for Term {
    fn from(val: ProjTerm) -> Self {
        Term::Proj(val)
    }
}

impl Descend for DepTypeTerm {
    fn descend<R: Rewrite>(&self, depth: usize, rw: &R) -> Self {
        DepTypeTerm {
            kind: self.kind,
            param: rw.rewrite_boxed(depth, &self.param),
            body: self.body.descend(depth, rw),
        }
    }
}

impl Descend for LamTerm {
    fn descend<R: Rewrite>(&self, depth: usize, rw: &R) -> Self {
        LamTerm { body: self.body.descend(depth, rw) }
    }
}

impl Descend for TupTerm {
    fn descend<R: Rewrite>(&self, depth: usize, rw: &R) -> Self {
        TupTerm { lhs: rw.rewrite_boxed(depth, &self.lhs), rhs: rw.rewrite_boxed(depth, &self.rhs) }
    }
}

impl Descend for AppTerm {
    fn descend<R: Rewrite>(&self, depth: usize, rw: &R) -> Self {
        AppTerm { fun: rw.rewrite_boxed(depth, &self.fun), arg: rw.rewrite_boxed(depth, &self.arg) }
    }
}

impl Descend for ProjTerm {
    fn descend<R: Rewrite>(&self, depth: usize, rw: &R) -> Self {
        ProjTerm { of: rw.rewrite_boxed(depth, &self.of), index: self.index }
    }
}

impl Visit for DepTypeTerm {
    fn visit(&self, f: &mut dyn FnMut(&Term)) {
        f(&self.param);
        self.body.visit(f);
    }
}

impl Visit for LamTerm {
    fn visit(&self, f: &mut dyn FnMut(&Term)) {
        self.body.visit(f);
    }
}

impl Visit for TupTerm {
    fn visit(&self, f: &mut dyn FnMut(&Term)) {
        f(&self.lhs);
        f(&self.rhs);
    }
}

impl Visit for AppTerm {
    fn visit(&self, f: &mut dyn FnMut(&Term)) {
        f(&self.fun);
        f(&self.arg);
    }
}

impl Visit for ProjTerm {
    fn visit(&self, f: &mut dyn FnMut(&Term)) {
        f(&self.of);
    }
}

impl Doc for DepTypeTerm {
    fn doc<'a>(&self, cx: &mut DocCx<'_>, alloc: &'a Alloc<'a>, prec: Precedence) -> Builder<'a> {
        let (keyword, sep) = match self.kind {
            DTKind::Pi => (PI, ARROW),
            DTKind::Sigma => (SIGMA, TIMES),
        };
        let param = self.param.doc(cx, alloc, PREC_NONE);
        let (name, body) = self.body.doc_open(cx, alloc, "x", PREC_ARROW);
        alloc
            .keyword(keyword)
            .append(alloc.space())
            .append(alloc.text(name).append(alloc.space()).append(COLON).append(alloc.space()).append(param).parens())
            .append(alloc.space())
            .append(sep)
            .append(alloc.space())
            .append(body)
            .group()
            .parens_if(prec > PREC_ARROW)
    }
}

impl Doc for LamTerm {
    fn doc<'a>(&self, cx: &mut DocCx<'_>, alloc: &'a Alloc<'a>, prec: Precedence) -> Builder<'a> {
        let (name, body) = self.body.doc_open(cx, alloc, "x", PREC_NONE);
        alloc
            .keyword(LAMBDA)
            .append(name)
            .append(DOT)
            .append(alloc.space())
            .append(body)
            .group()
            .parens_if(prec > PREC_NONE)
    }
}

impl Doc for TupTerm {
    fn doc<'a>(&self, cx: &mut DocCx<'_>, alloc: &'a Alloc<'a>, _prec: Precedence) -> Builder<'a> {
        self.lhs
            .doc(cx, alloc, PREC_NONE)
            .append(COMMA)
            .append(alloc.space())
            .append(self.rhs.doc(cx, alloc, PREC_NONE))
            .group()
            .parens()
    }
}

impl Doc for AppTerm {
    fn doc<'a>(&self, cx: &mut DocCx<'_>, alloc: &'a Alloc<'a>, prec: Precedence) -> Builder<'a> {
        self.fun
            .doc(cx, alloc, PREC_ARROW)
            .append(alloc.space())
            .append(self.arg.doc(cx, alloc, PREC_ARG))
            .group()
            .parens_if(prec >= PREC_ARG)
    }
}

impl Doc for ProjTerm {
    fn doc<'a>(&self, cx: &mut DocCx<'_>, alloc: &'a Alloc<'a>, _prec: Precedence) -> Builder<'a> {
        self.of.doc(cx, alloc, PREC_ARG).append(DOT).append(self.index.to_string())
    }
}
