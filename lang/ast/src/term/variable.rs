use pretty::DocAllocator;
use printer::theme::ThemeExt;
use printer::tokens::{COLON, COLONEQ, LET};
use printer::util::ParensIfExt;
use printer::{Alloc, Builder, PREC_NONE, Precedence};

use crate::traits::{Descend, Rewrite, Visit};
use crate::{LocalVar, Term};

use super::{Doc, DocCx};

/// A variable bound by a binder which has not been opened yet.
///
/// `idx` counts the binders between the occurrence and its binder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalTerm {
    pub idx: usize,
}

/// A variable of the typing context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FreeTerm {
    pub var: LocalVar,
}

/// A variable of the typing context which carries its definition.
#[derive(Debug, Clone, PartialEq)]
pub struct LetFreeTerm {
    pub var: LocalVar,
    pub value: Box<Term>,
    pub typ: Box<Term>,
}

impl From<LocalTerm> for Term {
    fn from(val: LocalTerm) -> Self {
        Term::Local(val)
    }
}

impl From<FreeTerm> for Term {
    fn from(val: FreeTerm) -> Self {
        Term::Free(val)
    }
}

impl From<LetFreeTerm> for Term {
    fn from(val: LetFreeTerm) -> Self {
        Term::LetFree(val)
    }
}

impl Descend for LocalTerm {
    fn descend<R: Rewrite>(&self, _depth: usize, _rw: &R) -> Self {
        self.clone()
    }
}

impl Descend for FreeTerm {
    fn descend<R: Rewrite>(&self, _depth: usize, _rw: &R) -> Self {
        self.clone()
    }
}

impl Descend for LetFreeTerm {
    fn descend<R: Rewrite>(&self, depth: usize, rw: &R) -> Self {
        LetFreeTerm {
            var: self.var.clone(),
            value: rw.rewrite_boxed(depth, &self.value),
            typ: rw.rewrite_boxed(depth, &self.typ),
        }
    }
}

impl Visit for LocalTerm {
    fn visit(&self, _f: &mut dyn FnMut(&Term)) {}
}

impl Visit for FreeTerm {
    fn visit(&self, _f: &mut dyn FnMut(&Term)) {}
}

impl Visit for LetFreeTerm {
    fn visit(&self, f: &mut dyn FnMut(&Term)) {
        f(&self.value);
        f(&self.typ);
    }
}

impl Doc for LocalTerm {
    fn doc<'a>(&self, cx: &mut DocCx<'_>, alloc: &'a Alloc<'a>, _prec: Precedence) -> Builder<'a> {
        alloc.text(cx.local(self.idx))
    }
}

impl Doc for FreeTerm {
    fn doc<'a>(&self, cx: &mut DocCx<'_>, alloc: &'a Alloc<'a>, _prec: Precedence) -> Builder<'a> {
        alloc.text(self.var.display(cx.cfg))
    }
}

impl Doc for LetFreeTerm {
    fn doc<'a>(&self, cx: &mut DocCx<'_>, alloc: &'a Alloc<'a>, prec: Precedence) -> Builder<'a> {
        if !cx.cfg.print_metavar_ids {
            return alloc.text(self.var.display(cx.cfg));
        }
        // Traces show what the variable stands for.
        alloc
            .keyword(LET)
            .append(alloc.space())
            .append(self.var.display(cx.cfg))
            .append(alloc.space())
            .append(COLON)
            .append(alloc.space())
            .append(self.typ.doc(cx, alloc, PREC_NONE))
            .append(alloc.space())
            .append(COLONEQ)
            .append(alloc.space())
            .append(self.value.doc(cx, alloc, PREC_NONE))
            .group()
            .parens_if(prec > PREC_NONE)
    }
}
