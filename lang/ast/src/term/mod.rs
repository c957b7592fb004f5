use printer::{Alloc, Builder, PREC_NONE, Precedence, Print, PrintCfg};

use crate::traits::{Descend, Rewrite, Visit};

mod call;
mod closure;
mod cubical;
mod dep_type;
mod literal;
mod sort;
mod variable;

pub use call::*;
pub use closure::*;
pub use cubical::*;
pub use dep_type::*;
pub use literal::*;
pub use sort::*;
pub use variable::*;

/// A term of the core language.
#[derive(Debug, Clone, PartialEq)]
pub enum Term {
    // Variables
    //
    //
    Local(LocalTerm),
    Free(FreeTerm),
    LetFree(LetFreeTerm),

    // Type formers
    //
    //
    DepType(DepTypeTerm),
    Sort(SortTerm),
    Eq(EqTerm),
    PartialTy(PartialTyTerm),
    DimTy(DimTyTerm),
    Data(DataCall),
    Class(ClassCall),

    // Canonical forms
    //
    //
    Lam(LamTerm),
    Tup(TupTerm),
    Con(ConCall),
    New(NewTerm),
    Str(StringTerm),
    Int(IntegerTerm),
    List(ListTerm),
    Partial(PartialTerm),
    Dim(DimTerm),
    Coe(CoeTerm),
    ClassCast(ClassCastTerm),

    // Eliminators
    //
    //
    App(AppTerm),
    Proj(ProjTerm),
    PApp(PAppTerm),
    Member(MemberCall),

    // Calls which may unfold
    //
    //
    Fn(FnCall),
    Prim(PrimCall),
    Meta(MetaCall),
}

macro_rules! with_variant {
    ($term:expr, $inner:ident => $body:expr) => {
        match $term {
            Term::Local($inner) => $body,
            Term::Free($inner) => $body,
            Term::LetFree($inner) => $body,
            Term::DepType($inner) => $body,
            Term::Sort($inner) => $body,
            Term::Eq($inner) => $body,
            Term::PartialTy($inner) => $body,
            Term::DimTy($inner) => $body,
            Term::Data($inner) => $body,
            Term::Class($inner) => $body,
            Term::Lam($inner) => $body,
            Term::Tup($inner) => $body,
            Term::Con($inner) => $body,
            Term::New($inner) => $body,
            Term::Str($inner) => $body,
            Term::Int($inner) => $body,
            Term::List($inner) => $body,
            Term::Partial($inner) => $body,
            Term::Dim($inner) => $body,
            Term::Coe($inner) => $body,
            Term::ClassCast($inner) => $body,
            Term::App($inner) => $body,
            Term::Proj($inner) => $body,
            Term::PApp($inner) => $body,
            Term::Member($inner) => $body,
            Term::Fn($inner) => $body,
            Term::Prim($inner) => $body,
            Term::Meta($inner) => $body,
        }
    };
}

impl Term {
    pub const TYPE0: Term = Term::Sort(SortTerm::TYPE0);

    /// Type formers, compared with each other structurally.
    pub fn is_formation(&self) -> bool {
        matches!(
            self,
            Term::DepType(_)
                | Term::Sort(_)
                | Term::Eq(_)
                | Term::PartialTy(_)
                | Term::DimTy(_)
                | Term::Data(_)
                | Term::Class(_)
                | Term::Prim(PrimCall { id: PrimId::String, .. })
        )
    }

    pub fn free(var: &crate::LocalVar) -> Term {
        Term::Free(FreeTerm { var: var.clone() })
    }

    /// Rebuild the term with `rw` applied to each immediate subterm.
    pub fn descend<R: Rewrite>(&self, depth: usize, rw: &R) -> Term {
        with_variant!(self, t => Term::from(t.descend(depth, rw)))
    }

    /// Visit each immediate subterm. Binders are opened with a placeholder variable.
    pub fn visit(&self, f: &mut dyn FnMut(&Term)) {
        with_variant!(self, t => t.visit(f))
    }
}

/// Display names of the binders that have been opened while printing a term.
pub(crate) struct DocCx<'c> {
    pub(crate) cfg: &'c PrintCfg,
    names: Vec<String>,
}

impl<'c> DocCx<'c> {
    pub(crate) fn new(cfg: &'c PrintCfg) -> Self {
        DocCx { cfg, names: Vec::new() }
    }

    pub(crate) fn push(&mut self, hint: &str) -> String {
        let name = format!("{hint}{}", self.names.len());
        self.names.push(name.clone());
        name
    }

    pub(crate) fn pop(&mut self) {
        self.names.pop();
    }

    pub(crate) fn local(&self, idx: usize) -> String {
        match self.names.len().checked_sub(idx + 1) {
            Some(lvl) => self.names[lvl].clone(),
            None => format!("^{idx}"),
        }
    }
}

/// Like [Print], but the produced document owns all of its text.
///
/// This is what allows binders to be opened while printing.
pub(crate) trait Doc {
    fn doc<'a>(&self, cx: &mut DocCx<'_>, alloc: &'a Alloc<'a>, prec: Precedence) -> Builder<'a>;
}

impl Doc for Term {
    fn doc<'a>(&self, cx: &mut DocCx<'_>, alloc: &'a Alloc<'a>, prec: Precedence) -> Builder<'a> {
        with_variant!(self, t => t.doc(cx, alloc, prec))
    }
}

macro_rules! print_via_doc {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Print for $ty {
                fn print_prec<'a>(
                    &'a self,
                    cfg: &PrintCfg,
                    alloc: &'a Alloc<'a>,
                    prec: Precedence,
                ) -> Builder<'a> {
                    self.doc(&mut DocCx::new(cfg), alloc, prec)
                }
            }
        )*
    };
}

print_via_doc!(Term, SortTerm, DepTypeTerm, EqTerm, DataCall, ClassCall, MetaCall);

impl Print for Closure {
    fn print_prec<'a>(
        &'a self,
        cfg: &PrintCfg,
        alloc: &'a Alloc<'a>,
        _prec: Precedence,
    ) -> Builder<'a> {
        use pretty::DocAllocator;
        use printer::theme::ThemeExt;
        use printer::tokens::{DOT, LAMBDA};

        let (name, body) = self.doc_open(&mut DocCx::new(cfg), alloc, "x", PREC_NONE);
        alloc.keyword(LAMBDA).append(name).append(DOT).append(alloc.space()).append(body)
    }
}
