use pretty::DocAllocator;
use printer::theme::ThemeExt;
use printer::tokens::{ISET, SET, TYPE};
use printer::util::ParensIfExt;
use printer::{Alloc, Builder, PREC_ARG, Precedence};

use crate::Term;
use crate::traits::{Descend, Rewrite, Visit};

use super::{Doc, DocCx};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortKind {
    Type,
    Set,
    /// The universe of the interval. It has no levels.
    ISet,
}

/// A universe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SortTerm {
    pub kind: SortKind,
    pub lift: u32,
}

impl SortTerm {
    pub const TYPE0: SortTerm = SortTerm { kind: SortKind::Type, lift: 0 };
    pub const SET0: SortTerm = SortTerm { kind: SortKind::Set, lift: 0 };
    pub const ISET: SortTerm = SortTerm { kind: SortKind::ISet, lift: 0 };

    pub fn new(kind: SortKind, lift: u32) -> SortTerm {
        match kind {
            SortKind::ISet => SortTerm::ISET,
            _ => SortTerm { kind, lift },
        }
    }

    /// The universe this universe lives in.
    pub fn succ(self) -> SortTerm {
        match self.kind {
            SortKind::Type | SortKind::Set => SortTerm { kind: self.kind, lift: self.lift + 1 },
            SortKind::ISet => SortTerm::SET0,
        }
    }

    pub fn elevate(self, lift: u32) -> SortTerm {
        SortTerm::new(self.kind, self.lift + lift)
    }

    /// Cumulativity: `self` is contained in `other`.
    ///
    /// `ISet` sits below every `Set`, but not below any `Type`.
    pub fn is_sub(self, other: SortTerm) -> bool {
        match self.kind {
            SortKind::Type => other.kind == SortKind::Type && self.lift <= other.lift,
            SortKind::ISet => matches!(other.kind, SortKind::Set | SortKind::ISet),
            SortKind::Set => other.kind == SortKind::Set && self.lift <= other.lift,
        }
    }

    /// The universe of a function type with domain in `dom` and codomain in `cod`.
    pub fn lub_pi(dom: SortTerm, cod: SortTerm) -> SortTerm {
        let lift = dom.lift.max(cod.lift);
        match (dom.kind, cod.kind) {
            (SortKind::Type, SortKind::Type) => SortTerm { kind: SortKind::Type, lift },
            // Only the domain's level counts here.
            (SortKind::Type, _) => SortTerm { kind: SortKind::Set, lift: dom.lift },
            (SortKind::ISet, SortKind::ISet) => SortTerm::SET0,
            (SortKind::ISet, _) => cod,
            (SortKind::Set, _) => SortTerm { kind: SortKind::Set, lift },
        }
    }

    /// The universe of a pair type with components in `fst` and `snd`.
    pub fn lub_sigma(fst: SortTerm, snd: SortTerm) -> SortTerm {
        let lift = fst.lift.max(snd.lift);
        if fst.kind == SortKind::Set || snd.kind == SortKind::Set {
            SortTerm { kind: SortKind::Set, lift }
        } else if fst.kind == SortKind::Type || snd.kind == SortKind::Type {
            SortTerm { kind: SortKind::Type, lift }
        } else {
            SortTerm::ISET
        }
    }
}

impl From<SortTerm> for Term {
    fn from(val: SortTerm) -> Self {
        Term::Sort(val)
    }
}

impl Descend for SortTerm {
    fn descend<R: Rewrite>(&self, _depth: usize, _rw: &R) -> Self {
        *self
    }
}

impl Visit for SortTerm {
    fn visit(&self, _f: &mut dyn FnMut(&Term)) {}
}

impl Doc for SortTerm {
    fn doc<'a>(&self, _cx: &mut DocCx<'_>, alloc: &'a Alloc<'a>, prec: Precedence) -> Builder<'a> {
        let keyword = match self.kind {
            SortKind::Type => TYPE,
            SortKind::Set => SET,
            SortKind::ISet => return alloc.typ(ISET),
        };
        alloc
            .typ(keyword)
            .append(alloc.space())
            .append(self.lift.to_string())
            .group()
            .parens_if(prec >= PREC_ARG)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ty(lift: u32) -> SortTerm {
        SortTerm { kind: SortKind::Type, lift }
    }

    fn set(lift: u32) -> SortTerm {
        SortTerm { kind: SortKind::Set, lift }
    }

    #[test]
    fn cumulativity() {
        assert!(ty(0).is_sub(ty(1)));
        assert!(!ty(1).is_sub(ty(0)));
        assert!(SortTerm::ISET.is_sub(set(0)));
        assert!(!SortTerm::ISET.is_sub(ty(3)));
        assert!(!set(0).is_sub(ty(0)));
    }

    #[test]
    fn succ_of_iset_is_set() {
        assert_eq!(SortTerm::ISET.succ(), set(0));
        assert_eq!(ty(2).succ(), ty(3));
    }

    #[test]
    fn lub_rules() {
        assert_eq!(SortTerm::lub_pi(ty(1), ty(0)), ty(1));
        assert_eq!(SortTerm::lub_pi(ty(0), SortTerm::ISET), set(0));
        assert_eq!(SortTerm::lub_pi(ty(1), set(3)), set(1));
        assert_eq!(SortTerm::lub_pi(SortTerm::ISET, ty(2)), ty(2));
        assert_eq!(SortTerm::lub_pi(SortTerm::ISET, SortTerm::ISET), set(0));
        assert_eq!(SortTerm::lub_sigma(ty(0), set(1)), set(1));
        assert_eq!(SortTerm::lub_sigma(SortTerm::ISET, ty(1)), ty(1));
        assert_eq!(SortTerm::lub_sigma(SortTerm::ISET, SortTerm::ISET), SortTerm::ISET);
    }
}
