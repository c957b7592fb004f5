use pretty::DocAllocator;
use printer::theme::ThemeExt;
use printer::tokens::COMMA;
use printer::{Alloc, Builder, PREC_NONE, Precedence};

use crate::traits::{Descend, Rewrite, Visit};
use crate::{ConCall, ConRef, DataCall, Term};

use super::{Doc, DocCx};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringTerm {
    pub value: String,
}

/// The constructors a natural number literal stands for.
#[derive(Debug, Clone, PartialEq)]
pub struct NatShape {
    pub zero: ConRef,
    pub suc: ConRef,
}

/// A natural number literal of the data type `typ`.
#[derive(Debug, Clone, PartialEq)]
pub struct IntegerTerm {
    pub repr: u64,
    pub shape: NatShape,
    pub typ: DataCall,
}

impl IntegerTerm {
    /// The outermost constructor of the literal.
    pub fn constructor_form(&self) -> ConCall {
        let owner_args = self.typ.args.clone();
        match self.repr.checked_sub(1) {
            None => ConCall { con: self.shape.zero.clone(), ulift: 0, owner_args, args: vec![] },
            Some(pred) => ConCall {
                con: self.shape.suc.clone(),
                ulift: 0,
                owner_args,
                args: vec![Term::Int(IntegerTerm { repr: pred, ..self.clone() })],
            },
        }
    }
}

/// The constructors a list literal stands for.
#[derive(Debug, Clone, PartialEq)]
pub struct ListShape {
    pub nil: ConRef,
    pub cons: ConRef,
}

/// A list literal of the data type `typ`.
#[derive(Debug, Clone, PartialEq)]
pub struct ListTerm {
    pub repr: Vec<Term>,
    pub shape: ListShape,
    pub typ: DataCall,
}

impl ListTerm {
    /// The outermost constructor of the literal.
    pub fn constructor_form(&self) -> ConCall {
        let owner_args = self.typ.args.clone();
        match self.repr.split_first() {
            None => ConCall { con: self.shape.nil.clone(), ulift: 0, owner_args, args: vec![] },
            Some((head, tail)) => {
                let tail = ListTerm { repr: tail.to_vec(), ..self.clone() };
                ConCall {
                    con: self.shape.cons.clone(),
                    ulift: 0,
                    owner_args,
                    args: vec![head.clone(), Term::List(tail)],
                }
            }
        }
    }
}

impl From<StringTerm> for Term {
    fn from(val: StringTerm) -> Self {
        Term::Str(val)
    }
}

impl From<IntegerTerm> for Term {
    fn from(val: IntegerTerm) -> Self {
        Term::Int(val)
    }
}

impl From<ListTerm> for Term {
    fn from(val: ListTerm) -> Self {
        Term::List(val)
    }
}

impl Descend for StringTerm {
    fn descend<R: Rewrite>(&self, _depth: usize, _rw: &R) -> Self {
        self.clone()
    }
}

impl Descend for IntegerTerm {
    fn descend<R: Rewrite>(&self, depth: usize, rw: &R) -> Self {
        IntegerTerm { repr: self.repr, shape: self.shape.clone(), typ: self.typ.descend(depth, rw) }
    }
}

impl Descend for ListTerm {
    fn descend<R: Rewrite>(&self, depth: usize, rw: &R) -> Self {
        ListTerm {
            repr: rw.rewrite_all(depth, &self.repr),
            shape: self.shape.clone(),
            typ: self.typ.descend(depth, rw),
        }
    }
}

impl Visit for StringTerm {
    fn visit(&self, _f: &mut dyn FnMut(&Term)) {}
}

impl Visit for IntegerTerm {
    fn visit(&self, f: &mut dyn FnMut(&Term)) {
        self.typ.visit(f);
    }
}

impl Visit for ListTerm {
    fn visit(&self, f: &mut dyn FnMut(&Term)) {
        for x in &self.repr {
            f(x);
        }
        self.typ.visit(f);
    }
}

impl Doc for StringTerm {
    fn doc<'a>(&self, _cx: &mut DocCx<'_>, alloc: &'a Alloc<'a>, _prec: Precedence) -> Builder<'a> {
        alloc.ctor(format!("{:?}", self.value))
    }
}

impl Doc for IntegerTerm {
    fn doc<'a>(&self, _cx: &mut DocCx<'_>, alloc: &'a Alloc<'a>, _prec: Precedence) -> Builder<'a> {
        alloc.ctor(self.repr.to_string())
    }
}

impl Doc for ListTerm {
    fn doc<'a>(&self, cx: &mut DocCx<'_>, alloc: &'a Alloc<'a>, _prec: Precedence) -> Builder<'a> {
        let elems: Vec<_> = self.repr.iter().map(|x| x.doc(cx, alloc, PREC_NONE)).collect();
        alloc.intersperse(elems, alloc.text(COMMA).append(alloc.space())).group().brackets()
    }
}
