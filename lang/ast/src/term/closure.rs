use std::fmt;
use std::rc::Rc;

use printer::{Alloc, Builder, Precedence};

use crate::traits::Rewrite;
use crate::{FreeTerm, LocalVar, Term};

use super::{Doc, DocCx};

/// A term with one more bound variable.
///
/// The three representations are interchangeable, [Closure::apply] is the only way to look
/// inside a closure. Which one is used depends on where the closure is built:
///
/// * `Idx` bodies refer to the bound variable as `LocalTerm { idx: 0 }`.
/// * `Named` bodies refer to it as a free variable that is replaced on application.
/// * `Native` closures are plain functions. They are used for terms that are computed by
///   the normalizer and have no syntax of their own.
#[derive(Clone)]
pub enum Closure {
    Idx(Box<Term>),
    Named(Box<Term>, LocalVar),
    Native(Rc<dyn Fn(Term) -> Term>),
}

impl Closure {
    pub fn native(f: impl Fn(Term) -> Term + 'static) -> Closure {
        Closure::Native(Rc::new(f))
    }

    /// The closure ignoring its argument.
    pub fn constant(body: Term) -> Closure {
        Closure::Idx(Box::new(body.shift(1)))
    }

    pub fn apply(&self, arg: Term) -> Term {
        match self {
            Closure::Idx(body) => body.instantiate(&[arg]),
            Closure::Named(body, var) => body.replace(var, &arg),
            Closure::Native(f) => f(arg),
        }
    }

    pub fn apply_var(&self, var: &LocalVar) -> Term {
        self.apply(Term::Free(FreeTerm { var: var.clone() }))
    }

    /// Rebuild the closure with `rw` applied to its body.
    ///
    /// `depth` counts the binders between the root of the rewrite and this closure.
    pub fn descend<R: Rewrite>(&self, depth: usize, rw: &R) -> Closure {
        match self {
            Closure::Idx(body) => Closure::Idx(rw.rewrite_boxed(depth + 1, body)),
            Closure::Named(body, var) => Closure::Named(rw.rewrite_boxed(depth, body), var.clone()),
            Closure::Native(f) => {
                let f = f.clone();
                let rw = rw.clone();
                Closure::native(move |arg| rw.rewrite(depth, &f(arg)))
            }
        }
    }

    /// The body, opened with a variable that is never part of any context.
    pub fn peek(&self) -> Term {
        self.apply_var(&LocalVar::placeholder("_"))
    }

    pub(crate) fn doc_open<'a>(
        &self,
        cx: &mut DocCx<'_>,
        alloc: &'a Alloc<'a>,
        hint: &str,
        prec: Precedence,
    ) -> (String, Builder<'a>) {
        match self {
            Closure::Idx(body) => {
                let name = cx.push(hint);
                let doc = body.doc(cx, alloc, prec);
                cx.pop();
                (name, doc)
            }
            Closure::Named(body, var) => (var.name.to_string(), body.doc(cx, alloc, prec)),
            Closure::Native(f) => {
                let name = cx.push(hint);
                let body = f(Term::Free(FreeTerm { var: LocalVar::placeholder(&name) }));
                let doc = body.doc(cx, alloc, prec);
                cx.pop();
                (name, doc)
            }
        }
    }
}

impl PartialEq for Closure {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Closure::Idx(l), Closure::Idx(r)) => l == r,
            (Closure::Named(l, x), Closure::Named(r, y)) => x == y && l == r,
            (Closure::Native(f), Closure::Native(g)) => Rc::ptr_eq(f, g),
            _ => false,
        }
    }
}

impl fmt::Debug for Closure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Closure::Idx(body) => f.debug_tuple("Idx").field(body).finish(),
            Closure::Named(body, var) => f.debug_tuple("Named").field(body).field(var).finish(),
            Closure::Native(_) => f.write_str("Native(..)"),
        }
    }
}
