//! Typing contexts of free variables

use printer::tokens::{COLON, COMMA};
use printer::{Alloc, Builder, DocAllocator, Print, PrintCfg};

use crate::{LocalVar, Term};

/// The free variables in scope together with their types.
///
/// The types are closed terms and may only mention variables bound before them.
#[derive(Debug, Clone, Default)]
pub struct LocalCtx {
    bound: Vec<(LocalVar, Term)>,
}

impl LocalCtx {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.bound.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bound.is_empty()
    }

    pub fn push(&mut self, var: LocalVar, typ: Term) {
        self.bound.push((var, typ));
    }

    pub fn pop(&mut self) -> Option<(LocalVar, Term)> {
        self.bound.pop()
    }

    /// The type of `var`, if it is in scope.
    pub fn get(&self, var: &LocalVar) -> Option<&Term> {
        self.bound.iter().rev().find(|(v, _)| v == var).map(|(_, typ)| typ)
    }

    pub fn contains(&self, var: &LocalVar) -> bool {
        self.get(var).is_some()
    }

    /// The variables in scope, outermost first.
    pub fn vars(&self) -> impl Iterator<Item = &LocalVar> {
        self.bound.iter().map(|(var, _)| var)
    }

    /// The variables as arguments of a spine, outermost first.
    pub fn as_args(&self) -> Vec<Term> {
        self.vars().map(Term::free).collect()
    }
}

impl Print for LocalCtx {
    fn print<'a>(&'a self, cfg: &PrintCfg, alloc: &'a Alloc<'a>) -> Builder<'a> {
        let sep = alloc.text(COMMA).append(alloc.space());
        let bound = self.bound.iter().map(|(var, typ)| {
            var.print(cfg, alloc).append(alloc.space()).append(COLON).append(alloc.space()).append(typ.print(cfg, alloc))
        });
        alloc.intersperse(bound, sep).brackets()
    }
}

/// Anything that owns a [LocalCtx] which grows when entering binders.
pub trait ContextHolder {
    fn ctx_mut(&mut self) -> &mut LocalCtx;

    /// Run `f` with `var : typ` in scope.
    ///
    /// The variable is removed again before returning, whatever `f` returns.
    fn bind_single<O, F>(&mut self, var: LocalVar, typ: Term, f: F) -> O
    where
        Self: Sized,
        F: FnOnce(&mut Self) -> O,
    {
        self.ctx_mut().push(var, typ);
        let res = f(self);
        self.ctx_mut().pop();
        res
    }
}

impl ContextHolder for LocalCtx {
    fn ctx_mut(&mut self) -> &mut LocalCtx {
        self
    }
}
