use crate::{Closure, Term};

/// Read-only access to the immediate subterms of a node.
pub trait Visit {
    fn visit(&self, f: &mut dyn FnMut(&Term));
}

impl Visit for Closure {
    fn visit(&self, f: &mut dyn FnMut(&Term)) {
        f(&self.peek())
    }
}

impl<T: Visit> Visit for Vec<T> {
    fn visit(&self, f: &mut dyn FnMut(&Term)) {
        self.iter().for_each(|x| x.visit(f))
    }
}

/// Visit `term` and all of its subterms, parents first.
pub fn walk(term: &Term, f: &mut dyn FnMut(&Term)) {
    f(term);
    term.visit(&mut |sub| walk(sub, f));
}
