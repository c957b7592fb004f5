use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use derivative::Derivative;
use pretty::DocAllocator;
use printer::{Alloc, Builder, Print, PrintCfg};

/// A variable of the typing context.
///
/// Two variables are the same iff their ids agree, the name is only kept for printing.
#[derive(Debug, Clone, Derivative)]
#[derivative(Eq, PartialEq, Hash)]
pub struct LocalVar {
    #[derivative(PartialEq = "ignore", Hash = "ignore")]
    pub name: Rc<str>,
    pub id: u64,
}

impl LocalVar {
    const PLACEHOLDER_ID: u64 = u64::MAX;

    /// A variable no [NameGenerator] ever hands out.
    ///
    /// Used to open native closures when a term is only inspected, never compared.
    pub fn placeholder(name: &str) -> LocalVar {
        LocalVar { name: name.into(), id: Self::PLACEHOLDER_ID }
    }

    pub fn is_placeholder(&self) -> bool {
        self.id == Self::PLACEHOLDER_ID
    }

    pub(crate) fn display(&self, cfg: &PrintCfg) -> String {
        if cfg.print_metavar_ids && !self.is_placeholder() {
            format!("{}#{}", self.name, self.id)
        } else {
            self.name.to_string()
        }
    }
}

impl fmt::Display for LocalVar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

impl Print for LocalVar {
    fn print<'a>(&'a self, cfg: &PrintCfg, alloc: &'a Alloc<'a>) -> Builder<'a> {
        alloc.text(self.display(cfg))
    }
}

/// Hands out fresh variable and metavariable ids.
///
/// There is no global counter: whoever needs fresh names has to get hold of a generator,
/// usually the one owned by the typechecker state.
#[derive(Debug, Default)]
pub struct NameGenerator {
    next: Cell<u64>,
}

impl NameGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&self) -> u64 {
        let id = self.next.get();
        self.next.set(id + 1);
        id
    }

    pub fn fresh(&self, name: &str) -> LocalVar {
        LocalVar { name: name.into(), id: self.next_id() }
    }
}
