//! Top-level definitions as seen by the elaborator.
//!
//! Definitions are shared through [DefRef]s and compared by identity.

use std::fmt;
use std::ops::Deref;
use std::rc::Rc;

use crate::{Closure, DTKind, DataCall, DepTypeTerm, LocalTerm, SortTerm, Term};

pub trait Named {
    fn name(&self) -> &str;
}

/// A reference to a definition. Two references are equal iff they point to the same definition.
pub struct DefRef<D>(pub Rc<D>);

pub type FnRef = DefRef<FnDef>;
pub type DataRef = DefRef<DataDef>;
pub type ConRef = DefRef<ConDef>;
pub type ClassRef = DefRef<ClassDef>;

impl<D> DefRef<D> {
    pub fn new(def: D) -> Self {
        DefRef(Rc::new(def))
    }
}

impl<D> Clone for DefRef<D> {
    fn clone(&self) -> Self {
        DefRef(self.0.clone())
    }
}

impl<D> PartialEq for DefRef<D> {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl<D> Eq for DefRef<D> {}

impl<D> Deref for DefRef<D> {
    type Target = D;

    fn deref(&self) -> &D {
        &self.0
    }
}

impl<D: Named> fmt::Debug for DefRef<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.0.name())
    }
}

/// A parameter of a telescope. Its type may refer to the previous parameters, the
/// nearest one being index 0.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: String,
    pub typ: Term,
}

/// A telescope of parameters together with a result type that may refer to all of them.
#[derive(Debug, Clone, PartialEq)]
pub struct Signature {
    pub params: Vec<Param>,
    pub result: Term,
}

impl Signature {
    pub fn arity(&self) -> usize {
        self.params.len()
    }

    /// The type of parameter `i` given the arguments for all earlier parameters.
    pub fn param(&self, i: usize, args: &[Term]) -> Term {
        self.params[i].typ.instantiate(&args[..i])
    }

    pub fn result(&self, args: &[Term]) -> Term {
        self.result.instantiate(args)
    }

    /// The signature as a nested function type.
    pub fn make_pi(&self) -> Term {
        self.params.iter().rev().fold(self.result.clone(), |body, param| {
            Term::DepType(DepTypeTerm {
                kind: DTKind::Pi,
                param: Box::new(param.typ.clone()),
                body: Closure::Idx(Box::new(body)),
            })
        })
    }
}

#[derive(Debug)]
pub struct FnDef {
    pub name: String,
    pub signature: Signature,
    /// The body in terms of the parameters. Definitions without a body never unfold.
    pub body: Option<Term>,
}

#[derive(Debug)]
pub struct DataDef {
    pub name: String,
    pub signature: Signature,
}

#[derive(Debug)]
pub struct ConDef {
    pub name: String,
    pub data: DataRef,
    /// The parameters of the data type followed by the constructor's own parameters.
    pub signature: Signature,
}

impl ConDef {
    /// `params` may refer to the parameters of `data` as well as to each other.
    pub fn new(name: &str, data: DataRef, params: Vec<Param>) -> ConDef {
        let owner = data.signature.params.clone();
        let arity = owner.len() + params.len();
        let owner_args = (0..owner.len()).map(|j| Term::Local(LocalTerm { idx: arity - 1 - j })).collect();
        let result = Term::Data(DataCall { data: data.clone(), ulift: 0, args: owner_args });
        let params = owner.into_iter().chain(params).collect();
        ConDef { name: name.to_owned(), data, signature: Signature { params, result } }
    }

    /// Number of parameters inherited from the data type.
    pub fn owner_arity(&self) -> usize {
        self.data.signature.arity()
    }
}

/// A class. Every member's type may mention the instance it is projected from.
#[derive(Debug)]
pub struct ClassDef {
    pub name: String,
    pub sort: SortTerm,
    pub members: Vec<MemberDef>,
}

#[derive(Debug)]
pub struct MemberDef {
    pub name: String,
    /// The type of the member, abstracted over the instance.
    pub typ: Closure,
}

impl Named for FnDef {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Named for DataDef {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Named for ConDef {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Named for ClassDef {
    fn name(&self) -> &str {
        &self.name
    }
}
