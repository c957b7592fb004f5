//! A small signature to write tests against
//!
//! ```text
//! data Nat : Type 0 | zero | suc (n : Nat)
//! data List (A : Type 0) : Type 0 | nil | cons (x : A) (xs : List A)
//! def id (A : Type 0) (x : A) : A = x
//! def opaque (n : Nat) : Nat
//! class Pointed : Type 0 | pt : Nat | next : Nat
//! ```

use ast::*;

pub fn init_logging() {
    let _ = env_logger::builder().format_timestamp(None).is_test(true).try_init();
}

pub fn local(idx: usize) -> Term {
    Term::Local(LocalTerm { idx })
}

pub fn string(value: &str) -> Term {
    Term::Str(StringTerm { value: value.to_owned() })
}

fn param(name: &str, typ: Term) -> Param {
    Param { name: name.to_owned(), typ }
}

pub struct Sig {
    pub nat: DataRef,
    pub zero: ConRef,
    pub suc: ConRef,
    pub list: DataRef,
    pub nil: ConRef,
    pub cons: ConRef,
    pub id: FnRef,
    pub opaque: FnRef,
    pub pointed: ClassRef,
}

impl Sig {
    pub fn new() -> Sig {
        init_logging();
        let nat = DataRef::new(DataDef { name: "Nat".to_owned(), signature: Signature { params: vec![], result: Term::TYPE0 } });
        let nat_type = Term::Data(DataCall { data: nat.clone(), ulift: 0, args: vec![] });
        let zero = ConRef::new(ConDef::new("zero", nat.clone(), vec![]));
        let suc = ConRef::new(ConDef::new("suc", nat.clone(), vec![param("n", nat_type.clone())]));

        let list = DataRef::new(DataDef {
            name: "List".to_owned(),
            signature: Signature { params: vec![param("A", Term::TYPE0)], result: Term::TYPE0 },
        });
        let nil = ConRef::new(ConDef::new("nil", list.clone(), vec![]));
        let list_of_a = Term::Data(DataCall { data: list.clone(), ulift: 0, args: vec![local(1)] });
        let cons = ConRef::new(ConDef::new("cons", list.clone(), vec![param("x", local(0)), param("xs", list_of_a)]));

        let id = FnRef::new(FnDef {
            name: "id".to_owned(),
            signature: Signature { params: vec![param("A", Term::TYPE0), param("x", local(0))], result: local(1) },
            body: Some(local(0)),
        });
        let opaque = FnRef::new(FnDef {
            name: "opaque".to_owned(),
            signature: Signature { params: vec![param("n", nat_type.clone())], result: nat_type.clone() },
            body: None,
        });

        let pointed = ClassRef::new(ClassDef {
            name: "Pointed".to_owned(),
            sort: SortTerm::TYPE0,
            members: vec![
                MemberDef { name: "pt".to_owned(), typ: Closure::constant(nat_type.clone()) },
                MemberDef { name: "next".to_owned(), typ: Closure::constant(nat_type) },
            ],
        });

        Sig { nat, zero, suc, list, nil, cons, id, opaque, pointed }
    }

    pub fn nat(&self) -> Term {
        Term::Data(DataCall { data: self.nat.clone(), ulift: 0, args: vec![] })
    }

    pub fn zero(&self) -> Term {
        Term::Con(ConCall { con: self.zero.clone(), ulift: 0, owner_args: vec![], args: vec![] })
    }

    pub fn suc(&self, n: Term) -> Term {
        Term::Con(ConCall { con: self.suc.clone(), ulift: 0, owner_args: vec![], args: vec![n] })
    }

    pub fn lit(&self, repr: u64) -> Term {
        Term::Int(IntegerTerm {
            repr,
            shape: NatShape { zero: self.zero.clone(), suc: self.suc.clone() },
            typ: DataCall { data: self.nat.clone(), ulift: 0, args: vec![] },
        })
    }

    pub fn list(&self, elem: Term) -> Term {
        Term::Data(DataCall { data: self.list.clone(), ulift: 0, args: vec![elem] })
    }

    pub fn nil(&self, elem: Term) -> Term {
        Term::Con(ConCall { con: self.nil.clone(), ulift: 0, owner_args: vec![elem], args: vec![] })
    }

    pub fn cons(&self, elem: Term, head: Term, tail: Term) -> Term {
        Term::Con(ConCall { con: self.cons.clone(), ulift: 0, owner_args: vec![elem], args: vec![head, tail] })
    }

    pub fn list_lit(&self, elem: Term, repr: Vec<Term>) -> Term {
        Term::List(ListTerm {
            repr,
            shape: ListShape { nil: self.nil.clone(), cons: self.cons.clone() },
            typ: DataCall { data: self.list.clone(), ulift: 0, args: vec![elem] },
        })
    }

    pub fn id(&self, typ: Term, arg: Term) -> Term {
        Term::Fn(FnCall { def: self.id.clone(), ulift: 0, args: vec![typ, arg] })
    }

    pub fn opaque(&self, arg: Term) -> Term {
        Term::Fn(FnCall { def: self.opaque.clone(), ulift: 0, args: vec![arg] })
    }

    /// `Pointed` with the first members fixed to `fixed`.
    pub fn pointed(&self, fixed: Vec<Term>) -> ClassCall {
        ClassCall { class: self.pointed.clone(), ulift: 0, args: fixed.into_iter().map(Closure::constant).collect() }
    }

    pub fn new_pointed(&self, pt: Term, next: Term) -> Term {
        Term::New(NewTerm { inner: self.pointed(vec![pt, next]) })
    }
}
