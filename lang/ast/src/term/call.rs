use pretty::DocAllocator;
use printer::theme::ThemeExt;
use printer::tokens::{AS, CARET, COLONEQ, COMMA, CONCAT, DOT, NEW, QUESTION_MARK, STRING};
use printer::util::ParensIfExt;
use printer::{Alloc, Builder, PREC_ARG, PREC_ARROW, PREC_NONE, Precedence};

use crate::traits::{Descend, Rewrite, Visit};
use crate::{
    AppTerm, ClassRef, Closure, ConRef, DataRef, FnRef, MetaVar, Param, Signature, SortTerm, Term,
};

use super::{Doc, DocCx};

/// A fully applied data type.
#[derive(Debug, Clone, PartialEq)]
pub struct DataCall {
    pub data: DataRef,
    pub ulift: u32,
    pub args: Vec<Term>,
}

/// A fully applied constructor. `owner_args` are the arguments of its data type.
#[derive(Debug, Clone, PartialEq)]
pub struct ConCall {
    pub con: ConRef,
    pub ulift: u32,
    pub owner_args: Vec<Term>,
    pub args: Vec<Term>,
}

impl ConCall {
    /// The arguments matching the constructor's signature.
    pub fn full_args(&self) -> Vec<Term> {
        self.owner_args.iter().chain(&self.args).cloned().collect()
    }
}

/// A fully applied function.
#[derive(Debug, Clone, PartialEq)]
pub struct FnCall {
    pub def: FnRef,
    pub ulift: u32,
    pub args: Vec<Term>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimId {
    /// The type of strings
    String,
    /// Concatenation of two strings
    StringConcat,
}

impl PrimId {
    pub fn name(self) -> &'static str {
        match self {
            PrimId::String => STRING,
            PrimId::StringConcat => CONCAT,
        }
    }

    pub fn signature(self) -> Signature {
        match self {
            PrimId::String => Signature { params: vec![], result: Term::Sort(SortTerm::TYPE0) },
            PrimId::StringConcat => Signature {
                params: vec![
                    Param { name: "a".to_owned(), typ: PrimCall::string() },
                    Param { name: "b".to_owned(), typ: PrimCall::string() },
                ],
                result: PrimCall::string(),
            },
        }
    }
}

/// A fully applied primitive.
#[derive(Debug, Clone, PartialEq)]
pub struct PrimCall {
    pub id: PrimId,
    pub ulift: u32,
    pub args: Vec<Term>,
}

impl PrimCall {
    pub fn string() -> Term {
        Term::Prim(PrimCall { id: PrimId::String, ulift: 0, args: vec![] })
    }
}

/// A class type. `args` fix the first members, each one abstracted over the instance.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassCall {
    pub class: ClassRef,
    pub ulift: u32,
    pub args: Vec<Closure>,
}

impl ClassCall {
    /// Whether every member is fixed by the type.
    pub fn is_complete(&self) -> bool {
        self.args.len() >= self.class.members.len()
    }
}

/// Projection of member `index` out of an instance of `class`.
#[derive(Debug, Clone, PartialEq)]
pub struct MemberCall {
    pub of: Box<Term>,
    pub class: ClassRef,
    pub index: usize,
    pub ulift: u32,
}

impl MemberCall {
    /// Project a member, reducing if the member is known from `of`.
    pub fn make(of: Term, class: ClassRef, index: usize, ulift: u32) -> Term {
        match of {
            Term::New(new) if index < new.inner.args.len() => {
                let body = new.inner.args[index].clone();
                body.apply(Term::New(new))
            }
            Term::ClassCast(cast) => {
                let ClassCastTerm { subterm, remember, forget, .. } = cast;
                match remember.iter().chain(&forget).nth(index) {
                    Some(fixed) => fixed.apply(*subterm),
                    None => MemberCall::make(*subterm, class, index, ulift),
                }
            }
            of => Term::Member(MemberCall { of: Box::new(of), class, index, ulift }),
        }
    }

    /// The declared type of the member, at the instance `of`.
    pub fn member_type(&self) -> Term {
        self.class.members[self.index].typ.apply((*self.of).clone()).elevate(self.ulift)
    }
}

/// An instance of a class which fixes every member.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTerm {
    pub inner: ClassCall,
}

/// `subterm` seen as an instance of `class`.
///
/// The members in `remember` stay visible in the type, the ones in `forget` are only known
/// to the term.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassCastTerm {
    pub class: ClassRef,
    pub subterm: Box<Term>,
    pub remember: Vec<Closure>,
    pub forget: Vec<Closure>,
}

impl ClassCastTerm {
    /// The class type the cast asserts.
    pub fn class_call(&self) -> ClassCall {
        ClassCall { class: self.class.clone(), ulift: 0, args: self.remember.clone() }
    }
}

/// A metavariable applied to a spine of arguments.
///
/// The first `meta.ctx_size` arguments are the context the metavariable was created in.
#[derive(Debug, Clone, PartialEq)]
pub struct MetaCall {
    pub meta: MetaVar,
    pub args: Vec<Term>,
}

impl MetaCall {
    /// Apply a solution to the spine of a metavariable.
    ///
    /// The solution is open in the `ctx_size` variables of the metavariable's context,
    /// and takes the remaining arguments as lambdas.
    pub fn app(solution: &Term, args: &[Term], ctx_size: usize) -> Term {
        let (ctx, rest) = args.split_at(ctx_size.min(args.len()));
        AppTerm::make_many(solution.instantiate(ctx), rest.iter().cloned())
    }
}

impl From<DataCall> for Term {
    fn from(val: DataCall) -> Self {
        Term::Data(val)
    }
}

impl From<ConCall> for Term {
    fn from(val: ConCall) -> Self {
        Term::Con(val)
    }
}

impl From<FnCall> for Term {
    fn from(val: FnCall) -> Self {
        Term::Fn(val)
    }
}

impl From<PrimCall> for Term {
    fn from(val: PrimCall) -> Self {
        Term::Prim(val)
    }
}

impl From<ClassCall> for Term {
    fn from(val: ClassCall) -> Self {
        Term::Class(val)
    }
}

impl From<MemberCall> for Term {
    fn from(val: MemberCall) -> Self {
        Term::Member(val)
    }
}

impl From<NewTerm> for Term {
    fn from(val: NewTerm) -> Self {
        Term::New(val)
    }
}

impl From<ClassCastTerm> for Term {
    fn from(val: ClassCastTerm) -> Self {
        Term::ClassCast(val)
    }
}

impl From<MetaCall> for Term {
    fn from(val: MetaCall) -> Self {
        Term::Meta(val)
    }
}

impl Descend for DataCall {
    fn descend<R: Rewrite>(&self, depth: usize, rw: &R) -> Self {
        DataCall { data: self.data.clone(), ulift: self.ulift, args: rw.rewrite_all(depth, &self.args) }
    }
}

impl Descend for ConCall {
    fn descend<R: Rewrite>(&self, depth: usize, rw: &R) -> Self {
        ConCall {
            con: self.con.clone(),
            ulift: self.ulift,
            owner_args: rw.rewrite_all(depth, &self.owner_args),
            args: rw.rewrite_all(depth, &self.args),
        }
    }
}

impl Descend for FnCall {
    fn descend<R: Rewrite>(&self, depth: usize, rw: &R) -> Self {
        FnCall { def: self.def.clone(), ulift: self.ulift, args: rw.rewrite_all(depth, &self.args) }
    }
}

impl Descend for PrimCall {
    fn descend<R: Rewrite>(&self, depth: usize, rw: &R) -> Self {
        PrimCall { id: self.id, ulift: self.ulift, args: rw.rewrite_all(depth, &self.args) }
    }
}

impl Descend for ClassCall {
    fn descend<R: Rewrite>(&self, depth: usize, rw: &R) -> Self {
        ClassCall { class: self.class.clone(), ulift: self.ulift, args: self.args.descend(depth, rw) }
    }
}

impl Descend for MemberCall {
    fn descend<R: Rewrite>(&self, depth: usize, rw: &R) -> Self {
        MemberCall {
            of: rw.rewrite_boxed(depth, &self.of),
            class: self.class.clone(),
            index: self.index,
            ulift: self.ulift,
        }
    }
}

impl Descend for NewTerm {
    fn descend<R: Rewrite>(&self, depth: usize, rw: &R) -> Self {
        NewTerm { inner: self.inner.descend(depth, rw) }
    }
}

impl Descend for ClassCastTerm {
    fn descend<R: Rewrite>(&self, depth: usize, rw: &R) -> Self {
        ClassCastTerm {
            class: self.class.clone(),
            subterm: rw.rewrite_boxed(depth, &self.subterm),
            remember: self.remember.descend(depth, rw),
            forget: self.forget.descend(depth, rw),
        }
    }
}

impl Descend for MetaCall {
    fn descend<R: Rewrite>(&self, depth: usize, rw: &R) -> Self {
        MetaCall { meta: self.meta.clone(), args: rw.rewrite_all(depth, &self.args) }
    }
}

fn visit_all(terms: &[Term], f: &mut dyn FnMut(&Term)) {
    for term in terms {
        f(term);
    }
}

impl Visit for DataCall {
    fn visit(&self, f: &mut dyn FnMut(&Term)) {
        visit_all(&self.args, f);
    }
}

impl Visit for ConCall {
    fn visit(&self, f: &mut dyn FnMut(&Term)) {
        visit_all(&self.owner_args, f);
        visit_all(&self.args, f);
    }
}

impl Visit for FnCall {
    fn visit(&self, f: &mut dyn FnMut(&Term)) {
        visit_all(&self.args, f);
    }
}

impl Visit for PrimCall {
    fn visit(&self, f: &mut dyn FnMut(&Term)) {
        visit_all(&self.args, f);
    }
}

impl Visit for ClassCall {
    fn visit(&self, f: &mut dyn FnMut(&Term)) {
        self.args.visit(f);
    }
}

impl Visit for MemberCall {
    fn visit(&self, f: &mut dyn FnMut(&Term)) {
        f(&self.of);
    }
}

impl Visit for NewTerm {
    fn visit(&self, f: &mut dyn FnMut(&Term)) {
        self.inner.visit(f);
    }
}

impl Visit for ClassCastTerm {
    fn visit(&self, f: &mut dyn FnMut(&Term)) {
        f(&self.subterm);
        self.remember.visit(f);
        self.forget.visit(f);
    }
}

impl Visit for MetaCall {
    fn visit(&self, f: &mut dyn FnMut(&Term)) {
        visit_all(&self.args, f);
    }
}

/// `head^lift arg1 arg2 ...`
fn doc_call<'a>(
    head: Builder<'a>,
    ulift: u32,
    args: &[Term],
    cx: &mut DocCx<'_>,
    alloc: &'a Alloc<'a>,
    prec: Precedence,
) -> Builder<'a> {
    let mut doc = head;
    if ulift > 0 || cx.cfg.print_zero_lifts {
        doc = doc.append(CARET).append(ulift.to_string());
    }
    if args.is_empty() {
        return doc;
    }
    for arg in args {
        doc = doc.append(alloc.space()).append(arg.doc(cx, alloc, PREC_ARG));
    }
    doc.group().parens_if(prec >= PREC_ARG)
}

/// `{m1 := v1, m2 := v2}` for the fixed members of a class.
fn doc_members<'a>(call: &ClassCall, cx: &mut DocCx<'_>, alloc: &'a Alloc<'a>) -> Builder<'a> {
    let members: Vec<_> = call
        .args
        .iter()
        .zip(&call.class.members)
        .map(|(arg, member)| {
            let (_, value) = arg.doc_open(cx, alloc, "self", PREC_NONE);
            alloc.text(member.name.clone()).append(alloc.space()).append(COLONEQ).append(alloc.space()).append(value)
        })
        .collect();
    alloc.intersperse(members, alloc.text(COMMA).append(alloc.space())).group().braces()
}

impl Doc for DataCall {
    fn doc<'a>(&self, cx: &mut DocCx<'_>, alloc: &'a Alloc<'a>, prec: Precedence) -> Builder<'a> {
        doc_call(alloc.typ(self.data.name.clone()), self.ulift, &self.args, cx, alloc, prec)
    }
}

impl Doc for ConCall {
    fn doc<'a>(&self, cx: &mut DocCx<'_>, alloc: &'a Alloc<'a>, prec: Precedence) -> Builder<'a> {
        doc_call(alloc.ctor(self.con.name.clone()), self.ulift, &self.args, cx, alloc, prec)
    }
}

impl Doc for FnCall {
    fn doc<'a>(&self, cx: &mut DocCx<'_>, alloc: &'a Alloc<'a>, prec: Precedence) -> Builder<'a> {
        doc_call(alloc.text(self.def.name.clone()), self.ulift, &self.args, cx, alloc, prec)
    }
}

impl Doc for PrimCall {
    fn doc<'a>(&self, cx: &mut DocCx<'_>, alloc: &'a Alloc<'a>, prec: Precedence) -> Builder<'a> {
        let head = match self.id {
            PrimId::String => alloc.typ(self.id.name()),
            PrimId::StringConcat => alloc.keyword(self.id.name()),
        };
        doc_call(head, self.ulift, &self.args, cx, alloc, prec)
    }
}

impl Doc for ClassCall {
    fn doc<'a>(&self, cx: &mut DocCx<'_>, alloc: &'a Alloc<'a>, prec: Precedence) -> Builder<'a> {
        let head = doc_call(alloc.typ(self.class.name.clone()), self.ulift, &[], cx, alloc, prec);
        if self.args.is_empty() {
            return head;
        }
        head.append(alloc.space()).append(doc_members(self, cx, alloc)).group().parens_if(prec >= PREC_ARG)
    }
}

impl Doc for MemberCall {
    fn doc<'a>(&self, cx: &mut DocCx<'_>, alloc: &'a Alloc<'a>, _prec: Precedence) -> Builder<'a> {
        let name = self.class.members.get(self.index).map(|m| m.name.clone()).unwrap_or_else(|| self.index.to_string());
        self.of.doc(cx, alloc, PREC_ARG).append(DOT).append(name)
    }
}

impl Doc for NewTerm {
    fn doc<'a>(&self, cx: &mut DocCx<'_>, alloc: &'a Alloc<'a>, prec: Precedence) -> Builder<'a> {
        alloc
            .keyword(NEW)
            .append(alloc.space())
            .append(alloc.typ(self.inner.class.name.clone()))
            .append(alloc.space())
            .append(doc_members(&self.inner, cx, alloc))
            .group()
            .parens_if(prec >= PREC_ARG)
    }
}

impl Doc for ClassCastTerm {
    fn doc<'a>(&self, cx: &mut DocCx<'_>, alloc: &'a Alloc<'a>, _prec: Precedence) -> Builder<'a> {
        self.subterm
            .doc(cx, alloc, PREC_ARROW)
            .append(alloc.space())
            .append(alloc.keyword(AS))
            .append(alloc.space())
            .append(alloc.typ(self.class.name.clone()))
            .group()
            .parens()
    }
}

impl Doc for MetaCall {
    fn doc<'a>(&self, cx: &mut DocCx<'_>, alloc: &'a Alloc<'a>, prec: Precedence) -> Builder<'a> {
        let mut head = format!("{QUESTION_MARK}{}", self.meta.name);
        if cx.cfg.print_metavar_ids {
            head.push_str(&format!("#{}", self.meta.id));
        }
        doc_call(alloc.meta(head), 0, &self.args, cx, alloc, prec)
    }
}
