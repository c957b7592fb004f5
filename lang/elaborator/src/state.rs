//! The state shared by all comparisons of a declaration

use std::rc::Rc;

use derivative::Derivative;
use log::{debug, trace};
use miette_util::codespan::Span;

use ast::*;
use printer::{Alloc, Builder, DocAllocator, Print, PrintCfg};

use crate::conversion_checking::{Decision, Ordering, Unifier, UnifierCfg};
use crate::result::{Reporter, TypeError, impossible};

/// A postponed equation `lhs cmp rhs`.
///
/// It is checked again in the context it was created in once more metavariables are solved.
#[derive(Clone, Derivative)]
#[derivative(Debug)]
pub struct Eqn {
    pub lhs: MetaCall,
    pub rhs: Term,
    pub typ: Option<Term>,
    pub cmp: Ordering,
    pub pos: Option<Span>,
    #[derivative(Debug = "ignore")]
    pub ctx: LocalCtx,
}

impl Print for Eqn {
    fn print<'a>(&'a self, cfg: &PrintCfg, alloc: &'a Alloc<'a>) -> Builder<'a> {
        self.lhs
            .print(cfg, alloc)
            .append(alloc.space())
            .append(self.cmp.symbol())
            .append(alloc.space())
            .append(self.rhs.print(cfg, alloc))
            .group()
    }
}

/// A point of the interval that can be connected to another one.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum DimAtom {
    Var(LocalVar),
    End(DimTerm),
}

impl DimAtom {
    fn of(term: &Term) -> Option<DimAtom> {
        match term {
            Term::Free(FreeTerm { var }) => Some(DimAtom::Var(var.clone())),
            Term::Dim(dim) => Some(DimAtom::End(*dim)),
            _ => None,
        }
    }
}

#[derive(Debug, Default)]
pub struct TyckState {
    /// Every metavariable is solved at most once.
    solutions: Rc<HashMap<MetaVar, Term>>,
    eqns: Vec<Eqn>,
    /// Unsolved metavariables mentioned by postponed equations.
    active_metas: Vec<(MetaVar, Option<Span>)>,
    /// Points of the interval which are known to be equal, e.g. because we are checking
    /// an element of a partial type.
    connections: Vec<(DimAtom, DimAtom)>,
    pub names: NameGenerator,
}

impl TyckState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn solutions(&self) -> &HashMap<MetaVar, Term> {
        &self.solutions
    }

    pub fn solution(&self, meta: &MetaVar) -> Option<&Term> {
        self.solutions.get(meta)
    }

    pub fn is_solved(&self, meta: &MetaVar) -> bool {
        self.solutions.contains_key(meta)
    }

    pub(crate) fn solutions_snapshot(&self) -> Rc<HashMap<MetaVar, Term>> {
        self.solutions.clone()
    }

    /// Fresh metavariable with the given requirement.
    pub fn fresh_meta(&self, name: &str, pos: Option<Span>, ctx_size: usize, req: Requirement) -> MetaVar {
        MetaVar::new(self.names.next_id(), name, pos, ctx_size, req)
    }

    pub fn solve(&mut self, meta: &MetaVar, solution: Term) {
        if self.is_solved(meta) {
            impossible(format!("metavariable ?{} solved twice", meta.name), meta.pos);
        }
        debug!("Solved ?{}#{} := {}", meta.name, meta.id, solution.print_trace());
        Rc::make_mut(&mut self.solutions).insert(meta.clone(), solution);
    }

    pub fn eqns(&self) -> &[Eqn] {
        &self.eqns
    }

    pub fn add_eqn(&mut self, eqn: Eqn) {
        trace!("Postponed {}", eqn.print_trace());
        let before = self.active_metas.len();
        let lhs = Term::Meta(eqn.lhs.clone());
        for term in [&lhs, &eqn.rhs] {
            for meta in metas(term) {
                if !self.is_solved(&meta) {
                    self.active_metas.push((meta, eqn.pos));
                }
            }
        }
        debug_assert!(self.active_metas.len() > before, "postponed an equation without unsolved metavariables");
        self.eqns.push(eqn);
    }

    pub fn solve_eqn(&mut self, reporter: &mut dyn Reporter, eqn: Eqn, allow_delay: bool) -> Decision {
        // Without postponement there is no later chance, so solutions outside the pattern
        // fragment are accepted as well.
        let cfg = UnifierCfg { allow_delay, allow_vague: !allow_delay };
        let mut unifier = Unifier::new(self, eqn.ctx.clone(), reporter, eqn.pos, eqn.cmp).with_cfg(cfg);
        unifier.check_eqn(&eqn)
    }

    /// Drain the postponed equations.
    ///
    /// Stops with [TypeError::CannotSolveEquations] when a round makes no progress.
    pub fn solve_metas(&mut self, reporter: &mut dyn Reporter) {
        let mut post_simplification_size = None;
        let mut vague = Vec::new();
        while !self.eqns.is_empty() {
            while self.simplify(reporter) {}
            let frozen = self.eqns.clone();
            if frozen.is_empty() {
                break;
            }
            trace!("Solving {} postponed equations", frozen.len());
            if post_simplification_size == Some(frozen.len()) {
                reporter.report(TypeError::cannot_solve_equations(&frozen));
                return;
            }
            post_simplification_size = Some(frozen.len());
            for eqn in frozen {
                if self.solve_eqn(reporter, eqn.clone(), false).is_yes() {
                    vague.push(eqn);
                }
            }
        }
        if !vague.is_empty() {
            reporter.report(TypeError::vague_solution(&vague));
        }
    }

    /// Retry the equations whose left hand side has been solved in the meantime.
    ///
    /// Returns whether any active metavariable has been solved.
    fn simplify(&mut self, reporter: &mut dyn Reporter) -> bool {
        let (solved, active): (Vec<_>, Vec<_>) =
            std::mem::take(&mut self.active_metas).into_iter().partition(|(meta, _)| self.is_solved(meta));
        self.active_metas = active;
        for (meta, _) in &solved {
            let (ready, blocked): (Vec<_>, Vec<_>) =
                std::mem::take(&mut self.eqns).into_iter().partition(|eqn| eqn.lhs.meta == *meta);
            self.eqns = blocked;
            for eqn in ready {
                self.solve_eqn(reporter, eqn, true);
            }
        }
        !solved.is_empty()
    }

    /// Assume that `lhs` and `rhs` are the same point of the interval.
    ///
    /// Both have to be interval variables or endpoints.
    pub fn connect(&mut self, lhs: &Term, rhs: &Term) {
        match (DimAtom::of(lhs), DimAtom::of(rhs)) {
            (Some(l), Some(r)) => self.connections.push((l, r)),
            _ => impossible(
                format!("cannot connect {} and {}", lhs.print_trace(), rhs.print_trace()),
                None,
            ),
        }
    }

    /// Undo one [TyckState::connect] of the same points.
    pub fn disconnect(&mut self, lhs: &Term, rhs: &Term) {
        let (Some(l), Some(r)) = (DimAtom::of(lhs), DimAtom::of(rhs)) else { return };
        if let Some(i) =
            self.connections.iter().rposition(|(a, b)| (*a == l && *b == r) || (*a == r && *b == l))
        {
            self.connections.remove(i);
        }
    }

    pub fn is_connected(&self, lhs: &Term, rhs: &Term) -> bool {
        match (DimAtom::of(lhs), DimAtom::of(rhs)) {
            (Some(l), Some(r)) => self.reachable(&l, &r),
            _ => false,
        }
    }

    /// The endpoint `var` has been connected to, if any.
    pub fn endpoint(&self, var: &LocalVar) -> Option<DimTerm> {
        if self.connections.is_empty() {
            return None;
        }
        let atom = DimAtom::Var(var.clone());
        [DimTerm::I0, DimTerm::I1].into_iter().find(|end| self.reachable(&atom, &DimAtom::End(*end)))
    }

    /// Whether the connections identify the two endpoints, i.e. we are on an impossible face.
    pub fn is_inconsistent(&self) -> bool {
        self.reachable(&DimAtom::End(DimTerm::I0), &DimAtom::End(DimTerm::I1))
    }

    fn reachable(&self, from: &DimAtom, to: &DimAtom) -> bool {
        if from == to {
            return true;
        }
        let mut seen = vec![from.clone()];
        let mut todo = vec![from.clone()];
        while let Some(atom) = todo.pop() {
            for (a, b) in &self.connections {
                let next = if *a == atom {
                    b
                } else if *b == atom {
                    a
                } else {
                    continue;
                };
                if next == to {
                    return true;
                }
                if !seen.contains(next) {
                    seen.push(next.clone());
                    todo.push(next.clone());
                }
            }
        }
        false
    }
}
