use miette::{Diagnostic, SourceSpan};
use miette_util::ToMiette;
use miette_util::codespan::Span;
use thiserror::Error;

use ast::*;
use printer::Print;

use crate::state::Eqn;

fn comma_separated<I: IntoIterator<Item = String>>(iter: I) -> String {
    iter.into_iter().collect::<Vec<_>>().join(", ")
}

/// Problems found while comparing terms and solving metavariables.
///
/// Terms are rendered when the error is created, so that later solutions of metavariables
/// do not change what is reported.
#[derive(Error, Diagnostic, Debug, Clone, PartialEq, Eq)]
pub enum TypeError {
    #[error("The universe {lhs} is not {relation} {rhs}")]
    #[diagnostic(code("T-001"))]
    LevelError {
        lhs: String,
        rhs: String,
        relation: String,
        #[label]
        span: Option<SourceSpan>,
    },
    #[error("The metavariable {meta_var} is applied to {spine}, which is not a list of distinct variables")]
    #[diagnostic(code("T-002"), help("This means that the metavariable cannot be solved automatically."))]
    BadSpine {
        meta_var: String,
        spine: String,
        #[label]
        span: Option<SourceSpan>,
    },
    #[error("The metavariable {meta_var} was equated with {solution}, which mentions {out_of_scope} not in scope for {meta_var}")]
    #[diagnostic(code("T-003"), help("This means that the metavariable cannot be solved automatically."))]
    BadlyScoped {
        meta_var: String,
        solution: String,
        out_of_scope: String,
        #[label]
        span: Option<SourceSpan>,
    },
    #[error("The metavariable {meta_var} was equated with {solution}, which itself contains {meta_var}")]
    #[diagnostic(code("T-004"))]
    Recursion {
        meta_var: String,
        solution: String,
        #[label]
        span: Option<SourceSpan>,
    },
    #[error("The term {term} does not have the expected type {expected}")]
    #[diagnostic(code("T-005"))]
    IllTyped {
        term: String,
        expected: String,
        #[label]
        span: Option<SourceSpan>,
    },
    #[error("Cannot solve {count} postponed equations:\n{eqns}")]
    #[diagnostic(code("T-006"))]
    CannotSolveEquations {
        count: usize,
        eqns: String,
        #[label]
        span: Option<SourceSpan>,
    },
    #[error("The following equations were solved outside of the pattern fragment:\n{eqns}")]
    #[diagnostic(code("T-007"), severity(Warning), help("The solutions may not be the most general ones."))]
    VagueSolution {
        eqns: String,
        #[label]
        span: Option<SourceSpan>,
    },
    #[error("An unexpected internal error occurred: {message}")]
    #[diagnostic(code("T-XXX"))]
    /// This error should not occur.
    /// Some internal invariant has been violated.
    Impossible {
        message: String,
        #[label]
        span: Option<SourceSpan>,
    },
}

impl TypeError {
    /// `lhs` is not equal to (`eq`) or contained in `rhs`.
    pub fn level_error(lhs: SortTerm, rhs: SortTerm, eq: bool, span: Option<Span>) -> Box<Self> {
        let relation = if eq { "equal to" } else { "contained in" };
        Self::LevelError {
            lhs: lhs.print_to_string(None),
            rhs: rhs.print_to_string(None),
            relation: relation.to_owned(),
            span: span.to_miette(),
        }
        .into()
    }

    pub fn bad_spine(meta: &MetaCall, span: Option<Span>) -> Box<Self> {
        Self::BadSpine {
            meta_var: meta_name(&meta.meta),
            spine: format!("[{}]", comma_separated(meta.args.iter().map(|arg| arg.print_to_string(None)))),
            span: span.or(meta.meta.pos).to_miette(),
        }
        .into()
    }

    pub fn badly_scoped(meta: &MetaCall, solution: &Term, out_of_scope: &[LocalVar], span: Option<Span>) -> Box<Self> {
        Self::BadlyScoped {
            meta_var: meta_name(&meta.meta),
            solution: solution.print_to_string(None),
            out_of_scope: comma_separated(out_of_scope.iter().map(|var| var.to_string())),
            span: span.or(meta.meta.pos).to_miette(),
        }
        .into()
    }

    pub fn recursion(meta: &MetaCall, solution: &Term, span: Option<Span>) -> Box<Self> {
        Self::Recursion {
            meta_var: meta_name(&meta.meta),
            solution: solution.print_to_string(None),
            span: span.or(meta.meta.pos).to_miette(),
        }
        .into()
    }

    pub fn ill_typed(term: &Term, expected: &Term, span: Option<Span>) -> Box<Self> {
        Self::IllTyped {
            term: term.print_to_string(None),
            expected: expected.print_to_string(None),
            span: span.to_miette(),
        }
        .into()
    }

    pub fn cannot_solve_equations(eqns: &[Eqn]) -> Box<Self> {
        Self::CannotSolveEquations {
            count: eqns.len(),
            eqns: print_eqns(eqns),
            span: eqns.first().and_then(|eqn| eqn.pos).to_miette(),
        }
        .into()
    }

    pub fn vague_solution(eqns: &[Eqn]) -> Box<Self> {
        Self::VagueSolution { eqns: print_eqns(eqns), span: eqns.first().and_then(|eqn| eqn.pos).to_miette() }
            .into()
    }
}

fn meta_name(meta: &MetaVar) -> String {
    format!("?{}", meta.name)
}

fn print_eqns(eqns: &[Eqn]) -> String {
    eqns.iter().map(|eqn| format!("  {}", eqn.print_to_string(None))).collect::<Vec<_>>().join("\n")
}

/// Abort because an internal invariant does not hold.
///
/// This is not a type error of the user's program, but a bug in the elaborator.
#[track_caller]
pub fn impossible(message: impl Into<String>, span: Option<Span>) -> ! {
    panic!("{}", TypeError::Impossible { message: message.into(), span: span.to_miette() })
}

/// Where comparisons send the problems they find.
pub trait Reporter {
    fn report(&mut self, err: Box<TypeError>);
}

/// A [Reporter] which collects all problems.
#[derive(Debug, Default)]
pub struct BufferedReporter {
    problems: Vec<Box<TypeError>>,
}

impl BufferedReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn problems(&self) -> &[Box<TypeError>] {
        &self.problems
    }

    pub fn is_empty(&self) -> bool {
        self.problems.is_empty()
    }
}

impl Reporter for BufferedReporter {
    fn report(&mut self, err: Box<TypeError>) {
        log::debug!("Reported: {err}");
        self.problems.push(err);
    }
}
