use std::fmt;

/// The outcome of a comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Decision {
    Yes,
    /// Blocked on a metavariable. The comparison can be retried once it is solved.
    Unsure,
    No,
}

impl Decision {
    pub fn is_yes(self) -> bool {
        self == Decision::Yes
    }

    /// The decision for both obligations together: `No` beats `Unsure` beats `Yes`.
    pub fn lub(self, other: Decision) -> Decision {
        match (self, other) {
            (Decision::No, _) | (_, Decision::No) => Decision::No,
            (Decision::Unsure, _) | (_, Decision::Unsure) => Decision::Unsure,
            (Decision::Yes, Decision::Yes) => Decision::Yes,
        }
    }
}

/// A [Decision] with a witness for the positive case.
#[derive(Debug, Clone, PartialEq)]
pub enum RelDec<T> {
    Yes(T),
    Unsure,
    No,
}

impl<T> RelDec<T> {
    /// Combine with another decision, keeping the witness if both are positive.
    pub fn lub(self, other: Decision) -> RelDec<T> {
        match (self, other) {
            (RelDec::No, _) | (_, Decision::No) => RelDec::No,
            (RelDec::Unsure, _) | (_, Decision::Unsure) => RelDec::Unsure,
            (RelDec::Yes(t), Decision::Yes) => RelDec::Yes(t),
        }
    }
}

/// The direction of a comparison, used for cumulativity and subtyping of classes.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub enum Ordering {
    /// The left hand side is a subtype of the right hand side.
    Lt,
    Eq,
    /// The left hand side is a supertype of the right hand side.
    Gt,
}

impl Ordering {
    pub fn invert(self) -> Ordering {
        match self {
            Ordering::Lt => Ordering::Gt,
            Ordering::Eq => Ordering::Eq,
            Ordering::Gt => Ordering::Lt,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Ordering::Lt => "<=",
            Ordering::Eq => "==",
            Ordering::Gt => ">=",
        }
    }
}

impl fmt::Debug for Ordering {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lub_prefers_failure() {
        assert_eq!(Decision::Yes.lub(Decision::Unsure), Decision::Unsure);
        assert_eq!(Decision::Unsure.lub(Decision::No), Decision::No);
        assert_eq!(RelDec::Yes(1).lub(Decision::Yes), RelDec::Yes(1));
        assert_eq!(RelDec::Yes(1).lub(Decision::Unsure), RelDec::Unsure);
    }

    #[test]
    fn invert_is_involutive() {
        for ord in [Ordering::Lt, Ordering::Eq, Ordering::Gt] {
            assert_eq!(ord.invert().invert(), ord);
        }
        assert_eq!(Ordering::Lt.invert(), Ordering::Gt);
    }
}
