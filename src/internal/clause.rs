// SPDX-License-Identifier: MPL-2.0

//! A clause is a disjunction of literals over package-version variables.
//!
//! Clauses cache their own derived state and recompute it immediately after
//! every assignment, so the formula can scan for unit clauses without
//! re-deriving anything.

/// Integer index uniquely identifying one `(package id, version)` pair.
///
/// Variable `0` is reserved for the root package and version, and is
/// axiomatically true.
pub(crate) type Variable = usize;

/// Nesting depth of free decisions. Propagated variables inherit the level of
/// the decision that triggered them.
#[derive(Debug, Copy, Clone, Ord, PartialOrd, Eq, PartialEq)]
pub(crate) struct DecisionLevel(pub(crate) u32);

impl DecisionLevel {
    pub(crate) fn increment(self) -> Self {
        Self(self.0 + 1)
    }
}

/// A variable with a polarity, plus its current assignment inside the owning
/// clause. Assignments are per clause: a stale unit clause deliberately does
/// not see later assignments of its pending variable (see
/// [Formula](crate::internal::Formula)).
#[derive(Debug, Clone)]
pub(crate) struct Literal {
    variable: Variable,
    negated: bool,
    state: Option<bool>,
    level: DecisionLevel,
}

impl Literal {
    pub(crate) fn variable(&self) -> Variable {
        self.variable
    }

    pub(crate) fn negated(&self) -> bool {
        self.negated
    }

    pub(crate) fn state(&self) -> Option<bool> {
        self.state
    }

    /// A literal is satisfied iff its assignment matches its polarity.
    fn satisfied(&self) -> bool {
        self.state == Some(!self.negated)
    }
}

/// Derived state of a clause under its current literal assignments.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub(crate) enum ClauseState {
    /// More than one literal unassigned, none satisfied.
    Unknown,
    /// Exactly one literal unassigned, no assigned literal satisfied: the
    /// remaining literal is forced.
    Unit,
    /// At least one literal's assignment matches its polarity.
    Satisfied,
    /// All literals assigned, none satisfied.
    Unsatisfied,
}

/// An ordered set of literals over distinct variables.
#[derive(Debug, Clone)]
pub(crate) struct Clause {
    literals: Vec<Literal>,
    state: ClauseState,
}

impl Clause {
    pub(crate) fn new() -> Self {
        Self {
            literals: Vec::new(),
            state: ClauseState::Unknown,
        }
    }

    /// Appends an unassigned literal for `variable`.
    pub(crate) fn append_literal(&mut self, variable: Variable, negated: bool) {
        self.literals.push(Literal {
            variable,
            negated,
            state: None,
            level: DecisionLevel(0),
        });
        self.update_state();
    }

    /// Assigns the literal for `variable`, if this clause has one.
    pub(crate) fn set_variable_state(
        &mut self,
        variable: Variable,
        state: bool,
        level: DecisionLevel,
    ) {
        if let Some(literal) = self
            .literals
            .iter_mut()
            .find(|literal| literal.variable == variable)
        {
            literal.state = Some(state);
            literal.level = level;
            self.update_state();
        }
    }

    /// Clears every assignment made at a decision level greater than `level`.
    pub(crate) fn reset_after_level(&mut self, level: DecisionLevel) {
        let mut changed = false;
        for literal in &mut self.literals {
            if literal.state.is_some() && literal.level > level {
                literal.state = None;
                literal.level = DecisionLevel(0);
                changed = true;
            }
        }
        if changed {
            self.update_state();
        }
    }

    /// Recomputes and caches the derived state.
    pub(crate) fn update_state(&mut self) {
        if self.literals.iter().any(Literal::satisfied) {
            self.state = ClauseState::Satisfied;
            return;
        }
        let unassigned = self
            .literals
            .iter()
            .filter(|literal| literal.state.is_none())
            .count();
        self.state = match unassigned {
            0 => ClauseState::Unsatisfied,
            1 => ClauseState::Unit,
            _ => ClauseState::Unknown,
        };
    }

    pub(crate) fn state(&self) -> ClauseState {
        self.state
    }

    pub(crate) fn literals(&self) -> &[Literal] {
        &self.literals
    }

    /// The first literal without an assignment, if any.
    pub(crate) fn unassigned(&self) -> Option<&Literal> {
        self.literals.iter().find(|literal| literal.state.is_none())
    }

    /// Whether both clauses range over the same variables with the same
    /// polarities. Assignments are ignored.
    pub(crate) fn same_shape(&self, other: &Self) -> bool {
        self.literals.len() == other.literals.len()
            && self.literals.iter().all(|literal| {
                other
                    .literals
                    .iter()
                    .any(|o| o.variable == literal.variable && o.negated == literal.negated)
            })
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn clause(literals: &[(Variable, bool)]) -> Clause {
        let mut clause = Clause::new();
        for &(variable, negated) in literals {
            clause.append_literal(variable, negated);
        }
        clause
    }

    #[test]
    fn single_unassigned_literal_is_unit() {
        let clause = clause(&[(0, false)]);
        assert_eq!(clause.state(), ClauseState::Unit);
    }

    #[test]
    fn one_matching_assignment_satisfies() {
        let mut clause = clause(&[(3, false), (5, false)]);
        clause.set_variable_state(3, true, DecisionLevel(1));
        clause.set_variable_state(5, false, DecisionLevel(2));
        assert_eq!(clause.state(), ClauseState::Satisfied);
    }

    #[test]
    fn all_assigned_none_matching_is_unsatisfied() {
        let mut clause = clause(&[(3, false), (5, false)]);
        clause.set_variable_state(3, false, DecisionLevel(1));
        clause.set_variable_state(5, false, DecisionLevel(3));
        assert_eq!(clause.state(), ClauseState::Unsatisfied);
    }

    #[test]
    fn absent_variable_is_ignored() {
        let mut clause = clause(&[(1, true), (2, false)]);
        clause.set_variable_state(7, true, DecisionLevel(1));
        assert_eq!(clause.state(), ClauseState::Unknown);
        assert!(clause.literals().iter().all(|l| l.state().is_none()));
    }

    #[test]
    fn reset_clears_only_levels_above() {
        let mut clause = clause(&[(1, true), (2, false), (3, false)]);
        clause.set_variable_state(1, true, DecisionLevel(1));
        clause.set_variable_state(2, false, DecisionLevel(2));
        clause.set_variable_state(3, false, DecisionLevel(3));
        assert_eq!(clause.state(), ClauseState::Unsatisfied);

        clause.reset_after_level(DecisionLevel(1));
        assert_eq!(clause.state(), ClauseState::Unknown);
        assert_eq!(clause.literals()[0].state(), Some(true));
        assert_eq!(clause.literals()[1].state(), None);
        assert_eq!(clause.literals()[2].state(), None);
    }

    #[test]
    fn shape_comparison_ignores_order_and_assignments() {
        let mut a = clause(&[(1, true), (2, false)]);
        let b = clause(&[(2, false), (1, true)]);
        let c = clause(&[(1, false), (2, false)]);
        a.set_variable_state(2, true, DecisionLevel(1));
        assert!(a.same_shape(&b));
        assert!(!a.same_shape(&c));
        assert!(!b.same_shape(&clause(&[(2, false)])));
    }

    proptest! {
        /// The cached state always matches the state rule computed from
        /// scratch, whatever the assignment sequence was.
        #[test]
        fn cached_state_matches_rule(
            polarities in proptest::collection::vec(any::<bool>(), 1..6),
            assignments in proptest::collection::vec((0usize..6, any::<bool>(), 0u32..4), 0..12),
        ) {
            let mut clause = Clause::new();
            for (variable, &negated) in polarities.iter().enumerate() {
                clause.append_literal(variable, negated);
            }
            for &(variable, state, level) in &assignments {
                clause.set_variable_state(variable, state, DecisionLevel(level));
            }

            let satisfied = clause
                .literals()
                .iter()
                .any(|l| l.state() == Some(!l.negated()));
            let unassigned = clause
                .literals()
                .iter()
                .filter(|l| l.state().is_none())
                .count();
            let expected = if satisfied {
                ClauseState::Satisfied
            } else {
                match unassigned {
                    0 => ClauseState::Unsatisfied,
                    1 => ClauseState::Unit,
                    _ => ClauseState::Unknown,
                }
            };
            prop_assert_eq!(clause.state(), expected);
        }
    }
}
