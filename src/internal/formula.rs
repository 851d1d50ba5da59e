// SPDX-License-Identifier: MPL-2.0

//! The formula is the growing conjunction of clauses. It drives unit
//! propagation and decision-variable selection, reporting every assignment
//! to the implication graph.

use log::debug;

use crate::internal::{Clause, ClauseState, DecisionLevel, ImplicationGraph, Variable};
use crate::Set;

#[derive(Debug, Clone)]
pub(crate) struct Formula {
    clauses: Vec<Clause>,
}

impl Formula {
    pub(crate) fn new() -> Self {
        Self {
            clauses: Vec::new(),
        }
    }

    /// Appends a clause, unless one with the same variables and polarities
    /// already exists.
    pub(crate) fn append_clause(&mut self, clause: Clause) {
        if !self.clauses.iter().any(|existing| existing.same_shape(&clause)) {
            self.clauses.push(clause);
        }
    }

    /// Decides the next free variable at `level`, always true, as a root node
    /// of the graph.
    ///
    /// The variable is the first unassigned literal of the first clause still
    /// in `Unknown` state, in clause-creation order. That tie-break is part
    /// of the output contract: it determines which clause becomes unit first
    /// and therefore which variable a terminal conflict reports.
    ///
    /// Returns false when nothing is left to decide. There is no explicit
    /// false branch; a version not selected simply stays absent from the
    /// final assignment, and false-forcing only ever happens through learned
    /// clauses.
    pub(crate) fn select_variable(
        &mut self,
        graph: &mut ImplicationGraph,
        level: DecisionLevel,
    ) -> bool {
        let Some(variable) = self
            .clauses
            .iter()
            .find(|clause| clause.state() == ClauseState::Unknown)
            .and_then(Clause::unassigned)
            .map(|literal| literal.variable())
        else {
            return false;
        };
        debug!("decide: variable {} = true at level {}", variable, level.0);
        graph.add_root_node(variable, true, level);
        for clause in &mut self.clauses {
            clause.set_variable_state(variable, true, level);
        }
        true
    }

    /// Resolves unit clauses until none remain (true) or the graph reports a
    /// conflicting assignment (false).
    ///
    /// Each forced assignment is recorded as a graph leaf whose roots are the
    /// other variables of the resolving clause, then broadcast to the
    /// resolving clause and to every clause still in `Unknown` state. Clauses
    /// already unit keep their stale pending literal on purpose: when a later
    /// chain demands the opposite state, re-resolving them is what surfaces
    /// the double assignment to the graph.
    pub(crate) fn propagate_units(
        &mut self,
        graph: &mut ImplicationGraph,
        level: DecisionLevel,
    ) -> bool {
        while let Some(index) = self
            .clauses
            .iter()
            .position(|clause| clause.state() == ClauseState::Unit)
        {
            let clause = &self.clauses[index];
            let literal = clause
                .unassigned()
                .expect("unit clause without an unassigned literal");
            let variable = literal.variable();
            let state = !literal.negated();
            let roots: Set<Variable> = clause
                .literals()
                .iter()
                .map(|literal| literal.variable())
                .filter(|&root| root != variable)
                .collect();
            debug!(
                "propagate: variable {} = {} at level {}",
                variable, state, level.0
            );
            if !graph.add_leaf_node(roots, variable, state, level) {
                debug!("propagation conflict on variable {}", variable);
                return false;
            }
            for (other, clause) in self.clauses.iter_mut().enumerate() {
                if other == index || clause.state() == ClauseState::Unknown {
                    clause.set_variable_state(variable, state, level);
                }
            }
        }
        true
    }

    /// Clears every assignment made above `level`, after a learned-clause
    /// backjump.
    pub(crate) fn reset_after_level(&mut self, level: DecisionLevel) {
        for clause in &mut self.clauses {
            clause.reset_after_level(level);
        }
    }

    #[cfg(test)]
    pub(crate) fn clauses(&self) -> &[Clause] {
        &self.clauses
    }
}
