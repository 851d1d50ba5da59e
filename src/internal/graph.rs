// SPDX-License-Identifier: MPL-2.0

//! The implication graph records why every variable got its value: the
//! variables that caused the assignment and the decision level it happened
//! at. It detects conflicting assignments and derives a learned clause plus
//! a safe backjump level from a conflict.

use indexmap::map::Entry;

use crate::internal::{Clause, ClauseState, DecisionLevel, Variable};
use crate::{Map, Set};

/// One assignment and its provenance. Empty `roots` mark a free decision,
/// non-empty `roots` a propagation.
#[derive(Debug, Clone)]
pub(crate) struct Node {
    pub(crate) roots: Set<Variable>,
    pub(crate) level: DecisionLevel,
    pub(crate) state: bool,
}

/// A variable that was demanded in two different states, with the merged
/// roots of both derivations.
#[derive(Debug, Clone)]
pub(crate) struct Conflict {
    roots: Set<Variable>,
    variable: Variable,
    level: DecisionLevel,
}

#[derive(Debug, Clone)]
pub(crate) struct ImplicationGraph {
    nodes: Map<Variable, Node>,
    conflict: Option<Conflict>,
}

impl ImplicationGraph {
    pub(crate) fn new() -> Self {
        Self {
            nodes: Map::default(),
            conflict: None,
        }
    }

    /// Records a free decision. An existing node for the variable is
    /// overwritten in place.
    pub(crate) fn add_root_node(&mut self, variable: Variable, state: bool, level: DecisionLevel) {
        self.nodes.insert(
            variable,
            Node {
                roots: Set::default(),
                level,
                state,
            },
        );
    }

    /// Records a propagated assignment.
    ///
    /// Returns false when the variable already holds the opposite state: the
    /// node is removed, and the conflict (with the merged roots of both
    /// derivations) becomes available through [conflict_fallback] and
    /// [conflict_variable](Self::conflict_variable). A redundant derivation
    /// of the same state merges roots and is harmless.
    pub(crate) fn add_leaf_node(
        &mut self,
        roots: Set<Variable>,
        variable: Variable,
        state: bool,
        level: DecisionLevel,
    ) -> bool {
        match self.nodes.entry(variable) {
            Entry::Occupied(mut occupied) => {
                occupied.get_mut().roots.extend(roots);
                if occupied.get().state == state {
                    true
                } else {
                    let node = occupied.shift_remove();
                    self.conflict = Some(Conflict {
                        roots: node.roots,
                        variable,
                        level,
                    });
                    false
                }
            }
            Entry::Vacant(vacant) => {
                vacant.insert(Node {
                    roots,
                    level,
                    state,
                });
                true
            }
        }
    }

    /// Derives a learned clause and a backjump level from the recorded
    /// conflict, and purges every node above that level.
    ///
    /// Returns `None` when the conflict happened at level 0: nothing was
    /// freely decided, so the formula is unsatisfiable.
    ///
    /// The learned clause keeps one literal per conflict root assigned below
    /// the conflict level, with the polarity opposing the observed state, and
    /// one such literal for the cut point: the first variable shared by every
    /// same-level chain from the conflict back to its decision (the first
    /// unique implication point). After the backjump the below-level
    /// assignments survive, leaving the clause unit and forcing the cut
    /// point into its opposite state.
    pub(crate) fn conflict_fallback(&mut self) -> Option<(Clause, DecisionLevel)> {
        let conflict = self.conflict.as_ref()?;
        if conflict.level == DecisionLevel(0) {
            return None;
        }
        let conflict_level = conflict.level;

        let mut same_level = Vec::new();
        let mut below = Vec::new();
        for &root in &conflict.roots {
            let Some(node) = self.nodes.get(&root) else {
                continue;
            };
            if node.level == conflict_level {
                same_level.push(root);
            } else if node.level < conflict_level {
                below.push((root, node.state, node.level));
            }
        }

        let chains: Vec<Vec<Variable>> = same_level
            .iter()
            .map(|&root| {
                let mut chain = Vec::new();
                self.same_level_chain(root, conflict_level, &mut chain);
                chain
            })
            .collect();
        let cut = chains.first().and_then(|first| {
            first
                .iter()
                .copied()
                .find(|variable| chains.iter().all(|chain| chain.contains(variable)))
        });
        let Some(cut) = cut else {
            // Every same-level propagation chain leads back to the single
            // decision of that level, so a common variable must exist.
            unreachable!("conflict at level {} has no implication point", conflict_level.0)
        };

        let mut clause = Clause::new();
        let mut fallback = DecisionLevel(0);
        for (variable, state, level) in below {
            clause.append_literal(variable, state);
            clause.set_variable_state(variable, state, level);
            fallback = fallback.max(level);
        }
        let cut_state = self
            .nodes
            .get(&cut)
            .map(|node| node.state)
            .expect("cut point without a graph node");
        clause.append_literal(cut, cut_state);
        clause.update_state();
        debug_assert_eq!(clause.state(), ClauseState::Unit);

        self.nodes.retain(|_, node| node.level <= fallback);
        Some((clause, fallback))
    }

    /// Flattens, in preorder, the reversed root-to-conflict chain starting at
    /// `variable`, following only roots assigned at `level`.
    fn same_level_chain(&self, variable: Variable, level: DecisionLevel, chain: &mut Vec<Variable>) {
        if chain.contains(&variable) {
            return;
        }
        chain.push(variable);
        if let Some(node) = self.nodes.get(&variable) {
            for &root in &node.roots {
                if self
                    .nodes
                    .get(&root)
                    .is_some_and(|node| node.level == level)
                {
                    self.same_level_chain(root, level, chain);
                }
            }
        }
    }

    /// Nodes in assignment order.
    pub(crate) fn nodes(&self) -> &Map<Variable, Node> {
        &self.nodes
    }

    /// The variable of the most recent conflict, if any.
    pub(crate) fn conflict_variable(&self) -> Option<Variable> {
        self.conflict.as_ref().map(|conflict| conflict.variable)
    }
}
