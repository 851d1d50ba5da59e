// SPDX-License-Identifier: MPL-2.0

//! Non-public solver machinery: the clause model, the formula, and the
//! implication graph.

mod clause;
mod formula;
mod graph;

pub(crate) use clause::{Clause, ClauseState, DecisionLevel, Variable};
pub(crate) use formula::Formula;
pub(crate) use graph::ImplicationGraph;
