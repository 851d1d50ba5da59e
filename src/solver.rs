// SPDX-License-Identifier: MPL-2.0

//! Dependency version solving over implication trees.
//!
//! Given a dependency implication tree, the solver chooses a single,
//! mutually-consistent version for every package reachable from the root, or
//! proves that no such choice exists and says which package is contested.
//!
//! The tree is translated into a boolean formula over package-version
//! variables: one root axiom, one implication clause per dependency edge,
//! and pairwise exclusion clauses between versions of the same package. A
//! simplified conflict-driven clause-learning loop then drives the formula
//! to a satisfiable assignment or a terminal conflict.
//!
//! ## API
//!
//! ```
//! use treesat::{resolve, Dependency, ImplicationTree};
//!
//! let tree = ImplicationTree::new().with(
//!     "icons",
//!     Dependency::new("registry+icons").with_version("2.0.0", ImplicationTree::new()),
//! );
//!
//! let path = resolve("root", "1.0.0", &tree)?;
//! assert_eq!(path.get("icons").map(String::as_str), Some("2.0.0"));
//! # Ok::<(), treesat::SolveError>(())
//! ```
//!
//! One [Solver] performs exactly one resolution attempt; callers retrying
//! another candidate root version construct a fresh one.

use log::{debug, info};

use crate::internal::{Clause, DecisionLevel, Formula, ImplicationGraph, Variable};
use crate::trace::DeadlockReport;
use crate::{ImplicationTree, Map, PackageId, ResolvedPath, SolveError, Version};

/// Main function of the library.
/// Resolves one candidate root version against its implication tree.
///
/// On success the returned path holds one concrete version per reachable
/// package id. On failure the error carries the two provenance chains of the
/// version collision.
#[cold]
pub fn resolve(
    root_id: impl Into<PackageId>,
    root_version: impl Into<Version>,
    tree: &ImplicationTree,
) -> Result<ResolvedPath, SolveError> {
    let mut solver = Solver::new(root_id, root_version, tree);
    if solver.is_structure_satisfiable() {
        Ok(solver.path())
    } else {
        let deadlock = solver.deadlock().ok_or_else(|| {
            SolveError::Failure("unsatisfiable structure without a recorded conflict".into())
        })?;
        Err(SolveError::Deadlock(DeadlockReport::new(deadlock, tree)))
    }
}

/// The reported pair of mutually exclusive versions of one package that a
/// given root selection cannot simultaneously satisfy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deadlock {
    /// The contested package.
    pub id: PackageId,
    /// The version previously chosen for that package, when one was.
    pub locked: Option<Version>,
    /// The version the conflicting chain demanded instead.
    pub conflict: Version,
}

/// One resolution attempt: the formula and graph built from an implication
/// tree for a single candidate root version.
#[derive(Debug, Clone)]
pub struct Solver {
    formula: Formula,
    graph: ImplicationGraph,
    /// Interned `(package id, version)` pairs; a pair's index is its
    /// variable. Insertion order follows the preorder tree traversal, which
    /// makes the numbering deterministic.
    variables: Map<(PackageId, Version), Variable>,
    satisfiable: Option<bool>,
}

impl Solver {
    /// Builds the formula for one candidate root version: the root axiom,
    /// one implication clause per `(parent, dependency)` edge, and pairwise
    /// uniqueness clauses between versions of the same package.
    pub fn new(
        root_id: impl Into<PackageId>,
        root_version: impl Into<Version>,
        tree: &ImplicationTree,
    ) -> Self {
        let mut solver = Self {
            formula: Formula::new(),
            graph: ImplicationGraph::new(),
            variables: Map::default(),
            satisfiable: None,
        };
        let root = solver.intern(root_id.into(), root_version.into());
        let mut axiom = Clause::new();
        axiom.append_literal(root, false);
        solver.formula.append_clause(axiom);
        solver.build_implications(root, tree);
        solver.build_uniqueness();
        solver
    }

    fn intern(&mut self, id: PackageId, version: Version) -> Variable {
        let next = self.variables.len();
        *self.variables.entry((id, version)).or_insert(next)
    }

    /// Walks the tree in order, interning a fresh variable for every newly
    /// seen pair and appending `(¬parent ∨ v_1 ∨ … ∨ v_n)` per dependency.
    fn build_implications(&mut self, parent: Variable, tree: &ImplicationTree) {
        for (id, dependency) in tree.iter() {
            let mut clause = Clause::new();
            clause.append_literal(parent, true);
            let mut candidates = Vec::with_capacity(dependency.implication.len());
            for version in dependency.implication.keys() {
                let variable = self.intern(id.clone(), version.clone());
                clause.append_literal(variable, false);
                candidates.push(variable);
            }
            self.formula.append_clause(clause);
            for (&variable, subtree) in candidates.iter().zip(dependency.implication.values()) {
                self.build_implications(variable, subtree);
            }
        }
    }

    /// At most one version of a given package may be true: one
    /// `(¬v_i ∨ ¬v_j)` clause per unordered pair of version variables
    /// sharing a package id.
    fn build_uniqueness(&mut self) {
        let mut by_id: Map<&str, Vec<Variable>> = Map::default();
        for ((id, _), &variable) in &self.variables {
            by_id.entry(id.as_str()).or_default().push(variable);
        }
        let groups: Vec<Vec<Variable>> = by_id
            .into_values()
            .filter(|versions| versions.len() > 1)
            .collect();
        for versions in groups {
            for (index, &left) in versions.iter().enumerate() {
                for &right in &versions[index + 1..] {
                    let mut clause = Clause::new();
                    clause.append_literal(left, true);
                    clause.append_literal(right, true);
                    self.formula.append_clause(clause);
                }
            }
        }
    }

    /// Whether an assignment exists. The result is memoized; calling this
    /// again returns it without re-running the loop.
    ///
    /// This is the sole failure signal: the solver never panics on input,
    /// and [deadlock](Self::deadlock) is only meaningful when this returned
    /// false.
    pub fn is_structure_satisfiable(&mut self) -> bool {
        if let Some(satisfiable) = self.satisfiable {
            return satisfiable;
        }
        let satisfiable = self.solve();
        self.satisfiable = Some(satisfiable);
        satisfiable
    }

    fn solve(&mut self) -> bool {
        // Initial propagation, no decisions yet. A conflict here has no
        // fallback: nothing was freely chosen.
        if !self.formula.propagate_units(&mut self.graph, DecisionLevel(0)) {
            info!("conflict during initial propagation, structure unsatisfiable");
            return false;
        }
        let mut level = DecisionLevel(0);
        loop {
            level = level.increment();
            if !self.formula.select_variable(&mut self.graph, level) {
                info!("nothing left to decide, structure satisfiable");
                return true;
            }
            while !self.formula.propagate_units(&mut self.graph, level) {
                let Some((learned, fallback)) = self.graph.conflict_fallback() else {
                    info!("terminal conflict at level {}, structure unsatisfiable", level.0);
                    return false;
                };
                debug!("backjump from level {} to level {}", level.0, fallback.0);
                level = fallback;
                self.formula.append_clause(learned);
                self.formula.reset_after_level(level);
            }
        }
    }

    /// The chosen versions: every graph node recorded true, mapped back to
    /// its `(package id, version)` pair, in assignment order.
    pub fn path(&self) -> ResolvedPath {
        self.graph
            .nodes()
            .iter()
            .filter(|(_, node)| node.state)
            .map(|(&variable, _)| {
                let ((id, version), _) = self
                    .variables
                    .get_index(variable)
                    .expect("assigned variable was never interned");
                (id.clone(), version.clone())
            })
            .collect()
    }

    /// The terminal version collision, if a conflict was recorded: the
    /// contested package id, the version already locked for it in
    /// [path](Self::path), and the version the conflict demanded.
    pub fn deadlock(&self) -> Option<Deadlock> {
        let variable = self.graph.conflict_variable()?;
        let ((id, conflict), _) = self
            .variables
            .get_index(variable)
            .expect("conflict variable was never interned");
        let locked = self.path().get(id).cloned();
        Some(Deadlock {
            id: id.clone(),
            locked,
            conflict: conflict.clone(),
        })
    }
}
