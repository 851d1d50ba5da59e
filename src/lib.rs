// SPDX-License-Identifier: MPL-2.0

//! Treesat solves dependency versions over implication trees.
//!
//! A package manager hands the solver a *dependency implication tree*: a
//! recursive, order-preserving mapping expressing "choosing this package at
//! this version requires choosing exactly one version of each of its
//! dependencies". The solver either picks a single, mutually-consistent
//! version for every package reachable from the root, or proves that no such
//! choice exists and explains why, as two human-readable dependency chains
//! ending in the contested package.
//!
//! ```txt
//! version deadlock on c: 1.0.0 is locked while 2.0.0 is required
//! locked by:
//!   in: a, at: 1.0.0, as: registry+a
//!   in: c, at: 1.0.0, as: registry+c
//! required by:
//!   in: b, at: 1.0.0, as: registry+b
//!   in: c, at: 2.0.0, as: registry+c
//! ```
//!
//! Resolution runs a simplified conflict-driven clause-learning loop over
//! package-version variables. It is deliberately not a general CNF SAT
//! solver: decisions are always "true" (declining a version is the default,
//! reached only through learned clauses), which keeps the reported deadlock
//! deterministic for a given input ordering.
//!
//! The main entry point is [resolve]; [Solver] exposes the single-attempt
//! state machine underneath it, and [version_path]/[source_path]/
//! [resolved_tree] recover provenance from the input tree. Fetching and
//! parsing package metadata is the caller's business: this crate never does
//! I/O.

#![warn(missing_docs)]

mod error;
mod internal;
mod solver;
mod trace;
mod tree;
mod type_aliases;

pub use error::SolveError;
pub use solver::{resolve, Deadlock, Solver};
pub use trace::{resolved_tree, source_path, version_path, DeadlockReport, TraceStep};
pub use tree::{Dependency, ImplicationTree};
pub use type_aliases::{Map, PackageId, ResolvedPath, Set, Version};
