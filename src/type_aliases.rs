// SPDX-License-Identifier: MPL-2.0

//! Publicly exported type aliases.

use std::hash::BuildHasherDefault;

use rustc_hash::FxHasher;

/// Map implementation used by the library.
///
/// Iteration order is insertion order. Variable numbering, and with it the
/// whole resolution, is only deterministic because of that.
pub type Map<K, V> = indexmap::IndexMap<K, V, BuildHasherDefault<FxHasher>>;

/// Set implementation used by the library.
pub type Set<V> = indexmap::IndexSet<V, BuildHasherDefault<FxHasher>>;

/// Package identifier as declared in metadata.
pub type PackageId = String;

/// Semantic version string. The solver only ever compares versions for
/// equality, so no parsed representation is needed.
pub type Version = String;

/// Concrete versions picked by the solver during [resolve](crate::resolve),
/// one per reachable package id.
pub type ResolvedPath = Map<PackageId, Version>;
