// SPDX-License-Identifier: MPL-2.0

//! The dependency implication tree, the single input of the solver.
//!
//! An implication tree expresses "choosing this package at this version
//! requires choosing exactly one version of each of its dependencies". Each
//! dependency carries the raw `source` string it was fetched from (used only
//! for trace and error reporting, never for solving) and an `implication`
//! map from candidate version to the subtree that choosing that version
//! entails.
//!
//! Both maps preserve insertion order. This is a hard requirement: variables
//! are numbered in traversal order, so reordering the input reorders the
//! solver's decisions.

use crate::{Map, PackageId, Version};

/// One dependency edge of the tree: where the package metadata came from,
/// and the candidate versions with their own subtrees.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Dependency {
    /// Raw source string, e.g. a registry URL or tarball location.
    pub source: String,
    /// Candidate versions, each implying its own subtree when chosen.
    pub implication: Map<Version, ImplicationTree>,
}

impl Dependency {
    /// Creates a dependency with no candidate versions yet.
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            implication: Map::default(),
        }
    }

    /// Adds a candidate version with the subtree it implies.
    pub fn insert_version(&mut self, version: impl Into<Version>, subtree: ImplicationTree) {
        self.implication.insert(version.into(), subtree);
    }

    /// Chainable form of [insert_version](Self::insert_version).
    pub fn with_version(mut self, version: impl Into<Version>, subtree: ImplicationTree) -> Self {
        self.insert_version(version, subtree);
        self
    }
}

/// A recursive, order-preserving mapping from package id to [Dependency].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct ImplicationTree {
    dependencies: Map<PackageId, Dependency>,
}

impl ImplicationTree {
    /// Creates an empty tree (a package with no dependencies).
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a dependency of this node. Inserting the same id twice
    /// replaces the previous dependency.
    pub fn insert(&mut self, id: impl Into<PackageId>, dependency: Dependency) {
        self.dependencies.insert(id.into(), dependency);
    }

    /// Chainable form of [insert](Self::insert).
    pub fn with(mut self, id: impl Into<PackageId>, dependency: Dependency) -> Self {
        self.insert(id, dependency);
        self
    }

    /// The dependency declared for `id`, if any.
    pub fn get(&self, id: &str) -> Option<&Dependency> {
        self.dependencies.get(id)
    }

    /// Iterates dependencies in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&PackageId, &Dependency)> {
        self.dependencies.iter()
    }

    /// Number of direct dependencies.
    pub fn len(&self) -> usize {
        self.dependencies.len()
    }

    /// Whether this node has no dependencies.
    pub fn is_empty(&self) -> bool {
        self.dependencies.is_empty()
    }
}

impl<I: Into<PackageId>> FromIterator<(I, Dependency)> for ImplicationTree {
    fn from_iter<T: IntoIterator<Item = (I, Dependency)>>(iter: T) -> Self {
        Self {
            dependencies: iter
                .into_iter()
                .map(|(id, dependency)| (id.into(), dependency))
                .collect(),
        }
    }
}
