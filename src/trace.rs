// SPDX-License-Identifier: MPL-2.0

//! Provenance tracing: walking the implication tree to recover the chain of
//! dependencies that led to a chosen version, a conflicting version, or a
//! raw source string, and packaging a deadlock into a reportable two-sided
//! trace.

use std::fmt;

use crate::{Deadlock, ImplicationTree, PackageId, ResolvedPath, Version};

/// One link of a provenance chain, rendered as `in: <id>, at: <version>,
/// as: <source>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceStep {
    /// The package pulled in at this layer.
    pub id: PackageId,
    /// The version whose subtree the chain continues into. `None` only for
    /// the terminal step of a source match, where no version was chosen.
    pub version: Option<Version>,
    /// The raw source string of the dependency.
    pub source: String,
}

impl fmt::Display for TraceStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.version {
            Some(version) => write!(f, "in: {}, at: {}, as: {}", self.id, version, self.source),
            None => write!(f, "in: {}, as: {}", self.id, self.source),
        }
    }
}

/// The ordered chain from the tree root down to the first node matching
/// `(id, version)`, in depth-first preorder. `None` when the pair does not
/// occur in the tree.
pub fn version_path(tree: &ImplicationTree, id: &str, version: &str) -> Option<Vec<TraceStep>> {
    for (dependency_id, dependency) in tree.iter() {
        for (candidate, subtree) in &dependency.implication {
            if dependency_id == id && candidate == version {
                return Some(vec![TraceStep {
                    id: dependency_id.clone(),
                    version: Some(candidate.clone()),
                    source: dependency.source.clone(),
                }]);
            }
            if let Some(mut chain) = version_path(subtree, id, version) {
                chain.insert(
                    0,
                    TraceStep {
                        id: dependency_id.clone(),
                        version: Some(candidate.clone()),
                        source: dependency.source.clone(),
                    },
                );
                return Some(chain);
            }
        }
    }
    None
}

/// The ordered chain down to the first dependency whose raw source string
/// equals `source`, used to explain which chain pulled in a failing external
/// fetch. The terminal step carries no version, since none was chosen yet.
pub fn source_path(tree: &ImplicationTree, source: &str) -> Option<Vec<TraceStep>> {
    for (dependency_id, dependency) in tree.iter() {
        if dependency.source == source {
            return Some(vec![TraceStep {
                id: dependency_id.clone(),
                version: None,
                source: dependency.source.clone(),
            }]);
        }
        for (candidate, subtree) in &dependency.implication {
            if let Some(mut chain) = source_path(subtree, source) {
                chain.insert(
                    0,
                    TraceStep {
                        id: dependency_id.clone(),
                        version: Some(candidate.clone()),
                        source: dependency.source.clone(),
                    },
                );
                return Some(chain);
            }
        }
    }
    None
}

/// Prunes the implication tree to only the edges consistent with a resolved
/// path: each retained dependency keeps exactly its resolved version and the
/// pruned subtree that version implies. This is the concrete dependency tree
/// later pipeline stages act on.
pub fn resolved_tree(tree: &ImplicationTree, path: &ResolvedPath) -> ImplicationTree {
    let mut pruned = ImplicationTree::new();
    for (id, dependency) in tree.iter() {
        let Some(version) = path.get(id) else {
            continue;
        };
        let Some(subtree) = dependency.implication.get(version) else {
            continue;
        };
        let mut kept = crate::Dependency::new(dependency.source.clone());
        kept.insert_version(version.clone(), resolved_tree(subtree, path));
        pruned.insert(id.clone(), kept);
    }
    pruned
}

/// A deadlock together with the provenance chains of both contested
/// versions, ready for error reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeadlockReport {
    /// The version collision itself.
    pub deadlock: Deadlock,
    /// Chain leading to the locked version, when one was locked and occurs
    /// in the tree.
    pub locked_trail: Option<Vec<TraceStep>>,
    /// Chain leading to the conflicting version, when it occurs in the tree.
    pub conflict_trail: Option<Vec<TraceStep>>,
}

impl DeadlockReport {
    /// Walks the tree for both sides of the collision.
    pub fn new(deadlock: Deadlock, tree: &ImplicationTree) -> Self {
        let locked_trail = deadlock
            .locked
            .as_ref()
            .and_then(|locked| version_path(tree, &deadlock.id, locked));
        let conflict_trail = version_path(tree, &deadlock.id, &deadlock.conflict);
        Self {
            deadlock,
            locked_trail,
            conflict_trail,
        }
    }
}

impl fmt::Display for DeadlockReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn trail(f: &mut fmt::Formatter<'_>, chain: &Option<Vec<TraceStep>>) -> fmt::Result {
            match chain {
                Some(steps) => {
                    for step in steps {
                        writeln!(f, "  {}", step)?;
                    }
                    Ok(())
                }
                None => writeln!(f, "  unresolved provenance"),
            }
        }

        match &self.deadlock.locked {
            Some(locked) => writeln!(
                f,
                "version deadlock on {}: {} is locked while {} is required",
                self.deadlock.id, locked, self.deadlock.conflict
            )?,
            None => writeln!(
                f,
                "version deadlock on {}: {} is required but cannot be chosen",
                self.deadlock.id, self.deadlock.conflict
            )?,
        }
        writeln!(f, "locked by:")?;
        trail(f, &self.locked_trail)?;
        writeln!(f, "required by:")?;
        trail(f, &self.conflict_trail)
    }
}

#[cfg(test)]
mod tests {
    use crate::{Dependency, ImplicationTree, Map};

    use super::*;

    fn sample_tree() -> ImplicationTree {
        ImplicationTree::new()
            .with(
                "a",
                Dependency::new("registry+a").with_version(
                    "1.0.0",
                    ImplicationTree::new().with(
                        "c",
                        Dependency::new("registry+c")
                            .with_version("1.0.0", ImplicationTree::new())
                            .with_version("2.0.0", ImplicationTree::new()),
                    ),
                ),
            )
            .with(
                "b",
                Dependency::new("registry+b").with_version(
                    "1.0.0",
                    ImplicationTree::new().with(
                        "c",
                        Dependency::new("registry+c").with_version("2.0.0", ImplicationTree::new()),
                    ),
                ),
            )
    }

    fn ids(chain: &[TraceStep]) -> Vec<(&str, Option<&str>)> {
        chain
            .iter()
            .map(|step| (step.id.as_str(), step.version.as_deref()))
            .collect()
    }

    #[test]
    fn version_path_returns_the_first_match_in_preorder() {
        let tree = sample_tree();
        let chain = version_path(&tree, "c", "2.0.0").unwrap();
        // Found under a's subtree, which precedes b's.
        assert_eq!(
            ids(&chain),
            vec![("a", Some("1.0.0")), ("c", Some("2.0.0"))]
        );
        assert_eq!(chain[1].source, "registry+c");
    }

    #[test]
    fn version_path_misses_absent_pairs() {
        let tree = sample_tree();
        assert!(version_path(&tree, "c", "3.0.0").is_none());
        assert!(version_path(&tree, "d", "1.0.0").is_none());
    }

    #[test]
    fn source_path_terminates_without_a_version() {
        let tree = sample_tree();
        let chain = source_path(&tree, "registry+c").unwrap();
        assert_eq!(ids(&chain), vec![("a", Some("1.0.0")), ("c", None)]);
        assert_eq!(chain[1].to_string(), "in: c, as: registry+c");
        assert!(source_path(&tree, "registry+missing").is_none());
    }

    #[test]
    fn resolved_tree_keeps_only_path_edges() {
        let tree = sample_tree();
        let path: ResolvedPath = Map::from_iter([
            ("a".to_string(), "1.0.0".to_string()),
            ("b".to_string(), "1.0.0".to_string()),
            ("c".to_string(), "2.0.0".to_string()),
        ]);

        let pruned = resolved_tree(&tree, &path);
        let a = pruned.get("a").unwrap();
        assert_eq!(a.implication.len(), 1);
        let a_subtree = &a.implication["1.0.0"];
        let c = a_subtree.get("c").unwrap();
        assert_eq!(c.implication.len(), 1);
        assert!(c.implication.contains_key("2.0.0"));
    }

    #[test]
    fn deadlock_report_renders_both_trails() {
        let tree = sample_tree();
        let report = DeadlockReport::new(
            Deadlock {
                id: "c".to_string(),
                locked: Some("1.0.0".to_string()),
                conflict: "2.0.0".to_string(),
            },
            &tree,
        );
        let rendered = report.to_string();
        assert!(rendered.contains("version deadlock on c"));
        assert!(rendered.contains("in: c, at: 1.0.0, as: registry+c"));
        assert!(rendered.contains("in: c, at: 2.0.0, as: registry+c"));
        assert!(rendered.contains("in: a, at: 1.0.0, as: registry+a"));
    }
}
