//! Structured diagnostics emitted by a generation call
//!
//! Every report is plain data (selector identity, node paths and depths) so callers can inspect
//! or serialize it. `Display` renders the human-readable message carried by [`Error`](crate::Error).

use std::fmt;

use itertools::Itertools;
use serde::Serialize;

use crate::node_model::Node;
use crate::node_model::NodeTree;
use crate::selector::OverrideKind;

/// A node as it appears in a diagnostic
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeReport {
    /// Display path from the root, e.g. `Person.address.street`
    pub path:      String,
    /// Distance from the root
    pub depth:     usize,
    /// Display form of the node's type
    pub type_name: String,
    /// Display paths of every ancestor, nearest first
    pub ancestors: Vec<String>,
}

impl NodeReport {
    pub(crate) fn from_node(tree: &NodeTree, node: &Node) -> Self {
        Self {
            path:      node.display_path().to_string(),
            depth:     node.depth(),
            type_name: node.ty().to_string(),
            ancestors: tree
                .ancestors(node.id())
                .map(|ancestor| ancestor.display_path().to_string())
                .collect(),
        }
    }
}

/// An origin selector that matched more than one node
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AmbiguousSelectorReport {
    /// Display form of the selector
    pub selector: String,
    /// First node matched, in tree order
    pub first:    NodeReport,
    /// Second node matched; evaluation stopped here
    pub second:   NodeReport,
}

impl fmt::Display for AmbiguousSelectorReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Ambiguous selector {}: expected a single matching node but found at least two",
            self.selector
        )?;
        for (label, node) in [("Match 1", &self.first), ("Match 2", &self.second)] {
            writeln!(f, " -> {label}: {} (depth {})", node.path, node.depth)?;
            for ancestor in &node.ancestors {
                writeln!(f, "      within {ancestor}")?;
            }
        }
        write!(f, "Evaluation stopped after the second match")
    }
}

/// Assignments whose destinations could not be given a value
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnresolvedAssignmentReport {
    /// Declarations that blocked at least one destination, in declaration order
    pub assignments: Vec<String>,
    /// Distinct destination nodes left unresolved
    pub nodes:       Vec<NodeReport>,
}

impl fmt::Display for UnresolvedAssignmentReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Unresolved assignment expression")?;
        writeln!(f, "The following assignments could not be applied:")?;
        for (index, assignment) in self.assignments.iter().enumerate() {
            writeln!(f, " -> [{}] {assignment}", index + 1)?;
        }
        writeln!(f, "As a result, these nodes could not be populated:")?;
        for node in &self.nodes {
            writeln!(f, " -> {} (depth {})", node.path, node.depth)?;
        }
        write!(
            f,
            "Possible causes: a cycle between assignments, or an origin that is ignored or absent"
        )
    }
}

/// One declared selector that matched nothing
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct UnusedSelector {
    /// Declaration family
    pub kind:     OverrideKind,
    /// Display form of the selector
    pub selector: String,
}

/// All selectors that matched zero nodes during a call
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UnusedSelectorReport {
    /// Every unused selector, grouped by kind in declaration order
    pub selectors: Vec<UnusedSelector>,
}

impl UnusedSelectorReport {
    /// Whether every selector was used
    pub fn is_empty(&self) -> bool { self.selectors.is_empty() }

    /// Selectors declared through one override kind
    pub fn of_kind(&self, kind: OverrideKind) -> impl Iterator<Item = &str> {
        self.selectors
            .iter()
            .filter(move |unused| unused.kind == kind)
            .map(|unused| unused.selector.as_str())
    }

    pub(crate) fn merge(&mut self, other: Self) {
        for unused in other.selectors {
            if !self.selectors.contains(&unused) {
                self.selectors.push(unused);
            }
        }
    }
}

impl fmt::Display for UnusedSelectorReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Found unused selectors")?;
        let grouped = self.selectors.iter().into_group_map_by(|unused| unused.kind);
        for kind in OverrideKind::ALL {
            let Some(selectors) = grouped.get(&kind) else {
                continue;
            };
            writeln!(f, " -> unused selectors in {}:", kind.method_names())?;
            for (index, unused) in selectors.iter().enumerate() {
                writeln!(f, "    {}: {}", index + 1, unused.selector)?;
            }
        }
        write!(
            f,
            "Unused selectors usually point at a typo or a field that is not part of the type; \
             enable lenient mode to ignore them"
        )
    }
}

/// A leaf generator failure with the node it happened at
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratorFailureReport {
    /// Display path of the failing node
    pub path:      String,
    /// Distance from the root
    pub depth:     usize,
    /// Display form of the node's type
    pub type_name: String,
    /// The generator's error, with its causes
    pub message:   String,
}

impl fmt::Display for GeneratorFailureReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Generator failed at {} (type {}, depth {}): {}",
            self.path, self.type_name, self.depth, self.message
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(path: &str, depth: usize, ancestors: &[&str]) -> NodeReport {
        NodeReport {
            path: path.to_string(),
            depth,
            type_name: "i32".to_string(),
            ancestors: ancestors.iter().map(ToString::to_string).collect(),
        }
    }

    #[test]
    fn test_ambiguous_report_names_both_paths() {
        let report = AmbiguousSelectorReport {
            selector: "field(x)".to_string(),
            first:    node("Root.left.x", 2, &["Root.left", "Root"]),
            second:   node("Root.right.x", 2, &["Root.right", "Root"]),
        };
        let message = report.to_string();
        assert!(message.contains("Match 1: Root.left.x (depth 2)"));
        assert!(message.contains("Match 2: Root.right.x (depth 2)"));
        assert!(message.ends_with("Evaluation stopped after the second match"));
    }

    #[test]
    fn test_unused_report_groups_by_kind() {
        let report = UnusedSelectorReport {
            selectors: vec![
                UnusedSelector {
                    kind:     OverrideKind::Ignore,
                    selector: "field(Person.nam)".to_string(),
                },
                UnusedSelector {
                    kind:     OverrideKind::Generate,
                    selector: "all(Address)".to_string(),
                },
            ],
        };
        assert_eq!(
            report.of_kind(OverrideKind::Ignore).collect::<Vec<_>>(),
            vec!["field(Person.nam)"]
        );
        let message = report.to_string();
        assert!(message.contains("ignore()"));
        assert!(message.contains("1: all(Address)"));
    }

    #[test]
    fn test_unused_report_merge_skips_duplicates() {
        let unused = UnusedSelector {
            kind:     OverrideKind::Nullable,
            selector: "root()".to_string(),
        };
        let mut report = UnusedSelectorReport {
            selectors: vec![unused.clone()],
        };
        report.merge(UnusedSelectorReport {
            selectors: vec![unused],
        });
        assert_eq!(report.selectors.len(), 1);
    }
}
