//! Common-cause detection across repeated node occurrences
//!
//! A node reachable from the root via more than one traversal path is a
//! shared dependency across branches. Unlike the flattened node view, the
//! walk here deliberately keeps no visited set: every traversal path bumps
//! the occurrence count. Only the active recursion path is tracked, so a
//! graph corrupted into a cycle still terminates.

use crate::fault_tree::{FaultTree, NodeId};
use indexmap::IndexMap;
use std::collections::HashSet;

/// Count how often each node id is reached when walking every path from
/// `root` through the owned children links.
pub fn occurrence_counts(tree: &FaultTree, root: NodeId) -> IndexMap<NodeId, usize> {
    let mut counts = IndexMap::new();
    let mut on_path = HashSet::new();
    count_paths(tree, root, &mut counts, &mut on_path);
    counts
}

fn count_paths(
    tree: &FaultTree,
    id: NodeId,
    counts: &mut IndexMap<NodeId, usize>,
    on_path: &mut HashSet<NodeId>,
) {
    *counts.entry(id).or_insert(0) += 1;
    if !on_path.insert(id) {
        // already on the active path: count the re-entry, do not descend
        return;
    }
    if let Some(node) = tree.node(id) {
        for &child in &node.children {
            count_paths(tree, child, counts, on_path);
        }
    }
    on_path.remove(&id);
}

/// Report body for common causes beneath `root`.
///
/// One line per node reached via more than one path, carrying its display
/// name, type and description. When no node repeats the body is the
/// literal line `None found.`
pub fn analyze_common_causes(tree: &FaultTree, root: NodeId) -> String {
    let counts = occurrence_counts(tree, root);
    let mut lines = Vec::new();
    for (&id, &count) in &counts {
        if count < 2 {
            continue;
        }
        let Some(node) = tree.node(id) else {
            continue;
        };
        let description = if node.description.is_empty() {
            "no description"
        } else {
            node.description.as_str()
        };
        lines.push(format!(
            "{} ({}, {} occurrences): {}",
            tree.display_name(id),
            node.node_type,
            count,
            description
        ));
    }
    if lines.is_empty() {
        return "None found.".to_string();
    }
    lines.join("\n")
}

/// Full common-cause report with a header, in the analysis report style
pub fn format_common_cause_report(tree: &FaultTree, root: NodeId) -> String {
    let mut output = String::new();
    output.push_str(&format!(
        "Common Cause Analysis: {}\n",
        tree.display_name(root)
    ));
    output.push_str(&format!("{}\n", "=".repeat(50)));
    output.push_str(&analyze_common_causes(tree, root));
    output.push('\n');
    output
}
