//! Cut-set enumeration under AND/OR gate semantics
//!
//! This is a direct structural enumeration, not a minimized one: no
//! de-duplication or MOCUS-style absorption is applied beyond what falls
//! out of set union, so callers must not assume minimal cut sets in the
//! classical sense. The AND combination multiplies the cut-set counts of
//! all children, which grows exponentially when many AND'd children each
//! carry many cut sets. That is a known scaling limit of this enumeration;
//! graph size is bounded by the caller.

use crate::fault_tree::{FaultTree, GateType, NodeId};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// One minimal combination of base conditions sufficient to trigger the
/// parent event. Produced fresh on each call and never mutated afterwards.
pub type CutSet = BTreeSet<NodeId>;

/// Enumerate the cut sets of `node`.
///
/// - A node without children yields exactly one cut set containing itself.
/// - An OR gate concatenates the cut sets of its children: any one path
///   suffices, so every child alternative survives as its own set.
/// - An AND gate folds its children left to right into a Cartesian-product
///   union, starting from a single empty accumulator set. AND is also the
///   behavior of a gate without an explicit gate type and the fallback for
///   any node whose type is not exactly OR.
///
/// The resulting sequence reflects traversal order and is not sorted by
/// size.
pub fn calculate_cut_sets(tree: &FaultTree, node: NodeId) -> Vec<CutSet> {
    let Some(n) = tree.node(node) else {
        return Vec::new();
    };
    if n.children.is_empty() {
        let mut only = CutSet::new();
        only.insert(node);
        return vec![only];
    }
    match n.gate_type {
        Some(GateType::Or) => {
            let mut out = Vec::new();
            for &child in &n.children {
                out.extend(calculate_cut_sets(tree, child));
            }
            out
        }
        _ => {
            let mut acc: Vec<CutSet> = vec![CutSet::new()];
            for &child in &n.children {
                let child_sets = calculate_cut_sets(tree, child);
                let mut next = Vec::with_capacity(acc.len() * child_sets.len());
                for base in &acc {
                    for cs in &child_sets {
                        let mut merged = base.clone();
                        merged.extend(cs.iter().copied());
                        next.push(merged);
                    }
                }
                acc = next;
            }
            acc
        }
    }
}

/// Cut-set enumeration results for one top event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CutSetSummary {
    /// Event the sets were enumerated for
    pub top_event: NodeId,
    /// All cut sets, in traversal order
    pub cut_sets: Vec<CutSet>,
    /// Number of cut sets per order (set size)
    pub counts_by_order: IndexMap<usize, usize>,
    /// Order-1 cut sets: single conditions sufficient on their own
    pub single_points: Vec<NodeId>,
}

impl CutSetSummary {
    /// Enumerate and summarize the cut sets of `top_event`
    pub fn for_event(tree: &FaultTree, top_event: NodeId) -> Self {
        let cut_sets = calculate_cut_sets(tree, top_event);
        tracing::debug!(
            top_event = %top_event,
            count = cut_sets.len(),
            "enumerated cut sets"
        );
        let mut counts_by_order = IndexMap::new();
        let mut single_points = Vec::new();
        for cs in &cut_sets {
            *counts_by_order.entry(cs.len()).or_insert(0) += 1;
            if cs.len() == 1 {
                single_points.extend(cs.iter().copied());
            }
        }
        Self {
            top_event,
            cut_sets,
            counts_by_order,
            single_points,
        }
    }

    /// Total number of cut sets
    pub fn total(&self) -> usize {
        self.cut_sets.len()
    }

    /// Largest cut-set order
    pub fn max_order(&self) -> usize {
        self.cut_sets.iter().map(|cs| cs.len()).max().unwrap_or(0)
    }
}

/// Format a cut-set listing for one top event
pub fn format_cut_set_report(tree: &FaultTree, summary: &CutSetSummary) -> String {
    let mut output = String::new();
    output.push_str(&format!(
        "Cut sets for {}\n",
        tree.display_name(summary.top_event)
    ));
    output.push_str(&format!("{}\n", "-".repeat(50)));
    output.push_str(&format!("Total cut sets: {}\n", summary.total()));

    let mut orders: Vec<_> = summary.counts_by_order.iter().collect();
    orders.sort_by_key(|&(k, _)| *k);
    for (order, count) in orders {
        output.push_str(&format!("  Order {}: {} cut sets\n", order, count));
    }

    for (idx, cs) in summary.cut_sets.iter().enumerate() {
        let names: Vec<String> = cs
            .iter()
            .map(|&id| format!("{} [{}]", tree.display_name(id), id))
            .collect();
        output.push_str(&format!("{}. {{{}}}\n", idx + 1, names.join(", ")));
    }

    if !summary.single_points.is_empty() {
        output.push_str("\nSingle-condition cut sets:\n");
        for &id in &summary.single_points {
            output.push_str(&format!("  - {}\n", tree.display_name(id)));
        }
    }

    output
}
