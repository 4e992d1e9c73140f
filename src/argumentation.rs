//! Argumentation text generation
//!
//! Builds the human-readable rationale for a top event: discretized
//! assurance level, severity/controllability, the applicable guidance
//! categories, the cut-set listing and per-node descriptions for every
//! node appearing in a cut set. Numeric fields that are missing degrade to
//! their documented defaults; text generation never fails.

use crate::assurance::{rating_or_default, AssuranceLevel};
use crate::cut_sets::{calculate_cut_sets, CutSet};
use crate::fault_tree::{FaultTree, NodeId};
use crate::recommendations::{GuidanceCategory, GuidanceTables};
use std::collections::HashSet;

/// Build the argumentation text for `node`.
pub fn build_argumentation(tree: &FaultTree, node: NodeId, tables: &GuidanceTables) -> String {
    let Some(event) = tree.node(node) else {
        return String::new();
    };
    let level = AssuranceLevel::from_optional(event.quant_value);
    let severity = rating_or_default(event.severity);
    let controllability = rating_or_default(event.controllability);

    let mut output = String::new();
    output.push_str(&format!("Argumentation for {}\n", tree.display_name(node)));
    output.push_str(&format!("{}\n\n", "=".repeat(50)));

    match event.quant_value {
        Some(value) => output.push_str(&format!(
            "Assurance: {} (continuous: {:.2}, discrete: {})\n",
            level,
            value,
            level.as_number()
        )),
        None => output.push_str(&format!(
            "Assurance: {} (no quantitative value recorded)\n",
            level
        )),
    }
    output.push_str(&format!(
        "Severity: {:.1}, Controllability: {:.1}\n",
        severity, controllability
    ));
    if !event.description.is_empty() {
        output.push_str(&format!("Description: {}\n", event.description));
    }
    if !event.rationale.is_empty() {
        output.push_str(&format!("Rationale: {}\n", event.rationale));
    }

    let cut_sets = calculate_cut_sets(tree, node);
    output.push('\n');
    output.push_str(&format_recommendations(tree, &cut_sets, level, tables));
    output.push('\n');
    output.push_str(&format_cut_set_section(tree, &cut_sets));
    output.push('\n');
    output.push_str(&format_base_condition_section(tree, &cut_sets));
    output
}

/// Recommendations section: the four scalar categories for the level plus
/// extra recommendations keyword-matched against the descriptions of the
/// base conditions.
fn format_recommendations(
    tree: &FaultTree,
    cut_sets: &[CutSet],
    level: AssuranceLevel,
    tables: &GuidanceTables,
) -> String {
    let mut output = String::new();
    output.push_str(&format!(
        "Recommendations for Prototype Assurance Level (PAL) {}:\n",
        level.as_number()
    ));
    for category in GuidanceCategory::SCALAR {
        if let Some(text) = tables.recommendation(category, level) {
            output.push_str(&format!("{}:\n  {}\n", category.label(), text));
        }
    }

    let mut extra_lines = Vec::new();
    let mut seen_keywords = HashSet::new();
    for &id in unique_cut_set_nodes(cut_sets).iter() {
        let Some(node) = tree.node(id) else { continue };
        for (keyword, text) in tables.extra_for_description(&node.description, level) {
            if seen_keywords.insert(keyword.to_string()) {
                extra_lines.push(format!("  [{}] {}", keyword, text));
            }
        }
    }
    if !extra_lines.is_empty() {
        output.push_str(&format!("{}:\n", GuidanceCategory::Extra.label()));
        for line in extra_lines {
            output.push_str(&line);
            output.push('\n');
        }
    }
    output
}

fn format_cut_set_section(tree: &FaultTree, cut_sets: &[CutSet]) -> String {
    let mut output = String::new();
    output.push_str("Cut sets:\n");
    if cut_sets.is_empty() {
        output.push_str("  (none)\n");
        return output;
    }
    for (idx, cs) in cut_sets.iter().enumerate() {
        let names: Vec<String> = cs.iter().map(|&id| tree.display_name(id)).collect();
        output.push_str(&format!("  {}. {}\n", idx + 1, names.join(" AND ")));
    }
    output
}

/// One paragraph per base condition appearing in any cut set, in first
/// occurrence order, each id described once.
fn format_base_condition_section(tree: &FaultTree, cut_sets: &[CutSet]) -> String {
    let mut output = String::new();
    output.push_str("Base conditions:\n");
    for id in unique_cut_set_nodes(cut_sets) {
        let Some(node) = tree.node(id) else { continue };
        output.push_str(&format!("- {} ({})", tree.display_name(id), node.node_type));
        if !node.description.is_empty() {
            output.push_str(&format!(": {}", node.description));
        }
        if !node.rationale.is_empty() {
            output.push_str(&format!(" Rationale: {}", node.rationale));
        }
        output.push('\n');
    }
    output
}

fn unique_cut_set_nodes(cut_sets: &[CutSet]) -> Vec<NodeId> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for cs in cut_sets {
        for &id in cs {
            if seen.insert(id) {
                out.push(id);
            }
        }
    }
    out
}

/// Indented plain-text dump of the tree beneath `node`, one line per node.
/// Shared nodes appear once per path; recursion stops on back-edges.
pub fn build_text_report(tree: &FaultTree, node: NodeId, indent: usize) -> String {
    let mut output = String::new();
    let mut on_path = HashSet::new();
    text_report_rec(tree, node, indent, &mut on_path, &mut output);
    output
}

fn text_report_rec(
    tree: &FaultTree,
    id: NodeId,
    indent: usize,
    on_path: &mut HashSet<NodeId>,
    output: &mut String,
) {
    let Some(node) = tree.node(id) else { return };
    output.push_str(&"  ".repeat(indent));
    output.push_str(&format!("{} [{}]", tree.display_name(id), node.node_type));
    if !node.description.is_empty() {
        output.push_str(&format!(": {}", node.description));
    }
    output.push('\n');
    if !on_path.insert(id) {
        return;
    }
    for &child in &node.children {
        text_report_rec(tree, child, indent + 1, on_path, output);
    }
    on_path.remove(&id);
}
