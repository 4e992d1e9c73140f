//! Fault tree node graph model
//!
//! Nodes live in an arena keyed by [`NodeId`]; children are ordered id lists
//! and parents are back-reference id sets, so one node can appear under
//! several parents (shared sub-trees) without reference cycles. Clones hold
//! a non-owning `original` id whose resolution must be cycle-safe: the
//! back-reference may legally point anywhere, including at the clone itself.

use crate::{AnalysisError, AnalysisResult};
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Unique identifier for fault tree nodes
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct NodeId(pub u64);

impl NodeId {
    /// Create a new node ID
    pub fn new(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Fault tree node types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeType {
    /// Top event - the undesired event at the root of a tree
    TopEvent,
    /// Intermediate gate combining lower events
    Gate,
    /// Basic event - elementary condition with no further development
    BasicEvent,
    /// Confidence level leaf
    ConfidenceLevel,
    /// Robustness score leaf
    RobustnessScore,
}

impl NodeType {
    /// Gate-typed nodes carry a gate type and combine their children.
    pub fn is_gate(&self) -> bool {
        matches!(self, NodeType::TopEvent | NodeType::Gate)
    }

    /// Display label matching the classic workbench spelling
    pub fn label(&self) -> &'static str {
        match self {
            NodeType::TopEvent => "TOP EVENT",
            NodeType::Gate => "GATE",
            NodeType::BasicEvent => "BASIC EVENT",
            NodeType::ConfidenceLevel => "CONFIDENCE LEVEL",
            NodeType::RobustnessScore => "ROBUSTNESS SCORE",
        }
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Gate semantics for combining child cut sets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GateType {
    /// All children must occur
    And,
    /// Any one child suffices
    Or,
}

/// A node in the fault tree arena
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FaultTreeNode {
    /// Unique node identifier
    pub id: NodeId,
    /// Human-readable name
    pub user_name: String,
    /// Node type
    pub node_type: NodeType,
    /// AND/OR for gate-typed nodes. A gate with `None` behaves as AND,
    /// which is also the fallback for any node type that is not exactly OR.
    pub gate_type: Option<GateType>,
    /// Continuous assurance score, discretized for reporting
    pub quant_value: Option<f64>,
    /// Free-text description
    pub description: String,
    /// Free-text rationale
    pub rationale: String,
    /// Severity rating; reporting falls back to 3.0 when absent
    pub severity: Option<f64>,
    /// Controllability rating; reporting falls back to 3.0 when absent
    pub controllability: Option<f64>,
    /// Referenced safety requirement ids
    pub safety_requirements: Vec<String>,
    /// Page boundary flag: descendants of a page node are excluded from
    /// flattened node views
    pub is_page: bool,
    /// False for clones; the primary instance owns authoritative content
    pub is_primary_instance: bool,
    /// Clone back-reference. Points at the node itself for primaries.
    pub original: NodeId,
    /// Owned children, in insertion order
    pub children: Vec<NodeId>,
    /// Parent back-references (never ownership)
    pub parents: IndexSet<NodeId>,
}

impl FaultTreeNode {
    fn new(id: NodeId, user_name: &str, node_type: NodeType) -> Self {
        let user_name = if user_name.is_empty() {
            format!("Node {}", id)
        } else {
            user_name.to_string()
        };
        Self {
            id,
            user_name,
            node_type,
            gate_type: node_type.is_gate().then_some(GateType::And),
            quant_value: None,
            description: String::new(),
            rationale: String::new(),
            severity: None,
            controllability: None,
            safety_requirements: Vec::new(),
            is_page: false,
            is_primary_instance: true,
            original: id,
            children: Vec::new(),
            parents: IndexSet::new(),
        }
    }

    /// Check if this node is a basic event
    pub fn is_basic_event(&self) -> bool {
        self.node_type == NodeType::BasicEvent
    }

    /// Leaves are nodes without children, regardless of declared type
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// Fault tree arena holding every node of a model
///
/// Children are stored as id lists and parents as id sets, so the structure
/// serializes directly to the persisted project shape (clone/original ids
/// plus parent/child id lists).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FaultTree {
    nodes: IndexMap<NodeId, FaultTreeNode>,
    next_id: u64,
}

impl FaultTree {
    /// Create an empty tree
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node and return its id
    pub fn add_node(&mut self, user_name: &str, node_type: NodeType) -> NodeId {
        self.next_id += 1;
        let id = NodeId(self.next_id);
        self.nodes.insert(id, FaultTreeNode::new(id, user_name, node_type));
        id
    }

    /// Link `child` under `parent`, updating both sides of the relation.
    /// A child may be linked under several parents; relinking an existing
    /// edge is a no-op.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> AnalysisResult<()> {
        if !self.nodes.contains_key(&parent) {
            return Err(AnalysisError::UnknownNode(parent.to_string()));
        }
        if !self.nodes.contains_key(&child) {
            return Err(AnalysisError::UnknownNode(child.to_string()));
        }
        let parent_node = &mut self.nodes[&parent];
        if !parent_node.children.contains(&child) {
            parent_node.children.push(child);
        }
        self.nodes[&child].parents.insert(parent);
        Ok(())
    }

    /// Add a clone of `source`. The clone shares the source's original
    /// reference, carries a copy of its display content and starts with no
    /// children or parents of its own.
    pub fn add_clone(&mut self, source: NodeId) -> AnalysisResult<NodeId> {
        let src = self
            .nodes
            .get(&source)
            .ok_or_else(|| AnalysisError::UnknownNode(source.to_string()))?
            .clone();
        self.next_id += 1;
        let id = NodeId(self.next_id);
        let clone = FaultTreeNode {
            id,
            is_primary_instance: false,
            original: src.original,
            children: Vec::new(),
            parents: IndexSet::new(),
            ..src
        };
        self.nodes.insert(id, clone);
        Ok(id)
    }

    /// Get a node by id
    pub fn node(&self, id: NodeId) -> Option<&FaultTreeNode> {
        self.nodes.get(&id)
    }

    /// Get a mutable node by id
    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut FaultTreeNode> {
        self.nodes.get_mut(&id)
    }

    /// Iterate over every node in the arena, in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &FaultTreeNode> {
        self.nodes.values()
    }

    /// Count all nodes in the arena
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// All basic events in the arena
    pub fn basic_events(&self) -> Vec<&FaultTreeNode> {
        self.nodes.values().filter(|n| n.is_basic_event()).collect()
    }

    /// All gate-typed nodes in the arena
    pub fn gates(&self) -> Vec<&FaultTreeNode> {
        self.nodes
            .values()
            .filter(|n| n.node_type.is_gate())
            .collect()
    }

    /// Resolve a clone to its primary instance.
    ///
    /// Follows `original` references until a primary instance or a
    /// self-reference is reached. The back-reference chain may point
    /// anywhere, so a visited set guards against reference loops. For a
    /// primary node this is a no-op, and resolving twice yields the same
    /// id as resolving once.
    pub fn resolve_original(&self, id: NodeId) -> NodeId {
        let mut seen = HashSet::new();
        let mut current = id;
        while seen.insert(current) {
            match self.nodes.get(&current) {
                Some(node) if !node.is_primary_instance && node.original != current => {
                    current = node.original;
                }
                _ => break,
            }
        }
        current
    }

    /// Display label for a node: `Node <id>: <name>`, where clones show
    /// the id of their original instance.
    pub fn display_name(&self, id: NodeId) -> String {
        let Some(node) = self.nodes.get(&id) else {
            return format!("Node {}", id);
        };
        let shown = if node.is_primary_instance {
            id
        } else {
            self.resolve_original(id)
        };
        if node.user_name.is_empty() || node.user_name == format!("Node {}", shown) {
            format!("Node {}", shown)
        } else {
            format!("Node {}: {}", shown, node.user_name)
        }
    }

    /// All descendants of `root` in depth-first pre-order, each id once.
    ///
    /// A visited set guards against revisiting nodes reachable via several
    /// parents. Nodes behind a page boundary are excluded: a node (other
    /// than the root) with any page-flagged parent besides the root itself
    /// is skipped together with the walk beneath it. A page-flagged root is
    /// still included; only descendant page boundaries truncate the walk.
    pub fn all_nodes(&self, root: NodeId) -> Vec<NodeId> {
        let mut visited = HashSet::new();
        let mut out = Vec::new();
        self.collect_nodes(root, root, &mut visited, &mut out);
        out
    }

    fn collect_nodes(
        &self,
        root: NodeId,
        id: NodeId,
        visited: &mut HashSet<NodeId>,
        out: &mut Vec<NodeId>,
    ) {
        if !visited.insert(id) {
            return;
        }
        let Some(node) = self.nodes.get(&id) else {
            return;
        };
        if id != root
            && node
                .parents
                .iter()
                .any(|p| *p != root && self.nodes.get(p).is_some_and(|n| n.is_page))
        {
            return;
        }
        out.push(id);
        for &child in &node.children {
            self.collect_nodes(root, child, visited, out);
        }
    }

    /// Top-level nodes: nodes without any parent
    pub fn top_level_nodes(&self) -> Vec<NodeId> {
        self.nodes
            .values()
            .filter(|n| n.parents.is_empty())
            .map(|n| n.id)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(tree: &mut FaultTree, name: &str) -> NodeId {
        tree.add_node(name, NodeType::BasicEvent)
    }

    #[test]
    fn test_add_and_link_nodes() {
        let mut tree = FaultTree::new();
        let top = tree.add_node("Loss of braking", NodeType::TopEvent);
        let be = leaf(&mut tree, "Valve stuck");
        tree.add_child(top, be).unwrap();

        assert_eq!(tree.node_count(), 2);
        assert_eq!(tree.node(top).unwrap().children, vec![be]);
        assert!(tree.node(be).unwrap().parents.contains(&top));
        assert_eq!(tree.node(top).unwrap().gate_type, Some(GateType::And));
        assert_eq!(tree.node(be).unwrap().gate_type, None);
    }

    #[test]
    fn test_add_child_unknown_node() {
        let mut tree = FaultTree::new();
        let top = tree.add_node("Top", NodeType::TopEvent);
        let err = tree.add_child(top, NodeId::new(99)).unwrap_err();
        assert!(matches!(err, AnalysisError::UnknownNode(_)));
    }

    #[test]
    fn test_relink_existing_edge_is_noop() {
        let mut tree = FaultTree::new();
        let top = tree.add_node("Top", NodeType::TopEvent);
        let be = leaf(&mut tree, "be");
        tree.add_child(top, be).unwrap();
        tree.add_child(top, be).unwrap();
        assert_eq!(tree.node(top).unwrap().children.len(), 1);
    }

    #[test]
    fn test_all_nodes_shared_subtree_visited_once() {
        let mut tree = FaultTree::new();
        let top = tree.add_node("Top", NodeType::TopEvent);
        let g1 = tree.add_node("G1", NodeType::Gate);
        let g2 = tree.add_node("G2", NodeType::Gate);
        let shared = leaf(&mut tree, "shared");
        tree.add_child(top, g1).unwrap();
        tree.add_child(top, g2).unwrap();
        tree.add_child(g1, shared).unwrap();
        tree.add_child(g2, shared).unwrap();

        let nodes = tree.all_nodes(top);
        assert_eq!(nodes, vec![top, g1, shared, g2]);
    }

    #[test]
    fn test_all_nodes_page_boundary_truncates() {
        let mut tree = FaultTree::new();
        let top = tree.add_node("Top", NodeType::TopEvent);
        let page = tree.add_node("Page", NodeType::Gate);
        let hidden = leaf(&mut tree, "hidden");
        let visible = leaf(&mut tree, "visible");
        tree.add_child(top, page).unwrap();
        tree.add_child(top, visible).unwrap();
        tree.add_child(page, hidden).unwrap();
        tree.node_mut(page).unwrap().is_page = true;

        let nodes = tree.all_nodes(top);
        // The page node itself is listed, the walk beneath it is not.
        assert!(nodes.contains(&page));
        assert!(!nodes.contains(&hidden));
        assert!(nodes.contains(&visible));
    }

    #[test]
    fn test_all_nodes_page_root_is_included() {
        let mut tree = FaultTree::new();
        let top = tree.add_node("Top page", NodeType::TopEvent);
        let child = leaf(&mut tree, "child");
        tree.add_child(top, child).unwrap();
        tree.node_mut(top).unwrap().is_page = true;

        // A page-flagged traversal root does not truncate its own subtree.
        assert_eq!(tree.all_nodes(top), vec![top, child]);
    }

    #[test]
    fn test_resolve_original_is_idempotent() {
        let mut tree = FaultTree::new();
        let primary = leaf(&mut tree, "primary");
        let clone = tree.add_clone(primary).unwrap();
        let clone2 = tree.add_clone(clone).unwrap();

        let once = tree.resolve_original(clone2);
        assert_eq!(once, primary);
        assert_eq!(tree.resolve_original(once), primary);
        // no-op for the primary itself
        assert_eq!(tree.resolve_original(primary), primary);
    }

    #[test]
    fn test_resolve_original_survives_reference_loop() {
        let mut tree = FaultTree::new();
        let a = leaf(&mut tree, "a");
        let b = leaf(&mut tree, "b");
        tree.node_mut(a).unwrap().is_primary_instance = false;
        tree.node_mut(a).unwrap().original = b;
        tree.node_mut(b).unwrap().is_primary_instance = false;
        tree.node_mut(b).unwrap().original = a;

        // The loop terminates at a node already seen.
        let resolved = tree.resolve_original(a);
        assert!(resolved == a || resolved == b);
    }

    #[test]
    fn test_display_name_shows_original_id_for_clones() {
        let mut tree = FaultTree::new();
        let primary = tree.add_node("Sensor fault", NodeType::BasicEvent);
        let clone = tree.add_clone(primary).unwrap();
        assert_eq!(
            tree.display_name(clone),
            format!("Node {}: Sensor fault", primary)
        );
    }

    #[test]
    fn test_serde_round_trip_preserves_links() {
        let mut tree = FaultTree::new();
        let top = tree.add_node("Top", NodeType::TopEvent);
        let be = leaf(&mut tree, "be");
        tree.add_child(top, be).unwrap();
        let clone = tree.add_clone(be).unwrap();
        tree.add_child(top, clone).unwrap();

        let json = serde_json::to_string(&tree).unwrap();
        let loaded: FaultTree = serde_json::from_str(&json).unwrap();
        assert_eq!(loaded.node_count(), 3);
        assert_eq!(loaded.resolve_original(clone), be);
        assert_eq!(loaded.node(top).unwrap().children, vec![be, clone]);
    }
}
