//! Goal Structuring Notation model
//!
//! GSN argumentation graphs per the GSN Community Standard: Goals broken
//! down by Strategies, supported by Solutions, scoped by Context,
//! Assumption and Justification elements, optionally packaged into Modules
//! with away references. Nodes live in an arena keyed by string id;
//! children are ordered id lists, the context relation is a tagged subset
//! of the children, parents are back-reference sets.
//!
//! Structural rules are enforced at [`GsnGraph::add_child`]; legacy saved
//! data is loaded leniently (see [`GsnGraph::load_legacy`]).

use crate::{AnalysisError, AnalysisResult};
use chrono::{DateTime, Utc};
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// GSN element identifier
pub type GsnId = String;

/// GSN node types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GsnNodeType {
    /// A claim about the system to be supported
    Goal,
    /// The approach used to break down a goal
    Strategy,
    /// A reference to evidence supporting a goal
    Solution,
    /// Background information or scope
    Context,
    /// A statement taken to be true
    Assumption,
    /// Rationale for the argument approach
    Justification,
    /// Reference to a goal argued in another module
    AwayGoal,
    /// Reference to a solution held in another module
    AwaySolution,
    /// Reference to another module
    AwayModule,
    /// A package of argumentation
    Module,
}

impl GsnNodeType {
    /// Display label, matching the saved-data spelling
    pub fn label(&self) -> &'static str {
        match self {
            GsnNodeType::Goal => "Goal",
            GsnNodeType::Strategy => "Strategy",
            GsnNodeType::Solution => "Solution",
            GsnNodeType::Context => "Context",
            GsnNodeType::Assumption => "Assumption",
            GsnNodeType::Justification => "Justification",
            GsnNodeType::AwayGoal => "Away Goal",
            GsnNodeType::AwaySolution => "Away Solution",
            GsnNodeType::AwayModule => "Away Module",
            GsnNodeType::Module => "Module",
        }
    }

    /// Parse a saved-data type label
    pub fn parse(label: &str) -> Option<Self> {
        match label {
            "Goal" => Some(GsnNodeType::Goal),
            "Strategy" => Some(GsnNodeType::Strategy),
            "Solution" => Some(GsnNodeType::Solution),
            "Context" => Some(GsnNodeType::Context),
            "Assumption" => Some(GsnNodeType::Assumption),
            "Justification" => Some(GsnNodeType::Justification),
            "Away Goal" => Some(GsnNodeType::AwayGoal),
            "Away Solution" => Some(GsnNodeType::AwaySolution),
            "Away Module" => Some(GsnNodeType::AwayModule),
            "Module" => Some(GsnNodeType::Module),
            _ => None,
        }
    }
}

impl fmt::Display for GsnNodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Relation kinds between a parent and a child element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum GsnRelation {
    /// "Solved by" - the default developmental relation
    #[default]
    Solved,
    /// "In context of" - scoping relation
    Context,
}

/// A node in the GSN graph
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GsnNode {
    /// Unique identifier
    pub id: GsnId,
    /// Human-readable label
    pub user_name: String,
    /// Element type
    pub node_type: GsnNodeType,
    /// Description shown beneath the label
    pub description: String,
    /// Safety performance indicator target, if any
    pub spi_target: Option<String>,
    /// Owned children, in insertion order; context children included
    pub children: Vec<GsnId>,
    /// The subset of `children` attached via the context relation
    pub context_children: Vec<GsnId>,
    /// Parent back-references
    pub parents: IndexSet<GsnId>,
    /// False for clones
    pub is_primary_instance: bool,
    /// Clone back-reference; equals the node's own id for primaries
    pub original: GsnId,
}

impl GsnNode {
    fn new(id: &str, user_name: &str, node_type: GsnNodeType) -> Self {
        Self {
            id: id.to_string(),
            user_name: user_name.to_string(),
            node_type,
            description: String::new(),
            spi_target: None,
            children: Vec::new(),
            context_children: Vec::new(),
            parents: IndexSet::new(),
            is_primary_instance: true,
            original: id.to_string(),
        }
    }

    /// Relation a child id is attached with
    pub fn relation_of(&self, child: &str) -> Option<GsnRelation> {
        if self.context_children.iter().any(|c| c == child) {
            Some(GsnRelation::Context)
        } else if self.children.iter().any(|c| c == child) {
            Some(GsnRelation::Solved)
        } else {
            None
        }
    }
}

/// Graph metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GsnMetadata {
    /// Author
    pub author: String,
    /// Creation date
    pub created_at: DateTime<Utc>,
    /// Version string
    pub version: String,
}

impl Default for GsnMetadata {
    fn default() -> Self {
        Self {
            author: String::new(),
            created_at: Utc::now(),
            version: "1.0".to_string(),
        }
    }
}

/// Flat record shape of one node in saved project data. Legacy files list a
/// context child's id in both `children` and `context`; they may also carry
/// structurally invalid links.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GsnNodeRecord {
    /// Unique identifier
    pub unique_id: GsnId,
    /// Human-readable label
    #[serde(default)]
    pub user_name: String,
    /// Type label, e.g. "Goal" or "Away Solution"
    pub node_type: String,
    /// Description
    #[serde(default)]
    pub description: String,
    /// SPI target
    #[serde(default)]
    pub spi_target: Option<String>,
    /// Child ids (solved-by and context alike)
    #[serde(default)]
    pub children: Vec<GsnId>,
    /// Ids of context-relation children
    #[serde(default)]
    pub context: Vec<GsnId>,
    /// False for clones
    #[serde(default = "default_true")]
    pub is_primary_instance: bool,
    /// Id of the clone's original
    #[serde(default)]
    pub original_id: Option<GsnId>,
}

fn default_true() -> bool {
    true
}

impl Default for GsnNodeRecord {
    fn default() -> Self {
        Self {
            unique_id: GsnId::new(),
            user_name: String::new(),
            node_type: String::new(),
            description: String::new(),
            spi_target: None,
            children: Vec::new(),
            context: Vec::new(),
            is_primary_instance: true,
            original_id: None,
        }
    }
}

/// GSN argumentation graph
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GsnGraph {
    /// Diagram title
    pub title: String,
    /// Metadata
    pub metadata: GsnMetadata,
    nodes: IndexMap<GsnId, GsnNode>,
}

impl Default for GsnGraph {
    fn default() -> Self {
        Self::new("")
    }
}

impl GsnGraph {
    /// Create an empty graph
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            metadata: GsnMetadata::default(),
            nodes: IndexMap::new(),
        }
    }

    /// Add a node and return its id
    pub fn add_node(&mut self, id: &str, user_name: &str, node_type: GsnNodeType) -> GsnId {
        self.nodes
            .insert(id.to_string(), GsnNode::new(id, user_name, node_type));
        id.to_string()
    }

    /// Get a node by id
    pub fn node(&self, id: &str) -> Option<&GsnNode> {
        self.nodes.get(id)
    }

    /// Get a mutable node by id
    pub fn node_mut(&mut self, id: &str) -> Option<&mut GsnNode> {
        self.nodes.get_mut(id)
    }

    /// Iterate over all nodes in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &GsnNode> {
        self.nodes.values()
    }

    /// Count all nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Attach `child` under `parent` with the given relation.
    ///
    /// Fails with [`AnalysisError::InvalidRelationship`] when:
    /// - the relation is context and the child is a Goal or Strategy
    ///   (context links target supporting nodes, never primary claims),
    /// - the relation is solved and the child is a Context node (context
    ///   elements are attached via "context" only),
    /// - the parent is an Assumption (assumptions are leaves).
    ///
    /// On success the child joins the parent's `children` (and its
    /// `context_children` for a context relation) exactly once, and the
    /// child's parents gain the parent. Re-adding an existing edge is a
    /// no-op.
    pub fn add_child(
        &mut self,
        parent: &str,
        child: &str,
        relation: GsnRelation,
    ) -> AnalysisResult<()> {
        let parent_type = self
            .nodes
            .get(parent)
            .ok_or_else(|| AnalysisError::UnknownNode(parent.to_string()))?
            .node_type;
        let child_type = self
            .nodes
            .get(child)
            .ok_or_else(|| AnalysisError::UnknownNode(child.to_string()))?
            .node_type;
        validate_relation(parent, parent_type, child, child_type, relation)?;

        let parent_node = self.nodes.get_mut(parent).expect("checked above");
        if !parent_node.children.iter().any(|c| c == child) {
            parent_node.children.push(child.to_string());
        }
        if relation == GsnRelation::Context
            && !parent_node.context_children.iter().any(|c| c == child)
        {
            parent_node.context_children.push(child.to_string());
        }
        self.nodes
            .get_mut(child)
            .expect("checked above")
            .parents
            .insert(parent.to_string());
        Ok(())
    }

    /// Add a clone of `source` under the new id. The clone shares the
    /// source's original reference and starts unconnected.
    pub fn clone_node(&mut self, source: &str, new_id: &str) -> AnalysisResult<GsnId> {
        let src = self
            .nodes
            .get(source)
            .ok_or_else(|| AnalysisError::UnknownNode(source.to_string()))?
            .clone();
        let clone = GsnNode {
            id: new_id.to_string(),
            is_primary_instance: false,
            original: src.original.clone(),
            children: Vec::new(),
            context_children: Vec::new(),
            parents: IndexSet::new(),
            ..src
        };
        self.nodes.insert(new_id.to_string(), clone);
        Ok(new_id.to_string())
    }

    /// Resolve a clone to its primary instance, cycle-safe; a no-op for
    /// primaries.
    pub fn resolve_original<'a>(&'a self, id: &'a str) -> &'a str {
        let mut seen = HashSet::new();
        let mut current = id;
        while seen.insert(current) {
            match self.nodes.get(current) {
                Some(node) if !node.is_primary_instance && node.original != current => {
                    current = node.original.as_str();
                }
                _ => break,
            }
        }
        current
    }

    /// Name of the nearest enclosing Module node.
    ///
    /// Walks the ancestor chain from the node; when the chain does not
    /// reach a Module and the node is a clone, walks again from its
    /// original (clones may be relocated into a different module). The
    /// lookup is evaluated live on every call, so renaming a Module node
    /// is reflected immediately. Cycle-safe.
    pub fn module_name(&self, id: &str) -> Option<String> {
        if let Some(name) = self.nearest_module(id) {
            return Some(name);
        }
        let original = self.resolve_original(id);
        if original != id {
            return self.nearest_module(original);
        }
        None
    }

    fn nearest_module(&self, start: &str) -> Option<String> {
        let mut visited: HashSet<&str> = HashSet::new();
        let mut frontier: Vec<&str> = vec![start];
        visited.insert(start);
        while !frontier.is_empty() {
            let mut next = Vec::new();
            for id in frontier {
                let Some(node) = self.nodes.get(id) else {
                    continue;
                };
                for parent_id in &node.parents {
                    let Some(parent) = self.nodes.get(parent_id.as_str()) else {
                        continue;
                    };
                    if parent.node_type == GsnNodeType::Module {
                        return Some(parent.user_name.clone());
                    }
                    if visited.insert(parent_id.as_str()) {
                        next.push(parent_id.as_str());
                    }
                }
            }
            frontier = next;
        }
        None
    }

    /// Load a graph from flat legacy records.
    ///
    /// Leniency rules, distinct from the strict [`Self::add_child`] check:
    /// an id listed in both `children` and `context` collapses to a single
    /// context-tagged edge; structurally invalid links (an Assumption with
    /// children, a Goal in a context array, ...) are dropped silently with
    /// no link in either direction; records with an unknown type label are
    /// skipped entirely.
    pub fn load_legacy(title: &str, records: &[GsnNodeRecord]) -> Self {
        let mut graph = Self::new(title);
        for record in records {
            let Some(node_type) = GsnNodeType::parse(&record.node_type) else {
                tracing::warn!(
                    id = %record.unique_id,
                    node_type = %record.node_type,
                    "skipping node with unknown type"
                );
                continue;
            };
            let id = graph.add_node(&record.unique_id, &record.user_name, node_type);
            let node = graph.node_mut(&id).expect("just inserted");
            node.description = record.description.clone();
            node.spi_target = record.spi_target.clone();
            if !record.is_primary_instance {
                node.is_primary_instance = false;
                if let Some(original) = &record.original_id {
                    node.original = original.clone();
                }
            }
        }
        for record in records {
            if !graph.nodes.contains_key(&record.unique_id) {
                continue;
            }
            let context_ids: HashSet<&str> =
                record.context.iter().map(|s| s.as_str()).collect();
            for child in &record.children {
                let relation = if context_ids.contains(child.as_str()) {
                    GsnRelation::Context
                } else {
                    GsnRelation::Solved
                };
                graph.link_lenient(&record.unique_id, child, relation);
            }
            for child in &record.context {
                if record.children.contains(child) {
                    continue; // collapsed with the children entry above
                }
                graph.link_lenient(&record.unique_id, child, GsnRelation::Context);
            }
        }
        graph
    }

    fn link_lenient(&mut self, parent: &str, child: &str, relation: GsnRelation) {
        if let Err(err) = self.add_child(parent, child, relation) {
            tracing::warn!(%parent, %child, ?relation, %err, "dropping invalid legacy link");
        }
    }

    /// Flatten the graph back to legacy records
    pub fn to_records(&self) -> Vec<GsnNodeRecord> {
        self.nodes
            .values()
            .map(|node| GsnNodeRecord {
                unique_id: node.id.clone(),
                user_name: node.user_name.clone(),
                node_type: node.node_type.label().to_string(),
                description: node.description.clone(),
                spi_target: node.spi_target.clone(),
                children: node.children.clone(),
                context: node.context_children.clone(),
                is_primary_instance: node.is_primary_instance,
                original_id: (!node.is_primary_instance).then(|| node.original.clone()),
            })
            .collect()
    }

    /// Validate structural health: orphan elements and goals that neither
    /// receive nor provide support.
    pub fn validate(&self) -> GsnValidationReport {
        let mut report = GsnValidationReport::default();
        let mut linked: HashSet<&str> = HashSet::new();
        for node in self.nodes.values() {
            for child in &node.children {
                linked.insert(child.as_str());
                linked.insert(node.id.as_str());
            }
        }
        for node in self.nodes.values() {
            if self.nodes.len() > 1 && !linked.contains(node.id.as_str()) {
                report.orphan_elements.push(node.id.clone());
                report
                    .warnings
                    .push(format!("{} is not connected to the argument", node.id));
            }
            if node.node_type == GsnNodeType::Goal
                && node.children.len() == node.context_children.len()
                && !node.parents.iter().any(|p| {
                    self.nodes
                        .get(p.as_str())
                        .is_some_and(|n| n.relation_of(&node.id) == Some(GsnRelation::Solved))
                })
            {
                report.undeveloped_goals.push(node.id.clone());
            }
        }
        report.valid = report.orphan_elements.is_empty() && report.undeveloped_goals.is_empty();
        report
    }

    /// Export to Graphviz DOT: solid arrows for solved-by links, dashed
    /// for in-context links.
    pub fn to_graphviz(&self) -> String {
        let mut output = String::new();
        output.push_str("digraph GSN {\n");
        output.push_str("  rankdir=TB;\n");
        output.push_str(&format!("  label=\"{}\";\n\n", self.title));
        for node in self.nodes.values() {
            let shape = match node.node_type {
                GsnNodeType::Goal | GsnNodeType::AwayGoal => "rectangle",
                GsnNodeType::Strategy => "parallelogram",
                GsnNodeType::Solution | GsnNodeType::AwaySolution => "circle",
                GsnNodeType::Context => "box",
                GsnNodeType::Assumption | GsnNodeType::Justification => "ellipse",
                GsnNodeType::Module | GsnNodeType::AwayModule => "folder",
            };
            let style = if node.is_primary_instance {
                "solid"
            } else {
                "dashed"
            };
            output.push_str(&format!(
                "  \"{}\" [shape={}, style={}, label=\"{}\\n{}\"];\n",
                node.id, shape, style, node.id, node.user_name
            ));
        }
        output.push('\n');
        for node in self.nodes.values() {
            for child in &node.children {
                let style = match node.relation_of(child) {
                    Some(GsnRelation::Context) => "dashed",
                    _ => "solid",
                };
                output.push_str(&format!(
                    "  \"{}\" -> \"{}\" [style={}];\n",
                    node.id, child, style
                ));
            }
        }
        output.push_str("}\n");
        output
    }

    /// Export a Markdown summary grouped by element type
    pub fn to_markdown(&self) -> String {
        let mut output = String::new();
        output.push_str(&format!("# {}\n\n", self.title));
        for (heading, node_type) in [
            ("Goals", GsnNodeType::Goal),
            ("Strategies", GsnNodeType::Strategy),
            ("Solutions", GsnNodeType::Solution),
            ("Context", GsnNodeType::Context),
            ("Assumptions", GsnNodeType::Assumption),
            ("Justifications", GsnNodeType::Justification),
        ] {
            let members: Vec<_> = self
                .nodes
                .values()
                .filter(|n| n.node_type == node_type)
                .collect();
            if members.is_empty() {
                continue;
            }
            output.push_str(&format!("## {}\n\n", heading));
            for node in members {
                output.push_str(&format!("- **{}**: {}", node.id, node.user_name));
                if !node.description.is_empty() {
                    output.push_str(&format!(" - {}", node.description));
                }
                if let Some(module) = self.module_name(&node.id) {
                    output.push_str(&format!(" (module: {})", module));
                }
                output.push('\n');
            }
            output.push('\n');
        }
        output
    }
}

fn validate_relation(
    parent: &str,
    parent_type: GsnNodeType,
    child: &str,
    child_type: GsnNodeType,
    relation: GsnRelation,
) -> AnalysisResult<()> {
    if parent_type == GsnNodeType::Assumption {
        return Err(AnalysisError::InvalidRelationship(format!(
            "assumption {} cannot have children",
            parent
        )));
    }
    match relation {
        GsnRelation::Context => {
            if matches!(child_type, GsnNodeType::Goal | GsnNodeType::Strategy) {
                return Err(AnalysisError::InvalidRelationship(format!(
                    "{} {} cannot be attached in context of {}",
                    child_type, child, parent
                )));
            }
        }
        GsnRelation::Solved => {
            if child_type == GsnNodeType::Context {
                return Err(AnalysisError::InvalidRelationship(format!(
                    "context {} must be attached via the context relation",
                    child
                )));
            }
        }
    }
    Ok(())
}

/// Result of [`GsnGraph::validate`]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GsnValidationReport {
    /// True when no issue was found
    pub valid: bool,
    /// Elements with no link at all
    pub orphan_elements: Vec<GsnId>,
    /// Goals with no solved-by child and no supporting role
    pub undeveloped_goals: Vec<GsnId>,
    /// Human-readable findings
    pub warnings: Vec<String>,
}
