//! # SafeCase
//!
//! Analysis core for safety-engineering workbenches: fault tree cut-set
//! enumeration, common-cause detection, argumentation text generation and
//! Goal Structuring Notation (GSN) assurance-case modeling.
//!
//! The crate is organised around two independent node-graph models:
//!
//! - [`fault_tree`] holds the fault tree arena (gates, basic events,
//!   confidence/robustness nodes) with shared sub-trees and clone links.
//!   [`cut_sets`], [`common_cause`] and [`argumentation`] operate on it.
//! - [`gsn`] holds the GSN argumentation graph (Goal, Strategy, Solution,
//!   Context, ...) with its relationship-validity rules and module
//!   resolution.
//!
//! [`assurance`], [`recommendations`] and [`risk`] provide the discretized
//! level and lookup-table utilities shared by the report generators.
//!
//! All operations are synchronous pure functions over in-memory graphs.
//! Cut-set enumeration is a direct structural enumeration with a known
//! exponential worst case for deeply AND-combined trees; callers are
//! expected to bound graph size externally.

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod argumentation;
pub mod assurance;
pub mod common_cause;
pub mod cut_sets;
pub mod fault_tree;
pub mod gsn;
pub mod recommendations;
pub mod risk;

pub use argumentation::{build_argumentation, build_text_report};
pub use assurance::AssuranceLevel;
pub use common_cause::{analyze_common_causes, format_common_cause_report};
pub use cut_sets::{calculate_cut_sets, CutSetSummary};
pub use fault_tree::{FaultTree, FaultTreeNode, GateType, NodeId, NodeType};
pub use gsn::{GsnGraph, GsnNode, GsnNodeType, GsnRelation};
pub use recommendations::{GuidanceCategory, GuidanceTables};
pub use risk::{calc_asil, AsilLevel};

/// Analysis errors
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnalysisError {
    /// A GSN relationship violates the structural rules of the notation.
    /// Raised synchronously at the offending `add_child` call, never
    /// coerced into a different link kind.
    #[error("invalid relationship: {0}")]
    InvalidRelationship(String),
    /// A risk or CAL table lookup was attempted for a combination the
    /// tables do not define. Callers must not guess a fallback level.
    #[error("unsupported risk lookup: {0}")]
    UnsupportedRisk(String),
    /// A node id that is not present in the graph arena.
    #[error("unknown node: {0}")]
    UnknownNode(String),
}

pub type AnalysisResult<T> = Result<T, AnalysisError>;
