// SPDX-FileCopyrightText: 2026 ARGIR Project Team
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Verified repair suggestions
//!
//! Two engines produce [`Repair`]s for diagnosed issues: AF enforcement
//! edits the attack relation, abduction adds hypothesis premises. Every
//! repair is checked against a patched copy of the graph; the input graph
//! is never mutated. Finding nothing is a normal outcome.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::RepairConfig;
use crate::core::{Argir, Edge, Node};
use crate::diagnostics::{Issue, IssueType};
use crate::fol::FolMode;
use crate::provers::ProverBackend;
use crate::semantics::{Acceptance, AfEdit, AfSolver, Semantics};

pub mod abduction;
pub mod af_enforce;

pub use abduction::abduce_premises;
pub use af_enforce::enforce_goal;

/// Graph edits proposed by one repair
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Patch {
    #[serde(default)]
    pub add_nodes: Vec<Node>,
    #[serde(default)]
    pub add_edges: Vec<Edge>,
    /// Matched on source, target and kind
    #[serde(default)]
    pub del_edges: Vec<Edge>,
    /// Hypothesis atoms in TPTP syntax
    #[serde(default)]
    pub fol_hypotheses: Vec<String>,
    #[serde(default)]
    pub af_edits: Vec<AfEdit>,
}

impl Patch {
    pub fn is_empty(&self) -> bool {
        self.add_nodes.is_empty()
            && self.add_edges.is_empty()
            && self.del_edges.is_empty()
            && self.fol_hypotheses.is_empty()
            && self.af_edits.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RepairKind {
    #[serde(rename = "AF")]
    Af,
    #[serde(rename = "FOL")]
    Fol,
}

/// What re-checking the patched graph showed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verification {
    pub af_semantics: Semantics,
    /// `None` when the AF solver gave no answer on the patched graph
    pub af_goal_accepted: Option<bool>,
    #[serde(default)]
    pub af_optimal: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fol_entailed: Option<bool>,
    #[serde(default)]
    pub artifacts: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Repair {
    pub id: String,
    pub issue_id: String,
    pub kind: RepairKind,
    pub patch: Patch,
    pub cost: usize,
    pub verification: Verification,
}

/// Patched deep copy of `argir`
///
/// Nodes whose id already exists are skipped, deletions remove every
/// matching edge, and added edges that already exist are not duplicated.
pub fn apply_patch(argir: &Argir, patch: &Patch) -> Argir {
    let mut patched = argir.clone();
    let graph = &mut patched.graph;

    for node in &patch.add_nodes {
        if !graph.contains(&node.id) {
            graph.nodes.push(node.clone());
        }
    }
    for del in &patch.del_edges {
        graph
            .edges
            .retain(|e| !(e.source == del.source && e.target == del.target && e.kind == del.kind));
    }
    for edge in &patch.add_edges {
        if !graph.has_edge(&edge.source, &edge.target, edge.kind) {
            graph.edges.push(edge.clone());
        }
    }
    patched
}

/// Shared collaborators and bounds for both engines
pub struct RepairContext<'a> {
    pub solver: &'a dyn AfSolver,
    pub prover: &'a dyn ProverBackend,
    pub config: &'a RepairConfig,
    pub semantics: Semantics,
    pub acceptance: Acceptance,
    pub fol_mode: FolMode,

    /// Declared goal of the document, if any
    pub goal_id: Option<String>,
}

/// Repairs for one issue, dispatched on its type
pub async fn repair_issue(ctx: &RepairContext<'_>, argir: &Argir, issue: &Issue) -> Vec<Repair> {
    match issue.kind {
        IssueType::GoalUnreachable | IssueType::ContradictionUnresolved => {
            enforce_goal(ctx, argir, issue).await
        }
        IssueType::UnsupportedInference | IssueType::WeakSchemeInstantiation => {
            abduce_premises(ctx, argir, issue).await
        }
        IssueType::CircularSupport => {
            debug!(issue = %issue.id, "No repair engine for circular support");
            Vec::new()
        }
    }
}

/// Repairs for every issue, in issue order
pub async fn repair_all(ctx: &RepairContext<'_>, argir: &Argir, issues: &[Issue]) -> Vec<Repair> {
    if !ctx.config.enabled {
        return Vec::new();
    }
    let mut repairs = Vec::new();
    for issue in issues {
        let found = repair_issue(ctx, argir, issue).await;
        debug!(issue = %issue.id, repairs = found.len(), "Repair search finished");
        repairs.extend(found);
    }
    info!(issues = issues.len(), repairs = repairs.len(), "Repair search complete");
    repairs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ArgumentGraph, AttackKind};
    use serde_json::json;

    fn sample() -> Argir {
        Argir::new(
            "",
            ArgumentGraph {
                nodes: vec![Node::new("a"), Node::new("b")],
                edges: vec![Edge::attack("a", "b", AttackKind::Rebut), Edge::support("a", "b")],
            },
        )
    }

    #[test]
    fn test_apply_patch_leaves_original_alone() {
        let argir = sample();
        let patch = Patch {
            add_nodes: vec![Node::new("c"), Node::new("a")],
            add_edges: vec![Edge::support("c", "b")],
            del_edges: vec![Edge::attack("a", "b", AttackKind::Unknown)],
            ..Default::default()
        };
        let patched = apply_patch(&argir, &patch);
        assert_eq!(patched.graph.nodes.len(), 3);
        assert_eq!(patched.graph.attack_edges().count(), 0);
        assert_eq!(patched.graph.support_edges().count(), 2);
        assert_eq!(argir.graph.edges.len(), 2);
    }

    #[test]
    fn test_repair_kind_serializes_upper() {
        assert_eq!(serde_json::to_value(RepairKind::Af).unwrap(), json!("AF"));
        assert_eq!(serde_json::to_value(RepairKind::Fol).unwrap(), json!("FOL"));
        assert!(Patch::default().is_empty());
    }
}
