// SPDX-FileCopyrightText: 2026 ARGIR Project Team
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Abstract argumentation: projection and semantics
//!
//! Arguments are node ids, attacks are attack edges. Support edges play no
//! part in acceptance. Extensions come from an [`AfSolver`]: clingo over
//! ASP encodings, or the in-process reference solver.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::PathBuf;
use tracing::debug;

use crate::core::ArgumentGraph;

pub mod asp;
pub mod clingo;
pub mod native;

pub use clingo::ClingoSolver;
pub use native::NativeSolver;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Semantics {
    Grounded,
    Preferred,
    Stable,
}

impl Semantics {
    pub fn all() -> [Semantics; 3] {
        [Semantics::Grounded, Semantics::Preferred, Semantics::Stable]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Semantics::Grounded => "grounded",
            Semantics::Preferred => "preferred",
            Semantics::Stable => "stable",
        }
    }
}

impl std::str::FromStr for Semantics {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "grounded" => Ok(Semantics::Grounded),
            "preferred" => Ok(Semantics::Preferred),
            "stable" => Ok(Semantics::Stable),
            _ => Err(anyhow::anyhow!("Unknown semantics: {}", s)),
        }
    }
}

impl std::fmt::Display for Semantics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Membership mode for multi-extension semantics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Acceptance {
    /// In at least one extension
    Credulous,
    /// In every extension (and at least one exists)
    Skeptical,
}

/// An abstract argumentation framework
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Framework {
    pub arguments: Vec<String>,
    pub attacks: Vec<(String, String)>,
}

/// Projection result: the framework plus nodes left out of it
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Projection {
    pub framework: Framework,
    pub excluded: Vec<String>,
}

impl Framework {
    /// Arguments are sorted and deduplicated; attacks keep first-seen order
    pub fn new(arguments: Vec<String>, attacks: Vec<(String, String)>) -> Self {
        let arguments: Vec<String> = arguments
            .into_iter()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let mut deduped: Vec<(String, String)> = Vec::with_capacity(attacks.len());
        for attack in attacks {
            if arguments.contains(&attack.0)
                && arguments.contains(&attack.1)
                && !deduped.contains(&attack)
            {
                deduped.push(attack);
            }
        }
        Framework {
            arguments,
            attacks: deduped,
        }
    }

    /// Every node is an argument
    pub fn from_graph(graph: &ArgumentGraph) -> Self {
        let attacks = graph
            .attack_edges()
            .map(|e| (e.source.clone(), e.target.clone()))
            .collect();
        Framework::new(graph.node_ids(), attacks)
    }

    /// Attacks between current arguments whose source attacks `target`
    pub fn attackers_of<'a>(&'a self, target: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.attacks
            .iter()
            .filter(move |(_, t)| t == target)
            .map(|(s, _)| s.as_str())
    }

    pub fn attacks(&self, source: &str, target: &str) -> bool {
        self.attacks.iter().any(|(s, t)| s == source && t == target)
    }

    pub fn contains(&self, argument: &str) -> bool {
        self.arguments.iter().any(|a| a == argument)
    }

    /// Framework after deleting and adding attacks
    pub fn with_edits(&self, edits: &[AfEdit]) -> Framework {
        let mut attacks = self.attacks.clone();
        for edit in edits {
            match edit {
                AfEdit::DelAttack { source, target } => {
                    attacks.retain(|(s, t)| !(s == source && t == target));
                }
                AfEdit::AddAttack { source, target } => {
                    attacks.push((source.clone(), target.clone()));
                }
            }
        }
        Framework::new(self.arguments.clone(), attacks)
    }
}

/// Node is bookkeeping for a rule: a rule, no conclusion, no inline premises, no attacks
fn is_rule_bookkeeping(graph: &ArgumentGraph, id: &str) -> bool {
    let Some(node) = graph.node(id) else {
        return false;
    };
    node.rule.is_some()
        && node.conclusion.is_none()
        && node.statement_premises().next().is_none()
        && !graph
            .attack_edges()
            .any(|e| e.source == id || e.target == id)
}

/// Project the graph onto an AF, leaving out rule bookkeeping nodes
///
/// Excluded nodes are unattacked and attack nothing, so every other
/// argument's status is unchanged; callers treat them as accepted.
pub fn project(graph: &ArgumentGraph) -> Projection {
    let full = Framework::from_graph(graph);
    let (kept, excluded): (Vec<String>, Vec<String>) = full
        .arguments
        .iter()
        .cloned()
        .partition(|id| !is_rule_bookkeeping(graph, id));
    Projection {
        framework: Framework::new(kept, full.attacks),
        excluded,
    }
}

pub type Extension = BTreeSet<String>;

/// The extension family for one semantics, sorted and deduplicated
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Extensions {
    pub semantics: Semantics,
    pub sets: Vec<Extension>,
}

impl Extensions {
    pub fn new(semantics: Semantics, sets: Vec<Extension>) -> Self {
        let mut sets = sets;
        sets.sort();
        sets.dedup();
        Extensions { semantics, sets }
    }

    /// Grounded: membership in the single extension. Otherwise per `acceptance`.
    pub fn accepts(&self, argument: &str, acceptance: Acceptance) -> bool {
        match (self.semantics, acceptance) {
            (Semantics::Grounded, _) | (_, Acceptance::Credulous) => {
                self.sets.iter().any(|s| s.contains(argument))
            }
            (_, Acceptance::Skeptical) => {
                !self.sets.is_empty() && self.sets.iter().all(|s| s.contains(argument))
            }
        }
    }

    /// Arguments accepted under `acceptance`, sorted
    pub fn accepted(&self, acceptance: Acceptance) -> Vec<String> {
        let all: BTreeSet<&String> = self.sets.iter().flatten().collect();
        all.into_iter()
            .filter(|a| self.accepts(a, acceptance))
            .cloned()
            .collect()
    }
}

/// Result of a solver call; only `Solved` carries data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum SolveOutcome<T> {
    Solved(T),
    Unavailable(String),
    TimedOut,
    /// The solver ran but its output could not be used
    Failed(String),
}

impl<T> SolveOutcome<T> {
    pub fn solved(self) -> Option<T> {
        match self {
            SolveOutcome::Solved(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_solved(&self) -> Option<&T> {
        match self {
            SolveOutcome::Solved(v) => Some(v),
            _ => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> SolveOutcome<U> {
        match self {
            SolveOutcome::Solved(v) => SolveOutcome::Solved(f(v)),
            SolveOutcome::Unavailable(m) => SolveOutcome::Unavailable(m),
            SolveOutcome::TimedOut => SolveOutcome::TimedOut,
            SolveOutcome::Failed(m) => SolveOutcome::Failed(m),
        }
    }

    pub fn status_label(&self) -> &'static str {
        match self {
            SolveOutcome::Solved(_) => "solved",
            SolveOutcome::Unavailable(_) => "unavailable",
            SolveOutcome::TimedOut => "timed_out",
            SolveOutcome::Failed(_) => "failed",
        }
    }
}

/// One attack-relation edit
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum AfEdit {
    DelAttack { source: String, target: String },
    AddAttack { source: String, target: String },
}

/// Edit-cost optimization request: make `goal` accepted with the fewest edits
#[derive(Debug, Clone, PartialEq)]
pub struct EnforcementProblem {
    pub framework: Framework,
    pub goal: String,
    pub deletable: Vec<(String, String)>,
    pub addable: Vec<(String, String)>,
    pub semantics: Semantics,
    pub acceptance: Acceptance,
    pub max_edits: usize,
    pub max_models: usize,
}

impl EnforcementProblem {
    /// Every candidate edit, deletions first, in pool order
    pub fn candidate_edits(&self) -> Vec<AfEdit> {
        self.deletable
            .iter()
            .map(|(s, t)| AfEdit::DelAttack {
                source: s.clone(),
                target: t.clone(),
            })
            .chain(self.addable.iter().map(|(s, t)| AfEdit::AddAttack {
                source: s.clone(),
                target: t.clone(),
            }))
            .collect()
    }
}

/// A cost-minimal edit set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnforcementModel {
    pub edits: Vec<AfEdit>,
    pub cost: usize,
    pub optimal: bool,
}

/// Abstract-argumentation solver
#[async_trait]
pub trait AfSolver: Send + Sync {
    fn name(&self) -> &'static str;

    /// Extension family of `framework` under `semantics`
    async fn extensions(&self, framework: &Framework, semantics: Semantics)
        -> SolveOutcome<Extensions>;

    /// Cost-minimal edit sets making the goal accepted, best first
    async fn enforce(&self, problem: &EnforcementProblem) -> SolveOutcome<Vec<EnforcementModel>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SolverKind {
    Clingo,
    Native,
}

/// Configuration for the AF solver
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    pub kind: SolverKind,

    /// Path to clingo
    pub executable: PathBuf,

    /// Timeout in seconds
    pub timeout: u64,

    /// Largest framework the native solver enumerates
    pub max_arguments: usize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        SolverConfig {
            kind: SolverKind::Clingo,
            executable: PathBuf::from("clingo"),
            timeout: 10,
            max_arguments: 24,
        }
    }
}

pub fn create_solver(config: &SolverConfig) -> Box<dyn AfSolver> {
    match config.kind {
        SolverKind::Clingo => Box::new(ClingoSolver::new(config.clone())),
        SolverKind::Native => Box::new(NativeSolver::new(config.max_arguments)),
    }
}

/// Projection plus the solver's answer for one semantics
#[derive(Debug, Clone)]
pub struct AfAnalysis {
    pub projection: Projection,
    pub semantics: Semantics,
    pub outcome: SolveOutcome<Extensions>,
}

impl AfAnalysis {
    /// Acceptance of `node_id`; `None` when the solver gave no answer
    pub fn accepts(&self, node_id: &str, acceptance: Acceptance) -> Option<bool> {
        if self.projection.excluded.iter().any(|e| e == node_id) {
            return Some(true);
        }
        if !self.projection.framework.contains(node_id) {
            return Some(false);
        }
        self.outcome
            .as_solved()
            .map(|ext| ext.accepts(node_id, acceptance))
    }
}

/// Project `graph` and solve it under `semantics`
pub async fn analyze(solver: &dyn AfSolver, graph: &ArgumentGraph, semantics: Semantics) -> AfAnalysis {
    let projection = project(graph);
    let outcome = solver.extensions(&projection.framework, semantics).await;
    debug!(
        solver = solver.name(),
        %semantics,
        arguments = projection.framework.arguments.len(),
        status = outcome.status_label(),
        "Computed AF extensions"
    );
    AfAnalysis {
        projection,
        semantics,
        outcome,
    }
}

/// Acceptance of `node_id` in `graph`; `None` when the solver gave no answer
pub async fn node_acceptance(
    solver: &dyn AfSolver,
    graph: &ArgumentGraph,
    node_id: &str,
    semantics: Semantics,
    acceptance: Acceptance,
) -> Option<bool> {
    analyze(solver, graph, semantics)
        .await
        .accepts(node_id, acceptance)
}
