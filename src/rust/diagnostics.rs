// SPDX-FileCopyrightText: 2026 ARGIR Project Team
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Issue detectors over a validated graph and its AF analysis
//!
//! Detectors run in a fixed order and issue ids (`I-001`, ...) are assigned
//! across all of them at the end. A detector that cannot finish records a
//! [`DetectorFailure`] instead of silently reporting nothing.

use async_trait::async_trait;
use petgraph::algo::tarjan_scc;
use petgraph::graphmap::DiGraphMap;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::{BTreeSet, HashMap, HashSet};
use tracing::{debug, info, warn};

use crate::core::{Argir, Node};
use crate::fol::{support_problem, FolMode};
use crate::provers::{ProverBackend, ProverStatus};
use crate::semantics::{Acceptance, AfAnalysis, Semantics};

/// Upper bound on enumerated support cycles
pub const MAX_CYCLES: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueType {
    UnsupportedInference,
    CircularSupport,
    ContradictionUnresolved,
    WeakSchemeInstantiation,
    GoalUnreachable,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: IssueType,
    pub target_node_ids: Vec<String>,
    pub evidence: serde_json::Value,
    pub detector_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Issue {
    fn new(
        kind: IssueType,
        targets: Vec<String>,
        detector: &str,
        evidence: serde_json::Value,
        notes: String,
    ) -> Self {
        Issue {
            id: String::new(),
            kind,
            target_node_ids: targets,
            evidence,
            detector_name: detector.to_string(),
            notes: Some(notes),
        }
    }

    pub fn primary_target(&self) -> Option<&str> {
        self.target_node_ids.first().map(String::as_str)
    }
}

/// A detector that could not complete
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectorFailure {
    pub detector: String,
    pub message: String,
}

/// What the goal check concluded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum GoalStatus {
    NoGoal,
    Accepted,
    NotAccepted,
    /// Already reported as an unsupported inference
    Unsupported,
    /// The AF solver gave no answer
    Undetermined(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnosis {
    pub issues: Vec<Issue>,
    pub failures: Vec<DetectorFailure>,
    pub goal: GoalStatus,
}

impl Diagnosis {
    pub fn of_kind(&self, kind: IssueType) -> impl Iterator<Item = &Issue> {
        self.issues.iter().filter(move |i| i.kind == kind)
    }
}

/// Result of a support check on one node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SupportVerdict {
    Supported,
    Unsupported,
    /// The check could not decide; never flagged
    Unknown,
}

/// Decides whether a node's conclusion is backed by its support
#[async_trait]
pub trait SupportCheck: Send + Sync {
    fn name(&self) -> &'static str;

    async fn check(&self, argir: &Argir, node: &Node) -> SupportVerdict;
}

/// Premises or an incoming support edge exist
#[derive(Debug, Clone, Copy, Default)]
pub struct ExistenceCheck;

#[async_trait]
impl SupportCheck for ExistenceCheck {
    fn name(&self) -> &'static str {
        "existence"
    }

    async fn check(&self, argir: &Argir, node: &Node) -> SupportVerdict {
        let supported = !node.premises.is_empty()
            || argir.graph.support_edges().any(|e| e.target == node.id);
        if supported {
            SupportVerdict::Supported
        } else {
            SupportVerdict::Unsupported
        }
    }
}

/// The node's premises and supporters entail its conclusion, per a prover
pub struct EntailmentCheck<'a> {
    prover: &'a dyn ProverBackend,
    mode: FolMode,
}

impl<'a> EntailmentCheck<'a> {
    pub fn new(prover: &'a dyn ProverBackend, mode: FolMode) -> Self {
        EntailmentCheck { prover, mode }
    }
}

#[async_trait]
impl SupportCheck for EntailmentCheck<'_> {
    fn name(&self) -> &'static str {
        "entailment"
    }

    async fn check(&self, argir: &Argir, node: &Node) -> SupportVerdict {
        let Some(problem) = support_problem(argir, &node.id, self.mode) else {
            return SupportVerdict::Supported;
        };
        if problem.axioms.is_empty() {
            return SupportVerdict::Unsupported;
        }
        let outcome = self.prover.prove(&problem).await;
        match outcome.status {
            ProverStatus::Theorem | ProverStatus::Unsatisfiable => SupportVerdict::Supported,
            ProverStatus::CounterSatisfiable | ProverStatus::Satisfiable => {
                SupportVerdict::Unsupported
            }
            ProverStatus::Unknown | ProverStatus::Timeout | ProverStatus::Unavailable => {
                SupportVerdict::Unknown
            }
        }
    }
}

/// Settings for one diagnosis run
#[derive(Debug, Clone)]
pub struct DiagnoseOptions {
    pub goal_id: Option<String>,
    pub acceptance: Acceptance,
}

async fn detect_unsupported(
    argir: &Argir,
    af: &AfAnalysis,
    acceptance: Acceptance,
    support: &dyn SupportCheck,
) -> Vec<Issue> {
    let mut issues = Vec::new();
    for node in &argir.graph.nodes {
        let Some(conclusion) = &node.conclusion else {
            continue;
        };
        let has_stmt_premises = node.statement_premises().next().is_some();
        let has_incoming = argir.graph.support_edges().any(|e| e.target == node.id);
        let no_support = !has_stmt_premises && !has_incoming;
        let verdict = support.check(argir, node).await;
        let check_failed = verdict == SupportVerdict::Unsupported;
        if !no_support && !check_failed {
            continue;
        }
        let reason = if node.premises.is_empty() && !has_incoming {
            "no premises provided"
        } else if no_support {
            "no inline premises and no incoming support"
        } else {
            "premises do not entail conclusion"
        };
        issues.push(Issue::new(
            IssueType::UnsupportedInference,
            vec![node.id.clone()],
            "inference_support",
            json!({
                "premises": node.premises,
                "conclusion": conclusion,
                "af_rejected": af.accepts(&node.id, acceptance).map(|a| !a),
                "fol_check_failed": check_failed,
                "support_check": support.name(),
                "no_premises": node.premises.is_empty(),
            }),
            format!("Inference {} lacks support: {}", node.id, reason),
        ));
    }
    issues
}

/// Simple cycles of the support graph (support edges plus `Ref` premises)
///
/// Each cycle starts at its earliest node in document order, so it is
/// reported once. Returns an error when enumeration hits [`MAX_CYCLES`].
pub fn support_cycles(argir: &Argir) -> Result<Vec<Vec<String>>, String> {
    let order: HashMap<&str, usize> = argir
        .graph
        .nodes
        .iter()
        .enumerate()
        .map(|(i, n)| (n.id.as_str(), i))
        .collect();
    let links = argir.graph.support_links();
    let rank = |id: &str| order.get(id).copied().unwrap_or(usize::MAX);

    let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();
    for (s, t) in &links {
        graph.add_edge(s.as_str(), t.as_str(), ());
    }

    let mut cycles: Vec<Vec<String>> = Vec::new();
    let mut components = tarjan_scc(&graph);
    components.retain(|c| c.len() > 1);
    for component in &mut components {
        component.sort_by_key(|id| (rank(*id), id.to_string()));
    }
    components.sort_by_key(|c| c.first().map(|id| rank(*id)));

    for component in &components {
        let members: HashSet<&str> = component.iter().copied().collect();
        for (i, start) in component.iter().enumerate() {
            let allowed: HashSet<&str> = component[i..].iter().copied().collect();
            let mut path = vec![*start];
            let mut on_path: HashSet<&str> = HashSet::from([*start]);
            walk(&graph, *start, &allowed, &members, &mut path, &mut on_path, &mut cycles)?;
        }
    }
    Ok(cycles)
}

fn walk<'a>(
    graph: &DiGraphMap<&'a str, ()>,
    start: &'a str,
    allowed: &HashSet<&'a str>,
    members: &HashSet<&'a str>,
    path: &mut Vec<&'a str>,
    on_path: &mut HashSet<&'a str>,
    cycles: &mut Vec<Vec<String>>,
) -> Result<(), String> {
    let Some(&current) = path.last() else {
        return Ok(());
    };
    for next in graph.neighbors(current) {
        if !members.contains(next) || !allowed.contains(next) {
            continue;
        }
        if next == start {
            if cycles.len() >= MAX_CYCLES {
                return Err(format!("more than {} support cycles", MAX_CYCLES));
            }
            cycles.push(path.iter().map(|s| s.to_string()).collect());
        } else if on_path.insert(next) {
            path.push(next);
            walk(graph, start, allowed, members, path, on_path, cycles)?;
            path.pop();
            on_path.remove(next);
        }
    }
    Ok(())
}

fn detect_cycles(argir: &Argir, failures: &mut Vec<DetectorFailure>) -> Vec<Issue> {
    let cycles = match support_cycles(argir) {
        Ok(cycles) => cycles,
        Err(message) => {
            warn!(%message, "Cycle detection failed");
            failures.push(DetectorFailure {
                detector: "cycle_detection".to_string(),
                message,
            });
            return vec![];
        }
    };
    cycles
        .into_iter()
        .map(|cycle| {
            let mut closed = cycle.clone();
            if let Some(first) = cycle.first() {
                closed.push(first.clone());
            }
            let path = closed.join(" -> ");
            Issue::new(
                IssueType::CircularSupport,
                cycle.clone(),
                "cycle_detection",
                json!({"cycle_path": path, "nodes_in_cycle": cycle}),
                format!("Circular dependency detected: {}", path),
            )
        })
        .collect()
}

fn detect_contradictions(argir: &Argir) -> Vec<Issue> {
    let mut issues = Vec::new();
    let mut reported: HashSet<(String, String)> = HashSet::new();
    let nodes = &argir.graph.nodes;

    for (i, a) in nodes.iter().enumerate() {
        for b in &nodes[i + 1..] {
            if a.id == b.id {
                continue;
            }
            let clash = a.conclusion_atoms().iter().find_map(|x| {
                b.conclusion_atoms()
                    .iter()
                    .find(|y| x.pred == y.pred && x.arity() == y.arity() && x.negated != y.negated)
                    .map(|y| (x, y))
            });
            let Some((x, y)) = clash else {
                continue;
            };
            if !reported.insert((a.id.clone(), b.id.clone())) {
                continue;
            }
            issues.push(Issue::new(
                IssueType::ContradictionUnresolved,
                vec![a.id.clone(), b.id.clone()],
                "contradiction_detection",
                json!({
                    "conflicting_atoms": [
                        {"node": a.id, "atom": x},
                        {"node": b.id, "atom": y},
                    ],
                    "contradiction": true,
                }),
                format!("Nodes {} and {} have contradictory conclusions", a.id, b.id),
            ));
        }
    }

    let mut pairs: BTreeSet<(String, String)> = BTreeSet::new();
    for edge in argir.graph.attack_edges() {
        let mutual = argir
            .graph
            .attack_edges()
            .any(|e| e.source == edge.target && e.target == edge.source);
        if mutual && edge.source != edge.target {
            let pair = if edge.source < edge.target {
                (edge.source.clone(), edge.target.clone())
            } else {
                (edge.target.clone(), edge.source.clone())
            };
            if pairs.insert(pair.clone()) {
                issues.push(Issue::new(
                    IssueType::ContradictionUnresolved,
                    vec![pair.0.clone(), pair.1.clone()],
                    "mutual_attack_detection",
                    json!({
                        "mutual_attacks": true,
                        "attack_edges": [[pair.0, pair.1], [pair.1, pair.0]],
                    }),
                    format!("Nodes {} and {} attack each other", pair.0, pair.1),
                ));
            }
        }
    }
    issues
}

/// One critical question and the words that count as addressing it
struct CriticalQuestion {
    question: &'static str,
    keywords: &'static [&'static str],
}

const fn cq(question: &'static str, keywords: &'static [&'static str]) -> CriticalQuestion {
    CriticalQuestion { question, keywords }
}

const SCHEMES: &[(&str, &[CriticalQuestion])] = &[
    (
        "causal",
        &[
            cq("Is there evidence for the causal link?", &["evidence", "study", "studies", "data", "experiment", "mechanism"]),
            cq("Are there confounding factors?", &["confound", "other factor", "alternative cause", "controlled"]),
        ],
    ),
    (
        "authority",
        &[
            cq("Is the authority credible?", &["expert", "credible", "qualified", "reputable", "peer-reviewed"]),
            cq("Is this within the authority's domain?", &["domain", "field", "specialist", "expertise"]),
        ],
    ),
    (
        "analogy",
        &[
            cq("Are the cases sufficiently similar?", &["similar", "alike", "comparable", "analogous"]),
            cq("Are there relevant differences?", &["difference", "differ", "unlike", "distinct"]),
        ],
    ),
    (
        "example",
        &[
            cq("Is the example representative?", &["representative", "typical", "sample", "common"]),
            cq("Are there counter-examples?", &["counterexample", "counter-example", "exception"]),
        ],
    ),
];

/// Critical questions for a scheme name, matched case-insensitively
pub fn critical_questions(scheme: &str) -> Option<Vec<&'static str>> {
    let scheme = scheme.trim().to_lowercase();
    SCHEMES
        .iter()
        .find(|(name, _)| *name == scheme)
        .map(|(_, cqs)| cqs.iter().map(|c| c.question).collect())
}

fn detect_weak_schemes(argir: &Argir) -> Vec<Issue> {
    let mut issues = Vec::new();
    for node in &argir.graph.nodes {
        let Some(rule) = &node.rule else {
            continue;
        };
        let Some(scheme) = rule.scheme.as_deref() else {
            continue;
        };
        let normalized = scheme.trim().to_lowercase();
        let Some((_, cqs)) = SCHEMES.iter().find(|(name, _)| *name == normalized) else {
            continue;
        };

        let mut text: Vec<String> = node.statement_premises().map(|s| s.text.to_lowercase()).collect();
        text.extend(rule.antecedents.iter().map(|s| s.text.to_lowercase()));
        text.extend(rule.rationale.iter().map(|r| r.to_lowercase()));
        let text = text.join(" ");

        let missing: Vec<&str> = cqs
            .iter()
            .filter(|c| !c.keywords.iter().any(|k| text.contains(k)))
            .map(|c| c.question)
            .collect();
        if missing.is_empty() {
            continue;
        }
        issues.push(Issue::new(
            IssueType::WeakSchemeInstantiation,
            vec![node.id.clone()],
            "scheme_analysis",
            json!({
                "scheme": normalized,
                "missing_critical_questions": missing,
                "rule": rule,
            }),
            format!("Scheme '{}' missing critical backing", normalized),
        ));
    }
    issues
}

/// Run every detector; issue ids are numbered in detector order
pub async fn diagnose(
    argir: &Argir,
    af: &AfAnalysis,
    support: &dyn SupportCheck,
    options: &DiagnoseOptions,
) -> Diagnosis {
    let mut failures = Vec::new();
    let mut issues = detect_unsupported(argir, af, options.acceptance, support).await;
    issues.extend(detect_cycles(argir, &mut failures));
    issues.extend(detect_contradictions(argir));
    issues.extend(detect_weak_schemes(argir));

    let goal_id = options.goal_id.as_deref().or(argir.goal_id());
    let goal = match goal_id {
        None => GoalStatus::NoGoal,
        Some(goal) if !argir.graph.contains(goal) => {
            failures.push(DetectorFailure {
                detector: "goal_reachability".to_string(),
                message: format!("goal node '{}' does not exist", goal),
            });
            GoalStatus::Undetermined(format!("goal node '{}' does not exist", goal))
        }
        Some(goal)
            if issues
                .iter()
                .any(|i| i.kind == IssueType::UnsupportedInference && i.primary_target() == Some(goal)) =>
        {
            GoalStatus::Unsupported
        }
        Some(goal) => match af.accepts(goal, options.acceptance) {
            Some(true) => GoalStatus::Accepted,
            Some(false) => {
                issues.push(goal_issue(goal, af.semantics, options.acceptance));
                GoalStatus::NotAccepted
            }
            None => {
                debug!(goal, status = af.outcome.status_label(), "Goal acceptance undetermined");
                GoalStatus::Undetermined(format!("AF solver {}", af.outcome.status_label()))
            }
        },
    };

    for (i, issue) in issues.iter_mut().enumerate() {
        issue.id = format!("I-{:03}", i + 1);
    }
    info!(issues = issues.len(), failures = failures.len(), "Diagnosis complete");
    Diagnosis {
        issues,
        failures,
        goal,
    }
}

fn goal_issue(goal: &str, semantics: Semantics, acceptance: Acceptance) -> Issue {
    Issue::new(
        IssueType::GoalUnreachable,
        vec![goal.to_string()],
        "goal_reachability",
        json!({
            "semantics": semantics,
            "acceptance": acceptance,
            "goal_not_in_extension": true,
        }),
        format!("Goal {} is not accepted under {} semantics", goal, semantics),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ArgumentGraph, Atom, AttackKind, Edge, Premise, Rule, Statement, Term};
    use crate::semantics::{analyze, NativeSolver};

    fn concl(pred: &str, negated: bool) -> Statement {
        let mut atom = Atom::new(pred, vec![Term::constant("x")]);
        atom.negated = negated;
        Statement::new(pred, vec![atom])
    }

    fn fact(id: &str, pred: &str) -> Node {
        Node::new(id).with_conclusion(concl(pred, false))
    }

    async fn run(argir: &Argir, goal: Option<&str>) -> Diagnosis {
        let af = analyze(&NativeSolver::default(), &argir.graph, Semantics::Grounded).await;
        diagnose(
            argir,
            &af,
            &ExistenceCheck,
            &DiagnoseOptions {
                goal_id: goal.map(str::to_string),
                acceptance: Acceptance::Credulous,
            },
        )
        .await
    }

    #[tokio::test]
    async fn test_cycle_reported_once() {
        let graph = ArgumentGraph {
            nodes: vec![fact("a", "p"), fact("b", "q"), fact("c", "r")],
            edges: vec![Edge::support("a", "b"), Edge::support("b", "c"), Edge::support("c", "a")],
        };
        let d = run(&Argir::new("", graph), None).await;
        let cycles: Vec<&Issue> = d.of_kind(IssueType::CircularSupport).collect();
        assert_eq!(cycles.len(), 1);
        assert_eq!(cycles[0].target_node_ids, vec!["a", "b", "c"]);
        assert!(d.failures.is_empty());
    }

    #[tokio::test]
    async fn test_unsupported_and_ids() {
        let graph = ArgumentGraph {
            nodes: vec![
                fact("a", "p"),
                Node::new("b")
                    .with_premise(Premise::Stmt(concl("p", false)))
                    .with_conclusion(concl("q", false)),
            ],
            edges: vec![],
        };
        let d = run(&Argir::new("", graph), None).await;
        assert_eq!(d.issues.len(), 1);
        assert_eq!(d.issues[0].id, "I-001");
        assert_eq!(d.issues[0].target_node_ids, vec!["a"]);
        assert_eq!(d.goal, GoalStatus::NoGoal);
    }

    #[tokio::test]
    async fn test_contradictions_and_mutual_attack() {
        let graph = ArgumentGraph {
            nodes: vec![
                Node::new("a").with_conclusion(concl("p", false)),
                Node::new("b").with_conclusion(concl("p", true)),
            ],
            edges: vec![
                Edge::support("b", "a"),
                Edge::support("a", "b"),
                Edge::attack("a", "b", AttackKind::Rebut),
                Edge::attack("b", "a", AttackKind::Rebut),
            ],
        };
        let d = run(&Argir::new("", graph), Some("a")).await;
        let kinds: Vec<&str> = d
            .of_kind(IssueType::ContradictionUnresolved)
            .map(|i| i.detector_name.as_str())
            .collect();
        assert_eq!(kinds, vec!["contradiction_detection", "mutual_attack_detection"]);
        assert_eq!(d.goal, GoalStatus::NotAccepted);
        let last = d.issues.last().unwrap();
        assert_eq!(last.kind, IssueType::GoalUnreachable);
        assert_eq!(last.id, format!("I-{:03}", d.issues.len()));
    }

    #[tokio::test]
    async fn test_weak_scheme_per_question() {
        let rule = Rule {
            name: "r".into(),
            strict: false,
            antecedents: vec![Statement::new("A peer-reviewed study by an expert", vec![])],
            consequents: vec![concl("q", false)],
            exceptions: vec![],
            scheme: Some("Authority".into()),
            span: None,
            rationale: None,
        };
        let graph = ArgumentGraph {
            nodes: vec![Node::new("R1").with_rule(rule)],
            edges: vec![],
        };
        let d = run(&Argir::new("", graph), None).await;
        let weak: Vec<&Issue> = d.of_kind(IssueType::WeakSchemeInstantiation).collect();
        assert_eq!(weak.len(), 1);
        assert_eq!(
            weak[0].evidence["missing_critical_questions"],
            json!(["Is this within the authority's domain?"])
        );
    }

    #[tokio::test]
    async fn test_missing_goal_is_a_failure() {
        let graph = ArgumentGraph {
            nodes: vec![fact("a", "p")],
            edges: vec![],
        };
        let d = run(&Argir::new("", graph), Some("zz")).await;
        assert!(matches!(d.goal, GoalStatus::Undetermined(_)));
        assert_eq!(d.failures[0].detector, "goal_reachability");
    }

    #[test]
    fn test_critical_questions_lookup() {
        assert_eq!(critical_questions("CAUSAL").map(|q| q.len()), Some(2));
        assert!(critical_questions("deduction").is_none());
    }
}
