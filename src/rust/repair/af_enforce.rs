// SPDX-FileCopyrightText: 2026 ARGIR Project Team
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Goal enforcement by minimal attack-relation edits

use serde_json::json;
use tracing::{debug, warn};

use super::{apply_patch, Patch, Repair, RepairContext, RepairKind, Verification};
use crate::core::{Argir, AttackKind, Edge, EdgeKind};
use crate::diagnostics::{Issue, IssueType};
use crate::semantics::{analyze, project, AfEdit, EnforcementProblem, Framework, SolveOutcome};

/// A rebut between conclusions sharing a predicate with opposite polarity
///
/// Such an attack encodes a logical contradiction and is never deleted.
pub fn is_hard_attack(argir: &Argir, edge: &Edge) -> bool {
    if edge.kind != EdgeKind::Attack || edge.attack_kind != Some(AttackKind::Rebut) {
        return false;
    }
    let (Some(source), Some(target)) = (argir.graph.node(&edge.source), argir.graph.node(&edge.target))
    else {
        return false;
    };
    source.conclusion_atoms().iter().any(|s| {
        target
            .conclusion_atoms()
            .iter()
            .any(|t| s.pred == t.pred && s.negated != t.negated)
    })
}

/// Deletable and addable attacks for making `goal` accepted, within `budget` total
pub fn candidate_pool(
    argir: &Argir,
    framework: &Framework,
    goal: &str,
    budget: usize,
) -> (Vec<(String, String)>, Vec<(String, String)>) {
    let mut deletable: Vec<(String, String)> = Vec::new();
    for edge in argir.graph.attack_edges() {
        let pair = (edge.source.clone(), edge.target.clone());
        if framework.attacks(&pair.0, &pair.1) && !is_hard_attack(argir, edge) && !deletable.contains(&pair)
        {
            deletable.push(pair);
        }
    }
    deletable.truncate(budget);

    let mut addable: Vec<(String, String)> = Vec::new();
    let mut push = |source: &str, target: &str| {
        let pair = (source.to_string(), target.to_string());
        if !framework.attacks(source, target) && !addable.contains(&pair) {
            addable.push(pair);
        }
    };
    let attackers: Vec<&str> = framework.attackers_of(goal).collect();
    for &attacker in &attackers {
        push(goal, attacker);
        for other in &framework.arguments {
            if other != attacker && other != goal {
                push(other.as_str(), attacker);
            }
        }
    }
    addable.truncate(budget.saturating_sub(deletable.len()));
    (deletable, addable)
}

fn edits_to_patch(argir: &Argir, edits: &[AfEdit]) -> Patch {
    let mut patch = Patch {
        af_edits: edits.to_vec(),
        ..Default::default()
    };
    for edit in edits {
        match edit {
            AfEdit::DelAttack { source, target } => {
                let original = argir
                    .graph
                    .attack_edges()
                    .find(|e| &e.source == source && &e.target == target)
                    .cloned()
                    .unwrap_or_else(|| Edge::attack(source.clone(), target.clone(), AttackKind::Unknown));
                patch.del_edges.push(original);
            }
            AfEdit::AddAttack { source, target } => {
                patch.add_edges.push(
                    Edge::attack(source.clone(), target.clone(), AttackKind::Unknown)
                        .with_rationale("Counter-attack proposed by AF enforcement"),
                );
            }
        }
    }
    patch
}

/// AF repairs for a `goal_unreachable` or `contradiction_unresolved` issue
///
/// The goal is the issue's target for unreachable goals and the declared
/// document goal for contradictions.
pub async fn enforce_goal(ctx: &RepairContext<'_>, argir: &Argir, issue: &Issue) -> Vec<Repair> {
    let goal = match issue.kind {
        IssueType::GoalUnreachable => issue.primary_target().map(str::to_string),
        _ => ctx.goal_id.clone().or_else(|| argir.goal_id().map(str::to_string)),
    };
    let Some(goal) = goal else {
        debug!(issue = %issue.id, "No goal to enforce");
        return Vec::new();
    };

    let before = analyze(ctx.solver, &argir.graph, ctx.semantics).await;
    match before.accepts(&goal, ctx.acceptance) {
        Some(false) => {}
        Some(true) => {
            debug!(issue = %issue.id, %goal, "Goal already accepted");
            return Vec::new();
        }
        None => {
            debug!(issue = %issue.id, status = before.outcome.status_label(), "AF solver gave no answer");
            return Vec::new();
        }
    }

    let framework = project(&argir.graph).framework;
    if !framework.contains(&goal) {
        return Vec::new();
    }
    let (deletable, addable) =
        candidate_pool(argir, &framework, &goal, ctx.config.max_af_candidates);
    let problem = EnforcementProblem {
        framework,
        goal: goal.clone(),
        deletable,
        addable,
        semantics: ctx.semantics,
        acceptance: ctx.acceptance,
        max_edits: ctx.config.max_af_edits,
        max_models: ctx.config.max_repairs,
    };

    let models = match ctx.solver.enforce(&problem).await {
        SolveOutcome::Solved(models) => models,
        other => {
            warn!(issue = %issue.id, status = other.status_label(), "AF enforcement unavailable");
            return Vec::new();
        }
    };

    let mut repairs = Vec::new();
    for model in models.into_iter().filter(|m| !m.edits.is_empty()) {
        let patch = edits_to_patch(argir, &model.edits);
        let patched = apply_patch(argir, &patch);
        let after = analyze(ctx.solver, &patched.graph, ctx.semantics).await;
        let accepted = after.accepts(&goal, ctx.acceptance);
        repairs.push(Repair {
            id: format!("AF-{}-{}", issue.id, repairs.len() + 1),
            issue_id: issue.id.clone(),
            kind: RepairKind::Af,
            cost: model.cost,
            verification: Verification {
                af_semantics: ctx.semantics,
                af_goal_accepted: accepted,
                af_optimal: model.optimal,
                fol_entailed: None,
                artifacts: json!({
                    "goal": goal,
                    "solver": ctx.solver.name(),
                    "acceptance": ctx.acceptance,
                    "edits_count": model.edits.len(),
                    "patch_applied": true,
                }),
            },
            patch,
        });
        if repairs.len() >= ctx.config.max_repairs {
            break;
        }
    }
    debug!(issue = %issue.id, %goal, repairs = repairs.len(), "AF enforcement finished");
    repairs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RepairConfig;
    use crate::core::{ArgumentGraph, Atom, Node, Statement, Term};
    use crate::fol::FolMode;
    use crate::provers::{ProverConfig, ProverFactory, ProverKind};
    use crate::semantics::{Acceptance, NativeSolver, Semantics};

    fn claim(id: &str, pred: &str, negated: bool) -> Node {
        let mut atom = Atom::new(pred, vec![Term::constant("x")]);
        atom.negated = negated;
        Node::new(id).with_conclusion(Statement::new(pred, vec![atom]))
    }

    fn issue(target: &str) -> Issue {
        Issue {
            id: "I-001".into(),
            kind: IssueType::GoalUnreachable,
            target_node_ids: vec![target.into()],
            evidence: json!({}),
            detector_name: "goal_reachability".into(),
            notes: None,
        }
    }

    #[test]
    fn test_hard_attack_only_for_opposite_rebut() {
        let argir = Argir::new(
            "",
            ArgumentGraph {
                nodes: vec![claim("a", "p", false), claim("b", "p", true), claim("c", "q", false)],
                edges: vec![],
            },
        );
        assert!(is_hard_attack(&argir, &Edge::attack("a", "b", AttackKind::Rebut)));
        assert!(!is_hard_attack(&argir, &Edge::attack("a", "b", AttackKind::Undercut)));
        assert!(!is_hard_attack(&argir, &Edge::attack("c", "b", AttackKind::Rebut)));
    }

    #[test]
    fn test_candidate_pool_respects_budget() {
        let argir = Argir::new(
            "",
            ArgumentGraph {
                nodes: vec![claim("a", "p", false), claim("b", "q", false), claim("c", "r", false)],
                edges: vec![Edge::attack("a", "b", AttackKind::Undercut)],
            },
        );
        let fw = Framework::from_graph(&argir.graph);
        let (del, add) = candidate_pool(&argir, &fw, "b", 24);
        assert_eq!(del, vec![("a".to_string(), "b".to_string())]);
        assert_eq!(
            add,
            vec![("b".to_string(), "a".to_string()), ("c".to_string(), "a".to_string())]
        );
        let (del, add) = candidate_pool(&argir, &fw, "b", 2);
        assert_eq!(del.len() + add.len(), 2);
    }

    #[tokio::test]
    async fn test_enforce_with_native_solver() {
        let argir = Argir::new(
            "",
            ArgumentGraph {
                nodes: vec![claim("a", "p", false), claim("b", "q", false), claim("c", "r", false)],
                edges: vec![Edge::attack("a", "b", AttackKind::Undercut)],
            },
        );
        let solver = NativeSolver::default();
        let prover = ProverFactory::create(ProverKind::EProver, ProverConfig::for_kind(ProverKind::EProver))
            .unwrap();
        let config = RepairConfig::default();
        let ctx = RepairContext {
            solver: &solver,
            prover: prover.as_ref(),
            config: &config,
            semantics: Semantics::Grounded,
            acceptance: Acceptance::Credulous,
            fol_mode: FolMode::Classical,
            goal_id: None,
        };

        let repairs = enforce_goal(&ctx, &argir, &issue("b")).await;
        assert_eq!(repairs.len(), 2);
        assert_eq!(repairs[0].id, "AF-I-001-1");
        for repair in &repairs {
            assert_eq!(repair.cost, 1);
            assert_eq!(repair.verification.af_goal_accepted, Some(true));
            assert!(repair.verification.af_optimal);
        }
        assert_eq!(repairs[0].patch.del_edges.len(), 1);
        assert_eq!(argir.graph.attack_edges().count(), 1);
    }
}
