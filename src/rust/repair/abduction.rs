// SPDX-FileCopyrightText: 2026 ARGIR Project Team
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Premise abduction: smallest consistent hypothesis sets that prove a node
//!
//! Candidates are tried in a fixed priority order (anchored singles,
//! unanchored singles, then pairs), each checked with two prover calls:
//! one for entailment, one for `$false` to reject inconsistent hypotheses.

use serde_json::json;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info};

use super::{apply_patch, Patch, Repair, RepairContext, RepairKind, Verification};
use crate::core::{Argir, Atom, Edge, Node, Statement, Term};
use crate::diagnostics::Issue;
use crate::fol::{tptp, translate, Problem, TranslateOptions};
use crate::provers::{ProverBackend, ProverStatus};
use crate::semantics::{analyze, Acceptance, AfAnalysis};
use crate::validate::predicate_arities;

/// Predicate arities and constant universe of a graph, both sorted
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Signature {
    pub predicates: BTreeMap<String, usize>,
    pub constants: Vec<String>,
}

/// Collect the signature from atom usage, plus unused lexicon keys at arity 0
pub fn collect_signature(argir: &Argir) -> Signature {
    let mut predicates: BTreeMap<String, usize> = predicate_arities(&argir.graph)
        .into_iter()
        .map(|(pred, arities)| {
            let max = arities.iter().max().copied().unwrap_or(0);
            (pred, max)
        })
        .collect();
    if let Some(lexicon) = argir.lexicon() {
        for key in lexicon.keys() {
            predicates.entry(key.clone()).or_insert(0);
        }
    }

    let mut constants: BTreeSet<String> = BTreeSet::new();
    for node in &argir.graph.nodes {
        for atom in node.all_atoms() {
            for term in &atom.args {
                if let Term::Const { name } = term {
                    constants.insert(name.clone());
                }
            }
        }
    }
    Signature {
        predicates,
        constants: constants.into_iter().collect(),
    }
}

fn constants_of(node: &Node) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for atom in node.conclusion_atoms() {
        for term in &atom.args {
            if let Term::Const { name } = term {
                if !out.contains(name) {
                    out.push(name.clone());
                }
            }
        }
    }
    out
}

fn ground(pred: &str, args: &[&String]) -> Atom {
    Atom::new(pred, args.iter().map(|c| Term::constant(c.as_str())).collect())
}

/// Hypothesis sets in priority order
///
/// Singles follow predicate order; within a predicate, tuples starting with
/// an anchor constant come first. Atoms equal to one in `exclude` are never
/// proposed. Singles are capped at `max_singles`; pairs draw on the first
/// `pair_pool` singles when `max_atoms >= 2`.
pub fn enumerate_hypotheses(
    signature: &Signature,
    anchors: &[String],
    exclude: &[Atom],
    max_atoms: usize,
    max_singles: usize,
    pair_pool: usize,
) -> Vec<Vec<Atom>> {
    let anchors: Vec<&String> = anchors
        .iter()
        .filter(|a| signature.constants.contains(*a))
        .collect();
    let consts: Vec<&String> = signature.constants.iter().collect();
    let unanchored: Vec<&String> = consts
        .iter()
        .copied()
        .filter(|c| !anchors.contains(c))
        .collect();

    let mut singles: Vec<Atom> = Vec::new();
    let mut push = |atom: Atom| {
        if !exclude.contains(&atom) && !singles.contains(&atom) {
            singles.push(atom);
        }
    };
    for (pred, &arity) in &signature.predicates {
        match arity {
            0 => push(ground(pred, &[])),
            1 => {
                for &c in anchors.iter().chain(unanchored.iter()) {
                    push(ground(pred, &[c]));
                }
            }
            2 => {
                for &a in anchors.iter().chain(consts.iter()) {
                    for &b in &consts {
                        push(ground(pred, &[a, b]));
                    }
                }
            }
            _ => {}
        }
    }
    singles.truncate(max_singles);

    let mut hypotheses: Vec<Vec<Atom>> = singles.iter().map(|s| vec![s.clone()]).collect();
    if max_atoms >= 2 {
        let k = singles.len().min(pair_pool);
        for i in 0..k {
            for j in i + 1..k {
                hypotheses.push(vec![singles[i].clone(), singles[j].clone()]);
            }
        }
    }
    hypotheses
}

/// A hypothesis set that proves the conjecture
#[derive(Debug, Clone, PartialEq)]
pub struct Entailment {
    pub atoms: Vec<Atom>,
    pub elapsed_ms: u64,
    /// Verdict of the `$false` check; anything but a proof counts as consistent
    pub consistency: ProverStatus,
}

enum Attempt {
    Entailed { elapsed_ms: u64, consistency: ProverStatus },
    Rejected,
    Unavailable,
}

/// Prove the conjecture from `base` plus `atoms`, then rule out inconsistency
async fn attempt(prover: &dyn ProverBackend, base: &Problem, atoms: &[Atom]) -> Attempt {
    let problem = base.with_hypotheses(atoms);
    let proof = prover.prove(&problem).await;
    if proof.status == ProverStatus::Unavailable {
        return Attempt::Unavailable;
    }
    if !proof.status.is_proved() {
        return Attempt::Rejected;
    }
    let consistency = prover.prove(&problem.consistency_check()).await;
    if consistency.status.is_proved() {
        return Attempt::Rejected;
    }
    Attempt::Entailed {
        elapsed_ms: proof.elapsed_ms,
        consistency: consistency.status,
    }
}

/// First proper subset that still proves the conjecture consistently, else the input
///
/// Subsets are tried smallest first, in index order within a size.
pub async fn minimize_hypothesis(
    prover: &dyn ProverBackend,
    base: &Problem,
    found: Entailment,
) -> Entailment {
    for size in 1..found.atoms.len() {
        for subset in combinations(&found.atoms, size) {
            if let Attempt::Entailed {
                elapsed_ms,
                consistency,
            } = attempt(prover, base, &subset).await
            {
                return Entailment {
                    atoms: subset,
                    elapsed_ms,
                    consistency,
                };
            }
        }
    }
    found
}

fn combinations(items: &[Atom], size: usize) -> Vec<Vec<Atom>> {
    if size == 0 {
        return vec![vec![]];
    }
    let mut out = Vec::new();
    for (i, head) in items.iter().enumerate() {
        for mut tail in combinations(&items[i + 1..], size - 1) {
            tail.insert(0, head.clone());
            out.push(tail);
        }
    }
    out
}

fn hypothesis_node(argir: &Argir, taken: &[String], atoms: &[Atom]) -> Node {
    let stem: Vec<String> = atoms
        .iter()
        .take(2)
        .map(|a| a.pred.chars().take(8).collect())
        .collect();
    let base = if stem.is_empty() {
        "P_hyp".to_string()
    } else {
        format!("P_{}", stem.join("_"))
    };
    let mut id = base.clone();
    let mut n = 2;
    while argir.graph.contains(&id) || taken.contains(&id) {
        id = format!("{}_{}", base, n);
        n += 1;
    }

    let text: Vec<String> = atoms.iter().map(tptp::atom).collect();
    let mut statement = Statement::new(text.join(" and "), atoms.to_vec());
    statement.rationale = Some("Added by abduction to support inference".to_string());
    let mut node = Node::new(id).with_conclusion(statement);
    node.rationale = Some("Hypothesis premise found by abduction".to_string());
    node
}

fn impact(id: &str, acceptance: Acceptance, before: &AfAnalysis, after: &AfAnalysis) -> serde_json::Value {
    let b = before.accepts(id, acceptance);
    let a = after.accepts(id, acceptance);
    json!({"id": id, "before": b, "after": a, "changed": a != b})
}

/// FOL repairs for an `unsupported_inference` or `weak_scheme_instantiation` issue
pub async fn abduce_premises(ctx: &RepairContext<'_>, argir: &Argir, issue: &Issue) -> Vec<Repair> {
    let Some(target_id) = issue.primary_target() else {
        return Vec::new();
    };
    let Some(target) = argir.graph.node(target_id).filter(|n| n.has_conclusion()) else {
        debug!(issue = %issue.id, target = target_id, "Target has no conclusion to abduce for");
        return Vec::new();
    };

    let translation = translate(
        argir,
        &TranslateOptions {
            mode: ctx.fol_mode,
            goal_id: Some(target_id.to_string()),
            omit_fact_of: Some(target_id.to_string()),
        },
    );
    let base = translation.problem;
    if base.conjecture.is_none() {
        return Vec::new();
    }

    match attempt(ctx.prover, &base, &[]).await {
        Attempt::Unavailable => {
            debug!(issue = %issue.id, "Prover unavailable, skipping abduction");
            return Vec::new();
        }
        Attempt::Entailed { .. } => {
            debug!(issue = %issue.id, "Conclusion already entailed without hypotheses");
            return Vec::new();
        }
        Attempt::Rejected => {}
    }

    let signature = collect_signature(argir);
    let candidates = enumerate_hypotheses(
        &signature,
        &constants_of(target),
        target.conclusion_atoms(),
        ctx.config.max_hypothesis_atoms,
        ctx.config.max_single_candidates,
        ctx.config.pair_pool,
    );
    debug!(issue = %issue.id, candidates = candidates.len(), "Abduction search started");

    let goal_id = ctx
        .goal_id
        .clone()
        .or_else(|| argir.goal_id().map(str::to_string))
        .filter(|g| g != target_id);
    let before = analyze(ctx.solver, &argir.graph, ctx.semantics).await;

    let mut repairs: Vec<Repair> = Vec::new();
    let mut seen: BTreeSet<Vec<String>> = BTreeSet::new();
    let mut taken: Vec<String> = Vec::new();
    for atoms in candidates {
        if repairs.len() >= ctx.config.max_repairs {
            break;
        }
        let found = match attempt(ctx.prover, &base, &atoms).await {
            Attempt::Entailed {
                elapsed_ms,
                consistency,
            } => Entailment {
                atoms,
                elapsed_ms,
                consistency,
            },
            Attempt::Rejected => continue,
            Attempt::Unavailable => break,
        };
        let Entailment {
            atoms,
            elapsed_ms,
            consistency,
        } = minimize_hypothesis(ctx.prover, &base, found).await;
        let hypotheses: Vec<String> = atoms.iter().map(tptp::atom).collect();
        if !seen.insert(hypotheses.clone()) {
            continue;
        }

        let node = hypothesis_node(argir, &taken, &atoms);
        taken.push(node.id.clone());
        let patch = Patch {
            add_edges: vec![Edge::support(node.id.clone(), target_id)],
            add_nodes: vec![node],
            fol_hypotheses: hypotheses.clone(),
            ..Default::default()
        };
        let patched = apply_patch(argir, &patch);
        let after = analyze(ctx.solver, &patched.graph, ctx.semantics).await;
        let target_after = after.accepts(target_id, ctx.acceptance);
        let goal_impact = goal_id
            .as_deref()
            .map(|g| impact(g, ctx.acceptance, &before, &after));
        let accepted = match goal_id.as_deref() {
            Some(g) => after.accepts(g, ctx.acceptance),
            None => target_after,
        };

        repairs.push(Repair {
            id: format!("FOL-{}-{}", issue.id, repairs.len() + 1),
            issue_id: issue.id.clone(),
            kind: RepairKind::Fol,
            cost: atoms.len(),
            verification: Verification {
                af_semantics: ctx.semantics,
                af_goal_accepted: accepted,
                af_optimal: false,
                fol_entailed: Some(true),
                artifacts: json!({
                    "prover": ctx.prover.kind().to_string(),
                    "prover_ms": elapsed_ms,
                    "consistency_status": consistency,
                    "consistency_checked": consistency.is_definitive(),
                    "hypothesis_tptp": hypotheses,
                    "af_impact": {
                        "target": impact(target_id, ctx.acceptance, &before, &after),
                        "goal": goal_impact,
                    },
                }),
            },
            patch,
        });
    }
    info!(issue = %issue.id, repairs = repairs.len(), "Abduction finished");
    repairs
}
