// SPDX-FileCopyrightText: 2026 ARGIR Project Team
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Proptest strategies for soft drafts

use argir::semantics::{Acceptance, EnforcementProblem, Framework, Semantics};
use argir::soft::{SoftEdge, SoftGraph, SoftIr, SoftNode, SoftPremise, SoftRule, SoftStatement};
use proptest::prelude::*;

/// Surface predicates, including near-duplicates the canonicalizer should fold
pub const VOCABULARY: &[&str] = &[
    "is wet",
    "is_wet",
    "the street is wet",
    "rains",
    "it rains",
    "is mortal",
    "is human",
    "barks",
    "can fly",
    "is a bird",
];

const ARGS: &[&str] = &["x", "socrates", "X", "Y"];

pub fn surface() -> impl Strategy<Value = String> {
    prop::sample::select(VOCABULARY).prop_map(str::to_string)
}

pub fn soft_statement() -> impl Strategy<Value = SoftStatement> {
    (
        surface(),
        prop::collection::vec(prop::sample::select(ARGS), 0..=2),
        any::<bool>(),
    )
        .prop_map(|(pred, args, negated)| {
            let stmt = SoftStatement::new(pred, &args);
            if negated {
                stmt.negated()
            } else {
                stmt
            }
        })
}

pub fn soft_rule() -> impl Strategy<Value = SoftRule> {
    (
        prop::collection::vec(soft_statement(), 0..=2),
        prop::collection::vec(soft_statement(), 0..=1),
        prop::collection::vec(soft_statement(), 0..=1),
        any::<bool>(),
    )
        .prop_map(|(antecedents, consequents, exceptions, strict)| SoftRule {
            name: None,
            strict,
            antecedents,
            consequents,
            exceptions,
            scheme: None,
        })
}

fn soft_node(index: usize) -> impl Strategy<Value = SoftNode> {
    (
        prop::collection::vec(soft_statement(), 0..=2),
        prop::option::of(soft_statement()),
        prop::option::weighted(0.3, soft_rule()),
    )
        .prop_map(move |(premises, conclusion, rule)| SoftNode {
            id: Some(format!("n{}", index)),
            premises: premises.into_iter().map(SoftPremise::Stmt).collect(),
            rule,
            conclusion,
            ..Default::default()
        })
}

/// A soft draft with up to six nodes and edges between them by index
pub fn soft_ir() -> impl Strategy<Value = SoftIr> {
    (1usize..=6)
        .prop_flat_map(|n| {
            let nodes: Vec<_> = (0..n).map(soft_node).collect();
            let edges = prop::collection::vec((0..n, 0..n, any::<bool>()), 0..=n);
            (nodes, edges)
        })
        .prop_map(|(nodes, edges)| SoftIr {
            version: "soft-0.1".into(),
            graph: SoftGraph {
                edges: edges
                    .into_iter()
                    .filter(|(s, t, _)| s != t)
                    .map(|(s, t, attack)| SoftEdge {
                        source: format!("n{}", s),
                        target: format!("n{}", t),
                        kind: if attack { "attack" } else { "support" }.into(),
                        attack_kind: attack.then(|| "rebut".into()),
                        rationale: None,
                    })
                    .collect(),
                nodes,
            },
            ..Default::default()
        })
}

const ARGUMENTS: &[&str] = &["a", "b", "c", "d"];

/// Enforcement requests over at most four arguments and eight candidate edits
pub fn enforcement_problem() -> impl Strategy<Value = EnforcementProblem> {
    (2usize..=4)
        .prop_flat_map(|n| {
            (
                Just(n),
                prop::collection::vec((0..n, 0..n), 0..=5),
                prop::collection::vec((0..n, 0..n), 0..=3),
                0..n,
                prop::sample::select(Semantics::all().to_vec()),
                prop::sample::select(vec![Acceptance::Credulous, Acceptance::Skeptical]),
            )
        })
        .prop_map(|(n, attacks, additions, goal, semantics, acceptance)| {
            let name = |i: usize| ARGUMENTS[i].to_string();
            let framework = Framework::new(
                (0..n).map(name).collect(),
                attacks.into_iter().map(|(s, t)| (name(s), name(t))).collect(),
            );
            let mut addable: Vec<(String, String)> = Vec::new();
            for (s, t) in additions {
                let pair = (name(s), name(t));
                if !framework.attacks(&pair.0, &pair.1) && !addable.contains(&pair) {
                    addable.push(pair);
                }
            }
            EnforcementProblem {
                deletable: framework.attacks.clone(),
                addable,
                goal: name(goal),
                framework,
                semantics,
                acceptance,
                max_edits: 2,
                max_models: 16,
            }
        })
}
