// SPDX-FileCopyrightText: 2026 ARGIR Project Team
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Common test utilities for the ARGIR test suite

#![allow(dead_code)]

use argir::core::{ArgumentGraph, Atom, AttackKind, Edge, Node, Premise, Rule, Statement, Term};
use argir::semantics::NativeSolver;
use argir::Argir;
use serde_json::{json, Value};
use std::path::PathBuf;

pub mod assertions;
pub mod generators;
pub mod mock_prover;

/// Install a test subscriber once; honours `RUST_LOG`
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Path to `tool` if installed, for tests that need a real binary
pub fn find_tool(tool: &str) -> Option<PathBuf> {
    which::which(tool).ok()
}

pub fn native_solver() -> NativeSolver {
    NativeSolver::default()
}

pub fn constant_atom(pred: &str, args: &[&str]) -> Atom {
    Atom::new(pred, args.iter().map(|a| Term::constant(*a)).collect())
}

pub fn fact(id: &str, pred: &str, args: &[&str]) -> Node {
    Node::new(id).with_conclusion(Statement::new(pred, vec![constant_atom(pred, args)]))
}

/// `A(X) => B(X)` with exception `E(X)`
pub fn rule_with_exception() -> Rule {
    let var = |pred: &str| Statement::new(pred, vec![Atom::new(pred, vec![Term::var("X")])]);
    Rule {
        name: "birds_fly".into(),
        strict: false,
        antecedents: vec![var("a")],
        consequents: vec![var("b")],
        exceptions: vec![var("e")],
        scheme: None,
        span: None,
        rationale: None,
    }
}

/// Socrates: a rule node, a premise and a conclusion citing the rule
pub fn socrates() -> Argir {
    let stmt = |pred: &str, term: Term| Statement::new(pred, vec![Atom::new(pred, vec![term])]);
    let rule = Rule {
        name: "mortality".into(),
        strict: true,
        antecedents: vec![stmt("human", Term::var("X"))],
        consequents: vec![stmt("mortal", Term::var("X"))],
        exceptions: vec![],
        scheme: None,
        span: None,
        rationale: None,
    };
    let mut argir = Argir::new(
        "Socrates is human. All humans are mortal. So Socrates is mortal.",
        ArgumentGraph {
            nodes: vec![
                Node::new("R1").with_rule(rule),
                Node::new("C1")
                    .with_premise(Premise::Ref(argir::core::NodeRef::new("R1")))
                    .with_premise(Premise::Stmt(stmt("human", Term::constant("socrates"))))
                    .with_conclusion(stmt("mortal", Term::constant("socrates"))),
            ],
            edges: vec![Edge::support("R1", "C1")],
        },
    );
    argir.metadata.goal_id = Some("C1".into());
    argir
}

/// Two claims where `b` rebuts the goal `a`
pub fn attacked_goal() -> Argir {
    let mut argir = Argir::new(
        "",
        ArgumentGraph {
            nodes: vec![fact("a", "sunny", &["today"]), fact("b", "cloudy", &["today"])],
            edges: vec![Edge::attack("b", "a", AttackKind::Undercut)],
        },
    );
    argir.metadata.goal_id = Some("a".into());
    argir
}

/// Soft draft: two premises, a conclusion, no rule
pub fn soft_wet_street() -> Value {
    json!({
        "version": "soft-0.1",
        "source_text": "It rains and the street is outside, so the street is wet.",
        "graph": {
            "nodes": [
                {
                    "id": "n1",
                    "premises": [
                        {"pred": "rains", "args": []},
                        {"pred": "is outside", "args": [{"value": "street"}]}
                    ],
                    "conclusion": {"pred": "is wet", "args": [{"value": "street"}]}
                }
            ],
            "edges": []
        },
        "goal": {"node_id": "n1"}
    })
}

/// Soft draft with a rule, a fact, an inference and an attacker
pub fn soft_tweety() -> Value {
    json!({
        "graph": {
            "nodes": [
                {
                    "id": "rule",
                    "rule": {
                        "name": "birds fly",
                        "antecedents": [{"pred": "is a bird", "args": ["X"]}],
                        "consequents": [{"pred": "can fly", "args": ["X"]}],
                        "exceptions": [{"pred": "is a penguin", "args": ["X"]}]
                    }
                },
                {"id": "bird", "conclusion": {"pred": "is a bird", "args": ["tweety"]}},
                {
                    "id": "flies",
                    "premises": [{"kind": "Ref", "ref": "rule"}, {"kind": "Ref", "ref": "bird"}],
                    "conclusion": {"pred": "can fly", "args": ["tweety"]}
                },
                {"id": "penguin", "conclusion": {"pred": "is a penguin", "args": ["tweety"]}}
            ],
            "edges": [
                {"source": "penguin", "target": "flies", "kind": "attack", "attack_kind": "undercut"}
            ]
        },
        "goal": {"node_id": "flies"}
    })
}
