// SPDX-FileCopyrightText: 2026 ARGIR Project Team
// SPDX-License-Identifier: PMPL-1.0-or-later

//! End-to-end pipeline runs with scripted backends

mod common;

use argir::diagnostics::{GoalStatus, IssueType};
use argir::fol::Formula;
use argir::provers::ProverStatus;
use argir::repair::apply_patch;
use argir::semantics::{analyze, Acceptance, AfEdit, SolverKind};
use argir::{ArgirError, Pipeline, PipelineConfig, RepairKind, Semantics};
use common::assertions::issue_kinds;
use common::mock_prover::MockProver;
use pretty_assertions::assert_eq;
use serde_json::json;

fn config() -> PipelineConfig {
    let mut config = PipelineConfig::default();
    config.solver.kind = SolverKind::Native;
    config
}

fn pipeline(prover: MockProver) -> Pipeline {
    Pipeline::with_backends(config(), Box::new(prover), Box::new(common::native_solver()))
}

/// Proves every conjecture except `$false`
fn agreeable() -> MockProver {
    MockProver::new(|problem| match &problem.conjecture {
        Some(c) if c.formula == Formula::False => ProverStatus::CounterSatisfiable,
        _ => ProverStatus::Theorem,
    })
}

#[tokio::test]
async fn test_tweety_goal_is_defeated_and_repaired() {
    common::init_tracing();
    let out = pipeline(MockProver::unavailable())
        .run(common::soft_tweety())
        .await
        .unwrap();

    assert_eq!(out.argir.metadata.id_map.get("flies").map(String::as_str), Some("P1"));
    assert_eq!(out.argir.goal_id(), Some("P1"));
    assert!(!out.argir.metadata.implicit_rules_synthesized);
    for af in &out.af {
        assert_eq!(af.excluded, vec!["R1".to_string()]);
        assert_eq!(af.status, "solved");
    }

    assert_eq!(
        issue_kinds(&out.diagnosis),
        vec![
            IssueType::UnsupportedInference,
            IssueType::UnsupportedInference,
            IssueType::GoalUnreachable,
        ]
    );
    assert_eq!(out.diagnosis.goal, GoalStatus::NotAccepted);
    let goal_issue = &out.diagnosis.issues[2];
    assert_eq!(goal_issue.id, "I-003");

    assert!(out.repairs.iter().all(|r| r.kind == RepairKind::Af));
    let first = &out.repairs[0];
    assert_eq!(first.id, "AF-I-003-1");
    assert_eq!(first.cost, 1);
    assert_eq!(
        first.patch.af_edits,
        vec![AfEdit::DelAttack {
            source: "C2".into(),
            target: "P1".into()
        }]
    );
    for repair in &out.repairs {
        assert_eq!(repair.verification.af_goal_accepted, Some(true));
    }

    let patched = apply_patch(&out.argir, &first.patch);
    let after = analyze(&common::native_solver(), &patched.graph, Semantics::Grounded).await;
    assert_eq!(after.accepts("P1", Acceptance::Credulous), Some(true));
    assert_eq!(out.argir.graph.attack_edges().count(), 1);
}

#[tokio::test]
async fn test_strict_socrates_is_clean() {
    let draft = common::socrates().to_json().unwrap();
    let out = pipeline(agreeable()).run_json(&draft).await.unwrap();

    assert!(out.argir.lexicon().is_some_and(|lex| lex.contains_key("mortal")));
    assert_eq!(out.fol.goal_node.as_deref(), Some("C1"));
    let conjecture = out.fol.tptp.last().unwrap();
    assert!(conjecture.contains("conjecture"));
    assert!(conjecture.contains("mortal(socrates)"));
    assert_eq!(out.fol.prover.as_ref().map(|p| p.status), Some(ProverStatus::Theorem));

    assert!(out.diagnosis.issues.is_empty());
    assert_eq!(out.diagnosis.goal, GoalStatus::Accepted);
    assert!(out.repairs.is_empty());
    assert!(out.to_json().unwrap().contains("\"metrics\""));
}

#[tokio::test]
async fn test_best_of_skips_unusable_samples() {
    let samples = vec![json!("not a draft"), common::soft_tweety()];
    let out = pipeline(MockProver::unavailable())
        .run_samples(&samples)
        .await
        .unwrap();
    assert_eq!(out.argir.goal_id(), Some("P1"));

    let err = pipeline(MockProver::unavailable())
        .run_samples(&[json!(1)])
        .await
        .unwrap_err();
    assert!(matches!(err, ArgirError::NoUsableSample { attempts: 1, .. }));
}

#[tokio::test]
async fn test_disabled_repairs_yield_none() {
    let mut config = config();
    config.repair.enabled = false;
    let pipeline = Pipeline::with_backends(
        config,
        Box::new(MockProver::unavailable()),
        Box::new(common::native_solver()),
    );
    let out = pipeline.run(common::soft_tweety()).await.unwrap();
    assert!(!out.diagnosis.issues.is_empty());
    assert!(out.repairs.is_empty());
}
