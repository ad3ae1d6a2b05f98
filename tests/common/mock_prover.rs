// SPDX-FileCopyrightText: 2026 ARGIR Project Team
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Scripted prover backend for testing

use argir::fol::{Formula, FormulaRole, Problem};
use argir::provers::{ProverBackend, ProverConfig, ProverKind, ProverOutcome, ProverStatus};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

type Decide = dyn Fn(&Problem) -> ProverStatus + Send + Sync;

/// A prover whose verdicts come from a closure; every problem it sees is recorded
pub struct MockProver {
    pub config: ProverConfig,
    decide: Box<Decide>,
    pub calls: Arc<Mutex<Vec<String>>>,
}

impl MockProver {
    pub fn new(decide: impl Fn(&Problem) -> ProverStatus + Send + Sync + 'static) -> Self {
        MockProver {
            config: ProverConfig::default(),
            decide: Box::new(decide),
            calls: Arc::new(Mutex::new(vec![])),
        }
    }

    /// Proves a conjecture iff the hypothesis axioms mention every needle; never proves `$false`
    pub fn proving_with(needles: &[&str]) -> Self {
        let needles: Vec<String> = needles.iter().map(|s| s.to_string()).collect();
        MockProver::new(move |problem| {
            if is_consistency_check(problem) {
                return ProverStatus::CounterSatisfiable;
            }
            let hypotheses = hypothesis_text(problem);
            if needles.iter().all(|n| hypotheses.contains(n.as_str())) {
                ProverStatus::Theorem
            } else {
                ProverStatus::CounterSatisfiable
            }
        })
    }

    pub fn unavailable() -> Self {
        MockProver::new(|_| ProverStatus::Unavailable)
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

/// True when the conjecture is `$false`
pub fn is_consistency_check(problem: &Problem) -> bool {
    problem
        .conjecture
        .as_ref()
        .is_some_and(|c| c.role == FormulaRole::Conjecture && c.formula == Formula::False)
}

/// TPTP of the `h<n>` axioms added by abduction
pub fn hypothesis_text(problem: &Problem) -> String {
    problem
        .axioms
        .iter()
        .filter(|a| a.name.starts_with('h') && a.name[1..].chars().all(|c| c.is_ascii_digit()))
        .map(|a| a.to_tptp())
        .collect::<Vec<_>>()
        .join("\n")
}

#[async_trait]
impl ProverBackend for MockProver {
    fn kind(&self) -> ProverKind {
        ProverKind::EProver
    }

    async fn version(&self) -> anyhow::Result<String> {
        Ok("Mock 1.0.0".to_string())
    }

    async fn prove(&self, problem: &Problem) -> ProverOutcome {
        self.calls.lock().unwrap().push(problem.to_tptp());
        ProverOutcome::new((self.decide)(problem), 1)
    }

    fn config(&self) -> &ProverConfig {
        &self.config
    }

    fn set_config(&mut self, config: ProverConfig) {
        self.config = config;
    }
}
