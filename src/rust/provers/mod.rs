// SPDX-FileCopyrightText: 2026 ARGIR Project Team
// SPDX-License-Identifier: PMPL-1.0-or-later

//! First-order prover backends
//!
//! Backends consume a [`Problem`] rendered as TPTP FOF and answer with a
//! [`ProverStatus`]. Proving never fails: a missing binary, a crash or a
//! timeout are all reported as status values.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, warn};

use crate::executor::{resolve_executable, run_tool};
use crate::fol::Problem;

pub mod eprover;
pub mod vampire;

/// Supported first-order provers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProverKind {
    EProver,
    Vampire,
}

impl std::str::FromStr for ProverKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "eprover" | "e" => Ok(ProverKind::EProver),
            "vampire" => Ok(ProverKind::Vampire),
            _ => Err(anyhow::anyhow!("Unknown prover: {}", s)),
        }
    }
}

impl std::fmt::Display for ProverKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl ProverKind {
    pub fn all() -> Vec<ProverKind> {
        vec![ProverKind::EProver, ProverKind::Vampire]
    }

    pub fn default_executable(&self) -> &'static str {
        match self {
            ProverKind::EProver => "eprover",
            ProverKind::Vampire => "vampire",
        }
    }
}

/// Configuration for a prover backend
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProverConfig {
    /// Path to prover executable
    pub executable: PathBuf,

    /// Additional arguments
    pub args: Vec<String>,

    /// Timeout in seconds
    pub timeout: u64,
}

impl Default for ProverConfig {
    fn default() -> Self {
        ProverConfig {
            executable: PathBuf::new(),
            args: vec![],
            timeout: 5,
        }
    }
}

impl ProverConfig {
    pub fn for_kind(kind: ProverKind) -> Self {
        ProverConfig {
            executable: PathBuf::from(kind.default_executable()),
            ..Default::default()
        }
    }
}

/// Outcome of one proof attempt, after SZS status mapping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProverStatus {
    /// Conjecture follows from the axioms
    Theorem,
    /// Axioms (with negated conjecture) are unsatisfiable
    Unsatisfiable,
    /// Axioms are satisfiable
    Satisfiable,
    /// Conjecture does not follow
    CounterSatisfiable,
    /// Prover gave up or produced no recognizable status
    Unknown,
    Timeout,
    /// Prover binary missing or could not run
    Unavailable,
}

impl ProverStatus {
    /// Theorem or refutation found
    pub fn is_proved(&self) -> bool {
        matches!(self, ProverStatus::Theorem | ProverStatus::Unsatisfiable)
    }

    /// The prover actually ran to a verdict
    pub fn is_definitive(&self) -> bool {
        matches!(
            self,
            ProverStatus::Theorem
                | ProverStatus::Unsatisfiable
                | ProverStatus::Satisfiable
                | ProverStatus::CounterSatisfiable
        )
    }

    /// Map prover output onto a status via SZS lines and legacy banners
    pub fn from_output(output: &str) -> ProverStatus {
        let szs = output
            .lines()
            .find_map(|l| l.split("SZS status ").nth(1))
            .and_then(|rest| rest.split_whitespace().next());

        match szs {
            Some("Theorem") => ProverStatus::Theorem,
            Some("Unsatisfiable") | Some("ContradictoryAxioms") => ProverStatus::Unsatisfiable,
            Some("CounterSatisfiable") => ProverStatus::CounterSatisfiable,
            Some("Satisfiable") => ProverStatus::Satisfiable,
            Some("Timeout") | Some("ResourceOut") => ProverStatus::Timeout,
            Some(_) => ProverStatus::Unknown,
            None if output.contains("# Proof found!") || output.contains("Refutation found") => {
                ProverStatus::Theorem
            }
            None => ProverStatus::Unknown,
        }
    }
}

/// Status plus timing for one call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProverOutcome {
    pub status: ProverStatus,
    pub elapsed_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ProverOutcome {
    pub fn new(status: ProverStatus, elapsed_ms: u64) -> Self {
        ProverOutcome {
            status,
            elapsed_ms,
            detail: None,
        }
    }

    pub fn unavailable(detail: impl Into<String>) -> Self {
        ProverOutcome {
            status: ProverStatus::Unavailable,
            elapsed_ms: 0,
            detail: Some(detail.into()),
        }
    }
}

/// Universal trait for first-order prover backends
#[async_trait]
pub trait ProverBackend: Send + Sync {
    /// Get prover kind
    fn kind(&self) -> ProverKind;

    /// Get prover version
    async fn version(&self) -> anyhow::Result<String>;

    /// Attempt the problem's conjecture; never fails
    async fn prove(&self, problem: &Problem) -> ProverOutcome;

    /// Export problem to the prover's input format
    fn export(&self, problem: &Problem) -> anyhow::Result<String> {
        Ok(problem.to_tptp())
    }

    /// Get configuration
    fn config(&self) -> &ProverConfig;

    /// Set configuration
    fn set_config(&mut self, config: ProverConfig);
}

/// Run a TPTP-reading prover on `problem` and map its output to a status
pub(crate) async fn run_tptp_prover(
    kind: ProverKind,
    config: &ProverConfig,
    args: Vec<String>,
    problem: &Problem,
) -> ProverOutcome {
    let Some(executable) = resolve_executable(&config.executable) else {
        debug!(prover = %kind, "Prover executable not found");
        return ProverOutcome::unavailable(format!(
            "{} not found",
            config.executable.display()
        ));
    };

    let input = problem.to_tptp();
    // Wall-clock limit leaves the prover's own CPU limit room to report
    let limit = Duration::from_secs(config.timeout + 2);
    match run_tool(&executable, &args, Some(&input), limit).await {
        Ok(output) if output.timed_out => {
            ProverOutcome::new(ProverStatus::Timeout, output.elapsed.as_millis() as u64)
        }
        Ok(output) => {
            let status = ProverStatus::from_output(&output.combined());
            debug!(prover = %kind, ?status, ms = output.elapsed.as_millis() as u64, "Prover finished");
            ProverOutcome::new(status, output.elapsed.as_millis() as u64)
        }
        Err(e) => {
            warn!(prover = %kind, error = %e, "Prover could not run");
            ProverOutcome::unavailable(e.to_string())
        }
    }
}

/// Factory for creating prover backends
pub struct ProverFactory;

impl ProverFactory {
    pub fn create(kind: ProverKind, config: ProverConfig) -> anyhow::Result<Box<dyn ProverBackend>> {
        match kind {
            ProverKind::EProver => Ok(Box::new(eprover::EProverBackend::new(config))),
            ProverKind::Vampire => Ok(Box::new(vampire::VampireBackend::new(config))),
        }
    }
}
