// SPDX-FileCopyrightText: 2026 ARGIR Project Team
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Request-scoped configuration
//!
//! A `PipelineConfig` is built per request and handed down explicitly.
//! Nothing in the crate keeps configuration in process-wide state.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ArgirError;
use crate::fol::FolMode;
use crate::provers::{ProverConfig, ProverKind};
use crate::semantics::{Acceptance, Semantics, SolverConfig};

/// Options for the soft-to-strict compiler
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompileOptions {
    /// Split premises whose surface predicate reads "x and y" into separate antecedents
    pub split_conjunctions: bool,

    /// Maximum number of parts a single premise may be split into
    pub conjunction_cap: usize,
}

impl Default for CompileOptions {
    fn default() -> Self {
        CompileOptions {
            split_conjunctions: false,
            conjunction_cap: 3,
        }
    }
}

/// How `unsupported_inference` decides whether a node is supported
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SupportCheckMode {
    /// Premises or an incoming support edge exist
    Existence,

    /// The node's conclusion is entailed by its premises (needs a prover)
    Entailment,
}

/// Bounds for both repair engines
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepairConfig {
    pub enabled: bool,

    /// Repairs returned per issue
    pub max_repairs: usize,

    /// Largest hypothesis set tried by abduction
    pub max_hypothesis_atoms: usize,

    /// Single-atom candidates tried before giving up on the single tier
    pub max_single_candidates: usize,

    /// Singles combined pairwise for the two-atom tier
    pub pair_pool: usize,

    /// Largest AF edit set considered
    pub max_af_edits: usize,

    /// Attacks considered for deletion or addition
    pub max_af_candidates: usize,
}

impl Default for RepairConfig {
    fn default() -> Self {
        RepairConfig {
            enabled: true,
            max_repairs: 3,
            max_hypothesis_atoms: 2,
            max_single_candidates: 50,
            pair_pool: 20,
            max_af_edits: 2,
            max_af_candidates: 24,
        }
    }
}

/// Configuration for one pipeline run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub fol_mode: FolMode,
    pub semantics: Semantics,
    pub acceptance: Acceptance,

    /// Unfixed validation errors abort before formula translation
    pub strict: bool,

    /// Explicit goal node, overrides anything declared in the draft
    pub goal_id: Option<String>,

    pub support_check: SupportCheckMode,
    pub compile: CompileOptions,
    pub repair: RepairConfig,

    pub prover_kind: ProverKind,
    pub prover: ProverConfig,
    pub solver: SolverConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            fol_mode: FolMode::Classical,
            semantics: Semantics::Grounded,
            acceptance: Acceptance::Credulous,
            strict: false,
            goal_id: None,
            support_check: SupportCheckMode::Existence,
            compile: CompileOptions::default(),
            repair: RepairConfig::default(),
            prover_kind: ProverKind::EProver,
            prover: ProverConfig::for_kind(ProverKind::EProver),
            solver: SolverConfig::default(),
        }
    }
}

impl PipelineConfig {
    pub fn from_json_str(content: &str) -> Result<Self> {
        let config: PipelineConfig =
            serde_json::from_str(content).context("Failed to parse pipeline configuration")?;
        config.check()?;
        Ok(config)
    }

    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = tokio::fs::read_to_string(path.as_ref())
            .await
            .with_context(|| format!("Failed to read config {}", path.as_ref().display()))?;
        Self::from_json_str(&content)
    }

    /// Reject settings that would make a bounded search unbounded or empty
    pub fn check(&self) -> Result<(), ArgirError> {
        if self.repair.max_hypothesis_atoms == 0 || self.repair.max_hypothesis_atoms > 2 {
            return Err(ArgirError::Config(format!(
                "max_hypothesis_atoms must be 1 or 2, got {}",
                self.repair.max_hypothesis_atoms
            )));
        }
        if self.compile.conjunction_cap == 0 {
            return Err(ArgirError::Config("conjunction_cap must be positive".into()));
        }
        if self.prover.timeout == 0 || self.solver.timeout == 0 {
            return Err(ArgirError::Config("tool timeouts must be positive".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.repair.max_repairs, 3);
        assert_eq!(config.support_check, SupportCheckMode::Existence);
        assert!(config.check().is_ok());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config = PipelineConfig::from_json_str(
            r#"{"fol_mode": "defeasible", "semantics": "preferred", "repair": {"max_repairs": 1}}"#,
        )
        .unwrap();
        assert_eq!(config.fol_mode, FolMode::Defeasible);
        assert_eq!(config.semantics, Semantics::Preferred);
        assert_eq!(config.repair.max_repairs, 1);
        assert_eq!(config.repair.pair_pool, 20);
    }

    #[test]
    fn test_rejects_three_atom_hypotheses() {
        let err = PipelineConfig::from_json_str(r#"{"repair": {"max_hypothesis_atoms": 3}}"#)
            .unwrap_err();
        assert!(err.to_string().contains("max_hypothesis_atoms") || format!("{:#}", err).contains("max_hypothesis_atoms"));
    }
}
