// SPDX-FileCopyrightText: 2026 ARGIR Project Team
// SPDX-License-Identifier: PMPL-1.0-or-later

//! One request, end to end
//!
//! Stages run in a fixed order: compile and validate, strict gate, lint,
//! formula listing, prover summary, AF extensions for every semantics,
//! diagnostics, repairs, quality metrics. External tools that are missing
//! or slow degrade their stage's result; only malformed input and strict
//! validation failures abort the run.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::compile::{compile_best_of, compile_draft, Compiled};
use crate::config::{PipelineConfig, SupportCheckMode};
use crate::core::Argir;
use crate::diagnostics::{diagnose, DiagnoseOptions, Diagnosis, EntailmentCheck, ExistenceCheck, SupportCheck};
use crate::error::{ArgirError, ArgirResult};
use crate::fol::{translate, TranslateOptions};
use crate::metrics::{quality_metrics, QualityMetrics};
use crate::provers::{ProverBackend, ProverFactory, ProverOutcome};
use crate::repair::{repair_all, Repair, RepairContext};
use crate::semantics::{analyze, create_solver, AfAnalysis, AfSolver, Semantics};
use crate::soft::Draft;
use crate::validate::{lint, Finding, ValidationReport};

/// Formula listing plus what the prover made of the goal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FolSummary {
    pub goal_node: Option<String>,
    /// One `fof(..)` line per formula, conjecture last
    pub tptp: Vec<String>,
    pub placeholders: Vec<String>,
    /// Absent when there is no conjecture to attempt
    pub prover: Option<ProverOutcome>,
}

/// Extensions computed for one semantics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AfSummary {
    pub semantics: Semantics,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Vec<Vec<String>>>,
    /// Arguments accepted under the configured acceptance mode
    pub accepted: Vec<String>,
    /// Rule bookkeeping nodes left out of the framework
    pub excluded: Vec<String>,
}

impl AfSummary {
    fn from_analysis(analysis: &AfAnalysis, config: &PipelineConfig) -> Self {
        let solved = analysis.outcome.as_solved();
        AfSummary {
            semantics: analysis.semantics,
            status: analysis.outcome.status_label().to_string(),
            extensions: solved.map(|ext| {
                ext.sets
                    .iter()
                    .map(|set| set.iter().cloned().collect())
                    .collect()
            }),
            accepted: solved
                .map(|ext| ext.accepted(config.acceptance))
                .unwrap_or_default(),
            excluded: analysis.projection.excluded.clone(),
        }
    }
}

/// Everything one run produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineOutput {
    pub argir: Argir,
    pub validation: ValidationReport,
    pub lint: Vec<Finding>,
    pub fol: FolSummary,
    pub af: Vec<AfSummary>,
    pub diagnosis: Diagnosis,
    pub repairs: Vec<Repair>,
    pub metrics: QualityMetrics,
}

impl PipelineOutput {
    pub fn to_json(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Stage driver holding one request's configuration and tool backends
pub struct Pipeline {
    config: PipelineConfig,
    prover: Box<dyn ProverBackend>,
    solver: Box<dyn AfSolver>,
}

impl Pipeline {
    /// Backends are built from the configuration
    pub fn new(config: PipelineConfig) -> anyhow::Result<Self> {
        config.check()?;
        let mut prover_config = config.prover.clone();
        if prover_config.executable.as_os_str().is_empty() {
            prover_config.executable = config.prover_kind.default_executable().into();
        }
        let prover = ProverFactory::create(config.prover_kind, prover_config)?;
        let solver = create_solver(&config.solver);
        Ok(Pipeline {
            config,
            prover,
            solver,
        })
    }

    /// Use the given backends instead of the configured ones
    pub fn with_backends(
        config: PipelineConfig,
        prover: Box<dyn ProverBackend>,
        solver: Box<dyn AfSolver>,
    ) -> Self {
        Pipeline {
            config,
            prover,
            solver,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub async fn run_json(&self, draft: &str) -> ArgirResult<PipelineOutput> {
        let value: serde_json::Value = serde_json::from_str(draft)
            .map_err(|e| ArgirError::Schema(format!("draft is not JSON: {}", e)))?;
        self.run(value).await
    }

    /// Run a soft or strict draft
    pub async fn run(&self, draft: serde_json::Value) -> ArgirResult<PipelineOutput> {
        let draft = Draft::detect(draft)?;
        info!(
            kind = if matches!(draft, Draft::Soft(_)) { "soft" } else { "strict" },
            "Pipeline started"
        );
        let compiled = compile_draft(&draft, &self.config.compile, self.config.goal_id.as_deref())?;
        self.analyze(compiled).await
    }

    /// Keep the candidate draft with the fewest validation errors, then run it
    pub async fn run_samples(&self, samples: &[serde_json::Value]) -> ArgirResult<PipelineOutput> {
        let compiled = compile_best_of(samples, &self.config.compile, self.config.goal_id.as_deref())?;
        self.analyze(compiled).await
    }

    /// Every stage after compilation
    pub async fn analyze(&self, compiled: Compiled) -> ArgirResult<PipelineOutput> {
        let Compiled { argir, report } = compiled;
        report.enforce_strict(self.config.strict)?;
        debug!(findings = report.findings.len(), errors = report.error_count(), "Validation done");

        let lint = lint(&argir.graph);
        let fol = self.fol_summary(&argir).await;

        let mut analyses = Vec::with_capacity(3);
        for semantics in Semantics::all() {
            analyses.push(analyze(self.solver.as_ref(), &argir.graph, semantics).await);
        }
        let af: Vec<AfSummary> = analyses
            .iter()
            .map(|a| AfSummary::from_analysis(a, &self.config))
            .collect();
        let Some(chosen) = analyses.iter().find(|a| a.semantics == self.config.semantics) else {
            return Err(ArgirError::Config(format!(
                "semantics {} was not computed",
                self.config.semantics
            )));
        };

        let existence = ExistenceCheck;
        let entailment = EntailmentCheck::new(self.prover.as_ref(), self.config.fol_mode);
        let support: &dyn SupportCheck = match self.config.support_check {
            SupportCheckMode::Existence => &existence,
            SupportCheckMode::Entailment => &entailment,
        };
        let goal_id = self
            .config
            .goal_id
            .clone()
            .or_else(|| argir.goal_id().map(str::to_string));
        let diagnosis = diagnose(
            &argir,
            chosen,
            support,
            &DiagnoseOptions {
                goal_id: goal_id.clone(),
                acceptance: self.config.acceptance,
            },
        )
        .await;

        let ctx = RepairContext {
            solver: self.solver.as_ref(),
            prover: self.prover.as_ref(),
            config: &self.config.repair,
            semantics: self.config.semantics,
            acceptance: self.config.acceptance,
            fol_mode: self.config.fol_mode,
            goal_id,
        };
        let repairs = repair_all(&ctx, &argir, &diagnosis.issues).await;
        let metrics = quality_metrics(&argir);

        info!(
            nodes = argir.graph.nodes.len(),
            issues = diagnosis.issues.len(),
            repairs = repairs.len(),
            overall = metrics.overall,
            "Pipeline finished"
        );
        Ok(PipelineOutput {
            argir,
            validation: report,
            lint,
            fol,
            af,
            diagnosis,
            repairs,
            metrics,
        })
    }

    async fn fol_summary(&self, argir: &Argir) -> FolSummary {
        let translation = translate(
            argir,
            &TranslateOptions {
                mode: self.config.fol_mode,
                goal_id: self.config.goal_id.clone(),
                omit_fact_of: None,
            },
        );
        let prover = match translation.problem.conjecture {
            Some(_) => Some(self.prover.prove(&translation.problem).await),
            None => None,
        };
        if let Some(outcome) = &prover {
            debug!(status = ?outcome.status, ms = outcome.elapsed_ms, "Goal proof attempted");
        }
        FolSummary {
            goal_node: translation.goal_node,
            tptp: translation.problem.lines(),
            placeholders: translation.placeholders,
            prover,
        }
    }
}
