// SPDX-FileCopyrightText: 2026 ARGIR Project Team
// SPDX-License-Identifier: PMPL-1.0-or-later

//! clingo-backed AF solver

use async_trait::async_trait;
use std::collections::BTreeSet;
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, warn};

use super::asp::{self, ClingoRun};
use super::{
    Acceptance, AfEdit, AfSolver, EnforcementModel, EnforcementProblem, Extension, Extensions,
    Framework, NativeSolver, Semantics, SolveOutcome, SolverConfig,
};
use crate::executor::{resolve_executable, run_tool};

/// Runs ASP programs through the clingo binary
pub struct ClingoSolver {
    config: SolverConfig,
}

impl ClingoSolver {
    pub fn new(config: SolverConfig) -> Self {
        ClingoSolver { config }
    }

    fn executable(&self) -> Option<PathBuf> {
        resolve_executable(&self.config.executable)
    }

    /// Write `program` to a temp file and run clingo on it
    async fn run(&self, program: &str, flags: Vec<String>) -> SolveOutcome<ClingoRun> {
        let Some(clingo) = self.executable() else {
            debug!("clingo not found");
            return SolveOutcome::Unavailable(format!(
                "{} not found",
                self.config.executable.display()
            ));
        };

        let file = match write_program(program) {
            Ok(file) => file,
            Err(e) => return SolveOutcome::Failed(e.to_string()),
        };

        let mut args = flags;
        args.push(format!("--time-limit={}", self.config.timeout));
        args.push(file.path().display().to_string());

        let limit = Duration::from_secs(self.config.timeout + 2);
        match run_tool(&clingo, &args, None, limit).await {
            Ok(output) if output.timed_out => SolveOutcome::TimedOut,
            Ok(output) => {
                // 10 SAT, 20 UNSAT, 30 SAT with exhausted search; +1 interrupted
                match output.exit_code {
                    Some(10) | Some(20) | Some(30) => {
                        SolveOutcome::Solved(asp::parse_output(&output.stdout))
                    }
                    Some(11) | Some(31) => SolveOutcome::TimedOut,
                    code => {
                        warn!(?code, stderr = %output.stderr.trim(), "clingo failed");
                        SolveOutcome::Failed(format!(
                            "clingo exited with {:?}: {}",
                            code,
                            output.stderr.trim()
                        ))
                    }
                }
            }
            Err(e) => SolveOutcome::Unavailable(e.to_string()),
        }
    }
}

impl ClingoSolver {
    /// Skeptical preferred/stable enforcement
    ///
    /// Small frameworks go to the native solver. Larger ones are searched
    /// cost level by cost level: clingo lists the edit sets that make the
    /// goal credulously accepted, and each is kept only if the goal is in
    /// every extension of the edited framework.
    async fn enforce_skeptical(
        &self,
        problem: &EnforcementProblem,
    ) -> SolveOutcome<Vec<EnforcementModel>> {
        if problem.framework.arguments.len() <= self.config.max_arguments {
            debug!(goal = %problem.goal, "Skeptical enforcement delegated to the native solver");
            return NativeSolver::new(self.config.max_arguments)
                .enforce(problem)
                .await;
        }
        for cost in 0..=problem.max_edits {
            let program = asp::enforcement_level_program(problem, cost);
            let run = match self.run(&program, asp::level_flags()).await {
                SolveOutcome::Solved(run) => run,
                other => return other.map(|_| vec![]),
            };
            let mut seen: BTreeSet<Vec<AfEdit>> = BTreeSet::new();
            let mut models = Vec::new();
            for answer in &run.answers {
                let edits = edits_of(&answer.atoms);
                if !seen.insert(edits.clone()) {
                    continue;
                }
                let edited = problem.framework.with_edits(&edits);
                match self.extensions(&edited, problem.semantics).await {
                    SolveOutcome::Solved(ext) if ext.accepts(&problem.goal, problem.acceptance) => {
                        models.push(EnforcementModel {
                            edits,
                            cost,
                            optimal: true,
                        });
                    }
                    SolveOutcome::Solved(_) => {}
                    other => return other.map(|_| vec![]),
                }
                if models.len() >= problem.max_models {
                    break;
                }
            }
            if !models.is_empty() {
                debug!(cost, count = models.len(), "Skeptical enforcement found models");
                return SolveOutcome::Solved(models);
            }
        }
        SolveOutcome::Solved(vec![])
    }
}

fn write_program(program: &str) -> anyhow::Result<tempfile::NamedTempFile> {
    let mut file = tempfile::Builder::new()
        .prefix("argir-")
        .suffix(".lp")
        .tempfile()?;
    file.write_all(program.as_bytes())?;
    file.flush()?;
    Ok(file)
}

fn extension_of(atoms: &[String]) -> Extension {
    atoms
        .iter()
        .filter_map(|a| asp::parse_atom(a))
        .filter(|(name, args)| name == "in" && args.len() == 1)
        .filter_map(|(_, mut args)| args.pop())
        .collect()
}

fn edits_of(atoms: &[String]) -> Vec<AfEdit> {
    let mut edits: Vec<AfEdit> = atoms
        .iter()
        .filter_map(|a| {
            if let Some((source, target)) = asp::parse_binary(a, "del_att") {
                Some(AfEdit::DelAttack { source, target })
            } else {
                asp::parse_binary(a, "add_att").map(|(source, target)| AfEdit::AddAttack {
                    source,
                    target,
                })
            }
        })
        .collect();
    edits.sort();
    edits
}

#[async_trait]
impl AfSolver for ClingoSolver {
    fn name(&self) -> &'static str {
        "clingo"
    }

    async fn extensions(
        &self,
        framework: &Framework,
        semantics: Semantics,
    ) -> SolveOutcome<Extensions> {
        let program = asp::extensions_program(framework, semantics);
        self.run(&program, asp::extensions_flags(semantics))
            .await
            .map(|run| {
                let sets = run.answers.iter().map(|a| extension_of(&a.atoms)).collect();
                Extensions::new(semantics, sets)
            })
    }

    async fn enforce(&self, problem: &EnforcementProblem) -> SolveOutcome<Vec<EnforcementModel>> {
        if problem.semantics != Semantics::Grounded && problem.acceptance == Acceptance::Skeptical {
            return self.enforce_skeptical(problem).await;
        }
        let program = asp::enforcement_program(problem);
        self.run(&program, asp::enforcement_flags())
            .await
            .map(|run| {
                let Some(best) = run.answers.iter().filter_map(|a| a.cost).min() else {
                    return vec![];
                };
                let mut seen: BTreeSet<Vec<AfEdit>> = BTreeSet::new();
                let mut models = Vec::new();
                for answer in run.answers.iter().filter(|a| a.cost == Some(best)) {
                    let edits = edits_of(&answer.atoms);
                    if seen.insert(edits.clone()) {
                        models.push(EnforcementModel {
                            cost: edits.len(),
                            edits,
                            optimal: run.optimum_found,
                        });
                    }
                    if models.len() >= problem.max_models {
                        break;
                    }
                }
                models
            })
    }
}
