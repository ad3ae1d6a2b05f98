// SPDX-FileCopyrightText: 2026 ARGIR Project Team
// SPDX-License-Identifier: PMPL-1.0-or-later

//! E Prover backend
//!
//! E reads the FOF problem on stdin in auto mode and reports an SZS status
//! line.

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::process::Command;

use super::{run_tptp_prover, ProverBackend, ProverConfig, ProverKind, ProverOutcome};
use crate::fol::Problem;

/// E Prover theorem prover backend
pub struct EProverBackend {
    config: ProverConfig,
}

impl EProverBackend {
    pub fn new(config: ProverConfig) -> Self {
        EProverBackend { config }
    }

    fn arguments(&self) -> Vec<String> {
        let mut args = vec![
            "--auto".to_string(),
            "--tptp3-format".to_string(),
            "--silent".to_string(),
            format!("--cpu-limit={}", self.config.timeout),
        ];
        args.extend(self.config.args.iter().cloned());
        args
    }
}

#[async_trait]
impl ProverBackend for EProverBackend {
    fn kind(&self) -> ProverKind {
        ProverKind::EProver
    }

    async fn version(&self) -> Result<String> {
        let output = Command::new(&self.config.executable)
            .arg("--version")
            .output()
            .await
            .context("Failed to run eprover --version")?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(stdout.lines().next().unwrap_or("unknown").trim().to_string())
    }

    async fn prove(&self, problem: &Problem) -> ProverOutcome {
        run_tptp_prover(self.kind(), &self.config, self.arguments(), problem).await
    }

    fn config(&self) -> &ProverConfig {
        &self.config
    }

    fn set_config(&mut self, config: ProverConfig) {
        self.config = config;
    }
}
