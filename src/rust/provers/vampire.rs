// SPDX-FileCopyrightText: 2026 ARGIR Project Team
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Vampire ATP backend

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::process::Command;

use super::{run_tptp_prover, ProverBackend, ProverConfig, ProverKind, ProverOutcome};
use crate::fol::Problem;

/// Vampire theorem prover backend
pub struct VampireBackend {
    config: ProverConfig,
}

impl VampireBackend {
    pub fn new(config: ProverConfig) -> Self {
        VampireBackend { config }
    }

    fn arguments(&self) -> Vec<String> {
        let mut args = vec![
            "--mode".to_string(),
            "casc".to_string(),
            "--input_syntax".to_string(),
            "tptp".to_string(),
            "--proof".to_string(),
            "off".to_string(),
            "--time_limit".to_string(),
            format!("{}", self.config.timeout),
        ];
        args.extend(self.config.args.iter().cloned());
        args
    }
}

#[async_trait]
impl ProverBackend for VampireBackend {
    fn kind(&self) -> ProverKind {
        ProverKind::Vampire
    }

    async fn version(&self) -> Result<String> {
        let output = Command::new(&self.config.executable)
            .arg("--version")
            .output()
            .await
            .context("Failed to run vampire --version")?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);

        // Some builds print the banner on stderr
        let version = if !stdout.trim().is_empty() {
            stdout.lines().next().unwrap_or("unknown").to_string()
        } else {
            stderr.lines().next().unwrap_or("unknown").to_string()
        };

        Ok(version.trim().to_string())
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vampire_arguments() {
        let backend = VampireBackend::new(ProverConfig {
            timeout: 3,
            ..ProverConfig::for_kind(ProverKind::Vampire)
        });
        let args = backend.arguments();
        let pos = args.iter().position(|a| a == "--time_limit").unwrap();
        assert_eq!(args[pos + 1], "3");
    }
}
