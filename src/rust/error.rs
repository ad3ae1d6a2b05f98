// SPDX-FileCopyrightText: 2026 ARGIR Project Team
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Typed errors that escape the core
//!
//! External-tool failures are not errors: they travel as status values
//! (`ProverStatus`, `SolveOutcome`). Only malformed input, strict-mode
//! validation failures and configuration problems surface here.

use thiserror::Error;

use crate::validate::Finding;

#[derive(Debug, Error)]
pub enum ArgirError {
    /// Input draft does not have the expected structure
    #[error("schema violation: {0}")]
    Schema(String),

    /// Strict mode was requested and unfixed errors remain
    #[error("strict validation failed with {} error(s): {}", .0.len(), summarize(.0))]
    StrictValidation(Vec<Finding>),

    /// Every candidate draft failed to compile
    #[error("no usable sample among {attempts} candidate draft(s): {last_error}")]
    NoUsableSample { attempts: usize, last_error: String },

    #[error("invalid configuration: {0}")]
    Config(String),
}

fn summarize(findings: &[Finding]) -> String {
    findings
        .iter()
        .take(3)
        .map(|f| format!("{} at {}", f.code, f.path))
        .collect::<Vec<_>>()
        .join("; ")
}

pub type ArgirResult<T> = std::result::Result<T, ArgirError>;
