// SPDX-FileCopyrightText: 2026 ARGIR Project Team
// SPDX-License-Identifier: PMPL-1.0-or-later

//! ARGIR: argument graphs checked by first-order provers and AF solvers
//!
//! Loose or strict argument drafts are compiled into a validated graph with
//! a closed predicate vocabulary, translated to TPTP, evaluated under
//! grounded/preferred/stable semantics, diagnosed, and repaired with
//! proof-verified suggestions.

pub mod canonicalize;
pub mod compile;
pub mod config;
pub mod core;
pub mod diagnostics;
pub mod draft;
pub mod error;
pub mod executor;
pub mod fol;
pub mod metrics;
pub mod pipeline;
pub mod provers;
pub mod repair;
pub mod semantics;
pub mod soft;
pub mod validate;

pub use crate::core::{Argir, ArgumentGraph, Atom, Edge, Node, Premise, Rule, Statement, Term};
pub use compile::{compile_best_of, compile_draft, compile_soft_ir, Compiled};
pub use config::PipelineConfig;
pub use diagnostics::{diagnose, Diagnosis, Issue, IssueType};
pub use error::{ArgirError, ArgirResult};
pub use pipeline::{Pipeline, PipelineOutput};
pub use provers::{ProverBackend, ProverConfig, ProverKind, ProverStatus};
pub use repair::{apply_patch, Patch, Repair, RepairKind};
pub use semantics::{AfSolver, Semantics};
