// SPDX-FileCopyrightText: 2026 ARGIR Project Team
// SPDX-License-Identifier: PMPL-1.0-or-later

//! External tool execution
//!
//! Provers and solvers run as child processes with their input piped on
//! stdin and a hard wall-clock limit. Running past the limit kills the child
//! and reports `timed_out` instead of failing.

pub mod process;

pub use process::{resolve_executable, run_tool, ToolOutput};
