// SPDX-FileCopyrightText: 2026 ARGIR Project Team
// SPDX-License-Identifier: PMPL-1.0-or-later

//! First-order translation of argument graphs
//!
//! The graph becomes a [`Problem`]: named axioms plus at most one
//! conjecture, renderable as TPTP FOF lines for any prover backend.

use serde::{Deserialize, Serialize};

pub mod ast;
pub mod tptp;
pub mod translate;

pub use ast::Formula;
pub use translate::{
    choose_goal_node, rule_to_formula, statement_to_formula, support_problem, translate,
    TranslateOptions, Translation,
};

use crate::core::Atom;

/// How rule exceptions are treated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FolMode {
    /// Exceptions are ignored
    Classical,

    /// Each exception atom is negated into the antecedent
    Defeasible,
}

impl std::str::FromStr for FolMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "classical" => Ok(FolMode::Classical),
            "defeasible" => Ok(FolMode::Defeasible),
            _ => Err(anyhow::anyhow!("Unknown FOL mode: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormulaRole {
    Axiom,
    Hypothesis,
    Conjecture,
}

impl FormulaRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            FormulaRole::Axiom => "axiom",
            FormulaRole::Hypothesis => "hypothesis",
            FormulaRole::Conjecture => "conjecture",
        }
    }
}

/// A closed formula with its TPTP name and role
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedFormula {
    pub name: String,
    pub role: FormulaRole,
    pub formula: Formula,
}

impl NamedFormula {
    pub fn axiom(name: impl Into<String>, formula: Formula) -> Self {
        NamedFormula {
            name: name.into(),
            role: FormulaRole::Axiom,
            formula,
        }
    }

    pub fn to_tptp(&self) -> String {
        tptp::fof(&self.name, self.role.as_str(), &self.formula)
    }
}

/// Axioms plus an optional conjecture
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Problem {
    pub axioms: Vec<NamedFormula>,
    pub conjecture: Option<NamedFormula>,
}

impl Problem {
    /// One formula per line, conjecture last
    pub fn to_tptp(&self) -> String {
        let mut out = String::new();
        for line in self.lines() {
            out.push_str(&line);
            out.push('\n');
        }
        out
    }

    pub fn lines(&self) -> Vec<String> {
        self.axioms
            .iter()
            .chain(self.conjecture.iter())
            .map(NamedFormula::to_tptp)
            .collect()
    }

    /// `(name, line)` pairs in emission order
    pub fn named_lines(&self) -> Vec<(String, String)> {
        self.axioms
            .iter()
            .chain(self.conjecture.iter())
            .map(|f| (f.name.clone(), f.to_tptp()))
            .collect()
    }

    /// Same problem with ground hypothesis atoms added as `h1..hn` axioms
    pub fn with_hypotheses(&self, hypotheses: &[Atom]) -> Problem {
        let mut problem = self.clone();
        for (i, atom) in hypotheses.iter().enumerate() {
            problem.axioms.push(NamedFormula {
                name: format!("h{}", i + 1),
                role: FormulaRole::Axiom,
                formula: Formula::literal(atom).close(),
            });
        }
        problem
    }

    /// Same axioms with `$false` as conjecture; a proof means the axioms are inconsistent
    pub fn consistency_check(&self) -> Problem {
        Problem {
            axioms: self.axioms.clone(),
            conjecture: Some(NamedFormula {
                name: "cnt".to_string(),
                role: FormulaRole::Conjecture,
                formula: Formula::False,
            }),
        }
    }
}
