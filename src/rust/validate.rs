// SPDX-FileCopyrightText: 2026 ARGIR Project Team
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Schema validation, the lexicon auto-patch, and structural lints
//!
//! Validation never fails: every problem becomes a [`Finding`] with a
//! JSON-path-like locator. Strict mode turns unfixed errors into
//! [`ArgirError::StrictValidation`](crate::error::ArgirError).

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt;
use tracing::debug;

use crate::core::{Argir, ArgumentGraph, Statement};
use crate::error::{ArgirError, ArgirResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// Finding classes reported by the validator, the loader and the lints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingCode {
    MissingLexicon,
    DanglingRef,
    DuplicateId,
    RuleIncomplete,
    ArityClash,
    MultiArityPred,
    EdgeSourceEmpty,
    InferenceMissingRule,
    EdgeKindNormalized,
    DerivabilityGap,
    EdgeMismatch,
}

impl FindingCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            FindingCode::MissingLexicon => "missing_lexicon",
            FindingCode::DanglingRef => "dangling_ref",
            FindingCode::DuplicateId => "duplicate_id",
            FindingCode::RuleIncomplete => "rule_incomplete",
            FindingCode::ArityClash => "arity_clash",
            FindingCode::MultiArityPred => "multi_arity_pred",
            FindingCode::EdgeSourceEmpty => "edge_source_empty",
            FindingCode::InferenceMissingRule => "inference_missing_rule",
            FindingCode::EdgeKindNormalized => "edge_kind_normalized",
            FindingCode::DerivabilityGap => "derivability_gap",
            FindingCode::EdgeMismatch => "edge_mismatch",
        }
    }
}

impl fmt::Display for FindingCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    pub code: FindingCode,
    pub severity: Severity,
    /// JSON-path-like locator, e.g. `graph.nodes[3].conclusion.atoms[0]`
    pub path: String,
    pub message: String,
    #[serde(default)]
    pub fix_applied: bool,
    /// Predicate or node id the finding is about
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
}

impl Finding {
    pub fn error(code: FindingCode, path: impl Into<String>, message: impl Into<String>) -> Self {
        Finding {
            code,
            severity: Severity::Error,
            path: path.into(),
            message: message.into(),
            fix_applied: false,
            subject: None,
        }
    }

    pub fn warning(code: FindingCode, path: impl Into<String>, message: impl Into<String>) -> Self {
        Finding {
            severity: Severity::Warning,
            ..Finding::error(code, path, message)
        }
    }

    pub fn about(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    pub fn is_open_error(&self) -> bool {
        self.severity == Severity::Error && !self.fix_applied
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ValidationReport {
    pub findings: Vec<Finding>,
}

impl ValidationReport {
    /// Unfixed errors
    pub fn errors(&self) -> Vec<&Finding> {
        self.findings.iter().filter(|f| f.is_open_error()).collect()
    }

    /// Unfixed warnings
    pub fn warnings(&self) -> Vec<&Finding> {
        self.findings
            .iter()
            .filter(|f| f.severity == Severity::Warning && !f.fix_applied)
            .collect()
    }

    pub fn error_count(&self) -> usize {
        self.findings.iter().filter(|f| f.is_open_error()).count()
    }

    pub fn is_clean(&self) -> bool {
        self.error_count() == 0
    }

    pub fn extend(&mut self, findings: impl IntoIterator<Item = Finding>) {
        self.findings.extend(findings);
    }

    /// Fail with every unfixed error when `strict` is set
    pub fn enforce_strict(&self, strict: bool) -> ArgirResult<()> {
        if strict && !self.is_clean() {
            return Err(ArgirError::StrictValidation(
                self.errors().into_iter().cloned().collect(),
            ));
        }
        Ok(())
    }
}

/// Every statement of the graph with its locator, in document order
fn statements_with_paths(graph: &ArgumentGraph) -> Vec<(String, &Statement)> {
    let mut out = Vec::new();
    for (ni, node) in graph.nodes.iter().enumerate() {
        for (pi, premise) in node.premises.iter().enumerate() {
            if let Some(stmt) = premise.as_statement() {
                out.push((format!("graph.nodes[{}].premises[{}]", ni, pi), stmt));
            }
        }
        if let Some(rule) = &node.rule {
            for (side, stmts) in [
                ("antecedents", &rule.antecedents),
                ("consequents", &rule.consequents),
                ("exceptions", &rule.exceptions),
            ] {
                for (si, stmt) in stmts.iter().enumerate() {
                    out.push((format!("graph.nodes[{}].rule.{}[{}]", ni, side, si), stmt));
                }
            }
        }
        if let Some(conclusion) = &node.conclusion {
            out.push((format!("graph.nodes[{}].conclusion", ni), conclusion));
        }
    }
    out
}

/// Arities each predicate is used with
pub fn predicate_arities(graph: &ArgumentGraph) -> IndexMap<String, BTreeSet<usize>> {
    let mut usage: IndexMap<String, BTreeSet<usize>> = IndexMap::new();
    for (_, stmt) in statements_with_paths(graph) {
        for atom in &stmt.atoms {
            usage.entry(atom.pred.clone()).or_default().insert(atom.arity());
        }
    }
    usage
}

/// Check lexicon membership, references, rule shape and structural contracts
pub fn validate(argir: &Argir) -> ValidationReport {
    let mut report = ValidationReport::default();
    let graph = &argir.graph;
    let lexicon = argir.lexicon().filter(|l| !l.is_empty());

    if lexicon.is_none() {
        report.findings.push(Finding::error(
            FindingCode::MissingLexicon,
            "metadata.atom_lexicon",
            "atom_lexicon is missing or empty",
        ));
    }

    let empty = IndexMap::new();
    let lex = lexicon.unwrap_or(&empty);
    for (path, stmt) in statements_with_paths(graph) {
        for (ai, atom) in stmt.atoms.iter().enumerate() {
            if !lex.contains_key(&atom.pred) {
                report.findings.push(
                    Finding::error(
                        FindingCode::MissingLexicon,
                        format!("{}.atoms[{}]", path, ai),
                        format!("Predicate '{}' not in atom_lexicon", atom.pred),
                    )
                    .about(&atom.pred),
                );
            }
        }
    }

    if lexicon.is_some() {
        for (pred, arities) in predicate_arities(graph) {
            if arities.len() > 1 && lex.contains_key(&pred) {
                report.findings.push(
                    Finding::error(
                        FindingCode::ArityClash,
                        format!("metadata.atom_lexicon.{}", pred),
                        format!("Predicate '{}' used with arities {:?}", pred, arities),
                    )
                    .about(&pred),
                );
            }
        }
    }

    let mut seen: HashSet<&str> = HashSet::new();
    for (ni, node) in graph.nodes.iter().enumerate() {
        if !seen.insert(node.id.as_str()) {
            report.findings.push(
                Finding::error(
                    FindingCode::DuplicateId,
                    format!("graph.nodes[{}].id", ni),
                    format!("Duplicate node id '{}'", node.id),
                )
                .about(&node.id),
            );
        }
    }

    for (ni, node) in graph.nodes.iter().enumerate() {
        for (pi, premise) in node.premises.iter().enumerate() {
            if let Some(target) = premise.as_ref_target() {
                if !graph.contains(target) {
                    report.findings.push(
                        Finding::error(
                            FindingCode::DanglingRef,
                            format!("graph.nodes[{}].premises[{}]", ni, pi),
                            format!("Unknown ref '{}'", target),
                        )
                        .about(target),
                    );
                }
            }
        }
    }
    for (ei, edge) in graph.edges.iter().enumerate() {
        for (side, id) in [("source", &edge.source), ("target", &edge.target)] {
            if !graph.contains(id) {
                report.findings.push(
                    Finding::error(
                        FindingCode::DanglingRef,
                        format!("graph.edges[{}].{}", ei, side),
                        format!("Unknown node '{}'", id),
                    )
                    .about(id.as_str()),
                );
            }
        }
    }

    report.extend(structural_checks(graph));
    debug!(findings = report.findings.len(), errors = report.error_count(), "Validated graph");
    report
}

/// Edge participants carry content, rules are complete, derivations cite a rule
pub fn structural_checks(graph: &ArgumentGraph) -> Vec<Finding> {
    let mut out = Vec::new();
    let in_edges: HashSet<&str> = graph
        .edges
        .iter()
        .flat_map(|e| [e.source.as_str(), e.target.as_str()])
        .collect();
    let rule_nodes: HashSet<&str> = graph
        .nodes
        .iter()
        .filter(|n| n.rule.is_some())
        .map(|n| n.id.as_str())
        .collect();

    for (ni, node) in graph.nodes.iter().enumerate() {
        if in_edges.contains(node.id.as_str()) && node.rule.is_none() && !node.has_conclusion() {
            out.push(
                Finding::error(
                    FindingCode::EdgeSourceEmpty,
                    format!("graph.nodes[{}]", ni),
                    "Node participates in an edge but has neither conclusion atoms nor a rule",
                )
                .about(&node.id),
            );
        }
        if let Some(rule) = &node.rule {
            if !rule.is_complete() {
                out.push(
                    Finding::error(
                        FindingCode::RuleIncomplete,
                        format!("graph.nodes[{}].rule", ni),
                        "Rule needs at least one antecedent atom and one consequent atom",
                    )
                    .about(&node.id),
                );
            }
        }
        if !node.premises.is_empty() && node.has_conclusion() {
            let bridged = node.rule.is_some() || node.ref_targets().any(|t| rule_nodes.contains(t));
            if !bridged {
                out.push(
                    Finding::error(
                        FindingCode::InferenceMissingRule,
                        format!("graph.nodes[{}]", ni),
                        "Derived conclusion lacks a rule or a Ref to a rule node",
                    )
                    .about(&node.id),
                );
            }
        }
    }
    out
}

/// Infer the lexicon from usage when it is entirely absent
///
/// Only single-arity predicates are added; ambiguous ones become
/// `multi_arity_pred` warnings. Once a lexicon is written every
/// `missing_lexicon` finding counts as fixed, ambiguous predicates included.
/// Returns whether a lexicon was written.
pub fn patch_missing_lexicon(report: &mut ValidationReport, argir: &mut Argir) -> bool {
    if argir.lexicon().is_some_and(|l| !l.is_empty()) {
        return false;
    }

    let mut lexicon: IndexMap<String, Vec<String>> = IndexMap::new();
    for (pred, arities) in predicate_arities(&argir.graph) {
        if arities.len() == 1 {
            lexicon.insert(pred.clone(), vec![pred]);
        } else {
            report.findings.push(
                Finding::warning(
                    FindingCode::MultiArityPred,
                    format!("metadata.atom_lexicon.{}", pred),
                    format!("Predicate {} used with multiple arities: {:?}", pred, arities),
                )
                .about(&pred),
            );
        }
    }
    if lexicon.is_empty() {
        return false;
    }

    for finding in report
        .findings
        .iter_mut()
        .filter(|f| f.code == FindingCode::MissingLexicon)
    {
        finding.fix_applied = true;
    }
    debug!(predicates = lexicon.len(), "Patched missing lexicon");
    argir.metadata.atom_lexicon = Some(lexicon);
    true
}

/// Validate, auto-patch the lexicon, and apply the strict-mode gate
pub fn validate_and_patch(argir: &mut Argir, strict: bool) -> ArgirResult<ValidationReport> {
    let mut report = validate(argir);
    patch_missing_lexicon(&mut report, argir);
    report.enforce_strict(strict)?;
    Ok(report)
}

/// Lightweight structural lints
pub fn lint(graph: &ArgumentGraph) -> Vec<Finding> {
    let mut out = Vec::new();
    let rule_nodes: HashSet<&str> = graph
        .nodes
        .iter()
        .filter(|n| n.rule.is_some())
        .map(|n| n.id.as_str())
        .collect();

    for (ni, node) in graph.nodes.iter().enumerate() {
        if node.premises.is_empty() {
            continue;
        }
        let has_conclusion = node
            .conclusion
            .as_ref()
            .is_some_and(|c| !c.text.trim().is_empty() || c.has_atoms());
        let has_rule =
            node.rule.is_some() || node.ref_targets().any(|t| rule_nodes.contains(t));
        let message = if !has_conclusion {
            "Premises present but conclusion missing"
        } else if !has_rule {
            "Premises and conclusion present but rule missing"
        } else {
            continue;
        };
        out.push(
            Finding::warning(FindingCode::DerivabilityGap, format!("graph.nodes[{}]", ni), message)
                .about(&node.id),
        );
    }

    for (ei, edge) in graph.edges.iter().enumerate() {
        let rationale = edge.rationale.as_deref().unwrap_or_default().to_lowercase();
        let reads_as_attack = ["refute", "contradict", "however"]
            .iter()
            .any(|w| rationale.contains(w));
        if reads_as_attack && edge.is_support() {
            out.push(
                Finding::warning(
                    FindingCode::EdgeMismatch,
                    format!("graph.edges[{}]", ei),
                    "Edge rationale suggests attack but typed as support",
                )
                .about(format!("{}->{}", edge.source, edge.target)),
            );
        }
    }
    out
}

/// Count findings per code, for logs and summaries
pub fn tally(findings: &[Finding]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for f in findings {
        *counts.entry(f.code.to_string()).or_insert(0) += 1;
    }
    counts
}

/// Predicates mentioned anywhere in the graph, in first-use order
pub fn used_predicates(graph: &ArgumentGraph) -> IndexSet<String> {
    predicate_arities(graph).into_keys().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Atom, Edge, Node, NodeRef, Premise, Rule, Term};
    use pretty_assertions::assert_eq;

    fn stmt(pred: &str, args: &[&str]) -> Statement {
        Statement::new(
            pred,
            vec![Atom::new(pred, args.iter().map(|a| Term::constant(*a)).collect())],
        )
    }

    fn rule(ants: Vec<Statement>, cons: Vec<Statement>) -> Rule {
        Rule {
            name: "r".into(),
            strict: false,
            antecedents: ants,
            consequents: cons,
            exceptions: vec![],
            scheme: None,
            span: None,
            rationale: None,
        }
    }

    fn sample() -> Argir {
        let graph = ArgumentGraph {
            nodes: vec![
                Node::new("R1").with_rule(rule(vec![stmt("man", &["X"])], vec![stmt("mortal", &["X"])])),
                Node::new("P1").with_conclusion(stmt("man", &["socrates"])),
                Node::new("C1")
                    .with_premise(Premise::Ref(NodeRef::new("R1")))
                    .with_premise(Premise::Ref(NodeRef::new("P1")))
                    .with_conclusion(stmt("mortal", &["socrates"])),
            ],
            edges: vec![Edge::support("P1", "C1"), Edge::support("R1", "C1")],
        };
        Argir::new("", graph)
    }

    #[test]
    fn test_missing_lexicon_is_patched() {
        let mut argir = sample();
        let report = validate_and_patch(&mut argir, true).unwrap();
        assert!(report.is_clean());
        let lex = argir.lexicon().unwrap();
        assert_eq!(lex.keys().cloned().collect::<Vec<_>>(), vec!["man", "mortal"]);
        assert!(report.findings.iter().all(|f| f.fix_applied));
    }

    #[test]
    fn test_multi_arity_not_patched() {
        let mut argir = sample();
        argir.graph.nodes[1].conclusion = Some(stmt("man", &["socrates", "athens"]));
        let report = validate_and_patch(&mut argir, false).unwrap();
        assert!(!argir.lexicon().unwrap().contains_key("man"));
        assert!(report
            .warnings()
            .iter()
            .any(|f| f.code == FindingCode::MultiArityPred));
        assert!(report
            .findings
            .iter()
            .filter(|f| f.code == FindingCode::MissingLexicon)
            .all(|f| f.fix_applied));
        assert!(report.is_clean());
    }

    #[test]
    fn test_multi_arity_passes_strict_gate() {
        let mut argir = sample();
        argir.graph.nodes[1].conclusion = Some(stmt("man", &["socrates", "athens"]));
        let report = validate_and_patch(&mut argir, true).unwrap();
        let lex = argir.lexicon().unwrap();
        assert_eq!(lex.keys().cloned().collect::<Vec<_>>(), vec!["mortal"]);
        let ambiguous: Vec<&Finding> = report
            .warnings()
            .into_iter()
            .filter(|f| f.code == FindingCode::MultiArityPred)
            .collect();
        assert_eq!(ambiguous.len(), 1);
        assert_eq!(ambiguous[0].subject.as_deref(), Some("man"));
    }

    #[test]
    fn test_dangling_refs_and_strict_gate() {
        let mut argir = sample();
        argir.graph.edges.push(Edge::support("ghost", "C1"));
        let err = validate_and_patch(&mut argir, true).unwrap_err();
        match err {
            ArgirError::StrictValidation(findings) => {
                assert_eq!(findings.len(), 1);
                assert_eq!(findings[0].code, FindingCode::DanglingRef);
                assert_eq!(findings[0].path, "graph.edges[2].source");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_structural_checks() {
        let graph = ArgumentGraph {
            nodes: vec![
                Node::new("R1").with_rule(rule(vec![], vec![stmt("q", &[])])),
                Node::new("N1")
                    .with_premise(Premise::Stmt(stmt("p", &[])))
                    .with_conclusion(stmt("q", &[])),
                Node::new("E1"),
            ],
            edges: vec![Edge::support("E1", "N1")],
        };
        let codes: Vec<FindingCode> = structural_checks(&graph).iter().map(|f| f.code).collect();
        assert_eq!(
            codes,
            vec![
                FindingCode::RuleIncomplete,
                FindingCode::InferenceMissingRule,
                FindingCode::EdgeSourceEmpty
            ]
        );
    }

    #[test]
    fn test_lints() {
        let graph = ArgumentGraph {
            nodes: vec![
                Node::new("a").with_premise(Premise::Stmt(stmt("p", &[]))),
                Node::new("b")
                    .with_premise(Premise::Stmt(stmt("p", &[])))
                    .with_conclusion(stmt("q", &[])),
            ],
            edges: vec![Edge::support("a", "b").with_rationale("However, this fails")],
        };
        let found = lint(&graph);
        assert_eq!(found.len(), 3);
        assert_eq!(found[0].message, "Premises present but conclusion missing");
        assert_eq!(found[2].code, FindingCode::EdgeMismatch);
        assert_eq!(tally(&found).get("derivability_gap"), Some(&2));
    }
}
