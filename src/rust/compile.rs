// SPDX-FileCopyrightText: 2026 ARGIR Project Team
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Soft-to-strict compiler
//!
//! Ids are assigned by role, predicates are canonicalized through a fresh
//! [`AtomTable`], inferences without a rule get a synthesized defeasible
//! rule node, and every `Ref` premise gains a matching support edge.
//! Output order follows input order, so compiling the same document twice
//! gives byte-identical JSON.

use indexmap::IndexMap;
use tracing::{debug, info, warn};

use crate::canonicalize::AtomTable;
use crate::config::CompileOptions;
use crate::core::{
    Argir, ArgumentGraph, Atom, AttackKind, Edge, EdgeKind, Metadata, Node, NodeRef, Premise,
    Rule, Statement, Term, TextSpan, ARGIR_VERSION,
};
use crate::draft::{load_strict_draft, parse_quantifier};
use crate::error::{ArgirError, ArgirResult};
use crate::soft::{Draft, Polarity, SoftIr, SoftNode, SoftPremise, SoftSpan, SoftStatement};
use crate::validate::{patch_missing_lexicon, validate, Finding, FindingCode, ValidationReport};

/// Name given to rules synthesized for rule-less inferences
pub const IMPLICIT_RULE_NAME: &str = "implicit_inference";

/// Name given to declared rules that arrive without one
pub const DEFAULT_RULE_NAME: &str = "Conditional";

/// A compiled, validated document
#[derive(Debug, Clone)]
pub struct Compiled {
    pub argir: Argir,
    pub report: ValidationReport,
}

/// Variables are X, Y, Z, W, U or V with an optional numeric suffix
pub fn is_variable_token(token: &str) -> bool {
    let mut chars = token.chars();
    matches!(chars.next(), Some('X' | 'Y' | 'Z' | 'W' | 'U' | 'V'))
        && chars.all(|c| c.is_ascii_digit())
}

fn make_term(token: &str) -> Term {
    if is_variable_token(token) {
        Term::var(token)
    } else {
        Term::constant(token)
    }
}

fn convert_span(span: &SoftSpan) -> TextSpan {
    let start = span.start.unwrap_or(0);
    TextSpan {
        start,
        end: span.end.unwrap_or(start).max(start),
        text: span.text.clone(),
    }
}

fn canon_statement(stmt: &SoftStatement, table: &mut AtomTable) -> Statement {
    let key = table.propose(&stmt.pred, stmt.args.len());
    canon_with_key(stmt, &stmt.pred, key)
}

fn canon_with_key(stmt: &SoftStatement, text: &str, key: String) -> Statement {
    let mut atom = Atom::new(key, stmt.args.iter().map(|t| make_term(t.value())).collect());
    atom.negated = stmt.polarity == Polarity::Neg;
    Statement {
        text: text.to_string(),
        atoms: vec![atom],
        quantifiers: stmt
            .quantifiers
            .iter()
            .flatten()
            .filter_map(parse_quantifier)
            .collect(),
        span: stmt.span.as_ref().map(convert_span),
        ..Default::default()
    }
}

/// "x and y" into its parts, when there are between two and `cap` of them
fn split_conjunction(surface: &str, cap: usize) -> Option<Vec<String>> {
    let lowered = surface.to_lowercase();
    let parts: Vec<String> = lowered
        .split(" and ")
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .collect();
    (parts.len() >= 2 && parts.len() <= cap).then_some(parts)
}

/// Fill empty rule sides from the node itself; drop rules that stay incomplete
fn complete_rules(nodes: &[SoftNode]) -> (Vec<SoftNode>, Vec<Finding>) {
    let mut findings = Vec::new();
    let nodes = nodes
        .iter()
        .enumerate()
        .map(|(i, node)| {
            let mut node = node.clone();
            let Some(rule) = node.rule.as_mut() else {
                return node;
            };
            if rule.consequents.is_empty() {
                if let Some(conclusion) = &node.conclusion {
                    rule.consequents.push(conclusion.clone());
                }
            }
            if rule.antecedents.is_empty() {
                rule.antecedents = node
                    .premises
                    .iter()
                    .filter_map(|p| match p {
                        SoftPremise::Stmt(s) => Some(s.clone()),
                        SoftPremise::Ref(_) => None,
                    })
                    .collect();
            }
            if rule.antecedents.is_empty() || rule.consequents.is_empty() {
                let mut finding = Finding::warning(
                    FindingCode::RuleIncomplete,
                    format!("graph.nodes[{}].rule", i),
                    "Rule without antecedents or consequents dropped",
                );
                finding.fix_applied = true;
                findings.push(finding.about(node.id.clone().unwrap_or_default()));
                node.rule = None;
            }
            node
        })
        .collect();
    (nodes, findings)
}

/// Role-based ids: `R#` for rules, `C#` for bare conclusions, `P#` otherwise
fn assign_ids(nodes: &[SoftNode]) -> (Vec<String>, IndexMap<String, String>, usize) {
    let (mut r, mut c, mut p) = (0usize, 0usize, 0usize);
    let mut ids = Vec::with_capacity(nodes.len());
    let mut id_map = IndexMap::new();
    for node in nodes {
        let new = if node.rule.is_some() {
            r += 1;
            format!("R{}", r)
        } else if node.conclusion.is_some() && node.premises.is_empty() {
            c += 1;
            format!("C{}", c)
        } else {
            p += 1;
            format!("P{}", p)
        };
        if let Some(old) = node.id.as_ref().filter(|s| !s.is_empty()) {
            id_map.entry(old.clone()).or_insert_with(|| new.clone());
        }
        ids.push(new);
    }
    (ids, id_map, r)
}

fn remap(id_map: &IndexMap<String, String>, id: &str) -> String {
    id_map.get(id).cloned().unwrap_or_else(|| id.to_string())
}

/// Compile a soft document with a fresh atom table
pub fn compile_soft_ir(
    soft: &SoftIr,
    options: &CompileOptions,
    goal_override: Option<&str>,
) -> Compiled {
    let mut table = AtomTable::new();
    let (soft_nodes, mut findings) = complete_rules(&soft.graph.nodes);
    let (ids, id_map, mut rule_counter) = assign_ids(&soft_nodes);

    let mut nodes: Vec<Node> = Vec::with_capacity(soft_nodes.len());
    for (soft_node, id) in soft_nodes.iter().zip(&ids) {
        let mut node = Node::new(id.clone());
        if let Some(rule) = &soft_node.rule {
            let mut canon_all = |stmts: &[SoftStatement]| -> Vec<Statement> {
                stmts.iter().map(|s| canon_statement(s, &mut table)).collect()
            };
            let antecedents = canon_all(&rule.antecedents);
            let consequents = canon_all(&rule.consequents);
            let exceptions = canon_all(&rule.exceptions);
            node.rule = Some(Rule {
                name: rule.name.clone().unwrap_or_else(|| DEFAULT_RULE_NAME.to_string()),
                strict: rule.strict,
                antecedents,
                consequents,
                exceptions,
                scheme: rule.scheme.clone(),
                span: None,
                rationale: None,
            });
        }
        if let Some(conclusion) = &soft_node.conclusion {
            node.conclusion = Some(canon_statement(conclusion, &mut table));
        }
        for premise in &soft_node.premises {
            node.premises.push(match premise {
                SoftPremise::Ref(r) => Premise::Ref(NodeRef::new(remap(&id_map, &r.target))),
                SoftPremise::Stmt(s) => Premise::Stmt(canon_statement(s, &mut table)),
            });
        }
        node.span = soft_node.span.as_ref().map(convert_span);
        node.rationale = soft_node.rationale.clone();
        nodes.push(node);
    }

    let mut implicit_rules = Vec::new();
    for (node, soft_node) in nodes.iter_mut().zip(&soft_nodes) {
        let has_stmt_premise = node.statement_premises().next().is_some();
        let has_ref = node.ref_targets().next().is_some();
        let Some(conclusion) = node.conclusion.clone() else {
            continue;
        };
        if !has_stmt_premise || has_ref || node.rule.is_some() {
            continue;
        }

        let mut antecedents = Vec::new();
        for (premise, soft_premise) in node.premises.iter().zip(&soft_node.premises) {
            let (Premise::Stmt(stmt), SoftPremise::Stmt(soft_stmt)) = (premise, soft_premise) else {
                continue;
            };
            let parts = options
                .split_conjunctions
                .then(|| split_conjunction(&soft_stmt.pred, options.conjunction_cap))
                .flatten();
            match parts {
                Some(parts) => {
                    for part in parts {
                        let key = table.propose(&part, soft_stmt.args.len());
                        antecedents.push(canon_with_key(soft_stmt, &part, key));
                    }
                }
                None => antecedents.push(stmt.clone()),
            }
        }

        rule_counter += 1;
        let rule_id = format!("R{}", rule_counter);
        debug!(node = %node.id, rule = %rule_id, "Synthesized implicit rule");
        let mut rule_node = Node::new(rule_id.clone()).with_rule(Rule {
            name: IMPLICIT_RULE_NAME.to_string(),
            strict: false,
            antecedents,
            consequents: vec![conclusion],
            exceptions: vec![],
            scheme: None,
            span: None,
            rationale: None,
        });
        rule_node.rationale = Some(format!("Implicit rule for inference in node {}", node.id));
        node.premises.insert(0, Premise::Ref(NodeRef::new(rule_id)));
        implicit_rules.push(rule_node);
    }
    let synthesized = !implicit_rules.is_empty();
    nodes.extend(implicit_rules);

    let mut edges = Vec::with_capacity(soft.graph.edges.len());
    for (i, e) in soft.graph.edges.iter().enumerate() {
        let kind = match e.kind.trim().to_lowercase().as_str() {
            "support" => EdgeKind::Support,
            "attack" => EdgeKind::Attack,
            other => {
                findings.push(Finding::warning(
                    FindingCode::EdgeKindNormalized,
                    format!("graph.edges[{}].kind", i),
                    format!("Edge kind '{}' normalized to support", other),
                ));
                EdgeKind::Support
            }
        };
        let mut edge = Edge {
            source: remap(&id_map, &e.source),
            target: remap(&id_map, &e.target),
            kind,
            attack_kind: e.attack_kind.as_deref().and_then(|k| k.parse::<AttackKind>().ok()),
            rationale: e.rationale.clone(),
        };
        edge.normalize();
        edges.push(edge);
    }

    let mut graph = ArgumentGraph { nodes, edges };
    let mut ref_edges = Vec::new();
    for node in &graph.nodes {
        for target in node.ref_targets() {
            let edge = Edge::support(target, node.id.clone());
            if !graph.has_edge(target, &node.id, EdgeKind::Support) && !ref_edges.contains(&edge) {
                ref_edges.push(edge);
            }
        }
    }
    graph.edges.extend(ref_edges);

    let declared_goal = soft
        .goal
        .as_ref()
        .map(|g| g.node_id.clone())
        .or_else(|| {
            soft.metadata
                .get("goal_id")
                .and_then(|v| v.as_str())
                .map(str::to_string)
        });
    let goal_id = goal_override
        .map(str::to_string)
        .or(declared_goal)
        .map(|g| remap(&id_map, &g));

    let lexicon = table.to_lexicon();
    let mut metadata = Metadata {
        atom_lexicon: (!lexicon.is_empty()).then_some(lexicon),
        goal_id,
        implicit_rules_synthesized: synthesized,
        id_map,
        ..Default::default()
    };
    for (key, value) in &soft.metadata {
        if !matches!(
            key.as_str(),
            "atom_lexicon" | "goal_id" | "id_map" | "implicit_rules_synthesized"
        ) {
            metadata.extra.insert(key.clone(), value.clone());
        }
    }

    let mut argir = Argir {
        version: if soft.version.is_empty() {
            ARGIR_VERSION.to_string()
        } else {
            soft.version.clone()
        },
        source_text: soft.source_text.clone(),
        graph,
        metadata,
    };

    let mut report = validate(&argir);
    patch_missing_lexicon(&mut report, &mut argir);
    findings.append(&mut report.findings);
    report.findings = findings;

    info!(
        nodes = argir.graph.nodes.len(),
        edges = argir.graph.edges.len(),
        predicates = table.len(),
        errors = report.error_count(),
        "Compiled soft IR"
    );
    Compiled { argir, report }
}

/// Load and validate a strict draft
pub fn compile_strict(draft: &serde_json::Value, goal_override: Option<&str>) -> ArgirResult<Compiled> {
    let loaded = load_strict_draft(draft)?;
    let mut argir = loaded.argir;
    if let Some(goal) = goal_override {
        argir.metadata.goal_id = Some(remap(&argir.metadata.id_map, goal));
    }
    let mut report = validate(&argir);
    patch_missing_lexicon(&mut report, &mut argir);
    let mut findings = loaded.warnings;
    findings.append(&mut report.findings);
    report.findings = findings;
    Ok(Compiled { argir, report })
}

/// Compile either kind of draft
pub fn compile_draft(
    draft: &Draft,
    options: &CompileOptions,
    goal_override: Option<&str>,
) -> ArgirResult<Compiled> {
    match draft {
        Draft::Soft(soft) => Ok(compile_soft_ir(soft, options, goal_override)),
        Draft::Strict(value) => compile_strict(value, goal_override),
    }
}

/// Compile candidate drafts in order and keep the one with the fewest errors
///
/// Stops at the first error-free candidate. Ties keep the earlier sample.
pub fn compile_best_of(
    samples: &[serde_json::Value],
    options: &CompileOptions,
    goal_override: Option<&str>,
) -> ArgirResult<Compiled> {
    let mut best: Option<(usize, Compiled)> = None;
    let mut last_error = String::from("no samples given");

    for (i, sample) in samples.iter().enumerate() {
        let compiled = Draft::detect(sample.clone())
            .and_then(|draft| compile_draft(&draft, options, goal_override));
        match compiled {
            Ok(compiled) => {
                let errors = compiled.report.error_count();
                debug!(sample = i, errors, "Compiled candidate draft");
                if errors == 0 {
                    info!(sample = i, "Error-free draft found");
                    return Ok(compiled);
                }
                if best.as_ref().map_or(true, |(fewest, _)| errors < *fewest) {
                    best = Some((errors, compiled));
                }
            }
            Err(e) => {
                warn!(sample = i, error = %e, "Candidate draft unusable");
                last_error = e.to_string();
            }
        }
    }

    best.map(|(_, compiled)| compiled)
        .ok_or(ArgirError::NoUsableSample {
            attempts: samples.len(),
            last_error,
        })
}
