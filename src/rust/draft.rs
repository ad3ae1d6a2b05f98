// SPDX-FileCopyrightText: 2026 ARGIR Project Team
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Tolerant loader for strict-schema drafts
//!
//! Drafts come from an untrusted producer. Structure that cannot be read at
//! all is a [`ArgirError::Schema`]; everything else is coerced into the
//! canonical model and any coercion worth knowing about becomes a warning.

use indexmap::IndexMap;
use serde_json::{Map, Value};
use std::collections::HashSet;
use tracing::debug;

use crate::core::{
    Argir, ArgumentGraph, Atom, AttackKind, Edge, EdgeKind, Metadata, Node, NodeRef, Premise,
    Quantifier, QuantifierKind, Rule, Statement, Term, TextSpan, ARGIR_VERSION,
};
use crate::error::{ArgirError, ArgirResult};
use crate::validate::{Finding, FindingCode};

/// A loaded draft with the warnings raised while coercing it
#[derive(Debug, Clone)]
pub struct LoadedDraft {
    pub argir: Argir,
    pub warnings: Vec<Finding>,
}

fn as_text(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn opt_string(obj: &Map<String, Value>, key: &str) -> Option<String> {
    obj.get(key).and_then(as_text).filter(|s| !s.is_empty())
}

/// Numbers, numeric strings and percentages; null-ish strings are absent
pub fn parse_confidence(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let s = s.trim().to_lowercase();
            if s.is_empty() || ["unknown", "n/a", "na", "none", "null"].contains(&s.as_str()) {
                return None;
            }
            match s.strip_suffix('%') {
                Some(pct) => pct.trim().parse::<f64>().ok().map(|p| p / 100.0),
                None => s.parse::<f64>().ok(),
            }
        }
        _ => None,
    }
}

/// Clip a span to the source text, counted in characters
fn clip_span(v: &Value, source: &str) -> Option<TextSpan> {
    let obj = v.as_object()?;
    let len = source.chars().count();
    let bound = |key: &str| {
        obj.get(key)
            .and_then(Value::as_i64)
            .unwrap_or(0)
            .max(0) as usize
    };
    let start = bound("start").min(len);
    let end = bound("end").min(len).max(start);
    let text = opt_string(obj, "text")
        .unwrap_or_else(|| source.chars().skip(start).take(end - start).collect());
    Some(TextSpan { start, end, text: Some(text) })
}

fn parse_term(v: &Value) -> Option<Term> {
    match v {
        Value::String(s) => Some(Term::constant(s.clone())),
        Value::Object(obj) => {
            let name = opt_string(obj, "name").or_else(|| opt_string(obj, "value"))?;
            match obj.get("kind").and_then(Value::as_str) {
                Some("Var") | Some("var") => Some(Term::var(name)),
                _ => Some(Term::constant(name)),
            }
        }
        Value::Number(n) => Some(Term::constant(n.to_string())),
        _ => None,
    }
}

fn parse_atom(v: &Value) -> Option<Atom> {
    match v {
        Value::Object(obj) => {
            let pred = opt_string(obj, "pred")?;
            let args = obj
                .get("args")
                .and_then(Value::as_array)
                .map(|a| a.iter().filter_map(parse_term).collect())
                .unwrap_or_default();
            let mut atom = Atom::new(pred, args);
            atom.negated = obj.get("negated").and_then(Value::as_bool).unwrap_or(false);
            Some(atom)
        }
        Value::String(s) if !s.trim().is_empty() => Some(Atom::new(s.trim(), vec![])),
        _ => None,
    }
}

pub(crate) fn parse_quantifier(v: &Value) -> Option<Quantifier> {
    let obj = v.as_object()?;
    let var = opt_string(obj, "var")?;
    let kind = match obj.get("kind").and_then(Value::as_str)? {
        "forall" => QuantifierKind::Forall,
        "exists" => QuantifierKind::Exists,
        _ => return None,
    };
    Some(Quantifier {
        kind,
        var,
        sort: opt_string(obj, "sort"),
    })
}

fn parse_statement(v: &Value, source: &str) -> Statement {
    let Some(obj) = v.as_object() else {
        return Statement::new(as_text(v).unwrap_or_default(), vec![]);
    };
    let list = |key: &str| obj.get(key).and_then(Value::as_array).cloned().unwrap_or_default();
    Statement {
        text: opt_string(obj, "text").unwrap_or_default(),
        atoms: list("atoms").iter().filter_map(parse_atom).collect(),
        quantifiers: list("quantifiers").iter().filter_map(parse_quantifier).collect(),
        span: obj.get("span").and_then(|s| clip_span(s, source)),
        rationale: opt_string(obj, "rationale"),
        confidence: obj.get("confidence").and_then(parse_confidence),
    }
}

fn parse_statements(v: Option<&Value>, source: &str) -> Vec<Statement> {
    v.and_then(Value::as_array)
        .map(|a| a.iter().map(|s| parse_statement(s, source)).collect())
        .unwrap_or_default()
}

fn parse_rule(v: &Value, source: &str) -> Option<Rule> {
    let obj = v.as_object()?;
    Some(Rule {
        name: opt_string(obj, "name").unwrap_or_else(|| "r".to_string()),
        strict: obj.get("strict").and_then(Value::as_bool).unwrap_or(false),
        antecedents: parse_statements(obj.get("antecedents"), source),
        consequents: parse_statements(obj.get("consequents"), source),
        exceptions: parse_statements(obj.get("exceptions"), source),
        scheme: opt_string(obj, "scheme"),
        span: obj.get("span").and_then(|s| clip_span(s, source)),
        rationale: opt_string(obj, "rationale"),
    })
}

fn parse_premise(v: &Value, ids: &HashSet<String>, source: &str) -> Premise {
    match v {
        Value::String(s) if ids.contains(s) => Premise::Ref(NodeRef::new(s.clone())),
        Value::Object(obj) if obj.get("kind").and_then(Value::as_str) == Some("Ref") => {
            match opt_string(obj, "ref") {
                Some(target) => Premise::Ref(NodeRef {
                    target,
                    note: opt_string(obj, "note"),
                }),
                None => Premise::Stmt(Statement::default()),
            }
        }
        other => Premise::Stmt(parse_statement(other, source)),
    }
}

/// Lexicon from `atom_lexicon`, or `symbols.predicates` as an alias
fn extract_lexicon(meta: &Map<String, Value>) -> Option<IndexMap<String, Vec<String>>> {
    let raw = meta
        .get("atom_lexicon")
        .filter(|v| v.as_object().is_some_and(|o| !o.is_empty()))
        .or_else(|| {
            meta.get("symbols")
                .and_then(|s| s.get("predicates"))
                .filter(|v| v.as_object().is_some_and(|o| !o.is_empty()))
        })?;
    let lexicon = raw
        .as_object()?
        .iter()
        .map(|(key, examples)| {
            let examples = match examples {
                Value::Array(items) => items.iter().filter_map(as_text).collect(),
                other => as_text(other).into_iter().collect(),
            };
            (key.clone(), examples)
        })
        .collect();
    Some(lexicon)
}

fn parse_metadata(v: Option<&Value>) -> Metadata {
    let Some(obj) = v.and_then(Value::as_object) else {
        return Metadata::default();
    };
    let mut metadata = Metadata {
        atom_lexicon: extract_lexicon(obj),
        goal_id: opt_string(obj, "goal_id"),
        ..Default::default()
    };
    for (key, value) in obj {
        if !matches!(key.as_str(), "atom_lexicon" | "goal_id" | "id_map" | "implicit_rules_synthesized") {
            metadata.extra.insert(key.clone(), value.clone());
        }
    }
    metadata
}

/// Load a strict-schema draft from parsed JSON
pub fn load_strict_draft(draft: &Value) -> ArgirResult<LoadedDraft> {
    let root = draft
        .as_object()
        .ok_or_else(|| ArgirError::Schema("draft must be a JSON object".into()))?;
    let graph = root
        .get("graph")
        .and_then(Value::as_object)
        .ok_or_else(|| ArgirError::Schema("draft has no graph object".into()))?;
    let raw_nodes = match graph.get("nodes") {
        Some(Value::Array(nodes)) => nodes.as_slice(),
        None | Some(Value::Null) => &[],
        Some(_) => return Err(ArgirError::Schema("graph.nodes must be an array".into())),
    };
    let raw_edges = match graph.get("edges") {
        Some(Value::Array(edges)) => edges.as_slice(),
        None | Some(Value::Null) => &[],
        Some(_) => return Err(ArgirError::Schema("graph.edges must be an array".into())),
    };

    let source = root
        .get("source_text")
        .or_else(|| root.get("text"))
        .and_then(as_text)
        .unwrap_or_default();
    let mut warnings = Vec::new();

    let mut ids: Vec<String> = Vec::with_capacity(raw_nodes.len());
    let mut seen: HashSet<String> = HashSet::new();
    for (i, raw) in raw_nodes.iter().enumerate() {
        let mut id = raw
            .get("id")
            .and_then(as_text)
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| format!("n{}", i));
        if seen.contains(&id) {
            warnings.push(
                Finding::warning(
                    FindingCode::DuplicateId,
                    format!("graph.nodes[{}].id", i),
                    format!("Duplicate node id '{}' renamed to '{}_{}'", id, id, i),
                )
                .about(&id),
            );
            id = format!("{}_{}", id, i);
        }
        seen.insert(id.clone());
        ids.push(id);
    }

    let mut nodes = Vec::with_capacity(raw_nodes.len());
    for (raw, id) in raw_nodes.iter().zip(ids) {
        let Some(obj) = raw.as_object() else {
            return Err(ArgirError::Schema(format!("node '{}' is not an object", id)));
        };
        let premises = obj
            .get("premises")
            .and_then(Value::as_array)
            .map(|ps| ps.iter().map(|p| parse_premise(p, &seen, &source)).collect())
            .unwrap_or_default();
        nodes.push(Node {
            id,
            premises,
            rule: obj.get("rule").and_then(|r| parse_rule(r, &source)),
            conclusion: match obj.get("conclusion") {
                None | Some(Value::Null) => None,
                Some(c) => Some(parse_statement(c, &source)),
            },
            span: obj.get("span").and_then(|s| clip_span(s, &source)),
            rationale: opt_string(obj, "rationale"),
        });
    }

    let mut edges = Vec::with_capacity(raw_edges.len());
    for (i, raw) in raw_edges.iter().enumerate() {
        let Some(obj) = raw.as_object() else {
            return Err(ArgirError::Schema(format!("graph.edges[{}] is not an object", i)));
        };
        let kind = match obj.get("kind").and_then(Value::as_str).unwrap_or("support") {
            "support" => EdgeKind::Support,
            "attack" => EdgeKind::Attack,
            other => {
                warnings.push(Finding::warning(
                    FindingCode::EdgeKindNormalized,
                    format!("graph.edges[{}].kind", i),
                    format!("Edge kind '{}' normalized to support", other),
                ));
                EdgeKind::Support
            }
        };
        let attack_kind = obj
            .get("attack_kind")
            .and_then(Value::as_str)
            .and_then(|k| k.parse::<AttackKind>().ok());
        let mut edge = Edge {
            source: opt_string(obj, "source").unwrap_or_default(),
            target: opt_string(obj, "target").unwrap_or_default(),
            kind,
            attack_kind,
            rationale: opt_string(obj, "rationale"),
        };
        edge.normalize();
        edges.push(edge);
    }

    let mut metadata = parse_metadata(root.get("metadata"));
    if metadata.goal_id.is_none() {
        metadata.goal_id = opt_string(root, "goal_id");
    }

    let argir = Argir {
        version: opt_string(root, "version").unwrap_or_else(|| ARGIR_VERSION.to_string()),
        source_text: source,
        graph: ArgumentGraph { nodes, edges },
        metadata,
    };
    debug!(
        nodes = argir.graph.nodes.len(),
        edges = argir.graph.edges.len(),
        warnings = warnings.len(),
        "Loaded strict draft"
    );
    Ok(LoadedDraft { argir, warnings })
}

/// Parse and load a strict-schema draft from text
pub fn load_strict_draft_str(json: &str) -> ArgirResult<LoadedDraft> {
    let value: Value = serde_json::from_str(json)
        .map_err(|e| ArgirError::Schema(format!("draft is not valid JSON: {}", e)))?;
    load_strict_draft(&value)
}
