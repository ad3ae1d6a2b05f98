// SPDX-FileCopyrightText: 2026 ARGIR Project Team
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Core data model for the strict argument graph (ARGIR)
//!
//! Every type here round-trips through serde_json in the canonical output
//! shape: premises and terms are internally tagged by `kind`, optional
//! fields are omitted when absent.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Current ARGIR document version
pub const ARGIR_VERSION: &str = "0.3.3";

/// A term in an atom's argument list
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Term {
    /// Universally or existentially bound variable
    Var { name: String },

    /// Ground individual
    Const { name: String },
}

impl Term {
    pub fn var(name: impl Into<String>) -> Self {
        Term::Var { name: name.into() }
    }

    pub fn constant(name: impl Into<String>) -> Self {
        Term::Const { name: name.into() }
    }

    pub fn name(&self) -> &str {
        match self {
            Term::Var { name } | Term::Const { name } => name,
        }
    }

    pub fn is_var(&self) -> bool {
        matches!(self, Term::Var { .. })
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Predicate application, possibly negated
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Atom {
    pub pred: String,
    #[serde(default)]
    pub args: Vec<Term>,
    #[serde(default)]
    pub negated: bool,
}

impl Atom {
    pub fn new(pred: impl Into<String>, args: Vec<Term>) -> Self {
        Atom {
            pred: pred.into(),
            args,
            negated: false,
        }
    }

    pub fn negate(mut self) -> Self {
        self.negated = !self.negated;
        self
    }

    pub fn arity(&self) -> usize {
        self.args.len()
    }

    pub fn has_vars(&self) -> bool {
        self.args.iter().any(Term::is_var)
    }
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negated {
            write!(f, "~")?;
        }
        write!(f, "{}", self.pred)?;
        if !self.args.is_empty() {
            let args: Vec<String> = self.args.iter().map(|a| a.to_string()).collect();
            write!(f, "({})", args.join(","))?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuantifierKind {
    Forall,
    Exists,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Quantifier {
    pub kind: QuantifierKind,
    pub var: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort: Option<String>,
}

/// Character span into the source text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextSpan {
    pub start: usize,
    pub end: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// A natural-language statement together with its logical reading
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Statement {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub atoms: Vec<Atom>,
    #[serde(default)]
    pub quantifiers: Vec<Quantifier>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub span: Option<TextSpan>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rationale: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

impl Statement {
    pub fn new(text: impl Into<String>, atoms: Vec<Atom>) -> Self {
        Statement {
            text: text.into(),
            atoms,
            ..Default::default()
        }
    }

    pub fn has_atoms(&self) -> bool {
        !self.atoms.is_empty()
    }
}

/// Reference from a premise slot to another node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeRef {
    #[serde(rename = "ref")]
    pub target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl NodeRef {
    pub fn new(target: impl Into<String>) -> Self {
        NodeRef {
            target: target.into(),
            note: None,
        }
    }
}

/// A premise is either an inline statement or a reference to another node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Premise {
    Stmt(Statement),
    Ref(NodeRef),
}

impl Premise {
    pub fn as_statement(&self) -> Option<&Statement> {
        match self {
            Premise::Stmt(s) => Some(s),
            Premise::Ref(_) => None,
        }
    }

    pub fn as_ref_target(&self) -> Option<&str> {
        match self {
            Premise::Stmt(_) => None,
            Premise::Ref(r) => Some(&r.target),
        }
    }
}

/// Inference rule, strict or defeasible
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    #[serde(default = "default_rule_name")]
    pub name: String,
    #[serde(default)]
    pub strict: bool,
    #[serde(default)]
    pub antecedents: Vec<Statement>,
    #[serde(default)]
    pub consequents: Vec<Statement>,
    #[serde(default)]
    pub exceptions: Vec<Statement>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheme: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub span: Option<TextSpan>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rationale: Option<String>,
}

fn default_rule_name() -> String {
    "r".to_string()
}

impl Rule {
    /// Both sides carry at least one atom
    pub fn is_complete(&self) -> bool {
        self.antecedents.iter().any(Statement::has_atoms)
            && self.consequents.iter().any(Statement::has_atoms)
    }

    pub fn all_atoms(&self) -> impl Iterator<Item = &Atom> {
        self.antecedents
            .iter()
            .chain(self.consequents.iter())
            .chain(self.exceptions.iter())
            .flat_map(|s| s.atoms.iter())
    }
}

/// One inference step of the argument
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    #[serde(default)]
    pub premises: Vec<Premise>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule: Option<Rule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conclusion: Option<Statement>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub span: Option<TextSpan>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rationale: Option<String>,
}

impl Node {
    pub fn new(id: impl Into<String>) -> Self {
        Node {
            id: id.into(),
            premises: vec![],
            rule: None,
            conclusion: None,
            span: None,
            rationale: None,
        }
    }

    pub fn with_conclusion(mut self, conclusion: Statement) -> Self {
        self.conclusion = Some(conclusion);
        self
    }

    pub fn with_premise(mut self, premise: Premise) -> Self {
        self.premises.push(premise);
        self
    }

    pub fn with_rule(mut self, rule: Rule) -> Self {
        self.rule = Some(rule);
        self
    }

    pub fn statement_premises(&self) -> impl Iterator<Item = &Statement> {
        self.premises.iter().filter_map(Premise::as_statement)
    }

    pub fn ref_targets(&self) -> impl Iterator<Item = &str> {
        self.premises.iter().filter_map(Premise::as_ref_target)
    }

    pub fn conclusion_atoms(&self) -> &[Atom] {
        self.conclusion
            .as_ref()
            .map(|c| c.atoms.as_slice())
            .unwrap_or(&[])
    }

    pub fn has_conclusion(&self) -> bool {
        self.conclusion.as_ref().is_some_and(Statement::has_atoms)
    }

    /// Every atom the node mentions, in premise, rule, conclusion order
    pub fn all_atoms(&self) -> Vec<&Atom> {
        let mut atoms: Vec<&Atom> = self
            .statement_premises()
            .flat_map(|s| s.atoms.iter())
            .collect();
        if let Some(rule) = &self.rule {
            atoms.extend(rule.all_atoms());
        }
        atoms.extend(self.conclusion_atoms().iter());
        atoms
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeKind {
    Support,
    Attack,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttackKind {
    Rebut,
    Undermine,
    Undercut,
    Unknown,
}

impl std::str::FromStr for AttackKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "rebut" => Ok(AttackKind::Rebut),
            "undermine" => Ok(AttackKind::Undermine),
            "undercut" => Ok(AttackKind::Undercut),
            "unknown" => Ok(AttackKind::Unknown),
            _ => Err(anyhow::anyhow!("Unknown attack kind: {}", s)),
        }
    }
}

/// Directed support or attack relation between nodes
///
/// Built through [`Edge::support`] and [`Edge::attack`] so that
/// `attack_kind` is present exactly when the edge is an attack.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
    pub source: String,
    pub target: String,
    pub kind: EdgeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attack_kind: Option<AttackKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rationale: Option<String>,
}

impl Edge {
    pub fn support(source: impl Into<String>, target: impl Into<String>) -> Self {
        Edge {
            source: source.into(),
            target: target.into(),
            kind: EdgeKind::Support,
            attack_kind: None,
            rationale: None,
        }
    }

    pub fn attack(source: impl Into<String>, target: impl Into<String>, kind: AttackKind) -> Self {
        Edge {
            source: source.into(),
            target: target.into(),
            kind: EdgeKind::Attack,
            attack_kind: Some(kind),
            rationale: None,
        }
    }

    pub fn with_rationale(mut self, rationale: impl Into<String>) -> Self {
        self.rationale = Some(rationale.into());
        self
    }

    pub fn is_attack(&self) -> bool {
        self.kind == EdgeKind::Attack
    }

    pub fn is_support(&self) -> bool {
        self.kind == EdgeKind::Support
    }

    /// Restore the attack_kind/kind pairing after deserializing untrusted input
    pub fn normalize(&mut self) {
        match self.kind {
            EdgeKind::Support => self.attack_kind = None,
            EdgeKind::Attack => {
                if self.attack_kind.is_none() {
                    self.attack_kind = Some(AttackKind::Unknown);
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ArgumentGraph {
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub edges: Vec<Edge>,
}

impl ArgumentGraph {
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes.iter().any(|n| n.id == id)
    }

    pub fn node_ids(&self) -> Vec<String> {
        self.nodes.iter().map(|n| n.id.clone()).collect()
    }

    pub fn support_edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.iter().filter(|e| e.is_support())
    }

    pub fn attack_edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.iter().filter(|e| e.is_attack())
    }

    pub fn has_edge(&self, source: &str, target: &str, kind: EdgeKind) -> bool {
        self.edges
            .iter()
            .any(|e| e.source == source && e.target == target && e.kind == kind)
    }

    /// Support edges plus Ref premises, as (from, to) pairs, deduplicated in first-seen order
    pub fn support_links(&self) -> Vec<(String, String)> {
        let mut links: Vec<(String, String)> = Vec::new();
        for e in self.support_edges() {
            let link = (e.source.clone(), e.target.clone());
            if !links.contains(&link) {
                links.push(link);
            }
        }
        for node in &self.nodes {
            for target in node.ref_targets() {
                let link = (target.to_string(), node.id.clone());
                if !links.contains(&link) {
                    links.push(link);
                }
            }
        }
        links
    }
}

/// Document-level metadata
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Metadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub atom_lexicon: Option<IndexMap<String, Vec<String>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goal_id: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub implicit_rules_synthesized: bool,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub id_map: IndexMap<String, String>,
    /// Anything else the producer attached
    #[serde(flatten)]
    pub extra: IndexMap<String, serde_json::Value>,
}

/// The validated argument document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Argir {
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default)]
    pub source_text: String,
    pub graph: ArgumentGraph,
    #[serde(default)]
    pub metadata: Metadata,
}

fn default_version() -> String {
    ARGIR_VERSION.to_string()
}

impl Argir {
    pub fn new(source_text: impl Into<String>, graph: ArgumentGraph) -> Self {
        Argir {
            version: ARGIR_VERSION.to_string(),
            source_text: source_text.into(),
            graph,
            metadata: Metadata::default(),
        }
    }

    pub fn lexicon(&self) -> Option<&IndexMap<String, Vec<String>>> {
        self.metadata.atom_lexicon.as_ref()
    }

    pub fn goal_id(&self) -> Option<&str> {
        self.metadata.goal_id.as_deref()
    }

    pub fn to_json(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_premise_tagging() {
        let premise = Premise::Ref(NodeRef::new("R1"));
        let json = serde_json::to_value(&premise).unwrap();
        assert_eq!(json, serde_json::json!({"kind": "Ref", "ref": "R1"}));

        let stmt: Premise = serde_json::from_value(serde_json::json!({
            "kind": "Stmt",
            "text": "it rains",
            "atoms": [{"pred": "rain", "args": []}]
        }))
        .unwrap();
        assert!(matches!(stmt, Premise::Stmt(ref s) if s.atoms[0].pred == "rain"));
    }

    #[test]
    fn test_term_tagging() {
        let t: Term = serde_json::from_str(r#"{"kind":"Var","name":"X"}"#).unwrap();
        assert_eq!(t, Term::var("X"));
        assert_eq!(
            serde_json::to_string(&Term::constant("socrates")).unwrap(),
            r#"{"kind":"Const","name":"socrates"}"#
        );
    }

    #[test]
    fn test_edge_constructors_pair_attack_kind() {
        let s = Edge::support("a", "b");
        assert!(s.attack_kind.is_none());
        let a = Edge::attack("a", "b", AttackKind::Rebut);
        assert_eq!(a.attack_kind, Some(AttackKind::Rebut));

        let mut bad: Edge = serde_json::from_str(
            r#"{"source":"a","target":"b","kind":"support","attack_kind":"rebut"}"#,
        )
        .unwrap();
        bad.normalize();
        assert!(bad.attack_kind.is_none());
    }

    #[test]
    fn test_rule_completeness() {
        let mut rule = Rule {
            name: "r".into(),
            strict: false,
            antecedents: vec![Statement::new("a", vec![Atom::new("a", vec![])])],
            consequents: vec![],
            exceptions: vec![],
            scheme: None,
            span: None,
            rationale: None,
        };
        assert!(!rule.is_complete());
        rule.consequents
            .push(Statement::new("b", vec![Atom::new("b", vec![])]));
        assert!(rule.is_complete());
    }

    #[test]
    fn test_support_links_include_refs() {
        let graph = ArgumentGraph {
            nodes: vec![
                Node::new("R1"),
                Node::new("C1").with_premise(Premise::Ref(NodeRef::new("R1"))),
            ],
            edges: vec![Edge::support("R1", "C1")],
        };
        assert_eq!(graph.support_links(), vec![("R1".into(), "C1".into())]);
    }

    #[test]
    fn test_atom_display() {
        let atom = Atom::new("mortal", vec![Term::constant("socrates")]).negate();
        assert_eq!(atom.to_string(), "~mortal(socrates)");
    }
}
