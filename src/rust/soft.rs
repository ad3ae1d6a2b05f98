// SPDX-FileCopyrightText: 2026 ARGIR Project Team
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Soft IR: the loose graph shape an extraction model can emit reliably
//!
//! Predicates are free surface text, ids are provisional, and no lexicon
//! is required. The compiler turns this into a strict [`Argir`](crate::core::Argir).

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{ArgirError, ArgirResult};

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SoftSpan {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<usize>,
}

/// An argument, either `{"value": "x"}` or a bare string
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SoftTerm {
    Tagged { value: String },
    Bare(String),
}

impl SoftTerm {
    pub fn new(value: impl Into<String>) -> Self {
        SoftTerm::Tagged {
            value: value.into(),
        }
    }

    pub fn value(&self) -> &str {
        match self {
            SoftTerm::Tagged { value } | SoftTerm::Bare(value) => value,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Polarity {
    #[default]
    Pos,
    Neg,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoftStatement {
    /// Surface predicate, e.g. "is wet"
    pub pred: String,
    #[serde(default)]
    pub args: Vec<SoftTerm>,
    #[serde(default)]
    pub polarity: Polarity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub span: Option<SoftSpan>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantifiers: Option<Vec<serde_json::Value>>,
}

impl SoftStatement {
    pub fn new(pred: impl Into<String>, args: &[&str]) -> Self {
        SoftStatement {
            pred: pred.into(),
            args: args.iter().map(|a| SoftTerm::new(*a)).collect(),
            polarity: Polarity::Pos,
            span: None,
            quantifiers: None,
        }
    }

    pub fn negated(mut self) -> Self {
        self.polarity = Polarity::Neg;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SoftRule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub strict: bool,
    #[serde(default)]
    pub antecedents: Vec<SoftStatement>,
    #[serde(default)]
    pub consequents: Vec<SoftStatement>,
    #[serde(default)]
    pub exceptions: Vec<SoftStatement>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheme: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RefTag {
    Ref,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoftPremiseRef {
    pub kind: RefTag,
    #[serde(rename = "ref")]
    pub target: String,
}

/// A premise: `{"kind": "Ref", "ref": id}` or an inline statement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SoftPremise {
    Ref(SoftPremiseRef),
    Stmt(SoftStatement),
}

impl SoftPremise {
    pub fn reference(target: impl Into<String>) -> Self {
        SoftPremise::Ref(SoftPremiseRef {
            kind: RefTag::Ref,
            target: target.into(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SoftNode {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub premises: Vec<SoftPremise>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule: Option<SoftRule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conclusion: Option<SoftStatement>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub span: Option<SoftSpan>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rationale: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoftEdge {
    pub source: String,
    pub target: String,
    #[serde(default = "default_edge_kind")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attack_kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rationale: Option<String>,
}

fn default_edge_kind() -> String {
    "support".to_string()
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SoftGraph {
    #[serde(default)]
    pub nodes: Vec<SoftNode>,
    #[serde(default)]
    pub edges: Vec<SoftEdge>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SoftGoal {
    pub node_id: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SoftIr {
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub source_text: String,
    pub graph: SoftGraph,
    #[serde(default)]
    pub metadata: IndexMap<String, serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goal: Option<SoftGoal>,
}

impl SoftIr {
    pub fn from_json_str(json: &str) -> ArgirResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| ArgirError::Schema(format!("soft IR is malformed: {}", e)))
    }

    pub fn from_value(value: serde_json::Value) -> ArgirResult<Self> {
        serde_json::from_value(value)
            .map_err(|e| ArgirError::Schema(format!("soft IR is malformed: {}", e)))
    }
}

/// Either input path accepted by the pipeline
#[derive(Debug, Clone)]
pub enum Draft {
    Soft(SoftIr),
    Strict(serde_json::Value),
}

impl Draft {
    /// Soft drafts have statements with a `pred` field and no lexicon
    pub fn detect(value: serde_json::Value) -> ArgirResult<Draft> {
        let has_lexicon = value
            .get("metadata")
            .is_some_and(|m| m.get("atom_lexicon").is_some() || m.get("symbols").is_some());
        let looks_soft = value
            .pointer("/graph/nodes")
            .and_then(|n| n.as_array())
            .is_some_and(|nodes| {
                nodes.iter().any(|n| {
                    n.pointer("/conclusion/pred").is_some()
                        || n.get("premises")
                            .and_then(|p| p.as_array())
                            .is_some_and(|ps| ps.iter().any(|p| p.get("pred").is_some()))
                })
            });
        if looks_soft && !has_lexicon {
            Ok(Draft::Soft(SoftIr::from_value(value)?))
        } else {
            Ok(Draft::Strict(value))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_premise_shapes() {
        let node: SoftNode = serde_json::from_value(json!({
            "premises": [
                {"kind": "Ref", "ref": "r1"},
                {"pred": "is wet", "args": [{"value": "street"}, "Paris"], "polarity": "neg"}
            ]
        }))
        .unwrap();
        assert_eq!(node.premises[0], SoftPremise::reference("r1"));
        let SoftPremise::Stmt(stmt) = &node.premises[1] else {
            panic!("expected statement");
        };
        assert_eq!(stmt.polarity, Polarity::Neg);
        assert_eq!(stmt.args[1].value(), "Paris");
    }

    #[test]
    fn test_detect_draft_kind() {
        let soft = json!({"graph": {"nodes": [{"conclusion": {"pred": "rains"}}], "edges": []}});
        assert!(matches!(Draft::detect(soft).unwrap(), Draft::Soft(_)));

        let strict = json!({"graph": {"nodes": [{"id": "a", "conclusion": {"atoms": []}}]},
                            "metadata": {"atom_lexicon": {"p": ["p"]}}});
        assert!(matches!(Draft::detect(strict).unwrap(), Draft::Strict(_)));
    }

    #[test]
    fn test_malformed_soft_ir() {
        assert!(SoftIr::from_json_str(r#"{"graph": {"nodes": [{"premises": 3}]}}"#).is_err());
    }
}
