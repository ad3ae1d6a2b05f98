// SPDX-FileCopyrightText: 2026 ARGIR Project Team
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Graph to formula translation and goal selection
//!
//! Emission order is fixed: `rule_<id>`, `prem_<id>_<i>`, `fact_<id>`,
//! `orphan_fact_<n>`, `node_<id>_link`, then the `goal` conjecture.

use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

use super::ast::Formula;
use super::{tptp, FolMode, FormulaRole, NamedFormula, Problem};
use crate::core::{Argir, Atom, Node, Premise, QuantifierKind, Rule, Statement};

#[derive(Debug, Clone)]
pub struct TranslateOptions {
    pub mode: FolMode,

    /// Node whose conclusion becomes the conjecture
    pub goal_id: Option<String>,

    /// Leave out the `fact_<id>` axiom of this node (used when its support is in question)
    pub omit_fact_of: Option<String>,
}

impl Default for TranslateOptions {
    fn default() -> Self {
        TranslateOptions {
            mode: FolMode::Classical,
            goal_id: None,
            omit_fact_of: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Translation {
    pub problem: Problem,
    pub goal_node: Option<String>,

    /// Texts of statements that had no atoms and were given placeholder predicates
    pub placeholders: Vec<String>,
}

/// Zero-arity stand-in for a statement without atoms
fn placeholder(text: &str) -> Formula {
    let slug: String = text
        .trim()
        .to_lowercase()
        .chars()
        .take(20)
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    let slug = slug.trim_matches('_');
    let pred = if slug.is_empty() {
        "nl_stmt".to_string()
    } else {
        format!("nl_{}", slug)
    };
    Formula::Atom(Atom::new(pred, vec![]))
}

/// Conjunction of the statement's atoms, wrapped in its declared quantifiers
///
/// The first declared quantifier is outermost. A statement without atoms
/// becomes a zero-arity placeholder derived from its text.
pub fn statement_to_formula(stmt: &Statement) -> Formula {
    let mut phi = if stmt.atoms.is_empty() {
        placeholder(&stmt.text)
    } else {
        Formula::and(stmt.atoms.iter().map(Formula::literal).collect())
    };
    for q in stmt.quantifiers.iter().rev() {
        phi = match q.kind {
            QuantifierKind::Forall => Formula::Forall(vec![q.var.clone()], Box::new(phi)),
            QuantifierKind::Exists => Formula::Exists(vec![q.var.clone()], Box::new(phi)),
        };
    }
    phi
}

/// `forall(free vars). antecedents => consequents`
///
/// In defeasible mode every exception atom is negated and conjoined to the
/// antecedent on its own.
pub fn rule_to_formula(rule: &Rule, mode: FolMode) -> Formula {
    let mut antecedent: Vec<Formula> = rule.antecedents.iter().map(statement_to_formula).collect();

    if mode == FolMode::Defeasible {
        for exception in &rule.exceptions {
            if exception.atoms.is_empty() {
                antecedent.push(placeholder(&exception.text).negate());
            }
            for atom in &exception.atoms {
                antecedent.push(Formula::literal(atom).negate());
            }
        }
    }

    let consequent: Vec<Formula> = rule.consequents.iter().map(statement_to_formula).collect();

    let core = match (antecedent.is_empty(), consequent.is_empty()) {
        (false, false) => Formula::implies(Formula::and(antecedent), Formula::and(consequent)),
        (true, false) => Formula::and(consequent),
        (false, true) => Formula::and(antecedent),
        (true, true) => Formula::True,
    };
    core.close()
}

fn premise_formula(premise: &Premise, index: &HashMap<&str, &Node>) -> Formula {
    match premise {
        Premise::Stmt(stmt) => statement_to_formula(stmt),
        Premise::Ref(r) => match index.get(r.target.as_str()) {
            Some(node) => {
                if let Some(conclusion) = &node.conclusion {
                    statement_to_formula(conclusion)
                } else if let [Premise::Stmt(only)] = node.premises.as_slice() {
                    statement_to_formula(only)
                } else {
                    Formula::Atom(Atom::new(format!("ref_{}", r.target), vec![]))
                }
            }
            None => Formula::Atom(Atom::new(format!("ref_{}", r.target), vec![])),
        },
    }
}

fn has_var(stmt: &Statement) -> bool {
    stmt.atoms.iter().any(Atom::has_vars)
}

fn all_zero_arity(stmt: &Statement) -> bool {
    stmt.atoms.iter().all(|a| a.args.is_empty())
}

fn is_negated(stmt: &Statement) -> bool {
    stmt.atoms.iter().any(|a| a.negated)
}

/// Most premises wins, earliest node on ties; negated conclusions first within a tier
fn pick<'a>(tier: &[&'a Node]) -> Option<&'a Node> {
    let negated: Vec<&Node> = tier
        .iter()
        .copied()
        .filter(|n| n.conclusion.as_ref().is_some_and(is_negated))
        .collect();
    let pool = if negated.is_empty() { tier.to_vec() } else { negated };
    pool.into_iter().fold(None::<&Node>, |best, n| match best {
        Some(b) if b.premises.len() >= n.premises.len() => Some(b),
        _ => Some(n),
    })
}

/// Choose the conjecture node
///
/// An explicit id wins, then `metadata.goal_id`. Without either, the
/// candidates are nodes with a conclusion that no `Ref` premise points at.
/// Variable-bearing conclusions are preferred, then non-zero-arity ones,
/// then anything left.
pub fn choose_goal_node(argir: &Argir, explicit: Option<&str>) -> Option<String> {
    if let Some(id) = explicit.or(argir.goal_id()) {
        return match argir.graph.node(id) {
            Some(node) if node.conclusion.is_some() => Some(id.to_string()),
            _ => {
                warn!(goal = id, "Declared goal has no conclusion or does not exist");
                None
            }
        };
    }

    let referenced: HashSet<&str> = argir
        .graph
        .nodes
        .iter()
        .flat_map(|n| n.ref_targets())
        .collect();

    let candidates: Vec<&Node> = argir
        .graph
        .nodes
        .iter()
        .filter(|n| n.conclusion.is_some() && !referenced.contains(n.id.as_str()))
        .collect();

    let conclusion = |n: &&Node| n.conclusion.as_ref().map(|c| (has_var(c), all_zero_arity(c)));

    let with_vars: Vec<&Node> = candidates
        .iter()
        .copied()
        .filter(|n| conclusion(n).is_some_and(|(v, _)| v))
        .collect();
    if !with_vars.is_empty() {
        return pick(&with_vars).map(|n| n.id.clone());
    }

    let non_zero: Vec<&Node> = candidates
        .iter()
        .copied()
        .filter(|n| conclusion(n).is_some_and(|(_, zero)| !zero))
        .collect();
    if !non_zero.is_empty() {
        return pick(&non_zero).map(|n| n.id.clone());
    }

    candidates
        .iter()
        .copied()
        .fold(None::<&Node>, |best, n| match best {
            Some(b) if b.premises.len() >= n.premises.len() => Some(b),
            _ => Some(n),
        })
        .map(|n| n.id.clone())
}

/// Local entailment problem: does the node's own support prove its conclusion?
///
/// Axioms are the node's premises (a `Ref` to a rule node contributes the
/// rule) and the conclusions of nodes with a support edge into it. `None`
/// when the node has no conclusion.
pub fn support_problem(argir: &Argir, node_id: &str, mode: FolMode) -> Option<Problem> {
    let nodes = &argir.graph.nodes;
    let index: HashMap<&str, &Node> = nodes.iter().map(|n| (n.id.as_str(), n)).collect();
    let node = index.get(node_id)?;
    let conclusion = node.conclusion.as_ref()?;

    let mut axioms = Vec::new();
    for (i, premise) in node.premises.iter().enumerate() {
        let rule = premise
            .as_ref_target()
            .and_then(|t| index.get(t))
            .and_then(|n| n.rule.as_ref());
        let phi = match rule {
            Some(rule) => rule_to_formula(rule, mode),
            None => premise_formula(premise, &index).close(),
        };
        axioms.push(NamedFormula::axiom(format!("prem_{}_{}", node.id, i), phi));
    }
    for edge in argir.graph.support_edges().filter(|e| e.target == node_id) {
        let Some(source) = index.get(edge.source.as_str()) else {
            continue;
        };
        let phi = match (&source.conclusion, &source.rule) {
            (Some(c), _) => statement_to_formula(c).close(),
            (None, Some(rule)) => rule_to_formula(rule, mode),
            (None, None) => continue,
        };
        axioms.push(NamedFormula::axiom(format!("support_{}", source.id), phi));
    }

    Some(Problem {
        axioms,
        conjecture: Some(NamedFormula {
            name: "goal".to_string(),
            role: FormulaRole::Conjecture,
            formula: statement_to_formula(conclusion).close(),
        }),
    })
}

/// Translate the graph into axioms and an optional goal conjecture
pub fn translate(argir: &Argir, options: &TranslateOptions) -> Translation {
    let nodes = &argir.graph.nodes;
    let index: HashMap<&str, &Node> = nodes.iter().map(|n| (n.id.as_str(), n)).collect();
    let mut axioms: Vec<NamedFormula> = Vec::new();
    let mut placeholders: Vec<String> = Vec::new();

    let mut note_placeholder = |stmt: &Statement| {
        if stmt.atoms.is_empty() && !placeholders.contains(&stmt.text) {
            placeholders.push(stmt.text.clone());
        }
    };

    for node in nodes {
        if let Some(rule) = &node.rule {
            rule.antecedents
                .iter()
                .chain(rule.consequents.iter())
                .for_each(&mut note_placeholder);
            axioms.push(NamedFormula::axiom(
                format!("rule_{}", node.id),
                rule_to_formula(rule, options.mode),
            ));
        }
    }

    let premise_only = |n: &Node| n.rule.is_none() && n.conclusion.is_none() && !n.premises.is_empty();

    for node in nodes.iter().filter(|n| premise_only(n)) {
        for (i, premise) in node.premises.iter().enumerate() {
            if let Premise::Stmt(stmt) = premise {
                note_placeholder(stmt);
                axioms.push(NamedFormula::axiom(
                    format!("prem_{}_{}", node.id, i),
                    statement_to_formula(stmt).close(),
                ));
            }
        }
    }

    for node in nodes {
        if node.rule.is_some() || !node.premises.is_empty() {
            continue;
        }
        let Some(conclusion) = &node.conclusion else {
            continue;
        };
        if options.omit_fact_of.as_deref() == Some(node.id.as_str()) {
            continue;
        }
        note_placeholder(conclusion);
        axioms.push(NamedFormula::axiom(
            format!("fact_{}", node.id),
            statement_to_formula(conclusion).close(),
        ));
    }

    let concluded: HashSet<String> = nodes
        .iter()
        .filter_map(|n| n.conclusion.as_ref())
        .map(|c| tptp::formula(&statement_to_formula(c).close()))
        .collect();
    let mut orphans: HashSet<String> = HashSet::new();
    for node in nodes.iter().filter(|n| !premise_only(n)) {
        for stmt in node.statement_premises() {
            let phi = statement_to_formula(stmt).close();
            let key = tptp::formula(&phi);
            if concluded.contains(&key) || !orphans.insert(key) {
                continue;
            }
            note_placeholder(stmt);
            axioms.push(NamedFormula::axiom(format!("orphan_fact_{}", orphans.len()), phi));
        }
    }

    for node in nodes {
        let Some(conclusion) = &node.conclusion else {
            continue;
        };
        if node.premises.is_empty() {
            continue;
        }
        let cites_rule = node
            .ref_targets()
            .any(|t| index.get(t).is_some_and(|n| n.rule.is_some()));
        if cites_rule {
            continue;
        }
        let premises: Vec<Formula> = node
            .premises
            .iter()
            .map(|p| premise_formula(p, &index))
            .collect();
        let link = Formula::implies(Formula::and(premises), statement_to_formula(conclusion));
        axioms.push(NamedFormula::axiom(format!("node_{}_link", node.id), link.close()));
    }

    let goal_node = choose_goal_node(argir, options.goal_id.as_deref());
    let conjecture = goal_node
        .as_deref()
        .and_then(|id| index.get(id))
        .and_then(|n| n.conclusion.as_ref())
        .map(|c| NamedFormula {
            name: "goal".to_string(),
            role: FormulaRole::Conjecture,
            formula: statement_to_formula(c).close(),
        });

    if !placeholders.is_empty() {
        debug!(count = placeholders.len(), "Statements translated as placeholder atoms");
    }

    Translation {
        problem: Problem { axioms, conjecture },
        goal_node,
        placeholders,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ArgumentGraph, NodeRef, Quantifier, Term};
    use pretty_assertions::assert_eq;

    fn stmt(pred: &str, args: Vec<Term>) -> Statement {
        Statement::new(pred, vec![Atom::new(pred, args)])
    }

    fn socrates_graph() -> Argir {
        let rule = Rule {
            name: "mortality".into(),
            strict: true,
            antecedents: vec![stmt("human", vec![Term::var("X")])],
            consequents: vec![stmt("mortal", vec![Term::var("X")])],
            exceptions: vec![],
            scheme: None,
            span: None,
            rationale: None,
        };
        let graph = ArgumentGraph {
            nodes: vec![
                Node::new("R1").with_rule(rule),
                Node::new("P1")
                    .with_premise(Premise::Ref(NodeRef::new("R1")))
                    .with_premise(Premise::Stmt(stmt("human", vec![Term::constant("socrates")])))
                    .with_conclusion(stmt("mortal", vec![Term::constant("socrates")])),
            ],
            edges: vec![],
        };
        Argir::new("Socrates is human, so mortal.", graph)
    }

    #[test]
    fn test_socrates_listing() {
        let t = translate(&socrates_graph(), &TranslateOptions::default());
        assert_eq!(t.goal_node.as_deref(), Some("P1"));
        assert_eq!(
            t.problem.lines(),
            vec![
                "fof(rule_R1, axiom, ! [X] : ((human(X) => mortal(X)))).".to_string(),
                "fof(orphan_fact_1, axiom, human(socrates)).".to_string(),
                "fof(goal, conjecture, mortal(socrates)).".to_string(),
            ]
        );
    }

    #[test]
    fn test_placeholder_for_atomless_statement() {
        let phi = statement_to_formula(&Statement::new("It's complicated!", vec![]));
        assert_eq!(tptp::formula(&phi), "nl_it_s_complicated");
    }

    #[test]
    fn test_quantifiers_first_is_outermost() {
        let mut s = stmt("loves", vec![Term::var("X"), Term::var("Y")]);
        s.quantifiers = vec![
            Quantifier { kind: QuantifierKind::Forall, var: "X".into(), sort: None },
            Quantifier { kind: QuantifierKind::Exists, var: "Y".into(), sort: None },
        ];
        assert_eq!(
            tptp::formula(&statement_to_formula(&s)),
            "! [X] : (? [Y] : (loves(X,Y)))"
        );
    }

    #[test]
    fn test_goal_prefers_variable_conclusions() {
        let graph = ArgumentGraph {
            nodes: vec![
                Node::new("C1").with_conclusion(stmt("rain", vec![])),
                Node::new("C2").with_conclusion(stmt("wet", vec![Term::constant("street")])),
                Node::new("C3").with_conclusion(stmt("bird", vec![Term::var("X")])),
            ],
            edges: vec![],
        };
        let argir = Argir::new("", graph);
        assert_eq!(choose_goal_node(&argir, None).as_deref(), Some("C3"));
        assert_eq!(choose_goal_node(&argir, Some("C1")).as_deref(), Some("C1"));
    }

    #[test]
    fn test_goal_ties_break_on_node_order() {
        let graph = ArgumentGraph {
            nodes: vec![
                Node::new("C1").with_conclusion(stmt("a", vec![Term::constant("x")])),
                Node::new("C2").with_conclusion(stmt("b", vec![Term::constant("y")])),
            ],
            edges: vec![],
        };
        assert_eq!(choose_goal_node(&Argir::new("", graph), None).as_deref(), Some("C1"));
    }

    #[test]
    fn test_omit_fact_of_target() {
        let graph = ArgumentGraph {
            nodes: vec![Node::new("C1").with_conclusion(stmt("rain", vec![]))],
            edges: vec![],
        };
        let argir = Argir::new("", graph);
        let options = TranslateOptions {
            goal_id: Some("C1".into()),
            omit_fact_of: Some("C1".into()),
            ..Default::default()
        };
        let t = translate(&argir, &options);
        assert!(t.problem.axioms.is_empty());
        assert!(t.problem.conjecture.is_some());
    }

    #[test]
    fn test_link_for_ruleless_inference() {
        let graph = ArgumentGraph {
            nodes: vec![Node::new("P1")
                .with_premise(Premise::Stmt(stmt("rain", vec![])))
                .with_conclusion(stmt("wet", vec![]))],
            edges: vec![],
        };
        let t = translate(&Argir::new("", graph), &TranslateOptions::default());
        let names: Vec<String> = t.problem.axioms.iter().map(|a| a.name.clone()).collect();
        assert_eq!(names, vec!["orphan_fact_1", "node_P1_link"]);
        assert_eq!(
            t.problem.axioms[1].to_tptp(),
            "fof(node_P1_link, axiom, (rain => wet))."
        );
    }
}
