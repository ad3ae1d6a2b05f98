// SPDX-FileCopyrightText: 2026 ARGIR Project Team
// SPDX-License-Identifier: PMPL-1.0-or-later

//! TPTP FOF rendering
//!
//! Symbols are rewritten into TPTP's lexical classes: predicates and
//! constants start lowercase, variables start uppercase. Characters outside
//! `[A-Za-z0-9_]` become `_`, and names that do not start with a letter get
//! a fixed prefix.

use super::ast::Formula;
use crate::core::{Atom, Term};

fn scrub(name: &str) -> String {
    let s: String = name
        .trim()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    if s.is_empty() {
        "x".to_string()
    } else {
        s
    }
}

fn lower_word(name: &str, prefix: &str) -> String {
    let s = scrub(name);
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => {
            format!("{}{}", c.to_ascii_lowercase(), chars.as_str())
        }
        _ => format!("{}{}", prefix, s),
    }
}

pub fn predicate_symbol(name: &str) -> String {
    lower_word(name, "p_")
}

pub fn constant_symbol(name: &str) -> String {
    lower_word(name, "c_")
}

pub fn variable_symbol(name: &str) -> String {
    let s = scrub(name);
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => {
            format!("{}{}", c.to_ascii_uppercase(), chars.as_str())
        }
        _ => format!("V{}", s),
    }
}

/// Formula names must be TPTP lower words
pub fn formula_name(name: &str) -> String {
    lower_word(name, "f_")
}

pub fn term(t: &Term) -> String {
    match t {
        Term::Var { name } => variable_symbol(name),
        Term::Const { name } => constant_symbol(name),
    }
}

pub fn atom(a: &Atom) -> String {
    let pred = predicate_symbol(&a.pred);
    let body = if a.args.is_empty() {
        pred
    } else {
        let args: Vec<String> = a.args.iter().map(term).collect();
        format!("{}({})", pred, args.join(","))
    };
    if a.negated {
        format!("~{}", body)
    } else {
        body
    }
}

pub fn formula(phi: &Formula) -> String {
    match phi {
        Formula::True => "$true".to_string(),
        Formula::False => "$false".to_string(),
        Formula::Atom(a) => atom(a),
        Formula::Not(inner) => match inner.as_ref() {
            Formula::Atom(a) => format!("~{}", atom(a)),
            other => format!("~({})", formula(other)),
        },
        Formula::And(parts) => join(parts, " & "),
        Formula::Or(parts) => join(parts, " | "),
        Formula::Implies(lhs, rhs) => format!("({} => {})", formula(lhs), formula(rhs)),
        Formula::Forall(vars, body) => quantified('!', vars, body),
        Formula::Exists(vars, body) => quantified('?', vars, body),
    }
}

fn join(parts: &[Formula], op: &str) -> String {
    let rendered: Vec<String> = parts.iter().map(formula).collect();
    format!("({})", rendered.join(op))
}

fn quantified(q: char, vars: &[String], body: &Formula) -> String {
    let vars: Vec<String> = vars.iter().map(|v| variable_symbol(v)).collect();
    format!("{} [{}] : ({})", q, vars.join(","), formula(body))
}

/// `fof(name, role, formula).`
pub fn fof(name: &str, role: &str, phi: &Formula) -> String {
    format!("fof({}, {}, {}).", formula_name(name), role, formula(phi))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Atom;

    #[test]
    fn test_symbol_rewriting() {
        assert_eq!(predicate_symbol("Mortal"), "mortal");
        assert_eq!(predicate_symbol("is wet"), "is_wet");
        assert_eq!(predicate_symbol("3d"), "p_3d");
        assert_eq!(constant_symbol("Socrates"), "socrates");
        assert_eq!(constant_symbol("_x"), "c__x");
        assert_eq!(variable_symbol("x"), "X");
        assert_eq!(variable_symbol("1"), "V1");
        assert_eq!(formula_name("rule_R1"), "rule_R1");
    }

    #[test]
    fn test_render_rule() {
        let human = Atom::new("human", vec![Term::var("X")]);
        let mortal = Atom::new("mortal", vec![Term::var("X")]);
        let phi = Formula::implies(Formula::literal(&human), Formula::literal(&mortal)).close();
        assert_eq!(
            fof("rule_R1", "axiom", &phi),
            "fof(rule_R1, axiom, ! [X] : ((human(X) => mortal(X))))."
        );
    }

    #[test]
    fn test_render_negation_and_conjunction() {
        let a = Formula::literal(&Atom::new("a", vec![]));
        let b = Formula::literal(&Atom::new("b", vec![Term::constant("c")]).negate());
        assert_eq!(formula(&Formula::and(vec![a.clone(), b])), "(a & ~b(c))");
        assert_eq!(formula(&Formula::and(vec![a.clone(), a]).negate()), "~((a & a))");
    }
}
