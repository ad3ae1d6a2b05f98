// SPDX-FileCopyrightText: 2026 ARGIR Project Team
// SPDX-License-Identifier: PMPL-1.0-or-later

//! First-order formula algebra

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::core::{Atom, Term};

/// A first-order formula over ARGIR atoms
///
/// Atoms stored in `Formula::Atom` are always positive; a negated ARGIR
/// atom becomes `Not(Atom(..))` through [`Formula::literal`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Formula {
    True,
    False,
    Atom(Atom),
    Not(Box<Formula>),
    And(Vec<Formula>),
    Or(Vec<Formula>),
    Implies(Box<Formula>, Box<Formula>),
    Forall(Vec<String>, Box<Formula>),
    Exists(Vec<String>, Box<Formula>),
}

impl Formula {
    pub fn literal(atom: &Atom) -> Formula {
        let positive = Formula::Atom(Atom {
            negated: false,
            ..atom.clone()
        });
        if atom.negated {
            Formula::Not(Box::new(positive))
        } else {
            positive
        }
    }

    /// Negation, collapsing a double negation
    pub fn negate(self) -> Formula {
        match self {
            Formula::Not(inner) => *inner,
            Formula::True => Formula::False,
            Formula::False => Formula::True,
            other => Formula::Not(Box::new(other)),
        }
    }

    /// Conjunction; nested conjunctions are flattened, a single conjunct is returned as is
    pub fn and(parts: Vec<Formula>) -> Formula {
        let mut flat = Vec::with_capacity(parts.len());
        for part in parts {
            match part {
                Formula::And(inner) => flat.extend(inner),
                Formula::True => {}
                other => flat.push(other),
            }
        }
        match flat.len() {
            0 => Formula::True,
            1 => flat.remove(0),
            _ => Formula::And(flat),
        }
    }

    pub fn or(parts: Vec<Formula>) -> Formula {
        let mut flat = Vec::with_capacity(parts.len());
        for part in parts {
            match part {
                Formula::Or(inner) => flat.extend(inner),
                Formula::False => {}
                other => flat.push(other),
            }
        }
        match flat.len() {
            0 => Formula::False,
            1 => flat.remove(0),
            _ => Formula::Or(flat),
        }
    }

    pub fn implies(lhs: Formula, rhs: Formula) -> Formula {
        Formula::Implies(Box::new(lhs), Box::new(rhs))
    }

    pub fn forall(vars: Vec<String>, body: Formula) -> Formula {
        if vars.is_empty() {
            body
        } else {
            Formula::Forall(vars, Box::new(body))
        }
    }

    pub fn exists(vars: Vec<String>, body: Formula) -> Formula {
        if vars.is_empty() {
            body
        } else {
            Formula::Exists(vars, Box::new(body))
        }
    }

    /// Variables occurring free, in sorted order
    pub fn free_vars(&self) -> BTreeSet<String> {
        let mut out = BTreeSet::new();
        self.collect_free(&mut Vec::new(), &mut out);
        out
    }

    fn collect_free(&self, bound: &mut Vec<String>, out: &mut BTreeSet<String>) {
        match self {
            Formula::True | Formula::False => {}
            Formula::Atom(atom) => {
                for term in &atom.args {
                    if let Term::Var { name } = term {
                        if !bound.contains(name) {
                            out.insert(name.clone());
                        }
                    }
                }
            }
            Formula::Not(inner) => inner.collect_free(bound, out),
            Formula::And(parts) | Formula::Or(parts) => {
                for p in parts {
                    p.collect_free(bound, out);
                }
            }
            Formula::Implies(lhs, rhs) => {
                lhs.collect_free(bound, out);
                rhs.collect_free(bound, out);
            }
            Formula::Forall(vars, body) | Formula::Exists(vars, body) => {
                let depth = bound.len();
                bound.extend(vars.iter().cloned());
                body.collect_free(bound, out);
                bound.truncate(depth);
            }
        }
    }

    /// Universal closure over the free variables
    pub fn close(self) -> Formula {
        let vars: Vec<String> = self.free_vars().into_iter().collect();
        Formula::forall(vars, self)
    }

    pub fn is_closed(&self) -> bool {
        self.free_vars().is_empty()
    }

    /// Every atom in the formula, left to right
    pub fn atoms(&self) -> Vec<&Atom> {
        let mut out = Vec::new();
        self.collect_atoms(&mut out);
        out
    }

    fn collect_atoms<'a>(&'a self, out: &mut Vec<&'a Atom>) {
        match self {
            Formula::True | Formula::False => {}
            Formula::Atom(a) => out.push(a),
            Formula::Not(inner) => inner.collect_atoms(out),
            Formula::And(parts) | Formula::Or(parts) => {
                parts.iter().for_each(|p| p.collect_atoms(out));
            }
            Formula::Implies(lhs, rhs) => {
                lhs.collect_atoms(out);
                rhs.collect_atoms(out);
            }
            Formula::Forall(_, body) | Formula::Exists(_, body) => body.collect_atoms(out),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(name: &str, args: &[&str]) -> Atom {
        Atom::new(
            name,
            args.iter()
                .map(|a| {
                    if a.chars().next().is_some_and(char::is_uppercase) {
                        Term::var(*a)
                    } else {
                        Term::constant(*a)
                    }
                })
                .collect(),
        )
    }

    #[test]
    fn test_and_flattens_and_collapses() {
        let a = Formula::literal(&p("a", &[]));
        let b = Formula::literal(&p("b", &[]));
        assert_eq!(Formula::and(vec![a.clone()]), a);
        let nested = Formula::and(vec![Formula::and(vec![a.clone(), b.clone()]), a.clone()]);
        assert_eq!(nested, Formula::And(vec![a.clone(), b, a]));
        assert_eq!(Formula::and(vec![]), Formula::True);
    }

    #[test]
    fn test_free_vars_respect_binders() {
        let body = Formula::implies(
            Formula::literal(&p("human", &["X"])),
            Formula::literal(&p("loves", &["X", "Y"])),
        );
        assert_eq!(
            body.free_vars().into_iter().collect::<Vec<_>>(),
            vec!["X".to_string(), "Y".to_string()]
        );
        let closed = Formula::exists(vec!["Y".into()], body).close();
        assert!(closed.is_closed());
        assert!(matches!(closed, Formula::Forall(ref v, _) if v == &vec!["X".to_string()]));
    }

    #[test]
    fn test_literal_and_negate() {
        let atom = p("fly", &["tweety"]).negate();
        let lit = Formula::literal(&atom);
        assert!(matches!(lit, Formula::Not(_)));
        assert_eq!(lit.clone().negate(), Formula::literal(&p("fly", &["tweety"])));
    }
}
