// SPDX-FileCopyrightText: 2026 ARGIR Project Team
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Assertions shared by integration tests

use argir::core::Term;
use argir::diagnostics::{Diagnosis, IssueType};
use argir::fol::Formula;
use argir::Argir;
use std::collections::HashMap;

/// Equal up to a consistent renaming of bound variables
pub fn assert_alpha_equivalent(left: &Formula, right: &Formula) {
    let mut bindings = HashMap::new();
    assert!(
        alpha_eq(left, right, &mut bindings),
        "formulas differ beyond variable renaming:\n  left:  {:?}\n  right: {:?}",
        left,
        right
    );
}

fn alpha_eq(a: &Formula, b: &Formula, bindings: &mut HashMap<String, String>) -> bool {
    match (a, b) {
        (Formula::True, Formula::True) | (Formula::False, Formula::False) => true,
        (Formula::Atom(x), Formula::Atom(y)) => {
            x.pred == y.pred
                && x.negated == y.negated
                && x.args.len() == y.args.len()
                && x.args.iter().zip(&y.args).all(|(s, t)| match (s, t) {
                    (Term::Var { name: m }, Term::Var { name: n }) => {
                        bindings.get(m).map_or(m == n, |bound| bound == n)
                    }
                    (Term::Const { name: m }, Term::Const { name: n }) => m == n,
                    _ => false,
                })
        }
        (Formula::Not(x), Formula::Not(y)) => alpha_eq(x, y, bindings),
        (Formula::And(xs), Formula::And(ys)) | (Formula::Or(xs), Formula::Or(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| alpha_eq(x, y, bindings))
        }
        (Formula::Implies(xl, xr), Formula::Implies(yl, yr)) => {
            alpha_eq(xl, yl, bindings) && alpha_eq(xr, yr, bindings)
        }
        (Formula::Forall(xv, xb), Formula::Forall(yv, yb))
        | (Formula::Exists(xv, xb), Formula::Exists(yv, yb)) => {
            if xv.len() != yv.len() {
                return false;
            }
            let saved = bindings.clone();
            for (x, y) in xv.iter().zip(yv) {
                bindings.insert(x.clone(), y.clone());
            }
            let same = alpha_eq(xb, yb, bindings);
            *bindings = saved;
            same
        }
        _ => false,
    }
}

/// Issue kinds in report order
pub fn issue_kinds(diagnosis: &Diagnosis) -> Vec<IssueType> {
    diagnosis.issues.iter().map(|i| i.kind).collect()
}

/// Every rule has at least one antecedent and one consequent
pub fn assert_rules_complete(argir: &Argir) {
    for node in &argir.graph.nodes {
        if let Some(rule) = &node.rule {
            assert!(
                !rule.antecedents.is_empty() && !rule.consequents.is_empty(),
                "rule in node {} is incomplete: {:?}",
                node.id,
                rule
            );
        }
    }
}
