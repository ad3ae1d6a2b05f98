// SPDX-FileCopyrightText: 2026 ARGIR Project Team
// SPDX-License-Identifier: PMPL-1.0-or-later

//! In-process reference AF solver
//!
//! Grounded semantics is a fixpoint and runs on any size. Preferred and
//! stable enumerate subsets and refuse frameworks above `max_arguments`.

use async_trait::async_trait;
use std::collections::BTreeSet;
use tracing::debug;

use super::{
    AfEdit, AfSolver, EnforcementModel, EnforcementProblem, Extension, Extensions, Framework,
    Semantics, SolveOutcome,
};

/// Index-based view of a framework
struct Indexed<'a> {
    names: &'a [String],
    /// attackers[i] = arguments attacking i
    attackers: Vec<Vec<usize>>,
    /// attacked[i] = arguments attacked by i
    attacked: Vec<Vec<usize>>,
}

impl<'a> Indexed<'a> {
    fn new(framework: &'a Framework) -> Self {
        let n = framework.arguments.len();
        let pos = |id: &str| framework.arguments.iter().position(|a| a == id);
        let mut attackers = vec![Vec::new(); n];
        let mut attacked = vec![Vec::new(); n];
        for (s, t) in &framework.attacks {
            if let (Some(s), Some(t)) = (pos(s), pos(t)) {
                attackers[t].push(s);
                attacked[s].push(t);
            }
        }
        Indexed {
            names: &framework.arguments,
            attackers,
            attacked,
        }
    }

    fn len(&self) -> usize {
        self.names.len()
    }

    fn to_extension(&self, members: &[bool]) -> Extension {
        members
            .iter()
            .enumerate()
            .filter(|(_, m)| **m)
            .map(|(i, _)| self.names[i].clone())
            .collect()
    }

    fn grounded(&self) -> Vec<bool> {
        let n = self.len();
        let mut inside = vec![false; n];
        loop {
            let defeated: Vec<bool> = (0..n)
                .map(|i| self.attackers[i].iter().any(|&a| inside[a]))
                .collect();
            let next: Vec<bool> = (0..n)
                .map(|i| self.attackers[i].iter().all(|&a| defeated[a]))
                .collect();
            if next == inside {
                return inside;
            }
            inside = next;
        }
    }

    fn conflict_free(&self, members: &[bool]) -> bool {
        (0..self.len()).all(|i| !members[i] || self.attacked[i].iter().all(|&t| !members[t]))
    }

    fn defeated(&self, members: &[bool]) -> Vec<bool> {
        (0..self.len())
            .map(|i| self.attackers[i].iter().any(|&a| members[a]))
            .collect()
    }

    fn admissible(&self, members: &[bool]) -> bool {
        if !self.conflict_free(members) {
            return false;
        }
        let defeated = self.defeated(members);
        (0..self.len())
            .all(|i| !members[i] || self.attackers[i].iter().all(|&a| defeated[a]))
    }

    fn stable(&self, members: &[bool]) -> bool {
        if !self.conflict_free(members) {
            return false;
        }
        let defeated = self.defeated(members);
        (0..self.len()).all(|i| members[i] || defeated[i])
    }

    /// Every subset passing `accept`, found by backtracking over conflict-free sets
    fn enumerate(&self, accept: &dyn Fn(&[bool]) -> bool) -> Vec<Vec<bool>> {
        let mut found = Vec::new();
        let mut members = vec![false; self.len()];
        self.extend(0, &mut members, accept, &mut found);
        found
    }

    fn extend(
        &self,
        i: usize,
        members: &mut Vec<bool>,
        accept: &dyn Fn(&[bool]) -> bool,
        found: &mut Vec<Vec<bool>>,
    ) {
        if i == self.len() {
            if accept(members) {
                found.push(members.clone());
            }
            return;
        }
        self.extend(i + 1, members, accept, found);
        let clashes = self.attackers[i].iter().any(|&a| a == i || members[a])
            || self.attacked[i].iter().any(|&t| members[t]);
        if !clashes {
            members[i] = true;
            self.extend(i + 1, members, accept, found);
            members[i] = false;
        }
    }

    fn preferred(&self) -> Vec<Vec<bool>> {
        let admissible = self.enumerate(&|m| self.admissible(m));
        let is_subset = |a: &[bool], b: &[bool]| a.iter().zip(b).all(|(x, y)| !*x || *y);
        admissible
            .iter()
            .filter(|a| {
                !admissible
                    .iter()
                    .any(|b| b != *a && is_subset(a.as_slice(), b.as_slice()))
            })
            .cloned()
            .collect()
    }
}

/// Extensions computed in-process
pub fn compute_extensions(
    framework: &Framework,
    semantics: Semantics,
    max_arguments: usize,
) -> SolveOutcome<Extensions> {
    let indexed = Indexed::new(framework);
    if semantics != Semantics::Grounded && indexed.len() > max_arguments {
        return SolveOutcome::Failed(format!(
            "{} arguments exceed the native solver limit of {}",
            indexed.len(),
            max_arguments
        ));
    }
    let sets: Vec<Extension> = match semantics {
        Semantics::Grounded => vec![indexed.to_extension(&indexed.grounded())],
        Semantics::Preferred => indexed
            .preferred()
            .iter()
            .map(|m| indexed.to_extension(m))
            .collect(),
        Semantics::Stable => indexed
            .enumerate(&|m| indexed.stable(m))
            .iter()
            .map(|m| indexed.to_extension(m))
            .collect(),
    };
    SolveOutcome::Solved(Extensions::new(semantics, sets))
}

/// Visit every `k`-combination of `0..n` in lexicographic order until `visit` returns false
fn for_each_combination(n: usize, k: usize, visit: &mut dyn FnMut(&[usize]) -> bool) {
    if k > n {
        return;
    }
    let mut idx: Vec<usize> = (0..k).collect();
    loop {
        if !visit(&idx) {
            return;
        }
        let Some(i) = (0..k).rev().find(|&i| idx[i] != i + n - k) else {
            return;
        };
        idx[i] += 1;
        for j in i + 1..k {
            idx[j] = idx[j - 1] + 1;
        }
    }
}

/// Reference AF solver
pub struct NativeSolver {
    max_arguments: usize,
}

impl NativeSolver {
    pub fn new(max_arguments: usize) -> Self {
        NativeSolver { max_arguments }
    }

    fn goal_accepted(&self, framework: &Framework, problem: &EnforcementProblem) -> Option<bool> {
        compute_extensions(framework, problem.semantics, self.max_arguments)
            .solved()
            .map(|ext| ext.accepts(&problem.goal, problem.acceptance))
    }
}

impl Default for NativeSolver {
    fn default() -> Self {
        NativeSolver::new(24)
    }
}

#[async_trait]
impl AfSolver for NativeSolver {
    fn name(&self) -> &'static str {
        "native"
    }

    async fn extensions(
        &self,
        framework: &Framework,
        semantics: Semantics,
    ) -> SolveOutcome<Extensions> {
        compute_extensions(framework, semantics, self.max_arguments)
    }

    /// Edit sets by increasing size; the first size with a hit is optimal
    async fn enforce(&self, problem: &EnforcementProblem) -> SolveOutcome<Vec<EnforcementModel>> {
        if problem.semantics != Semantics::Grounded
            && problem.framework.arguments.len() > self.max_arguments
        {
            return SolveOutcome::Failed("framework too large for native enforcement".into());
        }
        let candidates: Vec<AfEdit> = problem
            .candidate_edits()
            .into_iter()
            .filter(|e| match e {
                AfEdit::DelAttack { source, target } => problem.framework.attacks(source, target),
                AfEdit::AddAttack { source, target } => !problem.framework.attacks(source, target),
            })
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        for cost in 0..=problem.max_edits {
            let mut models = Vec::new();
            for_each_combination(candidates.len(), cost, &mut |idx| {
                let edits: Vec<AfEdit> = idx.iter().map(|&i| candidates[i].clone()).collect();
                let edited = problem.framework.with_edits(&edits);
                if self.goal_accepted(&edited, problem) == Some(true) {
                    models.push(EnforcementModel {
                        edits,
                        cost,
                        optimal: true,
                    });
                }
                models.len() < problem.max_models
            });
            if !models.is_empty() {
                debug!(cost, count = models.len(), "Native enforcement found models");
                return SolveOutcome::Solved(models);
            }
        }
        SolveOutcome::Solved(vec![])
    }
}
