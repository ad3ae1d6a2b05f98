// SPDX-FileCopyrightText: 2026 ARGIR Project Team
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Structural quality scores for the support graph
//!
//! These say nothing about logical validity. Each score lies in `[0, 1]`.

use petgraph::algo::all_simple_paths;
use petgraph::graphmap::DiGraphMap;
use petgraph::visit::{Dfs, Reversed};
use petgraph::Direction;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::core::Argir;

/// Paths beyond this count do not raise the redundancy score
const SATURATING_PATHS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct QualityMetrics {
    pub tree: f64,
    pub density: f64,
    pub redundancy: f64,
    pub balance: f64,
    pub overall: f64,
}

type SupportGraph<'a> = DiGraphMap<&'a str, ()>;

fn support_graph(argir: &Argir) -> SupportGraph<'_> {
    let mut graph = DiGraphMap::new();
    for node in &argir.graph.nodes {
        graph.add_node(node.id.as_str());
    }
    for edge in argir.graph.support_edges() {
        if graph.contains_node(edge.source.as_str()) && graph.contains_node(edge.target.as_str()) {
            graph.add_edge(edge.source.as_str(), edge.target.as_str(), ());
        }
    }
    graph
}

fn in_degree(graph: &SupportGraph<'_>, n: &str) -> usize {
    graph.neighbors_directed(n, Direction::Incoming).count()
}

fn out_degree(graph: &SupportGraph<'_>, n: &str) -> usize {
    graph.neighbors_directed(n, Direction::Outgoing).count()
}

fn sources<'a>(graph: &SupportGraph<'a>) -> Vec<&'a str> {
    graph.nodes().filter(|n| in_degree(graph, n) == 0).collect()
}

fn sinks<'a>(graph: &SupportGraph<'a>) -> Vec<&'a str> {
    graph.nodes().filter(|n| out_degree(graph, n) == 0).collect()
}

/// Many premises converging on few conclusions
fn tree_score(graph: &SupportGraph<'_>) -> f64 {
    let sinks = sinks(graph).len();
    if sinks == 0 {
        return 0.0;
    }
    let ratio = sources(graph).len() as f64 / sinks as f64;
    (ratio / 3.0).min(1.0)
}

fn density_score(graph: &SupportGraph<'_>) -> f64 {
    let n = graph.node_count();
    if n <= 1 {
        return 0.0;
    }
    let density = graph.edge_count() as f64 / (n * (n - 1)) as f64;
    (density / 0.2).min(1.0)
}

/// Independent support paths into the goal, or the first sink
fn redundancy_score<'a>(graph: &SupportGraph<'a>, goal: Option<&'a str>) -> f64 {
    let target = match goal.filter(|g| graph.contains_node(*g)) {
        Some(goal) => goal,
        None => match sinks(graph).first() {
            Some(sink) => *sink,
            None => return 0.0,
        },
    };
    // Restrict to nodes that reach the target so path search never wanders into dead ends
    let reversed = Reversed(graph);
    let mut ancestors: HashSet<&str> = HashSet::new();
    let mut dfs = Dfs::new(reversed, target);
    while let Some(n) = dfs.next(reversed) {
        ancestors.insert(n);
    }
    let mut pruned: SupportGraph<'a> = DiGraphMap::new();
    for (s, t, _) in graph.all_edges() {
        if ancestors.contains(s) && ancestors.contains(t) {
            pruned.add_edge(s, t, ());
        }
    }

    let mut paths = 0;
    for source in sources(graph) {
        if source == target || !ancestors.contains(source) {
            continue;
        }
        paths += all_simple_paths::<Vec<&str>, _>(&pruned, source, target, 0, None)
            .take(SATURATING_PATHS - paths.min(SATURATING_PATHS))
            .count();
        if paths >= SATURATING_PATHS {
            break;
        }
    }
    (paths as f64 / SATURATING_PATHS as f64).min(1.0)
}

/// Branching and convergence rather than a linear chain
fn balance_score(graph: &SupportGraph<'_>) -> f64 {
    let total = graph.node_count();
    if total <= 2 {
        return 1.0;
    }
    let (mut linear, mut branching, mut converging) = (0usize, 0usize, 0usize);
    for n in graph.nodes() {
        let (i, o) = (in_degree(graph, n), out_degree(graph, n));
        if i == 1 && o == 1 {
            linear += 1;
        }
        if o > 1 {
            branching += 1;
        }
        if i > 1 {
            converging += 1;
        }
    }
    let linear_ratio = linear as f64 / total as f64;
    let structure = (branching + converging) as f64 / total as f64;
    (1.0 - linear_ratio) * structure
}

/// Score the support structure of `argir`
pub fn quality_metrics(argir: &Argir) -> QualityMetrics {
    if argir.graph.nodes.is_empty() {
        return QualityMetrics::default();
    }
    let graph = support_graph(argir);
    let tree = tree_score(&graph);
    let density = density_score(&graph);
    let redundancy = redundancy_score(&graph, argir.goal_id());
    let balance = balance_score(&graph);
    QualityMetrics {
        tree,
        density,
        redundancy,
        balance,
        overall: (tree + density + redundancy + balance) / 4.0,
    }
}

impl QualityMetrics {
    /// Short plain-text reading of the scores
    pub fn describe(&self) -> String {
        let mut lines: Vec<String> = Vec::new();
        let mut grade = |score: f64, good: &str, bad: &str| {
            if score > 0.7 {
                lines.push(format!("+ {}", good));
            } else if score < 0.3 {
                lines.push(format!("- {}", bad));
            }
        };
        grade(self.tree, "Premises converge on few conclusions", "Few premises per conclusion");
        grade(self.density, "Densely connected claims", "Sparse connections between claims");
        grade(self.redundancy, "Several independent paths to the conclusion", "Conclusion hangs on a single path");
        grade(self.balance, "Mix of branching and convergence", "Linear chain without branching");

        let summary = if self.overall > 0.7 {
            "Strong"
        } else if self.overall > 0.4 {
            "Moderate"
        } else {
            "Weak"
        };
        lines.push(format!(
            "Overall: {} argumentative structure (score: {:.2})",
            summary, self.overall
        ));
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ArgumentGraph, Edge, Node};

    fn graph(ids: &[&str], supports: &[(&str, &str)]) -> Argir {
        Argir::new(
            "",
            ArgumentGraph {
                nodes: ids.iter().map(|id| Node::new(*id)).collect(),
                edges: supports.iter().map(|(s, t)| Edge::support(*s, *t)).collect(),
            },
        )
    }

    #[test]
    fn test_converging_tree() {
        let argir = graph(&["a", "b", "c", "g"], &[("a", "g"), ("b", "g"), ("c", "g")]);
        let m = quality_metrics(&argir);
        assert_eq!(m.tree, 1.0);
        assert_eq!(m.redundancy, 1.0);
        assert!((m.density - 1.0).abs() < 1e-9);
        assert!((m.balance - 0.25).abs() < 1e-9);
        assert!((m.overall - 0.8125).abs() < 1e-9);
    }

    #[test]
    fn test_linear_chain_scores_low() {
        let argir = graph(&["a", "b", "c", "d"], &[("a", "b"), ("b", "c"), ("c", "d")]);
        let m = quality_metrics(&argir);
        assert!((m.tree - 1.0 / 3.0).abs() < 1e-9);
        assert_eq!(m.balance, 0.0);
        assert!(m.describe().contains("Linear chain"));
    }

    #[test]
    fn test_redundancy_skips_sources_that_miss_the_goal() {
        let dense: Vec<String> = (0..24).map(|i| format!("d{}", i)).collect();
        let mut ids: Vec<&str> = vec!["s", "g"];
        ids.extend(dense.iter().map(String::as_str));
        let mut supports = vec![("s", "g")];
        for i in 0..dense.len() {
            for j in i + 1..dense.len() {
                supports.push((dense[i].as_str(), dense[j].as_str()));
            }
        }
        let mut argir = graph(&ids, &supports);
        argir.metadata.goal_id = Some("g".into());
        let m = quality_metrics(&argir);
        assert!((m.redundancy - 1.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_and_tiny_graphs() {
        assert_eq!(quality_metrics(&graph(&[], &[])), QualityMetrics::default());
        let m = quality_metrics(&graph(&["a"], &[]));
        assert_eq!(m.density, 0.0);
        assert_eq!(m.balance, 1.0);
    }
}
