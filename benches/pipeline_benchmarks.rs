// SPDX-FileCopyrightText: 2026 ARGIR Project Team
// SPDX-License-Identifier: PMPL-1.0-or-later

// Criterion benchmarks for compilation, translation and AF evaluation

use argir::compile::compile_soft_ir;
use argir::config::CompileOptions;
use argir::fol::{translate, TranslateOptions};
use argir::semantics::{AfSolver, Framework, NativeSolver, Semantics};
use argir::soft::{SoftEdge, SoftGraph, SoftIr, SoftNode, SoftPremise, SoftStatement};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

/// A chain of `n` inferences, each resting on the previous one
fn chain_draft(n: usize) -> SoftIr {
    let nodes = (0..n)
        .map(|i| SoftNode {
            id: Some(format!("n{}", i)),
            premises: vec![SoftPremise::Stmt(SoftStatement::new(format!("step {}", i), &["x"]))],
            conclusion: Some(SoftStatement::new(format!("step {}", i + 1), &["x"])),
            ..Default::default()
        })
        .collect();
    let edges = (1..n)
        .map(|i| SoftEdge {
            source: format!("n{}", i - 1),
            target: format!("n{}", i),
            kind: "support".into(),
            attack_kind: None,
            rationale: None,
        })
        .collect();
    SoftIr {
        graph: SoftGraph { nodes, edges },
        ..Default::default()
    }
}

/// `n` arguments in an attack cycle
fn ring(n: usize) -> Framework {
    let args: Vec<String> = (0..n).map(|i| format!("a{}", i)).collect();
    let attacks = (0..n).map(|i| (args[i].clone(), args[(i + 1) % n].clone())).collect();
    Framework::new(args, attacks)
}

fn bench_compile(c: &mut Criterion) {
    let mut group = c.benchmark_group("compile");
    let options = CompileOptions::default();
    for n in [10, 50, 200] {
        let draft = chain_draft(n);
        group.bench_with_input(BenchmarkId::new("soft_chain", n), &draft, |b, draft| {
            b.iter(|| compile_soft_ir(black_box(draft), &options, None))
        });
    }
    group.finish();
}

fn bench_translate(c: &mut Criterion) {
    let mut group = c.benchmark_group("translate");
    for n in [10, 50, 200] {
        let argir = compile_soft_ir(&chain_draft(n), &CompileOptions::default(), None).argir;
        group.bench_with_input(BenchmarkId::new("tptp", n), &argir, |b, argir| {
            b.iter(|| translate(black_box(argir), &TranslateOptions::default()).problem.to_tptp())
        });
    }
    group.finish();
}

fn bench_native_semantics(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().expect("tokio runtime");
    let solver = NativeSolver::default();
    let mut group = c.benchmark_group("native_semantics");
    for semantics in Semantics::all() {
        for n in [5, 9, 13] {
            let framework = ring(n);
            group.bench_with_input(
                BenchmarkId::new(semantics.as_str(), n),
                &framework,
                |b, framework| {
                    b.to_async(&runtime)
                        .iter(|| async { solver.extensions(black_box(framework), semantics).await })
                },
            );
        }
    }
    group.finish();
}

criterion_group!(benches, bench_compile, bench_translate, bench_native_semantics);
criterion_main!(benches);
