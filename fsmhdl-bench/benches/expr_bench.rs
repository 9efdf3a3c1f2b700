//! Expression engine benchmarks.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use fsmhdl_expr::{Bindings, Expr};

/// Builds `(x0 | y0) & (x1 | y1) & ...`, whose DNF has 2^n terms.
fn product_of_sums(n: usize) -> String {
    (0..n)
        .map(|i| format!("(x{} | y{})", i, i))
        .collect::<Vec<_>>()
        .join(" & ")
}

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("expr_parse");

    for n in [2, 8, 32] {
        let text = product_of_sums(n);
        group.throughput(Throughput::Bytes(text.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(n), &text, |b, text| {
            b.iter(|| black_box(Expr::parse(text).unwrap()))
        });
    }

    group.finish();
}

fn bench_normal_forms(c: &mut Criterion) {
    let mut group = c.benchmark_group("expr_normal_forms");

    for n in [2, 4, 6] {
        let expr = Expr::parse(&product_of_sums(n)).unwrap();
        group.bench_with_input(BenchmarkId::new("dnf", n), &expr, |b, expr| {
            b.iter(|| black_box(expr.to_dnf()))
        });
        group.bench_with_input(BenchmarkId::new("cnf", n), &expr, |b, expr| {
            b.iter(|| black_box(expr.to_cnf()))
        });
    }

    group.finish();
}

fn bench_substitute(c: &mut Criterion) {
    let mut group = c.benchmark_group("expr_substitute");

    let expr = Expr::parse(&product_of_sums(16)).unwrap();
    let half: Bindings = (0..8).map(|i| (format!("x{}", i), true)).collect();
    let all: Bindings = (0..16)
        .flat_map(|i| [(format!("x{}", i), false), (format!("y{}", i), true)])
        .collect();

    group.bench_function("partial", |b| b.iter(|| black_box(expr.substitute(&half))));
    group.bench_function("full", |b| b.iter(|| black_box(expr.substitute(&all))));
    group.bench_function("simplify", |b| b.iter(|| black_box(expr.simplify())));

    group.finish();
}

fn bench_lowering(c: &mut Criterion) {
    let expr = Expr::parse("a & (b | ~c) | ~(d & e) | f & g & ~h").unwrap();
    c.bench_function("expr_to_relational", |b| {
        b.iter(|| black_box(expr.to_relational().unwrap()))
    });
}

criterion_group!(
    benches,
    bench_parse,
    bench_normal_forms,
    bench_substitute,
    bench_lowering
);
criterion_main!(benches);
