use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use gridshift_core::GridRange;
use gridshift_refs::{move_block_references, offset_formula, scan, shift_formula, ShiftOperation};

fn sample_formula(terms: usize) -> String {
    let parts: Vec<String> = (1..=terms)
        .map(|i| match i % 4 {
            0 => format!("SUM(A{}:C{})", i, i + 10),
            1 => format!("$B${}", i),
            2 => format!("'Q1 Sales'!D{}", i),
            _ => format!("\"E{}\"", i),
        })
        .collect();
    format!("={}", parts.join("+"))
}

fn bench_rewrite(c: &mut Criterion) {
    let mut group = c.benchmark_group("Rewrite");

    for terms in [4usize, 32, 256] {
        let formula = sample_formula(terms);

        group.bench_with_input(BenchmarkId::new("Scan", terms), &formula, |b, f| {
            b.iter(|| scan(black_box(f)))
        });

        let op = ShiftOperation::insert_rows(5, 3);
        group.bench_with_input(BenchmarkId::new("ShiftRows", terms), &formula, |b, f| {
            b.iter(|| shift_formula(black_box(f), "Sheet1", "Sheet1", &op))
        });

        group.bench_with_input(BenchmarkId::new("Offset", terms), &formula, |b, f| {
            b.iter(|| offset_formula(black_box(f), 2, 1))
        });

        let block = GridRange::from_indices(1, 1, 100, 3);
        group.bench_with_input(BenchmarkId::new("MoveBlock", terms), &formula, |b, f| {
            b.iter(|| move_block_references(black_box(f), "Sheet1", "Sheet1", &block, |a| a.offset(0, 5)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_rewrite);
criterion_main!(benches);
