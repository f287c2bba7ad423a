use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use nettools_core::{diff, export_to_bytes, CellValue, DiffOptions, Grid, Workbook};

fn make_grid(name: &str, rows: usize, cols: usize, salt: usize) -> Grid {
    Grid::from_rows(
        name,
        (0..rows).map(|r| {
            (0..cols)
                .map(|c| {
                    if (r * cols + c) % 97 == salt {
                        CellValue::from(format!("changed-{}-{}", r, c))
                    } else if c % 2 == 0 {
                        CellValue::Number((r * c) as f64)
                    } else {
                        CellValue::from(format!("r{}c{}", r, c))
                    }
                })
                .collect::<Vec<_>>()
        }),
    )
}

fn bench_diff(c: &mut Criterion) {
    let mut group = c.benchmark_group("diff");
    for &rows in &[100usize, 1_000, 10_000] {
        let a = make_grid("A", rows, 20, 1);
        let b = make_grid("B", rows, 20, 2);
        group.bench_with_input(BenchmarkId::from_parameter(rows), &rows, |bench, _| {
            bench.iter(|| diff(black_box(&a), black_box(&b), DiffOptions::default()))
        });
    }
    group.finish();
}

fn bench_export(c: &mut Criterion) {
    let a = make_grid("A", 5_000, 20, 1);
    let b = make_grid("B", 5_000, 20, 2);
    let records = diff(&a, &b, DiffOptions::default());

    c.bench_function("export_report", |bench| {
        bench.iter(|| export_to_bytes(black_box(&records)).unwrap())
    });

    let bytes = export_to_bytes(&records).unwrap();
    c.bench_function("load_report", |bench| {
        bench.iter(|| Workbook::load_from_bytes(black_box(&bytes)).unwrap())
    });
}

criterion_group!(benches, bench_diff, bench_export);
criterion_main!(benches);
