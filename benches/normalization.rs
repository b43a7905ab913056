use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use csv_width::{parse_str, Dialect, NormalizeOptions, Pipeline};

fn ragged_table(rows: usize) -> String {
    let mut table = String::from("id,name,email,notes\n");
    for i in 0..rows {
        match i % 4 {
            0 => table.push_str(&format!("{},user{}\n", i, i)),
            1 => table.push_str(&format!("{},user{},u{}@x.com,\"a, b\",extra\n", i, i, i)),
            2 => table.push_str(&format!("{},\"multi\nline\",u{}@x.com,ok\n", i, i)),
            _ => table.push_str(&format!("{},\"He said \"\"hi\"\"\",u{}@x.com,\n", i, i)),
        }
    }
    table
}

fn benchmark_tokenize(c: &mut Criterion) {
    let table = ragged_table(1_000);
    let dialect = Dialect::new();

    c.bench_function("tokenize_1000_rows", |b| {
        b.iter(|| parse_str(black_box(&table), &dialect))
    });
}

fn benchmark_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("normalize");
    let pipeline = Pipeline::new(NormalizeOptions::new());

    for size in [100, 1_000, 10_000].iter() {
        let table = ragged_table(*size);

        group.bench_with_input(BenchmarkId::new("sequential", size), &table, |b, table| {
            b.iter(|| {
                let mut out = Vec::with_capacity(table.len());
                pipeline.run(black_box(table.as_bytes()), &mut out)
            })
        });

        group.bench_with_input(BenchmarkId::new("threaded", size), &table, |b, table| {
            b.iter(|| {
                let mut out = Vec::with_capacity(table.len());
                pipeline.run_threaded(black_box(table.as_bytes()), &mut out, 256)
            })
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_tokenize, benchmark_pipeline);
criterion_main!(benches);
