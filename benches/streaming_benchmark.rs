use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use csvstream::{CsvReader, Parser, ParserOptions};
use std::io::Write;
use tempfile::NamedTempFile;

fn prepare_file(size: usize) -> NamedTempFile {
    let mut temp = NamedTempFile::new().unwrap();
    writeln!(temp, "ID,Name,Value").unwrap();
    for i in 0..size {
        writeln!(temp, "{},\"Name, {}\",{}", i, i, i * 100).unwrap();
    }
    temp.flush().unwrap();
    temp
}

fn benchmark_sync_read(c: &mut Criterion) {
    let mut group = c.benchmark_group("sync_read");

    for size in [1000, 10000, 100000].iter() {
        let temp = prepare_file(*size);

        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| {
                let options = ParserOptions::builder()
                    .skip_first_line(true)
                    .resolve()
                    .unwrap();
                let mut reader = CsvReader::open(temp.path(), options).unwrap();
                for row_result in reader.rows() {
                    black_box(row_result.unwrap());
                }
            });
        });
    }

    group.finish();
}

fn benchmark_async_advance(c: &mut Criterion) {
    let mut group = c.benchmark_group("async_advance");
    let runtime = tokio::runtime::Runtime::new().unwrap();

    for size in [1000, 10000].iter() {
        let temp = prepare_file(*size);

        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| {
                runtime.block_on(async {
                    let parser = Parser::open(temp.path(), ParserOptions::default()).unwrap();
                    loop {
                        let result = parser.advance().await.unwrap();
                        if result.done {
                            break;
                        }
                        black_box(result.value);
                    }
                })
            });
        });
    }

    group.finish();
}

fn benchmark_windowed_skip(c: &mut Criterion) {
    let mut group = c.benchmark_group("windowed_skip");
    let temp = prepare_file(100000);

    for from_line in [0i64, 50000, 99000].iter() {
        group.bench_with_input(
            BenchmarkId::from_parameter(from_line),
            from_line,
            |b, &from_line| {
                b.iter(|| {
                    let options = ParserOptions::builder()
                        .from_line(from_line)
                        .to_line(from_line + 1000)
                        .resolve()
                        .unwrap();
                    let mut reader = CsvReader::open(temp.path(), options).unwrap();
                    black_box(reader.rows().count());
                });
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    benchmark_sync_read,
    benchmark_async_advance,
    benchmark_windowed_skip
);
criterion_main!(benches);
