use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use siv_parser::Lexer;

fn bench_prototypes(c: &mut Criterion) {
    let source = "deny(\"nope\") function isdigit(c: int) requires(c <= -1 || c > 255): bool;\n"
        .repeat(64);

    let mut group = c.benchmark_group("lexer");
    group.throughput(Throughput::Bytes(source.len() as u64));
    group.bench_function("prototypes", |b| {
        b.iter(|| {
            let lexer = Lexer::new(black_box(&source));
            lexer.tokenize().unwrap()
        });
    });
    group.finish();
}

fn bench_expressions(c: &mut Criterion) {
    let source = "pow(1.0, 2 + 3 * 4 - n % 7);\n".repeat(128);

    c.bench_function("lex_expressions", |b| {
        b.iter(|| {
            let lexer = Lexer::new(black_box(&source));
            lexer.tokenize().unwrap()
        });
    });
}

criterion_group!(benches, bench_prototypes, bench_expressions);
criterion_main!(benches);
