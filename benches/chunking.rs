use criterion::{Criterion, criterion_group, criterion_main};
use knowledge_rag::corpus::{ChunkingConfig, chunk_document};
use std::hint::black_box;

const SENTENCES: &[&str] = &[
    "Стены можно выровнять гипсовой штукатуркой по маякам",
    "Плитка в ванной крепится на цементный клей поверх гидроизоляции",
    "Электрика кухни требует отдельного автомата и устройства защитного отключения",
    "Ламинат укладывают на ровное основание с подложкой и зазором у стен",
    "Потолок из гипсокартона монтируют на металлический каркас",
];

fn synthetic_document(sentences: usize) -> String {
    (0..sentences)
        .map(|i| SENTENCES[i % SENTENCES.len()])
        .collect::<Vec<_>>()
        .join(". ")
}

pub fn criterion_benchmark(c: &mut Criterion) {
    let document = synthetic_document(5_000);
    let config = ChunkingConfig::default();
    c.bench_function("chunking", |b| {
        b.iter(|| chunk_document(black_box(&document), black_box(&config)))
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
