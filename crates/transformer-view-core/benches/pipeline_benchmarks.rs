//! Benchmarks for the render path
//!
//! Measures convention lookup, collection transformation with and without
//! includes, and serializer overhead.
//!
//! Copyright (c) 2025 Transformer View Team
//! Licensed under the Apache-2.0 license

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use serde_json::json;
use std::sync::Arc;
use transformer_view_core::{
    PipelineConfig, Record, RenderOptions, SerializerKind, TransformPipeline, TransformerRegistry,
    ViewData, ViewValue,
};

const POST: &str = "App\\Model\\Entity\\Post";

fn create_posts(count: usize) -> ViewValue {
    ViewValue::list((0..count).map(|i| {
        Record::new(POST)
            .with_field("id", i as i64)
            .with_field("title", format!("Post {}", i))
            .with_field("body", "Lorem ipsum dolor sit amet")
            .with_relation(
                "author",
                Record::new("App\\Model\\Entity\\User")
                    .with_field("id", (i % 10) as i64)
                    .with_field("name", format!("User {}", i % 10)),
            )
    }))
}

fn create_pipeline(serializer: SerializerKind) -> TransformPipeline {
    let mut registry = TransformerRegistry::new();
    registry
        .register_definition(
            "App\\Model\\Transformer\\PostTransformer",
            serde_json::from_value(json!({
                "fields": ["id", "title"],
                "rename": {"title": "headline"},
                "includes": {"author": {}}
            }))
            .expect("valid definition"),
        )
        .expect("post transformer registers");
    registry
        .register_definition(
            "App\\Model\\Transformer\\UserTransformer",
            serde_json::from_value(json!({"fields": ["name"]})).expect("valid definition"),
        )
        .expect("user transformer registers");

    TransformPipeline::new(
        Arc::new(registry),
        PipelineConfig::default().with_serializer_kind(serializer),
    )
}

fn bench_collection_sizes(c: &mut Criterion) {
    let pipeline = create_pipeline(SerializerKind::Array);
    let options = RenderOptions::new();
    let mut group = c.benchmark_group("render_collection");

    for size in [10usize, 100, 1000] {
        let data = ViewData::named([("posts", create_posts(size))]);
        group.bench_with_input(BenchmarkId::from_parameter(size), &data, |b, data| {
            b.iter(|| pipeline.render(black_box(&options), data.clone()))
        });
    }

    group.finish();
}

fn bench_includes(c: &mut Criterion) {
    let pipeline = create_pipeline(SerializerKind::Array);
    let data = ViewData::named([("posts", create_posts(100))]);
    let plain = RenderOptions::new();
    let with_author = RenderOptions::new().includes("author");

    c.bench_function("render_without_includes", |b| {
        b.iter(|| pipeline.render(black_box(&plain), data.clone()))
    });
    c.bench_function("render_with_author_include", |b| {
        b.iter(|| pipeline.render(black_box(&with_author), data.clone()))
    });
}

fn bench_serializers(c: &mut Criterion) {
    let data = ViewData::named([("posts", create_posts(100))]);
    let options = RenderOptions::new();
    let mut group = c.benchmark_group("serializer");

    for kind in [SerializerKind::Array, SerializerKind::Data, SerializerKind::Keyed] {
        let pipeline = create_pipeline(kind);
        group.bench_with_input(BenchmarkId::from_parameter(kind), &data, |b, data| {
            b.iter(|| pipeline.render(black_box(&options), data.clone()))
        });
    }

    group.finish();
}

fn bench_pass_through(c: &mut Criterion) {
    let pipeline = create_pipeline(SerializerKind::Array);
    let options = RenderOptions::new();
    let data = ViewData::named([
        ("tags", ViewValue::list((0..100).map(|i| Record::new("App\\Model\\Entity\\Tag").with_field("id", i)))),
        ("count", ViewValue::Plain(json!(100))),
    ]);

    c.bench_function("pass_through", |b| {
        b.iter(|| pipeline.render(black_box(&options), data.clone()))
    });
}

criterion_group!(
    benches,
    bench_collection_sizes,
    bench_includes,
    bench_serializers,
    bench_pass_through
);
criterion_main!(benches);
