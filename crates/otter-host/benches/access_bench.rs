//! Property Access Benchmarks
//!
//! Measures `get` / `set` cost per value kind, including descriptor lookup
//! through a record hierarchy.
//!
//! Run with: cargo bench -p otter-host

use criterion::{Criterion, criterion_group, criterion_main};
use otter_host::{Document, FixedArray, ScriptRecord, Value, get, set};
use std::hint::black_box;

#[derive(ScriptRecord)]
struct Base {
    #[script]
    id: i64,
    #[script]
    label: String,
}

#[derive(ScriptRecord)]
struct Derived {
    #[script(base)]
    base: Base,
    #[script]
    score: f64,
}

fn derived() -> Value {
    Value::record(Derived {
        base: Base {
            id: 7,
            label: "seven".to_string(),
        },
        score: 0.5,
    })
}

/// Benchmark: reads on each collection kind
fn bench_get_by_kind(c: &mut Criterion) {
    let mut group = c.benchmark_group("get");

    let mapping = Value::mapping((0..32).map(|i| (format!("k{i}"), Value::Int32(i))));
    group.bench_function("mapping", |b| {
        b.iter(|| get(black_box(Some(&mapping)), black_box(Some("k17"))))
    });

    let list = Value::list((0..32).map(Value::Int32));
    group.bench_function("ordered_list", |b| {
        b.iter(|| get(black_box(Some(&list)), black_box(Some("17"))))
    });

    let array = Value::array(FixedArray::from((0..32).map(f64::from).collect::<Vec<_>>()));
    group.bench_function("fixed_array", |b| {
        b.iter(|| get(black_box(Some(&array)), black_box(Some("17"))))
    });

    let document = match Document::parse(r#"{"a": 1, "b": {"c": [1, 2, 3]}}"#) {
        Ok(doc) => Value::Document(doc),
        Err(err) => panic!("benchmark document: {err}"),
    };
    group.bench_function("document_node", |b| {
        b.iter(|| get(black_box(Some(&document)), black_box(Some("a"))))
    });

    group.finish();
}

/// Benchmark: descriptor lookup on the concrete type vs an ancestor
fn bench_record_lookup(c: &mut Criterion) {
    let record = derived();

    c.bench_function("record_own_field", |b| {
        b.iter(|| get(black_box(Some(&record)), black_box(Some("score"))))
    });

    c.bench_function("record_inherited_field", |b| {
        b.iter(|| get(black_box(Some(&record)), black_box(Some("label"))))
    });

    c.bench_function("record_write_inherited", |b| {
        b.iter(|| {
            set(
                black_box(Some(&record)),
                black_box(Some("id")),
                Some(Value::Int32(8)),
            )
        })
    });

    c.bench_function("record_keys", |b| {
        b.iter(|| black_box(&record).property_keys())
    });
}

criterion_group!(benches, bench_get_by_kind, bench_record_lookup);
criterion_main!(benches);
