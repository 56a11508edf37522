//! Prediction latency benchmarks.
//!
//! Measures request parsing, column alignment and end-to-end prediction.

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use serde_json::{json, Value};

use xg_serving::engine::{align, resolve_schema, Classifier, FeatureTable, LogisticRegression, PredictionService};
use xg_serving::models::{ActiveModelSlot, LoadedModel};

const ROW_COUNTS: [usize; 3] = [10, 1_000, 50_000];

fn payload(rows: usize) -> Value {
    let distance: Vec<f64> = (0..rows).map(|i| (i % 90) as f64).collect();
    let angle: Vec<f64> = (0..rows).map(|i| (i % 180) as f64 - 90.0).collect();
    let period: Vec<f64> = (0..rows).map(|i| (i % 3 + 1) as f64).collect();
    json!({ "period": period, "angle_from_net": angle, "distance_from_net": distance })
}

fn predictor() -> PredictionService {
    let classifier: Arc<dyn Classifier> = Arc::new(
        LogisticRegression::new(vec![-0.06, -0.01], 0.4).with_feature_names(["distance_from_net", "angle_from_net"]),
    );
    let schema = resolve_schema(classifier.as_ref(), "logreg_distance_angle");
    let slot = Arc::new(ActiveModelSlot::new());
    slot.commit(LoadedModel::new("logreg_distance_angle", "v1", classifier, schema));
    PredictionService::new(slot)
}

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_feature_table");

    for rows in ROW_COUNTS {
        let body = payload(rows);
        group.throughput(Throughput::Elements(rows as u64));
        group.bench_with_input(BenchmarkId::from_parameter(rows), &body, |b, body| {
            b.iter(|| FeatureTable::from_json(black_box(body)))
        });
    }

    group.finish();
}

fn bench_align(c: &mut Criterion) {
    let mut group = c.benchmark_group("align");
    let schema = vec!["distance_from_net".to_string(), "angle_from_net".to_string()];

    for rows in ROW_COUNTS {
        let table = FeatureTable::from_json(&payload(rows)).unwrap();
        group.throughput(Throughput::Elements(rows as u64));
        group.bench_with_input(BenchmarkId::new("declared", rows), &table, |b, t| {
            b.iter(|| align(black_box(t), Some(&schema), 2))
        });
        group.bench_with_input(BenchmarkId::new("alphabetical", rows), &table, |b, t| {
            b.iter(|| align(black_box(t), None, 3))
        });
    }

    group.finish();
}

fn bench_predict(c: &mut Criterion) {
    let mut group = c.benchmark_group("predict_end_to_end");
    let service = predictor();

    for rows in ROW_COUNTS {
        let body = serde_json::to_vec(&payload(rows)).unwrap();
        group.throughput(Throughput::Elements(rows as u64));
        group.bench_with_input(BenchmarkId::from_parameter(rows), &body, |b, body| {
            b.iter(|| service.predict_bytes(black_box(body)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_parse, bench_align, bench_predict);
criterion_main!(benches);
