//! Inference and export performance benchmarks.
//!
//! Measures parsing, record shape inference, merging and export across
//! catalog sizes.

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use xmlsheet::input::parse_document;
use xmlsheet::inference::ShapeInferencer;
use xmlsheet::{Catalog, parse_catalog};

/// Generate a synthetic catalog with the specified number of records and fields.
fn generate_catalog(records: usize, fields: usize) -> String {
    let mut xml = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<CATALOG>\n");

    for record in 0..records {
        xml.push_str("  <ANIMAL>\n");
        for field in 0..fields {
            // Mix of value shapes
            let value = match field % 4 {
                0 => format!("Animal {:06}", record),
                1 => format!("{:.2}", record as f64 * 1.5),
                2 => format!("Habitat &amp; range {}", record % 10),
                3 => format!("Category_{}", record % 7),
                _ => unreachable!(),
            };
            xml.push_str(&format!("    <FIELD_{field}>{value}</FIELD_{field}>\n"));
        }
        xml.push_str("  </ANIMAL>\n");
    }

    xml.push_str("</CATALOG>\n");
    xml
}

/// Benchmark the XML reader alone.
fn bench_parse_document(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_document");

    for records in [100, 1_000, 10_000].iter() {
        let data = generate_catalog(*records, 10);

        group.throughput(Throughput::Bytes(data.len() as u64));
        group.bench_with_input(BenchmarkId::new("records", records), &data, |b, data| {
            b.iter(|| black_box(parse_document(data).unwrap()))
        });
    }

    group.finish();
}

/// Benchmark record shape inference on an already parsed document.
fn bench_shape_inference(c: &mut Criterion) {
    let mut group = c.benchmark_group("shape_inference");

    for records in [100, 1_000, 10_000].iter() {
        let document = parse_document(&generate_catalog(*records, 10)).unwrap();
        let inferencer = ShapeInferencer::new();

        group.bench_with_input(BenchmarkId::new("records", records), &document, |b, document| {
            b.iter(|| black_box(inferencer.infer(document).unwrap().schema))
        });
    }

    group.finish();
}

/// Benchmark the full parse pipeline with varying field counts.
fn bench_parse_catalog(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_catalog");

    for fields in [5, 10, 20].iter() {
        let data = generate_catalog(1_000, *fields);

        group.throughput(Throughput::Bytes(data.len() as u64));
        group.bench_with_input(BenchmarkId::new("fields", fields), &data, |b, data| {
            b.iter(|| black_box(parse_catalog(data).unwrap()))
        });
    }

    group.finish();
}

/// Benchmark merging and exporting with an overlay in place.
fn bench_merge_and_export(c: &mut Criterion) {
    let mut group = c.benchmark_group("merge_and_export");

    let mut catalog = Catalog::in_memory();
    catalog.load_xml(generate_catalog(1_000, 10)).unwrap();
    for id in (1..=1_000).step_by(3) {
        let id = id.to_string();
        catalog.add_custom_field(&id, "slot_2", "FIELD_1", "0.00").unwrap();
        catalog.add_custom_field(&id, "notes", "Notes", "checked").unwrap();
    }

    group.bench_function("merge", |b| b.iter(|| black_box(catalog.merge_with_source_data())));
    group.bench_function("export_xml", |b| b.iter(|| black_box(catalog.export_xml().unwrap())));
    group.bench_function("export_csv", |b| b.iter(|| black_box(catalog.export_csv().unwrap())));

    group.finish();
}

criterion_group!(
    benches,
    bench_parse_document,
    bench_shape_inference,
    bench_parse_catalog,
    bench_merge_and_export,
);
criterion_main!(benches);
