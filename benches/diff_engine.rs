//! Diff engine benchmark over synthetic archives

use std::io::{Cursor, Write};

use criterion::{criterion_group, criterion_main, Criterion};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use pakdiff::diff::jar_diff;
use pakdiff::mapping::ApiMapping;
use pakdiff::model::Jar;

/// Build an archive with `count` entries; `variant` perturbs a tenth of
/// the contents so the two sides share most entries but not all.
fn synthetic_jar(count: usize, variant: u8) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();
    for i in 0..count {
        let path = format!("res/raw/file_{i:04}.bin");
        writer.start_file(path, options).expect("start entry");
        let byte = if i % 10 == 0 { variant } else { 0 };
        let content = vec![byte; 64 + i % 512];
        writer.write_all(&content).expect("write entry");
    }
    writer.finish().expect("finish zip").into_inner()
}

fn bench_jar_diff(c: &mut Criterion) {
    let old_bytes = synthetic_jar(1000, 0);
    let new_bytes = synthetic_jar(1000, 1);
    let old = Jar::parse(&old_bytes, &ApiMapping::empty()).expect("parse old");
    let new = Jar::parse(&new_bytes, &ApiMapping::empty()).expect("parse new");

    c.bench_function("jar_diff_1000_entries", |b| {
        b.iter(|| jar_diff(&old, &new).expect("diff"))
    });
}

fn bench_parse(c: &mut Criterion) {
    let bytes = synthetic_jar(1000, 0);
    c.bench_function("jar_parse_1000_entries", |b| {
        b.iter(|| Jar::parse(&bytes, &ApiMapping::empty()).expect("parse"))
    });
}

criterion_group!(benches, bench_jar_diff, bench_parse);
criterion_main!(benches);
