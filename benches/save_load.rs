//! This bench test saves and reloads an animal file holding a few hundred
//! records, the upper end of what a single stable keeps.

#![allow(missing_docs)]

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use feedstock::{storage, AnimalRecord};
use tempfile::TempDir;

/// Generates records with distinct species, stock levels and optional dates
fn records(count: usize) -> Vec<AnimalRecord> {
    (0..count)
        .map(|i| {
            let mut record = AnimalRecord::sample(format!("Tier {i}"), "Heu");
            #[allow(clippy::cast_precision_loss)]
            {
                record.current_stock = i as f64 * 1.25;
            }
            if i % 3 == 0 {
                record.reorder_date = None;
            }
            record
        })
        .collect()
}

fn save(c: &mut Criterion) {
    let records = records(300);
    c.bench_function("save 300 records", |b| {
        b.iter_batched(
            || TempDir::new().unwrap(),
            |tmp_dir| {
                storage::save(black_box(&records), &tmp_dir.path().join("animals.xml")).unwrap();
            },
            BatchSize::SmallInput,
        );
    });
}

fn load(c: &mut Criterion) {
    let tmp_dir = TempDir::new().unwrap();
    let path = tmp_dir.path().join("animals.xml");
    storage::save(&records(300), &path).unwrap();

    c.bench_function("load 300 records", |b| {
        b.iter(|| storage::load(black_box(&path)).unwrap());
    });
}

criterion_group!(benches, save, load);
criterion_main!(benches);
