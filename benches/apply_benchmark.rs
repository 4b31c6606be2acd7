//! Benchmarks for applying task lists and for the dataset codec.
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use geopatch::dataset::{Domain, GeoSite, GeoSiteList};
use geopatch::{apply_tasks, DatasetReader, DatasetWriter, Task};

/// Generate a dataset with `entries` records of `domains_per_entry` rules each.
fn generate_dataset(entries: usize, domains_per_entry: usize) -> GeoSiteList {
    let sites = (0..entries)
        .map(|i| {
            let domains = (0..domains_per_entry)
                .map(|j| Domain::root(format!("host{}.site{}.example", j, i)))
                .collect();
            GeoSite::with_domains(format!("CODE{}", i), domains)
        })
        .collect();
    GeoSiteList::from_entries(sites)
}

fn generate_tasks() -> Vec<Task> {
    vec![
        Task::add("*", &["tracker.example", "ads.example"]),
        Task::remove("code1", &["host0.site1.example", "host1.site1.example"]),
        Task::copy("code2", "merged"),
        Task::copy("code3", "merged"),
        Task::delete(&["code4", "code5"]),
    ]
}

fn bench_apply(c: &mut Criterion) {
    let mut group = c.benchmark_group("apply_tasks");
    let tasks = generate_tasks();

    for (entries, per_entry) in [(100, 100), (1_000, 100), (100, 10_000)] {
        let dataset = generate_dataset(entries, per_entry);
        group.throughput(Throughput::Elements((entries * per_entry) as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}x{}", entries, per_entry)),
            &dataset,
            |b, dataset| {
                b.iter(|| {
                    let mut list = dataset.clone();
                    black_box(apply_tasks(&mut list, &tasks))
                })
            },
        );
    }

    group.finish();
}

fn bench_codec(c: &mut Criterion) {
    let dataset = generate_dataset(1_000, 100);
    let data = DatasetWriter::new().encode(&dataset).unwrap();

    let mut group = c.benchmark_group("codec");
    group.throughput(Throughput::Bytes(data.len() as u64));

    group.bench_function("decode", |b| {
        b.iter(|| DatasetReader::decode(black_box(&data)).unwrap())
    });

    group.bench_function("encode", |b| {
        let mut writer = DatasetWriter::new();
        b.iter(|| writer.encode(black_box(&dataset)).unwrap())
    });

    group.finish();
}

criterion_group!(benches, bench_apply, bench_codec);
criterion_main!(benches);
