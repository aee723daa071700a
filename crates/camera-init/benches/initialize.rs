use std::hint::black_box;

use camera_init::core::tags;
use camera_init::{initialize_cameras, CameraInitParams, Datasheet, GroupingPolicy, Project, View};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

fn synthetic_project(count: u32) -> Project {
    let cameras = [("Canon", "Canon EOS 5D"), ("NIKON", "NIKON D800"), ("Acme", "")];
    Project::from_views((0..count).map(|i| {
        let (make, model) = cameras[(i % 3) as usize];
        let view = View::new(i, format!("/data/seq{}/{i:06}.jpg", i % 7), 6000, 4000);
        match make {
            "Acme" => view.with_metadata(tags::FOCAL_LENGTH_IN_35MM, "28"),
            _ => view
                .with_metadata(tags::MAKE, make)
                .with_metadata(tags::MODEL, model)
                .with_metadata(tags::FOCAL_LENGTH, "35"),
        }
    }))
}

fn bench_initialize(c: &mut Criterion) {
    let db = vec![
        Datasheet::new("Canon", "Canon EOS 5D", 35.8),
        Datasheet::new("NIKON CORPORATION", "NIKON D800", 35.9),
    ];
    let mut group = c.benchmark_group("initialize");
    for policy in [GroupingPolicy::Ungrouped, GroupingPolicy::MetadataOrFolder] {
        let params = CameraInitParams {
            grouping: policy,
            ..CameraInitParams::default()
        };
        for count in [1_000u32, 10_000] {
            let project = synthetic_project(count);
            group.bench_with_input(
                BenchmarkId::new(policy.to_string(), count),
                &project,
                |b, project| {
                    b.iter(|| initialize_cameras(black_box(project.clone()), &params, &db))
                },
            );
        }
    }
    group.finish();
}

criterion_group!(benches, bench_initialize);
criterion_main!(benches);
