use std::collections::HashSet;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use maildraft_dnd::{resolve, DragSubject, DropSurface, Point, Rect, SurfaceRegistry};
use maildraft_document::{BlockKind, ContainerRef};

/// A vertical stack of `count` sections, each holding a three-column row
fn stacked_sections(count: usize) -> SurfaceRegistry {
    let mut surfaces = SurfaceRegistry::new();
    let height = 200.0;

    surfaces.register(
        DropSurface::new(
            ContainerRef::new("root"),
            BlockKind::EmailLayout.default_accepts(),
            Rect::new(0.0, 0.0, 600.0, height * count as f32),
        )
        .with_children(
            (0..count)
                .map(|i| Rect::new(0.0, height * i as f32, 600.0, height))
                .collect(),
        ),
    );

    for i in 0..count {
        let y = height * i as f32;
        for slot in 0..3 {
            surfaces.register(
                DropSurface::new(
                    ContainerRef::column(format!("row-{i}"), slot),
                    BlockKind::ColumnsContainer.default_accepts(),
                    Rect::new(200.0 * slot as f32, y, 200.0, height),
                )
                .with_children(vec![Rect::new(200.0 * slot as f32, y, 200.0, 60.0)]),
            );
        }
    }

    surfaces
}

fn resolve_pointer(c: &mut Criterion) {
    let excluded = HashSet::new();
    let subject = DragSubject {
        kind: BlockKind::Text,
        rect: None,
        excluded: &excluded,
        depths: None,
    };

    let mut group = c.benchmark_group("resolve_pointer");
    for count in [10, 50, 200] {
        let surfaces = stacked_sections(count);
        let pointer = Point::new(310.0, 200.0 * (count / 2) as f32 + 120.0);

        group.bench_with_input(BenchmarkId::from_parameter(count), &surfaces, |b, surfaces| {
            b.iter(|| resolve(black_box(pointer), &subject, surfaces))
        });
    }
    group.finish();
}

fn resolve_nearest_center(c: &mut Criterion) {
    let excluded = HashSet::new();
    let subject = DragSubject {
        kind: BlockKind::Text,
        rect: Some(Rect::new(900.0, 0.0, 100.0, 40.0)),
        excluded: &excluded,
        depths: None,
    };
    let surfaces = stacked_sections(50);

    c.bench_function("resolve_nearest_center", |b| {
        b.iter(|| resolve(black_box(Point::new(950.0, 20.0)), &subject, &surfaces))
    });
}

criterion_group!(benches, resolve_pointer, resolve_nearest_center);
criterion_main!(benches);
