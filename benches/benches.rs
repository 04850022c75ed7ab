use criterion::*;
use cutprofile::*;

/// A rolling terrain of `size` x `size` points, 10 units apart.
fn terrain(size: usize) -> Vec<Point3> {
    (0..size)
        .flat_map(move |x| (0..size).map(move |y| (x, y)))
        .map(|(x, y)| {
            let (x, y) = (x as f64 * 10.0, y as f64 * 10.0);
            [x, y, (x / 50.0).sin() * 5.0 + (y / 70.0).cos() * 3.0]
        })
        .collect()
}

fn town(size: usize) -> SceneBuilder {
    let mut b = SceneBuilder::new();
    for p in terrain(size) {
        b.add_topographic_point(p).unwrap();
    }
    let extent = (size - 1) as f64 * 10.0;
    let mut x = 15.0;
    while x + 20.0 < extent {
        let mut y = 15.0;
        while y + 20.0 < extent {
            b.add_building(
                [[x, y, 0.0], [x + 12.0, y, 0.0], [x + 12.0, y + 9.0, 0.0], [x, y + 9.0, 0.0]],
                8.0,
            )
            .unwrap();
            y += 40.0;
        }
        x += 40.0;
    }
    b.add_ground_rect([0.0, 0.0], [extent / 2.0, extent], 0.8)
        .unwrap();
    b
}

fn triangulation(c: &mut Criterion) {
    c.bench_function("triangulate 50x50", |b| {
        let pts = terrain(50);
        b.iter(|| TriMesh::triangulate(&pts, &[]))
    });

    c.bench_function("seal town 50x50", |b| {
        let builder = town(50);
        b.iter(|| builder.clone().seal())
    });
}

fn walking(c: &mut Criterion) {
    let scene = town(50).seal();

    c.bench_function("walk terrain short", |b| {
        b.iter(|| scene.topographic_profile([12.0, 33.0], [88.0, 71.0]))
    });

    c.bench_function("walk terrain across", |b| {
        b.iter(|| scene.topographic_profile([1.0, 3.0], [489.0, 471.0]))
    });
}

fn profiles(c: &mut Criterion) {
    let scene = town(50).seal();

    c.bench_function("profile short", |b| {
        b.iter(|| scene.profile([12.0, 33.0, 4.0], [88.0, 71.0, 4.0]))
    });

    c.bench_function("profile across town", |b| {
        b.iter(|| scene.profile([1.0, 3.0, 4.0], [489.0, 471.0, 4.0]))
    });

    c.bench_function("wide angle points", |b| {
        b.iter(|| scene.wide_angle_points(0, 0.0, std::f64::consts::PI))
    });
}

criterion_group!(benches, triangulation, walking, profiles);
criterion_main!(benches);
