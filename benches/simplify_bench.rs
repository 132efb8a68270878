use criterion::{black_box, criterion_group, criterion_main, Criterion};
use quadric_collapse::{simplify, SimpleMesh};

fn cube_mesh() -> SimpleMesh {
    let positions = vec![
        [0.0, 0.0, 0.0],
        [1.0, 0.0, 0.0],
        [1.0, 1.0, 0.0],
        [0.0, 1.0, 0.0],
        [0.0, 0.0, 1.0],
        [1.0, 0.0, 1.0],
        [1.0, 1.0, 1.0],
        [0.0, 1.0, 1.0],
    ];
    let indices = vec![
        0, 1, 2, 0, 2, 3, 4, 6, 5, 4, 7, 6, 0, 4, 5, 0, 5, 1, 1, 5, 6, 1, 6, 2, 2, 6, 7, 2, 7, 3,
        3, 7, 4, 3, 4, 0,
    ];
    SimpleMesh { positions, indices }
}

fn grid_mesh(n: u32) -> SimpleMesh {
    let mut positions = Vec::new();
    for y in 0..n {
        for x in 0..n {
            positions.push([x as f32, y as f32, 0.0]);
        }
    }
    let mut indices = Vec::new();
    for y in 0..n - 1 {
        for x in 0..n - 1 {
            let a = y * n + x;
            let b = y * n + x + 1;
            let c = (y + 1) * n + x + 1;
            let d = (y + 1) * n + x;
            indices.extend_from_slice(&[a, b, c, a, c, d]);
        }
    }
    SimpleMesh { positions, indices }
}

fn bench_cube(c: &mut Criterion) {
    c.bench_function("simplify cube fully", |b| {
        b.iter(|| {
            let mut m = cube_mesh();
            let _ = simplify(black_box(&mut m), f32::MAX, 10.0, None);
        })
    });
}

fn bench_grid(c: &mut Criterion) {
    c.bench_function("simplify 16x16 grid to budget", |b| {
        b.iter(|| {
            let mut m = grid_mesh(16);
            let _ = simplify(black_box(&mut m), 0.25, 10.0, None);
        })
    });
}

criterion_group!(benches, bench_cube, bench_grid);
criterion_main!(benches);
