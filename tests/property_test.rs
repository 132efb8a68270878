//! Property-based checks for the monotonicity and budget laws.

use proptest::prelude::*;
use quadric_collapse::{simplify, SimpleMesh};

fn grid_mesh(n: u32) -> SimpleMesh {
    let mut positions = Vec::new();
    for y in 0..n {
        for x in 0..n {
            let jitter = ((x * 31 + y * 17) % 5) as f32 * 0.01;
            positions.push([x as f32, y as f32, jitter]);
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

proptest! {
    #[test]
    fn triangle_and_vertex_counts_never_increase(budget in 1e-6f32..5.0f32, n in 3u32..8u32) {
        let mut m = grid_mesh(n);
        let before_v = m.positions.len();
        let before_f = m.indices.len() / 3;
        let _ = simplify(&mut m, budget, 10.0, None).unwrap();
        prop_assert!(m.positions.len() <= before_v);
        prop_assert!(m.indices.len() / 3 <= before_f);
    }

    #[test]
    fn every_surviving_triangle_is_non_degenerate(n in 3u32..6u32) {
        let mut m = grid_mesh(n);
        let _ = simplify(&mut m, f32::MAX, 10.0, None).unwrap();
        for tri in m.indices.chunks_exact(3) {
            prop_assert_ne!(tri[0], tri[1]);
            prop_assert_ne!(tri[1], tri[2]);
            prop_assert_ne!(tri[0], tri[2]);
        }
    }
}
