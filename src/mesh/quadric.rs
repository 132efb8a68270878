//! Per-vertex quadric error matrices (Garland-Heckbert).
//!
//! A quadric is the symmetric 4x4 matrix `Q = (a,b,c,d)^T (a,b,c,d)` of a
//! supporting plane `ax+by+cz+d=0`; only 10 entries are independent.
//! Storage and the cofactor-style accumulation follow the classic
//! "Fast Quadric Mesh Simplification" layout.

use nalgebra::{Matrix4, Vector4};

use crate::core::{Point3, Vector3};
use crate::mesh::halfedge::HalfEdgeMesh;

/// Symmetric 4x4 quadric, stored as its 10 independent entries in
/// row-major upper-triangular order: `[a2, ab, ac, ad, b2, bc, bd, c2, cd, d2]`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Quadric {
    m: [f64; 10],
}

impl Quadric {
    pub fn zero() -> Self {
        Self { m: [0.0; 10] }
    }

    /// Quadric of the plane `n.x*x + n.y*y + n.z*z + d = 0`, `n` unit length.
    pub fn from_plane(n: Vector3, d: f64) -> Self {
        let (a, b, c) = (n.x, n.y, n.z);
        Self {
            m: [
                a * a,
                a * b,
                a * c,
                a * d,
                b * b,
                b * c,
                b * d,
                c * c,
                c * d,
                d * d,
            ],
        }
    }

    pub fn add_assign(&mut self, other: &Quadric) {
        for i in 0..10 {
            self.m[i] += other.m[i];
        }
    }

    pub fn add(&self, other: &Quadric) -> Quadric {
        let mut q = *self;
        q.add_assign(other);
        q
    }

    pub fn scaled(&self, s: f64) -> Quadric {
        let mut m = self.m;
        for v in &mut m {
            *v *= s;
        }
        Quadric { m }
    }

    /// Evaluate the quadratic form `v^T Q v` at a point (homogeneous `w=1`).
    pub fn evaluate(&self, p: &Point3) -> f64 {
        let [a2, ab, ac, ad, b2, bc, bd, c2, cd, d2] = self.m;
        let (x, y, z) = (p.x, p.y, p.z);
        x * x * a2
            + 2.0 * x * y * ab
            + 2.0 * x * z * ac
            + 2.0 * x * ad
            + y * y * b2
            + 2.0 * y * z * bc
            + 2.0 * y * bd
            + z * z * c2
            + 2.0 * z * cd
            + d2
    }

    /// Full symmetric 4x4 matrix, for the augmented-system solve.
    pub fn as_matrix4(&self) -> Matrix4<f64> {
        let [a2, ab, ac, ad, b2, bc, bd, c2, cd, d2] = self.m;
        Matrix4::new(
            a2, ab, ac, ad, ab, b2, bc, bd, ac, bc, c2, cd, ad, bd, cd, d2,
        )
    }
}

/// Build one quadric per vertex: the sum of its incident face-plane
/// quadrics plus boundary-edge penalty planes scaled by `boundary_penalty`.
pub fn build_quadrics(
    mesh: &HalfEdgeMesh,
    positions: &[Point3],
    face_normals: &[Vector3],
    boundary_penalty: f32,
) -> Vec<Quadric> {
    let mut quadrics = vec![Quadric::zero(); positions.len()];

    for f in 0..mesh.num_real_faces {
        if !mesh.face_alive[f as usize] {
            continue;
        }
        let base = f * 3;
        let n = face_normals[f as usize];
        let v0 = positions[mesh.half_edges[base as usize].origin as usize];
        let d = -(n.x * v0.x + n.y * v0.y + n.z * v0.z);
        let q = Quadric::from_plane(n, d);
        for k in 0..3u32 {
            let he = base + k;
            let v = mesh.half_edges[he as usize].origin as usize;
            quadrics[v].add_assign(&q);
        }
    }

    if boundary_penalty != 0.0 {
        for he in 0..mesh.half_edges.len() as u32 {
            if !mesh.is_boundary(he) {
                continue;
            }
            // `he` is synthetic; its twin is the adjoining real edge.
            let real = mesh.half_edges[he as usize].twin;
            let face = match mesh.half_edges[real as usize].face {
                Some(f) => f,
                None => continue,
            };
            let n = face_normals[face as usize];
            let p0 = mesh.half_edges[real as usize].origin as usize;
            let p1 = mesh.destination(real);
            let e = positions[p1] - positions[p0];
            let mut vp = n.cross(&e);
            let len = vp.norm();
            if len < 1e-20 {
                continue;
            }
            vp /= len;
            let d = -(vp.x * positions[p0].x + vp.y * positions[p0].y + vp.z * positions[p0].z);
            let q = Quadric::from_plane(vp, d).scaled(boundary_penalty as f64);
            quadrics[p0].add_assign(&q);
            quadrics[p1].add_assign(&q);
        }
    }

    quadrics
}

/// The right-hand side of the augmented system `Q~ v = e4`.
pub fn augmented_rhs() -> Vector4<f64> {
    Vector4::new(0.0, 0.0, 0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plane_quadric_evaluates_zero_on_plane() {
        let n = Vector3::new(0.0, 0.0, 1.0);
        let q = Quadric::from_plane(n, 0.0);
        let p = Point3::new(3.0, -2.0, 0.0);
        assert!(q.evaluate(&p).abs() < 1e-12);
    }

    #[test]
    fn test_plane_quadric_nonzero_off_plane() {
        let n = Vector3::new(0.0, 0.0, 1.0);
        let q = Quadric::from_plane(n, 0.0);
        let p = Point3::new(0.0, 0.0, 2.0);
        assert!((q.evaluate(&p) - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_additive_accumulation() {
        let n = Vector3::new(0.0, 0.0, 1.0);
        let q1 = Quadric::from_plane(n, 0.0);
        let q2 = Quadric::from_plane(n, -1.0);
        let sum = q1.add(&q2);
        let p = Point3::new(0.0, 0.0, 0.5);
        assert!((sum.evaluate(&p) - (q1.evaluate(&p) + q2.evaluate(&p))).abs() < 1e-12);
    }
}
