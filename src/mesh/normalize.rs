//! Mesh normalization: vertex dedupe, index rewrite, face-normal precompute.
//!
//! Runs once, before half-edge connectivity is built. Bit-identical
//! position merging keeps the half-edge builder's twin resolution honest —
//! two triangles sharing an edge only look like they share vertices if the
//! vertex positions are literally the same input float bits.

use std::collections::HashMap;

use crate::core::{Point3, Vector3};
use crate::mesh::error::SimplifyError;

/// Bit-pattern key for exact (non-approximate) position dedup.
type PositionKey = (u32, u32, u32);

fn position_key(p: &[f32; 3]) -> PositionKey {
    (p[0].to_bits(), p[1].to_bits(), p[2].to_bits())
}

/// Output of normalization: deduplicated vertex positions (promoted to
/// double precision for the solver), a rewritten index buffer, and one
/// unit normal per triangle.
pub struct Normalized {
    pub positions: Vec<Point3>,
    pub indices: Vec<u32>,
    pub face_normals: Vec<Vector3>,
}

/// Merge bit-identical vertices, rewrite the index buffer against the
/// deduplicated set, and compute a unit normal per triangle.
///
/// Returns [`SimplifyError::DegenerateFace`] for any triangle whose edge
/// cross product has zero magnitude (collinear or coincident corners).
pub fn normalize(positions: &[[f32; 3]], indices: &[u32]) -> Result<Normalized, SimplifyError> {
    let mut dedup: HashMap<PositionKey, u32> = HashMap::with_capacity(positions.len());
    let mut merged_positions: Vec<Point3> = Vec::with_capacity(positions.len());
    let mut remap: Vec<u32> = Vec::with_capacity(positions.len());

    for p in positions {
        let key = position_key(p);
        let id = *dedup.entry(key).or_insert_with(|| {
            let id = merged_positions.len() as u32;
            merged_positions.push(Point3::new(p[0] as f64, p[1] as f64, p[2] as f64));
            id
        });
        remap.push(id);
    }

    let mut new_indices = Vec::with_capacity(indices.len());
    for &i in indices {
        new_indices.push(remap[i as usize]);
    }

    let mut face_normals = Vec::with_capacity(new_indices.len() / 3);
    for tri in new_indices.chunks_exact(3) {
        let a = &merged_positions[tri[0] as usize];
        let b = &merged_positions[tri[1] as usize];
        let c = &merged_positions[tri[2] as usize];
        let cross = (b - a).cross(&(c - a));
        let norm = cross.norm();
        if norm < 1e-20 {
            return Err(SimplifyError::DegenerateFace);
        }
        face_normals.push(cross / norm);
    }

    Ok(Normalized {
        positions: merged_positions,
        indices: new_indices,
        face_normals,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dedupe_shared_vertices() {
        let positions = vec![
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0], // duplicate of vertex 0
        ];
        let indices = vec![0, 1, 2, 3, 1, 2];
        let result = normalize(&positions, &indices).unwrap();
        assert_eq!(result.positions.len(), 3);
        assert_eq!(result.indices, vec![0, 1, 2, 0, 1, 2]);
    }

    #[test]
    fn test_degenerate_face_rejected() {
        let positions = vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [2.0, 0.0, 0.0]];
        let indices = vec![0, 1, 2];
        assert_eq!(
            normalize(&positions, &indices).unwrap_err(),
            SimplifyError::DegenerateFace
        );
    }

    #[test]
    fn test_face_normal_orientation() {
        let positions = vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]];
        let indices = vec![0, 1, 2];
        let result = normalize(&positions, &indices).unwrap();
        assert_eq!(result.face_normals.len(), 1);
        assert!((result.face_normals[0] - Vector3::new(0.0, 0.0, 1.0)).norm() < 1e-9);
    }
}
