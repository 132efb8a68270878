//! Optimal collapse position and cost for a single edge.

use nalgebra::linalg::LU;

use crate::core::Point3;
use crate::mesh::quadric::{augmented_rhs, Quadric};

/// Result of evaluating a candidate collapse: where the surviving vertex
/// should land, and the quadric error incurred by putting it there.
#[derive(Debug, Clone, Copy)]
pub struct CollapseCandidate {
    pub new_pos: Point3,
    pub error: f32,
}

/// Numeric policy knobs for the solve (see [`crate::SimplifyConfig`]).
#[derive(Debug, Clone, Copy)]
pub struct NumericPolicy {
    pub error_clamp_epsilon: f32,
    pub singular_determinant_epsilon: f64,
}

/// Solve for the position minimizing the merged quadric `q = Q(p) + Q(q)`.
///
/// Solves the augmented system `Q~ v = (0,0,0,1)` via pivoted LU. Falls
/// back to the midpoint when the system is singular (small determinant).
/// Error is clamped to zero below `error_clamp_epsilon` or when negative.
pub fn evaluate_collapse(
    merged: &Quadric,
    p: &Point3,
    q: &Point3,
    policy: &NumericPolicy,
) -> CollapseCandidate {
    let mut qtilde = merged.as_matrix4();
    qtilde.set_row(3, &nalgebra::RowVector4::new(0.0, 0.0, 0.0, 1.0));

    let det = qtilde.determinant();
    let new_pos = if det.abs() > policy.singular_determinant_epsilon {
        let lu = LU::new(qtilde);
        match lu.solve(&augmented_rhs()) {
            Some(v) => Point3::new(v.x, v.y, v.z),
            None => midpoint(p, q),
        }
    } else {
        midpoint(p, q)
    };

    let raw_error = merged.evaluate(&new_pos);
    let mut error = raw_error as f32;
    if error < 0.0 || error.abs() < policy.error_clamp_epsilon {
        error = 0.0;
    }

    CollapseCandidate { new_pos, error }
}

fn midpoint(p: &Point3, q: &Point3) -> Point3 {
    Point3::new((p.x + q.x) * 0.5, (p.y + q.y) * 0.5, (p.z + q.z) * 0.5)
}
