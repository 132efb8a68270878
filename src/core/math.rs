//! Vector and point types shared by the mesh pipeline.
//!
//! Built on top of `nalgebra` for performance and correctness, matching
//! the rest of the codebase's convention of aliasing nalgebra generics
//! to fixed-precision project types rather than re-deriving vector math.

use nalgebra::{Point3 as NPoint3, Vector3 as NVector3};

use super::precision::{ApproxEq, EPSILON};

/// 3D vector (using nalgebra), double precision throughout the solver.
pub type Vector3 = NVector3<f64>;

/// 3D point, distinct from `Vector3` for mesh-position semantics.
pub type Point3 = NPoint3<f64>;

impl ApproxEq for Vector3 {
    #[inline]
    fn approx_eq(&self, other: &Self) -> bool {
        self.approx_eq_eps(other, EPSILON)
    }

    #[inline]
    fn approx_eq_eps(&self, other: &Self, epsilon: f64) -> bool {
        (self - other).norm() < epsilon
    }

    #[inline]
    fn approx_zero(&self) -> bool {
        self.approx_zero_eps(EPSILON)
    }

    #[inline]
    fn approx_zero_eps(&self, epsilon: f64) -> bool {
        self.norm() < epsilon
    }
}

/// Linear interpolation between two 3D vectors.
#[inline]
pub fn lerp_vec3(a: &Vector3, b: &Vector3, t: f64) -> Vector3 {
    a + (b - a) * t
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lerp_vec3() {
        let a = Vector3::new(0.0, 0.0, 0.0);
        let b = Vector3::new(10.0, 10.0, 10.0);
        let mid = lerp_vec3(&a, &b, 0.5);
        assert!(mid.approx_eq(&Vector3::new(5.0, 5.0, 5.0)));
    }

    #[test]
    fn test_approx_eq_vector3() {
        let a = Vector3::new(1.0, 2.0, 3.0);
        let b = Vector3::new(1.0, 2.0, 3.0 + EPSILON / 2.0);
        assert!(a.approx_eq(&b));
    }
}
