//! Core module - foundational math and precision handling
//!
//! Provides the mathematical foundation shared by the mesh pipeline:
//! vector/point aliases over `nalgebra` and epsilon-based comparison.

pub mod math;
pub mod precision;

// Re-export commonly used types
pub use math::{lerp_vec3, Point3, Vector3};
pub use precision::{ApproxEq, EPSILON, EPSILON_FINE, EPSILON_NORMAL, EPSILON_ROUGH};
