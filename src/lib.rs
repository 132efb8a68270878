//! # quadric-collapse
//!
//! Progressive triangle mesh simplification via Garland-Heckbert quadric
//! error metrics.
//!
//! ## Architecture
//!
//! - `core`: Foundational math and precision handling
//! - `mesh`: Half-edge connectivity, quadric accumulation, collapse
//!   evaluation, the error-ordered priority queue, and the collapse
//!   driver that ties them together
//!
//! ## Example
//!
//! ```rust,no_run
//! use quadric_collapse::{simplify, SimpleMesh};
//!
//! let mut mesh = SimpleMesh {
//!     positions: vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
//!     indices: vec![0, 1, 2],
//! };
//! let collapses = simplify(&mut mesh, 0.01, 10.0, None).unwrap();
//! println!("performed {collapses} collapses");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

// Core modules - foundational math and precision handling
pub mod core;

// Mesh simplification pipeline
pub mod mesh;

// Re-export commonly used types
pub use core::{ApproxEq, Point3, Vector3, EPSILON, EPSILON_FINE, EPSILON_NORMAL, EPSILON_ROUGH};
pub use mesh::{
    simplify, simplify_with_config, CancelToken, ChunkSplitter, MeshHandle, ObjError, ObjSource,
    SimpleMesh, SimplifyConfig, SimplifyError,
};

/// Re-export version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Re-export crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
