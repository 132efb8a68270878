//! Progressive triangle mesh simplification via quadric error metrics.
//!
//! Pipeline: [`normalize`] dedupes vertices and computes face normals,
//! [`halfedge`] builds connectivity, [`quadric`] accumulates per-vertex
//! error matrices, [`collapse_eval`] solves for each edge's optimal
//! collapse position and cost, [`ordered_errors`] keeps those costs in a
//! priority queue, and [`driver`] runs the collapse loop over all of it.

pub mod collapse_eval;
pub mod driver;
pub mod error;
pub mod halfedge;
pub mod normalize;
pub mod ordered_errors;
pub mod quadric;

pub use driver::{
    simplify, simplify_with_config, CancelToken, MeshHandle, SimpleMesh, SimplifyConfig,
};
pub use error::SimplifyError;

/// Loads a triangle mesh from an external source (e.g. an OBJ file).
///
/// Sketch only — no implementation ships here. Callers who need mesh
/// loading bring their own; the simplifier operates purely on
/// already-in-memory vertex/index buffers via [`MeshHandle`].
pub trait ObjSource {
    fn load(&self, path: &std::path::Path) -> Result<SimpleMesh, ObjError>;
}

/// Error type for an [`ObjSource`] implementation.
#[derive(Debug, thiserror::Error)]
pub enum ObjError {
    #[error("io error: {0}")]
    Io(String),
    #[error("parse error: {0}")]
    Parse(String),
}

/// Splits a large mesh into chunks for out-of-core or parallel
/// simplification.
///
/// Sketch only. The core driver in this crate is single-threaded and
/// operates on one in-memory mesh at a time; chunked/streaming
/// simplification is out of scope here.
pub trait ChunkSplitter {
    fn split(&self, mesh: &SimpleMesh, chunk_budget: u32) -> Vec<SimpleMesh>;
}
