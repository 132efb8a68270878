//! Collapse driver: the main simplification loop and its validity checks.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::{debug, trace, warn};

use crate::core::Point3;
use crate::mesh::collapse_eval::{evaluate_collapse, NumericPolicy};
use crate::mesh::error::{CollapseRejected, SimplifyError};
use crate::mesh::halfedge::{HalfEdgeMesh, INVALID};
use crate::mesh::normalize::normalize;
use crate::mesh::ordered_errors::OrderedErrors;
use crate::mesh::quadric::{build_quadrics, Quadric};

/// A caller-owned mesh buffer that [`simplify`] mutates in place.
///
/// Implementors own the vertex/index storage; the simplifier only ever
/// asks for mutable access to rewrite it with the reduced mesh.
pub trait MeshHandle {
    fn vertex_count(&self) -> u32;
    fn triangle_count(&self) -> u32;
    fn positions_mut(&mut self) -> &mut Vec<[f32; 3]>;
    fn indices_mut(&mut self) -> &mut Vec<u32>;
}

/// A plain in-memory triangle mesh, useful as a [`MeshHandle`] for callers
/// that don't already have their own buffer types.
#[derive(Debug, Clone, Default)]
pub struct SimpleMesh {
    pub positions: Vec<[f32; 3]>,
    pub indices: Vec<u32>,
}

impl MeshHandle for SimpleMesh {
    fn vertex_count(&self) -> u32 {
        self.positions.len() as u32
    }

    fn triangle_count(&self) -> u32 {
        (self.indices.len() / 3) as u32
    }

    fn positions_mut(&mut self) -> &mut Vec<[f32; 3]> {
        &mut self.positions
    }

    fn indices_mut(&mut self) -> &mut Vec<u32> {
        &mut self.indices
    }
}

/// Cooperative cancellation flag, cheap to clone and share across threads.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        CancelToken(Arc::new(AtomicBool::new(false)))
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Tunables for a simplification run.
#[derive(Debug, Clone, Copy)]
pub struct SimplifyConfig {
    /// Stop collapsing once the cheapest remaining edge costs more than this.
    pub error_budget: f32,
    /// Weight applied to boundary-edge penalty planes. `10.0` is the more
    /// conservative of the commonly cited defaults.
    pub boundary_penalty: f32,
    /// Errors below this magnitude are clamped to zero.
    pub error_clamp_epsilon: f32,
    /// Augmented-system determinants below this trigger the midpoint
    /// fallback instead of the LU solve.
    pub singular_determinant_epsilon: f64,
}

impl Default for SimplifyConfig {
    fn default() -> Self {
        SimplifyConfig {
            error_budget: f32::MAX,
            boundary_penalty: 10.0,
            error_clamp_epsilon: 5e-6,
            singular_determinant_epsilon: 1e-9,
        }
    }
}

impl SimplifyConfig {
    fn numeric_policy(&self) -> NumericPolicy {
        NumericPolicy {
            error_clamp_epsilon: self.error_clamp_epsilon,
            singular_determinant_epsilon: self.singular_determinant_epsilon,
        }
    }
}

/// Simplify `mesh` down to the error budget in `config`, returning the
/// number of collapses performed.
pub fn simplify(
    mesh: &mut dyn MeshHandle,
    error_budget: f32,
    boundary_penalty: f32,
    cancel: Option<&CancelToken>,
) -> Result<usize, SimplifyError> {
    let config = SimplifyConfig {
        error_budget,
        boundary_penalty,
        ..SimplifyConfig::default()
    };
    simplify_with_config(mesh, &config, cancel)
}

/// Same as [`simplify`] but takes a full [`SimplifyConfig`].
pub fn simplify_with_config(
    mesh: &mut dyn MeshHandle,
    config: &SimplifyConfig,
    cancel: Option<&CancelToken>,
) -> Result<usize, SimplifyError> {
    let normalized = normalize(mesh.positions_mut(), mesh.indices_mut())?;
    let num_vertices = normalized.positions.len() as u32;
    let he_mesh = HalfEdgeMesh::build(num_vertices, &normalized.indices)?;

    let mut state = Simplifier {
        he: he_mesh,
        positions: normalized.positions,
        face_normals: normalized.face_normals,
        quadrics: Vec::new(),
        queue: OrderedErrors::with_capacity(0),
        config: *config,
    };
    state.quadrics = build_quadrics(
        &state.he,
        &state.positions,
        &state.face_normals,
        config.boundary_penalty,
    );
    state.queue = OrderedErrors::with_capacity(state.he.half_edges.len());
    state.seed_queue();

    let collapses = state.run(cancel)?;
    state.export(mesh);
    Ok(collapses)
}

struct Simplifier {
    he: HalfEdgeMesh,
    positions: Vec<Point3>,
    face_normals: Vec<crate::core::Vector3>,
    quadrics: Vec<Quadric>,
    queue: OrderedErrors,
    config: SimplifyConfig,
}

impl Simplifier {
    fn seed_queue(&mut self) {
        for he in 0..self.he.half_edges.len() as u32 {
            if self.he.canonical(he) != he {
                continue;
            }
            let candidate = self.evaluate_edge(he);
            self.queue.insert(he, candidate.error);
        }
    }

    fn evaluate_edge(&self, he: u32) -> crate::mesh::collapse_eval::CollapseCandidate {
        let p = self.he.half_edges[he as usize].origin;
        let q = self.he.destination(he);
        let merged = self.quadrics[p as usize].add(&self.quadrics[q as usize]);
        evaluate_collapse(
            &merged,
            &self.positions[p as usize],
            &self.positions[q as usize],
            &self.config.numeric_policy(),
        )
    }

    fn run(&mut self, cancel: Option<&CancelToken>) -> Result<usize, SimplifyError> {
        let mut collapses = 0usize;
        let mut consecutive_empty_passes = 0u32;

        loop {
            if let Some(token) = cancel {
                if token.is_cancelled() {
                    return Err(SimplifyError::Cancelled);
                }
            }
            let Some(edge) = self.queue.cheapest(self.config.error_budget) else {
                break;
            };

            match self.try_collapse(edge) {
                Ok(()) => {
                    collapses += 1;
                    consecutive_empty_passes = 0;
                    trace!("collapsed edge {edge}, total {collapses}");
                }
                Err(reason) => {
                    // The edge is still live and still cheapest; if we
                    // don't remove it we'd spin. Drop it permanently —
                    // it failed validity, not budget, so it can never
                    // succeed until its neighbourhood changes, at which
                    // point it gets re-seeded via rekey from elsewhere.
                    self.queue.remove(edge);
                    debug!("rejected edge {edge}: {reason:?}");
                    consecutive_empty_passes += 1;
                }
            }

            if consecutive_empty_passes > 2 && collapses == 0 {
                warn!("no collapses succeeded after {consecutive_empty_passes} attempts, stopping");
                break;
            }
        }

        Ok(collapses)
    }

    /// Attempt to collapse the undirected edge `he`. On success, mutates
    /// the shared mesh state and updates the queue; on rejection, the
    /// mesh is left completely untouched (all checks run before any
    /// mutation).
    fn try_collapse(&mut self, he: u32) -> Result<(), CollapseRejected> {
        let twin = self.he.half_edges[he as usize].twin;
        let p = self.he.half_edges[he as usize].origin;
        let q = self.he.destination(he);

        let boundary = self.he.is_boundary(he) || self.he.is_boundary(twin);
        let common = self.common_neighbours(p, q);
        if boundary {
            if common != 1 {
                return Err(CollapseRejected::NotEnoughNeighbours);
            }
        } else if common != 2 {
            return Err(CollapseRejected::TooManyNeighbours);
        }

        let candidate = self.evaluate_edge(he);

        // Opposite (apex) vertices of the up to two adjoining faces.
        let face_a = self.he.half_edges[he as usize].face;
        let face_b = self.he.half_edges[twin as usize].face;
        let apex_a = face_a.map(|_| self.he.half_edges[self.he.half_edges[he as usize].prev as usize].origin);
        let apex_b = face_b.map(|_| self.he.half_edges[self.he.half_edges[twin as usize].prev as usize].origin);

        for apex in [apex_a, apex_b].into_iter().flatten() {
            if (self.positions[apex as usize] - candidate.new_pos).norm() < 1e-12 {
                return Err(CollapseRejected::SingularFace);
            }
        }

        if self.would_flip(q, he, twin, candidate.new_pos) {
            return Err(CollapseRejected::FaceFlip);
        }

        if self.would_detach(he, twin, face_a, face_b) {
            return Err(CollapseRejected::DetachedVertex);
        }

        self.commit_collapse(he, twin, p, q, face_a, face_b, candidate.new_pos);
        Ok(())
    }

    fn common_neighbours(&self, p: u32, q: u32) -> usize {
        let p_nbrs: std::collections::HashSet<u32> = self
            .he
            .rotate_outgoing(self.he.vertex_he[p as usize])
            .into_iter()
            .map(|h| self.he.destination(h))
            .filter(|&n| n != q)
            .collect();
        self.he
            .rotate_outgoing(self.he.vertex_he[q as usize])
            .into_iter()
            .map(|h| self.he.destination(h))
            .filter(|n| *n != p && p_nbrs.contains(n))
            .collect::<std::collections::HashSet<_>>()
            .len()
    }

    /// Check whether relabelling `q -> p` (at `new_pos`) flips the normal
    /// of any face still incident to `q`, excluding the up to two faces
    /// being collapsed.
    fn would_flip(&self, q: u32, he: u32, twin: u32, new_pos: Point3) -> bool {
        let collapsing_faces = [
            self.he.half_edges[he as usize].face,
            self.he.half_edges[twin as usize].face,
        ];
        for outgoing in self.he.rotate_outgoing(self.he.vertex_he[q as usize]) {
            let Some(f) = self.he.half_edges[outgoing as usize].face else {
                continue;
            };
            if collapsing_faces.contains(&Some(f)) {
                continue;
            }
            let base = f * 3;
            let verts = [
                self.he.half_edges[base as usize].origin,
                self.he.half_edges[(base + 1) as usize].origin,
                self.he.half_edges[(base + 2) as usize].origin,
            ];
            let pos = |v: u32| -> Point3 {
                if v == q {
                    new_pos
                } else {
                    self.positions[v as usize]
                }
            };
            let a = pos(verts[0]);
            let b = pos(verts[1]);
            let c = pos(verts[2]);
            let cross = (b - a).cross(&(c - a));
            if cross.norm() < 1e-20 {
                continue;
            }
            let new_normal = cross / cross.norm();
            if new_normal.dot(&self.face_normals[f as usize]) < 0.0 {
                return true;
            }
        }
        false
    }

    /// For each up-to-two collapsing face, check whether its apex vertex
    /// would be left with no incident face at all.
    fn would_detach(
        &self,
        he: u32,
        twin: u32,
        face_a: Option<u32>,
        face_b: Option<u32>,
    ) -> bool {
        for face in [face_a, face_b].into_iter().flatten() {
            let he_in_face = if he / 3 == face { he } else { twin };
            let next = self.he.half_edges[he_in_face as usize].next;
            let prev = self.he.half_edges[he_in_face as usize].prev;
            let outer_a = self.he.half_edges[next as usize].twin;
            let outer_b = self.he.half_edges[prev as usize].twin;
            if self.he.half_edges[outer_a as usize].face.is_none()
                && self.he.half_edges[outer_b as usize].face.is_none()
            {
                return true;
            }
        }
        false
    }

    fn commit_collapse(
        &mut self,
        he: u32,
        twin: u32,
        p: u32,
        q: u32,
        face_a: Option<u32>,
        face_b: Option<u32>,
        new_pos: Point3,
    ) {
        let survivor = p.min(q);
        let removed = p.max(q);

        let removed_outgoing = self.he.rotate_outgoing(self.he.vertex_he[removed as usize]);
        let survivor_outgoing = self.he.rotate_outgoing(self.he.vertex_he[survivor as usize]);

        let mut dying: Vec<u32> = Vec::with_capacity(7);
        dying.push(he);
        dying.push(twin);

        let mut removed_from_queue: Vec<u32> = vec![self.he.canonical(he)];

        for face in [face_a, face_b].into_iter().flatten() {
            let base = face * 3;
            let he_in_face = if he / 3 == face { he } else { twin };
            let next = self.he.half_edges[he_in_face as usize].next;
            let prev = self.he.half_edges[he_in_face as usize].prev;
            let outer_a = self.he.half_edges[next as usize].twin;
            let outer_b = self.he.half_edges[prev as usize].twin;

            removed_from_queue.push(self.he.canonical(next));
            removed_from_queue.push(self.he.canonical(prev));

            self.he.half_edges[outer_a as usize].twin = outer_b;
            self.he.half_edges[outer_b as usize].twin = outer_a;

            dying.push(base);
            dying.push(base + 1);
            dying.push(base + 2);
            self.he.face_alive[face as usize] = false;
        }

        // Boundary collapse: bypass the synthetic half-edge that paired
        // with the collapsed edge.
        for &(real, synth) in &[(he, twin), (twin, he)] {
            if self.he.half_edges[synth as usize].face.is_none() {
                let sp = self.he.half_edges[synth as usize].prev;
                let sn = self.he.half_edges[synth as usize].next;
                if sp != INVALID && sn != INVALID {
                    self.he.half_edges[sp as usize].next = sn;
                    self.he.half_edges[sn as usize].prev = sp;
                }
                let _ = real;
            }
        }

        for d in &dying {
            self.he.he_alive[*d as usize] = false;
        }

        for h in &removed_outgoing {
            self.he.half_edges[*h as usize].origin = survivor;
        }

        self.positions[survivor as usize] = new_pos;
        self.he.vertex_alive[removed as usize] = false;

        let mut new_seed = None;
        for h in removed_outgoing.iter().chain(survivor_outgoing.iter()) {
            if self.he.he_alive[*h as usize] && self.he.half_edges[*h as usize].origin == survivor {
                new_seed = Some(*h);
                break;
            }
        }
        if let Some(seed) = new_seed {
            self.he.vertex_he[survivor as usize] = seed;
        }

        self.quadrics[survivor as usize] = self.quadrics[p as usize].add(&self.quadrics[q as usize]);

        for edge in &removed_from_queue {
            self.queue.remove(*edge);
        }

        for outgoing in self.he.rotate_outgoing(self.he.vertex_he[survivor as usize]) {
            let canon = self.he.canonical(outgoing);
            if !self.he.he_alive[canon as usize] {
                continue;
            }
            let candidate = self.evaluate_edge(canon);
            self.queue.rekey(canon, candidate.error);
        }
    }

    fn export(&self, mesh: &mut dyn MeshHandle) {
        let mut remap = vec![INVALID; self.positions.len()];
        let mut out_positions = Vec::new();
        for (i, alive) in self.he.vertex_alive.iter().enumerate() {
            if *alive {
                remap[i] = out_positions.len() as u32;
                let p = self.positions[i];
                out_positions.push([p.x as f32, p.y as f32, p.z as f32]);
            }
        }

        let mut out_indices = Vec::new();
        for f in 0..self.he.num_real_faces {
            if !self.he.face_alive[f as usize] {
                continue;
            }
            let base = f * 3;
            for k in 0..3u32 {
                let v = self.he.half_edges[(base + k) as usize].origin;
                out_indices.push(remap[v as usize]);
            }
        }

        *mesh.positions_mut() = out_positions;
        *mesh.indices_mut() = out_indices;
    }
}
