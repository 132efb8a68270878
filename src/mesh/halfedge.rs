//! Half-edge connectivity over a flat, index-based arena.
//!
//! Half-edge `3*f + k` (k in 0..3) belongs to face `f` for as long as that
//! face stays alive; synthetic boundary half-edges are appended after the
//! last real one and never reused. This sidesteps a pointer-chasing arena
//! in favour of straight array indexing, which is what the collapse driver
//! leans on for its hot-path rotations.

use std::collections::{HashMap, HashSet};

use crate::mesh::error::SimplifyError;

pub const INVALID: u32 = u32::MAX;

/// One directed edge record: origin vertex, twin, and face-cycle links.
#[derive(Debug, Clone, Copy)]
pub struct HalfEdge {
    pub origin: u32,
    pub twin: u32,
    pub next: u32,
    pub prev: u32,
    /// `None` for synthetic boundary half-edges.
    pub face: Option<u32>,
}

/// Half-edge connectivity for a triangle mesh, built once and mutated in
/// place by the collapse driver (faces and vertices are tombstoned, never
/// physically removed from their arrays).
pub struct HalfEdgeMesh {
    pub half_edges: Vec<HalfEdge>,
    pub he_alive: Vec<bool>,
    pub face_alive: Vec<bool>,
    /// One outgoing half-edge per vertex, used as a rotation seed. Kept
    /// fresh by the driver whenever a vertex's cached entry dies.
    pub vertex_he: Vec<u32>,
    pub vertex_alive: Vec<bool>,
    pub num_real_faces: u32,
}

impl HalfEdgeMesh {
    /// Build half-edge connectivity from a triangle soup.
    ///
    /// `indices` must be a flat list of vertex indices, 3 per triangle,
    /// already deduplicated by [`crate::mesh::normalize::normalize`].
    pub fn build(num_vertices: u32, indices: &[u32]) -> Result<Self, SimplifyError> {
        let num_faces = (indices.len() / 3) as u32;
        let mut half_edges = Vec::with_capacity(indices.len() + 8);

        for f in 0..num_faces {
            let base = (f * 3) as usize;
            let verts = [indices[base], indices[base + 1], indices[base + 2]];
            for k in 0..3usize {
                half_edges.push(HalfEdge {
                    origin: verts[k],
                    twin: INVALID,
                    next: f * 3 + ((k as u32 + 1) % 3),
                    prev: f * 3 + ((k as u32 + 2) % 3),
                    face: Some(f),
                });
            }
        }

        // Twin resolution: undirected edge -> first claimant. A second
        // claim pairs the two half-edges; a third is non-manifold.
        let mut pending: HashMap<(u32, u32), u32> = HashMap::with_capacity(half_edges.len());
        let mut resolved: HashSet<(u32, u32)> = HashSet::with_capacity(half_edges.len());

        for h in 0..half_edges.len() as u32 {
            let a = half_edges[h as usize].origin;
            let b = half_edges[half_edges[h as usize].next as usize].origin;
            let key = if a < b { (a, b) } else { (b, a) };

            if let Some(&first) = pending.get(&key) {
                half_edges[h as usize].twin = first;
                half_edges[first as usize].twin = h;
                pending.remove(&key);
                resolved.insert(key);
            } else if resolved.contains(&key) {
                return Err(SimplifyError::NonManifoldEdge);
            } else {
                pending.insert(key, h);
            }
        }

        // Every remaining entry in `pending` is a boundary edge: append a
        // synthetic half-edge running the opposite direction.
        let boundary_heads: Vec<u32> = pending.values().copied().collect();
        for &h in &boundary_heads {
            let dest = half_edges[half_edges[h as usize].next as usize].origin;
            let s = half_edges.len() as u32;
            half_edges.push(HalfEdge {
                origin: dest,
                twin: h,
                next: INVALID,
                prev: INVALID,
                face: None,
            });
            half_edges[h as usize].twin = s;
        }

        // Stitch synthetic half-edges into closed rim cycles by rotating
        // around each boundary edge's destination vertex.
        for &h in &boundary_heads {
            let s = half_edges[h as usize].twin;
            let start = half_edges[h as usize].next;
            let mut cur = start;
            loop {
                let twin = half_edges[cur as usize].twin;
                if half_edges[twin as usize].face.is_none() {
                    half_edges[s as usize].next = twin;
                    half_edges[twin as usize].prev = s;
                    break;
                }
                cur = half_edges[twin as usize].next;
            }
        }

        let total = half_edges.len();
        let mut vertex_he = vec![INVALID; num_vertices as usize];
        for (idx, he) in half_edges.iter().enumerate() {
            let slot = &mut vertex_he[he.origin as usize];
            if *slot == INVALID {
                *slot = idx as u32;
            }
        }

        Ok(HalfEdgeMesh {
            he_alive: vec![true; total],
            face_alive: vec![true; num_faces as usize],
            vertex_alive: vec![true; num_vertices as usize],
            vertex_he,
            num_real_faces: num_faces,
            half_edges,
        })
    }

    /// Walk every outgoing half-edge around `seed`'s origin vertex.
    ///
    /// Real half-edges rotate through `twin(prev(h))` (forward) and
    /// `next(twin(h))` (backward); both rely on the face-cycle identity
    /// `destination(h) == origin(next(h))`, which only holds for half-edges
    /// with a face. Synthetic boundary half-edges' `next`/`prev` instead
    /// encode the rim cycle around a hole (stitched in `build`), so the
    /// walk must stop the instant it reaches one rather than continuing
    /// through it. A vertex touching the mesh boundary has exactly one
    /// synthetic outgoing half-edge, so the forward walk (which may itself
    /// start from that synthetic edge) collects one side of the fan up to
    /// the boundary, and a second, backward walk from the same real anchor
    /// collects the other side.
    pub fn rotate_outgoing(&self, seed: u32) -> Vec<u32> {
        let real_start = if self.half_edges[seed as usize].face.is_none() {
            self.half_edges[self.half_edges[seed as usize].twin as usize].next
        } else {
            seed
        };

        let mut out = vec![real_start];

        let mut cur = real_start;
        loop {
            let prev = self.half_edges[cur as usize].prev;
            let next_out = self.half_edges[prev as usize].twin;
            if next_out == real_start {
                return out;
            }
            out.push(next_out);
            if self.half_edges[next_out as usize].face.is_none() {
                break;
            }
            cur = next_out;
        }

        let mut cur = real_start;
        loop {
            let twin = self.half_edges[cur as usize].twin;
            if self.half_edges[twin as usize].face.is_none() {
                break;
            }
            let prev_out = self.half_edges[twin as usize].next;
            out.push(prev_out);
            cur = prev_out;
        }

        out
    }

    /// Canonical id for the undirected edge `he` belongs to: the smaller
    /// of `he` and its twin. Stable regardless of which side is queried.
    pub fn canonical(&self, he: u32) -> u32 {
        he.min(self.half_edges[he as usize].twin)
    }

    pub fn destination(&self, he: u32) -> u32 {
        self.half_edges[self.half_edges[he as usize].next as usize].origin
    }

    pub fn is_boundary(&self, he: u32) -> bool {
        self.half_edges[he as usize].face.is_none()
    }
}
