// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Mesh representation and utilities

use super::{newell_normal, triangulate_polygon_2d, BoundingBox, Frame, Point2, Point3, Vector3};
use crate::config::Tolerance;
use crate::error::{KernelError, KernelResult};
use serde::{Deserialize, Serialize};

/// Vertex with position and normal
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Vertex {
    pub position: Point3,
    pub normal: Vector3,
}

impl Vertex {
    pub fn new(position: Point3, normal: Vector3) -> Self {
        Self { position, normal }
    }

    pub fn at(position: Point3) -> Self {
        Self::new(position, Vector3::zeros())
    }
}

/// Triangle defined by three vertex indices
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Triangle {
    pub indices: [usize; 3],
}

impl Triangle {
    pub fn new(indices: [usize; 3]) -> Self {
        Self { indices }
    }

    fn is_degenerate(&self) -> bool {
        let [a, b, c] = self.indices;
        a == b || b == c || a == c
    }
}

/// Triangular mesh
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub triangles: Vec<Triangle>,
}

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(vertex_count: usize, triangle_count: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(vertex_count),
            triangles: Vec::with_capacity(triangle_count),
        }
    }

    /// Closed solid between two corresponding loops.
    ///
    /// Builds both caps, reverses the second, joins corresponding vertices with
    /// side quads and orients the shell outward.
    pub fn from_two_faces(top: &[Point3], bottom: &[Point3], tol: &Tolerance) -> KernelResult<Self> {
        if top.len() != bottom.len() {
            return Err(KernelError::InvalidInput(format!(
                "faces differ in point count: {} vs {}",
                top.len(),
                bottom.len()
            )));
        }
        let n = top.len();
        if n < 3 {
            return Err(KernelError::degenerate(format!(
                "a face needs at least 3 points, got {n}"
            )));
        }

        let top_caps = cap_triangles(top, tol)?;
        let bottom_caps = cap_triangles(bottom, tol)?;

        let mut mesh = Self::with_capacity(2 * n, top_caps.len() + bottom_caps.len() + 2 * n);
        for p in top.iter().chain(bottom) {
            mesh.add_vertex(Vertex::at(*p));
        }

        for [a, b, c] in top_caps {
            mesh.add_triangle(Triangle::new([a, b, c]));
        }
        for [a, b, c] in bottom_caps {
            mesh.add_triangle(Triangle::new([c + n, b + n, a + n]));
        }
        for i in 0..n {
            let j = (i + 1) % n;
            mesh.add_triangle(Triangle::new([j, i, i + n]));
            mesh.add_triangle(Triangle::new([j, i + n, j + n]));
        }

        mesh.triangles.retain(|t| !t.is_degenerate());
        mesh.orient_outward();
        mesh.recompute_normals(tol);
        Ok(mesh)
    }

    /// Planar profile in the XY plane of `frame` swept `length` along its Z axis
    pub fn from_extruded_profile(
        profile: &[Point2],
        length: f64,
        frame: &Frame,
        tol: &Tolerance,
    ) -> KernelResult<Self> {
        if length.abs() <= tol.coincidence {
            return Err(KernelError::degenerate(format!(
                "extrusion length {length} is zero"
            )));
        }
        let bottom: Vec<Point3> = profile.iter().map(|p| frame.to_world_2d(p)).collect();
        let top: Vec<Point3> = bottom.iter().map(|p| p + frame.z_axis * length).collect();
        Self::from_two_faces(&top, &bottom, tol)
    }

    /// Add a vertex and return its index
    pub fn add_vertex(&mut self, vertex: Vertex) -> usize {
        let index = self.vertices.len();
        self.vertices.push(vertex);
        index
    }

    /// Add a triangle
    pub fn add_triangle(&mut self, triangle: Triangle) {
        self.triangles.push(triangle);
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Compute bounding box
    pub fn bounding_box(&self) -> BoundingBox {
        BoundingBox::from_vertices(&self.vertices)
    }

    /// Get vertex count
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Get triangle count
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Corner positions of triangle `t`
    pub fn triangle_positions(&self, t: &Triangle) -> [Point3; 3] {
        t.indices.map(|i| self.vertices[i].position)
    }

    /// Enclosed volume by the divergence theorem, positive for an outward shell
    pub fn signed_volume(&self) -> f64 {
        self.triangles
            .iter()
            .map(|t| {
                let [v0, v1, v2] = self.triangle_positions(t);
                v0.coords.dot(&v1.coords.cross(&v2.coords)) / 6.0
            })
            .sum()
    }

    /// Reverse the winding of every triangle
    pub fn flip(&mut self) {
        for t in &mut self.triangles {
            t.indices.swap(1, 2);
        }
        for v in &mut self.vertices {
            v.normal = -v.normal;
        }
    }

    /// Flip the shell if its normals point inward
    pub fn orient_outward(&mut self) {
        if self.signed_volume() < 0.0 {
            self.flip();
        }
    }

    /// Merge with another mesh (simple union without CSG)
    pub fn merge(&mut self, other: &Mesh) {
        let offset = self.vertices.len();
        self.vertices.extend_from_slice(&other.vertices);

        for triangle in &other.triangles {
            self.triangles
                .push(Triangle::new(triangle.indices.map(|i| i + offset)));
        }
    }

    /// Weld vertices that are within epsilon distance of each other
    /// Returns the number of vertices removed
    pub fn weld_vertices(&mut self, epsilon: f64) -> usize {
        if self.vertices.is_empty() {
            return 0;
        }

        let original_count = self.vertices.len();
        let mut new_vertices: Vec<Vertex> = Vec::new();
        let mut new_indices: Vec<usize> = vec![0; original_count];

        for (i, vertex) in self.vertices.iter().enumerate() {
            let found = new_vertices
                .iter()
                .position(|v| (vertex.position - v.position).norm() < epsilon);
            new_indices[i] = match found {
                Some(j) => j,
                None => {
                    new_vertices.push(*vertex);
                    new_vertices.len() - 1
                }
            };
        }

        for triangle in &mut self.triangles {
            triangle.indices = triangle.indices.map(|i| new_indices[i]);
        }
        self.triangles.retain(|t| !t.is_degenerate());
        self.vertices = new_vertices;

        original_count - self.vertices.len()
    }

    /// Remove orphaned vertices (vertices not referenced by any triangle)
    /// Returns the number of vertices removed
    pub fn remove_orphaned_vertices(&mut self) -> usize {
        let mut used = vec![false; self.vertices.len()];
        for triangle in &self.triangles {
            for &i in &triangle.indices {
                used[i] = true;
            }
        }

        let mut new_indices = vec![0; self.vertices.len()];
        let mut new_vertices = Vec::new();
        for (old, &keep) in used.iter().enumerate() {
            if keep {
                new_indices[old] = new_vertices.len();
                new_vertices.push(self.vertices[old]);
            }
        }

        for triangle in &mut self.triangles {
            triangle.indices = triangle.indices.map(|i| new_indices[i]);
        }

        let removed = self.vertices.len() - new_vertices.len();
        self.vertices = new_vertices;
        removed
    }

    /// Recompute vertex normals from triangle geometry
    /// Face normals are area-weighted and averaged at shared vertices
    pub fn recompute_normals(&mut self, tol: &Tolerance) {
        let mut normal_sums: Vec<Vector3> = vec![Vector3::zeros(); self.vertices.len()];

        for triangle in &self.triangles {
            let [v0, v1, v2] = self.triangle_positions(triangle);
            let face_normal = (v1 - v0).cross(&(v2 - v0));
            if face_normal.norm() > tol.eps {
                for &idx in &triangle.indices {
                    normal_sums[idx] += face_normal;
                }
            }
        }

        for (vertex, sum) in self.vertices.iter_mut().zip(normal_sums) {
            vertex.normal = sum.try_normalize(tol.eps).unwrap_or_else(Vector3::z);
        }
    }
}

/// Cap triangulation of a 3D loop in its own best-fit plane, keeping the loop winding
fn cap_triangles(face: &[Point3], tol: &Tolerance) -> KernelResult<Vec<[usize; 3]>> {
    let normal = newell_normal(face, tol)?;
    let frame = Frame::from_normal(face[0], &normal, &(face[1] - face[0]), tol)?;
    let flat: Vec<Point2> = face.iter().map(|p| frame.to_local_2d(p)).collect();
    triangulate_polygon_2d(&flat, tol.eps)
}
