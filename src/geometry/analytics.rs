// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Geometry analytics and statistics

use super::Mesh;
use crate::config::Tolerance;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Geometry statistics and analytics
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeometryStats {
    /// Enclosed volume in mm³
    pub volume: f64,
    /// Total surface area in mm²
    pub surface_area: f64,
    /// Bounding box [min_x, min_y, min_z, max_x, max_y, max_z]
    pub bbox: [f64; 6],
    /// Volume centroid [x, y, z]
    pub centroid: [f64; 3],
    pub vertex_count: usize,
    pub triangle_count: usize,
    /// Every edge is shared by exactly two triangles
    pub is_watertight: bool,
}

/// Analyze mesh geometry and compute statistics
pub fn analyze(mesh: &Mesh, tol: &Tolerance) -> GeometryStats {
    if mesh.vertices.is_empty() || mesh.triangles.is_empty() {
        return GeometryStats::default();
    }

    let bbox = mesh.bounding_box();
    GeometryStats {
        volume: mesh.signed_volume().abs(),
        surface_area: calculate_surface_area(mesh),
        bbox: [
            bbox.min.x, bbox.min.y, bbox.min.z, bbox.max.x, bbox.max.y, bbox.max.z,
        ],
        centroid: calculate_centroid(mesh, tol),
        vertex_count: mesh.vertices.len(),
        triangle_count: mesh.triangles.len(),
        is_watertight: check_watertight(mesh),
    }
}

/// Calculate total surface area
fn calculate_surface_area(mesh: &Mesh) -> f64 {
    mesh.triangles
        .iter()
        .map(|t| {
            let [v0, v1, v2] = mesh.triangle_positions(t);
            (v1 - v0).cross(&(v2 - v0)).norm() / 2.0
        })
        .sum()
}

/// Volume-weighted centroid of the tetrahedra fanned from the origin.
/// Falls back to the vertex average for shells without volume.
fn calculate_centroid(mesh: &Mesh, tol: &Tolerance) -> [f64; 3] {
    let mut weighted = nalgebra::Vector3::<f64>::zeros();
    let mut total = 0.0;
    for t in &mesh.triangles {
        let [v0, v1, v2] = mesh.triangle_positions(t);
        let vol = v0.coords.dot(&v1.coords.cross(&v2.coords)) / 6.0;
        weighted += (v0.coords + v1.coords + v2.coords) * (vol / 4.0);
        total += vol;
    }

    if total.abs() > tol.eps {
        let c = weighted / total;
        return [c.x, c.y, c.z];
    }

    let count = mesh.vertices.len() as f64;
    let sum = mesh
        .vertices
        .iter()
        .fold(nalgebra::Vector3::zeros(), |acc, v| acc + v.position.coords);
    [sum.x / count, sum.y / count, sum.z / count]
}

/// A mesh is watertight if every edge is shared by exactly 2 triangles
fn check_watertight(mesh: &Mesh) -> bool {
    let mut edge_count: HashMap<(usize, usize), usize> = HashMap::new();

    for triangle in &mesh.triangles {
        let indices = &triangle.indices;
        for i in 0..3 {
            let v1 = indices[i];
            let v2 = indices[(i + 1) % 3];
            let edge = if v1 < v2 { (v1, v2) } else { (v2, v1) };
            *edge_count.entry(edge).or_insert(0) += 1;
        }
    }

    edge_count.values().all(|&count| count == 2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Tolerance;
    use crate::geometry::{Point3, Triangle, Vertex};

    fn slab() -> Mesh {
        let face = |z: f64| {
            vec![
                Point3::new(-5.0, -5.0, z),
                Point3::new(5.0, -5.0, z),
                Point3::new(5.0, 5.0, z),
                Point3::new(-5.0, 5.0, z),
            ]
        };
        Mesh::from_two_faces(&face(5.0), &face(-5.0), &Tolerance::default()).unwrap()
    }

    #[test]
    fn test_analyze_cube() {
        let stats = analyze(&slab(), &Tolerance::default());

        assert!((stats.volume - 1000.0).abs() < 1e-6);
        assert!((stats.surface_area - 600.0).abs() < 1e-6);
        assert_eq!(stats.vertex_count, 8);
        assert_eq!(stats.triangle_count, 12);
        assert!(stats.is_watertight);

        assert!(stats.centroid[0].abs() < 1e-9);
        assert!(stats.centroid[1].abs() < 1e-9);
        assert!(stats.centroid[2].abs() < 1e-9);
    }

    #[test]
    fn test_flat_shell_centroid_falls_back_to_vertices() {
        // two coincident caps enclose nothing
        let square = [
            Point3::new(0.0, 0.0, 3.0),
            Point3::new(4.0, 0.0, 3.0),
            Point3::new(4.0, 2.0, 3.0),
            Point3::new(0.0, 2.0, 3.0),
        ];
        let mut mesh = Mesh::new();
        for p in &square {
            mesh.add_vertex(Vertex::at(*p));
        }
        mesh.add_triangle(Triangle::new([0, 1, 2]));
        mesh.add_triangle(Triangle::new([0, 2, 3]));
        mesh.add_triangle(Triangle::new([2, 1, 0]));
        mesh.add_triangle(Triangle::new([3, 2, 0]));

        let stats = analyze(&mesh, &Tolerance::default());
        assert!(stats.volume.abs() < 1e-9);
        assert!((stats.centroid[0] - 2.0).abs() < 1e-9);
        assert!((stats.centroid[1] - 1.0).abs() < 1e-9);
        assert!((stats.centroid[2] - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_mesh() {
        let stats = analyze(&Mesh::new(), &Tolerance::default());
        assert_eq!(stats.volume, 0.0);
        assert!(!stats.is_watertight);
    }
}
