// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! CSG (Constructive Solid Geometry) operations using BSP tree

use super::{Mesh, Point3, Triangle, Vector3, Vertex};
use crate::config::Tolerance;

const COPLANAR: u8 = 0;
const FRONT: u8 = 1;
const BACK: u8 = 2;
const SPANNING: u8 = 3;

/// BSP tree node for CSG operations
#[derive(Clone, Default)]
struct BSPNode {
    plane: Option<Plane>,
    front: Option<Box<BSPNode>>,
    back: Option<Box<BSPNode>>,
    polygons: Vec<Polygon>,
}

#[derive(Clone, Copy)]
struct Plane {
    normal: Vector3,
    w: f64,
}

/// Convex planar polygon
#[derive(Clone)]
struct Polygon {
    vertices: Vec<Point3>,
    plane: Plane,
}

impl Plane {
    fn from_points(a: &Point3, b: &Point3, c: &Point3, tol: &Tolerance) -> Option<Self> {
        let normal = (b - a).cross(&(c - a)).try_normalize(tol.eps)?;
        Some(Self {
            normal,
            w: normal.dot(&a.coords),
        })
    }

    fn flip(&mut self) {
        self.normal = -self.normal;
        self.w = -self.w;
    }

    /// Sort `polygon` into the four buckets, splitting it when it spans the plane
    fn split_polygon(
        &self,
        polygon: &Polygon,
        eps: f64,
        coplanar_front: &mut Vec<Polygon>,
        coplanar_back: &mut Vec<Polygon>,
        front: &mut Vec<Polygon>,
        back: &mut Vec<Polygon>,
    ) {
        let mut polygon_type = COPLANAR;
        let types: Vec<u8> = polygon
            .vertices
            .iter()
            .map(|v| {
                let t = self.normal.dot(&v.coords) - self.w;
                let class = if t < -eps {
                    BACK
                } else if t > eps {
                    FRONT
                } else {
                    COPLANAR
                };
                polygon_type |= class;
                class
            })
            .collect();

        match polygon_type {
            COPLANAR => {
                if self.normal.dot(&polygon.plane.normal) > 0.0 {
                    coplanar_front.push(polygon.clone());
                } else {
                    coplanar_back.push(polygon.clone());
                }
            }
            FRONT => front.push(polygon.clone()),
            BACK => back.push(polygon.clone()),
            _ => {
                let n = polygon.vertices.len();
                let mut f = Vec::with_capacity(n + 1);
                let mut b = Vec::with_capacity(n + 1);
                for i in 0..n {
                    let j = (i + 1) % n;
                    let (ti, tj) = (types[i], types[j]);
                    let (vi, vj) = (polygon.vertices[i], polygon.vertices[j]);
                    if ti != BACK {
                        f.push(vi);
                    }
                    if ti != FRONT {
                        b.push(vi);
                    }
                    if (ti | tj) == SPANNING {
                        let t = (self.w - self.normal.dot(&vi.coords))
                            / self.normal.dot(&(vj - vi));
                        let v = vi + (vj - vi) * t;
                        f.push(v);
                        b.push(v);
                    }
                }
                if f.len() >= 3 {
                    front.push(Polygon {
                        vertices: f,
                        plane: polygon.plane,
                    });
                }
                if b.len() >= 3 {
                    back.push(Polygon {
                        vertices: b,
                        plane: polygon.plane,
                    });
                }
            }
        }
    }
}

impl Polygon {
    fn flip(&mut self) {
        self.vertices.reverse();
        self.plane.flip();
    }
}

impl BSPNode {
    fn new(polygons: Vec<Polygon>, eps: f64) -> Self {
        let mut node = Self::default();
        node.build(polygons, eps);
        node
    }

    fn build(&mut self, polygons: Vec<Polygon>, eps: f64) {
        if polygons.is_empty() {
            return;
        }
        let plane = *self.plane.get_or_insert(polygons[0].plane);

        let mut front_polys = Vec::new();
        let mut back_polys = Vec::new();
        let mut coplanar_front = Vec::new();
        let mut coplanar_back = Vec::new();
        for poly in &polygons {
            plane.split_polygon(
                poly,
                eps,
                &mut coplanar_front,
                &mut coplanar_back,
                &mut front_polys,
                &mut back_polys,
            );
        }
        self.polygons.append(&mut coplanar_front);
        self.polygons.append(&mut coplanar_back);

        if !front_polys.is_empty() {
            self.front
                .get_or_insert_with(Box::default)
                .build(front_polys, eps);
        }
        if !back_polys.is_empty() {
            self.back
                .get_or_insert_with(Box::default)
                .build(back_polys, eps);
        }
    }

    fn all_polygons(&self) -> Vec<Polygon> {
        let mut result = self.polygons.clone();
        if let Some(ref front) = self.front {
            result.extend(front.all_polygons());
        }
        if let Some(ref back) = self.back {
            result.extend(back.all_polygons());
        }
        result
    }

    /// Remove all parts of `polygons` that are inside this tree
    fn clip_polygons(&self, polygons: &[Polygon], eps: f64) -> Vec<Polygon> {
        let Some(plane) = self.plane else {
            return polygons.to_vec();
        };

        let mut front = Vec::new();
        let mut back = Vec::new();
        for poly in polygons {
            let mut cf = Vec::new();
            let mut cb = Vec::new();
            plane.split_polygon(poly, eps, &mut cf, &mut cb, &mut front, &mut back);
            front.append(&mut cf);
            back.append(&mut cb);
        }

        let mut result = match self.front {
            Some(ref node) => node.clip_polygons(&front, eps),
            None => front,
        };
        if let Some(ref node) = self.back {
            result.extend(node.clip_polygons(&back, eps));
        }
        result
    }

    fn clip_to(&mut self, bsp: &BSPNode, eps: f64) {
        self.polygons = bsp.clip_polygons(&self.polygons, eps);
        if let Some(ref mut front) = self.front {
            front.clip_to(bsp, eps);
        }
        if let Some(ref mut back) = self.back {
            back.clip_to(bsp, eps);
        }
    }

    fn invert(&mut self) {
        for poly in &mut self.polygons {
            poly.flip();
        }
        if let Some(ref mut plane) = self.plane {
            plane.flip();
        }
        if let Some(ref mut front) = self.front {
            front.invert();
        }
        if let Some(ref mut back) = self.back {
            back.invert();
        }
        std::mem::swap(&mut self.front, &mut self.back);
    }
}

/// Convert mesh to polygons, dropping zero-area triangles
fn mesh_to_polygons(mesh: &Mesh, tol: &Tolerance) -> Vec<Polygon> {
    mesh.triangles
        .iter()
        .filter_map(|tri| {
            let vertices = mesh.triangle_positions(tri);
            let plane = Plane::from_points(&vertices[0], &vertices[1], &vertices[2], tol)?;
            Some(Polygon {
                vertices: vertices.to_vec(),
                plane,
            })
        })
        .collect()
}

/// Fan-triangulate the convex polygons back into a welded mesh
fn polygons_to_mesh(polygons: &[Polygon], tol: &Tolerance) -> Mesh {
    let mut mesh = Mesh::new();

    for poly in polygons {
        let base = mesh.vertex_count();
        for v in &poly.vertices {
            mesh.add_vertex(Vertex::new(*v, poly.plane.normal));
        }
        for k in 1..poly.vertices.len() - 1 {
            mesh.add_triangle(Triangle::new([base, base + k, base + k + 1]));
        }
    }

    mesh.weld_vertices(tol.coincidence);
    mesh.recompute_normals(tol);
    mesh
}

/// Perform CSG difference `a - b` using BSP trees.
///
/// Vertices within `tol.coincidence` of a splitting plane count as coplanar.
pub fn csg_difference(a: &Mesh, b: &Mesh, tol: &Tolerance) -> Mesh {
    let eps = tol.coincidence;
    let mut tree_a = BSPNode::new(mesh_to_polygons(a, tol), eps);
    let mut tree_b = BSPNode::new(mesh_to_polygons(b, tol), eps);

    tree_a.invert();
    tree_a.clip_to(&tree_b, eps);
    tree_b.clip_to(&tree_a, eps);
    tree_b.invert();
    tree_b.clip_to(&tree_a, eps);
    tree_b.invert();
    tree_a.build(tree_b.all_polygons(), eps);
    tree_a.invert();

    polygons_to_mesh(&tree_a.all_polygons(), tol)
}
