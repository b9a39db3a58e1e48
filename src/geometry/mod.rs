// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Geometry module - point-set primitives and the mesh solid representation

mod analytics;
mod bbox;
mod csg;
mod frame;
mod mesh;
mod polygon;
mod primitives;
mod strip;
mod triangulate;

pub use analytics::{analyze, GeometryStats};
pub use bbox::BoundingBox;
pub use csg::csg_difference;
pub use frame::{transform_face_to_face, Frame};
pub use mesh::{Mesh, Triangle, Vertex};
pub use polygon::{
    newell_normal, point_along_polyline, point_in_polygon_2d, point_in_polygon_3d,
    polygon_area_2d, polygon_area_3d, polygon_centroid, polyline_length,
    sort_points_clockwise_2d, sort_points_clockwise_3d,
};
pub use primitives::{
    closest_points_between_lines, distance, intersect_line_plane, offset_face,
    point_on_line, point_on_parallel_line, project_point_onto_line, unit_direction,
};
pub use strip::RuledStrip;
pub use triangulate::triangulate_polygon_2d;

/// 2D point type.
pub type Point2 = nalgebra::Point2<f64>;

/// 3D point type.
pub type Point3 = nalgebra::Point3<f64>;

/// 2D vector type.
pub type Vector2 = nalgebra::Vector2<f64>;

/// 3D vector type.
pub type Vector3 = nalgebra::Vector3<f64>;

/// An ordered point list: one edge of a ruled strip or one loop of a planar polygon.
pub type Face = Vec<Point3>;
