// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Planar polygon and polyline utilities

use super::{Frame, Point2, Point3, Vector3};
use crate::config::Tolerance;
use crate::error::{KernelError, KernelResult};
use std::f64::consts::TAU;

fn newell_sum(points: &[Point3]) -> Vector3 {
    let n = points.len();
    let mut normal = Vector3::zeros();
    for i in 0..n {
        let a = &points[i];
        let b = &points[(i + 1) % n];
        normal.x += (a.y - b.y) * (a.z + b.z);
        normal.y += (a.z - b.z) * (a.x + b.x);
        normal.z += (a.x - b.x) * (a.y + b.y);
    }
    normal
}

/// Unit normal of a closed loop by Newell's method.
///
/// The normal follows the right-hand rule on the loop order.
pub fn newell_normal(points: &[Point3], tol: &Tolerance) -> KernelResult<Vector3> {
    let normal = newell_sum(points);
    let len = normal.norm();
    let scale = points
        .iter()
        .map(|p| (p - points[0]).norm())
        .fold(0.0_f64, f64::max)
        .max(1.0);
    if len <= tol.eps * scale * scale {
        return Err(KernelError::degenerate(format!(
            "no normal for a loop of {} collinear point(s)",
            points.len()
        )));
    }
    Ok(normal / len)
}

/// Unsigned area of a planar 3D loop
pub fn polygon_area_3d(points: &[Point3]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    0.5 * newell_sum(points).norm()
}

/// Signed area of a 2D loop, positive for counter-clockwise order
pub fn polygon_area_2d(points: &[Point2]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let mut twice = 0.0;
    for i in 0..n {
        let a = &points[i];
        let b = &points[(i + 1) % n];
        twice += a.x * b.y - b.x * a.y;
    }
    0.5 * twice
}

/// Vertex average of a point set
pub fn polygon_centroid(points: &[Point3]) -> Point3 {
    if points.is_empty() {
        return Point3::origin();
    }
    let sum = points
        .iter()
        .fold(Vector3::zeros(), |acc, p| acc + p.coords);
    Point3::from(sum / points.len() as f64)
}

/// Winding-number point-in-polygon test. Points on the boundary may go either way.
pub fn point_in_polygon_2d(point: &Point2, polygon: &[Point2]) -> bool {
    let n = polygon.len();
    if n < 3 {
        return false;
    }
    let mut winding = 0i32;
    for i in 0..n {
        let a = &polygon[i];
        let b = &polygon[(i + 1) % n];
        let cross = (b.x - a.x) * (point.y - a.y) - (b.y - a.y) * (point.x - a.x);
        if a.y <= point.y {
            if b.y > point.y && cross > 0.0 {
                winding += 1;
            }
        } else if b.y <= point.y && cross < 0.0 {
            winding -= 1;
        }
    }
    winding != 0
}

/// Point-in-polygon for a point that must lie in the polygon's plane.
///
/// Returns `false` for points farther than the coincidence tolerance from the plane.
pub fn point_in_polygon_3d(
    point: &Point3,
    polygon: &[Point3],
    tol: &Tolerance,
) -> KernelResult<bool> {
    if polygon.len() < 3 {
        return Ok(false);
    }
    let normal = newell_normal(polygon, tol)?;
    let frame = Frame::from_normal(polygon[0], &normal, &(polygon[1] - polygon[0]), tol)?;
    let local = frame.to_local(point);
    let scale = (point - polygon[0]).norm().max(1.0);
    if local.z.abs() > tol.coincidence * scale {
        return Ok(false);
    }
    let flat: Vec<Point2> = polygon.iter().map(|p| frame.to_local_2d(p)).collect();
    Ok(point_in_polygon_2d(&Point2::new(local.x, local.y), &flat))
}

/// Total length of an open polyline
pub fn polyline_length(points: &[Point3]) -> f64 {
    points.windows(2).map(|w| (w[1] - w[0]).norm()).sum()
}

/// Point at arc length `d` along an open polyline
pub fn point_along_polyline(points: &[Point3], d: f64, tol: &Tolerance) -> KernelResult<Point3> {
    if points.len() < 2 {
        return Err(KernelError::InvalidInput(format!(
            "polyline needs at least 2 points, got {}",
            points.len()
        )));
    }
    let total = polyline_length(points);
    if d < -tol.coincidence || d > total + tol.coincidence {
        return Err(KernelError::InvalidInput(format!(
            "distance {d} outside polyline of length {total}"
        )));
    }

    let mut walked = 0.0;
    for w in points.windows(2) {
        let seg = (w[1] - w[0]).norm();
        if seg > 0.0 && walked + seg >= d {
            let r = ((d - walked) / seg).clamp(0.0, 1.0);
            return Ok(w[0] + (w[1] - w[0]) * r);
        }
        walked += seg;
    }
    Ok(points[points.len() - 1])
}

/// Order of `points` clockwise about their centroid, starting at the first point.
///
/// Angles within `eps` of a full turn count as the start angle. Ties are broken by
/// distance to the centroid, nearest first.
fn clockwise_order(points: &[Point2], tol: &Tolerance) -> Vec<usize> {
    if points.len() < 3 {
        return (0..points.len()).collect();
    }
    let cx = points.iter().map(|p| p.x).sum::<f64>() / points.len() as f64;
    let cy = points.iter().map(|p| p.y).sum::<f64>() / points.len() as f64;
    let start = (points[0].y - cy).atan2(points[0].x - cx);

    let keys: Vec<(f64, f64)> = points
        .iter()
        .map(|p| {
            let angle = (p.y - cy).atan2(p.x - cx);
            let mut sweep = (start - angle).rem_euclid(TAU);
            if sweep > TAU - tol.eps {
                sweep = 0.0;
            }
            (sweep, (p.x - cx).hypot(p.y - cy))
        })
        .collect();

    let mut order: Vec<usize> = (0..points.len()).collect();
    order.sort_by(|&a, &b| {
        keys[a]
            .0
            .total_cmp(&keys[b].0)
            .then(keys[a].1.total_cmp(&keys[b].1))
    });
    order
}

/// Sort a 2D point set clockwise about its centroid, starting from the first point
pub fn sort_points_clockwise_2d(points: &[Point2], tol: &Tolerance) -> Vec<Point2> {
    clockwise_order(points, tol)
        .into_iter()
        .map(|i| points[i])
        .collect()
}

/// Sort a coplanar 3D point set clockwise as seen from the tip of `normal`
pub fn sort_points_clockwise_3d(
    points: &[Point3],
    normal: &Vector3,
    tol: &Tolerance,
) -> KernelResult<Vec<Point3>> {
    if points.len() < 3 {
        return Ok(points.to_vec());
    }
    let frame = Frame::from_normal(points[0], normal, &Vector3::x(), tol)?;
    let flat: Vec<Point2> = points.iter().map(|p| frame.to_local_2d(p)).collect();
    Ok(clockwise_order(&flat, tol)
        .into_iter()
        .map(|i| points[i])
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn tol() -> Tolerance {
        Tolerance::default()
    }

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    fn q(x: f64, y: f64) -> Point2 {
        Point2::new(x, y)
    }

    #[test]
    fn test_newell_normal_follows_winding() {
        let ccw = vec![p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), p(1.0, 1.0, 0.0), p(0.0, 1.0, 0.0)];
        assert_relative_eq!(newell_normal(&ccw, &tol()).unwrap(), Vector3::z(), epsilon = 1e-12);

        let mut cw = ccw.clone();
        cw.reverse();
        assert_relative_eq!(newell_normal(&cw, &tol()).unwrap(), -Vector3::z(), epsilon = 1e-12);
    }

    #[test]
    fn test_newell_normal_collinear() {
        let line = vec![p(0.0, 0.0, 0.0), p(1.0, 1.0, 1.0), p(3.0, 3.0, 3.0)];
        assert!(newell_normal(&line, &tol()).is_err());
    }

    #[test]
    fn test_areas() {
        let square = vec![q(0.0, 0.0), q(2.0, 0.0), q(2.0, 2.0), q(0.0, 2.0)];
        assert_relative_eq!(polygon_area_2d(&square), 4.0);

        let tilted = vec![p(0.0, 0.0, 0.0), p(3.0, 0.0, 0.0), p(3.0, 4.0, 4.0), p(0.0, 4.0, 4.0)];
        assert_relative_eq!(polygon_area_3d(&tilted), 3.0 * 32f64.sqrt(), epsilon = 1e-9);
    }

    #[test]
    fn test_point_in_polygon_2d() {
        let l_shape = vec![
            q(0.0, 0.0),
            q(4.0, 0.0),
            q(4.0, 1.0),
            q(1.0, 1.0),
            q(1.0, 4.0),
            q(0.0, 4.0),
        ];
        assert!(point_in_polygon_2d(&q(0.5, 3.0), &l_shape));
        assert!(point_in_polygon_2d(&q(3.0, 0.5), &l_shape));
        assert!(!point_in_polygon_2d(&q(3.0, 3.0), &l_shape));
        assert!(!point_in_polygon_2d(&q(-1.0, 0.5), &l_shape));
    }

    #[test]
    fn test_point_in_polygon_3d_off_plane() {
        let quad = vec![p(0.0, 0.0, 0.0), p(10.0, 0.0, 0.0), p(10.0, 0.0, 10.0), p(0.0, 0.0, 10.0)];
        assert!(point_in_polygon_3d(&p(5.0, 0.0, 5.0), &quad, &tol()).unwrap());
        assert!(!point_in_polygon_3d(&p(5.0, 1.0, 5.0), &quad, &tol()).unwrap());
        assert!(!point_in_polygon_3d(&p(15.0, 0.0, 5.0), &quad, &tol()).unwrap());
    }

    #[test]
    fn test_point_along_polyline() {
        let pl = vec![p(0.0, 0.0, 0.0), p(3.0, 0.0, 0.0), p(3.0, 4.0, 0.0)];
        assert_relative_eq!(polyline_length(&pl), 7.0);
        assert_relative_eq!(point_along_polyline(&pl, 5.0, &tol()).unwrap(), p(3.0, 2.0, 0.0));
        assert_relative_eq!(point_along_polyline(&pl, 7.0, &tol()).unwrap(), p(3.0, 4.0, 0.0));
        assert!(point_along_polyline(&pl, 8.0, &tol()).is_err());
    }

    #[test]
    fn test_sort_clockwise_starts_at_first_point() {
        let shuffled = vec![q(0.0, 1.0), q(0.0, 0.0), q(1.0, 1.0), q(1.0, 0.0)];
        let sorted = sort_points_clockwise_2d(&shuffled, &tol());
        assert_eq!(sorted, vec![q(0.0, 1.0), q(1.0, 1.0), q(1.0, 0.0), q(0.0, 0.0)]);
        assert!(polygon_area_2d(&sorted) < 0.0);
    }

    #[test]
    fn test_sort_clockwise_idempotent() {
        let cw = vec![q(0.0, 2.0), q(2.0, 2.0), q(3.0, 0.5), q(2.0, -1.0), q(-1.0, 0.0)];
        let once = sort_points_clockwise_2d(&cw, &tol());
        assert_eq!(once, cw);
        assert_eq!(sort_points_clockwise_2d(&once, &tol()), once);
    }

    #[test]
    fn test_sort_clockwise_3d_viewed_from_normal() {
        let pts = vec![p(0.0, 0.0, 5.0), p(0.0, 1.0, 5.0), p(1.0, 0.0, 5.0), p(1.0, 1.0, 5.0)];
        let sorted = sort_points_clockwise_3d(&pts, &Vector3::z(), &tol()).unwrap();
        // seen from +Z, clockwise means negative Newell Z
        let n = newell_normal(&sorted, &tol()).unwrap();
        assert!(n.z < 0.0);
        assert_eq!(sorted[0], pts[0]);
    }
}
