// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Point and line primitives shared by every member engine

use super::{newell_normal, Face, Point3, Vector3};
use crate::config::Tolerance;
use crate::error::{KernelError, KernelResult};

/// Euclidean distance between two points
pub fn distance(p1: &Point3, p2: &Point3) -> f64 {
    (p2 - p1).norm()
}

/// Unit vector from `from` to `to`, or an error for coincident points
pub fn unit_direction(from: &Point3, to: &Point3, tol: &Tolerance) -> KernelResult<Vector3> {
    let d = to - from;
    let len = d.norm();
    if len <= tol.coincidence {
        return Err(KernelError::degenerate(format!(
            "zero-length direction between {:?} and {:?}",
            from.coords, to.coords
        )));
    }
    Ok(d / len)
}

/// Point at signed distance `d` from `p1` toward `p2`
pub fn point_on_line(p1: &Point3, p2: &Point3, d: f64, tol: &Tolerance) -> KernelResult<Point3> {
    let dir = unit_direction(p1, p2, tol)?;
    Ok(p1 + dir * d)
}

/// Translate `base` by `d` along the unit direction `dir_end - dir_start`
pub fn point_on_parallel_line(
    base: &Point3,
    dir_start: &Point3,
    dir_end: &Point3,
    d: f64,
    tol: &Tolerance,
) -> KernelResult<Point3> {
    let dir = unit_direction(dir_start, dir_end, tol)?;
    Ok(base + dir * d)
}

/// Orthogonal projection of `p` onto the infinite line through `a` and `b`
pub fn project_point_onto_line(
    p: &Point3,
    a: &Point3,
    b: &Point3,
    tol: &Tolerance,
) -> KernelResult<Point3> {
    let dir = unit_direction(a, b, tol)?;
    let t = (p - a).dot(&dir);
    Ok(a + dir * t)
}

/// Intersection of the line through `p4`/`p5` with the plane through `p1`, `p2`, `p3`.
///
/// Returns `Ok(None)` when the line is parallel to the plane. Collinear plane
/// points or a zero-length line are degenerate.
pub fn intersect_line_plane(
    p1: &Point3,
    p2: &Point3,
    p3: &Point3,
    p4: &Point3,
    p5: &Point3,
    tol: &Tolerance,
) -> KernelResult<Option<Point3>> {
    let normal = (p2 - p1).cross(&(p3 - p1));
    let normal_len = normal.norm();
    if normal_len <= tol.eps * (p2 - p1).norm().max(1.0) * (p3 - p1).norm().max(1.0) {
        return Err(KernelError::degenerate("plane points are collinear"));
    }
    let normal = normal / normal_len;
    let dir = unit_direction(p4, p5, tol)?;

    let denom = normal.dot(&dir);
    if denom.abs() <= tol.eps {
        return Ok(None);
    }

    let t = normal.dot(&(p1 - p4)) / denom;
    Ok(Some(p4 + dir * t))
}

/// Closest points between two infinite lines `a0 a1` and `b0 b1`.
///
/// Returns `None` for parallel lines.
pub fn closest_points_between_lines(
    a0: &Point3,
    a1: &Point3,
    b0: &Point3,
    b1: &Point3,
    tol: &Tolerance,
) -> KernelResult<Option<(Point3, Point3)>> {
    let u = unit_direction(a0, a1, tol)?;
    let v = unit_direction(b0, b1, tol)?;
    let w = a0 - b0;
    let b = u.dot(&v);
    let denom = 1.0 - b * b;
    if denom <= tol.eps {
        return Ok(None);
    }
    let d = u.dot(&w);
    let e = v.dot(&w);
    let s = (b * e - d) / denom;
    let t = (e - b * d) / denom;
    Ok(Some((a0 + u * s, b0 + v * t)))
}

/// Displace every point of a planar face along its normal by `distance`.
///
/// Point count and order are preserved.
pub fn offset_face(face: &[Point3], distance: f64, tol: &Tolerance) -> KernelResult<Face> {
    if face.len() < 2 {
        return Err(KernelError::InvalidInput(format!(
            "cannot offset a face with {} point(s)",
            face.len()
        )));
    }
    let normal = newell_normal(face, tol)?;
    Ok(face.iter().map(|p| p + normal * distance).collect())
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

    #[test]
    fn test_point_on_line_endpoints() {
        let a = p(100.0, -20.0, 5.0);
        let b = p(1300.0, 480.0, -75.0);
        let at_start = point_on_line(&a, &b, 0.0, &tol()).unwrap();
        let at_end = point_on_line(&a, &b, distance(&a, &b), &tol()).unwrap();
        assert_relative_eq!(at_start, a, epsilon = 1e-9);
        assert_relative_eq!(at_end, b, epsilon = 1e-9);
    }

    #[test]
    fn test_point_on_line_rejects_zero_direction() {
        let a = p(1.0, 2.0, 3.0);
        let err = point_on_line(&a, &a, 5.0, &tol()).unwrap_err();
        assert!(matches!(err, KernelError::DegenerateGeometry(_)));
    }

    #[test]
    fn test_point_on_parallel_line() {
        let base = p(0.0, 0.0, 0.0);
        let q = point_on_parallel_line(&base, &p(5.0, 5.0, 0.0), &p(5.0, 10.0, 0.0), 3.0, &tol())
            .unwrap();
        assert_relative_eq!(q, p(0.0, 3.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn test_project_point_onto_line() {
        let q = project_point_onto_line(
            &p(3.0, 4.0, 7.0),
            &p(0.0, 0.0, 0.0),
            &p(10.0, 0.0, 0.0),
            &tol(),
        )
        .unwrap();
        assert_relative_eq!(q, p(3.0, 0.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn test_intersect_line_plane_hits() {
        let hit = intersect_line_plane(
            &p(0.0, 0.0, 0.0),
            &p(1.0, 0.0, 0.0),
            &p(0.0, 1.0, 0.0),
            &p(2.0, 3.0, 10.0),
            &p(2.0, 3.0, 5.0),
            &tol(),
        )
        .unwrap()
        .unwrap();
        assert_relative_eq!(hit, p(2.0, 3.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn test_intersect_line_plane_parallel() {
        let hit = intersect_line_plane(
            &p(0.0, 0.0, 0.0),
            &p(1.0, 0.0, 0.0),
            &p(0.0, 1.0, 0.0),
            &p(0.0, 0.0, 4.0),
            &p(7.0, -2.0, 4.0),
            &tol(),
        )
        .unwrap();
        assert!(hit.is_none());
    }

    #[test]
    fn test_intersect_line_plane_collinear_plane() {
        let result = intersect_line_plane(
            &p(0.0, 0.0, 0.0),
            &p(1.0, 0.0, 0.0),
            &p(2.0, 0.0, 0.0),
            &p(0.0, 0.0, 4.0),
            &p(0.0, 0.0, 5.0),
            &tol(),
        );
        assert!(matches!(result, Err(KernelError::DegenerateGeometry(_))));
    }

    #[test]
    fn test_closest_points_between_skew_lines() {
        let (pa, pb) = closest_points_between_lines(
            &p(0.0, 0.0, 0.0),
            &p(10.0, 0.0, 0.0),
            &p(5.0, -5.0, 3.0),
            &p(5.0, 5.0, 3.0),
            &tol(),
        )
        .unwrap()
        .unwrap();
        assert_relative_eq!(pa, p(5.0, 0.0, 0.0), epsilon = 1e-9);
        assert_relative_eq!(pb, p(5.0, 0.0, 3.0), epsilon = 1e-9);
    }

    #[test]
    fn test_offset_face_round_trip() {
        let face = vec![
            p(0.0, 0.0, 0.0),
            p(4000.0, 0.0, 50.0),
            p(4000.0, 1200.0, 50.0),
            p(0.0, 1200.0, 0.0),
        ];
        let there = offset_face(&face, 12.5, &tol()).unwrap();
        let back = offset_face(&there, -12.5, &tol()).unwrap();
        assert_eq!(back.len(), face.len());
        for (a, b) in face.iter().zip(&back) {
            assert_relative_eq!(a, b, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_offset_face_too_small() {
        let err = offset_face(&[p(0.0, 0.0, 0.0)], 1.0, &tol()).unwrap_err();
        assert!(matches!(err, KernelError::InvalidInput(_)));
    }
}
