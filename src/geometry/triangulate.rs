// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Ear-clipping triangulation of simple planar polygons

use super::{polygon_area_2d, Point2};
use crate::error::{KernelError, KernelResult};

fn cross(o: &Point2, a: &Point2, b: &Point2) -> f64 {
    (a.x - o.x) * (b.y - o.y) - (a.y - o.y) * (b.x - o.x)
}

/// Inside the ear or on its boundary. Vertices coinciding with a corner do not count.
fn blocks_ear(p: &Point2, a: &Point2, b: &Point2, c: &Point2, orient: f64, eps: f64) -> bool {
    if [a, b, c].iter().any(|q| (p - *q).norm_squared() <= eps) {
        return false;
    }
    cross(a, b, p) * orient >= -eps && cross(b, c, p) * orient >= -eps && cross(c, a, p) * orient >= -eps
}

/// Triangulate a simple polygon given by its loop order.
///
/// Triangles are index triples that keep the loop's own winding. Collinear vertices
/// are skipped, so a triangle edge may pass through them.
pub fn triangulate_polygon_2d(points: &[Point2], eps: f64) -> KernelResult<Vec<[usize; 3]>> {
    let n = points.len();
    if n < 3 {
        return Err(KernelError::degenerate(format!(
            "cannot triangulate {n} point(s)"
        )));
    }
    let area = polygon_area_2d(points);
    let scale = points
        .iter()
        .map(|p| (p - points[0]).norm())
        .fold(1.0_f64, f64::max);
    let area_eps = eps * scale * scale;
    if area.abs() <= area_eps {
        return Err(KernelError::degenerate("polygon has no area"));
    }
    let orient = area.signum();

    let mut remaining: Vec<usize> = (0..n).collect();
    let mut triangles = Vec::with_capacity(n - 2);

    while remaining.len() > 3 {
        let m = remaining.len();
        let mut clipped = false;

        for k in 0..m {
            let ia = remaining[(k + m - 1) % m];
            let ib = remaining[k];
            let ic = remaining[(k + 1) % m];
            let (a, b, c) = (&points[ia], &points[ib], &points[ic]);

            if cross(a, b, c) * orient <= area_eps {
                continue;
            }
            let blocked = remaining.iter().any(|&j| {
                j != ia && j != ib && j != ic && blocks_ear(&points[j], a, b, c, orient, area_eps)
            });
            if blocked {
                continue;
            }

            triangles.push([ia, ib, ic]);
            remaining.remove(k);
            clipped = true;
            break;
        }

        if !clipped {
            // only flat vertices can stop the clipper on a simple polygon
            let m = remaining.len();
            let flat = (0..m).find(|&k| {
                let a = &points[remaining[(k + m - 1) % m]];
                let b = &points[remaining[k]];
                let c = &points[remaining[(k + 1) % m]];
                cross(a, b, c).abs() <= area_eps
            });
            match flat {
                Some(k) => {
                    remaining.remove(k);
                }
                None => return Err(KernelError::degenerate("polygon is not simple")),
            }
        }
    }

    let (a, b, c) = (
        &points[remaining[0]],
        &points[remaining[1]],
        &points[remaining[2]],
    );
    if cross(a, b, c).abs() > area_eps {
        triangles.push([remaining[0], remaining[1], remaining[2]]);
    }
    Ok(triangles)
}
