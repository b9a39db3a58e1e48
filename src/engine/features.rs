// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Plate features shared by the panel and sub-panel engines: corner cuts,
//! slots, splice joints, cutouts and stiffeners.
//!
//! Every feature is described in the mid-plane of its plate. `span` is the pair
//! of signed face offsets `(upper, lower)` along the plate normal; cutters
//! overshoot both faces and every free edge.

use crate::config::Tolerance;
use crate::error::{KernelError, KernelResult};
use crate::geometry::{polyline_length, unit_direction, Frame, Point2, Point3, Vector3};
use crate::solid::{ElementClass, ElementRecipe, SolidRecipe};
use crate::spec::{CornerCut, CornerCutKind, CutoutSpec, FaceSide, JointEnd, PlateSide, Rib, SlotSpec, SplicePlate};

/// Distance by which cutters extend past the faces and edges they cut
pub const CUTTER_OVERSHOOT: f64 = 1.0;

/// Prism over a mid-plane outline spanning the signed offsets `span` along `normal`
pub fn plate_prism(outline: &[Point3], normal: &Vector3, span: (f64, f64)) -> SolidRecipe {
    let (upper, lower) = span;
    SolidRecipe::two_faces(
        outline.iter().map(|p| p + normal * upper).collect(),
        outline.iter().map(|p| p + normal * lower).collect(),
    )
}

fn cutter_prism(outline: &[Point3], normal: &Vector3, span: (f64, f64)) -> SolidRecipe {
    let (upper, lower) = span;
    let (hi, lo) = (upper.max(lower), upper.min(lower));
    plate_prism(
        outline,
        normal,
        (hi + CUTTER_OVERSHOOT, lo - CUTTER_OVERSHOOT),
    )
}

/// Cutter removing a plate corner.
///
/// `first` and `second` are the unit directions of the two edges leaving the
/// corner; `d1` is measured along `first`, `d2` along `second`.
pub fn corner_cutter(
    corner: &Point3,
    first: &Vector3,
    second: &Vector3,
    normal: &Vector3,
    cut: &CornerCut,
    span: (f64, f64),
    tol: &Tolerance,
) -> KernelResult<SolidRecipe> {
    if first.cross(second).norm() <= tol.eps {
        return Err(KernelError::degenerate("corner edges are parallel"));
    }
    let m = CUTTER_OVERSHOOT;
    let p1 = corner + first * cut.d1;
    let p2 = corner + second * cut.d2;
    let outline = match cut.kind {
        CornerCutKind::Triangle => {
            let along = unit_direction(&p2, &p1, tol)?;
            vec![
                p1 + along * m,
                corner - first * m - second * m,
                p2 - along * m,
            ]
        }
        CornerCutKind::Square => vec![
            corner - first * m - second * m,
            p1 - second * m,
            p1 + second * cut.d2,
            p2 - first * m,
        ],
    };
    Ok(cutter_prism(&outline, normal, span))
}

/// Point and unit tangent at arc length `d` along a polyline
pub fn locate_on_polyline(
    points: &[Point3],
    d: f64,
    tol: &Tolerance,
) -> KernelResult<(Point3, Vector3)> {
    let total = polyline_length(points);
    if points.len() < 2 || d < -tol.coincidence || d > total + tol.coincidence {
        return Err(KernelError::InvalidInput(format!(
            "position {d:.3} is outside the edge (length {total:.3})"
        )));
    }
    let mut acc = 0.0;
    for w in points.windows(2) {
        let len = (w[1] - w[0]).norm();
        if len <= tol.coincidence {
            continue;
        }
        if d <= acc + len + tol.coincidence {
            let t = (w[1] - w[0]) / len;
            return Ok((w[0] + t * (d - acc).clamp(0.0, len), t));
        }
        acc += len;
    }
    Err(KernelError::degenerate("edge has zero length"))
}

/// In-plane unit vector perpendicular to `tangent`, pointing toward `inside`
pub fn inward_direction(
    at: &Point3,
    tangent: &Vector3,
    normal: &Vector3,
    inside: &Point3,
    tol: &Tolerance,
) -> KernelResult<Vector3> {
    let perp = normal.cross(tangent);
    let len = perp.norm();
    if len <= tol.eps {
        return Err(KernelError::degenerate("edge is parallel to the plate normal"));
    }
    let perp = perp / len;
    Ok(if perp.dot(&(inside - at)) < 0.0 { -perp } else { perp })
}

/// Notch for a rib passing through a side of the plate
pub fn slot_cutter(
    side: &[Point3],
    normal: &Vector3,
    inside: &Point3,
    slot: &SlotSpec,
    rib: &Rib,
    span: (f64, f64),
    tol: &Tolerance,
) -> KernelResult<SolidRecipe> {
    let (at, tangent) = locate_on_polyline(side, slot.position, tol)?;
    let inward = inward_direction(&at, &tangent, normal, inside, tol)?;
    let half = rib.thick / 2.0 + slot.clearance;
    let depth = rib.height + slot.clearance;
    let m = CUTTER_OVERSHOOT;
    let outline = vec![
        at - tangent * half - inward * m,
        at + tangent * half - inward * m,
        at + tangent * half + inward * depth,
        at - tangent * half + inward * depth,
    ];
    Ok(cutter_prism(&outline, normal, span))
}

/// Joint edge of a plate receiving splice plates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JointEdge {
    pub start: Point3,
    pub end: Point3,
    /// In-plane unit direction from the edge into the plate
    pub inward: Vector3,
    pub normal: Vector3,
    /// Signed face offsets `(upper, lower)` of the plate
    pub span: (f64, f64),
}

/// Splice plates `"{owner}-SPL{S|E}{A|F}"` covering a joint edge.
///
/// Each plate reaches `half_width` to both sides of the joint line and stops
/// `clearance` short of both edge ends.
pub fn splice_plates(
    owner: &str,
    end: JointEnd,
    edge: &JointEdge,
    splice: &SplicePlate,
    container: Option<&str>,
    tol: &Tolerance,
) -> KernelResult<Vec<ElementRecipe>> {
    let along = unit_direction(&edge.start, &edge.end, tol)?;
    let length = (edge.end - edge.start).norm();
    if length - 2.0 * splice.clearance <= tol.coincidence {
        return Err(KernelError::degenerate(format!(
            "splice clearance {} leaves nothing of a {length:.1} mm joint edge",
            splice.clearance
        )));
    }
    let hw = splice.half_width();
    let a = edge.start + along * splice.clearance;
    let b = edge.end - along * splice.clearance;
    let outline = vec![
        a - edge.inward * hw,
        b - edge.inward * hw,
        b + edge.inward * hw,
        a + edge.inward * hw,
    ];

    let (upper, lower) = edge.span;
    let tag = match end {
        JointEnd::Start => 'S',
        JointEnd::End => 'E',
    };
    let sides: &[FaceSide] = match splice.side {
        PlateSide::A => &[FaceSide::A],
        PlateSide::F => &[FaceSide::F],
        PlateSide::Both => &[FaceSide::A, FaceSide::F],
    };
    Ok(sides
        .iter()
        .map(|side| {
            let (near, far) = match side {
                FaceSide::A => (upper, upper + splice.thick),
                FaceSide::F => (lower, lower - splice.thick),
            };
            ElementRecipe::new(
                format!("{owner}-SPL{tag}{side}"),
                ElementClass::Plate,
                container.map(str::to_string),
                plate_prism(&outline, &edge.normal, (far, near)),
            )
        })
        .collect())
}

/// Rectangular holes of a cutout row in the plate frame.
///
/// `frame` has its origin at the plate centroid and Z along the plate normal.
pub fn cutout_cutters(
    frame: &Frame,
    cutout: &CutoutSpec,
    span: (f64, f64),
) -> Vec<SolidRecipe> {
    let (upper, lower) = span;
    let (hi, lo) = (upper.max(lower), upper.min(lower));
    let base = frame.shifted(lo - CUTTER_OVERSHOOT);
    let depth = hi - lo + 2.0 * CUTTER_OVERSHOOT;

    let dir = cutout.direction;
    let perp = nalgebra::Vector2::new(-dir.y, dir.x);
    let (hw, hh) = (cutout.width / 2.0, cutout.height / 2.0);
    let positions = if cutout.pitch.is_empty() {
        vec![0.0]
    } else {
        cutout.pitch.positions()
    };

    positions
        .into_iter()
        .map(|s| {
            let c = Point2::from(cutout.offset + dir * s);
            let profile = vec![
                c - dir * hw - perp * hh,
                c + dir * hw - perp * hh,
                c + dir * hw + perp * hh,
                c - dir * hw + perp * hh,
            ];
            SolidRecipe::extruded(profile, depth, base)
        })
        .collect()
}

/// Rib standing on face A or F along the segment `from`-`to`
pub fn stiffener_solid(
    from: &Point3,
    to: &Point3,
    normal: &Vector3,
    face: FaceSide,
    rib: &Rib,
    span: (f64, f64),
    tol: &Tolerance,
) -> KernelResult<SolidRecipe> {
    let along = unit_direction(from, to, tol)?;
    let across = normal.cross(&along);
    if across.norm() <= tol.eps {
        return Err(KernelError::degenerate("stiffener runs along the plate normal"));
    }
    let across = across.normalize() * (rib.thick / 2.0);
    let outline = vec![from - across, to - across, to + across, from + across];
    let (upper, lower) = span;
    let (near, far) = match face {
        FaceSide::A => (upper, upper + rib.height),
        FaceSide::F => (lower, lower - rib.height),
    };
    Ok(plate_prism(&outline, normal, (far, near)))
}
