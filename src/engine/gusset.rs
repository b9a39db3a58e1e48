// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Gusset engine: connection plates between a panel face and a member end.
//!
//! The gusset lies in the plane of the member axis and its width direction. Its
//! outline is bounded by four lines drawn in that plane: the welded edge along
//! the panel face, the A and F side edges along the member, and the free edge
//! selected by the edge offset code.

use super::cross_member::MemberAxis;
use super::panel::{plate_face_toward, resolve_plate_strip};
use crate::alignment::Alignment;
use crate::config::Tolerance;
use crate::context::BuildContext;
use crate::error::{KernelError, KernelResult};
use crate::geometry::{
    distance, intersect_line_plane, newell_normal, point_in_polygon_3d, sort_points_clockwise_2d,
    unit_direction, Frame, Point2, Point3, Vector2, Vector3,
};
use crate::solid::{ElementClass, ElementRecipe, SolidRecipe};
use crate::spec::{BridgeSpec, EdgeOffsetKind, GussetSpec};
use tracing::debug;

/// Placement basis of a gusset: origin and the tips of the two in-plane unit axes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GussetBasis {
    pub pal1: Point3,
    pub pal2: Point3,
    pub pal3: Point3,
}

impl GussetBasis {
    /// Extrusion direction of the plate
    pub fn normal(&self) -> Vector3 {
        (self.pal2 - self.pal1).cross(&(self.pal3 - self.pal1))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GussetOutput {
    pub element: ElementRecipe,
    pub basis: GussetBasis,
    /// Outline in the basis plane, clockwise
    pub outline: Vec<Point2>,
}

/// Where the member meets the panel face
struct Footprint {
    /// Axis hit
    axis: Point3,
    /// A-side line hit
    a_side: Point3,
    /// Face normal pointing toward the member
    normal: Vector3,
}

/// Line in the gusset plane
#[derive(Debug, Clone, Copy)]
struct Line2 {
    point: Point2,
    dir: Vector2,
}

impl Line2 {
    fn new(point: Point2, dir: Vector2) -> Self {
        Self { point, dir }
    }

    fn intersect(&self, other: &Line2, tol: &Tolerance) -> KernelResult<Point2> {
        let cross = self.dir.perp(&other.dir);
        if cross.abs() <= tol.eps {
            return Err(KernelError::degenerate("gusset boundary lines are parallel"));
        }
        let t = (other.point - self.point).perp(&other.dir) / cross;
        Ok(self.point + self.dir * t)
    }
}

fn distance_to_polyline(p: &Point3, points: &[Point3]) -> f64 {
    points
        .windows(2)
        .map(|w| {
            let seg = w[1] - w[0];
            let len2 = seg.norm_squared();
            let t = if len2 > 0.0 {
                ((p - w[0]).dot(&seg) / len2).clamp(0.0, 1.0)
            } else {
                0.0
            };
            distance(p, &(w[0] + seg * t))
        })
        .fold(f64::INFINITY, f64::min)
}

fn footprint(
    quads: &[[Point3; 4]],
    axis: &MemberAxis,
    reference: &Point3,
    far: &Point3,
    tol: &Tolerance,
) -> KernelResult<Footprint> {
    let half = axis.width_dir * (axis.section.width / 2.0);
    let mut inside = Vec::new();
    let mut all = Vec::new();
    for q in quads {
        let hit = |a: Point3, b: Point3| intersect_line_plane(&q[0], &q[1], &q[2], &a, &b, tol);
        let (Some(e), Some(fa), Some(ff)) = (
            hit(axis.start, axis.end)?,
            hit(axis.start + half, axis.end + half)?,
            hit(axis.start - half, axis.end - half)?,
        ) else {
            continue;
        };
        let mut normal = newell_normal(q, tol)?;
        if normal.dot(&(far - e)) < 0.0 {
            normal = -normal;
        }
        let candidate = Footprint {
            axis: e,
            a_side: fa,
            normal,
        };
        if point_in_polygon_3d(&e, q, tol)?
            || point_in_polygon_3d(&fa, q, tol)?
            || point_in_polygon_3d(&ff, q, tol)?
        {
            inside.push(candidate);
        } else {
            all.push(candidate);
        }
    }
    let pool = if inside.is_empty() { all } else { inside };
    pool.into_iter()
        .min_by(|a, b| {
            distance(&a.axis, reference).total_cmp(&distance(&b.axis, reference))
        })
        .ok_or_else(|| KernelError::degenerate("member is parallel to every panel face"))
}

/// Connection plate `"{panel}-Guss{position}"` for a published member axis
pub fn build_gusset(
    gusset: &GussetSpec,
    axis: &MemberAxis,
    spec: &BridgeSpec,
    alignment: &Alignment,
    ctx: &BuildContext,
) -> KernelResult<GussetOutput> {
    let tol = &ctx.tolerance;
    let panel = spec
        .main_panel(&gusset.panel)
        .ok_or_else(|| KernelError::MissingMember(gusset.panel.clone()))?;
    let strip = resolve_plate_strip(&panel.plate, alignment, ctx)?;

    let mid = strip.midline();
    let (reference, far) =
        if distance_to_polyline(&axis.start, &mid) <= distance_to_polyline(&axis.end, &mid) {
            (axis.start, axis.end)
        } else {
            (axis.end, axis.start)
        };
    let (face, _) = plate_face_toward(&panel.plate, &strip, &reference, 0.0, ctx)?;
    let quads: Vec<[Point3; 4]> = (0..face.len() - 1).filter_map(|i| face.quad(i)).collect();
    let foot = footprint(&quads, axis, &reference, &far, tol)?;

    let u = unit_direction(&reference, &far, tol)?;
    let frame = Frame::from_axes(foot.axis, &axis.width_dir, &u, tol)?;
    let to2 = |v: &Vector3| Vector2::new(v.dot(&frame.x_axis), v.dot(&frame.y_axis));

    let face_dir = frame.z_axis.cross(&foot.normal);
    if face_dir.norm() <= tol.eps {
        return Err(KernelError::degenerate(format!(
            "gusset `{}` lies parallel to the panel face",
            gusset.name()
        )));
    }
    let d_face = to2(&face_dir).normalize();
    let n_face = to2(&foot.normal);
    if n_face.norm() <= tol.eps {
        return Err(KernelError::degenerate("panel normal is square to the gusset"));
    }
    let n_face = n_face.normalize();
    let u2 = to2(&u).normalize();
    let across = Vector2::new(-u2.y, u2.x);

    let connection = axis
        .holes
        .as_ref()
        .map_or(axis.section.width, |h| h.connection_length());
    let half = axis.width_dir * (axis.section.width / 2.0);
    let end2 = frame.to_local_2d(&reference);
    let f_a = frame.to_local_2d(&foot.a_side);
    let c_a = frame.to_local_2d(&(reference + half + u * connection));
    let c_f = frame.to_local_2d(&(reference - half + u * connection));

    let mep = &gusset.margins;
    let m = gusset.edge_offset.magnitude;
    let out = m + mep.top;
    let welded = Line2::new(f_a + n_face * mep.bottom, d_face);
    let side_a = Line2::new(c_a + Vector2::x() * mep.left, u2);
    let side_f = Line2::new(c_f - Vector2::x() * mep.right, u2);
    let free = match gusset.edge_offset.kind {
        EdgeOffsetKind::Outer => {
            let corner = if (c_a - f_a).dot(&n_face) >= (c_f - f_a).dot(&n_face) {
                c_a
            } else {
                c_f
            };
            Line2::new(corner + n_face * out, d_face)
        }
        EdgeOffsetKind::Custom => Line2::new(f_a + n_face * out, d_face),
        EdgeOffsetKind::ASide => Line2::new(c_a + n_face * out, d_face),
        EdgeOffsetKind::FSide => Line2::new(c_f + n_face * out, d_face),
        EdgeOffsetKind::BoltLine => {
            let bolts = axis
                .holes
                .as_ref()
                .map_or(0.0, |h| h.edge_distance + h.pitch.total());
            Line2::new(end2 + u2 * (bolts + out), across)
        }
    };

    let corners = vec![
        welded.intersect(&side_a, tol)?,
        side_a.intersect(&free, tol)?,
        free.intersect(&side_f, tol)?,
        side_f.intersect(&welded, tol)?,
    ];
    let outline = sort_points_clockwise_2d(&corners, tol);

    let centre = Point2::from(
        outline.iter().fold(Vector2::zeros(), |acc, p| acc + p.coords) / outline.len() as f64,
    );
    let centre = frame.to_world_2d(&centre);
    let half_thick = frame.z_axis * (gusset.thick / 2.0);
    let positive = match &gusset.stiffener {
        Some(point) => {
            let s = alignment.resolve_edge_point(point)?;
            (s - foot.axis).dot(&frame.z_axis) <= 0.0
        }
        None => {
            let lift = |c: Point3| (c - foot.axis).dot(&foot.normal);
            lift(centre + half_thick) >= lift(centre - half_thick) - tol.coincidence
        }
    };

    let (plate_frame, profile) = if positive {
        (frame, outline.clone())
    } else {
        (
            frame.flipped(),
            outline.iter().map(|p| Point2::new(p.x, -p.y)).collect(),
        )
    };
    let basis = GussetBasis {
        pal1: plate_frame.origin,
        pal2: plate_frame.origin + plate_frame.x_axis,
        pal3: plate_frame.origin + plate_frame.y_axis,
    };

    let name = gusset.name();
    debug!(gusset = %name, member = %axis.name, positive, "gusset built");
    Ok(GussetOutput {
        element: ElementRecipe::new(
            name,
            ElementClass::Plate,
            Some(panel.girder.clone()),
            SolidRecipe::extruded(profile, gusset.thick, plate_frame),
        ),
        basis,
        outline,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::polygon_area_2d;
    use crate::solid::{MeshBackend, SolidBackend};
    use crate::spec::{
        AlignmentLine, EdgeOffset, EdgePoint, GussetPosition, HoleSpec, JointSpec, MainPanel,
        Margins, PanelKind, PlateGeometry, SectionData, SectionKind, Thickness,
    };
    use approx::assert_relative_eq;

    fn fixture() -> (BridgeSpec, Alignment) {
        let line = |name: &str, z: f64| AlignmentLine {
            name: name.to_string(),
            stations: vec![
                ("S1".to_string(), Point3::new(0.0, 0.0, z)),
                ("S2".to_string(), Point3::new(10000.0, 0.0, z)),
            ],
        };
        let lines = vec![line("G1T", 0.0), line("G1B", -1500.0)];
        let spec = BridgeSpec {
            lines: lines.clone(),
            main_panels: vec![MainPanel {
                girder: "G1".to_string(),
                block: "B1".to_string(),
                kind: PanelKind::Web,
                plate: PlateGeometry {
                    lines: ["G1T".to_string(), "G1B".to_string()],
                    stations: ["S1".to_string(), "S2".to_string()],
                    thick: Thickness::new(5.0, 5.0),
                    break_spec: None,
                    corners: vec![],
                    joints: JointSpec::default(),
                },
            }],
            ..Default::default()
        };
        (spec, Alignment::new(&lines))
    }

    fn chord() -> MemberAxis {
        MemberAxis {
            name: "CF1_Top".to_string(),
            start: Point3::new(5000.0, -150.0, -100.0),
            end: Point3::new(5000.0, -2350.0, -100.0),
            width_dir: Vector3::x(),
            section: SectionData {
                name: "T150".to_string(),
                kind: SectionKind::Tee,
                height: 150.0,
                width: 150.0,
                web: 8.0,
                flange: 10.0,
            },
            holes: Some(HoleSpec {
                diameter: 22.0,
                edge_distance: 40.0,
                pitch: "2@75".parse().unwrap(),
            }),
        }
    }

    fn gusset(edge_offset: &str, stiffener: Option<EdgePoint>) -> GussetSpec {
        GussetSpec {
            panel: "G1B1W".to_string(),
            member: "CF1_Top".to_string(),
            position: GussetPosition::TopLeft,
            edge_offset: edge_offset.parse::<EdgeOffset>().unwrap(),
            margins: Margins {
                top: 10.0,
                bottom: 0.0,
                left: 20.0,
                right: 20.0,
            },
            thick: 10.0,
            stiffener,
        }
    }

    #[test]
    fn test_bolt_line_outline() {
        let (spec, alignment) = fixture();
        let out = build_gusset(
            &gusset("B40", None),
            &chord(),
            &spec,
            &alignment,
            &BuildContext::default(),
        )
        .unwrap();
        assert_eq!(out.element.name, "G1B1W-GussTL");
        assert_eq!(out.element.container.as_deref(), Some("G1"));
        // welded on y = -5, 190 wide, free edge 385 from the face
        assert_relative_eq!(polygon_area_2d(&out.outline).abs(), 190.0 * 385.0, epsilon = 1e-6);
        assert_relative_eq!(out.basis.pal1, Point3::new(5000.0, -5.0, -100.0), epsilon = 1e-9);

        let backend = MeshBackend::default();
        let solid = backend.realize("G", &out.element.recipe).unwrap();
        assert_relative_eq!(backend.volume(&solid), 190.0 * 385.0 * 10.0, max_relative = 1e-9);
    }

    #[test]
    fn test_square_edge_uses_footprint_corner() {
        let (spec, alignment) = fixture();
        let out = build_gusset(
            &gusset("A0", None),
            &chord(),
            &spec,
            &alignment,
            &BuildContext::default(),
        )
        .unwrap();
        // footprint corner 145 + 230 from the face, plus the top margin
        let depth = out.outline.iter().map(|p| p.y.abs()).fold(0.0, f64::max);
        assert_relative_eq!(depth, 385.0, epsilon = 1e-6);
    }

    /// Chord meeting the web at 3:4, so the A and F footprint corners sit at
    /// different depths from the face.
    fn skew_chord() -> MemberAxis {
        MemberAxis {
            start: Point3::new(5000.0, -150.0, -100.0),
            end: Point3::new(6650.0, -2350.0, -100.0),
            width_dir: Vector3::new(0.8, 0.6, 0.0),
            ..chord()
        }
    }

    fn skew_gusset(edge_offset: &str) -> GussetOutput {
        let (spec, alignment) = fixture();
        build_gusset(
            &gusset(edge_offset, None),
            &skew_chord(),
            &spec,
            &alignment,
            &BuildContext::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_face_parallel_free_edges() {
        // A corner 284 and F corner 374 off the face; the free edge adds m + 10.
        // Between the side edges 190 apart, area = 190 * depth / 0.8.
        for (code, depth) in [("A20", 314.0), ("F20", 404.0), ("O20", 404.0), ("C300", 310.0)] {
            let out = skew_gusset(code);
            let area = polygon_area_2d(&out.outline).abs();
            assert_relative_eq!(area, 190.0 * depth / 0.8, max_relative = 1e-9);

            // welded on the web face, plate on the member side, below the chord
            let bbox = out.element.recipe.bounding_box();
            assert_relative_eq!(bbox.max.y, -5.0, epsilon = 1e-6);
            assert_relative_eq!(bbox.min.y, -5.0 - depth, epsilon = 1e-6);
            assert_relative_eq!(bbox.max.z, -100.0, epsilon = 1e-9);
            assert_relative_eq!(bbox.min.z, -110.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_outer_edge_follows_the_deeper_corner() {
        let outer = skew_gusset("O0");
        let f_side = skew_gusset("F0");
        let a_side = skew_gusset("A0");
        assert_eq!(outer.outline, f_side.outline);
        assert!(polygon_area_2d(&a_side.outline).abs() < polygon_area_2d(&outer.outline).abs());
    }

    #[test]
    fn test_plate_stays_off_the_stiffener() {
        let (spec, alignment) = fixture();
        let below = Point3::new(5000.0, -100.0, -500.0);
        let out = build_gusset(
            &gusset("B40", Some(EdgePoint::Coord(below))),
            &chord(),
            &spec,
            &alignment,
            &BuildContext::default(),
        )
        .unwrap();
        let bbox = out.element.recipe.bounding_box();
        assert_relative_eq!(bbox.min.z, -100.0, epsilon = 1e-9);
        assert_relative_eq!(bbox.max.z, -90.0, epsilon = 1e-9);
        assert!(out.basis.normal().dot(&Vector3::z()) > 0.0);

        let above = Point3::new(5000.0, -100.0, 300.0);
        let out = build_gusset(
            &gusset("B40", Some(EdgePoint::Coord(above))),
            &chord(),
            &spec,
            &alignment,
            &BuildContext::default(),
        )
        .unwrap();
        let bbox = out.element.recipe.bounding_box();
        assert_relative_eq!(bbox.max.z, -100.0, epsilon = 1e-9);
        assert_relative_eq!(bbox.min.z, -110.0, epsilon = 1e-9);
    }

    #[test]
    fn test_unknown_panel() {
        let (spec, alignment) = fixture();
        let mut g = gusset("B40", None);
        g.panel = "G9B1W".to_string();
        let err = build_gusset(&g, &chord(), &spec, &alignment, &BuildContext::default())
            .unwrap_err();
        assert!(matches!(err, KernelError::MissingMember(_)));
    }

    #[test]
    fn test_member_parallel_to_face_is_degenerate() {
        let (spec, alignment) = fixture();
        let mut axis = chord();
        axis.start = Point3::new(1000.0, -150.0, -100.0);
        axis.end = Point3::new(3000.0, -150.0, -100.0);
        axis.width_dir = Vector3::y();
        let err = build_gusset(
            &gusset("B40", None),
            &axis,
            &spec,
            &alignment,
            &BuildContext::default(),
        )
        .unwrap_err();
        assert!(matches!(err, KernelError::DegenerateGeometry(_)));
    }
}
