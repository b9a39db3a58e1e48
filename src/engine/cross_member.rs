// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Cross-member engine: cross-beams, diagonal bracing and lateral bracing.
//!
//! Every member is a catalog section swept along a straight axis. Each built
//! member also publishes its [`MemberAxis`] for the gusset engine.

use super::panel::resolve_plate_strip;
use crate::alignment::Alignment;
use crate::context::BuildContext;
use crate::error::{KernelError, KernelResult};
use crate::geometry::{distance, intersect_line_plane, unit_direction, Frame, Point2, Point3, Vector3};
use crate::solid::{ElementClass, ElementRecipe, SolidRecipe};
use crate::spec::{
    BracingType, BridgeSpec, CrossBeam, DiagonalBracing, HoleSpec, LateralBracing,
    LateralPattern, PanelKind, ReferenceLine, SectionData, Thickness,
};
use std::f64::consts::TAU;
use tracing::debug;

/// Published axis of a built member
#[derive(Debug, Clone, PartialEq)]
pub struct MemberAxis {
    pub name: String,
    pub start: Point3,
    pub end: Point3,
    /// Unit direction across the section width
    pub width_dir: Vector3,
    pub section: SectionData,
    pub holes: Option<HoleSpec>,
}

impl MemberAxis {
    pub fn direction(&self) -> Vector3 {
        (self.end - self.start).normalize()
    }

    pub fn length(&self) -> f64 {
        distance(&self.start, &self.end)
    }
}

/// Elements and axes produced by one cross-member record
#[derive(Debug, Clone, Default)]
pub struct CrossMemberOutput {
    pub elements: Vec<ElementRecipe>,
    pub axes: Vec<MemberAxis>,
}

impl CrossMemberOutput {
    fn push(&mut self, (element, axis): (ElementRecipe, MemberAxis)) {
        self.elements.push(element);
        self.axes.push(axis);
    }
}

/// Web of a girder at one station
#[derive(Debug, Clone, Copy, PartialEq)]
struct GirderWeb {
    top: Point3,
    bottom: Point3,
    normal: Vector3,
    thick: Thickness,
}

impl GirderWeb {
    /// Plane of the web centre shifted by `offset` toward `target`, as three points
    fn plane_toward(&self, target: &Point3, offset: f64) -> [Point3; 3] {
        let n = if self.normal.dot(&(target - self.top)) >= 0.0 {
            self.normal
        } else {
            -self.normal
        };
        let shift = n * offset;
        let along = n.cross(&(self.bottom - self.top));
        [self.top + shift, self.bottom + shift, self.top + shift + along]
    }

    /// Web face facing `target`
    fn face_toward(&self, target: &Point3) -> [Point3; 3] {
        let offset = if self.normal.dot(&(target - self.top)) >= 0.0 {
            self.thick.a
        } else {
            self.thick.f
        };
        self.plane_toward(target, offset)
    }
}

fn girder_web(
    spec: &BridgeSpec,
    girder: &str,
    station: &str,
    alignment: &Alignment,
    ctx: &BuildContext,
) -> KernelResult<GirderWeb> {
    let panel = spec
        .main_panels
        .iter()
        .filter(|p| p.girder == girder && p.kind == PanelKind::Web)
        .find(|p| {
            let Ok(line) = alignment.line(&p.plate.lines[0]) else {
                return false;
            };
            match (
                line.station_index(&p.plate.stations[0]),
                line.station_index(&p.plate.stations[1]),
                line.station_index(station),
            ) {
                (Some(from), Some(to), Some(at)) => from <= at && at <= to,
                _ => false,
            }
        })
        .ok_or_else(|| {
            KernelError::MissingMember(format!("web of girder `{girder}` at station `{station}`"))
        })?;

    let a = alignment.resolve_station(&panel.plate.lines[0], station)?;
    let b = alignment.resolve_station(&panel.plate.lines[1], station)?;
    let (top, bottom) = if a.z >= b.z { (a, b) } else { (b, a) };

    let strip = resolve_plate_strip(&panel.plate, alignment, ctx)?;
    let normals = strip.normals(&ctx.tolerance)?;
    let nearest = strip
        .left
        .iter()
        .enumerate()
        .min_by(|(_, p), (_, q)| distance(p, &a).total_cmp(&distance(q, &a)))
        .map_or(0, |(i, _)| i);
    Ok(GirderWeb {
        top,
        bottom,
        normal: normals[nearest],
        thick: panel.plate.thick,
    })
}

/// Frame at `start` with Z along the member and Y as close to vertical as possible
fn member_frame(start: &Point3, end: &Point3, ctx: &BuildContext) -> KernelResult<Frame> {
    let tol = &ctx.tolerance;
    let dir = unit_direction(start, end, tol)?;
    let up = Vector3::z() - dir * dir.z;
    if up.norm() <= tol.eps {
        return Err(KernelError::degenerate("member axis is vertical"));
    }
    let up = up.normalize();
    let width = up.cross(&dir);
    Frame::from_axes(*start, &width, &up, tol)
}

fn reference_shift(section: &SectionData, reference: ReferenceLine) -> f64 {
    match reference {
        ReferenceLine::Top => section.height,
        ReferenceLine::Center => section.height / 2.0,
        ReferenceLine::Bottom => 0.0,
    }
}

fn hole_cutters(
    frame: &Frame,
    section: &SectionData,
    shift: f64,
    length: f64,
    holes: &HoleSpec,
    ctx: &BuildContext,
) -> KernelResult<Vec<SolidRecipe>> {
    const SIDES: usize = 8;
    let r = holes.diameter / 2.0;
    let octagon: Vec<Point2> = (0..SIDES)
        .map(|k| {
            let t = TAU * k as f64 / SIDES as f64;
            Point2::new(r * t.cos(), r * t.sin())
        })
        .collect();
    let reach = section.width + 2.0;
    let y = section.height / 2.0 - shift;

    let mut cutters = Vec::new();
    for p in holes.pitch.positions() {
        let d = holes.edge_distance + p;
        if d > length / 2.0 {
            break;
        }
        for z in [d, length - d] {
            let origin = frame.to_world(&Point3::new(-reach / 2.0, y, z));
            let hole_frame = Frame::from_axes(origin, &frame.y_axis, &frame.z_axis, &ctx.tolerance)?;
            cutters.push(SolidRecipe::extruded(octagon.clone(), reach, hole_frame));
        }
    }
    Ok(cutters)
}

#[allow(clippy::too_many_arguments)]
fn swept_member(
    name: String,
    class: ElementClass,
    start: Point3,
    end: Point3,
    section: &SectionData,
    reference: ReferenceLine,
    holes: Option<&HoleSpec>,
    ctx: &BuildContext,
) -> KernelResult<(ElementRecipe, MemberAxis)> {
    let frame = member_frame(&start, &end, ctx)?;
    let length = distance(&start, &end);
    let shift = reference_shift(section, reference);
    let profile: Vec<Point2> = section
        .profile()
        .into_iter()
        .map(|p| Point2::new(p.x, p.y - shift))
        .collect();

    let mut recipe = SolidRecipe::extruded(profile, length, frame);
    if let (Some(holes), true) = (holes, ctx.options.realize_holes) {
        recipe = recipe.minus(hole_cutters(&frame, section, shift, length, holes, ctx)?);
    }

    let axis = MemberAxis {
        name: name.clone(),
        start,
        end,
        width_dir: frame.x_axis,
        section: section.clone(),
        holes: holes.cloned(),
    };
    Ok((ElementRecipe::new(name, class, None, recipe), axis))
}

fn line_plane(plane: &[Point3; 3], a: &Point3, b: &Point3, ctx: &BuildContext) -> KernelResult<Point3> {
    intersect_line_plane(&plane[0], &plane[1], &plane[2], a, b, &ctx.tolerance)?
        .ok_or_else(|| KernelError::degenerate("member axis is parallel to the web"))
}

/// Transverse beam between two girder webs, one element per shape
pub fn build_cross_beam(
    beam: &CrossBeam,
    spec: &BridgeSpec,
    alignment: &Alignment,
    ctx: &BuildContext,
) -> KernelResult<CrossMemberOutput> {
    let web1 = girder_web(spec, &beam.girders[0], &beam.station, alignment, ctx)?;
    let web2 = girder_web(spec, &beam.girders[1], &beam.station, alignment, ctx)?;
    let base = beam.name();

    let mut out = CrossMemberOutput::default();
    for (k, shape) in beam.shapes.iter().enumerate() {
        let section = spec.catalog.section(&shape.section)?;
        let lift = Vector3::z() * shape.offset;
        let (r1, r2) = match shape.reference {
            ReferenceLine::Top => (web1.top, web2.top),
            ReferenceLine::Center => (
                nalgebra::center(&web1.top, &web1.bottom),
                nalgebra::center(&web2.top, &web2.bottom),
            ),
            ReferenceLine::Bottom => (web1.bottom, web2.bottom),
        };
        let (r1, r2) = (r1 + lift, r2 + lift);

        let mut start = line_plane(&web1.face_toward(&web2.top), &r1, &r2, ctx)?;
        let mut end = line_plane(&web2.face_toward(&web1.top), &r1, &r2, ctx)?;
        if let Some(length) = beam.length {
            let mid = nalgebra::center(&start, &end);
            let dir = unit_direction(&start, &end, &ctx.tolerance)?;
            start = mid - dir * (length / 2.0);
            end = mid + dir * (length / 2.0);
        }

        let name = if k == 0 {
            base.clone()
        } else {
            format!("{base}_{}", shape.name)
        };
        out.push(swept_member(
            name,
            ElementClass::Beam,
            start,
            end,
            section,
            shape.reference,
            shape.holes.as_ref(),
            ctx,
        )?);
    }
    debug!(beam = %base, shapes = out.elements.len(), "cross-beam built");
    Ok(out)
}

/// Cross frame between two girders: chords and diagonals trimmed to the cut planes
pub fn build_diagonal_bracing(
    bracing: &DiagonalBracing,
    spec: &BridgeSpec,
    alignment: &Alignment,
    ctx: &BuildContext,
) -> KernelResult<CrossMemberOutput> {
    let tol = &ctx.tolerance;
    let web1 = girder_web(spec, &bracing.girders[0], &bracing.station, alignment, ctx)?;
    let web2 = girder_web(spec, &bracing.girders[1], &bracing.station, alignment, ctx)?;
    let m = &bracing.modifiers;

    let tl = web1.top + unit_direction(&web1.top, &web1.bottom, tol)? * m.top_left;
    let bl = web1.bottom + unit_direction(&web1.bottom, &web1.top, tol)? * m.bottom_left;
    let tr = web2.top + unit_direction(&web2.top, &web2.bottom, tol)? * m.top_right;
    let br = web2.bottom + unit_direction(&web2.bottom, &web2.top, tol)? * m.bottom_right;
    let tc = nalgebra::center(&tl, &tr);
    let bc = nalgebra::center(&bl, &br);

    let plane1 = web1.plane_toward(&web2.top, bracing.cut_offset);
    let plane2 = web2.plane_toward(&web1.top, bracing.cut_offset);

    // (suffix, from, to, chord?) with endpoints on girder 1 listed first
    let mut members: Vec<(&str, Point3, Point3, bool)> =
        vec![("Top", tl, tr, true), ("Bot", bl, br, true)];
    match bracing.kind {
        BracingType::L => members.push(("L", tl, br, false)),
        BracingType::R => members.push(("R", bl, tr, false)),
        BracingType::CL => {
            members.push(("L", tl, bc, false));
            members.push(("R", bc, tr, false));
        }
        BracingType::CR => {
            members.push(("L", bl, tc, false));
            members.push(("R", tc, br, false));
        }
    }

    let chord = spec.catalog.section(&bracing.chord)?;
    let diagonal = spec.catalog.section(&bracing.diagonal)?;
    let mut out = CrossMemberOutput::default();
    for (suffix, from, to, is_chord) in members {
        let on_girder1 = |p: &Point3| *p == tl || *p == bl;
        let on_girder2 = |p: &Point3| *p == tr || *p == br;
        let start = if on_girder1(&from) {
            line_plane(&plane1, &from, &to, ctx)?
        } else {
            from
        };
        let end = if on_girder2(&to) {
            line_plane(&plane2, &from, &to, ctx)?
        } else {
            to
        };
        out.push(swept_member(
            format!("{}_{suffix}", bracing.name),
            ElementClass::Member,
            start,
            end,
            if is_chord { chord } else { diagonal },
            ReferenceLine::Center,
            bracing.holes.as_ref(),
            ctx,
        )?);
    }
    debug!(bracing = %bracing.name, members = out.elements.len(), "diagonal bracing built");
    Ok(out)
}

/// Plan bracing between two lines; the X pattern adds the mirrored member
pub fn build_lateral_bracing(
    bracing: &LateralBracing,
    spec: &BridgeSpec,
    alignment: &Alignment,
    ctx: &BuildContext,
) -> KernelResult<CrossMemberOutput> {
    let [line1, line2] = &bracing.lines;
    let [st1, st2] = &bracing.stations;
    let section = spec.catalog.section(&bracing.section)?;
    let (dy, dz) = bracing.offset;
    let shift = ctx.axis.transverse() * dy + Vector3::z() * dz;

    let mut pairs = vec![(
        alignment.resolve_station(line1, st1)?,
        alignment.resolve_station(line2, st2)?,
    )];
    if bracing.pattern == LateralPattern::X {
        pairs.push((
            alignment.resolve_station(line1, st2)?,
            alignment.resolve_station(line2, st1)?,
        ));
    }

    let mut out = CrossMemberOutput::default();
    for (k, (from, to)) in pairs.into_iter().enumerate() {
        out.push(swept_member(
            format!("{}_{}", bracing.name, k + 1),
            ElementClass::Member,
            from + shift,
            to + shift,
            section,
            ReferenceLine::Center,
            bracing.holes.as_ref(),
            ctx,
        )?);
    }
    debug!(bracing = %bracing.name, members = out.elements.len(), "lateral bracing built");
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solid::{MeshBackend, SolidBackend};
    use crate::spec::{
        AlignmentLine, Catalog, CornerModifiers, JointSpec, MainPanel, PlateGeometry, SectionKind,
        Shape,
    };
    use approx::assert_relative_eq;

    fn line(name: &str, y: f64, z: f64) -> AlignmentLine {
        AlignmentLine {
            name: name.to_string(),
            stations: ["S1", "C1", "S2"]
                .iter()
                .zip([0.0, 5000.0, 10000.0])
                .map(|(s, x)| (s.to_string(), Point3::new(x, y, z)))
                .collect(),
        }
    }

    fn web(girder: &str) -> MainPanel {
        MainPanel {
            girder: girder.to_string(),
            block: "B1".to_string(),
            kind: PanelKind::Web,
            plate: PlateGeometry {
                lines: [format!("{girder}T"), format!("{girder}B")],
                stations: ["S1".to_string(), "S2".to_string()],
                thick: Thickness::new(5.0, 5.0),
                break_spec: None,
                corners: vec![],
                joints: JointSpec::default(),
            },
        }
    }

    fn section(name: &str, kind: SectionKind) -> SectionData {
        SectionData {
            name: name.to_string(),
            kind,
            height: 300.0,
            width: 150.0,
            web: 8.0,
            flange: 12.0,
        }
    }

    fn bridge() -> (BridgeSpec, Alignment) {
        let lines = vec![
            line("G1T", 0.0, 0.0),
            line("G1B", 0.0, -1500.0),
            line("G2T", -2500.0, 0.0),
            line("G2B", -2500.0, -1500.0),
        ];
        let alignment = Alignment::new(&lines);
        let spec = BridgeSpec {
            lines,
            main_panels: vec![web("G1"), web("G2")],
            catalog: Catalog::new(
                vec![section("H300", SectionKind::I), section("L150", SectionKind::Angle)],
                vec![],
                vec![],
            ),
            ..Default::default()
        };
        (spec, alignment)
    }

    #[test]
    fn test_cross_beam_spans_clear_gap() {
        let (spec, alignment) = bridge();
        let beam = CrossBeam {
            girders: ["G1".to_string(), "G2".to_string()],
            station: "C1".to_string(),
            length: None,
            shapes: vec![
                Shape {
                    name: "Main".into(),
                    section: "H300".into(),
                    reference: ReferenceLine::Top,
                    offset: -50.0,
                    holes: None,
                },
                Shape {
                    name: "Sub".into(),
                    section: "H300".into(),
                    reference: ReferenceLine::Bottom,
                    offset: 50.0,
                    holes: None,
                },
            ],
        };
        let ctx = BuildContext::default();
        let out = build_cross_beam(&beam, &spec, &alignment, &ctx).unwrap();
        let names: Vec<&str> = out.elements.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["CB_G1_G2_C1", "CB_G1_G2_C1_Sub"]);

        let axis = &out.axes[0];
        assert_relative_eq!(axis.length(), 2500.0 - 10.0, epsilon = 1e-9);
        assert_relative_eq!(axis.start.z, -50.0, epsilon = 1e-9);

        let backend = MeshBackend::new(ctx.tolerance);
        let solid = backend.realize(&out.elements[0].name, &out.elements[0].recipe).unwrap();
        let bbox = solid.bounding_box();
        assert_relative_eq!(bbox.max.z, -50.0, epsilon = 1e-9);
        assert_relative_eq!(bbox.min.z, -350.0, epsilon = 1e-9);
        let area = 2.0 * 150.0 * 12.0 + 276.0 * 8.0;
        assert_relative_eq!(backend.volume(&solid), area * 2490.0, max_relative = 1e-9);
    }

    #[test]
    fn test_cross_beam_length_override() {
        let (spec, alignment) = bridge();
        let beam = CrossBeam {
            girders: ["G1".to_string(), "G2".to_string()],
            station: "C1".to_string(),
            length: Some(2000.0),
            shapes: vec![Shape {
                name: "Main".into(),
                section: "H300".into(),
                reference: ReferenceLine::Center,
                offset: 0.0,
                holes: None,
            }],
        };
        let out = build_cross_beam(&beam, &spec, &alignment, &BuildContext::default()).unwrap();
        let axis = &out.axes[0];
        assert_relative_eq!(axis.length(), 2000.0, epsilon = 1e-9);
        assert_relative_eq!(nalgebra::center(&axis.start, &axis.end).y, -1250.0, epsilon = 1e-9);
    }

    #[test]
    fn test_missing_web_is_missing_member() {
        let (spec, alignment) = bridge();
        let beam = CrossBeam {
            girders: ["G1".to_string(), "G9".to_string()],
            station: "C1".to_string(),
            length: None,
            shapes: vec![],
        };
        let err = build_cross_beam(&beam, &spec, &alignment, &BuildContext::default()).unwrap_err();
        assert!(matches!(err, KernelError::MissingMember(_)));
    }

    #[test]
    fn test_diagonal_bracing_members() {
        let (spec, alignment) = bridge();
        let bracing = DiagonalBracing {
            name: "CF1".into(),
            girders: ["G1".to_string(), "G2".to_string()],
            station: "C1".to_string(),
            kind: BracingType::CL,
            modifiers: CornerModifiers {
                top_left: 100.0,
                top_right: 100.0,
                bottom_left: 100.0,
                bottom_right: 100.0,
            },
            cut_offset: 150.0,
            chord: "L150".into(),
            diagonal: "L150".into(),
            holes: None,
        };
        let out = build_diagonal_bracing(&bracing, &spec, &alignment, &BuildContext::default())
            .unwrap();
        let names: Vec<&str> = out.elements.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["CF1_Top", "CF1_Bot", "CF1_L", "CF1_R"]);

        let top = &out.axes[0];
        assert_relative_eq!(top.start.y, -150.0, epsilon = 1e-9);
        assert_relative_eq!(top.end.y, -2350.0, epsilon = 1e-9);
        assert_relative_eq!(top.start.z, -100.0, epsilon = 1e-9);

        // diagonal ends at the bottom chord centre
        let left = &out.axes[2];
        assert_relative_eq!(left.end, Point3::new(5000.0, -1250.0, -1400.0), epsilon = 1e-9);
    }

    #[test]
    fn test_lateral_bracing_x_pattern() {
        let (spec, alignment) = bridge();
        let bracing = LateralBracing {
            name: "LB1".into(),
            lines: ["G1B".to_string(), "G2B".to_string()],
            stations: ["S1".to_string(), "C1".to_string()],
            pattern: LateralPattern::X,
            offset: (0.0, 100.0),
            section: "L150".into(),
            holes: None,
        };
        let out =
            build_lateral_bracing(&bracing, &spec, &alignment, &BuildContext::default()).unwrap();
        assert_eq!(out.axes.len(), 2);
        assert_eq!(out.axes[1].name, "LB1_2");
        assert_relative_eq!(out.axes[1].start, Point3::new(5000.0, 0.0, -1400.0));
        assert_relative_eq!(out.axes[1].end, Point3::new(0.0, -2500.0, -1400.0));
    }

    #[test]
    fn test_bolt_holes_reduce_volume() {
        let (spec, alignment) = bridge();
        let bracing = LateralBracing {
            name: "LB1".into(),
            lines: ["G1B".to_string(), "G2B".to_string()],
            stations: ["C1".to_string(), "C1".to_string()],
            pattern: LateralPattern::Single,
            offset: (0.0, 0.0),
            section: "H300".into(),
            holes: Some(HoleSpec {
                diameter: 24.0,
                edge_distance: 40.0,
                pitch: "2@75".parse().unwrap(),
            }),
        };
        let mut ctx = BuildContext::default();
        let plain = build_lateral_bracing(&bracing, &spec, &alignment, &ctx).unwrap();
        ctx.options.realize_holes = true;
        let holed = build_lateral_bracing(&bracing, &spec, &alignment, &ctx).unwrap();
        assert_eq!(holed.elements[0].recipe.cutter_count(), 6);

        let backend = MeshBackend::new(ctx.tolerance);
        let v0 = backend.volume(&backend.realize("a", &plain.elements[0].recipe).unwrap());
        let v1 = backend.volume(&backend.realize("b", &holed.elements[0].recipe).unwrap());
        assert!(v1 < v0);
    }
}
