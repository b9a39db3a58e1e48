// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Sub-panel engine: diaphragms and cross-frame plates bounded by four edges.
//!
//! Edges are resolved to polylines, optionally extended onto the faces of
//! neighbouring panels, and the outline is cut into parts stacked from top to
//! bottom. Each part then receives its corner cuts, slots, joints, cutouts,
//! stiffeners and flanges.

use super::features::{
    corner_cutter, cutout_cutters, inward_direction, plate_prism, slot_cutter, splice_plates,
    stiffener_solid, JointEdge,
};
use super::panel::{plate_face_toward, resolve_plate_strip};
use crate::alignment::Alignment;
use crate::config::Tolerance;
use crate::context::BuildContext;
use crate::error::{KernelError, KernelResult};
use crate::geometry::{
    distance, intersect_line_plane, newell_normal, point_along_polyline, point_in_polygon_3d,
    polygon_centroid, polyline_length, unit_direction, Frame, Point2, Point3, Vector3,
};
use crate::solid::{ElementClass, ElementRecipe, SolidRecipe};
use crate::spec::{
    BridgeSpec, Catalog, EdgePoint, ExtendSpec, FlangeEdge, FlangeShape, FlangeSpec, JointEnd, Part,
    PartCorner, Side, SideExport, SubPanel,
};
use tracing::debug;

/// Resolved edge polylines: top and bottom left to right, left and right top to bottom
#[derive(Debug, Clone, PartialEq)]
struct Edges {
    top: Vec<Point3>,
    bottom: Vec<Point3>,
    left: Vec<Point3>,
    right: Vec<Point3>,
}

impl Edges {
    fn resolve(sub: &SubPanel, alignment: &Alignment) -> KernelResult<Self> {
        let resolve = |points: &[EdgePoint]| {
            points
                .iter()
                .map(|p| alignment.resolve_edge_point(p))
                .collect::<KernelResult<Vec<_>>>()
        };
        Ok(Self {
            top: resolve(&sub.edges.top)?,
            bottom: resolve(&sub.edges.bottom)?,
            left: resolve(&sub.edges.left)?,
            right: resolve(&sub.edges.right)?,
        })
    }

    fn side(&self, side: Side) -> &[Point3] {
        match side {
            Side::Top => &self.top,
            Side::Bottom => &self.bottom,
            Side::Left => &self.left,
            Side::Right => &self.right,
        }
    }

    /// Closed loop: top, right, bottom reversed, left reversed
    fn outline(&self, tol: &Tolerance) -> Vec<Point3> {
        let mut loop_points: Vec<Point3> = Vec::new();
        let chain = self
            .top
            .iter()
            .chain(&self.right)
            .chain(self.bottom.iter().rev())
            .chain(self.left.iter().rev());
        for p in chain {
            if loop_points
                .last()
                .map_or(true, |last| distance(last, p) > tol.snap)
            {
                loop_points.push(*p);
            }
        }
        while loop_points.len() > 1
            && distance(&loop_points[0], &loop_points[loop_points.len() - 1]) <= tol.snap
        {
            loop_points.pop();
        }
        loop_points
    }

    fn centroid(&self, tol: &Tolerance) -> Point3 {
        polygon_centroid(&self.outline(tol))
    }

    /// Moves one side onto the face of the referenced panels
    fn extend(
        &mut self,
        ext: &ExtendSpec,
        spec: &BridgeSpec,
        alignment: &Alignment,
        ctx: &BuildContext,
    ) -> KernelResult<()> {
        let inside = self.centroid(&ctx.tolerance);
        let mut faces = Vec::with_capacity(ext.panels.len());
        for name in &ext.panels {
            let panel = spec
                .main_panel(name)
                .ok_or_else(|| KernelError::MissingMember(name.clone()))?;
            let strip = resolve_plate_strip(&panel.plate, alignment, ctx)?;
            let (face, _) = plate_face_toward(&panel.plate, &strip, &inside, ext.gap, ctx)?;
            faces.push(
                (0..face.len().saturating_sub(1))
                    .filter_map(|i| face.quad(i))
                    .collect::<Vec<_>>(),
            );
        }

        let (t, b, l, r) = (
            self.top.len() - 1,
            self.bottom.len() - 1,
            self.left.len() - 1,
            self.right.len() - 1,
        );
        let tol = &ctx.tolerance;
        match ext.side {
            Side::Top => {
                let pl = reach_faces(&faces, &self.left[1], &self.left[0], tol)?;
                let pr = reach_faces(&faces, &self.right[1], &self.right[0], tol)?;
                (self.top[0], self.left[0], self.top[t], self.right[0]) = (pl, pl, pr, pr);
            }
            Side::Bottom => {
                let pl = reach_faces(&faces, &self.left[l - 1], &self.left[l], tol)?;
                let pr = reach_faces(&faces, &self.right[r - 1], &self.right[r], tol)?;
                (self.bottom[0], self.left[l], self.bottom[b], self.right[r]) = (pl, pl, pr, pr);
            }
            Side::Left => {
                let pt = reach_faces(&faces, &self.top[1], &self.top[0], tol)?;
                let pb = reach_faces(&faces, &self.bottom[1], &self.bottom[0], tol)?;
                (self.top[0], self.left[0], self.bottom[0], self.left[l]) = (pt, pt, pb, pb);
            }
            Side::Right => {
                let pt = reach_faces(&faces, &self.top[t - 1], &self.top[t], tol)?;
                let pb = reach_faces(&faces, &self.bottom[b - 1], &self.bottom[b], tol)?;
                (self.top[t], self.right[0], self.bottom[b], self.right[r]) = (pt, pt, pb, pb);
            }
        }
        Ok(())
    }
}

/// Where the line `from`-`to` meets one of the panel faces.
///
/// Per face, hits inside a quad win over hits on the quad planes; the hit nearest
/// `to` is kept. Across faces the nearest hit wins, ties going to the larger Z.
fn reach_faces(
    faces: &[Vec<[Point3; 4]>],
    from: &Point3,
    to: &Point3,
    tol: &Tolerance,
) -> KernelResult<Point3> {
    let mut best: Option<Point3> = None;
    for quads in faces {
        let mut inside = Vec::new();
        let mut all = Vec::new();
        for q in quads {
            if let Some(hit) = intersect_line_plane(&q[0], &q[1], &q[2], from, to, tol)? {
                if point_in_polygon_3d(&hit, q, tol)? {
                    inside.push(hit);
                }
                all.push(hit);
            }
        }
        let pool = if inside.is_empty() { all } else { inside };
        let Some(hit) = pool
            .into_iter()
            .min_by(|a, b| distance(a, to).total_cmp(&distance(b, to)))
        else {
            continue;
        };
        best = Some(match best {
            None => hit,
            Some(current) => {
                let (dh, dc) = (distance(&hit, to), distance(&current, to));
                if (dh - dc).abs() <= tol.snap {
                    if hit.z > current.z { hit } else { current }
                } else if dh < dc {
                    hit
                } else {
                    current
                }
            }
        });
    }
    best.ok_or_else(|| KernelError::degenerate("edge never meets the extension panel face"))
}

/// Part of `points` between arc lengths `from` and `to`
fn polyline_between(
    points: &[Point3],
    from: f64,
    to: f64,
    tol: &Tolerance,
) -> KernelResult<Vec<Point3>> {
    let mut out = vec![point_along_polyline(points, from, tol)?];
    let mut acc = 0.0;
    for w in points.windows(2) {
        acc += distance(&w[0], &w[1]);
        if acc > from + tol.snap && acc < to - tol.snap {
            out.push(w[1]);
        }
    }
    out.push(point_along_polyline(points, to, tol)?);
    Ok(out)
}

/// Stacks the parts down the left and right edges
fn stack_parts(sub: &SubPanel, edges: &Edges, tol: &Tolerance) -> KernelResult<Vec<Edges>> {
    let left_len = polyline_length(&edges.left);
    let right_len = polyline_length(&edges.right);
    let stacked: f64 = sub.parts.iter().filter_map(|p| p.height).sum();
    if stacked >= left_len.min(right_len) - tol.snap {
        return Err(KernelError::invalid_spec(
            format!("SubPanel {}", sub.name),
            format!(
                "part heights sum to {stacked:.1} mm but the sides are {left_len:.1} and {right_len:.1} mm"
            ),
        ));
    }

    let count = sub.parts.len();
    let mut parts = Vec::with_capacity(count);
    let mut depth = 0.0;
    for (k, part) in sub.parts.iter().enumerate() {
        let (first, last) = (k == 0, k + 1 == count);
        let (l_to, r_to) = match part.height {
            Some(h) if !last => (depth + h, depth + h),
            _ => (left_len, right_len),
        };
        let l_from = depth.min(left_len);
        let r_from = depth.min(right_len);
        let left = polyline_between(&edges.left, l_from, l_to, tol)?;
        let right = polyline_between(&edges.right, r_from, r_to, tol)?;
        let top = if first {
            edges.top.clone()
        } else {
            vec![left[0], right[0]]
        };
        let bottom = if last {
            edges.bottom.clone()
        } else {
            vec![left[left.len() - 1], right[right.len() - 1]]
        };
        parts.push(Edges {
            top,
            bottom,
            left,
            right,
        });
        if let Some(h) = part.height {
            depth += h;
        }
    }
    Ok(parts)
}

/// Diaphragm or cross-frame plate, one element per part plus its attachments
pub fn build_sub_panel(
    sub: &SubPanel,
    spec: &BridgeSpec,
    alignment: &Alignment,
    ctx: &BuildContext,
) -> KernelResult<Vec<ElementRecipe>> {
    let tol = &ctx.tolerance;
    let mut edges = Edges::resolve(sub, alignment)?;
    for ext in &sub.extend {
        edges.extend(ext, spec, alignment, ctx)?;
    }

    let side_export = sub.side_export.unwrap_or(ctx.side_export);
    let parts = stack_parts(sub, &edges, tol)?;
    let single = parts.len() == 1;

    let mut elements = Vec::new();
    for (part, outline) in sub.parts.iter().zip(&parts) {
        let name = if single {
            sub.name.clone()
        } else {
            format!("{}-{}", sub.name, part.name)
        };
        let built = build_part(
            &name,
            part,
            outline,
            side_export,
            &spec.catalog,
            sub.container.as_deref(),
            tol,
        )?;
        elements.extend(built);
    }
    debug!(sub_panel = %sub.name, parts = parts.len(), elements = elements.len(), "sub-panel built");
    Ok(elements)
}

fn build_part(
    name: &str,
    part: &Part,
    edges: &Edges,
    side_export: SideExport,
    catalog: &Catalog,
    container: Option<&str>,
    tol: &Tolerance,
) -> KernelResult<Vec<ElementRecipe>> {
    let outline = edges.outline(tol);
    if outline.len() < 3 {
        return Err(KernelError::degenerate(format!("part `{name}` has no area")));
    }
    let normal = newell_normal(&outline, tol)?;
    let centroid = polygon_centroid(&outline);
    let x = unit_direction(&edges.top[0], &edges.top[edges.top.len() - 1], tol)?;
    let frame = Frame::from_normal(centroid, &normal, &x, tol)?;
    let span = side_export.face_offsets(part.thick.a, part.thick.f);

    let mut cutters: Vec<SolidRecipe> = Vec::new();
    for (corner, cut) in &part.corners {
        let (at, along, down) = match corner {
            PartCorner::TopLeft => (&edges.top, 0, 0),
            PartCorner::TopRight => (&edges.top, edges.top.len() - 1, 0),
            PartCorner::BottomLeft => (&edges.bottom, 0, 1),
            PartCorner::BottomRight => (&edges.bottom, edges.bottom.len() - 1, 1),
        };
        let corner_point = at[along];
        let next_on_edge = if along == 0 { at[1] } else { at[along - 1] };
        let side = match corner {
            PartCorner::TopLeft | PartCorner::BottomLeft => &edges.left,
            PartCorner::TopRight | PartCorner::BottomRight => &edges.right,
        };
        let next_on_side = if down == 0 { side[1] } else { side[side.len() - 2] };
        cutters.push(corner_cutter(
            &corner_point,
            &unit_direction(&corner_point, &next_on_edge, tol)?,
            &unit_direction(&corner_point, &next_on_side, tol)?,
            &normal,
            cut,
            span,
            tol,
        )?);
    }

    for slot in &part.slots {
        let rib = catalog.rib(&slot.rib)?;
        cutters.push(slot_cutter(
            edges.side(slot.side),
            &normal,
            &centroid,
            slot,
            rib,
            span,
            tol,
        )?);
    }

    for cutout in &part.cutouts {
        cutters.extend(cutout_cutters(&frame, cutout, span));
    }

    let mut elements = vec![ElementRecipe::new(
        name.to_string(),
        ElementClass::Plate,
        container.map(str::to_string),
        plate_prism(&outline, &normal, span).minus(cutters),
    )];

    for end in [JointEnd::Start, JointEnd::End] {
        let Some(splice_name) = part.joints.at(end) else {
            continue;
        };
        let side = match end {
            JointEnd::Start => &edges.left,
            JointEnd::End => &edges.right,
        };
        let (start, finish) = (side[0], side[side.len() - 1]);
        let along = unit_direction(&start, &finish, tol)?;
        let edge = JointEdge {
            start,
            end: finish,
            inward: inward_direction(&start, &along, &normal, &centroid, tol)?,
            normal,
            span,
        };
        elements.extend(splice_plates(
            name,
            end,
            &edge,
            catalog.splice(splice_name)?,
            container,
            tol,
        )?);
    }

    for (k, stiffener) in part.stiffeners.iter().enumerate() {
        let point = |side: Side, index: usize| {
            edges.side(side).get(index).copied().ok_or_else(|| {
                KernelError::InvalidInput(format!(
                    "stiffener {} of `{name}` references point {index} of side {side}",
                    k + 1
                ))
            })
        };
        let from = point(stiffener.from.side, stiffener.from.index)?;
        let to = point(stiffener.to.side, stiffener.to.index)?;
        elements.push(ElementRecipe::new(
            format!("{name}-ST{}", k + 1),
            ElementClass::Plate,
            container.map(str::to_string),
            stiffener_solid(
                &from,
                &to,
                &normal,
                stiffener.face,
                catalog.rib(&stiffener.rib)?,
                span,
                tol,
            )?,
        ));
    }

    for flange in &part.flanges {
        elements.extend(build_flange(
            name, flange, edges, &normal, &centroid, catalog, container, tol,
        )?);
    }
    Ok(elements)
}

/// Plate or angle standing on the chord of the top or bottom edge
#[allow(clippy::too_many_arguments)]
fn build_flange(
    part_name: &str,
    flange: &FlangeSpec,
    edges: &Edges,
    normal: &Vector3,
    centroid: &Point3,
    catalog: &Catalog,
    container: Option<&str>,
    tol: &Tolerance,
) -> KernelResult<Vec<ElementRecipe>> {
    let (edge, tag) = match flange.edge {
        FlangeEdge::Top => (&edges.top, "FLT"),
        FlangeEdge::Bottom => (&edges.bottom, "FLB"),
    };
    let name = format!("{part_name}-{tag}");
    let start = edge[0];
    let end = edge[edge.len() - 1];
    let along = unit_direction(&start, &end, tol)?;
    let outward = -inward_direction(&start, &along, normal, centroid, tol)?;
    let across = outward.cross(&along);
    let frame = Frame::from_axes(start, &across, &outward, tol)?;

    let (hw, t, w) = (flange.width / 2.0, flange.thick, flange.width);
    let (profile, reach): (Vec<(f64, f64)>, f64) = match flange.shape {
        FlangeShape::Plate => (vec![(-hw, 0.0), (hw, 0.0), (hw, t), (-hw, t)], t),
        FlangeShape::Angle => (
            vec![
                (-hw, 0.0),
                (hw, 0.0),
                (hw, t),
                (-hw + t, t),
                (-hw + t, w),
                (-hw, w),
            ],
            w,
        ),
    };
    let profile: Vec<Point2> = profile.into_iter().map(|(x, y)| Point2::new(x, y)).collect();

    let mut cutters = Vec::new();
    for (at_end, cut) in &flange.corners {
        let (at, into) = match at_end {
            JointEnd::Start => (start, along),
            JointEnd::End => (end, -along),
        };
        for s in [1.0, -1.0] {
            cutters.push(corner_cutter(
                &(at + across * (hw * s)),
                &into,
                &(across * -s),
                &outward,
                cut,
                (reach, 0.0),
                tol,
            )?);
        }
    }

    let mut elements = vec![ElementRecipe::new(
        name.clone(),
        ElementClass::Plate,
        container.map(str::to_string),
        SolidRecipe::extruded(profile, distance(&start, &end), frame).minus(cutters),
    )];

    for joint_end in [JointEnd::Start, JointEnd::End] {
        let Some(splice_name) = flange.joints.at(joint_end) else {
            continue;
        };
        let (at, inward) = match joint_end {
            JointEnd::Start => (start, along),
            JointEnd::End => (end, -along),
        };
        let joint = JointEdge {
            start: at - across * hw,
            end: at + across * hw,
            inward,
            normal: outward,
            span: (t, 0.0),
        };
        elements.extend(splice_plates(
            &name,
            joint_end,
            &joint,
            catalog.splice(splice_name)?,
            container,
            tol,
        )?);
    }
    Ok(elements)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solid::{MeshBackend, SolidBackend};
    use crate::spec::{
        AlignmentLine, CornerCut, CornerCutKind, EdgePoint, JointSpec, MainPanel, PanelKind,
        PlateGeometry, SubPanelEdges, Thickness,
    };
    use approx::assert_relative_eq;

    fn c(x: f64, y: f64, z: f64) -> EdgePoint {
        EdgePoint::Coord(Point3::new(x, y, z))
    }

    fn part(name: &str, height: Option<f64>) -> Part {
        Part {
            name: name.to_string(),
            height,
            thick: Thickness::new(6.0, 6.0),
            corners: vec![],
            slots: vec![],
            joints: JointSpec::default(),
            cutouts: vec![],
            stiffeners: vec![],
            flanges: vec![],
        }
    }

    /// Diaphragm in the plane x = 5000, 2000 wide and 1000 deep
    fn diaphragm(parts: Vec<Part>) -> SubPanel {
        SubPanel {
            name: "D1".to_string(),
            container: Some("G1".to_string()),
            edges: SubPanelEdges {
                top: vec![c(5000.0, -100.0, 0.0), c(5000.0, -2100.0, 0.0)],
                bottom: vec![c(5000.0, -100.0, -1000.0), c(5000.0, -2100.0, -1000.0)],
                left: vec![c(5000.0, -100.0, 0.0), c(5000.0, -100.0, -1000.0)],
                right: vec![c(5000.0, -2100.0, 0.0), c(5000.0, -2100.0, -1000.0)],
            },
            side_export: None,
            extend: vec![],
            parts,
        }
    }

    fn volume(recipe: &SolidRecipe) -> f64 {
        let backend = MeshBackend::default();
        let solid = backend.realize("test", recipe).unwrap();
        backend.volume(&solid)
    }

    #[test]
    fn test_single_part_takes_sub_panel_name() {
        let sub = diaphragm(vec![part("P1", None)]);
        let ctx = BuildContext::default();
        let out = build_sub_panel(&sub, &BridgeSpec::default(), &Alignment::new(&[]), &ctx).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].name, "D1");
        assert_eq!(out[0].container.as_deref(), Some("G1"));
        assert_relative_eq!(volume(&out[0].recipe), 2000.0 * 1000.0 * 12.0, max_relative = 1e-9);
    }

    #[test]
    fn test_stacked_parts_and_side_export() {
        let mut sub = diaphragm(vec![part("U", Some(400.0)), part("L", None)]);
        sub.side_export = Some(SideExport::TopOnly);
        let out = build_sub_panel(
            &sub,
            &BridgeSpec::default(),
            &Alignment::new(&[]),
            &BuildContext::default(),
        )
        .unwrap();
        let names: Vec<&str> = out.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["D1-U", "D1-L"]);
        assert_relative_eq!(volume(&out[0].recipe), 2000.0 * 400.0 * 6.0, max_relative = 1e-9);
        assert_relative_eq!(volume(&out[1].recipe), 2000.0 * 600.0 * 6.0, max_relative = 1e-9);
    }

    #[test]
    fn test_heights_exceeding_sides_rejected() {
        let sub = diaphragm(vec![part("U", Some(1000.0)), part("L", None)]);
        let err = build_sub_panel(
            &sub,
            &BridgeSpec::default(),
            &Alignment::new(&[]),
            &BuildContext::default(),
        )
        .unwrap_err();
        assert!(matches!(err, KernelError::InvalidSpec { .. }));
    }

    #[test]
    fn test_corner_cut_and_flange() {
        let mut p = part("P1", None);
        p.corners = vec![(
            PartCorner::BottomRight,
            CornerCut {
                kind: CornerCutKind::Triangle,
                d1: 40.0,
                d2: 30.0,
            },
        )];
        p.flanges = vec![FlangeSpec {
            edge: FlangeEdge::Top,
            shape: FlangeShape::Plate,
            width: 200.0,
            thick: 10.0,
            corners: vec![],
            joints: JointSpec::default(),
        }];
        let sub = diaphragm(vec![p]);
        let out = build_sub_panel(
            &sub,
            &BridgeSpec::default(),
            &Alignment::new(&[]),
            &BuildContext::default(),
        )
        .unwrap();
        assert_eq!(out[1].name, "D1-FLT");
        assert_relative_eq!(
            volume(&out[0].recipe),
            (2000.0 * 1000.0 - 0.5 * 40.0 * 30.0) * 12.0,
            max_relative = 1e-6
        );

        let flange = out[1].recipe.bounding_box();
        assert_relative_eq!(flange.min.z, 0.0, epsilon = 1e-9);
        assert_relative_eq!(flange.max.z, 10.0, epsilon = 1e-9);
        assert_relative_eq!(volume(&out[1].recipe), 2000.0 * 200.0 * 10.0, max_relative = 1e-9);
    }

    #[test]
    fn test_stiffener_index_out_of_range() {
        let mut p = part("P1", None);
        p.stiffeners = vec![crate::spec::StiffenerSpec {
            rib: "R1".to_string(),
            from: crate::spec::EdgeRef {
                side: Side::Top,
                index: 0,
            },
            to: crate::spec::EdgeRef {
                side: Side::Bottom,
                index: 5,
            },
            face: crate::spec::FaceSide::A,
        }];
        let err = build_sub_panel(
            &diaphragm(vec![p]),
            &BridgeSpec::default(),
            &Alignment::new(&[]),
            &BuildContext::default(),
        )
        .unwrap_err();
        assert!(matches!(err, KernelError::InvalidInput(_)));
    }

    /// One-quad vertical face in the plane y = `y`
    fn wall(y: f64) -> Vec<[Point3; 4]> {
        vec![[
            Point3::new(4000.0, y, 500.0),
            Point3::new(6000.0, y, 500.0),
            Point3::new(6000.0, y, -2000.0),
            Point3::new(4000.0, y, -2000.0),
        ]]
    }

    #[test]
    fn test_reach_nearest_of_two_faces() {
        let tol = Tolerance::default();
        let from = Point3::new(5000.0, -1000.0, -500.0);
        let to = Point3::new(5000.0, -100.0, -500.0);
        for faces in [vec![wall(-50.0), wall(-80.0)], vec![wall(-80.0), wall(-50.0)]] {
            let hit = reach_faces(&faces, &from, &to, &tol).unwrap();
            assert_relative_eq!(hit, Point3::new(5000.0, -80.0, -500.0), epsilon = 1e-9);
        }
    }

    #[test]
    fn test_reach_tie_goes_to_higher_face() {
        let tol = Tolerance::default();
        // rising edge; the faces sit 50 before and 50 beyond `to` along y
        let from = Point3::new(5000.0, -1000.0, -1000.0);
        let to = Point3::new(5000.0, -100.0, -100.0);
        for faces in [vec![wall(-150.0), wall(-50.0)], vec![wall(-50.0), wall(-150.0)]] {
            let hit = reach_faces(&faces, &from, &to, &tol).unwrap();
            assert_relative_eq!(hit, Point3::new(5000.0, -50.0, -50.0), epsilon = 1e-9);
        }
    }

    #[test]
    fn test_reach_without_any_hit() {
        let tol = Tolerance::default();
        let from = Point3::new(4500.0, -100.0, -500.0);
        let to = Point3::new(5500.0, -100.0, -500.0);
        let err = reach_faces(&[wall(-50.0)], &from, &to, &tol).unwrap_err();
        assert!(matches!(err, KernelError::DegenerateGeometry(_)));
    }

    #[test]
    fn test_extend_onto_web_face() {
        let line = |name: &str, y: f64, z: f64| AlignmentLine {
            name: name.to_string(),
            stations: vec![
                ("S1".to_string(), Point3::new(0.0, y, z)),
                ("S2".to_string(), Point3::new(10000.0, y, z)),
            ],
        };
        let lines = vec![line("G1T", 0.0, 0.0), line("G1B", 0.0, -1500.0)];
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
        let mut sub = diaphragm(vec![part("P1", None)]);
        sub.extend = vec![ExtendSpec {
            side: Side::Left,
            panels: vec!["G1B1W".to_string()],
            gap: 10.0,
        }];

        let out = build_sub_panel(&sub, &spec, &Alignment::new(&lines), &BuildContext::default())
            .unwrap();
        let bbox = out[0].recipe.bounding_box();
        assert_relative_eq!(bbox.max.y, -15.0, epsilon = 1e-9);
        assert_relative_eq!(
            volume(&out[0].recipe),
            2085.0 * 1000.0 * 12.0,
            max_relative = 1e-9
        );
    }
}
