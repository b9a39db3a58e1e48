// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Panel engine: girder webs, flanges and deck plates.
//!
//! A panel is the ruled strip between its two boundary lines over a station
//! range. Face A is the strip offset by `+thick.a`, face F by `-thick.f`.

use super::breaking::{break_strip, patch_boundary, Segment};
use super::features::{corner_cutter, inward_direction, splice_plates, JointEdge};
use crate::alignment::Alignment;
use crate::context::BuildContext;
use crate::error::KernelResult;
use crate::geometry::{distance, unit_direction, Point3, RuledStrip};
use crate::solid::{ElementClass, ElementRecipe, SolidRecipe};
use crate::spec::{Catalog, Deck, JointEnd, MainPanel, PanelCorner, PlateGeometry};
use tracing::debug;

/// Centre strip of a plate, patched when lenient boundaries are enabled
pub fn resolve_plate_strip(
    plate: &PlateGeometry,
    alignment: &Alignment,
    ctx: &BuildContext,
) -> KernelResult<RuledStrip> {
    let [from, to] = &plate.stations;
    if ctx.options.patch_missing_vertices {
        let pairs = alignment.resolve_panel_boundary_lenient(&plate.lines, from, to)?;
        patch_boundary(&pairs, &ctx.tolerance)
    } else {
        alignment.resolve_panel_boundary(&plate.lines, from, to)
    }
}

/// Face of a plate on the side of `toward`, moved a further `gap` off the plate.
///
/// Returns the face strip and its signed offset from the centre strip.
pub fn plate_face_toward(
    plate: &PlateGeometry,
    strip: &RuledStrip,
    toward: &Point3,
    gap: f64,
    ctx: &BuildContext,
) -> KernelResult<(RuledStrip, f64)> {
    let tol = &ctx.tolerance;
    let normals = strip.normals(tol)?;
    let mid = strip.midline();
    let nearest = (0..mid.len())
        .min_by(|&i, &j| distance(&mid[i], toward).total_cmp(&distance(&mid[j], toward)))
        .unwrap_or(0);
    let offset = if normals[nearest].dot(&(toward - mid[nearest])) >= 0.0 {
        plate.thick.a + gap
    } else {
        -(plate.thick.f + gap)
    };
    Ok((strip.offset(offset, tol)?, offset))
}

/// Web or flange plate of a girder, one element per fabrication segment
pub fn build_main_panel(
    panel: &MainPanel,
    alignment: &Alignment,
    catalog: &Catalog,
    ctx: &BuildContext,
) -> KernelResult<Vec<ElementRecipe>> {
    build_plate(
        &panel.name(),
        Some(&panel.girder),
        &panel.plate,
        alignment,
        catalog,
        ctx,
    )
}

/// Deck plate, placed directly under the bridge container
pub fn build_deck(
    deck: &Deck,
    alignment: &Alignment,
    catalog: &Catalog,
    ctx: &BuildContext,
) -> KernelResult<Vec<ElementRecipe>> {
    build_plate(&deck.name, None, &deck.plate, alignment, catalog, ctx)
}

fn build_plate(
    name: &str,
    container: Option<&str>,
    plate: &PlateGeometry,
    alignment: &Alignment,
    catalog: &Catalog,
    ctx: &BuildContext,
) -> KernelResult<Vec<ElementRecipe>> {
    let tol = &ctx.tolerance;
    let strip = resolve_plate_strip(plate, alignment, ctx)?;

    let segments = match &plate.break_spec {
        Some(spec) => break_strip(&strip, spec, plate.thick, tol)?.segments,
        None => vec![Segment {
            number: 1,
            strip,
            thick: plate.thick,
        }],
    };
    let count = segments.len();

    let mut elements = Vec::with_capacity(count);
    for segment in &segments {
        let element_name = if count == 1 {
            name.to_string()
        } else {
            format!("{name}-{}", segment.number)
        };
        let first = segment.number == 1;
        let last = segment.number == count;
        let span = (segment.thick.a, -segment.thick.f);
        let strip = &segment.strip;

        let top = strip.offset(span.0, tol)?.outline();
        let bottom = strip.offset(span.1, tol)?.outline();

        let normals = strip.normals(tol)?;
        let n = strip.len();
        let mut cutters = Vec::new();
        for (corner, cut) in &plate.corners {
            let (at_start, on_left) = match corner {
                PanelCorner::StartLeft => (true, true),
                PanelCorner::StartRight => (true, false),
                PanelCorner::EndLeft => (false, true),
                PanelCorner::EndRight => (false, false),
            };
            if (at_start && !first) || (!at_start && !last) {
                continue;
            }
            let (i, next) = if at_start { (0, 1) } else { (n - 1, n - 2) };
            let (own, other) = if on_left {
                (&strip.left, &strip.right)
            } else {
                (&strip.right, &strip.left)
            };
            cutters.push(corner_cutter(
                &own[i],
                &unit_direction(&own[i], &other[i], tol)?,
                &unit_direction(&own[i], &own[next], tol)?,
                &normals[i],
                cut,
                span,
                tol,
            )?);
        }

        let recipe = SolidRecipe::two_faces(top, bottom).minus(cutters);
        elements.push(ElementRecipe::new(
            element_name.clone(),
            ElementClass::Plate,
            container.map(str::to_string),
            recipe,
        ));

        for end in [JointEnd::Start, JointEnd::End] {
            let Some(splice_name) = plate.joints.at(end) else {
                continue;
            };
            let (i, next) = match end {
                JointEnd::Start if first => (0, 1),
                JointEnd::End if last => (n - 1, n - 2),
                _ => continue,
            };
            let splice = catalog.splice(splice_name)?;
            let along = unit_direction(&strip.left[i], &strip.right[i], tol)?;
            let mid_next = nalgebra::center(&strip.left[next], &strip.right[next]);
            let edge = JointEdge {
                start: strip.left[i],
                end: strip.right[i],
                inward: inward_direction(&strip.left[i], &along, &normals[i], &mid_next, tol)?,
                normal: normals[i],
                span,
            };
            elements.extend(splice_plates(
                &element_name,
                end,
                &edge,
                splice,
                container,
                tol,
            )?);
        }
    }

    debug!(panel = name, segments = count, elements = elements.len(), "panel built");
    Ok(elements)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solid::{MeshBackend, SolidBackend};
    use crate::spec::{
        AlignmentLine, BreakSpec, CornerCut, CornerCutKind, JointSpec, PanelKind, PlateSide,
        SplicePlate, Thickness,
    };
    use approx::assert_relative_eq;

    fn line(name: &str, y: f64, z: f64) -> AlignmentLine {
        AlignmentLine {
            name: name.to_string(),
            stations: vec![
                ("S1".to_string(), Point3::new(0.0, y, z)),
                ("C1".to_string(), Point3::new(5000.0, y, z)),
                ("S2".to_string(), Point3::new(10000.0, y, z)),
            ],
        }
    }

    fn web(break_spec: Option<BreakSpec>) -> MainPanel {
        MainPanel {
            girder: "G1".to_string(),
            block: "B1".to_string(),
            kind: PanelKind::Web,
            plate: PlateGeometry {
                lines: ["G1T".to_string(), "G1B".to_string()],
                stations: ["S1".to_string(), "S2".to_string()],
                thick: Thickness::new(6.0, 6.0),
                break_spec,
                corners: vec![],
                joints: JointSpec::default(),
            },
        }
    }

    fn alignment() -> Alignment {
        Alignment::new(&[line("G1T", 0.0, 0.0), line("G1B", 0.0, -1500.0)])
    }

    #[test]
    fn test_unbroken_web_volume() {
        let ctx = BuildContext::default();
        let elements =
            build_main_panel(&web(None), &alignment(), &Catalog::default(), &ctx).unwrap();
        assert_eq!(elements.len(), 1);
        assert_eq!(elements[0].name, "G1B1W");
        assert_eq!(elements[0].container.as_deref(), Some("G1"));

        let backend = MeshBackend::new(ctx.tolerance);
        let solid = backend.realize("G1B1W", &elements[0].recipe).unwrap();
        assert_relative_eq!(backend.volume(&solid), 10000.0 * 1500.0 * 12.0, max_relative = 1e-9);
    }

    #[test]
    fn test_broken_web_names() {
        let ctx = BuildContext::default();
        let spec = BreakSpec {
            lengths: vec![3000.0, 4000.0, 3000.0],
            thicknesses: vec![Thickness::new(5.0, 5.0)],
        };
        let elements =
            build_main_panel(&web(Some(spec)), &alignment(), &Catalog::default(), &ctx).unwrap();
        let names: Vec<&str> = elements.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["G1B1W-1", "G1B1W-2", "G1B1W-3"]);

        let backend = MeshBackend::new(ctx.tolerance);
        let first = backend.realize("G1B1W-1", &elements[0].recipe).unwrap();
        assert_relative_eq!(backend.volume(&first), 3000.0 * 1500.0 * 10.0, max_relative = 1e-9);
    }

    #[test]
    fn test_corner_cut_and_joint() {
        let ctx = BuildContext::default();
        let mut panel = web(None);
        panel.plate.corners = vec![(
            PanelCorner::EndRight,
            CornerCut {
                kind: CornerCutKind::Triangle,
                d1: 50.0,
                d2: 50.0,
            },
        )];
        panel.plate.joints.start = Some("SPL1".to_string());
        let catalog = Catalog::new(
            vec![],
            vec![SplicePlate {
                name: "SPL1".into(),
                thick: 9.0,
                edge_distance: 40.0,
                pitch: "3@75".parse().unwrap(),
                clearance: 10.0,
                side: PlateSide::A,
            }],
            vec![],
        );
        let elements = build_main_panel(&panel, &alignment(), &catalog, &ctx).unwrap();
        let names: Vec<&str> = elements.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["G1B1W", "G1B1W-SPLSA"]);
        assert_eq!(elements[0].recipe.cutter_count(), 1);

        let backend = MeshBackend::new(ctx.tolerance);
        let solid = backend.realize("G1B1W", &elements[0].recipe).unwrap();
        assert_relative_eq!(
            backend.volume(&solid),
            10000.0 * 1500.0 * 12.0 - 0.5 * 50.0 * 50.0 * 12.0,
            max_relative = 1e-6
        );
    }

    #[test]
    fn test_missing_splice_is_reference_error() {
        let ctx = BuildContext::default();
        let mut panel = web(None);
        panel.plate.joints.end = Some("NOPE".to_string());
        let err = build_main_panel(&panel, &alignment(), &Catalog::default(), &ctx).unwrap_err();
        assert!(err.is_missing_reference());
    }
}
