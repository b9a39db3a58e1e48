// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Load-time validation: raw records in, typed model out.
//!
//! Validation is all-or-nothing. The first malformed record rejects the whole
//! input with [`KernelError::InvalidSpec`] naming that record. References to
//! lines, stations and catalog entries are resolved later, per member.

use super::catalog::{Catalog, Rib, SectionData, SplicePlate};
use super::codes::{CodeError, JointEnd, PanelCorner, PartCorner, SectionKind, Side, SideExport};
use super::model::*;
use super::raw::*;
use crate::config::Tolerance;
use crate::error::{KernelError, KernelResult};
use crate::geometry::{Point3, Vector2};
use std::collections::HashSet;

/// Record label used in error messages, e.g. `MainPanel[2] G1B1W`
struct Record(String);

impl Record {
    fn new(kind: &str, index: usize, name: impl AsRef<str>) -> Self {
        let name = name.as_ref();
        if name.is_empty() {
            Self(format!("{kind}[{index}]"))
        } else {
            Self(format!("{kind}[{index}] {name}"))
        }
    }

    fn child(&self, what: impl AsRef<str>) -> Self {
        Self(format!("{}.{}", self.0, what.as_ref()))
    }

    fn fail<T>(&self, reason: impl Into<String>) -> KernelResult<T> {
        Err(KernelError::invalid_spec(self.0.clone(), reason))
    }

    fn code<T>(&self, parsed: Result<T, CodeError>) -> KernelResult<T> {
        parsed.map_err(|e| KernelError::invalid_spec(self.0.clone(), e.to_string()))
    }

    fn positive(&self, field: &str, value: f64) -> KernelResult<f64> {
        if value.is_finite() && value > 0.0 {
            Ok(value)
        } else {
            self.fail(format!("{field} must be positive, got {value}"))
        }
    }

    fn non_negative(&self, field: &str, value: f64) -> KernelResult<f64> {
        if value.is_finite() && value >= 0.0 {
            Ok(value)
        } else {
            self.fail(format!("{field} must not be negative, got {value}"))
        }
    }

    fn finite(&self, field: &str, value: f64) -> KernelResult<f64> {
        if value.is_finite() {
            Ok(value)
        } else {
            self.fail(format!("{field} is not a finite number"))
        }
    }

    fn non_empty<'a>(&self, field: &str, value: &'a str) -> KernelResult<&'a str> {
        if value.trim().is_empty() {
            self.fail(format!("{field} is empty"))
        } else {
            Ok(value)
        }
    }

    fn pair(&self, field: &str, values: &[String]) -> KernelResult<[String; 2]> {
        match values {
            [a, b] if !a.trim().is_empty() && !b.trim().is_empty() => Ok([a.clone(), b.clone()]),
            _ => self.fail(format!(
                "{field} needs exactly two names, got {}",
                values.len()
            )),
        }
    }
}

/// Validate a raw input record into a [`BridgeSpec`]
pub fn validate(raw: &RawBridge, tol: &Tolerance) -> KernelResult<BridgeSpec> {
    let infor = raw.infor.as_ref().and_then(RawInforField::first);
    let side_export: SideExport = match infor.and_then(|i| i.side_export.as_deref()) {
        Some(code) => Record("Infor".to_string()).code(code.parse())?,
        None => Default::default(),
    };

    let lines = validate_lines(&raw.senkei, tol)?;

    let main_panels = raw
        .main_panel
        .iter()
        .enumerate()
        .map(|(i, p)| validate_main_panel(i, p))
        .collect::<KernelResult<Vec<_>>>()?;
    unique_names("MainPanel", main_panels.iter().map(MainPanel::name))?;

    let decks = raw
        .shouban
        .iter()
        .enumerate()
        .map(|(i, d)| {
            let rec = Record::new("Shouban", i, &d.name);
            Ok(Deck {
                name: rec.non_empty("Name", &d.name)?.to_string(),
                plate: validate_plate(&rec, &d.plate)?,
            })
        })
        .collect::<KernelResult<Vec<_>>>()?;
    unique_names("Shouban", decks.iter().map(|d| d.name.clone()))?;

    let sub_panels = raw
        .sub_panel
        .iter()
        .enumerate()
        .map(|(i, s)| validate_sub_panel(i, s))
        .collect::<KernelResult<Vec<_>>>()?;
    unique_names("SubPanel", sub_panels.iter().map(|s| s.name.clone()))?;

    let cross_beams = raw
        .yokogeta
        .iter()
        .enumerate()
        .map(|(i, c)| validate_cross_beam(i, c))
        .collect::<KernelResult<Vec<_>>>()?;
    unique_names("Yokogeta", cross_beams.iter().map(CrossBeam::name))?;

    let diagonal_bracings = raw
        .taikeikou
        .iter()
        .enumerate()
        .map(|(i, d)| validate_diagonal(i, d))
        .collect::<KernelResult<Vec<_>>>()?;
    unique_names("Taikeikou", diagonal_bracings.iter().map(|d| d.name.clone()))?;

    let lateral_bracings = raw
        .yokokou
        .iter()
        .enumerate()
        .map(|(i, l)| validate_lateral(&Record::new("Yokokou", i, &l.name), l))
        .chain(raw.yokokou_lateral_bracing.iter().enumerate().map(|(i, l)| {
            validate_lateral(&Record::new("Yokokou_LateralBracing", i, &l.name), l)
        }))
        .collect::<KernelResult<Vec<_>>>()?;
    unique_names("Yokokou", lateral_bracings.iter().map(|l| l.name.clone()))?;

    let gussets = raw
        .gusset
        .iter()
        .enumerate()
        .map(|(i, g)| validate_gusset(i, g))
        .collect::<KernelResult<Vec<_>>>()?;
    unique_names("Gusset", gussets.iter().map(GussetSpec::name))?;

    let catalog = validate_catalog(raw)?;

    Ok(BridgeSpec {
        name: infor.map(|i| i.name_bridge.clone()).unwrap_or_default(),
        side_export,
        lines,
        main_panels,
        decks,
        sub_panels,
        cross_beams,
        diagonal_bracings,
        lateral_bracings,
        gussets,
        catalog,
    })
}

fn unique_names(kind: &str, names: impl Iterator<Item = String>) -> KernelResult<()> {
    let mut seen = HashSet::new();
    for (i, name) in names.enumerate() {
        if !seen.insert(name.clone()) {
            return Record::new(kind, i, &name).fail("duplicate name");
        }
    }
    Ok(())
}

fn validate_lines(raw: &[RawLine], tol: &Tolerance) -> KernelResult<Vec<AlignmentLine>> {
    let mut names = HashSet::new();
    raw.iter()
        .enumerate()
        .map(|(i, line)| {
            let rec = Record::new("Senkei", i, &line.name);
            rec.non_empty("Name", &line.name)?;
            if !names.insert(line.name.as_str()) {
                return rec.fail("duplicate line name");
            }
            if line.point.is_empty() {
                return rec.fail("line has no stations");
            }

            let mut stations: Vec<(String, Point3)> = Vec::with_capacity(line.point.len());
            let mut station_names = HashSet::new();
            for (k, s) in line.point.iter().enumerate() {
                let srec = rec.child(format!("Point[{k}] {}", s.name));
                srec.non_empty("Name", &s.name)?;
                if !station_names.insert(s.name.as_str()) {
                    return srec.fail("duplicate station name");
                }
                let p = Point3::new(
                    srec.finite("X", s.x)?,
                    srec.finite("Y", s.y)?,
                    srec.finite("Z", s.z)?,
                );
                if let Some((_, prev)) = stations.last() {
                    if p.x < prev.x - tol.coincidence {
                        return srec.fail(format!(
                            "chainage decreases from X={} to X={}",
                            prev.x, p.x
                        ));
                    }
                }
                stations.push((s.name.clone(), p));
            }
            Ok(AlignmentLine {
                name: line.name.clone(),
                stations,
            })
        })
        .collect()
}

fn validate_thickness(rec: &Record, field: &str, t: [f64; 2]) -> KernelResult<Thickness> {
    let a = rec.non_negative(&format!("{field}[0]"), t[0])?;
    let f = rec.non_negative(&format!("{field}[1]"), t[1])?;
    if a + f <= 0.0 {
        return rec.fail(format!("{field} has zero total thickness"));
    }
    Ok(Thickness::new(a, f))
}

fn validate_corner_cut(rec: &Record, c: &RawCorner) -> KernelResult<CornerCut> {
    let d1 = rec.positive("D1", c.d1)?;
    let d2 = rec.positive("D2", c.d2.unwrap_or(c.d1))?;
    Ok(CornerCut {
        kind: rec.code(c.kind.parse())?,
        d1,
        d2,
    })
}

fn validate_joint(rec: &Record, j: &RawJoint) -> KernelResult<JointSpec> {
    let name = |v: &Option<String>| -> KernelResult<Option<String>> {
        match v {
            Some(s) => Ok(Some(rec.non_empty("Joint", s)?.to_string())),
            None => Ok(None),
        }
    };
    Ok(JointSpec {
        start: name(&j.start)?,
        end: name(&j.end)?,
    })
}

fn validate_plate(rec: &Record, p: &RawPlate) -> KernelResult<PlateGeometry> {
    let lines = rec.pair("Line", &p.line)?;
    let stations = rec.pair("Station", &p.station)?;
    let thick = validate_thickness(rec, "Thick", p.thick)?;

    let break_spec = match &p.break_spec {
        None => None,
        Some(b) => {
            let brec = rec.child("Break");
            if b.length.is_empty() {
                return brec.fail("Length is empty");
            }
            let lengths = b
                .length
                .iter()
                .map(|&l| brec.positive("Length", l))
                .collect::<KernelResult<Vec<_>>>()?;
            if b.thick.len() > lengths.len() {
                return brec.fail(format!(
                    "{} thickness pairs for {} segments",
                    b.thick.len(),
                    lengths.len()
                ));
            }
            let thicknesses = b
                .thick
                .iter()
                .map(|&t| validate_thickness(&brec, "Thick", t))
                .collect::<KernelResult<Vec<_>>>()?;
            Some(BreakSpec {
                lengths,
                thicknesses,
            })
        }
    };

    let mut seen = HashSet::new();
    let corners = p
        .corner
        .iter()
        .enumerate()
        .map(|(k, c)| {
            let crec = rec.child(format!("Corner[{k}]"));
            let position: PanelCorner = crec.code(c.position.parse())?;
            if !seen.insert(position) {
                return crec.fail(format!("corner {position} given twice"));
            }
            Ok((position, validate_corner_cut(&crec, c)?))
        })
        .collect::<KernelResult<Vec<_>>>()?;

    Ok(PlateGeometry {
        lines,
        stations,
        thick,
        break_spec,
        corners,
        joints: validate_joint(rec, &p.joint)?,
    })
}

fn validate_main_panel(index: usize, p: &RawMainPanel) -> KernelResult<MainPanel> {
    let rec = Record::new("MainPanel", index, format!("{}{}{}", p.girder, p.block, p.kind));
    Ok(MainPanel {
        girder: rec.non_empty("Girder", &p.girder)?.to_string(),
        block: rec.non_empty("Block", &p.block)?.to_string(),
        kind: rec.code(p.kind.parse())?,
        plate: validate_plate(&rec, &p.plate)?,
    })
}

fn validate_edge_point(rec: &Record, p: &RawEdgePoint) -> KernelResult<EdgePoint> {
    Ok(match p {
        RawEdgePoint::Station { line, station } => EdgePoint::Station {
            line: rec.non_empty("Line", line)?.to_string(),
            station: rec.non_empty("Station", station)?.to_string(),
        },
        RawEdgePoint::Coord { x, y, z } => EdgePoint::Coord(Point3::new(
            rec.finite("X", *x)?,
            rec.finite("Y", *y)?,
            rec.finite("Z", *z)?,
        )),
        RawEdgePoint::Array([x, y, z]) => EdgePoint::Coord(Point3::new(
            rec.finite("X", *x)?,
            rec.finite("Y", *y)?,
            rec.finite("Z", *z)?,
        )),
    })
}

fn validate_edge(rec: &Record, side: &str, points: &[RawEdgePoint]) -> KernelResult<Vec<EdgePoint>> {
    let erec = rec.child(side);
    if points.len() < 2 {
        return erec.fail(format!("edge needs at least 2 points, got {}", points.len()));
    }
    points
        .iter()
        .map(|p| validate_edge_point(&erec, p))
        .collect()
}

fn validate_part(rec: &Record, p: &RawPart, last: bool) -> KernelResult<Part> {
    let height = match (p.height, last) {
        (Some(_), true) => return rec.fail("the last part takes the remaining height; omit Height"),
        (None, false) => return rec.fail("Height is required for every part but the last"),
        (Some(h), false) => Some(rec.positive("Height", h)?),
        (None, true) => None,
    };

    let mut seen = HashSet::new();
    let corners = p
        .corner
        .iter()
        .enumerate()
        .map(|(k, c)| {
            let crec = rec.child(format!("Corner[{k}]"));
            let position: PartCorner = crec.code(c.position.parse())?;
            if !seen.insert(position) {
                return crec.fail(format!("corner {position} given twice"));
            }
            Ok((position, validate_corner_cut(&crec, c)?))
        })
        .collect::<KernelResult<Vec<_>>>()?;

    let slots = p
        .slot
        .iter()
        .enumerate()
        .map(|(k, s)| {
            let srec = rec.child(format!("Slot[{k}]"));
            Ok(SlotSpec {
                side: srec.code(s.side.parse())?,
                rib: srec.non_empty("Rib", &s.rib)?.to_string(),
                position: srec.non_negative("Position", s.position)?,
                clearance: srec.non_negative("Clearance", s.clearance)?,
            })
        })
        .collect::<KernelResult<Vec<_>>>()?;

    let cutouts = p
        .cutout
        .iter()
        .enumerate()
        .map(|(k, c)| {
            let crec = rec.child(format!("Cutout[{k}]"));
            let direction = Vector2::new(
                crec.finite("Direction", c.direction[0])?,
                crec.finite("Direction", c.direction[1])?,
            );
            if direction.norm() == 0.0 {
                return crec.fail("Direction is a zero vector");
            }
            Ok(CutoutSpec {
                width: crec.positive("Width", c.width)?,
                height: crec.positive("Height", c.height)?,
                direction: direction.normalize(),
                pitch: crec.code(c.pitch.parse())?,
                offset: Vector2::new(
                    crec.finite("Offset", c.offset[0])?,
                    crec.finite("Offset", c.offset[1])?,
                ),
            })
        })
        .collect::<KernelResult<Vec<_>>>()?;

    let stiffeners = p
        .stiffener
        .iter()
        .enumerate()
        .map(|(k, s)| {
            let srec = rec.child(format!("Stiffener[{k}]"));
            Ok(StiffenerSpec {
                rib: srec.non_empty("Rib", &s.rib)?.to_string(),
                from: EdgeRef {
                    side: srec.code(s.from.side.parse())?,
                    index: s.from.index,
                },
                to: EdgeRef {
                    side: srec.code(s.to.side.parse())?,
                    index: s.to.index,
                },
                face: srec.code(s.face.parse())?,
            })
        })
        .collect::<KernelResult<Vec<_>>>()?;

    let flanges = p
        .flange
        .iter()
        .enumerate()
        .map(|(k, f)| {
            let frec = rec.child(format!("Flange[{k}]"));
            let corners = f
                .corner
                .iter()
                .enumerate()
                .map(|(m, c)| {
                    let crec = frec.child(format!("Corner[{m}]"));
                    let end: JointEnd = crec.code(c.position.parse())?;
                    Ok((end, validate_corner_cut(&crec, c)?))
                })
                .collect::<KernelResult<Vec<_>>>()?;
            Ok(FlangeSpec {
                edge: frec.code(f.edge.parse())?,
                shape: frec.code(f.shape.parse())?,
                width: frec.positive("Width", f.width)?,
                thick: frec.positive("Thick", f.thick)?,
                corners,
                joints: validate_joint(&frec, &f.joint)?,
            })
        })
        .collect::<KernelResult<Vec<_>>>()?;

    Ok(Part {
        name: rec.non_empty("Name", &p.name)?.to_string(),
        height,
        thick: validate_thickness(rec, "Thick", p.thick)?,
        corners,
        slots,
        joints: validate_joint(rec, &p.joint)?,
        cutouts,
        stiffeners,
        flanges,
    })
}

fn validate_sub_panel(index: usize, s: &RawSubPanel) -> KernelResult<SubPanel> {
    let rec = Record::new("SubPanel", index, &s.name);
    rec.non_empty("Name", &s.name)?;

    let edges = SubPanelEdges {
        top: validate_edge(&rec, "Edge.Top", &s.edge.top)?,
        bottom: validate_edge(&rec, "Edge.Bottom", &s.edge.bottom)?,
        left: validate_edge(&rec, "Edge.Left", &s.edge.left)?,
        right: validate_edge(&rec, "Edge.Right", &s.edge.right)?,
    };

    let side_export = match &s.side_export {
        Some(code) => Some(rec.code(code.parse())?),
        None => None,
    };

    let mut sides = HashSet::new();
    let extend = s
        .extend
        .iter()
        .enumerate()
        .map(|(k, e)| {
            let erec = rec.child(format!("Extend[{k}]"));
            let side: Side = erec.code(e.side.parse())?;
            if !sides.insert(side) {
                return erec.fail(format!("side {side} extended twice"));
            }
            if e.panel.is_empty() || e.panel.len() > 2 {
                return erec.fail(format!(
                    "Panel needs one or two names, got {}",
                    e.panel.len()
                ));
            }
            for name in &e.panel {
                erec.non_empty("Panel", name)?;
            }
            Ok(ExtendSpec {
                side,
                panels: e.panel.clone(),
                gap: erec.non_negative("Gap", e.gap)?,
            })
        })
        .collect::<KernelResult<Vec<_>>>()?;

    if s.part.is_empty() {
        return rec.fail("sub-panel has no parts");
    }
    let parts = s
        .part
        .iter()
        .enumerate()
        .map(|(k, p)| {
            let prec = rec.child(format!("Part[{k}] {}", p.name));
            validate_part(&prec, p, k + 1 == s.part.len())
        })
        .collect::<KernelResult<Vec<_>>>()?;
    unique_names(&format!("SubPanel {} part", s.name), parts.iter().map(|p| p.name.clone()))?;

    Ok(SubPanel {
        name: s.name.clone(),
        container: s.girder.clone().filter(|g| !g.trim().is_empty()),
        edges,
        side_export,
        extend,
        parts,
    })
}

fn validate_holes(rec: &Record, h: &Option<RawHole>) -> KernelResult<Option<HoleSpec>> {
    let Some(h) = h else {
        return Ok(None);
    };
    let hrec = rec.child("Hole");
    Ok(Some(HoleSpec {
        diameter: hrec.positive("Diameter", h.diameter)?,
        edge_distance: hrec.non_negative("EdgeDistance", h.edge_distance)?,
        pitch: hrec.code(h.pitch.parse())?,
    }))
}

fn validate_cross_beam(index: usize, c: &RawCrossBeam) -> KernelResult<CrossBeam> {
    let rec = Record::new(
        "Yokogeta",
        index,
        format!("CB_{}_{}", c.girder.join("_"), c.station),
    );
    let girders = rec.pair("Girder", &c.girder)?;
    if girders[0] == girders[1] {
        return rec.fail("a cross-beam needs two different girders");
    }
    if c.shape.is_empty() {
        return rec.fail("cross-beam has no shapes");
    }
    let shapes = c
        .shape
        .iter()
        .enumerate()
        .map(|(k, s)| {
            let srec = rec.child(format!("Shape[{k}] {}", s.name));
            Ok(Shape {
                name: srec.non_empty("Name", &s.name)?.to_string(),
                section: srec.non_empty("Section", &s.section)?.to_string(),
                reference: srec.code(s.reference.parse())?,
                offset: srec.finite("Offset", s.offset)?,
                holes: validate_holes(&srec, &s.hole)?,
            })
        })
        .collect::<KernelResult<Vec<_>>>()?;
    unique_names("Yokogeta shape", shapes.iter().map(|s| s.name.clone()))?;

    Ok(CrossBeam {
        girders,
        station: rec.non_empty("Station", &c.station)?.to_string(),
        length: match c.length {
            Some(l) => Some(rec.positive("Length", l)?),
            None => None,
        },
        shapes,
    })
}

fn validate_diagonal(index: usize, d: &RawDiagonalBracing) -> KernelResult<DiagonalBracing> {
    let rec = Record::new("Taikeikou", index, &d.name);
    let girders = rec.pair("Girder", &d.girder)?;
    if girders[0] == girders[1] {
        return rec.fail("a bracing frame needs two different girders");
    }
    let [tl, tr, bl, br] = d.modifier;
    Ok(DiagonalBracing {
        name: rec.non_empty("Name", &d.name)?.to_string(),
        girders,
        station: rec.non_empty("Station", &d.station)?.to_string(),
        kind: rec.code(d.kind.parse())?,
        modifiers: CornerModifiers {
            top_left: rec.finite("Modifier", tl)?,
            top_right: rec.finite("Modifier", tr)?,
            bottom_left: rec.finite("Modifier", bl)?,
            bottom_right: rec.finite("Modifier", br)?,
        },
        cut_offset: rec.non_negative("CutOffset", d.cut_offset)?,
        chord: rec.non_empty("Chord", &d.chord)?.to_string(),
        diagonal: rec.non_empty("Diagonal", &d.diagonal)?.to_string(),
        holes: validate_holes(&rec, &d.hole)?,
    })
}

fn validate_lateral(rec: &Record, l: &RawLateralBracing) -> KernelResult<LateralBracing> {
    let lines = rec.pair("Line", &l.line)?;
    let stations = rec.pair("Station", &l.station)?;
    if stations[0] == stations[1] {
        return rec.fail("lateral bracing needs two different stations");
    }
    Ok(LateralBracing {
        name: rec.non_empty("Name", &l.name)?.to_string(),
        lines,
        stations,
        pattern: rec.code(l.pattern.parse())?,
        offset: (rec.finite("Offset", l.offset[0])?, rec.finite("Offset", l.offset[1])?),
        section: rec.non_empty("Section", &l.section)?.to_string(),
        holes: validate_holes(rec, &l.hole)?,
    })
}

fn validate_gusset(index: usize, g: &RawGusset) -> KernelResult<GussetSpec> {
    let rec = Record::new("Gusset", index, format!("{}-Guss{}", g.panel, g.position));
    let [top, bottom, left, right] = g.mep;
    Ok(GussetSpec {
        panel: rec.non_empty("Panel", &g.panel)?.to_string(),
        member: rec.non_empty("Member", &g.member)?.to_string(),
        position: rec.code(g.position.parse())?,
        edge_offset: rec.code(g.edge_offset.parse())?,
        margins: Margins {
            top: rec.finite("Mep", top)?,
            bottom: rec.finite("Mep", bottom)?,
            left: rec.finite("Mep", left)?,
            right: rec.finite("Mep", right)?,
        },
        thick: rec.positive("Thick", g.thick)?,
        stiffener: match &g.stiffener {
            Some(p) => Some(validate_edge_point(&rec.child("Stiffener"), p)?),
            None => None,
        },
    })
}

fn validate_catalog(raw: &RawBridge) -> KernelResult<Catalog> {
    let sections = raw
        .member_data
        .iter()
        .enumerate()
        .map(|(i, s)| {
            let rec = Record::new("MemberData", i, &s.name);
            let kind: SectionKind = rec.code(s.kind.parse())?;
            let height = rec.positive("Height", s.height)?;
            let width = rec.positive("Width", s.width)?;
            let (web, flange) = match kind {
                SectionKind::Plate => (
                    rec.non_negative("Web", s.web)?,
                    rec.non_negative("Flange", s.flange)?,
                ),
                _ => (rec.positive("Web", s.web)?, rec.positive("Flange", s.flange)?),
            };
            let flanges = match kind {
                SectionKind::I | SectionKind::Channel => 2.0,
                SectionKind::Tee | SectionKind::Angle => 1.0,
                SectionKind::Plate => 0.0,
            };
            if flanges * flange >= height || (kind != SectionKind::Plate && web >= width) {
                return rec.fail("plate thicknesses do not fit inside the section");
            }
            Ok(SectionData {
                name: rec.non_empty("Name", &s.name)?.to_string(),
                kind,
                height,
                width,
                web,
                flange,
            })
        })
        .collect::<KernelResult<Vec<_>>>()?;
    unique_names("MemberData", sections.iter().map(|s| s.name.clone()))?;

    let splices = raw
        .member_spl
        .iter()
        .enumerate()
        .map(|(i, s)| {
            let rec = Record::new("MemberSPL", i, &s.name);
            Ok(SplicePlate {
                name: rec.non_empty("Name", &s.name)?.to_string(),
                thick: rec.positive("Thick", s.thick)?,
                edge_distance: rec.positive("EdgeDistance", s.edge_distance)?,
                pitch: rec.code(s.pitch.parse())?,
                clearance: rec.non_negative("Clearance", s.clearance)?,
                side: rec.code(s.side.parse())?,
            })
        })
        .collect::<KernelResult<Vec<_>>>()?;
    unique_names("MemberSPL", splices.iter().map(|s| s.name.clone()))?;

    let ribs = raw
        .member_rib
        .iter()
        .enumerate()
        .map(|(i, r)| {
            let rec = Record::new("MemberRib", i, &r.name);
            Ok(Rib {
                name: rec.non_empty("Name", &r.name)?.to_string(),
                thick: rec.positive("Thick", r.thick)?,
                height: rec.positive("Height", r.height)?,
            })
        })
        .collect::<KernelResult<Vec<_>>>()?;
    unique_names("MemberRib", ribs.iter().map(|r| r.name.clone()))?;

    Ok(Catalog::new(sections, splices, ribs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::codes::{CornerCutKind, EdgeOffsetKind, PanelKind};
    use serde_json::json;

    fn raw(value: serde_json::Value) -> RawBridge {
        serde_json::from_value(value).unwrap()
    }

    fn base() -> serde_json::Value {
        json!({
            "Infor": [{ "NameBridge": "Test", "SideExport": "TopOnly" }],
            "Senkei": [
                { "Name": "L1", "Point": [
                    { "Name": "S1", "X": 0.0, "Y": 0.0, "Z": 0.0 },
                    { "Name": "S2", "X": 1000.0, "Y": 0.0, "Z": 0.0 }
                ]},
                { "Name": "L2", "Point": [
                    { "Name": "S1", "X": 0.0, "Y": 0.0, "Z": -500.0 },
                    { "Name": "S2", "X": 1000.0, "Y": 0.0, "Z": -500.0 }
                ]}
            ],
            "MainPanel": [{
                "Girder": "G1", "Block": "B1", "Type": "W",
                "Line": ["L1", "L2"], "Station": ["S1", "S2"], "Thick": [6.0, 6.0],
                "Corner": [{ "Position": "SL", "Type": "T", "D1": 30.0 }]
            }]
        })
    }

    #[test]
    fn test_valid_minimal() {
        let spec = validate(&raw(base()), &Tolerance::default()).unwrap();
        assert_eq!(spec.name, "Test");
        assert_eq!(spec.side_export, SideExport::TopOnly);
        assert_eq!(spec.lines.len(), 2);
        let panel = &spec.main_panels[0];
        assert_eq!(panel.name(), "G1B1W");
        assert_eq!(panel.kind, PanelKind::Web);
        let (corner, cut) = panel.plate.corners[0];
        assert_eq!(corner, PanelCorner::StartLeft);
        assert_eq!(cut.kind, CornerCutKind::Triangle);
        assert_eq!(cut.d2, 30.0);
    }

    #[test]
    fn test_bad_code_names_record() {
        let mut value = base();
        value["MainPanel"][0]["Type"] = json!("XX");
        let err = validate(&raw(value), &Tolerance::default()).unwrap_err();
        match err {
            KernelError::InvalidSpec { record, reason } => {
                assert!(record.starts_with("MainPanel[0]"));
                assert!(reason.contains("panel type"));
            }
            other => panic!("unexpected error {other}"),
        }
    }

    #[test]
    fn test_decreasing_chainage_rejected() {
        let mut value = base();
        value["Senkei"][0]["Point"][1]["X"] = json!(-10.0);
        let err = validate(&raw(value), &Tolerance::default()).unwrap_err();
        assert!(err.to_string().contains("chainage"));
    }

    #[test]
    fn test_zero_thickness_rejected() {
        let mut value = base();
        value["MainPanel"][0]["Thick"] = json!([0.0, 0.0]);
        assert!(validate(&raw(value), &Tolerance::default()).is_err());
    }

    #[test]
    fn test_duplicate_panel_rejected() {
        let mut value = base();
        let panel = value["MainPanel"][0].clone();
        value["MainPanel"].as_array_mut().unwrap().push(panel);
        let err = validate(&raw(value), &Tolerance::default()).unwrap_err();
        assert!(err.to_string().contains("duplicate"));
    }

    #[test]
    fn test_part_heights() {
        let mut value = base();
        value["SubPanel"] = json!([{
            "Name": "D1",
            "Edge": {
                "Top": [[0.0, 0.0, 0.0], [0.0, 1000.0, 0.0]],
                "Bottom": [[0.0, 0.0, -800.0], [0.0, 1000.0, -800.0]],
                "Left": [[0.0, 0.0, 0.0], [0.0, 0.0, -800.0]],
                "Right": [[0.0, 1000.0, 0.0], [0.0, 1000.0, -800.0]]
            },
            "Part": [
                { "Name": "P1", "Height": 300.0, "Thick": [5.0, 5.0] },
                { "Name": "P2", "Thick": [5.0, 5.0] }
            ]
        }]);
        let spec = validate(&raw(value.clone()), &Tolerance::default()).unwrap();
        assert_eq!(spec.sub_panels[0].parts[1].height, None);

        value["SubPanel"][0]["Part"][1]["Height"] = json!(200.0);
        assert!(validate(&raw(value), &Tolerance::default()).is_err());
    }

    #[test]
    fn test_gusset_and_catalog() {
        let mut value = base();
        value["Gusset"] = json!([{
            "Panel": "G1B1W", "Member": "LB1_1", "Position": "TL",
            "EdgeOffset": "B40", "Mep": [10, 10, 10, 10], "Thick": 12.0
        }]);
        value["MemberData"] = json!([
            { "Name": "L100", "Type": "L", "Height": 100, "Width": 100, "Web": 10, "Flange": 10 }
        ]);
        let spec = validate(&raw(value.clone()), &Tolerance::default()).unwrap();
        assert_eq!(spec.gussets[0].name(), "G1B1W-GussTL");
        assert_eq!(spec.gussets[0].edge_offset.kind, EdgeOffsetKind::BoltLine);
        assert!(spec.catalog.section("L100").is_ok());

        value["MemberData"][0]["Web"] = json!(0.0);
        assert!(validate(&raw(value), &Tolerance::default()).is_err());
    }
}
