// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Validated, strongly typed bridge model

use super::catalog::Catalog;
use super::codes::{
    BracingType, CornerCutKind, EdgeOffset, FaceSide, FlangeEdge, FlangeShape, GussetPosition,
    JointEnd, LateralPattern, PanelCorner, PanelKind, PartCorner, Pitch, ReferenceLine, Side,
    SideExport,
};
use crate::geometry::{Point3, Vector2};

/// Named 3D polyline indexed by station names, in chainage order
#[derive(Debug, Clone, PartialEq)]
pub struct AlignmentLine {
    pub name: String,
    pub stations: Vec<(String, Point3)>,
}

impl AlignmentLine {
    pub fn station(&self, name: &str) -> Option<&Point3> {
        self.stations
            .iter()
            .find(|(station, _)| station == name)
            .map(|(_, p)| p)
    }

    pub fn station_index(&self, name: &str) -> Option<usize> {
        self.stations.iter().position(|(station, _)| station == name)
    }
}

/// Plate thickness pair: face A lies at `+a`, face F at `-f` along the plate normal
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thickness {
    pub a: f64,
    pub f: f64,
}

impl Thickness {
    pub fn new(a: f64, f: f64) -> Self {
        Self { a, f }
    }

    pub fn total(&self) -> f64 {
        self.a + self.f
    }
}

/// Corner removal, `d1` along the first edge and `d2` along the second
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CornerCut {
    pub kind: CornerCutKind,
    pub d1: f64,
    pub d2: f64,
}

/// Length-wise subdivision of a panel
#[derive(Debug, Clone, PartialEq)]
pub struct BreakSpec {
    pub lengths: Vec<f64>,
    /// One pair per segment; segments without one keep the panel thickness
    pub thicknesses: Vec<Thickness>,
}

/// Splice plates at the start and end of a plate
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JointSpec {
    pub start: Option<String>,
    pub end: Option<String>,
}

impl JointSpec {
    pub fn at(&self, end: JointEnd) -> Option<&str> {
        match end {
            JointEnd::Start => self.start.as_deref(),
            JointEnd::End => self.end.as_deref(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }
}

/// Plate spanning a station range between two alignment lines
#[derive(Debug, Clone, PartialEq)]
pub struct PlateGeometry {
    /// Left and right boundary lines
    pub lines: [String; 2],
    /// First and last station, inclusive
    pub stations: [String; 2],
    pub thick: Thickness,
    pub break_spec: Option<BreakSpec>,
    pub corners: Vec<(PanelCorner, CornerCut)>,
    pub joints: JointSpec,
}

/// Girder web or flange plate (`MainPanel`)
#[derive(Debug, Clone, PartialEq)]
pub struct MainPanel {
    pub girder: String,
    pub block: String,
    pub kind: PanelKind,
    pub plate: PlateGeometry,
}

impl MainPanel {
    /// Element name, e.g. `G1B1W`
    pub fn name(&self) -> String {
        format!("{}{}{}", self.girder, self.block, self.kind)
    }
}

/// Deck plate (`Shouban`)
#[derive(Debug, Clone, PartialEq)]
pub struct Deck {
    pub name: String,
    pub plate: PlateGeometry,
}

/// Sub-panel edge point: a station on an alignment line or an explicit coordinate
#[derive(Debug, Clone, PartialEq)]
pub enum EdgePoint {
    Station { line: String, station: String },
    Coord(Point3),
}

/// The four edge point lists of a sub-panel
#[derive(Debug, Clone, PartialEq)]
pub struct SubPanelEdges {
    /// Left to right
    pub top: Vec<EdgePoint>,
    /// Left to right
    pub bottom: Vec<EdgePoint>,
    /// Top to bottom
    pub left: Vec<EdgePoint>,
    /// Top to bottom
    pub right: Vec<EdgePoint>,
}

/// Extension of one sub-panel side to the face of neighbouring panels
#[derive(Debug, Clone, PartialEq)]
pub struct ExtendSpec {
    pub side: Side,
    /// One or two panel element names
    pub panels: Vec<String>,
    /// Distance kept from the panel face
    pub gap: f64,
}

/// Notch for a rib running through a side of the part
#[derive(Debug, Clone, PartialEq)]
pub struct SlotSpec {
    pub side: Side,
    pub rib: String,
    /// Distance of the rib centre from the start of the side
    pub position: f64,
    pub clearance: f64,
}

/// Row of rectangular holes
#[derive(Debug, Clone, PartialEq)]
pub struct CutoutSpec {
    pub width: f64,
    pub height: f64,
    /// In-plane direction: `x` along the top edge, `y` from top toward bottom
    pub direction: Vector2,
    pub pitch: Pitch,
    /// Offset of the first hole centre from the part centroid, in the same axes
    pub offset: Vector2,
}

/// Reference to vertex `index` of a part edge
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeRef {
    pub side: Side,
    pub index: usize,
}

/// Rib welded between two edge points of a part
#[derive(Debug, Clone, PartialEq)]
pub struct StiffenerSpec {
    pub rib: String,
    pub from: EdgeRef,
    pub to: EdgeRef,
    pub face: FaceSide,
}

/// Plate or angle along the top or bottom edge of a part
#[derive(Debug, Clone, PartialEq)]
pub struct FlangeSpec {
    pub edge: FlangeEdge,
    pub shape: FlangeShape,
    pub width: f64,
    pub thick: f64,
    /// Corner cuts at the start (`Start`) and end (`End`) of the flange
    pub corners: Vec<(JointEnd, CornerCut)>,
    pub joints: JointSpec,
}

/// One stacked piece of a sub-panel
#[derive(Debug, Clone, PartialEq)]
pub struct Part {
    pub name: String,
    /// Height down the left and right edges; `None` takes the remainder
    pub height: Option<f64>,
    pub thick: Thickness,
    pub corners: Vec<(PartCorner, CornerCut)>,
    pub slots: Vec<SlotSpec>,
    pub joints: JointSpec,
    pub cutouts: Vec<CutoutSpec>,
    pub stiffeners: Vec<StiffenerSpec>,
    pub flanges: Vec<FlangeSpec>,
}

/// Diaphragm or cross-frame plate (`SubPanel`)
#[derive(Debug, Clone, PartialEq)]
pub struct SubPanel {
    pub name: String,
    /// Spatial container, usually the girder
    pub container: Option<String>,
    pub edges: SubPanelEdges,
    pub side_export: Option<SideExport>,
    pub extend: Vec<ExtendSpec>,
    pub parts: Vec<Part>,
}

/// Bolt holes at both member ends
#[derive(Debug, Clone, PartialEq)]
pub struct HoleSpec {
    pub diameter: f64,
    pub edge_distance: f64,
    pub pitch: Pitch,
}

impl HoleSpec {
    /// Connection length from the member end: edge, rows, edge
    pub fn connection_length(&self) -> f64 {
        2.0 * self.edge_distance + self.pitch.total()
    }
}

/// One extruded section of a cross member
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    pub name: String,
    pub section: String,
    pub reference: ReferenceLine,
    /// Vertical offset of the reference line from its girder line
    pub offset: f64,
    pub holes: Option<HoleSpec>,
}

/// Transverse beam between two girders (`Yokogeta`)
#[derive(Debug, Clone, PartialEq)]
pub struct CrossBeam {
    pub girders: [String; 2],
    pub station: String,
    /// Explicit span, centred between the webs
    pub length: Option<f64>,
    pub shapes: Vec<Shape>,
}

impl CrossBeam {
    /// Base element name, e.g. `CB_G1_G2_C1`
    pub fn name(&self) -> String {
        format!("CB_{}_{}_{}", self.girders[0], self.girders[1], self.station)
    }
}

/// Distances moving the four frame corners along the webs, positive toward the
/// inside of the frame
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CornerModifiers {
    pub top_left: f64,
    pub top_right: f64,
    pub bottom_left: f64,
    pub bottom_right: f64,
}

/// Cross frame between two girders (`Taikeikou`)
#[derive(Debug, Clone, PartialEq)]
pub struct DiagonalBracing {
    pub name: String,
    pub girders: [String; 2],
    pub station: String,
    pub kind: BracingType,
    pub modifiers: CornerModifiers,
    /// Distance of the gusset cut planes from the web centre planes
    pub cut_offset: f64,
    pub chord: String,
    pub diagonal: String,
    pub holes: Option<HoleSpec>,
}

/// Plan bracing (`Yokokou`, `Yokokou_LateralBracing`)
#[derive(Debug, Clone, PartialEq)]
pub struct LateralBracing {
    pub name: String,
    pub lines: [String; 2],
    pub stations: [String; 2],
    pub pattern: LateralPattern,
    /// Transverse and vertical offset of the member axis
    pub offset: (f64, f64),
    pub section: String,
    pub holes: Option<HoleSpec>,
}

/// Edge margins of a gusset
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Margins {
    pub top: f64,
    pub bottom: f64,
    pub left: f64,
    pub right: f64,
}

/// Connection plate between a panel and a cross member
#[derive(Debug, Clone, PartialEq)]
pub struct GussetSpec {
    /// Main panel element name, e.g. `G1B1UF`
    pub panel: String,
    /// Member element name, e.g. `LB1_1`
    pub member: String,
    pub position: GussetPosition,
    pub edge_offset: EdgeOffset,
    pub margins: Margins,
    pub thick: f64,
    /// Known point on the adjoining stiffener
    pub stiffener: Option<EdgePoint>,
}

impl GussetSpec {
    /// Element name, e.g. `G1B1UF-GussTL`
    pub fn name(&self) -> String {
        format!("{}-Guss{}", self.panel, self.position)
    }
}

/// Validated bridge description
#[derive(Debug, Clone, Default)]
pub struct BridgeSpec {
    pub name: String,
    pub side_export: SideExport,
    pub lines: Vec<AlignmentLine>,
    pub main_panels: Vec<MainPanel>,
    pub decks: Vec<Deck>,
    pub sub_panels: Vec<SubPanel>,
    pub cross_beams: Vec<CrossBeam>,
    pub diagonal_bracings: Vec<DiagonalBracing>,
    pub lateral_bracings: Vec<LateralBracing>,
    pub gussets: Vec<GussetSpec>,
    pub catalog: Catalog,
}

impl BridgeSpec {
    pub fn main_panel(&self, name: &str) -> Option<&MainPanel> {
        self.main_panels.iter().find(|p| p.name() == name)
    }

    /// Number of members the builder will schedule
    pub fn member_count(&self) -> usize {
        self.main_panels.len()
            + self.decks.len()
            + self.sub_panels.len()
            + self.cross_beams.len()
            + self.diagonal_bracings.len()
            + self.lateral_bracings.len()
            + self.gussets.len()
    }
}
