// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Input records exactly as they appear in the JSON bridge description.
//!
//! Codes stay strings here; [`super::validate`] turns them into the typed model.

use serde::{Deserialize, Serialize};

/// Top-level input record
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct RawBridge {
    pub infor: Option<RawInforField>,
    pub senkei: Vec<RawLine>,
    pub main_panel: Vec<RawMainPanel>,
    pub sub_panel: Vec<RawSubPanel>,
    pub taikeikou: Vec<RawDiagonalBracing>,
    pub yokokou: Vec<RawLateralBracing>,
    #[serde(rename = "Yokokou_LateralBracing")]
    pub yokokou_lateral_bracing: Vec<RawLateralBracing>,
    pub yokogeta: Vec<RawCrossBeam>,
    pub shouban: Vec<RawDeck>,
    pub gusset: Vec<RawGusset>,
    #[serde(rename = "MemberSPL")]
    pub member_spl: Vec<RawSplice>,
    pub member_rib: Vec<RawRib>,
    pub member_data: Vec<RawSection>,
}

/// `Infor` is written either as one object or as a one-element array
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawInforField {
    One(RawInfor),
    Many(Vec<RawInfor>),
}

impl RawInforField {
    pub fn first(&self) -> Option<&RawInfor> {
        match self {
            RawInforField::One(infor) => Some(infor),
            RawInforField::Many(list) => list.first(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct RawInfor {
    pub name_bridge: String,
    pub side_export: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawLine {
    pub name: String,
    pub point: Vec<RawStation>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawStation {
    pub name: String,
    #[serde(rename = "X")]
    pub x: f64,
    #[serde(rename = "Y")]
    pub y: f64,
    #[serde(rename = "Z")]
    pub z: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawBreak {
    pub length: Vec<f64>,
    #[serde(default)]
    pub thick: Vec<[f64; 2]>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawCorner {
    pub position: String,
    #[serde(rename = "Type")]
    pub kind: String,
    #[serde(rename = "D1")]
    pub d1: f64,
    #[serde(rename = "D2")]
    pub d2: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct RawJoint {
    pub start: Option<String>,
    pub end: Option<String>,
}

/// Fields shared by main panels and deck plates
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawPlate {
    pub line: Vec<String>,
    pub station: Vec<String>,
    pub thick: [f64; 2],
    #[serde(rename = "Break", default)]
    pub break_spec: Option<RawBreak>,
    #[serde(default)]
    pub corner: Vec<RawCorner>,
    #[serde(default)]
    pub joint: RawJoint,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawMainPanel {
    pub girder: String,
    pub block: String,
    #[serde(rename = "Type")]
    pub kind: String,
    #[serde(flatten)]
    pub plate: RawPlate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawDeck {
    pub name: String,
    #[serde(flatten)]
    pub plate: RawPlate,
}

/// Sub-panel edge point
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawEdgePoint {
    Station {
        #[serde(rename = "Line")]
        line: String,
        #[serde(rename = "Station")]
        station: String,
    },
    Coord {
        #[serde(rename = "X")]
        x: f64,
        #[serde(rename = "Y")]
        y: f64,
        #[serde(rename = "Z")]
        z: f64,
    },
    Array([f64; 3]),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct RawEdges {
    pub top: Vec<RawEdgePoint>,
    pub bottom: Vec<RawEdgePoint>,
    pub left: Vec<RawEdgePoint>,
    pub right: Vec<RawEdgePoint>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawExtend {
    pub side: String,
    pub panel: Vec<String>,
    #[serde(default)]
    pub gap: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawSlot {
    pub side: String,
    pub rib: String,
    pub position: f64,
    #[serde(default)]
    pub clearance: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawCutout {
    pub width: f64,
    pub height: f64,
    #[serde(default = "default_direction")]
    pub direction: [f64; 2],
    #[serde(default)]
    pub pitch: String,
    #[serde(default)]
    pub offset: [f64; 2],
}

fn default_direction() -> [f64; 2] {
    [1.0, 0.0]
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawEdgeRef {
    pub side: String,
    pub index: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawStiffener {
    pub rib: String,
    pub from: RawEdgeRef,
    pub to: RawEdgeRef,
    #[serde(default = "default_face")]
    pub face: String,
}

fn default_face() -> String {
    "A".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawFlange {
    pub edge: String,
    #[serde(default = "default_flange_shape")]
    pub shape: String,
    pub width: f64,
    pub thick: f64,
    #[serde(default)]
    pub corner: Vec<RawCorner>,
    #[serde(default)]
    pub joint: RawJoint,
}

fn default_flange_shape() -> String {
    "PL".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawPart {
    pub name: String,
    #[serde(default)]
    pub height: Option<f64>,
    pub thick: [f64; 2],
    #[serde(default)]
    pub corner: Vec<RawCorner>,
    #[serde(default)]
    pub slot: Vec<RawSlot>,
    #[serde(default)]
    pub joint: RawJoint,
    #[serde(default)]
    pub cutout: Vec<RawCutout>,
    #[serde(default)]
    pub stiffener: Vec<RawStiffener>,
    #[serde(default)]
    pub flange: Vec<RawFlange>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawSubPanel {
    pub name: String,
    #[serde(default)]
    pub girder: Option<String>,
    pub edge: RawEdges,
    #[serde(default)]
    pub side_export: Option<String>,
    #[serde(default)]
    pub extend: Vec<RawExtend>,
    pub part: Vec<RawPart>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawHole {
    pub diameter: f64,
    pub edge_distance: f64,
    #[serde(default)]
    pub pitch: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawShape {
    pub name: String,
    pub section: String,
    #[serde(default = "default_reference")]
    pub reference: String,
    #[serde(default)]
    pub offset: f64,
    #[serde(default)]
    pub hole: Option<RawHole>,
}

fn default_reference() -> String {
    "Top".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawCrossBeam {
    pub girder: Vec<String>,
    pub station: String,
    #[serde(default)]
    pub length: Option<f64>,
    pub shape: Vec<RawShape>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawDiagonalBracing {
    pub name: String,
    pub girder: Vec<String>,
    pub station: String,
    #[serde(rename = "Type")]
    pub kind: String,
    /// Corner modifiers in TL, TR, BL, BR order
    #[serde(default)]
    pub modifier: [f64; 4],
    #[serde(default)]
    pub cut_offset: f64,
    pub chord: String,
    pub diagonal: String,
    #[serde(default)]
    pub hole: Option<RawHole>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawLateralBracing {
    pub name: String,
    pub line: Vec<String>,
    pub station: Vec<String>,
    #[serde(default = "default_pattern")]
    pub pattern: String,
    #[serde(default)]
    pub offset: [f64; 2],
    pub section: String,
    #[serde(default)]
    pub hole: Option<RawHole>,
}

fn default_pattern() -> String {
    "Single".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawGusset {
    pub panel: String,
    pub member: String,
    pub position: String,
    pub edge_offset: String,
    /// Edge margins in top, bottom, left, right order
    #[serde(default)]
    pub mep: [f64; 4],
    pub thick: f64,
    #[serde(default)]
    pub stiffener: Option<RawEdgePoint>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawSplice {
    pub name: String,
    pub thick: f64,
    pub edge_distance: f64,
    #[serde(default)]
    pub pitch: String,
    #[serde(default)]
    pub clearance: f64,
    #[serde(default = "default_plate_side")]
    pub side: String,
}

fn default_plate_side() -> String {
    "AF".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawRib {
    pub name: String,
    pub thick: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawSection {
    pub name: String,
    #[serde(rename = "Type")]
    pub kind: String,
    pub height: f64,
    pub width: f64,
    #[serde(default)]
    pub web: f64,
    #[serde(default)]
    pub flange: f64,
}
