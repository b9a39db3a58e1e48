// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Section, splice-plate and rib catalogs

use super::codes::{Pitch, PlateSide, SectionKind};
use crate::error::{KernelError, KernelResult};
use crate::geometry::Point2;
use std::collections::HashMap;

/// Steel section (`MemberData`)
#[derive(Debug, Clone, PartialEq)]
pub struct SectionData {
    pub name: String,
    pub kind: SectionKind,
    pub height: f64,
    pub width: f64,
    /// Web thickness
    pub web: f64,
    /// Flange thickness
    pub flange: f64,
}

impl SectionData {
    /// Closed outline in section coordinates: `x` across the width centred on 0,
    /// `y` from the bottom fibre (0) to the top fibre (`height`).
    pub fn profile(&self) -> Vec<Point2> {
        let (h, b, tw, tf) = (self.height, self.width, self.web, self.flange);
        let hb = b / 2.0;
        let ht = tw / 2.0;
        let pts: Vec<(f64, f64)> = match self.kind {
            SectionKind::Plate => vec![(-hb, 0.0), (hb, 0.0), (hb, h), (-hb, h)],
            SectionKind::I => vec![
                (-hb, 0.0),
                (hb, 0.0),
                (hb, tf),
                (ht, tf),
                (ht, h - tf),
                (hb, h - tf),
                (hb, h),
                (-hb, h),
                (-hb, h - tf),
                (-ht, h - tf),
                (-ht, tf),
                (-hb, tf),
            ],
            SectionKind::Tee => vec![
                (-ht, 0.0),
                (ht, 0.0),
                (ht, h - tf),
                (hb, h - tf),
                (hb, h),
                (-hb, h),
                (-hb, h - tf),
                (-ht, h - tf),
            ],
            // vertical leg on the -x side, horizontal leg at the bottom
            SectionKind::Angle => vec![
                (-hb, 0.0),
                (hb, 0.0),
                (hb, tf),
                (-hb + tw, tf),
                (-hb + tw, h),
                (-hb, h),
            ],
            // web on the -x side, flanges pointing to +x
            SectionKind::Channel => vec![
                (-hb, 0.0),
                (hb, 0.0),
                (hb, tf),
                (-hb + tw, tf),
                (-hb + tw, h - tf),
                (hb, h - tf),
                (hb, h),
                (-hb, h),
            ],
        };
        pts.into_iter().map(|(x, y)| Point2::new(x, y)).collect()
    }
}

/// Splice plate (`MemberSPL`)
#[derive(Debug, Clone, PartialEq)]
pub struct SplicePlate {
    pub name: String,
    pub thick: f64,
    /// Distance from the plate edge to the first bolt row, and from the last row to the joint
    pub edge_distance: f64,
    /// Bolt row spacing on each side of the joint
    pub pitch: Pitch,
    /// Gap kept between the splice plate ends and the ends of the joint edge
    pub clearance: f64,
    pub side: PlateSide,
}

impl SplicePlate {
    /// Connection length on one side of the joint
    pub fn half_width(&self) -> f64 {
        2.0 * self.edge_distance + self.pitch.total()
    }
}

/// Rib / stiffener plate (`MemberRib`)
#[derive(Debug, Clone, PartialEq)]
pub struct Rib {
    pub name: String,
    pub thick: f64,
    /// Outstand from the plate face
    pub height: f64,
}

/// All catalogs, indexed by entry name
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    sections: HashMap<String, SectionData>,
    splices: HashMap<String, SplicePlate>,
    ribs: HashMap<String, Rib>,
}

impl Catalog {
    pub fn new(
        sections: impl IntoIterator<Item = SectionData>,
        splices: impl IntoIterator<Item = SplicePlate>,
        ribs: impl IntoIterator<Item = Rib>,
    ) -> Self {
        Self {
            sections: sections.into_iter().map(|s| (s.name.clone(), s)).collect(),
            splices: splices.into_iter().map(|s| (s.name.clone(), s)).collect(),
            ribs: ribs.into_iter().map(|r| (r.name.clone(), r)).collect(),
        }
    }

    pub fn section(&self, name: &str) -> KernelResult<&SectionData> {
        self.sections
            .get(name)
            .ok_or_else(|| KernelError::MissingCatalogEntry {
                catalog: "MemberData",
                name: name.to_string(),
            })
    }

    pub fn splice(&self, name: &str) -> KernelResult<&SplicePlate> {
        self.splices
            .get(name)
            .ok_or_else(|| KernelError::MissingCatalogEntry {
                catalog: "MemberSPL",
                name: name.to_string(),
            })
    }

    pub fn rib(&self, name: &str) -> KernelResult<&Rib> {
        self.ribs
            .get(name)
            .ok_or_else(|| KernelError::MissingCatalogEntry {
                catalog: "MemberRib",
                name: name.to_string(),
            })
    }
}
