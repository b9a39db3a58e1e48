// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Alignment model: named alignment lines and station lookup.
//!
//! Every member engine resolves its geometry through [`Alignment`]; nothing
//! else reads raw station coordinates.

use crate::config::Tolerance;
use crate::context::BridgeAxis;
use crate::error::{KernelError, KernelResult};
use crate::geometry::{Point3, RuledStrip, Vector3};
use crate::spec::{AlignmentLine, EdgePoint};
use std::collections::HashMap;

/// One station of a lenient panel boundary; either side may be absent
#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryPair {
    pub station: String,
    pub left: Option<Point3>,
    pub right: Option<Point3>,
}

impl BoundaryPair {
    pub fn is_complete(&self) -> bool {
        self.left.is_some() && self.right.is_some()
    }
}

/// Read-only index of the alignment lines of a bridge
#[derive(Debug, Clone, Default)]
pub struct Alignment {
    lines: Vec<AlignmentLine>,
    index: HashMap<String, usize>,
}

impl Alignment {
    pub fn new(lines: &[AlignmentLine]) -> Self {
        let index = lines
            .iter()
            .enumerate()
            .map(|(i, l)| (l.name.clone(), i))
            .collect();
        Self {
            lines: lines.to_vec(),
            index,
        }
    }

    pub fn line(&self, name: &str) -> KernelResult<&AlignmentLine> {
        self.index
            .get(name)
            .map(|&i| &self.lines[i])
            .ok_or_else(|| KernelError::MissingLine(name.to_string()))
    }

    pub fn lines(&self) -> &[AlignmentLine] {
        &self.lines
    }

    /// Coordinates of station `name` on `line`
    pub fn resolve_station(&self, line: &str, name: &str) -> KernelResult<Point3> {
        self.line(line)?
            .station(name)
            .copied()
            .ok_or_else(|| KernelError::missing_station(line, name))
    }

    /// Point referenced by a sub-panel or gusset edge point
    pub fn resolve_edge_point(&self, point: &EdgePoint) -> KernelResult<Point3> {
        match point {
            EdgePoint::Station { line, station } => self.resolve_station(line, station),
            EdgePoint::Coord(p) => Ok(*p),
        }
    }

    fn station_range<'a>(
        &self,
        line: &'a AlignmentLine,
        from: &str,
        to: &str,
    ) -> KernelResult<&'a [(String, Point3)]> {
        let start = line
            .station_index(from)
            .ok_or_else(|| KernelError::missing_station(&line.name, from))?;
        let end = line
            .station_index(to)
            .ok_or_else(|| KernelError::missing_station(&line.name, to))?;
        if start >= end {
            return Err(KernelError::invalid_spec(
                format!("station range {from}..{to} on `{}`", line.name),
                "the first station must come before the last",
            ));
        }
        Ok(&line.stations[start..=end])
    }

    /// Paired vertex sequences of both boundary lines over `from..=to`.
    ///
    /// Both lines must expose the same station names over the range.
    pub fn resolve_panel_boundary(
        &self,
        lines: &[String; 2],
        from: &str,
        to: &str,
    ) -> KernelResult<RuledStrip> {
        let left_line = self.line(&lines[0])?;
        let right_line = self.line(&lines[1])?;
        let left = self.station_range(left_line, from, to)?;
        let right = self.station_range(right_line, from, to)?;

        let mismatch = |detail: String| KernelError::BoundaryMismatch {
            left: lines[0].clone(),
            right: lines[1].clone(),
            detail,
        };
        if left.len() != right.len() {
            return Err(mismatch(format!(
                "{} stations against {} between {from} and {to}",
                left.len(),
                right.len()
            )));
        }
        if let Some(((l, _), (r, _))) = left.iter().zip(right).find(|((l, _), (r, _))| l != r) {
            return Err(mismatch(format!("station `{l}` pairs with `{r}`")));
        }

        RuledStrip::new(
            left.iter().map(|(_, p)| *p).collect(),
            right.iter().map(|(_, p)| *p).collect(),
        )
    }

    /// Union of the station names of both lines over `from..=to`, ordered by chainage.
    ///
    /// Stations present on only one line leave the other side empty.
    pub fn resolve_panel_boundary_lenient(
        &self,
        lines: &[String; 2],
        from: &str,
        to: &str,
    ) -> KernelResult<Vec<BoundaryPair>> {
        let left_line = self.line(&lines[0])?;
        let right_line = self.line(&lines[1])?;
        let left = self.station_range(left_line, from, to)?;
        let right = self.station_range(right_line, from, to)?;

        let mut pairs: Vec<BoundaryPair> = left
            .iter()
            .map(|(name, p)| BoundaryPair {
                station: name.clone(),
                left: Some(*p),
                right: right.iter().find(|(r, _)| r == name).map(|(_, q)| *q),
            })
            .collect();
        for (name, q) in right {
            if !left.iter().any(|(l, _)| l == name) {
                pairs.push(BoundaryPair {
                    station: name.clone(),
                    left: None,
                    right: Some(*q),
                });
            }
        }

        let chainage = |pair: &BoundaryPair| pair.left.or(pair.right).map_or(0.0, |p| p.x);
        pairs.sort_by(|a, b| chainage(a).total_cmp(&chainage(b)));
        Ok(pairs)
    }

    /// Bridge origin and horizontal direction from the first line's end stations
    pub fn bridge_axis(&self, tol: &Tolerance) -> BridgeAxis {
        let Some(line) = self.lines.first() else {
            return BridgeAxis::default();
        };
        let (Some((_, first)), Some((_, last))) = (line.stations.first(), line.stations.last())
        else {
            return BridgeAxis::default();
        };
        let mut direction = last - first;
        direction.z = 0.0;
        let len = direction.norm();
        if len <= tol.coincidence {
            return BridgeAxis {
                origin: *first,
                direction: Vector3::x(),
            };
        }
        BridgeAxis {
            origin: *first,
            direction: direction / len,
        }
    }
}
