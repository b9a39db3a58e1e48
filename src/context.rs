// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Per-build state threaded through every engine call

use crate::config::{BuildOptions, FailurePolicy, KernelConfig, Tolerance};
use crate::geometry::{Point3, Vector3};
use serde::{Deserialize, Serialize};
use tracing::Span;

/// Which thickness-direction half of a plate is materialized
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SideExport {
    /// `[-thick.f, +thick.a]`
    #[default]
    Both,
    /// `[0, +thick.a]`
    TopOnly,
    /// `[-thick.f, 0]`
    BottomOnly,
}

impl SideExport {
    /// Signed offsets of the two plate faces for thicknesses `a` (face A) and `f` (face F)
    pub fn face_offsets(self, a: f64, f: f64) -> (f64, f64) {
        match self {
            SideExport::Both => (a, -f),
            SideExport::TopOnly => (a, 0.0),
            SideExport::BottomOnly => (0.0, -f),
        }
    }
}

/// Origin and horizontal unit direction of the bridge
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BridgeAxis {
    pub origin: Point3,
    pub direction: Vector3,
}

impl Default for BridgeAxis {
    fn default() -> Self {
        Self {
            origin: Point3::origin(),
            direction: Vector3::x(),
        }
    }
}

impl BridgeAxis {
    /// Horizontal unit vector pointing left of the chainage direction
    pub fn transverse(&self) -> Vector3 {
        Vector3::z().cross(&self.direction)
    }
}

/// Immutable build context shared by all member engines
#[derive(Debug, Clone)]
pub struct BuildContext {
    pub tolerance: Tolerance,
    pub axis: BridgeAxis,
    /// Default for sub-panels without their own value
    pub side_export: SideExport,
    pub options: BuildOptions,
}

impl BuildContext {
    pub fn new(config: &KernelConfig, axis: BridgeAxis, side_export: SideExport) -> Self {
        Self {
            tolerance: config.tolerance,
            axis,
            side_export,
            options: config.build.clone(),
        }
    }

    pub fn failure_policy(&self) -> FailurePolicy {
        self.options.failure_policy
    }

    /// Tracing span wrapping the construction of one member
    pub fn member_span(&self, kind: &'static str, name: &str) -> Span {
        tracing::info_span!("member", kind, name = %name)
    }
}

impl Default for BuildContext {
    fn default() -> Self {
        Self::new(&KernelConfig::default(), BridgeAxis::default(), SideExport::Both)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_face_offsets() {
        assert_eq!(SideExport::Both.face_offsets(9.0, 6.0), (9.0, -6.0));
        assert_eq!(SideExport::TopOnly.face_offsets(9.0, 6.0), (9.0, 0.0));
        assert_eq!(SideExport::BottomOnly.face_offsets(9.0, 6.0), (0.0, -6.0));
    }

    #[test]
    fn test_transverse_is_left_of_axis() {
        let axis = BridgeAxis::default();
        assert_eq!(axis.transverse(), Vector3::y());
    }
}
