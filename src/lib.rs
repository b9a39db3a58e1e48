// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Girderkit
//!
//! Parametric geometry kernel for steel plate-girder bridges. Reads a JSON
//! bridge description (alignment lines, girder panels, sub-panels, cross
//! members, gussets and catalogs), builds one closed solid per member and
//! writes the result as an IFC4X3 document with STL and glTF previews.

pub mod alignment;
pub mod assembly;
pub mod cli;
pub mod config;
pub mod context;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod io;
pub mod kernel;
pub mod solid;
pub mod spec;

pub use alignment::Alignment;
pub use assembly::{BridgeBuilder, BuildReport, BuiltElement, MemberFailure, MemberKind};
pub use config::{FailurePolicy, KernelConfig, Tolerance};
pub use context::{BuildContext, SideExport};
pub use error::{KernelError, KernelResult};
pub use geometry::Mesh;
pub use io::{export_gltf, export_ifc, export_report, export_stl};
pub use kernel::Kernel;
pub use solid::{Document, ElementClass, MeshBackend, SolidBackend};
pub use spec::{load_bridge, load_bridge_str, BridgeSpec};

use anyhow::Result;
use std::path::Path;

/// Main entry point: load a bridge description file and build its document
pub fn build_file(path: impl AsRef<Path>) -> Result<(Document, BuildReport)> {
    Kernel::default().build_file(path)
}
