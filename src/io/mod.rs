// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! I/O module - IFC, STL and glTF exporters and the build report

mod export_gltf;
mod export_ifc;
mod export_stl;
mod report;

pub use export_gltf::export as export_gltf;
pub use export_ifc::{export as export_ifc, global_id, write_ifc};
pub use export_stl::export as export_stl;
pub use report::{export as export_report, load as load_report};
