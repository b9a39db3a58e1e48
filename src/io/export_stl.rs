// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Binary STL preview of the whole document

use crate::geometry::{Mesh, Point3, Vector3};
use crate::solid::Document;
use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use stl_io::{Normal, Triangle as StlTriangle, Vertex as StlVertex};

fn stl_triangles(mesh: &Mesh) -> impl Iterator<Item = StlTriangle> + '_ {
    mesh.triangles.iter().map(move |tri| {
        let [p0, p1, p2] = mesh.triangle_positions(tri);
        let normal = (p1 - p0).cross(&(p2 - p0)).try_normalize(0.0).unwrap_or_else(Vector3::zeros);
        let vertex = |p: Point3| StlVertex::new([p.x as f32, p.y as f32, p.z as f32]);
        StlTriangle {
            normal: Normal::new([normal.x as f32, normal.y as f32, normal.z as f32]),
            vertices: [vertex(p0), vertex(p1), vertex(p2)],
        }
    })
}

/// Export every element of `document` into one binary STL file
pub fn export(document: &Document, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let triangles: Vec<StlTriangle> = document
        .elements()
        .iter()
        .flat_map(|element| stl_triangles(&element.solid))
        .collect();

    let file = File::create(path)
        .with_context(|| format!("Failed to create STL file: {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    stl_io::write_stl(&mut writer, triangles.iter()).context("Failed to write STL file")?;
    writer.flush().context("Failed to write STL file")?;
    Ok(())
}
