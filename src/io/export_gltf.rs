// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! glTF/GLB preview exporter: one named node and mesh per element

use crate::geometry::Mesh;
use crate::solid::Document;
use anyhow::{Context, Result};
use serde_json::{json, Value};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

const ARRAY_BUFFER: u32 = 34962;
const ELEMENT_ARRAY_BUFFER: u32 = 34963;
const FLOAT: u32 = 5126;
const UNSIGNED_INT: u32 = 5125;

/// Export `document` to GLB when the extension is `.glb`, otherwise to glTF
/// with a sibling `.bin` buffer
pub fn export(document: &Document, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let is_glb = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("glb"));
    if is_glb {
        export_glb(document, path)
    } else {
        export_gltf_separate(document, path)
    }
}

/// Export to GLB (binary glTF)
fn export_glb(document: &Document, path: &Path) -> Result<()> {
    let (gltf, buffer_data) = create_gltf_json(document, None);

    let json_string = serde_json::to_string(&gltf)?;
    let json_length = align_to_multiple_of_four(json_string.len());
    let buffer_length = align_to_multiple_of_four(buffer_data.len());
    let total_length = 12 + 8 + json_length + 8 + buffer_length;

    let file = File::create(path)
        .with_context(|| format!("Failed to create GLB file: {}", path.display()))?;
    let mut file = BufWriter::new(file);

    // header
    file.write_all(&0x46546C67u32.to_le_bytes())?; // "glTF"
    file.write_all(&2u32.to_le_bytes())?;
    file.write_all(&(total_length as u32).to_le_bytes())?;

    file.write_all(&(json_length as u32).to_le_bytes())?;
    file.write_all(&0x4E4F534Au32.to_le_bytes())?; // "JSON"
    file.write_all(json_string.as_bytes())?;
    file.write_all(&vec![b' '; json_length - json_string.len()])?;

    file.write_all(&(buffer_length as u32).to_le_bytes())?;
    file.write_all(&0x004E4942u32.to_le_bytes())?; // "BIN\0"
    file.write_all(&buffer_data)?;
    file.write_all(&vec![0u8; buffer_length - buffer_data.len()])?;

    file.flush().context("Failed to write GLB file")?;
    Ok(())
}

/// Export to glTF JSON plus a `.bin` buffer next to it
fn export_gltf_separate(document: &Document, path: &Path) -> Result<()> {
    let bin_path = path.with_extension("bin");
    let uri = bin_path
        .file_name()
        .and_then(|name| name.to_str())
        .context("glTF output path has no file name")?
        .to_string();
    let (gltf, buffer_data) = create_gltf_json(document, Some(uri));

    let json_string = serde_json::to_string_pretty(&gltf)?;
    std::fs::write(path, json_string)
        .with_context(|| format!("Failed to write glTF file: {}", path.display()))?;
    std::fs::write(&bin_path, buffer_data)
        .with_context(|| format!("Failed to write glTF buffer: {}", bin_path.display()))?;
    Ok(())
}

/// Appends one mesh to the buffer and returns its accessor and view records
fn push_mesh(
    mesh: &Mesh,
    buffer_data: &mut Vec<u8>,
    accessors: &mut Vec<Value>,
    views: &mut Vec<Value>,
) -> Value {
    let (min_pos, max_pos) = calculate_bounds(mesh);

    let position_offset = buffer_data.len();
    for vertex in &mesh.vertices {
        for c in [vertex.position.x, vertex.position.y, vertex.position.z] {
            buffer_data.extend_from_slice(&(c as f32).to_le_bytes());
        }
    }
    let normal_offset = buffer_data.len();
    for vertex in &mesh.vertices {
        for c in [vertex.normal.x, vertex.normal.y, vertex.normal.z] {
            buffer_data.extend_from_slice(&(c as f32).to_le_bytes());
        }
    }
    let indices_offset = buffer_data.len();
    for triangle in &mesh.triangles {
        for index in triangle.indices {
            buffer_data.extend_from_slice(&(index as u32).to_le_bytes());
        }
    }
    let end = buffer_data.len();

    let first_view = views.len();
    views.push(json!({
        "buffer": 0, "byteOffset": position_offset,
        "byteLength": normal_offset - position_offset, "target": ARRAY_BUFFER
    }));
    views.push(json!({
        "buffer": 0, "byteOffset": normal_offset,
        "byteLength": indices_offset - normal_offset, "target": ARRAY_BUFFER
    }));
    views.push(json!({
        "buffer": 0, "byteOffset": indices_offset,
        "byteLength": end - indices_offset, "target": ELEMENT_ARRAY_BUFFER
    }));

    let first_accessor = accessors.len();
    accessors.push(json!({
        "bufferView": first_view, "componentType": FLOAT,
        "count": mesh.vertices.len(), "type": "VEC3",
        "min": min_pos, "max": max_pos
    }));
    accessors.push(json!({
        "bufferView": first_view + 1, "componentType": FLOAT,
        "count": mesh.vertices.len(), "type": "VEC3"
    }));
    accessors.push(json!({
        "bufferView": first_view + 2, "componentType": UNSIGNED_INT,
        "count": mesh.triangles.len() * 3, "type": "SCALAR"
    }));

    json!({
        "attributes": { "POSITION": first_accessor, "NORMAL": first_accessor + 1 },
        "indices": first_accessor + 2,
        "mode": 4
    })
}

fn create_gltf_json(document: &Document, uri: Option<String>) -> (Value, Vec<u8>) {
    let mut buffer_data = Vec::new();
    let mut accessors = Vec::new();
    let mut views = Vec::new();
    let mut meshes = Vec::new();
    let mut nodes = Vec::new();

    for (index, element) in document.elements().iter().enumerate() {
        let primitive = push_mesh(&element.solid, &mut buffer_data, &mut accessors, &mut views);
        meshes.push(json!({ "name": element.name, "primitives": [primitive] }));
        nodes.push(json!({
            "name": element.name,
            "mesh": index,
            "extras": { "class": element.class.to_string(), "container": element.container }
        }));
    }

    let mut buffer = json!({ "byteLength": buffer_data.len() });
    if let Some(uri) = uri {
        buffer["uri"] = Value::String(uri);
    }

    // millimetre model coordinates, Z up; glTF is metres, Y up
    let root = json!({
        "name": document.name,
        "children": (0..nodes.len()).collect::<Vec<_>>(),
        "matrix": [
            0.001, 0.0, 0.0, 0.0,
            0.0, 0.0, -0.001, 0.0,
            0.0, 0.001, 0.0, 0.0,
            0.0, 0.0, 0.0, 1.0
        ]
    });
    let root_index = nodes.len();
    nodes.push(root);

    let gltf = json!({
        "asset": { "generator": concat!("girderkit ", env!("CARGO_PKG_VERSION")), "version": "2.0" },
        "scene": 0,
        "scenes": [{ "name": document.name, "nodes": [root_index] }],
        "nodes": nodes,
        "meshes": meshes,
        "accessors": accessors,
        "bufferViews": views,
        "buffers": [buffer]
    });

    (gltf, buffer_data)
}

fn calculate_bounds(mesh: &Mesh) -> ([f32; 3], [f32; 3]) {
    let mut min = [f32::MAX; 3];
    let mut max = [f32::MIN; 3];
    for vertex in &mesh.vertices {
        let p = [
            vertex.position.x as f32,
            vertex.position.y as f32,
            vertex.position.z as f32,
        ];
        for i in 0..3 {
            min[i] = min[i].min(p[i]);
            max[i] = max[i].max(p[i]);
        }
    }
    (min, max)
}

fn align_to_multiple_of_four(n: usize) -> usize {
    (n + 3) & !3
}
