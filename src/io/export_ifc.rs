// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! IFC4X3 STEP physical file writer.
//!
//! Writes a project, a site and the bridge facility. Elements without a
//! container sit directly in the bridge; every container becomes an
//! `IFCBRIDGEPART` aggregated under it. Each element carries one
//! `IFCFACETEDBREP` body built from its mesh triangles. GlobalIds are derived
//! from the bridge and entity names, so rewriting the same document yields the
//! same ids.

use crate::config::ExportOptions;
use crate::geometry::{Mesh, Point3};
use crate::solid::Document;
use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fmt::Write as _;
use std::path::Path;
use tracing::debug;

const IFC_BASE64: &[u8; 64] =
    b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz_$";

/// 22-character IFC GlobalId from the first 128 bits of SHA-256(`seed`)
pub fn global_id(seed: &str) -> String {
    let digest = Sha256::digest(seed.as_bytes());
    let mut bytes = [0u8; 16];
    bytes.copy_from_slice(&digest[..16]);
    let n = u128::from_be_bytes(bytes);

    let mut id = String::with_capacity(22);
    id.push(IFC_BASE64[(n >> 126) as usize] as char);
    for i in 0..21 {
        let shift = 120 - 6 * i;
        id.push(IFC_BASE64[((n >> shift) & 0x3f) as usize] as char);
    }
    id
}

/// STEP string literal, quotes included
fn step_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for c in s.chars() {
        match c {
            '\'' => out.push_str("''"),
            '\\' => out.push_str("\\\\"),
            ' '..='~' => out.push(c),
            c if (c as u32) <= 0xffff => {
                let _ = write!(out, "\\X2\\{:04X}\\X0\\", c as u32);
            }
            c => {
                let _ = write!(out, "\\X4\\{:08X}\\X0\\", c as u32);
            }
        }
    }
    out.push('\'');
    out
}

/// STEP real; always carries a decimal point
fn step_real(v: f64) -> String {
    let v = if v.abs() < 5e-7 { 0.0 } else { v };
    let mut s = format!("{v:.6}");
    while s.ends_with('0') {
        s.pop();
    }
    s
}

fn step_point(p: &Point3) -> String {
    format!("({},{},{})", step_real(p.x), step_real(p.y), step_real(p.z))
}

fn refs(ids: &[usize]) -> String {
    let list: Vec<String> = ids.iter().map(|id| format!("#{id}")).collect();
    format!("({})", list.join(","))
}

/// Entity writer for the DATA section
struct StepWriter {
    data: String,
    next_id: usize,
    seed: String,
}

impl StepWriter {
    fn new(seed: &str) -> Self {
        Self {
            data: String::new(),
            next_id: 1,
            seed: seed.to_string(),
        }
    }

    fn add(&mut self, entity: impl AsRef<str>) -> usize {
        let id = self.next_id;
        self.next_id += 1;
        let _ = writeln!(self.data, "#{id}={};", entity.as_ref());
        id
    }

    fn guid(&self, what: &str) -> String {
        step_string(&global_id(&format!("{}/{}", self.seed, what)))
    }

    fn faceted_brep(&mut self, mesh: &Mesh) -> usize {
        let points: Vec<usize> = mesh
            .vertices
            .iter()
            .map(|v| self.add(format!("IFCCARTESIANPOINT({})", step_point(&v.position))))
            .collect();
        let faces: Vec<usize> = mesh
            .triangles
            .iter()
            .map(|t| {
                let corners = t.indices.map(|i| points[i]);
                let polyloop = self.add(format!("IFCPOLYLOOP({})", refs(&corners)));
                let bound = self.add(format!("IFCFACEOUTERBOUND(#{polyloop},.T.)"));
                self.add(format!("IFCFACE((#{bound}))"))
            })
            .collect();
        let shell = self.add(format!("IFCCLOSEDSHELL({})", refs(&faces)));
        self.add(format!("IFCFACETEDBREP(#{shell})"))
    }
}

/// STEP physical file text for `document`
pub fn write_ifc(document: &Document, options: &ExportOptions, file_name: &str) -> String {
    let timestamp = options
        .timestamp
        .clone()
        .unwrap_or_else(|| chrono::Utc::now().format("%Y-%m-%dT%H:%M:%S").to_string());
    let bridge_name = document.name.as_str();
    let mut w = StepWriter::new(bridge_name);

    let origin = w.add("IFCCARTESIANPOINT((0.,0.,0.))");
    let z_dir = w.add("IFCDIRECTION((0.,0.,1.))");
    let x_dir = w.add("IFCDIRECTION((1.,0.,0.))");
    let placement = w.add(format!("IFCAXIS2PLACEMENT3D(#{origin},#{z_dir},#{x_dir})"));
    let context = w.add(format!(
        "IFCGEOMETRICREPRESENTATIONCONTEXT($,'Model',3,1.E-05,#{placement},$)"
    ));
    let body = w.add(format!(
        "IFCGEOMETRICREPRESENTATIONSUBCONTEXT('Body','Model',*,*,*,*,#{context},$,.MODEL_VIEW.,$)"
    ));
    let length_unit = w.add("IFCSIUNIT(*,.LENGTHUNIT.,.MILLI.,.METRE.)");
    let units = w.add(format!("IFCUNITASSIGNMENT((#{length_unit}))"));
    let project = w.add(format!(
        "IFCPROJECT({},$,{},$,$,$,$,(#{context}),#{units})",
        w.guid("project"),
        step_string(bridge_name)
    ));

    let site_placement = w.add(format!("IFCLOCALPLACEMENT($,#{placement})"));
    let site = w.add(format!(
        "IFCSITE({},$,'Site',$,$,#{site_placement},$,$,.ELEMENT.,$,$,$,$,$)",
        w.guid("site")
    ));
    let bridge_placement = w.add(format!("IFCLOCALPLACEMENT(#{site_placement},#{placement})"));
    let bridge = w.add(format!(
        "IFCBRIDGE({},$,{},$,$,#{bridge_placement},$,$,.ELEMENT.,.GIRDER.)",
        w.guid("bridge"),
        step_string(bridge_name)
    ));
    w.add(format!(
        "IFCRELAGGREGATES({},$,$,$,#{project},(#{site}))",
        w.guid("project-site")
    ));
    w.add(format!(
        "IFCRELAGGREGATES({},$,$,$,#{site},(#{bridge}))",
        w.guid("site-bridge")
    ));

    let mut parts: HashMap<&str, (usize, usize)> = HashMap::new();
    let mut part_order = Vec::new();
    for container in document.containers() {
        let part_placement = w.add(format!(
            "IFCLOCALPLACEMENT(#{bridge_placement},#{placement})"
        ));
        let part = w.add(format!(
            "IFCBRIDGEPART({},$,{},$,$,#{part_placement},$,$,.ELEMENT.,.LONGITUDINAL.,.SUPERSTRUCTURE.)",
            w.guid(&format!("part/{container}")),
            step_string(container)
        ));
        parts.insert(container, (part, part_placement));
        part_order.push(part);
    }
    if !part_order.is_empty() {
        w.add(format!(
            "IFCRELAGGREGATES({},$,$,$,#{bridge},{})",
            w.guid("bridge-parts"),
            refs(&part_order)
        ));
    }

    let mut contained: HashMap<usize, Vec<usize>> = HashMap::new();
    for element in document.elements() {
        let (structure, parent_placement) = element
            .container
            .as_deref()
            .and_then(|c| parts.get(c).copied())
            .unwrap_or((bridge, bridge_placement));

        let brep = w.faceted_brep(&element.solid);
        let shape = w.add(format!(
            "IFCSHAPEREPRESENTATION(#{body},'Body','Brep',(#{brep}))"
        ));
        let definition = w.add(format!("IFCPRODUCTDEFINITIONSHAPE($,$,(#{shape}))"));
        let local = w.add(format!(
            "IFCLOCALPLACEMENT(#{parent_placement},#{placement})"
        ));
        let name = step_string(&element.name);
        let id = w.add(format!(
            "{}({},$,{name},$,$,#{local},#{definition},{name},$)",
            element.class.ifc_entity(),
            w.guid(&format!("element/{}", element.name)),
        ));
        contained.entry(structure).or_default().push(id);
    }

    let mut structures: Vec<_> = contained.into_iter().collect();
    structures.sort_by_key(|(structure, _)| *structure);
    for (structure, elements) in structures {
        w.add(format!(
            "IFCRELCONTAINEDINSPATIALSTRUCTURE({},$,$,$,{},#{structure})",
            w.guid(&format!("contains/{structure}")),
            refs(&elements)
        ));
    }
    debug!(entities = w.next_id - 1, "IFC data section written");

    let mut out = String::new();
    out.push_str("ISO-10303-21;\nHEADER;\n");
    out.push_str("FILE_DESCRIPTION(('ViewDefinition [ReferenceView]'),'2;1');\n");
    let _ = writeln!(
        out,
        "FILE_NAME({},{},({}),({}),{},'girderkit','');",
        step_string(file_name),
        step_string(&timestamp),
        step_string(&options.author),
        step_string(&options.organization),
        step_string(concat!("girderkit ", env!("CARGO_PKG_VERSION"))),
    );
    out.push_str("FILE_SCHEMA(('IFC4X3_ADD2'));\nENDSEC;\nDATA;\n");
    out.push_str(&w.data);
    out.push_str("ENDSEC;\nEND-ISO-10303-21;\n");
    out
}

/// Write `document` as an IFC file
pub fn export(document: &Document, options: &ExportOptions, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let content = write_ifc(document, options, &file_name);
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write IFC file: {}", path.display()))?;
    Ok(())
}
