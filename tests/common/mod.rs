// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Shared fixture helpers for integration tests

#![allow(dead_code)]

use girderkit::{BridgeBuilder, BridgeSpec, BuildReport, Document, KernelConfig, MeshBackend};
use serde_json::Value;

pub const THREE_GIRDER: &str = include_str!("../data/three_girder.json");

/// The three-girder fixture as an editable JSON value
pub fn fixture() -> Value {
    serde_json::from_str(THREE_GIRDER).expect("fixture is valid JSON")
}

pub fn load(value: &Value) -> anyhow::Result<BridgeSpec> {
    girderkit::load_bridge_str(&value.to_string(), &Default::default())
}

/// Build an edited fixture with the default configuration
pub fn build_with(edit: impl FnOnce(&mut Value)) -> (Document, BuildReport) {
    let mut value = fixture();
    edit(&mut value);
    let spec = load(&value).expect("edited fixture loads");
    BridgeBuilder::new(&spec, &KernelConfig::default(), MeshBackend::default())
        .build()
        .expect("build succeeds under best effort")
}

pub fn volume(report: &BuildReport, name: &str) -> f64 {
    report
        .built
        .iter()
        .find(|e| e.name == name)
        .unwrap_or_else(|| panic!("element {name} was not built"))
        .volume
}
