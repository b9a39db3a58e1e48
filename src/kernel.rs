// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Kernel API: configuration, loading and building in one place

use crate::assembly::{BridgeBuilder, BuildReport};
use crate::config::KernelConfig;
use crate::solid::{Document, MeshBackend};
use crate::spec::{load_bridge, load_bridge_str, BridgeSpec};
use anyhow::Result;
use std::path::Path;

/// Main kernel: a configuration plus the mesh backend
#[derive(Debug, Clone, Default)]
pub struct Kernel {
    config: KernelConfig,
}

impl Kernel {
    /// Create a kernel with the given configuration
    pub fn new(config: KernelConfig) -> Self {
        Self { config }
    }

    /// Create a kernel from `girderkit.toml` and `GIRDERKIT_*` overrides
    pub fn from_environment() -> Result<Self> {
        Ok(Self::new(KernelConfig::load()?))
    }

    pub fn config(&self) -> &KernelConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut KernelConfig {
        &mut self.config
    }

    /// Load and validate a bridge description file
    pub fn load(&self, path: impl AsRef<Path>) -> Result<BridgeSpec> {
        load_bridge(path, &self.config.tolerance)
    }

    /// Load and validate a bridge description held in memory
    pub fn load_str(&self, source: &str) -> Result<BridgeSpec> {
        load_bridge_str(source, &self.config.tolerance)
    }

    /// Build every member of `spec` into a mesh document
    pub fn build(&self, spec: &BridgeSpec) -> Result<(Document, BuildReport)> {
        let backend = MeshBackend::new(self.config.tolerance);
        BridgeBuilder::new(spec, &self.config, backend).build()
    }

    /// Load then build a bridge description file
    pub fn build_file(&self, path: impl AsRef<Path>) -> Result<(Document, BuildReport)> {
        let spec = self.load(path)?;
        self.build(&spec)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = include_str!("../tests/data/three_girder.json");

    #[test]
    fn test_build_fixture() {
        let kernel = Kernel::default();
        let spec = kernel.load_str(FIXTURE).unwrap();
        let (document, report) = kernel.build(&spec).unwrap();
        assert_eq!(document.name, "Three Girder Test Bridge");
        assert_eq!(report.built.len(), document.len());
        assert!(report.is_complete());
    }

    #[test]
    fn test_load_rejects_garbage() {
        let err = Kernel::default().load_str("{ not json").unwrap_err();
        assert!(err.to_string().contains("parse"));
    }
}
