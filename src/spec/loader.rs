// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! JSON bridge description loader

use super::model::BridgeSpec;
use super::raw::RawBridge;
use super::validate::validate;
use crate::config::Tolerance;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Parse and validate a bridge description held in memory
pub fn load_bridge_str(source: &str, tol: &Tolerance) -> Result<BridgeSpec> {
    let raw: RawBridge =
        serde_json::from_str(source).context("Failed to parse bridge description JSON")?;
    debug!(
        lines = raw.senkei.len(),
        panels = raw.main_panel.len(),
        sub_panels = raw.sub_panel.len(),
        "parsed raw bridge description"
    );
    if raw.senkei.is_empty() {
        anyhow::bail!("bridge description has no alignment lines (Senkei)");
    }

    let spec = validate(&raw, tol).context("Bridge description failed validation")?;
    info!(
        bridge = %spec.name,
        members = spec.member_count(),
        "loaded bridge description"
    );
    Ok(spec)
}

/// Read, parse and validate a bridge description file
pub fn load_bridge(path: impl AsRef<Path>, tol: &Tolerance) -> Result<BridgeSpec> {
    let path = path.as_ref();
    let source = fs::read_to_string(path)
        .with_context(|| format!("Failed to read bridge description: {}", path.display()))?;
    load_bridge_str(&source, tol)
        .with_context(|| format!("Failed to load bridge description: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const MINIMAL: &str = r#"{
        "Infor": { "NameBridge": "Mini" },
        "Senkei": [
            { "Name": "A", "Point": [
                { "Name": "S1", "X": 0, "Y": 0, "Z": 0 },
                { "Name": "S2", "X": 100, "Y": 0, "Z": 0 }
            ]}
        ]
    }"#;

    #[test]
    fn test_load_from_file() -> Result<()> {
        let mut file = NamedTempFile::new()?;
        write!(file, "{MINIMAL}")?;

        let spec = load_bridge(file.path(), &Tolerance::default())?;
        assert_eq!(spec.name, "Mini");
        assert_eq!(spec.lines[0].stations.len(), 2);
        Ok(())
    }

    #[test]
    fn test_missing_senkei_rejected() {
        let err = load_bridge_str("{}", &Tolerance::default()).unwrap_err();
        assert!(err.to_string().contains("Senkei"));
    }

    #[test]
    fn test_malformed_json_has_context() {
        let err = load_bridge_str("{ not json", &Tolerance::default()).unwrap_err();
        assert!(format!("{err:#}").contains("Failed to parse"));
    }

    #[test]
    fn test_missing_file() {
        assert!(load_bridge("/nonexistent/bridge.json", &Tolerance::default()).is_err());
    }
}
