// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! JSON build report

use crate::assembly::BuildReport;
use anyhow::{Context, Result};
use std::path::Path;

/// Write `report` as pretty-printed JSON
pub fn export(report: &BuildReport, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let json = serde_json::to_string_pretty(report).context("Failed to serialize build report")?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write build report: {}", path.display()))?;
    Ok(())
}

/// Read a report written by [`export`]
pub fn load(path: impl AsRef<Path>) -> Result<BuildReport> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read build report: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse build report: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembly::{BuiltElement, MemberFailure, MemberKind};
    use crate::solid::ElementClass;
    use tempfile::NamedTempFile;

    #[test]
    fn test_report_file() -> Result<()> {
        let report = BuildReport {
            bridge: "B".to_string(),
            built: vec![BuiltElement {
                name: "G1B1W".to_string(),
                class: ElementClass::Plate,
                container: Some("G1".to_string()),
                volume: 1.5e8,
            }],
            failures: vec![MemberFailure {
                kind: MemberKind::CrossBeam,
                member: "CB_G1_G7_C1".to_string(),
                error: "member `G7` not found".to_string(),
            }],
            elapsed_ms: 12,
        };
        let file = NamedTempFile::with_suffix(".json")?;
        export(&report, file.path())?;

        let text = std::fs::read_to_string(file.path())?;
        assert!(text.contains("\"CrossBeam\""));
        assert_eq!(load(file.path())?, report);
        Ok(())
    }
}
