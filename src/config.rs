// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Kernel configuration system

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default configuration file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "girderkit.toml";

/// Named tolerances used by every geometric routine
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tolerance {
    /// Near-zero test for normalised dot/cross products
    pub eps: f64,
    /// Two points closer than this (mm) are the same point
    pub coincidence: f64,
    /// Vertex merging distance (mm) for break points and polygon corners
    pub snap: f64,
}

impl Default for Tolerance {
    fn default() -> Self {
        Self {
            eps: 1e-9,
            coincidence: 1e-6,
            snap: 0.3,
        }
    }
}

/// What happens to the batch when one member fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum FailurePolicy {
    /// Log and record the failure, keep building the remaining members
    #[default]
    BestEffort,
    /// Stop the whole document at the first failing member
    AbortOnFirst,
}

/// Build scheduling options
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildOptions {
    /// Build independent members on the rayon pool
    pub parallel: bool,
    /// Worker count, `None` uses the global rayon pool
    pub threads: Option<usize>,
    pub failure_policy: FailurePolicy,
    /// Tolerate missing panel vertices by patching them during breaks
    pub patch_missing_vertices: bool,
    /// Subtract bolt holes from cross-member solids
    pub realize_holes: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            parallel: true,
            threads: None,
            failure_policy: FailurePolicy::BestEffort,
            patch_missing_vertices: false,
            realize_holes: false,
        }
    }
}

/// Output document options
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportOptions {
    pub author: String,
    pub organization: String,
    /// Fixed header timestamp, useful for reproducible files
    pub timestamp: Option<String>,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            author: "girderkit".to_string(),
            organization: String::new(),
            timestamp: None,
        }
    }
}

/// Kernel configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct KernelConfig {
    pub tolerance: Tolerance,
    pub build: BuildOptions,
    pub export: ExportOptions,
}

impl KernelConfig {
    /// Load configuration from file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;
        let config: KernelConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path.as_ref()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration with environment variable overrides
    pub fn load() -> Result<Self> {
        let mut config = if PathBuf::from(DEFAULT_CONFIG_FILE).exists() {
            Self::from_file(DEFAULT_CONFIG_FILE)?
        } else {
            Self::default()
        };
        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Apply `GIRDERKIT_*` overrides read through `lookup`
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(eps) = lookup("GIRDERKIT_EPS") {
            self.tolerance.eps = eps
                .parse()
                .with_context(|| format!("GIRDERKIT_EPS is not a number: {eps}"))?;
        }

        if let Some(snap) = lookup("GIRDERKIT_SNAP") {
            self.tolerance.snap = snap
                .parse()
                .with_context(|| format!("GIRDERKIT_SNAP is not a number: {snap}"))?;
        }

        if let Some(parallel) = lookup("GIRDERKIT_PARALLEL") {
            self.build.parallel = parallel.parse().unwrap_or(self.build.parallel);
        }

        if let Some(threads) = lookup("GIRDERKIT_THREADS") {
            self.build.threads = threads.parse().ok();
        }

        if let Some(fail_fast) = lookup("GIRDERKIT_FAIL_FAST") {
            if fail_fast.parse().unwrap_or(false) {
                self.build.failure_policy = FailurePolicy::AbortOnFirst;
            }
        }

        self.validate()
    }

    /// Save configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path.as_ref(), content)
            .with_context(|| format!("Failed to write config file: {:?}", path.as_ref()))?;
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        let t = &self.tolerance;
        if !(t.eps > 0.0 && t.coincidence > 0.0 && t.snap > 0.0) {
            anyhow::bail!("tolerances must be strictly positive: {:?}", t);
        }
        if t.coincidence > t.snap {
            anyhow::bail!(
                "coincidence tolerance {} exceeds snap tolerance {}",
                t.coincidence,
                t.snap
            );
        }
        Ok(())
    }
}
