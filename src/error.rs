// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Error taxonomy of the geometry kernel

use thiserror::Error;

/// Errors raised while resolving, constructing or composing bridge members.
#[derive(Debug, Error)]
pub enum KernelError {
    #[error("alignment line `{0}` not found")]
    MissingLine(String),

    #[error("station `{station}` not found on alignment line `{line}`")]
    MissingStation { line: String, station: String },

    #[error("boundary lines `{left}` and `{right}` disagree: {detail}")]
    BoundaryMismatch {
        left: String,
        right: String,
        detail: String,
    },

    #[error("degenerate geometry: {0}")]
    DegenerateGeometry(String),

    #[error("backend composition failed for `{element}`: {reason}")]
    BackendComposition { element: String, reason: String },

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("invalid {record}: {reason}")]
    InvalidSpec { record: String, reason: String },

    #[error("{catalog} entry `{name}` not found")]
    MissingCatalogEntry { catalog: &'static str, name: String },

    #[error("member `{0}` not found")]
    MissingMember(String),

    #[error("duplicate element name `{0}`")]
    DuplicateName(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl KernelError {
    pub fn degenerate(detail: impl Into<String>) -> Self {
        Self::DegenerateGeometry(detail.into())
    }

    pub fn invalid_spec(record: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidSpec {
            record: record.into(),
            reason: reason.into(),
        }
    }

    pub fn missing_station(line: impl Into<String>, station: impl Into<String>) -> Self {
        Self::MissingStation {
            line: line.into(),
            station: station.into(),
        }
    }

    /// Whether the error comes from a dangling reference in the input
    /// (line, station, catalog entry or member) rather than from geometry.
    pub fn is_missing_reference(&self) -> bool {
        matches!(
            self,
            Self::MissingLine(_)
                | Self::MissingStation { .. }
                | Self::BoundaryMismatch { .. }
                | Self::MissingCatalogEntry { .. }
                | Self::MissingMember(_)
        )
    }
}

/// Convenience type alias for results using [`KernelError`].
pub type KernelResult<T> = std::result::Result<T, KernelError>;
