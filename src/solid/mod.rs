// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Solid-realization protocol.
//!
//! Engines describe solids as [`SolidRecipe`] values; only a [`SolidBackend`]
//! turns them into solids and only a [`Document`] names them.

mod backend;
mod document;
mod recipe;

pub use backend::{MeshBackend, SolidBackend};
pub use document::{Document, Element, ElementClass};
pub use recipe::{ElementRecipe, SolidRecipe};
