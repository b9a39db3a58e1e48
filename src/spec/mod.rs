// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Bridge description: input records, codes, catalogs and the validated model

pub mod catalog;
pub mod codes;
mod loader;
pub mod model;
pub mod raw;
mod validate;

pub use catalog::{Catalog, Rib, SectionData, SplicePlate};
pub use codes::*;
pub use loader::{load_bridge, load_bridge_str};
pub use model::*;
pub use validate::validate;
