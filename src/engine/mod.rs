// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Member engines.
//!
//! Engines read the validated model and the alignment, and return
//! [`ElementRecipe`]s. They never call a solid backend. Dependencies run one
//! way: `features` ← `panel`, `subpanel`, `cross_member` ← `gusset`.

pub mod breaking;
pub mod cross_member;
pub mod features;
pub mod gusset;
pub mod panel;
pub mod subpanel;

pub use crate::solid::ElementRecipe;
pub use breaking::{break_strip, patch_boundary, BreakProfile, BrokenPanel, Segment};
pub use cross_member::{
    build_cross_beam, build_diagonal_bracing, build_lateral_bracing, CrossMemberOutput, MemberAxis,
};
pub use gusset::{build_gusset, GussetBasis, GussetOutput};
pub use panel::{build_deck, build_main_panel, resolve_plate_strip};
pub use subpanel::build_sub_panel;
