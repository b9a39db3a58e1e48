// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Backend-agnostic solid descriptions

use super::document::ElementClass;
use crate::geometry::{BoundingBox, Face, Frame, Point2, Point3};

/// Composition instructions for one solid, expressed on plain point sets
#[derive(Debug, Clone, PartialEq)]
pub enum SolidRecipe {
    /// Closed shell between two corresponding loops
    TwoFaces { top: Face, bottom: Face },
    /// Planar profile in the XY plane of `frame` swept `length` along its Z axis
    Extruded {
        profile: Vec<Point2>,
        length: f64,
        frame: Frame,
    },
    /// `base` minus every cutter, in order
    Difference {
        base: Box<SolidRecipe>,
        cutters: Vec<SolidRecipe>,
    },
}

impl SolidRecipe {
    pub fn two_faces(top: Face, bottom: Face) -> Self {
        SolidRecipe::TwoFaces { top, bottom }
    }

    pub fn extruded(profile: Vec<Point2>, length: f64, frame: Frame) -> Self {
        SolidRecipe::Extruded {
            profile,
            length,
            frame,
        }
    }

    /// Subtract `cutters` from this recipe; no cutters leaves it unchanged
    pub fn minus(self, cutters: Vec<SolidRecipe>) -> Self {
        if cutters.is_empty() {
            return self;
        }
        match self {
            SolidRecipe::Difference {
                base,
                cutters: mut existing,
            } => {
                existing.extend(cutters);
                SolidRecipe::Difference {
                    base,
                    cutters: existing,
                }
            }
            other => SolidRecipe::Difference {
                base: Box::new(other),
                cutters,
            },
        }
    }

    /// Number of subtractions the recipe asks for
    pub fn cutter_count(&self) -> usize {
        match self {
            SolidRecipe::Difference { base, cutters } => base.cutter_count() + cutters.len(),
            _ => 0,
        }
    }

    /// Every construction point of the recipe in world coordinates
    pub fn points(&self) -> Vec<Point3> {
        match self {
            SolidRecipe::TwoFaces { top, bottom } => top.iter().chain(bottom).copied().collect(),
            SolidRecipe::Extruded {
                profile,
                length,
                frame,
            } => profile
                .iter()
                .flat_map(|p| {
                    let base = frame.to_world_2d(p);
                    [base, base + frame.z_axis * *length]
                })
                .collect(),
            SolidRecipe::Difference { base, .. } => base.points(),
        }
    }

    /// Bounding box of the base solid
    pub fn bounding_box(&self) -> BoundingBox {
        BoundingBox::from_points(&self.points())
    }
}

/// Recipe for one named element of the output document
#[derive(Debug, Clone, PartialEq)]
pub struct ElementRecipe {
    pub name: String,
    pub class: ElementClass,
    /// Spatial container; `None` places the element directly under the bridge
    pub container: Option<String>,
    pub recipe: SolidRecipe,
}

impl ElementRecipe {
    pub fn new(
        name: impl Into<String>,
        class: ElementClass,
        container: Option<String>,
        recipe: SolidRecipe,
    ) -> Self {
        Self {
            name: name.into(),
            class,
            container,
            recipe,
        }
    }
}
