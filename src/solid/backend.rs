// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Solid backends: the only code that turns recipes into solids

use super::recipe::SolidRecipe;
use crate::config::Tolerance;
use crate::error::{KernelError, KernelResult};
use crate::geometry::{analyze, csg_difference, Frame, Mesh, Point2, Point3};
use tracing::{debug, trace};

/// Composition primitives every backend provides
pub trait SolidBackend: Send + Sync {
    type Solid: Send;

    fn solid_from_two_faces(&self, top: &[Point3], bottom: &[Point3]) -> KernelResult<Self::Solid>;

    fn solid_from_extruded_profile(
        &self,
        profile: &[Point2],
        length: f64,
        frame: &Frame,
    ) -> KernelResult<Self::Solid>;

    fn boolean_difference(&self, base: Self::Solid, cutter: &Self::Solid)
        -> KernelResult<Self::Solid>;

    fn volume(&self, solid: &Self::Solid) -> f64;

    /// Realize a recipe for `element`; any failure becomes [`KernelError::BackendComposition`]
    fn realize(&self, element: &str, recipe: &SolidRecipe) -> KernelResult<Self::Solid> {
        realize_recipe(self, recipe).map_err(|e| KernelError::BackendComposition {
            element: element.to_string(),
            reason: match e {
                KernelError::BackendComposition { reason, .. } => reason,
                other => other.to_string(),
            },
        })
    }
}

fn realize_recipe<B: SolidBackend + ?Sized>(
    backend: &B,
    recipe: &SolidRecipe,
) -> KernelResult<B::Solid> {
    match recipe {
        SolidRecipe::TwoFaces { top, bottom } => backend.solid_from_two_faces(top, bottom),
        SolidRecipe::Extruded {
            profile,
            length,
            frame,
        } => backend.solid_from_extruded_profile(profile, *length, frame),
        SolidRecipe::Difference { base, cutters } => {
            let mut solid = realize_recipe(backend, base)?;
            for cutter in cutters {
                let cutter = realize_recipe(backend, cutter)?;
                solid = backend.boolean_difference(solid, &cutter)?;
            }
            Ok(solid)
        }
    }
}

/// Triangle-mesh backend with BSP-tree booleans
#[derive(Debug, Clone, Default)]
pub struct MeshBackend {
    tolerance: Tolerance,
}

impl MeshBackend {
    pub fn new(tolerance: Tolerance) -> Self {
        Self { tolerance }
    }

    fn check_volume(&self, mesh: &Mesh, what: &str) -> KernelResult<()> {
        let volume = mesh.signed_volume();
        if volume <= self.tolerance.coincidence {
            return Err(KernelError::degenerate(format!(
                "{what} encloses no volume ({volume:.3e} mm³)"
            )));
        }
        Ok(())
    }
}

impl SolidBackend for MeshBackend {
    type Solid = Mesh;

    fn solid_from_two_faces(&self, top: &[Point3], bottom: &[Point3]) -> KernelResult<Mesh> {
        let mesh = Mesh::from_two_faces(top, bottom, &self.tolerance)?;
        self.check_volume(&mesh, "two-face solid")?;
        trace!(triangles = mesh.triangle_count(), "built two-face solid");
        Ok(mesh)
    }

    fn solid_from_extruded_profile(
        &self,
        profile: &[Point2],
        length: f64,
        frame: &Frame,
    ) -> KernelResult<Mesh> {
        let mesh = Mesh::from_extruded_profile(profile, length, frame, &self.tolerance)?;
        self.check_volume(&mesh, "extruded solid")?;
        Ok(mesh)
    }

    fn boolean_difference(&self, base: Mesh, cutter: &Mesh) -> KernelResult<Mesh> {
        if !base
            .bounding_box()
            .intersects(&cutter.bounding_box(), self.tolerance.coincidence)
        {
            debug!("cutter misses the base solid, difference skipped");
            return Ok(base);
        }

        let mut result = csg_difference(&base, cutter, &self.tolerance);
        result.weld_vertices(self.tolerance.coincidence);
        result.remove_orphaned_vertices();
        result.recompute_normals(&self.tolerance);

        if result.is_empty() {
            return Err(KernelError::BackendComposition {
                element: String::new(),
                reason: "difference removed the whole solid".to_string(),
            });
        }
        // a difference may not grow the base by more than a coincidence-thick skin
        let volume = result.signed_volume();
        let skin = analyze(&base, &self.tolerance).surface_area * self.tolerance.coincidence;
        if volume <= self.tolerance.coincidence || volume > base.signed_volume() + skin {
            return Err(KernelError::BackendComposition {
                element: String::new(),
                reason: format!("difference produced an invalid shell (volume {volume:.3})"),
            });
        }
        Ok(result)
    }

    fn volume(&self, solid: &Mesh) -> f64 {
        analyze(solid, &self.tolerance).volume
    }
}
