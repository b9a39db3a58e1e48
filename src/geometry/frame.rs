// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Orthonormal working frames used to flatten planar plates into 2D and back

use super::{unit_direction, Point2, Point3, Vector3};
use crate::config::Tolerance;
use crate::error::{KernelError, KernelResult};

/// Right-handed orthonormal frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    pub origin: Point3,
    pub x_axis: Vector3,
    pub y_axis: Vector3,
    pub z_axis: Vector3,
}

impl Frame {
    /// World XYZ frame at `origin`
    pub fn world(origin: Point3) -> Self {
        Self {
            origin,
            x_axis: Vector3::x(),
            y_axis: Vector3::y(),
            z_axis: Vector3::z(),
        }
    }

    /// Frame with X toward `p1` and Y in the plane of the three points, on the side of `p2`
    pub fn from_three_points(
        p0: &Point3,
        p1: &Point3,
        p2: &Point3,
        tol: &Tolerance,
    ) -> KernelResult<Self> {
        let x_axis = unit_direction(p0, p1, tol)?;
        let z = x_axis.cross(&(p2 - p0));
        let len = z.norm();
        if len <= tol.eps * (p2 - p0).norm().max(1.0) {
            return Err(KernelError::degenerate(
                "frame points are collinear",
            ));
        }
        let z_axis = z / len;
        let y_axis = z_axis.cross(&x_axis);
        Ok(Self {
            origin: *p0,
            x_axis,
            y_axis,
            z_axis,
        })
    }

    /// Frame with the given Z axis and X as close as possible to `x_hint`
    pub fn from_normal(
        origin: Point3,
        normal: &Vector3,
        x_hint: &Vector3,
        tol: &Tolerance,
    ) -> KernelResult<Self> {
        let len = normal.norm();
        if len <= tol.eps {
            return Err(KernelError::degenerate("zero-length frame normal"));
        }
        let z_axis = normal / len;

        let mut x = x_hint - z_axis * x_hint.dot(&z_axis);
        if x.norm() <= tol.eps {
            // hint is parallel to the normal: use the least aligned world axis
            let helper = [Vector3::x(), Vector3::y(), Vector3::z()]
                .into_iter()
                .min_by(|a, b| a.dot(&z_axis).abs().total_cmp(&b.dot(&z_axis).abs()))
                .unwrap_or_else(Vector3::x);
            x = helper - z_axis * helper.dot(&z_axis);
        }
        let x_axis = x.normalize();
        let y_axis = z_axis.cross(&x_axis);
        Ok(Self {
            origin,
            x_axis,
            y_axis,
            z_axis,
        })
    }

    /// Frame from an origin and two in-plane directions; Y is re-orthogonalised against X
    pub fn from_axes(
        origin: Point3,
        x_dir: &Vector3,
        y_dir: &Vector3,
        tol: &Tolerance,
    ) -> KernelResult<Self> {
        let normal = x_dir.cross(y_dir);
        if normal.norm() <= tol.eps * x_dir.norm().max(1.0) * y_dir.norm().max(1.0) {
            return Err(KernelError::degenerate("frame axes are parallel"));
        }
        Self::from_normal(origin, &normal, x_dir, tol)
    }

    /// Coordinates of a world point in this frame
    pub fn to_local(&self, p: &Point3) -> Point3 {
        let d = p - self.origin;
        Point3::new(d.dot(&self.x_axis), d.dot(&self.y_axis), d.dot(&self.z_axis))
    }

    /// In-plane coordinates of a world point (the Z component is dropped)
    pub fn to_local_2d(&self, p: &Point3) -> Point2 {
        let d = p - self.origin;
        Point2::new(d.dot(&self.x_axis), d.dot(&self.y_axis))
    }

    /// World point of local coordinates
    pub fn to_world(&self, local: &Point3) -> Point3 {
        self.origin + self.x_axis * local.x + self.y_axis * local.y + self.z_axis * local.z
    }

    /// World point of in-plane coordinates
    pub fn to_world_2d(&self, local: &Point2) -> Point3 {
        self.origin + self.x_axis * local.x + self.y_axis * local.y
    }

    pub fn vector_to_world(&self, local: &Vector3) -> Vector3 {
        self.x_axis * local.x + self.y_axis * local.y + self.z_axis * local.z
    }

    /// Same plane, opposite Z
    pub fn flipped(&self) -> Self {
        Self {
            origin: self.origin,
            x_axis: self.x_axis,
            y_axis: -self.y_axis,
            z_axis: -self.z_axis,
        }
    }

    /// Frame moved along its own Z axis
    pub fn shifted(&self, dz: f64) -> Self {
        Self {
            origin: self.origin + self.z_axis * dz,
            ..*self
        }
    }
}

/// Rigid change of basis: expresses `p` in the frame of `src` and rebuilds it in the frame of `dst`.
pub fn transform_face_to_face(
    p: &Point3,
    src: &[Point3; 3],
    dst: &[Point3; 3],
    tol: &Tolerance,
) -> KernelResult<Point3> {
    let from = Frame::from_three_points(&src[0], &src[1], &src[2], tol)?;
    let to = Frame::from_three_points(&dst[0], &dst[1], &dst[2], tol)?;
    Ok(to.to_world(&from.to_local(p)))
}
