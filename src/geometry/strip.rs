// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Ruled strip between two parallel boundary point lists

use super::{unit_direction, Face, Point3, Vector3};
use crate::config::Tolerance;
use crate::error::{KernelError, KernelResult};

/// Two boundary point lists of equal length, paired by index.
///
/// The strip normal at station `i` is `t_i x w_i`, where `t_i` is the midline tangent
/// and `w_i = right_i - left_i`.
#[derive(Debug, Clone, PartialEq)]
pub struct RuledStrip {
    pub left: Face,
    pub right: Face,
}

impl RuledStrip {
    pub fn new(left: Face, right: Face) -> KernelResult<Self> {
        if left.len() != right.len() {
            return Err(KernelError::InvalidInput(format!(
                "strip boundaries differ in length: {} vs {}",
                left.len(),
                right.len()
            )));
        }
        if left.len() < 2 {
            return Err(KernelError::InvalidInput(format!(
                "strip needs at least 2 stations, got {}",
                left.len()
            )));
        }
        Ok(Self { left, right })
    }

    /// Number of stations
    pub fn len(&self) -> usize {
        self.left.len()
    }

    pub fn is_empty(&self) -> bool {
        self.left.is_empty()
    }

    pub fn midline(&self) -> Vec<Point3> {
        self.left
            .iter()
            .zip(&self.right)
            .map(|(l, r)| Point3::from((l.coords + r.coords) * 0.5))
            .collect()
    }

    /// Running midline length at every station, starting at 0
    pub fn cumulative_lengths(&self) -> Vec<f64> {
        let mid = self.midline();
        let mut acc = 0.0;
        let mut out = Vec::with_capacity(mid.len());
        out.push(0.0);
        for w in mid.windows(2) {
            acc += (w[1] - w[0]).norm();
            out.push(acc);
        }
        out
    }

    pub fn midline_length(&self) -> f64 {
        self.cumulative_lengths().last().copied().unwrap_or(0.0)
    }

    /// Unit normal per station
    pub fn normals(&self, tol: &Tolerance) -> KernelResult<Vec<Vector3>> {
        let mid = self.midline();
        let n = mid.len();
        (0..n)
            .map(|i| {
                let (a, b) = match i {
                    0 => (mid[0], mid[1]),
                    i if i == n - 1 => (mid[n - 2], mid[n - 1]),
                    i => (mid[i - 1], mid[i + 1]),
                };
                let t = unit_direction(&a, &b, tol)?;
                let w = self.right[i] - self.left[i];
                let normal = t.cross(&w);
                let len = normal.norm();
                if len <= tol.eps * w.norm().max(1.0) {
                    return Err(KernelError::degenerate(format!(
                        "strip width is parallel to its midline at station {i}"
                    )));
                }
                Ok(normal / len)
            })
            .collect()
    }

    /// Average normal of the whole strip
    pub fn mean_normal(&self, tol: &Tolerance) -> KernelResult<Vector3> {
        let sum = self
            .normals(tol)?
            .into_iter()
            .fold(Vector3::zeros(), |acc, n| acc + n);
        let len = sum.norm();
        if len <= tol.eps {
            return Err(KernelError::degenerate("strip normals cancel out"));
        }
        Ok(sum / len)
    }

    /// Strip displaced along its per-station normals by `d`
    pub fn offset(&self, d: f64, tol: &Tolerance) -> KernelResult<Self> {
        let normals = self.normals(tol)?;
        let shift = |face: &Face| -> Face {
            face.iter()
                .zip(&normals)
                .map(|(p, n)| p + n * d)
                .collect()
        };
        Ok(Self {
            left: shift(&self.left),
            right: shift(&self.right),
        })
    }

    /// Closed boundary loop: left forward, then right backward
    pub fn outline(&self) -> Face {
        self.left
            .iter()
            .chain(self.right.iter().rev())
            .copied()
            .collect()
    }

    /// Stations `from..=to`
    pub fn sub_strip(&self, from: usize, to: usize) -> KernelResult<Self> {
        if from >= to || to >= self.len() {
            return Err(KernelError::InvalidInput(format!(
                "invalid station range {from}..={to} on a strip of {} stations",
                self.len()
            )));
        }
        Self::new(
            self.left[from..=to].to_vec(),
            self.right[from..=to].to_vec(),
        )
    }

    /// Quad `i` (stations `i` and `i + 1`) as a closed loop
    pub fn quad(&self, i: usize) -> Option<[Point3; 4]> {
        (i + 1 < self.len()).then(|| {
            [
                self.left[i],
                self.left[i + 1],
                self.right[i + 1],
                self.right[i],
            ]
        })
    }

    pub fn reversed(&self) -> Self {
        let mut left = self.left.clone();
        let mut right = self.right.clone();
        left.reverse();
        right.reverse();
        Self { left, right }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn flange() -> RuledStrip {
        // right boundary at larger Y, so the normal is +Z
        RuledStrip::new(
            vec![
                Point3::new(0.0, -150.0, 0.0),
                Point3::new(5000.0, -150.0, 0.0),
                Point3::new(10000.0, -150.0, 0.0),
            ],
            vec![
                Point3::new(0.0, 150.0, 0.0),
                Point3::new(5000.0, 150.0, 0.0),
                Point3::new(10000.0, 150.0, 0.0),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_normals_follow_tangent_cross_width() {
        let tol = Tolerance::default();
        for n in flange().normals(&tol).unwrap() {
            assert_relative_eq!(n, Vector3::z(), epsilon = 1e-12);
        }
    }

    #[test]
    fn test_offset_involution() {
        let tol = Tolerance::default();
        let strip = flange();
        let back = strip.offset(20.0, &tol).unwrap().offset(-20.0, &tol).unwrap();
        for (a, b) in strip.outline().iter().zip(back.outline().iter()) {
            assert_relative_eq!(a, b, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_lengths_and_outline() {
        let strip = flange();
        assert_relative_eq!(strip.midline_length(), 10000.0);
        assert_eq!(strip.outline().len(), 6);
        assert_eq!(strip.sub_strip(1, 2).unwrap().len(), 2);
        assert!(strip.sub_strip(2, 2).is_err());
    }

    #[test]
    fn test_mismatched_boundaries() {
        let err = RuledStrip::new(vec![Point3::origin(); 3], vec![Point3::origin(); 2]);
        assert!(err.is_err());
    }
}
