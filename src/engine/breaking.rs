// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Length-wise subdivision of panels into fabrication segments.
//!
//! Cuts are placed by walking the midline of the strip. A cut that lands within
//! the snap tolerance of an existing station reuses that station; otherwise a
//! vertex pair is interpolated on both boundary lines at the crossing ratio.

use crate::alignment::BoundaryPair;
use crate::config::Tolerance;
use crate::error::{KernelError, KernelResult};
use crate::geometry::{Point3, RuledStrip, Vector3};
use crate::spec::{BreakSpec, Thickness};
use tracing::{debug, warn};

/// Boundary profile at a segment limit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BreakProfile {
    pub left: Point3,
    pub right: Point3,
    /// Midline arc length from the strip start
    pub chainage: f64,
    /// Interpolation ratio inside the source quad; 0 for reused stations
    pub segment_ratio: f64,
    /// Index of the source station at or before the profile
    pub source_index: usize,
}

/// One fabrication segment
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    /// 1-based segment number
    pub number: usize,
    pub strip: RuledStrip,
    pub thick: Thickness,
}

/// Result of breaking a strip: `n + 1` profiles bounding `n` segments
#[derive(Debug, Clone, PartialEq)]
pub struct BrokenPanel {
    pub profiles: Vec<BreakProfile>,
    pub segments: Vec<Segment>,
}

enum Cut {
    Existing(usize),
    Interpolated { index: usize, ratio: f64 },
}

/// Split `strip` at the cumulative targets of `spec`.
///
/// Thickness pairs are assigned per segment; segments without one keep
/// `default_thick`. The last segment always ends at the strip end.
pub fn break_strip(
    strip: &RuledStrip,
    spec: &BreakSpec,
    default_thick: Thickness,
    tol: &Tolerance,
) -> KernelResult<BrokenPanel> {
    let cumulative = strip.cumulative_lengths();
    let total = strip.midline_length();
    let target_total: f64 = spec.lengths.iter().sum();
    if (target_total - total).abs() > tol.snap {
        warn!(
            target = target_total,
            realized = total,
            "break lengths do not add up to the panel length; the last segment absorbs the difference"
        );
    }

    let mut targets = Vec::with_capacity(spec.lengths.len().saturating_sub(1));
    let mut acc = 0.0;
    for length in &spec.lengths[..spec.lengths.len().saturating_sub(1)] {
        acc += length;
        targets.push(acc);
    }

    let mut cuts = Vec::with_capacity(targets.len());
    for &target in &targets {
        if target >= total - tol.snap {
            return Err(KernelError::invalid_spec(
                "Break",
                format!("cut at {target:.3} mm is at or beyond the panel end ({total:.3} mm)"),
            ));
        }
        let i = cumulative
            .windows(2)
            .position(|w| target <= w[1])
            .unwrap_or(cumulative.len() - 2);
        let (c0, c1) = (cumulative[i], cumulative[i + 1]);
        let cut = if target - c0 <= tol.snap {
            Cut::Existing(i)
        } else if c1 - target <= tol.snap {
            Cut::Existing(i + 1)
        } else {
            Cut::Interpolated {
                index: i,
                ratio: (target - c0) / (c1 - c0),
            }
        };
        cuts.push((target, cut));
    }

    // rebuild both boundary lines with the interpolated pairs in place
    let mut left = Vec::with_capacity(strip.len() + cuts.len());
    let mut right = Vec::with_capacity(strip.len() + cuts.len());
    let mut positions = Vec::with_capacity(strip.len());
    for i in 0..strip.len() {
        positions.push(left.len());
        left.push(strip.left[i]);
        right.push(strip.right[i]);
        for (_, cut) in &cuts {
            if let Cut::Interpolated { index, ratio } = cut {
                if *index == i {
                    left.push(strip.left[i] + (strip.left[i + 1] - strip.left[i]) * *ratio);
                    right.push(strip.right[i] + (strip.right[i + 1] - strip.right[i]) * *ratio);
                }
            }
        }
    }

    let mut profiles = vec![BreakProfile {
        left: left[0],
        right: right[0],
        chainage: 0.0,
        segment_ratio: 0.0,
        source_index: 0,
    }];
    let mut limits = vec![0usize];
    let mut inserted_before = vec![0usize; strip.len()];
    for (target, cut) in &cuts {
        let (at, profile) = match *cut {
            Cut::Existing(i) => (
                positions[i],
                BreakProfile {
                    left: strip.left[i],
                    right: strip.right[i],
                    chainage: cumulative[i],
                    segment_ratio: 0.0,
                    source_index: i,
                },
            ),
            Cut::Interpolated { index, ratio } => {
                inserted_before[index] += 1;
                let at = positions[index] + inserted_before[index];
                (
                    at,
                    BreakProfile {
                        left: left[at],
                        right: right[at],
                        chainage: *target,
                        segment_ratio: ratio,
                        source_index: index,
                    },
                )
            }
        };
        if at <= *limits.last().unwrap_or(&0) {
            return Err(KernelError::invalid_spec(
                "Break",
                format!("segment ending at {target:.3} mm is shorter than the snap tolerance"),
            ));
        }
        limits.push(at);
        profiles.push(profile);
    }

    let last = left.len() - 1;
    if limits.len() > 1 && last <= *limits.last().unwrap_or(&0) {
        return Err(KernelError::invalid_spec(
            "Break",
            "last segment is shorter than the snap tolerance",
        ));
    }
    limits.push(last);
    profiles.push(BreakProfile {
        left: left[last],
        right: right[last],
        chainage: total,
        segment_ratio: 0.0,
        source_index: strip.len() - 1,
    });

    let refined = RuledStrip::new(left, right)?;
    let segments = limits
        .windows(2)
        .enumerate()
        .map(|(k, w)| {
            Ok(Segment {
                number: k + 1,
                strip: refined.sub_strip(w[0], w[1])?,
                thick: spec.thicknesses.get(k).copied().unwrap_or(default_thick),
            })
        })
        .collect::<KernelResult<Vec<_>>>()?;

    debug!(
        segments = segments.len(),
        inserted = cuts
            .iter()
            .filter(|(_, c)| matches!(c, Cut::Interpolated { .. }))
            .count(),
        "panel broken"
    );
    Ok(BrokenPanel { profiles, segments })
}

/// Build a strip from a lenient boundary, patching stations missing on one side.
///
/// A point missing on one line is rebuilt from the opposite point and the width
/// vector of the nearest complete station. A station missing on both lines falls
/// back to its neighbouring station and so adds no vertex. Every patch is logged.
pub fn patch_boundary(pairs: &[BoundaryPair], tol: &Tolerance) -> KernelResult<RuledStrip> {
    let complete: Vec<usize> = pairs
        .iter()
        .enumerate()
        .filter(|(_, p)| p.is_complete())
        .map(|(i, _)| i)
        .collect();
    if complete.is_empty() {
        return Err(KernelError::invalid_spec(
            "panel boundary",
            "no station is present on both boundary lines",
        ));
    }

    let width_near = |i: usize| -> Vector3 {
        let j = complete
            .iter()
            .copied()
            .min_by_key(|&j| j.abs_diff(i))
            .unwrap_or(complete[0]);
        match (pairs[j].left, pairs[j].right) {
            (Some(l), Some(r)) => r - l,
            _ => Vector3::zeros(),
        }
    };

    let mut left = Vec::with_capacity(pairs.len());
    let mut right = Vec::with_capacity(pairs.len());
    for (i, pair) in pairs.iter().enumerate() {
        let (l, r) = match (pair.left, pair.right) {
            (Some(l), Some(r)) => (l, r),
            (None, Some(r)) => {
                warn!(station = %pair.station, "left boundary point missing, patched from the right line");
                (r - width_near(i), r)
            }
            (Some(l), None) => {
                warn!(station = %pair.station, "right boundary point missing, patched from the left line");
                (l, l + width_near(i))
            }
            (None, None) => {
                warn!(station = %pair.station, "station missing on both boundary lines, using its neighbour");
                let neighbour = left.last().zip(right.last()).map(|(l, r)| (*l, *r));
                match neighbour {
                    Some(pair) => pair,
                    None => {
                        let j = complete.iter().copied().find(|&j| j > i).unwrap_or(complete[0]);
                        match (pairs[j].left, pairs[j].right) {
                            (Some(l), Some(r)) => (l, r),
                            _ => continue,
                        }
                    }
                }
            }
        };
        if let (Some(pl), Some(pr)) = (left.last(), right.last()) {
            let mid_prev: Point3 = nalgebra::center(pl, pr);
            if (nalgebra::center(&l, &r) - mid_prev).norm() <= tol.coincidence {
                warn!(station = %pair.station, "patched station coincides with its neighbour, dropped");
                continue;
            }
        }
        left.push(l);
        right.push(r);
    }
    RuledStrip::new(left, right)
}
