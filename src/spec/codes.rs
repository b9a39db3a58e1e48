// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Closed enumerations for the short string codes of the input format.
//!
//! Every code is parsed once while the input is validated; engines only ever see
//! the typed values.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub use crate::context::SideExport;

/// A string that is not a valid code of the expected kind
#[derive(Debug, Clone, PartialEq, Error)]
#[error("invalid {kind} code `{code}` (expected {expected})")]
pub struct CodeError {
    pub kind: &'static str,
    pub code: String,
    pub expected: &'static str,
}

impl CodeError {
    fn new(kind: &'static str, code: &str, expected: &'static str) -> Self {
        Self {
            kind,
            code: code.to_string(),
            expected,
        }
    }
}

/// Declares a code enum together with its lookup table.
macro_rules! code_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $kind:literal, $hint:literal {
            $( $(#[$vmeta:meta])* $variant:ident => $code:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $( $(#[$vmeta])* $variant ),+
        }

        impl $name {
            pub const ALL: &'static [($name, &'static str)] = &[ $( ($name::$variant, $code) ),+ ];

            pub fn code(self) -> &'static str {
                match self {
                    $( $name::$variant => $code ),+
                }
            }
        }

        impl FromStr for $name {
            type Err = CodeError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let s = s.trim();
                Self::ALL
                    .iter()
                    .find(|(_, code)| code.eq_ignore_ascii_case(s))
                    .map(|(value, _)| *value)
                    .ok_or_else(|| CodeError::new($kind, s, $hint))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.code())
            }
        }
    };
}

code_enum! {
    /// Main panel role within a girder
    PanelKind, "panel type", "W, UF or LF" {
        Web => "W",
        UpperFlange => "UF",
        LowerFlange => "LF",
    }
}

code_enum! {
    /// Corners of a main panel strip: start/end of the station range x left/right boundary
    PanelCorner, "panel corner", "SL, SR, EL or ER" {
        StartLeft => "SL",
        StartRight => "SR",
        EndLeft => "EL",
        EndRight => "ER",
    }
}

code_enum! {
    /// Corners of a sub-panel part
    PartCorner, "part corner", "TL, TR, BL or BR" {
        TopLeft => "TL",
        TopRight => "TR",
        BottomLeft => "BL",
        BottomRight => "BR",
    }
}

code_enum! {
    /// Shape of a corner cut
    CornerCutKind, "corner cut", "T or S" {
        Triangle => "T",
        Square => "S",
    }
}

code_enum! {
    /// Side of a sub-panel outline
    Side, "side", "T, B, L or R" {
        Top => "T",
        Bottom => "B",
        Left => "L",
        Right => "R",
    }
}

code_enum! {
    /// Plate face a member sits on
    FaceSide, "face side", "A or F" {
        A => "A",
        F => "F",
    }
}

code_enum! {
    /// Plate faces covered by a splice plate
    PlateSide, "plate side", "A, F or AF" {
        A => "A",
        F => "F",
        Both => "AF",
    }
}

code_enum! {
    /// End of a plate receiving a joint
    JointEnd, "joint end", "Start or End" {
        Start => "Start",
        End => "End",
    }
}

code_enum! {
    /// Diagonal layout of a bracing frame
    BracingType, "bracing type", "L, R, CL or CR" {
        /// top-left to bottom-right
        L => "L",
        /// top-right to bottom-left
        R => "R",
        /// both top corners to bottom centre
        CL => "CL",
        /// both bottom corners to top centre
        CR => "CR",
    }
}

code_enum! {
    /// Line of a section that follows the member's reference line
    ReferenceLine, "reference line", "Top, Center or Bottom" {
        Top => "Top",
        Center => "Center",
        Bottom => "Bottom",
    }
}

code_enum! {
    /// Steel section family
    SectionKind, "section", "I, PL, L, C or T" {
        I => "I",
        Plate => "PL",
        Angle => "L",
        Channel => "C",
        Tee => "T",
    }
}

code_enum! {
    /// Lateral bracing layout
    LateralPattern, "lateral pattern", "Single or X" {
        Single => "Single",
        X => "X",
    }
}

code_enum! {
    /// Sub-panel edge carrying a flange
    FlangeEdge, "flange edge", "T or B" {
        Top => "T",
        Bottom => "B",
    }
}

code_enum! {
    /// Cross-section of a sub-panel flange
    FlangeShape, "flange shape", "PL or L" {
        Plate => "PL",
        Angle => "L",
    }
}

code_enum! {
    /// Location tag of a gusset on its panel
    GussetPosition, "gusset position", "TL, TR, BL, BR, T, B, L or R" {
        TopLeft => "TL",
        TopRight => "TR",
        BottomLeft => "BL",
        BottomRight => "BR",
        Top => "T",
        Bottom => "B",
        Left => "L",
        Right => "R",
    }
}

code_enum! {
    /// Kind of gusset free-edge offset
    EdgeOffsetKind, "edge offset", "O, A, F, B or C" {
        /// parallel to the face through the outermost footprint corner
        Outer => "O",
        /// parallel to the face through the A-side footprint corner
        ASide => "A",
        /// parallel to the face through the F-side footprint corner
        FSide => "F",
        /// square to the member beyond the last bolt row
        BoltLine => "B",
        /// parallel to the face at an absolute distance
        Custom => "C",
    }
}

impl FromStr for SideExport {
    type Err = CodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "both" => Ok(SideExport::Both),
            "toponly" | "top" => Ok(SideExport::TopOnly),
            "bottomonly" | "bottom" => Ok(SideExport::BottomOnly),
            _ => Err(CodeError::new(
                "side export",
                s,
                "Both, TopOnly or BottomOnly",
            )),
        }
    }
}

/// Gusset free-edge code `<Kind><Magnitude>`, e.g. `B40`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeOffset {
    pub kind: EdgeOffsetKind,
    /// Millimetres
    pub magnitude: f64,
}

impl FromStr for EdgeOffset {
    type Err = CodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let mut chars = s.chars();
        let kind = chars
            .next()
            .ok_or_else(|| CodeError::new("edge offset", s, "<O|A|F|B|C><mm>"))?;
        let kind: EdgeOffsetKind = kind.to_string().parse()?;
        let rest = chars.as_str().trim();
        let magnitude = if rest.is_empty() {
            0.0
        } else {
            rest.parse::<f64>()
                .ok()
                .filter(|m| m.is_finite())
                .ok_or_else(|| CodeError::new("edge offset", s, "<O|A|F|B|C><mm>"))?
        };
        Ok(Self { kind, magnitude })
    }
}

impl fmt::Display for EdgeOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.kind, self.magnitude)
    }
}

/// Upper bound on the spacings one pitch string may expand to
pub const MAX_PITCH_SPACINGS: usize = 1000;

/// Spacing list written as `/`-separated groups of `n@s` or `s`, e.g. `3@80/50`
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Pitch {
    spacings: Vec<f64>,
}

impl Pitch {
    pub fn new(spacings: Vec<f64>) -> Self {
        Self { spacings }
    }

    pub fn spacings(&self) -> &[f64] {
        &self.spacings
    }

    pub fn is_empty(&self) -> bool {
        self.spacings.is_empty()
    }

    /// Sum of all spacings
    pub fn total(&self) -> f64 {
        self.spacings.iter().sum()
    }

    /// Cumulative positions starting at 0, one more than the spacing count
    pub fn positions(&self) -> Vec<f64> {
        let mut acc = 0.0;
        std::iter::once(0.0)
            .chain(self.spacings.iter().map(|s| {
                acc += s;
                acc
            }))
            .collect()
    }
}

impl FromStr for Pitch {
    type Err = CodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || CodeError::new("pitch", s, "groups like 3@80/50");
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Ok(Self::default());
        }

        let mut spacings = Vec::new();
        for group in trimmed.split('/') {
            let group = group.trim();
            let (count, spacing) = match group.split_once('@') {
                Some((n, sp)) => (n.trim().parse::<usize>().map_err(|_| err())?, sp),
                None => (1, group),
            };
            let spacing: f64 = spacing.trim().parse().map_err(|_| err())?;
            if count == 0 || !(spacing.is_finite() && spacing > 0.0) {
                return Err(err());
            }
            if count > MAX_PITCH_SPACINGS - spacings.len() {
                return Err(CodeError::new(
                    "pitch",
                    s,
                    "at most 1000 spacings in total",
                ));
            }
            spacings.extend(std::iter::repeat(spacing).take(count));
        }
        Ok(Self { spacings })
    }
}

impl fmt::Display for Pitch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut groups: Vec<(usize, f64)> = Vec::new();
        for &s in &self.spacings {
            match groups.last_mut() {
                Some((n, last)) if *last == s => *n += 1,
                _ => groups.push((1, s)),
            }
        }
        let text: Vec<String> = groups
            .into_iter()
            .map(|(n, s)| if n == 1 { format!("{s}") } else { format!("{n}@{s}") })
            .collect();
        f.write_str(&text.join("/"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_codes() {
        assert_eq!("UF".parse::<PanelKind>().unwrap(), PanelKind::UpperFlange);
        assert_eq!("cl".parse::<BracingType>().unwrap(), BracingType::CL);
        assert_eq!(" TL ".parse::<PartCorner>().unwrap(), PartCorner::TopLeft);
        assert_eq!(PanelKind::Web.to_string(), "W");
    }

    #[test]
    fn test_unknown_code_names_kind() {
        let err = "X".parse::<Side>().unwrap_err();
        assert_eq!(err.kind, "side");
        assert!(err.to_string().contains("T, B, L or R"));
    }

    #[test]
    fn test_side_export() {
        assert_eq!("TopOnly".parse::<SideExport>().unwrap(), SideExport::TopOnly);
        assert_eq!("both".parse::<SideExport>().unwrap(), SideExport::Both);
        assert!("sideways".parse::<SideExport>().is_err());
    }

    #[test]
    fn test_edge_offset() {
        let e: EdgeOffset = "B40".parse().unwrap();
        assert_eq!(e.kind, EdgeOffsetKind::BoltLine);
        assert_eq!(e.magnitude, 40.0);

        let e: EdgeOffset = "O".parse().unwrap();
        assert_eq!(e.kind, EdgeOffsetKind::Outer);
        assert_eq!(e.magnitude, 0.0);

        assert!("Z10".parse::<EdgeOffset>().is_err());
        assert!("Axx".parse::<EdgeOffset>().is_err());
        assert!("".parse::<EdgeOffset>().is_err());
    }

    #[test]
    fn test_pitch() {
        let p: Pitch = "3@80/50".parse().unwrap();
        assert_eq!(p.spacings(), &[80.0, 80.0, 80.0, 50.0]);
        assert_eq!(p.total(), 290.0);
        assert_eq!(p.positions(), vec![0.0, 80.0, 160.0, 240.0, 290.0]);
        assert_eq!(p.to_string(), "3@80/50");

        assert!("".parse::<Pitch>().unwrap().is_empty());
        assert!("0@80".parse::<Pitch>().is_err());
        assert!("3@-1".parse::<Pitch>().is_err());
        assert!("abc".parse::<Pitch>().is_err());
    }

    #[test]
    fn test_pitch_count_is_bounded() {
        assert!("1000000000@75".parse::<Pitch>().is_err());
        assert!("18446744073709551615@75".parse::<Pitch>().is_err());
        assert!("600@75/600@75".parse::<Pitch>().is_err());

        let p: Pitch = "999@75/1@40".parse().unwrap();
        assert_eq!(p.spacings().len(), MAX_PITCH_SPACINGS);
    }
}
