// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Gussets connecting the cross-beam to the girder webs

mod common;

use approx::assert_relative_eq;
use common::build_with;
use girderkit::{ElementClass, MemberKind};
use serde_json::json;

fn with_gussets(gussets: serde_json::Value) -> (girderkit::Document, girderkit::BuildReport) {
    build_with(|v| v["Gusset"] = gussets)
}

#[test]
fn test_gussets_stay_on_member_side_of_web() {
    let (document, report) = with_gussets(json!([
        { "Panel": "G1B1W", "Member": "CB_G1_G2_C1", "Position": "TL", "EdgeOffset": "A20", "Thick": 10.0 },
        { "Panel": "G2B1W", "Member": "CB_G1_G2_C1", "Position": "TR", "EdgeOffset": "A20", "Thick": 10.0 }
    ]));
    assert!(report.is_complete(), "failures: {:?}", report.failures);
    assert_eq!(document.len(), 13);

    let g1 = document.get("G1B1W-GussTL").unwrap();
    assert_eq!(g1.class, ElementClass::Plate);
    assert_eq!(g1.container.as_deref(), Some("G1"));
    let bbox = g1.solid.bounding_box();
    // G1 web face toward G2 is at y = -6; G2 lies at y = -2500
    assert!(bbox.max.y <= -6.0 + 1e-6, "gusset crosses the G1 web: {bbox:?}");
    assert!(bbox.min.y > -1_250.0);
    assert_relative_eq!(bbox.max.z - bbox.min.z, 10.0, epsilon = 1e-6);
    assert!(bbox.max.z <= -100.0 + 1e-6 || bbox.min.z >= -100.0 - 1e-6);

    let bbox = document.get("G2B1W-GussTR").unwrap().solid.bounding_box();
    assert!(bbox.min.y >= -2_494.0 - 1e-6, "gusset crosses the G2 web: {bbox:?}");
    assert!(bbox.max.y < -1_250.0);
}

#[test]
fn test_stiffener_picks_thickness_side() {
    let stiffener_at = |z: f64| {
        json!([{
            "Panel": "G1B1W", "Member": "CB_G1_G2_C1", "Position": "T",
            "EdgeOffset": "A0", "Thick": 12.0,
            "Stiffener": { "X": 5000.0, "Y": -600.0, "Z": z }
        }])
    };

    let (document, _) = with_gussets(stiffener_at(-50.0));
    let below = document.get("G1B1W-GussT").unwrap().solid.bounding_box();
    let (document, _) = with_gussets(stiffener_at(-150.0));
    let above = document.get("G1B1W-GussT").unwrap().solid.bounding_box();

    // the plate is placed on the side away from the stiffener
    assert_relative_eq!(below.max.z, -100.0, epsilon = 1e-6);
    assert_relative_eq!(below.min.z, -112.0, epsilon = 1e-6);
    assert_relative_eq!(above.min.z, -100.0, epsilon = 1e-6);
    assert_relative_eq!(above.max.z, -88.0, epsilon = 1e-6);
}

#[test]
fn test_gusset_for_unknown_member_is_recorded() {
    let (document, report) = with_gussets(json!([
        { "Panel": "G1B1W", "Member": "CB_G2_G3_C1", "Position": "TL", "EdgeOffset": "A20", "Thick": 10.0 }
    ]));
    assert_eq!(document.len(), 11);
    let failure = report.failure("G1B1W-GussTL").unwrap();
    assert_eq!(failure.kind, MemberKind::Gusset);
    assert!(failure.error.contains("CB_G2_G3_C1"));
}
