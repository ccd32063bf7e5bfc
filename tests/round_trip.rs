//! Geometry round-trip tests.
//!
//! Each element is generated from known parameters, then its intention is
//! matched against that same noiseless template. The fit must recover the
//! original parameters.

use aero_judge::elements::{Element, Line, Loop, Sampling, Snap, Spin, StallTurn};
use aero_judge::{ParameterKind, Transformation};
use approx::assert_relative_eq;
use nalgebra::{UnitQuaternion, Vector3};
use std::f64::consts::PI;

// =============================================================================
// HELPERS
// =============================================================================

const TOLERANCE: f64 = 1e-3;

/// A few entry transforms: level, banked, climbing and heading across.
fn starts() -> Vec<Transformation> {
    vec![
        Transformation::identity(),
        Transformation::new(Vector3::new(-120.0, 150.0, -80.0), UnitQuaternion::identity()),
        Transformation::new(
            Vector3::new(50.0, 170.0, -150.0),
            UnitQuaternion::from_euler_angles(0.4, 0.0, 0.0),
        ),
        Transformation::new(
            Vector3::new(0.0, 160.0, -100.0),
            UnitQuaternion::from_euler_angles(0.0, 0.6, 0.0),
        ),
        Transformation::new(
            Vector3::new(10.0, 140.0, -120.0),
            UnitQuaternion::from_euler_angles(PI, 0.2, PI / 2.0),
        ),
    ]
}

/// Generate `element` from `start` and fit it back.
fn round_trip(element: &Element, start: &Transformation, freq: f64) -> Element {
    let flown = element
        .create_template(start, Sampling::Rate(freq))
        .expect("template");
    element
        .match_intention(start, &flown)
        .expect("fit")
        .element
}

fn assert_parameters_recovered(original: &Element, fitted: &Element) {
    for kind in [
        ParameterKind::Speed,
        ParameterKind::Length,
        ParameterKind::Radius,
        ParameterKind::Angle,
        ParameterKind::Roll,
        ParameterKind::Rate,
    ] {
        match (original.parameter(kind), fitted.parameter(kind)) {
            (Some(a), Some(b)) => assert_relative_eq!(a, b, epsilon = 1e-9, max_relative = TOLERANCE),
            (None, None) => {}
            _ => panic!("{:?} present on only one element", kind),
        }
    }
}

// =============================================================================
// LINES
// =============================================================================

#[test]
fn test_line_round_trip() {
    let lines = [
        Line::new("l", 30.0, 100.0),
        Line::new("l", 22.0, 40.0).with_roll(PI),
        Line::new("l", 35.0, 180.0).with_roll(-4.0 * PI),
        Line::new("l", 28.0, 5.0),
    ];
    for start in starts() {
        for line in &lines {
            let element = Element::from(line.clone());
            let fitted = round_trip(&element, &start, 25.0);
            assert_parameters_recovered(&element, &fitted);
        }
    }
}

#[test]
fn test_line_end_transform_round_trip() {
    for start in starts() {
        let element = Element::from(Line::new("l", 30.0, 120.0).with_roll(PI / 2.0));
        let fitted = round_trip(&element, &start, 25.0);
        let a = element.end_transform(&start);
        let b = fitted.end_transform(&start);
        assert_relative_eq!(a.pos, b.pos, epsilon = 1e-6);
        assert_relative_eq!(a.y_axis(), b.y_axis(), epsilon = 1e-6);
    }
}

// =============================================================================
// LOOPS
// =============================================================================

#[test]
fn test_loop_round_trip() {
    let loops = [
        Loop::new("o", 30.0, 80.0, 2.0 * PI),
        Loop::new("o", 30.0, 50.0, PI),
        Loop::new("o", 25.0, 60.0, -PI / 2.0),
        Loop::new("o", 32.0, 120.0, PI / 4.0),
        Loop::new("o", 30.0, 70.0, 2.0 * PI).with_roll(2.0 * PI),
        Loop::new("o", 30.0, 70.0, -PI).with_roll(-PI),
        Loop::new("o", 30.0, 90.0, PI).with_ke(PI / 2.0),
        Loop::new("o", 30.0, 90.0, -PI / 2.0).with_ke(PI / 4.0),
    ];
    for start in starts() {
        for looping in &loops {
            let element = Element::from(looping.clone());
            let fitted = round_trip(&element, &start, 25.0);
            assert_parameters_recovered(&element, &fitted);
        }
    }
}

#[test]
fn test_loop_frame_is_centre_and_axis() {
    for start in starts() {
        let element = Element::from(Loop::new("o", 30.0, 80.0, -PI).with_ke(PI / 2.0));
        let flown = element
            .create_template(&start, Sampling::Rate(25.0))
            .unwrap();
        let fit = element.match_intention(&start, &flown).unwrap();

        // every sample sits at the fitted radius in the frame's XZ plane
        for state in flown.states() {
            let local = fit.frame.to_local(&state.pos);
            assert_relative_eq!(local.y, 0.0, epsilon = 1e-6);
            assert_relative_eq!((local.x * local.x + local.z * local.z).sqrt(), 80.0, epsilon = 1e-6);
        }
    }
}

#[test]
fn test_loop_low_sample_rate() {
    let element = Element::from(Loop::new("o", 30.0, 100.0, PI / 2.0));
    let fitted = round_trip(&element, &Transformation::identity(), 5.0);
    assert_parameters_recovered(&element, &fitted);
}

// =============================================================================
// AUTOROTATIONS AND STALL TURNS
// =============================================================================

#[test]
fn test_autorotation_round_trip() {
    let elements = [
        Element::from(Snap::new("s", 25.0, 2.0 * PI, 4.0 * PI)),
        Element::from(Snap::new("s", 25.0, -PI, 3.0 * PI).with_break_angle(-0.25)),
        Element::from(Spin::new("s", 8.0, 2.0, 2.5 * PI)),
        Element::from(Spin::new("s", 8.0, -1.5, 2.0 * PI).with_nose_angle(0.7)),
    ];
    for start in starts() {
        for element in &elements {
            let fitted = round_trip(element, &start, 25.0);
            assert_parameters_recovered(element, &fitted);
        }
    }
}

#[test]
fn test_stall_turn_round_trip() {
    let elements = [
        Element::from(StallTurn::new("st", PI, 1.5 * PI).with_speed(2.0)),
        Element::from(StallTurn::new("st", -PI, PI).with_speed(0.5)),
    ];
    for start in starts() {
        for element in &elements {
            let fitted = round_trip(element, &start, 25.0);
            assert_parameters_recovered(element, &fitted);
        }
    }
}
