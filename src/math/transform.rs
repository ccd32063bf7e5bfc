//! Rigid transformations and rotation helpers.
//!
//! Body axes follow the aircraft convention: x forward, y starboard, z down.

use nalgebra::{Rotation3, Unit, UnitQuaternion, Vector3};
use std::f64::consts::PI;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Position plus attitude.
///
/// Used both as the start pose of an element and as the reference frame in
/// which an element's errors are measured.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Transformation {
    /// Origin in the contest frame (m).
    pub pos: Vector3<f64>,
    /// Rotation from the local frame to the contest frame.
    pub att: UnitQuaternion<f64>,
}

impl Default for Transformation {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transformation {
    /// Create a transformation from a position and attitude.
    #[must_use]
    pub const fn new(pos: Vector3<f64>, att: UnitQuaternion<f64>) -> Self {
        Self { pos, att }
    }

    /// Identity transformation at the origin.
    #[must_use]
    pub fn identity() -> Self {
        Self {
            pos: Vector3::zeros(),
            att: UnitQuaternion::identity(),
        }
    }

    /// Build a frame from an origin and two axes.
    ///
    /// `x` is normalised, `y` is orthogonalised against it and `z = x × y`.
    /// Returns `None` if the axes are parallel or zero.
    #[must_use]
    pub fn from_axes(origin: Vector3<f64>, x: &Vector3<f64>, y: &Vector3<f64>) -> Option<Self> {
        let x = x.try_normalize(1e-12)?;
        let y = (y - x * x.dot(y)).try_normalize(1e-12)?;
        let z = x.cross(&y);
        let rot = Rotation3::from_basis_unchecked(&[x, y, z]);
        Some(Self {
            pos: origin,
            att: UnitQuaternion::from_rotation_matrix(&rot),
        })
    }

    /// Local x axis in the contest frame.
    #[must_use]
    pub fn x_axis(&self) -> Vector3<f64> {
        self.att * Vector3::x()
    }

    /// Local y axis in the contest frame.
    #[must_use]
    pub fn y_axis(&self) -> Vector3<f64> {
        self.att * Vector3::y()
    }

    /// Local z axis in the contest frame.
    #[must_use]
    pub fn z_axis(&self) -> Vector3<f64> {
        self.att * Vector3::z()
    }

    /// Express a contest-frame point in local coordinates.
    #[must_use]
    pub fn to_local(&self, point: &Vector3<f64>) -> Vector3<f64> {
        self.att.inverse_transform_vector(&(point - self.pos))
    }

    /// Express a contest-frame direction in local coordinates.
    #[must_use]
    pub fn to_local_vector(&self, v: &Vector3<f64>) -> Vector3<f64> {
        self.att.inverse_transform_vector(v)
    }

    /// Map a local point to the contest frame.
    #[must_use]
    pub fn to_world(&self, point: &Vector3<f64>) -> Vector3<f64> {
        self.pos + self.att * point
    }
}

/// Rotation about the x axis.
#[must_use]
pub fn rx(angle: f64) -> UnitQuaternion<f64> {
    UnitQuaternion::from_axis_angle(&Vector3::x_axis(), angle)
}

/// Rotation about the y axis.
#[must_use]
pub fn ry(angle: f64) -> UnitQuaternion<f64> {
    UnitQuaternion::from_axis_angle(&Vector3::y_axis(), angle)
}

/// Rotation about the z axis.
#[must_use]
pub fn rz(angle: f64) -> UnitQuaternion<f64> {
    UnitQuaternion::from_axis_angle(&Vector3::z_axis(), angle)
}

/// Rotation about an arbitrary (not necessarily unit) axis.
#[must_use]
pub fn about(axis: &Vector3<f64>, angle: f64) -> UnitQuaternion<f64> {
    UnitQuaternion::from_axis_angle(&Unit::new_normalize(*axis), angle)
}

/// Wrap an angle to `(-π, π]`.
#[must_use]
pub fn wrap_angle(angle: f64) -> f64 {
    let wrapped = (angle + PI).rem_euclid(2.0 * PI) - PI;
    if wrapped <= -PI {
        wrapped + 2.0 * PI
    } else {
        wrapped
    }
}

/// Sign of `value`, or `fallback` when the value is zero.
#[must_use]
pub fn sign_or(value: f64, fallback: f64) -> f64 {
    if value > 0.0 {
        1.0
    } else if value < 0.0 {
        -1.0
    } else {
        fallback.signum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_local_round_trip() {
        let t = Transformation::new(Vector3::new(1.0, 2.0, 3.0), rz(0.7) * rx(0.3));
        let p = Vector3::new(-4.0, 5.0, 0.5);
        let back = t.to_world(&t.to_local(&p));
        assert_relative_eq!(back, p, epsilon = 1e-12);
    }

    #[test]
    fn test_axes() {
        let t = Transformation::new(Vector3::zeros(), rz(FRAC_PI_2));
        assert_relative_eq!(t.x_axis(), Vector3::y(), epsilon = 1e-12);
        assert_relative_eq!(t.y_axis(), -Vector3::x(), epsilon = 1e-12);
    }

    #[test]
    fn test_from_axes() {
        let t = Transformation::from_axes(Vector3::zeros(), &Vector3::y(), &Vector3::z())
            .unwrap();
        assert_relative_eq!(t.x_axis(), Vector3::y(), epsilon = 1e-12);
        assert_relative_eq!(t.y_axis(), Vector3::z(), epsilon = 1e-12);
        assert_relative_eq!(t.z_axis(), Vector3::x(), epsilon = 1e-12);

        assert!(Transformation::from_axes(Vector3::zeros(), &Vector3::x(), &Vector3::x())
            .is_none());
    }

    #[test]
    fn test_wrap_angle() {
        assert_relative_eq!(wrap_angle(3.0 * PI), PI, epsilon = 1e-12);
        assert_relative_eq!(wrap_angle(-FRAC_PI_2), -FRAC_PI_2, epsilon = 1e-12);
        assert_relative_eq!(wrap_angle(2.5 * PI), 0.5 * PI, epsilon = 1e-12);
    }

    #[test]
    fn test_sign_or() {
        assert_eq!(sign_or(2.0, -1.0), 1.0);
        assert_eq!(sign_or(-0.1, 1.0), -1.0);
        assert_eq!(sign_or(0.0, -3.0), -1.0);
    }
}
