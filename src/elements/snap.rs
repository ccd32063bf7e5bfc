use nalgebra::Vector3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::{
    flown_duration, flown_speed, no_parameter, non_zero, positive, Element, ElementGeometry, ElementKind, Fit,
    ParameterKind,
};
use crate::error::{JudgeError, Result};
use crate::math::transform::{rx, ry, sign_or, Transformation};
use crate::state::{State, StateSequence};

/// Fraction of a snap spent breaking and recovering.
const BREAK_FRACTION: f64 = 0.2;

/// Autorotation: the flight path stays on the start heading while the
/// aircraft rotates about it, pitched away from it by a ramped offset.
///
/// The offset ramps linearly from zero over `ramp * duration`, holds, and
/// ramps back to zero over the same time at the end.
pub(super) struct Autorotation {
    pub speed: f64,
    pub rotation: f64,
    pub duration: f64,
    pub offset: f64,
    pub ramp: f64,
}

impl Autorotation {
    /// Pitch offset and its rate at time `t`.
    fn offset_at(&self, t: f64) -> (f64, f64) {
        let ramp_time = self.ramp * self.duration;
        if ramp_time <= 0.0 {
            return (self.offset, 0.0);
        }
        let slope = self.offset / ramp_time;
        if t < ramp_time {
            (slope * t, slope)
        } else if t > self.duration - ramp_time {
            (slope * (self.duration - t), -slope)
        } else {
            (self.offset, 0.0)
        }
    }

    pub fn state_at(&self, start: &Transformation, t: f64) -> State {
        let rotation_rate = self.rotation / self.duration;
        let (offset, offset_rate) = self.offset_at(t);
        let unpitch = ry(-offset);
        State {
            pos: start.pos + start.att * Vector3::new(self.speed * t, 0.0, 0.0),
            att: start.att * rx(rotation_rate * t) * ry(offset),
            vel: unpitch * Vector3::new(self.speed, 0.0, 0.0),
            rvel: unpitch * Vector3::new(rotation_rate, 0.0, 0.0) + Vector3::new(0.0, offset_rate, 0.0),
            acc: Vector3::zeros(),
        }
    }
}

/// Fitted speed, signed rotation and rate of a flown autorotation.
pub(super) fn fit_autorotation(id: &str, rotation: f64, flown: &StateSequence) -> Result<(f64, f64, f64)> {
    let speed = flown_speed(id, flown)?;
    let rotation = rotation.abs() * sign_or(flown.mean_rate().x, rotation);
    let rate = rotation.abs() / flown_duration(id, flown)?;
    Ok((speed, rotation, rate))
}

/// Snap roll: a short, pitched autorotation.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Snap {
    /// Element id.
    pub id: String,
    /// Airspeed (m/s).
    pub speed: f64,
    /// Signed rotation about the flight path (rad).
    pub roll: f64,
    /// Rotation rate magnitude (rad/s).
    pub rate: f64,
    /// Pitch break away from the flight path (rad).
    pub break_angle: f64,
}

impl Snap {
    /// Create a positive snap.
    #[must_use]
    pub fn new(id: impl Into<String>, speed: f64, roll: f64, rate: f64) -> Self {
        Self {
            id: id.into(),
            speed,
            roll,
            rate,
            break_angle: 0.3,
        }
    }

    /// Set the pitch break; negative for a negative snap.
    #[must_use]
    pub fn with_break_angle(mut self, break_angle: f64) -> Self {
        self.break_angle = break_angle;
        self
    }

    fn motion(&self) -> Autorotation {
        Autorotation {
            speed: self.speed,
            rotation: self.roll,
            duration: self.duration(),
            offset: self.break_angle,
            ramp: BREAK_FRACTION,
        }
    }
}

impl ElementGeometry for Snap {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> ElementKind {
        ElementKind::Snap
    }

    fn validate(&self) -> Result<()> {
        positive(&self.id, "speed", self.speed)?;
        non_zero(&self.id, "roll", self.roll)?;
        positive(&self.id, "rate", self.rate)?;
        if !self.break_angle.is_finite() {
            return Err(JudgeError::degenerate(&self.id, "break angle is not finite"));
        }
        Ok(())
    }

    fn duration(&self) -> f64 {
        self.roll.abs() / self.rate
    }

    fn state_at(&self, start: &Transformation, t: f64) -> State {
        self.motion().state_at(start, t)
    }

    fn match_intention(&self, start: &Transformation, flown: &StateSequence) -> Result<Fit> {
        let (speed, roll, rate) = fit_autorotation(&self.id, self.roll, flown)?;
        let element = Self {
            id: self.id.clone(),
            speed,
            roll,
            rate,
            break_angle: self.break_angle,
        };
        Ok(Fit {
            element: element.into(),
            frame: *start,
        })
    }

    fn parameter(&self, kind: ParameterKind) -> Option<f64> {
        match kind {
            ParameterKind::Speed => Some(self.speed),
            ParameterKind::Roll => Some(self.roll),
            ParameterKind::Rate => Some(self.rate),
            ParameterKind::Angle => Some(self.break_angle),
            _ => None,
        }
    }

    fn with_parameter(&self, kind: ParameterKind, value: f64) -> Result<Element> {
        let mut out = self.clone();
        match kind {
            ParameterKind::Speed => out.speed = value,
            ParameterKind::Roll => out.roll = value,
            ParameterKind::Rate => out.rate = value,
            ParameterKind::Angle => out.break_angle = value,
            _ => return Err(no_parameter(&self.id, kind)),
        }
        Ok(out.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::Sampling;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    #[test]
    fn test_snap_ends_unpitched_on_heading() {
        let start = Transformation::new(Vector3::new(0.0, 150.0, -100.0), rx(0.0));
        let snap = Element::from(Snap::new("s", 25.0, 2.0 * PI, 4.0 * PI));
        assert_relative_eq!(snap.duration(), 0.5);
        let end = snap.end_transform(&start);
        assert_relative_eq!(end.x_axis(), start.x_axis(), epsilon = 1e-9);
        assert_relative_eq!(end.y_axis(), start.y_axis(), epsilon = 1e-9);
        assert_relative_eq!(end.pos, Vector3::new(12.5, 150.0, -100.0), epsilon = 1e-9);

        let mid = snap.state_at(&start, 0.25);
        assert_relative_eq!(mid.world_vel(), Vector3::new(25.0, 0.0, 0.0), epsilon = 1e-9);
        assert!(mid.vel.z.abs() > 1.0);
    }

    #[test]
    fn test_match_rate_and_direction() {
        let start = Transformation::identity();
        let flown = Element::from(Snap::new("s", 25.0, -2.0 * PI, 3.0 * PI))
            .create_template(&start, Sampling::Rate(25.0))
            .unwrap();
        let fit = Element::from(Snap::new("s", 30.0, 2.0 * PI, 4.0 * PI))
            .match_intention(&start, &flown)
            .unwrap();
        assert_relative_eq!(fit.element.parameter(ParameterKind::Roll).unwrap(), -2.0 * PI);
        assert_relative_eq!(fit.element.parameter(ParameterKind::Rate).unwrap(), 3.0 * PI, epsilon = 1e-9);
        assert_relative_eq!(fit.element.parameter(ParameterKind::Speed).unwrap(), 25.0, epsilon = 1e-9);
        assert_relative_eq!(fit.element.parameter(ParameterKind::Angle).unwrap(), 0.3);
    }
}
