#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::snap::{fit_autorotation, Autorotation};
use super::{no_parameter, non_zero, positive, Element, ElementGeometry, ElementKind, Fit, ParameterKind};
use crate::error::{JudgeError, Result};
use crate::math::transform::Transformation;
use crate::state::{State, StateSequence};

/// Fraction of a spin spent in entry and in recovery.
const ENTRY_FRACTION: f64 = 0.1;

/// Spin: a sustained autorotation along the start heading, which is usually
/// vertically down.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Spin {
    /// Element id.
    pub id: String,
    /// Descent speed along the path (m/s).
    pub speed: f64,
    /// Signed rotation about the path (rad).
    pub rotation: f64,
    /// Rotation rate magnitude (rad/s).
    pub rate: f64,
    /// Nose offset from the path while spinning (rad).
    pub nose_angle: f64,
}

impl Spin {
    /// Create a spin of `turns` signed revolutions.
    #[must_use]
    pub fn new(id: impl Into<String>, speed: f64, turns: f64, rate: f64) -> Self {
        Self {
            id: id.into(),
            speed,
            rotation: turns * std::f64::consts::TAU,
            rate,
            nose_angle: 0.5,
        }
    }

    /// Set the nose offset.
    #[must_use]
    pub fn with_nose_angle(mut self, nose_angle: f64) -> Self {
        self.nose_angle = nose_angle;
        self
    }

    fn motion(&self) -> Autorotation {
        Autorotation {
            speed: self.speed,
            rotation: self.rotation,
            duration: self.duration(),
            offset: self.nose_angle,
            ramp: ENTRY_FRACTION,
        }
    }
}

impl ElementGeometry for Spin {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> ElementKind {
        ElementKind::Spin
    }

    fn validate(&self) -> Result<()> {
        positive(&self.id, "speed", self.speed)?;
        non_zero(&self.id, "rotation", self.rotation)?;
        positive(&self.id, "rate", self.rate)?;
        if !self.nose_angle.is_finite() {
            return Err(JudgeError::degenerate(&self.id, "nose angle is not finite"));
        }
        Ok(())
    }

    fn duration(&self) -> f64 {
        self.rotation.abs() / self.rate
    }

    fn state_at(&self, start: &Transformation, t: f64) -> State {
        self.motion().state_at(start, t)
    }

    fn match_intention(&self, start: &Transformation, flown: &StateSequence) -> Result<Fit> {
        let (speed, rotation, rate) = fit_autorotation(&self.id, self.rotation, flown)?;
        let element = Self {
            id: self.id.clone(),
            speed,
            rotation,
            rate,
            nose_angle: self.nose_angle,
        };
        Ok(Fit {
            element: element.into(),
            frame: *start,
        })
    }

    fn parameter(&self, kind: ParameterKind) -> Option<f64> {
        match kind {
            ParameterKind::Speed => Some(self.speed),
            ParameterKind::Roll => Some(self.rotation),
            ParameterKind::Rate => Some(self.rate),
            ParameterKind::Angle => Some(self.nose_angle),
            _ => None,
        }
    }

    fn with_parameter(&self, kind: ParameterKind, value: f64) -> Result<Element> {
        let mut out = self.clone();
        match kind {
            ParameterKind::Speed => out.speed = value,
            ParameterKind::Roll => out.rotation = value,
            ParameterKind::Rate => out.rate = value,
            ParameterKind::Angle => out.nose_angle = value,
            _ => return Err(no_parameter(&self.id, kind)),
        }
        Ok(out.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::Sampling;
    use crate::math::transform::ry;
    use approx::assert_relative_eq;
    use nalgebra::Vector3;
    use std::f64::consts::PI;

    #[test]
    fn test_spin_descends() {
        let down = Transformation::new(Vector3::new(0.0, 150.0, -200.0), ry(-PI / 2.0));
        let spin = Element::from(Spin::new("sp", 10.0, 2.0, 2.0 * PI));
        assert_relative_eq!(spin.duration(), 2.0);
        let end = spin.end_transform(&down);
        assert_relative_eq!(end.pos, Vector3::new(0.0, 150.0, -180.0), epsilon = 1e-9);
        assert_relative_eq!(end.x_axis(), Vector3::z(), epsilon = 1e-9);
    }

    #[test]
    fn test_match_turns() {
        let start = Transformation::identity();
        let flown = Element::from(Spin::new("sp", 12.0, -1.5, 1.5 * PI))
            .create_template(&start, Sampling::Rate(25.0))
            .unwrap();
        let fit = Element::from(Spin::new("sp", 10.0, 2.5, 2.0 * PI))
            .match_intention(&start, &flown)
            .unwrap();
        assert_relative_eq!(fit.element.parameter(ParameterKind::Roll).unwrap(), -5.0 * PI, epsilon = 1e-12);
        assert_relative_eq!(fit.element.parameter(ParameterKind::Rate).unwrap(), 2.5 * PI, epsilon = 1e-9);
    }
}
