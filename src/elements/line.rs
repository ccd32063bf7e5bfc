use nalgebra::Vector3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::{flown_speed, no_parameter, positive, Element, ElementGeometry, ElementKind, Fit, ParameterKind};
use crate::error::{JudgeError, Result};
use crate::math::transform::{rx, sign_or, Transformation};
use crate::state::{State, StateSequence};

/// Straight flight along the start heading, with an optional roll.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Line {
    /// Element id.
    pub id: String,
    /// Airspeed (m/s).
    pub speed: f64,
    /// Length (m).
    pub length: f64,
    /// Signed roll angle flown over the length (rad).
    pub roll: f64,
}

impl Line {
    /// Create a line without roll.
    #[must_use]
    pub fn new(id: impl Into<String>, speed: f64, length: f64) -> Self {
        Self {
            id: id.into(),
            speed,
            length,
            roll: 0.0,
        }
    }

    /// Set the roll angle.
    #[must_use]
    pub fn with_roll(mut self, roll: f64) -> Self {
        self.roll = roll;
        self
    }
}

impl ElementGeometry for Line {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> ElementKind {
        ElementKind::Line
    }

    fn validate(&self) -> Result<()> {
        positive(&self.id, "speed", self.speed)?;
        positive(&self.id, "length", self.length)?;
        if !self.roll.is_finite() {
            return Err(JudgeError::degenerate(&self.id, "roll is not finite"));
        }
        Ok(())
    }

    fn duration(&self) -> f64 {
        self.length / self.speed
    }

    fn state_at(&self, start: &Transformation, t: f64) -> State {
        let roll_rate = self.roll / self.duration();
        State {
            pos: start.pos + start.att * Vector3::new(self.speed * t, 0.0, 0.0),
            att: start.att * rx(roll_rate * t),
            vel: Vector3::new(self.speed, 0.0, 0.0),
            rvel: Vector3::new(roll_rate, 0.0, 0.0),
            acc: Vector3::zeros(),
        }
    }

    fn match_intention(&self, start: &Transformation, flown: &StateSequence) -> Result<Fit> {
        let displacement = flown.last().pos - flown.first().pos;
        let length = displacement.dot(&start.x_axis()).abs();
        if length <= f64::EPSILON {
            return Err(JudgeError::degenerate(&self.id, "no displacement along the heading"));
        }
        let element = Self {
            id: self.id.clone(),
            speed: flown_speed(&self.id, flown)?,
            length,
            roll: self.roll.abs() * sign_or(flown.mean_rate().x, self.roll),
        };
        Ok(Fit {
            element: element.into(),
            frame: *start,
        })
    }

    fn parameter(&self, kind: ParameterKind) -> Option<f64> {
        match kind {
            ParameterKind::Speed => Some(self.speed),
            ParameterKind::Length => Some(self.length),
            ParameterKind::Roll => Some(self.roll),
            _ => None,
        }
    }

    fn with_parameter(&self, kind: ParameterKind, value: f64) -> Result<Element> {
        let mut out = self.clone();
        match kind {
            ParameterKind::Speed => out.speed = value,
            ParameterKind::Length => out.length = value,
            ParameterKind::Roll => out.roll = value,
            _ => return Err(no_parameter(&self.id, kind)),
        }
        Ok(out.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::Sampling;
    use crate::math::transform::rz;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    #[test]
    fn test_end_transform() {
        let start = Transformation::new(Vector3::new(1.0, 2.0, 3.0), rz(PI / 2.0));
        let line = Element::from(Line::new("l", 20.0, 100.0).with_roll(PI));
        let end = line.end_transform(&start);
        assert_relative_eq!(end.pos, Vector3::new(1.0, 102.0, 3.0), epsilon = 1e-9);
        assert_relative_eq!(end.y_axis(), -start.y_axis(), epsilon = 1e-9);
    }

    #[test]
    fn test_match_recovers_reversed_roll() {
        let start = Transformation::identity();
        let flown_line = Element::from(Line::new("l", 25.0, 150.0).with_roll(-2.0 * PI));
        let flown = flown_line
            .create_template(&start, Sampling::Rate(25.0))
            .unwrap();

        let nominal = Element::from(Line::new("l", 30.0, 100.0).with_roll(2.0 * PI));
        let fit = nominal.match_intention(&start, &flown).unwrap();
        assert_relative_eq!(fit.element.parameter(ParameterKind::Roll).unwrap(), -2.0 * PI);
        assert_relative_eq!(fit.element.parameter(ParameterKind::Length).unwrap(), 150.0, epsilon = 1e-9);
        assert_relative_eq!(fit.element.parameter(ParameterKind::Speed).unwrap(), 25.0, epsilon = 1e-9);
        assert_eq!(fit.frame, start);
    }

    #[test]
    fn test_match_without_displacement() {
        let start = Transformation::identity();
        let hover = StateSequence::new(
            vec![0.0, 1.0],
            vec![
                State {
                    vel: Vector3::new(10.0, 0.0, 0.0),
                    ..State::default()
                };
                2
            ],
        )
        .unwrap();
        let line = Element::from(Line::new("l", 30.0, 100.0));
        assert!(matches!(
            line.match_intention(&start, &hover),
            Err(JudgeError::DegenerateElement { .. })
        ));
    }
}
