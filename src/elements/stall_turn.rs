use nalgebra::Vector3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::{flown_duration, no_parameter, non_zero, positive, Element, ElementGeometry, ElementKind, Fit, ParameterKind};
use crate::error::{JudgeError, Result};
use crate::math::transform::{rz, sign_or, Transformation};
use crate::state::{State, StateSequence};

/// Yaw rotation about the body z axis at (near) zero airspeed.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StallTurn {
    /// Element id.
    pub id: String,
    /// Residual speed along the start heading (m/s), may be zero.
    pub speed: f64,
    /// Signed yaw angle (rad).
    pub yaw: f64,
    /// Yaw rate magnitude (rad/s).
    pub rate: f64,
}

impl StallTurn {
    /// Create a stall turn at zero airspeed.
    #[must_use]
    pub fn new(id: impl Into<String>, yaw: f64, rate: f64) -> Self {
        Self {
            id: id.into(),
            speed: 0.0,
            yaw,
            rate,
        }
    }

    /// Set the residual speed.
    #[must_use]
    pub fn with_speed(mut self, speed: f64) -> Self {
        self.speed = speed;
        self
    }
}

impl ElementGeometry for StallTurn {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> ElementKind {
        ElementKind::StallTurn
    }

    fn validate(&self) -> Result<()> {
        if !(self.speed.is_finite() && self.speed >= 0.0) {
            return Err(JudgeError::degenerate(&self.id, "speed must be non-negative"));
        }
        non_zero(&self.id, "yaw", self.yaw)?;
        positive(&self.id, "rate", self.rate)
    }

    fn duration(&self) -> f64 {
        self.yaw.abs() / self.rate
    }

    fn state_at(&self, start: &Transformation, t: f64) -> State {
        let yaw_rate = self.yaw / self.duration();
        let yaw = yaw_rate * t;
        State {
            pos: start.pos + start.att * Vector3::new(self.speed * t, 0.0, 0.0),
            att: start.att * rz(yaw),
            vel: rz(-yaw) * Vector3::new(self.speed, 0.0, 0.0),
            rvel: Vector3::new(0.0, 0.0, yaw_rate),
            acc: Vector3::zeros(),
        }
    }

    fn match_intention(&self, start: &Transformation, flown: &StateSequence) -> Result<Fit> {
        let yaw = self.yaw.abs() * sign_or(flown.mean_rate().z, self.yaw);
        let element = Self {
            id: self.id.clone(),
            speed: flown.mean_speed(),
            yaw,
            rate: yaw.abs() / flown_duration(&self.id, flown)?,
        };
        Ok(Fit {
            element: element.into(),
            frame: *start,
        })
    }

    fn parameter(&self, kind: ParameterKind) -> Option<f64> {
        match kind {
            ParameterKind::Speed => Some(self.speed),
            ParameterKind::Angle => Some(self.yaw),
            ParameterKind::Rate => Some(self.rate),
            _ => None,
        }
    }

    fn with_parameter(&self, kind: ParameterKind, value: f64) -> Result<Element> {
        let mut out = self.clone();
        match kind {
            ParameterKind::Speed => out.speed = value,
            ParameterKind::Angle => out.yaw = value,
            ParameterKind::Rate => out.rate = value,
            _ => return Err(no_parameter(&self.id, kind)),
        }
        Ok(out.into())
    }
}
