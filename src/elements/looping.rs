use nalgebra::{Vector2, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::{flown_speed, no_parameter, non_zero, positive, Element, ElementGeometry, ElementKind, Fit, ParameterKind};
use crate::error::{JudgeError, Result};
use crate::math::fit::fit_circle;
use crate::math::transform::{about, rx, sign_or, Transformation};
use crate::state::{State, StateSequence};

/// Circular arc about an axis perpendicular to the start heading, with an
/// optional roll superimposed along the path.
///
/// With `ke = 0` the loop axis is the body y axis, so a positive angle
/// pulls towards the canopy (body -z). Increasing `ke` tilts the loop axis
/// about the heading towards body z; `ke = π/2` gives a flat turn.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Loop {
    /// Element id.
    pub id: String,
    /// Airspeed (m/s).
    pub speed: f64,
    /// Radius (m).
    pub radius: f64,
    /// Signed swept angle (rad).
    pub angle: f64,
    /// Signed roll angle flown around the arc (rad).
    pub roll: f64,
    /// Tilt of the loop axis about the start heading (rad).
    pub ke: f64,
}

impl Loop {
    /// Create an unrolled loop in the pitch plane.
    #[must_use]
    pub fn new(id: impl Into<String>, speed: f64, radius: f64, angle: f64) -> Self {
        Self {
            id: id.into(),
            speed,
            radius,
            angle,
            roll: 0.0,
            ke: 0.0,
        }
    }

    /// Set the superimposed roll.
    #[must_use]
    pub fn with_roll(mut self, roll: f64) -> Self {
        self.roll = roll;
        self
    }

    /// Set the loop axis tilt.
    #[must_use]
    pub fn with_ke(mut self, ke: f64) -> Self {
        self.ke = ke;
        self
    }

    /// Loop axis in start body axes.
    fn axis(&self) -> Vector3<f64> {
        Vector3::new(0.0, self.ke.cos(), self.ke.sin())
    }

    /// Direction from the start point to the centre of a positive loop, in
    /// start body axes.
    fn normal(&self) -> Vector3<f64> {
        Vector3::new(0.0, self.ke.sin(), -self.ke.cos())
    }
}

impl ElementGeometry for Loop {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> ElementKind {
        ElementKind::Loop
    }

    fn validate(&self) -> Result<()> {
        positive(&self.id, "speed", self.speed)?;
        positive(&self.id, "radius", self.radius)?;
        non_zero(&self.id, "angle", self.angle)?;
        if !(self.roll.is_finite() && self.ke.is_finite()) {
            return Err(JudgeError::degenerate(&self.id, "roll and ke must be finite"));
        }
        Ok(())
    }

    fn duration(&self) -> f64 {
        self.angle.abs() * self.radius / self.speed
    }

    fn state_at(&self, start: &Transformation, t: f64) -> State {
        let duration = self.duration();
        let pitch_rate = self.angle / duration;
        let roll_rate = self.roll / duration;
        let side = self.angle.signum();
        let axis = self.axis();
        let normal = self.normal();

        let sweep = about(&axis, pitch_rate * t);
        let unroll = rx(-roll_rate * t);
        let centre = start.pos + start.att * (normal * (side * self.radius));

        State {
            pos: centre + start.att * (sweep * (normal * (-side * self.radius))),
            att: start.att * sweep * rx(roll_rate * t),
            vel: Vector3::new(self.speed, 0.0, 0.0),
            rvel: unroll * (axis * pitch_rate) + Vector3::new(roll_rate, 0.0, 0.0),
            acc: unroll * (normal * (side * self.speed * self.speed / self.radius)),
        }
    }

    fn match_intention(&self, start: &Transformation, flown: &StateSequence) -> Result<Fit> {
        let heading = start.x_axis();
        let axis = start.att * self.axis();
        let normal = start.att * self.normal();

        let points: Vec<Vector2<f64>> = flown
            .states()
            .iter()
            .map(|s| {
                let d = s.pos - start.pos;
                Vector2::new(d.dot(&heading), d.dot(&normal))
            })
            .collect();
        let circle = fit_circle(&points)?;

        let n = flown.len() as f64;
        let offset = flown
            .states()
            .iter()
            .map(|s| (s.pos - start.pos).dot(&axis))
            .sum::<f64>()
            / n;
        let swept = flown
            .states()
            .iter()
            .map(|s| s.world_rvel().dot(&axis))
            .sum::<f64>()
            / n;

        let centre = start.pos + heading * circle.centre.x + normal * circle.centre.y + axis * offset;
        let frame = Transformation::from_axes(centre, &heading, &axis)
            .ok_or_else(|| JudgeError::fit_failed(format!("loop {} has no plane", self.id)))?;

        let element = Self {
            id: self.id.clone(),
            speed: flown_speed(&self.id, flown)?,
            radius: circle.radius,
            angle: self.angle.abs() * sign_or(swept, self.angle),
            roll: self.roll.abs() * sign_or(flown.mean_rate().x, self.roll),
            ke: self.ke,
        };
        Ok(Fit {
            element: element.into(),
            frame,
        })
    }

    fn parameter(&self, kind: ParameterKind) -> Option<f64> {
        match kind {
            ParameterKind::Speed => Some(self.speed),
            ParameterKind::Radius => Some(self.radius),
            ParameterKind::Angle => Some(self.angle),
            ParameterKind::Roll => Some(self.roll),
            _ => None,
        }
    }

    fn with_parameter(&self, kind: ParameterKind, value: f64) -> Result<Element> {
        let mut out = self.clone();
        match kind {
            ParameterKind::Speed => out.speed = value,
            ParameterKind::Radius => out.radius = value,
            ParameterKind::Angle => out.angle = value,
            ParameterKind::Roll => out.roll = value,
            _ => return Err(no_parameter(&self.id, kind)),
        }
        Ok(out.into())
    }
}
