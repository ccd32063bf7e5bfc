//! Measurements: per-sample error signals between flown and template states.
//!
//! A measurement compares an element's flown samples with the matching
//! samples of its intention-corrected template, inside the reference frame
//! established when the element's intention was matched. Each measurement
//! also reports how visible the error is to a judge at a fixed position.
//!
//! # Visibility
//!
//! - vector errors (speed, radius) are most visible when perpendicular to
//!   the line of sight: `sqrt(1 - (d . los)^2)`
//! - track errors (rotations of the flight path) are most visible when the
//!   rotation axis is parallel to the line of sight: `|axis . los|`
//! - roll errors are weighted by how much the wingtip motion (template body
//!   Z) is perpendicular to the line of sight
//!
//! A degenerate direction or line of sight gives full visibility. Visibility
//! is always in [0, 1] and is only ever used as a weight.

use nalgebra::{Vector2, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::config::JudgingConfig;
use crate::criteria::ErrorMode;
use crate::error::{JudgeError, Result};
use crate::math::fit::fit_circle;
use crate::math::transform::{wrap_angle, Transformation};
use crate::state::{State, StateSequence};

/// The quantity a measurement compares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum MeasureKind {
    /// Airspeed magnitude.
    Speed,
    /// Roll of the flown wings about the template body X axis.
    RollAngle,
    /// Flight path rotation about the frame Y axis (climb/dive).
    TrackY,
    /// Flight path rotation about the frame Z axis (heading).
    TrackZ,
    /// Flight path rotation out of a loop plane.
    LoopPlane,
    /// Distance from a loop centre.
    Radius,
}

impl MeasureKind {
    /// Short name for reporting.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Speed => "speed",
            Self::RollAngle => "roll_angle",
            Self::TrackY => "track_y",
            Self::TrackZ => "track_z",
            Self::LoopPlane => "loop_plane",
            Self::Radius => "radius",
        }
    }

    /// How errors of this kind are preprocessed and weighted.
    ///
    /// Speed and radius are set by the pilot and judged as ratios; angles are
    /// fixed by the geometry and judged as absolute differences.
    #[must_use]
    pub const fn mode(self) -> ErrorMode {
        match self {
            Self::Speed | Self::Radius => ErrorMode::Ratio,
            Self::RollAngle | Self::TrackY | Self::TrackZ | Self::LoopPlane => ErrorMode::Absolute,
        }
    }
}

/// Per-sample output of a measurement.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Measurement {
    /// What was measured.
    pub kind: MeasureKind,
    /// Flown signal.
    pub value: Vec<f64>,
    /// Signal the template expects.
    pub expected: Vec<f64>,
    /// Contest-frame direction of the error at each sample.
    pub direction: Vec<Vector3<f64>>,
    /// How visible the error is at each sample, in [0, 1].
    pub visibility: Vec<f64>,
}

impl Measurement {
    /// Number of samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.value.len()
    }

    /// Whether the measurement has no samples.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    /// Preprocessed error series.
    ///
    /// Absolute mode gives `|expected| - |value|`; ratio mode gives
    /// `max(|value|, |expected|) / min(|value|, |expected|)`, which is 1 when
    /// both are zero.
    ///
    /// # Errors
    ///
    /// Returns [`JudgeError::NumericalInstability`] for a ratio where exactly
    /// one side is zero.
    pub fn errors(&self) -> Result<Vec<f64>> {
        self.value
            .iter()
            .zip(self.expected.iter())
            .enumerate()
            .map(|(i, (v, e))| {
                let (v, e) = (v.abs(), e.abs());
                match self.kind.mode() {
                    ErrorMode::Absolute => Ok(e - v),
                    ErrorMode::Ratio => {
                        let (lo, hi) = (v.min(e), v.max(e));
                        if hi == 0.0 {
                            Ok(1.0)
                        } else if lo == 0.0 {
                            Err(JudgeError::numerical_instability(format!(
                                "{} ratio against zero at sample {i}",
                                self.kind.name()
                            )))
                        } else {
                            Ok(hi / lo)
                        }
                    }
                }
            })
            .collect()
    }
}

/// Measure `kind` between equal-length flown and template sequences.
///
/// `frame` is the element's reference frame from intention matching; the
/// judge position comes from `config`.
///
/// # Errors
///
/// Returns [`JudgeError::LengthMismatch`] if the sequences differ in length.
pub fn measure(
    kind: MeasureKind,
    flown: &StateSequence,
    template: &StateSequence,
    frame: &Transformation,
    config: &JudgingConfig,
) -> Result<Measurement> {
    if flown.len() != template.len() {
        return Err(JudgeError::length_mismatch(template.len(), flown.len()));
    }
    let judge = Vector3::from(config.judge_position);
    let eps = config.numerical_eps;
    let pairs = flown.states().iter().zip(template.states().iter());

    let n = flown.len();
    let mut value = Vec::with_capacity(n);
    let mut expected = Vec::with_capacity(n);
    let mut direction = Vec::with_capacity(n);
    let mut visibility = Vec::with_capacity(n);

    match kind {
        MeasureKind::Speed => {
            for (fl, tp) in pairs {
                let d = fl.world_vel();
                value.push(fl.speed());
                expected.push(tp.speed());
                visibility.push(vector_visibility(&d, &(fl.pos - judge), eps));
                direction.push(d);
            }
        }
        MeasureKind::RollAngle => {
            for (fl, tp) in pairs {
                value.push(roll_error(fl, tp));
                expected.push(0.0);
                let wingtip = tp.att * Vector3::z();
                visibility.push(vector_visibility(&wingtip, &(fl.pos - judge), eps));
                direction.push(tp.att * Vector3::x());
            }
        }
        MeasureKind::TrackY | MeasureKind::TrackZ => {
            let axis = if kind == MeasureKind::TrackY {
                frame.y_axis()
            } else {
                frame.z_axis()
            };
            for (fl, tp) in pairs {
                let fv = frame.to_local_vector(&fl.world_vel());
                let tv = frame.to_local_vector(&tp.world_vel());
                let err = if kind == MeasureKind::TrackY {
                    wrap_angle(pitch_track(&fv) - pitch_track(&tv))
                } else {
                    wrap_angle(yaw_track(&fv) - yaw_track(&tv))
                };
                value.push(err);
                expected.push(0.0);
                visibility.push(track_visibility(&axis, &(fl.pos - judge), eps));
                direction.push(axis);
            }
        }
        MeasureKind::LoopPlane => {
            let loop_axis = frame.y_axis();
            for (fl, tp) in pairs {
                let fv = frame.to_local_vector(&fl.world_vel());
                let tv = frame.to_local_vector(&tp.world_vel());
                value.push(plane_angle(&fv) - plane_angle(&tv));
                expected.push(0.0);
                let axis = tp.world_vel().cross(&loop_axis);
                visibility.push(track_visibility(&axis, &(fl.pos - judge), eps));
                direction.push(axis);
            }
        }
        MeasureKind::Radius => {
            let tp_local: Vec<Vector2<f64>> = template
                .states()
                .iter()
                .map(|s| plane_point(frame, s))
                .collect();
            // Template radius is taken about its own centre, the flown radius
            // about the fitted one (the frame origin).
            let centre = fit_circle(&tp_local).map_or_else(|_| Vector2::zeros(), |c| c.centre);
            for (fl, tp) in pairs {
                let fp = plane_point(frame, fl);
                value.push(fp.norm());
                expected.push((plane_point(frame, tp) - centre).norm());
                let radial = frame.att * Vector3::new(fp.x, 0.0, fp.y);
                visibility.push(vector_visibility(&radial, &(fl.pos - judge), eps));
                direction.push(radial);
            }
        }
    }

    Ok(Measurement {
        kind,
        value,
        expected,
        direction,
        visibility,
    })
}

/// Visibility of an error along `direction` seen along `los`.
#[must_use]
pub fn vector_visibility(direction: &Vector3<f64>, los: &Vector3<f64>, eps: f64) -> f64 {
    match (direction.try_normalize(eps), los.try_normalize(eps)) {
        (Some(d), Some(l)) => {
            let c = d.dot(&l);
            (1.0 - c * c).max(0.0).sqrt().min(1.0)
        }
        _ => 1.0,
    }
}

/// Visibility of a rotation about `axis` seen along `los`.
#[must_use]
pub fn track_visibility(axis: &Vector3<f64>, los: &Vector3<f64>, eps: f64) -> f64 {
    match (axis.try_normalize(eps), los.try_normalize(eps)) {
        (Some(a), Some(l)) => a.dot(&l).abs().min(1.0),
        _ => 1.0,
    }
}

/// Roll of the flown body Y axis about the template body X axis.
fn roll_error(flown: &State, template: &State) -> f64 {
    let wing = template.att.inverse() * (flown.att * Vector3::y());
    wing.z.atan2(wing.y)
}

fn yaw_track(v: &Vector3<f64>) -> f64 {
    if v.x == 0.0 && v.y == 0.0 {
        0.0
    } else {
        v.y.atan2(v.x)
    }
}

fn pitch_track(v: &Vector3<f64>) -> f64 {
    if v.x == 0.0 && v.z == 0.0 {
        0.0
    } else {
        v.z.atan2(v.x)
    }
}

/// Angle of the velocity out of the frame XZ plane.
fn plane_angle(v: &Vector3<f64>) -> f64 {
    let norm = v.norm();
    if norm == 0.0 {
        0.0
    } else {
        (v.y / norm).clamp(-1.0, 1.0).asin()
    }
}

/// Position in the frame XZ plane.
fn plane_point(frame: &Transformation, state: &State) -> Vector2<f64> {
    let local = frame.to_local(&state.pos);
    Vector2::new(local.x, local.z)
}
