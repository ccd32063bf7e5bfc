//! Parametric manoeuvre elements.
//!
//! An [`Element`] is an immutable value describing one geometric piece of a
//! manoeuvre (a line, a loop, an autorotation, a stall turn). Every element
//! can:
//!
//! - generate its ideal states from a start [`Transformation`]
//! - re-fit its free parameters to flown samples ("intention matching"),
//!   returning a new element and the reference frame used by measurements
//! - expose and replace its named parameters for inter-element scoring
//!
//! # Frames
//!
//! States use body axes x forward, y starboard, z down. Element geometry is
//! defined relative to the start transform, so the same element flown in a
//! different place or direction produces the same shape.

mod line;
mod looping;
mod snap;
mod spin;
mod stall_turn;

pub use line::Line;
pub use looping::Loop;
pub use snap::Snap;
pub use spin::Spin;
pub use stall_turn::StallTurn;

use std::collections::HashMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{JudgeError, Result};
use crate::math::transform::Transformation;
use crate::state::{State, StateSequence};

/// Kinds of element, used to pick default downgrades.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ElementKind {
    /// Straight flight.
    Line,
    /// Circular arc.
    Loop,
    /// Snap roll.
    Snap,
    /// Spin.
    Spin,
    /// Stall turn.
    StallTurn,
}

/// Named element parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ParameterKind {
    /// Airspeed (m/s).
    Speed,
    /// Line length (m).
    Length,
    /// Loop radius (m).
    Radius,
    /// Signed swept, break, nose or yaw angle (rad).
    Angle,
    /// Signed roll or autorotation angle (rad).
    Roll,
    /// Rotation rate magnitude (rad/s).
    Rate,
}

impl ParameterKind {
    /// Short name for reporting.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Speed => "speed",
            Self::Length => "length",
            Self::Radius => "radius",
            Self::Angle => "angle",
            Self::Roll => "roll",
            Self::Rate => "rate",
        }
    }
}

/// How a template is sampled in time.
#[derive(Debug, Clone, Copy)]
pub enum Sampling<'a> {
    /// Uniform sampling at a rate (Hz), always including both ends.
    Rate(f64),
    /// Explicit times relative to the element start.
    Times(&'a [f64]),
}

/// Outcome of matching an element's intention.
#[derive(Debug, Clone, PartialEq)]
pub struct Fit {
    /// Element with its free parameters re-fitted.
    pub element: Element,
    /// Reference frame for measurements on this element.
    pub frame: Transformation,
}

/// Behaviour shared by every element shape.
pub trait ElementGeometry {
    /// Unique id within a manoeuvre.
    fn id(&self) -> &str;

    /// Which shape this is.
    fn kind(&self) -> ElementKind;

    /// Check the parameters describe a real shape.
    ///
    /// # Errors
    ///
    /// Returns [`JudgeError::DegenerateElement`] for zero sizes or rates.
    fn validate(&self) -> Result<()>;

    /// Time to fly the element (s).
    fn duration(&self) -> f64;

    /// Ideal state `t` seconds after `start`.
    fn state_at(&self, start: &Transformation, t: f64) -> State;

    /// Re-fit free parameters to `flown`, which holds the element's samples
    /// plus the following boundary sample.
    ///
    /// # Errors
    ///
    /// Returns an error if the flown samples cannot describe this shape.
    fn match_intention(&self, start: &Transformation, flown: &StateSequence) -> Result<Fit>;

    /// Current value of a parameter, if the element has it.
    fn parameter(&self, kind: ParameterKind) -> Option<f64>;

    /// Copy of the element with one parameter replaced.
    ///
    /// # Errors
    ///
    /// Returns an error if the element has no such parameter or the new
    /// value makes it degenerate.
    fn with_parameter(&self, kind: ParameterKind, value: f64) -> Result<Element>;
}

/// One element of a manoeuvre.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Element {
    /// Straight flight with optional roll.
    Line(Line),
    /// Circular arc with optional roll.
    Loop(Loop),
    /// Snap roll.
    Snap(Snap),
    /// Spin.
    Spin(Spin),
    /// Stall turn.
    StallTurn(StallTurn),
}

impl From<Line> for Element {
    fn from(value: Line) -> Self {
        Self::Line(value)
    }
}

impl From<Loop> for Element {
    fn from(value: Loop) -> Self {
        Self::Loop(value)
    }
}

impl From<Snap> for Element {
    fn from(value: Snap) -> Self {
        Self::Snap(value)
    }
}

impl From<Spin> for Element {
    fn from(value: Spin) -> Self {
        Self::Spin(value)
    }
}

impl From<StallTurn> for Element {
    fn from(value: StallTurn) -> Self {
        Self::StallTurn(value)
    }
}

impl Element {
    fn geometry(&self) -> &dyn ElementGeometry {
        match self {
            Self::Line(e) => e,
            Self::Loop(e) => e,
            Self::Snap(e) => e,
            Self::Spin(e) => e,
            Self::StallTurn(e) => e,
        }
    }

    /// Unique id within a manoeuvre.
    #[must_use]
    pub fn id(&self) -> &str {
        self.geometry().id()
    }

    /// Which shape this is.
    #[must_use]
    pub fn kind(&self) -> ElementKind {
        self.geometry().kind()
    }

    /// Check the parameters describe a real shape.
    ///
    /// # Errors
    ///
    /// Returns [`JudgeError::DegenerateElement`] for zero sizes or rates.
    pub fn validate(&self) -> Result<()> {
        self.geometry().validate()
    }

    /// Time to fly the element (s).
    #[must_use]
    pub fn duration(&self) -> f64 {
        self.geometry().duration()
    }

    /// Ideal state `t` seconds after `start`.
    #[must_use]
    pub fn state_at(&self, start: &Transformation, t: f64) -> State {
        self.geometry().state_at(start, t)
    }

    /// Transformation at the end of the element.
    #[must_use]
    pub fn end_transform(&self, start: &Transformation) -> Transformation {
        self.state_at(start, self.duration()).transform()
    }

    /// Generate the element's ideal states.
    ///
    /// With [`Sampling::Rate`] the element is split into
    /// `max(1, round(duration * rate))` equal steps, both ends included.
    /// The sequence's time stamps are relative to the element start.
    ///
    /// # Errors
    ///
    /// Returns an error for a degenerate element, a non-positive rate, or
    /// explicit times that are empty or not increasing.
    pub fn create_template(&self, start: &Transformation, sampling: Sampling<'_>) -> Result<StateSequence> {
        self.validate()?;
        let duration = self.duration();
        let times: Vec<f64> = match sampling {
            Sampling::Rate(rate) => {
                if !rate.is_finite() || rate <= 0.0 {
                    return Err(JudgeError::invalid_input(format!(
                        "template rate must be positive, got {rate}"
                    )));
                }
                #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                let steps = ((duration * rate).round() as usize).max(1);
                (0..=steps)
                    .map(|k| k as f64 * duration / steps as f64)
                    .collect()
            }
            Sampling::Times(times) => times.to_vec(),
        };
        let states = times.iter().map(|&t| self.state_at(start, t)).collect();
        StateSequence::new(times, states)
    }

    /// Re-fit free parameters to flown samples.
    ///
    /// # Errors
    ///
    /// Returns an error if the flown samples cannot describe this shape.
    pub fn match_intention(&self, start: &Transformation, flown: &StateSequence) -> Result<Fit> {
        let fit = self.geometry().match_intention(start, flown)?;
        tracing::debug!(
            element = self.id(),
            kind = ?self.kind(),
            duration = fit.element.duration(),
            "matched element intention"
        );
        Ok(fit)
    }

    /// Current value of a parameter, if the element has it.
    #[must_use]
    pub fn parameter(&self, kind: ParameterKind) -> Option<f64> {
        self.geometry().parameter(kind)
    }

    /// Copy of the element with one parameter replaced.
    ///
    /// # Errors
    ///
    /// Returns an error if the element has no such parameter or the new
    /// value makes it degenerate.
    pub fn with_parameter(&self, kind: ParameterKind, value: f64) -> Result<Self> {
        let element = self.geometry().with_parameter(kind, value)?;
        element.validate()?;
        Ok(element)
    }
}

/// Error for a parameter an element does not have.
pub(crate) fn no_parameter(id: &str, kind: ParameterKind) -> JudgeError {
    JudgeError::invalid_input(format!("element {id} has no {} parameter", kind.name()))
}

/// Check a value is finite and strictly positive.
pub(crate) fn positive(id: &str, name: &str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(JudgeError::degenerate(id, format!("{name} must be positive, got {value}")))
    }
}

/// Check a value is finite and non-zero.
pub(crate) fn non_zero(id: &str, name: &str, value: f64) -> Result<()> {
    if value.is_finite() && value != 0.0 {
        Ok(())
    } else {
        Err(JudgeError::degenerate(id, format!("{name} must be non-zero, got {value}")))
    }
}

/// Mean airspeed of flown samples, rejecting a stationary aircraft.
pub(crate) fn flown_speed(id: &str, flown: &StateSequence) -> Result<f64> {
    let speed = flown.mean_speed();
    if speed.is_finite() && speed > 0.0 {
        Ok(speed)
    } else {
        Err(JudgeError::degenerate(id, "flown speed is zero"))
    }
}

/// Elapsed time of flown samples, rejecting a single sample.
pub(crate) fn flown_duration(id: &str, flown: &StateSequence) -> Result<f64> {
    let elapsed = flown.duration();
    if elapsed > 0.0 {
        Ok(elapsed)
    } else {
        Err(JudgeError::degenerate(id, "flown element has no duration"))
    }
}

/// Ordered collection of elements with unique ids.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Elements {
    items: Vec<Element>,
    index: HashMap<String, usize>,
}

impl Elements {
    /// Create a collection, preserving order.
    ///
    /// # Errors
    ///
    /// Returns [`JudgeError::DuplicateId`] if two elements share an id.
    pub fn new(items: Vec<Element>) -> Result<Self> {
        let mut elements = Self::default();
        for item in items {
            elements.push(item)?;
        }
        Ok(elements)
    }

    /// Append an element.
    ///
    /// # Errors
    ///
    /// Returns [`JudgeError::DuplicateId`] if the id is already present.
    pub fn push(&mut self, element: Element) -> Result<()> {
        let id = element.id().to_string();
        if self.index.contains_key(&id) {
            return Err(JudgeError::DuplicateId(id));
        }
        self.index.insert(id, self.items.len());
        self.items.push(element);
        Ok(())
    }

    /// Element with the given id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Element> {
        self.index.get(id).map(|&i| &self.items[i])
    }

    /// Position of the element with the given id.
    #[must_use]
    pub fn position(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    /// Copy of the collection with the element of the same id replaced.
    ///
    /// # Errors
    ///
    /// Returns [`JudgeError::MissingElement`] if no element has that id.
    pub fn replace(&self, element: Element) -> Result<Self> {
        let i = self
            .position(element.id())
            .ok_or_else(|| JudgeError::missing_element(element.id()))?;
        let mut out = self.clone();
        out.items[i] = element;
        Ok(out)
    }

    /// Number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether there are no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Elements in order.
    pub fn iter(&self) -> std::slice::Iter<'_, Element> {
        self.items.iter()
    }

    /// Element ids in order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(Element::id)
    }
}

impl<'a> IntoIterator for &'a Elements {
    type Item = &'a Element;
    type IntoIter = std::slice::Iter<'a, Element>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(feature = "serde")]
impl Serialize for Elements {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.items.serialize(serializer)
    }
}

#[cfg(feature = "serde")]
impl<'de> Deserialize<'de> for Elements {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let items = Vec::<Element>::deserialize(deserializer)?;
        Self::new(items).map_err(serde::de::Error::custom)
    }
}
