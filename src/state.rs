//! Aircraft state records and time-indexed sequences.
//!
//! A [`StateSequence`] is the currency of the whole pipeline: flights come in
//! as one, templates are generated as one, and alignment attaches per-sample
//! [`Label`]s to one.

use std::ops::Range;

use nalgebra::{UnitQuaternion, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{JudgeError, Result};
use crate::math::filter::sample_rate;
use crate::math::transform::Transformation;

/// A single instant of aircraft state.
///
/// Velocity, angular rate and acceleration are expressed in the body frame
/// (x forward, y starboard, z down).
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct State {
    /// Position in the contest frame (m).
    pub pos: Vector3<f64>,
    /// Body to contest frame rotation.
    pub att: UnitQuaternion<f64>,
    /// Body-frame velocity (m/s).
    pub vel: Vector3<f64>,
    /// Body-frame angular rate [p, q, r] (rad/s).
    pub rvel: Vector3<f64>,
    /// Body-frame acceleration (m/s²).
    pub acc: Vector3<f64>,
}

impl Default for State {
    fn default() -> Self {
        Self {
            pos: Vector3::zeros(),
            att: UnitQuaternion::identity(),
            vel: Vector3::zeros(),
            rvel: Vector3::zeros(),
            acc: Vector3::zeros(),
        }
    }
}

impl State {
    /// Position and attitude as a transformation.
    #[must_use]
    pub fn transform(&self) -> Transformation {
        Transformation::new(self.pos, self.att)
    }

    /// Velocity in the contest frame.
    #[must_use]
    pub fn world_vel(&self) -> Vector3<f64> {
        self.att * self.vel
    }

    /// Angular rate in the contest frame.
    #[must_use]
    pub fn world_rvel(&self) -> Vector3<f64> {
        self.att * self.rvel
    }

    /// Airspeed magnitude.
    #[must_use]
    pub fn speed(&self) -> f64 {
        self.vel.norm()
    }
}

/// Categorical labels attached to one sample.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Label {
    /// Manoeuvre name.
    pub manoeuvre: String,
    /// Element id within the manoeuvre.
    pub element: String,
}

impl Label {
    /// Create a label.
    #[must_use]
    pub fn new(manoeuvre: impl Into<String>, element: impl Into<String>) -> Self {
        Self {
            manoeuvre: manoeuvre.into(),
            element: element.into(),
        }
    }
}

/// Ordered, time-indexed aircraft states with optional labels.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StateSequence {
    time: Vec<f64>,
    states: Vec<State>,
    labels: Option<Vec<Label>>,
}

impl StateSequence {
    /// Create a sequence from time stamps and states.
    ///
    /// # Errors
    ///
    /// Returns an error if the sequence is empty, lengths differ, or time
    /// stamps are not finite and strictly increasing.
    pub fn new(time: Vec<f64>, states: Vec<State>) -> Result<Self> {
        if states.is_empty() {
            return Err(JudgeError::empty("state sequence"));
        }
        if time.len() != states.len() {
            return Err(JudgeError::length_mismatch(states.len(), time.len()));
        }
        for (i, &t) in time.iter().enumerate() {
            if !t.is_finite() {
                return Err(JudgeError::numerical_instability(format!(
                    "Non-finite timestamp at index {i}"
                )));
            }
        }
        for i in 1..time.len() {
            if time[i] <= time[i - 1] {
                return Err(JudgeError::NonMonotonicTime { index: i });
            }
        }
        for (i, s) in states.iter().enumerate() {
            let finite = s.pos.iter().chain(s.vel.iter()).chain(s.rvel.iter()).all(|v| v.is_finite());
            if !finite {
                return Err(JudgeError::numerical_instability(format!(
                    "Non-finite state at index {i}"
                )));
            }
        }
        Ok(Self {
            time,
            states,
            labels: None,
        })
    }

    /// Attach per-sample labels, replacing any existing ones.
    ///
    /// # Errors
    ///
    /// Returns an error if the label count differs from the sample count.
    pub fn with_labels(mut self, labels: Vec<Label>) -> Result<Self> {
        if labels.len() != self.states.len() {
            return Err(JudgeError::length_mismatch(self.states.len(), labels.len()));
        }
        self.labels = Some(labels);
        Ok(self)
    }

    /// Label every sample with the same manoeuvre and element.
    #[must_use]
    pub fn labelled_uniform(mut self, label: &Label) -> Self {
        self.labels = Some(vec![label.clone(); self.states.len()]);
        self
    }

    /// Number of samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Always false; construction rejects empty sequences.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Time stamps (s).
    #[must_use]
    pub fn time(&self) -> &[f64] {
        &self.time
    }

    /// States.
    #[must_use]
    pub fn states(&self) -> &[State] {
        &self.states
    }

    /// Per-sample labels, if attached.
    #[must_use]
    pub fn labels(&self) -> Option<&[Label]> {
        self.labels.as_deref()
    }

    /// First state.
    #[must_use]
    pub fn first(&self) -> &State {
        &self.states[0]
    }

    /// Last state.
    #[must_use]
    pub fn last(&self) -> &State {
        &self.states[self.states.len() - 1]
    }

    /// Elapsed time from the first to the last sample.
    #[must_use]
    pub fn duration(&self) -> f64 {
        self.time[self.time.len() - 1] - self.time[0]
    }

    /// Mean sample rate, if the sequence has at least two samples.
    #[must_use]
    pub fn sample_rate(&self) -> Option<f64> {
        sample_rate(&self.time)
    }

    /// Body angular rates of every sample.
    #[must_use]
    pub fn rates(&self) -> Vec<Vector3<f64>> {
        self.states.iter().map(|s| s.rvel).collect()
    }

    /// Mean body angular rate.
    #[must_use]
    pub fn mean_rate(&self) -> Vector3<f64> {
        self.states.iter().fold(Vector3::zeros(), |acc, s| acc + s.rvel) / self.len() as f64
    }

    /// Mean speed.
    #[must_use]
    pub fn mean_speed(&self) -> f64 {
        self.states.iter().map(State::speed).sum::<f64>() / self.len() as f64
    }

    /// Copy of a contiguous range of samples, labels included.
    ///
    /// # Errors
    ///
    /// Returns an error if the range is empty or out of bounds.
    pub fn slice(&self, range: Range<usize>) -> Result<Self> {
        if range.start >= range.end || range.end > self.len() {
            return Err(JudgeError::invalid_input(format!(
                "slice {}..{} of a sequence of {} samples",
                range.start,
                range.end,
                self.len()
            )));
        }
        Ok(Self {
            time: self.time[range.clone()].to_vec(),
            states: self.states[range.clone()].to_vec(),
            labels: self.labels.as_ref().map(|l| l[range].to_vec()),
        })
    }

    /// Sample range of the first contiguous run labelled with `element`.
    #[must_use]
    pub fn element_range(&self, element: &str) -> Option<Range<usize>> {
        let labels = self.labels.as_ref()?;
        let start = labels.iter().position(|l| l.element == element)?;
        let len = labels[start..]
            .iter()
            .take_while(|l| l.element == element)
            .count();
        Some(start..start + len)
    }

    /// Element range extended by the following boundary sample, when there is
    /// one.
    #[must_use]
    pub fn element_range_inclusive(&self, element: &str) -> Option<Range<usize>> {
        self.element_range(element)
            .map(|r| r.start..(r.end + 1).min(self.len()))
    }

    /// Samples labelled with `element`.
    ///
    /// # Errors
    ///
    /// Returns [`JudgeError::MissingElement`] if no sample carries the label.
    pub fn element(&self, element: &str) -> Result<Self> {
        let range = self
            .element_range(element)
            .ok_or_else(|| JudgeError::missing_element(element))?;
        self.slice(range)
    }

    /// Samples labelled with `element` plus the following boundary sample.
    ///
    /// # Errors
    ///
    /// Returns [`JudgeError::MissingElement`] if no sample carries the label.
    pub fn element_inclusive(&self, element: &str) -> Result<Self> {
        let range = self
            .element_range_inclusive(element)
            .ok_or_else(|| JudgeError::missing_element(element))?;
        self.slice(range)
    }

    /// Samples labelled with `manoeuvre`.
    ///
    /// # Errors
    ///
    /// Returns [`JudgeError::MissingElement`] if no sample carries the label.
    pub fn manoeuvre(&self, manoeuvre: &str) -> Result<Self> {
        let labels = self
            .labels
            .as_ref()
            .ok_or_else(|| JudgeError::missing_element(manoeuvre))?;
        let start = labels
            .iter()
            .position(|l| l.manoeuvre == manoeuvre)
            .ok_or_else(|| JudgeError::missing_element(manoeuvre))?;
        let len = labels[start..]
            .iter()
            .take_while(|l| l.manoeuvre == manoeuvre)
            .count();
        self.slice(start..start + len)
    }

    /// Concatenate element templates end to end.
    ///
    /// Every part but the last loses its final sample, which coincides with
    /// the first sample of the next part. Times are shifted so each part
    /// starts where the previous one ended.
    ///
    /// # Errors
    ///
    /// Returns an error if `parts` is empty or labels are present on some
    /// parts only.
    pub fn stack(parts: Vec<Self>) -> Result<Self> {
        let n_parts = parts.len();
        if n_parts == 0 {
            return Err(JudgeError::empty("template parts"));
        }
        let labelled = parts[0].labels.is_some();

        let mut time = Vec::new();
        let mut states = Vec::new();
        let mut labels = Vec::new();
        let mut offset = 0.0;

        for (i, part) in parts.into_iter().enumerate() {
            if part.labels.is_some() != labelled {
                return Err(JudgeError::invalid_input(
                    "cannot stack labelled and unlabelled sequences",
                ));
            }
            let keep = if i + 1 < n_parts { part.len() - 1 } else { part.len() };
            let t0 = part.time[0];
            let end = part.time[part.len() - 1] - t0;

            time.extend(part.time[..keep].iter().map(|t| t - t0 + offset));
            states.extend_from_slice(&part.states[..keep]);
            if let Some(l) = &part.labels {
                labels.extend_from_slice(&l[..keep]);
            }
            offset += end;
        }

        let seq = Self::new(time, states)?;
        if labelled {
            seq.with_labels(labels)
        } else {
            Ok(seq)
        }
    }

    /// Concatenate sequences that already share one time base.
    ///
    /// # Errors
    ///
    /// Returns an error if `parts` is empty or the joined times are not
    /// strictly increasing.
    pub fn concat(parts: Vec<Self>) -> Result<Self> {
        if parts.is_empty() {
            return Err(JudgeError::empty("sequence parts"));
        }
        let labelled = parts.iter().all(|p| p.labels.is_some());
        let mut time = Vec::new();
        let mut states = Vec::new();
        let mut labels = Vec::new();
        for part in parts {
            time.extend(part.time);
            states.extend(part.states);
            if let Some(l) = part.labels {
                labels.extend(l);
            }
        }
        let seq = Self::new(time, states)?;
        if labelled {
            seq.with_labels(labels)
        } else {
            Ok(seq)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seq(n: usize, t0: f64) -> StateSequence {
        let time: Vec<f64> = (0..n).map(|i| t0 + i as f64 * 0.1).collect();
        let states: Vec<State> = (0..n)
            .map(|i| State {
                pos: Vector3::new(i as f64, 0.0, 0.0),
                vel: Vector3::new(10.0, 0.0, 0.0),
                ..State::default()
            })
            .collect();
        StateSequence::new(time, states).unwrap()
    }

    #[test]
    fn test_validation() {
        assert!(matches!(
            StateSequence::new(vec![], vec![]),
            Err(JudgeError::EmptySequence(_))
        ));
        assert!(matches!(
            StateSequence::new(vec![0.0, 1.0], vec![State::default()]),
            Err(JudgeError::LengthMismatch { .. })
        ));
        assert!(matches!(
            StateSequence::new(vec![0.0, 0.0], vec![State::default(); 2]),
            Err(JudgeError::NonMonotonicTime { index: 1 })
        ));
    }

    #[test]
    fn test_element_ranges() {
        let labels: Vec<Label> = ["a", "a", "b", "b", "b", "c"]
            .iter()
            .map(|e| Label::new("m", *e))
            .collect();
        let s = seq(6, 0.0).with_labels(labels).unwrap();

        assert_eq!(s.element_range("b"), Some(2..5));
        assert_eq!(s.element_range_inclusive("b"), Some(2..6));
        assert_eq!(s.element_range_inclusive("c"), Some(5..6));
        assert_eq!(s.element_range("z"), None);
        assert_eq!(s.element("a").unwrap().len(), 2);
        assert!(matches!(s.element("z"), Err(JudgeError::MissingElement(_))));
    }

    #[test]
    fn test_stack_drops_shared_samples() {
        let a = seq(3, 0.0).labelled_uniform(&Label::new("m", "a"));
        let b = seq(4, 5.0).labelled_uniform(&Label::new("m", "b"));
        let stacked = StateSequence::stack(vec![a, b]).unwrap();

        assert_eq!(stacked.len(), 6);
        assert_eq!(stacked.element_range("a"), Some(0..2));
        assert!((stacked.time()[2] - 0.2).abs() < 1e-12);
        assert!((stacked.duration() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_means() {
        let s = seq(5, 0.0);
        assert!((s.mean_speed() - 10.0).abs() < 1e-12);
        assert_eq!(s.mean_rate(), Vector3::zeros());
        assert!((s.sample_rate().unwrap() - 10.0).abs() < 1e-9);
    }
}
