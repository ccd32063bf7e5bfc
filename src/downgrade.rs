//! Downgrade engine: applies criteria to measurements and collects results.
//!
//! A [`Downgrade`] pairs a [`MeasureKind`] with a [`Criterion`]. Applying it
//! to an element measures the flown samples against the intended template,
//! preprocesses the signal into an error series and evaluates the criterion.
//!
//! Results nest as [`DowngradeResult`] (one criterion on one element or one
//! inter-element parameter), [`Results`] (a named group) and
//! [`ElementsResults`] (one group per element). Every level reports a
//! `downgrade()` truncated down to [`TRUNCATION_STEP`].

use std::collections::HashMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::config::{JudgingConfig, TRUNCATION_STEP};
use crate::criteria::{Assessment, Criterion, CriterionInput, Exponential};
use crate::elements::ElementKind;
use crate::error::Result;
use crate::math::transform::Transformation;
use crate::measurement::{measure, MeasureKind, Measurement};
use crate::state::StateSequence;

/// Truncate a raw downgrade down to the nearest [`TRUNCATION_STEP`].
///
/// # Example
///
/// ```
/// use aero_judge::downgrade::truncate;
///
/// assert_eq!(truncate(1.49), 1.0);
/// assert_eq!(truncate(1.5), 1.5);
/// assert_eq!(truncate(0.3), 0.0);
/// ```
#[must_use]
pub fn truncate(raw: f64) -> f64 {
    (raw / TRUNCATION_STEP).floor() * TRUNCATION_STEP
}

/// One criterion applied to one element or parameter.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DowngradeResult {
    /// Name of the downgrade.
    pub name: String,
    /// Measurement behind an intra-element result.
    pub measurement: Option<Measurement>,
    /// Values passed to the criterion (errors or collected parameters).
    pub values: Vec<f64>,
    /// Pooled errors.
    pub mistakes: Vec<f64>,
    /// Lookups of the pooled errors.
    pub downgrades: Vec<f64>,
    /// Samples or values responsible for the downgrades.
    pub indices: Vec<usize>,
    /// Untruncated downgrade.
    pub raw: f64,
}

impl DowngradeResult {
    /// Build a result from a criterion assessment.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        measurement: Option<Measurement>,
        values: Vec<f64>,
        assessment: Assessment,
    ) -> Self {
        Self {
            name: name.into(),
            measurement,
            values,
            mistakes: assessment.mistakes,
            downgrades: assessment.downgrades,
            indices: assessment.indices,
            raw: assessment.total,
        }
    }

    /// Truncated downgrade.
    #[must_use]
    pub fn downgrade(&self) -> f64 {
        truncate(self.raw)
    }
}

/// A named group of results.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Results {
    /// Group name (element id, or "inter").
    pub name: String,
    /// Results in evaluation order.
    pub results: Vec<DowngradeResult>,
}

impl Results {
    /// Create an empty group.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            results: Vec::new(),
        }
    }

    /// Add a result.
    pub fn push(&mut self, result: DowngradeResult) {
        self.results.push(result);
    }

    /// Result with the given name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&DowngradeResult> {
        self.results.iter().find(|r| r.name == name)
    }

    /// Sum of truncated downgrades.
    #[must_use]
    pub fn downgrade(&self) -> f64 {
        self.results.iter().map(DowngradeResult::downgrade).sum()
    }

    /// Downgrade per result.
    #[must_use]
    pub fn summary(&self) -> Vec<(String, f64)> {
        self.results
            .iter()
            .map(|r| (r.name.clone(), r.downgrade()))
            .collect()
    }
}

/// Per-element result groups of one manoeuvre.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ElementsResults {
    /// One group per element, in element order.
    pub results: Vec<Results>,
}

impl ElementsResults {
    /// Group of the element with the given id.
    #[must_use]
    pub fn get(&self, element: &str) -> Option<&Results> {
        self.results.iter().find(|r| r.name == element)
    }

    /// Sum of element downgrades.
    #[must_use]
    pub fn downgrade(&self) -> f64 {
        self.results.iter().map(Results::downgrade).sum()
    }

    /// Downgrade per element.
    #[must_use]
    pub fn summary(&self) -> Vec<(String, f64)> {
        self.results
            .iter()
            .map(|r| (r.name.clone(), r.downgrade()))
            .collect()
    }

    /// Downgrade per criterion name, summed over elements.
    #[must_use]
    pub fn by_criterion(&self) -> Vec<(String, f64)> {
        let mut order: Vec<String> = Vec::new();
        let mut totals: HashMap<String, f64> = HashMap::new();
        for result in self.results.iter().flat_map(|r| r.results.iter()) {
            if !totals.contains_key(&result.name) {
                order.push(result.name.clone());
            }
            *totals.entry(result.name.clone()).or_insert(0.0) += result.downgrade();
        }
        order
            .into_iter()
            .map(|name| {
                let total = totals.get(&name).copied().unwrap_or_default();
                (name, total)
            })
            .collect()
    }
}

/// A measurement judged by a criterion.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Downgrade {
    /// Result name.
    pub name: String,
    /// What is measured.
    pub kind: MeasureKind,
    /// How the error is judged.
    pub criterion: Criterion,
}

impl Downgrade {
    /// Create a downgrade.
    #[must_use]
    pub fn new(name: impl Into<String>, kind: MeasureKind, criterion: Criterion) -> Self {
        Self {
            name: name.into(),
            kind,
            criterion,
        }
    }

    /// Apply to one element's flown and template samples.
    ///
    /// # Errors
    ///
    /// Returns an error if the sequences differ in length, a ratio error
    /// has a zero side, or the criterion does not take an error series.
    pub fn apply(
        &self,
        flown: &StateSequence,
        template: &StateSequence,
        frame: &Transformation,
        config: &JudgingConfig,
    ) -> Result<DowngradeResult> {
        let measurement = measure(self.kind, flown, template, frame, config)?;
        let errors = measurement.errors()?;
        let sample_rate = flown.sample_rate().unwrap_or(config.template_freq);
        let assessment = self.criterion.evaluate(
            CriterionInput::Series {
                errors: &errors,
                visibility: &measurement.visibility,
                mode: self.kind.mode(),
                sample_rate,
            },
            config,
        )?;
        tracing::trace!(name = %self.name, raw = assessment.total, "applied downgrade");
        Ok(DowngradeResult::new(
            self.name.clone(),
            Some(measurement),
            errors,
            assessment,
        ))
    }
}

/// Downgrades applied to each kind of element.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DowngradeLibrary {
    /// Downgrades for lines.
    pub line: Vec<Downgrade>,
    /// Downgrades for loops.
    pub looping: Vec<Downgrade>,
    /// Downgrades for snaps.
    pub snap: Vec<Downgrade>,
    /// Downgrades for spins.
    pub spin: Vec<Downgrade>,
    /// Downgrades for stall turns.
    pub stall_turn: Vec<Downgrade>,
}

impl Default for DowngradeLibrary {
    fn default() -> Self {
        let angle = Exponential::angle();
        let continuous = |name: &str, kind| Downgrade::new(name, kind, Criterion::Continuous(angle));
        let single = |name: &str, kind| Downgrade::new(name, kind, Criterion::Single(angle));
        let ratio = |name: &str, kind| {
            Downgrade::new(name, kind, Criterion::Continuous(Exponential::ratio()))
        };
        let exits = || {
            vec![
                single("end_track_y", MeasureKind::TrackY),
                single("end_track_z", MeasureKind::TrackZ),
                single("end_roll_angle", MeasureKind::RollAngle),
            ]
        };

        Self {
            line: vec![
                ratio("speed", MeasureKind::Speed),
                continuous("track_y", MeasureKind::TrackY),
                continuous("track_z", MeasureKind::TrackZ),
                continuous("roll_angle", MeasureKind::RollAngle),
                single("end_roll_angle", MeasureKind::RollAngle),
            ],
            looping: vec![
                ratio("speed", MeasureKind::Speed),
                continuous("loop_plane", MeasureKind::LoopPlane),
                ratio("radius", MeasureKind::Radius),
                continuous("roll_angle", MeasureKind::RollAngle),
                single("end_roll_angle", MeasureKind::RollAngle),
            ],
            snap: exits(),
            spin: exits(),
            stall_turn: vec![single("end_roll_angle", MeasureKind::RollAngle)],
        }
    }
}

impl DowngradeLibrary {
    /// A library that applies nothing.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            line: Vec::new(),
            looping: Vec::new(),
            snap: Vec::new(),
            spin: Vec::new(),
            stall_turn: Vec::new(),
        }
    }

    /// Downgrades for an element kind.
    #[must_use]
    pub fn for_kind(&self, kind: ElementKind) -> &[Downgrade] {
        match kind {
            ElementKind::Line => &self.line,
            ElementKind::Loop => &self.looping,
            ElementKind::Snap => &self.snap,
            ElementKind::Spin => &self.spin,
            ElementKind::StallTurn => &self.stall_turn,
        }
    }

    /// Check every criterion's lookup curve.
    ///
    /// # Errors
    ///
    /// Returns the first invalid curve.
    pub fn validate(&self) -> Result<()> {
        [&self.line, &self.looping, &self.snap, &self.spin, &self.stall_turn]
            .into_iter()
            .flatten()
            .try_for_each(|d| d.criterion.lookup().validate())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::transform::rx;
    use crate::state::State;
    use approx::assert_relative_eq;
    use nalgebra::Vector3;

    #[test]
    fn test_truncation_law() {
        for i in 0..2000 {
            let raw = i as f64 * 0.00731;
            let dg = truncate(raw);
            assert!(dg <= raw);
            assert!(raw - dg < TRUNCATION_STEP);
            assert_eq!(dg, (raw * 2.0).floor() / 2.0);
        }
    }

    #[test]
    fn test_results_sum_truncated_values() {
        let mut results = Results::new("e1");
        for (name, raw) in [("a", 0.7), ("b", 0.7), ("c", 1.2)] {
            results.push(DowngradeResult::new(
                name,
                None,
                Vec::new(),
                Assessment {
                    total: raw,
                    ..Assessment::default()
                },
            ));
        }
        assert_relative_eq!(results.downgrade(), 2.0);
        assert_eq!(results.summary()[2], ("c".to_string(), 1.0));

        let all = ElementsResults {
            results: vec![results.clone(), results],
        };
        assert_relative_eq!(all.downgrade(), 4.0);
        assert_eq!(all.by_criterion()[0], ("a".to_string(), 1.0));
    }

    fn rolled_line(roll: f64) -> StateSequence {
        let time: Vec<f64> = (0..30).map(|i| i as f64 * 0.04).collect();
        let states = time
            .iter()
            .map(|&t| State {
                pos: Vector3::new(-50.0 + 30.0 * t, 150.0, 0.0),
                att: rx(roll),
                vel: Vector3::new(30.0, 0.0, 0.0),
                ..State::default()
            })
            .collect();
        StateSequence::new(time, states).unwrap()
    }

    #[test]
    fn test_end_roll_single() {
        // wings level with the judge's eye, so the roll error is fully visible
        let flown = rolled_line(18f64.to_radians());
        let template = rolled_line(0.0);
        let frame = template.first().transform();
        let library = DowngradeLibrary::default();
        let end_roll = library
            .line
            .iter()
            .find(|d| d.name == "end_roll_angle")
            .unwrap();
        let result = end_roll
            .apply(&flown, &template, &frame, &JudgingConfig::default())
            .unwrap();
        assert_relative_eq!(result.raw, 1.2, epsilon = 1e-9);
        assert_eq!(result.downgrade(), 1.0);
        assert_eq!(result.indices, vec![29]);
    }

    #[test]
    fn test_library() {
        let library = DowngradeLibrary::default();
        assert!(library.validate().is_ok());
        assert_eq!(library.for_kind(ElementKind::Loop).len(), 5);
        assert!(DowngradeLibrary::empty().for_kind(ElementKind::Line).is_empty());
    }
}
