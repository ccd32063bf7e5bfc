//! Criteria: pure mappings from errors to downgrades.
//!
//! Every criterion is built on the [`Exponential`] lookup curve
//! `min(factor * |x|^exponent, limit)`. The four kinds are a closed enum,
//! [`Criterion`], evaluated through one entry point,
//! [`Criterion::evaluate`], that pattern-matches on the criterion and the
//! shape of its input.
//!
//! # Example
//!
//! ```
//! use aero_judge::criteria::{Criterion, CriterionInput, ErrorMode, Exponential};
//! use aero_judge::JudgingConfig;
//!
//! let radius = Criterion::Comparison {
//!     lookup: Exponential::new(2.0, 1.0),
//!     mode: ErrorMode::Ratio,
//! };
//! let outcome = radius
//!     .evaluate(CriterionInput::Values(&[100.0, 125.0]), &JudgingConfig::default())?;
//! assert!((outcome.total - 0.5).abs() < 1e-12);
//! # Ok::<(), aero_judge::JudgeError>(())
//! ```

use std::f64::consts::PI;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::config::JudgingConfig;
use crate::error::{JudgeError, Result};
use crate::math::filter::low_pass;
use crate::math::signal::{excursions, weighted_cumulative};

/// Parametric lookup curve `min(factor * |x|^exponent, limit)`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Exponential {
    /// Multiplier applied after the power.
    pub factor: f64,
    /// Power applied to the error magnitude.
    pub exponent: f64,
    /// Saturating downgrade.
    pub limit: f64,
}

impl Default for Exponential {
    fn default() -> Self {
        Self::new(1.0, 1.0)
    }
}

impl Exponential {
    /// Default saturating downgrade.
    pub const DEFAULT_LIMIT: f64 = 10.0;

    /// Create a curve with the default limit.
    #[must_use]
    pub const fn new(factor: f64, exponent: f64) -> Self {
        Self {
            factor,
            exponent,
            limit: Self::DEFAULT_LIMIT,
        }
    }

    /// Set the saturating downgrade.
    #[must_use]
    pub const fn with_limit(mut self, limit: f64) -> Self {
        self.limit = limit;
        self
    }

    /// One point per 15° of angular error (errors in radians).
    #[must_use]
    pub fn angle() -> Self {
        Self::new(180.0 / (15.0 * PI), 1.0)
    }

    /// One point per 25% of ratio error.
    #[must_use]
    pub const fn ratio() -> Self {
        Self::new(4.0, 1.0)
    }

    /// Validate the curve parameters.
    ///
    /// # Errors
    ///
    /// Returns an error unless `factor >= 0`, `exponent > 0` and `limit >= 0`.
    pub fn validate(&self) -> Result<()> {
        if !(self.factor >= 0.0 && self.exponent > 0.0 && self.limit >= 0.0) {
            return Err(JudgeError::invalid_config(format!(
                "invalid lookup curve {self:?}"
            )));
        }
        Ok(())
    }

    /// Downgrade for an error of magnitude `|x|`.
    #[must_use]
    pub fn lookup(&self, x: f64) -> f64 {
        (self.factor * x.abs().powf(self.exponent)).min(self.limit)
    }
}

/// How a pair of values is turned into an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ErrorMode {
    /// Difference of magnitudes; the reference is fixed by the geometry.
    #[default]
    Absolute,
    /// Ratio of magnitudes; the reference is set by the pilot.
    Ratio,
}

/// A criterion mapping errors to a downgrade.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Criterion {
    /// One-shot error at the end of an element.
    Single(Exponential),
    /// Excursions of a full error time series.
    Continuous(Exponential),
    /// Pairwise consistency of values shared between elements.
    Comparison {
        /// Lookup applied to each pairwise error.
        lookup: Exponential,
        /// Ratio or absolute pairwise error.
        mode: ErrorMode,
    },
    /// Choice between a few legal value vectors.
    Combination {
        /// Lookup applied to the deviation from the best option.
        lookup: Exponential,
        /// Legal value vectors, one entry per collected value.
        options: Vec<Vec<f64>>,
    },
}

/// Input to [`Criterion::evaluate`].
#[derive(Debug, Clone, Copy)]
pub enum CriterionInput<'a> {
    /// Preprocessed per-sample errors of one element.
    Series {
        /// Errors, `|expected| - |value|` or `max/min` depending on `mode`.
        errors: &'a [f64],
        /// Per-sample visibility weights in [0, 1].
        visibility: &'a [f64],
        /// How `errors` were produced.
        mode: ErrorMode,
        /// Sample rate of the series (Hz).
        sample_rate: f64,
    },
    /// One value per element sharing a parameter, in declaration order.
    Values(&'a [f64]),
}

impl CriterionInput<'_> {
    const fn name(&self) -> &'static str {
        match self {
            Self::Series { .. } => "an error series",
            Self::Values(_) => "a value list",
        }
    }
}

/// Outcome of evaluating a criterion.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Assessment {
    /// Pooled or pairwise error magnitudes.
    pub mistakes: Vec<f64>,
    /// Lookup of each mistake.
    pub downgrades: Vec<f64>,
    /// Sample (or value) indices responsible for the downgrades.
    pub indices: Vec<usize>,
    /// Downgrade that counts towards the score, before truncation.
    pub total: f64,
}

impl Criterion {
    /// Short name of the criterion kind.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Single(_) => "single",
            Self::Continuous(_) => "continuous",
            Self::Comparison { .. } => "comparison",
            Self::Combination { .. } => "combination",
        }
    }

    /// The lookup curve of this criterion.
    #[must_use]
    pub const fn lookup(&self) -> &Exponential {
        match self {
            Self::Single(l) | Self::Continuous(l) => l,
            Self::Comparison { lookup, .. } | Self::Combination { lookup, .. } => lookup,
        }
    }

    /// Whether this criterion only selects a discrete option.
    #[must_use]
    pub const fn is_combination(&self) -> bool {
        matches!(self, Self::Combination { .. })
    }

    /// Evaluate the criterion.
    ///
    /// Single and Continuous criteria take [`CriterionInput::Series`];
    /// Comparison and Combination take [`CriterionInput::Values`]. Empty
    /// inputs give a zero downgrade.
    ///
    /// # Errors
    ///
    /// Returns [`JudgeError::CriterionMismatch`] for an input of the wrong
    /// shape, [`JudgeError::LengthMismatch`] when a series and its
    /// visibility differ in length, [`JudgeError::ZeroReference`] for a zero
    /// ratio reference, and an error if a Combination option has the wrong
    /// length.
    pub fn evaluate(&self, input: CriterionInput<'_>, config: &JudgingConfig) -> Result<Assessment> {
        if let CriterionInput::Series { errors, visibility, .. } = input {
            if errors.len() != visibility.len() {
                return Err(JudgeError::length_mismatch(errors.len(), visibility.len()));
            }
        }
        match (self, input) {
            (
                Self::Single(lookup),
                CriterionInput::Series {
                    errors,
                    visibility,
                    mode,
                    ..
                },
            ) => Ok(single(lookup, errors, visibility, mode)),
            (
                Self::Continuous(lookup),
                CriterionInput::Series {
                    errors,
                    visibility,
                    mode,
                    sample_rate,
                },
            ) => Ok(continuous(lookup, errors, visibility, mode, sample_rate, config)),
            (Self::Comparison { lookup, mode }, CriterionInput::Values(values)) => {
                comparison(lookup, *mode, values)
            }
            (Self::Combination { lookup, options }, CriterionInput::Values(values)) => {
                combination(lookup, options, values)
            }
            (criterion, input) => Err(JudgeError::CriterionMismatch {
                criterion: criterion.kind(),
                input: input.name(),
            }),
        }
    }

    /// Pairwise errors of a Comparison criterion.
    ///
    /// # Errors
    ///
    /// Returns an error if this is not a Comparison criterion or a ratio
    /// reference is zero.
    pub fn compare(&self, values: &[f64]) -> Result<Vec<f64>> {
        match self {
            Self::Comparison { mode, .. } => pairwise_errors(*mode, values),
            other => Err(JudgeError::CriterionMismatch {
                criterion: other.kind(),
                input: "a comparison",
            }),
        }
    }

    /// Index of the Combination option closest to `values`.
    ///
    /// # Errors
    ///
    /// Returns an error if this is not a Combination criterion, it has no
    /// options, or an option's length differs from `values`.
    pub fn check_option(&self, values: &[f64]) -> Result<usize> {
        match self {
            Self::Combination { options, .. } => best_option(options, values).map(|(i, _)| i),
            other => Err(JudgeError::CriterionMismatch {
                criterion: other.kind(),
                input: "an option check",
            }),
        }
    }

    /// Evaluate a Combination against the option chosen by a corrected pass.
    ///
    /// Scores zero when the best option for `values` differs from
    /// `corrected_option`, otherwise scores the deviation from that option.
    ///
    /// # Errors
    ///
    /// Same as [`Criterion::check_option`].
    pub fn evaluate_against(&self, values: &[f64], corrected_option: usize) -> Result<Assessment> {
        let Self::Combination { lookup, options } = self else {
            return Err(JudgeError::CriterionMismatch {
                criterion: self.kind(),
                input: "an option comparison",
            });
        };
        let (best, deviation) = best_option(options, values)?;
        if best != corrected_option {
            return Ok(Assessment {
                indices: vec![best],
                ..Assessment::default()
            });
        }
        let dg = lookup.lookup(deviation);
        Ok(Assessment {
            mistakes: vec![deviation],
            downgrades: vec![dg],
            indices: vec![best],
            total: dg,
        })
    }
}

/// Error magnitude of one preprocessed sample.
fn magnitude(error: f64, mode: ErrorMode) -> f64 {
    match mode {
        ErrorMode::Absolute => error.abs(),
        ErrorMode::Ratio => (error - 1.0).abs(),
    }
}

fn single(lookup: &Exponential, errors: &[f64], visibility: &[f64], mode: ErrorMode) -> Assessment {
    let Some(last) = errors.len().checked_sub(1) else {
        return Assessment::default();
    };
    let mistake = magnitude(errors[last], mode);
    let dg = lookup.lookup(mistake) * visibility[last];
    Assessment {
        mistakes: vec![mistake],
        downgrades: vec![dg],
        indices: vec![last],
        total: dg,
    }
}

fn continuous(
    lookup: &Exponential,
    errors: &[f64],
    visibility: &[f64],
    mode: ErrorMode,
    sample_rate: f64,
    config: &JudgingConfig,
) -> Assessment {
    let n = errors.len();
    if n < config.min_continuous_samples(sample_rate) {
        return Assessment::default();
    }

    let guard = config.guard_samples;
    let trimmed = &errors[guard..n - guard];
    let vis = &visibility[guard..n - guard];
    let filtered = low_pass(trimmed, config.lowpass_cutoff, sample_rate);

    let mut away = 0.0;
    let mut toward = 0.0;
    let mut indices = Vec::new();

    // Both series open with the reference value, so an error already held at
    // the first judged sample is a rise like any other. Series index `i`
    // maps to trimmed sample `i - 1`.
    match mode {
        ErrorMode::Absolute => {
            // Fixed reference: every visible change of the error accumulates.
            let magnitudes: Vec<f64> = std::iter::once(0.0)
                .chain(filtered.iter().map(|e| e.abs()))
                .collect();
            let weights: Vec<f64> = std::iter::once(vis[0]).chain(vis.iter().copied()).collect();
            let series: Vec<f64> = weighted_cumulative(&magnitudes, &weights)
                .into_iter()
                .map(f64::abs)
                .collect();
            for ex in excursions(&series) {
                away += series[ex.peak] - series[ex.trough];
                toward += series[ex.peak] - series[ex.recovery];
                indices.push(ex.peak - 1 + guard);
            }
        }
        ErrorMode::Ratio => {
            // Pilot-set reference: a mistake is weighted where it happens.
            let series: Vec<f64> = std::iter::once(1.0)
                .chain(filtered.iter().map(|e| e.max(1.0)))
                .collect();
            for ex in excursions(&series) {
                let weight = vis[ex.peak - 1];
                away += (series[ex.peak] / series[ex.trough] - 1.0) * weight;
                toward += (series[ex.peak] / series[ex.recovery] - 1.0) * weight;
                indices.push(ex.peak - 1 + guard);
            }
        }
    }

    let dg_away = lookup.lookup(away);
    Assessment {
        mistakes: vec![away, toward],
        downgrades: vec![dg_away, lookup.lookup(toward)],
        indices,
        total: dg_away,
    }
}

fn pairwise_errors(mode: ErrorMode, values: &[f64]) -> Result<Vec<f64>> {
    values
        .windows(2)
        .enumerate()
        .map(|(i, pair)| match mode {
            ErrorMode::Absolute => Ok((pair[1] - pair[0]).abs()),
            ErrorMode::Ratio => {
                if pair[0] == 0.0 {
                    Err(JudgeError::ZeroReference { index: i })
                } else {
                    Ok((pair[1] / pair[0] - 1.0).abs())
                }
            }
        })
        .collect()
}

fn comparison(lookup: &Exponential, mode: ErrorMode, values: &[f64]) -> Result<Assessment> {
    let mistakes = pairwise_errors(mode, values)?;
    let downgrades: Vec<f64> = mistakes.iter().map(|&m| lookup.lookup(m)).collect();
    Ok(Assessment {
        total: downgrades.iter().sum(),
        indices: (1..values.len()).collect(),
        mistakes,
        downgrades,
    })
}

/// Best option index and its total absolute deviation from `values`.
fn best_option(options: &[Vec<f64>], values: &[f64]) -> Result<(usize, f64)> {
    let mut best: Option<(usize, f64)> = None;
    for (i, option) in options.iter().enumerate() {
        if option.len() != values.len() {
            return Err(JudgeError::length_mismatch(values.len(), option.len()));
        }
        let deviation: f64 = option
            .iter()
            .zip(values.iter())
            .map(|(o, v)| (v - o).abs())
            .sum();
        if best.map_or(true, |(_, d)| deviation < d) {
            best = Some((i, deviation));
        }
    }
    best.ok_or_else(|| JudgeError::invalid_input("combination has no options"))
}

fn combination(lookup: &Exponential, options: &[Vec<f64>], values: &[f64]) -> Result<Assessment> {
    if values.is_empty() {
        return Ok(Assessment::default());
    }
    let (best, deviation) = best_option(options, values)?;
    let dg = lookup.lookup(deviation);
    Ok(Assessment {
        mistakes: vec![deviation],
        downgrades: vec![dg],
        indices: vec![best],
        total: dg,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn config() -> JudgingConfig {
        JudgingConfig::unfiltered()
    }

    #[test]
    fn test_lookup_monotonic_and_bounded() {
        let curves = [
            Exponential::angle(),
            Exponential::ratio(),
            Exponential::new(2.0, 0.5).with_limit(3.0),
            Exponential::new(0.3, 2.5),
        ];
        for curve in curves {
            let mut prev = 0.0;
            for i in 0..2000 {
                let x = i as f64 * 0.01;
                let v = curve.lookup(x);
                assert!(v >= prev, "lookup decreased at {}", x);
                assert!(v <= curve.limit);
                prev = v;
            }
        }
    }

    #[test]
    fn test_lookup_limit() {
        let curve = Exponential::new(1.0, 1.0).with_limit(6.0);
        assert_eq!(curve.lookup(100.0), 6.0);
        assert_eq!(curve.lookup(-2.0), 2.0);
        assert!(Exponential::new(-1.0, 1.0).validate().is_err());
        assert!(Exponential::new(1.0, 0.0).validate().is_err());
        assert!(Exponential::angle().validate().is_ok());
    }

    #[test]
    fn test_single_uses_terminal_sample() {
        let c = Criterion::Single(Exponential::new(1.0, 1.0));
        let errors = [0.0, 5.0, -0.5];
        let vis = [1.0, 1.0, 0.5];
        let out = c
            .evaluate(
                CriterionInput::Series {
                    errors: &errors,
                    visibility: &vis,
                    mode: ErrorMode::Absolute,
                    sample_rate: 25.0,
                },
                &config(),
            )
            .unwrap();
        assert_relative_eq!(out.total, 0.25);
        assert_eq!(out.indices, vec![2]);
    }

    #[test]
    fn test_single_empty() {
        let c = Criterion::Single(Exponential::angle());
        let out = c
            .evaluate(
                CriterionInput::Series {
                    errors: &[],
                    visibility: &[],
                    mode: ErrorMode::Absolute,
                    sample_rate: 25.0,
                },
                &config(),
            )
            .unwrap();
        assert_eq!(out.total, 0.0);
    }

    #[test]
    fn test_continuous_short_series_is_zero() {
        let c = Criterion::Continuous(Exponential::angle());
        let errors = vec![1.0, -3.0, 2.0, 0.0, 4.0, 0.0];
        let vis = vec![1.0; 6];
        let out = c
            .evaluate(
                CriterionInput::Series {
                    errors: &errors,
                    visibility: &vis,
                    mode: ErrorMode::Absolute,
                    sample_rate: 25.0,
                },
                &config(),
            )
            .unwrap();
        assert_eq!(out, Assessment::default());
    }

    #[test]
    fn test_continuous_absolute_counts_away_only() {
        let c = Criterion::Continuous(Exponential::new(1.0, 1.0));
        // rise to 2, fall back to 0.5, on a flat guard band
        let mut errors = vec![0.0; 4];
        errors.extend([0.5, 1.0, 1.5, 2.0, 1.5, 1.0, 0.5]);
        errors.extend(vec![0.5; 6]);
        let vis = vec![1.0; errors.len()];
        let out = c
            .evaluate(
                CriterionInput::Series {
                    errors: &errors,
                    visibility: &vis,
                    mode: ErrorMode::Absolute,
                    sample_rate: 25.0,
                },
                &config(),
            )
            .unwrap();
        assert_relative_eq!(out.mistakes[0], 2.0, epsilon = 1e-9);
        assert_relative_eq!(out.mistakes[1], 1.5, epsilon = 1e-9);
        assert_relative_eq!(out.total, 2.0, epsilon = 1e-9);
        assert_eq!(out.indices, vec![7]);
    }

    #[test]
    fn test_continuous_absolute_invisible_change_ignored() {
        let c = Criterion::Continuous(Exponential::new(1.0, 1.0));
        let mut errors = vec![0.0; 4];
        errors.extend([1.0, 2.0, 3.0]);
        errors.extend(vec![3.0; 8]);
        let vis = vec![0.0; errors.len()];
        let out = c
            .evaluate(
                CriterionInput::Series {
                    errors: &errors,
                    visibility: &vis,
                    mode: ErrorMode::Absolute,
                    sample_rate: 25.0,
                },
                &config(),
            )
            .unwrap();
        assert_eq!(out.total, 0.0);
    }

    #[test]
    fn test_continuous_ratio_weighted_at_peak() {
        let c = Criterion::Continuous(Exponential::new(1.0, 1.0));
        let mut errors = vec![1.0; 4];
        errors.extend([1.1, 1.2, 1.5, 1.2, 1.0]);
        errors.extend(vec![1.0; 6]);
        let mut vis = vec![1.0; errors.len()];
        vis[6] = 0.5;
        let out = c
            .evaluate(
                CriterionInput::Series {
                    errors: &errors,
                    visibility: &vis,
                    mode: ErrorMode::Ratio,
                    sample_rate: 25.0,
                },
                &config(),
            )
            .unwrap();
        assert_relative_eq!(out.total, 0.25, epsilon = 1e-9);
        assert_eq!(out.indices, vec![6]);
    }

    #[test]
    fn test_continuous_error_held_from_start() {
        let c = Criterion::Continuous(Exponential::new(1.0, 1.0));
        let errors = vec![-0.2; 20];
        for (weight, expected) in [(1.0, 0.2), (0.5, 0.1)] {
            let vis = vec![weight; errors.len()];
            let out = c
                .evaluate(
                    CriterionInput::Series {
                        errors: &errors,
                        visibility: &vis,
                        mode: ErrorMode::Absolute,
                        sample_rate: 25.0,
                    },
                    &config(),
                )
                .unwrap();
            assert_relative_eq!(out.total, expected, epsilon = 1e-9);
            assert_eq!(out.indices[0], 2);
        }

        let errors = vec![1.25; 20];
        let vis = vec![1.0; errors.len()];
        let out = c
            .evaluate(
                CriterionInput::Series {
                    errors: &errors,
                    visibility: &vis,
                    mode: ErrorMode::Ratio,
                    sample_rate: 25.0,
                },
                &config(),
            )
            .unwrap();
        assert_relative_eq!(out.total, 0.25, epsilon = 1e-9);
    }

    #[test]
    fn test_series_visibility_length_checked() {
        let errors = vec![0.3; 40];
        let vis = vec![1.0; 10];
        for c in [
            Criterion::Single(Exponential::angle()),
            Criterion::Continuous(Exponential::angle()),
        ] {
            assert_eq!(
                c.evaluate(
                    CriterionInput::Series {
                        errors: &errors,
                        visibility: &vis,
                        mode: ErrorMode::Absolute,
                        sample_rate: 25.0,
                    },
                    &config(),
                ),
                Err(JudgeError::LengthMismatch {
                    expected: 40,
                    actual: 10
                })
            );
        }
    }

    #[test]
    fn test_comparison_ratio() {
        let c = Criterion::Comparison {
            lookup: Exponential::new(1.0, 1.0),
            mode: ErrorMode::Ratio,
        };
        let out = c
            .evaluate(CriterionInput::Values(&[100.0, 110.0, 99.0]), &config())
            .unwrap();
        assert_relative_eq!(out.mistakes[0], 0.1, epsilon = 1e-12);
        assert_relative_eq!(out.mistakes[1], 0.1, epsilon = 1e-12);
        assert_relative_eq!(out.total, 0.2, epsilon = 1e-12);
        assert_eq!(out.indices, vec![1, 2]);
    }

    #[test]
    fn test_comparison_zero_reference() {
        let c = Criterion::Comparison {
            lookup: Exponential::ratio(),
            mode: ErrorMode::Ratio,
        };
        assert_eq!(
            c.compare(&[10.0, 0.0, 5.0]),
            Err(JudgeError::ZeroReference { index: 1 })
        );
    }

    #[test]
    fn test_comparison_absolute_and_trivial() {
        let c = Criterion::Comparison {
            lookup: Exponential::new(1.0, 1.0),
            mode: ErrorMode::Absolute,
        };
        assert_eq!(c.compare(&[1.0, 3.0]).unwrap(), vec![2.0]);
        let out = c.evaluate(CriterionInput::Values(&[5.0]), &config()).unwrap();
        assert_eq!(out.total, 0.0);
        let out = c.evaluate(CriterionInput::Values(&[]), &config()).unwrap();
        assert_eq!(out.total, 0.0);
    }

    #[test]
    fn test_combination() {
        let c = Criterion::Combination {
            lookup: Exponential::new(1.0, 1.0),
            options: vec![vec![PI, -PI], vec![-PI, PI]],
        };
        assert_eq!(c.check_option(&[-3.0, 3.2]).unwrap(), 1);

        let out = c
            .evaluate(CriterionInput::Values(&[PI, -PI]), &config())
            .unwrap();
        assert_eq!(out.indices, vec![0]);
        assert_relative_eq!(out.total, 0.0);

        let against = c.evaluate_against(&[PI, -PI + 0.5], 0).unwrap();
        assert_relative_eq!(against.total, 0.5, epsilon = 1e-12);
        let against = c.evaluate_against(&[PI, -PI + 0.5], 1).unwrap();
        assert_eq!(against.total, 0.0);

        assert!(c.check_option(&[1.0]).is_err());
    }

    #[test]
    fn test_mismatched_input() {
        let c = Criterion::Single(Exponential::angle());
        assert!(matches!(
            c.evaluate(CriterionInput::Values(&[1.0]), &config()),
            Err(JudgeError::CriterionMismatch { .. })
        ));
        let c = Criterion::Comparison {
            lookup: Exponential::ratio(),
            mode: ErrorMode::Ratio,
        };
        assert!(matches!(
            c.evaluate(
                CriterionInput::Series {
                    errors: &[1.0],
                    visibility: &[1.0],
                    mode: ErrorMode::Ratio,
                    sample_rate: 25.0
                },
                &config()
            ),
            Err(JudgeError::CriterionMismatch { .. })
        ));
        assert!(c.check_option(&[1.0]).is_err());
    }
}
