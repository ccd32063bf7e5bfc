//! Configuration for the judging pipeline.
//!
//! This module provides the [`JudgingConfig`] struct which centralizes the
//! tunable parameters of alignment and downgrade scoring, along with presets.
//!
//! # Example
//!
//! ```
//! use aero_judge::JudgingConfig;
//!
//! let config = JudgingConfig::default();
//! assert!(config.validate().is_ok());
//!
//! let wide = JudgingConfig::f3a().with_dtw_radius(10);
//! assert_eq!(wide.dtw_radius, 10);
//! ```

use crate::error::{JudgeError, Result};

/// Downgrades are truncated down to a multiple of this step.
pub const TRUNCATION_STEP: f64 = 0.5;

/// Configuration for alignment and downgrade scoring.
///
/// # Alignment Parameters
///
/// - `template_freq`: sample rate (Hz) of generated templates.
/// - `dtw_radius`: band half-width of the warping window, in samples.
/// - `whiten`: divide each body-rate axis by its pooled standard deviation.
///
/// # Scoring Parameters
///
/// - `guard_samples`: samples trimmed from both ends of a continuous error.
/// - `min_continuous_duration`: elements shorter than this score zero.
/// - `lowpass_cutoff`: cutoff (Hz) of the filter applied to continuous errors.
#[derive(Debug, Clone, PartialEq)]
pub struct JudgingConfig {
    /// Sample rate of generated templates (Hz).
    pub template_freq: f64,

    /// Radius of the banded warping search (samples at each resolution).
    pub dtw_radius: usize,

    /// Whether to variance-normalise body rates before alignment.
    pub whiten: bool,

    /// Mean per-step warping distance above which an alignment is reported
    /// as low confidence.
    pub low_confidence_distance: f64,

    /// Samples removed from each end before continuous scoring.
    pub guard_samples: usize,

    /// Minimum element duration (s) for continuous scoring.
    pub min_continuous_duration: f64,

    /// Low-pass cutoff frequency (Hz) for continuous error series.
    pub lowpass_cutoff: f64,

    /// Judge position in the contest frame [x, y, z] (m).
    pub judge_position: [f64; 3],

    /// General numerical epsilon.
    pub numerical_eps: f64,
}

impl Default for JudgingConfig {
    fn default() -> Self {
        Self {
            template_freq: 25.0,
            dtw_radius: 5,
            whiten: true,
            low_confidence_distance: 1.5,
            guard_samples: 2,
            min_continuous_duration: 0.5,
            lowpass_cutoff: 2.0,
            judge_position: [0.0, 0.0, 0.0],
            numerical_eps: 1e-9,
        }
    }
}

impl JudgingConfig {
    /// Create a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any parameter is out of valid range.
    pub fn validate(&self) -> Result<()> {
        if self.template_freq <= 0.0 || !self.template_freq.is_finite() {
            return Err(JudgeError::invalid_config(
                "template_freq must be positive",
            ));
        }
        if self.dtw_radius < 1 {
            return Err(JudgeError::invalid_config("dtw_radius must be at least 1"));
        }
        if self.low_confidence_distance <= 0.0 {
            return Err(JudgeError::invalid_config(
                "low_confidence_distance must be positive",
            ));
        }
        if self.min_continuous_duration < 0.0 {
            return Err(JudgeError::invalid_config(
                "min_continuous_duration must be non-negative",
            ));
        }
        if self.lowpass_cutoff <= 0.0 {
            return Err(JudgeError::invalid_config("lowpass_cutoff must be positive"));
        }
        if self.judge_position.iter().any(|v| !v.is_finite()) {
            return Err(JudgeError::invalid_config("judge_position must be finite"));
        }
        Ok(())
    }

    /// Preset for F3A style precision aerobatics (the default).
    #[must_use]
    pub fn f3a() -> Self {
        Self::default()
    }

    /// Preset without smoothing of continuous errors.
    ///
    /// The cutoff is placed far above any realistic sample rate so the
    /// low-pass stage passes the error series through unchanged.
    #[must_use]
    pub fn unfiltered() -> Self {
        Self {
            lowpass_cutoff: 1e6,
            ..Self::default()
        }
    }

    /// Set the alignment radius.
    #[must_use]
    pub const fn with_dtw_radius(mut self, radius: usize) -> Self {
        self.dtw_radius = radius;
        self
    }

    /// Set the template sample rate.
    #[must_use]
    pub const fn with_template_freq(mut self, freq: f64) -> Self {
        self.template_freq = freq;
        self
    }

    /// Enable/disable whitening of alignment features.
    #[must_use]
    pub const fn with_whiten(mut self, whiten: bool) -> Self {
        self.whiten = whiten;
        self
    }

    /// Set the judge position.
    #[must_use]
    pub const fn with_judge_position(mut self, position: [f64; 3]) -> Self {
        self.judge_position = position;
        self
    }

    /// Set the low-pass cutoff for continuous errors.
    #[must_use]
    pub const fn with_lowpass_cutoff(mut self, cutoff: f64) -> Self {
        self.lowpass_cutoff = cutoff;
        self
    }

    /// Number of samples below which a continuous criterion scores zero.
    #[must_use]
    pub fn min_continuous_samples(&self, sample_rate: f64) -> usize {
        let by_duration = (self.min_continuous_duration * sample_rate).ceil().max(0.0) as usize;
        by_duration.max(2 * self.guard_samples + 3)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = JudgingConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.template_freq, 25.0);
        assert_eq!(config.dtw_radius, 5);
    }

    #[test]
    fn test_validation() {
        let mut config = JudgingConfig::default();

        config.template_freq = 0.0;
        assert!(config.validate().is_err());

        config.template_freq = 25.0;
        config.dtw_radius = 0;
        assert!(config.validate().is_err());

        config.dtw_radius = 3;
        config.lowpass_cutoff = -1.0;
        assert!(config.validate().is_err());

        config.lowpass_cutoff = 2.0;
        config.judge_position = [f64::NAN, 0.0, 0.0];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_builder_pattern() {
        let config = JudgingConfig::f3a()
            .with_dtw_radius(8)
            .with_whiten(false)
            .with_judge_position([0.0, -10.0, 0.0]);
        assert_eq!(config.dtw_radius, 8);
        assert!(!config.whiten);
        assert_eq!(config.judge_position[1], -10.0);
    }

    #[test]
    fn test_min_continuous_samples() {
        let config = JudgingConfig::default();
        // 0.5s at 25Hz
        assert_eq!(config.min_continuous_samples(25.0), 13);
        // guard band dominates at low rates
        assert_eq!(config.min_continuous_samples(2.0), 7);
    }
}
