//! The judging pipeline for one manoeuvre and for a schedule.
//!
//! # Pipeline
//!
//! ```text
//! definition ──create_template──▶ template
//! flight + template ──align──▶ labelled flight
//! labelled flight ──match_intention──▶ intention (elements + frames)
//! intention ──update_defaults / apply──▶ corrected manoeuvre
//! intention ──template on flight time base──▶ intended template
//! flight vs intended template ──analyse──▶ intra-element results
//! intention ──ManParms::collect──▶ inter-element results
//! intention ──ManParms::check_choices──▶ reported direction choices
//! ```

use std::collections::HashSet;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::aligner::{align, Alignment};
use crate::config::JudgingConfig;
use crate::downgrade::{DowngradeLibrary, ElementsResults, Results};
use crate::error::{JudgeError, Result};
use crate::elements::Elements;
use crate::manoeuvre::{Intention, Manoeuvre, TemplateGenerator};
use crate::manparm::ManParms;
use crate::math::transform::Transformation;
use crate::state::StateSequence;

/// Score of a manoeuvre before downgrades.
pub const MAX_SCORE: f64 = 10.0;

/// A manoeuvre as it appears in a schedule.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ManoeuvreDefinition {
    /// Nominal manoeuvre.
    pub manoeuvre: Manoeuvre,
    /// Parameters shared between its elements.
    pub mps: ManParms,
    /// Nominal entry transform in the contest frame.
    pub initial: Transformation,
}

impl ManoeuvreDefinition {
    /// Create a definition.
    #[must_use]
    pub fn new(manoeuvre: Manoeuvre, mps: ManParms, initial: Transformation) -> Self {
        Self {
            manoeuvre,
            mps,
            initial,
        }
    }

    /// Judge one flown manoeuvre with the default downgrade library.
    ///
    /// # Errors
    ///
    /// Returns the first error of any pipeline stage.
    pub fn analyse(&self, flown: &StateSequence, config: &JudgingConfig) -> Result<ManoeuvreResults> {
        self.analyse_with(flown, &DowngradeLibrary::default(), config)
    }

    /// Judge one flown manoeuvre with a given downgrade library.
    ///
    /// The flight is aligned to the nominal template, every element is
    /// re-fitted starting at the flight's first position with the nominal
    /// entry attitude, and the flight is judged against the template of the
    /// fitted manoeuvre on the flight's own time base.
    ///
    /// # Errors
    ///
    /// Returns the first error of any pipeline stage.
    pub fn analyse_with(
        &self,
        flown: &StateSequence,
        library: &DowngradeLibrary,
        config: &JudgingConfig,
    ) -> Result<ManoeuvreResults> {
        config.validate()?;
        let (template, elements) = self.manoeuvre.create(&self.initial, config.template_freq)?;
        tracing::debug!(
            manoeuvre = %self.manoeuvre.name,
            elements = elements.len(),
            samples = template.len(),
            "created template"
        );
        let alignment = align(flown, &template, config.dtw_radius, config)?;
        self.judge(&alignment.flown, &alignment, library, config)
    }

    /// Everything after alignment, on the samples labelled with this
    /// manoeuvre.
    fn judge(
        &self,
        labelled: &StateSequence,
        alignment: &Alignment,
        library: &DowngradeLibrary,
        config: &JudgingConfig,
    ) -> Result<ManoeuvreResults> {
        let start = Transformation::new(labelled.first().pos, self.initial.att);
        let intention = self.manoeuvre.match_intention(&start, labelled)?;

        let mps = self.mps.update_defaults(&intention.manoeuvre)?;
        let choices = mps.check_choices(&intention.manoeuvre)?;
        let corrected = mps.apply(&intention.manoeuvre)?;

        let intended_template = intention.template(labelled)?;
        let intra = intention.analyse(labelled, &intended_template, library, config)?;
        let inter = mps.collect(&intention.manoeuvre, config)?;

        let results = ManoeuvreResults {
            name: self.manoeuvre.name.clone(),
            k: self.manoeuvre.k,
            distance: alignment.distance,
            low_confidence: alignment.is_low_confidence(config),
            inter,
            intra,
            choices,
            intention,
            corrected,
        };
        tracing::info!(
            manoeuvre = %results.name,
            downgrade = results.downgrade(),
            score = results.score(),
            "judged manoeuvre"
        );
        Ok(results)
    }
}

impl TemplateGenerator for ManoeuvreDefinition {
    fn create(&self, initial: &Transformation, freq: f64) -> Result<(StateSequence, Elements)> {
        self.manoeuvre.create(initial, freq)
    }
}

/// Everything produced by judging one manoeuvre.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ManoeuvreResults {
    /// Manoeuvre name.
    pub name: String,
    /// Difficulty factor.
    pub k: f64,
    /// Total alignment distance.
    pub distance: f64,
    /// Whether the alignment was too poor to trust.
    pub low_confidence: bool,
    /// Inter-element (shared parameter) results.
    pub inter: Results,
    /// Intra-element results.
    pub intra: ElementsResults,
    /// Direction choices judged against the corrected options; not part of
    /// the downgrade.
    pub choices: Results,
    /// The manoeuvre re-fitted to the flight.
    pub intention: Intention,
    /// The fitted manoeuvre with shared parameters made consistent.
    pub corrected: Manoeuvre,
}

impl ManoeuvreResults {
    /// Total truncated downgrade.
    #[must_use]
    pub fn downgrade(&self) -> f64 {
        self.inter.downgrade() + self.intra.downgrade()
    }

    /// Score out of [`MAX_SCORE`], never negative.
    #[must_use]
    pub fn score(&self) -> f64 {
        (MAX_SCORE - self.downgrade()).max(0.0)
    }

    /// Score multiplied by the difficulty factor.
    #[must_use]
    pub fn weighted_score(&self) -> f64 {
        self.score() * self.k
    }

    /// Downgrade rows: "inter" followed by one row per element.
    #[must_use]
    pub fn summary(&self) -> Vec<(String, f64)> {
        std::iter::once((self.inter.name.clone(), self.inter.downgrade()))
            .chain(self.intra.summary())
            .collect()
    }
}

/// An ordered list of manoeuvre definitions.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Schedule {
    /// Definitions in flight order.
    pub manoeuvres: Vec<ManoeuvreDefinition>,
}

impl Schedule {
    /// Create a schedule.
    #[must_use]
    pub fn new(manoeuvres: Vec<ManoeuvreDefinition>) -> Self {
        Self { manoeuvres }
    }

    /// Labelled template of the whole schedule, each manoeuvre generated
    /// from its own entry transform.
    ///
    /// # Errors
    ///
    /// Returns [`JudgeError::EmptySequence`] for an empty schedule,
    /// [`JudgeError::DuplicateId`] if two manoeuvres share a name, or an
    /// error from template generation.
    pub fn create_template(&self, freq: f64) -> Result<StateSequence> {
        let mut names = HashSet::new();
        let mut parts = Vec::with_capacity(self.manoeuvres.len());
        for definition in &self.manoeuvres {
            if !names.insert(definition.manoeuvre.name.as_str()) {
                return Err(JudgeError::DuplicateId(definition.manoeuvre.name.clone()));
            }
            let (template, _) = definition.create(&definition.initial, freq)?;
            parts.push(template);
        }
        if parts.is_empty() {
            return Err(JudgeError::empty("schedule"));
        }
        StateSequence::stack(parts)
    }

    /// Judge a whole flight.
    ///
    /// The flight is aligned once against the schedule template, split by
    /// manoeuvre label, and each part is judged as by
    /// [`ManoeuvreDefinition::analyse`]. Every manoeuvre reports the
    /// distance and confidence of the single schedule alignment.
    ///
    /// # Errors
    ///
    /// Returns an error if the template cannot be built, a manoeuvre gets no
    /// flown samples, or any manoeuvre fails to be judged.
    pub fn analyse(&self, flown: &StateSequence, config: &JudgingConfig) -> Result<ScheduleResults> {
        config.validate()?;
        let template = self.create_template(config.template_freq)?;
        let alignment = align(flown, &template, config.dtw_radius, config)?;
        let library = DowngradeLibrary::default();
        let manoeuvres = self
            .manoeuvres
            .iter()
            .map(|definition| {
                let segment = alignment.flown.manoeuvre(&definition.manoeuvre.name)?;
                definition.judge(&segment, &alignment, &library, config)
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(ScheduleResults { manoeuvres })
    }

    /// Judge one pre-split flown segment per manoeuvre, aligning each on its
    /// own.
    ///
    /// # Errors
    ///
    /// Returns [`JudgeError::LengthMismatch`] if the number of segments
    /// differs from the number of manoeuvres, or the first error of any
    /// manoeuvre.
    pub fn analyse_segments(&self, segments: &[StateSequence], config: &JudgingConfig) -> Result<ScheduleResults> {
        if segments.len() != self.manoeuvres.len() {
            return Err(JudgeError::length_mismatch(self.manoeuvres.len(), segments.len()));
        }
        let library = DowngradeLibrary::default();
        let manoeuvres = self
            .manoeuvres
            .iter()
            .zip(segments.iter())
            .map(|(definition, flown)| definition.analyse_with(flown, &library, config))
            .collect::<Result<Vec<_>>>()?;
        Ok(ScheduleResults { manoeuvres })
    }
}

/// Results of a whole schedule.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ScheduleResults {
    /// Per-manoeuvre results in flight order.
    pub manoeuvres: Vec<ManoeuvreResults>,
}

impl ScheduleResults {
    /// Sum of difficulty-weighted scores.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.manoeuvres.iter().map(ManoeuvreResults::weighted_score).sum()
    }

    /// Score per manoeuvre.
    #[must_use]
    pub fn summary(&self) -> Vec<(String, f64)> {
        self.manoeuvres
            .iter()
            .map(|m| (m.name.clone(), m.score()))
            .collect()
    }
}
