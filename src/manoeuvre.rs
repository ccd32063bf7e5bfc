//! Manoeuvres: ordered elements, their templates and their intentions.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::config::JudgingConfig;
use crate::downgrade::{DowngradeLibrary, ElementsResults, Results};
use crate::elements::{Element, Elements, Sampling};
use crate::error::{JudgeError, Result};
use crate::math::transform::Transformation;
use crate::state::{Label, StateSequence};

/// Source of labelled templates.
pub trait TemplateGenerator {
    /// Generate the ideal labelled states and the elements they came from,
    /// starting at `initial` and sampled at `freq` Hz.
    ///
    /// # Errors
    ///
    /// Returns an error if any element is degenerate.
    fn create(&self, initial: &Transformation, freq: f64) -> Result<(StateSequence, Elements)>;
}

/// A named sequence of elements with a judging weight.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Manoeuvre {
    /// Manoeuvre name, used as the sample label.
    pub name: String,
    /// Difficulty factor applied to the score.
    pub k: f64,
    /// Elements in flight order.
    pub elements: Elements,
}

impl Manoeuvre {
    /// Create a manoeuvre.
    ///
    /// # Errors
    ///
    /// Returns an error if there are no elements, two share an id, or one is
    /// degenerate.
    pub fn new(name: impl Into<String>, k: f64, elements: Vec<Element>) -> Result<Self> {
        let name = name.into();
        if elements.is_empty() {
            return Err(JudgeError::empty(format!("manoeuvre {name}")));
        }
        for element in &elements {
            element.validate()?;
        }
        Ok(Self {
            name,
            k,
            elements: Elements::new(elements)?,
        })
    }

    /// Copy with different elements.
    #[must_use]
    pub fn with_elements(&self, elements: Elements) -> Self {
        Self {
            name: self.name.clone(),
            k: self.k,
            elements,
        }
    }

    fn label(&self, element: &Element) -> Label {
        Label::new(self.name.clone(), element.id())
    }

    /// Transformation at the end of the manoeuvre.
    #[must_use]
    pub fn end_transform(&self, start: &Transformation) -> Transformation {
        self.elements
            .iter()
            .fold(*start, |at, element| element.end_transform(&at))
    }

    /// Generate the labelled template, each element starting where the
    /// previous one ended.
    ///
    /// # Errors
    ///
    /// Returns an error if `freq` is not positive.
    pub fn create_template(&self, start: &Transformation, freq: f64) -> Result<StateSequence> {
        let mut at = *start;
        let mut parts = Vec::with_capacity(self.elements.len());
        for element in &self.elements {
            let part = element
                .create_template(&at, Sampling::Rate(freq))?
                .labelled_uniform(&self.label(element));
            parts.push(part);
            at = element.end_transform(&at);
        }
        StateSequence::stack(parts)
    }

    /// Generate the template on the time base of a labelled flight.
    ///
    /// Each element is sampled at the flown times carrying its label,
    /// rescaled so the element's first flown sample maps to its start and the
    /// next element's first sample maps to its end. The result has the
    /// flight's times and labels.
    ///
    /// # Errors
    ///
    /// Returns [`JudgeError::MissingElement`] if an element has no flown
    /// samples, or an error if the flight is unlabelled.
    pub fn create_template_aligned(&self, start: &Transformation, flown: &StateSequence) -> Result<StateSequence> {
        if flown.labels().is_none() {
            return Err(JudgeError::invalid_input("flight must be labelled"));
        }
        let time = flown.time();
        let mut at = *start;
        let mut parts = Vec::with_capacity(self.elements.len());
        for element in &self.elements {
            let range = flown
                .element_range(element.id())
                .ok_or_else(|| JudgeError::missing_element(element.id()))?;
            let t_start = time[range.start];
            let t_end = time[range.end.min(time.len() - 1)];
            let span = t_end - t_start;
            let duration = element.duration();
            let relative: Vec<f64> = time[range.clone()]
                .iter()
                .map(|t| if span > 0.0 { (t - t_start) * duration / span } else { 0.0 })
                .collect();

            let states = relative.iter().map(|&t| element.state_at(&at, t)).collect();
            let label = self.label(element);
            let part = StateSequence::new(time[range.clone()].to_vec(), states)?
                .with_labels(vec![label; range.len()])?;
            parts.push(part);
            at = element.end_transform(&at);
        }
        StateSequence::concat(parts)
    }

    /// Re-fit every element to a labelled flight.
    ///
    /// Elements are fitted in order, each starting at the end transform of
    /// the previous fitted element.
    ///
    /// # Errors
    ///
    /// Returns an error if an element has no flown samples or cannot be
    /// fitted.
    pub fn match_intention(&self, start: &Transformation, flown: &StateSequence) -> Result<Intention> {
        let mut at = *start;
        let mut elements = Vec::with_capacity(self.elements.len());
        let mut frames = Vec::with_capacity(self.elements.len());
        for element in &self.elements {
            let samples = flown.element_inclusive(element.id())?;
            let fit = element.match_intention(&at, &samples)?;
            at = fit.element.end_transform(&at);
            elements.push(fit.element);
            frames.push(fit.frame);
        }
        Ok(Intention {
            manoeuvre: self.with_elements(Elements::new(elements)?),
            start: *start,
            frames,
        })
    }
}

impl TemplateGenerator for Manoeuvre {
    fn create(&self, initial: &Transformation, freq: f64) -> Result<(StateSequence, Elements)> {
        Ok((self.create_template(initial, freq)?, self.elements.clone()))
    }
}

/// A manoeuvre re-fitted to a flight, with each element's reference frame.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Intention {
    /// The fitted manoeuvre.
    pub manoeuvre: Manoeuvre,
    /// Start transform the fit was chained from.
    pub start: Transformation,
    /// Reference frame of each element, in element order.
    pub frames: Vec<Transformation>,
}

impl Intention {
    /// Reference frame of the element with the given id.
    #[must_use]
    pub fn frame(&self, element: &str) -> Option<&Transformation> {
        self.manoeuvre
            .elements
            .position(element)
            .and_then(|i| self.frames.get(i))
    }

    /// The intended template on the flight's time base.
    ///
    /// # Errors
    ///
    /// Same as [`Manoeuvre::create_template_aligned`].
    pub fn template(&self, flown: &StateSequence) -> Result<StateSequence> {
        self.manoeuvre.create_template_aligned(&self.start, flown)
    }

    /// Judge every element of a labelled flight against the intended template.
    ///
    /// Both sequences must share labels and time base. Each element is judged
    /// on its samples plus the following boundary sample.
    ///
    /// # Errors
    ///
    /// Returns an error if an element is missing from either sequence or a
    /// downgrade cannot be applied.
    pub fn analyse(
        &self,
        flown: &StateSequence,
        template: &StateSequence,
        library: &DowngradeLibrary,
        config: &JudgingConfig,
    ) -> Result<ElementsResults> {
        let mut out = ElementsResults::default();
        for (element, frame) in self.manoeuvre.elements.iter().zip(self.frames.iter()) {
            let fl = flown.element_inclusive(element.id())?;
            let tp = template.element_inclusive(element.id())?;
            let mut results = Results::new(element.id());
            for downgrade in library.for_kind(element.kind()) {
                results.push(downgrade.apply(&fl, &tp, frame, config)?);
            }
            tracing::debug!(
                element = element.id(),
                downgrade = results.downgrade(),
                "judged element"
            );
            out.results.push(results);
        }
        Ok(out)
    }
}
