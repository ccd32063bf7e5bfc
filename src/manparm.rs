//! Manoeuvre parameters shared between elements.
//!
//! A [`ManParm`] names a quantity that several elements should fly the same
//! way (all loop radii, the speed of two lines, a pair of roll directions).
//! Its [`Collector`]s read the quantity from each element in declaration
//! order; its criterion judges the consistency of the collected values.
//!
//! After intention matching, [`ManParms::update_defaults`] moves each default
//! to what was flown and [`ManParms::apply`] rebuilds a corrected manoeuvre
//! in which every element flies the shared value.

use std::collections::HashMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::config::JudgingConfig;
use crate::criteria::{Criterion, CriterionInput};
use crate::downgrade::{DowngradeResult, Results};
use crate::elements::{Elements, ParameterKind};
use crate::error::{JudgeError, Result};
use crate::manoeuvre::Manoeuvre;
use crate::math::transform::sign_or;

/// Reads one element parameter, scaled by a linear factor.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Collector {
    /// Element id.
    pub element: String,
    /// Parameter read from the element.
    pub parameter: ParameterKind,
    /// Collected value is `factor * parameter`.
    pub factor: f64,
}

impl Collector {
    /// Collect a parameter unscaled.
    #[must_use]
    pub fn new(element: impl Into<String>, parameter: ParameterKind) -> Self {
        Self {
            element: element.into(),
            parameter,
            factor: 1.0,
        }
    }

    /// Set the linear factor.
    #[must_use]
    pub const fn with_factor(mut self, factor: f64) -> Self {
        self.factor = factor;
        self
    }

    /// Collected value from `elements`.
    ///
    /// # Errors
    ///
    /// Returns an error if the element is missing or lacks the parameter.
    pub fn collect(&self, elements: &Elements) -> Result<f64> {
        let element = elements
            .get(&self.element)
            .ok_or_else(|| JudgeError::missing_element(&self.element))?;
        let value = element.parameter(self.parameter).ok_or_else(|| {
            JudgeError::invalid_input(format!(
                "element {} has no {} parameter",
                self.element,
                self.parameter.name()
            ))
        })?;
        Ok(self.factor * value)
    }
}

/// A named parameter shared between elements.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ManParm {
    /// Parameter name.
    pub name: String,
    /// Consistency criterion.
    pub criterion: Criterion,
    /// Shared value; the chosen option index for a Combination.
    pub default: f64,
    /// Collectors in declaration order.
    pub collectors: Vec<Collector>,
}

impl ManParm {
    /// Create a parameter.
    #[must_use]
    pub fn new(name: impl Into<String>, criterion: Criterion, default: f64, collectors: Vec<Collector>) -> Self {
        Self {
            name: name.into(),
            criterion,
            default,
            collectors,
        }
    }

    /// Collected values in declaration order.
    ///
    /// # Errors
    ///
    /// Returns an error if a collector cannot read its element.
    pub fn collect(&self, elements: &Elements) -> Result<Vec<f64>> {
        self.collectors.iter().map(|c| c.collect(elements)).collect()
    }

    /// Judge the consistency of the collected values.
    ///
    /// # Errors
    ///
    /// Returns an error if collection fails or the criterion rejects the
    /// values.
    pub fn evaluate(&self, elements: &Elements, config: &JudgingConfig) -> Result<DowngradeResult> {
        let values = self.collect(elements)?;
        let assessment = self
            .criterion
            .evaluate(CriterionInput::Values(&values), config)?;
        Ok(DowngradeResult::new(self.name.clone(), None, values, assessment))
    }

    /// Copy with the default moved to the collected values: their mean
    /// magnitude, or the best option index for a Combination.
    ///
    /// # Errors
    ///
    /// Returns an error if collection fails.
    #[allow(clippy::cast_precision_loss)]
    pub fn updated(&self, elements: &Elements) -> Result<Self> {
        let values = self.collect(elements)?;
        let default = if self.criterion.is_combination() {
            self.criterion.check_option(&values)? as f64
        } else if values.is_empty() {
            self.default
        } else {
            values.iter().map(|v| v.abs()).sum::<f64>() / values.len() as f64
        };
        Ok(Self {
            default,
            ..self.clone()
        })
    }

    /// Option index stored in the default of a Combination.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn chosen_option(&self) -> usize {
        self.default.round().max(0.0) as usize
    }

    /// Judge the collected values of a Combination against the option held
    /// in the default. Scores zero when the values are closest to another
    /// option.
    ///
    /// # Errors
    ///
    /// Returns an error if collection fails or this is not a Combination.
    pub fn evaluate_choice(&self, elements: &Elements) -> Result<DowngradeResult> {
        let values = self.collect(elements)?;
        let assessment = self.criterion.evaluate_against(&values, self.chosen_option())?;
        Ok(DowngradeResult::new(self.name.clone(), None, values, assessment))
    }

    /// Value the collector's element should carry, given its current value.
    fn target(&self, index: usize, collector: &Collector, current: f64) -> Result<f64> {
        match &self.criterion {
            Criterion::Combination { options, .. } => {
                let chosen = self.chosen_option();
                let value = options
                    .get(chosen)
                    .and_then(|o| o.get(index))
                    .ok_or_else(|| JudgeError::invalid_input(format!("{} has no option {chosen}", self.name)))?;
                Ok(value / collector.factor)
            }
            _ => Ok(sign_or(current, 1.0) * (self.default / collector.factor).abs()),
        }
    }
}

/// Ordered collection of parameters with unique names.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ManParms {
    items: Vec<ManParm>,
    index: HashMap<String, usize>,
}

impl ManParms {
    /// Create a collection, preserving order.
    ///
    /// # Errors
    ///
    /// Returns [`JudgeError::DuplicateId`] if two parameters share a name.
    pub fn new(items: Vec<ManParm>) -> Result<Self> {
        let mut index = HashMap::with_capacity(items.len());
        for (i, parm) in items.iter().enumerate() {
            if index.insert(parm.name.clone(), i).is_some() {
                return Err(JudgeError::DuplicateId(parm.name.clone()));
            }
        }
        Ok(Self { items, index })
    }

    /// Parameter with the given name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ManParm> {
        self.index.get(name).map(|&i| &self.items[i])
    }

    /// Parameters in order.
    pub fn iter(&self) -> std::slice::Iter<'_, ManParm> {
        self.items.iter()
    }

    /// Number of parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether there are no parameters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Inter-element results of a manoeuvre. Combination parameters only
    /// select options and are left out.
    ///
    /// # Errors
    ///
    /// Returns an error if a parameter cannot be collected or evaluated.
    pub fn collect(&self, manoeuvre: &Manoeuvre, config: &JudgingConfig) -> Result<Results> {
        let mut results = Results::new("inter");
        for parm in self.items.iter().filter(|p| !p.criterion.is_combination()) {
            results.push(parm.evaluate(&manoeuvre.elements, config)?);
        }
        tracing::debug!(
            manoeuvre = %manoeuvre.name,
            downgrade = results.downgrade(),
            "judged shared parameters"
        );
        Ok(results)
    }

    /// Direction bookkeeping of a manoeuvre: every Combination parameter
    /// judged against the option held in its default. These results gate
    /// the corrected manoeuvre and are not part of any downgrade total.
    ///
    /// # Errors
    ///
    /// Returns an error if a parameter cannot be collected.
    pub fn check_choices(&self, manoeuvre: &Manoeuvre) -> Result<Results> {
        let mut results = Results::new("choices");
        for parm in self.items.iter().filter(|p| p.criterion.is_combination()) {
            results.push(parm.evaluate_choice(&manoeuvre.elements)?);
        }
        Ok(results)
    }

    /// Copy with every default moved to the values flown in `manoeuvre`.
    ///
    /// # Errors
    ///
    /// Returns an error if a parameter cannot be collected.
    pub fn update_defaults(&self, manoeuvre: &Manoeuvre) -> Result<Self> {
        let items = self
            .items
            .iter()
            .map(|p| p.updated(&manoeuvre.elements))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            items,
            index: self.index.clone(),
        })
    }

    /// Corrected copy of `manoeuvre` with every collected element parameter
    /// set from its default.
    ///
    /// Non-combination parameters keep each element's sign and take the
    /// magnitude `default / factor`; combination parameters take the exact
    /// values of the chosen option.
    ///
    /// # Errors
    ///
    /// Returns an error if an element is missing or a new value makes it
    /// degenerate.
    pub fn apply(&self, manoeuvre: &Manoeuvre) -> Result<Manoeuvre> {
        let mut elements = manoeuvre.elements.clone();
        for parm in &self.items {
            for (i, collector) in parm.collectors.iter().enumerate() {
                let element = elements
                    .get(&collector.element)
                    .ok_or_else(|| JudgeError::missing_element(&collector.element))?;
                let current = element.parameter(collector.parameter).unwrap_or(0.0);
                let value = parm.target(i, collector, current)?;
                let updated = element.with_parameter(collector.parameter, value)?;
                elements = elements.replace(updated)?;
            }
        }
        Ok(manoeuvre.with_elements(elements))
    }
}

impl<'a> IntoIterator for &'a ManParms {
    type Item = &'a ManParm;
    type IntoIter = std::slice::Iter<'a, ManParm>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(feature = "serde")]
impl Serialize for ManParms {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.items.serialize(serializer)
    }
}

#[cfg(feature = "serde")]
impl<'de> Deserialize<'de> for ManParms {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let items = Vec::<ManParm>::deserialize(deserializer)?;
        Self::new(items).map_err(serde::de::Error::custom)
    }
}
