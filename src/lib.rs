//! Aerobatic Flight Judging Library
//!
//! Alignment, intention matching and downgrade scoring of recorded aerobatic
//! flights against a parametric schedule of manoeuvres.
//!
//! Given an already-framed time series of aircraft state and a symbolic
//! manoeuvre definition, the library:
//!
//! 1. aligns the flight to an ideal template by dynamic time warping,
//! 2. re-fits each element's free parameters to what was flown,
//! 3. scores the residual error between the flight and the fitted template.
//!
//! # Features
//!
//! - **Alignment**: banded multi-resolution DTW on rectified body rates
//! - **Intention matching**: closed-form and least-squares element fits
//! - **Criteria**: single, continuous, comparison and combination downgrades
//! - **Visibility**: errors weighted by how apparent they are to the judge
//!
//! # Quick Start
//!
//! ```
//! use aero_judge::elements::{Line, Loop};
//! use aero_judge::{JudgingConfig, ManParms, Manoeuvre, ManoeuvreDefinition, Transformation};
//! use nalgebra::{UnitQuaternion, Vector3};
//!
//! let manoeuvre = Manoeuvre::new(
//!     "loop",
//!     2.0,
//!     vec![
//!         Line::new("entry", 30.0, 60.0).into(),
//!         Loop::new("loop", 30.0, 70.0, std::f64::consts::TAU).into(),
//!         Line::new("exit", 30.0, 60.0).into(),
//!     ],
//! )?;
//! let initial = Transformation::new(Vector3::new(-100.0, 150.0, -60.0), UnitQuaternion::identity());
//! let definition = ManoeuvreDefinition::new(manoeuvre, ManParms::default(), initial);
//!
//! // A flight that follows the template exactly scores full marks.
//! let config = JudgingConfig::default();
//! let flown = definition.manoeuvre.create_template(&initial, config.template_freq)?;
//! let results = definition.analyse(&flown, &config)?;
//! assert_eq!(results.score(), 10.0);
//! # Ok::<(), aero_judge::JudgeError>(())
//! ```
//!
//! # Downgrades
//!
//! | Criterion | Input | Use |
//! |-----------|-------|-----|
//! | `Single` | error series (last sample) | end-of-element errors |
//! | `Continuous` | error series | errors held through an element |
//! | `Comparison` | collected values | consistency between elements |
//! | `Combination` | collected values | discrete direction choices |
//!
//! Every reported downgrade is truncated down to a multiple of
//! [`TRUNCATION_STEP`].

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::similar_names)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]

pub mod aligner;
pub mod analysis;
pub mod config;
pub mod criteria;
pub mod downgrade;
pub mod elements;
pub mod error;
pub mod manoeuvre;
pub mod manparm;
pub mod math;
pub mod measurement;
pub mod state;

// Re-exports for convenient access
pub use aligner::{align, Alignment};
pub use analysis::{ManoeuvreDefinition, ManoeuvreResults, Schedule, ScheduleResults, MAX_SCORE};
pub use config::{JudgingConfig, TRUNCATION_STEP};
pub use criteria::{Assessment, Criterion, CriterionInput, ErrorMode, Exponential};
pub use downgrade::{Downgrade, DowngradeLibrary, DowngradeResult, ElementsResults, Results};
pub use elements::{Element, ElementKind, Elements, Fit, ParameterKind, Sampling};
pub use error::{JudgeError, Result};
pub use manoeuvre::{Intention, Manoeuvre, TemplateGenerator};
pub use manparm::{Collector, ManParm, ManParms};
pub use math::Transformation;
pub use measurement::{measure, MeasureKind, Measurement};
pub use state::{Label, State, StateSequence};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
