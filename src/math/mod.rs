//! Mathematical utilities for judging.
//!
//! This module provides:
//! - [`transform`]: rigid transformations and rotation helpers
//! - [`fit`]: least-squares circle fitting
//! - [`filter`]: FFT low-pass filtering
//! - [`signal`]: peak/trough excursion extraction

pub mod filter;
pub mod fit;
pub mod signal;
pub mod transform;

pub use filter::{low_pass, sample_rate};
pub use fit::{fit_circle, CircleFit};
pub use signal::{excursions, weighted_cumulative, Excursion};
pub use transform::{rx, ry, rz, wrap_angle, Transformation};
