//! Least-squares geometric fits.
//!
//! Uses nalgebra's SVD to solve the algebraic (Kåsa) circle fit.

use crate::error::{JudgeError, Result};
use nalgebra::{DMatrix, DVector, Vector2};

/// Relative singular value below which the fit is treated as rank deficient.
const RANK_TOLERANCE: f64 = 1e-9;

/// Result of a circle fit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CircleFit {
    /// Circle centre in the input coordinates.
    pub centre: Vector2<f64>,
    /// Circle radius.
    pub radius: f64,
    /// Root mean square radial residual.
    pub rms: f64,
}

/// Fit a circle to planar points.
///
/// Solves `2cx·x + 2cy·y + c = x² + y²` in the least-squares sense, with the
/// points centred on their mean for conditioning.
///
/// # Errors
///
/// Returns an error if fewer than 3 points are given, the points are
/// collinear (or coincident), or the solution is not finite.
pub fn fit_circle(points: &[Vector2<f64>]) -> Result<CircleFit> {
    let n = points.len();
    if n < 3 {
        return Err(JudgeError::fit_failed(format!(
            "circle fit needs at least 3 points, got {n}"
        )));
    }

    let mean = points.iter().fold(Vector2::zeros(), |acc, p| acc + p) / n as f64;
    let centred: Vec<Vector2<f64>> = points.iter().map(|p| p - mean).collect();

    let a = DMatrix::from_fn(n, 3, |i, j| match j {
        0 => 2.0 * centred[i].x,
        1 => 2.0 * centred[i].y,
        _ => 1.0,
    });
    let b = DVector::from_iterator(n, centred.iter().map(|p| p.norm_squared()));

    let svd = a.svd(true, true);
    let max_sv = svd.singular_values.max();
    let min_sv = svd.singular_values.min();
    if max_sv <= 0.0 || min_sv <= max_sv * RANK_TOLERANCE {
        return Err(JudgeError::fit_failed("points are collinear"));
    }

    let solution = svd
        .solve(&b, max_sv * RANK_TOLERANCE)
        .map_err(JudgeError::fit_failed)?;

    let centre = Vector2::new(solution[0], solution[1]);
    let radius_sq = solution[2] + centre.norm_squared();
    if !radius_sq.is_finite() || radius_sq <= 0.0 {
        return Err(JudgeError::fit_failed("non-positive squared radius"));
    }
    let radius = radius_sq.sqrt();

    let rms = (centred
        .iter()
        .map(|p| ((p - centre).norm() - radius).powi(2))
        .sum::<f64>()
        / n as f64)
        .sqrt();

    Ok(CircleFit {
        centre: centre + mean,
        radius,
        rms,
    })
}
