//! Temporal alignment of a flight to a labelled template.
//!
//! Flights are matched to templates by dynamic time warping over body
//! angular rates. Each rate axis is sign-rectified (a mirrored manoeuvre
//! takes the same effort) and optionally divided by its pooled standard
//! deviation so the three axes weigh equally.
//!
//! The warping path is found with a multi-resolution search: both series are
//! halved recursively, the coarse path is projected back up and widened by
//! `radius` samples, and an exact DTW is run inside that band. At the
//! coarsest level the search is unconstrained.
//!
//! # Example
//!
//! ```
//! use aero_judge::aligner::align;
//! use aero_judge::elements::{Element, Line, Loop};
//! use aero_judge::{JudgingConfig, Manoeuvre, Transformation};
//!
//! let manoeuvre = Manoeuvre::new(
//!     "loop",
//!     2.0,
//!     vec![
//!         Element::from(Line::new("entry", 30.0, 60.0)),
//!         Element::from(Loop::new("loop", 30.0, 60.0, std::f64::consts::TAU)),
//!         Element::from(Line::new("exit", 30.0, 60.0)),
//!     ],
//! )?;
//! let template = manoeuvre.create_template(&Transformation::identity(), 25.0)?;
//! let config = JudgingConfig::default();
//!
//! let alignment = align(&template, &template, config.dtw_radius, &config)?;
//! assert_eq!(alignment.distance, 0.0);
//! assert_eq!(alignment.flown.labels(), template.labels());
//! # Ok::<(), aero_judge::JudgeError>(())
//! ```

use crate::config::JudgingConfig;
use crate::error::{JudgeError, Result};
use crate::state::StateSequence;

/// Warping path as (flown index, template index) pairs.
pub type WarpPath = Vec<(usize, usize)>;

type Feature = [f64; 3];

/// Outcome of aligning a flight to a template.
#[derive(Debug, Clone, PartialEq)]
pub struct Alignment {
    /// Total warping distance (lower is better).
    pub distance: f64,
    /// The flown sequence, labelled from the template.
    pub flown: StateSequence,
    /// Warping path, monotone in both indices.
    pub path: WarpPath,
}

impl Alignment {
    /// Warping distance per path step.
    #[must_use]
    pub fn normalised_distance(&self) -> f64 {
        if self.path.is_empty() {
            0.0
        } else {
            self.distance / self.path.len() as f64
        }
    }

    /// Whether the match is too poor to trust.
    #[must_use]
    pub fn is_low_confidence(&self, config: &JudgingConfig) -> bool {
        self.normalised_distance() > config.low_confidence_distance
    }
}

/// Align `flown` to a labelled `template`.
///
/// Each flown sample takes the label of the last template sample the warping
/// path pairs with it. The flown sequence may be longer or shorter than the
/// template.
///
/// # Errors
///
/// Returns an error if the template is unlabelled or `radius` is zero.
pub fn align(
    flown: &StateSequence,
    template: &StateSequence,
    radius: usize,
    config: &JudgingConfig,
) -> Result<Alignment> {
    let template_labels = template
        .labels()
        .ok_or_else(|| JudgeError::invalid_input("alignment template must be labelled"))?;
    if radius == 0 {
        return Err(JudgeError::invalid_input("alignment radius must be positive"));
    }

    let mut x = features(flown);
    let mut y = features(template);
    if config.whiten {
        whiten(&mut x, &mut y, config.numerical_eps);
    }

    let (distance, path) = fast_dtw(&x, &y, radius);

    let mut labels = vec![template_labels[0].clone(); flown.len()];
    for &(i, j) in &path {
        labels[i] = template_labels[j].clone();
    }
    let labelled = flown.clone().with_labels(labels)?;

    let alignment = Alignment {
        distance,
        flown: labelled,
        path,
    };

    tracing::debug!(
        distance = alignment.distance,
        steps = alignment.path.len(),
        flown = flown.len(),
        template = template.len(),
        "aligned flight to template"
    );
    if alignment.is_low_confidence(config) {
        tracing::warn!(
            normalised = alignment.normalised_distance(),
            threshold = config.low_confidence_distance,
            "low confidence alignment"
        );
    }

    Ok(alignment)
}

/// Sign-rectified body rates.
fn features(seq: &StateSequence) -> Vec<Feature> {
    seq.states()
        .iter()
        .map(|s| [s.rvel.x.abs(), s.rvel.y.abs(), s.rvel.z.abs()])
        .collect()
}

/// Divide each axis by its standard deviation over both series.
fn whiten(x: &mut [Feature], y: &mut [Feature], eps: f64) {
    let n = (x.len() + y.len()) as f64;
    for axis in 0..3 {
        let mean = x.iter().chain(y.iter()).map(|f| f[axis]).sum::<f64>() / n;
        let var = x
            .iter()
            .chain(y.iter())
            .map(|f| (f[axis] - mean).powi(2))
            .sum::<f64>()
            / n;
        let std = var.sqrt();
        if std > eps {
            for f in x.iter_mut().chain(y.iter_mut()) {
                f[axis] /= std;
            }
        }
    }
}

fn distance(a: &Feature, b: &Feature) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(p, q)| (p - q).powi(2))
        .sum::<f64>()
        .sqrt()
}

/// Inclusive column range allowed in each row of the cost matrix.
#[derive(Debug, Clone)]
struct Window {
    lo: Vec<usize>,
    hi: Vec<usize>,
}

impl Window {
    fn full(n: usize, m: usize) -> Self {
        Self {
            lo: vec![0; n],
            hi: vec![m - 1; n],
        }
    }

    /// Project a coarse path up one level and widen it by `radius`.
    fn around(path: &[(usize, usize)], n: usize, m: usize, radius: usize) -> Self {
        let mut lo = vec![usize::MAX; n];
        let mut hi = vec![0; n];
        for &(i, j) in path {
            for a in (2 * i)..(2 * i + 2).min(n) {
                lo[a] = lo[a].min(2 * j);
                hi[a] = hi[a].max((2 * j + 1).min(m - 1));
            }
        }

        let mut window = Self {
            lo: vec![0; n],
            hi: vec![0; n],
        };
        for i in 0..n {
            let rows = i.saturating_sub(radius)..(i + radius + 1).min(n);
            let row_lo = rows.clone().map(|k| lo[k]).min().unwrap_or(0);
            let row_hi = rows.map(|k| hi[k]).max().unwrap_or(m - 1);
            window.lo[i] = row_lo.min(m - 1).saturating_sub(radius);
            window.hi[i] = (row_hi + radius).min(m - 1);
        }

        // Keep the band connected from (0, 0) to (n-1, m-1).
        window.lo[0] = 0;
        window.hi[n - 1] = m - 1;
        for i in 1..n {
            window.hi[i] = window.hi[i].max(window.hi[i - 1]);
            window.lo[i] = window.lo[i].max(window.lo[i - 1]).min(window.hi[i - 1]);
        }
        window
    }
}

/// Average neighbouring samples, keeping a trailing odd sample.
fn coarsen(series: &[Feature]) -> Vec<Feature> {
    series
        .chunks(2)
        .map(|c| {
            let k = c.len() as f64;
            let mut out = [0.0; 3];
            for f in c {
                for (o, v) in out.iter_mut().zip(f.iter()) {
                    *o += v / k;
                }
            }
            out
        })
        .collect()
}

fn fast_dtw(x: &[Feature], y: &[Feature], radius: usize) -> (f64, WarpPath) {
    let min_size = radius + 2;
    if x.len() < min_size || y.len() < min_size {
        return dtw(x, y, &Window::full(x.len(), y.len()));
    }
    let (_, coarse) = fast_dtw(&coarsen(x), &coarsen(y), radius);
    let window = Window::around(&coarse, x.len(), y.len(), radius);
    dtw(x, y, &window)
}

/// Exact DTW restricted to `window`. Backtracking prefers the diagonal.
fn dtw(x: &[Feature], y: &[Feature], window: &Window) -> (f64, WarpPath) {
    let n = x.len();
    let rows: Vec<Vec<f64>> = {
        let mut rows: Vec<Vec<f64>> = Vec::with_capacity(n);
        for i in 0..n {
            let (lo, hi) = (window.lo[i], window.hi[i]);
            let mut row = vec![f64::INFINITY; hi + 1 - lo];
            for j in lo..=hi {
                let d = distance(&x[i], &y[j]);
                let best = if i == 0 && j == 0 {
                    0.0
                } else {
                    let diag = if i > 0 && j > 0 { cell(&rows, window, i - 1, j - 1) } else { f64::INFINITY };
                    let up = if i > 0 { cell(&rows, window, i - 1, j) } else { f64::INFINITY };
                    let left = if j > lo { row[j - 1 - lo] } else { f64::INFINITY };
                    diag.min(up).min(left)
                };
                row[j - lo] = d + best;
            }
            rows.push(row);
        }
        rows
    };

    let (mut i, mut j) = (n - 1, y.len() - 1);
    let total = cell(&rows, window, i, j);
    let mut path = vec![(i, j)];
    while i > 0 || j > 0 {
        if i == 0 {
            j -= 1;
        } else if j == 0 {
            i -= 1;
        } else {
            let diag = cell(&rows, window, i - 1, j - 1);
            let up = cell(&rows, window, i - 1, j);
            let left = cell(&rows, window, i, j - 1);
            if diag <= up && diag <= left {
                i -= 1;
                j -= 1;
            } else if up <= left {
                i -= 1;
            } else {
                j -= 1;
            }
        }
        path.push((i, j));
    }
    path.reverse();
    (total, path)
}

fn cell(rows: &[Vec<f64>], window: &Window, i: usize, j: usize) -> f64 {
    if j < window.lo[i] || j > window.hi[i] {
        f64::INFINITY
    } else {
        rows[i][j - window.lo[i]]
    }
}
