//! Excursion extraction on error series.
//!
//! An excursion is a rising run of the series (a trough followed by a peak)
//! together with the fall that follows it, up to the start of the next rising
//! run or the end of the series.

/// One rise-and-fall of an error series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Excursion {
    /// Start of the rising run.
    pub trough: usize,
    /// End of the rising run.
    pub peak: usize,
    /// Lowest point reached before the next rise (or the last sample).
    pub recovery: usize,
}

/// Find all excursions of `series`.
///
/// Plateaus split a rise into separate excursions, so a series that climbs,
/// holds and climbs again is counted as two mistakes. A series that starts
/// high and only falls has no excursions.
#[must_use]
pub fn excursions(series: &[f64]) -> Vec<Excursion> {
    let n = series.len();
    let mut runs: Vec<(usize, usize)> = Vec::new();

    let mut i = 0;
    while i + 1 < n {
        if series[i + 1] > series[i] {
            let start = i;
            while i + 1 < n && series[i + 1] > series[i] {
                i += 1;
            }
            runs.push((start, i));
        } else {
            i += 1;
        }
    }

    runs.iter()
        .enumerate()
        .map(|(k, &(trough, peak))| Excursion {
            trough,
            peak,
            recovery: runs.get(k + 1).map_or(n - 1, |next| next.0),
        })
        .collect()
}

/// Cumulative sum of the gradient of `series`, each step weighted by
/// `weights` at the step's end sample.
///
/// The result starts at `series[0] * weights[0]`.
#[must_use]
pub fn weighted_cumulative(series: &[f64], weights: &[f64]) -> Vec<f64> {
    let mut out = Vec::with_capacity(series.len());
    let Some((&first, &w0)) = series.first().zip(weights.first()) else {
        return out;
    };
    let mut acc = first * w0;
    out.push(acc);
    for (pair, &w) in series.windows(2).zip(weights.iter().skip(1)) {
        acc += (pair[1] - pair[0]) * w;
        out.push(acc);
    }
    out
}
