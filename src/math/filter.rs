//! Spectral low-pass filtering of error series.
//!
//! The signal is mirrored before the FFT (even extension, as a DCT does) so
//! the implicit periodic signal has no jump at the boundaries and the filter
//! does not ring at the ends of an element.

use num_complex::Complex64;
use rustfft::FftPlanner;

/// Low-pass filter a uniformly sampled signal.
///
/// Frequency bins above `cutoff` (Hz) are removed. Signals shorter than 3
/// samples, or a cutoff at or above Nyquist, are returned unchanged.
///
/// # Arguments
///
/// * `signal` - Samples to filter
/// * `cutoff` - Cutoff frequency (Hz)
/// * `sample_rate` - Sample rate of `signal` (Hz)
#[must_use]
pub fn low_pass(signal: &[f64], cutoff: f64, sample_rate: f64) -> Vec<f64> {
    let n = signal.len();
    if n < 3 || !sample_rate.is_finite() || sample_rate <= 0.0 || cutoff >= sample_rate / 2.0 {
        return signal.to_vec();
    }

    let mut buffer: Vec<Complex64> = signal
        .iter()
        .chain(signal.iter().rev())
        .map(|&x| Complex64::new(x, 0.0))
        .collect();
    let len = buffer.len();

    let mut planner = FftPlanner::new();
    planner.plan_fft_forward(len).process(&mut buffer);

    for (k, c) in buffer.iter_mut().enumerate() {
        let bin = k.min(len - k);
        let freq = bin as f64 * sample_rate / len as f64;
        if freq > cutoff {
            *c = Complex64::new(0.0, 0.0);
        }
    }

    planner.plan_fft_inverse(len).process(&mut buffer);

    buffer
        .iter()
        .take(n)
        .map(|c| c.re / len as f64)
        .collect()
}

/// Estimate the sample rate of a time base from its mean interval.
#[must_use]
pub fn sample_rate(times: &[f64]) -> Option<f64> {
    if times.len() < 2 {
        return None;
    }
    let span = times[times.len() - 1] - times[0];
    if span > 0.0 {
        Some((times.len() - 1) as f64 / span)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    #[test]
    fn test_constant_preserved() {
        let signal = vec![3.0; 50];
        let filtered = low_pass(&signal, 1.0, 25.0);
        for v in filtered {
            assert_relative_eq!(v, 3.0, epsilon = 1e-10);
        }
    }

    #[test]
    fn test_zero_stays_zero() {
        let filtered = low_pass(&[0.0; 40], 2.0, 25.0);
        assert!(filtered.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_high_frequency_removed() {
        let fs = 25.0;
        let slow: Vec<f64> = (0..200).map(|i| (2.0 * PI * 0.2 * i as f64 / fs).sin()).collect();
        let noisy: Vec<f64> = slow
            .iter()
            .enumerate()
            .map(|(i, s)| s + 0.3 * (2.0 * PI * 10.0 * i as f64 / fs).sin())
            .collect();
        let filtered = low_pass(&noisy, 2.0, fs);

        let err: f64 = filtered
            .iter()
            .zip(slow.iter())
            .skip(20)
            .take(160)
            .map(|(a, b)| (a - b).abs())
            .fold(0.0, f64::max);
        assert!(err < 0.1, "residual high frequency content: {}", err);
    }

    #[test]
    fn test_cutoff_above_nyquist_passthrough() {
        let signal: Vec<f64> = (0..10).map(f64::from).collect();
        assert_eq!(low_pass(&signal, 100.0, 25.0), signal);
    }

    #[test]
    fn test_sample_rate() {
        let times: Vec<f64> = (0..26).map(|i| i as f64 * 0.04).collect();
        assert_relative_eq!(sample_rate(&times).unwrap(), 25.0, epsilon = 1e-9);
        assert!(sample_rate(&[1.0]).is_none());
    }
}
