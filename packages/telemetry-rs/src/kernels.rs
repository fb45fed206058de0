//! Numeric kernels
//!
//! Pure, stateless building blocks shared by the decimation algorithms, the
//! streaming buffer and the analytics handlers. Empty inputs return neutral
//! values (0.0 or empty vectors) rather than panicking.

use rustfft::num_complex::Complex;
use std::cmp::Ordering;
use std::f64::consts::PI;

/// Arithmetic mean
pub fn mean(data: &[f64]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    data.iter().sum::<f64>() / data.len() as f64
}

/// Sample variance (n - 1 denominator)
pub fn variance(data: &[f64]) -> f64 {
    if data.len() < 2 {
        return 0.0;
    }
    let m = mean(data);
    data.iter().map(|&x| (x - m).powi(2)).sum::<f64>() / (data.len() - 1) as f64
}

/// Sample standard deviation
pub fn stddev(data: &[f64]) -> f64 {
    variance(data).sqrt()
}

/// Sorted copy of the data, NaN-tolerant
pub fn sorted(data: &[f64]) -> Vec<f64> {
    let mut values = data.to_vec();
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    values
}

/// Percentile (0-100) of already-sorted data using linear interpolation
/// between order statistics
pub fn percentile_sorted(sorted_data: &[f64], p: f64) -> f64 {
    match sorted_data.len() {
        0 => 0.0,
        1 => sorted_data[0],
        n => {
            let rank = (p.clamp(0.0, 100.0) / 100.0) * (n - 1) as f64;
            let lower = rank.floor() as usize;
            let upper = rank.ceil() as usize;
            let weight = rank - lower as f64;
            sorted_data[lower] + (sorted_data[upper] - sorted_data[lower]) * weight
        }
    }
}

/// Percentile (0-100) of unsorted data
pub fn percentile(data: &[f64], p: f64) -> f64 {
    percentile_sorted(&sorted(data), p)
}

/// Median; averages the two middle values for even lengths
pub fn median(data: &[f64]) -> f64 {
    percentile(data, 50.0)
}

/// Adjusted Fisher-Pearson standardized moment coefficient (G1)
pub fn skewness(data: &[f64]) -> f64 {
    if data.len() < 3 {
        return 0.0;
    }

    let n = data.len() as f64;
    let m = mean(data);
    let m2 = data.iter().map(|&x| (x - m).powi(2)).sum::<f64>() / n;
    let m3 = data.iter().map(|&x| (x - m).powi(3)).sum::<f64>() / n;

    if m2 < 1e-12 {
        return 0.0;
    }

    let g1 = m3 / m2.powf(1.5);
    g1 * (n * (n - 1.0)).sqrt() / (n - 2.0)
}

/// Excess kurtosis with small-sample bias correction (G2)
pub fn kurtosis(data: &[f64]) -> f64 {
    if data.len() < 4 {
        return 0.0;
    }

    let n = data.len() as f64;
    let m = mean(data);
    let m2 = data.iter().map(|&x| (x - m).powi(2)).sum::<f64>() / n;
    let m4 = data.iter().map(|&x| (x - m).powi(4)).sum::<f64>() / n;

    if m2 < 1e-12 {
        return 0.0;
    }

    let g2 = m4 / m2.powi(2) - 3.0;
    ((n + 1.0) * g2 + 6.0) * (n - 1.0) / ((n - 2.0) * (n - 3.0))
}

/// Median absolute deviation from the median (unscaled)
pub fn median_absolute_deviation(data: &[f64]) -> (f64, f64) {
    let med = median(data);
    let deviations: Vec<f64> = data.iter().map(|&x| (x - med).abs()).collect();
    (med, median(&deviations))
}

/// Ranks starting at 1; tied values share the average of their ranks
pub fn rank(data: &[f64]) -> Vec<f64> {
    let mut order: Vec<usize> = (0..data.len()).collect();
    order.sort_by(|&a, &b| data[a].partial_cmp(&data[b]).unwrap_or(Ordering::Equal));

    let mut ranks = vec![0.0; data.len()];
    let mut i = 0;
    while i < order.len() {
        let mut j = i;
        while j + 1 < order.len() && data[order[j + 1]] == data[order[i]] {
            j += 1;
        }
        // positions i..=j share rank (i+1 + j+1) / 2
        let shared = (i + j) as f64 / 2.0 + 1.0;
        for &idx in &order[i..=j] {
            ranks[idx] = shared;
        }
        i = j + 1;
    }
    ranks
}

/// Discrete Fourier transform for bins `0..bins`, O(n * bins)
pub fn dft(data: &[f64], bins: usize) -> Vec<Complex<f64>> {
    let n = data.len();
    if n == 0 {
        return Vec::new();
    }

    (0..bins)
        .map(|k| {
            data.iter()
                .enumerate()
                .fold(Complex::new(0.0, 0.0), |acc, (t, &x)| {
                    let angle = -2.0 * PI * (k * t) as f64 / n as f64;
                    acc + Complex::new(x * angle.cos(), x * angle.sin())
                })
        })
        .collect()
}

/// Centered convolution; the kernel is renormalized over the taps that fall
/// inside the data so edges are not attenuated
pub fn convolve_normalized(data: &[f64], kernel: &[f64]) -> Vec<f64> {
    if data.is_empty() || kernel.is_empty() {
        return data.to_vec();
    }

    let half = (kernel.len() / 2) as isize;
    let n = data.len() as isize;

    (0..n)
        .map(|i| {
            let mut acc = 0.0;
            let mut weight = 0.0;
            for (k, &w) in kernel.iter().enumerate() {
                let j = i + k as isize - half;
                if (0..n).contains(&j) {
                    acc += data[j as usize] * w;
                    weight += w;
                }
            }
            if weight.abs() > f64::EPSILON {
                acc / weight
            } else {
                data[i as usize]
            }
        })
        .collect()
}

/// Normalized Gaussian kernel with `size` taps
pub fn gaussian_kernel(size: usize, sigma: f64) -> Vec<f64> {
    if size == 0 {
        return Vec::new();
    }
    let center = (size / 2) as f64;
    let weights: Vec<f64> = (0..size)
        .map(|i| {
            let d = i as f64 - center;
            (-(d * d) / (2.0 * sigma * sigma)).exp()
        })
        .collect();
    let total: f64 = weights.iter().sum();
    weights.into_iter().map(|w| w / total).collect()
}

/// Area of the triangle (a, b, c) via the shoelace formula
#[inline]
pub fn triangle_area(ax: f64, ay: f64, bx: f64, by: f64, cx: f64, cy: f64) -> f64 {
    ((ax - cx) * (by - ay) - (ax - bx) * (cy - ay)).abs() * 0.5
}

/// Perpendicular distance from `p` to the line through `start` and `end`
///
/// Falls back to the Euclidean distance to `start` when the chord is degenerate.
pub fn perpendicular_distance(p: (f64, f64), start: (f64, f64), end: (f64, f64)) -> f64 {
    let dx = end.0 - start.0;
    let dy = end.1 - start.1;
    let length = (dx * dx + dy * dy).sqrt();

    if length < f64::EPSILON {
        return ((p.0 - start.0).powi(2) + (p.1 - start.1).powi(2)).sqrt();
    }

    (dy * p.0 - dx * p.1 + end.0 * start.1 - end.1 * start.0).abs() / length
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_variance() {
        let data = vec![2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert!((mean(&data) - 5.0).abs() < 1e-12);
        assert!((variance(&data) - 32.0 / 7.0).abs() < 1e-12);
        assert_eq!(variance(&[1.0]), 0.0);
    }

    #[test]
    fn test_percentile_interpolates() {
        let data = vec![1.0, 2.0, 3.0, 4.0];
        assert!((percentile(&data, 50.0) - 2.5).abs() < 1e-12);
        assert!((percentile(&data, 25.0) - 1.75).abs() < 1e-12);
        assert_eq!(percentile(&data, 0.0), 1.0);
        assert_eq!(percentile(&data, 100.0), 4.0);
    }

    #[test]
    fn test_median_odd_and_even() {
        assert_eq!(median(&[3.0, 1.0, 2.0]), 2.0);
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), 2.5);
    }

    #[test]
    fn test_skewness_symmetric_is_zero() {
        let data = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        assert!(skewness(&data).abs() < 1e-12);
    }

    #[test]
    fn test_skewness_matches_adjusted_estimator() {
        let data = vec![1.0, 2.0, 2.0, 3.0, 10.0];
        let n = 5.0_f64;
        let m = mean(&data);
        let m2 = data.iter().map(|x| (x - m).powi(2)).sum::<f64>() / n;
        let m3 = data.iter().map(|x| (x - m).powi(3)).sum::<f64>() / n;
        let expected = m3 / m2.powf(1.5) * (n * (n - 1.0)).sqrt() / (n - 2.0);
        assert!((skewness(&data) - expected).abs() < 1e-12);
        assert!(skewness(&data) > 0.0);
    }

    #[test]
    fn test_kurtosis_uniform_is_negative() {
        let data: Vec<f64> = (0..1000).map(|i| (i % 100) as f64).collect();
        assert!(kurtosis(&data) < 0.0);
        assert_eq!(kurtosis(&[1.0, 2.0, 3.0]), 0.0);
    }

    #[test]
    fn test_rank_averages_ties() {
        assert_eq!(rank(&[10.0, 20.0, 10.0, 30.0]), vec![1.5, 3.0, 1.5, 4.0]);
    }

    #[test]
    fn test_dft_of_constant_has_only_dc() {
        let spectrum = dft(&[1.0; 8], 4);
        assert!((spectrum[0].re - 8.0).abs() < 1e-9);
        for bin in &spectrum[1..] {
            assert!(bin.norm() < 1e-9);
        }
    }

    #[test]
    fn test_convolution_preserves_constant_signal() {
        let kernel = gaussian_kernel(5, 1.0);
        let smoothed = convolve_normalized(&[3.0; 10], &kernel);
        for v in smoothed {
            assert!((v - 3.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_triangle_area() {
        assert!((triangle_area(0.0, 0.0, 4.0, 0.0, 0.0, 3.0) - 6.0).abs() < 1e-12);
        assert_eq!(triangle_area(0.0, 0.0, 1.0, 1.0, 2.0, 2.0), 0.0);
    }

    #[test]
    fn test_perpendicular_distance() {
        let d = perpendicular_distance((1.0, 1.0), (0.0, 0.0), (2.0, 0.0));
        assert!((d - 1.0).abs() < 1e-12);
        let degenerate = perpendicular_distance((3.0, 4.0), (0.0, 0.0), (0.0, 0.0));
        assert!((degenerate - 5.0).abs() < 1e-12);
    }
}
