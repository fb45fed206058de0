use super::types::Spectrum;
use crate::error::{AnalyticsError, AnalyticsResult};
use crate::kernels;

/// One-sided magnitude/phase spectrum over bins `0..n/2`
///
/// Magnitudes are raw `|X_k|`, not normalized by `n`.
pub fn spectrum(data: &[f64], sample_rate: f64) -> AnalyticsResult<Spectrum> {
    if !sample_rate.is_finite() || sample_rate <= 0.0 {
        return Err(AnalyticsError::InvalidParameter(format!(
            "sampleRate must be a positive number, got {}",
            sample_rate
        )));
    }

    let n = data.len();
    let bins = kernels::dft(data, n / 2);

    Ok(Spectrum {
        frequencies: (0..bins.len())
            .map(|k| k as f64 * sample_rate / n as f64)
            .collect(),
        magnitudes: bins.iter().map(|c| c.norm()).collect(),
        phases: bins.iter().map(|c| c.im.atan2(c.re)).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_pure_tone_peak() {
        let n = 64;
        let data: Vec<f64> = (0..n)
            .map(|t| (2.0 * PI * 4.0 * t as f64 / n as f64).sin())
            .collect();
        let result = spectrum(&data, 128.0).unwrap();

        assert_eq!(result.frequencies.len(), 32);
        assert_eq!(result.frequencies[1], 2.0);

        let (peak, magnitude) = result
            .magnitudes
            .iter()
            .enumerate()
            .fold((0, 0.0), |best, (k, &m)| if m > best.1 { (k, m) } else { best });
        assert_eq!(peak, 4);
        assert!((magnitude - 32.0).abs() < 1e-9);
        // sine has phase -pi/2 relative to the cosine basis
        assert!((result.phases[4] + PI / 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_dc_component() {
        let result = spectrum(&[2.0, 2.0, 2.0, 2.0], 1.0).unwrap();
        assert_eq!(result.magnitudes[0], 8.0);
        assert!(result.magnitudes[1] < 1e-12);
    }

    #[test]
    fn test_short_inputs() {
        let empty = spectrum(&[], 1.0).unwrap();
        assert!(empty.frequencies.is_empty());
        assert!(spectrum(&[1.0], 1.0).unwrap().magnitudes.is_empty());
    }

    #[test]
    fn test_rejects_bad_sample_rate() {
        assert!(spectrum(&[1.0, 2.0], 0.0).is_err());
    }
}
