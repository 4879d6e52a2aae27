//! Uniform logarithmic gain.

/// Linear amplitude factor for a decibel offset.
#[inline]
pub fn db_to_amplitude(gain_db: f32) -> f32 {
    10f32.powf(gain_db / 20.0)
}

/// Scale every sample by `gain_db` decibels.
///
/// No clamping happens here; saturation is applied when the samples are
/// quantized back to integer PCM.
pub fn apply_gain_db(samples: &mut [f32], gain_db: i32) {
    if gain_db == 0 {
        return;
    }
    let factor = db_to_amplitude(gain_db as f32);
    for sample in samples.iter_mut() {
        *sample *= factor;
    }
}

/// Largest absolute sample value.
pub fn peak_amplitude(samples: &[f32]) -> f32 {
    samples.iter().fold(0.0f32, |acc, s| acc.max(s.abs()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_db_to_amplitude() {
        assert!((db_to_amplitude(0.0) - 1.0).abs() < 1e-6);
        assert!((db_to_amplitude(20.0) - 10.0).abs() < 1e-4);
        assert!((db_to_amplitude(-6.0) - 0.501).abs() < 1e-3);
    }

    #[test]
    fn test_positive_gain_raises_peak() {
        let mut samples = vec![0.1, -0.2, 0.05];
        apply_gain_db(&mut samples, 5);
        assert!(peak_amplitude(&samples) > 0.2);
        assert!((samples[1] - (-0.2 * db_to_amplitude(5.0))).abs() < 1e-6);
    }

    #[test]
    fn test_zero_gain_is_identity() {
        let mut samples = vec![0.3, -0.4];
        apply_gain_db(&mut samples, 0);
        assert_eq!(samples, vec![0.3, -0.4]);
    }

    #[test]
    fn test_negative_gain_lowers_peak() {
        let mut samples = vec![0.5];
        apply_gain_db(&mut samples, -6);
        assert!(peak_amplitude(&samples) < 0.5);
    }
}
