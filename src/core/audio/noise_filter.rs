//! Non-stationary spectral-gating noise reduction.
//!
//! Every time-frequency cell is compared against a noise floor, and a
//! sigmoid soft mask opens once the cell rises `thresh_n_mult` multiples
//! above it. The floor is the lower of two estimates:
//!
//! - a running average of the bin over time (`time_constant_secs`), so
//!   onsets louder than their recent history pass
//! - a low quantile of the surrounding bins in the same frame, so tonal
//!   and voiced energy standing out from its spectral neighbourhood passes
//!   even when it lasts the whole clip
//!
//! Only energy that is both steady over time and level with its
//! neighbours, i.e. broadband background noise, is gated. The mask is
//! smoothed over time and frequency before being applied so the gate does
//! not produce musical noise.
//!
//! Works on normalized mono `f32` samples and always returns a buffer of
//! the same length as its input.

use std::sync::Arc;

use realfft::num_complex::Complex;
use realfft::{ComplexToReal, RealFftPlanner, RealToComplex};
use tracing::debug;

use super::error::{AudioError, AudioResult};

/// Floor values below this are treated as silence.
const MIN_MAGNITUDE: f32 = 1e-10;

/// Peak amplitude below which the input is considered digital silence.
const SILENCE_PEAK: f32 = 1e-7;

// =============================================================================
// Configuration
// =============================================================================

/// Tuning parameters for spectral gating.
#[derive(Debug, Clone, PartialEq)]
pub struct NoiseFilterConfig {
    /// FFT window length in samples
    pub n_fft: usize,
    /// Hop between successive windows in samples
    pub hop_length: usize,
    /// Time constant of the running per-bin noise floor
    pub time_constant_secs: f32,
    /// Half-width of the neighbourhood used for the in-frame floor
    pub floor_bandwidth_hz: f32,
    /// Quantile of the neighbourhood magnitudes taken as the in-frame floor
    pub floor_quantile: f32,
    /// Multiples above the floor at which the gate is half open
    pub thresh_n_mult: f32,
    /// Steepness of the sigmoid mask
    pub sigmoid_slope: f32,
    /// Fraction of the noise to remove (1.0 = full gate)
    pub prop_decrease: f32,
    /// Width of the mask smoothing along the frequency axis
    pub freq_mask_smooth_hz: f32,
    /// Width of the mask smoothing along the time axis
    pub time_mask_smooth_ms: f32,
}

impl Default for NoiseFilterConfig {
    fn default() -> Self {
        Self {
            n_fft: 512,
            hop_length: 128,
            time_constant_secs: 2.0,
            floor_bandwidth_hz: 500.0,
            floor_quantile: 0.3,
            thresh_n_mult: 2.0,
            sigmoid_slope: 10.0,
            prop_decrease: 1.0,
            freq_mask_smooth_hz: 32.0,
            time_mask_smooth_ms: 32.0,
        }
    }
}

// =============================================================================
// Noise Reducer
// =============================================================================

/// Spectral-gating noise reducer with pre-planned forward and inverse FFTs.
pub struct NoiseReducer {
    config: NoiseFilterConfig,
    window: Vec<f32>,
    forward: Arc<dyn RealToComplex<f32>>,
    inverse: Arc<dyn ComplexToReal<f32>>,
}

impl NoiseReducer {
    pub fn new(config: NoiseFilterConfig) -> AudioResult<Self> {
        if config.n_fft < 4 || config.hop_length == 0 || config.hop_length > config.n_fft {
            return Err(AudioError::NoiseReduction(format!(
                "invalid STFT geometry: n_fft={}, hop_length={}",
                config.n_fft, config.hop_length
            )));
        }
        if !(0.0..=1.0).contains(&config.floor_quantile) {
            return Err(AudioError::NoiseReduction(format!(
                "floor quantile must be within [0, 1], got {}",
                config.floor_quantile
            )));
        }

        // Periodic Hann window
        let n = config.n_fft;
        let window = (0..n)
            .map(|i| {
                let x = std::f32::consts::PI * i as f32 / n as f32;
                x.sin().powi(2)
            })
            .collect();

        let mut planner = RealFftPlanner::<f32>::new();
        let forward = planner.plan_fft_forward(n);
        let inverse = planner.plan_fft_inverse(n);

        Ok(Self {
            config,
            window,
            forward,
            inverse,
        })
    }

    /// Denoise `samples` recorded at `sample_rate`.
    ///
    /// Degenerate input (empty, shorter than one window, silent, or holding
    /// non-finite values) is returned unchanged.
    pub fn reduce(&self, samples: &[f32], sample_rate: u32) -> AudioResult<Vec<f32>> {
        if let Some(reason) = self.passthrough_reason(samples) {
            debug!("Skipping noise reduction: {}", reason);
            return Ok(samples.to_vec());
        }

        let n_fft = self.config.n_fft;
        let hop = self.config.hop_length;

        // Center the first window on sample 0 and pad the tail to a whole hop
        let pad = n_fft / 2;
        let mut padded_len = samples.len() + 2 * pad;
        let remainder = (padded_len - n_fft) % hop;
        if remainder != 0 {
            padded_len += hop - remainder;
        }
        let mut padded = vec![0.0f32; padded_len];
        padded[pad..pad + samples.len()].copy_from_slice(samples);

        let n_frames = (padded_len - n_fft) / hop + 1;

        let mut spectra = self.stft(&padded, n_frames)?;

        let magnitudes: Vec<Vec<f32>> = spectra
            .iter()
            .map(|frame| frame.iter().map(|c| c.norm()).collect())
            .collect();

        let floor = self.noise_floor(&magnitudes, sample_rate);
        let mask = self.build_mask(&magnitudes, &floor, sample_rate);

        for (frame, mask_row) in spectra.iter_mut().zip(&mask) {
            for (bin, &gain) in frame.iter_mut().zip(mask_row) {
                *bin *= gain;
            }
        }

        let mut output = self.istft(&mut spectra, padded_len)?;
        output.drain(..pad);
        output.truncate(samples.len());

        if output.iter().any(|s| !s.is_finite()) {
            return Err(AudioError::NoiseReduction(
                "non-finite samples after inverse transform".into(),
            ));
        }

        Ok(output)
    }

    fn passthrough_reason(&self, samples: &[f32]) -> Option<&'static str> {
        if samples.is_empty() {
            return Some("empty input");
        }
        if samples.len() < self.config.n_fft {
            return Some("input shorter than one FFT window");
        }
        if samples.iter().any(|s| !s.is_finite()) {
            return Some("input contains non-finite samples");
        }
        let peak = samples.iter().fold(0.0f32, |acc, s| acc.max(s.abs()));
        if peak < SILENCE_PEAK {
            return Some("input is silent");
        }
        None
    }

    /// Windowed forward transform of every frame.
    fn stft(&self, padded: &[f32], n_frames: usize) -> AudioResult<Vec<Vec<Complex<f32>>>> {
        let n_fft = self.config.n_fft;
        let hop = self.config.hop_length;
        let mut input = self.forward.make_input_vec();
        let mut spectra = Vec::with_capacity(n_frames);

        for frame_idx in 0..n_frames {
            let start = frame_idx * hop;
            for (i, slot) in input.iter_mut().enumerate() {
                *slot = padded[start + i] * self.window[i];
            }

            let mut spectrum = self.forward.make_output_vec();
            self.forward
                .process(&mut input, &mut spectrum)
                .map_err(|e| AudioError::NoiseReduction(format!("forward FFT failed: {e}")))?;
            spectra.push(spectrum);
        }

        debug_assert!(spectra.iter().all(|s| s.len() == n_fft / 2 + 1));
        Ok(spectra)
    }

    /// Inverse transform with weighted overlap-add.
    fn istft(&self, spectra: &mut [Vec<Complex<f32>>], padded_len: usize) -> AudioResult<Vec<f32>> {
        let n_fft = self.config.n_fft;
        let hop = self.config.hop_length;
        let norm = 1.0 / n_fft as f32;

        let mut output = vec![0.0f32; padded_len];
        let mut window_sum = vec![0.0f32; padded_len];
        let mut frame_out = self.inverse.make_output_vec();

        for (frame_idx, spectrum) in spectra.iter_mut().enumerate() {
            // DC and Nyquist bins must be purely real for the inverse real FFT
            if let Some(first) = spectrum.first_mut() {
                first.im = 0.0;
            }
            if let Some(last) = spectrum.last_mut() {
                last.im = 0.0;
            }

            self.inverse
                .process(spectrum, &mut frame_out)
                .map_err(|e| AudioError::NoiseReduction(format!("inverse FFT failed: {e}")))?;

            let start = frame_idx * hop;
            for i in 0..n_fft {
                let w = self.window[i];
                output[start + i] += frame_out[i] * norm * w;
                window_sum[start + i] += w * w;
            }
        }

        for (sample, &wsum) in output.iter_mut().zip(&window_sum) {
            if wsum > 1e-8 {
                *sample /= wsum;
            }
        }

        Ok(output)
    }

    /// Per-cell noise floor: the lower of the running and in-frame floors.
    fn noise_floor(&self, magnitudes: &[Vec<f32>], sample_rate: u32) -> Vec<Vec<f32>> {
        let frames_per_constant = self.config.time_constant_secs * sample_rate as f32
            / self.config.hop_length as f32;
        let running = time_smoothed(magnitudes, frames_per_constant);

        let bin_hz = sample_rate as f32 / self.config.n_fft as f32;
        let radius = (self.config.floor_bandwidth_hz / bin_hz).round() as usize;
        let quantile = self.config.floor_quantile;

        let mut scratch = Vec::with_capacity(2 * radius + 1);
        magnitudes
            .iter()
            .zip(running)
            .map(|(frame, running_row)| {
                running_row
                    .into_iter()
                    .enumerate()
                    .map(|(bin, over_time)| {
                        let in_frame =
                            neighbourhood_quantile(frame, bin, radius, quantile, &mut scratch);
                        over_time.min(in_frame)
                    })
                    .collect()
            })
            .collect()
    }

    fn build_mask(&self, magnitudes: &[Vec<f32>], floor: &[Vec<f32>], sample_rate: u32) -> Vec<Vec<f32>> {
        let prop = self.config.prop_decrease.clamp(0.0, 1.0);
        let thresh = self.config.thresh_n_mult;
        let slope = self.config.sigmoid_slope;

        let gate: Vec<Vec<f32>> = magnitudes
            .iter()
            .zip(floor)
            .map(|(frame, floor_row)| {
                frame
                    .iter()
                    .zip(floor_row)
                    .map(|(&magnitude, &noise)| {
                        let above = if noise > MIN_MAGNITUDE {
                            (magnitude - noise) / noise
                        } else if magnitude > MIN_MAGNITUDE {
                            f32::INFINITY
                        } else {
                            0.0
                        };
                        sigmoid(above - thresh, slope) * prop + (1.0 - prop)
                    })
                    .collect()
            })
            .collect();

        let bin_hz = sample_rate as f32 / self.config.n_fft as f32;
        let hop_ms = self.config.hop_length as f32 / sample_rate as f32 * 1000.0;
        let freq_radius = (self.config.freq_mask_smooth_hz / bin_hz).floor() as usize;
        let time_radius = (self.config.time_mask_smooth_ms / hop_ms).floor() as usize;

        smooth_mask(&gate, time_radius, freq_radius)
    }
}

/// Logistic curve; saturates cleanly for infinite input.
#[inline]
fn sigmoid(x: f32, slope: f32) -> f32 {
    1.0 / (1.0 + (-x * slope).exp())
}

/// Zero-phase one-pole low-pass of every bin along time.
///
/// The pole is chosen so the filter's half-power width spans
/// `frames_per_constant` frames; each pass starts from its first value.
fn time_smoothed(magnitudes: &[Vec<f32>], frames_per_constant: f32) -> Vec<Vec<f32>> {
    let t = frames_per_constant.max(f32::EPSILON);
    let b = ((1.0 + 4.0 * t * t).sqrt() - 1.0) / (2.0 * t * t);
    let n_bins = magnitudes.first().map_or(0, Vec::len);

    let mut smoothed: Vec<Vec<f32>> = magnitudes.to_vec();
    for bin in 0..n_bins {
        let mut state = magnitudes.first().map_or(0.0, |f| f[bin]);
        for frame in smoothed.iter_mut() {
            state = b * frame[bin] + (1.0 - b) * state;
            frame[bin] = state;
        }
        let mut state = smoothed.last().map_or(0.0, |f| f[bin]);
        for frame in smoothed.iter_mut().rev() {
            state = b * frame[bin] + (1.0 - b) * state;
            frame[bin] = state;
        }
    }
    smoothed
}

/// `quantile` of `frame[bin - radius..=bin + radius]`, clipped to the frame.
fn neighbourhood_quantile(
    frame: &[f32],
    bin: usize,
    radius: usize,
    quantile: f32,
    scratch: &mut Vec<f32>,
) -> f32 {
    let lo = bin.saturating_sub(radius);
    let hi = (bin + radius + 1).min(frame.len());
    scratch.clear();
    scratch.extend_from_slice(&frame[lo..hi]);
    if scratch.is_empty() {
        return 0.0;
    }

    let index = ((scratch.len() - 1) as f32 * quantile).round() as usize;
    let (_, value, _) = scratch.select_nth_unstable_by(index, f32::total_cmp);
    *value
}

/// Triangular smoothing kernel of `2 * radius + 1` taps, normalized to sum 1.
fn triangular_kernel(radius: usize) -> Vec<f32> {
    let taps: Vec<f32> = (0..=2 * radius)
        .map(|i| (radius + 1 - i.abs_diff(radius)) as f32)
        .collect();
    let sum: f32 = taps.iter().sum();
    taps.into_iter().map(|t| t / sum).collect()
}

/// Separable 2-D smoothing with zero padding at the edges.
fn smooth_mask(mask: &[Vec<f32>], time_radius: usize, freq_radius: usize) -> Vec<Vec<f32>> {
    let n_frames = mask.len();
    let n_bins = mask.first().map_or(0, Vec::len);

    // Frequency axis
    let freq_kernel = triangular_kernel(freq_radius);
    let along_freq: Vec<Vec<f32>> = mask
        .iter()
        .map(|row| {
            (0..n_bins)
                .map(|bin| {
                    freq_kernel
                        .iter()
                        .enumerate()
                        .filter_map(|(k, &w)| {
                            (bin + k)
                                .checked_sub(freq_radius)
                                .and_then(|j| row.get(j))
                                .map(|v| v * w)
                        })
                        .sum::<f32>()
                })
                .collect()
        })
        .collect();

    // Time axis
    let time_kernel = triangular_kernel(time_radius);
    (0..n_frames)
        .map(|t| {
            (0..n_bins)
                .map(|bin| {
                    time_kernel
                        .iter()
                        .enumerate()
                        .filter_map(|(k, &w)| {
                            (t + k)
                                .checked_sub(time_radius)
                                .and_then(|j| along_freq.get(j))
                                .map(|row| row[bin] * w)
                        })
                        .sum::<f32>()
                })
                .collect()
        })
        .collect()
}

/// Denoise with the default configuration.
pub fn reduce_noise(samples: &[f32], sample_rate: u32) -> AudioResult<Vec<f32>> {
    NoiseReducer::new(NoiseFilterConfig::default())?.reduce(samples, sample_rate)
}

/// Run [`reduce_noise`] on the blocking thread pool.
pub async fn reduce_noise_async(samples: Vec<f32>, sample_rate: u32) -> AudioResult<Vec<f32>> {
    tokio::task::spawn_blocking(move || reduce_noise(&samples, sample_rate))
        .await
        .map_err(|e| AudioError::NoiseReduction(format!("noise reduction task failed: {e}")))?
}
