//! Biquad peaking filter
//!
//! One second-order IIR section designed with the Audio EQ Cookbook
//! peaking-EQ equations, with delay memory for up to two channels.
//! Nothing here fails: inputs are clamped, unknown channels pass through.

use std::f64::consts::PI;

/// Channels a single section keeps delay memory for
pub const MAX_CHANNELS: usize = 2;

/// Lowest frequency a section will be tuned to (Hz)
const MIN_DESIGN_FREQ: f64 = 20.0;

/// Highest tuning as a fraction of the sample rate (keeps w0 clear of Nyquist)
const MAX_DESIGN_FREQ_RATIO: f64 = 0.45;

const MIN_DESIGN_Q: f64 = 0.1;
const MAX_DESIGN_Q: f64 = 10.0;

/// Biquad filter coefficients
/// Transfer function: H(z) = (b0 + b1*z^-1 + b2*z^-2) / (1 + a1*z^-1 + a2*z^-2)
/// Normalized: all coefficients divided by a0
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BiquadCoefficients {
    pub b0: f64,
    pub b1: f64,
    pub b2: f64,
    pub a1: f64,
    pub a2: f64,
}

impl Default for BiquadCoefficients {
    /// Identity section
    fn default() -> Self {
        Self {
            b0: 1.0,
            b1: 0.0,
            b2: 0.0,
            a1: 0.0,
            a2: 0.0,
        }
    }
}

impl BiquadCoefficients {
    /// Peaking EQ coefficients
    /// Reference: https://www.w3.org/2011/audio/audio-eq-cookbook.html
    ///
    /// `frequency` is clamped to `[20, 0.45·sample_rate]` and `q` to
    /// `[0.1, 10]` so the section stays stable at any sample rate.
    pub fn peaking(sample_rate: f64, frequency: f64, gain_db: f64, q: f64) -> Self {
        let freq = frequency.min(sample_rate * MAX_DESIGN_FREQ_RATIO).max(MIN_DESIGN_FREQ);
        let q = q.clamp(MIN_DESIGN_Q, MAX_DESIGN_Q);

        let a = 10.0_f64.powf(gain_db / 40.0);
        let w0 = 2.0 * PI * freq / sample_rate;
        let cos_w0 = w0.cos();
        let alpha = w0.sin() / (2.0 * q);

        let a0 = 1.0 + alpha / a;
        Self {
            b0: (1.0 + alpha * a) / a0,
            b1: (-2.0 * cos_w0) / a0,
            b2: (1.0 - alpha * a) / a0,
            a1: (-2.0 * cos_w0) / a0,
            a2: (1.0 - alpha / a) / a0,
        }
    }

    /// Linear magnitude of H(e^jw) at `frequency`
    pub fn magnitude_at(&self, frequency: f64, sample_rate: f64) -> f64 {
        let w = 2.0 * PI * frequency / sample_rate;
        let (sin_w, cos_w) = w.sin_cos();
        let (sin_2w, cos_2w) = (2.0 * w).sin_cos();

        let num_re = self.b0 + self.b1 * cos_w + self.b2 * cos_2w;
        let num_im = -self.b1 * sin_w - self.b2 * sin_2w;
        let den_re = 1.0 + self.a1 * cos_w + self.a2 * cos_2w;
        let den_im = -self.a1 * sin_w - self.a2 * sin_2w;

        num_re.hypot(num_im) / den_re.hypot(den_im)
    }
}

/// Delay memory for one channel of one section
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FilterState {
    x1: f64, // x[n-1]
    x2: f64, // x[n-2]
    y1: f64, // y[n-1]
    y2: f64, // y[n-2]
}

impl FilterState {
    /// Run one sample through the difference equation and shift the delay line
    #[inline]
    fn process(&mut self, input: f64, coeffs: &BiquadCoefficients) -> f64 {
        let output = coeffs.b0 * input + coeffs.b1 * self.x1 + coeffs.b2 * self.x2
            - coeffs.a1 * self.y1
            - coeffs.a2 * self.y2;

        self.x2 = self.x1;
        self.x1 = input;
        self.y2 = self.y1;
        self.y1 = output;

        output
    }

    fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Single peaking section with per-channel memory
#[derive(Debug, Clone, Default)]
pub struct BiquadFilter {
    coeffs: BiquadCoefficients,
    states: [FilterState; MAX_CHANNELS],
}

impl BiquadFilter {
    /// Create an identity section
    pub fn new() -> Self {
        Self::default()
    }

    /// Retune the section. Delay memory is kept so live retuning does not click.
    pub fn set_peaking_eq(&mut self, sample_rate: f64, frequency: f64, gain_db: f64, q: f64) {
        self.coeffs = BiquadCoefficients::peaking(sample_rate, frequency, gain_db, q);
    }

    /// Current coefficients
    pub fn coefficients(&self) -> &BiquadCoefficients {
        &self.coeffs
    }

    /// Filter one sample on `channel`; channels past [`MAX_CHANNELS`] pass through
    #[inline]
    pub fn process(&mut self, sample: f32, channel: usize) -> f32 {
        match self.states.get_mut(channel) {
            Some(state) => state.process(sample as f64, &self.coeffs) as f32,
            None => sample,
        }
    }

    /// Analytic magnitude response at `frequency` (no samples are run)
    pub fn magnitude_at(&self, frequency: f64, sample_rate: f64) -> f64 {
        self.coeffs.magnitude_at(frequency, sample_rate)
    }

    /// Zero all delay memory
    pub fn reset(&mut self) {
        for state in &mut self.states {
            state.reset();
        }
    }

    /// Delay memory for `channel`
    pub fn state(&self, channel: usize) -> Option<&FilterState> {
        self.states.get(channel)
    }
}
