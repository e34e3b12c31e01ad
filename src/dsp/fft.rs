//! Transform Engine
//!
//! Iterative radix-2 decimation-in-time FFT: bit-reversal permutation
//! followed by log2(N) butterfly stages. Each stage derives its twiddles by
//! repeated multiplication with `e^(-2πi/len)` instead of calling the trig
//! functions per butterfly.
//!
//! Lengths must be powers of two. [`transform`] zero-pads for the caller,
//! everything else rejects other lengths with [`EngineError::NotPowerOfTwo`].

use crate::error::{EngineError, Result};
use num_complex::Complex64;
use std::f64::consts::PI;

/// Check if `n` is a non-zero power of two
#[inline]
pub fn is_power_of_two(n: usize) -> bool {
    n > 0 && (n & (n - 1)) == 0
}

/// Smallest power of two >= `n` (`0` maps to `1`)
#[inline]
pub fn next_power_of_two(n: usize) -> usize {
    n.max(1).next_power_of_two()
}

fn bit_reverse_permute(data: &mut [Complex64]) {
    let n = data.len();
    let mut j = 0;

    for i in 0..n.saturating_sub(1) {
        if i < j {
            data.swap(i, j);
        }

        let mut k = n >> 1;
        while k <= j {
            j -= k;
            k >>= 1;
        }
        j += k;
    }
}

/// Butterfly passes over a buffer already known to be a power of two long
fn butterflies(data: &mut [Complex64]) {
    let n = data.len();
    if n <= 1 {
        return;
    }

    bit_reverse_permute(data);

    let mut len = 2;
    while len <= n {
        let angle = -2.0 * PI / len as f64;
        let w_len = Complex64::new(angle.cos(), angle.sin());
        let half = len / 2;

        for start in (0..n).step_by(len) {
            let mut w = Complex64::new(1.0, 0.0);
            for j in 0..half {
                let u = data[start + j];
                let t = w * data[start + j + half];
                data[start + j] = u + t;
                data[start + j + half] = u - t;
                w *= w_len;
            }
        }

        len <<= 1;
    }
}

/// Forward FFT in place
///
/// # Errors
/// [`EngineError::NotPowerOfTwo`] if `data.len()` is not a power of two
/// (an empty buffer included).
pub fn transform_in_place(data: &mut [Complex64]) -> Result<()> {
    if !is_power_of_two(data.len()) {
        return Err(EngineError::NotPowerOfTwo { len: data.len() });
    }
    butterflies(data);
    Ok(())
}

/// Forward FFT of a real signal, zero-padded to the next power of two
pub fn transform(signal: &[f64]) -> Vec<Complex64> {
    let n = next_power_of_two(signal.len());
    let mut data = vec![Complex64::new(0.0, 0.0); n];
    for (slot, &x) in data.iter_mut().zip(signal) {
        *slot = Complex64::new(x, 0.0);
    }
    butterflies(&mut data);
    data
}

/// Forward FFT of a real signal into a caller-owned buffer
///
/// `out` is zero-padded past `signal.len()`. Nothing is allocated, which is
/// what the analyzer relies on to reuse its scratch buffers every tick.
pub fn transform_real_into(signal: &[f64], out: &mut [Complex64]) -> Result<()> {
    if !is_power_of_two(out.len()) {
        return Err(EngineError::NotPowerOfTwo { len: out.len() });
    }
    if signal.len() > out.len() {
        return Err(EngineError::BufferTooSmall {
            needed: signal.len(),
            available: out.len(),
        });
    }

    for (i, slot) in out.iter_mut().enumerate() {
        *slot = Complex64::new(signal.get(i).copied().unwrap_or(0.0), 0.0);
    }
    butterflies(out);
    Ok(())
}

/// Inverse FFT: conjugate, forward transform, conjugate, scale by 1/N
pub fn inverse(spectrum: &[Complex64]) -> Result<Vec<Complex64>> {
    let mut data: Vec<Complex64> = spectrum.iter().map(|c| c.conj()).collect();
    transform_in_place(&mut data)?;

    let scale = 1.0 / data.len() as f64;
    for c in &mut data {
        *c = c.conj() * scale;
    }
    Ok(data)
}

/// Magnitude of each bin
pub fn magnitude(spectrum: &[Complex64]) -> Vec<f64> {
    spectrum.iter().map(|c| c.norm()).collect()
}

/// Power of each bin in dB (reference 1.0), never below `floor_db`
pub fn power_db(spectrum: &[Complex64], floor_db: f64) -> Vec<f64> {
    spectrum
        .iter()
        .map(|c| {
            let power = c.norm_sqr();
            if power > 0.0 {
                (10.0 * power.log10()).max(floor_db)
            } else {
                floor_db
            }
        })
        .collect()
}
