//! Persisted EQ state layout
//!
//! Little-endian, 17 primitive fields, 128 bytes:
//!
//! ```text
//! i32 version (= 1)
//! 5 × { f64 gain_db, f64 frequency, f64 q }
//! i32 bypass (0 | 1)
//! ```
//!
//! The per-band `enabled` flag is not part of the layout; restored bands are
//! always enabled. Reads are all-or-nothing: a failed read returns an error
//! and the caller's current state is never partially overwritten.

use std::io::{self, Read, Write};

use crate::dsp::{EqBand, EqualizerState, NUM_BANDS};
use crate::error::{EngineError, Result};

/// Current layout version
pub const STATE_VERSION: i32 = 1;

/// Encoded size in bytes
pub const PERSISTED_STATE_LEN: usize = 4 + NUM_BANDS * 3 * 8 + 4;

impl EqualizerState {
    /// Write the fixed layout to `writer`
    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_all(&self.to_bytes())
    }

    /// Encode into a fresh buffer
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(PERSISTED_STATE_LEN);
        bytes.extend_from_slice(&STATE_VERSION.to_le_bytes());
        for band in &self.bands {
            bytes.extend_from_slice(&band.gain_db.to_le_bytes());
            bytes.extend_from_slice(&band.frequency.to_le_bytes());
            bytes.extend_from_slice(&band.q.to_le_bytes());
        }
        bytes.extend_from_slice(&i32::from(self.bypass).to_le_bytes());
        bytes
    }

    /// Read the fixed layout from `reader`
    ///
    /// Bytes after the layout are left unread. Values are returned as
    /// stored; clamping happens when the state is applied to an equalizer.
    ///
    /// # Errors
    /// - [`EngineError::InvalidState`] on a truncated stream or a
    ///   non-finite band value
    /// - [`EngineError::UnsupportedStateVersion`] for any version but 1
    pub fn read_from<R: Read>(reader: &mut R) -> Result<Self> {
        let version = read_i32(reader, "version")?;
        if version != STATE_VERSION {
            return Err(EngineError::UnsupportedStateVersion { version });
        }

        let mut state = EqualizerState::default();
        for (index, band) in state.bands.iter_mut().enumerate() {
            let gain_db = read_f64(reader, "gain", index)?;
            let frequency = read_f64(reader, "frequency", index)?;
            let q = read_f64(reader, "q", index)?;
            *band = EqBand {
                frequency,
                gain_db,
                q,
                enabled: true,
            };
        }

        state.bypass = read_i32(reader, "bypass")? != 0;
        Ok(state)
    }

    /// Decode from a byte slice (trailing bytes are ignored)
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut cursor = bytes;
        Self::read_from(&mut cursor)
    }
}

fn read_exact_field<R: Read, const N: usize>(reader: &mut R, field: &str) -> Result<[u8; N]> {
    let mut buf = [0u8; N];
    reader.read_exact(&mut buf).map_err(|e| match e.kind() {
        io::ErrorKind::UnexpectedEof => EngineError::InvalidState {
            reason: format!("stream ended while reading {}", field),
        },
        _ => EngineError::Io(e),
    })?;
    Ok(buf)
}

fn read_i32<R: Read>(reader: &mut R, field: &str) -> Result<i32> {
    Ok(i32::from_le_bytes(read_exact_field::<R, 4>(reader, field)?))
}

fn read_f64<R: Read>(reader: &mut R, field: &str, band: usize) -> Result<f64> {
    let name = format!("band {} {}", band, field);
    let value = f64::from_le_bytes(read_exact_field::<R, 8>(reader, &name)?);
    if !value.is_finite() {
        return Err(EngineError::InvalidState {
            reason: format!("{} is not finite", name),
        });
    }
    Ok(value)
}
