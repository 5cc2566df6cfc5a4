//! Frame/timecode conversion functions.
//!
//! Pure functions for converting between frame numbers, `HH:MM:SS:FF`
//! timecodes and seconds. All components truncate toward zero; a timecode
//! is never rounded as a whole.
//!
//! # Examples
//! ```
//! use reelcheck_core::timecode::{frame_to_timecode, timecode_to_seconds};
//!
//! let tc = frame_to_timecode(100, 24.0).unwrap();
//! assert_eq!(tc.to_string(), "00:00:04:04");
//!
//! let secs = timecode_to_seconds(&tc, 24.0).unwrap();
//! assert!((secs * 24.0 - 100.0).abs() < 1e-9);
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from timecode arithmetic and parsing.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TimecodeError {
    /// Frame rate must be finite and greater than zero.
    #[error("Invalid frame rate: {0}")]
    InvalidRate(f64),

    /// Text is not a `HH:MM:SS:FF` timecode.
    #[error("Malformed timecode '{0}': expected HH:MM:SS:FF")]
    Malformed(String),
}

/// Result type for timecode operations.
pub type TimecodeResult<T> = Result<T, TimecodeError>;

/// A frame offset expressed as hours, minutes, seconds and frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Timecode {
    pub hours: u64,
    pub minutes: u64,
    pub seconds: u64,
    pub frames: u64,
}

impl Timecode {
    /// Create a timecode from its components.
    pub fn new(hours: u64, minutes: u64, seconds: u64, frames: u64) -> Self {
        Self {
            hours,
            minutes,
            seconds,
            frames,
        }
    }
}

impl fmt::Display for Timecode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}:{:02}:{:02}:{:02}",
            self.hours, self.minutes, self.seconds, self.frames
        )
    }
}

impl FromStr for Timecode {
    type Err = TimecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || TimecodeError::Malformed(s.to_string());

        let parts: Vec<&str> = s.trim().split(':').collect();
        if parts.len() != 4 {
            return Err(malformed());
        }

        let mut fields = [0u64; 4];
        for (field, part) in fields.iter_mut().zip(&parts) {
            *field = part.parse().map_err(|_| malformed())?;
        }

        Ok(Timecode::new(fields[0], fields[1], fields[2], fields[3]))
    }
}

fn check_rate(rate: f64) -> TimecodeResult<()> {
    if rate.is_finite() && rate > 0.0 {
        Ok(())
    } else {
        Err(TimecodeError::InvalidRate(rate))
    }
}

/// Convert a frame count to a timecode at the given frame rate.
///
/// The frames component counts frames past the last whole second. At
/// integer rates this is `frame mod rate`. At fractional rates (23.976,
/// 29.97) it is the truncated remainder, so the timecode converts back to
/// within one frame of `frame`.
pub fn frame_to_timecode(frame: u64, rate: f64) -> TimecodeResult<Timecode> {
    check_rate(rate)?;

    let whole_seconds = (frame as f64 / rate).floor();
    let remainder = (frame as f64 - whole_seconds * rate).max(0.0);
    let whole = whole_seconds as u64;

    Ok(Timecode {
        hours: whole / 3600,
        minutes: (whole % 3600) / 60,
        seconds: whole % 60,
        frames: remainder as u64,
    })
}

/// Convert a timecode to seconds at the given frame rate.
pub fn timecode_to_seconds(tc: &Timecode, rate: f64) -> TimecodeResult<f64> {
    check_rate(rate)?;

    Ok(tc.hours as f64 * 3600.0
        + tc.minutes as f64 * 60.0
        + tc.seconds as f64
        + tc.frames as f64 / rate)
}

/// Seconds at which `frame` starts, going through its timecode.
pub fn frame_to_seconds(frame: u64, rate: f64) -> TimecodeResult<f64> {
    let tc = frame_to_timecode(frame, rate)?;
    timecode_to_seconds(&tc, rate)
}
