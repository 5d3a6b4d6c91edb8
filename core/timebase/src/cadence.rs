use std::fmt;

use thiserror::Error;

use crate::convert;

/// Rejected configuration values.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum CadenceError {
    #[error("Frame rate {num}/{den} must have a positive numerator and denominator")]
    InvalidFrameRate { num: u32, den: u32 },

    #[error("Sample rate must be positive")]
    InvalidSampleRate,

    #[error("Invalid trim window: start {start} must be finite and >= 0, end {end} must not precede it")]
    InvalidTrim { start: f64, end: f64 },

    #[error("Clip position must be finite, got {0}")]
    InvalidPosition(f64),
}

/// Rational frames per second, e.g. `30000/1001` for NTSC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameRate {
    num: u32,
    den: u32,
}

impl FrameRate {
    pub const FPS_24: Self = Self { num: 24, den: 1 };
    pub const FPS_25: Self = Self { num: 25, den: 1 };
    pub const FPS_30: Self = Self { num: 30, den: 1 };
    pub const FPS_50: Self = Self { num: 50, den: 1 };
    pub const FPS_60: Self = Self { num: 60, den: 1 };
    pub const NTSC_24: Self = Self {
        num: 24000,
        den: 1001,
    };
    pub const NTSC_30: Self = Self {
        num: 30000,
        den: 1001,
    };
    pub const NTSC_60: Self = Self {
        num: 60000,
        den: 1001,
    };

    pub fn new(num: u32, den: u32) -> Result<Self, CadenceError> {
        if num == 0 || den == 0 {
            return Err(CadenceError::InvalidFrameRate { num, den });
        }
        Ok(Self { num, den })
    }

    pub const fn num(&self) -> u32 {
        self.num
    }

    pub const fn den(&self) -> u32 {
        self.den
    }

    pub fn as_f64(&self) -> f64 {
        f64::from(self.num) / f64::from(self.den)
    }
}

impl fmt::Display for FrameRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.den == 1 {
            write!(f, "{}", self.num)
        } else {
            write!(f, "{}/{}", self.num, self.den)
        }
    }
}

/// Frame rate and sample rate of a timeline or of a frame source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cadence {
    fps: FrameRate,
    sample_rate: u32,
}

impl Cadence {
    pub fn new(fps: FrameRate, sample_rate: u32) -> Result<Self, CadenceError> {
        if sample_rate == 0 {
            return Err(CadenceError::InvalidSampleRate);
        }
        Ok(Self { fps, sample_rate })
    }

    pub const fn fps(&self) -> FrameRate {
        self.fps
    }

    pub const fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Constant number of samples every frame of this cadence is padded or trimmed to.
    pub fn samples_per_frame(&self) -> u64 {
        convert::samples_per_frame(self.fps, self.sample_rate)
    }

    /// First sample number of `frame`.
    pub fn frame_to_sample(&self, frame: i64) -> i64 {
        convert::frame_number_to_sample_number(frame, self.fps, self.sample_rate)
    }

    /// Number of samples strictly between the starts of `frame` and `frame + 1`.
    pub fn natural_frame_length(&self, frame: i64) -> u64 {
        (self.frame_to_sample(frame + 1) - self.frame_to_sample(frame)) as u64
    }
}

impl fmt::Display for Cadence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} fps @ {} Hz", self.fps, self.sample_rate)
    }
}

/// Where a clip sits on the timeline and which part of it is visible.
///
/// `start` and `end` are clip-local seconds, `position` is the timeline time
/// at which `start` is heard. `end` may be `f64::INFINITY`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClipPlacement {
    fps: FrameRate,
    start: f64,
    end: f64,
    position: f64,
}

impl ClipPlacement {
    pub fn new(fps: FrameRate, start: f64, end: f64, position: f64) -> Result<Self, CadenceError> {
        if !start.is_finite() || start < 0.0 || end.is_nan() || end < start {
            return Err(CadenceError::InvalidTrim { start, end });
        }
        if !position.is_finite() {
            return Err(CadenceError::InvalidPosition(position));
        }
        Ok(Self {
            fps,
            start,
            end,
            position,
        })
    }

    /// Whole clip at timeline time zero.
    pub const fn untrimmed(fps: FrameRate) -> Self {
        Self {
            fps,
            start: 0.0,
            end: f64::INFINITY,
            position: 0.0,
        }
    }

    pub fn with_position(self, position: f64) -> Result<Self, CadenceError> {
        Self::new(self.fps, self.start, self.end, position)
    }

    pub fn with_trim(self, start: f64, end: f64) -> Result<Self, CadenceError> {
        Self::new(self.fps, start, end, self.position)
    }

    pub const fn fps(&self) -> FrameRate {
        self.fps
    }

    pub const fn start(&self) -> f64 {
        self.start
    }

    pub const fn end(&self) -> f64 {
        self.end
    }

    pub const fn position(&self) -> f64 {
        self.position
    }

    /// Timeline time minus clip time.
    pub fn time_offset(&self) -> f64 {
        self.position - self.start
    }
}
