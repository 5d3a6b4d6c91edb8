use std::fmt;

use thiserror::Error;
use timebase::{Cadence, CadenceError};

use crate::frame::Frame;

pub mod constant;
pub mod memory;
pub mod wav;

#[derive(Error, Debug)]
pub enum ReaderError {
    #[error("Reader '{0}' is not open")]
    Closed(String),

    #[error("Only mono or stereo audio is supported, got {0} channels")]
    UnsupportedChannelCount(u16),

    #[error("Failed to decode WAV data: {0}")]
    Wav(#[from] hound::Error),

    #[error(transparent)]
    Cadence(#[from] CadenceError),
}

/// A source of decoded frames at its own cadence.
///
/// Frames are addressed from zero. A frame's audio may hold any number of
/// samples; readers that need a fixed width wrap the source in a
/// [`constant::ConstantSamplesPerFrameReader`].
///
/// Readers are driven by a single caller; every operation that touches the
/// underlying material takes `&mut self`.
pub trait FrameReader: fmt::Debug {
    fn name(&self) -> &str;

    fn cadence(&self) -> Cadence;

    fn open(&mut self) -> Result<(), ReaderError>;

    fn close(&mut self);

    fn is_open(&self) -> bool;

    fn get_frame(&mut self, number: u64) -> Result<Frame, ReaderError>;
}
