//! Frame and sample arithmetic for aligning clip audio onto a timeline grid.
//!
//! - [`convert`]: conversions between seconds, frame numbers and sample numbers
//! - [`cadence`]: validated frame rate / sample rate / clip placement values
//! - [`matcher`]: which clip frames and sample corrections fill one timeline frame
//! - [`keyframe`]: curves animating a value over clip frame numbers

pub mod cadence;
pub mod convert;
pub mod keyframe;
pub mod matcher;

pub use cadence::{Cadence, CadenceError, ClipPlacement, FrameRate};
pub use keyframe::{Interpolation, Keyframe, KeyframeError, Point};
pub use matcher::{MatchResult, match_frames};
