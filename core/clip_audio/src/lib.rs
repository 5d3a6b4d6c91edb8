pub mod clip;
pub mod constants;
pub mod frame;
pub mod reader;
pub mod timeline;

pub use clip::{Clip, ClipAudio, clip_id::ClipId};
pub use frame::{Frame, StereoSample};
pub use reader::{FrameReader, ReaderError};
pub use timeline::{Timeline, TimelineError, TimelineFrame, VisibleFrame};
