/// Tolerance when comparing normalized `f32` samples.
pub const AUDIO_SAMPLE_EPSILON: f32 = 1e-4;

/// Consecutive empty native frames after which a source counts as exhausted
/// while padding or skipping ahead.
pub const MAX_EMPTY_LOOKAHEAD_FRAMES: usize = 256;

/// Upper bound of a clip's gain curve when mixing.
pub const MAX_CLIP_GAIN: f32 = 4.0;
