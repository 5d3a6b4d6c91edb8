pub mod clip_id;

use log::trace;
use timebase::{Cadence, CadenceError, ClipPlacement, Keyframe, MatchResult, match_frames};
use uuid::Uuid;

use crate::{
    clip::clip_id::ClipId,
    frame::StereoSample,
    reader::{FrameReader, ReaderError, constant::ConstantSamplesPerFrameReader},
};

/// Audio a clip contributes to one timeline frame.
#[derive(Debug, Clone, PartialEq)]
pub struct ClipAudio {
    /// Silent samples at the head of the timeline frame before `samples` begin.
    pub sample_offset: usize,
    pub samples: Vec<StereoSample>,
}

/// A source placed on the timeline: trimmed to `[start, end]` of its own time,
/// positioned at `position` seconds, with its frames served at a constant width.
///
/// Gain and pan are curves keyed on the clip's own frame numbers.
#[derive(Debug)]
pub struct Clip<'a> {
    id: ClipId,
    placement: ClipPlacement,
    gain: Keyframe,
    pan: Keyframe,
    reader: ConstantSamplesPerFrameReader<'a, dyn FrameReader + 'a>,
}

impl<'a> Clip<'a> {
    /// Places `source` on the timeline. The clip's frame rate is the source's.
    pub fn new(
        source: &'a mut dyn FrameReader,
        start: f64,
        end: f64,
        position: f64,
    ) -> Result<Self, CadenceError> {
        let placement = ClipPlacement::new(source.cadence().fps(), start, end, position)?;
        Ok(Self {
            id: Uuid::new_v4().into(),
            placement,
            gain: Keyframe::constant(1.0),
            pan: Keyframe::constant(0.0),
            reader: ConstantSamplesPerFrameReader::new(source),
        })
    }

    /// The whole source, starting at timeline zero.
    pub fn untrimmed(source: &'a mut dyn FrameReader) -> Self {
        let placement = ClipPlacement::untrimmed(source.cadence().fps());
        Self {
            id: Uuid::new_v4().into(),
            placement,
            gain: Keyframe::constant(1.0),
            pan: Keyframe::constant(0.0),
            reader: ConstantSamplesPerFrameReader::new(source),
        }
    }

    pub fn id(&self) -> &ClipId {
        &self.id
    }

    pub fn placement(&self) -> &ClipPlacement {
        &self.placement
    }

    /// Cadence of the underlying source.
    pub fn cadence(&self) -> Cadence {
        self.reader.cadence()
    }

    pub fn gain(&self) -> &Keyframe {
        &self.gain
    }

    pub fn gain_mut(&mut self) -> &mut Keyframe {
        &mut self.gain
    }

    /// `-1.0` is hard left, `1.0` hard right.
    pub fn pan(&self) -> &Keyframe {
        &self.pan
    }

    pub fn pan_mut(&mut self) -> &mut Keyframe {
        &mut self.pan
    }

    /// Replaces the gain curve with a fixed gain.
    pub fn set_gain(&mut self, gain: f64) {
        self.gain = Keyframe::constant(gain);
    }

    /// Replaces the pan curve with a fixed pan.
    pub fn set_pan(&mut self, pan: f64) {
        self.pan = Keyframe::constant(pan);
    }

    pub fn move_to(&mut self, position: f64) -> Result<(), CadenceError> {
        self.placement = self.placement.with_position(position)?;
        Ok(())
    }

    pub fn trim(&mut self, start: f64, end: f64) -> Result<(), CadenceError> {
        self.placement = self.placement.with_trim(start, end)?;
        Ok(())
    }

    pub fn open(&mut self) -> Result<(), ReaderError> {
        self.reader.open()
    }

    pub fn close(&mut self) {
        self.reader.close();
    }

    pub fn is_open(&self) -> bool {
        self.reader.is_open()
    }

    /// Which clip frames and samples serve timeline frame `tl_frame`.
    pub fn match_frame(&self, tl_frame: u64, timeline: &Cadence) -> MatchResult {
        match_frames(tl_frame as i64, timeline, &self.placement)
    }

    /// Assembles the samples described by `result`.
    ///
    /// Every clip frame but the last contributes the samples of its own
    /// native window; the last contributes its full constant width. The drops
    /// are then cut from both ends. Returns `None` when the range is inverted
    /// or nothing survives the drops.
    ///
    /// `result` must come from [`Clip::match_frame`] with a timeline cadence
    /// sharing this clip's sample rate.
    pub fn audio_for(&mut self, result: &MatchResult) -> Result<Option<ClipAudio>, ReaderError> {
        if !result.has_audio() {
            trace!(
                "clip {} silent: frames {}..={}",
                self.id,
                result.clip_frame_start,
                result.clip_frame_end
            );
            return Ok(None);
        }

        let cadence = self.reader.cadence();
        let mut samples = Vec::with_capacity(self.reader.samples_per_frame() as usize * 2);
        for clip_frame in result.clip_frames() {
            let frame = self.reader.get_frame(clip_frame.max(0) as u64)?;
            if clip_frame < result.clip_frame_end {
                let own = cadence.natural_frame_length(clip_frame) as usize;
                samples.extend_from_slice(frame.head(own));
            } else {
                samples.extend(frame.into_samples());
            }
        }

        let keep_start = result.samples_to_drop_start as usize;
        let keep_end = samples
            .len()
            .saturating_sub(result.samples_to_drop_end as usize);
        if keep_start >= keep_end {
            return Ok(None);
        }
        samples.truncate(keep_end);
        samples.drain(..keep_start);

        Ok(Some(ClipAudio {
            sample_offset: result.sample_offset as usize,
            samples,
        }))
    }
}
