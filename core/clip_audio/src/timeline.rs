use log::{debug, trace};
use thiserror::Error;
use timebase::{Cadence, Keyframe};

use crate::{
    clip::{Clip, clip_id::ClipId},
    constants::MAX_CLIP_GAIN,
    frame::Frame,
    reader::ReaderError,
};

#[derive(Error, Debug)]
pub enum TimelineError {
    #[error("Clip '{clip}' runs at {clip_rate} Hz but the timeline runs at {timeline_rate} Hz")]
    SampleRateMismatch {
        clip: ClipId,
        clip_rate: u32,
        timeline_rate: u32,
    },

    #[error("Timeline is not open")]
    Closed,

    #[error(transparent)]
    Reader(#[from] ReaderError),
}

/// A clip frame whose image is visible at a timeline frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisibleFrame {
    pub clip_id: ClipId,
    pub frame: i64,
}

/// Everything the timeline produces for one of its frames.
#[derive(Debug, Clone, PartialEq)]
pub struct TimelineFrame {
    /// Exactly one frame's worth of samples at the timeline cadence.
    pub audio: Frame,
    /// Visible clip images, in clip position order.
    pub images: Vec<VisibleFrame>,
}

/// Clips placed against a single timeline cadence, mixed frame by frame.
#[derive(Debug)]
pub struct Timeline<'a> {
    cadence: Cadence,
    clips: Vec<Clip<'a>>,
    open: bool,
}

impl<'a> Timeline<'a> {
    pub fn new(cadence: Cadence) -> Self {
        Self {
            cadence,
            clips: Vec::new(),
            open: false,
        }
    }

    pub fn cadence(&self) -> Cadence {
        self.cadence
    }

    pub fn clips(&self) -> &[Clip<'a>] {
        &self.clips
    }

    pub fn clip_mut(&mut self, id: &ClipId) -> Option<&mut Clip<'a>> {
        self.clips.iter_mut().find(|c| c.id() == id)
    }

    /// Adds `clip`, keeping clips ordered by position. The clip's source must
    /// share the timeline's sample rate; its frame rate is free.
    pub fn add_clip(&mut self, mut clip: Clip<'a>) -> Result<ClipId, TimelineError> {
        let clip_rate = clip.cadence().sample_rate();
        if clip_rate != self.cadence.sample_rate() {
            return Err(TimelineError::SampleRateMismatch {
                clip: clip.id().clone(),
                clip_rate,
                timeline_rate: self.cadence.sample_rate(),
            });
        }
        if self.open {
            clip.open()?;
        }

        let id = clip.id().clone();
        debug!(
            "adding clip {id} ({}) at {}s",
            clip.cadence(),
            clip.placement().position()
        );
        self.clips.push(clip);
        self.clips
            .sort_by(|a, b| a.placement().position().total_cmp(&b.placement().position()));
        Ok(id)
    }

    pub fn remove_clip(&mut self, id: &ClipId) -> Option<Clip<'a>> {
        let index = self.clips.iter().position(|c| c.id() == id)?;
        let mut clip = self.clips.remove(index);
        clip.close();
        Some(clip)
    }

    pub fn open(&mut self) -> Result<(), TimelineError> {
        for clip in &mut self.clips {
            clip.open()?;
        }
        debug!("timeline open at {} with {} clips", self.cadence, self.clips.len());
        self.open = true;
        Ok(())
    }

    pub fn close(&mut self) {
        for clip in &mut self.clips {
            clip.close();
        }
        self.open = false;
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Mixes every clip's contribution to frame `number`.
    ///
    /// Clip audio lands at its sample offset within the frame and is cut at
    /// the frame's end. Clips with no audio for this frame leave silence.
    /// Gain and pan curves are evaluated once per frame, at the clip frame
    /// the timeline frame displays.
    pub fn get_frame(&mut self, number: u64) -> Result<TimelineFrame, TimelineError> {
        if !self.open {
            return Err(TimelineError::Closed);
        }

        let samples_per_frame = self.cadence.samples_per_frame() as usize;
        let mut audio = Frame::silent(number, samples_per_frame);
        let mut images = Vec::new();

        for clip in &mut self.clips {
            let result = clip.match_frame(number, &self.cadence);
            if result.use_image {
                images.push(VisibleFrame {
                    clip_id: clip.id().clone(),
                    frame: result.displayed_frame,
                });
            }

            let Some(clip_audio) = clip.audio_for(&result)? else {
                continue;
            };
            trace!(
                "frame {number}: clip {} adds {} samples at {}",
                clip.id(),
                clip_audio.samples.len(),
                clip_audio.sample_offset
            );

            let (left, right) =
                channel_gains(clip.gain(), clip.pan(), result.displayed_frame as f64);
            for (out, &(l, r)) in audio
                .samples_mut()
                .iter_mut()
                .skip(clip_audio.sample_offset)
                .zip(&clip_audio.samples)
            {
                out.0 += l * left;
                out.1 += r * right;
            }
        }

        Ok(TimelineFrame { audio, images })
    }
}

/// Left and right multipliers of a clip at clip frame `frame`.
///
/// Panning only attenuates the side it moves away from, so a centred clip
/// keeps its level.
fn channel_gains(gain: &Keyframe, pan: &Keyframe, frame: f64) -> (f32, f32) {
    let gain = (gain.value(frame) as f32).clamp(0.0, MAX_CLIP_GAIN);
    let pan = (pan.value(frame) as f32).clamp(-1.0, 1.0);
    (gain * (1.0 - pan.max(0.0)), gain * (1.0 + pan.min(0.0)))
}
