use std::ops::RangeInclusive;

use crate::{
    cadence::{Cadence, ClipPlacement},
    convert::{
        frame_number_to_sample_number, frame_number_to_start_time, sample_number_to_frame_number,
        samples_per_frame, time_to_frame_number, time_to_sample_number,
    },
};

/// Clip frames and sample corrections that supply the audio of one timeline frame.
///
/// Concatenating the audio of clip frames `clip_frame_start..=clip_frame_end`,
/// dropping `samples_to_drop_start` samples from its front and
/// `samples_to_drop_end` from its back, yields the clip audio for the timeline
/// frame. That audio begins `sample_offset` samples into the timeline frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchResult {
    pub clip_frame_start: i64,
    pub clip_frame_end: i64,
    pub samples_to_drop_start: u64,
    pub samples_to_drop_end: u64,
    /// Leading silence before the clip's audio starts within the timeline frame.
    pub sample_offset: u64,
    /// The timeline frame's start lies inside the clip's visible window.
    pub use_image: bool,
    /// Clip frame whose image is shown. Only meaningful when `use_image` is set.
    pub displayed_frame: i64,
}

impl MatchResult {
    /// An inverted frame range means the clip has no audio for this timeline frame.
    pub fn has_audio(&self) -> bool {
        self.clip_frame_start <= self.clip_frame_end
    }

    pub fn clip_frames(&self) -> RangeInclusive<i64> {
        self.clip_frame_start..=self.clip_frame_end
    }
}

/// Computes which clip frames fill timeline frame `tl_frame_n`.
///
/// Clip sample numbers are expressed at the timeline's sample rate; the clip
/// only contributes its own frame rate.
pub fn match_frames(tl_frame_n: i64, timeline: &Cadence, clip: &ClipPlacement) -> MatchResult {
    let sample_rate = timeline.sample_rate();

    // Translates timeline sample numbers into clip sample numbers.
    let time_offset = clip.time_offset();
    let placement_offset = time_to_sample_number(time_offset, sample_rate);

    let tl_sample_n = frame_number_to_sample_number(tl_frame_n, timeline.fps(), sample_rate);
    let tl_sample_end_n = tl_sample_n + timeline.samples_per_frame() as i64 - 1;
    let cl_sample_n = tl_sample_n - placement_offset;
    let cl_sample_end_n = tl_sample_end_n - placement_offset;

    let first_allowed_sample = time_to_sample_number(clip.start(), sample_rate);
    let last_allowed_sample = time_to_sample_number(clip.end(), sample_rate);

    // Opposite tie-breaks keep the range inside the needed samples.
    let clip_frame_start = sample_number_to_frame_number(
        cl_sample_n.max(first_allowed_sample),
        clip.fps(),
        sample_rate,
        false,
    );
    let clip_frame_end = sample_number_to_frame_number(
        cl_sample_end_n.min(last_allowed_sample),
        clip.fps(),
        sample_rate,
        true,
    );

    // Samples actually delivered by the whole frames of the range.
    let cl_first_sample_n =
        frame_number_to_sample_number(clip_frame_start, clip.fps(), sample_rate);
    let cl_last_sample_n = frame_number_to_sample_number(clip_frame_end, clip.fps(), sample_rate)
        .saturating_add(samples_per_frame(clip.fps(), sample_rate) as i64 - 1);

    let samples_to_drop_start = (first_allowed_sample.saturating_sub(cl_first_sample_n))
        .max(cl_sample_n.saturating_sub(cl_first_sample_n));
    let samples_to_drop_end = (cl_last_sample_n.saturating_sub(last_allowed_sample))
        .max(cl_last_sample_n.saturating_sub(cl_sample_end_n));
    let sample_offset = first_allowed_sample.saturating_sub(cl_sample_n).max(0);

    let time_in_clip = frame_number_to_start_time(tl_frame_n, timeline.fps()) - time_offset;
    let use_image = time_in_clip >= clip.start() && time_in_clip <= clip.end();
    let displayed_frame = time_to_frame_number(time_in_clip, clip.fps());

    MatchResult {
        clip_frame_start,
        clip_frame_end,
        samples_to_drop_start: samples_to_drop_start.max(0) as u64,
        samples_to_drop_end: samples_to_drop_end.max(0) as u64,
        sample_offset: sample_offset as u64,
        use_image,
        displayed_frame,
    }
}

#[cfg(test)]
mod matcher_tests {
    use super::*;
    use crate::cadence::FrameRate;

    fn timeline(fps: FrameRate, sample_rate: u32) -> Cadence {
        Cadence::new(fps, sample_rate).unwrap()
    }

    fn placement(fps: FrameRate, start: f64, end: f64, position: f64) -> ClipPlacement {
        ClipPlacement::new(fps, start, end, position).unwrap()
    }

    #[test]
    fn test_untrimmed_clip_maps_frame_to_itself() {
        let tl = timeline(FrameRate::FPS_30, 48000);
        let clip = ClipPlacement::untrimmed(FrameRate::FPS_30);

        let result = match_frames(7, &tl, &clip);
        assert_eq!(
            result,
            MatchResult {
                clip_frame_start: 7,
                clip_frame_end: 7,
                samples_to_drop_start: 0,
                samples_to_drop_end: 0,
                sample_offset: 0,
                use_image: true,
                displayed_frame: 7,
            }
        );
    }

    #[test]
    fn test_trimmed_start_shifts_into_clip() {
        // Clip time 0.5 s is heard at timeline time 2.0 s (frame 50 at 25 fps).
        let tl = timeline(FrameRate::FPS_25, 48000);
        let clip = placement(FrameRate::FPS_25, 0.5, f64::INFINITY, 2.0);

        let result = match_frames(50, &tl, &clip);
        assert_eq!(result.clip_frames(), 12..=13);
        assert_eq!(result.samples_to_drop_start, 960);
        assert_eq!(result.samples_to_drop_end, 960);
        assert_eq!(result.sample_offset, 0);
        assert!(result.use_image);
        assert_eq!(result.displayed_frame, 12);
    }

    #[test]
    fn test_frame_before_clip_position_has_no_audio() {
        let tl = timeline(FrameRate::FPS_30, 48000);
        let clip = placement(FrameRate::FPS_30, 0.0, f64::INFINITY, 1.0);

        let result = match_frames(0, &tl, &clip);
        assert!(!result.has_audio());
        assert!(!result.use_image);
        assert_eq!(result.sample_offset, 48000);
    }

    #[test]
    fn test_clip_starting_inside_frame_gets_leading_silence() {
        let tl = timeline(FrameRate::FPS_30, 48000);
        let clip = placement(FrameRate::FPS_24, 0.0, f64::INFINITY, 0.01);

        let result = match_frames(0, &tl, &clip);
        assert_eq!(result.clip_frames(), 0..=0);
        assert_eq!(result.sample_offset, 480);
        assert_eq!(result.samples_to_drop_start, 0);
        // 24 fps frames are 2000 samples wide; 1120 of them are needed.
        assert_eq!(result.samples_to_drop_end, 880);
        assert!(!result.use_image);
    }

    #[test]
    fn test_slower_clip_cadence_drops_surplus() {
        let tl = timeline(FrameRate::FPS_30, 48000);
        let clip = ClipPlacement::untrimmed(FrameRate::FPS_24);

        let result = match_frames(10, &tl, &clip);
        assert_eq!(result.clip_frames(), 8..=8);
        assert_eq!(result.samples_to_drop_start, 0);
        assert_eq!(result.samples_to_drop_end, 400);
        assert_eq!(result.displayed_frame, 8);
    }

    #[test]
    fn test_end_trim_cuts_last_frame_short() {
        let tl = timeline(FrameRate::FPS_30, 48000);
        let clip = placement(FrameRate::FPS_30, 0.0, 0.98, 0.0);

        let last = match_frames(29, &tl, &clip);
        assert_eq!(last.clip_frames(), 29..=29);
        assert_eq!(last.samples_to_drop_end, 959);
        assert!(last.use_image);

        let after = match_frames(30, &tl, &clip);
        assert!(!after.has_audio());
        assert!(!after.use_image);
    }

    #[test]
    fn test_ntsc_clip_on_integral_timeline() {
        let tl = timeline(FrameRate::FPS_25, 48000);
        let clip = ClipPlacement::untrimmed(FrameRate::NTSC_30);

        let result = match_frames(3, &tl, &clip);
        assert_eq!(result.clip_frames(), 3..=4);
        assert_eq!(result.samples_to_drop_start, 956);
        assert_eq!(result.samples_to_drop_end, 328);
        assert_eq!(result.displayed_frame, 3);
    }
}
