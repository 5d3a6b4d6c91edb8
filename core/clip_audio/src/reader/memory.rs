use log::debug;
use timebase::Cadence;

use crate::{
    frame::{Frame, StereoSample},
    reader::{FrameReader, ReaderError},
};

/// How decoded material is cut into native frames.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Framing {
    /// Frame `k` holds the samples between the starts of frames `k` and `k + 1`,
    /// so frame sizes follow the cadence's rounding (e.g. 1601/1602 at NTSC rates).
    Cadence,
    /// Frame sizes cycle through the given non-empty list, the way irregular
    /// decoders hand out audio packets.
    Pattern(Vec<usize>),
}

/// Decoded stereo material held in memory, served frame by frame.
///
/// Frames past the end of the material are silent frames of their nominal size.
#[derive(Debug)]
pub struct MemoryReader {
    name: String,
    cadence: Cadence,
    samples: Vec<StereoSample>,
    framing: Framing,
    open: bool,
}

impl MemoryReader {
    pub fn new(name: impl Into<String>, cadence: Cadence, samples: Vec<StereoSample>) -> Self {
        Self {
            name: name.into(),
            cadence,
            samples,
            framing: Framing::Cadence,
            open: false,
        }
    }

    /// Replaces the framing. An empty pattern or a pattern of only empty
    /// frames falls back to [`Framing::Cadence`].
    pub fn with_framing(mut self, framing: Framing) -> Self {
        self.framing = match framing {
            Framing::Pattern(sizes) if sizes.iter().all(|&s| s == 0) => Framing::Cadence,
            framing => framing,
        };
        self
    }

    pub fn framing(&self) -> &Framing {
        &self.framing
    }

    /// Total number of decoded samples.
    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }

    /// Native sample range `(start, length)` of frame `number`.
    fn frame_bounds(&self, number: u64) -> (u64, u64) {
        match &self.framing {
            Framing::Cadence => {
                let start = self.cadence.frame_to_sample(number as i64) as u64;
                (start, self.cadence.natural_frame_length(number as i64))
            }
            Framing::Pattern(sizes) => {
                let period = sizes.len() as u64;
                let cycle_len: u64 = sizes.iter().map(|&s| s as u64).sum();
                let phase = (number % period) as usize;
                let start = (number / period) * cycle_len
                    + sizes[..phase].iter().map(|&s| s as u64).sum::<u64>();
                (start, sizes[phase] as u64)
            }
        }
    }
}

impl FrameReader for MemoryReader {
    fn name(&self) -> &str {
        &self.name
    }

    fn cadence(&self) -> Cadence {
        self.cadence
    }

    fn open(&mut self) -> Result<(), ReaderError> {
        debug!(
            "opening '{}' ({} samples, {})",
            self.name,
            self.samples.len(),
            self.cadence
        );
        self.open = true;
        Ok(())
    }

    fn close(&mut self) {
        self.open = false;
    }

    fn is_open(&self) -> bool {
        self.open
    }

    fn get_frame(&mut self, number: u64) -> Result<Frame, ReaderError> {
        if !self.open {
            return Err(ReaderError::Closed(self.name.clone()));
        }
        let (start, length) = self.frame_bounds(number);
        let total = self.samples.len() as u64;
        let available_start = start.min(total) as usize;
        let available_end = (start + length).min(total) as usize;

        let mut frame = Frame::new(number, self.samples[available_start..available_end].to_vec());
        frame.resize_silent(length as usize);
        Ok(frame)
    }
}

#[cfg(test)]
mod memory_reader_tests {
    use timebase::FrameRate;

    use super::*;

    fn ramp(count: usize) -> Vec<StereoSample> {
        (0..count).map(|i| (i as f32, -(i as f32))).collect()
    }

    fn first_values(frame: &Frame) -> Vec<f32> {
        frame.samples().iter().map(|(l, _)| *l).collect()
    }

    #[test]
    fn test_closed_reader_refuses_frames() {
        let cadence = Cadence::new(FrameRate::FPS_25, 100).unwrap();
        let mut reader = MemoryReader::new("closed", cadence, ramp(10));
        assert!(matches!(reader.get_frame(0), Err(ReaderError::Closed(_))));
    }

    #[test]
    fn test_cadence_framing_follows_rounding() {
        let cadence = Cadence::new(FrameRate::NTSC_30, 48000).unwrap();
        let mut reader = MemoryReader::new("ntsc", cadence, ramp(10_000));
        reader.open().unwrap();

        let sizes: Vec<usize> = (0..5)
            .map(|n| reader.get_frame(n).unwrap().sample_count())
            .collect();
        assert_eq!(sizes, vec![1601, 1602, 1601, 1602, 1602]);
        assert_eq!(reader.get_frame(1).unwrap().samples()[0], (1601.0, -1601.0));
    }

    #[test]
    fn test_pattern_framing_cycles() {
        let cadence = Cadence::new(FrameRate::FPS_25, 100).unwrap();
        let mut reader = MemoryReader::new("pattern", cadence, ramp(20))
            .with_framing(Framing::Pattern(vec![2, 0, 3]));
        reader.open().unwrap();

        assert_eq!(first_values(&reader.get_frame(0).unwrap()), vec![0.0, 1.0]);
        assert_eq!(reader.get_frame(1).unwrap().sample_count(), 0);
        assert_eq!(first_values(&reader.get_frame(2).unwrap()), vec![2.0, 3.0, 4.0]);
        assert_eq!(first_values(&reader.get_frame(3).unwrap()), vec![5.0, 6.0]);
        assert_eq!(first_values(&reader.get_frame(5).unwrap()), vec![7.0, 8.0, 9.0]);
    }

    #[test]
    fn test_frames_past_end_are_silent() {
        let cadence = Cadence::new(FrameRate::FPS_25, 100).unwrap();
        let mut reader = MemoryReader::new("short", cadence, ramp(6));
        reader.open().unwrap();

        let partial = reader.get_frame(1).unwrap();
        assert_eq!(partial.sample_count(), 4);
        assert_eq!(first_values(&partial), vec![4.0, 5.0, 0.0, 0.0]);

        let beyond = reader.get_frame(100).unwrap();
        assert_eq!(beyond, Frame::silent(100, 4));
    }

    #[test]
    fn test_all_empty_pattern_falls_back_to_cadence() {
        let cadence = Cadence::new(FrameRate::FPS_25, 100).unwrap();
        let reader =
            MemoryReader::new("empty", cadence, ramp(4)).with_framing(Framing::Pattern(vec![]));
        assert_eq!(reader.framing(), &Framing::Cadence);
    }
}
