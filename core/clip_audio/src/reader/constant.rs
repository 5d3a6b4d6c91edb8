use log::{debug, trace};
use timebase::Cadence;

use crate::{
    constants::MAX_EMPTY_LOOKAHEAD_FRAMES,
    frame::Frame,
    reader::{FrameReader, ReaderError},
};

/// Corrections applied while building one constant-width frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Adjustment {
    /// Leading native samples that belong to the previous frame.
    pub dropped_front: usize,
    /// Samples pulled back from the end of earlier native frames.
    pub merged_front: usize,
    /// Trailing samples that belong to the next frame.
    pub dropped_back: usize,
    /// Samples taken from the start of following native frames (or silence past the end).
    pub padded_back: usize,
}

impl Adjustment {
    pub fn is_none(&self) -> bool {
        *self == Self::default()
    }
}

/// Presents a source with an irregular number of samples per frame as one
/// where every frame holds exactly `samples_per_frame(fps, sample_rate)` samples.
///
/// Frame `n` of this reader is the window of the source's concatenated audio
/// that starts at the cadence position of frame `n`. Consecutive windows
/// overlap by at most one sample where the cadence rounds up, so no sample is
/// ever invented or lost.
///
/// The source is borrowed, not owned. Its cumulative sample counts are
/// collected strictly in order: requesting frame `n` reads every native frame
/// below `n` that has not been counted yet.
#[derive(Debug)]
pub struct ConstantSamplesPerFrameReader<'a, R: ?Sized> {
    inner: &'a mut R,
    /// Entry `i` is the number of native samples in frames `[0, i)`.
    samples_before_frame: Vec<u64>,
    last_adjustment: Adjustment,
}

impl<'a, R: FrameReader + ?Sized> ConstantSamplesPerFrameReader<'a, R> {
    pub fn new(inner: &'a mut R) -> Self {
        Self {
            inner,
            samples_before_frame: Vec::new(),
            last_adjustment: Adjustment::default(),
        }
    }

    pub fn inner(&self) -> &R {
        &*self.inner
    }

    pub fn samples_per_frame(&self) -> u64 {
        self.inner.cadence().samples_per_frame()
    }

    /// Highest frame index whose preceding sample count is known.
    pub fn high_water_mark(&self) -> u64 {
        self.samples_before_frame.len().saturating_sub(1) as u64
    }

    /// Native samples before frame `number`, if already counted.
    pub fn samples_before(&self, number: u64) -> Option<u64> {
        usize::try_from(number)
            .ok()
            .and_then(|i| self.samples_before_frame.get(i))
            .copied()
    }

    /// Corrections applied to the most recently returned frame.
    pub fn last_adjustment(&self) -> Adjustment {
        self.last_adjustment
    }

    fn materialize_up_to(&mut self, number: u64) -> Result<(), ReaderError> {
        let mut counted = self.high_water_mark();
        if number <= counted {
            return Ok(());
        }
        trace!(
            "{}: counting native frames {}..{}",
            self.inner.name(),
            counted,
            number
        );
        self.samples_before_frame.reserve((number - counted) as usize);
        while counted < number {
            let frame = self.inner.get_frame(counted)?;
            let before = self.samples_before_frame[counted as usize];
            self.samples_before_frame.push(before + frame.sample_count() as u64);
            counted += 1;
        }
        Ok(())
    }

    /// Next native frame holding audio at or after `cursor`, moving the cursor past it.
    ///
    /// `None` once [`MAX_EMPTY_LOOKAHEAD_FRAMES`] consecutive frames were empty:
    /// the source counts as ended for the rest of the current request.
    fn next_audible(&mut self, cursor: &mut u64) -> Result<Option<Frame>, ReaderError> {
        for _ in 0..MAX_EMPTY_LOOKAHEAD_FRAMES {
            let frame = self.inner.get_frame(*cursor)?;
            *cursor += 1;
            if frame.sample_count() > 0 {
                return Ok(Some(frame));
            }
        }
        Ok(None)
    }
}

impl<R: FrameReader + ?Sized> FrameReader for ConstantSamplesPerFrameReader<'_, R> {
    fn name(&self) -> &str {
        "ConstantSamplesPerFrameReader"
    }

    fn cadence(&self) -> Cadence {
        self.inner.cadence()
    }

    fn open(&mut self) -> Result<(), ReaderError> {
        self.inner.open()?;
        self.samples_before_frame.clear();
        self.samples_before_frame.push(0);
        self.last_adjustment = Adjustment::default();
        debug!(
            "{}: constant width of {} samples per frame",
            self.inner.name(),
            self.samples_per_frame()
        );
        Ok(())
    }

    fn close(&mut self) {
        self.inner.close();
        self.samples_before_frame.clear();
        self.samples_before_frame.shrink_to_fit();
    }

    fn is_open(&self) -> bool {
        !self.samples_before_frame.is_empty() && self.inner.is_open()
    }

    /// # Panics
    ///
    /// If called before [`FrameReader::open`] or after [`FrameReader::close`].
    fn get_frame(&mut self, number: u64) -> Result<Frame, ReaderError> {
        assert!(
            !self.samples_before_frame.is_empty(),
            "ConstantSamplesPerFrameReader::get_frame called on a closed reader"
        );
        let cadence = self.inner.cadence();
        let samples_per_frame = cadence.samples_per_frame() as usize;
        self.materialize_up_to(number)?;

        let required = cadence.frame_to_sample(number as i64) as u64;
        let actual = self.samples_before_frame[number as usize];
        let mut adjustment = Adjustment::default();
        let mut frame = self.inner.get_frame(number)?;
        let mut cursor = number + 1;
        let mut exhausted = false;

        if actual < required {
            // The source fell behind: leading samples were already emitted.
            let mut to_drop = (required - actual) as usize;
            adjustment.dropped_front = to_drop;
            while to_drop > frame.sample_count() {
                to_drop -= frame.sample_count();
                match self.next_audible(&mut cursor)? {
                    Some(next) => frame = next,
                    None => {
                        frame = Frame::new(number, Vec::new());
                        to_drop = 0;
                        exhausted = true;
                    }
                }
            }
            frame.drop_front(to_drop);
        } else if actual > required {
            // The source ran ahead: the start of this frame is still in earlier frames.
            let mut missing = (actual - required) as usize;
            adjustment.merged_front = missing;
            let mut previous = number;
            while missing > 0 && previous > 0 {
                previous -= 1;
                let earlier = self.inner.get_frame(previous)?;
                let tail = earlier.tail(missing);
                missing -= tail.len();
                frame.prepend(tail);
            }
        }

        let available = frame.sample_count();
        if available > samples_per_frame {
            adjustment.dropped_back = frame.split_off_back(available - samples_per_frame).len();
        } else if available < samples_per_frame {
            adjustment.padded_back = samples_per_frame - available;
            while frame.sample_count() < samples_per_frame {
                let following = if exhausted {
                    None
                } else {
                    self.next_audible(&mut cursor)?
                };
                let Some(following) = following else {
                    frame.resize_silent(samples_per_frame);
                    break;
                };
                let wanted = samples_per_frame - frame.sample_count();
                frame.append(following.head(wanted));
            }
        }

        if !adjustment.is_none() {
            trace!(
                "{}: frame {} (native start {}, cadence start {}): {:?}",
                self.inner.name(),
                number,
                actual,
                required,
                adjustment
            );
        }
        self.last_adjustment = adjustment;
        Ok(frame.with_number(number))
    }
}
