/// One stereo sample `(L, R)`.
pub type StereoSample = (f32, f32);

/// Decoded audio of one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    number: u64,
    samples: Vec<StereoSample>,
}

impl Frame {
    pub fn new(number: u64, samples: Vec<StereoSample>) -> Self {
        Self { number, samples }
    }

    pub fn silent(number: u64, sample_count: usize) -> Self {
        Self::new(number, vec![(0.0, 0.0); sample_count])
    }

    pub fn number(&self) -> u64 {
        self.number
    }

    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }

    pub fn samples(&self) -> &[StereoSample] {
        &self.samples
    }

    pub fn samples_mut(&mut self) -> &mut [StereoSample] {
        &mut self.samples
    }

    pub fn into_samples(self) -> Vec<StereoSample> {
        self.samples
    }

    /// Renumbers the frame, e.g. after its audio was spliced from neighbours.
    pub fn with_number(self, number: u64) -> Self {
        Self { number, ..self }
    }

    /// Removes up to `count` samples from the front and returns how many were removed.
    pub fn drop_front(&mut self, count: usize) -> usize {
        let count = count.min(self.samples.len());
        self.samples.drain(..count);
        count
    }

    /// Removes up to `count` samples from the back and returns them.
    pub fn split_off_back(&mut self, count: usize) -> Vec<StereoSample> {
        let at = self.samples.len().saturating_sub(count);
        self.samples.split_off(at)
    }

    /// Last `count` samples (or all of them if the frame is shorter).
    pub fn tail(&self, count: usize) -> &[StereoSample] {
        &self.samples[self.samples.len().saturating_sub(count)..]
    }

    /// First `count` samples (or all of them if the frame is shorter).
    pub fn head(&self, count: usize) -> &[StereoSample] {
        &self.samples[..count.min(self.samples.len())]
    }

    pub fn prepend(&mut self, head: &[StereoSample]) {
        self.samples.splice(0..0, head.iter().copied());
    }

    pub fn append(&mut self, tail: &[StereoSample]) {
        self.samples.extend_from_slice(tail);
    }

    /// Pads with silence (or truncates) to exactly `sample_count` samples.
    pub fn resize_silent(&mut self, sample_count: usize) {
        self.samples.resize(sample_count, (0.0, 0.0));
    }
}
