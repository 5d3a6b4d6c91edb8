use std::{io::Read, path::Path};

use hound::{SampleFormat, WavReader};
use timebase::{Cadence, FrameRate};

use crate::{
    frame::StereoSample,
    reader::{ReaderError, memory::MemoryReader},
};

/// Loading `.wav` material into a [`MemoryReader`].
///
/// Supports:
/// - Mono and Stereo files (mono is duplicated into both channels)
/// - Integer PCM up to 32 bits and 32-bit float samples (converted to `f32`)
///
/// Does NOT support:
/// - More than 2 channels
///
/// The file's sample rate becomes the reader's sample rate; `fps` decides how
/// the audio is cut into frames.
///
/// # Example
/// ```no_run
/// use clip_audio::reader::memory::MemoryReader;
/// use timebase::FrameRate;
///
/// let reader = MemoryReader::from_wav_file("assets/wav/piano.wav", FrameRate::FPS_24).unwrap();
/// ```
impl MemoryReader {
    pub fn from_wav_file<P: AsRef<Path>>(path: P, fps: FrameRate) -> Result<Self, ReaderError> {
        let path = path.as_ref();
        let name = path
            .file_name()
            .map_or_else(|| "wav".to_owned(), |n| n.to_string_lossy().into_owned());
        let reader = WavReader::open(path)?;
        Self::from_wav_reader(reader, name, fps)
    }

    pub fn from_wav_stream<R: Read>(stream: R, fps: FrameRate) -> Result<Self, ReaderError> {
        let reader = WavReader::new(stream)?;
        Self::from_wav_reader(reader, "stream".to_owned(), fps)
    }

    fn from_wav_reader<R: Read>(
        reader: WavReader<R>,
        name: String,
        fps: FrameRate,
    ) -> Result<Self, ReaderError> {
        let spec = reader.spec();
        if spec.channels == 0 || spec.channels > 2 {
            return Err(ReaderError::UnsupportedChannelCount(spec.channels));
        }
        let cadence = Cadence::new(fps, spec.sample_rate)?;
        let samples = decode_pcm_samples(reader)?;
        Ok(Self::new(name, cadence, samples))
    }
}

fn decode_pcm_samples<R: Read>(reader: WavReader<R>) -> Result<Vec<StereoSample>, ReaderError> {
    let spec = reader.spec();
    let raw_samples = match spec.sample_format {
        SampleFormat::Int => {
            let full_scale = (1_i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|s| s as f32 / full_scale))
                .collect::<Result<Vec<f32>, _>>()?
        }
        SampleFormat::Float => reader
            .into_samples::<f32>()
            .collect::<Result<Vec<f32>, _>>()?,
    };

    Ok(interleave_channels(raw_samples, spec.channels))
}

/// Converts raw f32 samples into stereo `(L, R)` frames.
/// Mono is duplicated into both channels.
fn interleave_channels(samples: Vec<f32>, channels: u16) -> Vec<StereoSample> {
    if channels == 1 {
        samples.into_iter().map(|s| (s, s)).collect()
    } else {
        samples
            .chunks_exact(2)
            .map(|chunk| (chunk[0], chunk[1]))
            .collect()
    }
}
