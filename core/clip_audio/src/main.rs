use std::{env, process};

use clip_audio::{Clip, FrameReader, Timeline, reader::memory::MemoryReader};
use hound::{SampleFormat, WavSpec, WavWriter};
use timebase::{Cadence, FrameRate};

const USAGE: &str = "usage: clip_audio <input.wav> <output.wav> [position_seconds] [frames]";

fn main() {
    let args: Vec<String> = env::args().skip(1).collect();
    let (Some(input), Some(output)) = (args.first(), args.get(1)) else {
        eprintln!("{USAGE}");
        process::exit(2);
    };
    let position: f64 = args.get(2).and_then(|s| s.parse().ok()).unwrap_or(0.0);
    let frames: u64 = args.get(3).and_then(|s| s.parse().ok()).unwrap_or(240);

    if let Err(e) = render(input, output, position, frames) {
        eprintln!("Render failed: {e}");
        process::exit(1);
    }
    println!("Rendered {frames} frames to {output}.");
}

fn render(
    input: &str,
    output: &str,
    position: f64,
    frames: u64,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut source = MemoryReader::from_wav_file(input, FrameRate::NTSC_24)?;
    let sample_rate = source.cadence().sample_rate();

    // Film-rate source on an NTSC video timeline.
    let cadence = Cadence::new(FrameRate::NTSC_30, sample_rate)?;
    let mut timeline = Timeline::new(cadence);
    timeline.add_clip(Clip::new(&mut source, 0.0, f64::INFINITY, position)?)?;
    timeline.open()?;

    let spec = WavSpec {
        channels: 2,
        sample_rate,
        bits_per_sample: 32,
        sample_format: SampleFormat::Float,
    };
    let mut writer = WavWriter::create(output, spec)?;
    for number in 0..frames {
        // Consecutive frames share a sample where the cadence rounds up.
        let frame = timeline.get_frame(number)?;
        let own = cadence.natural_frame_length(number as i64) as usize;
        for &(l, r) in frame.audio.head(own) {
            writer.write_sample(l)?;
            writer.write_sample(r)?;
        }
    }
    writer.finalize()?;
    timeline.close();
    Ok(())
}
