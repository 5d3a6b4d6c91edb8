//! Conversions between seconds, frame numbers and sample numbers for one cadence.
//!
//! Frame/sample conversions run in exact integer arithmetic on the rational
//! frame rate. Conversions from seconds go through `f64` and floor the product,
//! snapping products that are within [`TIME_SNAP_ULPS`] units in the last place
//! of an integer so that e.g. `1.1 s * 48000` lands on sample 52800.

use crate::cadence::FrameRate;

/// Rounding error, in units of `f64::EPSILON` relative to the value, under which
/// a product of seconds and a rate counts as integral.
pub const TIME_SNAP_ULPS: f64 = 4.0;

fn floor_snapped(value: f64) -> i64 {
    let nearest = value.round();
    let tolerance = TIME_SNAP_ULPS * f64::EPSILON * nearest.abs().max(1.0);
    if (value - nearest).abs() <= tolerance {
        nearest as i64
    } else {
        value.floor() as i64
    }
}

fn saturate(value: i128) -> i64 {
    value.clamp(i128::from(i64::MIN), i128::from(i64::MAX)) as i64
}

fn div_floor(numerator: i128, denominator: i128) -> i128 {
    numerator.div_euclid(denominator)
}

fn div_ceil(numerator: i128, denominator: i128) -> i128 {
    -(-numerator).div_euclid(denominator)
}

/// `floor(time * sample_rate)`. Infinite times saturate to `i64::MAX` / `i64::MIN`.
pub fn time_to_sample_number(time: f64, sample_rate: u32) -> i64 {
    debug_assert!(sample_rate > 0);
    floor_snapped(time * f64::from(sample_rate))
}

/// `floor(time * fps)`.
pub fn time_to_frame_number(time: f64, fps: FrameRate) -> i64 {
    floor_snapped(time * fps.as_f64())
}

/// `frame / fps`, in seconds.
pub fn frame_number_to_start_time(frame: i64, fps: FrameRate) -> f64 {
    frame as f64 / fps.as_f64()
}

/// `sample / sample_rate`, in seconds.
pub fn sample_number_to_start_time(sample: i64, sample_rate: u32) -> f64 {
    debug_assert!(sample_rate > 0);
    sample as f64 / f64::from(sample_rate)
}

/// Frame whose time span covers sample `sample`.
///
/// A sample spans `[sample / rate, (sample + 1) / rate)`. The frame holding the
/// start of that interval and the frame holding its last instant can differ
/// when a frame boundary falls inside the sample; `prefer_lower` picks which
/// one is returned in that case.
pub fn sample_number_to_frame_number(
    sample: i64,
    fps: FrameRate,
    sample_rate: u32,
    prefer_lower: bool,
) -> i64 {
    debug_assert!(sample_rate > 0);
    let per_second = i128::from(sample_rate) * i128::from(fps.den());
    let num = i128::from(fps.num());
    let start_frame = div_floor(i128::from(sample) * num, per_second);
    // Last instant before the next sample starts: floor(x - ε) == ceil(x) - 1.
    let end_frame = div_ceil((i128::from(sample) + 1) * num, per_second) - 1;
    debug_assert!(start_frame <= end_frame);
    if start_frame != end_frame && !prefer_lower {
        saturate(end_frame)
    } else {
        saturate(start_frame)
    }
}

/// `ceil(sample_rate / fps)`: the constant sample width of one frame.
pub fn samples_per_frame(fps: FrameRate, sample_rate: u32) -> u64 {
    debug_assert!(sample_rate > 0);
    let width = div_ceil(
        i128::from(sample_rate) * i128::from(fps.den()),
        i128::from(fps.num()),
    );
    width as u64
}

/// First sample number of `frame`: `floor((frame / fps) * sample_rate)`.
pub fn frame_number_to_sample_number(frame: i64, fps: FrameRate, sample_rate: u32) -> i64 {
    debug_assert!(sample_rate > 0);
    saturate(div_floor(
        i128::from(frame) * i128::from(fps.den()) * i128::from(sample_rate),
        i128::from(fps.num()),
    ))
}
