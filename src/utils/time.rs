// -------------------------------------------------------------------------------------------------

/// Presentation timestamps are expressed in microseconds, relative to the track's start.
pub type TimeUs = i64;

pub const MICROS_PER_SECOND: f64 = 1_000_000.0;

// -------------------------------------------------------------------------------------------------

/// Convert a number of sample frames to a duration in microseconds at the given sample rate.
pub fn frames_to_micros(frames: u64, sample_rate: u32) -> TimeUs {
    debug_assert!(sample_rate > 0, "Invalid sample rate");
    (frames as f64 * MICROS_PER_SECOND / sample_rate as f64).round() as TimeUs
}

/// Convert a duration in microseconds to a fractional number of sample frames at the given
/// sample rate. Negative durations result in zero frames.
pub fn micros_to_frames(duration: TimeUs, sample_rate: u32) -> f64 {
    debug_assert!(sample_rate > 0, "Invalid sample rate");
    duration.max(0) as f64 * sample_rate as f64 / MICROS_PER_SECOND
}

// -------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_time_conversion() {
        assert_eq!(frames_to_micros(44100, 44100), 1_000_000);
        assert_eq!(frames_to_micros(1024, 48000), 21_333);
        assert_eq!(frames_to_micros(0, 48000), 0);
        assert_eq!(micros_to_frames(1_000_000, 48000), 48000.0);
        assert_eq!(micros_to_frames(500, 48000), 24.0);
        assert_eq!(micros_to_frames(-1, 48000), 0.0);
    }
}
