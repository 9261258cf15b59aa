use crate::{
    interpolator::TimeInterpolator,
    stretcher::{
        AudioStretcher, DefaultAudioStretcher, InsertAudioStretcher, Sample, StretchStrategy,
    },
    track::TrackType,
    utils::{
        buffer::{SampleBuffer, SampleBufferMut},
        time::{frames_to_micros, micros_to_frames, TimeUs},
    },
    Error,
};

// -------------------------------------------------------------------------------------------------

/// Result of a single [`AudioRetimer::process`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetimedChunk {
    /// Corrected presentation timestamp of the chunk's first frame.
    pub time_us: TimeUs,
    /// Number of frames the chunk got stretched to.
    pub frame_count: usize,
    /// Duration of the stretched chunk.
    pub duration_us: TimeUs,
}

// -------------------------------------------------------------------------------------------------

/// Retimes decoded audio chunks, before they get fed into the encoder.
///
/// For each chunk, the retimer fetches the chunk's corrected timestamp from the interpolator,
/// predicts the corrected end of the chunk with the speed the interpolator applies to the
/// chunk's raw time span, and stretches the chunk so the written audio ends exactly there.
/// Output lengths are anchored to the corrected timeline, so rounding and speed ramps never let
/// the audio drift away from the remapped timestamps.
///
/// Video frames don't need a retimer: their timestamps only have to be passed through the
/// interpolator.
#[derive(Debug, Clone)]
pub struct AudioRetimer {
    sample_rate: u32,
    channel_count: usize,
    stretcher: DefaultAudioStretcher,
    // corrected timestamp of the first processed chunk
    start_time_us: Option<TimeUs>,
    output_frames: u64,
}

impl AudioRetimer {
    /// Create a new retimer for interleaved audio with the given layout, which expands chunks
    /// with the given insert stretcher.
    pub fn new(
        sample_rate: u32,
        channel_count: usize,
        insert: InsertAudioStretcher,
    ) -> Result<Self, Error> {
        if sample_rate == 0 {
            return Err(Error::ParameterError("Invalid sample rate: 0".to_string()));
        }
        if channel_count != 1 && channel_count != 2 {
            return Err(Error::UnsupportedChannelLayout(channel_count));
        }
        Ok(Self {
            sample_rate,
            channel_count,
            stretcher: DefaultAudioStretcher::new(insert),
            start_time_us: None,
            output_frames: 0,
        })
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channel_count(&self) -> usize {
        self.channel_count
    }

    /// Total number of frames produced since creation or the last reset.
    pub fn output_frames(&self) -> u64 {
        self.output_frames
    }

    /// Calculate the number of output frames for a chunk which starts at the given corrected
    /// timestamp and spans the given input frames at the given speed.
    ///
    /// The chunk's end gets placed on the corrected timeline relative to the first chunk, and the
    /// frames which got written so far are subtracted. When the written audio ran ahead of the
    /// timeline, the chunk shrinks, down to zero frames.
    pub fn target_frame_count(
        &self,
        corrected_time_us: TimeUs,
        input_frames: usize,
        speed: f64,
    ) -> usize {
        debug_assert!(speed > 0.0, "Speed must be > 0");
        if input_frames == 0 {
            return 0;
        }
        let start_time_us = self.start_time_us.unwrap_or(corrected_time_us);
        let elapsed_frames = micros_to_frames(
            corrected_time_us.saturating_sub(start_time_us),
            self.sample_rate,
        );
        let end_frame = (elapsed_frames + input_frames as f64 / speed).round() as u64;
        end_frame.saturating_sub(self.output_frames) as usize
    }

    /// Retime a decoded, interleaved audio chunk which starts at the given raw timestamp.
    ///
    /// The caller's output vector gets resized to the target length and filled.
    pub fn process<S: Sample, I: TimeInterpolator + ?Sized>(
        &mut self,
        interpolator: &mut I,
        time_us: TimeUs,
        input: &[S],
        output: &mut Vec<S>,
    ) -> Result<RetimedChunk, Error> {
        let channel_count = self.channel_count;
        let input_frames = input.len() / channel_count;
        if input.len() % channel_count != 0 {
            return Err(Error::InvalidBufferSizeForStrategy {
                strategy: StretchStrategy::Auto,
                input_frames,
                output_frames: 0,
            });
        }

        let corrected_time_us = interpolator.interpolate(TrackType::Audio, time_us)?;
        self.start_time_us.get_or_insert(corrected_time_us);
        // the interpolator maps this chunk's raw span with the speed at the chunk's end
        let end_time_us =
            time_us.saturating_add(frames_to_micros(input_frames as u64, self.sample_rate));
        let speed = interpolator.speed_at(TrackType::Audio, end_time_us);

        let frame_count = self.target_frame_count(corrected_time_us, input_frames, speed);
        output.clear();
        output.resize(frame_count * channel_count, S::default());

        let mut input_buffer = SampleBuffer::new(input);
        let mut output_buffer = SampleBufferMut::new(output.as_mut_slice());
        self.stretcher
            .stretch(&mut input_buffer, &mut output_buffer, channel_count)?;
        self.output_frames += frame_count as u64;

        log::debug!(
            "Retimed audio chunk at {time_us}us to {corrected_time_us}us: \
             {input_frames} -> {frame_count} frames (speed {speed:.3})"
        );
        Ok(RetimedChunk {
            time_us: corrected_time_us,
            frame_count,
            duration_us: frames_to_micros(frame_count as u64, self.sample_rate),
        })
    }

    /// Reset the timeline anchor and output counters for a new job.
    pub fn reset(&mut self) {
        self.start_time_us = None;
        self.output_frames = 0;
    }
}

// -------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        curve::SpeedCurve,
        interpolator::{CurveTimeInterpolator, DefaultTimeInterpolator},
        track::TrackMap,
    };

    const SAMPLE_RATE: u32 = 48000;
    const CHUNK_FRAMES: usize = 1024;

    fn curve_interpolator(curve: SpeedCurve) -> CurveTimeInterpolator {
        CurveTimeInterpolator::new(curve, TrackMap::new(10_000_000, 10_000_000)).unwrap()
    }

    #[test]
    fn half_speed_doubles_chunks() {
        let mut interpolator = curve_interpolator(SpeedCurve::constant(0.5).unwrap());
        let mut retimer =
            AudioRetimer::new(SAMPLE_RATE, 2, InsertAudioStretcher::default()).unwrap();
        let input = (0..CHUNK_FRAMES * 2).map(|i| i as i16).collect::<Vec<_>>();
        let mut output = Vec::new();

        let first = retimer
            .process(&mut interpolator, 0, &input, &mut output)
            .unwrap();
        assert_eq!(first.time_us, 0);
        assert_eq!(first.frame_count, 2 * CHUNK_FRAMES);
        assert_eq!(output.len(), 4 * CHUNK_FRAMES);
        // each stereo frame got doubled, channel order intact
        assert_eq!(output[..8], [0, 1, 0, 1, 2, 3, 2, 3]);

        let chunk_duration = frames_to_micros(CHUNK_FRAMES as u64, SAMPLE_RATE);
        let second = retimer
            .process(&mut interpolator, chunk_duration, &input, &mut output)
            .unwrap();
        assert_eq!(second.time_us, 2 * chunk_duration);
        assert_eq!(second.duration_us, frames_to_micros(2048, SAMPLE_RATE));
        assert_eq!(retimer.output_frames(), 4 * CHUNK_FRAMES as u64);
    }

    #[test]
    fn frame_counts_do_not_drift() {
        for speed in [0.3, 0.7, 1.0, 1.9, 3.3] {
            let mut interpolator = curve_interpolator(SpeedCurve::constant(speed).unwrap());
            let mut retimer =
                AudioRetimer::new(SAMPLE_RATE, 1, InsertAudioStretcher::default()).unwrap();
            let input = vec![0.25f32; CHUNK_FRAMES];
            let mut output = Vec::new();
            for chunk in 0..100u64 {
                let time_us = frames_to_micros(chunk * CHUNK_FRAMES as u64, SAMPLE_RATE);
                let retimed = retimer
                    .process(&mut interpolator, time_us, &input, &mut output)
                    .unwrap();
                assert_eq!(output.len(), retimed.frame_count);
                assert!(output.iter().all(|s| *s == 0.25));

                let expected_total = ((chunk + 1) * CHUNK_FRAMES as u64) as f64 / speed;
                assert!(
                    (retimer.output_frames() as f64 - expected_total).abs() <= 1.0,
                    "speed {speed}: {} vs {expected_total}",
                    retimer.output_frames()
                );
            }
        }
    }

    #[test]
    fn ramped_speed() {
        let mut interpolator = curve_interpolator(SpeedCurve::default());
        let mut retimer =
            AudioRetimer::new(SAMPLE_RATE, 2, InsertAudioStretcher::default()).unwrap();
        let input = vec![1i16; CHUNK_FRAMES * 2];
        let mut output = Vec::new();
        let mut last_time = TimeUs::MIN;
        let mut last_frame_count = usize::MAX;
        let mut time_us = 0;
        while time_us < 10_000_000 {
            let retimed = retimer
                .process(&mut interpolator, time_us, &input, &mut output)
                .unwrap();
            assert!(retimed.time_us >= last_time);
            // speed ramps up, so chunks get shorter (give or take a carried frame)
            assert!(retimed.frame_count <= last_frame_count.saturating_add(1));
            assert!(retimed.frame_count >= CHUNK_FRAMES - 1);
            assert!(retimed.frame_count <= CHUNK_FRAMES * 10 + 1);
            last_time = retimed.time_us;
            last_frame_count = retimed.frame_count;
            time_us += frames_to_micros(CHUNK_FRAMES as u64, SAMPLE_RATE);
        }
    }

    #[test]
    fn ramped_audio_follows_corrected_timeline() {
        let mut interpolator = curve_interpolator(SpeedCurve::default());
        let mut retimer =
            AudioRetimer::new(SAMPLE_RATE, 1, InsertAudioStretcher::default()).unwrap();
        let input = vec![0i16; CHUNK_FRAMES];
        let mut output = Vec::new();
        let mut input_frames = 0u64;
        let mut max_gap = 0;
        while input_frames < 10 * SAMPLE_RATE as u64 {
            let time_us = frames_to_micros(input_frames, SAMPLE_RATE);
            let written_us = frames_to_micros(retimer.output_frames(), SAMPLE_RATE);
            let retimed = retimer
                .process(&mut interpolator, time_us, &input, &mut output)
                .unwrap();
            // audio written so far must end where the chunk's corrected timestamp starts
            max_gap = max_gap.max((written_us - retimed.time_us).abs());
            input_frames += CHUNK_FRAMES as u64;
        }
        // a frame is about 21us at 48kHz
        assert!(max_gap <= 50, "audio drifted {max_gap}us away from the timeline");

        // total length matches the corrected duration of the whole track
        let end_us = interpolator
            .interpolate(TrackType::Audio, frames_to_micros(input_frames, SAMPLE_RATE))
            .unwrap();
        let written_us = frames_to_micros(retimer.output_frames(), SAMPLE_RATE);
        assert!((written_us - end_us).abs() <= 50, "{written_us} vs {end_us}");
    }

    #[test]
    fn partial_frames_leave_state_untouched() {
        let mut interpolator = curve_interpolator(SpeedCurve::default());
        let mut retimer =
            AudioRetimer::new(SAMPLE_RATE, 2, InsertAudioStretcher::default()).unwrap();
        let input = vec![0i16; CHUNK_FRAMES * 2];
        let mut output = Vec::new();
        let first = retimer
            .process(&mut interpolator, 0, &input, &mut output)
            .unwrap();
        let state = interpolator.state(TrackType::Audio).clone();
        let output_frames = retimer.output_frames();

        let chunk_duration = frames_to_micros(CHUNK_FRAMES as u64, SAMPLE_RATE);
        assert!(matches!(
            retimer.process(
                &mut interpolator,
                chunk_duration,
                &input[..CHUNK_FRAMES * 2 - 1],
                &mut output
            ),
            Err(Error::InvalidBufferSizeForStrategy { .. })
        ));
        assert_eq!(interpolator.state(TrackType::Audio), &state);
        assert_eq!(retimer.output_frames(), output_frames);
        assert_eq!(output.len(), first.frame_count * 2);

        // the same chunk with whole frames gets retimed as if nothing happened
        let mut fresh_interpolator = curve_interpolator(SpeedCurve::default());
        let mut fresh_retimer =
            AudioRetimer::new(SAMPLE_RATE, 2, InsertAudioStretcher::default()).unwrap();
        let mut fresh_output = Vec::new();
        for time_us in [0, chunk_duration] {
            fresh_retimer
                .process(&mut fresh_interpolator, time_us, &input, &mut fresh_output)
                .unwrap();
        }
        let retried = retimer
            .process(&mut interpolator, chunk_duration, &input, &mut output)
            .unwrap();
        assert_eq!(
            Some(retried.time_us),
            fresh_interpolator
                .state(TrackType::Audio)
                .last_corrected_time_us()
        );
        assert_eq!(retimer.output_frames(), fresh_retimer.output_frames());
    }

    #[test]
    fn passthrough_interpolator() {
        let mut interpolator = DefaultTimeInterpolator::new();
        let mut retimer =
            AudioRetimer::new(SAMPLE_RATE, 1, InsertAudioStretcher::default()).unwrap();
        let input = [1i16, 2, 3];
        let mut output = Vec::new();
        let retimed = retimer
            .process(&mut interpolator, 5_000, &input, &mut output)
            .unwrap();
        assert_eq!(retimed.time_us, 5_000);
        assert_eq!(output, input);
        // out of order chunks are rejected
        assert!(matches!(
            retimer.process(&mut interpolator, 4_000, &input, &mut output),
            Err(Error::OutOfOrderTimestamp { .. })
        ));
        retimer.reset();
        assert_eq!(retimer.output_frames(), 0);
    }

    #[test]
    fn invalid_layouts() {
        assert!(matches!(
            AudioRetimer::new(SAMPLE_RATE, 6, InsertAudioStretcher::default()),
            Err(Error::UnsupportedChannelLayout(6))
        ));
        assert!(matches!(
            AudioRetimer::new(0, 2, InsertAudioStretcher::default()),
            Err(Error::ParameterError(_))
        ));
    }
}
