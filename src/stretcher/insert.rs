use std::sync::atomic::{AtomicU64, Ordering};

use rand::{rngs::SmallRng, SeedableRng};

use super::{frame_counts, AudioStretcher, Sample, StretchStrategy};
use crate::{
    utils::buffer::{SampleBuffer, SampleBufferMut},
    Error,
};

// -------------------------------------------------------------------------------------------------

/// How [`InsertAudioStretcher`] fills the gaps between input frames.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display, strum::EnumString,
)]
#[strum(serialize_all = "lowercase")]
pub enum InsertMode {
    /// Repeat each input frame. Lowers the pitch, but keeps the timbre of the input.
    #[default]
    Duplicate,
    /// Write each input frame once, followed by low level noise frames. Avoids periodic
    /// repetition artifacts, at the cost of the input's timbre.
    Noise,
}

// -------------------------------------------------------------------------------------------------

/// Stretcher which expands buffers by inserting filler frames after each input frame.
///
/// With `n` input and `m` output frames, each input frame gets written `(m - n) / n + 1` times.
/// The remaining shortfall is evenly spread over the input, so some frames are written one more
/// time and the output gets filled exactly. This changes the pitch of the audio.
///
/// Only valid when the input is shorter than the output.
#[derive(Debug, Clone)]
pub struct InsertAudioStretcher {
    mode: InsertMode,
    seed: u64,
}

impl Default for InsertAudioStretcher {
    fn default() -> Self {
        Self::new(InsertMode::default())
    }
}

impl InsertAudioStretcher {
    /// Create a new insert stretcher with the given mode and a random noise seed.
    pub fn new(mode: InsertMode) -> Self {
        Self::with_seed(mode, rand::random())
    }

    /// Create a new insert stretcher with the given mode and a fixed noise seed, so noise
    /// filled output is reproducible.
    pub fn with_seed(mode: InsertMode, seed: u64) -> Self {
        Self { mode, seed }
    }

    pub fn mode(&self) -> InsertMode {
        self.mode
    }

    fn noise_rng(&self) -> SmallRng {
        // make sure successive buffers don't repeat the same noise sequence
        static NOISE_COUNTER: AtomicU64 = AtomicU64::new(0);
        let count = NOISE_COUNTER.fetch_add(1, Ordering::Relaxed);
        SmallRng::seed_from_u64(self.seed ^ count.wrapping_mul(0x9E37_79B9_7F4A_7C15))
    }
}

impl AudioStretcher for InsertAudioStretcher {
    fn strategy(&self) -> StretchStrategy {
        StretchStrategy::Insert
    }

    fn stretch<S: Sample>(
        &self,
        input: &mut SampleBuffer<S>,
        output: &mut SampleBufferMut<S>,
        channel_count: usize,
    ) -> Result<(), Error> {
        let (input_frames, output_frames) =
            frame_counts(self.strategy(), input, output, channel_count)?;
        if input_frames == 0 || input_frames >= output_frames {
            return Err(Error::InvalidBufferSizeForStrategy {
                strategy: self.strategy(),
                input_frames,
                output_frames,
            });
        }

        let repeat = (output_frames - input_frames) / input_frames + 1;
        let shortfall = output_frames - input_frames * repeat;
        debug_assert!(shortfall < input_frames);

        let mut rng = match self.mode {
            InsertMode::Duplicate => None,
            InsertMode::Noise => Some(self.noise_rng()),
        };

        for (index, frame) in input.as_slice().chunks_exact(channel_count).enumerate() {
            // spread the shortfall evenly: sums up to exactly `shortfall` extra writes
            let extra = (index + 1) * shortfall / input_frames - index * shortfall / input_frames;
            output.write_frame(frame);
            for _ in 1..repeat + extra {
                match rng.as_mut() {
                    None => {
                        output.write_frame(frame);
                    }
                    Some(rng) => {
                        for _ in 0..channel_count {
                            output.write(S::noise(rng));
                        }
                    }
                }
            }
        }
        input.consume(input_frames * channel_count);

        debug_assert_eq!(output.remaining(), 0, "Output should be completely filled");
        Ok(())
    }
}

// -------------------------------------------------------------------------------------------------
