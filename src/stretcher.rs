//! AudioStretcher trait for reconciling the length of interleaved PCM buffers.

use rand::Rng;

use crate::{
    utils::buffer::{SampleBuffer, SampleBufferMut},
    Error,
};

pub(crate) mod cut;
pub(crate) mod insert;
pub(crate) mod passthrough;

pub use cut::CutAudioStretcher;
pub use insert::{InsertAudioStretcher, InsertMode};
pub use passthrough::PassThroughAudioStretcher;

// -------------------------------------------------------------------------------------------------

/// Interleaved PCM sample types which can be stretched.
pub trait Sample: Copy + Default + Send + Sync + 'static {
    /// Create a low level random noise sample, used to fill gaps without repeating content.
    fn noise<R: Rng + ?Sized>(rng: &mut R) -> Self;
}

/// Max amplitude of noise samples in 16 bit sample units.
const NOISE_AMPLITUDE: i16 = 300;

impl Sample for i16 {
    fn noise<R: Rng + ?Sized>(rng: &mut R) -> Self {
        rng.random_range(-NOISE_AMPLITUDE..NOISE_AMPLITUDE)
    }
}

impl Sample for f32 {
    fn noise<R: Rng + ?Sized>(rng: &mut R) -> Self {
        const AMPLITUDE: f32 = NOISE_AMPLITUDE as f32 / 32768.0;
        rng.random_range(-AMPLITUDE..AMPLITUDE)
    }
}

// -------------------------------------------------------------------------------------------------

/// Available stretching strategies.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display, strum::EnumString,
)]
#[strum(serialize_all = "kebab-case")]
pub enum StretchStrategy {
    /// Expand buffers by repeating (or noise filling) input frames.
    Insert,
    /// Shrink buffers by dropping input frames.
    Cut,
    /// Copy buffers of equal length.
    PassThrough,
    /// Pick one of the above, depending on the input and output buffer sizes.
    #[default]
    Auto,
}

// -------------------------------------------------------------------------------------------------

/// Audio stretcher interface.
///
/// Stretchers consume all remaining input frames and completely fill the remaining output
/// frames, changing the duration (and pitch) of the audio. Both buffers must contain whole
/// interleaved frames with the given channel layout, and frames always keep their channel order.
///
/// Stretchers hold no per buffer state and don't allocate, so a single instance can be shared
/// across threads.
pub trait AudioStretcher: Send + Sync {
    /// The strategy this stretcher implements.
    fn strategy(&self) -> StretchStrategy;

    /// Stretch the remaining input to the remaining output.
    ///
    /// Returns `UnsupportedChannelLayout` for channel counts other than 1 or 2 and
    /// `InvalidBufferSizeForStrategy` when the buffer sizes do not fit the strategy.
    fn stretch<S: Sample>(
        &self,
        input: &mut SampleBuffer<S>,
        output: &mut SampleBufferMut<S>,
        channel_count: usize,
    ) -> Result<(), Error>;
}

// -------------------------------------------------------------------------------------------------

/// Validate the channel layout and buffer sizes. Returns the remaining (input, output) frames.
pub(crate) fn frame_counts<S: Sample>(
    strategy: StretchStrategy,
    input: &SampleBuffer<S>,
    output: &SampleBufferMut<S>,
    channel_count: usize,
) -> Result<(usize, usize), Error> {
    if channel_count != 1 && channel_count != 2 {
        return Err(Error::UnsupportedChannelLayout(channel_count));
    }
    let input_frames = input.remaining_frames(channel_count);
    let output_frames = output.remaining_frames(channel_count);
    if input.remaining() % channel_count != 0 || output.remaining() % channel_count != 0 {
        return Err(Error::InvalidBufferSizeForStrategy {
            strategy,
            input_frames,
            output_frames,
        });
    }
    Ok((input_frames, output_frames))
}

// -------------------------------------------------------------------------------------------------

/// Stretcher which picks an insert, cut or pass-through strategy, depending on the input and
/// output buffer sizes.
#[derive(Debug, Clone, Default)]
pub struct DefaultAudioStretcher {
    insert: InsertAudioStretcher,
    cut: CutAudioStretcher,
    passthrough: PassThroughAudioStretcher,
}

impl DefaultAudioStretcher {
    /// Create a new default stretcher which uses the given insert stretcher to expand buffers.
    pub fn new(insert: InsertAudioStretcher) -> Self {
        Self {
            insert,
            cut: CutAudioStretcher,
            passthrough: PassThroughAudioStretcher,
        }
    }

    /// Strategy that gets applied for the given frame counts.
    pub fn select(input_frames: usize, output_frames: usize) -> StretchStrategy {
        match input_frames.cmp(&output_frames) {
            std::cmp::Ordering::Less => StretchStrategy::Insert,
            std::cmp::Ordering::Greater => StretchStrategy::Cut,
            std::cmp::Ordering::Equal => StretchStrategy::PassThrough,
        }
    }
}

impl AudioStretcher for DefaultAudioStretcher {
    fn strategy(&self) -> StretchStrategy {
        StretchStrategy::Auto
    }

    fn stretch<S: Sample>(
        &self,
        input: &mut SampleBuffer<S>,
        output: &mut SampleBufferMut<S>,
        channel_count: usize,
    ) -> Result<(), Error> {
        let (input_frames, output_frames) =
            frame_counts(self.strategy(), input, output, channel_count)?;
        let strategy = Self::select(input_frames, output_frames);
        log::debug!("Stretching {input_frames} to {output_frames} frames via {strategy}");
        match strategy {
            StretchStrategy::Insert => self.insert.stretch(input, output, channel_count),
            StretchStrategy::Cut => self.cut.stretch(input, output, channel_count),
            StretchStrategy::PassThrough | StretchStrategy::Auto => {
                self.passthrough.stretch(input, output, channel_count)
            }
        }
    }
}

// -------------------------------------------------------------------------------------------------
