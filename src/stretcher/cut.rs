use super::{frame_counts, AudioStretcher, Sample, StretchStrategy};
use crate::{
    utils::buffer::{SampleBuffer, SampleBufferMut},
    Error,
};

// -------------------------------------------------------------------------------------------------

/// Stretcher which shrinks buffers by uniformly dropping input frames.
///
/// Output frame `i` is input frame `i * n / m`, so the kept frames are spread evenly over the
/// input. Equal sizes result in a plain copy. This raises the pitch of the audio.
///
/// Only valid when the input is longer than or as long as the output.
#[derive(Debug, Clone, Copy, Default)]
pub struct CutAudioStretcher;

impl AudioStretcher for CutAudioStretcher {
    fn strategy(&self) -> StretchStrategy {
        StretchStrategy::Cut
    }

    fn stretch<S: Sample>(
        &self,
        input: &mut SampleBuffer<S>,
        output: &mut SampleBufferMut<S>,
        channel_count: usize,
    ) -> Result<(), Error> {
        let (input_frames, output_frames) =
            frame_counts(self.strategy(), input, output, channel_count)?;
        if input_frames < output_frames {
            return Err(Error::InvalidBufferSizeForStrategy {
                strategy: self.strategy(),
                input_frames,
                output_frames,
            });
        }

        let samples = input.as_slice();
        for index in 0..output_frames {
            let source_frame = (index as u64 * input_frames as u64 / output_frames as u64) as usize;
            let start = source_frame * channel_count;
            output.write_frame(&samples[start..start + channel_count]);
        }
        input.consume(input_frames * channel_count);

        debug_assert_eq!(output.remaining(), 0, "Output should be completely filled");
        Ok(())
    }
}

// -------------------------------------------------------------------------------------------------
