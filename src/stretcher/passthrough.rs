use super::{frame_counts, AudioStretcher, Sample, StretchStrategy};
use crate::{
    utils::buffer::{SampleBuffer, SampleBufferMut},
    Error,
};

// -------------------------------------------------------------------------------------------------

/// Stretcher which copies buffers of equal length.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassThroughAudioStretcher;

impl AudioStretcher for PassThroughAudioStretcher {
    fn strategy(&self) -> StretchStrategy {
        StretchStrategy::PassThrough
    }

    fn stretch<S: Sample>(
        &self,
        input: &mut SampleBuffer<S>,
        output: &mut SampleBufferMut<S>,
        channel_count: usize,
    ) -> Result<(), Error> {
        let (input_frames, output_frames) =
            frame_counts(self.strategy(), input, output, channel_count)?;
        if input_frames != output_frames {
            return Err(Error::InvalidBufferSizeForStrategy {
                strategy: self.strategy(),
                input_frames,
                output_frames,
            });
        }
        let copied = output.write_slice(input.as_slice());
        input.consume(copied);
        Ok(())
    }
}

// -------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn copies_equal_sizes() {
        let input = [1.0f32, 2.0, 3.0, 4.0];
        let mut output = [0.0f32; 4];
        let mut input_buffer = SampleBuffer::new(&input);
        let mut output_buffer = SampleBufferMut::new(&mut output);
        PassThroughAudioStretcher
            .stretch(&mut input_buffer, &mut output_buffer, 2)
            .unwrap();
        assert_eq!(input_buffer.remaining(), 0);
        assert_eq!(output_buffer.remaining(), 0);
        assert_eq!(output, input);
    }

    #[test]
    fn rejects_different_sizes() {
        let input = [0i16; 4];
        let mut output = [0i16; 6];
        assert!(matches!(
            PassThroughAudioStretcher.stretch(
                &mut SampleBuffer::new(&input),
                &mut SampleBufferMut::new(&mut output),
                2
            ),
            Err(Error::InvalidBufferSizeForStrategy {
                strategy: StretchStrategy::PassThrough,
                input_frames: 2,
                output_frames: 3
            })
        ));
    }
}
