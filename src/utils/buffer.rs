// -------------------------------------------------------------------------------------------------

/// Copy the given source buffer into the given target buffer.
/// Both buffers must have the same length.
#[inline]
pub fn copy_buffers<T: Copy>(target: &mut [T], source: &[T]) {
    debug_assert_eq!(target.len(), source.len(), "Buffer sizes must match");
    target.copy_from_slice(source);
}

// -------------------------------------------------------------------------------------------------

/// A borrowed read cursor over an interleaved sample buffer.
///
/// Reading advances the cursor. The view never owns its samples: it gets created per decoded
/// chunk and dropped when the chunk has been processed.
#[derive(Debug)]
pub struct SampleBuffer<'a, T: Copy> {
    samples: &'a [T],
    position: usize,
}

impl<'a, T: Copy> SampleBuffer<'a, T> {
    pub fn new(samples: &'a [T]) -> Self {
        Self {
            samples,
            position: 0,
        }
    }

    /// Current read position in samples.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Number of samples which have not yet been read.
    pub fn remaining(&self) -> usize {
        self.samples.len() - self.position
    }

    /// Number of whole frames which have not yet been read.
    pub fn remaining_frames(&self, channel_count: usize) -> usize {
        debug_assert!(channel_count > 0, "Invalid channel count");
        self.remaining() / channel_count
    }

    pub fn has_remaining(&self) -> bool {
        self.position < self.samples.len()
    }

    /// Access the not yet consumed part of the buffer.
    pub fn as_slice(&self) -> &'a [T] {
        &self.samples[self.position..]
    }

    /// Read a single sample. Returns None when the buffer is exhausted.
    #[inline]
    pub fn read(&mut self) -> Option<T> {
        let value = self.samples.get(self.position).copied()?;
        self.position += 1;
        Some(value)
    }

    /// Mark the given number of samples as read.
    pub fn consume(&mut self, amount: usize) {
        debug_assert!(amount <= self.remaining(), "Consuming more than available");
        self.position = (self.position + amount).min(self.samples.len());
    }
}

// -------------------------------------------------------------------------------------------------

/// A borrowed write cursor over an interleaved sample buffer.
///
/// Writing advances the cursor. Writes past the end of the buffer are ignored and reported.
#[derive(Debug)]
pub struct SampleBufferMut<'a, T: Copy> {
    samples: &'a mut [T],
    position: usize,
}

impl<'a, T: Copy> SampleBufferMut<'a, T> {
    pub fn new(samples: &'a mut [T]) -> Self {
        Self {
            samples,
            position: 0,
        }
    }

    /// Current write position in samples.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Number of samples which have not yet been written.
    pub fn remaining(&self) -> usize {
        self.samples.len() - self.position
    }

    /// Number of whole frames which have not yet been written.
    pub fn remaining_frames(&self, channel_count: usize) -> usize {
        debug_assert!(channel_count > 0, "Invalid channel count");
        self.remaining() / channel_count
    }

    pub fn has_remaining(&self) -> bool {
        self.position < self.samples.len()
    }

    /// Access the already written part of the buffer.
    pub fn written(&self) -> &[T] {
        &self.samples[..self.position]
    }

    /// Write a single sample. Returns false when the buffer is full.
    #[inline]
    pub fn write(&mut self, value: T) -> bool {
        match self.samples.get_mut(self.position) {
            Some(sample) => {
                *sample = value;
                self.position += 1;
                true
            }
            None => false,
        }
    }

    /// Write a single frame of interleaved samples. Returns false when the frame does not fit.
    #[inline]
    pub fn write_frame(&mut self, frame: &[T]) -> bool {
        match self
            .samples
            .get_mut(self.position..self.position + frame.len())
        {
            Some(target) => {
                copy_buffers(target, frame);
                self.position += frame.len();
                true
            }
            None => false,
        }
    }

    /// Copy as many samples as fit from the given slice. Returns the number of copied samples.
    pub fn write_slice(&mut self, source: &[T]) -> usize {
        let count = source.len().min(self.remaining());
        copy_buffers(
            &mut self.samples[self.position..self.position + count],
            &source[..count],
        );
        self.position += count;
        count
    }
}

// -------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_cursor() {
        let samples = [1i16, 2, 3, 4, 5];
        let mut buffer = SampleBuffer::new(&samples);
        assert_eq!(buffer.remaining(), 5);
        assert_eq!(buffer.remaining_frames(2), 2);

        assert_eq!(buffer.read(), Some(1));
        buffer.consume(2);
        assert_eq!(buffer.position(), 3);
        assert_eq!(buffer.as_slice(), &[4, 5]);
        assert_eq!(buffer.remaining_frames(2), 1);

        buffer.consume(1);
        assert_eq!(buffer.read(), Some(5));
        assert_eq!(buffer.read(), None);
        assert!(!buffer.has_remaining());
    }

    #[test]
    fn write_cursor() {
        let mut samples = [0.0f32; 5];
        let mut buffer = SampleBufferMut::new(&mut samples);
        assert!(buffer.write_frame(&[1.0, 2.0]));
        assert!(buffer.write(3.0));
        assert_eq!(buffer.remaining_frames(2), 1);
        assert!(!buffer.write_frame(&[4.0, 5.0, 6.0]));
        assert_eq!(buffer.write_slice(&[4.0, 5.0, 6.0]), 2);
        assert!(!buffer.write(7.0));
        assert_eq!(buffer.written(), &[1.0, 2.0, 3.0, 4.0, 5.0]);
        assert_eq!(buffer.remaining(), 0);
    }
}
