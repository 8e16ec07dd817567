//! In-memory audio addressed by millisecond offset.

/// A fully decoded audio track: interleaved `f32` samples in `[-1.0, 1.0]`.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    pub sample_rate: u32,
    pub channels: u16,
    pub samples: Vec<f32>,
}

/// One `[start_ms, end_ms)` window cut out of an [`AudioBuffer`].
pub type AudioClip = AudioBuffer;

impl AudioBuffer {
    pub fn new(sample_rate: u32, channels: u16, samples: Vec<f32>) -> Self {
        Self {
            sample_rate,
            channels,
            samples,
        }
    }

    /// Number of sample frames (one sample per channel).
    pub fn frames(&self) -> usize {
        match self.channels {
            0 => 0,
            c => self.samples.len() / c as usize,
        }
    }

    pub fn duration_ms(&self) -> u64 {
        if self.sample_rate == 0 {
            return 0;
        }
        self.frames() as u64 * 1_000 / self.sample_rate as u64
    }

    /// Copy out the frames covering `[start_ms, end_ms)`.
    ///
    /// Both bounds are clamped to the buffer, so a window running past the end
    /// is shortened and a window starting past the end is empty.
    pub fn slice_ms(&self, start_ms: u64, end_ms: u64) -> AudioClip {
        let frames = self.frames();
        let start = self.ms_to_frame(start_ms).min(frames);
        let end = self.ms_to_frame(end_ms).clamp(start, frames);

        let ch = self.channels as usize;
        Self::new(
            self.sample_rate,
            self.channels,
            self.samples[start * ch..end * ch].to_vec(),
        )
    }

    fn ms_to_frame(&self, ms: u64) -> usize {
        let frame = ms as u128 * self.sample_rate as u128 / 1_000;
        usize::try_from(frame).unwrap_or(usize::MAX)
    }

    /// Average all channels into one (equal weights).
    pub fn into_mono(self) -> Self {
        if self.channels <= 1 {
            return self;
        }

        let ch = self.channels as usize;
        let mono = self
            .samples
            .chunks_exact(ch)
            .map(|frame| frame.iter().sum::<f32>() / ch as f32)
            .collect();

        Self::new(self.sample_rate, 1, mono)
    }
}
