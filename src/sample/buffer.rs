use std::time::Duration;

/// Decoded, immutable multichannel audio.
///
/// Channels are stored as contiguous rows in a single allocation: frame `f`
/// of channel `c` lives at `data[c * frame_count + f]`. Nothing mutates a
/// buffer once it has been built, so it can be shared with the audio thread
/// behind an `Arc`.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleBuffer {
    data: Vec<f32>,
    channel_count: usize,
    frame_count: usize,
    sample_rate: u32,
    name: String,
}

impl SampleBuffer {
    /// Build a buffer from one `Vec` per channel.
    ///
    /// Ragged input is truncated to the shortest channel so every row has the
    /// same length.
    pub fn from_channels(channels: Vec<Vec<f32>>, sample_rate: u32) -> Self {
        let channel_count = channels.len();
        let frame_count = channels.iter().map(Vec::len).min().unwrap_or(0);

        let mut data = Vec::with_capacity(channel_count * frame_count);
        for channel in &channels {
            data.extend_from_slice(&channel[..frame_count]);
        }

        Self {
            data,
            channel_count,
            frame_count,
            sample_rate,
            name: String::new(),
        }
    }

    /// Build a buffer from interleaved frames (`L R L R ...`).
    ///
    /// A trailing partial frame is discarded.
    pub fn from_interleaved(samples: &[f32], channel_count: usize, sample_rate: u32) -> Self {
        if channel_count == 0 {
            return Self::from_channels(Vec::new(), sample_rate);
        }

        let frame_count = samples.len() / channel_count;
        let mut data = vec![0.0; channel_count * frame_count];
        for (frame, chunk) in samples.chunks_exact(channel_count).enumerate() {
            for (channel, &sample) in chunk.iter().enumerate() {
                data[channel * frame_count + frame] = sample;
            }
        }

        Self {
            data,
            channel_count,
            frame_count,
            sample_rate,
            name: String::new(),
        }
    }

    /// Attach a display name (usually the file stem).
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// One channel's frames. Out-of-range channels return an empty slice.
    #[inline]
    pub fn channel(&self, index: usize) -> &[f32] {
        if index >= self.channel_count {
            return &[];
        }
        let start = index * self.frame_count;
        &self.data[start..start + self.frame_count]
    }

    pub fn channel_count(&self) -> usize {
        self.channel_count
    }

    pub fn frame_count(&self) -> usize {
        self.frame_count
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// True when there is nothing a voice could play.
    pub fn is_empty(&self) -> bool {
        self.channel_count == 0 || self.frame_count == 0
    }

    /// Length at the buffer's own sample rate.
    pub fn duration(&self) -> Duration {
        if self.sample_rate == 0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(self.frame_count as f64 / f64::from(self.sample_rate))
    }

    /// Memory held by the sample data, in bytes.
    pub fn memory_size(&self) -> usize {
        self.data.len() * std::mem::size_of::<f32>()
    }

    /// Summary for status displays.
    pub fn info(&self) -> SampleInfo {
        SampleInfo {
            name: self.name.clone(),
            channel_count: self.channel_count,
            frame_count: self.frame_count,
            sample_rate: self.sample_rate,
        }
    }
}

/// What is currently loaded, as reported to the UI layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleInfo {
    pub name: String,
    pub channel_count: usize,
    pub frame_count: usize,
    pub sample_rate: u32,
}
