//! Rolling mono sample window

/// Fixed-capacity circular buffer of mono samples
///
/// The write cursor advances one slot per frame. Reads copy the most recent
/// samples out in chronological order and never consume them.
#[derive(Debug, Clone)]
pub struct RollingSampleWindow {
    buffer: Vec<f32>,
    write_pos: usize,
    total_written: u64,
    generation: u64,
}

impl RollingSampleWindow {
    /// Create a silent window holding `capacity` samples (at least one)
    pub fn new(capacity: usize) -> Self {
        Self {
            buffer: vec![0.0; capacity.max(1)],
            write_pos: 0,
            total_written: 0,
            generation: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    /// Samples appended since creation or the last [`clear`](Self::clear)
    pub fn total_written(&self) -> u64 {
        self.total_written
    }

    /// Bumped by every [`clear`](Self::clear) and [`resize`](Self::resize)
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Append one mono sample
    #[inline]
    pub fn push(&mut self, sample: f32) {
        self.buffer[self.write_pos] = sample;
        self.write_pos = (self.write_pos + 1) % self.buffer.len();
        self.total_written += 1;
    }

    /// Append mono samples
    pub fn push_mono(&mut self, samples: &[f32]) {
        for &sample in samples {
            self.push(sample);
        }
    }

    /// Mix interleaved frames down to mono (channel average) and append
    ///
    /// A trailing partial frame is dropped.
    pub fn push_interleaved(&mut self, samples: &[f32], channels: usize) {
        if channels == 0 {
            return;
        }
        let scale = 1.0 / channels as f32;
        for frame in samples.chunks_exact(channels) {
            self.push(frame.iter().sum::<f32>() * scale);
        }
    }

    /// Mix planar stereo down to mono and append
    pub fn push_stereo(&mut self, left: &[f32], right: &[f32]) {
        for (&l, &r) in left.iter().zip(right) {
            self.push((l + r) * 0.5);
        }
    }

    /// Copy the newest `out.len()` samples (oldest first) into `out`
    ///
    /// If `out` is longer than the window, only the first `capacity()` slots
    /// are written. Returns the number of samples copied.
    pub fn copy_latest_into(&self, out: &mut [f64]) -> usize {
        let capacity = self.buffer.len();
        let count = out.len().min(capacity);
        let start = (self.write_pos + capacity - count) % capacity;

        for (i, slot) in out.iter_mut().take(count).enumerate() {
            *slot = self.buffer[(start + i) % capacity] as f64;
        }
        count
    }

    /// Whole window, oldest sample first
    pub fn snapshot(&self) -> Vec<f32> {
        let (newer, older) = self.buffer.split_at(self.write_pos);
        older.iter().chain(newer).copied().collect()
    }

    /// Silence the window and rewind the cursor
    pub fn clear(&mut self) {
        self.buffer.fill(0.0);
        self.write_pos = 0;
        self.total_written = 0;
        self.generation += 1;
    }

    /// Change capacity; contents are cleared
    pub fn resize(&mut self, capacity: usize) {
        self.buffer = vec![0.0; capacity.max(1)];
        self.write_pos = 0;
        self.total_written = 0;
        self.generation += 1;
    }
}
