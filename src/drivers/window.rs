use std::ops::Range;
use crate::drivers::ExportError;
/// Fixed-length slice of the time axis, in seconds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimeWindow {
    pub seconds: f64,
}
impl TimeWindow {
    pub fn new(seconds: f64) -> Self {
        Self { seconds }
    }
    /// Window length in samples, rounded to the nearest sample.
    pub fn samples(&self, sample_rate_hz: f64) -> Result<usize, ExportError> {
        if sample_rate_hz <= 0.0 || !sample_rate_hz.is_finite() {
            return Err(ExportError::InvalidSampleRate);
        }
        let len = (self.seconds * sample_rate_hz).round() as usize;
        if len == 0 {
            return Err(ExportError::InvalidSampleRate);
        }
        Ok(len)
    }
}
impl Default for TimeWindow {
    fn default() -> Self {
        TimeWindow { seconds: 10.0 }
    }
}
/// One exported segment; `index` starts at 1.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Segment {
    pub index: usize,
    pub range: Range<usize>,
}
/// Boundaries of the complete windows of a record, capped at `max_windows`.
#[derive(Clone, Debug)]
pub struct WindowPlan {
    window_len: usize,
    boundaries: Vec<usize>,
}
impl WindowPlan {
    pub fn new(
        total_samples: usize,
        sample_rate_hz: f64,
        window: TimeWindow,
        max_windows: usize,
    ) -> Result<Self, ExportError> {
        let window_len = window.samples(sample_rate_hz)?;
        let count = (total_samples / window_len).min(max_windows);
        let boundaries = (0..=count).map(|i| i * window_len).collect();
        Ok(Self {
            window_len,
            boundaries,
        })
    }
    pub fn window_len(&self) -> usize {
        self.window_len
    }
    pub fn boundaries(&self) -> &[usize] {
        &self.boundaries
    }
    pub fn window_count(&self) -> usize {
        self.boundaries.len() - 1
    }
    pub fn segments(&self) -> impl Iterator<Item = Segment> + '_ {
        self.boundaries
            .windows(2)
            .enumerate()
            .map(|(i, pair)| Segment {
                index: i + 1,
                range: pair[0]..pair[1],
            })
    }
}
/// Fractional number of windows in a record, as reported in progress output.
pub fn interval_count(total_samples: usize, sample_rate_hz: f64, window: TimeWindow) -> f64 {
    total_samples as f64 / sample_rate_hz / window.seconds
}
