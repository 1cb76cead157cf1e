use std::time::Duration;
use ndarray::{s, Array2, ArrayView1};
use serde::{Serialize, Serializer};
use crate::drivers::ExportError;
/// Fixed column layout shared by every record in the data set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Channel {
    Ecg0,
    Ecg1,
    Sensor0,
    Sensor1,
    Emg0,
    Emg1,
    Accelerometer0,
    Accelerometer1,
}
impl Channel {
    #[cfg(test)]
    pub const ALL: [Channel; 8] = [
        Channel::Ecg0,
        Channel::Ecg1,
        Channel::Sensor0,
        Channel::Sensor1,
        Channel::Emg0,
        Channel::Emg1,
        Channel::Accelerometer0,
        Channel::Accelerometer1,
    ];
    /// Column of this channel in the sample matrix.
    pub fn column(self) -> usize {
        self as usize
    }
    pub fn label(self) -> &'static str {
        match self {
            Channel::Ecg0 => "ecg_0",
            Channel::Ecg1 => "ecg_1",
            Channel::Sensor0 => "sensor_0",
            Channel::Sensor1 => "sensor_1",
            Channel::Emg0 => "emg_0",
            Channel::Emg1 => "emg_1",
            Channel::Accelerometer0 => "accelerometer_0",
            Channel::Accelerometer1 => "accelerometer_1",
        }
    }
}
impl Serialize for Channel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}
/// One loaded recording: sampling rate plus a time x channel matrix of physical values.
#[derive(Clone, Debug)]
pub struct Record {
    pub name: String,
    pub sample_rate_hz: f64,
    pub samples: Array2<f32>, // time x channels
}
impl Record {
    pub fn num_samples(&self) -> usize {
        self.samples.nrows()
    }
    pub fn num_channels(&self) -> usize {
        self.samples.ncols()
    }
    pub fn duration(&self) -> Option<Duration> {
        if self.sample_rate_hz <= 0.0 {
            return None;
        }
        Some(Duration::from_secs_f64(
            self.num_samples() as f64 / self.sample_rate_hz,
        ))
    }
    pub fn channel(&self, channel: Channel) -> Result<ArrayView1<'_, f32>, ExportError> {
        let column = channel.column();
        if column >= self.num_channels() {
            return Err(ExportError::ChannelMissing {
                record: self.name.clone(),
                column,
                available: self.num_channels(),
            });
        }
        Ok(self.samples.column(column))
    }
    /// Samples `start..end` of one channel; `end` is clamped to the record length.
    pub fn channel_range(
        &self,
        channel: Channel,
        start: usize,
        end: usize,
    ) -> Result<ArrayView1<'_, f32>, ExportError> {
        let column = self.channel(channel)?;
        let end = end.min(column.len());
        let start = start.min(end);
        Ok(column.slice_move(s![start..end]))
    }
}
/// Anything that can load a record by its base name.
pub trait RecordReader {
    fn read_record(&mut self, name: &str) -> Result<Record, ExportError>;
}
/// In-memory reader for tests.
#[cfg(test)]
#[derive(Default)]
pub struct MemoryReader {
    records: std::collections::HashMap<String, Record>,
}
#[cfg(test)]
impl MemoryReader {
    pub fn new(records: impl IntoIterator<Item = Record>) -> Self {
        Self {
            records: records.into_iter().map(|r| (r.name.clone(), r)).collect(),
        }
    }
}
#[cfg(test)]
impl RecordReader for MemoryReader {
    fn read_record(&mut self, name: &str) -> Result<Record, ExportError> {
        self.records
            .get(name)
            .cloned()
            .ok_or_else(|| {
                ExportError::io(
                    name,
                    std::io::Error::new(std::io::ErrorKind::NotFound, "record not loaded"),
                )
            })
    }
}
#[cfg(test)]
mod tests {
    use super::*;
    fn ramp_record(rows: usize, cols: usize) -> Record {
        Record {
            name: "r1".into(),
            sample_rate_hz: 100.0,
            samples: Array2::from_shape_fn((rows, cols), |(t, c)| (t * 10 + c) as f32),
        }
    }
    #[test]
    fn channel_columns_follow_fixed_order() {
        let labels: Vec<_> = Channel::ALL.iter().map(|c| c.label()).collect();
        assert_eq!(labels[0], "ecg_0");
        assert_eq!(labels[7], "accelerometer_1");
        assert_eq!(Channel::Emg1.column(), 5);
    }
    #[test]
    fn channel_range_slices_one_column() {
        let record = ramp_record(20, 8);
        let view = record.channel_range(Channel::Ecg1, 3, 6).unwrap();
        assert_eq!(view.to_vec(), vec![31.0, 41.0, 51.0]);
        let clamped = record.channel_range(Channel::Ecg0, 18, 40).unwrap();
        assert_eq!(clamped.len(), 2);
    }
    #[test]
    fn missing_column_is_an_error() {
        let record = ramp_record(10, 2);
        let err = record.channel(Channel::Sensor0).unwrap_err();
        assert!(matches!(
            err,
            ExportError::ChannelMissing {
                column: 2,
                available: 2,
                ..
            }
        ));
    }
    #[test]
    fn duration_uses_sample_rate() {
        let record = ramp_record(250, 8);
        assert_eq!(record.duration(), Some(Duration::from_millis(2500)));
    }
    #[test]
    fn memory_reader_returns_clone_or_not_found() {
        let mut reader = MemoryReader::new(vec![ramp_record(5, 8)]);
        assert_eq!(reader.read_record("r1").unwrap().num_samples(), 5);
        assert!(matches!(
            reader.read_record("nope"),
            Err(ExportError::Io { .. })
        ));
    }
}
