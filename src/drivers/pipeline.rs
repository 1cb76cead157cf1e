use std::collections::BTreeSet;
use log::{debug, info, warn};
use ndarray::ArrayView1;
use serde::Serialize;
use crate::drivers::error::ExportError;
use crate::drivers::plot::{render_preview_png, render_segment_png, PlotStyle};
use crate::drivers::record::{Channel, Record, RecordReader};
use crate::drivers::sink::ImageSink;
use crate::drivers::window::{interval_count, Segment, TimeWindow, WindowPlan};
/// Constants that shape one export run.
#[derive(Clone, Debug, Serialize)]
pub struct ExportSettings {
    pub window_seconds: f64,
    pub max_windows: usize,
    pub preview_channels: Vec<Channel>,
    pub export_channels: Vec<Channel>,
}
impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            window_seconds: 10.0,
            max_windows: 300,
            preview_channels: vec![
                Channel::Ecg0,
                Channel::Ecg1,
                Channel::Sensor0,
                Channel::Sensor1,
            ],
            export_channels: vec![Channel::Ecg0, Channel::Ecg1],
        }
    }
}
impl ExportSettings {
    pub fn time_window(&self) -> TimeWindow {
        TimeWindow::new(self.window_seconds)
    }
}
#[derive(Clone, Debug, Serialize)]
pub struct ChannelSummary {
    pub channel: Channel,
    pub segments: usize,
}
#[derive(Clone, Debug, Default, Serialize)]
pub struct RunSummary {
    pub records: usize,
    pub previews: usize,
    pub channels: Vec<ChannelSummary>,
}
impl RunSummary {
    pub fn total_segments(&self) -> usize {
        self.channels.iter().map(|c| c.segments).sum()
    }
}
/// `<record>_signal<k>_<index>_plot.png`, with `k` the 1-based channel column.
pub fn segment_file_name(record: &str, channel: Channel, index: usize) -> String {
    format!("{record}_signal{}_{index}_plot.png", channel.column() + 1)
}
pub fn preview_file_name(record: &str) -> String {
    format!("preview/{record}_preview.png")
}
/// Samples of `channel` covered by one segment.
pub fn segment_samples<'a>(
    record: &'a Record,
    channel: Channel,
    segment: &Segment,
) -> Result<ArrayView1<'a, f32>, ExportError> {
    record.channel_range(channel, segment.range.start, segment.range.end)
}
/// Preview pass followed by one segment export pass per channel. Every pass reloads
/// each record from the reader.
pub struct QuickLook<R: RecordReader, S: ImageSink> {
    reader: R,
    sink: S,
    settings: ExportSettings,
    segment_style: PlotStyle,
    preview_style: PlotStyle,
}
impl<R: RecordReader, S: ImageSink> QuickLook<R, S> {
    pub fn new(reader: R, sink: S, settings: ExportSettings) -> Self {
        Self {
            reader,
            sink,
            settings,
            segment_style: PlotStyle::default(),
            preview_style: PlotStyle::preview(),
        }
    }
    pub fn with_styles(mut self, segment_style: PlotStyle, preview_style: PlotStyle) -> Self {
        self.segment_style = segment_style;
        self.preview_style = preview_style;
        self
    }
    pub fn sink(&self) -> &S {
        &self.sink
    }
    pub fn run(&mut self, names: &BTreeSet<String>) -> Result<RunSummary, ExportError> {
        let previews = self.preview_pass(names)?;
        let mut channels = Vec::with_capacity(self.settings.export_channels.len());
        for channel in self.settings.export_channels.clone() {
            let segments = self.export_pass(names, channel)?;
            channels.push(ChannelSummary { channel, segments });
        }
        Ok(RunSummary {
            records: names.len(),
            previews,
            channels,
        })
    }
    pub fn preview_pass(&mut self, names: &BTreeSet<String>) -> Result<usize, ExportError> {
        for name in names {
            info!("{name}");
            let record = self.reader.read_record(name)?;
            debug!(
                "{}: {} channels, {:?}",
                record.name,
                record.num_channels(),
                record.duration()
            );
            self.preview_record(&record)?;
        }
        Ok(names.len())
    }
    pub fn export_pass(
        &mut self,
        names: &BTreeSet<String>,
        channel: Channel,
    ) -> Result<usize, ExportError> {
        info!("exporting {} segments", channel.label());
        let mut exported = 0;
        for name in names {
            info!("{name}");
            let record = self.reader.read_record(name)?;
            exported += self.export_record(&record, channel)?;
        }
        Ok(exported)
    }
    pub fn preview_record(&mut self, record: &Record) -> Result<(), ExportError> {
        let png = render_preview_png(
            record,
            &self.settings.preview_channels,
            self.settings.time_window(),
            &self.preview_style,
        )?;
        self.sink.save(&preview_file_name(&record.name), &png)
    }
    /// Saves one image per complete window of `channel`; returns how many were written.
    pub fn export_record(
        &mut self,
        record: &Record,
        channel: Channel,
    ) -> Result<usize, ExportError> {
        let window = self.settings.time_window();
        info!(
            "How many {} second measurement intervals: {:.2}",
            window.seconds,
            interval_count(record.num_samples(), record.sample_rate_hz, window)
        );
        let plan = WindowPlan::new(
            record.num_samples(),
            record.sample_rate_hz,
            window,
            self.settings.max_windows,
        )?;
        info!("{}", plan.window_count());
        debug!("boundaries {:?}", plan.boundaries());
        if plan.window_count() == 0 {
            warn!("{} is shorter than one window", record.name);
        }
        for segment in plan.segments() {
            let samples = segment_samples(record, channel, &segment)?;
            let caption = format!("{} {} #{}", record.name, channel.label(), segment.index);
            let png = render_segment_png(
                samples,
                segment.range.start,
                record.sample_rate_hz,
                &caption,
                &self.segment_style,
            )?;
            let file_name = segment_file_name(&record.name, channel, segment.index);
            self.sink.save(&file_name, &png)?;
            debug!("{}", segment.index);
        }
        Ok(plan.window_count())
    }
}
#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivers::record::MemoryReader;
    use crate::drivers::sink::{DirectorySink, MemorySink};
    use crate::drivers::wfdb::WfdbReader;
    use ndarray::Array2;
    use tempfile::tempdir;
    fn tiny(width: u32, height: u32) -> PlotStyle {
        PlotStyle {
            width,
            height,
            ..PlotStyle::default()
        }
    }
    fn synthetic(name: &str, sample_rate_hz: f64, rows: usize, cols: usize) -> Record {
        Record {
            name: name.into(),
            sample_rate_hz,
            samples: Array2::from_shape_fn((rows, cols), |(t, c)| {
                ((t as f32) * 0.3 + c as f32).sin()
            }),
        }
    }
    fn names(list: &[&str]) -> BTreeSet<String> {
        list.iter().map(|s| s.to_string()).collect()
    }
    #[test]
    fn file_names_carry_the_channel_number() {
        assert_eq!(segment_file_name("s01", Channel::Ecg0, 1), "s01_signal1_1_plot.png");
        assert_eq!(segment_file_name("s01", Channel::Ecg1, 12), "s01_signal2_12_plot.png");
        assert_eq!(preview_file_name("s01"), "preview/s01_preview.png");
    }
    #[test]
    fn run_exports_both_channels_without_collisions() {
        let reader = MemoryReader::new(vec![
            synthetic("A", 100.0, 5000, 8),
            synthetic("B", 100.0, 2500, 8),
        ]);
        let mut quick_look =
            QuickLook::new(reader, MemorySink::default(), ExportSettings::default())
                .with_styles(tiny(320, 200), tiny(640, 400));
        let summary = quick_look.run(&names(&["A", "B"])).unwrap();
        assert_eq!(summary.records, 2);
        assert_eq!(summary.previews, 2);
        assert_eq!(summary.channels.len(), 2);
        assert_eq!(summary.channels[0].segments, 7);
        assert_eq!(summary.channels[1].segments, 7);
        assert_eq!(summary.total_segments(), 14);
        let files = quick_look.sink().file_names();
        assert_eq!(files.len(), 16);
        let unique: BTreeSet<_> = files.iter().collect();
        assert_eq!(unique.len(), files.len());
        assert!(files.contains(&"A_signal1_5_plot.png"));
        assert!(files.contains(&"A_signal2_5_plot.png"));
        assert!(!files.contains(&"A_signal1_6_plot.png"));
        assert_eq!(files[0], "preview/A_preview.png");
    }
    #[test]
    fn segments_take_their_channel_column_and_window_rows() {
        let record = Record {
            name: "cols".into(),
            sample_rate_hz: 10.0,
            samples: Array2::from_shape_fn((250, 8), |(t, c)| (c * 1000 + t) as f32),
        };
        let plan = WindowPlan::new(250, 10.0, TimeWindow::default(), 300).unwrap();
        let segments: Vec<_> = plan.segments().collect();
        assert_eq!(segments.len(), 2);
        let second = segment_samples(&record, Channel::Ecg1, &segments[1]).unwrap();
        let expected: Vec<f32> = (100..200).map(|t| (1000 + t) as f32).collect();
        assert_eq!(second.to_vec(), expected);
        let first = segment_samples(&record, Channel::Ecg0, &segments[0]).unwrap();
        assert_eq!(first[0], 0.0);
        assert_eq!(first[99], 99.0);
    }
    #[test]
    fn window_cap_limits_exported_images() {
        let reader = MemoryReader::new(vec![synthetic("long", 1.0, 3100, 8)]);
        let settings = ExportSettings {
            export_channels: vec![Channel::Ecg0],
            ..ExportSettings::default()
        };
        let mut quick_look = QuickLook::new(reader, MemorySink::default(), settings)
            .with_styles(tiny(320, 200), tiny(640, 400));
        let summary = quick_look.run(&names(&["long"])).unwrap();
        assert_eq!(summary.channels[0].segments, 300);
        assert!(quick_look.sink().file_names().contains(&"long_signal1_300_plot.png"));
    }
    #[test]
    fn short_record_exports_nothing_but_preview() {
        let reader = MemoryReader::new(vec![synthetic("tiny", 100.0, 400, 8)]);
        let mut quick_look =
            QuickLook::new(reader, MemorySink::default(), ExportSettings::default())
                .with_styles(tiny(320, 200), tiny(640, 400));
        let summary = quick_look.run(&names(&["tiny"])).unwrap();
        assert_eq!(summary.total_segments(), 0);
        assert_eq!(quick_look.sink().file_names(), vec!["preview/tiny_preview.png"]);
    }
    #[test]
    fn missing_channel_aborts_the_run() {
        let reader = MemoryReader::new(vec![synthetic("narrow", 100.0, 2000, 1)]);
        let mut quick_look =
            QuickLook::new(reader, MemorySink::default(), ExportSettings::default())
                .with_styles(tiny(320, 200), tiny(640, 400));
        let err = quick_look.run(&names(&["narrow"])).unwrap_err();
        assert!(matches!(err, ExportError::ChannelMissing { column: 1, .. }));
    }
    #[test]
    fn unknown_record_aborts_the_run() {
        let mut quick_look = QuickLook::new(
            MemoryReader::default(),
            MemorySink::default(),
            ExportSettings::default(),
        );
        assert!(quick_look.run(&names(&["ghost"])).is_err());
    }
    #[test]
    fn wfdb_directory_to_png_files() {
        let source = tempdir().unwrap();
        let output = tempdir().unwrap();
        let mut header = String::from("rec 8 10 250\n");
        for ch in Channel::ALL {
            header.push_str(&format!("rec.dat 16 100 16 0 0 0 0 {}\n", ch.label()));
        }
        std::fs::write(source.path().join("rec.hea"), header).unwrap();
        let bytes: Vec<u8> = (0..250 * 8)
            .flat_map(|i: i32| ((i % 200) as i16 - 100).to_le_bytes())
            .collect();
        std::fs::write(source.path().join("rec.dat"), bytes).unwrap();
        let names = crate::drivers::enumerate::list_record_names(source.path()).unwrap();
        assert_eq!(names.len(), 1);
        let sink = DirectorySink::create(output.path()).unwrap();
        let reader = WfdbReader::new(source.path());
        let mut quick_look = QuickLook::new(reader, sink, ExportSettings::default())
            .with_styles(tiny(320, 200), tiny(640, 400));
        let summary = quick_look.run(&names).unwrap();
        assert_eq!(summary.total_segments(), 4);
        for file in [
            "preview/rec_preview.png",
            "rec_signal1_1_plot.png",
            "rec_signal1_2_plot.png",
            "rec_signal2_1_plot.png",
            "rec_signal2_2_plot.png",
        ] {
            assert!(output.path().join(file).is_file(), "{file} missing");
        }
        assert!(!output.path().join("rec_signal1_3_plot.png").exists());
    }
}
