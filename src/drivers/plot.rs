use std::io::Cursor;
use std::ops::Range;
use image::{DynamicImage, ImageBuffer, ImageFormat, Rgb};
use ndarray::ArrayView1;
use plotters::coord::Shift;
use plotters::prelude::LineSeries;
use plotters::prelude::*;
use crate::drivers::error::ExportError;
use crate::drivers::record::{Channel, Record};
use crate::drivers::window::TimeWindow;
#[derive(Clone, Debug)]
pub struct PlotStyle {
    pub width: u32,
    pub height: u32,
    pub background: RGBColor,
    pub foreground: RGBColor,
    pub palette: Vec<RGBColor>,
}
impl Default for PlotStyle {
    fn default() -> Self {
        Self {
            width: 1000,
            height: 400,
            background: WHITE,
            foreground: BLACK,
            palette: vec![BLUE, RED, GREEN, MAGENTA, CYAN],
        }
    }
}
impl PlotStyle {
    /// Wide canvas for the 2x2 quick-look grid.
    pub fn preview() -> Self {
        Self {
            width: 1800,
            height: 600,
            ..Self::default()
        }
    }
}
/// Plots one channel segment against time in seconds from record start.
pub fn render_segment_png(
    samples: ArrayView1<'_, f32>,
    start_sample: usize,
    sample_rate_hz: f64,
    caption: &str,
    style: &PlotStyle,
) -> Result<Vec<u8>, ExportError> {
    if samples.is_empty() {
        return Err(ExportError::Plot("segment has no samples".into()));
    }
    let x_range = time_range(start_sample, samples.len(), sample_rate_hz);
    let mut buffer = vec![0u8; (style.width * style.height * 3) as usize];
    {
        let root = BitMapBackend::with_buffer(&mut buffer, (style.width, style.height))
            .into_drawing_area();
        root.fill(&style.background)?;
        draw_trace(
            &root,
            caption,
            &samples,
            start_sample,
            sample_rate_hz,
            x_range,
            style.palette[0],
            style,
        )?;
        root.present()?;
    }
    encode_png(&buffer, style.width, style.height)
}
/// Quick-look grid: the first window of each channel, one panel per channel, titled with
/// the record name. Channels beyond four are ignored.
pub fn render_preview_png(
    record: &Record,
    channels: &[Channel],
    window: TimeWindow,
    style: &PlotStyle,
) -> Result<Vec<u8>, ExportError> {
    let len = window.samples(record.sample_rate_hz)?;
    let mut buffer = vec![0u8; (style.width * style.height * 3) as usize];
    {
        let root = BitMapBackend::with_buffer(&mut buffer, (style.width, style.height))
            .into_drawing_area();
        root.fill(&style.background)?;
        let panels = root.split_evenly((2, 2));
        for (idx, (panel, channel)) in panels.iter().zip(channels).enumerate() {
            let samples = record.channel_range(*channel, 0, len)?;
            let color = style.palette[idx % style.palette.len()];
            draw_trace(
                panel,
                &record.name,
                &samples,
                0,
                record.sample_rate_hz,
                time_range(0, len, record.sample_rate_hz),
                color,
                style,
            )?;
        }
        root.present()?;
    }
    encode_png(&buffer, style.width, style.height)
}
fn time_range(start_sample: usize, len: usize, sample_rate_hz: f64) -> Range<f32> {
    let start = (start_sample as f64 / sample_rate_hz) as f32;
    let end = ((start_sample + len) as f64 / sample_rate_hz) as f32;
    start..end
}
/// Y bounds over the finite samples, padded so a flat line stays visible.
fn value_bounds(samples: &ArrayView1<'_, f32>) -> (f32, f32) {
    let (min, max) = samples
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold((f32::MAX, f32::MIN), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if min > max {
        return (-1.0, 1.0);
    }
    let pad = ((max - min) * 0.05).max(1e-3);
    (min - pad, max + pad)
}
#[allow(clippy::too_many_arguments)]
fn draw_trace(
    area: &DrawingArea<BitMapBackend<'_>, Shift>,
    caption: &str,
    samples: &ArrayView1<'_, f32>,
    start_sample: usize,
    sample_rate_hz: f64,
    x_range: Range<f32>,
    color: RGBColor,
    style: &PlotStyle,
) -> Result<(), ExportError> {
    let (y_min, y_max) = value_bounds(samples);
    let mut chart = ChartBuilder::on(area)
        .margin(10)
        .caption(caption, ("sans-serif", 20).into_font().color(&style.foreground))
        .set_label_area_size(LabelAreaPosition::Left, 55)
        .set_label_area_size(LabelAreaPosition::Bottom, 40)
        .build_cartesian_2d(x_range, y_min..y_max)?;
    chart
        .configure_mesh()
        .x_desc("Time (s)")
        .axis_desc_style(("sans-serif", 15).into_font().color(&style.foreground))
        .label_style(("sans-serif", 12).into_font().color(&style.foreground))
        .light_line_style(&style.foreground.mix(0.08))
        .draw()?;
    // NaN marks invalid samples; they are left out of the trace.
    let series = samples
        .iter()
        .enumerate()
        .filter(|(_, v)| v.is_finite())
        .map(|(i, v)| (((start_sample + i) as f64 / sample_rate_hz) as f32, *v));
    chart.draw_series(LineSeries::new(series, &color))?;
    Ok(())
}
fn encode_png(buffer: &[u8], width: u32, height: u32) -> Result<Vec<u8>, ExportError> {
    let image = ImageBuffer::<Rgb<u8>, _>::from_raw(width, height, buffer.to_vec())
        .ok_or_else(|| ExportError::Plot("failed to allocate image buffer".into()))?;
    let mut output = Vec::new();
    let dynamic = DynamicImage::ImageRgb8(image);
    dynamic.write_to(&mut Cursor::new(&mut output), ImageFormat::Png)?;
    Ok(output)
}
