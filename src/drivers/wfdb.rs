//! Minimal reader for single-segment WFDB records (`<name>.hea` plus its signal files).
//!
//! Supported storage formats: 16, 61, 80 and 212. Each sample is converted to
//! physical units as `(digital - baseline) / gain`; the format's "invalid sample"
//! sentinel becomes `NaN`.
use std::fs;
use std::path::{Path, PathBuf};
use log::debug;
use ndarray::Array2;
use crate::drivers::record::{Record, RecordReader};
use crate::drivers::ExportError;
/// WFDB default when the header omits the sampling frequency.
pub const DEFAULT_SAMPLE_RATE_HZ: f64 = 250.0;
/// WFDB default ADC gain (adu per physical unit) when the header gives none or zero.
pub const DEFAULT_GAIN: f64 = 200.0;
#[derive(Clone, Debug, PartialEq)]
pub struct SignalSpec {
    pub file_name: String,
    pub format: u16,
    pub byte_offset: u64,
    pub gain: f64,
    pub baseline: i32,
    pub units: String,
    pub description: String,
}
#[derive(Clone, Debug, PartialEq)]
pub struct Header {
    pub record_name: String,
    pub sample_rate_hz: f64,
    pub num_samples: Option<usize>,
    pub signals: Vec<SignalSpec>,
}
/// Parses the text of a `.hea` file. `path` is only used for error reporting.
pub fn parse_header(text: &str, path: &Path) -> Result<Header, ExportError> {
    let err = |line: usize, reason: String| ExportError::Header {
        path: path.to_path_buf(),
        line,
        reason,
    };
    let mut lines = text
        .lines()
        .enumerate()
        .map(|(i, l)| (i + 1, l.trim()))
        .filter(|(_, l)| !l.is_empty() && !l.starts_with('#'));
    let (record_line_no, record_line) = lines
        .next()
        .ok_or_else(|| err(0, "no record line".into()))?;
    let fields: Vec<&str> = record_line.split_whitespace().collect();
    if fields.len() < 2 {
        return Err(err(record_line_no, "record line needs a name and a signal count".into()));
    }
    if fields[0].contains('/') {
        return Err(ExportError::Unsupported {
            record: fields[0].to_string(),
            reason: "multi-segment records are not supported".into(),
        });
    }
    let record_name = fields[0].to_string();
    let num_signals: usize = fields[1]
        .parse()
        .map_err(|_| err(record_line_no, format!("bad signal count {:?}", fields[1])))?;
    let sample_rate_hz = match fields.get(2) {
        Some(&raw) => {
            // "360/2(0)": counter frequency and base counter value are not needed here.
            let fs = raw.split(['/', '(']).next().unwrap_or(raw);
            fs.parse::<f64>()
                .map_err(|_| err(record_line_no, format!("bad sampling frequency {raw:?}")))?
        }
        None => DEFAULT_SAMPLE_RATE_HZ,
    };
    if sample_rate_hz <= 0.0 {
        return Err(ExportError::InvalidSampleRate);
    }
    let num_samples = match fields.get(3) {
        Some(raw) => Some(
            raw.parse::<usize>()
                .map_err(|_| err(record_line_no, format!("bad sample count {raw:?}")))?,
        ),
        None => None,
    };
    let mut signals = Vec::with_capacity(num_signals);
    for (line_no, line) in lines.take(num_signals) {
        signals.push(parse_signal_line(line).map_err(|reason| err(line_no, reason))?);
    }
    if signals.len() != num_signals {
        return Err(err(
            record_line_no,
            format!("declares {num_signals} signals, found {}", signals.len()),
        ));
    }
    Ok(Header {
        record_name,
        sample_rate_hz,
        num_samples,
        signals,
    })
}
fn parse_signal_line(line: &str) -> Result<SignalSpec, String> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() < 2 {
        return Err("signal line needs a file name and a format".into());
    }
    let (format, samples_per_frame, skew, byte_offset) = parse_format_field(fields[1])?;
    if samples_per_frame != 1 {
        return Err(format!("samples per frame {samples_per_frame} is not supported"));
    }
    if skew != 0 {
        return Err(format!("skew {skew} is not supported"));
    }
    let (gain, explicit_baseline, units) = match fields.get(2) {
        Some(raw) => parse_gain_field(raw)?,
        None => (0.0, None, String::new()),
    };
    let adc_zero = match fields.get(4) {
        Some(raw) => raw
            .parse::<i32>()
            .map_err(|_| format!("bad adc zero {raw:?}"))?,
        None => 0,
    };
    Ok(SignalSpec {
        file_name: fields[0].to_string(),
        format,
        byte_offset,
        gain: if gain == 0.0 { DEFAULT_GAIN } else { gain },
        baseline: explicit_baseline.unwrap_or(adc_zero),
        units,
        description: fields.get(8..).map(|d| d.join(" ")).unwrap_or_default(),
    })
}
/// `format[xN][:skew][+offset]`
fn parse_format_field(raw: &str) -> Result<(u16, usize, u64, u64), String> {
    let digits_end = |s: &str| s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    let end = digits_end(raw);
    let format = raw[..end]
        .parse::<u16>()
        .map_err(|_| format!("bad storage format {raw:?}"))?;
    let mut samples_per_frame = 1usize;
    let mut skew = 0u64;
    let mut byte_offset = 0u64;
    let mut rest = &raw[end..];
    while let Some(tag) = rest.chars().next() {
        let body = &rest[tag.len_utf8()..];
        let end = digits_end(body);
        let value = &body[..end];
        let bad = || format!("bad format modifier {raw:?}");
        match tag {
            'x' => samples_per_frame = value.parse().map_err(|_| bad())?,
            ':' => skew = value.parse().map_err(|_| bad())?,
            '+' => byte_offset = value.parse().map_err(|_| bad())?,
            _ => return Err(bad()),
        }
        rest = &body[end..];
    }
    Ok((format, samples_per_frame, skew, byte_offset))
}
/// `gain[(baseline)][/units]`
fn parse_gain_field(raw: &str) -> Result<(f64, Option<i32>, String), String> {
    let (value, units) = match raw.split_once('/') {
        Some((v, u)) => (v, u.to_string()),
        None => (raw, String::new()),
    };
    let (gain, baseline) = match value.split_once('(') {
        Some((g, b)) => {
            let b = b.trim_end_matches(')');
            let baseline = b.parse::<i32>().map_err(|_| format!("bad baseline {raw:?}"))?;
            (g, Some(baseline))
        }
        None => (value, None),
    };
    let gain = gain.parse::<f64>().map_err(|_| format!("bad gain {raw:?}"))?;
    Ok((gain, baseline, units))
}
/// Decodes raw bytes of one storage format into digital sample values.
pub fn decode_samples(format: u16, bytes: &[u8]) -> Option<Vec<i32>> {
    let samples = match format {
        16 => bytes
            .chunks_exact(2)
            .map(|b| i16::from_le_bytes([b[0], b[1]]) as i32)
            .collect(),
        61 => bytes
            .chunks_exact(2)
            .map(|b| i16::from_be_bytes([b[0], b[1]]) as i32)
            .collect(),
        80 => bytes.iter().map(|&b| b as i32 - 128).collect(),
        212 => {
            let mut out = Vec::with_capacity(bytes.len() / 3 * 2);
            for b in bytes.chunks_exact(3) {
                let first = b[0] as i32 | ((b[1] as i32 & 0x0f) << 8);
                let second = b[2] as i32 | ((b[1] as i32 & 0xf0) << 4);
                out.push(sign_extend_12(first));
                out.push(sign_extend_12(second));
            }
            out
        }
        _ => return None,
    };
    Some(samples)
}
fn sign_extend_12(v: i32) -> i32 {
    if v > 0x7ff {
        v - 0x1000
    } else {
        v
    }
}
fn invalid_sentinel(format: u16) -> i32 {
    match format {
        80 => -128,
        212 => -2048,
        _ => -32768,
    }
}
/// Reads records from a directory holding WFDB header and signal files.
pub struct WfdbReader {
    dir: PathBuf,
}
impl WfdbReader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
    pub fn dir(&self) -> &Path {
        &self.dir
    }
    fn load(&self, name: &str) -> Result<Record, ExportError> {
        let header_path = self.dir.join(format!("{name}.hea"));
        let text =
            fs::read_to_string(&header_path).map_err(|e| ExportError::io(&header_path, e))?;
        let header = parse_header(&text, &header_path)?;
        debug!(
            "{name} (header name {}): {} signals at {} Hz",
            header.record_name,
            header.signals.len(),
            header.sample_rate_hz
        );
        for spec in &header.signals {
            debug!("  {} [{}] format {}", spec.description, spec.units, spec.format);
        }
        let samples = self.read_signals(&header)?;
        // Output files are named after the listed file, not the header's record line.
        Ok(Record {
            name: name.to_string(),
            sample_rate_hz: header.sample_rate_hz,
            samples,
        })
    }
    fn read_signals(&self, header: &Header) -> Result<Array2<f32>, ExportError> {
        if header.signals.is_empty() {
            return Err(ExportError::Unsupported {
                record: header.record_name.clone(),
                reason: "record has no signals".into(),
            });
        }
        // Signals sharing a file are frame-interleaved in header order.
        let mut groups: Vec<(&str, Vec<usize>)> = Vec::new();
        for (idx, spec) in header.signals.iter().enumerate() {
            match groups.iter().position(|(f, _)| *f == spec.file_name) {
                Some(pos) => groups[pos].1.push(idx),
                None => groups.push((spec.file_name.as_str(), vec![idx])),
            }
        }
        let mut decoded = Vec::with_capacity(groups.len());
        for (file_name, members) in &groups {
            let first = &header.signals[members[0]];
            if members.iter().any(|&m| {
                header.signals[m].format != first.format
                    || header.signals[m].byte_offset != first.byte_offset
            }) {
                return Err(ExportError::Unsupported {
                    record: header.record_name.clone(),
                    reason: format!("mixed formats within {file_name}"),
                });
            }
            let path = self.dir.join(file_name);
            let bytes = fs::read(&path).map_err(|e| ExportError::io(&path, e))?;
            let start = (first.byte_offset as usize).min(bytes.len());
            let digital = decode_samples(first.format, &bytes[start..]).ok_or_else(|| {
                ExportError::Unsupported {
                    record: header.record_name.clone(),
                    reason: format!("storage format {}", first.format),
                }
            })?;
            let frames = digital.len() / members.len();
            decoded.push((path, members, first.format, digital, frames));
        }
        let available = decoded.iter().map(|d| d.4).min().unwrap_or(0);
        let num_samples = match header.num_samples {
            Some(n) => {
                if let Some((path, _, _, _, frames)) = decoded.iter().find(|d| d.4 < n) {
                    return Err(ExportError::Truncated {
                        path: path.clone(),
                        expected: n,
                        actual: *frames,
                    });
                }
                n
            }
            None => available,
        };
        let mut samples = Array2::<f32>::zeros((num_samples, header.signals.len()));
        for (_, members, format, digital, _) in &decoded {
            let sentinel = invalid_sentinel(*format);
            let width = members.len();
            for (slot, &signal) in members.iter().enumerate() {
                let spec = &header.signals[signal];
                let mut column = samples.column_mut(signal);
                for (frame, value) in column.iter_mut().enumerate() {
                    let raw = digital[frame * width + slot];
                    *value = if raw == sentinel {
                        f32::NAN
                    } else {
                        ((raw as f64 - spec.baseline as f64) / spec.gain) as f32
                    };
                }
            }
        }
        Ok(samples)
    }
}
impl RecordReader for WfdbReader {
    fn read_record(&mut self, name: &str) -> Result<Record, ExportError> {
        self.load(name)
    }
}
