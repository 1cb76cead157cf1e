use std::path::PathBuf;
use thiserror::Error;
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("i/o error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed header {path} (line {line}): {reason}")]
    Header {
        path: PathBuf,
        line: usize,
        reason: String,
    },
    #[error("unsupported record layout in {record}: {reason}")]
    Unsupported { record: String, reason: String },
    #[error("signal file {path} holds {actual} frames, header declares {expected}")]
    Truncated {
        path: PathBuf,
        expected: usize,
        actual: usize,
    },
    #[error("sample rate must be greater than zero")]
    InvalidSampleRate,
    #[error("record {record} has {available} channels, column {column} requested")]
    ChannelMissing {
        record: String,
        column: usize,
        available: usize,
    },
    #[error("failed to render plot: {0}")]
    Plot(String),
}
impl ExportError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ExportError::Io {
            path: path.into(),
            source,
        }
    }
}
impl<E: std::error::Error + Send + Sync + 'static> From<plotters::drawing::DrawingAreaErrorKind<E>>
    for ExportError
{
    fn from(value: plotters::drawing::DrawingAreaErrorKind<E>) -> Self {
        ExportError::Plot(format!("{value:?}"))
    }
}
impl From<image::ImageError> for ExportError {
    fn from(value: image::ImageError) -> Self {
        ExportError::Plot(value.to_string())
    }
}
