// src/config.rs
use std::path::PathBuf;
use anyhow::{bail, Result};
use serde::Serialize;
use crate::drivers::ExportSettings;
pub const DEFAULT_SOURCE_DIR: &str = "formatted_data";
pub const DEFAULT_OUTPUT_DIR: &str = "ten_sec_ECGS";
pub const USAGE: &str = "usage: ecg-segments [SOURCE_DIR] [OUTPUT_DIR]";
/// Everything one run needs: where records live, where images go, and the fixed
/// export constants.
#[derive(Clone, Debug, Serialize)]
pub struct RunConfig {
    pub source_dir: PathBuf,
    pub output_dir: PathBuf,
    pub export: ExportSettings,
}
impl Default for RunConfig {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::from(DEFAULT_SOURCE_DIR),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            export: ExportSettings::default(),
        }
    }
}
impl RunConfig {
    /// Builds the config from positional arguments (program name already stripped).
    pub fn from_args<I>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = String>,
    {
        let mut config = Self::default();
        let mut args = args.into_iter();
        if let Some(source) = args.next() {
            if source.starts_with('-') {
                bail!("unexpected option {source:?}\n{USAGE}");
            }
            config.source_dir = PathBuf::from(source);
        }
        if let Some(output) = args.next() {
            config.output_dir = PathBuf::from(output);
        }
        if let Some(extra) = args.next() {
            bail!("unexpected argument {extra:?}\n{USAGE}");
        }
        Ok(config)
    }
}
