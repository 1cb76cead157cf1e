use std::fs;
use std::path::{Path, PathBuf};
use log::debug;
use crate::drivers::ExportError;
/// Destination for encoded PNG images, addressed by relative file name.
pub trait ImageSink {
    fn save(&mut self, file_name: &str, png: &[u8]) -> Result<(), ExportError>;
}
/// Writes images below a root directory.
pub struct DirectorySink {
    root: PathBuf,
}
impl DirectorySink {
    pub fn create(root: impl Into<PathBuf>) -> Result<Self, ExportError> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|e| ExportError::io(&root, e))?;
        Ok(Self { root })
    }
    pub fn root(&self) -> &Path {
        &self.root
    }
}
impl ImageSink for DirectorySink {
    fn save(&mut self, file_name: &str, png: &[u8]) -> Result<(), ExportError> {
        let path = self.root.join(file_name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ExportError::io(parent, e))?;
        }
        fs::write(&path, png).map_err(|e| ExportError::io(&path, e))?;
        debug!("saved {}", path.display());
        Ok(())
    }
}
/// Keeps every saved image in memory, in save order.
#[cfg(test)]
#[derive(Default)]
pub struct MemorySink {
    pub images: Vec<(String, Vec<u8>)>,
}
#[cfg(test)]
impl MemorySink {
    pub fn file_names(&self) -> Vec<&str> {
        self.images.iter().map(|(name, _)| name.as_str()).collect()
    }
}
#[cfg(test)]
impl ImageSink for MemorySink {
    fn save(&mut self, file_name: &str, png: &[u8]) -> Result<(), ExportError> {
        self.images.push((file_name.to_string(), png.to_vec()));
        Ok(())
    }
}
