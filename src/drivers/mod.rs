// src/drivers/mod.rs
pub mod enumerate;
pub mod error;
pub mod pipeline;
pub mod plot;
pub mod record;
pub mod sink;
pub mod wfdb;
pub mod window;
pub use enumerate::list_record_names;
pub use error::ExportError;
pub use pipeline::{ExportSettings, QuickLook};
pub use sink::DirectorySink;
pub use wfdb::WfdbReader;
