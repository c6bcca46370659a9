//! Service ports: traits + data contracts.

pub mod file;
pub mod settings;

pub use file::{FileError, FileProvider, Result as FileResult};
pub use settings::Settings;
