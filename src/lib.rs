//! esnpad - plain text document core
//!
//! Module layout:
//! - kernel: encoding detection/conversion, find, document state, services
//! - models: text buffer (UTF-16 code units)

pub mod kernel;
pub mod models;
