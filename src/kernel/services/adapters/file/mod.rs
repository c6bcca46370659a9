//! File adapters

pub mod local;

pub use local::LocalFileProvider;
