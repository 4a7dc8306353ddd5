//! Shared helpers

pub mod color;

pub use color::ColorParser;
