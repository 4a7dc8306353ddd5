//! Shared image services

pub mod io;

pub use io::ImageIOService;
