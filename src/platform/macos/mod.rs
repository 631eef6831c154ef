//! Native source images backed by Core Video pixel buffers.

pub mod fourcc;
pub mod image;

pub use image::{MacosSourceImage, MacosTimestamp};
