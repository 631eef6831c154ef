#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "alloc")]
extern crate alloc;

pub mod convert;
pub mod error;
pub mod image;
pub mod source;
pub mod transform;
pub mod types;

#[cfg(feature = "alloc")]
pub mod owned;
#[cfg(feature = "alloc")]
pub mod texture;

#[cfg(feature = "std")]
pub mod platform;
#[cfg(feature = "std")]
pub mod view;

// Re-exports
pub use convert::{ConverterConfig, FrameConverter, YuvMatrix};
pub use error::*;
pub use image::*;
pub use source::*;
pub use transform::{Transform, cycle_transform};
pub use types::*;

#[cfg(feature = "alloc")]
pub use owned::{OwnedImage, OwnedPlane};
#[cfg(feature = "alloc")]
pub use texture::RgbaTexture;
#[cfg(feature = "std")]
pub use view::{CameraImageView, ViewConfig};
