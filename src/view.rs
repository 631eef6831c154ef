//! Frame-driven consumer that keeps a texture and its labels up to date.

use std::string::{String, ToString};
use std::sync::{Arc, Mutex};

use crate::convert::{ConverterConfig, FrameConverter};
use crate::error::ConversionError;
use crate::image::SourceImage;
use crate::source::{FrameReceived, FrameSource, SubscriptionId};
use crate::texture::RgbaTexture;
use crate::transform::Transform;
use crate::types::{ConversionRequest, DestinationFormat};

/// Settings for a [`CameraImageView`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ViewConfig {
    pub format: DestinationFormat,
    pub initial_transform: Transform,
    pub converter: ConverterConfig,
}

impl Default for ViewConfig {
    fn default() -> Self {
        ViewConfig {
            format: DestinationFormat::Rgba32,
            initial_transform: Transform::MIRROR_Y,
            converter: ConverterConfig::default(),
        }
    }
}

/// Converts every newly received frame into its texture.
///
/// A failed conversion only skips that frame: it is logged and counted, and
/// the previous texture contents stay in place.
#[derive(Debug)]
pub struct CameraImageView {
    converter: FrameConverter,
    format: DestinationFormat,
    transform: Transform,
    texture: Option<RgbaTexture>,
    info: String,
    subscription: Option<SubscriptionId>,
    frames_converted: u64,
    frames_failed: u64,
}

impl CameraImageView {
    pub fn new(config: ViewConfig) -> Self {
        CameraImageView {
            converter: FrameConverter::new(config.converter),
            format: config.format,
            transform: config.initial_transform,
            texture: None,
            info: String::new(),
            subscription: None,
            frames_converted: 0,
            frames_failed: 0,
        }
    }

    /// Subscribe `view` to frame notifications from `source`.
    ///
    /// Does nothing if the view is already enabled.
    pub fn enable<S>(view: &Arc<Mutex<Self>>, source: &mut S) -> Result<(), S::Error>
    where
        S: FrameSource + 'static,
    {
        let enabled = view.lock().map(|v| v.is_enabled()).unwrap_or(false);
        if enabled {
            return Ok(());
        }

        let target = Arc::clone(view);
        let id = source.subscribe(move |event| {
            if let Ok(mut view) = target.lock() {
                view.on_frame_received(event);
            }
        })?;
        if let Ok(mut guard) = view.lock() {
            guard.subscription = Some(id);
        }
        Ok(())
    }

    /// Stop receiving frames from `source`.
    pub fn disable<S: FrameSource>(&mut self, source: &mut S) -> Result<(), S::Error> {
        match self.subscription.take() {
            Some(id) => source.unsubscribe(id),
            None => Ok(()),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.subscription.is_some()
    }

    pub fn on_frame_received<I: SourceImage>(&mut self, event: &mut FrameReceived<'_, I>) {
        let Some(image) = event.try_acquire_latest_image() else {
            return;
        };
        // Failures are logged by `update` and only cost this frame.
        let _ = self.update(image);
    }

    /// Refresh the info label and convert `image` into the texture.
    pub fn update<I: SourceImage>(&mut self, mut image: I) -> Result<(), ConversionError> {
        self.info = image.info().to_string();

        let size = image.size();
        let format = self.format;
        let texture = self
            .texture
            .get_or_insert_with(|| RgbaTexture::new(size, format));
        texture.ensure_size(size);

        let request = ConversionRequest::for_image(&image, self.format, self.transform);
        match self.converter.convert(&mut image, &request, texture.data_mut()) {
            Ok(()) => {
                self.frames_converted += 1;
                Ok(())
            }
            Err(e) => {
                self.frames_failed += 1;
                tracing::warn!(error = %e, format = %image.pixel_format(), "skipping frame");
                Err(e)
            }
        }
    }

    /// Advance to the next transform and return it.
    pub fn cycle_transform(&mut self) -> Transform {
        self.transform = self.transform.next();
        tracing::debug!(transform = %self.transform, "transform changed");
        self.transform
    }

    pub fn transform(&self) -> Transform {
        self.transform
    }

    /// Button label for the active transform.
    pub fn transform_label(&self) -> String {
        self.transform.to_string()
    }

    pub fn info_label(&self) -> &str {
        &self.info
    }

    pub fn texture(&self) -> Option<&RgbaTexture> {
        self.texture.as_ref()
    }

    pub fn frames_converted(&self) -> u64 {
        self.frames_converted
    }

    pub fn frames_failed(&self) -> u64 {
        self.frames_failed
    }
}

impl Default for CameraImageView {
    fn default() -> Self {
        Self::new(ViewConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;
    use std::vec;

    use super::*;
    use crate::owned::OwnedImage;
    use crate::types::{PixelFormat, Size};

    fn gray(width: u32, height: u32) -> OwnedImage {
        let data = (0..width * height).map(|v| v as u8).collect();
        OwnedImage::packed(
            PixelFormat::Gray8,
            Size::new(width, height),
            Duration::from_millis(250),
            data,
        )
    }

    #[test]
    fn starts_mirrored_across_y() {
        let view = CameraImageView::default();
        assert_eq!(view.transform(), Transform::MIRROR_Y);
        assert_eq!(view.transform_label(), "MirrorY");
    }

    #[test]
    fn cycle_updates_label() {
        let mut view = CameraImageView::default();
        assert_eq!(view.cycle_transform(), Transform::MIRROR_XY);
        assert_eq!(view.transform_label(), "MirrorX, MirrorY");
        assert_eq!(view.cycle_transform(), Transform::NONE);
        assert_eq!(view.transform_label(), "None");
    }

    #[test]
    fn update_fills_texture_and_info() {
        let mut view = CameraImageView::new(ViewConfig {
            initial_transform: Transform::NONE,
            ..ViewConfig::default()
        });
        view.update(gray(2, 1)).unwrap();
        let texture = view.texture().unwrap();
        assert_eq!(texture.data(), [0, 0, 0, 255, 1, 1, 1, 255]);
        assert_eq!(
            view.info_label(),
            "Image info:\n\twidth: 2\n\theight: 1\n\tplaneCount: 1\n\ttimestamp: 0.25\n\tformat: Gray8"
        );
        assert_eq!(view.frames_converted(), 1);
    }

    #[test]
    fn failed_frame_is_counted_and_keeps_previous_pixels() {
        let mut view = CameraImageView::new(ViewConfig {
            initial_transform: Transform::NONE,
            ..ViewConfig::default()
        });
        view.update(gray(2, 1)).unwrap();
        let jpeg = OwnedImage::packed(
            PixelFormat::Jpeg,
            Size::new(2, 1),
            Duration::ZERO,
            vec![0xff, 0xd8],
        );
        assert!(matches!(
            view.update(jpeg),
            Err(ConversionError::FormatUnsupported { .. })
        ));
        assert_eq!(view.frames_failed(), 1);
        assert_eq!(view.texture().unwrap().data(), [0, 0, 0, 255, 1, 1, 1, 255]);
        assert!(view.info_label().ends_with("format: Jpeg"));
    }
}
