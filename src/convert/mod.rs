//! Conversion of acquired source images into packed 4-channel buffers.

mod sample;
mod yuv;

use core::ops::Deref;

use arrayvec::ArrayVec;

pub use yuv::YuvMatrix;

use crate::error::ConversionError;
use crate::image::{SourceImage, YuvRange};
use crate::types::{ConversionRequest, DestinationFormat, MAX_PLANES, PixelFormat};
use sample::Sampler;
use yuv::Coefficients;

/// How YUV sources are decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConverterConfig {
    pub matrix: YuvMatrix,
    /// Used unless the source reports its own range.
    pub range: YuvRange,
}

/// Converts one source image at a time into a caller-owned buffer.
#[derive(Debug, Clone, Default)]
pub struct FrameConverter {
    config: ConverterConfig,
}

/// Releases the held image when dropped, on every exit path.
struct ReleaseGuard<'a, I: SourceImage + ?Sized>(&'a mut I);

impl<I: SourceImage + ?Sized> Deref for ReleaseGuard<'_, I> {
    type Target = I;

    fn deref(&self) -> &I {
        self.0
    }
}

impl<I: SourceImage + ?Sized> Drop for ReleaseGuard<'_, I> {
    fn drop(&mut self) {
        self.0.release();
    }
}

impl FrameConverter {
    pub fn new(config: ConverterConfig) -> Self {
        FrameConverter { config }
    }

    pub fn config(&self) -> &ConverterConfig {
        &self.config
    }

    /// Whether `from` can be converted into `to` at all.
    pub fn format_supported(from: PixelFormat, _to: DestinationFormat) -> bool {
        from.is_color()
    }

    /// Convert `source` into `destination` and release `source`.
    ///
    /// `destination` must be exactly [`ConversionRequest::required_len`]
    /// bytes. The source is released before this returns, whether or not the
    /// conversion succeeds, unless it had already been released, in which
    /// case [`ConversionError::SourceAlreadyReleased`] is returned and
    /// nothing is touched.
    pub fn convert<I>(
        &self,
        source: &mut I,
        request: &ConversionRequest,
        destination: &mut [u8],
    ) -> Result<(), ConversionError>
    where
        I: SourceImage + ?Sized,
    {
        if source.is_released() {
            return Err(ConversionError::SourceAlreadyReleased);
        }
        let image = ReleaseGuard(source);

        let result = self.convert_held(&*image, request, destination);
        match &result {
            Ok(()) => tracing::trace!(
                format = %image.pixel_format(),
                width = request.size.width,
                height = request.size.height,
                destination = %request.format,
                transform = %request.transform,
                "converted image"
            ),
            Err(e) => tracing::debug!(
                format = %image.pixel_format(),
                error = %e,
                "conversion failed"
            ),
        }
        result
    }

    fn convert_held<I>(
        &self,
        image: &I,
        request: &ConversionRequest,
        destination: &mut [u8],
    ) -> Result<(), ConversionError>
    where
        I: SourceImage + ?Sized,
    {
        let format = image.pixel_format();
        if !Self::format_supported(format, request.format) {
            return Err(ConversionError::FormatUnsupported {
                from: format,
                to: request.format,
            });
        }

        let expected = request.required_len();
        if destination.len() != expected {
            return Err(ConversionError::SizeMismatch {
                expected,
                actual: destination.len(),
            });
        }
        if request.size.is_empty() {
            return Ok(());
        }

        let source_size = image.size();
        if source_size.is_empty() {
            return Err(ConversionError::EmptySource);
        }

        if image.plane_count() > MAX_PLANES {
            return Err(ConversionError::PlaneCount {
                format,
                expected: format.plane_count().unwrap_or(0),
                actual: image.plane_count(),
            });
        }
        let mut planes = ArrayVec::<_, MAX_PLANES>::new();
        for index in 0..image.plane_count() {
            match image.plane(index) {
                Some(plane) => planes.push(plane),
                None => break,
            }
        }
        sample::validate(format, source_size, &planes)?;

        let range = image.yuv_range().unwrap_or(self.config.range);
        let coefficients = Coefficients::new(self.config.matrix, range);
        let Some(sampler) = Sampler::new(format, &planes, coefficients) else {
            return Err(ConversionError::FormatUnsupported {
                from: format,
                to: request.format,
            });
        };

        let dw = request.size.width as usize;
        let dh = request.size.height as usize;
        let sw = source_size.width as usize;
        let sh = source_size.height as usize;
        let mirror_x = request.transform.mirror_x();
        let mirror_y = request.transform.mirror_y();

        for (dy, row) in destination
            .chunks_exact_mut(dw * DestinationFormat::BYTES_PER_PIXEL)
            .enumerate()
        {
            let ty = if mirror_x { dh - 1 - dy } else { dy };
            let sy = ty * sh / dh;
            for (dx, px) in row
                .chunks_exact_mut(DestinationFormat::BYTES_PER_PIXEL)
                .enumerate()
            {
                let tx = if mirror_y { dw - 1 - dx } else { dx };
                let sx = tx * sw / dw;
                px.copy_from_slice(&request.format.pack(sampler.sample(sx, sy)));
            }
        }
        Ok(())
    }
}
