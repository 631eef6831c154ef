use alloc::vec;
use alloc::vec::Vec;

use crate::types::{DestinationFormat, Size};

/// Caller-owned destination pixels in a packed 4-channel format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RgbaTexture {
    size: Size,
    format: DestinationFormat,
    data: Vec<u8>,
}

impl RgbaTexture {
    pub fn new(size: Size, format: DestinationFormat) -> Self {
        RgbaTexture {
            size,
            format,
            data: vec![0; size.pixel_count() * DestinationFormat::BYTES_PER_PIXEL],
        }
    }

    /// Reallocate when `size` differs from the current dimensions.
    ///
    /// Returns `true` if the buffer was replaced.
    pub fn ensure_size(&mut self, size: Size) -> bool {
        if self.size == size {
            return false;
        }
        tracing::debug!(
            from_width = self.size.width,
            from_height = self.size.height,
            width = size.width,
            height = size.height,
            "reallocating texture"
        );
        *self = Self::new(size, self.format);
        true
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn format(&self) -> DestinationFormat {
        self.format
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sized_for_four_bytes_per_pixel() {
        let texture = RgbaTexture::new(Size::new(3, 2), DestinationFormat::Bgra32);
        assert_eq!(texture.data().len(), 24);
        assert_eq!(texture.format(), DestinationFormat::Bgra32);
    }

    #[test]
    fn reallocates_only_on_change() {
        let mut texture = RgbaTexture::new(Size::new(2, 2), DestinationFormat::Rgba32);
        texture.data_mut()[0] = 42;
        assert!(!texture.ensure_size(Size::new(2, 2)));
        assert_eq!(texture.data()[0], 42);
        assert!(texture.ensure_size(Size::new(4, 1)));
        assert_eq!(texture.size(), Size::new(4, 1));
        assert_eq!(texture.data().len(), 16);
        assert_eq!(texture.data()[0], 0);
    }
}
