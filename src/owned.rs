//! Source images backed by ordinary heap memory.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt;
use core::time::Duration;

use arrayvec::{ArrayVec, CapacityError};

use crate::image::{Plane, SourceImage, YuvRange};
use crate::types::{MAX_PLANES, PixelFormat, Size};

/// One plane of an [`OwnedImage`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnedPlane {
    pub data: Vec<u8>,
    pub bytes_per_row: usize,
}

impl OwnedPlane {
    pub fn new(data: Vec<u8>, bytes_per_row: usize) -> Self {
        OwnedPlane {
            data,
            bytes_per_row,
        }
    }
}

type ReleaseHook = Box<dyn FnOnce() + Send + 'static>;

/// A [`SourceImage`] whose planes live in `Vec`s.
///
/// Releasing frees the plane memory and runs the release hook, if any. A
/// still-held image is released when dropped.
pub struct OwnedImage {
    pixel_format: PixelFormat,
    size: Size,
    timestamp: Duration,
    plane_count: usize,
    planes: ArrayVec<OwnedPlane, MAX_PLANES>,
    yuv_range: Option<YuvRange>,
    on_release: Option<ReleaseHook>,
    released: bool,
}

impl OwnedImage {
    pub fn new(pixel_format: PixelFormat, size: Size, timestamp: Duration) -> Self {
        OwnedImage {
            pixel_format,
            size,
            timestamp,
            plane_count: 0,
            planes: ArrayVec::new(),
            yuv_range: None,
            on_release: None,
            released: false,
        }
    }

    /// A single-plane image with tightly packed rows.
    pub fn packed(pixel_format: PixelFormat, size: Size, timestamp: Duration, data: Vec<u8>) -> Self {
        let bytes_per_row = match size.height {
            0 => data.len(),
            h => data.len() / h as usize,
        };
        let mut image = Self::new(pixel_format, size, timestamp);
        image.planes.push(OwnedPlane::new(data, bytes_per_row));
        image.plane_count = 1;
        image
    }

    pub fn push_plane(&mut self, plane: OwnedPlane) -> Result<(), CapacityError<OwnedPlane>> {
        self.planes.try_push(plane)?;
        self.plane_count = self.planes.len();
        Ok(())
    }

    pub fn with_yuv_range(mut self, range: YuvRange) -> Self {
        self.yuv_range = Some(range);
        self
    }

    /// Run `hook` once, when the image is released.
    pub fn on_release(mut self, hook: impl FnOnce() + Send + 'static) -> Self {
        self.on_release = Some(Box::new(hook));
        self
    }
}

impl SourceImage for OwnedImage {
    type Timestamp = Duration;

    fn pixel_format(&self) -> PixelFormat {
        self.pixel_format
    }

    fn size(&self) -> Size {
        self.size
    }

    fn plane_count(&self) -> usize {
        self.plane_count
    }

    fn plane(&self, index: usize) -> Option<Plane<'_>> {
        self.planes.get(index).map(|p| Plane {
            data: &p.data,
            bytes_per_row: p.bytes_per_row,
        })
    }

    fn timestamp(&self) -> Duration {
        self.timestamp
    }

    fn is_released(&self) -> bool {
        self.released
    }

    fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        self.planes.clear();
        if let Some(hook) = self.on_release.take() {
            hook();
        }
    }

    fn yuv_range(&self) -> Option<YuvRange> {
        self.yuv_range
    }
}

impl Drop for OwnedImage {
    fn drop(&mut self) {
        self.release();
    }
}

impl fmt::Debug for OwnedImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OwnedImage")
            .field("pixel_format", &self.pixel_format)
            .field("size", &self.size)
            .field("timestamp", &self.timestamp)
            .field("plane_count", &self.plane_count)
            .field("released", &self.released)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use alloc::sync::Arc;
    use alloc::vec;
    use core::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    fn counted(counter: &Arc<AtomicUsize>) -> OwnedImage {
        let counter = Arc::clone(counter);
        OwnedImage::packed(
            PixelFormat::Rgba32,
            Size::new(1, 1),
            Duration::from_millis(5),
            vec![1, 2, 3, 4],
        )
        .on_release(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn release_is_idempotent() {
        let releases = Arc::new(AtomicUsize::new(0));
        let mut image = counted(&releases);
        image.release();
        image.release();
        drop(image);
        assert_eq!(releases.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn drop_releases_held_image() {
        let releases = Arc::new(AtomicUsize::new(0));
        drop(counted(&releases));
        assert_eq!(releases.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn released_image_keeps_metadata_but_not_planes() {
        let releases = Arc::new(AtomicUsize::new(0));
        let mut image = counted(&releases);
        assert!(image.plane(0).is_some());
        image.release();
        assert!(image.plane(0).is_none());
        assert_eq!(image.plane_count(), 1);
        assert_eq!(image.size(), Size::new(1, 1));
    }

    #[test]
    fn at_most_three_planes() {
        let mut image = OwnedImage::new(PixelFormat::I420, Size::new(2, 2), Duration::ZERO);
        for _ in 0..MAX_PLANES {
            image.push_plane(OwnedPlane::new(vec![0; 4], 2)).unwrap();
        }
        assert!(image.push_plane(OwnedPlane::new(vec![0; 4], 2)).is_err());
        assert_eq!(image.plane_count(), 3);
    }
}
