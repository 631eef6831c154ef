use std::ffi::c_void;

use arrayvec::ArrayVec;
use objc2_core_foundation::CFRetained;
use objc2_core_media::CMSampleBuffer;
use objc2_core_video::{
    CVPixelBuffer, CVPixelBufferGetBaseAddress, CVPixelBufferGetBaseAddressOfPlane,
    CVPixelBufferGetBytesPerRow, CVPixelBufferGetBytesPerRowOfPlane, CVPixelBufferGetHeight,
    CVPixelBufferGetHeightOfPlane, CVPixelBufferGetPixelFormatType, CVPixelBufferGetPlaneCount,
    CVPixelBufferGetWidth, CVPixelBufferLockBaseAddress, CVPixelBufferLockFlags,
    CVPixelBufferUnlockBaseAddress, kCVReturnSuccess,
};

use crate::error::{Error, PlatformError};
use crate::image::{Plane, SourceImage, Timestamp, YuvRange};
use crate::platform::macos::fourcc::pixel_format_from_fourcc;
use crate::types::{MAX_PLANES, PixelFormat, Size};

const LOCK_FLAGS: CVPixelBufferLockFlags = CVPixelBufferLockFlags::ReadOnly;

/// A presentation timestamp mirroring Core Media's `CMTime`.
///
/// Preserves the full precision and semantics of the underlying `CMTime`,
/// including flags and epoch. For a quick seconds value, use
/// [`as_secs_f64()`](Timestamp::as_secs_f64).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct MacosTimestamp {
    /// The numerator of the time value (ticks).
    pub value: i64,
    /// Ticks per second.
    pub timescale: i32,
    /// CMTime flags (valid, has been rounded, positive/negative infinity, indefinite).
    pub flags: u32,
    /// Distinguishes separate timelines that may restart from zero.
    pub epoch: i64,
}

impl Timestamp for MacosTimestamp {
    fn as_secs_f64(&self) -> f64 {
        if self.timescale > 0 {
            self.value as f64 / self.timescale as f64
        } else {
            0.0
        }
    }
}

/// Base address and extent of one locked plane.
struct RawPlane {
    base: *const u8,
    len: usize,
    bytes_per_row: usize,
}

/// A source image backed by a retained `CVPixelBuffer`.
///
/// The buffer's base address stays locked read-only until the image is
/// released or dropped. Release unlocks it and gives up the retain.
pub struct MacosSourceImage {
    pixel_buffer: Option<CFRetained<CVPixelBuffer>>,
    planes: ArrayVec<RawPlane, MAX_PLANES>,
    plane_count: usize,
    pixel_format: PixelFormat,
    yuv_range: Option<YuvRange>,
    size: Size,
    timestamp: MacosTimestamp,
}

// SAFETY: the plane pointers refer into a pixel buffer this value retains and
// keeps locked; Core Video buffers may be read from any thread.
unsafe impl Send for MacosSourceImage {}

impl MacosSourceImage {
    /// Lock `pixel_buffer` for reading and wrap it.
    pub fn from_pixel_buffer(
        pixel_buffer: CFRetained<CVPixelBuffer>,
        timestamp: MacosTimestamp,
    ) -> Result<Self, Error> {
        let status = unsafe { CVPixelBufferLockBaseAddress(&pixel_buffer, LOCK_FLAGS) };
        if status != kCVReturnSuccess {
            return Err(Error::Platform(PlatformError::Status(status)));
        }

        let width = CVPixelBufferGetWidth(&pixel_buffer);
        let height = CVPixelBufferGetHeight(&pixel_buffer);
        let fourcc = CVPixelBufferGetPixelFormatType(&pixel_buffer);
        let (pixel_format, yuv_range) = pixel_format_from_fourcc(fourcc);
        let size = Size {
            width: width as u32,
            height: height as u32,
        };

        let mut planes = ArrayVec::new();
        let native_planes = CVPixelBufferGetPlaneCount(&pixel_buffer);
        let plane_count = if native_planes == 0 {
            // Non-planar: single plane
            let base = CVPixelBufferGetBaseAddress(&pixel_buffer);
            let bytes_per_row = CVPixelBufferGetBytesPerRow(&pixel_buffer);
            if !base.is_null() {
                planes.push(RawPlane {
                    base: base as *const u8,
                    len: bytes_per_row * height,
                    bytes_per_row,
                });
            }
            1
        } else {
            for i in 0..native_planes.min(MAX_PLANES) {
                let base = CVPixelBufferGetBaseAddressOfPlane(&pixel_buffer, i);
                if base.is_null() {
                    break;
                }
                let bytes_per_row = CVPixelBufferGetBytesPerRowOfPlane(&pixel_buffer, i);
                let h = CVPixelBufferGetHeightOfPlane(&pixel_buffer, i);
                planes.push(RawPlane {
                    base: base as *const u8,
                    len: bytes_per_row * h,
                    bytes_per_row,
                });
            }
            native_planes
        };

        Ok(MacosSourceImage {
            pixel_buffer: Some(pixel_buffer),
            planes,
            plane_count,
            pixel_format,
            yuv_range,
            size,
            timestamp,
        })
    }

    /// Wrap the image buffer of a delivered sample buffer.
    pub fn from_sample_buffer(sample_buffer: &CMSampleBuffer) -> Result<Self, Error> {
        let pixel_buffer = unsafe { sample_buffer.image_buffer() }.ok_or(Error::Platform(
            PlatformError::Message("sample buffer carries no image buffer"),
        ))?;

        let cm_time = unsafe { sample_buffer.presentation_time_stamp() };
        let timestamp = MacosTimestamp {
            value: cm_time.value,
            timescale: cm_time.timescale,
            flags: cm_time.flags.0,
            epoch: cm_time.epoch,
        };

        Self::from_pixel_buffer(pixel_buffer, timestamp)
    }

    /// Raw pointer to the backing `CVPixelBuffer` (escape hatch). Null once
    /// released.
    pub fn pixel_buffer_ptr(&self) -> *const c_void {
        match &self.pixel_buffer {
            Some(pb) => &**pb as *const CVPixelBuffer as *const c_void,
            None => std::ptr::null(),
        }
    }
}

impl SourceImage for MacosSourceImage {
    type Timestamp = MacosTimestamp;

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
        self.pixel_buffer.as_ref()?;
        let raw = self.planes.get(index)?;
        // SAFETY: the buffer is retained and locked while `pixel_buffer` is
        // set, and the slice cannot outlive `&self`.
        let data = unsafe { std::slice::from_raw_parts(raw.base, raw.len) };
        Some(Plane {
            data,
            bytes_per_row: raw.bytes_per_row,
        })
    }

    fn timestamp(&self) -> MacosTimestamp {
        self.timestamp
    }

    fn is_released(&self) -> bool {
        self.pixel_buffer.is_none()
    }

    fn release(&mut self) {
        if let Some(pixel_buffer) = self.pixel_buffer.take() {
            self.planes.clear();
            unsafe {
                CVPixelBufferUnlockBaseAddress(&pixel_buffer, LOCK_FLAGS);
            }
        }
    }

    fn yuv_range(&self) -> Option<YuvRange> {
        self.yuv_range
    }
}

impl Drop for MacosSourceImage {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use std::ptr::{self, NonNull};

    use objc2_core_video::{CVPixelBufferCreate, kCVPixelFormatType_32BGRA};

    use super::*;

    fn bgra_buffer(width: usize, height: usize) -> CFRetained<CVPixelBuffer> {
        let mut out: *mut CVPixelBuffer = ptr::null_mut();
        let status = unsafe {
            CVPixelBufferCreate(
                None,
                width,
                height,
                kCVPixelFormatType_32BGRA,
                None,
                NonNull::from(&mut out),
            )
        };
        assert_eq!(status, kCVReturnSuccess);
        unsafe { CFRetained::from_raw(NonNull::new(out).unwrap()) }
    }

    #[test]
    fn wraps_a_locked_pixel_buffer() {
        let mut image =
            MacosSourceImage::from_pixel_buffer(bgra_buffer(4, 2), MacosTimestamp::default())
                .unwrap();
        assert_eq!(image.pixel_format(), PixelFormat::Bgra32);
        assert_eq!(image.size(), Size::new(4, 2));
        assert_eq!(image.plane_count(), 1);

        let plane = image.plane(0).unwrap();
        assert!(plane.bytes_per_row >= 16);
        assert!(plane.data.len() >= plane.bytes_per_row * 2);
        assert!(!image.pixel_buffer_ptr().is_null());

        image.release();
        image.release();
        assert!(image.is_released());
        assert!(image.plane(0).is_none());
        assert!(image.pixel_buffer_ptr().is_null());
    }
}
