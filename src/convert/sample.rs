//! Plane validation and per-pixel sampling for each source format.

use arrayvec::ArrayVec;

use super::yuv::Coefficients;
use crate::error::ConversionError;
use crate::image::Plane;
use crate::types::{MAX_PLANES, PixelFormat, Size};

/// Minimum extent of one plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PlaneLayout {
    rows: usize,
    row_bytes: usize,
}

impl PlaneLayout {
    /// `None` when the extent does not fit in `usize`.
    fn required_len(&self, bytes_per_row: usize) -> Option<usize> {
        match self.rows {
            0 => Some(0),
            rows => bytes_per_row
                .checked_mul(rows - 1)?
                .checked_add(self.row_bytes),
        }
    }
}

fn layouts(format: PixelFormat, size: Size) -> Option<ArrayVec<PlaneLayout, MAX_PLANES>> {
    let w = size.width as usize;
    let h = size.height as usize;
    let half_w = w.div_ceil(2);
    let half_h = h.div_ceil(2);
    let full = |bytes_per_pixel: usize| PlaneLayout {
        rows: h,
        row_bytes: w * bytes_per_pixel,
    };

    let mut out = ArrayVec::new();
    match format {
        PixelFormat::Rgba32 | PixelFormat::Bgra32 => out.push(full(4)),
        PixelFormat::Gray8 => out.push(full(1)),
        PixelFormat::Yuyv | PixelFormat::Uyvy => out.push(PlaneLayout {
            rows: h,
            row_bytes: half_w * 4,
        }),
        PixelFormat::Nv12 | PixelFormat::Nv21 => {
            out.push(full(1));
            out.push(PlaneLayout {
                rows: half_h,
                row_bytes: half_w * 2,
            });
        }
        PixelFormat::I420 => {
            let chroma = PlaneLayout {
                rows: half_h,
                row_bytes: half_w,
            };
            out.push(full(1));
            out.push(chroma);
            out.push(chroma);
        }
        PixelFormat::DepthFloat32
        | PixelFormat::DepthFloat16
        | PixelFormat::Jpeg
        | PixelFormat::Unknown(_) => return None,
    }
    Some(out)
}

/// Check `planes` against the layout `format` requires at `size`.
///
/// The caller has already established that `format` is a colour format.
pub(crate) fn validate(
    format: PixelFormat,
    size: Size,
    planes: &[Plane<'_>],
) -> Result<(), ConversionError> {
    let Some(expected) = layouts(format, size) else {
        // Non-colour formats never reach validation.
        return Ok(());
    };
    if planes.len() != expected.len() {
        return Err(ConversionError::PlaneCount {
            format,
            expected: expected.len(),
            actual: planes.len(),
        });
    }
    for (index, (plane, layout)) in planes.iter().zip(&expected).enumerate() {
        if layout.rows > 1 && plane.bytes_per_row < layout.row_bytes {
            return Err(ConversionError::StrideTooSmall {
                index,
                bytes_per_row: plane.bytes_per_row,
                min: layout.row_bytes,
            });
        }
        let required = layout
            .required_len(plane.bytes_per_row)
            .unwrap_or(usize::MAX);
        if plane.data.len() < required {
            return Err(ConversionError::PlaneTooSmall {
                index,
                required,
                actual: plane.data.len(),
            });
        }
    }
    Ok(())
}

/// Reads `[r, g, b, a]` at a source coordinate from validated planes.
pub(crate) enum Sampler<'a> {
    Rgba(Plane<'a>),
    Bgra(Plane<'a>),
    Gray(Plane<'a>),
    SemiPlanar {
        luma: Plane<'a>,
        chroma: Plane<'a>,
        /// Chroma pairs are stored V first (NV21).
        vu: bool,
        coefficients: Coefficients,
    },
    Planar {
        luma: Plane<'a>,
        u: Plane<'a>,
        v: Plane<'a>,
        coefficients: Coefficients,
    },
    Packed422 {
        plane: Plane<'a>,
        /// Chroma leads each macropixel (UYVY).
        chroma_first: bool,
        coefficients: Coefficients,
    },
}

impl<'a> Sampler<'a> {
    /// Build a sampler over planes that passed [`validate`].
    pub(crate) fn new(
        format: PixelFormat,
        planes: &[Plane<'a>],
        coefficients: Coefficients,
    ) -> Option<Self> {
        let sampler = match (format, planes) {
            (PixelFormat::Rgba32, [p]) => Sampler::Rgba(*p),
            (PixelFormat::Bgra32, [p]) => Sampler::Bgra(*p),
            (PixelFormat::Gray8, [p]) => Sampler::Gray(*p),
            (PixelFormat::Nv12 | PixelFormat::Nv21, [luma, chroma]) => Sampler::SemiPlanar {
                luma: *luma,
                chroma: *chroma,
                vu: format == PixelFormat::Nv21,
                coefficients,
            },
            (PixelFormat::I420, [luma, u, v]) => Sampler::Planar {
                luma: *luma,
                u: *u,
                v: *v,
                coefficients,
            },
            (PixelFormat::Yuyv | PixelFormat::Uyvy, [p]) => Sampler::Packed422 {
                plane: *p,
                chroma_first: format == PixelFormat::Uyvy,
                coefficients,
            },
            _ => return None,
        };
        Some(sampler)
    }

    #[inline]
    pub(crate) fn sample(&self, x: usize, y: usize) -> [u8; 4] {
        match self {
            Sampler::Rgba(p) => {
                let i = y * p.bytes_per_row + x * 4;
                [p.data[i], p.data[i + 1], p.data[i + 2], p.data[i + 3]]
            }
            Sampler::Bgra(p) => {
                let i = y * p.bytes_per_row + x * 4;
                [p.data[i + 2], p.data[i + 1], p.data[i], p.data[i + 3]]
            }
            Sampler::Gray(p) => {
                let l = p.data[y * p.bytes_per_row + x];
                [l, l, l, 255]
            }
            Sampler::SemiPlanar {
                luma,
                chroma,
                vu,
                coefficients,
            } => {
                let l = luma.data[y * luma.bytes_per_row + x];
                let i = (y / 2) * chroma.bytes_per_row + (x / 2) * 2;
                let (a, b) = (chroma.data[i], chroma.data[i + 1]);
                let (u, v) = if *vu { (b, a) } else { (a, b) };
                coefficients.to_rgba(l, u, v)
            }
            Sampler::Planar {
                luma,
                u,
                v,
                coefficients,
            } => {
                let l = luma.data[y * luma.bytes_per_row + x];
                let cu = u.data[(y / 2) * u.bytes_per_row + x / 2];
                let cv = v.data[(y / 2) * v.bytes_per_row + x / 2];
                coefficients.to_rgba(l, cu, cv)
            }
            Sampler::Packed422 {
                plane,
                chroma_first,
                coefficients,
            } => {
                let pair = y * plane.bytes_per_row + (x / 2) * 4;
                let odd = x & 1;
                let (l, u, v) = if *chroma_first {
                    (plane.data[pair + 1 + odd * 2], plane.data[pair], plane.data[pair + 2])
                } else {
                    (plane.data[pair + odd * 2], plane.data[pair + 1], plane.data[pair + 3])
                };
                coefficients.to_rgba(l, u, v)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plane(data: &[u8], bytes_per_row: usize) -> Plane<'_> {
        Plane {
            data,
            bytes_per_row,
        }
    }

    #[test]
    fn odd_dimensions_round_chroma_up() {
        let l = layouts(PixelFormat::I420, Size::new(5, 3)).unwrap();
        assert_eq!(l[0], PlaneLayout { rows: 3, row_bytes: 5 });
        assert_eq!(l[1], PlaneLayout { rows: 2, row_bytes: 3 });
        assert_eq!(l[2], PlaneLayout { rows: 2, row_bytes: 3 });
    }

    #[test]
    fn last_row_may_omit_padding() {
        // 2x2 RGBA with 12-byte stride: the final row only needs 8 bytes.
        let data = [0u8; 20];
        let planes = [plane(&data, 12)];
        assert!(validate(PixelFormat::Rgba32, Size::new(2, 2), &planes).is_ok());
    }

    #[test]
    fn rejects_short_stride() {
        let data = [0u8; 64];
        let planes = [plane(&data, 4)];
        assert_eq!(
            validate(PixelFormat::Bgra32, Size::new(2, 2), &planes),
            Err(ConversionError::StrideTooSmall {
                index: 0,
                bytes_per_row: 4,
                min: 8
            })
        );
    }

    #[test]
    fn rejects_short_chroma_plane() {
        let luma = [0u8; 16];
        let chroma = [0u8; 6];
        let planes = [plane(&luma, 4), plane(&chroma, 4)];
        assert_eq!(
            validate(PixelFormat::Nv12, Size::new(4, 4), &planes),
            Err(ConversionError::PlaneTooSmall {
                index: 1,
                required: 8,
                actual: 6
            })
        );
    }

    #[test]
    fn huge_stride_is_too_small_not_overflow() {
        let data = [0u8; 3];
        let planes = [plane(&data, usize::MAX / 2 + 1)];
        assert_eq!(
            validate(PixelFormat::Gray8, Size::new(1, 3), &planes),
            Err(ConversionError::PlaneTooSmall {
                index: 0,
                required: usize::MAX,
                actual: 3
            })
        );
    }

    #[test]
    fn rejects_wrong_plane_count() {
        let luma = [0u8; 16];
        let planes = [plane(&luma, 4)];
        assert_eq!(
            validate(PixelFormat::I420, Size::new(4, 4), &planes),
            Err(ConversionError::PlaneCount {
                format: PixelFormat::I420,
                expected: 3,
                actual: 1
            })
        );
    }

    #[test]
    fn packed_422_reads_the_right_luma() {
        use crate::convert::yuv::YuvMatrix;
        use crate::image::YuvRange;

        let c = Coefficients::new(YuvMatrix::Bt601, YuvRange::Full);
        let yuyv = [10u8, 128, 200, 128];
        let uyvy = [128u8, 10, 128, 200];
        let a = Sampler::new(PixelFormat::Yuyv, &[plane(&yuyv, 4)], c).unwrap();
        let b = Sampler::new(PixelFormat::Uyvy, &[plane(&uyvy, 4)], c).unwrap();
        for s in [a, b] {
            assert_eq!(s.sample(0, 0), [10, 10, 10, 255]);
            assert_eq!(s.sample(1, 0), [200, 200, 200, 255]);
        }
    }
}
