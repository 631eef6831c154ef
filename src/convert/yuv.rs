//! Fixed-point YUV to RGB decoding.

use crate::image::YuvRange;

/// Colour matrix used to decode YUV samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum YuvMatrix {
    /// ITU-R BT.601, used by most phone camera pipelines.
    #[default]
    Bt601,
    /// ITU-R BT.709.
    Bt709,
}

const FRAC_BITS: u32 = 16;
const HALF: i32 = 1 << (FRAC_BITS - 1);

/// Decoding coefficients scaled by `1 << 16`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Coefficients {
    y_offset: i32,
    y_scale: i32,
    rv: i32,
    gu: i32,
    gv: i32,
    bu: i32,
}

impl Coefficients {
    pub(crate) const fn new(matrix: YuvMatrix, range: YuvRange) -> Self {
        // Video-range tables fold in the 255/219 luma and 255/224 chroma
        // expansion.
        match (matrix, range) {
            (YuvMatrix::Bt601, YuvRange::Full) => Coefficients {
                y_offset: 0,
                y_scale: 65536,
                rv: 91881,
                gu: 22554,
                gv: 46802,
                bu: 116130,
            },
            (YuvMatrix::Bt601, YuvRange::Video) => Coefficients {
                y_offset: 16,
                y_scale: 76309,
                rv: 104597,
                gu: 25675,
                gv: 53279,
                bu: 132201,
            },
            (YuvMatrix::Bt709, YuvRange::Full) => Coefficients {
                y_offset: 0,
                y_scale: 65536,
                rv: 103206,
                gu: 12276,
                gv: 30679,
                bu: 121609,
            },
            (YuvMatrix::Bt709, YuvRange::Video) => Coefficients {
                y_offset: 16,
                y_scale: 76309,
                rv: 117489,
                gu: 13975,
                gv: 34925,
                bu: 138438,
            },
        }
    }

    /// Decode one sample to `[r, g, b, 255]`.
    #[inline]
    pub(crate) fn to_rgba(self, y: u8, u: u8, v: u8) -> [u8; 4] {
        let y = (y as i32 - self.y_offset) * self.y_scale + HALF;
        let u = u as i32 - 128;
        let v = v as i32 - 128;
        let r = (y + self.rv * v) >> FRAC_BITS;
        let g = (y - self.gu * u - self.gv * v) >> FRAC_BITS;
        let b = (y + self.bu * u) >> FRAC_BITS;
        [clamp(r), clamp(g), clamp(b), 255]
    }
}

#[inline]
fn clamp(v: i32) -> u8 {
    v.clamp(0, 255) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(actual: [u8; 4], expected: [u8; 3]) -> bool {
        actual[..3]
            .iter()
            .zip(expected)
            .all(|(a, e)| (*a as i32 - e as i32).abs() <= 2)
            && actual[3] == 255
    }

    #[test]
    fn neutral_chroma_is_gray_in_full_range() {
        let c = Coefficients::new(YuvMatrix::Bt601, YuvRange::Full);
        for y in [0u8, 1, 77, 128, 200, 255] {
            assert_eq!(c.to_rgba(y, 128, 128), [y, y, y, 255]);
        }
    }

    #[test]
    fn video_range_black_and_white() {
        for matrix in [YuvMatrix::Bt601, YuvMatrix::Bt709] {
            let c = Coefficients::new(matrix, YuvRange::Video);
            assert_eq!(c.to_rgba(16, 128, 128), [0, 0, 0, 255]);
            assert_eq!(c.to_rgba(235, 128, 128), [255, 255, 255, 255]);
            assert_eq!(c.to_rgba(0, 128, 128), [0, 0, 0, 255]);
        }
    }

    #[test]
    fn primaries_decode_close_to_expected() {
        let c = Coefficients::new(YuvMatrix::Bt601, YuvRange::Full);
        // BT.601 full-range encodings of pure red, green and blue.
        assert!(close(c.to_rgba(76, 85, 255), [255, 0, 0]));
        assert!(close(c.to_rgba(150, 44, 21), [0, 255, 0]));
        assert!(close(c.to_rgba(29, 255, 107), [0, 0, 255]));
    }
}
