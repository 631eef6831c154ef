//! Mirroring applied while converting.

use core::fmt;

/// A set of mirroring flags.
///
/// `MIRROR_X` mirrors across the X axis, reversing the row order.
/// `MIRROR_Y` mirrors across the Y axis, reversing pixel order within a row.
/// Bits outside these two are retained but have no effect on conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Transform(u8);

/// Order used by [`Transform::next`].
const CYCLE: [Transform; 4] = [
    Transform::NONE,
    Transform::MIRROR_X,
    Transform::MIRROR_Y,
    Transform::MIRROR_XY,
];

impl Transform {
    pub const NONE: Self = Transform(0);
    pub const MIRROR_X: Self = Transform(1);
    pub const MIRROR_Y: Self = Transform(2);
    pub const MIRROR_XY: Self = Transform(1 | 2);

    pub const fn from_bits(bits: u8) -> Self {
        Transform(bits)
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn mirror_x(self) -> bool {
        self.0 & Self::MIRROR_X.0 != 0
    }

    pub const fn mirror_y(self) -> bool {
        self.0 & Self::MIRROR_Y.0 != 0
    }

    /// The state after this one in `None -> MirrorX -> MirrorY -> both`.
    ///
    /// Anything outside the cycle wraps around to `NONE`.
    pub fn next(self) -> Self {
        match CYCLE.iter().position(|t| *t == self) {
            Some(i) => CYCLE[(i + 1) % CYCLE.len()],
            None => Self::NONE,
        }
    }
}

/// Advance `current` one step through the fixed transform cycle.
pub fn cycle_transform(current: Transform) -> Transform {
    current.next()
}

impl fmt::Display for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::NONE => f.write_str("None"),
            Self::MIRROR_X => f.write_str("MirrorX"),
            Self::MIRROR_Y => f.write_str("MirrorY"),
            Self::MIRROR_XY => f.write_str("MirrorX, MirrorY"),
            Self(bits) => write!(f, "{bits}"),
        }
    }
}

#[cfg(test)]
mod tests {
    extern crate alloc;

    use alloc::string::ToString;

    use super::*;

    #[test]
    fn cycles_in_fixed_order() {
        assert_eq!(Transform::NONE.next(), Transform::MIRROR_X);
        assert_eq!(Transform::MIRROR_X.next(), Transform::MIRROR_Y);
        assert_eq!(Transform::MIRROR_Y.next(), Transform::MIRROR_XY);
        assert_eq!(Transform::MIRROR_XY.next(), Transform::NONE);
    }

    #[test]
    fn four_steps_return_to_start() {
        for start in CYCLE {
            let mut t = start;
            for _ in 0..4 {
                t = t.next();
            }
            assert_eq!(t, start);
        }
    }

    #[test]
    fn unknown_bits_wrap_to_none() {
        assert_eq!(Transform::from_bits(0x04).next(), Transform::NONE);
        assert_eq!(Transform::from_bits(0xff).next(), Transform::NONE);
    }

    #[test]
    fn display_names() {
        assert_eq!(Transform::NONE.to_string(), "None");
        assert_eq!(Transform::MIRROR_Y.to_string(), "MirrorY");
        assert_eq!(Transform::MIRROR_XY.to_string(), "MirrorX, MirrorY");
        assert_eq!(Transform::from_bits(8).to_string(), "8");
    }

    #[test]
    fn flags() {
        assert!(Transform::MIRROR_XY.mirror_x());
        assert!(Transform::MIRROR_XY.mirror_y());
        assert!(!Transform::MIRROR_X.mirror_y());
        assert!(!Transform::NONE.mirror_x());
    }
}
