use core::fmt;

use crate::source::SubscriptionId;
use crate::types::{DestinationFormat, PixelFormat};

/// Reasons a conversion can fail.
///
/// Every variant except [`SourceAlreadyReleased`](Self::SourceAlreadyReleased)
/// is returned after the source image has been released.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum ConversionError {
    #[error("cannot convert {from} to {to}")]
    FormatUnsupported {
        from: PixelFormat,
        to: DestinationFormat,
    },
    #[error("destination is {actual} bytes, conversion needs exactly {expected}")]
    SizeMismatch { expected: usize, actual: usize },
    #[error("source image was already released")]
    SourceAlreadyReleased,
    #[error("source image has no pixels")]
    EmptySource,
    #[error("{format} needs {expected} plane(s), image has {actual}")]
    PlaneCount {
        format: PixelFormat,
        expected: usize,
        actual: usize,
    },
    #[error("plane {index} holds {actual} bytes, layout needs {required}")]
    PlaneTooSmall {
        index: usize,
        required: usize,
        actual: usize,
    },
    #[error("plane {index} stride is {bytes_per_row} bytes, a row needs {min}")]
    StrideTooSmall {
        index: usize,
        bytes_per_row: usize,
        min: usize,
    },
}

/// Platform-specific error details.
#[derive(Debug)]
#[non_exhaustive]
pub enum PlatformError {
    Message(&'static str),
    /// A native status code (`CVReturn` on macOS).
    Status(i32),
}

impl fmt::Display for PlatformError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Message(msg) => f.write_str(msg),
            Self::Status(code) => write!(f, "native call failed with status {code}"),
        }
    }
}

impl core::error::Error for PlatformError {}

/// Errors from frame sources and native image wrappers.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    #[error("no subscription with id {0}")]
    UnknownSubscription(SubscriptionId),
    #[error("platform error: {0}")]
    Platform(#[from] PlatformError),
}
