//! Core types for fade construction.

use crate::color::ColorStop;

/// One waypoint of a fade: a color and how many ticks its outgoing segment lasts.
///
/// The last keyframe of a fade has no outgoing segment; its tick count is kept
/// but never used for interpolation.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct KeyFrame {
    /// Color at the start of the segment.
    pub color: ColorStop,

    /// Segment length in ticks.
    pub ticks: u32,
}

impl KeyFrame {
    /// Creates a new keyframe.
    #[inline]
    pub fn new(color: ColorStop, ticks: u32) -> Self {
        Self { color, ticks }
    }
}

/// How a fade gets started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Trigger {
    /// Started by the scheduler inside its daily window.
    #[default]
    Scheduled,

    /// Started only on demand, with its start time re-stamped to "now".
    OneShot,
}

/// Fade validation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FadeError {
    /// Fewer than two keyframes.
    TooFewKeyFrames,

    /// Tick period of zero milliseconds.
    ZeroTickPeriod,

    /// Keyframes mix RGB and RGBW colors.
    ChannelMismatch,

    /// Start time is not within a single day.
    StartTimeOutOfRange,

    /// Keyframe index does not exist.
    NoSuchKeyFrame,

    /// Fade capacity exceeded.
    CapacityExceeded,

    /// Total duration does not fit in milliseconds.
    DurationOverflow,
}

impl core::fmt::Display for FadeError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            FadeError::TooFewKeyFrames => {
                write!(f, "fade must have at least two keyframes")
            }
            FadeError::ZeroTickPeriod => {
                write!(f, "tick period must be greater than zero")
            }
            FadeError::ChannelMismatch => {
                write!(f, "all keyframes of a fade must have the same channel count")
            }
            FadeError::StartTimeOutOfRange => {
                write!(f, "start time must be less than 86400 seconds")
            }
            FadeError::NoSuchKeyFrame => {
                write!(f, "keyframe index out of range")
            }
            FadeError::CapacityExceeded => {
                write!(f, "fade capacity exceeded")
            }
            FadeError::DurationOverflow => {
                write!(f, "fade duration overflows")
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for FadeError {}
