//! Color model: RGB and RGBW color stops and interpolation between them.
//!
//! Channels are stored as `f32` in the `0.0..=255.0` range so intermediate
//! interpolation results keep their fractional part. Conversion to 8-bit values
//! happens only when a color is rendered with [`ColorStop::channels`].

use crate::types::FadeError;
use heapless::{String, Vec};
use palette::{Mix, Srgb};

/// Maximum number of channels in a color (red, green, blue, white).
pub const MAX_CHANNELS: usize = 4;

/// Channel layout of the driven fixture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ChannelLayout {
    #[default]
    Rgb,
    Rgbw,
}

impl ChannelLayout {
    /// The all-zero color for this layout.
    pub const fn off(self) -> ColorStop {
        match self {
            ChannelLayout::Rgb => ColorStop::rgb(0, 0, 0),
            ChannelLayout::Rgbw => ColorStop::rgbw(0, 0, 0, 0),
        }
    }

    /// Number of channels the fixture expects, 3 or 4.
    pub const fn channel_count(self) -> usize {
        match self {
            ChannelLayout::Rgb => 3,
            ChannelLayout::Rgbw => 4,
        }
    }
}

/// A point in RGB or RGBW color space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorStop {
    rgb: Srgb<f32>,
    white: Option<f32>,
}

impl ColorStop {
    /// Creates a three-channel color.
    pub const fn rgb(red: u8, green: u8, blue: u8) -> Self {
        Self {
            rgb: Srgb::new(red as f32, green as f32, blue as f32),
            white: None,
        }
    }

    /// Creates a four-channel color with a dedicated white channel.
    pub const fn rgbw(red: u8, green: u8, blue: u8, white: u8) -> Self {
        Self {
            rgb: Srgb::new(red as f32, green as f32, blue as f32),
            white: Some(white as f32),
        }
    }

    /// Creates a color from 3 or 4 channel values. Returns `None` for any other length.
    pub fn from_channels(channels: &[u8]) -> Option<Self> {
        match *channels {
            [r, g, b] => Some(Self::rgb(r, g, b)),
            [r, g, b, w] => Some(Self::rgbw(r, g, b, w)),
            _ => None,
        }
    }

    /// All channels zero, with the same arity as `self`.
    pub const fn off(&self) -> Self {
        Self {
            rgb: Srgb::new(0.0, 0.0, 0.0),
            white: match self.white {
                Some(_) => Some(0.0),
                None => None,
            },
        }
    }

    /// Number of channels, 3 or 4.
    pub fn channel_count(&self) -> usize {
        if self.white.is_some() { 4 } else { 3 }
    }

    /// Converts to `layout`: a missing white channel becomes 0, an extra one is dropped.
    pub fn to_layout(&self, layout: ChannelLayout) -> Self {
        let white = match layout {
            ChannelLayout::Rgb => None,
            ChannelLayout::Rgbw => Some(self.white.unwrap_or(0.0)),
        };
        Self {
            rgb: self.rgb,
            white,
        }
    }

    pub fn red(&self) -> f32 {
        self.rgb.red
    }

    pub fn green(&self) -> f32 {
        self.rgb.green
    }

    pub fn blue(&self) -> f32 {
        self.rgb.blue
    }

    pub fn white(&self) -> Option<f32> {
        self.white
    }

    /// Renders the color to 8-bit channel values, truncating fractions.
    pub fn channels(&self) -> Vec<u8, MAX_CHANNELS> {
        let mut out = Vec::new();
        // Capacity is MAX_CHANNELS, pushes cannot fail.
        let _ = out.push(self.rgb.red as u8);
        let _ = out.push(self.rgb.green as u8);
        let _ = out.push(self.rgb.blue as u8);
        if let Some(white) = self.white {
            let _ = out.push(white as u8);
        }
        out
    }

    /// Formats the rendered color as `#rrggbb`, or `#rrggbbww` for RGBW.
    pub fn hex(&self) -> String<9> {
        use core::fmt::Write;

        let mut out = String::new();
        let _ = out.push('#');
        for channel in self.channels() {
            let _ = write!(out, "{:02x}", channel);
        }
        out
    }
}

impl Default for ColorStop {
    fn default() -> Self {
        crate::COLOR_OFF
    }
}

/// Linearly interpolates between two colors.
///
/// `t` is clamped to `[0, 1]`. The result keeps fractional channel values.
///
/// # Errors
/// `ChannelMismatch` if `a` and `b` have a different number of channels.
pub fn lerp(a: &ColorStop, b: &ColorStop, t: f32) -> Result<ColorStop, FadeError> {
    let t = t.clamp(0.0, 1.0);

    let white = match (a.white, b.white) {
        (None, None) => None,
        (Some(wa), Some(wb)) => Some(wa * (1.0 - t) + wb * t),
        _ => return Err(FadeError::ChannelMismatch),
    };

    Ok(ColorStop {
        rgb: a.rgb.mix(b.rgb, t),
        white,
    })
}

#[cfg(feature = "defmt")]
impl defmt::Format for ColorStop {
    fn format(&self, fmt: defmt::Formatter) {
        match self.white {
            Some(w) => defmt::write!(
                fmt,
                "ColorStop {{ rgbw: ({}, {}, {}, {}) }}",
                self.rgb.red,
                self.rgb.green,
                self.rgb.blue,
                w
            ),
            None => defmt::write!(
                fmt,
                "ColorStop {{ rgb: ({}, {}, {}) }}",
                self.rgb.red,
                self.rgb.green,
                self.rgb.blue
            ),
        }
    }
}
