#![cfg_attr(not(feature = "std"), no_std)]

//! Fade scheduling and playback for RGB and RGBW light fixtures.
//!
//! # Core Concepts
//!
//! - **`ColorStop`**: An RGB or RGBW color with fractional channels, and `lerp` between two
//! - **`KeyFrame`**: A color plus the number of ticks until the next keyframe
//! - **`Fade`**: Keyframes plus a start time of day, eligible weekdays and a tick period
//! - **`PlaybackCursor`**: Where a fade is: segment, ticks into it, time of the last tick
//! - **`FadeStore`**: Fixed-capacity store of named fades; finds the first eligible one
//! - **`FadeEngine`**: Owns everything and switches between idle, scheduled fades,
//!   one-shot fades and manual colors
//! - **`WallClock`**, **`TimeSource`**, **`ColorSink`**, **`RecentColors`**: Traits to
//!   implement for your RTC, monotonic timer, LED driver and color history storage
//!
//! Fade definitions can be loaded from JSON with `config::load_fade_definitions`
//! (feature `config`, on by default).
//!
//! # Step loop
//!
//! Call [`FadeEngine::service`] once per [`DEFAULT_POLL_INTERVAL_MS`] and forward
//! decoded control requests to [`FadeEngine::handle_request`] in between. Each
//! call takes at most one tick, so a late call delays the animation instead of
//! skipping part of it.

#[macro_use]
mod fmt;

pub mod color;
pub mod control;
pub mod cursor;
pub mod engine;
pub mod fade;
pub mod recent;
pub mod schedule;
pub mod time;
pub mod types;

#[cfg(feature = "config")]
pub mod config;

pub use color::{ChannelLayout, ColorStop, lerp};
pub use control::{ControlRequest, ControlResponse, ManualColorInput, parse_channel};
pub use cursor::{PlaybackCursor, PlaybackError};
pub use engine::{ColorSink, EngineError, FadeEngine, Mode, ModeTag, SinkError};
pub use fade::{Fade, FadeBuilder};
pub use recent::{RecentColorLog, RecentColors};
pub use schedule::{FadeId, FadeStore, FadeTiming, StoreError};
pub use time::{
    ClockError, DateTime, DateTimeUpdate, TimeDuration, TimeInstant, TimeSource, WallClock,
    Weekday, WeekdaySet, checked_time_to_seconds, time_to_seconds,
};
pub use types::{FadeError, KeyFrame, Trigger};

#[cfg(feature = "config")]
pub use config::{ConfigError, LoadedFades, load_fade_definitions};

/// Suggested interval between [`FadeEngine::service`] calls.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 1000;

/// All channels off, RGB.
pub const COLOR_OFF: ColorStop = ColorStop::rgb(0, 0, 0);

/// Default maximum keyframes per fade.
pub const MAX_KEYFRAMES: usize = 16;

/// Default maximum fades per store.
pub const MAX_FADES: usize = 8;
