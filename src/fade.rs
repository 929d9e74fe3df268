use crate::color::ColorStop;
use crate::time::{SECONDS_PER_DAY, WeekdaySet};
use crate::types::{FadeError, KeyFrame, Trigger};
use heapless::Vec;

/// Default tick period when none is configured.
pub const DEFAULT_TICK_PERIOD_MS: u32 = 1000;

/// A time-of-day color animation.
///
/// A fade is an ordered list of keyframes interpolated tick by tick, plus the
/// scheduling data that decides when it plays: a start time of day, the
/// weekdays it is eligible on, and a tick period in milliseconds.
///
/// The total duration is cached and recomputed on every keyframe change. Only
/// the segments between keyframes count towards it; the terminal keyframe's
/// tick count does not.
///
/// # Type Parameters
/// * `N` - Maximum number of keyframes this fade can hold
#[derive(Debug, Clone)]
pub struct Fade<const N: usize> {
    keyframes: Vec<KeyFrame, N>,
    start_time: u32,
    tick_period_ms: u32,
    days: WeekdaySet,
    trigger: Trigger,
    duration_ms: u64,
}

impl<const N: usize> Fade<N> {
    /// Creates a new fade builder.
    pub fn builder() -> FadeBuilder<N> {
        FadeBuilder::new()
    }

    /// Returns the keyframes in playback order.
    pub fn keyframes(&self) -> &[KeyFrame] {
        &self.keyframes
    }

    /// Returns the keyframe at `index`.
    pub fn keyframe(&self, index: usize) -> Option<&KeyFrame> {
        self.keyframes.get(index)
    }

    /// Channel count shared by every keyframe, 3 or 4.
    pub fn channel_count(&self) -> usize {
        self.keyframes.first().map_or(0, |kf| kf.color.channel_count())
    }

    /// Number of interpolated segments (one less than the keyframe count).
    pub fn segment_count(&self) -> usize {
        self.keyframes.len().saturating_sub(1)
    }

    /// Start time in seconds since local midnight.
    pub fn start_time(&self) -> u32 {
        self.start_time
    }

    /// Moves the start time. Used when a one-shot fade is triggered.
    pub fn set_start_time(&mut self, seconds: u32) -> Result<(), FadeError> {
        if seconds >= SECONDS_PER_DAY {
            return Err(FadeError::StartTimeOutOfRange);
        }
        window_end_ms(seconds, self.duration_ms)?;
        self.start_time = seconds;
        Ok(())
    }

    pub fn tick_period_ms(&self) -> u32 {
        self.tick_period_ms
    }

    pub fn days(&self) -> WeekdaySet {
        self.days
    }

    pub fn trigger(&self) -> Trigger {
        self.trigger
    }

    /// Total playback duration in milliseconds.
    pub fn duration_ms(&self) -> u64 {
        self.duration_ms
    }

    /// Total number of ticks across all segments.
    pub fn total_ticks(&self) -> u64 {
        self.segments().map(|kf| kf.ticks as u64).sum()
    }

    /// End of the playback window, in milliseconds since midnight.
    ///
    /// May exceed one day for fades that run past midnight.
    pub fn end_time_ms(&self) -> u64 {
        self.start_time as u64 * 1000 + self.duration_ms
    }

    /// Appends a keyframe.
    ///
    /// # Errors
    /// * `ChannelMismatch` - Color arity differs from the existing keyframes
    /// * `CapacityExceeded` - The fade already holds `N` keyframes
    /// * `DurationOverflow` - The new duration does not fit in milliseconds since midnight
    pub fn push_keyframe(&mut self, keyframe: KeyFrame) -> Result<(), FadeError> {
        if let Some(first) = self.keyframes.first() {
            if first.color.channel_count() != keyframe.color.channel_count() {
                return Err(FadeError::ChannelMismatch);
            }
        }
        self.keyframes
            .push(keyframe)
            .map_err(|_| FadeError::CapacityExceeded)?;
        match checked_duration(&self.keyframes, self.tick_period_ms, self.start_time) {
            Ok(duration_ms) => {
                self.duration_ms = duration_ms;
                Ok(())
            }
            Err(err) => {
                self.keyframes.pop();
                Err(err)
            }
        }
    }

    /// Removes and returns the keyframe at `index`.
    ///
    /// # Errors
    /// * `NoSuchKeyFrame` - `index` is out of range
    /// * `TooFewKeyFrames` - Removal would leave fewer than two keyframes
    pub fn remove_keyframe(&mut self, index: usize) -> Result<KeyFrame, FadeError> {
        if index >= self.keyframes.len() {
            return Err(FadeError::NoSuchKeyFrame);
        }
        if self.keyframes.len() <= 2 {
            return Err(FadeError::TooFewKeyFrames);
        }
        let removed = self.keyframes.remove(index);
        // Fewer ticks than before, so this cannot overflow.
        self.duration_ms = checked_duration(&self.keyframes, self.tick_period_ms, self.start_time)?;
        Ok(removed)
    }

    fn segments(&self) -> impl Iterator<Item = &KeyFrame> {
        self.keyframes.iter().take(self.segment_count())
    }
}

/// Builder for constructing validated fades.
#[derive(Debug)]
pub struct FadeBuilder<const N: usize> {
    keyframes: Vec<KeyFrame, N>,
    start_time: u32,
    tick_period_ms: u32,
    days: WeekdaySet,
    trigger: Trigger,
}

impl<const N: usize> FadeBuilder<N> {
    /// Creates a builder for a fade starting at midnight, every day, with a one second tick.
    pub fn new() -> Self {
        Self {
            keyframes: Vec::new(),
            start_time: 0,
            tick_period_ms: DEFAULT_TICK_PERIOD_MS,
            days: WeekdaySet::ALL,
            trigger: Trigger::Scheduled,
        }
    }

    /// Adds a keyframe.
    ///
    /// # Errors
    /// Returns `CapacityExceeded` if the fade already holds `N` keyframes.
    pub fn keyframe(mut self, color: ColorStop, ticks: u32) -> Result<Self, FadeError> {
        self.keyframes
            .push(KeyFrame::new(color, ticks))
            .map_err(|_| FadeError::CapacityExceeded)?;
        Ok(self)
    }

    /// Sets the start time in seconds since midnight.
    pub fn start_time(mut self, seconds: u32) -> Self {
        self.start_time = seconds;
        self
    }

    pub fn tick_period_ms(mut self, millis: u32) -> Self {
        self.tick_period_ms = millis;
        self
    }

    /// Sets the weekdays the fade may be scheduled on. Default is every day.
    pub fn days(mut self, days: WeekdaySet) -> Self {
        self.days = days;
        self
    }

    pub fn trigger(mut self, trigger: Trigger) -> Self {
        self.trigger = trigger;
        self
    }

    /// Builds and validates the fade.
    ///
    /// # Errors
    /// * `TooFewKeyFrames` - Fewer than two keyframes were added
    /// * `ZeroTickPeriod` - Tick period is zero
    /// * `ChannelMismatch` - Keyframes mix RGB and RGBW colors
    /// * `StartTimeOutOfRange` - Start time is not below 86400
    /// * `DurationOverflow` - Ticks times tick period, plus the start time, overflows
    pub fn build(self) -> Result<Fade<N>, FadeError> {
        if self.keyframes.len() < 2 {
            return Err(FadeError::TooFewKeyFrames);
        }

        if self.tick_period_ms == 0 {
            return Err(FadeError::ZeroTickPeriod);
        }

        if self.start_time >= SECONDS_PER_DAY {
            return Err(FadeError::StartTimeOutOfRange);
        }

        let arity = self.keyframes[0].color.channel_count();
        if self
            .keyframes
            .iter()
            .any(|kf| kf.color.channel_count() != arity)
        {
            return Err(FadeError::ChannelMismatch);
        }

        let duration_ms = checked_duration(&self.keyframes, self.tick_period_ms, self.start_time)?;

        Ok(Fade {
            keyframes: self.keyframes,
            start_time: self.start_time,
            tick_period_ms: self.tick_period_ms,
            days: self.days,
            trigger: self.trigger,
            duration_ms,
        })
    }
}

/// Duration in milliseconds of the segments in `keyframes`, checked so that the
/// window end in milliseconds since midnight is representable.
fn checked_duration(
    keyframes: &[KeyFrame],
    tick_period_ms: u32,
    start_time: u32,
) -> Result<u64, FadeError> {
    let segments = keyframes.len().saturating_sub(1);
    let duration_ms = keyframes[..segments]
        .iter()
        .try_fold(0u64, |ticks, kf| ticks.checked_add(kf.ticks as u64))
        .and_then(|ticks| ticks.checked_mul(tick_period_ms as u64))
        .ok_or(FadeError::DurationOverflow)?;
    window_end_ms(start_time, duration_ms)?;
    Ok(duration_ms)
}

fn window_end_ms(start_time: u32, duration_ms: u64) -> Result<u64, FadeError> {
    (start_time as u64 * 1000)
        .checked_add(duration_ms)
        .ok_or(FadeError::DurationOverflow)
}

impl<const N: usize> Default for FadeBuilder<N> {
    fn default() -> Self {
        Self::new()
    }
}
