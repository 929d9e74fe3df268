//! Playback position within a fade.
//!
//! A [`PlaybackCursor`] is created by [`PlaybackCursor::seek`], which places it
//! where the fade would be had it been running since its start time, and is then
//! moved forward by [`PlaybackCursor::advance`] at most one tick per call.

use crate::color::{ColorStop, lerp};
use crate::fade::Fade;
use crate::time::{TimeDuration, TimeInstant};

/// Errors that can occur while seeking or advancing a cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PlaybackError {
    /// Seek requested before the fade's start time.
    BeforeStart {
        /// Fade start, seconds since midnight
        start_time: u32,
        /// Requested time, seconds since midnight
        now: u32,
    },

    /// Cursor points past the last interpolatable segment.
    SegmentOutOfBounds {
        /// Cursor segment index
        index: usize,
        /// Number of segments in the fade
        segments: usize,
    },

    /// Segment endpoints have different channel counts.
    ChannelMismatch,
}

impl core::fmt::Display for PlaybackError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            PlaybackError::BeforeStart { start_time, now } => {
                write!(f, "cannot seek to {}s, fade starts at {}s", now, start_time)
            }
            PlaybackError::SegmentOutOfBounds { index, segments } => {
                write!(
                    f,
                    "segment index {} out of bounds for fade with {} segments",
                    index, segments
                )
            }
            PlaybackError::ChannelMismatch => {
                write!(f, "segment endpoints have different channel counts")
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for PlaybackError {}

/// Mutable playback state for one active fade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackCursor<I: TimeInstant> {
    last_tick: I,
    ticks_elapsed: u32,
    segment_index: usize,
}

impl<I: TimeInstant> PlaybackCursor<I> {
    /// Places a cursor as if `fade` had been playing continuously since its start time.
    ///
    /// `now_secs` is the wall-clock time of day, `now` the matching monotonic
    /// instant that becomes the cursor's last tick. When `now_secs` is at or
    /// beyond the end of the fade the cursor holds the final keyframe on the
    /// last segment; the next [`advance`](Self::advance) completes it.
    ///
    /// # Errors
    /// * `BeforeStart` - `now_secs` is earlier than the fade's start time
    pub fn seek<const N: usize>(
        fade: &Fade<N>,
        now_secs: u32,
        now: I,
    ) -> Result<Self, PlaybackError> {
        let start_time = fade.start_time();
        if now_secs < start_time {
            return Err(PlaybackError::BeforeStart {
                start_time,
                now: now_secs,
            });
        }

        let elapsed_ms = (now_secs - start_time) as u64 * 1000;
        let elapsed_ticks = elapsed_ms / fade.tick_period_ms() as u64;

        let segments = fade.segment_count();
        let mut cumulative: u64 = 0;
        for (index, keyframe) in fade.keyframes()[..segments].iter().enumerate() {
            let segment_end = cumulative + keyframe.ticks as u64;
            if segment_end > elapsed_ticks {
                return Ok(Self {
                    last_tick: now,
                    ticks_elapsed: (elapsed_ticks - cumulative) as u32,
                    segment_index: index,
                });
            }
            cumulative = segment_end;
        }

        let last = segments.saturating_sub(1);
        Ok(Self {
            last_tick: now,
            ticks_elapsed: fade.keyframe(last).map_or(0, |kf| kf.ticks),
            segment_index: last,
        })
    }

    /// Returns the interpolated color at the cursor's current position.
    ///
    /// A zero-tick segment renders its target color.
    ///
    /// # Errors
    /// * `SegmentOutOfBounds` - The cursor is past the last segment
    pub fn color<const N: usize>(&self, fade: &Fade<N>) -> Result<ColorStop, PlaybackError> {
        let (from, to) = match (
            fade.keyframe(self.segment_index),
            fade.keyframe(self.segment_index + 1),
        ) {
            (Some(from), Some(to)) => (from, to),
            _ => {
                return Err(PlaybackError::SegmentOutOfBounds {
                    index: self.segment_index,
                    segments: fade.segment_count(),
                });
            }
        };

        let progress = if from.ticks == 0 {
            1.0
        } else {
            self.ticks_elapsed as f32 / from.ticks as f32
        };

        lerp(&from.color, &to.color, progress).map_err(|_| PlaybackError::ChannelMismatch)
    }

    /// Renders the current color, then moves forward by at most one tick.
    ///
    /// A tick is taken when at least one tick period has passed since the last
    /// one. Late calls never take more than one tick, so a stalled caller makes
    /// the animation lag instead of skip. When the segment's ticks are used up
    /// the cursor moves to the next segment.
    ///
    /// Returns the color rendered before moving.
    ///
    /// # Errors
    /// * `SegmentOutOfBounds` - Called on a completed cursor
    pub fn advance<const N: usize>(
        &mut self,
        fade: &Fade<N>,
        now: I,
    ) -> Result<ColorStop, PlaybackError> {
        let color = self.color(fade)?;
        let segment_ticks = fade.keyframes()[self.segment_index].ticks;

        let elapsed = now.duration_since(self.last_tick);
        if elapsed.as_millis() >= fade.tick_period_ms() as u64 {
            self.ticks_elapsed += 1;
            self.last_tick = now;
        }

        if self.ticks_elapsed >= segment_ticks {
            self.ticks_elapsed = 0;
            self.segment_index += 1;
        }

        Ok(color)
    }

    /// Returns true once the cursor has reached the final keyframe.
    pub fn is_complete<const N: usize>(&self, fade: &Fade<N>) -> bool {
        self.segment_index >= fade.segment_count()
    }

    pub fn segment_index(&self) -> usize {
        self.segment_index
    }

    pub fn ticks_elapsed_in_segment(&self) -> u32 {
        self.ticks_elapsed
    }

    /// Monotonic instant of the last tick (or of the seek).
    pub fn last_tick(&self) -> I {
        self.last_tick
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fade::Fade;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
    struct TestDuration(u64);

    impl TimeDuration for TestDuration {
        fn as_millis(&self) -> u64 {
            self.0
        }
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
    struct TestInstant(u64);

    impl TimeInstant for TestInstant {
        type Duration = TestDuration;

        fn duration_since(&self, earlier: Self) -> Self::Duration {
            TestDuration(self.0 - earlier.0)
        }
    }

    const BLACK: ColorStop = ColorStop::rgb(0, 0, 0);
    const WHITE: ColorStop = ColorStop::rgb(255, 255, 255);

    fn fade_with_zero_tick_segment() -> Fade<4> {
        Fade::builder()
            .keyframe(BLACK, 2)
            .unwrap()
            .keyframe(WHITE, 0)
            .unwrap()
            .keyframe(BLACK, 2)
            .unwrap()
            .keyframe(WHITE, 0)
            .unwrap()
            .build()
            .unwrap()
    }

    #[test]
    fn seek_skips_zero_tick_segment() {
        let fade = fade_with_zero_tick_segment();
        let cursor = PlaybackCursor::seek(&fade, 2, TestInstant(0)).unwrap();

        assert_eq!(cursor.segment_index(), 2);
        assert_eq!(cursor.ticks_elapsed_in_segment(), 0);
    }

    #[test]
    fn zero_tick_segment_renders_target_and_rolls_over() {
        let fade = fade_with_zero_tick_segment();
        let mut cursor = PlaybackCursor::seek(&fade, 0, TestInstant(0)).unwrap();

        cursor.advance(&fade, TestInstant(1000)).unwrap();
        cursor.advance(&fade, TestInstant(2000)).unwrap();
        assert_eq!(cursor.segment_index(), 1);

        let color = cursor.advance(&fade, TestInstant(2500)).unwrap();
        assert_eq!(color, BLACK);
        assert_eq!(cursor.segment_index(), 2);
    }

    #[test]
    fn advance_on_completed_cursor_is_an_error() {
        let fade = fade_with_zero_tick_segment();
        let mut cursor = PlaybackCursor::seek(&fade, 3, TestInstant(0)).unwrap();

        cursor.advance(&fade, TestInstant(1000)).unwrap();
        assert!(cursor.is_complete(&fade));

        let result = cursor.advance(&fade, TestInstant(2000));
        assert_eq!(
            result,
            Err(PlaybackError::SegmentOutOfBounds {
                index: 3,
                segments: 3
            })
        );
    }
}
