//! Fade engine: mode state machine and step loop.
//!
//! Provides [`FadeEngine`], which owns the fade store, the current [`Mode`] and
//! every collaborator, and arbitrates between scheduled fades, one-shot fades
//! and manual colors. Also defines the [`ColorSink`] trait for the output device.

use crate::color::{ChannelLayout, ColorStop};
use crate::control::{ControlRequest, ControlResponse};
use crate::cursor::{PlaybackCursor, PlaybackError};
use crate::recent::RecentColors;
use crate::schedule::{FadeId, FadeStore};
use crate::time::{
    ClockError, DateTime, DateTimeUpdate, TimeInstant, TimeSource, WallClock, Weekday,
};
use crate::types::{FadeError, Trigger};

/// Errors reported by a color sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SinkError {
    /// The downstream device did not accept the write.
    WriteFailed,
}

impl core::fmt::Display for SinkError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            SinkError::WriteFailed => write!(f, "color write failed"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for SinkError {}

/// Trait for abstracting the color output device.
///
/// Implement this for the bus or driver that feeds the fixture. `channels` is
/// the rendered color, 3 bytes for RGB or 4 for RGBW.
pub trait ColorSink {
    /// Pushes a color to the device.
    fn write_color(&mut self, channels: &[u8]) -> Result<(), SinkError>;
}

/// What the engine is currently doing, without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ModeTag {
    /// Waiting for a scheduled fade. Output is off.
    Idle,
    /// Playing a scheduled fade.
    AutoFading,
    /// Playing a one-shot fade.
    OneShotFading,
    /// Holding an operator-selected color.
    Manual,
}

impl ModeTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModeTag::Idle => "idle",
            ModeTag::AutoFading => "auto_fading",
            ModeTag::OneShotFading => "one_shot_fading",
            ModeTag::Manual => "manual",
        }
    }
}

impl core::fmt::Display for ModeTag {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The engine's current mode. Fading modes carry their playback cursor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Mode<I: TimeInstant> {
    Idle,
    AutoFading {
        fade: FadeId,
        cursor: PlaybackCursor<I>,
    },
    OneShotFading {
        fade: FadeId,
        cursor: PlaybackCursor<I>,
    },
    Manual(ColorStop),
}

impl<I: TimeInstant> Mode<I> {
    pub fn tag(&self) -> ModeTag {
        match self {
            Mode::Idle => ModeTag::Idle,
            Mode::AutoFading { .. } => ModeTag::AutoFading,
            Mode::OneShotFading { .. } => ModeTag::OneShotFading,
            Mode::Manual(_) => ModeTag::Manual,
        }
    }
}

/// Errors that can occur during engine operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EngineError {
    /// Wall clock failure.
    Clock(ClockError),

    /// Output device failure.
    Sink(SinkError),

    /// A playback cursor left its fade.
    Playback(PlaybackError),

    /// Fade could not be modified.
    Fade(FadeError),

    /// No fade with the requested name.
    UnknownFade,

    /// The named fade is scheduled, not one-shot.
    NotOneShot,
}

impl core::fmt::Display for EngineError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            EngineError::Clock(err) => write!(f, "clock error: {}", err),
            EngineError::Sink(err) => write!(f, "sink error: {}", err),
            EngineError::Playback(err) => write!(f, "playback error: {}", err),
            EngineError::Fade(err) => write!(f, "fade error: {}", err),
            EngineError::UnknownFade => write!(f, "no fade with that name"),
            EngineError::NotOneShot => write!(f, "fade is not a one-shot fade"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for EngineError {}

impl From<ClockError> for EngineError {
    fn from(err: ClockError) -> Self {
        EngineError::Clock(err)
    }
}

impl From<SinkError> for EngineError {
    fn from(err: SinkError) -> Self {
        EngineError::Sink(err)
    }
}

impl From<PlaybackError> for EngineError {
    fn from(err: PlaybackError) -> Self {
        EngineError::Playback(err)
    }
}

impl From<FadeError> for EngineError {
    fn from(err: FadeError) -> Self {
        EngineError::Fade(err)
    }
}

/// Drives one light fixture through scheduled, one-shot and manual colors.
///
/// The engine is the single owner of all mutable state. A host loop calls
/// [`service`](Self::service) (or [`step`](Self::step)) once per polling
/// interval and forwards decoded control requests to
/// [`handle_request`](Self::handle_request) in between.
///
/// # Type Parameters
/// * `'t` - Lifetime of the time source reference
/// * `I` - Monotonic instant type
/// * `T` - Monotonic time source
/// * `C` - Wall clock
/// * `S` - Color sink
/// * `R` - Recent color storage
/// * `N` - Maximum number of keyframes per fade
/// * `MAX_FADES` - Maximum number of fades
pub struct FadeEngine<'t, I, T, C, S, R, const N: usize, const MAX_FADES: usize>
where
    I: TimeInstant,
    T: TimeSource<I>,
    C: WallClock,
    S: ColorSink,
    R: RecentColors,
{
    time_source: &'t T,
    clock: C,
    sink: S,
    recent: R,
    fades: FadeStore<N, MAX_FADES>,
    layout: ChannelLayout,
    mode: Mode<I>,
    current_color: ColorStop,
    manual_color: ColorStop,
    write_pending: bool,
}

impl<'t, I, T, C, S, R, const N: usize, const MAX_FADES: usize>
    FadeEngine<'t, I, T, C, S, R, N, MAX_FADES>
where
    I: TimeInstant,
    T: TimeSource<I>,
    C: WallClock,
    S: ColorSink,
    R: RecentColors,
{
    /// Creates an idle engine. The output is switched off on the first step.
    ///
    /// Fades whose channel count does not match `layout` are dropped from the
    /// store and never scheduled.
    pub fn new(
        time_source: &'t T,
        clock: C,
        sink: S,
        recent: R,
        mut fades: FadeStore<N, MAX_FADES>,
        layout: ChannelLayout,
    ) -> Self {
        fades.retain(|name, fade| {
            let matches = fade.channel_count() == layout.channel_count();
            if !matches {
                warn!(
                    "dropping fade {}: {} channels, fixture has {}",
                    name,
                    fade.channel_count(),
                    layout.channel_count()
                );
            }
            matches
        });

        Self {
            time_source,
            clock,
            sink,
            recent,
            fades,
            layout,
            mode: Mode::Idle,
            current_color: layout.off(),
            manual_color: layout.off(),
            write_pending: true,
        }
    }

    /// Handles a control request by dispatching to the matching method.
    pub fn handle_request(
        &mut self,
        request: ControlRequest<'_>,
    ) -> Result<ControlResponse, EngineError> {
        match request {
            ControlRequest::SetManual(color) => {
                self.set_manual(color)?;
                Ok(ControlResponse::Ack)
            }
            ControlRequest::SetAuto => {
                self.set_auto()?;
                Ok(ControlResponse::Ack)
            }
            ControlRequest::TriggerOneShot(name) => {
                self.trigger_one_shot(name)?;
                Ok(ControlResponse::Ack)
            }
            ControlRequest::GetMode => Ok(ControlResponse::Mode(self.mode())),
            ControlRequest::GetCurrentColor => Ok(ControlResponse::Color(self.current_color())),
            ControlRequest::GetManualColor => Ok(ControlResponse::Color(self.manual_color())),
            ControlRequest::GetWeekday => Ok(ControlResponse::Weekday(self.weekday()?)),
            ControlRequest::SetWeekday(day) => {
                self.set_weekday(day)?;
                Ok(ControlResponse::Ack)
            }
            ControlRequest::GetDateTime => Ok(ControlResponse::DateTime(self.datetime()?)),
            ControlRequest::SetDateTime(update) => {
                self.set_datetime(update)?;
                Ok(ControlResponse::Ack)
            }
        }
    }

    /// Runs one step and logs any error instead of returning it.
    ///
    /// Collaborator failures are retried on the next call.
    pub fn service(&mut self) -> ModeTag {
        if let Err(err) = self.step() {
            warn!("step failed: {}", err);
        }
        self.mode.tag()
    }

    /// Advances the engine by one polling interval.
    ///
    /// * `Idle` - Starts the first eligible scheduled fade, otherwise shows off.
    /// * `AutoFading` / `OneShotFading` - Renders the current color and takes at
    ///   most one tick. Returns to `Idle` when the fade completes.
    /// * `Manual` - Holds the manual color.
    ///
    /// # Returns
    /// The mode after the step.
    ///
    /// # Errors
    /// * `Clock` / `Sink` - A collaborator failed; the step can be retried
    /// * `Playback` - A cursor left its fade; the engine falls back to `Idle`
    pub fn step(&mut self) -> Result<ModeTag, EngineError> {
        let now = self.time_source.now();

        match self.mode {
            Mode::Idle => {
                let now_secs = self.clock.current_time()?;
                let day = self.clock.current_weekday()?;

                if self.start_scheduled(now_secs, day, now)? {
                    self.play(now)?;
                } else {
                    self.show(self.layout.off())?;
                }
            }
            Mode::AutoFading { .. } | Mode::OneShotFading { .. } => self.play(now)?,
            Mode::Manual(color) => self.show(color)?,
        }

        Ok(self.mode.tag())
    }

    /// Shows a fixed color until the next mode change.
    ///
    /// Preempts any fade. The color is converted to the fixture's channel
    /// layout, written even if unchanged, and recorded in the recent colors list.
    pub fn set_manual(&mut self, color: ColorStop) -> Result<(), EngineError> {
        let color = color.to_layout(self.layout);
        info!("manual color {}", color);
        self.mode = Mode::Manual(color);
        self.manual_color = color;
        self.recent.record(color);
        self.write_pending = true;
        self.show(color)
    }

    /// Returns to scheduling. The output is switched off, even if it already
    /// was, until a fade starts.
    pub fn set_auto(&mut self) -> Result<(), EngineError> {
        info!("auto mode");
        self.mode = Mode::Idle;
        self.write_pending = true;
        self.show(self.layout.off())
    }

    /// Starts the named one-shot fade from its beginning, now.
    ///
    /// Preempts whatever is playing. The fade's start time is moved to the
    /// current time of day.
    ///
    /// # Errors
    /// * `UnknownFade` - No fade with this name
    /// * `NotOneShot` - The fade is scheduled
    /// * `Clock` - The time of day could not be read
    pub fn trigger_one_shot(&mut self, name: &str) -> Result<(), EngineError> {
        let id = self.fades.find(name).ok_or(EngineError::UnknownFade)?;
        let fade = self.fades.get_mut(id).ok_or(EngineError::UnknownFade)?;
        if fade.trigger() != Trigger::OneShot {
            return Err(EngineError::NotOneShot);
        }

        let now_secs = self.clock.current_time()?;
        let now = self.time_source.now();
        fade.set_start_time(now_secs)?;
        let cursor = PlaybackCursor::seek(fade, now_secs, now)?;

        info!("one-shot fade {} triggered", name);
        self.mode = Mode::OneShotFading { fade: id, cursor };
        self.write_pending = true;
        self.play(now)
    }

    /// Returns the current mode.
    pub fn mode(&self) -> ModeTag {
        self.mode.tag()
    }

    /// Returns the full current mode, including the playback cursor.
    pub fn mode_state(&self) -> &Mode<I> {
        &self.mode
    }

    /// Returns the fade currently playing, if any.
    pub fn active_fade(&self) -> Option<FadeId> {
        match self.mode {
            Mode::AutoFading { fade, .. } | Mode::OneShotFading { fade, .. } => Some(fade),
            _ => None,
        }
    }

    /// Returns the color the engine is showing, with fractional channels.
    ///
    /// Off whenever the engine is idle.
    pub fn current_color(&self) -> ColorStop {
        match self.mode {
            Mode::Idle => self.layout.off(),
            _ => self.current_color,
        }
    }

    /// Returns the last manual color, regardless of mode.
    pub fn manual_color(&self) -> ColorStop {
        self.manual_color
    }

    /// Returns recently selected manual colors, most recent last.
    pub fn recent_colors(&self) -> &[ColorStop] {
        self.recent.colors()
    }

    pub fn fades(&self) -> &FadeStore<N, MAX_FADES> {
        &self.fades
    }

    pub fn weekday(&mut self) -> Result<Weekday, EngineError> {
        Ok(self.clock.current_weekday()?)
    }

    pub fn set_weekday(&mut self, day: Weekday) -> Result<(), EngineError> {
        Ok(self.clock.set_weekday(day)?)
    }

    pub fn datetime(&mut self) -> Result<DateTime, EngineError> {
        Ok(self.clock.datetime()?)
    }

    pub fn set_datetime(&mut self, update: DateTimeUpdate) -> Result<(), EngineError> {
        Ok(self.clock.set_datetime(update)?)
    }

    /// Returns the sink, e.g. to inspect a test double.
    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }

    /// Seeks the first eligible scheduled fade and enters `AutoFading`.
    fn start_scheduled(
        &mut self,
        now_secs: u32,
        day: Weekday,
        now: I,
    ) -> Result<bool, EngineError> {
        let Some(id) = self.fades.find_eligible(now_secs, day) else {
            return Ok(false);
        };
        let fade = self.fades.get(id).ok_or(EngineError::UnknownFade)?;
        let cursor = PlaybackCursor::seek(fade, now_secs, now)?;

        info!(
            "fade {} started at segment {} tick {}",
            id.0,
            cursor.segment_index(),
            cursor.ticks_elapsed_in_segment()
        );
        self.mode = Mode::AutoFading { fade: id, cursor };
        Ok(true)
    }

    /// Renders and advances the active fade.
    fn play(&mut self, now: I) -> Result<(), EngineError> {
        let (id, mut cursor) = match self.mode {
            Mode::AutoFading { fade, cursor } | Mode::OneShotFading { fade, cursor } => {
                (fade, cursor)
            }
            _ => return Ok(()),
        };

        let Some(fade) = self.fades.get(id) else {
            warn!("active fade {} missing, returning to idle", id.0);
            self.mode = Mode::Idle;
            return Ok(());
        };

        if cursor.is_complete(fade) {
            self.finish(id);
            return Ok(());
        }

        let color = match cursor.advance(fade, now) {
            Ok(color) => color,
            Err(err) => {
                error!("fade {} playback failed: {}", id.0, err);
                self.mode = Mode::Idle;
                return Err(err.into());
            }
        };

        if cursor.is_complete(fade) {
            self.finish(id);
        } else if let Mode::AutoFading { cursor: active, .. }
        | Mode::OneShotFading { cursor: active, .. } = &mut self.mode
        {
            *active = cursor;
        }

        self.show(color)
    }

    fn finish(&mut self, id: FadeId) {
        info!("fade {} complete", id.0);
        self.mode = Mode::Idle;
    }

    /// Writes `color` to the sink if its rendered channels changed.
    ///
    /// A failed write is retried on the next call even if the color is unchanged.
    fn show(&mut self, color: ColorStop) -> Result<(), EngineError> {
        let channels = color.channels();
        let changed = self.write_pending || channels != self.current_color.channels();
        self.current_color = color;

        if changed {
            self.write_pending = true;
            self.sink.write_color(&channels)?;
            self.write_pending = false;
        }
        Ok(())
    }
}
