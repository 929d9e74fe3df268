//! Shared test infrastructure for rgb-fader integration tests

#![allow(dead_code)] // Items used across multiple test files; Rust analyzes per-file

use rgb_fader::{
    ChannelLayout, ClockError, ColorSink, ColorStop, DateTime, DateTimeUpdate, Fade,
    FadeEngine, FadeStore, RecentColorLog, SinkError, TimeDuration, TimeInstant, TimeSource,
    Trigger, WallClock, Weekday, WeekdaySet, time_to_seconds,
};

// ============================================================================
// Mock Time Types
// ============================================================================

/// Mock duration type for testing (wraps milliseconds)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct TestDuration(pub u64);

impl TimeDuration for TestDuration {
    fn as_millis(&self) -> u64 {
        self.0
    }
}

/// Mock instant type for testing
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct TestInstant(pub u64);

impl TimeInstant for TestInstant {
    type Duration = TestDuration;

    fn duration_since(&self, earlier: Self) -> Self::Duration {
        TestDuration(self.0 - earlier.0)
    }
}

// ============================================================================
// Mock Time Source
// ============================================================================

/// Mock monotonic time source with controllable time advancement
pub struct MockTimeSource {
    current_time: core::cell::Cell<TestInstant>,
}

impl MockTimeSource {
    pub fn new() -> Self {
        Self {
            current_time: core::cell::Cell::new(TestInstant(0)),
        }
    }

    /// Advance time by the given number of milliseconds
    pub fn advance(&self, millis: u64) {
        let current = self.current_time.get();
        self.current_time.set(TestInstant(current.0 + millis));
    }
}

impl TimeSource<TestInstant> for MockTimeSource {
    fn now(&self) -> TestInstant {
        self.current_time.get()
    }
}

// ============================================================================
// Mock Wall Clock
// ============================================================================

/// Mock RTC. Time of day and weekday are set directly by tests.
pub struct MockClock {
    pub datetime: DateTime,
    pub weekday: Weekday,
    pub available: bool,
}

impl MockClock {
    pub fn at(seconds: u32, weekday: u8) -> Self {
        let mut clock = Self {
            datetime: DateTime {
                year: 24,
                month: 6,
                day: 3,
                ..Default::default()
            },
            weekday: Weekday::new(weekday).unwrap(),
            available: true,
        };
        clock.set_seconds(seconds);
        clock
    }

    pub fn set_seconds(&mut self, seconds: u32) {
        self.datetime.hour = (seconds / 3600) as u8;
        self.datetime.minute = (seconds / 60 % 60) as u8;
        self.datetime.second = (seconds % 60) as u8;
    }

    fn check(&self) -> Result<(), ClockError> {
        if self.available {
            Ok(())
        } else {
            Err(ClockError::Unavailable)
        }
    }
}

impl WallClock for MockClock {
    fn current_time(&mut self) -> Result<u32, ClockError> {
        self.check()?;
        Ok(self.datetime.seconds_of_day())
    }

    fn current_weekday(&mut self) -> Result<Weekday, ClockError> {
        self.check()?;
        Ok(self.weekday)
    }

    fn datetime(&mut self) -> Result<DateTime, ClockError> {
        self.check()?;
        Ok(self.datetime)
    }

    fn set_weekday(&mut self, day: Weekday) -> Result<(), ClockError> {
        self.check()?;
        self.weekday = day;
        Ok(())
    }

    fn set_datetime(&mut self, update: DateTimeUpdate) -> Result<(), ClockError> {
        self.check()?;
        self.datetime = update.apply_to(self.datetime);
        Ok(())
    }
}

// ============================================================================
// Mock Sink
// ============================================================================

/// Sink that records every write and can be told to fail.
pub struct RecordingSink {
    history: heapless::Vec<heapless::Vec<u8, 4>, 64>,
    writes: usize,
    last: Option<heapless::Vec<u8, 4>>,
    pub fail: bool,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self {
            history: heapless::Vec::new(),
            writes: 0,
            last: None,
            fail: false,
        }
    }

    pub fn last(&self) -> Option<&[u8]> {
        self.last.as_deref()
    }

    pub fn writes(&self) -> usize {
        self.writes
    }

    pub fn history(&self) -> &[heapless::Vec<u8, 4>] {
        &self.history
    }
}

impl ColorSink for RecordingSink {
    fn write_color(&mut self, channels: &[u8]) -> Result<(), SinkError> {
        if self.fail {
            return Err(SinkError::WriteFailed);
        }
        let rendered = heapless::Vec::from_slice(channels).unwrap();
        let _ = self.history.push(rendered.clone());
        self.last = Some(rendered);
        self.writes += 1;
        Ok(())
    }
}

// ============================================================================
// Fixtures
// ============================================================================

pub const BLACK: ColorStop = ColorStop::rgb(0, 0, 0);
pub const WHITE: ColorStop = ColorStop::rgb(255, 255, 255);

pub const MONDAY: u8 = 1;
pub const TUESDAY: u8 = 2;

/// 06:00:00
pub const SIX_AM: u32 = time_to_seconds(6, 0, 0);

pub type TestEngine<'t> =
    FadeEngine<'t, TestInstant, MockTimeSource, MockClock, RecordingSink, RecentColorLog<10>, 8, 4>;

/// Black to white to black, ten one-second ticks per segment.
pub fn black_white_black(start: u32) -> Fade<8> {
    Fade::builder()
        .keyframe(BLACK, 10)
        .unwrap()
        .keyframe(WHITE, 10)
        .unwrap()
        .keyframe(BLACK, 10)
        .unwrap()
        .start_time(start)
        .tick_period_ms(1000)
        .build()
        .unwrap()
}

/// A two keyframe fade from `from` to `to` over `ticks` one-second ticks.
pub fn simple_fade(start: u32, from: ColorStop, to: ColorStop, ticks: u32) -> Fade<8> {
    Fade::builder()
        .keyframe(from, ticks)
        .unwrap()
        .keyframe(to, 0)
        .unwrap()
        .start_time(start)
        .build()
        .unwrap()
}

/// Same as [`simple_fade`] but only triggered on demand.
pub fn one_shot_fade(from: ColorStop, to: ColorStop, ticks: u32) -> Fade<8> {
    Fade::builder()
        .keyframe(from, ticks)
        .unwrap()
        .keyframe(to, 0)
        .unwrap()
        .trigger(Trigger::OneShot)
        .build()
        .unwrap()
}

/// Restricts a fade to the given weekdays by rebuilding it.
pub fn on_days(fade: Fade<8>, days: &[u8]) -> Fade<8> {
    let set: WeekdaySet = days.iter().map(|&d| Weekday::new(d).unwrap()).collect();
    let mut builder = Fade::builder()
        .start_time(fade.start_time())
        .tick_period_ms(fade.tick_period_ms())
        .trigger(fade.trigger())
        .days(set);
    for kf in fade.keyframes() {
        builder = builder.keyframe(kf.color, kf.ticks).unwrap();
    }
    builder.build().unwrap()
}

pub fn store(fades: &[(&str, Fade<8>)]) -> FadeStore<8, 4> {
    let mut store = FadeStore::new();
    for (name, fade) in fades {
        store.insert(name, fade.clone()).unwrap();
    }
    store
}

pub fn engine<'t>(
    timer: &'t MockTimeSource,
    clock: MockClock,
    fades: FadeStore<8, 4>,
) -> TestEngine<'t> {
    engine_with_layout(timer, clock, fades, ChannelLayout::Rgb)
}

pub fn engine_with_layout<'t>(
    timer: &'t MockTimeSource,
    clock: MockClock,
    fades: FadeStore<8, 4>,
    layout: ChannelLayout,
) -> TestEngine<'t> {
    FadeEngine::new(
        timer,
        clock,
        RecordingSink::new(),
        RecentColorLog::new(),
        fades,
        layout,
    )
}
