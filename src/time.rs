//! Time abstractions: the monotonic tick clock and the wall clock.
//!
//! Playback timing runs on a monotonic [`TimeSource`], while scheduling reads the
//! time of day and weekday from a [`WallClock`] (typically a battery-backed RTC).

/// Seconds in one day. Valid times of day are `0..SECONDS_PER_DAY`.
pub const SECONDS_PER_DAY: u32 = 86_400;

/// Trait for abstracting monotonic time sources.
pub trait TimeSource<I: TimeInstant> {
    /// Returns the current time instant.
    fn now(&self) -> I;
}

/// Trait abstraction for duration types.
pub trait TimeDuration: Copy + PartialEq {
    /// Converts duration to milliseconds.
    fn as_millis(&self) -> u64;
}

/// Trait abstraction for instant types.
pub trait TimeInstant: Copy {
    /// Duration type for this instant.
    type Duration: TimeDuration;

    /// Calculates duration since an earlier instant.
    fn duration_since(&self, earlier: Self) -> Self::Duration;
}

/// Converts a wall-clock time of day to seconds since midnight.
#[inline]
pub const fn time_to_seconds(hours: u32, minutes: u32, seconds: u32) -> u32 {
    hours * 3600 + minutes * 60 + seconds
}

/// Like [`time_to_seconds`], but returns `None` unless the fields form a valid
/// time of day (`hours < 24`, `minutes < 60`, `seconds < 60`).
pub const fn checked_time_to_seconds(hours: u32, minutes: u32, seconds: u32) -> Option<u32> {
    if hours < 24 && minutes < 60 && seconds < 60 {
        Some(time_to_seconds(hours, minutes, seconds))
    } else {
        None
    }
}

/// A day of the week as reported by the wall clock, `0..=6`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Weekday(u8);

impl Weekday {
    /// Returns `None` if `day` is not in `0..=6`.
    pub const fn new(day: u8) -> Option<Self> {
        if day < 7 { Some(Weekday(day)) } else { None }
    }

    /// Returns the day index, `0..=6`.
    pub const fn index(self) -> u8 {
        self.0
    }
}

/// A set of weekdays, stored as a 7-bit mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct WeekdaySet(u8);

impl WeekdaySet {
    /// No days.
    pub const EMPTY: Self = WeekdaySet(0);

    /// Every day of the week.
    pub const ALL: Self = WeekdaySet(0b0111_1111);

    /// Returns a copy of this set with `day` added.
    pub const fn with(self, day: Weekday) -> Self {
        WeekdaySet(self.0 | (1 << day.0))
    }

    pub fn insert(&mut self, day: Weekday) {
        self.0 |= 1 << day.0;
    }

    pub fn contains(&self, day: Weekday) -> bool {
        self.0 & (1 << day.0) != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Iterates the contained days in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = Weekday> + '_ {
        (0..7u8).filter(|d| self.0 & (1 << d) != 0).map(Weekday)
    }
}

impl FromIterator<Weekday> for WeekdaySet {
    fn from_iter<T: IntoIterator<Item = Weekday>>(iter: T) -> Self {
        let mut set = WeekdaySet::EMPTY;
        for day in iter {
            set.insert(day);
        }
        set
    }
}

/// Calendar date and time as held by the wall clock.
///
/// `year` is the offset from 2000, matching common RTC register layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DateTime {
    pub year: u8,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

impl DateTime {
    /// Seconds since midnight for this date-time.
    pub fn seconds_of_day(&self) -> u32 {
        time_to_seconds(self.hour as u32, self.minute as u32, self.second as u32)
    }
}

impl core::fmt::Display for DateTime {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}",
            2000 + self.year as u16,
            self.month,
            self.day,
            self.hour,
            self.minute,
            self.second
        )
    }
}

/// A partial date-time update. Only `Some` fields are written to the clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DateTimeUpdate {
    pub year: Option<u8>,
    pub month: Option<u8>,
    pub day: Option<u8>,
    pub hour: Option<u8>,
    pub minute: Option<u8>,
    pub second: Option<u8>,
}

impl DateTimeUpdate {
    /// Applies the present fields on top of `current`.
    pub fn apply_to(&self, current: DateTime) -> DateTime {
        DateTime {
            year: self.year.unwrap_or(current.year),
            month: self.month.unwrap_or(current.month),
            day: self.day.unwrap_or(current.day),
            hour: self.hour.unwrap_or(current.hour),
            minute: self.minute.unwrap_or(current.minute),
            second: self.second.unwrap_or(current.second),
        }
    }
}

/// Errors reported by a wall clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClockError {
    /// The clock peripheral did not respond.
    Unavailable,

    /// The clock returned a value outside its valid range.
    InvalidReading,
}

impl core::fmt::Display for ClockError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ClockError::Unavailable => write!(f, "wall clock unavailable"),
            ClockError::InvalidReading => write!(f, "wall clock returned an invalid reading"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ClockError {}

/// Trait for abstracting the wall clock (time of day and weekday).
///
/// Implement this for your RTC peripheral. Setters are plain pass-throughs used
/// by the control plane to correct the clock.
pub trait WallClock {
    /// Returns seconds since local midnight, `0..SECONDS_PER_DAY`.
    fn current_time(&mut self) -> Result<u32, ClockError>;

    /// Returns the current day of the week.
    fn current_weekday(&mut self) -> Result<Weekday, ClockError>;

    /// Returns the full calendar date and time.
    fn datetime(&mut self) -> Result<DateTime, ClockError>;

    /// Sets the day of the week.
    fn set_weekday(&mut self, day: Weekday) -> Result<(), ClockError>;

    /// Writes the present fields of `update` to the clock.
    fn set_datetime(&mut self, update: DateTimeUpdate) -> Result<(), ClockError>;
}
