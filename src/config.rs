//! Fade definitions from JSON.
//!
//! The document maps fade names to definitions, in the order they should be
//! considered by the scheduler:
//!
//! ```json
//! { "fades": {
//!     "sunrise": {
//!         "start_time": { "hours": 6, "minutes": 30, "seconds": 0 },
//!         "millis_per_tick": 1000,
//!         "days_of_week": [0, 1, 2, 3, 4],
//!         "stops": [ { "r": 0, "g": 0, "b": 0, "t": 600 },
//!                    { "r": 255, "g": 160, "b": 60, "t": 0 } ]
//!     },
//!     "sunset": { "one_shot": true, "start_time": { "hours": 0, "minutes": 0, "seconds": 0 },
//!                 "stops": [ ... ] }
//! } }
//! ```
//!
//! `w` on a stop adds a white channel. `millis_per_tick` defaults to 1000,
//! `days_of_week` to every day and `one_shot` to false.
//!
//! A malformed document is rejected as a whole. A well-formed fade that fails
//! validation is skipped and reported; the remaining fades still load.

use crate::color::ColorStop;
use crate::fade::{DEFAULT_TICK_PERIOD_MS, Fade};
use crate::schedule::{FadeName, FadeStore, StoreError};
use crate::time::{Weekday, WeekdaySet, checked_time_to_seconds};
use crate::types::{FadeError, Trigger};
use heapless::Vec;
use serde::Deserialize;
use serde::de::{Deserializer, MapAccess, Visitor};

/// Errors that reject a whole definition document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// The document is not valid JSON, does not match the expected shape, or
    /// holds more fades or stops than the capacities allow.
    Malformed,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ConfigError::Malformed => write!(f, "malformed fade definition document"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ConfigError {}

/// Why a single fade definition was skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DefinitionError {
    /// The fade failed validation.
    Invalid(FadeError),

    /// The fade could not be registered.
    Store(StoreError),

    /// `days_of_week` contains a value outside `0..=6`.
    InvalidWeekday(u8),
}

impl core::fmt::Display for DefinitionError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            DefinitionError::Invalid(err) => write!(f, "{}", err),
            DefinitionError::Store(err) => write!(f, "{}", err),
            DefinitionError::InvalidWeekday(day) => write!(f, "invalid weekday {}", day),
        }
    }
}

impl From<FadeError> for DefinitionError {
    fn from(err: FadeError) -> Self {
        DefinitionError::Invalid(err)
    }
}

impl From<StoreError> for DefinitionError {
    fn from(err: StoreError) -> Self {
        DefinitionError::Store(err)
    }
}

/// A fade definition that was skipped during loading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejected {
    pub name: FadeName,
    pub error: DefinitionError,
}

/// Result of loading a definition document.
#[derive(Debug, Clone)]
pub struct LoadedFades<const N: usize, const MAX_FADES: usize> {
    /// Fades that passed validation, in document order.
    pub fades: FadeStore<N, MAX_FADES>,

    /// Fades that were skipped, in document order.
    pub rejected: Vec<Rejected, MAX_FADES>,
}

#[derive(Debug, Deserialize)]
struct StartTimeDef {
    hours: u32,
    minutes: u32,
    seconds: u32,
}

#[derive(Debug, Deserialize)]
struct StopDef {
    r: u8,
    g: u8,
    b: u8,
    #[serde(default)]
    w: Option<u8>,
    t: u32,
}

impl StopDef {
    fn color(&self) -> ColorStop {
        match self.w {
            Some(w) => ColorStop::rgbw(self.r, self.g, self.b, w),
            None => ColorStop::rgb(self.r, self.g, self.b),
        }
    }
}

fn default_tick_period() -> u32 {
    DEFAULT_TICK_PERIOD_MS
}

#[derive(Debug, Deserialize)]
struct FadeDef<const N: usize> {
    start_time: StartTimeDef,
    #[serde(default = "default_tick_period")]
    millis_per_tick: u32,
    #[serde(default)]
    days_of_week: Option<Vec<u8, 7>>,
    #[serde(default)]
    one_shot: bool,
    stops: Vec<StopDef, N>,
}

impl<const N: usize> FadeDef<N> {
    fn to_fade(&self) -> Result<Fade<N>, DefinitionError> {
        let days = match &self.days_of_week {
            None => WeekdaySet::ALL,
            Some(days) => days
                .iter()
                .map(|&d| Weekday::new(d).ok_or(DefinitionError::InvalidWeekday(d)))
                .collect::<Result<WeekdaySet, _>>()?,
        };

        let start = &self.start_time;
        let start_time = checked_time_to_seconds(start.hours, start.minutes, start.seconds)
            .ok_or(FadeError::StartTimeOutOfRange)?;
        let mut builder = Fade::builder()
            .start_time(start_time)
            .tick_period_ms(self.millis_per_tick)
            .days(days)
            .trigger(if self.one_shot {
                Trigger::OneShot
            } else {
                Trigger::Scheduled
            });
        for stop in &self.stops {
            builder = builder.keyframe(stop.color(), stop.t)?;
        }
        Ok(builder.build()?)
    }
}

/// Fade definitions in document order.
struct FadeDefs<const N: usize, const MAX_FADES: usize>(Vec<(FadeName, FadeDef<N>), MAX_FADES>);

impl<'de, const N: usize, const MAX_FADES: usize> Deserialize<'de> for FadeDefs<N, MAX_FADES> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct DefsVisitor<const N: usize, const MAX_FADES: usize>;

        impl<'de, const N: usize, const MAX_FADES: usize> Visitor<'de>
            for DefsVisitor<N, MAX_FADES>
        {
            type Value = FadeDefs<N, MAX_FADES>;

            fn expecting(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "a map of at most {} fade definitions", MAX_FADES)
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut defs = Vec::new();
                while let Some(entry) = map.next_entry::<FadeName, FadeDef<N>>()? {
                    if defs.push(entry).is_err() {
                        return Err(serde::de::Error::invalid_length(MAX_FADES + 1, &self));
                    }
                }
                Ok(FadeDefs(defs))
            }
        }

        deserializer.deserialize_map(DefsVisitor::<N, MAX_FADES>)
    }
}

#[derive(Deserialize)]
struct Document<const N: usize, const MAX_FADES: usize> {
    fades: FadeDefs<N, MAX_FADES>,
}

/// Parses a fade definition document into a fade store.
///
/// # Errors
/// * `Malformed` - The document does not parse
pub fn load_fade_definitions<const N: usize, const MAX_FADES: usize>(
    json: &str,
) -> Result<LoadedFades<N, MAX_FADES>, ConfigError> {
    let (document, _) = serde_json_core::from_str::<Document<N, MAX_FADES>>(json)
        .map_err(|_| ConfigError::Malformed)?;

    let mut loaded = LoadedFades {
        fades: FadeStore::new(),
        rejected: Vec::new(),
    };

    for (name, def) in document.fades.0.iter() {
        let result = def
            .to_fade()
            .and_then(|fade| loaded.fades.insert(name, fade).map_err(DefinitionError::from));

        match result {
            Ok(id) => debug!("loaded fade {} as {}", name.as_str(), id.0),
            Err(error) => {
                warn!("skipping fade {}: {}", name.as_str(), error);
                // Both vectors share MAX_FADES capacity, one slot per definition.
                let _ = loaded.rejected.push(Rejected {
                    name: name.clone(),
                    error,
                });
            }
        }
    }

    Ok(loaded)
}
