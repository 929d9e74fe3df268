//! Fade store and schedule evaluation.
//!
//! [`FadeStore`] is a fixed-capacity arena of named fades addressed by
//! [`FadeId`]. Configuration order is preserved and decides which fade wins
//! when several are eligible at once: the first one found is started.

use crate::fade::Fade;
use crate::time::{Weekday, WeekdaySet};
use crate::types::Trigger;
use heapless::{String, Vec};

/// Maximum length of a fade name.
pub const MAX_NAME_LEN: usize = 24;

/// The name a fade is configured and triggered under.
pub type FadeName = String<MAX_NAME_LEN>;

/// Index of a fade within a [`FadeStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FadeId(pub usize);

impl From<usize> for FadeId {
    fn from(id: usize) -> Self {
        FadeId(id)
    }
}

impl From<FadeId> for usize {
    fn from(id: FadeId) -> Self {
        id.0
    }
}

/// Errors that can occur when registering fades.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StoreError {
    /// A fade with this name is already registered.
    DuplicateName,

    /// The name is longer than `MAX_NAME_LEN`.
    NameTooLong,

    /// The store is full.
    StoreFull,
}

impl core::fmt::Display for StoreError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            StoreError::DuplicateName => write!(f, "fade name already registered"),
            StoreError::NameTooLong => {
                write!(f, "fade name exceeds {} bytes", MAX_NAME_LEN)
            }
            StoreError::StoreFull => write!(f, "fade store is full"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for StoreError {}

/// Schedule summary of a fade: when its window opens and closes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FadeTiming {
    /// Window start, seconds since midnight.
    pub start_time: u32,
    /// Window end, milliseconds since midnight.
    pub end_time_ms: u64,
    pub days: WeekdaySet,
    pub trigger: Trigger,
}

impl<const N: usize> From<&Fade<N>> for FadeTiming {
    fn from(fade: &Fade<N>) -> Self {
        Self {
            start_time: fade.start_time(),
            end_time_ms: fade.end_time_ms(),
            days: fade.days(),
            trigger: fade.trigger(),
        }
    }
}

/// Returns true if a scheduled fade should be playing at `now_secs` on `day`.
///
/// The window is open strictly between the start time and the end of the
/// fade. One-shot fades and fades without duration are never eligible.
pub fn is_eligible<const N: usize>(fade: &Fade<N>, now_secs: u32, day: Weekday) -> bool {
    if fade.trigger() != Trigger::Scheduled || fade.duration_ms() == 0 {
        return false;
    }
    if !fade.days().contains(day) {
        return false;
    }
    now_secs > fade.start_time() && (now_secs as u64 * 1000) < fade.end_time_ms()
}

/// Fixed-capacity collection of named fades.
///
/// # Type Parameters
/// * `N` - Maximum number of keyframes per fade
/// * `MAX_FADES` - Maximum number of fades this store can hold
#[derive(Debug, Clone)]
pub struct FadeStore<const N: usize, const MAX_FADES: usize> {
    entries: Vec<(FadeName, Fade<N>), MAX_FADES>,
}

impl<const N: usize, const MAX_FADES: usize> FadeStore<N, MAX_FADES> {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Registers a fade under `name`, after all previously registered fades.
    ///
    /// # Errors
    /// * `DuplicateName` - `name` is already registered
    /// * `NameTooLong` - `name` exceeds `MAX_NAME_LEN` bytes
    /// * `StoreFull` - The store already holds `MAX_FADES` fades
    pub fn insert(&mut self, name: &str, fade: Fade<N>) -> Result<FadeId, StoreError> {
        if self.find(name).is_some() {
            return Err(StoreError::DuplicateName);
        }

        let name = FadeName::try_from(name).map_err(|_| StoreError::NameTooLong)?;
        let id = FadeId(self.entries.len());
        self.entries
            .push((name, fade))
            .map_err(|_| StoreError::StoreFull)?;
        Ok(id)
    }

    /// Looks up a fade by name.
    pub fn find(&self, name: &str) -> Option<FadeId> {
        self.entries
            .iter()
            .position(|(entry_name, _)| entry_name.as_str() == name)
            .map(FadeId)
    }

    pub fn get(&self, id: FadeId) -> Option<&Fade<N>> {
        self.entries.get(id.0).map(|(_, fade)| fade)
    }

    pub fn get_mut(&mut self, id: FadeId) -> Option<&mut Fade<N>> {
        self.entries.get_mut(id.0).map(|(_, fade)| fade)
    }

    pub fn name(&self, id: FadeId) -> Option<&str> {
        self.entries.get(id.0).map(|(name, _)| name.as_str())
    }

    /// Returns the first scheduled fade eligible at `now_secs` on `day`.
    ///
    /// Fades are checked in registration order. Overlapping windows are not
    /// ranked: the earliest registered eligible fade wins.
    pub fn find_eligible(&self, now_secs: u32, day: Weekday) -> Option<FadeId> {
        self.entries
            .iter()
            .position(|(_, fade)| is_eligible(fade, now_secs, day))
            .map(FadeId)
    }

    /// Iterates `(id, name, fade)` in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (FadeId, &str, &Fade<N>)> {
        self.entries
            .iter()
            .enumerate()
            .map(|(i, (name, fade))| (FadeId(i), name.as_str(), fade))
    }

    /// Iterates the schedule summary of every fade, by name.
    pub fn timings(&self) -> impl Iterator<Item = (&str, FadeTiming)> {
        self.entries
            .iter()
            .map(|(name, fade)| (name.as_str(), FadeTiming::from(fade)))
    }

    /// Keeps only the fades for which `keep` returns true, preserving order.
    ///
    /// Ids of the remaining fades are renumbered.
    pub fn retain(&mut self, mut keep: impl FnMut(&str, &Fade<N>) -> bool) {
        self.entries.retain(|(name, fade)| keep(name.as_str(), fade));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<const N: usize, const MAX_FADES: usize> Default for FadeStore<N, MAX_FADES> {
    fn default() -> Self {
        Self::new()
    }
}
