//! Recently used manual colors.

use crate::color::ColorStop;
use heapless::Vec;

/// Default number of colors kept by [`RecentColorLog`].
pub const DEFAULT_RECENT_CAPACITY: usize = 10;

/// Trait for abstracting storage of recently selected manual colors.
///
/// Implementations keep the list ordered oldest to newest, without
/// duplicates, and bounded in size. Persistent implementations may write
/// through to flash; failures there are theirs to handle.
pub trait RecentColors {
    /// Records `color` as the most recent selection.
    fn record(&mut self, color: ColorStop);

    /// Returns the recorded colors, most recent last.
    fn colors(&self) -> &[ColorStop];
}

/// In-memory recent color log holding at most `CAP` colors.
///
/// Recording a color that is already present moves it to the end. When full,
/// the oldest color is dropped.
#[derive(Debug, Clone, Default)]
pub struct RecentColorLog<const CAP: usize = DEFAULT_RECENT_CAPACITY> {
    colors: Vec<ColorStop, CAP>,
}

impl<const CAP: usize> RecentColorLog<CAP> {
    pub fn new() -> Self {
        Self { colors: Vec::new() }
    }
}

impl<const CAP: usize> RecentColors for RecentColorLog<CAP> {
    fn record(&mut self, color: ColorStop) {
        if CAP == 0 {
            return;
        }
        let rendered = color.channels();
        if let Some(pos) = self.colors.iter().position(|c| c.channels() == rendered) {
            self.colors.remove(pos);
        } else if self.colors.is_full() {
            self.colors.remove(0);
        }
        // A slot was freed above if the log was full.
        let _ = self.colors.push(color);
    }

    fn colors(&self) -> &[ColorStop] {
        &self.colors
    }
}
