//! Control-plane requests.
//!
//! Request framing (paths, query strings, JSON) belongs to the transport. Once a
//! request is decoded it is expressed as a [`ControlRequest`] and handed to
//! [`FadeEngine::handle_request`](crate::engine::FadeEngine::handle_request).

use crate::color::{ChannelLayout, ColorStop};
use crate::engine::ModeTag;
use crate::time::{DateTime, DateTimeUpdate, Weekday};

/// Requests the control plane can make of the engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControlRequest<'a> {
    /// Enter manual mode with a fixed color.
    SetManual(ColorStop),
    /// Leave manual or fading mode and return to scheduling.
    SetAuto,
    /// Start the named one-shot fade now.
    TriggerOneShot(&'a str),
    /// Query the current mode.
    GetMode,
    /// Query the color currently shown.
    GetCurrentColor,
    /// Query the last manual color.
    GetManualColor,
    GetWeekday,
    SetWeekday(Weekday),
    GetDateTime,
    SetDateTime(DateTimeUpdate),
}

/// Engine replies to a [`ControlRequest`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControlResponse {
    /// Request applied, nothing to report.
    Ack,
    Mode(ModeTag),
    Color(ColorStop),
    Weekday(Weekday),
    DateTime(DateTime),
}

/// Parses one channel value of a manual color request.
///
/// Missing, malformed or out-of-range values become 0.
pub fn parse_channel(value: Option<&str>) -> u8 {
    value
        .and_then(|v| v.trim().parse::<u8>().ok())
        .unwrap_or(0)
}

/// Raw channel values of a manual color request, as received.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ManualColorInput<'a> {
    pub red: Option<&'a str>,
    pub green: Option<&'a str>,
    pub blue: Option<&'a str>,
    pub white: Option<&'a str>,
}

impl ManualColorInput<'_> {
    /// Builds the requested color for `layout`.
    ///
    /// Each channel is parsed on its own, so one bad value zeroes only that
    /// channel. `white` is ignored for RGB fixtures.
    pub fn to_color(&self, layout: ChannelLayout) -> ColorStop {
        let red = parse_channel(self.red);
        let green = parse_channel(self.green);
        let blue = parse_channel(self.blue);
        match layout {
            ChannelLayout::Rgb => ColorStop::rgb(red, green, blue),
            ChannelLayout::Rgbw => ColorStop::rgbw(red, green, blue, parse_channel(self.white)),
        }
    }
}

/// Parses a weekday request value. Returns `None` if it is not `0..=6`.
pub fn parse_weekday(value: &str) -> Option<Weekday> {
    value.trim().parse::<u8>().ok().and_then(Weekday::new)
}

/// Raw fields of a set-date-time request, as received.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DateTimeInput<'a> {
    pub year: Option<&'a str>,
    pub month: Option<&'a str>,
    pub day: Option<&'a str>,
    pub hour: Option<&'a str>,
    pub minute: Option<&'a str>,
    pub second: Option<&'a str>,
}

impl DateTimeInput<'_> {
    /// Keeps only the fields that parse; the rest are left unchanged on the clock.
    pub fn to_update(&self) -> DateTimeUpdate {
        fn field(value: Option<&str>) -> Option<u8> {
            value.and_then(|v| v.trim().parse::<u8>().ok())
        }

        DateTimeUpdate {
            year: field(self.year),
            month: field(self.month),
            day: field(self.day),
            hour: field(self.hour),
            minute: field(self.minute),
            second: field(self.second),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bad_channel_values_become_zero() {
        assert_eq!(parse_channel(Some("200")), 200);
        assert_eq!(parse_channel(Some(" 7 ")), 7);
        assert_eq!(parse_channel(Some("abc")), 0);
        assert_eq!(parse_channel(Some("256")), 0);
        assert_eq!(parse_channel(Some("-1")), 0);
        assert_eq!(parse_channel(None), 0);
    }

    #[test]
    fn manual_input_zeroes_only_the_bad_channel() {
        let input = ManualColorInput {
            red: Some("10"),
            green: Some("x"),
            blue: Some("30"),
            white: Some("40"),
        };

        assert_eq!(input.to_color(ChannelLayout::Rgb), ColorStop::rgb(10, 0, 30));
        assert_eq!(
            input.to_color(ChannelLayout::Rgbw),
            ColorStop::rgbw(10, 0, 30, 40)
        );
    }

    #[test]
    fn datetime_input_skips_unparseable_fields() {
        let input = DateTimeInput {
            hour: Some("6"),
            minute: Some("soon"),
            ..Default::default()
        };
        let update = input.to_update();

        assert_eq!(update.hour, Some(6));
        assert_eq!(update.minute, None);
        assert_eq!(update.year, None);
    }

    #[test]
    fn weekday_parse_checks_range() {
        assert_eq!(parse_weekday("3"), Weekday::new(3));
        assert_eq!(parse_weekday("9"), None);
    }
}
