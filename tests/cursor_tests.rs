//! Integration tests for PlaybackCursor seek and advance

mod common;
use common::*;

use rgb_fader::{ColorStop, Fade, PlaybackCursor, PlaybackError};

fn seek(fade: &Fade<8>, now_secs: u32) -> PlaybackCursor<TestInstant> {
    PlaybackCursor::seek(fade, now_secs, TestInstant(0)).unwrap()
}

#[test]
fn seek_at_start_is_first_segment() {
    let fade = black_white_black(SIX_AM);
    let cursor = seek(&fade, SIX_AM);

    assert_eq!(cursor.segment_index(), 0);
    assert_eq!(cursor.ticks_elapsed_in_segment(), 0);
    assert_eq!(cursor.color(&fade).unwrap(), BLACK);
}

#[test]
fn seek_lands_inside_later_segment() {
    let fade = black_white_black(SIX_AM);

    let cursor = seek(&fade, SIX_AM + 15);
    assert_eq!(cursor.segment_index(), 1);
    assert_eq!(cursor.ticks_elapsed_in_segment(), 5);

    let cursor = seek(&fade, SIX_AM + 10);
    assert_eq!(cursor.segment_index(), 1);
    assert_eq!(cursor.ticks_elapsed_in_segment(), 0);
    assert_eq!(cursor.color(&fade).unwrap(), WHITE);

    let cursor = seek(&fade, SIX_AM + 19);
    assert_eq!(cursor.segment_index(), 1);
    assert_eq!(cursor.ticks_elapsed_in_segment(), 9);
}

#[test]
fn seek_past_end_holds_final_color_then_completes() {
    let fade = black_white_black(SIX_AM);
    let mut cursor = seek(&fade, SIX_AM + 3600);

    assert_eq!(cursor.segment_index(), 1);
    assert_eq!(cursor.ticks_elapsed_in_segment(), 10);
    assert!(!cursor.is_complete(&fade));

    let color = cursor.advance(&fade, TestInstant(0)).unwrap();
    assert_eq!(color, BLACK);
    assert!(cursor.is_complete(&fade));
}

#[test]
fn seek_before_start_is_an_error() {
    let fade = black_white_black(SIX_AM);

    assert_eq!(
        PlaybackCursor::seek(&fade, SIX_AM - 1, TestInstant(0)),
        Err(PlaybackError::BeforeStart {
            start_time: SIX_AM,
            now: SIX_AM - 1,
        })
    );
}

#[test]
fn seek_uses_tick_period() {
    let fade: Fade<8> = Fade::builder()
        .keyframe(BLACK, 4)
        .unwrap()
        .keyframe(WHITE, 4)
        .unwrap()
        .keyframe(BLACK, 0)
        .unwrap()
        .start_time(SIX_AM)
        .tick_period_ms(2500)
        .build()
        .unwrap();

    // 12s at 2.5s per tick is 4 whole ticks, the start of segment 1
    let cursor = seek(&fade, SIX_AM + 12);
    assert_eq!(cursor.segment_index(), 1);
    assert_eq!(cursor.ticks_elapsed_in_segment(), 0);

    let cursor = seek(&fade, SIX_AM + 9);
    assert_eq!(cursor.segment_index(), 0);
    assert_eq!(cursor.ticks_elapsed_in_segment(), 3);
}

#[test]
fn advance_waits_for_full_tick_period() {
    let fade = black_white_black(SIX_AM);
    let mut cursor = seek(&fade, SIX_AM);

    cursor.advance(&fade, TestInstant(999)).unwrap();
    assert_eq!(cursor.ticks_elapsed_in_segment(), 0);
    assert_eq!(cursor.last_tick(), TestInstant(0));

    cursor.advance(&fade, TestInstant(1000)).unwrap();
    assert_eq!(cursor.ticks_elapsed_in_segment(), 1);
    assert_eq!(cursor.last_tick(), TestInstant(1000));

    // Measured from the last tick, not the last call
    cursor.advance(&fade, TestInstant(1500)).unwrap();
    assert_eq!(cursor.ticks_elapsed_in_segment(), 1);
    cursor.advance(&fade, TestInstant(2000)).unwrap();
    assert_eq!(cursor.ticks_elapsed_in_segment(), 2);
}

#[test]
fn advance_renders_before_ticking() {
    let fade = simple_fade(SIX_AM, BLACK, WHITE, 4);
    let mut cursor = seek(&fade, SIX_AM);

    let mut rendered = [0u8; 4];
    for (step, slot) in rendered.iter_mut().enumerate() {
        let color = cursor.advance(&fade, TestInstant(step as u64 * 1000 + 1000)).unwrap();
        *slot = color.channels()[0];
    }

    assert_eq!(rendered, [0, 63, 127, 191]);
    assert!(cursor.is_complete(&fade));
    assert!(cursor.advance(&fade, TestInstant(10_000)).is_err());
}

#[test]
fn segments_roll_over_in_order() {
    let fade = black_white_black(SIX_AM);
    let mut cursor = seek(&fade, SIX_AM);

    for n in 1..=10 {
        cursor.advance(&fade, TestInstant(n * 1000)).unwrap();
    }
    assert_eq!(cursor.segment_index(), 1);
    assert_eq!(cursor.ticks_elapsed_in_segment(), 0);

    for n in 11..=20 {
        cursor.advance(&fade, TestInstant(n * 1000)).unwrap();
    }
    assert!(cursor.is_complete(&fade));
}

#[test]
fn rgbw_fade_interpolates_white_channel() {
    let fade: Fade<8> = Fade::builder()
        .keyframe(ColorStop::rgbw(0, 0, 0, 0), 2)
        .unwrap()
        .keyframe(ColorStop::rgbw(100, 0, 0, 200), 0)
        .unwrap()
        .build()
        .unwrap();

    let cursor = seek(&fade, 1);
    let color = cursor.color(&fade).unwrap();
    assert_eq!(color.channels().as_slice(), &[50, 0, 0, 100]);
}
