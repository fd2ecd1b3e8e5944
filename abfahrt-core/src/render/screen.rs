//! Departure screen layout
//!
//! `render` is a pure function of its arguments. The same model, status
//! and phase always yield the same writes in the same order.

use core::fmt::Write;

use heapless::String;

use super::layout::*;
use crate::animation::{should_blink, AnimationPhase};
use crate::departures::{Connectivity, DepartureEntry, DisplayModel, Freshness};

/// Which part of the screen a render covers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DrawKind {
    /// Whole screen, starting from a blank panel
    Full,
    /// Whole screen, clearing each band it repaints
    Partial,
    /// Blink glyphs only
    AnimationRegion,
}

/// Shown in place of rows before any data arrived
pub const PLACEHOLDER_TEXT: &str = "Waiting for departures...";

/// Shown when a fetch succeeded but nothing matched
pub const EMPTY_TEXT: &str = "No departures";

/// Lay out the screen
///
/// # Arguments
/// - `model`: Departure groups to show
/// - `freshness`: Data freshness for the status band
/// - `connectivity`: Link quality for the status band
/// - `phase`: Blink phase
/// - `kind`: Part of the screen to produce writes for
pub fn render(
    model: &DisplayModel,
    freshness: Freshness,
    connectivity: Connectivity,
    phase: AnimationPhase,
    kind: DrawKind,
) -> RegionWrites {
    let mut out = RegionWrites::new();

    match kind {
        DrawKind::Full => push(&mut out, RegionWrite::new(Rect::screen(), DrawOp::Clear)),
        DrawKind::Partial => push(&mut out, RegionWrite::new(status_area(), DrawOp::Clear)),
        DrawKind::AnimationRegion => {}
    }

    if kind != DrawKind::AnimationRegion {
        render_status(&mut out, model, freshness, connectivity);
        if kind == DrawKind::Partial {
            push(&mut out, RegionWrite::new(body_area(), DrawOp::Clear));
        }
    }

    render_body(&mut out, model, freshness, phase);

    if kind == DrawKind::AnimationRegion {
        out.retain(|w| w.blink);
    }
    out
}

fn render_status(
    out: &mut RegionWrites,
    model: &DisplayModel,
    freshness: Freshness,
    connectivity: Connectivity,
) {
    let band_h = STATUS_BAND_HEIGHT;

    let mut updated: String<MAX_TEXT_LEN> = String::new();
    match model.updated() {
        Some(t) => {
            let _ = write!(updated, "Updated {:02}:{:02}", t.hour, t.minute);
        }
        None => {
            let _ = updated.push_str("No data");
        }
    }
    push(out, text(Rect::new(MARGIN, 0, UPDATED_WIDTH, band_h), updated, Font::Small, Align::Left));

    if let Freshness::Stale { age_s } = freshness {
        let mut stale: String<MAX_TEXT_LEN> = String::new();
        let _ = write!(stale, "*{}s", age_s);
        push(out, text(Rect::new(STALE_X, 0, STALE_WIDTH, band_h), stale, Font::Small, Align::Right));
    }

    let signal = Rect::new(SIGNAL_X, 4, SIGNAL_WIDTH, band_h - 8);
    let op = match connectivity.bars() {
        Some(level) => DrawOp::SignalBars { level },
        None => DrawOp::NoSignal,
    };
    push(out, RegionWrite::new(signal, op));

    push(out, RegionWrite::new(Rect::new(0, SEPARATOR_Y, WIDTH, 1), DrawOp::Fill));
}

fn render_body(
    out: &mut RegionWrites,
    model: &DisplayModel,
    freshness: Freshness,
    phase: AnimationPhase,
) {
    if freshness == Freshness::Error {
        push(out, message(PLACEHOLDER_TEXT));
        return;
    }
    if model.groups().is_empty() {
        push(out, message(EMPTY_TEXT));
        return;
    }

    let mut row = 0;
    for group in model.groups() {
        for (i, entry) in group.entries.iter().enumerate() {
            if row >= BODY_ROWS {
                return;
            }
            let rect = body_row(row);
            if i == 0 {
                let badge = Rect::new(BADGE_X, rect.y + 1, BADGE_WIDTH, ROW_HEIGHT - 2);
                let name = ellipsize(group.line.as_str(), Font::Large.max_chars(BADGE_WIDTH));
                push(out, RegionWrite::new(
                    badge,
                    DrawOp::Text {
                        text: name,
                        font: Font::Large,
                        align: Align::Center,
                        inverted: true,
                    },
                ));
            }
            render_entry(out, rect, entry, phase);
            row += 1;
        }
    }
}

fn render_entry(out: &mut RegionWrites, row: Rect, entry: &DepartureEntry, phase: AnimationPhase) {
    let dest = ellipsize(entry.destination.as_str(), Font::Large.max_chars(DESTINATION_WIDTH));
    push(out, text(
        Rect::new(DESTINATION_X, row.y, DESTINATION_WIDTH, ROW_HEIGHT),
        dest,
        Font::Large,
        Align::Left,
    ));

    let mut countdown: String<MAX_TEXT_LEN> = String::new();
    if entry.due {
        let _ = countdown.push_str("due");
    } else {
        let _ = write!(countdown, "{}m", entry.countdown_min);
    }
    push(out, text(
        Rect::new(COUNTDOWN_X, row.y, COUNTDOWN_WIDTH, ROW_HEIGHT),
        countdown,
        Font::Large,
        Align::Right,
    ));

    if should_blink(entry.countdown_min, entry.due) {
        let glyph = Rect::new(GLYPH_X, row.y + 5, GLYPH_WIDTH, ROW_HEIGHT - 10);
        push(out, RegionWrite::blinking(glyph, DrawOp::Clear));
        if phase.is_visible() {
            push(out, RegionWrite::blinking(glyph, DrawOp::BlinkGlyph));
        }
    }
}

/// Centered message in the first body rows
fn message(msg: &str) -> RegionWrite {
    let rect = Rect::new(0, BODY_TOP + ROW_HEIGHT, WIDTH, ROW_HEIGHT * 2);
    text(rect, ellipsize(msg, Font::Large.max_chars(WIDTH)), Font::Large, Align::Center)
}

fn text(rect: Rect, text: String<MAX_TEXT_LEN>, font: Font, align: Align) -> RegionWrite {
    RegionWrite::new(
        rect,
        DrawOp::Text {
            text,
            font,
            align,
            inverted: false,
        },
    )
}

/// Cut `s` to `max_chars` characters, ending in `.` when shortened
pub fn ellipsize(s: &str, max_chars: usize) -> String<MAX_TEXT_LEN> {
    let mut out = String::new();
    if max_chars == 0 {
        return out;
    }
    let mut cut = s.chars().count() > max_chars;
    let keep = if cut { max_chars - 1 } else { max_chars };
    for ch in s.chars().take(keep) {
        if out.push(ch).is_err() {
            cut = true;
            break;
        }
    }
    if cut {
        // Buffer full before the character limit: make room for the mark
        while out.len() >= MAX_TEXT_LEN {
            out.pop();
        }
        let _ = out.push('.');
    }
    out
}

/// Append a write; capacity covers the densest layout
fn push(out: &mut RegionWrites, write: RegionWrite) {
    let _ = out.push(write);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, ConfigBuilder};
    use crate::departures::{DepartureAggregator, DepartureTime, RawDeparture};
    use crate::traits::Now;
    use proptest::prelude::*;

    const NOW: i64 = 1_704_112_496;

    fn make_config() -> Config {
        let mut b = ConfigBuilder::new();
        let stop = b.add_stop("60201438").unwrap();
        b.add_line(stop, "49", &[], 0).unwrap();
        b.add_line(stop, "N49", &[], 0).unwrap();
        b.add_line(stop, "47A", &[], 0).unwrap();
        b.add_line(stop, "U4", &[], 0).unwrap();
        b.set_priority(&[]).unwrap();
        b.update_interval_s = Some(30);
        b.animation_interval_s = Some(1);
        b.full_refresh_interval = Some(40);
        b.stale_threshold_s = Some(60);
        b.watchdog_timeout_ms = Some(30_000);
        b.build().unwrap()
    }

    fn make_model(departures: &[(&str, &str, i64)]) -> DisplayModel {
        let config = make_config();
        let raw: std::vec::Vec<RawDeparture> = departures
            .iter()
            .map(|(line, dest, in_s)| {
                RawDeparture::new("60201438", line, "H", dest, DepartureTime::Known(NOW + in_s), true)
            })
            .collect();
        DepartureAggregator::new(&config)
            .aggregate(Some(&raw), Connectivity::Level(3), Now::new(0, NOW))
            .unwrap()
            .model
    }

    fn texts(writes: &RegionWrites) -> std::vec::Vec<&str> {
        writes
            .iter()
            .filter_map(|w| match &w.op {
                DrawOp::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_full_starts_with_clear() {
        let model = make_model(&[("49", "Ring", 300)]);
        let out = render(&model, Freshness::Fresh, Connectivity::Level(3), AnimationPhase::Visible, DrawKind::Full);
        assert_eq!(out[0], RegionWrite::new(Rect::screen(), DrawOp::Clear));
    }

    #[test]
    fn test_row_texts() {
        let model = make_model(&[("49", "Ring", 300), ("49", "Ottakring", 30)]);
        let out = render(&model, Freshness::Fresh, Connectivity::Level(3), AnimationPhase::Visible, DrawKind::Full);
        let t = texts(&out);
        assert_eq!(t, ["Updated 12:34", "49", "Ottakring", "due", "Ring", "5m"]);
    }

    #[test]
    fn test_blink_glyph_follows_phase() {
        let model = make_model(&[("49", "Ring", 90), ("49", "Ring", 600)]);
        let visible = render(&model, Freshness::Fresh, Connectivity::Level(3), AnimationPhase::Visible, DrawKind::Full);
        let hidden = render(&model, Freshness::Fresh, Connectivity::Level(3), AnimationPhase::Hidden, DrawKind::Full);

        let glyphs = |w: &RegionWrites| w.iter().filter(|w| w.op == DrawOp::BlinkGlyph).count();
        assert_eq!(glyphs(&visible), 1);
        assert_eq!(glyphs(&hidden), 0);
    }

    #[test]
    fn test_animation_region_only_glyphs() {
        let model = make_model(&[("49", "Ring", 30), ("N49", "Ring", 60), ("U4", "X", 900)]);
        let out = render(&model, Freshness::Fresh, Connectivity::Level(3), AnimationPhase::Visible, DrawKind::AnimationRegion);
        assert_eq!(out.len(), 4);
        assert!(out.iter().all(|w| w.blink && w.rect.x == GLYPH_X));

        let out = render(&model, Freshness::Fresh, Connectivity::Level(3), AnimationPhase::Hidden, DrawKind::AnimationRegion);
        assert_eq!(out.len(), 2);
        assert!(out.iter().all(|w| w.op == DrawOp::Clear));
    }

    #[test]
    fn test_stale_marker() {
        let model = make_model(&[("49", "Ring", 300)]);
        let out = render(&model, Freshness::Stale { age_s: 61 }, Connectivity::Level(3), AnimationPhase::Visible, DrawKind::Partial);
        assert!(texts(&out).contains(&"*61s"));
        let fresh = render(&model, Freshness::Fresh, Connectivity::Level(3), AnimationPhase::Visible, DrawKind::Partial);
        assert!(!texts(&fresh).iter().any(|t| t.starts_with('*')));
    }

    #[test]
    fn test_error_placeholder_has_no_rows() {
        let model = DisplayModel::empty();
        let out = render(&model, Freshness::Error, Connectivity::Disconnected, AnimationPhase::Visible, DrawKind::Full);
        assert_eq!(texts(&out), ["No data", PLACEHOLDER_TEXT]);
        assert!(out.iter().any(|w| w.op == DrawOp::NoSignal));
    }

    #[test]
    fn test_empty_model_shows_no_departures() {
        let model = make_model(&[]);
        let out = render(&model, Freshness::Fresh, Connectivity::Level(2), AnimationPhase::Visible, DrawKind::Full);
        assert!(texts(&out).contains(&EMPTY_TEXT));
        assert!(out.iter().any(|w| w.op == DrawOp::SignalBars { level: 2 }));
    }

    #[test]
    fn test_partial_clears_bands() {
        let model = make_model(&[("49", "Ring", 300)]);
        let out = render(&model, Freshness::Fresh, Connectivity::Level(3), AnimationPhase::Visible, DrawKind::Partial);
        assert_eq!(out[0], RegionWrite::new(status_area(), DrawOp::Clear));
        assert!(out.contains(&RegionWrite::new(body_area(), DrawOp::Clear)));
    }

    #[test]
    fn test_long_destination_truncated() {
        let model = make_model(&[("49", "Wien Hütteldorf Bahnhof über Penzinger Straße", 300)]);
        let out = render(&model, Freshness::Fresh, Connectivity::Level(3), AnimationPhase::Visible, DrawKind::Full);
        let dest = texts(&out)[2];
        assert_eq!(dest.chars().count(), Font::Large.max_chars(DESTINATION_WIDTH));
        assert!(dest.ends_with('.'));
        assert!(dest.starts_with("Wien Hütteldorf"));
    }

    #[test]
    fn test_ellipsize() {
        assert_eq!(ellipsize("Ring", 4).as_str(), "Ring");
        assert_eq!(ellipsize("Ringstr", 4).as_str(), "Rin.");
        assert_eq!(ellipsize("Ringstr", 0).as_str(), "");
    }

    #[test]
    fn test_ellipsize_multibyte_hits_buffer_first() {
        // 30 two-byte characters need 60 bytes, more than the buffer holds
        let long: std::string::String = "ü".repeat(30);
        let out = ellipsize(&long, 40);
        assert!(out.ends_with('.'));
        assert!(out.len() <= MAX_TEXT_LEN);
        assert_eq!(out.chars().count(), 24);

        // Exactly filling the buffer is not a cut
        let exact: std::string::String = "ü".repeat(24);
        assert_eq!(ellipsize(&exact, 40).as_str(), exact.as_str());
    }

    #[test]
    fn test_dense_layout_fits_capacity() {
        let departures: std::vec::Vec<(&str, &str, i64)> = ["49", "N49", "47A", "U4"]
            .iter()
            .flat_map(|l| [(*l, "A", 30), (*l, "B", 60), (*l, "C", 90)])
            .collect();
        let model = make_model(&departures);
        assert_eq!(model.entry_count(), BODY_ROWS);
        let out = render(&model, Freshness::Stale { age_s: 999_999 }, Connectivity::Level(4), AnimationPhase::Visible, DrawKind::Partial);
        // two status clears + 4 status items + 4 badges + 12 × (dest, countdown, clear, glyph)
        assert_eq!(out.len(), 2 + 4 + 4 + 12 * 4);
    }

    proptest! {
        #[test]
        fn prop_render_idempotent(
            offsets in prop::collection::vec(-120i64..3600, 0..12),
            age in 0u32..100_000,
            visible in any::<bool>(),
        ) {
            let departures: std::vec::Vec<(&str, &str, i64)> =
                offsets.iter().map(|o| ("49", "Ring", *o)).collect();
            let model = make_model(&departures);
            let phase = if visible { AnimationPhase::Visible } else { AnimationPhase::Hidden };
            let freshness = Freshness::Stale { age_s: age };
            for kind in [DrawKind::Full, DrawKind::Partial, DrawKind::AnimationRegion] {
                let a = render(&model, freshness, Connectivity::Level(1), phase, kind);
                let b = render(&model, freshness, Connectivity::Level(1), phase, kind);
                prop_assert_eq!(a, b);
            }
        }

        #[test]
        fn prop_animation_subset_of_full(
            offsets in prop::collection::vec(-120i64..600, 0..12),
            visible in any::<bool>(),
        ) {
            let departures: std::vec::Vec<(&str, &str, i64)> =
                offsets.iter().map(|o| ("49", "Ring", *o)).collect();
            let model = make_model(&departures);
            let phase = if visible { AnimationPhase::Visible } else { AnimationPhase::Hidden };
            let full = render(&model, Freshness::Fresh, Connectivity::Level(1), phase, DrawKind::Full);
            let anim = render(&model, Freshness::Fresh, Connectivity::Level(1), phase, DrawKind::AnimationRegion);
            for w in &anim {
                prop_assert!(full.contains(w));
            }
        }
    }
}
