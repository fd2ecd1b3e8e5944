//! Region write rasterizer
//!
//! Turns one `RegionWrite` into pixels. Every operation is clipped to
//! its rectangle so a write never disturbs its neighbours.

use abfahrt_core::render::{Align, DrawOp, Font, Rect, RegionWrite};
use embedded_graphics::{
    mono_font::{iso_8859_1, MonoFont, MonoTextStyle},
    pixelcolor::BinaryColor,
    prelude::*,
    primitives::{Circle, Line, PrimitiveStyle, Rectangle},
    text::{Alignment, Baseline, Text, TextStyleBuilder},
};

use crate::framebuffer::to_rectangle;

/// Gap between signal bars
const BAR_GAP: u32 = 2;

/// Signal bar count
const BARS: u32 = 4;

/// Glyph font for a layout font
///
/// ISO 8859-1 covers the umlauts in Viennese stop names.
pub fn mono_font(font: Font) -> &'static MonoFont<'static> {
    match font {
        Font::Small => &iso_8859_1::FONT_6X13,
        Font::Large => &iso_8859_1::FONT_10X20,
    }
}

/// Rasterize one region write
pub fn paint<D>(target: &mut D, write: &RegionWrite) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    let area = to_rectangle(&write.rect);
    let mut target = target.clipped(&area);

    match &write.op {
        DrawOp::Clear => target.fill_solid(&area, BinaryColor::Off),
        DrawOp::Fill => target.fill_solid(&area, BinaryColor::On),
        DrawOp::Text {
            text,
            font,
            align,
            inverted,
        } => {
            let color = if *inverted {
                target.fill_solid(&area, BinaryColor::On)?;
                BinaryColor::Off
            } else {
                BinaryColor::On
            };
            draw_text(&mut target, &write.rect, text, *font, *align, color)
        }
        DrawOp::SignalBars { level } => draw_bars(&mut target, &write.rect, *level),
        DrawOp::NoSignal => draw_no_signal(&mut target, &write.rect),
        DrawOp::BlinkGlyph => {
            let diameter = write.rect.w.min(write.rect.h).saturating_sub(2) as u32;
            Circle::with_center(area.center(), diameter)
                .into_styled(PrimitiveStyle::with_fill(BinaryColor::On))
                .draw(&mut target)
        }
    }
}

fn draw_text<D>(
    target: &mut D,
    rect: &Rect,
    text: &str,
    font: Font,
    align: Align,
    color: BinaryColor,
) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    let style = MonoTextStyle::new(mono_font(font), color);
    let (x, alignment) = match align {
        Align::Left => (rect.x as i32, Alignment::Left),
        Align::Center => ((rect.x + rect.w / 2) as i32, Alignment::Center),
        Align::Right => (rect.right() as i32 - 1, Alignment::Right),
    };
    let y = (rect.y + rect.h / 2) as i32;
    let text_style = TextStyleBuilder::new()
        .alignment(alignment)
        .baseline(Baseline::Middle)
        .build();

    Text::with_text_style(text, Point::new(x, y), style, text_style).draw(target)?;
    Ok(())
}

/// Four bottom-aligned bars of rising height; `level` of them filled
fn draw_bars<D>(target: &mut D, rect: &Rect, level: u8) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    let width = rect.w as u32;
    let height = rect.h as u32;
    let bar_w = (width.saturating_sub(BAR_GAP * (BARS - 1)) / BARS).max(1);
    let bottom = rect.bottom() as i32;

    for i in 0..BARS {
        let bar_h = (height * (i + 1) / BARS).max(1);
        let x = rect.x as i32 + (i * (bar_w + BAR_GAP)) as i32;
        let bar = Rectangle::new(Point::new(x, bottom - bar_h as i32), Size::new(bar_w, bar_h));
        let style = if (i as u8) < level {
            PrimitiveStyle::with_fill(BinaryColor::On)
        } else {
            PrimitiveStyle::with_stroke(BinaryColor::On, 1)
        };
        bar.into_styled(style).draw(target)?;
    }
    Ok(())
}

/// Empty bars crossed out
fn draw_no_signal<D>(target: &mut D, rect: &Rect) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    draw_bars(target, rect, 0)?;

    let left = rect.x as i32;
    let top = rect.y as i32;
    let right = rect.right() as i32 - 1;
    let bottom = rect.bottom() as i32 - 1;
    let stroke = PrimitiveStyle::with_stroke(BinaryColor::On, 2);
    Line::new(Point::new(left, top), Point::new(right, bottom))
        .into_styled(stroke)
        .draw(target)?;
    Line::new(Point::new(left, bottom), Point::new(right, top))
        .into_styled(stroke)
        .draw(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framebuffer::FrameBuffer;
    use abfahrt_core::render::{HEIGHT, WIDTH};
    use heapless::String;

    fn text_write(text: &str, rect: Rect, align: Align, inverted: bool) -> RegionWrite {
        RegionWrite::new(
            rect,
            DrawOp::Text {
                text: String::try_from(text).unwrap(),
                font: Font::Large,
                align,
                inverted,
            },
        )
    }

    fn paint_one(write: &RegionWrite) -> FrameBuffer {
        let mut fb = FrameBuffer::new();
        paint(&mut fb, write).unwrap();
        fb
    }

    /// Ink outside `rect`
    fn ink_outside(fb: &FrameBuffer, rect: &Rect) -> usize {
        fb.ink_in(&Rect::screen()) - fb.ink_in(rect)
    }

    #[test]
    fn test_clear_and_fill() {
        let rect = Rect::new(10, 10, 30, 5);
        let mut fb = FrameBuffer::new();
        paint(&mut fb, &RegionWrite::new(rect, DrawOp::Fill)).unwrap();
        assert_eq!(fb.ink_in(&rect), 150);
        paint(&mut fb, &RegionWrite::new(rect, DrawOp::Clear)).unwrap();
        assert_eq!(fb.ink_in(&Rect::screen()), 0);
    }

    #[test]
    fn test_text_stays_in_rect() {
        let rect = Rect::new(56, 28, 60, 22);
        let write = text_write("Ottakring Bahnhof", rect, Align::Left, false);
        let fb = paint_one(&write);
        assert!(fb.ink_in(&rect) > 0);
        assert_eq!(ink_outside(&fb, &rect), 0);
    }

    #[test]
    fn test_text_alignment() {
        let rect = Rect::new(0, 0, 200, 22);
        let left = paint_one(&text_write("49", rect, Align::Left, false));
        let right = paint_one(&text_write("49", rect, Align::Right, false));
        let left_half = Rect::new(0, 0, 100, 22);
        let right_half = Rect::new(100, 0, 100, 22);
        assert!(left.ink_in(&left_half) > 0);
        assert_eq!(left.ink_in(&right_half), 0);
        assert!(right.ink_in(&right_half) > 0);
        assert_eq!(right.ink_in(&left_half), 0);
    }

    #[test]
    fn test_inverted_text_is_mostly_black() {
        let rect = Rect::new(4, 29, 48, 20);
        let fb = paint_one(&text_write("U4", rect, Align::Center, true));
        let area = (rect.w as usize) * (rect.h as usize);
        let ink = fb.ink_in(&rect);
        assert!(ink > area / 2);
        assert!(ink < area);
        assert_eq!(ink_outside(&fb, &rect), 0);
    }

    #[test]
    fn test_umlauts_render() {
        let rect = Rect::new(0, 0, 100, 22);
        let fb = paint_one(&text_write("Hütteldorf", rect, Align::Left, false));
        assert!(fb.ink_in(&rect) > 0);
    }

    #[test]
    fn test_signal_bars_grow_with_level() {
        let rect = Rect::new(372, 4, 24, 16);
        let ink = |level| paint_one(&RegionWrite::new(rect, DrawOp::SignalBars { level })).ink_in(&rect);
        assert!(ink(0) > 0);
        assert!(ink(1) < ink(2));
        assert!(ink(2) < ink(4));
        assert_eq!(ink(4), ink(9));
    }

    #[test]
    fn test_no_signal_differs_from_empty_bars() {
        let rect = Rect::new(372, 4, 24, 16);
        let empty = paint_one(&RegionWrite::new(rect, DrawOp::SignalBars { level: 0 }));
        let crossed = paint_one(&RegionWrite::new(rect, DrawOp::NoSignal));
        assert!(crossed.ink_in(&rect) > empty.ink_in(&rect));
        assert_eq!(ink_outside(&crossed, &rect), 0);
    }

    #[test]
    fn test_blink_glyph_centered_in_rect() {
        let rect = Rect::new(384, 33, 12, 12);
        let fb = paint_one(&RegionWrite::blinking(rect, DrawOp::BlinkGlyph));
        assert!(fb.ink_in(&rect) > 0);
        assert_eq!(ink_outside(&fb, &rect), 0);
        assert_eq!(fb.pixel(390, 39), BinaryColor::On);
    }

    #[test]
    fn test_full_screen_write() {
        let fb = paint_one(&RegionWrite::new(Rect::screen(), DrawOp::Fill));
        assert_eq!(fb.ink_in(&Rect::screen()), WIDTH as usize * HEIGHT as usize);
    }
}
