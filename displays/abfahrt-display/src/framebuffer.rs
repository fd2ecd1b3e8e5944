//! 1-bit frame buffer
//!
//! Backing store for the whole panel. Drawing goes through
//! embedded-graphics; the packed bytes go to the panel unchanged.

use abfahrt_core::render::{Rect, HEIGHT, WIDTH};
use embedded_graphics::{pixelcolor::BinaryColor, prelude::*, primitives::Rectangle};

/// Bytes per pixel row
pub const ROW_BYTES: usize = WIDTH as usize / 8;

/// Total buffer size (15000 bytes)
pub const BUFFER_SIZE: usize = ROW_BYTES * HEIGHT as usize;

/// Frame buffer for the 400×300 panel
///
/// `BinaryColor::On` is black ink, `BinaryColor::Off` is white paper.
#[derive(Clone)]
pub struct FrameBuffer {
    buffer: [u8; BUFFER_SIZE],
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameBuffer {
    /// Create a white buffer
    pub const fn new() -> Self {
        Self {
            buffer: [0xFF; BUFFER_SIZE],
        }
    }

    /// Fill the whole buffer with one color
    pub fn clear(&mut self, color: BinaryColor) {
        self.buffer.fill(Self::fill_byte(color));
    }

    /// Set a single pixel; out-of-range coordinates are ignored
    pub fn set_pixel(&mut self, x: u32, y: u32, color: BinaryColor) {
        if x >= WIDTH as u32 || y >= HEIGHT as u32 {
            return;
        }
        let index = y as usize * ROW_BYTES + x as usize / 8;
        let mask = 0x80u8 >> (x % 8);
        match color {
            BinaryColor::On => self.buffer[index] &= !mask,
            BinaryColor::Off => self.buffer[index] |= mask,
        }
    }

    /// Read back a pixel; out-of-range reads as white
    pub fn pixel(&self, x: u32, y: u32) -> BinaryColor {
        if x >= WIDTH as u32 || y >= HEIGHT as u32 {
            return BinaryColor::Off;
        }
        let index = y as usize * ROW_BYTES + x as usize / 8;
        let mask = 0x80u8 >> (x % 8);
        if self.buffer[index] & mask == 0 {
            BinaryColor::On
        } else {
            BinaryColor::Off
        }
    }

    /// Fill a panel rectangle, clipped to the screen
    ///
    /// Whole bytes are written directly; only the ragged edges go
    /// pixel by pixel.
    pub fn fill_rect(&mut self, rect: &Rect, color: BinaryColor) {
        let x0 = rect.x.min(WIDTH) as usize;
        let x1 = rect.right().min(WIDTH) as usize;
        let y0 = rect.y.min(HEIGHT) as usize;
        let y1 = rect.bottom().min(HEIGHT) as usize;
        if x0 >= x1 || y0 >= y1 {
            return;
        }

        let byte_start = x0.div_ceil(8);
        let byte_end = x1 / 8;
        let fill = Self::fill_byte(color);
        for y in y0..y1 {
            if byte_start >= byte_end {
                for x in x0..x1 {
                    self.set_pixel(x as u32, y as u32, color);
                }
                continue;
            }
            for x in x0..byte_start * 8 {
                self.set_pixel(x as u32, y as u32, color);
            }
            let row = y * ROW_BYTES;
            self.buffer[row + byte_start..row + byte_end].fill(fill);
            for x in byte_end * 8..x1 {
                self.set_pixel(x as u32, y as u32, color);
            }
        }
    }

    /// Count black pixels inside a rectangle
    pub fn ink_in(&self, rect: &Rect) -> usize {
        let mut count = 0;
        for y in rect.y..rect.bottom().min(HEIGHT) {
            for x in rect.x..rect.right().min(WIDTH) {
                if self.pixel(x as u32, y as u32) == BinaryColor::On {
                    count += 1;
                }
            }
        }
        count
    }

    /// Packed rows for the panel
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    /// Packed bytes of one pixel row
    pub fn row(&self, y: u16) -> &[u8] {
        let start = (y.min(HEIGHT - 1)) as usize * ROW_BYTES;
        &self.buffer[start..start + ROW_BYTES]
    }

    fn fill_byte(color: BinaryColor) -> u8 {
        match color {
            BinaryColor::On => 0x00,
            BinaryColor::Off => 0xFF,
        }
    }
}

/// Convert a layout rectangle to an embedded-graphics one
pub fn to_rectangle(rect: &Rect) -> Rectangle {
    Rectangle::new(
        Point::new(rect.x as i32, rect.y as i32),
        Size::new(rect.w as u32, rect.h as u32),
    )
}

impl DrawTarget for FrameBuffer {
    type Color = BinaryColor;
    type Error = core::convert::Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            if point.x >= 0 && point.y >= 0 {
                self.set_pixel(point.x as u32, point.y as u32, color);
            }
        }
        Ok(())
    }

    fn fill_solid(&mut self, area: &Rectangle, color: Self::Color) -> Result<(), Self::Error> {
        let area = area.intersection(&self.bounding_box());
        if let Some(bottom_right) = area.bottom_right() {
            let rect = Rect::new(
                area.top_left.x as u16,
                area.top_left.y as u16,
                (bottom_right.x - area.top_left.x + 1) as u16,
                (bottom_right.y - area.top_left.y + 1) as u16,
            );
            self.fill_rect(&rect, color);
        }
        Ok(())
    }
}

impl OriginDimensions for FrameBuffer {
    fn size(&self) -> Size {
        Size::new(WIDTH as u32, HEIGHT as u32)
    }
}
