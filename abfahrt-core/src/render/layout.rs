//! Screen geometry and draw primitives
//!
//! Fixed layout for a 400×300 monochrome panel:
//!
//! ```text
//! y=0   +------------------------------------------------+
//!       | Updated 12:34              *61s          ▂▄▆█ |  status band
//! y=24  +------------------------------------------------+
//! y=28  | 49   Ottakring                      due    ◆  |  body row 0
//! y=50  |      Ring                            4m       |  body row 1
//!  ...  |                                               |
//! y=292 +------------------------------------------------+
//! ```

use heapless::{String, Vec};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Panel width in pixels
pub const WIDTH: u16 = 400;

/// Panel height in pixels
pub const HEIGHT: u16 = 300;

/// Status band height
pub const STATUS_BAND_HEIGHT: u16 = 24;

/// Separator line below the status band
pub const SEPARATOR_Y: u16 = 25;

/// First body row
pub const BODY_TOP: u16 = 28;

/// Body row pitch
pub const ROW_HEIGHT: u16 = 22;

/// Body rows that fit below the status band
pub const BODY_ROWS: usize = ((HEIGHT - BODY_TOP) / ROW_HEIGHT) as usize;

/// Outer margin
pub const MARGIN: u16 = 4;

pub const BADGE_X: u16 = MARGIN;
pub const BADGE_WIDTH: u16 = 48;
pub const GLYPH_WIDTH: u16 = 12;
pub const GLYPH_X: u16 = WIDTH - MARGIN - GLYPH_WIDTH;
pub const COUNTDOWN_WIDTH: u16 = 44;
pub const COUNTDOWN_X: u16 = GLYPH_X - MARGIN - COUNTDOWN_WIDTH;
pub const DESTINATION_X: u16 = BADGE_X + BADGE_WIDTH + MARGIN;
pub const DESTINATION_WIDTH: u16 = COUNTDOWN_X - MARGIN - DESTINATION_X;

pub const SIGNAL_WIDTH: u16 = 24;
pub const SIGNAL_X: u16 = WIDTH - MARGIN - SIGNAL_WIDTH;
pub const STALE_WIDTH: u16 = 72;
pub const STALE_X: u16 = SIGNAL_X - MARGIN - STALE_WIDTH;
pub const UPDATED_WIDTH: u16 = 120;

/// Longest text a single write carries, in bytes
pub const MAX_TEXT_LEN: usize = 48;

/// Most writes a single render produces
pub const MAX_WRITES: usize = 96;

/// Pixel rectangle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Rect {
    pub x: u16,
    pub y: u16,
    pub w: u16,
    pub h: u16,
}

impl Rect {
    pub const fn new(x: u16, y: u16, w: u16, h: u16) -> Self {
        Self { x, y, w, h }
    }

    /// Whole panel
    pub const fn screen() -> Self {
        Self::new(0, 0, WIDTH, HEIGHT)
    }

    pub fn right(&self) -> u16 {
        self.x.saturating_add(self.w)
    }

    pub fn bottom(&self) -> u16 {
        self.y.saturating_add(self.h)
    }

    pub fn is_empty(&self) -> bool {
        self.w == 0 || self.h == 0
    }

    /// Smallest rectangle covering both
    pub fn union(&self, other: &Rect) -> Rect {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        Rect::new(
            x,
            y,
            self.right().max(other.right()) - x,
            self.bottom().max(other.bottom()) - y,
        )
    }
}

/// Fonts available on every display backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Font {
    /// 6×13, status band
    Small,
    /// 10×20, departure rows
    Large,
}

impl Font {
    pub const fn char_width(self) -> u16 {
        match self {
            Font::Small => 6,
            Font::Large => 10,
        }
    }

    pub const fn char_height(self) -> u16 {
        match self {
            Font::Small => 13,
            Font::Large => 20,
        }
    }

    /// Characters that fit in `width` pixels
    pub const fn max_chars(self, width: u16) -> usize {
        (width / self.char_width()) as usize
    }
}

/// Horizontal text alignment within the write rectangle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Align {
    Left,
    Center,
    Right,
}

/// Drawing operation confined to one rectangle
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum DrawOp {
    /// Fill with background (white)
    Clear,
    /// Fill with foreground (black)
    Fill,
    /// Text, vertically centered
    Text {
        text: String<MAX_TEXT_LEN>,
        font: Font,
        align: Align,
        /// White on black
        inverted: bool,
    },
    /// Signal strength bars, `level` of four filled
    SignalBars { level: u8 },
    /// Crossed-out signal indicator
    NoSignal,
    /// Arriving indicator
    BlinkGlyph,
}

/// One pixel-region write handed to the display driver
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RegionWrite {
    pub rect: Rect,
    pub op: DrawOp,
    /// Part of the blink animation
    pub blink: bool,
}

impl RegionWrite {
    pub fn new(rect: Rect, op: DrawOp) -> Self {
        Self {
            rect,
            op,
            blink: false,
        }
    }

    pub fn blinking(rect: Rect, op: DrawOp) -> Self {
        Self {
            rect,
            op,
            blink: true,
        }
    }
}

/// Render output
pub type RegionWrites = Vec<RegionWrite, MAX_WRITES>;

/// Rectangle of body row `index`
pub fn body_row(index: usize) -> Rect {
    Rect::new(0, BODY_TOP + index as u16 * ROW_HEIGHT, WIDTH, ROW_HEIGHT)
}

/// Whole body area below the status band
pub const fn body_area() -> Rect {
    Rect::new(0, BODY_TOP, WIDTH, HEIGHT - BODY_TOP)
}

/// Status band area including the separator
pub const fn status_area() -> Rect {
    Rect::new(0, 0, WIDTH, BODY_TOP)
}
