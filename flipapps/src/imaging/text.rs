//! Mono-font text layout
//!
//! Text is word-wrapped by character count, one line per bitmap. Words
//! longer than a line are split across lines.

use std::convert::Infallible;

use embedded_graphics::mono_font::{ascii, MonoFont, MonoTextStyle};
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::text::{Alignment, Baseline, Text, TextStyleBuilder};

use flipapps_core::Bitmap;

use super::ImagingError;

/// Font names accepted by [`font_by_name`]
pub const FONT_NAMES: &[&str] = &[
    "4x6", "5x7", "5x8", "6x9", "6x10", "6x12", "6x13", "7x13", "7x14", "8x13", "9x15", "9x18",
    "10x20",
];

/// Look up a built-in ASCII mono font by its `WxH` name
pub fn font_by_name(name: &str) -> Option<&'static MonoFont<'static>> {
    let font = match name {
        "4x6" => &ascii::FONT_4X6,
        "5x7" => &ascii::FONT_5X7,
        "5x8" => &ascii::FONT_5X8,
        "6x9" => &ascii::FONT_6X9,
        "6x10" => &ascii::FONT_6X10,
        "6x12" => &ascii::FONT_6X12,
        "6x13" => &ascii::FONT_6X13,
        "7x13" => &ascii::FONT_7X13,
        "7x14" => &ascii::FONT_7X14,
        "8x13" => &ascii::FONT_8X13,
        "9x15" => &ascii::FONT_9X15,
        "9x18" => &ascii::FONT_9X18,
        "10x20" => &ascii::FONT_10X20,
        _ => return None,
    };
    Some(font)
}

/// Lays text out into sign-sized bitmaps
pub trait TextBuilder {
    /// One bitmap per line; empty text yields a single blank bitmap
    fn images(&self, text: &str, centre: bool) -> Vec<Bitmap>;

    /// (width, height) of every bitmap produced
    fn size(&self) -> (u32, u32);
}

/// [`TextBuilder`] backed by an `embedded-graphics` mono font
pub struct MonoTextBuilder {
    font: &'static MonoFont<'static>,
    width: u32,
    height: u32,
    columns: usize,
}

impl MonoTextBuilder {
    /// Fails if a single character does not fit on the sign
    pub fn new(
        font: &'static MonoFont<'static>,
        width: u32,
        height: u32,
    ) -> Result<Self, ImagingError> {
        let glyph = font.character_size;
        if glyph.height > height {
            return Err(ImagingError::FontTooTall {
                font: glyph.height,
                sign: height,
            });
        }
        if glyph.width > width {
            return Err(ImagingError::FontTooWide {
                font: glyph.width,
                sign: width,
            });
        }

        let spacing = font.character_spacing;
        let columns = ((width + spacing) / (glyph.width + spacing)) as usize;

        Ok(Self {
            font,
            width,
            height,
            columns,
        })
    }

    /// Characters per line
    pub fn columns(&self) -> usize {
        self.columns
    }

    fn render(&self, line: &str, centre: bool) -> Bitmap {
        let mut canvas = Canvas(Bitmap::blank(self.width, self.height));
        if line.is_empty() {
            return canvas.0;
        }

        let character_style = MonoTextStyle::new(self.font, BinaryColor::On);
        let (alignment, x) = if centre {
            (Alignment::Center, (self.width / 2) as i32)
        } else {
            (Alignment::Left, 0)
        };
        let text_style = TextStyleBuilder::new()
            .alignment(alignment)
            .baseline(Baseline::Top)
            .build();
        let y = ((self.height - self.font.character_size.height) / 2) as i32;

        // Canvas drawing is infallible
        let _ = Text::with_text_style(line, Point::new(x, y), character_style, text_style)
            .draw(&mut canvas);
        canvas.0
    }
}

impl TextBuilder for MonoTextBuilder {
    fn images(&self, text: &str, centre: bool) -> Vec<Bitmap> {
        wrap(text, self.columns)
            .iter()
            .map(|line| self.render(line, centre))
            .collect()
    }

    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

/// Greedy word wrap to `columns` characters; `\n` forces a break
fn wrap(text: &str, columns: usize) -> Vec<String> {
    let columns = columns.max(1);
    let mut lines = Vec::new();

    for paragraph in text.split('\n') {
        let mut current = String::new();
        let mut current_len = 0;

        for word in paragraph.split_whitespace() {
            let chars: Vec<char> = word.chars().collect();
            for chunk in chars.chunks(columns) {
                let needed = if current_len == 0 {
                    chunk.len()
                } else {
                    current_len + 1 + chunk.len()
                };
                if needed > columns {
                    lines.push(std::mem::take(&mut current));
                    current_len = 0;
                }
                if current_len > 0 {
                    current.push(' ');
                    current_len += 1;
                }
                current.extend(chunk);
                current_len += chunk.len();
            }
        }
        lines.push(current);
    }
    lines
}

/// Draw target writing into a [`Bitmap`]
struct Canvas(Bitmap);

impl OriginDimensions for Canvas {
    fn size(&self) -> Size {
        Size::new(self.0.width(), self.0.height())
    }
}

impl DrawTarget for Canvas {
    type Color = BinaryColor;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(coord, color) in pixels {
            if coord.x >= 0 && coord.y >= 0 {
                self.0.set(coord.x as u32, coord.y as u32, color.is_on());
            }
        }
        Ok(())
    }
}
