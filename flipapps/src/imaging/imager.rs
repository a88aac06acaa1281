use chrono::NaiveDateTime;

use flipapps_core::Bitmap;

use super::{Imager, ImagingError, TextBuilder};

const CLOCK_FORMAT: &str = "%a %-d %b\n%-I:%M %P";

/// Built-in 5x5 envelope shown while messages are waiting
pub fn envelope() -> Bitmap {
    #[rustfmt::skip]
    let pixels = [
        1, 1, 1, 1, 1,
        1, 1, 0, 1, 1,
        1, 0, 1, 0, 1,
        1, 0, 0, 0, 1,
        1, 1, 1, 1, 1,
    ];
    Bitmap::new(5, 5, pixels.iter().map(|&p| p == 1).collect())
        .unwrap_or_else(|_| Bitmap::blank(5, 5))
}

/// [`Imager`] laying out text with a [`TextBuilder`]
pub struct TextImager<B> {
    builder: B,
    signs: usize,
    status: Bitmap,
}

impl<B: TextBuilder> TextImager<B> {
    /// Imager for `signs` signs using the built-in envelope indicator
    pub fn new(builder: B, signs: usize) -> Self {
        Self::with_status(builder, signs, envelope())
    }

    pub fn with_status(builder: B, signs: usize, status: Bitmap) -> Self {
        Self {
            builder,
            signs: signs.max(1),
            status,
        }
    }

    fn blank(&self) -> Bitmap {
        let (width, height) = self.builder.size();
        Bitmap::blank(width, height)
    }
}

impl<B: TextBuilder> Imager for TextImager<B> {
    fn message(&self, sender: &str, text: &str) -> Result<Vec<Bitmap>, ImagingError> {
        let mut images = self.builder.images(&format!("From: {sender}"), false);
        // Text starts on the first sign of a fresh round
        while images.len() % self.signs != 0 {
            images.push(self.blank());
        }
        images.extend(self.builder.images(text, false));
        Ok(images)
    }

    fn clock(&self, now: &NaiveDateTime, pending: bool) -> Result<Vec<Bitmap>, ImagingError> {
        let text = now.format(CLOCK_FORMAT).to_string();
        let mut images = self.builder.images(&text, true);

        if pending {
            let first = images.first_mut().ok_or(ImagingError::NoImages)?;
            let x = first.width().saturating_sub(self.status.width());
            first.stamp(&self.status, x, 0);
        }
        Ok(images)
    }
}
