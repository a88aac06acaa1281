//! Text and clock rendering
//!
//! Turns message text and the current time into sign-sized bitmaps using
//! `embedded-graphics` mono fonts.

mod imager;
mod text;

use chrono::NaiveDateTime;
use thiserror::Error;

use flipapps_core::Bitmap;

pub use imager::{envelope, TextImager};
pub use text::{font_by_name, MonoTextBuilder, TextBuilder, FONT_NAMES};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ImagingError {
    #[error("font is {font}px tall, signs are only {sign}px")]
    FontTooTall { font: u32, sign: u32 },
    #[error("font is {font}px wide, signs are only {sign}px")]
    FontTooWide { font: u32, sign: u32 },
    #[error("unknown font {0:?}")]
    UnknownFont(String),
    #[error("text rendered to no images")]
    NoImages,
}

/// Renders what the application shows
pub trait Imager {
    /// A message from `sender`: the sender line(s), padded to whole rounds,
    /// then the text
    fn message(&self, sender: &str, text: &str) -> Result<Vec<Bitmap>, ImagingError>;

    /// The clock face for `now`, with the pending-message indicator when
    /// `pending` is set
    fn clock(&self, now: &NaiveDateTime, pending: bool) -> Result<Vec<Bitmap>, ImagingError>;
}
