use std::io::Cursor;

use image::{ImageFormat, Rgb, RgbImage};

use crate::error::AutofillError;

pub const SWATCH_SIZE: u32 = 100;

/// Parse `#rrggbb`, `rrggbb`, or the three-digit short form.
///
/// # Errors
///
/// Returns [`AutofillError::InvalidColor`] for anything else.
pub fn parse_hex(hex: &str) -> Result<[u8; 3], AutofillError> {
    let invalid = || AutofillError::InvalidColor(hex.to_string());
    let digits = hex.trim().trim_start_matches('#');
    if !digits.is_ascii() {
        return Err(invalid());
    }
    let expanded: String = match digits.len() {
        3 => digits.chars().flat_map(|c| [c, c]).collect(),
        6 => digits.to_string(),
        _ => return Err(invalid()),
    };
    let channel = |i: usize| u8::from_str_radix(&expanded[i..i + 2], 16).map_err(|_| invalid());
    Ok([channel(0)?, channel(2)?, channel(4)?])
}

/// Solid `SWATCH_SIZE`×`SWATCH_SIZE` PNG in the given colour.
///
/// # Errors
///
/// [`AutofillError::InvalidColor`] for a bad hex, [`AutofillError::Image`]
/// if PNG encoding fails.
pub fn solid_png(hex: &str) -> Result<Vec<u8>, AutofillError> {
    let rgb = parse_hex(hex)?;
    let img = RgbImage::from_pixel(SWATCH_SIZE, SWATCH_SIZE, Rgb(rgb));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Png)?;
    Ok(out.into_inner())
}
