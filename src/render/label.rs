use font8x8::{UnicodeFonts, BASIC_FONTS};

use image::{Rgb, RgbImage};

/// Width and height of a glyph in the bitmap font
const GLYPH_SIZE: u32 = 8;
/// Preferred scale, close to the 20px label of the front-end
const PREFERRED_SCALE: u32 = 2;

/// Picks the largest scale at which `text` still fits `max_width`
pub fn label_scale(text: &str, max_width: u32) -> u32 {
    let chars = text.chars().count() as u32;
    if chars * GLYPH_SIZE * PREFERRED_SCALE <= max_width {
        PREFERRED_SCALE
    } else {
        1
    }
}

/// Width in pixels of `text` drawn at `scale`
pub fn label_width(text: &str, scale: u32) -> u32 {
    text.chars().count() as u32 * GLYPH_SIZE * scale
}

/// Draws `text` horizontally centered on the canvas, with its baseline at `baseline`.
///
/// Pixels that land outside the canvas are dropped, so long labels are clipped
/// on both sides instead of failing.
pub fn draw_centered_label(canvas: &mut RgbImage, text: &str, baseline: u32, color: Rgb<u8>) {
    let scale = label_scale(text, canvas.width());
    let width = i64::from(label_width(text, scale));
    let glyph_advance = i64::from(GLYPH_SIZE * scale);
    let left = (i64::from(canvas.width()) - width) / 2;
    let top = i64::from(baseline) - glyph_advance;

    for (index, character) in text.chars().enumerate() {
        // Characters outside the basic latin block render as blanks
        let glyph = match BASIC_FONTS.get(character) {
            Some(glyph) => glyph,
            None => continue,
        };
        let glyph_left = left + index as i64 * glyph_advance;
        for (row, bits) in glyph.iter().enumerate() {
            for column in 0..GLYPH_SIZE {
                if bits & (1 << column) == 0 {
                    continue;
                }
                let x = glyph_left + i64::from(column * scale);
                let y = top + row as i64 * i64::from(scale);
                fill_square(canvas, x, y, scale, color);
            }
        }
    }
}

#[doc(hidden)]
fn fill_square(canvas: &mut RgbImage, x: i64, y: i64, size: u32, color: Rgb<u8>) {
    for dy in 0..i64::from(size) {
        for dx in 0..i64::from(size) {
            let (px, py) = (x + dx, y + dy);
            if px < 0 || py < 0 || px >= i64::from(canvas.width()) || py >= i64::from(canvas.height())
            {
                continue;
            }
            canvas.put_pixel(px as u32, py as u32, color);
        }
    }
}
