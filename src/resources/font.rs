use egui::Color32;

use crate::surface::{Position, RasterSurface};

pub const GLYPH_WIDTH: usize = 5;
pub const GLYPH_HEIGHT: usize = 7;

/// A font catalog entry. Both entries rasterize from the same 5x7 glyph
/// bitmaps; the bold face doubles every glyph column.
pub struct PixelFont {
    pub name: &'static str,
    pub bold: bool,
}

pub const FONTS: &[PixelFont] = &[
    PixelFont {
        name: "pixel",
        bold: false,
    },
    PixelFont {
        name: "pixel bold",
        bold: true,
    },
];

/// Stamp a line of text into the raster, top-left anchored at `pos`.
/// The glyph grid scales in whole logical pixels from the requested height;
/// unknown characters render as the fallback box.
pub fn stamp_text(
    surface: &mut RasterSurface,
    text: &str,
    pos: Position,
    font_px: usize,
    font: &PixelFont,
    color: Color32,
) {
    let scale = (font_px / GLYPH_HEIGHT).max(1) as i32;
    let advance = (GLYPH_WIDTH as i32 + 1) * scale + if font.bold { scale } else { 0 };
    let mut pen_x = pos.x;
    for ch in text.chars() {
        stamp_glyph(surface, ch, pen_x, pos.y, scale, font.bold, color);
        pen_x += advance;
    }
}

fn stamp_glyph(
    surface: &mut RasterSurface,
    ch: char,
    x: i32,
    y: i32,
    scale: i32,
    bold: bool,
    color: Color32,
) {
    let glyph = glyph_columns(ch);
    for (cx, column) in glyph.iter().enumerate() {
        for cy in 0..GLYPH_HEIGHT {
            if column & (1 << cy) == 0 {
                continue;
            }
            let copies = if bold { 2 } else { 1 };
            for copy in 0..copies {
                let base_x = x + (cx as i32 * if bold { 2 } else { 1 } + copy) * scale;
                let base_y = y + cy as i32 * scale;
                for sy in 0..scale {
                    for sx in 0..scale {
                        surface.fill_logical_block(base_x + sx, base_y + sy, color);
                    }
                }
            }
        }
    }
}

fn glyph_columns(ch: char) -> [u8; GLYPH_WIDTH] {
    let code = ch as usize;
    if (0x20..0x20 + GLYPHS.len()).contains(&code) {
        GLYPHS[code - 0x20]
    } else {
        FALLBACK
    }
}

const FALLBACK: [u8; 5] = [0x7f, 0x41, 0x41, 0x41, 0x7f];

// Column-encoded 5x7 glyphs for printable ASCII, bit 0 = top row.
#[rustfmt::skip]
const GLYPHS: [[u8; 5]; 95] = [
    [0x00, 0x00, 0x00, 0x00, 0x00], // ' '
    [0x00, 0x00, 0x5f, 0x00, 0x00], // '!'
    [0x00, 0x07, 0x00, 0x07, 0x00], // '"'
    [0x14, 0x7f, 0x14, 0x7f, 0x14], // '#'
    [0x24, 0x2a, 0x7f, 0x2a, 0x12], // '$'
    [0x23, 0x13, 0x08, 0x64, 0x62], // '%'
    [0x36, 0x49, 0x55, 0x22, 0x50], // '&'
    [0x00, 0x05, 0x03, 0x00, 0x00], // '\''
    [0x00, 0x1c, 0x22, 0x41, 0x00], // '('
    [0x00, 0x41, 0x22, 0x1c, 0x00], // ')'
    [0x14, 0x08, 0x3e, 0x08, 0x14], // '*'
    [0x08, 0x08, 0x3e, 0x08, 0x08], // '+'
    [0x00, 0x50, 0x30, 0x00, 0x00], // ','
    [0x08, 0x08, 0x08, 0x08, 0x08], // '-'
    [0x00, 0x60, 0x60, 0x00, 0x00], // '.'
    [0x20, 0x10, 0x08, 0x04, 0x02], // '/'
    [0x3e, 0x51, 0x49, 0x45, 0x3e], // '0'
    [0x00, 0x42, 0x7f, 0x40, 0x00], // '1'
    [0x42, 0x61, 0x51, 0x49, 0x46], // '2'
    [0x21, 0x41, 0x45, 0x4b, 0x31], // '3'
    [0x18, 0x14, 0x12, 0x7f, 0x10], // '4'
    [0x27, 0x45, 0x45, 0x45, 0x39], // '5'
    [0x3c, 0x4a, 0x49, 0x49, 0x30], // '6'
    [0x01, 0x71, 0x09, 0x05, 0x03], // '7'
    [0x36, 0x49, 0x49, 0x49, 0x36], // '8'
    [0x06, 0x49, 0x49, 0x29, 0x1e], // '9'
    [0x00, 0x36, 0x36, 0x00, 0x00], // ':'
    [0x00, 0x56, 0x36, 0x00, 0x00], // ';'
    [0x08, 0x14, 0x22, 0x41, 0x00], // '<'
    [0x14, 0x14, 0x14, 0x14, 0x14], // '='
    [0x00, 0x41, 0x22, 0x14, 0x08], // '>'
    [0x02, 0x01, 0x51, 0x09, 0x06], // '?'
    [0x32, 0x49, 0x79, 0x41, 0x3e], // '@'
    [0x7e, 0x11, 0x11, 0x11, 0x7e], // 'A'
    [0x7f, 0x49, 0x49, 0x49, 0x36], // 'B'
    [0x3e, 0x41, 0x41, 0x41, 0x22], // 'C'
    [0x7f, 0x41, 0x41, 0x22, 0x1c], // 'D'
    [0x7f, 0x49, 0x49, 0x49, 0x41], // 'E'
    [0x7f, 0x09, 0x09, 0x09, 0x01], // 'F'
    [0x3e, 0x41, 0x49, 0x49, 0x7a], // 'G'
    [0x7f, 0x08, 0x08, 0x08, 0x7f], // 'H'
    [0x00, 0x41, 0x7f, 0x41, 0x00], // 'I'
    [0x20, 0x40, 0x41, 0x3f, 0x01], // 'J'
    [0x7f, 0x08, 0x14, 0x22, 0x41], // 'K'
    [0x7f, 0x40, 0x40, 0x40, 0x40], // 'L'
    [0x7f, 0x02, 0x0c, 0x02, 0x7f], // 'M'
    [0x7f, 0x04, 0x08, 0x10, 0x7f], // 'N'
    [0x3e, 0x41, 0x41, 0x41, 0x3e], // 'O'
    [0x7f, 0x09, 0x09, 0x09, 0x06], // 'P'
    [0x3e, 0x41, 0x51, 0x21, 0x5e], // 'Q'
    [0x7f, 0x09, 0x19, 0x29, 0x46], // 'R'
    [0x46, 0x49, 0x49, 0x49, 0x31], // 'S'
    [0x01, 0x01, 0x7f, 0x01, 0x01], // 'T'
    [0x3f, 0x40, 0x40, 0x40, 0x3f], // 'U'
    [0x1f, 0x20, 0x40, 0x20, 0x1f], // 'V'
    [0x3f, 0x40, 0x38, 0x40, 0x3f], // 'W'
    [0x63, 0x14, 0x08, 0x14, 0x63], // 'X'
    [0x07, 0x08, 0x70, 0x08, 0x07], // 'Y'
    [0x61, 0x51, 0x49, 0x45, 0x43], // 'Z'
    [0x00, 0x7f, 0x41, 0x41, 0x00], // '['
    [0x02, 0x04, 0x08, 0x10, 0x20], // '\\'
    [0x00, 0x41, 0x41, 0x7f, 0x00], // ']'
    [0x04, 0x02, 0x01, 0x02, 0x04], // '^'
    [0x40, 0x40, 0x40, 0x40, 0x40], // '_'
    [0x00, 0x01, 0x02, 0x04, 0x00], // '`'
    [0x20, 0x54, 0x54, 0x54, 0x78], // 'a'
    [0x7f, 0x48, 0x44, 0x44, 0x38], // 'b'
    [0x38, 0x44, 0x44, 0x44, 0x20], // 'c'
    [0x38, 0x44, 0x44, 0x48, 0x7f], // 'd'
    [0x38, 0x54, 0x54, 0x54, 0x18], // 'e'
    [0x08, 0x7e, 0x09, 0x01, 0x02], // 'f'
    [0x0c, 0x52, 0x52, 0x52, 0x3e], // 'g'
    [0x7f, 0x08, 0x04, 0x04, 0x78], // 'h'
    [0x00, 0x44, 0x7d, 0x40, 0x00], // 'i'
    [0x20, 0x40, 0x44, 0x3d, 0x00], // 'j'
    [0x7f, 0x10, 0x28, 0x44, 0x00], // 'k'
    [0x00, 0x41, 0x7f, 0x40, 0x00], // 'l'
    [0x7c, 0x04, 0x18, 0x04, 0x78], // 'm'
    [0x7c, 0x08, 0x04, 0x04, 0x78], // 'n'
    [0x38, 0x44, 0x44, 0x44, 0x38], // 'o'
    [0x7c, 0x14, 0x14, 0x14, 0x08], // 'p'
    [0x08, 0x14, 0x14, 0x18, 0x7c], // 'q'
    [0x7c, 0x08, 0x04, 0x04, 0x08], // 'r'
    [0x48, 0x54, 0x54, 0x54, 0x20], // 's'
    [0x04, 0x3f, 0x44, 0x40, 0x20], // 't'
    [0x3c, 0x40, 0x40, 0x20, 0x7c], // 'u'
    [0x1c, 0x20, 0x40, 0x20, 0x1c], // 'v'
    [0x3c, 0x40, 0x30, 0x40, 0x3c], // 'w'
    [0x44, 0x28, 0x10, 0x28, 0x44], // 'x'
    [0x0c, 0x50, 0x50, 0x50, 0x3c], // 'y'
    [0x44, 0x64, 0x54, 0x4c, 0x44], // 'z'
    [0x00, 0x08, 0x36, 0x41, 0x00], // '{'
    [0x00, 0x00, 0x7f, 0x00, 0x00], // '|'
    [0x00, 0x41, 0x36, 0x08, 0x00], // '}'
    [0x02, 0x01, 0x02, 0x04, 0x02], // '~'
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stamp_paints_within_text_bounds() {
        let mut surface = RasterSurface::new(64, 16, 1, Color32::WHITE);
        stamp_text(
            &mut surface,
            "Hi",
            Position::new(2, 3),
            7,
            &FONTS[0],
            Color32::BLACK,
        );
        let mut painted = 0;
        for y in 0..16 {
            for x in 0..64 {
                if surface.logical_pixel(x, y) == Some(Color32::BLACK) {
                    painted += 1;
                    assert!((2..2 + 12).contains(&x), "x={x} outside advance");
                    assert!((3..3 + 7).contains(&y), "y={y} outside glyph height");
                }
            }
        }
        assert!(painted > 0);
    }

    #[test]
    fn unknown_chars_render_fallback_box() {
        assert_eq!(glyph_columns('\u{3042}'), FALLBACK);
    }
}
