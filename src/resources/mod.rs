//! Static drawing resources: brush stamps, tone patterns, the color
//! palette, the fuzziness noise field and the pixel font. All catalogs are
//! immutable; tools refer to entries by index.

mod brushes;
mod font;
mod noise;
mod palette;
mod tones;

pub use brushes::{Brush, BRUSHES};
pub use font::{stamp_text, PixelFont, FONTS, GLYPH_HEIGHT, GLYPH_WIDTH};
pub use noise::FuzzinessField;
pub use palette::{PALETTE, REF_DARK, REF_LIGHT};
pub use tones::{Tone, TONES, TONE_PERIOD};
