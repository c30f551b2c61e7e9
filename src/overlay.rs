use egui::Color32;

use crate::resources::{stamp_text, PixelFont};
use crate::surface::{Position, RasterSurface};

/// The live preview for an in-flight text transaction.
#[derive(Debug, Clone)]
pub struct TextPreview {
    pub text: String,
    pub pos: Position,
    /// Text height in logical pixels; the host scales by zoom for display.
    pub font_px: usize,
    pub font: usize,
    pub color: Color32,
}

/// Live preview plus commit of text onto the raster surface.
///
/// While a text-mode transaction is active the preview follows the
/// gesture's latest position. Ending the transaction commits the text in a
/// single fill; cancelling clears the preview without committing.
#[derive(Debug, Default)]
pub struct TextOverlay {
    preview: Option<TextPreview>,
}

impl TextOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&mut self, text: String, pos: Position, font_px: usize, font: usize, color: Color32) {
        self.preview = Some(TextPreview {
            text,
            pos,
            font_px,
            font,
            color,
        });
    }

    /// Move the preview to the gesture's latest position.
    pub fn follow(&mut self, pos: Position) {
        if let Some(preview) = &mut self.preview {
            preview.pos = pos;
        }
    }

    pub fn preview(&self) -> Option<&TextPreview> {
        self.preview.as_ref()
    }

    pub fn is_active(&self) -> bool {
        self.preview.is_some()
    }

    /// Commit the previewed text into the raster and clear the preview.
    pub fn commit(&mut self, surface: &mut RasterSurface, fonts: &[PixelFont]) {
        let Some(preview) = self.preview.take() else {
            return;
        };
        let Some(font) = fonts.get(preview.font).or_else(|| fonts.first()) else {
            return;
        };
        stamp_text(
            surface,
            &preview.text,
            preview.pos,
            preview.font_px,
            font,
            preview.color,
        );
    }

    /// Drop the preview without touching the raster.
    pub fn cancel(&mut self) {
        self.preview = None;
    }
}
