//! Edge-detection stylization producing a sketch-like composite.

use egui::{Color32, ColorImage};

use crate::surface::RasterSurface;

use super::{luma, yield_now};

/// Background the traced edges are composited over.
const TRACE_BACKGROUND: Color32 = Color32::from_rgb(0xf5, 0xf4, 0xef);

#[rustfmt::skip]
const LAPLACIAN: [f32; 9] = [
    1.0,  1.0, 1.0,
    1.0, -8.0, 1.0,
    1.0,  1.0, 1.0,
];

/// Single row-major pass: for each pixel, a Laplacian response over the
/// 3x3 neighborhood's [0, 1] lightness becomes the alpha compositing the
/// center color over the fixed light background. The neighborhood reads an
/// untouched copy of the source, never the partially written output.
/// Yields once per row.
pub async fn trace_edges(src: &ColorImage, surface: &mut RasterSurface) {
    let [w, h] = src.size;
    if w == 0 || h == 0 {
        return;
    }
    log::debug!("edge trace pass over {w}x{h} source");

    for y in 0..h {
        for x in 0..w {
            let mut response = 0.0;
            for ky in 0..3 {
                for kx in 0..3 {
                    let sx = (x as i32 + kx - 1).clamp(0, w as i32 - 1) as usize;
                    let sy = (y as i32 + ky - 1).clamp(0, h as i32 - 1) as usize;
                    let lightness = luma(src.pixels[sy * w + sx]) / 255.0;
                    response += LAPLACIAN[(ky * 3 + kx) as usize] * lightness;
                }
            }
            let alpha = response.abs().clamp(0.0, 1.0);
            let center = src.pixels[y * w + x];
            surface.fill_logical_block(x as i32, y as i32, blend(TRACE_BACKGROUND, center, alpha));
        }
        yield_now().await;
    }
}

fn blend(bg: Color32, fg: Color32, alpha: f32) -> Color32 {
    let mix = |b: u8, f: u8| (b as f32 + (f as f32 - b as f32) * alpha).round() as u8;
    Color32::from_rgb(
        mix(bg.r(), fg.r()),
        mix(bg.g(), fg.g()),
        mix(bg.b(), fg.b()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_source_composites_to_pure_background() {
        let src = ColorImage::new([6, 6], Color32::from_rgb(90, 120, 30));
        let mut surface = RasterSurface::new(6, 6, 1, Color32::WHITE);
        futures::executor::block_on(trace_edges(&src, &mut surface));
        assert!(surface
            .image()
            .pixels
            .iter()
            .all(|&p| p == TRACE_BACKGROUND));
    }

    #[test]
    fn contrast_edge_traces_the_dark_side() {
        // Left half black, right half white: the boundary columns respond.
        let mut src = ColorImage::new([8, 4], Color32::WHITE);
        for y in 0..4 {
            for x in 0..4 {
                src.pixels[y * 8 + x] = Color32::BLACK;
            }
        }
        let mut surface = RasterSurface::new(8, 4, 1, Color32::WHITE);
        futures::executor::block_on(trace_edges(&src, &mut surface));
        // Interior of each half stays background.
        assert_eq!(surface.logical_pixel(1, 2), Some(TRACE_BACKGROUND));
        assert_eq!(surface.logical_pixel(6, 2), Some(TRACE_BACKGROUND));
        // The black column at the boundary composites toward its center
        // color.
        assert_ne!(surface.logical_pixel(3, 2), Some(TRACE_BACKGROUND));
    }
}
