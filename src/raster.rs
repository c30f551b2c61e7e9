//! Brush rasterization: stamping brush/tone/fuzziness patterns onto the
//! raster surface at gesture positions.

use egui::Color32;

use crate::resources::{Brush, FuzzinessField, Tone};
use crate::surface::{Position, RasterSurface};

/// Everything a stamp needs besides the target position. Borrowed from the
/// engine's current tool configuration for the duration of a stroke.
pub struct StampParams<'a> {
    pub brush: &'a Brush,
    pub tone: &'a Tone,
    pub color: Color32,
    pub fuzziness: f32,
    pub noise: &'a FuzzinessField,
}

/// Stamp the brush centered on `p`. Each set brush cell samples the tone at
/// a fuzziness-perturbed phase and fills its zoom-scaled device block only
/// when the tone bit is set.
pub fn draw_point(surface: &mut RasterSurface, p: Position, params: &StampParams<'_>) {
    let radius = params.brush.radius() as i32;
    let period = params.tone.period as i32;
    for by in 0..params.brush.size {
        for bx in 0..params.brush.size {
            if !params.brush.bit(bx, by) {
                continue;
            }
            let px = p.x + bx as i32 - radius;
            let py = p.y + by as i32 - radius;
            let (ox, oy) = params.noise.offset(px, py, params.fuzziness);
            // Absolute-value modulo keeps the tone phase stable for
            // negative coordinates.
            let tx = ((px + ox).unsigned_abs() % period as u32) as usize;
            let ty = ((py + oy).unsigned_abs() % period as u32) as usize;
            if params.tone.bit(tx, ty) {
                surface.fill_logical_block(px, py, params.color);
            }
        }
    }
}

/// Stamp `draw_point` along the segment from `from` to `to`, interpolating
/// `max(1, round(distance))` steps so strokes stay gapless at the working
/// zoom. Interpolated points round half away from zero.
pub fn draw_line(
    surface: &mut RasterSurface,
    from: Position,
    to: Position,
    params: &StampParams<'_>,
) {
    let steps = from.distance(to).round().max(1.0) as i32;
    for i in 0..=steps {
        let t = i as f32 / steps as f32;
        let x = (from.x as f32 + (to.x - from.x) as f32 * t).round() as i32;
        let y = (from.y as f32 + (to.y - from.y) as f32 * t).round() as i32;
        draw_point(surface, Position::new(x, y), params);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::{BRUSHES, TONES};

    fn fill_params<'a>(noise: &'a FuzzinessField) -> StampParams<'a> {
        StampParams {
            brush: &BRUSHES[0],
            tone: &TONES[0],
            color: Color32::BLACK,
            fuzziness: 0.0,
            noise,
        }
    }

    #[test]
    fn single_cell_brush_paints_one_pixel() {
        let noise = FuzzinessField::new();
        let mut surface = RasterSurface::new(32, 32, 1, Color32::WHITE);
        draw_point(&mut surface, Position::new(10, 10), &fill_params(&noise));
        for y in 0..32 {
            for x in 0..32 {
                let expected = if (x, y) == (10, 10) {
                    Color32::BLACK
                } else {
                    Color32::WHITE
                };
                assert_eq!(surface.logical_pixel(x, y), Some(expected));
            }
        }
    }

    #[test]
    fn tone_phase_is_stable_across_zero() {
        static BITS: [u8; 1] = [1];
        let noise = FuzzinessField::new();
        let brush = Brush::custom(1, &BITS, 7);
        // "half" checkerboard tone: bit set iff (x + y) is even.
        let tone = &TONES[3];
        let mut surface = RasterSurface::new(8, 8, 1, Color32::WHITE);
        let params = StampParams {
            brush: &brush,
            tone,
            color: Color32::BLACK,
            fuzziness: 0.0,
            noise: &noise,
        };
        // Stamping at every cell must reproduce the checker on-canvas:
        // the phase depends only on the stamped coordinate.
        for y in 0..4 {
            for x in 0..4 {
                draw_point(&mut surface, Position::new(x, y), &params);
            }
        }
        for y in 0..4 {
            for x in 0..4 {
                let expected = if tone.bit(x as usize, y as usize) {
                    Color32::BLACK
                } else {
                    Color32::WHITE
                };
                assert_eq!(surface.logical_pixel(x, y), Some(expected), "at {x},{y}");
            }
        }
    }
}
