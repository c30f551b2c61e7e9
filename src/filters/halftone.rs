//! Converts a photographic image into a tone + palette stylization by
//! perceptual nearest-pattern search with error diffusion.

use std::collections::HashMap;

use egui::{Color32, ColorImage};
use parking_lot::Mutex;

use crate::resources::{Tone, REF_DARK, REF_LIGHT, TONE_PERIOD};
use crate::surface::RasterSurface;

use super::{lab_distance, luma, yield_now};

/// Fixed scale applied to diffused quantization error.
const DITHERING_RATE: f32 = 0.5;

/// Window rows between distance-memo flushes. Bounds the memo at a few
/// window rows' worth of (color, color) pairs.
const MEMO_FLUSH_ROWS: usize = 4;

/// Lab distances memoized by the two compared RGB triples.
struct DistanceMemo {
    map: Mutex<HashMap<u64, f32>>,
}

impl DistanceMemo {
    fn new() -> Self {
        Self {
            map: Mutex::new(HashMap::new()),
        }
    }

    fn distance(&self, a: Color32, b: Color32) -> f32 {
        let key = Self::key(a, b);
        if let Some(&d) = self.map.lock().get(&key) {
            return d;
        }
        let d = lab_distance(a, b);
        self.map.lock().insert(key, d);
        d
    }

    fn key(a: Color32, b: Color32) -> u64 {
        let pack = |c: Color32| (c.r() as u64) << 16 | (c.g() as u64) << 8 | c.b() as u64;
        pack(a) << 24 | pack(b)
    }

    fn clear(&self) {
        self.map.lock().clear();
    }
}

/// One halftone conversion pass. Caches (pattern tiles, Lab distances) are
/// scoped to the invocation and dropped with it.
pub struct HalftoneFilter<'a> {
    tones: &'a [Tone],
    palette: &'a [Color32],
    memo: DistanceMemo,
    tiles: HashMap<(usize, Color32, Color32), Vec<Color32>>,
}

impl<'a> HalftoneFilter<'a> {
    pub fn new(tones: &'a [Tone], palette: &'a [Color32]) -> Self {
        Self {
            tones,
            palette,
            memo: DistanceMemo::new(),
            tiles: HashMap::new(),
        }
    }

    /// Run the pass: a single row-major sweep over period-aligned windows
    /// of `src`, compositing into `surface` at device zoom. Output is
    /// bit-for-bit reproducible for identical inputs: candidate iteration
    /// order is fixed and ties resolve to the first candidate.
    pub async fn apply(mut self, src: &ColorImage, surface: &mut RasterSurface) {
        let [w, h] = src.size;
        if w == 0 || h == 0 {
            return;
        }
        log::debug!("halftone pass over {w}x{h} source");

        // Working copy of the source; error diffusion accumulates into the
        // not-yet-processed pixels.
        let mut work: Vec<[f32; 3]> = src
            .pixels
            .iter()
            .map(|p| [p.r() as f32, p.g() as f32, p.b() as f32])
            .collect();

        let mut window_rows = 0usize;
        for y0 in (0..h).step_by(TONE_PERIOD) {
            for x0 in (0..w).step_by(TONE_PERIOD) {
                self.process_window(&mut work, w, h, x0, y0, surface);
            }
            window_rows += 1;
            if window_rows % MEMO_FLUSH_ROWS == 0 {
                self.memo.clear();
            }
            yield_now().await;
        }
    }

    fn process_window(
        &mut self,
        work: &mut [[f32; 3]],
        w: usize,
        h: usize,
        x0: usize,
        y0: usize,
        surface: &mut RasterSurface,
    ) {
        let bw = TONE_PERIOD.min(w - x0);
        let bh = TONE_PERIOD.min(h - y0);

        // Quantize the current (error-adjusted) window and stretch its
        // lightness to the full [0, 255] range.
        let mut original = [[Color32::BLACK; TONE_PERIOD]; TONE_PERIOD];
        let mut min_l = f32::MAX;
        let mut max_l = f32::MIN;
        for dy in 0..bh {
            for dx in 0..bw {
                let px = work[(y0 + dy) * w + x0 + dx];
                let c = Color32::from_rgb(
                    px[0].round().clamp(0.0, 255.0) as u8,
                    px[1].round().clamp(0.0, 255.0) as u8,
                    px[2].round().clamp(0.0, 255.0) as u8,
                );
                original[dy][dx] = c;
                let l = luma(c);
                min_l = min_l.min(l);
                max_l = max_l.max(l);
            }
        }
        let range = (max_l - min_l).max(1.0);
        let mut normalized = [[0u8; TONE_PERIOD]; TONE_PERIOD];
        for dy in 0..bh {
            for dx in 0..bw {
                let stretched = (luma(original[dy][dx]) - min_l) * 255.0 / range;
                normalized[dy][dx] = stretched.round().clamp(0.0, 255.0) as u8;
            }
        }

        // 1) Best tone: normalized window vs. each tone's tile rendered
        //    with the fixed reference pair.
        let mut best_tone = 0;
        let mut best_dist = f32::MAX;
        for tone_idx in 0..self.tones.len() {
            let tile = self.tile(tone_idx, REF_DARK, REF_LIGHT);
            let mut dist = 0.0;
            for dy in 0..bh {
                for dx in 0..bw {
                    let tile_px = tile[tile_index(x0 + dx, y0 + dy)];
                    dist += self
                        .memo
                        .distance(Color32::from_gray(normalized[dy][dx]), tile_px);
                }
            }
            if dist < best_dist {
                best_dist = dist;
                best_tone = tone_idx;
            }
        }

        // 2) Best background over the full palette against the original
        //    window, then 3) best foreground holding tone + background.
        let bg = self.best_color(best_tone, x0, y0, bw, bh, &original, None);
        let fg = self.best_color(best_tone, x0, y0, bw, bh, &original, Some(bg));

        // Composite the winning pattern and diffuse the per-pixel error
        // forward into the source buffer.
        let tone = &self.tones[best_tone];
        for dy in 0..bh {
            for dx in 0..bw {
                let (x, y) = (x0 + dx, y0 + dy);
                let out = if tone.bit(x % TONE_PERIOD, y % TONE_PERIOD) {
                    fg
                } else {
                    bg
                };
                surface.fill_logical_block(x as i32, y as i32, out);

                let idx = y * w + x;
                let err = [
                    (work[idx][0] - out.r() as f32) * DITHERING_RATE,
                    (work[idx][1] - out.g() as f32) * DITHERING_RATE,
                    (work[idx][2] - out.b() as f32) * DITHERING_RATE,
                ];
                diffuse_error(work, w, h, x, y, err);
            }
        }
    }

    /// Nearest palette color for the window. With `fixed_bg == None` the
    /// candidate fills the background and the foreground is held at the
    /// reference dark; otherwise the candidate fills the foreground.
    fn best_color(
        &mut self,
        tone_idx: usize,
        x0: usize,
        y0: usize,
        bw: usize,
        bh: usize,
        original: &[[Color32; TONE_PERIOD]; TONE_PERIOD],
        fixed_bg: Option<Color32>,
    ) -> Color32 {
        let mut best = self.palette[0];
        let mut best_dist = f32::MAX;
        for i in 0..self.palette.len() {
            let candidate = self.palette[i];
            let (fg, bg) = match fixed_bg {
                None => (REF_DARK, candidate),
                Some(b) => (candidate, b),
            };
            let tile = self.tile(tone_idx, fg, bg);
            let mut dist = 0.0;
            for dy in 0..bh {
                for dx in 0..bw {
                    let tile_px = tile[tile_index(x0 + dx, y0 + dy)];
                    dist += self.memo.distance(original[dy][dx], tile_px);
                }
            }
            if dist < best_dist {
                best_dist = dist;
                best = candidate;
            }
        }
        best
    }

    /// Rendered period x period tile for a (tone, fg, bg) tuple, cached by
    /// the tuple.
    fn tile(&mut self, tone_idx: usize, fg: Color32, bg: Color32) -> Vec<Color32> {
        let tones = self.tones;
        self.tiles
            .entry((tone_idx, fg, bg))
            .or_insert_with(|| {
                let tone = &tones[tone_idx];
                (0..TONE_PERIOD * TONE_PERIOD)
                    .map(|i| {
                        if tone.bit(i % TONE_PERIOD, i / TONE_PERIOD) {
                            fg
                        } else {
                            bg
                        }
                    })
                    .collect()
            })
            .clone()
    }
}

fn tile_index(x: usize, y: usize) -> usize {
    (y % TONE_PERIOD) * TONE_PERIOD + x % TONE_PERIOD
}

/// Floyd-Steinberg taps: forward neighbors only, so committed pixels are
/// never re-read with stale values.
fn diffuse_error(work: &mut [[f32; 3]], w: usize, h: usize, x: usize, y: usize, err: [f32; 3]) {
    const TAPS: [(i32, i32, f32); 4] = [
        (1, 0, 7.0 / 16.0),
        (-1, 1, 3.0 / 16.0),
        (0, 1, 5.0 / 16.0),
        (1, 1, 1.0 / 16.0),
    ];
    for (dx, dy, weight) in TAPS {
        let nx = x as i32 + dx;
        let ny = y as i32 + dy;
        if nx < 0 || ny < 0 || nx >= w as i32 || ny >= h as i32 {
            continue;
        }
        let idx = ny as usize * w + nx as usize;
        for ch in 0..3 {
            work[idx][ch] += err[ch] * weight;
        }
    }
}
