use std::io::Cursor;
use std::sync::Arc;

use egui::{Color32, ColorImage};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder};

use crate::config::{DrawMode, FilterMode, ToolConfig};
use crate::error::{EngineError, EngineResult};
use crate::event::{EngineEvent, EventBus, EventHandler};
use crate::filters::{trace_edges, yield_now, HalftoneFilter};
use crate::history::{HistoryManager, PngCodec, RasterCodec};
use crate::input::{GestureEvent, GestureStateMachine, PointerInput};
use crate::overlay::{TextOverlay, TextPreview};
use crate::raster::{draw_line, draw_point, StampParams};
use crate::resources::{FuzzinessField, BRUSHES, FONTS, PALETTE, TONES};
use crate::surface::{Position, RasterSurface};

/// Seconds between a gesture ending and its history snapshot, so rapid
/// consecutive strokes coalesce into one entry.
pub const COMMIT_DEBOUNCE: f64 = 0.25;

/// Host viewport the canvas must fit, in device pixels, plus the host's
/// pixel scale (e.g. device pixel ratio). Zoom and logical size derive
/// from these.
#[derive(Debug, Clone, Copy)]
pub struct ViewportConstraints {
    pub width: u32,
    pub height: u32,
    pub scale: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Png,
    Jpeg,
}

/// The pixel-canvas drawing engine.
///
/// Owns the raster surface, tool configuration, gesture state machine,
/// text overlay and snapshot history, and exposes the narrow imperative
/// API the widget layer drives. One engine per canvas; all mutation runs
/// on the host's single logical thread.
pub struct SketchEngine {
    surface: Option<RasterSurface>,
    viewport: Option<ViewportConstraints>,
    config: ToolConfig,
    color: Color32,
    machine: GestureStateMachine,
    history: HistoryManager,
    overlay: TextOverlay,
    bus: EventBus,
    codec: Box<dyn RasterCodec>,
    noise: FuzzinessField,
    last_point: Option<Position>,
    pending_commit: Option<f64>,
}

impl Default for SketchEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl SketchEngine {
    pub fn new() -> Self {
        Self::with_codec(Box::new(PngCodec))
    }

    /// Build an engine with a host-provided snapshot codec.
    pub fn with_codec(codec: Box<dyn RasterCodec>) -> Self {
        Self {
            surface: None,
            viewport: None,
            config: ToolConfig::default(),
            color: Color32::BLACK,
            machine: GestureStateMachine::new(),
            history: HistoryManager::new(),
            overlay: TextOverlay::new(),
            bus: EventBus::new(),
            codec,
            noise: FuzzinessField::new(),
            last_point: None,
            pending_commit: None,
        }
    }

    // ---- lifecycle -------------------------------------------------------

    /// Attach the engine to a live input surface. Derives the zoom from the
    /// viewport scale, allocates a blank raster filling the viewport, and
    /// resets any in-flight gesture state.
    pub fn attach(&mut self, viewport: ViewportConstraints) -> EngineResult<()> {
        if viewport.width == 0 || viewport.height == 0 || viewport.scale <= 0.0 {
            return Err(EngineError::Setup("viewport constraints must be positive"));
        }
        let zoom = zoom_for(&viewport);
        let logical_w = (viewport.width as usize / zoom).max(1);
        let logical_h = (viewport.height as usize / zoom).max(1);
        log::info!("attach: {logical_w}x{logical_h} at zoom {zoom}");
        self.surface = Some(RasterSurface::new(logical_w, logical_h, zoom, Color32::WHITE));
        self.viewport = Some(viewport);
        self.machine.reset();
        self.overlay.cancel();
        self.history.clear();
        self.last_point = None;
        self.pending_commit = None;
        Ok(())
    }

    /// Detach from the input surface, dropping the raster and any active
    /// transaction. History is kept for a later re-attach.
    pub fn detach(&mut self) {
        log::info!("detach");
        self.surface = None;
        self.viewport = None;
        self.machine.reset();
        self.overlay.cancel();
        self.last_point = None;
        self.pending_commit = None;
    }

    pub fn is_attached(&self) -> bool {
        self.surface.is_some()
    }

    pub fn surface(&self) -> Option<&RasterSurface> {
        self.surface.as_ref()
    }

    /// Whether the raster changed since the last call; the display layer
    /// polls this to re-upload its texture.
    pub fn take_surface_dirty(&mut self) -> bool {
        self.surface
            .as_mut()
            .map(RasterSurface::take_dirty)
            .unwrap_or(false)
    }

    pub fn history(&self) -> &HistoryManager {
        &self.history
    }

    pub fn text_preview(&self) -> Option<&TextPreview> {
        self.overlay.preview()
    }

    /// Subscribe to engine notifications.
    pub fn subscribe(&self, handler: Box<dyn EventHandler>) {
        self.bus.subscribe(handler);
    }

    /// Positions the predicate claims are left to other UI; no gesture
    /// transaction starts from them.
    pub fn set_passthrough(&mut self, predicate: impl Fn(Position) -> bool + 'static) {
        self.machine.set_passthrough(predicate);
    }

    // ---- configuration ---------------------------------------------------

    pub fn config(&self) -> &ToolConfig {
        &self.config
    }

    /// Adopt a whole configuration at once (e.g. restored host state).
    /// Out-of-range catalog indices are clamped.
    pub fn apply_config(&mut self, config: ToolConfig) {
        let color = config.color.clone();
        self.config = config;
        self.config.brush = self.config.brush.min(BRUSHES.len() - 1);
        self.config.tone = self.config.tone.min(TONES.len() - 1);
        self.config.font = self.config.font.min(FONTS.len() - 1);
        self.config.fuzziness = self.config.fuzziness.max(0.0);
        self.set_color(&color);
    }

    pub fn set_brush_type(&mut self, id: usize) {
        if id < BRUSHES.len() {
            self.config.brush = id;
        } else {
            log::warn!("ignoring unknown brush id {id}");
        }
    }

    pub fn set_tone_type(&mut self, id: usize) {
        if id < TONES.len() {
            self.config.tone = id;
        } else {
            log::warn!("ignoring unknown tone id {id}");
        }
    }

    pub fn set_font_type(&mut self, id: usize) {
        if id < FONTS.len() {
            self.config.font = id;
        } else {
            log::warn!("ignoring unknown font id {id}");
        }
    }

    /// Set the drawing color from a `#rrggbb` hex string. Unparseable
    /// input keeps the previous color.
    pub fn set_color(&mut self, hex: &str) {
        match Color32::from_hex(hex) {
            Ok(color) => {
                self.color = color;
                self.config.color = hex.to_owned();
            }
            Err(_) => log::warn!("ignoring unparseable color {hex:?}"),
        }
    }

    pub fn set_fuzziness(&mut self, multiplier: f32) {
        self.config.fuzziness = multiplier.max(0.0);
    }

    pub fn set_mode(&mut self, mode: DrawMode) {
        self.config.mode = mode;
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.config.text = text.into();
    }

    // ---- drawing ---------------------------------------------------------

    /// Feed one normalized pointer event through the gesture machine and
    /// route the resulting gesture to the brush rasterizer or the text
    /// overlay, per the current mode.
    pub fn handle_pointer(&mut self, input: PointerInput) {
        let Some(gesture) = self.machine.process(input) else {
            return;
        };
        let time = input.time();
        match gesture {
            GestureEvent::Down(p) => {
                // A fresh gesture supersedes a pending debounced commit.
                self.pending_commit = None;
                match self.config.mode {
                    DrawMode::Shape => {
                        self.stamp_point(p);
                        self.last_point = Some(p);
                    }
                    DrawMode::Text => {
                        let font_px = BRUSHES[self.config.brush].font_px;
                        self.overlay.begin(
                            self.config.text.clone(),
                            p,
                            font_px,
                            self.config.font,
                            self.color,
                        );
                    }
                }
            }
            GestureEvent::Move(p) => match self.config.mode {
                DrawMode::Shape => {
                    if let Some(last) = self.last_point {
                        self.stamp_line(last, p);
                    }
                    self.last_point = Some(p);
                }
                DrawMode::Text => self.overlay.follow(p),
            },
            GestureEvent::Up(p) => {
                match self.config.mode {
                    DrawMode::Shape => {
                        if let Some(last) = self.last_point {
                            self.stamp_line(last, p);
                        } else {
                            self.stamp_point(p);
                        }
                        self.last_point = None;
                    }
                    DrawMode::Text => {
                        if let Some(surface) = self.surface.as_mut() {
                            self.overlay.commit(surface, FONTS);
                        }
                    }
                }
                self.pending_commit = Some(time + COMMIT_DEBOUNCE);
            }
            GestureEvent::Cancel => {
                // Stamped pixels stay; the next completed gesture snapshots
                // them. The text preview is dropped uncommitted.
                self.overlay.cancel();
                self.last_point = None;
            }
        }
    }

    /// Drive the debounced history commit. The host calls this once per
    /// frame with its input-clock time.
    pub fn tick(&mut self, now: f64) {
        if let Some(deadline) = self.pending_commit {
            if now >= deadline {
                self.pending_commit = None;
                if let Err(err) = self.push_history() {
                    log::warn!("debounced history commit failed: {err}");
                }
            }
        }
    }

    fn stamp_point(&mut self, p: Position) {
        let Some(surface) = self.surface.as_mut() else {
            return;
        };
        let params = StampParams {
            brush: &BRUSHES[self.config.brush],
            tone: &TONES[self.config.tone],
            color: self.color,
            fuzziness: self.config.fuzziness,
            noise: &self.noise,
        };
        draw_point(surface, p, &params);
    }

    fn stamp_line(&mut self, from: Position, to: Position) {
        let Some(surface) = self.surface.as_mut() else {
            return;
        };
        let params = StampParams {
            brush: &BRUSHES[self.config.brush],
            tone: &TONES[self.config.tone],
            color: self.color,
            fuzziness: self.config.fuzziness,
            noise: &self.noise,
        };
        draw_line(surface, from, to, &params);
    }

    // ---- history ---------------------------------------------------------

    /// Snapshot the current raster into the history sequence and notify.
    pub fn push_history(&mut self) -> EngineResult<()> {
        let surface = self
            .surface
            .as_ref()
            .ok_or(EngineError::Setup("push_history before attach"))?;
        let bytes = self.codec.encode(surface.image())?;
        self.history.push(bytes);
        self.notify_history();
        Ok(())
    }

    /// Step back one snapshot and repaint from it. No-op at the front of
    /// the sequence.
    pub async fn undo(&mut self) -> EngineResult<()> {
        let bytes = match self.history.undo() {
            Some(entry) => entry.bytes_arc(),
            None => return Ok(()),
        };
        self.notify_history();
        self.restore_bytes(bytes).await
    }

    /// Step forward one snapshot and repaint from it. No-op at the tail.
    pub async fn redo(&mut self) -> EngineResult<()> {
        let bytes = match self.history.redo() {
            Some(entry) => entry.bytes_arc(),
            None => return Ok(()),
        };
        self.notify_history();
        self.restore_bytes(bytes).await
    }

    /// Decode a snapshot and repaint the surface from it. Restores are not
    /// serialized against each other: if the host issues a second restore
    /// before an earlier decode resolves, both proceed and the raster ends
    /// up reflecting whichever decode finishes last. Accepted for
    /// single-user interactive use.
    async fn restore_bytes(&mut self, bytes: Arc<Vec<u8>>) -> EngineResult<()> {
        yield_now().await;
        let image = self.codec.decode(&bytes)?;
        let surface = self
            .surface
            .as_mut()
            .ok_or(EngineError::Setup("restore before attach"))?;
        surface.adopt_image(image);
        Ok(())
    }

    fn notify_history(&self) {
        self.bus.emit(EngineEvent::HistoryChanged {
            sequence: self.history.entries().to_vec(),
            cursor: self.history.cursor(),
        });
    }

    // ---- whole-canvas operations ----------------------------------------

    /// Fill the raster with the current color and snapshot.
    pub fn clear(&mut self) -> EngineResult<()> {
        let surface = self
            .surface
            .as_mut()
            .ok_or(EngineError::Setup("clear before attach"))?;
        surface.fill(self.color);
        self.push_history()
    }

    /// Decode externally fetched image bytes, resize the canvas to the
    /// attached viewport (honoring or overriding the source aspect ratio
    /// per the flag), optionally stylize, optionally snapshot.
    ///
    /// Emits `LoadStarted` before any work and `LoadFinished` after, even
    /// on failure. On decode failure the raster is left unchanged.
    pub async fn load(
        &mut self,
        bytes: &[u8],
        constrains_aspect_ratio: bool,
        filter: FilterMode,
        push_to_history: bool,
    ) -> EngineResult<()> {
        self.bus.emit(EngineEvent::LoadStarted {
            heavy: filter.is_heavy(),
        });
        let result = self
            .load_inner(bytes, constrains_aspect_ratio, filter)
            .await;
        self.bus.emit(EngineEvent::LoadFinished {
            ok: result.is_ok(),
        });
        result?;
        if push_to_history {
            self.push_history()?;
        }
        Ok(())
    }

    async fn load_inner(
        &mut self,
        bytes: &[u8],
        constrains_aspect_ratio: bool,
        filter: FilterMode,
    ) -> EngineResult<()> {
        let viewport = self
            .viewport
            .ok_or(EngineError::Setup("load before attach"))?;
        yield_now().await;
        let decoded = image::load_from_memory(bytes)?.to_rgba8();

        let zoom = zoom_for(&viewport);
        let box_w = (viewport.width as usize / zoom).max(1);
        let box_h = (viewport.height as usize / zoom).max(1);
        let (logical_w, logical_h) = if constrains_aspect_ratio {
            fit_within(
                decoded.width() as usize,
                decoded.height() as usize,
                box_w,
                box_h,
            )
        } else {
            (box_w, box_h)
        };
        log::info!(
            "load: {}x{} source -> {logical_w}x{logical_h} logical, {filter:?}",
            decoded.width(),
            decoded.height()
        );

        let resized = image::imageops::resize(
            &decoded,
            logical_w as u32,
            logical_h as u32,
            image::imageops::FilterType::Triangle,
        );
        let src = color_image_from_rgba(logical_w, logical_h, resized.as_raw());

        let mut surface = RasterSurface::new(logical_w, logical_h, zoom, Color32::WHITE);
        match filter {
            FilterMode::Normal => {
                for y in 0..logical_h {
                    for x in 0..logical_w {
                        surface.fill_logical_block(x as i32, y as i32, src.pixels[y * logical_w + x]);
                    }
                }
            }
            FilterMode::Halftone => {
                HalftoneFilter::new(TONES, PALETTE)
                    .apply(&src, &mut surface)
                    .await;
            }
            FilterMode::Tracing => trace_edges(&src, &mut surface).await,
        }
        self.surface = Some(surface);
        self.last_point = None;
        Ok(())
    }

    // ---- export ----------------------------------------------------------

    /// Encode the current raster. `quality` only affects lossy formats.
    pub fn export_raster(&self, format: ExportFormat, quality: u8) -> EngineResult<Vec<u8>> {
        let surface = self
            .surface
            .as_ref()
            .ok_or(EngineError::Setup("export before attach"))?;
        let image = surface.image();
        let [w, h] = image.size;
        let mut out = Vec::new();
        match format {
            ExportFormat::Png => {
                let mut rgba = Vec::with_capacity(w * h * 4);
                for px in &image.pixels {
                    rgba.extend_from_slice(&px.to_array());
                }
                PngEncoder::new(Cursor::new(&mut out)).write_image(
                    &rgba,
                    w as u32,
                    h as u32,
                    ExtendedColorType::Rgba8,
                )?;
            }
            ExportFormat::Jpeg => {
                let mut rgb = Vec::with_capacity(w * h * 3);
                for px in &image.pixels {
                    rgb.extend_from_slice(&px.to_array()[..3]);
                }
                JpegEncoder::new_with_quality(Cursor::new(&mut out), quality.clamp(1, 100))
                    .write_image(&rgb, w as u32, h as u32, ExtendedColorType::Rgb8)?;
            }
        }
        Ok(out)
    }

    /// Callback form of `export_raster` for hosts that hand bytes off.
    pub fn export_blob<F>(&self, callback: F, format: ExportFormat, quality: u8)
    where
        F: FnOnce(EngineResult<Vec<u8>>),
    {
        callback(self.export_raster(format, quality));
    }
}

fn zoom_for(viewport: &ViewportConstraints) -> usize {
    (viewport.scale.round() as usize).max(1)
}

/// Largest size with `src`'s aspect ratio fitting inside the box.
fn fit_within(src_w: usize, src_h: usize, box_w: usize, box_h: usize) -> (usize, usize) {
    let scale = (box_w as f32 / src_w.max(1) as f32).min(box_h as f32 / src_h.max(1) as f32);
    (
        ((src_w as f32 * scale).round() as usize).max(1),
        ((src_h as f32 * scale).round() as usize).max(1),
    )
}

fn color_image_from_rgba(w: usize, h: usize, rgba: &[u8]) -> ColorImage {
    let pixels = rgba
        .chunks_exact(4)
        .map(|c| Color32::from_rgba_premultiplied(c[0], c[1], c[2], c[3]))
        .collect();
    ColorImage {
        size: [w, h],
        pixels,
    }
}
