use crate::engine::ViewportConstraints;
use crate::surface::Position;
use crate::SketchApp;

/// The drawing canvas: attaches the engine to the available viewport on
/// first show, routes frame input into it, keeps the display texture in
/// sync with the raster, and draws the text-overlay preview.
pub fn central_panel(app: &mut SketchApp, ctx: &egui::Context) {
    egui::CentralPanel::default().show(ctx, |ui| {
        let avail = ui.available_rect_before_wrap();
        let ppp = ctx.pixels_per_point();

        if !app.engine.is_attached() {
            let viewport = ViewportConstraints {
                width: (avail.width() * ppp) as u32,
                height: (avail.height() * ppp) as u32,
                scale: ppp.max(2.0), // chunky logical pixels on 1x displays
            };
            if let Err(err) = app.engine.attach(viewport) {
                log::error!("attach failed: {err}");
                return;
            }
        }
        let Some(surface) = app.engine.surface() else {
            return;
        };
        let zoom = surface.zoom() as f32;
        let device = surface.device_size();

        // One device pixel per physical pixel.
        let size_points = egui::vec2(device[0] as f32 / ppp, device[1] as f32 / ppp);
        let (response, painter) = ui.allocate_painter(size_points, egui::Sense::drag());
        let rect = response.rect;

        let origin = rect.min;
        let to_logical = move |pos: egui::Pos2| {
            Position::new(
                (((pos.x - origin.x) * ppp) / zoom).floor() as i32,
                (((pos.y - origin.y) * ppp) / zoom).floor() as i32,
            )
        };
        for input in app.collector.collect(ctx, to_logical) {
            app.engine.handle_pointer(input);
        }
        app.engine.tick(ctx.input(|i| i.time));

        let dirty = app.engine.take_surface_dirty();
        if let Some(surface) = app.engine.surface() {
            if dirty || app.texture.is_none() {
                let image = surface.image().clone();
                match &mut app.texture {
                    Some(texture) => texture.set(image, egui::TextureOptions::NEAREST),
                    None => {
                        app.texture =
                            Some(ctx.load_texture("sketch_canvas", image, egui::TextureOptions::NEAREST));
                    }
                }
            }
        }
        if let Some(texture) = &app.texture {
            painter.image(
                texture.id(),
                rect,
                egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                egui::Color32::WHITE,
            );
        }

        if let Some(preview) = app.engine.text_preview() {
            let pos = rect.min
                + egui::vec2(
                    preview.pos.x as f32 * zoom / ppp,
                    preview.pos.y as f32 * zoom / ppp,
                );
            painter.text(
                pos,
                egui::Align2::LEFT_TOP,
                &preview.text,
                egui::FontId::monospace(preview.font_px as f32 * zoom / ppp),
                preview.color,
            );
        }
    });
}
