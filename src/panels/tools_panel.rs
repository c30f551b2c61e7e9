use crate::config::DrawMode;
use crate::engine::ExportFormat;
use crate::resources::{BRUSHES, FONTS, PALETTE, TONES};
use crate::SketchApp;

pub fn tools_panel(app: &mut SketchApp, ctx: &egui::Context) {
    egui::SidePanel::left("tools_panel")
        .resizable(true)
        .default_width(200.0)
        .show(ctx, |ui| {
            ui.heading("Tools");

            let mode = app.engine.config().mode;
            ui.horizontal(|ui| {
                if ui.selectable_label(mode == DrawMode::Shape, "Draw").clicked() {
                    app.engine.set_mode(DrawMode::Shape);
                }
                if ui.selectable_label(mode == DrawMode::Text, "Text").clicked() {
                    app.engine.set_mode(DrawMode::Text);
                }
            });
            if app.engine.config().mode == DrawMode::Text {
                let mut text = app.engine.config().text.clone();
                if ui.text_edit_singleline(&mut text).changed() {
                    app.engine.set_text(text);
                }
                let selected_font = app.engine.config().font;
                for (i, font) in FONTS.iter().enumerate() {
                    if ui.selectable_label(selected_font == i, font.name).clicked() {
                        app.engine.set_font_type(i);
                    }
                }
            }
            ui.separator();

            ui.label("Brush");
            let selected_brush = app.engine.config().brush;
            for (i, brush) in BRUSHES.iter().enumerate() {
                if ui.selectable_label(selected_brush == i, brush.name).clicked() {
                    app.engine.set_brush_type(i);
                }
            }
            ui.separator();

            ui.label("Tone");
            let selected_tone = app.engine.config().tone;
            for (i, tone) in TONES.iter().enumerate() {
                if ui.selectable_label(selected_tone == i, tone.name).clicked() {
                    app.engine.set_tone_type(i);
                }
            }
            ui.separator();

            ui.label("Color");
            ui.horizontal_wrapped(|ui| {
                for &color in PALETTE {
                    let button = egui::Button::new("").fill(color).min_size(egui::vec2(18.0, 18.0));
                    if ui.add(button).clicked() {
                        let hex = format!("#{:02x}{:02x}{:02x}", color.r(), color.g(), color.b());
                        app.engine.set_color(&hex);
                    }
                }
            });

            let mut fuzziness = app.engine.config().fuzziness;
            if ui
                .add(egui::Slider::new(&mut fuzziness, 0.0..=2.0).text("Fuzziness"))
                .changed()
            {
                app.engine.set_fuzziness(fuzziness);
            }
            ui.separator();

            ui.horizontal(|ui| {
                let can_undo = app.engine.history().can_undo();
                let can_redo = app.engine.history().can_redo();

                if ui.add_enabled(can_undo, egui::Button::new("Undo")).clicked() {
                    if let Err(err) = futures::executor::block_on(app.engine.undo()) {
                        log::error!("undo failed: {err}");
                    }
                }
                if ui.add_enabled(can_redo, egui::Button::new("Redo")).clicked() {
                    if let Err(err) = futures::executor::block_on(app.engine.redo()) {
                        log::error!("redo failed: {err}");
                    }
                }
            });

            ui.horizontal(|ui| {
                if ui.button("Clear").clicked() {
                    if let Err(err) = app.engine.clear() {
                        log::error!("clear failed: {err}");
                    }
                }
                if ui.button("Export PNG").clicked() {
                    app.engine.export_blob(
                        |result| match result {
                            Ok(bytes) => log::info!("exported {} bytes", bytes.len()),
                            Err(err) => log::error!("export failed: {err}"),
                        },
                        ExportFormat::Png,
                        100,
                    );
                }
            });

            ui.separator();
            let history = app.engine.history();
            ui.label(format!(
                "History: {} / {}",
                history.cursor() + usize::from(!history.is_empty()),
                history.len()
            ));
        });
}
