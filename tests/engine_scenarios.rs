use std::cell::RefCell;
use std::io::Cursor;
use std::rc::Rc;

use egui::Color32;
use futures::executor::block_on;
use image::ImageEncoder;
use pixelsketch::input::PointerInput;
use pixelsketch::{
    EngineEvent, ExportFormat, FilterMode, Position, SketchEngine, ViewportConstraints,
};

fn attached(width: u32, height: u32, scale: f32) -> SketchEngine {
    let mut engine = SketchEngine::new();
    engine
        .attach(ViewportConstraints {
            width,
            height,
            scale,
        })
        .unwrap();
    engine
}

/// One click at (x, y), ticked past the commit debounce so the stroke is
/// snapshotted.
fn tap(engine: &mut SketchEngine, x: i32, y: i32, time: f64) {
    engine.handle_pointer(PointerInput::MouseDown {
        pos: Position::new(x, y),
        time,
    });
    engine.handle_pointer(PointerInput::MouseUp {
        pos: Position::new(x, y),
        time: time + 0.05,
    });
    engine.tick(time + 1.0);
}

fn flat_png(w: u32, h: u32, rgb: [u8; 3]) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(w, h, image::Rgba([rgb[0], rgb[1], rgb[2], 255]));
    let mut out = Vec::new();
    image::codecs::png::PngEncoder::new(Cursor::new(&mut out))
        .write_image(img.as_raw(), w, h, image::ExtendedColorType::Rgba8)
        .unwrap();
    out
}

#[test]
fn point_undo_redo_scenario() {
    // Blank 320x180 canvas, black 1x1 brush, fill tone.
    let mut engine = attached(320, 180, 1.0);
    assert_eq!(
        engine.surface().unwrap().logical_size(),
        (320, 180)
    );
    engine.set_color("#000000");
    engine.set_brush_type(0);
    engine.set_tone_type(0);

    tap(&mut engine, 10, 10, 0.0);
    assert_eq!(engine.history().len(), 1);

    // Undo at index 0 is a no-op.
    block_on(engine.undo()).unwrap();
    assert_eq!(engine.history().len(), 1);
    assert_eq!(engine.history().cursor(), 0);
    assert_eq!(
        engine.surface().unwrap().logical_pixel(10, 10),
        Some(Color32::BLACK)
    );

    tap(&mut engine, 20, 20, 2.0);
    assert_eq!(engine.history().len(), 2);

    // Undo restores the raster with only the first point.
    block_on(engine.undo()).unwrap();
    let surface = engine.surface().unwrap();
    assert_eq!(surface.logical_pixel(10, 10), Some(Color32::BLACK));
    assert_eq!(surface.logical_pixel(20, 20), Some(Color32::WHITE));

    // Redo restores both points.
    block_on(engine.redo()).unwrap();
    let surface = engine.surface().unwrap();
    assert_eq!(surface.logical_pixel(10, 10), Some(Color32::BLACK));
    assert_eq!(surface.logical_pixel(20, 20), Some(Color32::BLACK));
}

#[test]
fn load_without_aspect_constraint_adopts_the_viewport_aspect() {
    let mut engine = attached(300, 100, 1.0);
    let png = flat_png(10, 10, [200, 30, 40]);
    block_on(engine.load(&png, false, FilterMode::Normal, true)).unwrap();

    // 3:1 viewport, square source: the raster follows the viewport.
    assert_eq!(engine.surface().unwrap().logical_size(), (300, 100));
    assert_eq!(
        engine.surface().unwrap().logical_pixel(5, 5),
        Some(Color32::from_rgb(200, 30, 40))
    );
    assert_eq!(engine.history().len(), 1);
}

#[test]
fn load_with_aspect_constraint_fits_the_source_box() {
    let mut engine = attached(300, 100, 1.0);
    let png = flat_png(10, 10, [0, 0, 0]);
    block_on(engine.load(&png, true, FilterMode::Normal, false)).unwrap();
    assert_eq!(engine.surface().unwrap().logical_size(), (100, 100));
    assert_eq!(engine.history().len(), 0);
}

#[test]
fn failed_load_leaves_the_raster_unchanged() {
    let mut engine = attached(64, 64, 1.0);
    tap(&mut engine, 3, 3, 0.0);

    let events: Rc<RefCell<Vec<String>>> = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&events);
    engine.subscribe(Box::new(move |event: &EngineEvent| {
        let tag = match event {
            EngineEvent::LoadStarted { heavy } => format!("start heavy={heavy}"),
            EngineEvent::LoadFinished { ok } => format!("finish ok={ok}"),
            EngineEvent::HistoryChanged { .. } => "history".to_owned(),
        };
        sink.borrow_mut().push(tag);
    }));

    let result = block_on(engine.load(b"definitely not an image", false, FilterMode::Normal, true));
    assert!(result.is_err());
    assert_eq!(
        engine.surface().unwrap().logical_pixel(3, 3),
        Some(Color32::BLACK)
    );
    // Load notifications fire even on failure, and no history push happens.
    assert_eq!(
        events.borrow().as_slice(),
        ["start heavy=false", "finish ok=false"]
    );
    assert_eq!(engine.history().len(), 1);
}

#[test]
fn history_notifications_carry_sequence_and_cursor() {
    let mut engine = attached(64, 64, 1.0);
    let seen: Rc<RefCell<Vec<(usize, usize)>>> = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    engine.subscribe(Box::new(move |event: &EngineEvent| {
        if let EngineEvent::HistoryChanged { sequence, cursor } = event {
            sink.borrow_mut().push((sequence.len(), *cursor));
        }
    }));

    tap(&mut engine, 1, 1, 0.0);
    tap(&mut engine, 2, 2, 2.0);
    block_on(engine.undo()).unwrap();
    block_on(engine.redo()).unwrap();

    assert_eq!(seen.borrow().as_slice(), [(1, 0), (2, 1), (2, 0), (2, 1)]);
}

#[test]
fn new_gesture_cancels_the_pending_commit() {
    let mut engine = attached(64, 64, 1.0);
    engine.handle_pointer(PointerInput::MouseDown {
        pos: Position::new(1, 1),
        time: 0.0,
    });
    engine.handle_pointer(PointerInput::MouseUp {
        pos: Position::new(1, 1),
        time: 0.05,
    });
    // Second stroke starts before the debounce deadline.
    engine.handle_pointer(PointerInput::MouseDown {
        pos: Position::new(2, 2),
        time: 0.1,
    });
    engine.handle_pointer(PointerInput::MouseUp {
        pos: Position::new(2, 2),
        time: 0.2,
    });

    engine.tick(0.3);
    assert_eq!(engine.history().len(), 0, "commit must still be pending");
    engine.tick(0.5);
    assert_eq!(engine.history().len(), 1, "both strokes coalesce into one entry");
}

#[test]
fn clear_fills_with_current_color_and_snapshots() {
    let mut engine = attached(32, 32, 1.0);
    engine.set_color("#ff0000");
    engine.clear().unwrap();
    assert_eq!(
        engine.surface().unwrap().logical_pixel(17, 9),
        Some(Color32::from_rgb(255, 0, 0))
    );
    assert_eq!(engine.history().len(), 1);
}

#[test]
fn invalid_color_keeps_the_previous_selection() {
    let mut engine = attached(16, 16, 1.0);
    engine.set_color("#00ff00");
    engine.set_color("chartreuse-ish");
    assert_eq!(engine.config().color, "#00ff00");
}

#[test]
fn export_round_trips_through_the_image_crate() {
    let mut engine = attached(16, 16, 2.0);
    tap(&mut engine, 2, 2, 0.0);

    let png = engine.export_raster(ExportFormat::Png, 100).unwrap();
    let decoded = image::load_from_memory(&png).unwrap();
    assert_eq!(
        (decoded.width() as usize, decoded.height() as usize),
        (16, 16),
        "export is device resolution (8x8 logical at zoom 2)"
    );

    let jpeg = engine.export_raster(ExportFormat::Jpeg, 80).unwrap();
    let decoded = image::load_from_memory(&jpeg).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (16, 16));
}

#[test]
fn operations_before_attach_are_setup_errors() {
    let mut engine = SketchEngine::new();
    assert!(engine.clear().is_err());
    assert!(engine.push_history().is_err());
    assert!(engine.export_raster(ExportFormat::Png, 100).is_err());
    assert!(block_on(engine.load(&flat_png(4, 4, [0, 0, 0]), false, FilterMode::Normal, false)).is_err());
}

#[test]
fn detach_drops_the_surface_but_keeps_history() {
    let mut engine = attached(32, 32, 1.0);
    tap(&mut engine, 1, 1, 0.0);
    engine.detach();
    assert!(!engine.is_attached());
    assert_eq!(engine.history().len(), 1);
}
