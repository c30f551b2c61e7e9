use std::cell::RefCell;
use std::io::Cursor;
use std::rc::Rc;

use egui::Color32;
use futures::executor::block_on;
use image::ImageEncoder;
use pixelsketch::filters::HalftoneFilter;
use pixelsketch::resources::{PALETTE, TONES};
use pixelsketch::{EngineEvent, FilterMode, RasterSurface, SketchEngine, ViewportConstraints};

fn gradient_png(w: u32, h: u32) -> Vec<u8> {
    let img = image::RgbaImage::from_fn(w, h, |x, y| {
        image::Rgba([
            (x * 255 / w.max(1)) as u8,
            (y * 255 / h.max(1)) as u8,
            128,
            255,
        ])
    });
    let mut out = Vec::new();
    image::codecs::png::PngEncoder::new(Cursor::new(&mut out))
        .write_image(img.as_raw(), w, h, image::ExtendedColorType::Rgba8)
        .unwrap();
    out
}

fn attached(width: u32, height: u32) -> SketchEngine {
    let mut engine = SketchEngine::new();
    engine
        .attach(ViewportConstraints {
            width,
            height,
            scale: 1.0,
        })
        .unwrap();
    engine
}

fn gradient_image(w: usize, h: usize) -> egui::ColorImage {
    let mut img = egui::ColorImage::new([w, h], Color32::WHITE);
    for y in 0..h {
        for x in 0..w {
            img.pixels[y * w + x] = Color32::from_rgb(
                (x * 255 / w) as u8,
                (y * 255 / h) as u8,
                ((x + y) * 255 / (w + h)) as u8,
            );
        }
    }
    img
}

#[test]
fn halftone_is_deterministic_across_runs() {
    let src = gradient_image(24, 16);
    let mut first = RasterSurface::new(24, 16, 1, Color32::WHITE);
    let mut second = RasterSurface::new(24, 16, 1, Color32::WHITE);
    block_on(HalftoneFilter::new(TONES, PALETTE).apply(&src, &mut first));
    block_on(HalftoneFilter::new(TONES, PALETTE).apply(&src, &mut second));
    assert_eq!(first.image().pixels, second.image().pixels);
}

#[test]
fn halftone_output_is_drawn_from_the_palette() {
    let src = gradient_image(16, 16);
    let mut surface = RasterSurface::new(16, 16, 2, Color32::WHITE);
    block_on(HalftoneFilter::new(TONES, PALETTE).apply(&src, &mut surface));
    for px in &surface.image().pixels {
        assert!(PALETTE.contains(px), "{px:?} not a palette color");
    }
}

#[test]
fn halftone_load_is_reproducible_end_to_end() {
    let png = gradient_png(40, 24);
    let mut a = attached(40, 24);
    let mut b = attached(40, 24);
    block_on(a.load(&png, false, FilterMode::Halftone, false)).unwrap();
    block_on(b.load(&png, false, FilterMode::Halftone, false)).unwrap();
    assert_eq!(
        a.surface().unwrap().image().pixels,
        b.surface().unwrap().image().pixels
    );
}

#[test]
fn filtered_loads_are_flagged_heavy() {
    let mut engine = attached(16, 16);
    let flags: Rc<RefCell<Vec<bool>>> = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&flags);
    engine.subscribe(Box::new(move |event: &EngineEvent| {
        if let EngineEvent::LoadStarted { heavy } = event {
            sink.borrow_mut().push(*heavy);
        }
    }));

    let png = gradient_png(8, 8);
    block_on(engine.load(&png, false, FilterMode::Normal, false)).unwrap();
    block_on(engine.load(&png, false, FilterMode::Halftone, false)).unwrap();
    block_on(engine.load(&png, false, FilterMode::Tracing, false)).unwrap();
    assert_eq!(flags.borrow().as_slice(), [false, true, true]);
}

#[test]
fn trace_of_a_flat_image_is_uniform() {
    let mut engine = attached(12, 12);
    let png = {
        let img = image::RgbaImage::from_pixel(12, 12, image::Rgba([90, 120, 30, 255]));
        let mut out = Vec::new();
        image::codecs::png::PngEncoder::new(Cursor::new(&mut out))
            .write_image(img.as_raw(), 12, 12, image::ExtendedColorType::Rgba8)
            .unwrap();
        out
    };
    block_on(engine.load(&png, false, FilterMode::Tracing, false)).unwrap();
    let pixels = &engine.surface().unwrap().image().pixels;
    let first = pixels[0];
    assert!(pixels.iter().all(|&p| p == first));
    // A flat image has no edges; the output is the paper background, not
    // the source color.
    assert_ne!(first, Color32::from_rgb(90, 120, 30));
}

#[test]
fn trace_marks_contrast_boundaries() {
    let mut engine = attached(16, 8);
    let img = image::RgbaImage::from_fn(16, 8, |x, _| {
        if x < 8 {
            image::Rgba([0, 0, 0, 255])
        } else {
            image::Rgba([255, 255, 255, 255])
        }
    });
    let mut png = Vec::new();
    image::codecs::png::PngEncoder::new(Cursor::new(&mut png))
        .write_image(img.as_raw(), 16, 8, image::ExtendedColorType::Rgba8)
        .unwrap();
    block_on(engine.load(&png, false, FilterMode::Tracing, false)).unwrap();

    let surface = engine.surface().unwrap();
    let interior = surface.logical_pixel(2, 4).unwrap();
    let boundary = surface.logical_pixel(7, 4).unwrap();
    assert_ne!(interior, boundary, "the edge must stand out from flat areas");
}
