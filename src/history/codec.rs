use std::io::Cursor;

use egui::{Color32, ColorImage};
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, ImageFormat};

use crate::error::{EngineError, EngineResult};

/// Encodes and decodes raster snapshots. The engine treats snapshot bytes
/// as opaque; hosts may substitute their own codec at construction.
pub trait RasterCodec {
    fn encode(&self, image: &ColorImage) -> EngineResult<Vec<u8>>;
    fn decode(&self, bytes: &[u8]) -> EngineResult<ColorImage>;
}

/// Default snapshot codec: lossless PNG via the `image` crate. The canvas
/// is fully opaque, so premultiplied and straight alpha coincide.
pub struct PngCodec;

impl RasterCodec for PngCodec {
    fn encode(&self, image: &ColorImage) -> EngineResult<Vec<u8>> {
        let [w, h] = image.size;
        if image.pixels.len() != w * h {
            return Err(EngineError::InvariantViolation(
                "raster buffer does not match its dimensions",
            ));
        }
        let mut rgba = Vec::with_capacity(w * h * 4);
        for px in &image.pixels {
            rgba.extend_from_slice(&px.to_array());
        }
        let mut out = Vec::new();
        PngEncoder::new(Cursor::new(&mut out)).write_image(
            &rgba,
            w as u32,
            h as u32,
            ExtendedColorType::Rgba8,
        )?;
        Ok(out)
    }

    fn decode(&self, bytes: &[u8]) -> EngineResult<ColorImage> {
        let decoded = image::load_from_memory_with_format(bytes, ImageFormat::Png)?.to_rgba8();
        let size = [decoded.width() as usize, decoded.height() as usize];
        let pixels = decoded
            .as_raw()
            .chunks_exact(4)
            .map(|c| Color32::from_rgba_premultiplied(c[0], c[1], c[2], c[3]))
            .collect();
        Ok(ColorImage { size, pixels })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn png_round_trip_is_pixel_exact() {
        let mut image = ColorImage::new([5, 3], Color32::WHITE);
        image.pixels[0] = Color32::from_rgb(10, 20, 30);
        image.pixels[7] = Color32::BLACK;
        image.pixels[14] = Color32::from_rgb(200, 100, 0);

        let codec = PngCodec;
        let bytes = codec.encode(&image).unwrap();
        let back = codec.decode(&bytes).unwrap();
        assert_eq!(back.size, image.size);
        assert_eq!(back.pixels, image.pixels);
    }

    #[test]
    fn garbage_bytes_fail_to_decode() {
        assert!(PngCodec.decode(b"not a png").is_err());
    }
}
