//! Whole-image stylization filters applied at load time, plus the shared
//! color math. Filters run cooperatively: each pass yields once per output
//! row so the host loop stays responsive during heavy conversions.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use egui::Color32;

mod halftone;
mod trace;

pub use halftone::HalftoneFilter;
pub use trace::trace_edges;

/// A minimal-delay suspension point: completes on the next poll.
pub(crate) fn yield_now() -> YieldNow {
    YieldNow { yielded: false }
}

pub(crate) struct YieldNow {
    yielded: bool,
}

impl Future for YieldNow {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        if self.yielded {
            Poll::Ready(())
        } else {
            self.yielded = true;
            cx.waker().wake_by_ref();
            Poll::Pending
        }
    }
}

/// Rec. 601 luma in [0, 255].
pub(crate) fn luma(c: Color32) -> f32 {
    0.299 * c.r() as f32 + 0.587 * c.g() as f32 + 0.114 * c.b() as f32
}

fn srgb_channel_to_linear(c: u8) -> f32 {
    let c = c as f32 / 255.0;
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// CIE Lab under D65, from 8-bit sRGB.
pub(crate) fn srgb_to_lab(c: Color32) -> [f32; 3] {
    let r = srgb_channel_to_linear(c.r());
    let g = srgb_channel_to_linear(c.g());
    let b = srgb_channel_to_linear(c.b());

    let x = (0.4124 * r + 0.3576 * g + 0.1805 * b) / 0.95047;
    let y = 0.2126 * r + 0.7152 * g + 0.0722 * b;
    let z = (0.0193 * r + 0.1192 * g + 0.9505 * b) / 1.08883;

    fn f(t: f32) -> f32 {
        if t > 0.008856 {
            t.cbrt()
        } else {
            7.787 * t + 16.0 / 116.0
        }
    }

    let (fx, fy, fz) = (f(x), f(y), f(z));
    [116.0 * fy - 16.0, 500.0 * (fx - fy), 200.0 * (fy - fz)]
}

/// Euclidean distance between two colors in Lab space.
pub(crate) fn lab_distance(a: Color32, b: Color32) -> f32 {
    let la = srgb_to_lab(a);
    let lb = srgb_to_lab(b);
    let dl = la[0] - lb[0];
    let da = la[1] - lb[1];
    let db = la[2] - lb[2];
    (dl * dl + da * da + db * db).sqrt()
}
