/// A brush stamp: an odd-dimensioned bit matrix centered exactly on the
/// drawing point, plus the font size the same size selection uses in text
/// mode.
pub struct Brush {
    pub name: &'static str,
    /// Side length of the (square, odd) bit matrix.
    pub size: usize,
    /// Row-major bits, `size * size` entries.
    bits: &'static [u8],
    /// Text height in logical pixels when this brush size is active.
    pub font_px: usize,
}

impl Brush {
    pub fn bit(&self, bx: usize, by: usize) -> bool {
        self.bits[by * self.size + bx] != 0
    }

    pub fn radius(&self) -> usize {
        self.size / 2
    }

    /// Constructor for ad-hoc stamp shapes outside the built-in catalog.
    pub fn custom(size: usize, bits: &'static [u8], font_px: usize) -> Self {
        debug_assert!(size % 2 == 1);
        debug_assert_eq!(bits.len(), size * size);
        Self {
            name: "custom",
            size,
            bits,
            font_px,
        }
    }
}

#[rustfmt::skip]
pub const BRUSHES: &[Brush] = &[
    Brush {
        name: "light",
        size: 1,
        bits: &[1],
        font_px: 7,
    },
    Brush {
        name: "medium",
        size: 3,
        bits: &[
            0, 1, 0,
            1, 1, 1,
            0, 1, 0,
        ],
        font_px: 14,
    },
    Brush {
        name: "heavy",
        size: 5,
        bits: &[
            0, 1, 1, 1, 0,
            1, 1, 1, 1, 1,
            1, 1, 1, 1, 1,
            1, 1, 1, 1, 1,
            0, 1, 1, 1, 0,
        ],
        font_px: 21,
    },
];
