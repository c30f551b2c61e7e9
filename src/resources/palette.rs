use egui::Color32;

/// Reference light/dark pair used when scoring tones against a normalized
/// grayscale window in the halftone filter.
pub const REF_LIGHT: Color32 = Color32::from_rgb(0xff, 0xff, 0xff);
pub const REF_DARK: Color32 = Color32::from_rgb(0x00, 0x00, 0x00);

/// Fixed drawing palette. Candidate iteration order in the halftone filter
/// is this array order; ties resolve to the earlier entry.
pub const PALETTE: &[Color32] = &[
    Color32::from_rgb(0x00, 0x00, 0x00), // black
    Color32::from_rgb(0xff, 0xff, 0xff), // white
    Color32::from_rgb(0x7f, 0x7f, 0x7f), // gray
    Color32::from_rgb(0xc3, 0xc3, 0xc3), // silver
    Color32::from_rgb(0x88, 0x00, 0x15), // maroon
    Color32::from_rgb(0xed, 0x1c, 0x24), // red
    Color32::from_rgb(0xff, 0x7f, 0x27), // orange
    Color32::from_rgb(0xff, 0xf2, 0x00), // yellow
    Color32::from_rgb(0x22, 0xb1, 0x4c), // green
    Color32::from_rgb(0x00, 0xa2, 0xe8), // sky
    Color32::from_rgb(0x3f, 0x48, 0xcc), // indigo
    Color32::from_rgb(0xa3, 0x49, 0xa4), // purple
    Color32::from_rgb(0xb9, 0x7a, 0x57), // brown
    Color32::from_rgb(0xff, 0xae, 0xc9), // rose
    Color32::from_rgb(0xb5, 0xe6, 0x1d), // lime
    Color32::from_rgb(0x99, 0xd9, 0xea), // ice
];
