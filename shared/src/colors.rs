/// Ordered palette shared with the canvas service. Pixel color indices on the
/// wire index into this table.
pub const PALETTE: [&str; 16] = [
    "#000000", "#FF0000", "#0000FF", "#00FF00", "#FFFF00", "#FF00FF", "#00FFFF", "#FF8000",
    "#8000FF", "#008000", "#808080", "#FFC0CB", "#A52A2A", "#FFD700", "#40E0D0", "#FFFFFF",
];

pub const PALETTE_LEN: usize = PALETTE.len();

/// Index of `#FFFFFF`, used for any color the palette does not know.
pub const WHITE_INDEX: u8 = 15;

pub fn is_palette_index(index: u8) -> bool {
    usize::from(index) < PALETTE_LEN
}

/// Map a raw color value to a palette index. Anything outside the palette,
/// including negative values, renders white.
pub fn display_index(raw: i64) -> u8 {
    u8::try_from(raw)
        .ok()
        .filter(|index| is_palette_index(*index))
        .unwrap_or(WHITE_INDEX)
}
