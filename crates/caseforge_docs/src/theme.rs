//! Brand colors shared by the workbook and document renderings.

/// Header band / header cell fill.
pub const BRAND_BLUE: u32 = 0x0052CC;
pub const HEADER_TEXT: u32 = 0xFFFFFF;
pub const BODY_TEXT: u32 = 0x000000;
/// Row shading keyed by row index parity.
pub const ROW_SHADE_EVEN: u32 = 0xF9F9F9;
pub const ROW_SHADE_ODD: u32 = 0xFFFFFF;
pub const GRID_LINE: u32 = 0xDDDDDD;

/// Split a `0xRRGGBB` value into its channels.
pub const fn rgb_channels(color: u32) -> (u8, u8, u8) {
    (
        ((color >> 16) & 0xFF) as u8,
        ((color >> 8) & 0xFF) as u8,
        (color & 0xFF) as u8,
    )
}

/// Shade for the row at `index` (0-based, counted across the whole table).
pub const fn row_shade(index: usize) -> u32 {
    if index % 2 == 0 { ROW_SHADE_EVEN } else { ROW_SHADE_ODD }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channels() {
        assert_eq!(rgb_channels(BRAND_BLUE), (0x00, 0x52, 0xCC));
        assert_eq!(rgb_channels(HEADER_TEXT), (255, 255, 255));
    }

    #[test]
    fn shading_alternates() {
        assert_eq!(row_shade(0), ROW_SHADE_EVEN);
        assert_eq!(row_shade(1), ROW_SHADE_ODD);
        assert_eq!(row_shade(20), ROW_SHADE_EVEN);
        assert_ne!(ROW_SHADE_EVEN, ROW_SHADE_ODD);
    }
}
