//! ASPRS classification color palette.

use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Color for codes without an entry (dark grey).
pub const DEFAULT_COLOR: u32 = 0x404040;

static PALETTE: Lazy<HashMap<u8, u32>> = Lazy::new(|| {
    HashMap::from([
        (1, 0x808080),  // Unclassified
        (2, 0x8B4513),  // Ground
        (3, 0x90EE90),  // Low vegetation
        (4, 0x32CD32),  // Medium vegetation
        (5, 0x228B22),  // High vegetation
        (6, 0xFF4500),  // Building
        (7, 0x800080),  // Low point (noise)
        (9, 0x0000FF),  // Water
        (10, 0x000000), // Rail
        (11, 0x696969), // Road surface
        (12, 0xFFFFFF), // Overlap
        (13, 0xFFD700), // Wire guard
        (14, 0xFFA500), // Wire conductor
        (15, 0x8B0000), // Transmission tower
        (16, 0xDC143C), // Wire connector
        (17, 0x4B0082), // Bridge deck
        (18, 0xFF1493), // High noise
    ])
});

/// Packed 0xRRGGBB color for an ASPRS classification code.
pub fn classification_rgb(code: u8) -> u32 {
    PALETTE.get(&code).copied().unwrap_or(DEFAULT_COLOR)
}

/// Normalized RGB in [0, 1] for an ASPRS classification code.
pub fn classification_color(code: u8) -> [f32; 3] {
    let rgb = classification_rgb(code);
    [
        ((rgb >> 16) & 0xFF) as f32 / 255.0,
        ((rgb >> 8) & 0xFF) as f32 / 255.0,
        (rgb & 0xFF) as f32 / 255.0,
    ]
}

/// Short English name for a classification code.
pub fn classification_name(code: u8) -> &'static str {
    match code {
        0 => "Never classified",
        1 => "Unclassified",
        2 => "Ground",
        3 => "Low vegetation",
        4 => "Medium vegetation",
        5 => "High vegetation",
        6 => "Building",
        7 => "Low point",
        9 => "Water",
        10 => "Rail",
        11 => "Road surface",
        12 => "Overlap",
        13 => "Wire guard",
        14 => "Wire conductor",
        15 => "Transmission tower",
        16 => "Wire connector",
        17 => "Bridge deck",
        18 => "High noise",
        _ => "Reserved",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_codes() {
        assert_eq!(classification_rgb(2), 0x8B4513);
        assert_eq!(classification_color(9), [0.0, 0.0, 1.0]);
        assert_eq!(classification_color(12), [1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_unknown_codes_fall_back() {
        assert_eq!(classification_rgb(0), DEFAULT_COLOR);
        assert_eq!(classification_rgb(8), DEFAULT_COLOR);
        assert_eq!(classification_rgb(200), DEFAULT_COLOR);
        assert_eq!(classification_name(200), "Reserved");
    }
}
