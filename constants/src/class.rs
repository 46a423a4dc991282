use bevy::color::Color;

/// Ornament colours: hot pink, light pink, white, red, platinum.
pub const ORNAMENT_PALETTE: &[Color] = &[
    Color::srgb(1.0, 0.412, 0.706),
    Color::srgb(1.0, 0.714, 0.757),
    Color::srgb(1.0, 1.0, 1.0),
    Color::srgb(1.0, 0.0, 0.0),
    Color::srgb(0.898, 0.894, 0.886),
];

/// Gift wrap colours: hot pink, light pink, white, gold, violet red, platinum.
pub const GIFT_PALETTE: &[Color] = &[
    Color::srgb(1.0, 0.412, 0.706),
    Color::srgb(1.0, 0.714, 0.757),
    Color::srgb(1.0, 1.0, 1.0),
    Color::srgb(1.0, 0.843, 0.0),
    Color::srgb(0.780, 0.082, 0.522),
    Color::srgb(0.898, 0.894, 0.886),
];

pub const SNOW_COLOR: Color = Color::srgba(1.0, 1.0, 1.0, 0.8);

/// Unsaturated backdrop stars; scaled past 1.0 in linear space so they bloom.
pub const STAR_FIELD_COLOR: Color = Color::srgb(0.9, 0.9, 0.9);
pub const STAR_FIELD_GLOW: f32 = 2.5;

pub const STAR_GOLD: Color = Color::srgb(1.0, 0.843, 0.0);

pub const FRAME_GOLD: Color = Color::srgb(1.0, 0.843, 0.0);
pub const FRAME_BACKING: Color = Color::srgb(0.2, 0.067, 0.133);
pub const FRAME_PLACEHOLDER: Color = Color::srgb(0.176, 0.039, 0.086);
pub const FRAME_PLACEHOLDER_EMISSIVE: Color = Color::srgb(0.102, 0.0, 0.051);

/// Per-style doll colours.
pub struct DollStyleInfo {
    pub id: u8,
    pub name: &'static str,
    pub bow: Color,
    pub head: Color,
    pub dress: Color,
}

pub const DOLL_STYLES: &[DollStyleInfo] = &[
    DollStyleInfo {
        id: 0,
        name: "classic",
        bow: Color::srgb(1.0, 0.0, 0.0),
        head: Color::srgb(1.0, 1.0, 1.0),
        dress: Color::srgb(0.0, 0.0, 1.0),
    },
    DollStyleInfo {
        id: 1,
        name: "princess",
        bow: Color::srgb(1.0, 0.412, 0.706),
        head: Color::srgb(1.0, 1.0, 1.0),
        dress: Color::srgb(1.0, 0.714, 0.757),
    },
    DollStyleInfo {
        id: 2,
        name: "gold",
        bow: Color::srgb(1.0, 0.843, 0.0),
        head: Color::srgb(1.0, 0.973, 0.906),
        dress: Color::srgb(0.773, 0.627, 0.0),
    },
];

pub fn get_style_info(id: u8) -> &'static DollStyleInfo {
    DOLL_STYLES
        .iter()
        .find(|s| s.id == id)
        .unwrap_or(&DOLL_STYLES[0])
}

/// Cumulative style thresholds on a uniform draw: > 0.6 princess, > 0.9 gold.
pub const PRINCESS_THRESHOLD: f32 = 0.6;
pub const GOLD_THRESHOLD: f32 = 0.9;
