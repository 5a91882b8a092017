//! Preview colors.

/// Linear-blend RGB color with channels nominally in `[0, 1]`.
///
/// Channels may leave that range after [`Color::add_scalar`]; they are
/// clamped only when quantized.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Color from a `0xRRGGBB` literal.
    pub const fn from_hex(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xff) as f32 / 255.0,
            g: ((hex >> 8) & 0xff) as f32 / 255.0,
            b: (hex & 0xff) as f32 / 255.0,
        }
    }

    /// Color from hue, saturation and lightness, each in `[0, 1]`.
    pub fn from_hsl(h: f32, s: f32, l: f32) -> Self {
        let h = h.rem_euclid(1.0);
        let s = s.clamp(0.0, 1.0);
        let l = l.clamp(0.0, 1.0);
        if s == 0.0 {
            return Self::new(l, l, l);
        }
        let q = if l <= 0.5 { l * (1.0 + s) } else { l + s - l * s };
        let p = 2.0 * l - q;
        Self::new(
            hue_to_rgb(p, q, h + 1.0 / 3.0),
            hue_to_rgb(p, q, h),
            hue_to_rgb(p, q, h - 1.0 / 3.0),
        )
    }

    /// Move `t` of the way toward `other`.
    pub fn lerp(self, other: Color, t: f32) -> Self {
        Self::new(
            self.r + (other.r - self.r) * t,
            self.g + (other.g - self.g) * t,
            self.b + (other.b - self.b) * t,
        )
    }

    /// Add `s` to every channel.
    pub fn add_scalar(self, s: f32) -> Self {
        Self::new(self.r + s, self.g + s, self.b + s)
    }

    /// Quantize to 8-bit channels, clamping out-of-range values.
    pub fn to_rgb8(self) -> [u8; 3] {
        let q = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        [q(self.r), q(self.g), q(self.b)]
    }
}

fn hue_to_rgb(p: f32, q: f32, t: f32) -> f32 {
    let t = t.rem_euclid(1.0);
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 0.5 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * 6.0 * (2.0 / 3.0 - t)
    } else {
        p
    }
}

pub const BEACH: Color = Color::from_hex(0xd6cba5);
pub const SAND: Color = Color::from_hex(0xe6d9b3);
pub const MESA_ORANGE: Color = Color::from_hex(0xd67f45);
pub const MESA_RED: Color = Color::from_hex(0xa34a26);
pub const MESA_BROWN: Color = Color::from_hex(0x754228);

pub const GRASS_DRY: Color = Color::from_hex(0x8da860);
pub const SAVANNAH: Color = Color::from_hex(0xbab548);
pub const GRASS_LUSH: Color = Color::from_hex(0x4c8c3e);
pub const FOREST: Color = Color::from_hex(0x2d5e2e);
pub const TAIGA: Color = Color::from_hex(0x3b4d3b);
pub const JUNGLE: Color = Color::from_hex(0x1a330a);
pub const SWAMP: Color = Color::from_hex(0x4a5438);

pub const ROCK: Color = Color::from_hex(0x5a5752);
pub const ROCK_DARK: Color = Color::from_hex(0x3e3b38);
pub const ROCK_LIGHT: Color = Color::from_hex(0x757068);
pub const MUD: Color = Color::from_hex(0x5c4f3d);

pub const SNOW: Color = Color::from_hex(0xffffff);
pub const ICE: Color = Color::from_hex(0xaaddff);

pub const VOLCANIC: Color = Color::from_hex(0x1a1a1a);
pub const LAVA: Color = Color::from_hex(0xff4400);
pub const CORAL_PINK: Color = Color::from_hex(0xe06c75);
pub const CORAL_GREEN: Color = Color::from_hex(0x98c379);

// Tectonics debug ramp.
pub const STRESS_NONE: Color = Color::from_hex(0x111111);
pub const STRESS_LOW: Color = Color::from_hex(0x550000);
pub const STRESS_HIGH: Color = Color::from_hex(0xff0000);
pub const STRESS_PEAK: Color = Color::from_hex(0xffff00);
