//! Seed salts and deterministic math.
//!
//! The noise table is never reshuffled. A feature that needs its own noise
//! stream adds a fixed salt to the world seed, and the compositor turns the
//! salted seed into a noise-space Y offset. Every salt lives here so the
//! in-process samplers and the emitted host script use identical streams.
//!
//! Transcendental functions go through `libm` so results do not depend on the
//! platform libc.

/// Seed-to-offset multiplier for the fractal compositors.
pub const SEED_SPACING: f64 = 100.0;

/// Ridged compositor stream.
pub const RIDGED: i64 = 100;
/// Billow compositor stream.
pub const BILLOW: i64 = 200;
/// Standard-topology mountain cluster mask.
pub const CHAIN_MASK: i64 = 99;
/// Fault-line warp, X component.
pub const FAULT_WARP_X: i64 = 300;
/// Fault-line warp, Z component.
pub const FAULT_WARP_Z: i64 = 400;
/// Volcanic hotspot gate.
pub const VOLCANO: i64 = 555;
/// Coral reef gate.
pub const CORAL: i64 = 888;
/// River channel field. Used as a raw Y coordinate, not scaled.
pub const RIVER: i64 = 999;
/// Temperature field.
pub const TEMPERATURE: i64 = 1000;
/// Humidity field.
pub const HUMIDITY: i64 = 2000;
/// Lava pool gate inside volcanic hotspots.
pub const LAVA: i64 = 111;

/// Noise-space Y offset for a salted seed.
#[inline]
pub fn seed_offset(seed: i64) -> f64 {
    seed as f64 * SEED_SPACING
}

// ---------------------------------------------------------------------------
// Deterministic math (libm)
// ---------------------------------------------------------------------------

/// Deterministic power using libm.
#[inline]
pub fn det_pow(base: f64, exp: f64) -> f64 {
    libm::pow(base, exp)
}

/// Deterministic sine using libm.
#[inline]
pub fn det_sin(x: f64) -> f64 {
    libm::sin(x)
}

/// Deterministic sqrt using libm.
#[inline]
pub fn det_sqrt(x: f64) -> f64 {
    libm::sqrt(x)
}

/// Linear interpolation from `a` to `b`.
#[inline]
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Hermite step between `edge0` and `edge1`.
///
/// Reversed edges (`edge0 > edge1`) give a falling step, which the world
/// masks rely on.
#[inline]
pub fn smoothstep(edge0: f64, edge1: f64, value: f64) -> f64 {
    let x = ((value - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    x * x * (3.0 - 2.0 * x)
}

/// Round half up, matching `floor(v + 0.5)`.
#[inline]
pub fn round_half_up(v: f64) -> f64 {
    (v + 0.5).floor()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_salts_are_distinct() {
        let salts = [
            RIDGED,
            BILLOW,
            CHAIN_MASK,
            FAULT_WARP_X,
            FAULT_WARP_Z,
            VOLCANO,
            CORAL,
            RIVER,
            TEMPERATURE,
            HUMIDITY,
            LAVA,
        ];
        for (i, a) in salts.iter().enumerate() {
            for b in &salts[i + 1..] {
                assert_ne!(a, b, "salt {a} used twice");
            }
        }
    }

    #[test]
    fn test_seed_offset() {
        assert_eq!(seed_offset(8888), 888_800.0);
        assert_eq!(seed_offset(8888 + RIDGED), 898_800.0);
        assert_eq!(seed_offset(-3), -300.0);
    }

    #[test]
    fn test_smoothstep_edges() {
        assert_eq!(smoothstep(0.0, 0.4, -1.0), 0.0);
        assert_eq!(smoothstep(0.0, 0.4, 0.4), 1.0);
        assert!((smoothstep(0.0, 0.4, 0.2) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_reversed_smoothstep_falls() {
        assert_eq!(smoothstep(0.95, 0.6, 0.5), 1.0);
        assert_eq!(smoothstep(0.95, 0.6, 1.0), 0.0);
        let mid = smoothstep(0.95, 0.6, 0.8);
        assert!(mid > 0.0 && mid < 1.0);
    }

    #[test]
    fn test_round_half_up() {
        assert_eq!(round_half_up(2.5), 3.0);
        assert_eq!(round_half_up(-2.5), -2.0);
        assert_eq!(round_half_up(0.49), 0.0);
    }

    #[test]
    fn test_det_math_matches_std() {
        for x in [0.0, 0.5, 1.0, 2.0, 10.0] {
            assert!((det_sqrt(x) - x.sqrt()).abs() < 1e-12);
            assert!((det_sin(x) - x.sin()).abs() < 1e-12);
            assert!((det_pow(x, 1.2) - x.powf(1.2)).abs() < 1e-12);
        }
    }
}
