//! Fixed-permutation gradient noise.
//!
//! The permutation table is the classic improved-Perlin table and never
//! changes with the world seed. Callers get seeded variety by offsetting the
//! noise-space Y axis instead (see [`crate::salt`]), which is the only seeding
//! mechanism a host-native coordinate noise exposes. Both backends in this
//! module therefore implement [`noise::NoiseFn`] and are interchangeable in the
//! fractal compositors.

use noise::{NoiseFn, Perlin};

/// Ken Perlin's reference permutation of 0..=255.
const PERMUTATION: [u8; 256] = [
    151, 160, 137, 91, 90, 15, 131, 13, 201, 95, 96, 53, 194, 233, 7, 225, 140, 36, 103, 30, 69,
    142, 8, 99, 37, 240, 21, 10, 23, 190, 6, 148, 247, 120, 234, 75, 0, 26, 197, 62, 94, 252, 219,
    203, 117, 35, 11, 32, 57, 177, 33, 88, 237, 149, 56, 87, 174, 20, 125, 136, 171, 168, 68, 175,
    74, 165, 71, 134, 139, 48, 27, 166, 77, 146, 158, 231, 83, 111, 229, 122, 60, 211, 133, 230,
    220, 105, 92, 41, 55, 46, 245, 40, 244, 102, 143, 54, 65, 25, 63, 161, 1, 216, 80, 73, 209, 76,
    132, 187, 208, 89, 18, 169, 200, 196, 135, 130, 116, 188, 159, 86, 164, 100, 109, 198, 173,
    186, 3, 64, 52, 217, 226, 250, 124, 123, 5, 202, 38, 147, 118, 126, 255, 82, 85, 212, 207, 206,
    59, 227, 47, 16, 58, 17, 182, 189, 28, 42, 223, 183, 170, 213, 119, 248, 152, 2, 44, 154, 163,
    70, 221, 153, 101, 155, 167, 43, 172, 9, 129, 22, 39, 253, 19, 98, 108, 110, 79, 113, 224, 232,
    178, 185, 112, 104, 218, 246, 97, 228, 251, 34, 242, 193, 238, 210, 144, 12, 191, 179, 162,
    241, 81, 51, 145, 235, 249, 14, 239, 107, 49, 192, 214, 31, 181, 199, 106, 157, 184, 84, 204,
    176, 115, 121, 50, 45, 127, 4, 150, 254, 138, 236, 205, 93, 222, 114, 67, 29, 24, 72, 243,
    141, 128, 195, 78, 66, 215, 61, 156, 180,
];

/// Permutation duplicated to 512 entries so `p[i + 1]` never wraps.
static P: [u8; 512] = {
    let mut table = [0u8; 512];
    let mut i = 0;
    while i < 512 {
        table[i] = PERMUTATION[i & 255];
        i += 1;
    }
    table
};

#[inline]
fn fade(t: f64) -> f64 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

#[inline]
fn lerp(t: f64, a: f64, b: f64) -> f64 {
    a + t * (b - a)
}

#[inline]
fn grad(hash: u8, x: f64, y: f64, z: f64) -> f64 {
    let h = hash & 15;
    let u = if h < 8 { x } else { y };
    let v = if h < 4 {
        y
    } else if h == 12 || h == 14 {
        x
    } else {
        z
    };
    (if h & 1 == 0 { u } else { -u }) + (if h & 2 == 0 { v } else { -v })
}

/// Lattice cell index of `v`, wrapped to the table size.
#[inline]
fn cell(v: f64) -> usize {
    ((v.floor() as i64) & 255) as usize
}

/// Improved Perlin noise at `(x, y, z)`, approximately in `[-1, 1]`.
///
/// Returns exactly `0.0` at integer lattice points.
pub fn perlin3(x: f64, y: f64, z: f64) -> f64 {
    let xi = cell(x);
    let yi = cell(y);
    let zi = cell(z);

    let x = x - x.floor();
    let y = y - y.floor();
    let z = z - z.floor();

    let u = fade(x);
    let v = fade(y);
    let w = fade(z);

    let a = P[xi] as usize + yi;
    let aa = P[a] as usize + zi;
    let ab = P[a + 1] as usize + zi;
    let b = P[xi + 1] as usize + yi;
    let ba = P[b] as usize + zi;
    let bb = P[b + 1] as usize + zi;

    lerp(
        w,
        lerp(
            v,
            lerp(u, grad(P[aa], x, y, z), grad(P[ba], x - 1.0, y, z)),
            lerp(u, grad(P[ab], x, y - 1.0, z), grad(P[bb], x - 1.0, y - 1.0, z)),
        ),
        lerp(
            v,
            lerp(
                u,
                grad(P[aa + 1], x, y, z - 1.0),
                grad(P[ba + 1], x - 1.0, y, z - 1.0),
            ),
            lerp(
                u,
                grad(P[ab + 1], x, y - 1.0, z - 1.0),
                grad(P[bb + 1], x - 1.0, y - 1.0, z - 1.0),
            ),
        ),
    )
}

/// The reference noise field used by every in-process sampling path.
///
/// Zero-sized; the table it reads is process-wide and immutable.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PerlinField;

impl NoiseFn<f64, 3> for PerlinField {
    #[inline]
    fn get(&self, point: [f64; 3]) -> f64 {
        perlin3(point[0], point[1], point[2])
    }
}

/// Stand-in for a host platform's native coordinate noise.
///
/// Wraps the `noise` crate's unseeded [`Perlin`]. Output matches
/// [`PerlinField`] in range and character but not value for value.
#[derive(Clone, Debug, Default)]
pub struct HostNoise {
    inner: Perlin,
}

impl HostNoise {
    pub fn new() -> Self {
        Self::default()
    }
}

impl NoiseFn<f64, 3> for HostNoise {
    #[inline]
    fn get(&self, point: [f64; 3]) -> f64 {
        self.inner.get(point)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
