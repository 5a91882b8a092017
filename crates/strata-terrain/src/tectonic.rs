//! Warped ridged fault chains shared by the Alpine and Standard topologies.

use noise::NoiseFn;

use crate::fractal::{FractalParams, fbm, ridged_fbm};
use crate::salt::{self, det_pow};

/// Age below which chains are sharpened rather than rounded.
pub const YOUNG_AGE: f64 = 0.3;
/// Power applied to young chains.
pub const YOUNG_EXPONENT: f64 = 1.2;
/// Power applied to old chains.
pub const OLD_EXPONENT: f64 = 0.8;

/// Output of one fault-chain evaluation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TectonicChain {
    /// Chain height in `[0, 1]` after the age curve.
    pub height: f64,
    /// Raw ridged intensity before the age curve.
    pub activity: f64,
}

/// Evaluate the fault chain at `(x, z)`.
///
/// `base` carries the terrain's own fractal knobs; the warp and ridge bands
/// are derived from its scale.
pub fn tectonic_chain<N>(noise: &N, x: f64, z: f64, base: &FractalParams, age: f64) -> TectonicChain
where
    N: NoiseFn<f64, 3> + ?Sized,
{
    let warp = base.with_scale(base.scale * 2.5).with_octaves(2);
    let wx = fbm(noise, x, z, &warp.with_seed(base.seed + salt::FAULT_WARP_X));
    let wz = fbm(noise, x + 500.0, z + 500.0, &warp.with_seed(base.seed + salt::FAULT_WARP_Z));

    let fault_x = x + wx * base.scale * 1.2;
    let fault_z = z + wz * base.scale * 1.2;

    let ridge = base.with_scale(base.scale * 1.2).with_octaves(6);
    let activity = ridged_fbm(noise, fault_x, fault_z, &ridge);

    let exponent = if age < YOUNG_AGE { YOUNG_EXPONENT } else { OLD_EXPONENT };
    TectonicChain {
        height: det_pow(activity, exponent),
        activity,
    }
}
