//! Height synthesis: domain warp, topology dispatch, exaggeration, world
//! masking, river carving, terracing and surface detail.
//!
//! Every stage is a pure function of `(x, z, TerrainParameters)`, so the
//! preview mesh and the voxel writer agree on the surface wherever they both
//! sample it.

use noise::NoiseFn;
use strata_config::{GenerationType, TerrainParameters, Topology};

use crate::field::PerlinField;
use crate::fractal::{FractalParams, billow_fbm, fbm, ridged_fbm};
use crate::salt::{self, det_pow, det_sqrt, lerp, round_half_up, smoothstep};
use crate::tectonic::tectonic_chain;

/// Height01 that masked-out terrain sinks to.
pub const SEA_FLOOR: f64 = -0.2;
/// Discrete levels of the Canyons plateau quantizer.
pub const CANYON_STEPS: f64 = 8.0;
/// Share of the way a value is pulled toward its terrace level.
pub const TERRACE_BLEND: f64 = 0.6;
/// Detail noise only roughens surfaces above this height.
pub const DETAIL_MIN_HEIGHT: f64 = 5.0;

/// Per-coordinate output of the height pipeline.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SampleResult {
    /// Surface height in world units.
    pub height: f64,
    /// Inside a carved river channel.
    pub is_river: bool,
    /// Raw fault-chain intensity. Drives the tectonics debug view.
    pub tectonic_activity: f64,
}

/// Evaluates the terrain surface for one parameter set.
///
/// Generic over the noise backend; [`HeightSynthesizer::new`] uses the
/// reference [`PerlinField`].
#[derive(Clone, Debug)]
pub struct HeightSynthesizer<N = PerlinField> {
    noise: N,
    params: TerrainParameters,
    base: FractalParams,
}

impl HeightSynthesizer<PerlinField> {
    pub fn new(params: TerrainParameters) -> Self {
        Self::with_noise(PerlinField, params)
    }
}

impl<N: NoiseFn<f64, 3>> HeightSynthesizer<N> {
    /// Build a synthesizer over a specific noise backend.
    pub fn with_noise(noise: N, params: TerrainParameters) -> Self {
        let base = FractalParams::from_terrain(&params);
        Self { noise, params, base }
    }

    pub fn params(&self) -> &TerrainParameters {
        &self.params
    }

    pub fn noise(&self) -> &N {
        &self.noise
    }

    /// Surface height only.
    pub fn height(&self, x: f64, z: f64) -> f64 {
        self.sample(x, z).height
    }

    /// Full pipeline at `(x, z)`.
    pub fn sample(&self, x: f64, z: f64) -> SampleResult {
        let p = &self.params;
        let age = p.terrain_age;

        let (wx, wz) = self.domain_warp(x, z);
        let (mut h, tectonic_activity) = self.topology_height(wx, wz);

        if p.topology != Topology::Canyons {
            h = exaggerate(h, p.exaggeration, age);
        }

        h = self.world_mask(h, x, z);

        let mut is_river = false;
        if p.river_depth > 0.0 && !matches!(p.topology, Topology::Dunes | Topology::Canyons) {
            let river_scale = p.scale * 3.5;
            let raw = self.noise.get([
                wx / river_scale,
                (p.seed + salt::RIVER) as f64,
                wz / river_scale,
            ]);
            let (dig, channel) = river_carve(raw.abs(), age, p.river_depth);
            h -= dig;
            is_river = channel;
        }

        if p.terrace_steps > 0 && p.topology != Topology::Canyons {
            h = terrace(h, p.terrace_steps);
        }

        let mut height = h * p.height_scale;

        if p.detail_strand_frequency > 0.0 && height > DETAIL_MIN_HEIGHT {
            let (freq_mult, amp_mult) = if age < 0.3 { (2.0, 1.0) } else { (0.5, 0.3) };
            let detail_scale = p.detail_strand_frequency * 0.05 * freq_mult;
            let detail = self
                .noise
                .get([x * detail_scale, p.seed as f64, z * detail_scale]);
            height += detail * 0.8 * amp_mult;
        }

        SampleResult {
            height,
            is_river,
            tectonic_activity,
        }
    }

    /// Soft global warp; older, more eroded terrain warps harder.
    fn domain_warp(&self, x: f64, z: f64) -> (f64, f64) {
        let p = &self.params;
        let warp = self.base.with_scale(p.scale * 1.5).with_octaves(2);
        let factor = p.erosion_strength * 25.0 * (1.0 + p.terrain_age * 0.5);

        let qx = fbm(&self.noise, x, z, &warp);
        let qz = fbm(&self.noise, x + 5.2, z + 1.3, &warp);
        (x + qx * factor, z + qz * factor)
    }

    /// Height01 and tectonic activity of the selected landform.
    fn topology_height(&self, wx: f64, wz: f64) -> (f64, f64) {
        let p = &self.params;
        let base = &self.base;
        let age = p.terrain_age;

        match p.topology {
            Topology::Dunes => {
                let b = billow_fbm(&self.noise, wx, wz, &base.with_scale(p.scale * 0.6).with_octaves(4));
                (b * 0.3 + 0.1, 0.0)
            }
            Topology::Alpine => {
                let chain = tectonic_chain(&self.noise, wx, wz, base, age);
                let mut h = chain.height;
                if age < 0.5 {
                    let rough = fbm(&self.noise, wx, wz, &base.with_scale(p.scale * 0.1).with_octaves(3));
                    h += rough * 0.05 * (1.0 - age);
                } else {
                    h *= 0.8;
                }
                (h, chain.activity)
            }
            Topology::Canyons => {
                let plateau = fbm(&self.noise, wx, wz, &base.with_scale(p.scale * 2.0).with_octaves(3));
                let valley = ridged_fbm(&self.noise, wx, wz, &base.with_scale(p.scale * 0.8).with_octaves(4));
                let h = plateau * 0.2 + 0.6 - valley * (1.5 + age * 0.5) * p.erosion_strength;
                (round_half_up(h * CANYON_STEPS) / CANYON_STEPS, valley)
            }
            Topology::Standard => {
                let continent = fbm(&self.noise, wx, wz, &base.with_scale(p.scale * 2.5).with_octaves(4));
                let mut h = (continent + 1.0) / 2.0;
                let mut activity = 0.0;

                let mask_params = base
                    .with_seed(p.seed + salt::CHAIN_MASK)
                    .with_scale(p.scale * 2.0)
                    .with_octaves(2);
                let mask = fbm(&self.noise, wx / 2.0, wz / 2.0, &mask_params);
                if mask > 0.0 {
                    let chain = tectonic_chain(&self.noise, wx, wz, base, age);
                    let blend = smoothstep(0.0, 0.4, mask);
                    h = lerp(h, chain.height, blend * p.ridge_noise_strength);
                    activity = chain.activity * blend;
                }
                (h, activity)
            }
        }
    }

    /// Island and archipelago falloff. Measured on unwarped coordinates.
    fn world_mask(&self, h: f64, x: f64, z: f64) -> f64 {
        let p = &self.params;
        let normalized_dist = det_sqrt(x * x + z * z) / (p.map_size * 0.5);

        match p.generation_type {
            GenerationType::Infinite => h,
            GenerationType::Island => lerp(SEA_FLOOR, h, island_mask(normalized_dist)),
            GenerationType::Archipelago => {
                let global = smoothstep(1.0, 0.7, normalized_dist);
                let cluster_params = self.base.with_scale(p.scale * 4.0).with_octaves(2);
                let cluster = (fbm(&self.noise, x, z, &cluster_params) + 1.0) / 2.0;
                lerp(SEA_FLOOR, h, global * smoothstep(0.4, 0.55, cluster))
            }
        }
    }
}

/// Island falloff: 1 inside 60% of the half extent, 0 beyond 95%.
pub fn island_mask(normalized_dist: f64) -> f64 {
    smoothstep(0.95, 0.6, normalized_dist)
}

/// Relief exaggeration anchored so that `h = 0` stays at 0.
///
/// Old terrain (`age > 0.7`) uses a flatter exponent.
pub fn exaggerate(h: f64, exaggeration: f64, age: f64) -> f64 {
    let ex = if age > 0.7 { exaggeration * 0.7 } else { exaggeration };
    det_pow((h + 0.1).max(0.0), ex) - det_pow(0.1, ex)
}

/// Depth to remove for a river field value, and whether it is channel.
///
/// `river_val` is `|noise|` of the river field.
pub fn river_carve(river_val: f64, age: f64, depth: f64) -> (f64, bool) {
    let valley_width = 0.3 + age * 0.1;
    let channel_width = 0.08 + age * 0.05;
    if river_val >= valley_width {
        return (0.0, false);
    }
    let valley_profile = 1.0 - smoothstep(0.0, valley_width, river_val);
    let channel_profile = 1.0 - smoothstep(0.0, channel_width, river_val);
    let dig = valley_profile * depth * 0.4 + channel_profile * depth * 0.1;
    (dig, river_val < channel_width * 0.8)
}

/// Pull `h` 60% of the way toward the nearest of `steps` levels per unit.
pub fn terrace(h: f64, steps: u32) -> f64 {
    if steps == 0 {
        return h;
    }
    let s = steps as f64;
    let stepped = round_half_up(h * s) / s;
    lerp(h, stepped, TERRACE_BLEND)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::HostNoise;

    fn params(topology: Topology, generation_type: GenerationType) -> TerrainParameters {
        TerrainParameters {
            topology,
            generation_type,
            map_size: 2048.0,
            ..Default::default()
        }
    }

    fn grid(extent: f64, n: usize) -> Vec<(f64, f64)> {
        let step = 2.0 * extent / n as f64;
        (0..n)
            .flat_map(|i| (0..n).map(move |j| (-extent + i as f64 * step, -extent + j as f64 * step)))
            .collect()
    }

    const TOPOLOGIES: [Topology; 4] = [
        Topology::Standard,
        Topology::Alpine,
        Topology::Canyons,
        Topology::Dunes,
    ];

    #[test]
    fn test_sample_is_deterministic() {
        for topology in TOPOLOGIES {
            for generation_type in [
                GenerationType::Infinite,
                GenerationType::Island,
                GenerationType::Archipelago,
            ] {
                let a = HeightSynthesizer::new(params(topology, generation_type));
                let b = HeightSynthesizer::new(params(topology, generation_type));
                for (x, z) in grid(1500.0, 8) {
                    let ra = a.sample(x, z);
                    let rb = b.sample(x, z);
                    assert_eq!(ra.height.to_bits(), rb.height.to_bits(), "{topology} at ({x}, {z})");
                    assert_eq!(ra.is_river, rb.is_river);
                    assert_eq!(ra.tectonic_activity.to_bits(), rb.tectonic_activity.to_bits());
                }
            }
        }
    }

    #[test]
    fn test_island_edge_sinks_to_sea_floor() {
        for topology in TOPOLOGIES {
            let p = TerrainParameters {
                river_depth: 0.0,
                terrace_steps: 0,
                ..params(topology, GenerationType::Island)
            };
            let hs = p.height_scale;
            let half = p.map_size * 0.5;
            let synth = HeightSynthesizer::new(p);
            for i in 0..16 {
                let angle = i as f64 / 16.0 * std::f64::consts::TAU;
                for radius in [1.0, 1.2, 3.0] {
                    let (x, z) = (angle.cos() * half * radius, angle.sin() * half * radius);
                    let h = synth.height(x, z);
                    assert!(
                        (h - SEA_FLOOR * hs).abs() < 1e-9,
                        "{topology} island edge at ({x:.0}, {z:.0}) was {h}, expected {}",
                        SEA_FLOOR * hs
                    );
                }
            }
        }
    }

    #[test]
    fn test_archipelago_outside_bound_is_sea_floor() {
        let p = TerrainParameters {
            river_depth: 0.0,
            ..params(Topology::Alpine, GenerationType::Archipelago)
        };
        let hs = p.height_scale;
        let synth = HeightSynthesizer::new(p);
        let h = synth.height(2048.0, 0.0);
        assert!((h - SEA_FLOOR * hs).abs() < 1e-9, "got {h}");
    }

    #[test]
    fn test_archipelago_clusters_mix_land_and_sea_inside_bound() {
        let p = TerrainParameters {
            river_depth: 0.0,
            terrace_steps: 0,
            detail_strand_frequency: 0.0,
            map_size: 60_000.0,
            ..params(Topology::Standard, GenerationType::Archipelago)
        };
        let hs = p.height_scale;
        // Fully inside the global falloff, only the cluster mask applies.
        let inner = p.map_size * 0.5 * 0.69;
        let synth = HeightSynthesizer::new(p);
        let (mut sea, mut land) = (0, 0);
        for (x, z) in grid(inner, 40) {
            if det_sqrt(x * x + z * z) > inner {
                continue;
            }
            let h = synth.height(x, z);
            if (h - SEA_FLOOR * hs).abs() < 1e-9 {
                sea += 1;
            } else if h > SEA_FLOOR * hs + 10.0 {
                land += 1;
            }
        }
        assert!(sea > 0, "cluster mask produced no open sea");
        assert!(land > 0, "cluster mask produced no islands");
    }

    #[test]
    fn test_rivers_never_on_dunes_or_canyons() {
        for topology in [Topology::Dunes, Topology::Canyons] {
            for depth in [0.5, 1.0, 3.0] {
                let wet = HeightSynthesizer::new(TerrainParameters {
                    river_depth: depth,
                    ..params(topology, GenerationType::Infinite)
                });
                let dry = HeightSynthesizer::new(TerrainParameters {
                    river_depth: 0.0,
                    ..params(topology, GenerationType::Infinite)
                });
                for (x, z) in grid(20_000.0, 30) {
                    let s = wet.sample(x, z);
                    assert!(!s.is_river, "{topology} produced a river at ({x}, {z})");
                    assert_eq!(s.height.to_bits(), dry.height(x, z).to_bits());
                }
            }
        }
    }

    #[test]
    fn test_standard_topology_has_rivers() {
        let synth = HeightSynthesizer::new(params(Topology::Standard, GenerationType::Infinite));
        let found = grid(30_000.0, 120).into_iter().any(|(x, z)| synth.sample(x, z).is_river);
        assert!(found, "expected at least one river channel in a 60 km square");
    }

    #[test]
    fn test_river_carve_profile() {
        let (dig, channel) = river_carve(0.0, 0.2, 1.0);
        assert!((dig - 0.5).abs() < 1e-12, "centre digs valley + channel, got {dig}");
        assert!(channel);

        let (dig, channel) = river_carve(0.5, 0.2, 1.0);
        assert_eq!(dig, 0.0);
        assert!(!channel);

        let (_, channel) = river_carve(0.08, 0.2, 1.0);
        assert!(!channel, "0.08 is outside 0.8 * channel width 0.09");
    }

    #[test]
    fn test_terrace_is_idempotent() {
        for steps in [1, 3, 5, 12] {
            for i in -50..150 {
                let h = i as f64 * 0.0137;
                let once = terrace(h, steps);
                let twice = terrace(once, steps);
                assert!(
                    (twice - once).abs() < 1.0 / steps as f64,
                    "re-terracing {h} with {steps} steps moved {once} -> {twice}"
                );
            }
        }
        assert_eq!(terrace(0.37, 0), 0.37);
    }

    #[test]
    fn test_canyons_are_quantized() {
        let p = TerrainParameters {
            detail_strand_frequency: 0.0,
            ..params(Topology::Canyons, GenerationType::Infinite)
        };
        let hs = p.height_scale;
        let synth = HeightSynthesizer::new(p);
        for (x, z) in grid(3000.0, 10) {
            let levels = synth.height(x, z) / hs * CANYON_STEPS;
            assert!(
                (levels - levels.round()).abs() < 1e-9,
                "canyon height should sit on an eighth, got {levels} eighths"
            );
        }
    }

    #[test]
    fn test_dunes_have_no_tectonics() {
        let synth = HeightSynthesizer::new(params(Topology::Dunes, GenerationType::Infinite));
        for (x, z) in grid(2000.0, 6) {
            assert_eq!(synth.sample(x, z).tectonic_activity, 0.0);
        }
    }

    #[test]
    fn test_exaggerate_anchors_zero() {
        assert!(exaggerate(0.0, 1.2, 0.2).abs() < 1e-12);
        assert!(exaggerate(0.0, 2.0, 0.9).abs() < 1e-12);
        assert!(exaggerate(1.0, 1.5, 0.2) > exaggerate(1.0, 1.0, 0.2));
        // clamp below -0.1
        assert_eq!(exaggerate(-0.5, 1.2, 0.2), -det_pow(0.1, 1.2));
    }

    #[test]
    fn test_end_to_end_standard_seed_8888() {
        let p = TerrainParameters {
            topology: Topology::Standard,
            generation_type: GenerationType::Infinite,
            seed: 8888,
            scale: 1800.0,
            height_scale: 900.0,
            octaves: 8,
            persistence: 0.45,
            lacunarity: 2.0,
            water_level: 0.2,
            ..Default::default()
        };
        let bound = p.height_scale * p.exaggeration;
        let synth = HeightSynthesizer::new(p);
        let s = synth.sample(0.0, 0.0);
        assert!(s.height.is_finite());
        assert!(s.height.abs() <= bound, "|{}| exceeds {bound}", s.height);
        assert_eq!(s, synth.sample(0.0, 0.0));
    }

    #[test]
    fn test_host_backend_produces_comparable_terrain() {
        let p = params(Topology::Alpine, GenerationType::Infinite);
        let hs = p.height_scale;
        let reference = HeightSynthesizer::new(p.clone());
        let host = HeightSynthesizer::with_noise(HostNoise::new(), p);
        let (mut r_sum, mut h_sum) = (0.0, 0.0);
        let points = grid(5000.0, 12);
        for &(x, z) in &points {
            let r = reference.height(x, z);
            let h = host.height(x, z);
            assert!(h.is_finite());
            assert!(h.abs() <= hs * 1.5, "host height {h} out of band");
            r_sum += r;
            h_sum += h;
        }
        let n = points.len() as f64;
        assert!(
            ((r_sum - h_sum) / n).abs() < hs * 0.5,
            "mean heights should be in the same band: {} vs {}",
            r_sum / n,
            h_sum / n
        );
    }
}
