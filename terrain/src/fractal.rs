use crate::params::{FractalType, SimulationParameters};
use crate::perlin::PerlinNoise;

// A continuous height contribution over the plane. Implementations are
// pure functions of the point and the borrowed noise engine.
pub trait HeightFunction {
    fn height_at(&self, x: f64, y: f64) -> f64;
}

// Plain fractional Brownian motion: a straight weighted sum of octaves.
// The output range grows with the amplitude sum; the heightfield
// generator applies the vertical scale, so there is no normalization.
pub struct HomogeneousFbm<'a> {
    pub noise: &'a PerlinNoise,
    pub base_frequency: f64,
    pub frequency_multiplier: f64,
    pub amplitude_multiplier: f64,
    pub octaves: u32,
}

impl HeightFunction for HomogeneousFbm<'_> {
    fn height_at(&self, x: f64, y: f64) -> f64 {
        let mut height = 0.0;
        let mut frequency = self.base_frequency;
        let mut amplitude = 1.0;
        for _ in 0..self.octaves {
            height += self.noise.noise(x * frequency, y * frequency) * amplitude;
            frequency *= self.frequency_multiplier;
            amplitude *= self.amplitude_multiplier;
        }
        height
    }
}

// Heterogeneous fBm: octave noise is remapped to [0, 1] and scaled by a
// running weight capped by the height accumulated so far. Low areas
// suppress later octaves, which flattens valleys while ridges stay rough.
pub struct HeterogeneousFbm<'a> {
    pub noise: &'a PerlinNoise,
    pub base_frequency: f64,
    pub frequency_multiplier: f64,
    pub amplitude_multiplier: f64,
    pub octaves: u32,
}

impl HeightFunction for HeterogeneousFbm<'_> {
    fn height_at(&self, x: f64, y: f64) -> f64 {
        let mut height = 0.0f64;
        let mut weight = 1.0f64;
        let mut frequency = self.base_frequency;
        let mut amplitude = 1.0;
        for _ in 0..self.octaves {
            let signal = (self.noise.noise(x * frequency, y * frequency) + 1.0) * 0.5;
            height += signal * amplitude * weight;
            weight = height.min(1.0);
            frequency *= self.frequency_multiplier;
            amplitude *= self.amplitude_multiplier;
        }
        height
    }
}

// Hybrid multifractal: each octave is (noise + offset) scaled by a
// spectral exponent, weighted by the previous octave's scaled signal.
// The weight update deliberately differs from HeterogeneousFbm: it
// tracks the last signal, not the accumulated height, which is what
// produces the plateau look.
pub struct HybridMultifractal<'a> {
    pub noise: &'a PerlinNoise,
    pub base_frequency: f64,
    pub frequency_multiplier: f64,
    pub amplitude_multiplier: f64,
    pub octaves: u32,
    pub offset: f64,
    pub h_exponent: f64,
}

impl HeightFunction for HybridMultifractal<'_> {
    fn height_at(&self, x: f64, y: f64) -> f64 {
        let mut height = 0.0f64;
        let mut weight = 1.0f64;
        let mut frequency = self.base_frequency;
        for octave in 0..self.octaves {
            let exponent = self
                .amplitude_multiplier
                .powf(octave as f64 * self.h_exponent);
            let signal = (self.noise.noise(x * frequency, y * frequency) + self.offset) * exponent;
            height += signal * weight.clamp(0.0, 1.0);
            weight = signal;
            frequency *= self.frequency_multiplier;
        }
        height
    }
}

// Select the height function the parameters ask for.
pub fn height_function<'a>(
    noise: &'a PerlinNoise,
    params: &SimulationParameters,
) -> Box<dyn HeightFunction + 'a> {
    match params.fractal {
        FractalType::Homogeneous => Box::new(HomogeneousFbm {
            noise,
            base_frequency: params.base_frequency as f64,
            frequency_multiplier: params.frequency_multiplier as f64,
            amplitude_multiplier: params.amplitude_multiplier as f64,
            octaves: params.octaves,
        }),
        FractalType::Heterogeneous => Box::new(HeterogeneousFbm {
            noise,
            base_frequency: params.base_frequency as f64,
            frequency_multiplier: params.frequency_multiplier as f64,
            amplitude_multiplier: params.amplitude_multiplier as f64,
            octaves: params.octaves,
        }),
        FractalType::HybridMultifractal => Box::new(HybridMultifractal {
            noise,
            base_frequency: params.base_frequency as f64,
            frequency_multiplier: params.frequency_multiplier as f64,
            amplitude_multiplier: params.amplitude_multiplier as f64,
            octaves: params.octaves,
            offset: params.offset as f64,
            h_exponent: params.h_exponent as f64,
        }),
    }
}
