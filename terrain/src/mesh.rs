use glam::{Vec2, Vec3};

use crate::fractal::{HeightFunction, HomogeneousFbm};
use crate::heightfield::HeightGrid;
use crate::params::SimulationParameters;
use crate::perlin::PerlinNoise;

// Vertical term of the central-difference normal. A fixed constant tuned
// for the default height scale, not a real derivative scale.
const NORMAL_VERTICAL: f32 = 1.0;

// Low-octave fBm sampled at integer grid coordinates; downstream
// material shaders blend sand/grass/stone bands with it.
const BLEND_FREQUENCY: f64 = 0.1;
const BLEND_OCTAVES: u32 = 2;

#[derive(Debug, Clone, Copy)]
pub struct TerrainVertex {
    pub position: Vec3,
    pub normal: Vec3,
    // integer grid coordinate, kept for texture tiling
    pub grid: Vec2,
    pub blend: f32,
}

#[derive(Debug, Clone, Default)]
pub struct TerrainMesh {
    pub vertices: Vec<TerrainVertex>,
    pub indices: Vec<u32>,
}

// Full rebuild of the terrain mesh from the interior of the height grid:
// one vertex per interior cell, two counter-clockwise triangles per
// quad. No incremental patching; callers rebuild whenever the grid
// changes.
pub fn build(heights: &HeightGrid, noise: &PerlinNoise, params: &SimulationParameters) -> TerrainMesh {
    let m = params.grid_dim();
    let cell = params.cell_size;
    let blend_fbm = HomogeneousFbm {
        noise,
        base_frequency: BLEND_FREQUENCY,
        frequency_multiplier: 2.0,
        amplitude_multiplier: 0.5,
        octaves: BLEND_OCTAVES,
    };

    let mut vertices = Vec::with_capacity(m * m);
    for gy in 1..=m {
        for gx in 1..=m {
            // central differences against the padded border
            let normal = Vec3::new(
                heights[gy][gx - 1] - heights[gy][gx + 1],
                2.0 * NORMAL_VERTICAL,
                heights[gy - 1][gx] - heights[gy + 1][gx],
            )
            .normalize();
            vertices.push(TerrainVertex {
                position: Vec3::new(gx as f32 * cell, heights[gy][gx], gy as f32 * cell),
                normal,
                grid: Vec2::new(gx as f32, gy as f32),
                blend: blend_fbm.height_at(gx as f64, gy as f64) as f32,
            });
        }
    }

    let mut indices = Vec::with_capacity(6 * (m - 1) * (m - 1));
    let stride = m as u32;
    for gy in 0..m - 1 {
        for gx in 0..m - 1 {
            let i = gy as u32 * stride + gx as u32;
            indices.extend_from_slice(&[
                i,
                i + stride,
                i + 1,
                i + 1,
                i + stride,
                i + stride + 1,
            ]);
        }
    }

    TerrainMesh { vertices, indices }
}
