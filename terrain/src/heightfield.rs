use crate::fractal;
use crate::params::{FractalType, SimulationParameters};
use crate::perlin::PerlinNoise;

// 2D height grid: row-major Vec<Vec<f32>>, access as grid[y][x].
// Dimensions are (M+2)x(M+2): M interior cells plus a one-cell border
// that exists only so central-difference normals are defined at the
// interior boundary.
pub type HeightGrid = Vec<Vec<f32>>;

pub fn padded_dim(params: &SimulationParameters) -> usize {
    params.grid_dim() + 2
}

// Build the padded height grid from the currently selected fractal.
// Border cells get real heights from the same function as the interior,
// never zero fill. Deterministic given the parameters and the table.
pub fn generate(noise: &PerlinNoise, params: &SimulationParameters) -> HeightGrid {
    let dim = padded_dim(params);
    let func = fractal::height_function(noise, params);
    let cell = params.cell_size as f64;
    let scale = params.scale as f64;
    // heterogeneous and hybrid sums sit above zero; recenter before
    // scaling so the terrain straddles the water plane
    let recenter = matches!(
        params.fractal,
        FractalType::Heterogeneous | FractalType::HybridMultifractal
    );

    let mut grid = vec![vec![0.0f32; dim]; dim];
    for (y, row) in grid.iter_mut().enumerate() {
        for (x, height) in row.iter_mut().enumerate() {
            let mut value = func.height_at(x as f64 * cell, y as f64 * cell);
            if recenter {
                value -= 0.5;
            }
            *height = (value * scale) as f32;
        }
    }
    grid
}

// Zeroed auxiliary grid (water or sediment) matching the padded height
// grid, so the erosion pass can index all three uniformly.
pub fn zero_grid(params: &SimulationParameters) -> HeightGrid {
    let dim = padded_dim(params);
    vec![vec![0.0f32; dim]; dim]
}
