// terrain holds the procedural pipeline: gradient noise, the fractal
// height functions, heightfield generation, both erosion models, mesh
// building and the controller that drives them per frame.
pub mod controller;
pub mod erosion;
pub mod fractal;
pub mod heightfield;
pub mod mesh;
pub mod params;
pub mod perlin;
pub mod utils;

pub use controller::TerrainController;
pub use erosion::{ErosionProgress, RealisticErosion, TerraceErosion};
pub use fractal::{HeightFunction, HeterogeneousFbm, HomogeneousFbm, HybridMultifractal};
pub use heightfield::HeightGrid;
pub use mesh::{TerrainMesh, TerrainVertex};
pub use params::{ErosionAlgorithm, FractalType, SimulationParameters};
pub use perlin::PerlinNoise;
