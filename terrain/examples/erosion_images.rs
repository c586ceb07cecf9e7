use image::{ImageBuffer, Luma};
use terrain::heightfield;
use terrain::utils::{flatten_interior, normalize};
use terrain::{
    FractalType, PerlinNoise, RealisticErosion, SimulationParameters, TerraceErosion,
};

// Grayscale dump of a flattened height grid.
fn save_gray(flat: &[f32], size: usize, path: &str) {
    let img = ImageBuffer::from_fn(size as u32, size as u32, |x, y| {
        let v = flat[y as usize * size + x as usize];
        Luma([(v * 255.0) as u8])
    });
    img.save(path).unwrap();
    println!("Saved {path}");
}

fn main() {
    let mut noise = PerlinNoise::new();
    noise.reseed(2025);

    let params = SimulationParameters {
        fractal: FractalType::Heterogeneous,
        world_size: 256.0,
        cell_size: 1.0,
        octaves: 6,
        ..SimulationParameters::default()
    };
    let size = params.grid_dim();

    let pristine = heightfield::generate(&noise, &params);
    let mut flat = flatten_interior(&pristine);
    normalize(&mut flat);
    save_gray(&flat, size, "erosion_before.png");

    // terrace erosion run to the default budget
    let mut terraced = pristine.clone();
    let terrace = TerraceErosion::from_params(&params);
    for _ in 0..params.total_iterations {
        terrace.step(&mut terraced);
    }
    let mut flat = flatten_interior(&terraced);
    normalize(&mut flat);
    save_gray(&flat, size, "erosion_terrace.png");

    // realistic erosion: rain for the leading iterations, then dry out
    let mut realistic_grid = pristine.clone();
    let mut water = heightfield::zero_grid(&params);
    let mut sediment = heightfield::zero_grid(&params);
    let realistic = RealisticErosion::from_params(&params);
    for iteration in 0..params.total_iterations {
        let rain = iteration < params.rain_iterations;
        realistic.step(&mut realistic_grid, &mut water, &mut sediment, rain);
    }
    let mut flat = flatten_interior(&realistic_grid);
    normalize(&mut flat);
    save_gray(&flat, size, "erosion_realistic.png");
}
