use image::{Rgb, RgbImage};
use palette::{Gradient, LinSrgb};
use terrain::heightfield;
use terrain::utils::{flatten_interior, normalize};
use terrain::{FractalType, PerlinNoise, SimulationParameters};

// Compute a simple hillshade for a flattened height grid.
// `z_scale` adjusts vertical exaggeration.
fn hillshade(flat: &[f32], size: usize, z_scale: f32) -> Vec<f32> {
    let mut shade = vec![0.0; flat.len()];
    let azimuth = std::f32::consts::PI / 4.0; // 45 degrees
    let altitude = std::f32::consts::PI / 4.0;
    let (sin_alt, cos_alt) = altitude.sin_cos();

    for y in 1..size - 1 {
        for x in 1..size - 1 {
            let dzdx = ((flat[y * size + x + 1] - flat[y * size + x - 1]) / 2.0) * z_scale;
            let dzdy = ((flat[(y + 1) * size + x] - flat[(y - 1) * size + x]) / 2.0) * z_scale;
            let (nx, ny, nz) = (-dzdx, -dzdy, 1.0);
            let len = (nx * nx + ny * ny + nz * nz).sqrt();
            let (nx, ny, nz) = (nx / len, ny / len, nz / len);
            let lx = azimuth.cos() * cos_alt;
            let ly = azimuth.sin() * cos_alt;
            let lz = sin_alt;
            shade[y * size + x] = (nx * lx + ny * ly + nz * lz).max(0.0);
        }
    }
    shade
}

fn render(flat: &[f32], size: usize, path: &str) {
    let shade = hillshade(flat, size, 4.0);

    // deep water through beach, grass and rock up to snow
    let gradient = Gradient::with_domain(vec![
        (0.00, LinSrgb::new(0.0, 0.0, 0.5)),
        (0.30, LinSrgb::new(0.8, 0.8, 0.5)),
        (0.50, LinSrgb::new(0.1, 0.6, 0.2)),
        (0.75, LinSrgb::new(0.5, 0.4, 0.3)),
        (1.00, LinSrgb::new(1.0, 1.0, 1.0)),
    ]);

    let mut img = RgbImage::new(size as u32, size as u32);
    for y in 0..size {
        for x in 0..size {
            let col: LinSrgb = gradient.get(flat[y * size + x]);
            let rgb = col.into_format::<u8>();
            let light = (shade[y * size + x] * 0.5 + 0.5).clamp(0.0, 1.0);
            img.put_pixel(
                x as u32,
                y as u32,
                Rgb([
                    (rgb.red as f32 * light) as u8,
                    (rgb.green as f32 * light) as u8,
                    (rgb.blue as f32 * light) as u8,
                ]),
            );
        }
    }
    img.save(path).unwrap();
    println!("Saved {path}");
}

fn main() {
    let mut noise = PerlinNoise::new();
    noise.reseed(2025);

    // one image per fractal model, same seed and shared shape parameters
    for (fractal, name) in [
        (FractalType::Homogeneous, "terrain_homogeneous.png"),
        (FractalType::Heterogeneous, "terrain_heterogeneous.png"),
        (FractalType::HybridMultifractal, "terrain_hybrid.png"),
    ] {
        let params = SimulationParameters {
            fractal,
            world_size: 256.0,
            cell_size: 1.0,
            octaves: 6,
            ..SimulationParameters::default()
        };
        let grid = heightfield::generate(&noise, &params);
        let mut flat = flatten_interior(&grid);
        normalize(&mut flat);
        render(&flat, params.grid_dim(), name);
    }
}
