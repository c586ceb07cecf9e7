use crate::heightfield::HeightGrid;

const CONTRAST_EXPONENT: f32 = 1.2;

// Height bands for the display ramp, as fractions of the normalized
// range.
const WATER_THRESHOLD: f32 = 0.3;
const SAND_THRESHOLD: f32 = 0.4;
const GRASS_THRESHOLD: f32 = 0.6;
const ROCK_THRESHOLD: f32 = 0.8;

// Flatten the interior of a padded grid into a row-major Vec, dropping
// the one-cell normal-estimation border.
pub fn flatten_interior(grid: &HeightGrid) -> Vec<f32> {
    let dim = grid.len();
    grid[1..dim - 1]
        .iter()
        .flat_map(|row| row[1..dim - 1].iter().copied())
        .collect()
}

// Min-max normalize to [0, 1] with a gamma curve for contrast.
pub fn normalize(values: &mut [f32]) {
    let mut min = f32::MAX;
    let mut max = f32::MIN;
    for &v in values.iter() {
        min = min.min(v);
        max = max.max(v);
    }
    let range = (max - min).max(0.001); // prevent zero-division
    for v in values.iter_mut() {
        *v = ((*v - min) / range).powf(CONTRAST_EXPONENT);
    }
}

fn lerp_color(a: [u8; 3], b: [u8; 3], t: f32) -> [u8; 3] {
    [
        (a[0] as f32 + (b[0] as f32 - a[0] as f32) * t) as u8,
        (a[1] as f32 + (b[1] as f32 - a[1] as f32) * t) as u8,
        (a[2] as f32 + (b[2] as f32 - a[2] as f32) * t) as u8,
    ]
}

// Map a normalized height to a terrain color band.
fn height_to_rgb(h: f32) -> [u8; 3] {
    match h {
        x if x < WATER_THRESHOLD => {
            let t = x / WATER_THRESHOLD;
            lerp_color([0, 0, 128], [0, 128, 255], t) // deep to shallow water
        }
        x if x < SAND_THRESHOLD => {
            let t = (x - WATER_THRESHOLD) / (SAND_THRESHOLD - WATER_THRESHOLD);
            lerp_color([194, 178, 128], [220, 200, 160], t) // sand
        }
        x if x < GRASS_THRESHOLD => {
            let t = (x - SAND_THRESHOLD) / (GRASS_THRESHOLD - SAND_THRESHOLD);
            lerp_color([34, 139, 34], [50, 205, 50], t) // grass
        }
        x if x < ROCK_THRESHOLD => {
            let t = (x - GRASS_THRESHOLD) / (ROCK_THRESHOLD - GRASS_THRESHOLD);
            lerp_color([128, 128, 128], [192, 192, 192], t) // rock
        }
        x => {
            let t = (x - ROCK_THRESHOLD) / (1.0 - ROCK_THRESHOLD);
            lerp_color([220, 220, 220], [255, 255, 255], t) // snow
        }
    }
}

// Convert normalized heights into an RGB byte buffer for display.
pub fn to_terrain_image(values: &[f32]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(values.len() * 3);
    for &h in values {
        buf.extend_from_slice(&height_to_rgb(h));
    }
    buf
}
