// Immutable-per-generation parameter set. The UI edits a copy and hands
// it back to the controller, which decides whether the change needs a
// full regeneration. No rendering state lives here.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FractalType {
    // straight octave sum, uniformly rough
    Homogeneous,
    // valley-smoothing variant, low areas lose high-frequency detail
    Heterogeneous,
    // plateau-forming variant, flat low regions stay flat
    HybridMultifractal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErosionAlgorithm {
    Terrace,
    Realistic,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationParameters {
    pub fractal: FractalType,
    pub world_size: f32,
    pub cell_size: f32,
    // vertical scale applied to the fractal output
    pub scale: f32,
    pub base_frequency: f32,
    pub frequency_multiplier: f32,
    pub amplitude_multiplier: f32,
    pub octaves: u32,
    // hybrid multifractal only
    pub offset: f32,
    pub h_exponent: f32,

    pub erosion: ErosionAlgorithm,
    pub talus_threshold: f32,
    pub sediment_volume: f32,
    // hydraulic coefficients: rain, dissolve, evaporation, capacity
    pub rain_rate: f32,
    pub dissolve_rate: f32,
    pub evaporation_rate: f32,
    pub capacity: f32,
    // rain falls for this many leading iterations, then the run dries out
    pub rain_iterations: u32,
    pub total_iterations: u32,
}

impl Default for SimulationParameters {
    fn default() -> Self {
        Self {
            fractal: FractalType::Heterogeneous,
            world_size: 100.0,
            cell_size: 0.5,
            scale: 20.0,
            base_frequency: 0.04,
            frequency_multiplier: 2.0,
            amplitude_multiplier: 0.5,
            octaves: 4,
            offset: 0.7,
            h_exponent: 0.25,
            erosion: ErosionAlgorithm::Terrace,
            talus_threshold: 0.7,
            sediment_volume: 0.3,
            rain_rate: 0.1,
            dissolve_rate: 0.5,
            evaporation_rate: 0.5,
            capacity: 0.1,
            rain_iterations: 20,
            total_iterations: 100,
        }
    }
}

impl SimulationParameters {
    // Interior grid dimension M. The grid math assumes world_size divides
    // evenly into cells; anything else is a contract violation at this
    // boundary rather than a silent truncation mid-algorithm.
    pub fn grid_dim(&self) -> usize {
        assert!(
            self.world_size > 0.0 && self.cell_size > 0.0,
            "world_size and cell_size must be positive"
        );
        assert!(
            self.frequency_multiplier > 0.0 && self.amplitude_multiplier > 0.0,
            "frequency and amplitude multipliers must be positive"
        );
        let cells = self.world_size / self.cell_size;
        assert!(
            (cells - cells.round()).abs() < 1e-4,
            "world_size {} is not divisible by cell_size {}",
            self.world_size,
            self.cell_size
        );
        cells.round() as usize
    }

    // Shape parameters invalidate the whole heightfield when they change;
    // erosion coefficients are read fresh on every iteration instead.
    pub fn shape_differs(&self, other: &SimulationParameters) -> bool {
        self.fractal != other.fractal
            || self.world_size != other.world_size
            || self.cell_size != other.cell_size
            || self.scale != other.scale
            || self.base_frequency != other.base_frequency
            || self.frequency_multiplier != other.frequency_multiplier
            || self.amplitude_multiplier != other.amplitude_multiplier
            || self.octaves != other.octaves
            || self.offset != other.offset
            || self.h_exponent != other.h_exponent
    }
}

#[cfg(test)]
mod tests {
    use super::SimulationParameters;

    #[test]
    fn grid_dim_divides_world() {
        let params = SimulationParameters::default();
        // 100 / 0.5 = 200 cells across
        assert_eq!(params.grid_dim(), 200);
    }

    #[test]
    #[should_panic]
    fn grid_dim_rejects_uneven_split() {
        let params = SimulationParameters {
            world_size: 10.0,
            cell_size: 0.3,
            ..SimulationParameters::default()
        };
        let _ = params.grid_dim();
    }

    #[test]
    fn shape_change_detection() {
        let base = SimulationParameters::default();
        let mut eroded = base.clone();
        eroded.talus_threshold = 1.5;
        eroded.total_iterations = 7;
        assert!(!base.shape_differs(&eroded));

        let mut reshaped = base.clone();
        reshaped.octaves += 1;
        assert!(base.shape_differs(&reshaped));
    }
}
