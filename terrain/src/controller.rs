use crate::erosion::{ErosionProgress, RealisticErosion, TerraceErosion};
use crate::heightfield::{self, HeightGrid};
use crate::mesh::{self, TerrainMesh};
use crate::params::{ErosionAlgorithm, SimulationParameters};
use crate::perlin::PerlinNoise;

// Erosion iterations between scene-changed notifications. The mesh is
// rebuilt every tick; downstream caches (reflection buffers etc.) only
// need to refresh this often.
const NOTIFY_INTERVAL: u32 = 5;

// Owns the canonical terrain state and drives the generate / erode /
// mesh pipeline. Everything runs synchronously inside the per-frame
// calls on a single thread, so a regeneration is always complete before
// the frame that requested it renders.
pub struct TerrainController {
    params: SimulationParameters,
    noise: PerlinNoise,
    heights: HeightGrid,
    water: HeightGrid,
    sediment: HeightGrid,
    mesh: TerrainMesh,
    progress: ErosionProgress,
    scene_changed: bool,
}

impl TerrainController {
    pub fn new(params: SimulationParameters) -> Self {
        let noise = PerlinNoise::new();
        let heights = heightfield::generate(&noise, &params);
        let water = heightfield::zero_grid(&params);
        let sediment = heightfield::zero_grid(&params);
        let mesh = mesh::build(&heights, &noise, &params);
        Self {
            params,
            noise,
            heights,
            water,
            sediment,
            mesh,
            progress: ErosionProgress::default(),
            scene_changed: true,
        }
    }

    pub fn params(&self) -> &SimulationParameters {
        &self.params
    }

    pub fn heights(&self) -> &HeightGrid {
        &self.heights
    }

    pub fn water(&self) -> &HeightGrid {
        &self.water
    }

    pub fn sediment(&self) -> &HeightGrid {
        &self.sediment
    }

    pub fn progress(&self) -> ErosionProgress {
        self.progress
    }

    // Read-only snapshot for the renderer.
    pub fn mesh(&self) -> &TerrainMesh {
        &self.mesh
    }

    // Replace the parameter set. A shape change rebuilds the terrain from
    // scratch and discards any in-flight erosion state; erosion-only
    // changes are picked up by the next iteration without a rebuild.
    pub fn set_params(&mut self, params: SimulationParameters) {
        let reshape = params.shape_differs(&self.params);
        self.params = params;
        if reshape {
            self.regenerate();
        }
    }

    // Reshuffle the permutation table and rebuild everything from it.
    pub fn reseed(&mut self, seed: u64) {
        self.noise.reseed(seed);
        self.regenerate();
    }

    // Flip between Running and Idle, restarting the iteration count.
    pub fn toggle_erosion(&mut self) {
        self.progress.running = !self.progress.running;
        self.progress.iteration = 0;
    }

    // Advance one frame: a single erosion iteration when running, one
    // per tick to keep frame time bounded. Once the budget is spent the
    // auxiliary grids drain and the simulation returns to Idle.
    pub fn tick(&mut self) {
        if !self.progress.running {
            return;
        }
        if self.progress.iteration >= self.params.total_iterations {
            self.finish_run();
            return;
        }

        match self.params.erosion {
            ErosionAlgorithm::Terrace => {
                TerraceErosion::from_params(&self.params).step(&mut self.heights);
            }
            ErosionAlgorithm::Realistic => {
                let rain = self.progress.iteration < self.params.rain_iterations;
                RealisticErosion::from_params(&self.params).step(
                    &mut self.heights,
                    &mut self.water,
                    &mut self.sediment,
                    rain,
                );
            }
        }
        self.progress.iteration += 1;

        let finished = self.progress.iteration >= self.params.total_iterations;
        if finished {
            self.finish_run();
        }
        self.mesh = mesh::build(&self.heights, &self.noise, &self.params);
        if finished || self.progress.iteration % NOTIFY_INTERVAL == 0 {
            self.scene_changed = true;
        }
    }

    // Poll-and-clear invalidation flag. The renderer collaborator queries
    // this each frame and refreshes its cached imagery when it fires.
    pub fn take_scene_changed(&mut self) -> bool {
        std::mem::take(&mut self.scene_changed)
    }

    fn regenerate(&mut self) {
        self.heights = heightfield::generate(&self.noise, &self.params);
        self.water = heightfield::zero_grid(&self.params);
        self.sediment = heightfield::zero_grid(&self.params);
        self.progress = ErosionProgress::default();
        self.mesh = mesh::build(&self.heights, &self.noise, &self.params);
        self.scene_changed = true;
    }

    fn finish_run(&mut self) {
        for row in self.water.iter_mut().chain(self.sediment.iter_mut()) {
            for v in row.iter_mut() {
                *v = 0.0;
            }
        }
        self.progress.running = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{ErosionAlgorithm, SimulationParameters};

    fn test_params() -> SimulationParameters {
        SimulationParameters {
            world_size: 10.0,
            cell_size: 1.0,
            total_iterations: 5,
            erosion: ErosionAlgorithm::Realistic,
            ..SimulationParameters::default()
        }
    }

    #[test]
    fn budget_exhaustion_drains_and_idles() {
        let mut controller = TerrainController::new(test_params());
        controller.toggle_erosion();
        assert!(controller.progress().running);

        for _ in 0..5 {
            controller.tick();
        }
        let progress = controller.progress();
        assert!(!progress.running);
        assert_eq!(progress.iteration, 5);
        for row in controller.water().iter().chain(controller.sediment().iter()) {
            assert!(row.iter().all(|&v| v == 0.0));
        }

        // further ticks are no-ops once idle
        let heights = controller.heights().clone();
        controller.tick();
        assert_eq!(&heights, controller.heights());
    }

    #[test]
    fn scene_changed_fires_on_creation_and_regeneration() {
        let mut controller = TerrainController::new(test_params());
        assert!(controller.take_scene_changed());
        assert!(!controller.take_scene_changed());

        let mut reshaped = controller.params().clone();
        reshaped.octaves += 1;
        controller.set_params(reshaped);
        assert!(controller.take_scene_changed());
    }

    #[test]
    fn erosion_only_change_keeps_heightfield() {
        let mut controller = TerrainController::new(test_params());
        let before = controller.heights().clone();
        let _ = controller.take_scene_changed();

        let mut tweaked = controller.params().clone();
        tweaked.talus_threshold = 1.4;
        controller.set_params(tweaked);
        assert_eq!(&before, controller.heights());
        assert!(!controller.take_scene_changed());
    }

    #[test]
    fn notification_throttled_to_every_fifth_iteration() {
        let params = SimulationParameters {
            total_iterations: 12,
            ..test_params()
        };
        let mut controller = TerrainController::new(params);
        let _ = controller.take_scene_changed();
        controller.toggle_erosion();

        let mut fired = Vec::new();
        for i in 1..=12 {
            controller.tick();
            if controller.take_scene_changed() {
                fired.push(i);
            }
        }
        assert_eq!(fired, vec![5, 10, 12]);
    }

    #[test]
    fn shape_change_resets_running_erosion() {
        let mut controller = TerrainController::new(test_params());
        controller.toggle_erosion();
        controller.tick();
        assert_eq!(controller.progress().iteration, 1);

        let mut reshaped = controller.params().clone();
        reshaped.scale += 5.0;
        controller.set_params(reshaped);
        let progress = controller.progress();
        assert!(!progress.running);
        assert_eq!(progress.iteration, 0);
    }

    #[test]
    fn reseed_changes_terrain() {
        let mut controller = TerrainController::new(test_params());
        let before = controller.heights().clone();
        controller.reseed(777);
        assert_ne!(&before, controller.heights());
    }

    #[test]
    fn terrace_run_keeps_mass() {
        let params = SimulationParameters {
            erosion: ErosionAlgorithm::Terrace,
            total_iterations: 8,
            ..test_params()
        };
        let mut controller = TerrainController::new(params);
        let sum = |grid: &crate::heightfield::HeightGrid| -> f64 {
            grid.iter()
                .flat_map(|row| row.iter())
                .map(|&v| v as f64)
                .sum()
        };
        let before = sum(controller.heights());
        controller.toggle_erosion();
        for _ in 0..8 {
            controller.tick();
        }
        assert!((before - sum(controller.heights())).abs() < 1e-2);
    }
}
