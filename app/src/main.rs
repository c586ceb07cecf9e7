use std::time::Instant;

use eframe::{App, Frame, NativeOptions, egui, run_native};
use egui::{Color32, ColorImage, TextureHandle, TextureOptions};
use glam::Vec3;
use terrain::utils::{flatten_interior, normalize, to_terrain_image};
use terrain::{ErosionAlgorithm, FractalType, SimulationParameters, TerrainController};

// Cell sizes that divide the default world size evenly; the grid math
// rejects anything that doesn't.
const CELL_SIZES: [f32; 4] = [0.25, 0.5, 1.0, 2.0];

// Light direction for the relief preview shading.
const LIGHT_DIR: Vec3 = Vec3::new(-0.5, 0.8, -0.3);

struct ViewerApp {
    controller: TerrainController,
    // slider-bound copy, handed to the controller when it differs
    pending: SimulationParameters,
    seed: u64,

    terrain_texture: Option<TextureHandle>,
    // last rendered RGB buffer, kept for PNG export
    last_image: Option<(Vec<u8>, usize)>,

    last_duration: Option<f32>,
    status_message: String,
}

impl Default for ViewerApp {
    fn default() -> Self {
        let params = SimulationParameters::default();
        Self {
            controller: TerrainController::new(params.clone()),
            pending: params,
            seed: 2025,
            terrain_texture: None,
            last_image: None,
            last_duration: None,
            status_message: String::new(),
        }
    }
}

impl ViewerApp {
    fn fractal_label(fractal: FractalType) -> &'static str {
        match fractal {
            FractalType::Homogeneous => "Homogeneous fBm",
            FractalType::Heterogeneous => "Heterogeneous fBm",
            FractalType::HybridMultifractal => "Hybrid Multifractal",
        }
    }

    fn erosion_label(algorithm: ErosionAlgorithm) -> &'static str {
        match algorithm {
            ErosionAlgorithm::Terrace => "Terrace",
            ErosionAlgorithm::Realistic => "Realistic",
        }
    }

    // Refresh the cached top-down texture from the current height grid.
    fn refresh_texture(&mut self, ctx: &egui::Context) {
        let size = self.controller.params().grid_dim();
        let mut flat = flatten_interior(self.controller.heights());
        normalize(&mut flat);
        let img = to_terrain_image(&flat);
        let color_image = ColorImage::from_rgb([size, size], &img);
        self.terrain_texture =
            Some(ctx.load_texture("terrain", color_image, TextureOptions::NEAREST));
        self.last_image = Some((img, size));
    }

    // Shaded side-on preview built straight from the renderable mesh.
    fn draw_relief_preview(&self, ui: &mut egui::Ui) {
        let mesh = self.controller.mesh();
        if mesh.vertices.is_empty() {
            return;
        }

        // oblique projection of every vertex
        let light = LIGHT_DIR.normalize();
        let projected: Vec<(f32, f32, f32)> = mesh
            .vertices
            .iter()
            .map(|v| {
                let sx = v.position.x + v.position.z * 0.45;
                let sy = v.position.z * 0.45 - v.position.y;
                (sx, sy, v.normal.dot(light).max(0.0))
            })
            .collect();

        let (mut min_x, mut min_y, mut max_x, mut max_y) =
            (f32::MAX, f32::MAX, f32::MIN, f32::MIN);
        for &(x, y, _) in &projected {
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
        }

        let avail = ui.available_size();
        let rect = ui.available_rect_before_wrap();
        let span_x = (max_x - min_x).max(1.0);
        let span_y = (max_y - min_y).max(1.0);
        let fit = (avail.x / span_x).min(avail.y / span_y);

        let mut verts = Vec::with_capacity(projected.len());
        for (i, &(x, y, shade)) in projected.iter().enumerate() {
            let blend = mesh.vertices[i].blend.clamp(-1.0, 1.0) * 0.5 + 0.5;
            // greener where the blend scalar is high, rockier where low
            let base = Vec3::new(0.45 + 0.15 * blend, 0.55 + 0.25 * blend, 0.35);
            let lit = base * (0.35 + 0.65 * shade) * 255.0;
            verts.push(egui::epaint::Vertex {
                pos: egui::pos2(
                    rect.left() + (x - min_x) * fit,
                    rect.top() + (y - min_y) * fit,
                ),
                uv: egui::pos2(0.0, 0.0),
                color: Color32::from_rgb(lit.x as u8, lit.y as u8, lit.z as u8),
            });
        }

        let preview = egui::epaint::Mesh {
            vertices: verts,
            indices: mesh.indices.clone(),
            texture_id: egui::TextureId::default(),
        };
        ui.painter().add(egui::epaint::Shape::mesh(preview));
    }
}

impl App for ViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut Frame) {
        // one erosion iteration per frame while running
        self.controller.tick();

        egui::SidePanel::left("controls").show(ctx, |ui| {
            ui.heading("Terrain Visualizer");
            ui.separator();

            ui.label("Fractal");
            egui::ComboBox::from_label("Model")
                .selected_text(Self::fractal_label(self.pending.fractal))
                .show_ui(ui, |ui| {
                    for fractal in [
                        FractalType::Homogeneous,
                        FractalType::Heterogeneous,
                        FractalType::HybridMultifractal,
                    ] {
                        ui.selectable_value(
                            &mut self.pending.fractal,
                            fractal,
                            Self::fractal_label(fractal),
                        );
                    }
                });

            egui::ComboBox::from_label("Cell size")
                .selected_text(format!("{}", self.pending.cell_size))
                .show_ui(ui, |ui| {
                    for cell in CELL_SIZES {
                        ui.selectable_value(&mut self.pending.cell_size, cell, format!("{cell}"));
                    }
                });

            ui.add(egui::Slider::new(&mut self.pending.scale, 1.0..=50.0).text("Height scale"));
            ui.add(
                egui::Slider::new(&mut self.pending.base_frequency, 0.005..=0.2)
                    .text("Base frequency"),
            );
            ui.add(
                egui::Slider::new(&mut self.pending.frequency_multiplier, 1.5..=3.0)
                    .text("Frequency multiplier"),
            );
            ui.add(
                egui::Slider::new(&mut self.pending.amplitude_multiplier, 0.1..=1.0)
                    .text("Amplitude multiplier"),
            );
            ui.add(egui::Slider::new(&mut self.pending.octaves, 1..=8).text("Octaves"));

            if self.pending.fractal == FractalType::HybridMultifractal {
                ui.add(egui::Slider::new(&mut self.pending.offset, 0.0..=2.0).text("Offset"));
                ui.add(egui::Slider::new(&mut self.pending.h_exponent, 0.0..=1.0).text("H"));
            }

            ui.separator();
            ui.horizontal(|ui| {
                ui.label("Seed");
                ui.add(egui::DragValue::new(&mut self.seed).speed(1.0));
                if ui.button("Reseed").clicked() {
                    self.controller.reseed(self.seed);
                    self.status_message = format!("Reshuffled with seed {}", self.seed);
                }
            });

            ui.separator();
            ui.label("Erosion");
            egui::ComboBox::from_label("Algorithm")
                .selected_text(Self::erosion_label(self.pending.erosion))
                .show_ui(ui, |ui| {
                    for algorithm in [ErosionAlgorithm::Terrace, ErosionAlgorithm::Realistic] {
                        ui.selectable_value(
                            &mut self.pending.erosion,
                            algorithm,
                            Self::erosion_label(algorithm),
                        );
                    }
                });
            ui.add(
                egui::Slider::new(&mut self.pending.talus_threshold, 0.1..=5.0)
                    .text("Talus threshold"),
            );
            if self.pending.erosion == ErosionAlgorithm::Realistic {
                ui.add(
                    egui::Slider::new(&mut self.pending.sediment_volume, 0.0..=1.0)
                        .text("Sediment volume"),
                );
                ui.add(egui::Slider::new(&mut self.pending.rain_rate, 0.0..=1.0).text("Rain kr"));
                ui.add(
                    egui::Slider::new(&mut self.pending.dissolve_rate, 0.0..=1.0)
                        .text("Dissolve ks"),
                );
                ui.add(
                    egui::Slider::new(&mut self.pending.evaporation_rate, 0.0..=1.0)
                        .text("Evaporation ke"),
                );
                ui.add(
                    egui::Slider::new(&mut self.pending.capacity, 0.0..=1.0).text("Capacity kc"),
                );
                ui.add(
                    egui::Slider::new(&mut self.pending.rain_iterations, 0..=200)
                        .text("Rain iterations"),
                );
            }
            ui.add(
                egui::Slider::new(&mut self.pending.total_iterations, 1..=500)
                    .text("Total iterations"),
            );

            let progress = self.controller.progress();
            let toggle_label = if progress.running {
                "Stop erosion"
            } else {
                "Start erosion"
            };
            if ui.button(toggle_label).clicked() {
                self.controller.toggle_erosion();
            }
            ui.label(format!(
                "Iteration {} / {}",
                progress.iteration,
                self.controller.params().total_iterations
            ));

            ui.separator();
            if ui.button("Save PNG…").clicked() {
                if let Some((img, size)) = &self.last_image {
                    if let Some(path) = rfd::FileDialog::new()
                        .set_file_name(format!("terrain_{}.png", self.seed))
                        .save_file()
                    {
                        match image::save_buffer(
                            &path,
                            img,
                            *size as u32,
                            *size as u32,
                            image::ColorType::Rgb8,
                        ) {
                            Ok(()) => self.status_message = format!("Saved {}", path.display()),
                            Err(e) => self.status_message = format!("Save failed: {e}"),
                        }
                    }
                }
            }

            if let Some(ms) = self.last_duration {
                ui.label(format!("Last regeneration: {ms:.2} ms"));
            }
            ui.label(&self.status_message);
        });

        // hand edited parameters to the controller; it regenerates only
        // when a shape parameter actually changed
        if self.pending != *self.controller.params() {
            let reshape = self.pending.shape_differs(self.controller.params());
            let start = Instant::now();
            self.controller.set_params(self.pending.clone());
            if reshape {
                self.last_duration = Some(start.elapsed().as_secs_f32() * 1000.0);
            }
        }

        // the texture is the cached downstream render; refresh it only
        // when the controller reports the scene changed
        if self.controller.take_scene_changed() {
            self.refresh_texture(ctx);
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            if let Some(tex) = &self.terrain_texture {
                let side = ui.available_size().min_elem() * 0.55;
                ui.image((tex.id(), egui::vec2(side, side)));
                ui.separator();
                ui.label("Relief preview:");
                self.draw_relief_preview(ui);
            } else {
                ui.centered_and_justified(|ui| {
                    ui.label("Generating…");
                });
            }
        });

        if self.controller.progress().running {
            ctx.request_repaint();
        }
    }
}

fn main() {
    let opts = NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1100.0, 750.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };
    run_native(
        "Terrain Visualizer",
        opts,
        Box::new(|_cc| Ok(Box::new(ViewerApp::default()))),
    )
    .unwrap();
}
