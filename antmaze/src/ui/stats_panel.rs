use crate::ui::{BASE_PADDING, BASE_SPACING};
use egui::{self, RichText};
use shared::FrameUpdate;

/// How often the shown FPS value is refreshed, in seconds.
const FPS_REFRESH_INTERVAL: f32 = 0.5;

/// Run statistics shown in the corner of the window.
pub struct StatsPanel {
    displayed_fps: i32,
    fps_timer: f32,
    frames: u64,
    elapsed: f64,
}

impl StatsPanel {
    pub fn new() -> Self {
        Self {
            displayed_fps: 0,
            fps_timer: 0.0,
            frames: 0,
            elapsed: 0.0,
        }
    }

    /// Records one rendered frame.
    pub fn update(&mut self, frame_time: f32, fps: i32) {
        self.frames += 1;
        self.elapsed += frame_time as f64;
        self.fps_timer += frame_time;
        if self.fps_timer >= FPS_REFRESH_INTERVAL || self.frames == 1 {
            self.displayed_fps = fps;
            self.fps_timer = 0.0;
        }
    }

    pub fn mean_fps(&self) -> f64 {
        if self.elapsed > 0.0 {
            self.frames as f64 / self.elapsed
        } else {
            0.0
        }
    }

    pub fn draw(&self, ctx: &egui::Context, frame: Option<&FrameUpdate>, worker_alive: bool) {
        egui::Window::new("Colony")
            .anchor(egui::Align2::LEFT_TOP, egui::vec2(BASE_PADDING, BASE_PADDING))
            .collapsible(true)
            .resizable(false)
            .show(ctx, |ui| {
                ui.spacing_mut().item_spacing.y = BASE_SPACING;
                egui::Grid::new("colony_stats")
                    .num_columns(2)
                    .spacing([BASE_SPACING * 3.0, BASE_SPACING])
                    .show(ui, |ui| {
                        let (tick, food, loaded, ants) = match frame {
                            Some(f) => (
                                f.tick.to_string(),
                                f.food_counter.to_string(),
                                f.loaded_count().to_string(),
                                f.positions.len().to_string(),
                            ),
                            None => ("-".into(), "-".into(), "-".into(), "-".into()),
                        };
                        stat_row(ui, "Tick", tick);
                        stat_row(ui, "Food", food);
                        stat_row(ui, "Ants", ants);
                        stat_row(ui, "Loaded", loaded);
                        stat_row(ui, "FPS", self.displayed_fps.to_string());
                        stat_row(ui, "Mean FPS", format!("{:.1}", self.mean_fps()));
                    });

                if !worker_alive {
                    ui.separator();
                    ui.label(
                        RichText::new("Worker disconnected")
                            .color(catppuccin_egui::MOCHA.red),
                    );
                }
            });
    }
}

fn stat_row(ui: &mut egui::Ui, label: &str, value: String) {
    ui.label(RichText::new(label).strong());
    ui.label(RichText::new(value).monospace());
    ui.end_row();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_fps_over_run() {
        let mut panel = StatsPanel::new();
        assert_eq!(panel.mean_fps(), 0.0);
        for _ in 0..30 {
            panel.update(0.02, 50);
        }
        for _ in 0..10 {
            panel.update(0.04, 25);
        }
        // 40 frames over 1.0 s
        assert!((panel.mean_fps() - 40.0).abs() < 1e-3);
    }

    #[test]
    fn test_shown_fps_refreshes_periodically() {
        let mut panel = StatsPanel::new();
        panel.update(0.1, 10);
        assert_eq!(panel.displayed_fps, 10);
        panel.update(0.1, 99);
        assert_eq!(panel.displayed_fps, 10);
        for _ in 0..5 {
            panel.update(0.1, 99);
        }
        assert_eq!(panel.displayed_fps, 99);
    }
}
