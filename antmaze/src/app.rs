use crate::config::DisplayConfig;
use crate::engine::Renderer;
use crate::ui::StatsPanel;
use crate::worker::WorkerConnection;
use anyhow::Result;
use catppuccin_egui::set_theme;
use macroquad::prelude::*;
use shared::FrameUpdate;
use std::path::PathBuf;

/// Main application: pulls one frame from the worker per rendered frame.
pub struct AntMazeApp {
    worker: WorkerConnection,
    renderer: Renderer,
    stats: StatsPanel,
    frame: Option<FrameUpdate>,
    worker_alive: bool,
    first_food_screenshot: PathBuf,
    screenshot_taken: bool,
}

impl AntMazeApp {
    pub fn new(config: &DisplayConfig) -> Result<Self> {
        let worker_path = config.resolve_worker_path()?;
        let worker = WorkerConnection::start(&worker_path, &config.socket_dir, &config.simulation)?;
        let renderer = Renderer::new(&worker.layout);

        Ok(Self {
            worker,
            renderer,
            stats: StatsPanel::new(),
            frame: None,
            worker_alive: true,
            first_food_screenshot: config.first_food_screenshot.clone(),
            screenshot_taken: false,
        })
    }

    /// Runs until Escape is pressed.
    pub async fn run(&mut self) {
        loop {
            if is_key_pressed(KeyCode::Escape) {
                log::info!("Escape pressed, shutting down.");
                break;
            }

            self.pull_frame();
            self.stats.update(get_frame_time(), get_fps());

            clear_background(Color::from_hex(0x111111));
            self.renderer.process_camera_input();
            self.renderer
                .render(&self.worker.layout, self.frame.as_ref());

            new_egui_macroquad::ui(|egui_ctx| {
                set_theme(egui_ctx, catppuccin_egui::MOCHA);
                self.stats
                    .draw(egui_ctx, self.frame.as_ref(), self.worker_alive);
            });
            new_egui_macroquad::draw();

            self.save_first_food_screenshot();

            next_frame().await;
        }
    }

    /// The socket paces the worker: it computes the next tick only once this one is read.
    fn pull_frame(&mut self) {
        if !self.worker_alive {
            return;
        }
        match self.worker.next_frame() {
            Ok(Some(frame)) => self.frame = Some(frame),
            Ok(None) => {
                log::warn!("Worker closed the connection.");
                self.worker_alive = false;
            }
            Err(e) => {
                log::error!("Lost the worker: {:#}", e);
                self.worker_alive = false;
            }
        }
    }

    fn save_first_food_screenshot(&mut self) {
        if self.screenshot_taken {
            return;
        }
        let Some(frame) = &self.frame else {
            return;
        };
        if frame.food_counter == 0 {
            return;
        }
        self.screenshot_taken = true;

        let mut image = get_screen_data();
        flip_vertically(&mut image);
        let path = self.first_food_screenshot.to_string_lossy();
        image.export_png(&path);
        log::info!("First food at tick {}, saved {}", frame.tick, path);
    }
}

/// Screen captures come back bottom row first.
fn flip_vertically(image: &mut Image) {
    let row_bytes = image.width as usize * 4;
    let rows = image.height as usize;
    for y in 0..rows / 2 {
        let (top, bottom) = image.bytes.split_at_mut((rows - 1 - y) * row_bytes);
        top[y * row_bytes..(y + 1) * row_bytes].swap_with_slice(&mut bottom[..row_bytes]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flip_vertically() {
        let rows: Vec<u8> = (0..3u8).flat_map(|r| [r; 8]).collect();
        let mut image = Image {
            bytes: rows,
            width: 2,
            height: 3,
        };
        flip_vertically(&mut image);
        let firsts: Vec<u8> = image.bytes.chunks(8).map(|row| row[0]).collect();
        assert_eq!(firsts, vec![2, 1, 0]);
    }
}
