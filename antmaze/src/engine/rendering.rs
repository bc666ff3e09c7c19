use super::MazeCamera;
use macroquad::prelude::*;
use shared::{Direction, EXIT_EAST, EXIT_NORTH, EXIT_SOUTH, EXIT_WEST, FrameUpdate, MazeLayout};

/// Pixels per maze cell in the cached wall texture.
const WALL_TEXTURE_CELL_PX: u32 = 16;

/// Draws the maze, the pheromone overlay and the ants of the latest frame.
pub struct Renderer {
    pub camera: MazeCamera,
    /// Camera used for rendering the static wall canvas.
    wall_canvas_camera: Camera2D,
    is_wall_texture_dirty: bool,
}

impl Renderer {
    pub fn new(layout: &MazeLayout) -> Self {
        let width = layout.cols as u32;
        let height = layout.rows as u32;

        let canvas = render_target(width * WALL_TEXTURE_CELL_PX, height * WALL_TEXTURE_CELL_PX);
        canvas.texture.set_filter(FilterMode::Linear);

        let mut wall_canvas_camera =
            Camera2D::from_display_rect(Rect::new(0.0, 0.0, width as f32, height as f32));
        wall_canvas_camera.render_target = Some(canvas);

        Self {
            camera: MazeCamera::new(width, height),
            wall_canvas_camera,
            is_wall_texture_dirty: true,
        }
    }

    /// Mouse wheel zooms, right click resets the view.
    pub fn process_camera_input(&mut self) {
        self.camera.handle_resize();
        let wheel_movement = mouse_wheel().1;
        if wheel_movement != 0.0 {
            self.camera.adjust_zoom(-wheel_movement.signum());
        }
        if is_mouse_button_pressed(MouseButton::Right) {
            self.camera.reset();
        }
    }

    pub fn render(&mut self, layout: &MazeLayout, frame: Option<&FrameUpdate>) {
        set_camera(&self.camera.camera);

        self.draw_maze(layout);
        if let Some(frame) = frame {
            self.draw_pheromones(layout, &frame.pheromone);
        }
        self.draw_markers(layout);
        if let Some(frame) = frame {
            self.draw_ants(frame);
        }

        set_default_camera();
    }

    /// Draws the walls once into an offscreen canvas, then blits it every frame.
    fn draw_maze(&mut self, layout: &MazeLayout) {
        if self.is_wall_texture_dirty {
            push_camera_state();
            set_camera(&self.wall_canvas_camera);
            clear_background(super::FLOOR_COLOR);
            draw_walls(layout);
            pop_camera_state();
            self.is_wall_texture_dirty = false;
        }

        let maze_width = layout.cols as f32;
        let maze_height = layout.rows as f32;

        if let Some(render_target) = self.wall_canvas_camera.render_target.as_ref() {
            draw_texture_ex(
                &render_target.texture,
                0.0,
                maze_height,
                WHITE,
                DrawTextureParams {
                    dest_size: Some(Vec2::new(maze_width, -maze_height)),
                    ..Default::default()
                },
            );
        }
    }

    /// Heat overlay, strongest cells blend towards white.
    fn draw_pheromones(&self, layout: &MazeLayout, levels: &[f32]) {
        let tint = super::PHEROMONE_COLOR;
        let cols = layout.cols as usize;
        for (i, &level) in levels.iter().enumerate() {
            if level < super::PHEROMONE_VISIBLE_THRESHOLD {
                continue;
            }
            // Levels decay geometrically; the square root keeps faint trails visible.
            let intensity = level.clamp(0.0, 1.0).sqrt();
            let whiten = intensity.powf(3.0);
            let color = Color::new(
                tint.r + (1.0 - tint.r) * whiten,
                tint.g + (1.0 - tint.g) * whiten,
                tint.b + (1.0 - tint.b) * whiten,
                intensity * 0.8,
            );
            let inset = super::WALL_THICKNESS / 2.0;
            draw_rectangle(
                (i % cols) as f32 + inset,
                (i / cols) as f32 + inset,
                1.0 - 2.0 * inset,
                1.0 - 2.0 * inset,
                color,
            );
        }
    }

    fn draw_markers(&self, layout: &MazeLayout) {
        let nest = cell_center(layout.nest.row, layout.nest.col);
        draw_circle(nest.x, nest.y, 0.35, super::NEST_COLOR);
        draw_circle_lines(nest.x, nest.y, 0.35, 0.05, BLACK);

        let food = cell_center(layout.food.row, layout.food.col);
        draw_circle(food.x, food.y, 0.35, super::FOOD_COLOR);
        draw_circle_lines(food.x, food.y, 0.35, 0.05, BLACK);
    }

    /// Ants sharing a cell are spread over a small lattice so crowds stay readable.
    fn draw_ants(&self, frame: &FrameUpdate) {
        let size = super::ANT_SIZE;
        for (i, pos) in frame.positions.iter().enumerate() {
            let center = cell_center(pos.row, pos.col) + spread_offset(i);
            let loaded = frame.loaded.get(i).copied().unwrap_or(false);
            let color = if loaded {
                super::LOADED_ANT_COLOR
            } else {
                super::ANT_COLOR
            };
            draw_rectangle(center.x - size / 2.0, center.y - size / 2.0, size, size, color);

            let heading = frame
                .directions
                .get(i)
                .copied()
                .and_then(Direction::from_code);
            if let Some(dir) = heading {
                let (d_row, d_col) = dir.offset();
                let tip = center + vec2(d_col as f32, d_row as f32) * size * 1.2;
                draw_line(center.x, center.y, tip.x, tip.y, size * 0.35, color);
            }
        }
    }
}

fn draw_walls(layout: &MazeLayout) {
    let t = super::WALL_THICKNESS;
    let color = super::WALL_COLOR;
    for row in 0..layout.rows {
        for col in 0..layout.cols {
            let flags = layout.cell(row, col);
            let x = col as f32;
            let y = row as f32;
            if flags & EXIT_NORTH == 0 {
                draw_rectangle(x - t / 2.0, y - t / 2.0, 1.0 + t, t, color);
            }
            if flags & EXIT_SOUTH == 0 {
                draw_rectangle(x - t / 2.0, y + 1.0 - t / 2.0, 1.0 + t, t, color);
            }
            if flags & EXIT_WEST == 0 {
                draw_rectangle(x - t / 2.0, y - t / 2.0, t, 1.0 + t, color);
            }
            if flags & EXIT_EAST == 0 {
                draw_rectangle(x + 1.0 - t / 2.0, y - t / 2.0, t, 1.0 + t, color);
            }
        }
    }
}

fn cell_center(row: u16, col: u16) -> Vec2 {
    vec2(col as f32 + 0.5, row as f32 + 0.5)
}

fn spread_offset(ant: usize) -> Vec2 {
    const SLOTS: usize = 5;
    const STEP: f32 = 0.12;
    let slot = ant % (SLOTS * SLOTS);
    let x = (slot % SLOTS) as f32 - (SLOTS / 2) as f32;
    let y = (slot / SLOTS) as f32 - (SLOTS / 2) as f32;
    vec2(x, y) * STEP
}
