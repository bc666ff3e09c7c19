use macroquad::prelude::*;

/// Minimum zoom level allowed (1.0 = whole maze in view)
const MIN_ZOOM: f32 = 1.0;
const MAX_ZOOM: f32 = 20.0;
const ZOOM_SPEED: f32 = 0.1;

/// Camera over the maze, one world unit per cell, x along columns and y along rows.
pub struct MazeCamera {
    zoom: f32,
    pub maze_width: u32,
    pub maze_height: u32,
    pub camera: Camera2D,
    last_screen: (f32, f32),
}

impl MazeCamera {
    pub fn new(maze_width: u32, maze_height: u32) -> Self {
        let mut camera = Self {
            zoom: 1.0,
            maze_width,
            maze_height,
            camera: Camera2D {
                target: vec2(maze_width as f32 / 2.0, maze_height as f32 / 2.0),
                ..Default::default()
            },
            last_screen: (screen_width(), screen_height()),
        };
        camera.update_camera_zoom();
        camera
    }

    /// Zooms around the point under the cursor.
    pub fn adjust_zoom(&mut self, wheel_movement: f32) {
        let old_zoom = self.zoom;
        let mouse_screen_pos = Vec2::from(mouse_position());
        let mouse_world_pos = self.camera.screen_to_world(mouse_screen_pos);

        self.zoom = (self.zoom - wheel_movement * self.zoom * ZOOM_SPEED).clamp(MIN_ZOOM, MAX_ZOOM);

        if old_zoom != self.zoom {
            self.update_camera_zoom();
            let new_mouse_world_pos = self.camera.screen_to_world(mouse_screen_pos);
            self.move_by(mouse_world_pos - new_mouse_world_pos);
        }
    }

    pub fn move_by(&mut self, movement: Vec2) {
        self.camera.target += movement;
        self.adjust_camera_bounds();
    }

    /// Back to the full-maze view.
    pub fn reset(&mut self) {
        self.zoom = 1.0;
        self.camera.target = vec2(self.maze_width as f32 / 2.0, self.maze_height as f32 / 2.0);
        self.update_camera_zoom();
        self.adjust_camera_bounds();
    }

    /// Refits the view when the window size changed since the last call.
    pub fn handle_resize(&mut self) {
        let screen = (screen_width(), screen_height());
        if screen != self.last_screen {
            self.last_screen = screen;
            self.update_camera_zoom();
            self.adjust_camera_bounds();
        }
    }

    fn aspect_adjustment(&self) -> (f32, f32) {
        let maze_ratio = self.maze_width as f32 / self.maze_height as f32;
        let screen_ratio = screen_width() / screen_height();
        // Widen the view along the axis the maze does not fill.
        if maze_ratio >= screen_ratio {
            (1.0, maze_ratio / screen_ratio)
        } else {
            (screen_ratio / maze_ratio, 1.0)
        }
    }

    fn update_camera_zoom(&mut self) {
        let (horizontal, vertical) = self.aspect_adjustment();
        // Negative y zoom keeps row 0 at the top of the screen.
        self.camera.zoom = vec2(
            2.0 / self.maze_width as f32 * self.zoom / horizontal,
            -2.0 / self.maze_height as f32 * self.zoom / vertical,
        );
    }

    fn adjust_camera_bounds(&mut self) {
        let (horizontal, vertical) = self.aspect_adjustment();
        let horizontal_view = self.maze_width as f32 * horizontal / self.zoom;
        let vertical_view = self.maze_height as f32 * vertical / self.zoom;
        self.camera.target.x =
            clamp_to_view(self.camera.target.x, horizontal_view, self.maze_width as f32);
        self.camera.target.y =
            clamp_to_view(self.camera.target.y, vertical_view, self.maze_height as f32);
    }
}

fn clamp_to_view(value: f32, view_size: f32, maze_size: f32) -> f32 {
    let min = view_size / 2.0;
    let max = maze_size - min;
    if max < min {
        maze_size / 2.0
    } else {
        value.clamp(min, max)
    }
}
