mod camera;
mod rendering;

pub use camera::MazeCamera;
pub use rendering::Renderer;

use macroquad::prelude::Color;

pub const WALL_THICKNESS: f32 = 0.12;
pub const ANT_SIZE: f32 = 0.1;
/// Levels below this are not drawn.
pub const PHEROMONE_VISIBLE_THRESHOLD: f32 = 0.001;

pub const FLOOR_COLOR: Color = Color::new(0.13, 0.13, 0.13, 1.0);
pub const WALL_COLOR: Color = Color::new(0.31, 0.29, 0.27, 1.0); // Gruvbox bg2
pub const PHEROMONE_COLOR: Color = Color::new(0.0, 0.55, 1.0, 1.0);
pub const NEST_COLOR: Color = Color::new(0.6, 0.35, 0.15, 1.0);
pub const FOOD_COLOR: Color = Color::new(0.2, 0.85, 0.3, 1.0);
pub const ANT_COLOR: Color = Color::new(0.95, 0.95, 0.95, 1.0);
pub const LOADED_ANT_COLOR: Color = Color::new(1.0, 0.8, 0.1, 1.0);
