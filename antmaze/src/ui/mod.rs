pub use stats_panel::StatsPanel;

mod stats_panel;

// Base sizes (logical points)
pub const BASE_PADDING: f32 = 6.0;
pub const BASE_SPACING: f32 = 6.0;
