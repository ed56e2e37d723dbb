pub mod model;
pub mod view;

pub use model::{AddOutcome, OptionLabel, Registry, SpinStep, WheelState};
pub use view::draw;

pub const CANVAS_SIZE: i32 = 400;
pub const WHEEL_RADIUS: f64 = 180.0;
pub const HUB_RADIUS: f64 = 10.0;
pub const SLICE_STROKE_WIDTH: f64 = 2.0;
pub const LABEL_FONT_SIZE: f64 = 16.0;
pub const LABEL_RIM_INSET: f64 = 10.0; // label right edge, inward from the rim
pub const POINTER_LENGTH: f64 = 16.0;
pub const POINTER_HALF_WIDTH: f64 = 8.0;

/// Built-in slice colors, cycled by slice index.
pub const DEFAULT_PALETTE: [&str; 12] = [
    "#FF6B6B", "#4ECDC4", "#45B7D1", "#96CEB4", "#FFEEAD", "#D4A5A5", "#9B59B6", "#3498DB",
    "#E67E22", "#27AE60", "#CC70AB", "#F1C40F",
];
