pub mod render;
pub mod tint;

pub use render::HudFrame;
pub use tint::{CountTint, DEFAULT_SATURATION, Rgb};
