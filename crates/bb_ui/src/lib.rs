pub mod hud;

pub use hud::{HudModel, HudOverlay};
