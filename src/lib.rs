// filepath: src/lib.rs
pub mod background;
pub mod color;
pub mod compositor;
pub mod config;
pub mod draw;
pub mod error;
pub mod geometry;
pub mod indicator;
pub mod state;
pub mod style;
pub mod text;
pub mod widget;

pub use crate::compositor::{FramePlan, Placement, Region, Resolution};
pub use crate::config::IndicatorConfig;
pub use crate::draw::Surface;
pub use crate::error::{IndicatorError, Result};
pub use crate::indicator::{DisplayBackend, UnlockIndicator};
pub use crate::state::{AuthState, UnlockState};
