pub mod render;

pub use render::{Report, display_model_stats, render_report};
