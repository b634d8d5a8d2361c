mod component;
mod config;
mod panel;
mod render;
mod state;

pub use component::ForceGraphCanvas;
pub use config::LayoutConfig;
