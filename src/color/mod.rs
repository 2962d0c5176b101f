pub mod color_models;
pub mod colorize;

pub use colorize::Colorizer;
