//! Escape-time fractal render engine.
//!
//! Turns a view request (center, zoom, fractal family, coloring and
//! precision options) into an RGBA frame plus the resolved viewport bounds.
//! A transport layer and the diagnostic CLI both call [`render_view`]; the
//! engine does not know how its output is transmitted.

pub mod color;
pub mod fractal;
pub mod io;
pub mod render;

pub use fractal::types::{
    FractalFamily, KernelSelector, NewtonVariant, PointOutcome, RenderError, ViewRequest,
};
pub use render::{render_view, RenderResult};
