pub mod gmp;
pub mod iterations;
pub mod types;

pub use types::{
    FractalFamily, KernelSelector, NewtonVariant, PointOutcome, RenderError, ViewRequest,
};
