pub mod frame;
pub mod viewport;

pub use frame::{render_view, RenderResult};
pub use viewport::{Frame, Region};
