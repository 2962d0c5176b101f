pub mod png;

pub use png::{save_image, write_jpeg};
