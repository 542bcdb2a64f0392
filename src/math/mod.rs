mod angle;
mod color;

pub use angle::{angles_equivalent, wrap_angle};
pub use color::{hex_to_rgb, srgb_to_linear};
