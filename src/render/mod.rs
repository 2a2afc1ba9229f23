pub mod braille;
pub mod canvas;
pub mod halfblock;
pub mod raster;

pub use canvas::{Canvas, ColorMode, RenderMode, TextStyle};
