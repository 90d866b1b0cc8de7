//! GLES demo host: a window with a GLES 3.0 context, an egui overlay, and a
//! menu that switches between small 2D and 3D rendering scenes.

pub mod engine;
pub mod game;
pub mod index;

pub use index::DemoHost;
