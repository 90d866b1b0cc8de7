pub mod overlay;

pub use overlay::{ FrameStats, UiOverlay };
