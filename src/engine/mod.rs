pub mod config;
pub mod error;
pub mod gpu;
pub mod gui;
pub mod logging;
pub mod rendering;
pub mod resources;
pub mod utils;

pub use error::{ Error, Result };
