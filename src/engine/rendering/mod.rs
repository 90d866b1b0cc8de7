pub mod blitter;
pub mod camera;
pub mod mesh;
pub mod renderer;
pub mod shader;
pub mod texture;

pub use blitter::{ BlitParams, Blitter, Color, Rect, RectParams };
pub use camera::{ Camera, Camera2D, Camera3D, Perspective };
pub use mesh::{ MeshData, StaticIndexedMesh, StreamMesh };
pub use renderer::Renderer;
pub use shader::checkpoint;
pub use texture::{ Image, Texture, TextureOptions };
