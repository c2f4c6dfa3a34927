//! WebGPU rendering module
//!
//! Meshes with a single forward shader: lit models, unlit video screens and
//! alpha-blended highlight borders.

pub mod placement;
pub mod scene_pipeline;
pub mod shapes;
pub mod vertex;

pub use scene_pipeline::SceneRenderer;
pub use shapes::MeshGeometry;
pub use vertex::Vertex;
