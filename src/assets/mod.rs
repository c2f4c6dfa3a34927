//! Asset decoding and load lifetime
//!
//! Fetching happens in the platform layer; this module turns bytes into
//! meshes and decides whether a finished load may still be applied.

pub mod cancel;
pub mod model;

pub use cancel::{CancelOnDrop, LoadToken};
pub use model::{BufferSource, ImageSource, MeshData, ModelData, build_model, buffer_sources, parse, resolve_uri};
