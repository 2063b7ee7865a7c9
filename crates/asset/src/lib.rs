//! Asset loading: the viewer's single model (mesh + material) from glTF/GLB.

pub mod mesh;
pub mod model;

pub use mesh::{Bounds, MeshData, MeshVertex};
pub use model::{MaterialData, ModelAsset, ModelSelector, load_model, load_model_from_slice};
