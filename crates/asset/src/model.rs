//! glTF / GLB model loader: one named mesh node plus one named material.

use std::path::Path;

use anyhow::{Context, Result, anyhow, bail};

use crate::mesh::{MeshData, MeshVertex};

/// Which node and material to pull out of the file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModelSelector {
    pub mesh_node: String,
    pub material: String,
}

/// PBR factors of the named material. Colors are linear.
#[derive(Clone, Debug, PartialEq)]
pub struct MaterialData {
    pub name: String,
    pub base_color: [f32; 4],
    pub metallic: f32,
    pub roughness: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ModelAsset {
    pub mesh: MeshData,
    pub material: MaterialData,
}

/// Load a model from a `.glb` or `.gltf` file.
pub fn load_model(path: impl AsRef<Path>, selector: &ModelSelector) -> Result<ModelAsset> {
    let path = path.as_ref();
    log::info!("Loading model from {}", path.display());
    let (doc, buffers, _images) = gltf::import(path)
        .with_context(|| format!("Failed to import glTF file: {}", path.display()))?;
    extract(&doc, &buffers, selector)
        .with_context(|| format!("Invalid model file: {}", path.display()))
}

/// Load a model from an in-memory GLB (or self-contained glTF JSON).
pub fn load_model_from_slice(bytes: &[u8], selector: &ModelSelector) -> Result<ModelAsset> {
    let (doc, buffers, _images) = gltf::import_slice(bytes).context("Failed to import glTF data")?;
    extract(&doc, &buffers, selector)
}

fn extract(
    doc: &gltf::Document,
    buffers: &[gltf::buffer::Data],
    selector: &ModelSelector,
) -> Result<ModelAsset> {
    let node = doc
        .nodes()
        .find(|n| n.name() == Some(selector.mesh_node.as_str()))
        .ok_or_else(|| anyhow!("No node named '{}'", selector.mesh_node))?;
    let mesh = node
        .mesh()
        .ok_or_else(|| anyhow!("Node '{}' has no mesh", selector.mesh_node))?;

    let mesh_data = import_mesh(&mesh, buffers)
        .with_context(|| format!("mesh {} (name {:?})", mesh.index(), mesh.name()))?;

    let material = doc
        .materials()
        .find(|m| m.name() == Some(selector.material.as_str()))
        .ok_or_else(|| anyhow!("No material named '{}'", selector.material))?;
    let pbr = material.pbr_metallic_roughness();
    let material = MaterialData {
        name: selector.material.clone(),
        base_color: pbr.base_color_factor(),
        metallic: pbr.metallic_factor(),
        roughness: pbr.roughness_factor(),
    };

    log::info!(
        "Model ready: node '{}', {} vertices, {} triangles, material '{}'",
        selector.mesh_node,
        mesh_data.vertices.len(),
        mesh_data.indices.len() / 3,
        material.name
    );
    Ok(ModelAsset {
        mesh: mesh_data,
        material,
    })
}

/// Concatenate all triangle primitives of `mesh` into one indexed mesh.
fn import_mesh(mesh: &gltf::Mesh<'_>, buffers: &[gltf::buffer::Data]) -> Result<MeshData> {
    let mut vertices: Vec<MeshVertex> = Vec::new();
    let mut indices: Vec<u32> = Vec::new();
    let mut missing_normals = false;

    for primitive in mesh.primitives() {
        if primitive.mode() != gltf::mesh::Mode::Triangles {
            log::warn!(
                "Skipping primitive {} with mode {:?}",
                primitive.index(),
                primitive.mode()
            );
            continue;
        }
        let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(|d| &d.0[..]));

        let base = u32::try_from(vertices.len())
            .map_err(|_| anyhow!("Too many vertices in mesh (>{})", u32::MAX))?;

        let positions: Vec<[f32; 3]> = reader
            .read_positions()
            .ok_or_else(|| anyhow!("glTF primitives must have positions"))?
            .collect();
        let normals: Option<Vec<[f32; 3]>> = reader.read_normals().map(|n| n.collect());
        let uvs: Option<Vec<[f32; 2]>> = reader.read_tex_coords(0).map(|t| t.into_f32().collect());

        if let Some(n) = &normals {
            if n.len() != positions.len() {
                bail!("Normal count {} != position count {}", n.len(), positions.len());
            }
        } else {
            missing_normals = true;
        }

        for (i, &position) in positions.iter().enumerate() {
            let normal = normals.as_ref().map_or([0.0, 1.0, 0.0], |n| n[i]);
            let uv = uvs
                .as_ref()
                .and_then(|t| t.get(i).copied())
                .unwrap_or([0.0, 0.0]);
            vertices.push(MeshVertex::new(position, normal, uv));
        }

        match reader.read_indices() {
            Some(read) => indices.extend(read.into_u32().map(|i| base + i)),
            // Non-indexed: every three vertices form a triangle.
            None => indices.extend(base..base + positions.len() as u32),
        }
    }

    let mut data = MeshData::new(vertices, indices);
    if !data.is_valid() {
        bail!("Mesh has no valid triangles");
    }
    if missing_normals {
        log::debug!("Mesh has no normals, generating smooth normals");
        data.recompute_normals();
    }
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    const BLACK_BOX: &[u8] = include_bytes!("../../../assets/black-box.glb");

    fn selector() -> ModelSelector {
        ModelSelector {
            mesh_node: "Cube".to_string(),
            material: "Material.001".to_string(),
        }
    }

    #[test]
    fn loads_bundled_black_box() {
        let model = load_model_from_slice(BLACK_BOX, &selector()).expect("load black box");
        assert_eq!(model.mesh.vertices.len(), 24);
        assert_eq!(model.mesh.indices.len(), 36);
        assert!(model.mesh.is_valid());

        let b = model.mesh.bounds().unwrap();
        assert_eq!(b.min, [-0.4, -0.4, -0.4]);
        assert_eq!(b.max, [0.4, 0.4, 0.4]);

        assert_eq!(model.material.name, "Material.001");
        assert_eq!(model.material.base_color, [0.8, 0.8, 0.8, 1.0]);
        assert_eq!(model.material.roughness, 0.5);
    }

    #[test]
    fn normals_are_unit_length() {
        let model = load_model_from_slice(BLACK_BOX, &selector()).unwrap();
        for v in &model.mesh.vertices {
            let [x, y, z] = v.normal;
            assert!(((x * x + y * y + z * z).sqrt() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn missing_node_is_an_error() {
        let sel = ModelSelector {
            mesh_node: "Sphere".to_string(),
            ..selector()
        };
        let err = load_model_from_slice(BLACK_BOX, &sel).unwrap_err();
        assert!(err.to_string().contains("Sphere"), "{err:#}");
    }

    #[test]
    fn missing_material_is_an_error() {
        let sel = ModelSelector {
            material: "Paint".to_string(),
            ..selector()
        };
        assert!(load_model_from_slice(BLACK_BOX, &sel).is_err());
    }

    #[test]
    fn missing_file_reports_path() {
        let err = load_model("does/not/exist.glb", &selector()).unwrap_err();
        assert!(format!("{err:#}").contains("does/not/exist.glb"));
    }
}
