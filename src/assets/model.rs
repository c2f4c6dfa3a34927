//! glTF model decoding
//!
//! Loading is split in three so the network part can live in the platform
//! layer: parse the document, fetch the buffers it names, then flatten the
//! default scene into world-space meshes. Images are only located here;
//! decoding them is left to the browser.

use glam::{Mat4, Vec3};
use gltf::Gltf;

use crate::config::SceneError;

/// Where the bytes of a glTF buffer come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BufferSource {
    /// Binary chunk of a .glb file
    Blob,
    /// URL, already resolved against the model's URL
    Url(String),
}

/// Encoded bytes of a glTF image
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    /// URL, already resolved against the model's URL
    Url(String),
    /// Slice of a buffer
    Embedded { bytes: Vec<u8>, mime_type: String },
}

/// One triangle list with a base colour and optional base colour texture
#[derive(Debug, Clone, PartialEq)]
pub struct MeshData {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    /// Base colour texture coordinates; empty when the primitive has none
    pub uvs: Vec<[f32; 2]>,
    pub indices: Vec<u32>,
    pub base_color: [f32; 4],
    /// Index into [`ModelData::images`]
    pub base_color_image: Option<usize>,
    /// Node-to-model transform
    pub transform: Mat4,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelData {
    pub meshes: Vec<MeshData>,
    /// Every image of the document in index order; `None` when its buffer is unavailable
    pub images: Vec<Option<ImageSource>>,
}

impl ModelData {
    pub fn vertex_count(&self) -> usize {
        self.meshes.iter().map(|m| m.positions.len()).sum()
    }
}

fn model_error(url: &str, reason: impl ToString) -> SceneError {
    SceneError::Model {
        url: url.to_string(),
        reason: reason.to_string(),
    }
}

/// Parse a .gltf or .glb document
pub fn parse(bytes: &[u8], url: &str) -> Result<Gltf, SceneError> {
    Gltf::from_slice(bytes).map_err(|e| model_error(url, e))
}

/// Resolve `uri` relative to the directory of `base_url`
pub fn resolve_uri(base_url: &str, uri: &str) -> String {
    if uri.starts_with("data:") || uri.contains("://") || uri.starts_with('/') {
        return uri.to_string();
    }
    match base_url.rfind('/') {
        Some(slash) => format!("{}{}", &base_url[..=slash], uri),
        None => uri.to_string(),
    }
}

/// Sources of every buffer, in buffer index order
pub fn buffer_sources(gltf: &Gltf, base_url: &str) -> Vec<BufferSource> {
    gltf.buffers()
        .map(|buffer| match buffer.source() {
            gltf::buffer::Source::Bin => BufferSource::Blob,
            gltf::buffer::Source::Uri(uri) => BufferSource::Url(resolve_uri(base_url, uri)),
        })
        .collect()
}

/// Flatten the default scene into meshes
///
/// `buffers` must hold the bytes for each buffer in index order; the GLB
/// blob is taken from the document itself.
pub fn build_model(gltf: &Gltf, buffers: &[Vec<u8>], url: &str) -> Result<ModelData, SceneError> {
    let scene = gltf
        .default_scene()
        .or_else(|| gltf.scenes().next())
        .ok_or_else(|| model_error(url, "document has no scene"))?;

    // Buffers that are missing or shorter than declared read as absent
    let data: Vec<Option<&[u8]>> = gltf
        .buffers()
        .map(|buffer| {
            let bytes = match buffer.source() {
                gltf::buffer::Source::Bin => gltf.blob.as_deref(),
                gltf::buffer::Source::Uri(_) => buffers.get(buffer.index()).map(Vec::as_slice),
            };
            bytes.filter(|b| b.len() >= buffer.length())
        })
        .collect();

    let mut model = ModelData {
        meshes: Vec::new(),
        images: image_sources(gltf, &data, url)?,
    };
    for node in scene.nodes() {
        collect_node(&node, Mat4::IDENTITY, &data, &mut model, url)?;
    }
    log::debug!(
        "Decoded {url}: {} meshes, {} vertices, {} images",
        model.meshes.len(),
        model.vertex_count(),
        model.images.len()
    );
    Ok(model)
}

fn image_sources(
    gltf: &Gltf,
    data: &[Option<&[u8]>],
    url: &str,
) -> Result<Vec<Option<ImageSource>>, SceneError> {
    gltf.images()
        .map(|image| match image.source() {
            gltf::image::Source::Uri { uri, .. } => Ok(Some(ImageSource::Url(resolve_uri(url, uri)))),
            gltf::image::Source::View { view, mime_type } => {
                let Some(buffer) = data.get(view.buffer().index()).copied().flatten() else {
                    return Ok(None);
                };
                let range = view.offset()..view.offset() + view.length();
                let bytes = buffer
                    .get(range)
                    .ok_or_else(|| model_error(url, format!("image {} out of range", image.index())))?;
                Ok(Some(ImageSource::Embedded {
                    bytes: bytes.to_vec(),
                    mime_type: mime_type.to_string(),
                }))
            }
        })
        .collect()
}

fn collect_node(
    node: &gltf::Node<'_>,
    parent: Mat4,
    data: &[Option<&[u8]>],
    model: &mut ModelData,
    url: &str,
) -> Result<(), SceneError> {
    let transform = parent * Mat4::from_cols_array_2d(&node.transform().matrix());

    if let Some(mesh) = node.mesh() {
        for primitive in mesh.primitives() {
            if primitive.mode() != gltf::mesh::Mode::Triangles {
                continue;
            }
            let reader = primitive.reader(|buffer| data.get(buffer.index()).copied().flatten());
            let positions: Vec<[f32; 3]> = match reader.read_positions() {
                Some(iter) => iter.collect(),
                None => continue,
            };
            if positions.is_empty() {
                continue;
            }
            let indices: Vec<u32> = match reader.read_indices() {
                Some(iter) => iter.into_u32().collect(),
                None => (0..positions.len() as u32).collect(),
            };
            if indices.iter().any(|&i| i as usize >= positions.len()) {
                return Err(model_error(url, "index out of range"));
            }
            let normals: Vec<[f32; 3]> = match reader.read_normals() {
                Some(iter) => iter.collect(),
                None => smooth_normals(&positions, &indices),
            };
            let pbr = primitive.material().pbr_metallic_roughness();
            let texture = pbr.base_color_texture();
            let uvs: Vec<[f32; 2]> = texture
                .as_ref()
                .and_then(|info| reader.read_tex_coords(info.tex_coord()))
                .map(|iter| iter.into_f32().collect())
                .unwrap_or_default();

            model.meshes.push(MeshData {
                positions,
                normals,
                uvs,
                indices,
                base_color: pbr.base_color_factor(),
                base_color_image: texture.map(|info| info.texture().source().index()),
                transform,
            });
        }
    }

    for child in node.children() {
        collect_node(&child, transform, data, model, url)?;
    }
    Ok(())
}

/// Area-weighted vertex normals for meshes that ship without them
pub fn smooth_normals(positions: &[[f32; 3]], indices: &[u32]) -> Vec<[f32; 3]> {
    let mut acc = vec![Vec3::ZERO; positions.len()];
    for tri in indices.chunks_exact(3) {
        let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
        let (pa, pb, pc) = (
            Vec3::from_array(positions[a]),
            Vec3::from_array(positions[b]),
            Vec3::from_array(positions[c]),
        );
        let n = (pb - pa).cross(pc - pa);
        acc[a] += n;
        acc[b] += n;
        acc[c] += n;
    }
    acc.into_iter()
        .map(|n| n.try_normalize().unwrap_or(Vec3::Y).to_array())
        .collect()
}
