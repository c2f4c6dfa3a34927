//! Mesh generation for boxes, spheres and decoded models

use glam::Vec3;
use std::f32::consts::PI;

use super::vertex::Vertex;
use crate::assets::MeshData;

/// Indexed triangle list
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshGeometry {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

/// Axis-aligned box centred on the origin
///
/// Every face maps the full texture with v = 0 at the top edge, so a video
/// frame copied row-0-first appears upright on the +Z face.
pub fn cuboid(size: Vec3) -> MeshGeometry {
    let h = size * 0.5;
    // (normal, right, up) per face
    let faces = [
        (Vec3::Z, Vec3::X, Vec3::Y),
        (Vec3::NEG_Z, Vec3::NEG_X, Vec3::Y),
        (Vec3::X, Vec3::NEG_Z, Vec3::Y),
        (Vec3::NEG_X, Vec3::Z, Vec3::Y),
        (Vec3::Y, Vec3::X, Vec3::NEG_Z),
        (Vec3::NEG_Y, Vec3::X, Vec3::Z),
    ];

    let mut mesh = MeshGeometry::default();
    for (normal, right, up) in faces {
        let base = mesh.vertices.len() as u32;
        let center = normal * h;
        let r = right * h;
        let u = up * h;
        let corners = [
            (center - r + u, [0.0, 0.0]),
            (center + r + u, [1.0, 0.0]),
            (center + r - u, [1.0, 1.0]),
            (center - r - u, [0.0, 1.0]),
        ];
        for (p, uv) in corners {
            mesh.vertices
                .push(Vertex::new(p.to_array(), normal.to_array(), uv));
        }
        // Counter-clockwise seen from outside
        mesh.indices
            .extend_from_slice(&[base, base + 3, base + 2, base, base + 2, base + 1]);
    }
    mesh
}

/// UV sphere centred on the origin
pub fn uv_sphere(radius: f32, segments: u32, rings: u32) -> MeshGeometry {
    let segments = segments.max(3);
    let rings = rings.max(2);
    let mut mesh = MeshGeometry::default();

    for ring in 0..=rings {
        let v = ring as f32 / rings as f32;
        let phi = v * PI;
        for seg in 0..=segments {
            let u = seg as f32 / segments as f32;
            let theta = u * 2.0 * PI;
            let n = Vec3::new(phi.sin() * theta.cos(), phi.cos(), phi.sin() * theta.sin());
            mesh.vertices
                .push(Vertex::new((n * radius).to_array(), n.to_array(), [u, v]));
        }
    }

    let stride = segments + 1;
    for ring in 0..rings {
        for seg in 0..segments {
            let a = ring * stride + seg;
            let b = a + stride;
            mesh.indices
                .extend_from_slice(&[a, a + 1, b, a + 1, b + 1, b]);
        }
    }
    mesh
}

/// Interleave a decoded model mesh into vertices
pub fn from_mesh_data(data: &MeshData) -> MeshGeometry {
    let vertices = data
        .positions
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let n = data.normals.get(i).copied().unwrap_or([0.0, 1.0, 0.0]);
            let uv = data.uvs.get(i).copied().unwrap_or([0.0, 0.0]);
            Vertex::new(*p, n, uv)
        })
        .collect();
    MeshGeometry {
        vertices,
        indices: data.indices.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Mat4;

    #[test]
    fn test_cuboid_extent() {
        let mesh = cuboid(Vec3::new(3.556, 2.0, 0.1));
        assert_eq!(mesh.vertices.len(), 24);
        assert_eq!(mesh.indices.len(), 36);
        let max_x = mesh
            .vertices
            .iter()
            .map(|v| v.position[0])
            .fold(f32::MIN, f32::max);
        assert!((max_x - 1.778).abs() < 1e-6);
    }

    #[test]
    fn test_cuboid_winding_faces_outward() {
        let mesh = cuboid(Vec3::ONE);
        for tri in mesh.indices.chunks_exact(3) {
            let p = |i: u32| Vec3::from_array(mesh.vertices[i as usize].position);
            let face_normal = (p(tri[1]) - p(tri[0])).cross(p(tri[2]) - p(tri[0]));
            let stored = Vec3::from_array(mesh.vertices[tri[0] as usize].normal);
            assert!(face_normal.dot(stored) > 0.0);
        }
    }

    #[test]
    fn test_front_face_top_is_v_zero() {
        let mesh = cuboid(Vec3::ONE);
        for v in mesh.vertices.iter().take(4) {
            assert_eq!(v.normal, [0.0, 0.0, 1.0]);
            let expected_v = if v.position[1] > 0.0 { 0.0 } else { 1.0 };
            assert_eq!(v.uv[1], expected_v);
        }
    }

    #[test]
    fn test_sphere_vertices_on_surface() {
        let mesh = uv_sphere(0.13, 16, 8);
        assert_eq!(mesh.vertices.len(), 17 * 9);
        assert_eq!(mesh.indices.len(), 16 * 8 * 6);
        for v in &mesh.vertices {
            let r = Vec3::from_array(v.position).length();
            assert!((r - 0.13).abs() < 1e-5);
        }
        assert!(mesh.indices.iter().all(|&i| (i as usize) < mesh.vertices.len()));
    }

    #[test]
    fn test_from_mesh_data_defaults_normals() {
        let data = MeshData {
            positions: vec![[0.0; 3], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            normals: Vec::new(),
            uvs: Vec::new(),
            indices: vec![0, 1, 2],
            base_color: [1.0; 4],
            base_color_image: None,
            transform: Mat4::IDENTITY,
        };
        let mesh = from_mesh_data(&data);
        assert_eq!(mesh.vertices.len(), 3);
        assert_eq!(mesh.vertices[2].normal, [0.0, 1.0, 0.0]);
        assert_eq!(mesh.vertices[2].uv, [0.0, 0.0]);
        assert_eq!(mesh.indices, vec![0, 1, 2]);
    }

    #[test]
    fn test_from_mesh_data_carries_texture_coordinates() {
        let data = MeshData {
            positions: vec![[0.0; 3], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            normals: vec![[0.0, 0.0, 1.0]; 3],
            uvs: vec![[0.0, 0.0], [2.0, 0.0], [0.0, 2.0]],
            indices: vec![0, 1, 2],
            base_color: [1.0; 4],
            base_color_image: Some(0),
            transform: Mat4::IDENTITY,
        };
        let mesh = from_mesh_data(&data);
        // Coordinates past 1.0 are kept for the repeating sampler
        assert_eq!(mesh.vertices[1].uv, [2.0, 0.0]);
        assert_eq!(mesh.vertices[2].uv, [0.0, 2.0]);
    }
}
