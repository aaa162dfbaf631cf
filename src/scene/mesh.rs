//! CPU mesh data and builders for ground planes, heightfields and spheres

use bytemuck::{Pod, Zeroable};

/// Vertex layout shared by every mesh: position, normal, uv
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl Vertex {
    pub const ATTRIBUTES: [wgpu::VertexAttribute; 3] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x2];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// Indexed triangle list
#[derive(Clone, Debug, Default)]
pub struct MeshData {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// Largest grid resolution whose vertices are all addressable by `u32` indices
pub const MAX_SUBDIVISIONS: u32 = u16::MAX as u32;

/// Largest sphere resolution whose vertices are all addressable by `u32` indices
pub const MAX_SPHERE_SEGMENTS: u32 = 16_384;

/// Clamp a requested grid resolution to `1..=MAX_SUBDIVISIONS`
pub fn grid_subdivisions(requested: u32) -> u32 {
    if requested > MAX_SUBDIVISIONS {
        log::warn!("Grid subdivisions {} clamped to {}", requested, MAX_SUBDIVISIONS);
    }
    requested.clamp(1, MAX_SUBDIVISIONS)
}

/// Flat square on the XZ plane centred at the origin.
///
/// `subdivisions` quads per side give `(subdivisions + 1)^2` vertices, all
/// with a +Y normal. UVs run 0..1 along X and Z. Resolution is clamped by
/// [`grid_subdivisions`].
pub fn ground(size: f32, subdivisions: u32) -> MeshData {
    let subdivisions = grid_subdivisions(subdivisions);
    let row = subdivisions + 1;
    let half = size * 0.5;

    let mut vertices = Vec::with_capacity(row as usize * row as usize);
    for z in 0..row {
        for x in 0..row {
            let u = x as f32 / subdivisions as f32;
            let v = z as f32 / subdivisions as f32;
            vertices.push(Vertex {
                position: [u * size - half, 0.0, half - v * size],
                normal: [0.0, 1.0, 0.0],
                uv: [u, 1.0 - v],
            });
        }
    }

    let mut indices = Vec::with_capacity(subdivisions as usize * subdivisions as usize * 6);
    for z in 0..subdivisions {
        for x in 0..subdivisions {
            let i = z * row + x;
            // counter-clockwise seen from +Y
            indices.extend_from_slice(&[i, i + 1, i + row, i + 1, i + row + 1, i + row]);
        }
    }

    MeshData { vertices, indices }
}

/// Ground grid displaced by `height(x, z)`, with normals from central
/// differences of the height function
pub fn heightfield(size: f32, subdivisions: u32, height: impl Fn(f32, f32) -> f32) -> MeshData {
    let mut mesh = ground(size, subdivisions);
    let step = size / grid_subdivisions(subdivisions) as f32;

    for vertex in &mut mesh.vertices {
        let [x, _, z] = vertex.position;
        let h = height(x, z);
        let dx = height(x + step, z) - height(x - step, z);
        let dz = height(x, z + step) - height(x, z - step);
        vertex.position[1] = h;
        vertex.normal = glam::Vec3::new(-dx, 2.0 * step, -dz).normalize().to_array();
    }

    mesh
}

/// UV sphere centred at the origin
pub fn sphere(segments: u32, diameter: f32) -> MeshData {
    let segments = segments.min(MAX_SPHERE_SEGMENTS);
    let rings = segments.max(2);
    let sectors = segments.max(3) * 2;
    let radius = diameter * 0.5;

    let mut vertices = Vec::with_capacity((rings as usize + 1) * (sectors as usize + 1));
    for ring in 0..=rings {
        let v = ring as f32 / rings as f32;
        let theta = v * std::f32::consts::PI;
        for sector in 0..=sectors {
            let u = sector as f32 / sectors as f32;
            let phi = u * std::f32::consts::TAU;
            let normal = [theta.sin() * phi.cos(), theta.cos(), theta.sin() * phi.sin()];
            vertices.push(Vertex {
                position: [normal[0] * radius, normal[1] * radius, normal[2] * radius],
                normal,
                uv: [u, v],
            });
        }
    }

    let stride = sectors + 1;
    let mut indices = Vec::with_capacity(rings as usize * sectors as usize * 6);
    for ring in 0..rings {
        for sector in 0..sectors {
            let a = ring * stride + sector;
            let b = a + stride;
            indices.extend_from_slice(&[a, a + 1, b, a + 1, b + 1, b]);
        }
    }

    MeshData { vertices, indices }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_size() {
        assert_eq!(std::mem::size_of::<Vertex>(), 32);
    }

    #[test]
    fn test_ground_counts() {
        let mesh = ground(1000.0, 128);
        assert_eq!(mesh.vertices.len(), 129 * 129);
        assert_eq!(mesh.triangle_count(), 128 * 128 * 2);
        assert!(mesh.indices.iter().all(|&i| (i as usize) < mesh.vertices.len()));
    }

    #[test]
    fn test_ground_extent_and_normals() {
        let mesh = ground(10.0, 4);
        let xs: Vec<f32> = mesh.vertices.iter().map(|v| v.position[0]).collect();
        let min = xs.iter().cloned().fold(f32::MAX, f32::min);
        let max = xs.iter().cloned().fold(f32::MIN, f32::max);
        assert_eq!((min, max), (-5.0, 5.0));
        assert!(mesh.vertices.iter().all(|v| v.normal == [0.0, 1.0, 0.0] && v.position[1] == 0.0));
    }

    #[test]
    fn test_ground_faces_up() {
        let mesh = ground(2.0, 1);
        let p = |i: u32| glam::Vec3::from(mesh.vertices[i as usize].position);
        let (a, b, c) = (p(mesh.indices[0]), p(mesh.indices[1]), p(mesh.indices[2]));
        let n = (b - a).cross(c - a);
        assert!(n.y > 0.0);
    }

    #[test]
    fn test_subdivisions_clamped_to_index_range() {
        assert_eq!(grid_subdivisions(0), 1);
        assert_eq!(grid_subdivisions(128), 128);
        assert_eq!(grid_subdivisions(65_536), MAX_SUBDIVISIONS);
        assert_eq!(grid_subdivisions(u32::MAX), MAX_SUBDIVISIONS);

        // highest index of a clamped grid: last quad's far corner
        let row = MAX_SUBDIVISIONS as u64 + 1;
        assert!(row * row - 1 <= u32::MAX as u64);

        let rings = MAX_SPHERE_SEGMENTS as u64;
        assert!((rings + 1) * (2 * rings + 1) - 1 <= u32::MAX as u64);
    }

    #[test]
    fn test_heightfield_slope_normals() {
        // plane rising along +X at 45 degrees
        let mesh = heightfield(10.0, 4, |x, _| x);
        for v in &mesh.vertices {
            assert_eq!(v.position[1], v.position[0]);
            let n = glam::Vec3::from(v.normal);
            assert!((n - glam::Vec3::new(-1.0, 1.0, 0.0).normalize()).length() < 1e-5);
        }
    }

    #[test]
    fn test_sphere_radius() {
        let mesh = sphere(16, 1.0);
        for v in &mesh.vertices {
            let r = glam::Vec3::from(v.position).length();
            assert!((r - 0.5).abs() < 1e-4);
        }
        assert!(mesh.indices.iter().all(|&i| (i as usize) < mesh.vertices.len()));
    }
}
