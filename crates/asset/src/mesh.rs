//! CPU-side mesh representation used by loaders.

/// Vertex with position/normal/uv. Values are in object space.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl MeshVertex {
    pub fn new(position: [f32; 3], normal: [f32; 3], uv: [f32; 2]) -> Self {
        Self {
            position,
            normal,
            uv,
        }
    }
}

/// Axis-aligned bounds in object space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    pub min: [f32; 3],
    pub max: [f32; 3],
}

impl Bounds {
    /// Largest distance from the vertical axis through the center, in the XZ plane.
    pub fn footprint_radius(&self) -> f32 {
        let hx = (self.max[0] - self.min[0]) * 0.5;
        let hz = (self.max[2] - self.min[2]) * 0.5;
        (hx * hx + hz * hz).sqrt()
    }
}

/// Indexed triangle mesh with tightly-packed vertices.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshData {
    pub vertices: Vec<MeshVertex>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn new(vertices: Vec<MeshVertex>, indices: Vec<u32>) -> Self {
        Self { vertices, indices }
    }

    /// Non-empty, whole triangles, every index in range.
    pub fn is_valid(&self) -> bool {
        !self.vertices.is_empty()
            && !self.indices.is_empty()
            && self.indices.len() % 3 == 0
            && self
                .indices
                .iter()
                .all(|&i| (i as usize) < self.vertices.len())
    }

    pub fn bounds(&self) -> Option<Bounds> {
        let first = self.vertices.first()?.position;
        let mut b = Bounds {
            min: first,
            max: first,
        };
        for v in &self.vertices[1..] {
            for axis in 0..3 {
                b.min[axis] = b.min[axis].min(v.position[axis]);
                b.max[axis] = b.max[axis].max(v.position[axis]);
            }
        }
        Some(b)
    }

    /// Overwrite normals with area-weighted averages of adjacent face normals.
    pub fn recompute_normals(&mut self) {
        let mut acc = vec![[0.0f32; 3]; self.vertices.len()];
        for tri in self.indices.chunks_exact(3) {
            let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| i as usize);
            let (Some(pa), Some(pb), Some(pc)) = (
                self.vertices.get(a),
                self.vertices.get(b),
                self.vertices.get(c),
            ) else {
                continue;
            };
            let e1 = sub(pb.position, pa.position);
            let e2 = sub(pc.position, pa.position);
            let n = cross(e1, e2);
            for i in [a, b, c] {
                for axis in 0..3 {
                    acc[i][axis] += n[axis];
                }
            }
        }
        for (v, n) in self.vertices.iter_mut().zip(acc) {
            let len = (n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt();
            v.normal = if len > f32::EPSILON {
                [n[0] / len, n[1] / len, n[2] / len]
            } else {
                [0.0, 1.0, 0.0]
            };
        }
    }
}

fn sub(a: [f32; 3], b: [f32; 3]) -> [f32; 3] {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

fn cross(a: [f32; 3], b: [f32; 3]) -> [f32; 3] {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}
