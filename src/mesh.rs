use anyhow::{anyhow, Result};
use glam::{Mat4, Vec3};
use gltf::mesh::Mode;

/// Vertex layout shared by imported and generated meshes.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

impl MeshVertex {
    pub fn new(position: Vec3, normal: Vec3) -> Self {
        Self { position: position.to_array(), normal: normal.to_array() }
    }

    pub fn position(&self) -> Vec3 {
        Vec3::from_array(self.position)
    }
}

/// Run of indices drawn with one material.
#[derive(Clone, Debug, PartialEq)]
pub struct MeshPart {
    pub first_index: u32,
    pub index_count: u32,
    pub material: Option<String>,
    pub base_color: [f32; 4],
}

#[derive(Clone, Debug)]
pub struct Mesh {
    pub name: String,
    pub vertices: Vec<MeshVertex>,
    pub indices: Vec<u32>,
    pub parts: Vec<MeshPart>,
    pub bounds: Aabb,
}

/// Axis-aligned box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Smallest box holding every point; a zero box at the origin when there are none.
    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Self {
        let mut points = points.into_iter();
        let Some(first) = points.next() else {
            return Self::new(Vec3::ZERO, Vec3::ZERO);
        };
        points.fold(Self::new(first, first), |acc, p| Self::new(acc.min.min(p), acc.max.max(p)))
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    pub fn diagonal(&self) -> f32 {
        self.size().length()
    }

    pub fn union(&self, other: &Aabb) -> Aabb {
        Aabb { min: self.min.min(other.min), max: self.max.max(other.max) }
    }

    pub fn corners(&self) -> [Vec3; 8] {
        let (lo, hi) = (self.min, self.max);
        [
            lo,
            Vec3::new(hi.x, lo.y, lo.z),
            Vec3::new(lo.x, hi.y, lo.z),
            Vec3::new(hi.x, hi.y, lo.z),
            Vec3::new(lo.x, lo.y, hi.z),
            Vec3::new(hi.x, lo.y, hi.z),
            Vec3::new(lo.x, hi.y, hi.z),
            hi,
        ]
    }

    /// Box around the transformed corners.
    pub fn transformed(&self, matrix: &Mat4) -> Aabb {
        Aabb::from_points(self.corners().map(|corner| matrix.transform_point3(corner)))
    }
}

// (normal, tangent u, tangent v) per face; corners wind counter-clockwise seen from outside.
const CUBE_FACES: [(Vec3, Vec3, Vec3); 6] = [
    (Vec3::X, Vec3::NEG_Z, Vec3::Y),
    (Vec3::NEG_X, Vec3::Z, Vec3::Y),
    (Vec3::Y, Vec3::X, Vec3::NEG_Z),
    (Vec3::NEG_Y, Vec3::X, Vec3::Z),
    (Vec3::Z, Vec3::X, Vec3::Y),
    (Vec3::NEG_Z, Vec3::NEG_X, Vec3::Y),
];

impl Mesh {
    /// Single-part mesh in plain white.
    pub fn new(name: impl Into<String>, vertices: Vec<MeshVertex>, indices: Vec<u32>) -> Self {
        let part =
            MeshPart { first_index: 0, index_count: indices.len() as u32, material: None, base_color: [1.0; 4] };
        let bounds = Aabb::from_points(vertices.iter().map(MeshVertex::position));
        Self { name: name.into(), vertices, indices, parts: vec![part], bounds }
    }

    /// Axis-aligned cube of edge `size` centred on the origin, flat normals per face.
    pub fn cube(size: f32) -> Self {
        let half = size * 0.5;
        let mut vertices = Vec::with_capacity(24);
        let mut indices = Vec::with_capacity(36);
        for (normal, u, v) in CUBE_FACES {
            let base = vertices.len() as u32;
            for (su, sv) in [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)] {
                vertices.push(MeshVertex::new((normal + u * su + v * sv) * half, normal));
            }
            indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
        }
        Self::new("cube", vertices, indices)
    }

    /// Merges every triangle primitive of a glTF mesh into one vertex/index buffer, one part per
    /// primitive. Line and point primitives are skipped; `None` when nothing drawable is left.
    pub fn from_gltf(mesh: &gltf::Mesh<'_>, buffers: &[gltf::buffer::Data], source: &str) -> Result<Option<Self>> {
        let name = mesh.name().map(str::to_string).unwrap_or_else(|| format!("mesh_{}", mesh.index()));
        let mut out = Mesh { name, vertices: Vec::new(), indices: Vec::new(), parts: Vec::new(), bounds: Aabb::from_points([]) };

        for primitive in mesh.primitives().filter(|primitive| primitive.mode() == Mode::Triangles) {
            let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(|data| &data[..]));
            let positions: Vec<Vec3> = reader
                .read_positions()
                .ok_or_else(|| anyhow!("primitive of '{}' in {source} has no POSITION", out.name))?
                .map(Vec3::from_array)
                .collect();
            if positions.is_empty() {
                continue;
            }
            let triangles: Vec<u32> = match reader.read_indices() {
                Some(read) => read.into_u32().collect(),
                None => (0..positions.len() as u32).collect(),
            };
            if let Some(bad) = triangles.iter().find(|index| **index as usize >= positions.len()) {
                return Err(anyhow!("index {bad} out of bounds in '{}' ({source})", out.name));
            }
            let normals = match reader.read_normals() {
                Some(read) => {
                    let normals: Vec<Vec3> = read.map(Vec3::from_array).collect();
                    if normals.len() == positions.len() && normals.iter().any(|n| n.length_squared() > 0.0) {
                        normals
                    } else {
                        smooth_normals(&positions, &triangles)
                    }
                }
                None => smooth_normals(&positions, &triangles),
            };

            let material = primitive.material();
            let offset = out.vertices.len() as u32;
            let first_index = out.indices.len() as u32;
            out.vertices.extend(
                positions.iter().zip(&normals).map(|(position, normal)| MeshVertex::new(*position, unit_or_up(*normal))),
            );
            out.indices.extend(triangles.iter().map(|index| index + offset));
            out.parts.push(MeshPart {
                first_index,
                index_count: triangles.len() as u32,
                material: material.index().map(|index| {
                    material.name().map(str::to_string).unwrap_or_else(|| format!("material_{index}"))
                }),
                base_color: material.pbr_metallic_roughness().base_color_factor(),
            });
        }

        if out.parts.is_empty() {
            return Ok(None);
        }
        out.bounds = Aabb::from_points(out.vertices.iter().map(MeshVertex::position));
        Ok(Some(out))
    }

    pub fn local_aabb(&self) -> Aabb {
        self.bounds
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// Area-weighted vertex normals; vertices on degenerate triangles only point up.
fn smooth_normals(positions: &[Vec3], triangles: &[u32]) -> Vec<Vec3> {
    let mut sums = vec![Vec3::ZERO; positions.len()];
    for tri in triangles.chunks_exact(3) {
        let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
        let face = (positions[b] - positions[a]).cross(positions[c] - positions[a]);
        for index in [a, b, c] {
            sums[index] += face;
        }
    }
    sums.into_iter().map(unit_or_up).collect()
}

fn unit_or_up(v: Vec3) -> Vec3 {
    let unit = v.normalize_or_zero();
    if unit == Vec3::ZERO {
        Vec3::Y
    } else {
        unit
    }
}
