use crate::mesh::Mesh;
use crate::scene::HemisphericLight;
use glam::{Mat3, Mat4, Vec2, Vec3, Vec4};

const MIN_CLIP_W: f32 = 1e-4;

/// Per-frame inputs shared by every draw.
#[derive(Debug, Clone)]
pub struct RasterFrame<'a> {
    pub view_proj: Mat4,
    pub lights: &'a [HemisphericLight],
}

/// Per-draw inputs.
#[derive(Debug, Clone, Copy)]
pub struct RasterDraw {
    pub model: Mat4,
}

/// CPU color + depth target.
#[derive(Debug, Clone)]
pub struct FrameTarget {
    width: u32,
    height: u32,
    color: Vec<[u8; 4]>,
    depth: Vec<f32>,
}

impl FrameTarget {
    pub fn new(width: u32, height: u32, clear_color: [u8; 4]) -> Self {
        let len = (width as usize) * (height as usize);
        Self { width, height, color: vec![clear_color; len], depth: vec![f32::INFINITY; len] }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[[u8; 4]] {
        &self.color
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.color.get((y * self.width + x) as usize).copied()
    }

    /// Row-major RGBA8 bytes.
    pub fn into_rgba8(self) -> Vec<u8> {
        bytemuck::cast_slice(&self.color).to_vec()
    }

    /// Number of pixels touched by at least one triangle.
    pub fn covered_pixels(&self) -> usize {
        self.depth.iter().filter(|d| d.is_finite()).count()
    }

    fn to_screen(&self, ndc: Vec3) -> Vec3 {
        Vec3::new(
            (ndc.x + 1.0) * 0.5 * self.width as f32,
            (1.0 - ndc.y) * 0.5 * self.height as f32,
            ndc.z,
        )
    }
}

pub fn draw_mesh(target: &mut FrameTarget, frame: &RasterFrame<'_>, draw: RasterDraw, mesh: &Mesh) -> usize {
    let mvp = frame.view_proj * draw.model;
    let normal_matrix = Mat3::from_mat4(draw.model).inverse().transpose();
    let mut drawn = 0;
    for part in &mesh.parts {
        let start = part.first_index as usize;
        let end = (start + part.index_count as usize).min(mesh.indices.len());
        let base = Vec3::new(part.base_color[0], part.base_color[1], part.base_color[2]);
        for tri in mesh.indices[start..end].chunks_exact(3) {
            let Some(verts) = fetch_triangle(mesh, tri) else {
                continue;
            };
            let clip: [Vec4; 3] = verts.map(|(position, _)| mvp * Vec4::from((position, 1.0)));
            if clip.iter().any(|c| c.w < MIN_CLIP_W) {
                continue;
            }
            let screen = clip.map(|c| target.to_screen(c.truncate() / c.w));
            let face_normal = verts
                .iter()
                .fold(Vec3::ZERO, |acc, (_, normal)| acc + *normal)
                .normalize_or_zero();
            let world_normal = (normal_matrix * face_normal).normalize_or_zero();
            let color = shade(base, world_normal, frame.lights);
            if fill_triangle(target, screen, color) {
                drawn += 1;
            }
        }
    }
    drawn
}

fn fetch_triangle(mesh: &Mesh, tri: &[u32]) -> Option<[(Vec3, Vec3); 3]> {
    let vertex = |index: u32| {
        mesh.vertices
            .get(index as usize)
            .map(|v| (Vec3::from_array(v.position), Vec3::from_array(v.normal)))
    };
    Some([vertex(tri[0])?, vertex(tri[1])?, vertex(tri[2])?])
}

fn shade(base: Vec3, normal: Vec3, lights: &[HemisphericLight]) -> [u8; 4] {
    let irradiance = if lights.is_empty() {
        Vec3::ONE
    } else {
        lights.iter().fold(Vec3::ZERO, |acc, light| acc + light.irradiance(normal))
    };
    let rgb = (base * irradiance).clamp(Vec3::ZERO, Vec3::ONE) * 255.0;
    [rgb.x.round() as u8, rgb.y.round() as u8, rgb.z.round() as u8, 255]
}

fn edge(a: Vec2, b: Vec2, p: Vec2) -> f32 {
    (b.x - a.x) * (p.y - a.y) - (b.y - a.y) * (p.x - a.x)
}

/// Two-sided edge-function fill with a less-than depth test. Returns whether any pixel landed.
fn fill_triangle(target: &mut FrameTarget, screen: [Vec3; 3], color: [u8; 4]) -> bool {
    let [a, b, c] = screen.map(|s| s.truncate());
    let area = edge(a, b, c);
    if area.abs() < f32::EPSILON {
        return false;
    }
    let min = a.min(b).min(c).max(Vec2::ZERO);
    let max = a.max(b).max(c).min(Vec2::new(target.width as f32 - 1.0, target.height as f32 - 1.0));
    if min.x > max.x || min.y > max.y {
        return false;
    }
    let mut wrote = false;
    for y in min.y.floor() as u32..=max.y.ceil() as u32 {
        for x in min.x.floor() as u32..=max.x.ceil() as u32 {
            if x >= target.width || y >= target.height {
                continue;
            }
            let p = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
            let w0 = edge(b, c, p) / area;
            let w1 = edge(c, a, p) / area;
            let w2 = edge(a, b, p) / area;
            if w0 < 0.0 || w1 < 0.0 || w2 < 0.0 {
                continue;
            }
            let depth = w0 * screen[0].z + w1 * screen[1].z + w2 * screen[2].z;
            if !(-1.0..=1.0).contains(&depth) {
                continue;
            }
            let slot = (y * target.width + x) as usize;
            if depth < target.depth[slot] {
                target.depth[slot] = depth;
                target.color[slot] = color;
                wrote = true;
            }
        }
    }
    wrote
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera3d::Camera3D;
    use glam::UVec2;

    #[test]
    fn cube_in_front_of_camera_covers_center() {
        let camera = Camera3D::new(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, 45.0_f32.to_radians(), 0.1, 100.0);
        let mut target = FrameTarget::new(64, 64, [0, 0, 0, 0]);
        let lights = [HemisphericLight::new("light", Vec3::Y)];
        let frame = RasterFrame { view_proj: camera.view_projection(UVec2::new(64, 64)), lights: &lights };
        let drawn = draw_mesh(&mut target, &frame, RasterDraw { model: Mat4::IDENTITY }, &Mesh::cube(1.0));
        assert!(drawn > 0);
        assert_eq!(target.pixel(32, 32).map(|p| p[3]), Some(255));
        assert_eq!(target.pixel(0, 0), Some([0, 0, 0, 0]));
    }

    #[test]
    fn geometry_behind_camera_is_skipped() {
        let camera = Camera3D::new(Vec3::new(0.0, 0.0, 5.0), Vec3::new(0.0, 0.0, 10.0), 45.0_f32.to_radians(), 0.1, 100.0);
        let mut target = FrameTarget::new(32, 32, [1, 2, 3, 4]);
        let frame = RasterFrame { view_proj: camera.view_projection(UVec2::new(32, 32)), lights: &[] };
        draw_mesh(&mut target, &frame, RasterDraw { model: Mat4::IDENTITY }, &Mesh::cube(1.0));
        assert_eq!(target.covered_pixels(), 0);
        assert!(target.pixels().iter().all(|p| *p == [1, 2, 3, 4]));
    }

    #[test]
    fn rgba_bytes_are_row_major() {
        let target = FrameTarget::new(2, 1, [9, 8, 7, 6]);
        assert_eq!(target.into_rgba8(), vec![9, 8, 7, 6, 9, 8, 7, 6]);
    }
}
