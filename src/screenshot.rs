use crate::camera3d::Camera3D;
use crate::raster::{draw_mesh, FrameTarget, RasterDraw, RasterFrame};
use crate::scene::Scene;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine as _;
use glam::UVec2;
use image::{ImageFormat, RgbaImage};
use std::io::Cursor;
use thiserror::Error;

pub const MAX_SCREENSHOT_SIZE: u32 = 8192;

#[derive(Debug, Error)]
pub enum ScreenshotError {
    #[error("screenshot size {0} is outside 1..={MAX_SCREENSHOT_SIZE}")]
    InvalidSize(u32),
    #[error("render pass failed: {0}")]
    Render(String),
    #[error("failed to encode screenshot: {0}")]
    Encode(#[from] image::ImageError),
}

/// Encoded screenshot ready to embed in the gallery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Thumbnail {
    pub width: u32,
    pub height: u32,
    pub png: Vec<u8>,
}

impl Thumbnail {
    pub fn mime_type(&self) -> &'static str {
        "image/png"
    }

    /// `data:image/png;base64,...` for embedding straight into an `<img src>`.
    pub fn to_data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type(), BASE64_STANDARD.encode(&self.png))
    }

    pub fn decode(&self) -> Result<RgbaImage, ScreenshotError> {
        Ok(image::load_from_memory_with_format(&self.png, ImageFormat::Png)?.to_rgba8())
    }
}

#[allow(async_fn_in_trait)]
pub trait ScreenshotService {
    /// Renders `scene` through `camera` into a `size` x `size` image.
    async fn capture(&mut self, scene: &Scene, camera: &Camera3D, size: u32) -> Result<Thumbnail, ScreenshotError>;
}

/// Flat-shaded CPU render of every visible mesh.
#[derive(Debug, Clone)]
pub struct SoftwareScreenshot {
    pub clear_color: [u8; 4],
    captures: u64,
}

impl Default for SoftwareScreenshot {
    fn default() -> Self {
        Self::new([0, 0, 0, 0])
    }
}

impl SoftwareScreenshot {
    pub fn new(clear_color: [u8; 4]) -> Self {
        Self { clear_color, captures: 0 }
    }

    pub fn captures(&self) -> u64 {
        self.captures
    }

    pub fn render(&self, scene: &Scene, camera: &Camera3D, size: u32) -> Result<FrameTarget, ScreenshotError> {
        if size == 0 || size > MAX_SCREENSHOT_SIZE {
            return Err(ScreenshotError::InvalidSize(size));
        }
        let view_proj = camera.view_projection(UVec2::splat(size));
        if !view_proj.is_finite() {
            return Err(ScreenshotError::Render("camera produced a non-finite view projection".to_string()));
        }
        let mut target = FrameTarget::new(size, size, self.clear_color);
        let frame = RasterFrame { view_proj, lights: &scene.lights };
        for id in scene.visible_meshes() {
            let Some(mesh) = scene.node(id).and_then(|node| node.mesh.as_ref()) else {
                continue;
            };
            draw_mesh(&mut target, &frame, RasterDraw { model: scene.world_matrix(id) }, mesh);
        }
        Ok(target)
    }
}

impl ScreenshotService for SoftwareScreenshot {
    async fn capture(&mut self, scene: &Scene, camera: &Camera3D, size: u32) -> Result<Thumbnail, ScreenshotError> {
        let target = self.render(scene, camera, size)?;
        let (width, height) = (target.width(), target.height());
        let image = RgbaImage::from_raw(width, height, target.into_rgba8())
            .ok_or_else(|| ScreenshotError::Render("frame buffer size mismatch".to_string()))?;
        let mut png = Cursor::new(Vec::new());
        image.write_to(&mut png, ImageFormat::Png)?;
        self.captures += 1;
        Ok(Thumbnail { width, height, png: png.into_inner() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::Mesh;
    use crate::scene::{HemisphericLight, Transform};
    use glam::Vec3;
    use std::sync::Arc;

    fn cube_scene() -> Scene {
        let mut scene = Scene::new();
        scene.add_light(HemisphericLight::new("light", Vec3::Y));
        scene.add_node("cube", None, Transform::default(), Some(Arc::new(Mesh::cube(1.0))));
        scene
    }

    fn front_camera() -> Camera3D {
        Camera3D::new(Vec3::new(0.0, 0.0, 4.0), Vec3::ZERO, 45.0_f32.to_radians(), 0.1, 100.0)
    }

    #[test]
    fn capture_produces_square_png() {
        let scene = cube_scene();
        let mut service = SoftwareScreenshot::default();
        let thumbnail = pollster::block_on(service.capture(&scene, &front_camera(), 48)).expect("capture");
        assert_eq!((thumbnail.width, thumbnail.height), (48, 48));
        assert_eq!(&thumbnail.png[1..4], b"PNG");
        let decoded = thumbnail.decode().expect("decode");
        assert_eq!(decoded.dimensions(), (48, 48));
        assert_eq!(decoded.get_pixel(24, 24).0[3], 255);
        assert_eq!(service.captures(), 1);
    }

    #[test]
    fn disabled_meshes_are_not_rendered() {
        let mut scene = cube_scene();
        let id = scene.mesh_nodes().next().map(|node| node.id).expect("cube node");
        scene.set_enabled(id, false);
        let target = SoftwareScreenshot::default().render(&scene, &front_camera(), 16).expect("render");
        assert_eq!(target.covered_pixels(), 0);
    }

    #[test]
    fn zero_size_is_rejected() {
        let scene = cube_scene();
        let err = pollster::block_on(SoftwareScreenshot::default().capture(&scene, &front_camera(), 0)).unwrap_err();
        assert!(matches!(err, ScreenshotError::InvalidSize(0)));
    }
}
