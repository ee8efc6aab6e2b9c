use glam::{Mat4, UVec2, Vec2, Vec3, Vec4};
use serde::Serialize;

const DEFAULT_UP: Vec3 = Vec3::Y;
const MIN_BETA: f32 = 0.01;
const DEFAULT_PRECISION: f32 = 3.0;

/// Perspective camera resolved from whichever controller is active.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Camera3D {
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub fov_y_radians: f32,
    pub near: f32,
    pub far: f32,
}

impl Camera3D {
    pub fn new(position: Vec3, target: Vec3, fov_y_radians: f32, near: f32, far: f32) -> Self {
        Self { position, target, up: DEFAULT_UP, fov_y_radians, near, far }
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, self.up)
    }

    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh_gl(self.fov_y_radians, aspect.max(0.0001), self.near, self.far)
    }

    pub fn view_projection(&self, viewport: UVec2) -> Mat4 {
        let aspect = if viewport.y > 0 { viewport.x as f32 / viewport.y as f32 } else { 1.0 };
        self.projection_matrix(aspect) * self.view_matrix()
    }

    pub fn project_point(&self, point: Vec3, viewport: UVec2) -> Option<Vec2> {
        if viewport.x == 0 || viewport.y == 0 {
            return None;
        }
        let clip = self.view_projection(viewport) * Vec4::from((point, 1.0));
        if clip.w.abs() < f32::EPSILON {
            return None;
        }
        let ndc = clip.truncate() / clip.w;
        let x = (ndc.x + 1.0) * 0.5 * viewport.x as f32;
        let y = (1.0 - ndc.y) * 0.5 * viewport.y as f32;
        Some(Vec2::new(x, y))
    }
}

/// Arc-rotate controller: `alpha` is the longitude around the target, `beta` the angle from +Y.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrbitCamera {
    pub target: Vec3,
    pub radius: f32,
    pub alpha: f32,
    pub beta: f32,
    pub fov_y_radians: f32,
    pub near: f32,
    pub far: f32,
    pub lower_radius_limit: Option<f32>,
    pub upper_radius_limit: Option<f32>,
    pub wheel_precision: f32,
    pub pinch_precision: f32,
}

impl OrbitCamera {
    pub fn new(alpha: f32, beta: f32, radius: f32, target: Vec3) -> Self {
        Self {
            target,
            radius: radius.max(0.01),
            alpha,
            beta: beta.clamp(MIN_BETA, std::f32::consts::PI - MIN_BETA),
            fov_y_radians: 45.0_f32.to_radians(),
            near: 0.1,
            far: 1000.0,
            lower_radius_limit: None,
            upper_radius_limit: None,
            wheel_precision: DEFAULT_PRECISION,
            pinch_precision: DEFAULT_PRECISION,
        }
    }

    pub fn with_lens(mut self, fov_y_radians: f32, near: f32, far: f32) -> Self {
        self.fov_y_radians = fov_y_radians;
        self.near = near;
        self.far = far;
        self
    }

    pub fn position(&self) -> Vec3 {
        let sin_beta = self.beta.sin();
        self.target
            + Vec3::new(
                self.radius * self.alpha.cos() * sin_beta,
                self.radius * self.beta.cos(),
                self.radius * self.alpha.sin() * sin_beta,
            )
    }

    pub fn to_camera(&self) -> Camera3D {
        Camera3D::new(self.position(), self.target, self.fov_y_radians, self.near, self.far)
    }

    pub fn set_target(&mut self, target: Vec3) {
        self.target = target;
    }

    pub fn orbit(&mut self, delta: Vec2) {
        self.alpha += delta.x;
        self.beta = (self.beta + delta.y).clamp(MIN_BETA, std::f32::consts::PI - MIN_BETA);
    }

    /// Wheel deltas are divided by `wheel_precision`, so higher precision means slower zoom.
    pub fn zoom_by_wheel(&mut self, delta: f32) {
        self.radius -= delta / self.wheel_precision.max(f32::EPSILON);
        self.check_limits();
    }

    pub fn zoom_by_pinch(&mut self, delta: f32) {
        self.radius -= delta / self.pinch_precision.max(f32::EPSILON);
        self.check_limits();
    }

    pub fn check_limits(&mut self) {
        if let Some(lower) = self.lower_radius_limit {
            self.radius = self.radius.max(lower);
        }
        if let Some(upper) = self.upper_radius_limit {
            self.radius = self.radius.min(upper);
        }
        self.radius = self.radius.max(0.01);
    }
}
