use crate::camera3d::OrbitCamera;
use crate::config::IsolationConfig;
use crate::mesh::Aabb;
use crate::scene::{CameraController, CameraId, Scene};
use glam::Vec3;
use log::debug;

pub const ISOLATION_CAMERA_NAME: &str = "isolationCamera";
const DEFAULT_ELEVATION: f32 = 0.3;

/// Where a framing pass wants the orbit camera to end up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FramingGoal {
    pub target: Vec3,
    pub radius: f32,
}

#[derive(Debug, Clone, Copy)]
struct Transition {
    from: FramingGoal,
    to: FramingGoal,
    elapsed_ms: f32,
}

/// Auto-frames an orbit camera on world-space bounds.
#[derive(Debug, Clone)]
pub struct FramingBehavior {
    /// 0 snaps to the goal instead of animating.
    pub framing_time_ms: u32,
    /// `None` leaves the camera elevation where it is after framing.
    pub elevation_return_time_ms: Option<u32>,
    pub radius_scale: f32,
    /// Vertical placement of the target inside the bounds, 0 = bottom, 1 = top.
    pub position_scale: f32,
    pub default_elevation: f32,
    pub auto_correct_limits: bool,
    transition: Option<Transition>,
}

impl Default for FramingBehavior {
    fn default() -> Self {
        Self {
            framing_time_ms: 1500,
            elevation_return_time_ms: Some(1500),
            radius_scale: 1.0,
            position_scale: 0.5,
            default_elevation: DEFAULT_ELEVATION,
            auto_correct_limits: true,
            transition: None,
        }
    }
}

impl FramingBehavior {
    /// Snapping configuration used for deterministic thumbnails.
    pub fn snapping(radius_scale: f32) -> Self {
        Self { framing_time_ms: 0, elevation_return_time_ms: None, radius_scale, ..Self::default() }
    }

    pub fn is_animating(&self) -> bool {
        self.transition.is_some()
    }

    /// Distance at which a sphere enclosing `bounds` touches both frustum side pairs.
    pub fn framing_radius(&self, camera: &OrbitCamera, bounds: &Aabb, aspect: f32) -> f32 {
        let sphere_radius = bounds.diagonal() * 0.5 * self.radius_scale;
        let slope_y = (camera.fov_y_radians * 0.5).tan().max(f32::EPSILON);
        let slope_x = (slope_y * aspect.max(f32::EPSILON)).max(f32::EPSILON);
        let horizontal = sphere_radius * (1.0 + 1.0 / (slope_x * slope_x)).sqrt();
        let vertical = sphere_radius * (1.0 + 1.0 / (slope_y * slope_y)).sqrt();
        horizontal.max(vertical)
    }

    pub fn goal_for(&self, camera: &OrbitCamera, bounds: &Aabb, aspect: f32) -> FramingGoal {
        let center = bounds.center();
        let target = Vec3::new(center.x, bounds.min.y + bounds.size().y * self.position_scale, center.z);
        FramingGoal { target, radius: self.framing_radius(camera, bounds, aspect) }
    }

    /// Starts framing `bounds`; with zero framing time the camera is moved immediately.
    pub fn zoom_on_bounds(&mut self, camera: &mut OrbitCamera, bounds: &Aabb, aspect: f32) -> FramingGoal {
        let goal = self.goal_for(camera, bounds, aspect);
        if self.auto_correct_limits {
            camera.lower_radius_limit = Some(bounds.diagonal() * 0.5 + camera.near);
        }
        if self.framing_time_ms == 0 {
            camera.target = goal.target;
            camera.radius = goal.radius;
            self.transition = None;
        } else {
            let from = FramingGoal { target: camera.target, radius: camera.radius };
            self.transition = Some(Transition { from, to: goal, elapsed_ms: 0.0 });
        }
        debug!("[framing] target={:?} radius={:.3} animated={}", goal.target, goal.radius, self.framing_time_ms > 0);
        goal
    }

    /// Advances an in-flight framing transition and the elevation return.
    pub fn update(&mut self, camera: &mut OrbitCamera, delta_ms: f32) {
        if let Some(mut transition) = self.transition.take() {
            transition.elapsed_ms += delta_ms;
            let t = (transition.elapsed_ms / self.framing_time_ms.max(1) as f32).clamp(0.0, 1.0);
            camera.target = transition.from.target.lerp(transition.to.target, t);
            camera.radius = transition.from.radius + (transition.to.radius - transition.from.radius) * t;
            if t < 1.0 {
                self.transition = Some(transition);
            }
        }
        if let Some(return_ms) = self.elevation_return_time_ms {
            let goal_beta = std::f32::consts::FRAC_PI_2 - self.default_elevation;
            let step = if return_ms == 0 { 1.0 } else { (delta_ms / return_ms as f32).clamp(0.0, 1.0) };
            camera.beta += (goal_beta - camera.beta) * step;
        }
    }
}

/// Secondary orbit camera used only for thumbnails.
#[derive(Debug, Clone)]
pub struct IsolationCamera {
    pub id: CameraId,
    pub framing: FramingBehavior,
}

impl IsolationCamera {
    /// Reuses the scene's isolation camera or creates one looking at the origin.
    pub fn attach(scene: &mut Scene, config: &IsolationConfig) -> Self {
        let id = match scene.camera_by_name(ISOLATION_CAMERA_NAME) {
            Some(id) => id,
            None => {
                let orbit = OrbitCamera::new(
                    config.alpha_degrees.to_radians(),
                    config.beta_degrees.to_radians(),
                    10.0,
                    Vec3::ZERO,
                )
                .with_lens(config.fov_degrees.to_radians(), 0.1, 10_000.0);
                let previous = scene.active_camera();
                let id = scene.add_camera(ISOLATION_CAMERA_NAME, CameraController::Orbit(orbit));
                if let Some(previous) = previous {
                    scene.set_active_camera(previous);
                }
                id
            }
        };
        Self { id, framing: FramingBehavior::snapping(config.radius_scale) }
    }

    pub fn orbit<'a>(&self, scene: &'a Scene) -> Option<&'a OrbitCamera> {
        scene.camera(self.id).and_then(|camera| camera.controller.as_orbit())
    }

    pub fn orbit_mut<'a>(&self, scene: &'a mut Scene) -> Option<&'a mut OrbitCamera> {
        scene.camera_mut(self.id).and_then(|camera| camera.controller.as_orbit_mut())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_bounds() -> Aabb {
        Aabb::new(Vec3::splat(-1.0), Vec3::splat(1.0))
    }

    #[test]
    fn snapping_moves_camera_immediately() {
        let mut camera = OrbitCamera::new(0.0, 1.0, 50.0, Vec3::new(9.0, 9.0, 9.0));
        let mut framing = FramingBehavior::snapping(1.0);
        let bounds = Aabb::new(Vec3::new(4.0, 0.0, 4.0), Vec3::new(6.0, 2.0, 6.0));
        let goal = framing.zoom_on_bounds(&mut camera, &bounds, 1.0);
        assert_eq!(camera.target, Vec3::new(5.0, 1.0, 5.0));
        assert!((camera.radius - goal.radius).abs() < 1e-5);
        assert!(!framing.is_animating());
    }

    #[test]
    fn framing_radius_keeps_sphere_inside_frustum() {
        let camera = OrbitCamera::new(0.0, 1.0, 5.0, Vec3::ZERO);
        let framing = FramingBehavior::snapping(1.0);
        let radius = framing.framing_radius(&camera, &unit_bounds(), 1.0);
        let sphere = 3.0_f32.sqrt();
        let half_fov = camera.fov_y_radians * 0.5;
        // distance * sin(half_fov) must equal the sphere radius for a tangent fit
        assert!((radius * half_fov.sin() - sphere).abs() < 1e-3);
    }

    #[test]
    fn radius_scale_grows_distance() {
        let camera = OrbitCamera::new(0.0, 1.0, 5.0, Vec3::ZERO);
        let near = FramingBehavior::snapping(1.0).framing_radius(&camera, &unit_bounds(), 1.0);
        let far = FramingBehavior::snapping(2.0).framing_radius(&camera, &unit_bounds(), 1.0);
        assert!((far - 2.0 * near).abs() < 1e-3);
    }

    #[test]
    fn animated_framing_reaches_goal_after_framing_time() {
        let mut camera = OrbitCamera::new(0.0, 1.0, 30.0, Vec3::new(3.0, 0.0, 0.0));
        let mut framing = FramingBehavior { elevation_return_time_ms: None, ..FramingBehavior::default() };
        let goal = framing.zoom_on_bounds(&mut camera, &unit_bounds(), 1.0);
        assert!((camera.radius - 30.0).abs() < 1e-5);
        framing.update(&mut camera, 750.0);
        assert!(framing.is_animating());
        framing.update(&mut camera, 750.0);
        assert!(!framing.is_animating());
        assert!((camera.radius - goal.radius).abs() < 1e-4);
        assert!(camera.target.length() < 1e-5);
    }

    #[test]
    fn elevation_return_is_skipped_when_disabled() {
        let mut camera = OrbitCamera::new(0.0, 0.4, 5.0, Vec3::ZERO);
        let mut framing = FramingBehavior::snapping(1.0);
        framing.update(&mut camera, 10_000.0);
        assert!((camera.beta - 0.4).abs() < 1e-6);

        framing.elevation_return_time_ms = Some(100);
        framing.update(&mut camera, 100.0);
        assert!((camera.beta - (std::f32::consts::FRAC_PI_2 - DEFAULT_ELEVATION)).abs() < 1e-5);
    }
}
