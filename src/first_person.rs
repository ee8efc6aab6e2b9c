use crate::camera3d::Camera3D;
use glam::{EulerRot, Quat, Vec3};
use serde::Serialize;
use std::collections::BTreeSet;

const PITCH_LIMIT: f32 = std::f32::consts::FRAC_PI_2 - 0.01;

/// Key codes bound to each movement direction, browser `keyCode` numbering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyBindings {
    pub up: Vec<u32>,
    pub down: Vec<u32>,
    pub left: Vec<u32>,
    pub right: Vec<u32>,
    pub upward: Vec<u32>,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self { up: vec![87], down: vec![83], left: vec![65], right: vec![68], upward: vec![32] }
    }
}

/// Walking camera for the playground room. Collision flags and the ellipsoid are handed to the
/// physics layer; this type only integrates key input along its view basis.
#[derive(Debug, Clone, Serialize)]
pub struct FirstPersonCamera {
    pub position: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub speed: f32,
    pub ellipsoid: Vec3,
    pub check_collisions: bool,
    pub apply_gravity: bool,
    pub fov_y_radians: f32,
    pub min_z: f32,
    pub max_z: f32,
    pub keys: KeyBindings,
}

impl FirstPersonCamera {
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            yaw: 0.0,
            pitch: 0.0,
            speed: 2.0,
            ellipsoid: Vec3::new(0.5, 1.0, 0.5),
            check_collisions: false,
            apply_gravity: false,
            fov_y_radians: 0.8,
            min_z: 1.0,
            max_z: 10_000.0,
            keys: KeyBindings::default(),
        }
    }

    pub fn set_target(&mut self, target: Vec3) {
        let forward = (target - self.position).normalize_or_zero();
        if forward == Vec3::ZERO {
            return;
        }
        // yaw 0 looks down -Z
        self.yaw = (-forward.x).atan2(-forward.z);
        self.pitch = forward.y.asin().clamp(-PITCH_LIMIT, PITCH_LIMIT);
    }

    pub fn orientation(&self) -> Quat {
        Quat::from_euler(EulerRot::YXZ, self.yaw, self.pitch, 0.0)
    }

    pub fn forward(&self) -> Vec3 {
        self.orientation() * Vec3::NEG_Z
    }

    pub fn right(&self) -> Vec3 {
        self.orientation() * Vec3::X
    }

    pub fn rotate(&mut self, yaw_delta: f32, pitch_delta: f32) {
        self.yaw += yaw_delta;
        self.pitch = (self.pitch + pitch_delta).clamp(-PITCH_LIMIT, PITCH_LIMIT);
    }

    /// Moves one step for every bound key in `pressed`; returns the applied displacement.
    pub fn apply_keys(&mut self, pressed: &BTreeSet<u32>) -> Vec3 {
        let is_down = |codes: &[u32]| codes.iter().any(|code| pressed.contains(code));
        let mut direction = Vec3::ZERO;
        if is_down(&self.keys.up) {
            direction += self.forward();
        }
        if is_down(&self.keys.down) {
            direction -= self.forward();
        }
        if is_down(&self.keys.right) {
            direction += self.right();
        }
        if is_down(&self.keys.left) {
            direction -= self.right();
        }
        if is_down(&self.keys.upward) {
            direction += Vec3::Y;
        }
        let displacement = direction.normalize_or_zero() * self.speed;
        self.position += displacement;
        displacement
    }

    pub fn to_camera(&self) -> Camera3D {
        Camera3D::new(self.position, self.position + self.forward(), self.fov_y_radians, self.min_z, self.max_z)
    }
}
