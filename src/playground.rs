use crate::assets::{AssetContainer, AssetLoadError, AssetLoader};
use crate::camera3d::OrbitCamera;
use crate::config::{FirstPersonConfig, GalleryConfig};
use crate::first_person::{FirstPersonCamera, KeyBindings};
use crate::scene::{CameraController, CameraId, HemisphericLight, Scene};
use glam::Vec3;
use log::info;
use std::path::Path;

pub const MAIN_CAMERA_NAME: &str = "camera";
pub const LIGHT_NAME: &str = "light";
pub const FIRST_PERSON_CAMERA_NAME: &str = "FirstViewCamera";

/// Builds the base scene: the main arc-rotate camera looking at the origin and the hemispheric
/// light. Returns the scene together with the main camera id.
pub fn build_scene(config: &GalleryConfig) -> (Scene, CameraId) {
    let mut scene = Scene::new();
    let cam = &config.main_camera;
    let orbit = OrbitCamera::new(cam.alpha_degrees.to_radians(), cam.beta_degrees.to_radians(), cam.radius, Vec3::ZERO)
        .with_lens(cam.fov_degrees.to_radians(), cam.near, cam.far);
    let main_camera = scene.add_camera(MAIN_CAMERA_NAME, CameraController::Orbit(orbit));

    let mut light = HemisphericLight::new(LIGHT_NAME, Vec3::from_array(config.light.direction));
    light.intensity = config.light.intensity;
    light.ground_color = Vec3::from_array(config.light.ground_color);
    scene.add_light(light);
    (scene, main_camera)
}

/// Loads the environment model, attaches it and marks every mesh below its root as a collider.
pub async fn load_room<L: AssetLoader>(
    scene: &mut Scene,
    loader: &L,
    path: &Path,
) -> Result<AssetContainer, AssetLoadError> {
    let mut room = loader.load_asset_container(path).await?;
    let roots = room.add_all_to_scene(scene);
    let mut colliders = 0;
    for root in roots {
        for mesh in scene.child_meshes(root) {
            if let Some(node) = scene.node_mut(mesh) {
                node.check_collisions = true;
                colliders += 1;
            }
        }
    }
    info!("[playground] room {} attached with {colliders} colliders", path.display());
    Ok(room)
}

/// Makes the walking camera active, creating it on first use. Collision and gravity settings are
/// recorded on the scene for the physics layer.
pub fn enable_first_person(scene: &mut Scene, config: &FirstPersonConfig) -> CameraId {
    let id = match scene.camera_by_name(FIRST_PERSON_CAMERA_NAME) {
        Some(id) => id,
        None => {
            let mut walker = FirstPersonCamera::new(Vec3::from_array(config.position));
            walker.set_target(Vec3::from_array(config.target));
            let previous = scene.active_camera();
            let id = scene.add_camera(FIRST_PERSON_CAMERA_NAME, CameraController::FirstPerson(walker));
            if let Some(previous) = previous {
                scene.set_active_camera(previous);
            }
            id
        }
    };

    if let Some(walker) = scene.camera_mut(id).and_then(|camera| camera.controller.as_first_person_mut()) {
        walker.ellipsoid = Vec3::from_array(config.ellipsoid);
        walker.speed = config.speed;
        walker.check_collisions = true;
        walker.apply_gravity = true;
        walker.min_z = config.min_z;
        walker.keys = KeyBindings {
            up: config.keys_up.clone(),
            down: config.keys_down.clone(),
            left: config.keys_left.clone(),
            right: config.keys_right.clone(),
            upward: config.keys_upward.clone(),
        };
    }

    scene.collisions_enabled = true;
    scene.gravity.y = config.gravity;
    scene.set_active_camera(id);
    id
}
