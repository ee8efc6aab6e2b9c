use crate::assets::{AssetContainer, AssetLoadError, AssetLoader};
use crate::config::GalleryConfig;
use crate::framing::{FramingBehavior, IsolationCamera};
use crate::scene::{CameraId, NodeId, Scene};
use crate::screenshot::{ScreenshotError, ScreenshotService, Thumbnail};
use log::{debug, warn};
use std::collections::BTreeSet;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("drop carried no files")]
    NoFileDropped,
    #[error(transparent)]
    AssetLoad(#[from] AssetLoadError),
    #[error("thumbnail render failed: {0}")]
    ScreenshotRender(#[from] ScreenshotError),
    #[error("main camera is missing or is not an orbit camera")]
    MainCameraUnavailable,
}

/// Scene state an import borrows and must hand back: the active camera and the mesh nodes whose
/// own enabled flag was set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisibilitySnapshot {
    pub previous_camera: Option<CameraId>,
    pub enabled_meshes: BTreeSet<NodeId>,
}

/// Records the current visibility and disables every enabled mesh.
pub fn isolate(scene: &mut Scene) -> VisibilitySnapshot {
    let snapshot =
        VisibilitySnapshot { previous_camera: scene.active_camera(), enabled_meshes: scene.self_enabled_meshes() };
    for id in &snapshot.enabled_meshes {
        scene.set_enabled(*id, false);
    }
    snapshot
}

/// Re-enables the recorded meshes and reactivates the recorded camera. Returns how many meshes
/// were re-enabled.
pub fn restore(scene: &mut Scene, snapshot: VisibilitySnapshot) -> usize {
    let restored = snapshot.enabled_meshes.iter().filter(|id| scene.set_enabled(**id, true)).count();
    if let Some(camera) = snapshot.previous_camera {
        scene.set_active_camera(camera);
    }
    restored
}

/// A container whose thumbnail was captured; its scene roots are disabled templates.
#[derive(Debug)]
pub struct CapturedAsset {
    pub container: AssetContainer,
    pub thumbnail: Thumbnail,
    pub restored_meshes: usize,
}

/// Loads `file`, shoots it alone through the isolation camera and puts the scene back.
///
/// Nothing in `scene` changes when loading fails. Once the container is attached, every exit
/// path restores the snapshot; failures additionally remove the attached nodes.
pub async fn import_file<L, S>(
    file: &Path,
    scene: &mut Scene,
    loader: &L,
    screenshots: &mut S,
    isolation: &mut IsolationCamera,
    main_camera: CameraId,
    config: &GalleryConfig,
) -> Result<CapturedAsset, ImportError>
where
    L: AssetLoader,
    S: ScreenshotService,
{
    let mut container = loader.load_asset_container(file).await?;

    let snapshot = isolate(scene);
    container.add_all_to_scene(scene);

    match capture_isolated(scene, screenshots, isolation, main_camera, config).await {
        Ok(thumbnail) => {
            for root in container.root_nodes() {
                scene.set_enabled(*root, false);
            }
            let restored_meshes = restore(scene, snapshot);
            Ok(CapturedAsset { container, thumbnail, restored_meshes })
        }
        Err(err) => {
            let removed = container.detach_from_scene(scene);
            let restored = restore(scene, snapshot);
            warn!(
                "[gallery] import of {} failed after isolation: {err}; removed {removed} nodes, restored {restored} meshes",
                file.display()
            );
            Err(err)
        }
    }
}

async fn capture_isolated<S: ScreenshotService>(
    scene: &mut Scene,
    screenshots: &mut S,
    isolation: &mut IsolationCamera,
    main_camera: CameraId,
    config: &GalleryConfig,
) -> Result<Thumbnail, ImportError> {
    let main_radius = scene
        .camera(main_camera)
        .and_then(|camera| camera.controller.as_orbit())
        .map(|orbit| orbit.radius)
        .ok_or(ImportError::MainCameraUnavailable)?;

    scene.set_active_camera(isolation.id);
    isolation.framing = FramingBehavior::snapping(config.isolation.radius_scale);
    let bounds = scene.visible_mesh_bounds();
    let settings = &config.isolation;

    let orbit = isolation.orbit_mut(scene).ok_or(ImportError::MainCameraUnavailable)?;
    orbit.alpha = settings.alpha_degrees.to_radians();
    orbit.beta = settings.beta_degrees.to_radians();
    orbit.lower_radius_limit = None;
    orbit.upper_radius_limit = None;
    match bounds {
        Some(bounds) => {
            isolation.framing.zoom_on_bounds(orbit, &bounds, 1.0);
        }
        None => debug!("[gallery] imported asset has no visible meshes; keeping previous framing"),
    }

    orbit.lower_radius_limit = Some(settings.lower_radius_limit);
    orbit.upper_radius_limit = Some(settings.upper_radius_factor * main_radius);
    orbit.wheel_precision = settings.precision_numerator / main_radius;
    orbit.pinch_precision = settings.precision_numerator / main_radius;
    orbit.check_limits();
    let view = orbit.to_camera();

    Ok(screenshots.capture(scene, &view, config.thumbnail.capture_size).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::Mesh;
    use crate::scene::Transform;
    use std::sync::Arc;

    #[test]
    fn isolate_then_restore_returns_exact_enabled_set() {
        let mut scene = Scene::new();
        let cube = Some(Arc::new(Mesh::cube(1.0)));
        let a = scene.add_node("a", None, Transform::default(), cube.clone());
        let b = scene.add_node("b", None, Transform::default(), cube.clone());
        let hidden = scene.add_node("hidden", None, Transform::default(), cube);
        scene.set_enabled(hidden, false);

        let snapshot = isolate(&mut scene);
        assert!(scene.self_enabled_meshes().is_empty());
        assert_eq!(snapshot.enabled_meshes, [a, b].into_iter().collect());

        assert_eq!(restore(&mut scene, snapshot), 2);
        assert_eq!(scene.self_enabled_meshes(), [a, b].into_iter().collect());
        assert!(!scene.node(hidden).map(|n| n.enabled).unwrap_or(true));
    }

    #[test]
    fn restore_skips_nodes_removed_meanwhile() {
        let mut scene = Scene::new();
        let a = scene.add_node("a", None, Transform::default(), Some(Arc::new(Mesh::cube(1.0))));
        let snapshot = isolate(&mut scene);
        scene.remove_subtree(a);
        assert_eq!(restore(&mut scene, snapshot), 0);
    }
}
