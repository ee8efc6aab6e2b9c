use crate::gallery::GalleryRegistry;
use crate::image_list::{ImageList, ThumbnailItemSummary};
use crate::scene::{CameraController, Scene, SceneNode};
use serde::{Deserialize, Serialize};

/// Deterministic snapshot of the playground used for tooling output and tests.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SceneCaptureSummary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_camera: Option<String>,
    pub cameras: Vec<SceneCaptureCamera>,
    pub nodes: Vec<SceneCaptureNode>,
    pub gallery: Vec<SceneCaptureGalleryEntry>,
    pub thumbnails: Vec<ThumbnailItemSummary>,
}

impl SceneCaptureSummary {
    pub fn from_scene(scene: &Scene) -> Self {
        Self {
            active_camera: scene
                .active_camera()
                .and_then(|id| scene.camera(id))
                .map(|camera| camera.name.clone()),
            cameras: scene
                .cameras()
                .map(|(_, camera)| SceneCaptureCamera::from_controller(&camera.name, &camera.controller))
                .collect(),
            nodes: scene.nodes().map(|node| SceneCaptureNode::from_node(scene, node)).collect(),
            gallery: Vec::new(),
            thumbnails: Vec::new(),
        }
    }

    pub fn with_gallery(mut self, registry: &GalleryRegistry, list: &ImageList) -> Self {
        self.gallery = registry
            .entries()
            .iter()
            .map(|entry| SceneCaptureGalleryEntry {
                index: entry.index,
                thumbnail_id: entry.thumbnail_id.clone(),
                source: entry.container.source().display().to_string(),
                meshes: entry.container.mesh_count(),
                materials: entry.container.materials.len(),
                animations: entry.container.animations.len(),
            })
            .collect();
        self.thumbnails = list.summaries();
        self
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum SceneCaptureCameraKind {
    Orbit,
    FirstPerson,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SceneCaptureCamera {
    pub name: String,
    pub kind: SceneCaptureCameraKind,
    pub position: [f32; 3],
    pub target: [f32; 3],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub radius: Option<f32>,
}

impl SceneCaptureCamera {
    fn from_controller(name: &str, controller: &CameraController) -> Self {
        let view = controller.to_camera();
        let (kind, radius) = match controller {
            CameraController::Orbit(orbit) => (SceneCaptureCameraKind::Orbit, Some(round(orbit.radius))),
            CameraController::FirstPerson(_) => (SceneCaptureCameraKind::FirstPerson, None),
        };
        Self {
            name: name.to_string(),
            kind,
            position: round3(view.position.to_array()),
            target: round3(view.target.to_array()),
            radius,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SceneCaptureNode {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    pub enabled: bool,
    pub visible: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mesh: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub check_collisions: bool,
}

impl SceneCaptureNode {
    fn from_node(scene: &Scene, node: &SceneNode) -> Self {
        Self {
            id: node.id.to_string(),
            name: node.name.clone(),
            parent: node.parent.map(|parent| parent.to_string()),
            enabled: node.enabled,
            visible: scene.is_enabled_in_hierarchy(node.id),
            mesh: node.mesh.as_ref().map(|mesh| mesh.name.clone()),
            check_collisions: node.check_collisions,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SceneCaptureGalleryEntry {
    pub index: usize,
    pub thumbnail_id: String,
    pub source: String,
    pub meshes: usize,
    pub materials: usize,
    pub animations: usize,
}

fn round(value: f32) -> f32 {
    (value * 1_000.0).round() / 1_000.0
}

fn round3(values: [f32; 3]) -> [f32; 3] {
    values.map(round)
}
