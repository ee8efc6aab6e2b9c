use crate::camera3d::{Camera3D, OrbitCamera};
use crate::first_person::FirstPersonCamera;
use crate::mesh::{Aabb, Mesh};
use glam::{Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(Uuid);

impl NodeId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self { translation: Vec3::ZERO, rotation: Quat::IDENTITY, scale: Vec3::ONE }
    }
}

impl Transform {
    pub fn from_translation(translation: Vec3) -> Self {
        Self { translation, ..Self::default() }
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }
}

#[derive(Debug, Clone)]
pub struct SceneNode {
    pub id: NodeId,
    pub name: String,
    pub parent: Option<NodeId>,
    pub transform: Transform,
    pub mesh: Option<Arc<Mesh>>,
    pub enabled: bool,
    pub check_collisions: bool,
}

impl SceneNode {
    pub fn is_mesh(&self) -> bool {
        self.mesh.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct CameraId(usize);

impl CameraId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Serialize)]
pub enum CameraController {
    Orbit(OrbitCamera),
    FirstPerson(FirstPersonCamera),
}

impl CameraController {
    pub fn to_camera(&self) -> Camera3D {
        match self {
            CameraController::Orbit(orbit) => orbit.to_camera(),
            CameraController::FirstPerson(walker) => walker.to_camera(),
        }
    }

    pub fn as_orbit(&self) -> Option<&OrbitCamera> {
        match self {
            CameraController::Orbit(orbit) => Some(orbit),
            CameraController::FirstPerson(_) => None,
        }
    }

    pub fn as_orbit_mut(&mut self) -> Option<&mut OrbitCamera> {
        match self {
            CameraController::Orbit(orbit) => Some(orbit),
            CameraController::FirstPerson(_) => None,
        }
    }

    pub fn as_first_person_mut(&mut self) -> Option<&mut FirstPersonCamera> {
        match self {
            CameraController::FirstPerson(walker) => Some(walker),
            CameraController::Orbit(_) => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SceneCamera {
    pub name: String,
    pub controller: CameraController,
}

/// Sky/ground blend light; the thumbnail shader is the only consumer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HemisphericLight {
    pub name: String,
    pub direction: Vec3,
    pub intensity: f32,
    pub diffuse: Vec3,
    pub ground_color: Vec3,
}

impl HemisphericLight {
    pub fn new(name: impl Into<String>, direction: Vec3) -> Self {
        Self {
            name: name.into(),
            direction: direction.normalize_or_zero(),
            intensity: 1.0,
            diffuse: Vec3::ONE,
            ground_color: Vec3::ZERO,
        }
    }

    /// Light reaching a surface with the given world normal.
    pub fn irradiance(&self, normal: Vec3) -> Vec3 {
        let t = normal.normalize_or_zero().dot(self.direction) * 0.5 + 0.5;
        self.ground_color.lerp(self.diffuse, t) * self.intensity
    }
}

#[derive(Debug, Clone)]
pub struct Scene {
    nodes: HashMap<NodeId, SceneNode>,
    order: Vec<NodeId>,
    cameras: Vec<SceneCamera>,
    active_camera: Option<CameraId>,
    pub lights: Vec<HemisphericLight>,
    pub gravity: Vec3,
    pub collisions_enabled: bool,
}

impl Default for Scene {
    fn default() -> Self {
        Self {
            nodes: HashMap::new(),
            order: Vec::new(),
            cameras: Vec::new(),
            active_camera: None,
            lights: Vec::new(),
            gravity: Vec3::new(0.0, -9.807, 0.0),
            collisions_enabled: false,
        }
    }
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(
        &mut self,
        name: impl Into<String>,
        parent: Option<NodeId>,
        transform: Transform,
        mesh: Option<Arc<Mesh>>,
    ) -> NodeId {
        let id = NodeId::new();
        let parent = parent.filter(|p| self.nodes.contains_key(p));
        self.nodes.insert(
            id,
            SceneNode { id, name: name.into(), parent, transform, mesh, enabled: true, check_collisions: false },
        );
        self.order.push(id);
        id
    }

    pub fn node(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes.get(&id)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut SceneNode> {
        self.nodes.get_mut(&id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn node_count(&self) -> usize {
        self.order.len()
    }

    /// Nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &SceneNode> {
        self.order.iter().filter_map(|id| self.nodes.get(id))
    }

    pub fn find_node_by_name(&self, name: &str) -> Option<NodeId> {
        self.nodes().find(|node| node.name == name).map(|node| node.id)
    }

    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        self.nodes().filter(|node| node.parent == Some(id)).map(|node| node.id).collect()
    }

    /// All nodes below `id`, depth first, excluding `id` itself.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = self.children(id);
        stack.reverse();
        while let Some(next) = stack.pop() {
            out.push(next);
            let mut children = self.children(next);
            children.reverse();
            stack.extend(children);
        }
        out
    }

    pub fn child_meshes(&self, id: NodeId) -> Vec<NodeId> {
        self.descendants(id).into_iter().filter(|child| self.nodes[child].is_mesh()).collect()
    }

    /// Removes `id` and everything below it; returns how many nodes were dropped.
    pub fn remove_subtree(&mut self, id: NodeId) -> usize {
        if !self.nodes.contains_key(&id) {
            return 0;
        }
        let mut doomed = self.descendants(id);
        doomed.push(id);
        for node in &doomed {
            self.nodes.remove(node);
        }
        self.order.retain(|node| self.nodes.contains_key(node));
        doomed.len()
    }

    pub fn set_enabled(&mut self, id: NodeId, enabled: bool) -> bool {
        match self.nodes.get_mut(&id) {
            Some(node) => {
                node.enabled = enabled;
                true
            }
            None => false,
        }
    }

    /// A node renders only when it and every ancestor are enabled.
    pub fn is_enabled_in_hierarchy(&self, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node_id) = current {
            match self.nodes.get(&node_id) {
                Some(node) if node.enabled => current = node.parent,
                _ => return false,
            }
        }
        true
    }

    pub fn world_matrix(&self, id: NodeId) -> Mat4 {
        let mut matrix = Mat4::IDENTITY;
        let mut current = self.nodes.get(&id);
        while let Some(node) = current {
            matrix = node.transform.matrix() * matrix;
            current = node.parent.and_then(|parent| self.nodes.get(&parent));
        }
        matrix
    }

    pub fn mesh_nodes(&self) -> impl Iterator<Item = &SceneNode> {
        self.nodes().filter(|node| node.is_mesh())
    }

    /// Mesh nodes whose own `enabled` flag is set, whatever their ancestors say. This is the set
    /// isolation switches off and restores; a child of a disabled root is listed here but is not
    /// in `visible_meshes`.
    pub fn self_enabled_meshes(&self) -> BTreeSet<NodeId> {
        self.mesh_nodes().filter(|node| node.enabled).map(|node| node.id).collect()
    }

    /// Mesh nodes that would render right now.
    pub fn visible_meshes(&self) -> Vec<NodeId> {
        self.mesh_nodes().filter(|node| self.is_enabled_in_hierarchy(node.id)).map(|node| node.id).collect()
    }

    pub fn world_bounds(&self, id: NodeId) -> Option<Aabb> {
        let mesh = self.nodes.get(&id)?.mesh.as_ref()?;
        Some(mesh.local_aabb().transformed(&self.world_matrix(id)))
    }

    /// World-space extents of every visible mesh.
    pub fn visible_mesh_bounds(&self) -> Option<Aabb> {
        self.visible_meshes()
            .into_iter()
            .filter_map(|id| self.world_bounds(id))
            .reduce(|acc, bounds| acc.union(&bounds))
    }

    pub fn add_camera(&mut self, name: impl Into<String>, controller: CameraController) -> CameraId {
        let id = CameraId(self.cameras.len());
        self.cameras.push(SceneCamera { name: name.into(), controller });
        if self.active_camera.is_none() {
            self.active_camera = Some(id);
        }
        id
    }

    pub fn camera(&self, id: CameraId) -> Option<&SceneCamera> {
        self.cameras.get(id.0)
    }

    pub fn camera_mut(&mut self, id: CameraId) -> Option<&mut SceneCamera> {
        self.cameras.get_mut(id.0)
    }

    pub fn camera_by_name(&self, name: &str) -> Option<CameraId> {
        self.cameras.iter().position(|camera| camera.name == name).map(CameraId)
    }

    pub fn cameras(&self) -> impl Iterator<Item = (CameraId, &SceneCamera)> {
        self.cameras.iter().enumerate().map(|(index, camera)| (CameraId(index), camera))
    }

    pub fn active_camera(&self) -> Option<CameraId> {
        self.active_camera
    }

    pub fn set_active_camera(&mut self, id: CameraId) -> bool {
        if id.0 < self.cameras.len() {
            self.active_camera = Some(id);
            true
        } else {
            false
        }
    }

    pub fn active_view(&self) -> Option<Camera3D> {
        self.active_camera.and_then(|id| self.camera(id)).map(|camera| camera.controller.to_camera())
    }

    pub fn add_light(&mut self, light: HemisphericLight) {
        self.lights.push(light);
    }
}
