use crate::mesh::Mesh;
use crate::scene::{NodeId, Scene, Transform};
use glam::{Quat, Vec3};
use log::debug;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

pub const CONTAINER_ROOT_NAME: &str = "__root__";

#[derive(Debug, Error)]
pub enum AssetLoadError {
    #[error("unsupported asset format '{extension}' for {path}")]
    UnsupportedFormat { path: PathBuf, extension: String },
    #[error("failed to import {path}: {source}")]
    Import {
        path: PathBuf,
        #[source]
        source: gltf::Error,
    },
    #[error("invalid mesh in {path}: {message}")]
    InvalidMesh { path: PathBuf, message: String },
    #[error("{path} contains no nodes")]
    Empty { path: PathBuf },
}

/// One node of a container template; `parent` indexes into the same template list and always
/// points at an earlier entry.
#[derive(Debug, Clone)]
pub struct TemplateNode {
    pub name: String,
    pub parent: Option<usize>,
    pub transform: Transform,
    pub mesh: Option<Arc<Mesh>>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct InstantiateOptions {
    /// Deep-copy mesh data instead of sharing it with the template.
    pub do_not_instantiate: bool,
}

#[derive(Debug, Clone, Default)]
pub struct InstantiatedEntries {
    pub root_nodes: Vec<NodeId>,
    pub nodes: Vec<NodeId>,
}

/// Loaded scene content that is not (yet) part of the rendered scene.
#[derive(Debug, Clone)]
pub struct AssetContainer {
    source: PathBuf,
    templates: Vec<TemplateNode>,
    pub materials: Vec<String>,
    pub animations: Vec<String>,
    attached: Vec<NodeId>,
    attached_roots: Vec<NodeId>,
}

impl AssetContainer {
    pub fn new(source: impl Into<PathBuf>, templates: Vec<TemplateNode>) -> Self {
        Self {
            source: source.into(),
            templates,
            materials: Vec::new(),
            animations: Vec::new(),
            attached: Vec::new(),
            attached_roots: Vec::new(),
        }
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn templates(&self) -> &[TemplateNode] {
        &self.templates
    }

    pub fn mesh_count(&self) -> usize {
        self.templates.iter().filter(|node| node.mesh.is_some()).count()
    }

    /// Scene roots created by the last `add_all_to_scene` call.
    pub fn root_nodes(&self) -> &[NodeId] {
        &self.attached_roots
    }

    /// Every scene node created by the last `add_all_to_scene` call.
    pub fn attached_nodes(&self) -> &[NodeId] {
        &self.attached
    }

    /// Attaches the template nodes themselves to `scene`, all enabled.
    pub fn add_all_to_scene(&mut self, scene: &mut Scene) -> Vec<NodeId> {
        let (nodes, roots) = self.spawn(scene, |template| template.name.clone(), None, |mesh| mesh.clone());
        self.attached = nodes;
        self.attached_roots = roots.clone();
        roots
    }

    pub fn detach_from_scene(&mut self, scene: &mut Scene) -> usize {
        let removed = self.attached_roots.iter().map(|root| scene.remove_subtree(*root)).sum();
        self.attached.clear();
        self.attached_roots.clear();
        removed
    }

    /// Clones the templates into `scene` as new, enabled, independent nodes.
    pub fn instantiate_models_to_scene(
        &self,
        scene: &mut Scene,
        name_fn: Option<&dyn Fn(&str) -> String>,
        parent: Option<NodeId>,
        options: InstantiateOptions,
    ) -> InstantiatedEntries {
        let name_for = |template: &TemplateNode| match name_fn {
            Some(rename) => rename(&template.name),
            None => format!("Clone of {}", template.name),
        };
        let share_or_copy = |mesh: &Arc<Mesh>| {
            if options.do_not_instantiate {
                Arc::new(Mesh::clone(mesh))
            } else {
                Arc::clone(mesh)
            }
        };
        let (nodes, root_nodes) = self.spawn(scene, name_for, parent, share_or_copy);
        InstantiatedEntries { root_nodes, nodes }
    }

    fn spawn(
        &self,
        scene: &mut Scene,
        name_for: impl Fn(&TemplateNode) -> String,
        parent: Option<NodeId>,
        mesh_for: impl Fn(&Arc<Mesh>) -> Arc<Mesh>,
    ) -> (Vec<NodeId>, Vec<NodeId>) {
        let mut created: Vec<NodeId> = Vec::with_capacity(self.templates.len());
        let mut roots = Vec::new();
        for template in &self.templates {
            let scene_parent = match template.parent {
                Some(index) => created.get(index).copied(),
                None => parent,
            };
            let id =
                scene.add_node(name_for(template), scene_parent, template.transform, template.mesh.as_ref().map(&mesh_for));
            if template.parent.is_none() {
                roots.push(id);
            }
            created.push(id);
        }
        (created, roots)
    }
}

#[allow(async_fn_in_trait)]
pub trait AssetLoader {
    async fn load_asset_container(&self, path: &Path) -> Result<AssetContainer, AssetLoadError>;
}

/// Loads `.gltf` / `.glb` files through the `gltf` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct GltfAssetLoader;

impl GltfAssetLoader {
    pub fn new() -> Self {
        Self
    }

    pub fn load_sync(&self, path: &Path) -> Result<AssetContainer, AssetLoadError> {
        let extension =
            path.extension().and_then(|ext| ext.to_str()).map(str::to_ascii_lowercase).unwrap_or_default();
        if extension != "gltf" && extension != "glb" {
            return Err(AssetLoadError::UnsupportedFormat { path: path.to_path_buf(), extension });
        }
        let (document, buffers, _images) = gltf::import(path)
            .map_err(|source| AssetLoadError::Import { path: path.to_path_buf(), source })?;
        let source_label = path.display().to_string();

        let mut meshes: HashMap<usize, Arc<Mesh>> = HashMap::new();
        for mesh in document.meshes() {
            let loaded = Mesh::from_gltf(&mesh, &buffers, &source_label).map_err(|err| {
                AssetLoadError::InvalidMesh { path: path.to_path_buf(), message: format!("{err:#}") }
            })?;
            match loaded {
                Some(loaded) => {
                    meshes.insert(mesh.index(), Arc::new(loaded));
                }
                // Nodes pointing at it stay plain transforms.
                None => debug!("[assets] mesh {} in {source_label} has no triangles; skipped", mesh.index()),
            }
        }

        let scene_roots: Vec<gltf::Node<'_>> = match document.default_scene().or_else(|| document.scenes().next()) {
            Some(scene) => scene.nodes().collect(),
            None => {
                let mut child_indices = std::collections::HashSet::new();
                for node in document.nodes() {
                    child_indices.extend(node.children().map(|child| child.index()));
                }
                document.nodes().filter(|node| !child_indices.contains(&node.index())).collect()
            }
        };
        if scene_roots.is_empty() {
            return Err(AssetLoadError::Empty { path: path.to_path_buf() });
        }

        let mut templates = vec![TemplateNode {
            name: CONTAINER_ROOT_NAME.to_string(),
            parent: None,
            transform: Transform::default(),
            mesh: None,
        }];
        let mut stack: Vec<(gltf::Node<'_>, usize)> = scene_roots.into_iter().rev().map(|node| (node, 0)).collect();
        while let Some((node, parent)) = stack.pop() {
            let (translation, rotation, scale) = node.transform().decomposed();
            let index = templates.len();
            templates.push(TemplateNode {
                name: node.name().map(str::to_string).unwrap_or_else(|| format!("node{}", node.index())),
                parent: Some(parent),
                transform: Transform {
                    translation: Vec3::from_array(translation),
                    rotation: Quat::from_array(rotation),
                    scale: Vec3::from_array(scale),
                },
                mesh: node.mesh().and_then(|mesh| meshes.get(&mesh.index()).cloned()),
            });
            let children: Vec<_> = node.children().collect();
            stack.extend(children.into_iter().rev().map(|child| (child, index)));
        }

        let mut container = AssetContainer::new(path, templates);
        container.materials = document
            .materials()
            .enumerate()
            .map(|(i, material)| material.name().map(str::to_string).unwrap_or_else(|| format!("material_{i}")))
            .collect();
        container.animations = document
            .animations()
            .enumerate()
            .map(|(i, anim)| anim.name().map(str::to_string).unwrap_or_else(|| format!("animation_{i}")))
            .collect();
        Ok(container)
    }
}

impl AssetLoader for GltfAssetLoader {
    async fn load_asset_container(&self, path: &Path) -> Result<AssetContainer, AssetLoadError> {
        self.load_sync(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_level_container() -> AssetContainer {
        let cube = Arc::new(Mesh::cube(1.0));
        AssetContainer::new(
            "memory://pair",
            vec![
                TemplateNode {
                    name: CONTAINER_ROOT_NAME.to_string(),
                    parent: None,
                    transform: Transform::default(),
                    mesh: None,
                },
                TemplateNode {
                    name: "left".to_string(),
                    parent: Some(0),
                    transform: Transform::from_translation(Vec3::new(-1.0, 0.0, 0.0)),
                    mesh: Some(cube.clone()),
                },
                TemplateNode {
                    name: "right".to_string(),
                    parent: Some(0),
                    transform: Transform::from_translation(Vec3::new(1.0, 0.0, 0.0)),
                    mesh: Some(cube),
                },
            ],
        )
    }

    #[test]
    fn add_all_to_scene_tracks_roots() {
        let mut scene = Scene::new();
        let mut container = two_level_container();
        let roots = container.add_all_to_scene(&mut scene);
        assert_eq!(roots.len(), 1);
        assert_eq!(container.root_nodes(), roots.as_slice());
        assert_eq!(container.attached_nodes().len(), 3);
        assert_eq!(scene.child_meshes(roots[0]).len(), 2);
        assert_eq!(scene.node(roots[0]).map(|n| n.name.as_str()), Some(CONTAINER_ROOT_NAME));
    }

    #[test]
    fn instantiate_creates_independent_nodes() {
        let mut scene = Scene::new();
        let mut container = two_level_container();
        let template_roots = container.add_all_to_scene(&mut scene);
        scene.set_enabled(template_roots[0], false);

        let entries = container.instantiate_models_to_scene(&mut scene, None, None, InstantiateOptions::default());
        assert_eq!(entries.root_nodes.len(), 1);
        assert_eq!(entries.nodes.len(), 3);
        let clone_root = entries.root_nodes[0];
        assert_ne!(clone_root, template_roots[0]);
        assert!(scene.is_enabled_in_hierarchy(clone_root));
        assert_eq!(scene.node(clone_root).map(|n| n.name.as_str()), Some("Clone of __root__"));
        assert!(!scene.is_enabled_in_hierarchy(template_roots[0]));
    }

    #[test]
    fn do_not_instantiate_copies_mesh_data() {
        let mut scene = Scene::new();
        let container = two_level_container();
        let shared = container.instantiate_models_to_scene(&mut scene, None, None, InstantiateOptions::default());
        let rename = |name: &str| format!("copy_{name}");
        let copied = container.instantiate_models_to_scene(
            &mut scene,
            Some(&rename as &dyn Fn(&str) -> String),
            None,
            InstantiateOptions { do_not_instantiate: true },
        );
        let template_mesh = container.templates()[1].mesh.as_ref().expect("template mesh");
        let shared_mesh = scene.node(shared.nodes[1]).and_then(|n| n.mesh.clone()).expect("shared mesh");
        let copied_mesh = scene.node(copied.nodes[1]).and_then(|n| n.mesh.clone()).expect("copied mesh");
        assert!(Arc::ptr_eq(template_mesh, &shared_mesh));
        assert!(!Arc::ptr_eq(template_mesh, &copied_mesh));
        assert_eq!(scene.node(copied.nodes[1]).map(|n| n.name.as_str()), Some("copy_left"));
    }

    #[test]
    fn detach_removes_attached_subtree() {
        let mut scene = Scene::new();
        let mut container = two_level_container();
        container.add_all_to_scene(&mut scene);
        assert_eq!(container.detach_from_scene(&mut scene), 3);
        assert_eq!(scene.node_count(), 0);
        assert!(container.root_nodes().is_empty());
    }

    #[test]
    fn unsupported_extension_is_rejected_before_reading() {
        let err = GltfAssetLoader::new().load_sync(Path::new("model/room.fbx")).unwrap_err();
        assert!(matches!(err, AssetLoadError::UnsupportedFormat { .. }));
        assert!(err.to_string().contains("fbx"));
    }
}
