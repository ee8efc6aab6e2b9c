use asset_gallery::assets::{GltfAssetLoader, CONTAINER_ROOT_NAME};
use asset_gallery::config::GalleryConfig;
use asset_gallery::drop_target::DropEvent;
use asset_gallery::events::GalleryEvent;
use asset_gallery::manager::GalleryManager;
use asset_gallery::playground::build_scene;
use asset_gallery::screenshot::SoftwareScreenshot;
use asset_gallery::GalleryError;
use std::sync::Arc;
use std::time::{Duration, Instant};

const CUBE: &str = "fixtures/models/cube.gltf";
const PAIR: &str = "fixtures/models/pair.gltf";
const CUBE_GLB: &str = "fixtures/models/cube.glb";

#[test]
fn drop_then_click_spawns_independent_copy_and_flashes_thumbnail() {
    let (mut scene, main_camera) = build_scene(&GalleryConfig::default());
    let mut gallery = GalleryManager::new(
        &mut scene,
        main_camera,
        GltfAssetLoader::new(),
        SoftwareScreenshot::default(),
        GalleryConfig::default(),
    );

    gallery.drop_target().drop_files([CUBE]);
    pollster::block_on(gallery.process_drops(&mut scene));
    assert_eq!(gallery.registry().len(), 1);
    assert!(gallery.image_list().to_html().contains("<li id=\"0\">"));
    assert_eq!(scene.active_camera(), Some(main_camera));
    assert!(scene.visible_meshes().is_empty(), "template stays hidden");

    let template = Arc::clone(gallery.registry().get(0).expect("entry"));
    let template_root = template.root_nodes()[0];

    let now = Instant::now();
    let clicked = gallery.click(&mut scene, "0", now).expect("click thumbnail 0");
    assert_eq!(clicked.index, 0);
    let clone_root = clicked.entries.root_nodes[0];
    assert_ne!(clone_root, template_root);
    assert!(scene.node(clone_root).map(|node| node.enabled).unwrap_or(false));
    assert!(!scene.node(template_root).map(|node| node.enabled).unwrap_or(true));
    assert_eq!(
        scene.node(clone_root).map(|node| node.name.clone()),
        Some(format!("Clone of {CONTAINER_ROOT_NAME}"))
    );

    let visible = scene.visible_meshes();
    assert_eq!(visible.len(), 1);
    let clone_mesh = scene.node(visible[0]).and_then(|node| node.mesh.clone()).expect("clone mesh");
    let template_mesh = template.templates().iter().find_map(|node| node.mesh.clone()).expect("template mesh");
    assert!(!Arc::ptr_eq(&clone_mesh, &template_mesh), "clone owns its mesh data");
    assert_eq!(clone_mesh.vertices.len(), template_mesh.vertices.len());

    assert_eq!(
        gallery.image_list().item("0").and_then(|item| item.border.clone()).as_deref(),
        Some("2px solid #ffcc00")
    );
    assert!(gallery.tick(now + Duration::from_millis(999)).is_empty());
    assert_eq!(gallery.tick(now + Duration::from_millis(1_000)), vec!["0".to_string()]);
    assert!(gallery.image_list().item("0").and_then(|item| item.border.clone()).is_none());
    assert_eq!(gallery.pending_highlights(), 0);
    assert!(gallery.events().contains(&GalleryEvent::HighlightCleared { thumbnail: "0".to_string() }));
}

#[test]
fn clicks_resolve_to_their_own_entries() {
    let (mut scene, main_camera) = build_scene(&GalleryConfig::default());
    let mut gallery = GalleryManager::new(
        &mut scene,
        main_camera,
        GltfAssetLoader::new(),
        SoftwareScreenshot::default(),
        GalleryConfig::default(),
    );
    let drops = gallery.drop_target();
    drops.drop_event(DropEvent::single(CUBE));
    drops.drop_event(DropEvent::single(PAIR));
    pollster::block_on(gallery.process_drops(&mut scene));

    let now = Instant::now();
    let pair = gallery.click(&mut scene, "1", now).expect("click pair");
    let names: Vec<String> = pair
        .entries
        .nodes
        .iter()
        .filter_map(|id| scene.node(*id).map(|node| node.name.clone()))
        .collect();
    assert!(names.contains(&"Clone of Left".to_string()));
    assert!(names.contains(&"Clone of Right".to_string()));

    let again = gallery.click(&mut scene, "1", now).expect("click pair again");
    assert_ne!(pair.entries.root_nodes, again.entries.root_nodes);
    assert_eq!(scene.visible_meshes().len(), 4);
}

#[test]
fn stale_or_malformed_ids_are_rejected() {
    let (mut scene, main_camera) = build_scene(&GalleryConfig::default());
    let mut gallery = GalleryManager::new(
        &mut scene,
        main_camera,
        GltfAssetLoader::new(),
        SoftwareScreenshot::default(),
        GalleryConfig::default(),
    );
    pollster::block_on(gallery.handle_drop(&mut scene, DropEvent::single(CUBE))).expect("import");
    let nodes = scene.node_count();

    let err = gallery.click(&mut scene, "3", Instant::now()).unwrap_err();
    assert_eq!(err, GalleryError::IndexOutOfRange { index: 3, len: 1 });
    let err = gallery.click(&mut scene, "cube", Instant::now()).unwrap_err();
    assert_eq!(err, GalleryError::InvalidThumbnailId("cube".to_string()));
    assert_eq!(scene.node_count(), nodes);
    assert_eq!(gallery.pending_highlights(), 0);
}

#[test]
fn binary_gltf_drop_then_click() {
    let (mut scene, main_camera) = build_scene(&GalleryConfig::default());
    let mut gallery = GalleryManager::new(
        &mut scene,
        main_camera,
        GltfAssetLoader::new(),
        SoftwareScreenshot::default(),
        GalleryConfig::default(),
    );

    gallery.drop_target().drop_files([CUBE_GLB]);
    let results = pollster::block_on(gallery.process_drops(&mut scene));
    assert_eq!(*results[0].as_ref().expect("import glb"), 0);
    assert_eq!(gallery.registry().len(), 1);
    assert!(gallery.image_list().to_html().contains("<li id=\"0\">"));
    assert_eq!(scene.active_camera(), Some(main_camera));

    let template = Arc::clone(gallery.registry().get(0).expect("entry"));
    assert_eq!(template.materials, vec!["Clay".to_string()]);
    let template_root = template.root_nodes()[0];
    assert!(!scene.node(template_root).map(|node| node.enabled).unwrap_or(true));

    let clicked = gallery.click(&mut scene, "0", Instant::now()).expect("click glb thumbnail");
    let clone_root = clicked.entries.root_nodes[0];
    assert_ne!(clone_root, template_root);
    assert!(scene.node(clone_root).map(|node| node.enabled).unwrap_or(false));
    assert_eq!(scene.visible_meshes().len(), 1);
}

#[test]
fn repeated_click_restarts_the_highlight() {
    let (mut scene, main_camera) = build_scene(&GalleryConfig::default());
    let mut gallery = GalleryManager::new(
        &mut scene,
        main_camera,
        GltfAssetLoader::new(),
        SoftwareScreenshot::default(),
        GalleryConfig::default(),
    );
    pollster::block_on(gallery.handle_drop(&mut scene, DropEvent::single(CUBE))).expect("import");

    let start = Instant::now();
    gallery.click(&mut scene, "0", start).expect("first click");
    gallery.click(&mut scene, "0", start + Duration::from_millis(600)).expect("second click");
    assert_eq!(gallery.pending_highlights(), 1);

    assert!(gallery.tick(start + Duration::from_millis(1_000)).is_empty(), "first deadline was replaced");
    assert!(gallery.image_list().item("0").and_then(|item| item.border.clone()).is_some());
    assert_eq!(gallery.tick(start + Duration::from_millis(1_600)), vec!["0".to_string()]);
    let cleared = gallery
        .events()
        .iter()
        .filter(|event| matches!(event, GalleryEvent::HighlightCleared { .. }))
        .count();
    assert_eq!(cleared, 1);
}
