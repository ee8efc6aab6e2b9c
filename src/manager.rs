use crate::assets::AssetLoader;
use crate::config::GalleryConfig;
use crate::drop_target::{DropEvent, DropTarget};
use crate::events::{EventBus, GalleryEvent};
use crate::framing::IsolationCamera;
use crate::gallery::{GalleryError, GalleryRegistry};
use crate::image_list::ImageList;
use crate::import::{import_file, ImportError};
use crate::instantiate::{Instantiation, InstantiationHandler};
use crate::scene::{CameraId, Scene};
use crate::screenshot::ScreenshotService;
use log::{debug, info, warn};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Owns the gallery state and drives imports one drop at a time.
pub struct GalleryManager<L, S> {
    config: GalleryConfig,
    loader: L,
    screenshots: S,
    registry: GalleryRegistry,
    image_list: ImageList,
    isolation: IsolationCamera,
    main_camera: CameraId,
    drop_target: DropTarget,
    instantiation: InstantiationHandler,
    events: EventBus,
}

impl<L, S> GalleryManager<L, S>
where
    L: AssetLoader,
    S: ScreenshotService,
{
    /// Attaches the isolation camera to `scene`. `main_camera` must be an orbit camera; its
    /// radius scales the isolation zoom limits.
    pub fn new(scene: &mut Scene, main_camera: CameraId, loader: L, screenshots: S, config: GalleryConfig) -> Self {
        let isolation = IsolationCamera::attach(scene, &config.isolation);
        let image_list = ImageList::new(config.thumbnail.list_id.clone());
        let instantiation = InstantiationHandler::new(&config.thumbnail);
        Self {
            config,
            loader,
            screenshots,
            registry: GalleryRegistry::new(),
            image_list,
            isolation,
            main_camera,
            drop_target: DropTarget::new(),
            instantiation,
            events: EventBus::default(),
        }
    }

    /// Handle for event handlers; drops pushed through it wait until `process_drops`.
    pub fn drop_target(&self) -> DropTarget {
        self.drop_target.clone()
    }

    /// Imports every queued drop in arrival order. Each result is independent; a failure does
    /// not stop later drops.
    pub async fn process_drops(&mut self, scene: &mut Scene) -> Vec<Result<usize, ImportError>> {
        let mut results = Vec::new();
        while let Some(event) = self.drop_target.next() {
            results.push(self.handle_drop(scene, event).await);
        }
        results
    }

    /// Imports the first file of `event` and returns its gallery index.
    pub async fn handle_drop(&mut self, scene: &mut Scene, event: DropEvent) -> Result<usize, ImportError> {
        let Some(file) = event.primary().cloned() else {
            warn!("[gallery] drop carried no files");
            self.events.push(GalleryEvent::ImportFailed { file: None, reason: ImportError::NoFileDropped.to_string() });
            return Err(ImportError::NoFileDropped);
        };
        let extra = event.files.len() - 1;
        if extra > 0 {
            debug!("[gallery] ignoring {extra} extra dropped file(s)");
            self.events.push(GalleryEvent::ExtraFilesIgnored { count: extra });
        }
        self.events.push(GalleryEvent::ImportStarted { file: file.clone() });

        let captured = match import_file(
            &file,
            scene,
            &self.loader,
            &mut self.screenshots,
            &mut self.isolation,
            self.main_camera,
            &self.config,
        )
        .await
        {
            Ok(captured) => captured,
            Err(err) => {
                warn!("[gallery] import of {} failed: {err}", file.display());
                self.events.push(GalleryEvent::ImportFailed { file: Some(file), reason: err.to_string() });
                return Err(err);
            }
        };

        let index = self.registry.append(Arc::new(captured.container));
        self.image_list.append(index.to_string(), captured.thumbnail, self.config.thumbnail.display_width);
        info!("[gallery] imported {} as entry {index}", file.display());
        self.events.push(GalleryEvent::ImportCompleted { index, file });
        self.events.push(GalleryEvent::SceneRestored { meshes: captured.restored_meshes });
        Ok(index)
    }

    /// Routes a click on thumbnail `thumbnail_id`.
    pub fn click(&mut self, scene: &mut Scene, thumbnail_id: &str, now: Instant) -> Result<Instantiation, GalleryError> {
        let result = self.instantiation.activate(scene, &self.registry, &mut self.image_list, thumbnail_id, now);
        match &result {
            Ok(instantiation) => {
                info!("[gallery] instantiated entry {} into the scene", instantiation.index);
                if let Some(root) = instantiation.entries.root_nodes.first() {
                    self.events.push(GalleryEvent::Instantiated { index: instantiation.index, root: *root });
                }
            }
            Err(err) => warn!("[gallery] click on '{thumbnail_id}' ignored: {err}"),
        }
        result
    }

    /// Fires due highlight timers.
    pub fn tick(&mut self, now: Instant) -> Vec<String> {
        let cleared = self.instantiation.tick(&mut self.image_list, now);
        for thumbnail in &cleared {
            debug!("[gallery] highlight cleared on '{thumbnail}'");
            self.events.push(GalleryEvent::HighlightCleared { thumbnail: thumbnail.clone() });
        }
        cleared
    }

    pub fn registry(&self) -> &GalleryRegistry {
        &self.registry
    }

    pub fn image_list(&self) -> &ImageList {
        &self.image_list
    }

    pub fn config(&self) -> &GalleryConfig {
        &self.config
    }

    pub fn isolation(&self) -> &IsolationCamera {
        &self.isolation
    }

    pub fn main_camera(&self) -> CameraId {
        self.main_camera
    }

    pub fn screenshots(&self) -> &S {
        &self.screenshots
    }

    pub fn highlight_duration(&self) -> Duration {
        self.instantiation.highlight_duration()
    }

    pub fn pending_highlights(&self) -> usize {
        self.instantiation.pending_highlights()
    }

    pub fn events(&self) -> &[GalleryEvent] {
        self.events.peek()
    }

    pub fn drain_events(&mut self) -> Vec<GalleryEvent> {
        self.events.drain()
    }
}
