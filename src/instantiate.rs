use crate::assets::{InstantiateOptions, InstantiatedEntries};
use crate::config::ThumbnailConfig;
use crate::gallery::{parse_thumbnail_id, GalleryError, GalleryRegistry};
use crate::image_list::ImageList;
use crate::scene::Scene;
use crate::time::TimerQueue;
use log::{debug, warn};
use std::time::{Duration, Instant};

/// Result of clicking a thumbnail.
#[derive(Debug, Clone)]
pub struct Instantiation {
    pub index: usize,
    pub thumbnail_id: String,
    pub entries: InstantiatedEntries,
}

/// Turns thumbnail clicks into independent scene copies and flashes the clicked thumbnail.
#[derive(Debug)]
pub struct InstantiationHandler {
    border: String,
    highlight: Duration,
    timers: TimerQueue<String>,
}

impl InstantiationHandler {
    pub fn new(config: &ThumbnailConfig) -> Self {
        Self {
            border: config.highlight_border.clone(),
            highlight: Duration::from_millis(config.highlight_ms),
            timers: TimerQueue::new(),
        }
    }

    pub fn highlight_duration(&self) -> Duration {
        self.highlight
    }

    /// Highlights whose clear deadline has not passed yet.
    pub fn pending_highlights(&self) -> usize {
        self.timers.len()
    }

    /// Clones the registry entry behind `thumbnail_id` into `scene`. Nothing is touched when the
    /// id does not resolve.
    pub fn activate(
        &mut self,
        scene: &mut Scene,
        registry: &GalleryRegistry,
        list: &mut ImageList,
        thumbnail_id: &str,
        now: Instant,
    ) -> Result<Instantiation, GalleryError> {
        let index = parse_thumbnail_id(thumbnail_id)?;
        let container = registry.get(index)?;
        let entries = container.instantiate_models_to_scene(
            scene,
            None,
            None,
            InstantiateOptions { do_not_instantiate: true },
        );

        if list.set_border(thumbnail_id, Some(self.border.clone())) {
            // A repeat click restarts the highlight instead of stacking timers.
            self.timers.cancel_where(|pending| pending == thumbnail_id);
            self.timers.schedule(now, self.highlight, thumbnail_id.to_string());
        } else {
            warn!("[gallery] thumbnail '{thumbnail_id}' is not in the image list; skipping highlight");
        }
        debug!(
            "[gallery] instantiated entry {index} from {} ({} nodes)",
            container.source().display(),
            entries.nodes.len()
        );
        Ok(Instantiation { index, thumbnail_id: thumbnail_id.to_string(), entries })
    }

    /// Clears every highlight that is due.
    pub fn tick(&mut self, list: &mut ImageList, now: Instant) -> Vec<String> {
        let due = self.timers.expire(now);
        for id in &due {
            list.set_border(id, None);
        }
        due
    }
}
