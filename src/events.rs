use crate::scene::NodeId;
use std::fmt;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq)]
pub enum GalleryEvent {
    ImportStarted { file: PathBuf },
    ExtraFilesIgnored { count: usize },
    ImportCompleted { index: usize, file: PathBuf },
    ImportFailed { file: Option<PathBuf>, reason: String },
    SceneRestored { meshes: usize },
    Instantiated { index: usize, root: NodeId },
    HighlightCleared { thumbnail: String },
}

impl fmt::Display for GalleryEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GalleryEvent::ImportStarted { file } => write!(f, "ImportStarted file={}", file.display()),
            GalleryEvent::ExtraFilesIgnored { count } => write!(f, "ExtraFilesIgnored count={count}"),
            GalleryEvent::ImportCompleted { index, file } => {
                write!(f, "ImportCompleted index={} file={}", index, file.display())
            }
            GalleryEvent::ImportFailed { file, reason } => match file {
                Some(file) => write!(f, "ImportFailed file={} reason={}", file.display(), reason),
                None => write!(f, "ImportFailed reason={reason}"),
            },
            GalleryEvent::SceneRestored { meshes } => write!(f, "SceneRestored meshes={meshes}"),
            GalleryEvent::Instantiated { index, root } => write!(f, "Instantiated index={index} root={root}"),
            GalleryEvent::HighlightCleared { thumbnail } => write!(f, "HighlightCleared thumbnail={thumbnail}"),
        }
    }
}

#[derive(Debug, Default)]
pub struct EventBus {
    events: Vec<GalleryEvent>,
}

impl EventBus {
    pub fn push(&mut self, event: GalleryEvent) {
        self.events.push(event);
    }

    pub fn drain(&mut self) -> Vec<GalleryEvent> {
        self.events.drain(..).collect()
    }

    pub fn peek(&self) -> &[GalleryEvent] {
        &self.events
    }
}
