use std::cell::RefCell;
use std::collections::VecDeque;
use std::path::PathBuf;
use std::rc::Rc;

/// Files carried by one drop.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DropEvent {
    pub files: Vec<PathBuf>,
}

impl DropEvent {
    pub fn new<I, P>(files: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self { files: files.into_iter().map(Into::into).collect() }
    }

    pub fn single(file: impl Into<PathBuf>) -> Self {
        Self { files: vec![file.into()] }
    }

    /// Only the first file of a drop is imported.
    pub fn primary(&self) -> Option<&PathBuf> {
        self.files.first()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropEffect {
    /// Default file-open suppressed, drop accepted as a copy.
    Copy,
}

/// Cloneable handle that event handlers push drops into; the gallery manager drains it one
/// import at a time.
#[derive(Debug, Clone, Default)]
pub struct DropTarget {
    queue: Rc<RefCell<VecDeque<DropEvent>>>,
}

impl DropTarget {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn drag_over(&self) -> DropEffect {
        DropEffect::Copy
    }

    pub fn drop_event(&self, event: DropEvent) {
        self.queue.borrow_mut().push_back(event);
    }

    pub fn drop_files<I, P>(&self, files: I)
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.drop_event(DropEvent::new(files));
    }

    pub fn pending(&self) -> usize {
        self.queue.borrow().len()
    }

    pub fn next(&self) -> Option<DropEvent> {
        self.queue.borrow_mut().pop_front()
    }
}
