use crate::assets::AssetContainer;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GalleryError {
    #[error("gallery index {index} is out of range (len {len})")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("thumbnail id '{0}' is not a gallery index")]
    InvalidThumbnailId(String),
}

#[derive(Debug, Clone)]
pub struct GalleryEntry {
    pub index: usize,
    pub container: Arc<AssetContainer>,
    /// Element id of the thumbnail in the image list.
    pub thumbnail_id: String,
}

/// Append-only list of imported containers; `entries[i].index == i` always holds.
#[derive(Debug, Default)]
pub struct GalleryRegistry {
    entries: Vec<GalleryEntry>,
}

impl GalleryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Index the next `append` will assign.
    pub fn next_index(&self) -> usize {
        self.entries.len()
    }

    pub fn append(&mut self, container: Arc<AssetContainer>) -> usize {
        let index = self.entries.len();
        self.entries.push(GalleryEntry { index, container, thumbnail_id: index.to_string() });
        index
    }

    pub fn get(&self, index: usize) -> Result<&Arc<AssetContainer>, GalleryError> {
        self.entries
            .get(index)
            .map(|entry| &entry.container)
            .ok_or(GalleryError::IndexOutOfRange { index, len: self.entries.len() })
    }

    pub fn entry(&self, index: usize) -> Option<&GalleryEntry> {
        self.entries.get(index)
    }

    pub fn entries(&self) -> &[GalleryEntry] {
        &self.entries
    }
}

/// Parses a thumbnail element id back into its registry index.
pub fn parse_thumbnail_id(id: &str) -> Result<usize, GalleryError> {
    id.trim().parse::<usize>().map_err(|_| GalleryError::InvalidThumbnailId(id.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn container(name: &str) -> Arc<AssetContainer> {
        Arc::new(AssetContainer::new(name, Vec::new()))
    }

    #[test]
    fn append_assigns_sequential_indices() {
        let mut registry = GalleryRegistry::new();
        assert_eq!(registry.next_index(), 0);
        assert_eq!(registry.append(container("a.glb")), 0);
        assert_eq!(registry.append(container("a.glb")), 1);
        assert_eq!(registry.len(), 2);
        for (position, entry) in registry.entries().iter().enumerate() {
            assert_eq!(entry.index, position);
            assert_eq!(entry.thumbnail_id, position.to_string());
        }
        assert!(!Arc::ptr_eq(registry.get(0).unwrap(), registry.get(1).unwrap()));
    }

    #[test]
    fn get_out_of_range_fails_loudly() {
        let mut registry = GalleryRegistry::new();
        registry.append(container("a.glb"));
        assert_eq!(registry.get(1).unwrap_err(), GalleryError::IndexOutOfRange { index: 1, len: 1 });
    }

    #[test]
    fn thumbnail_ids_parse_as_indices() {
        assert_eq!(parse_thumbnail_id("3"), Ok(3));
        assert_eq!(parse_thumbnail_id("x"), Err(GalleryError::InvalidThumbnailId("x".to_string())));
        assert!(parse_thumbnail_id("-1").is_err());
    }
}
