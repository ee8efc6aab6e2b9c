pub mod app;
pub mod assets;
pub mod camera3d;
pub mod cli;
pub mod config;
pub mod drop_target;
pub mod events;
pub mod first_person;
pub mod framing;
pub mod gallery;
pub mod image_list;
pub mod import;
pub mod instantiate;
pub mod manager;
pub mod mesh;
pub mod playground;
pub mod raster;
pub mod scene;
pub mod scene_capture;
pub mod screenshot;
pub mod time;

pub use app::{run, run_with_overrides, RunReport};
pub use gallery::{GalleryError, GalleryRegistry};
pub use import::ImportError;
pub use manager::GalleryManager;
