use crate::assets::GltfAssetLoader;
use crate::cli::CliOverrides;
use crate::config::GalleryConfig;
use crate::image_list::{ImageList, ImageSource};
use crate::manager::GalleryManager;
use crate::playground::{build_scene, enable_first_person, load_room};
use crate::scene_capture::SceneCaptureSummary;
use crate::screenshot::SoftwareScreenshot;
use anyhow::{Context, Result};
use log::{info, warn};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Outcome of one headless playground session.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub summary: SceneCaptureSummary,
    pub written: Vec<PathBuf>,
    pub failed_imports: usize,
    pub failed_clicks: usize,
}

pub async fn run() -> Result<RunReport> {
    let cli = CliOverrides::parse_from_env()?;
    run_with_overrides(cli).await
}

/// Builds the playground, imports every `--model` as its own drop, performs the `--click`s and
/// writes the thumbnails plus `index.html` into the output directory.
pub async fn run_with_overrides(cli: CliOverrides) -> Result<RunReport> {
    let mut config = match &cli.config {
        Some(path) => GalleryConfig::load(path)?,
        None => GalleryConfig::default(),
    };
    let overrides = cli.config_overrides();
    if !overrides.is_empty() {
        info!("[config] CLI overrides applied: {}", overrides.applied_fields().join(", "));
    }
    config.apply_overrides(&overrides);

    let (mut scene, main_camera) = build_scene(&config);
    let loader = GltfAssetLoader::new();
    if let Some(room) = &cli.room {
        load_room(&mut scene, &loader, room).await.with_context(|| format!("Failed to load room {}", room.display()))?;
        enable_first_person(&mut scene, &config.first_person);
    }

    let screenshots = SoftwareScreenshot::new(config.screenshot.clear_color);
    let mut manager = GalleryManager::new(&mut scene, main_camera, loader, screenshots, config);
    let drops = manager.drop_target();
    for model in &cli.models {
        drops.drop_files([model.clone()]);
    }
    let failed_imports = manager.process_drops(&mut scene).await.iter().filter(|result| result.is_err()).count();
    if failed_imports > 0 {
        warn!("[gallery] {failed_imports} of {} imports failed", cli.models.len());
    }

    let now = Instant::now();
    let failed_clicks = cli.clicks.iter().filter(|click| manager.click(&mut scene, click, now).is_err()).count();
    if failed_clicks > 0 {
        warn!("[gallery] {failed_clicks} of {} clicks matched no thumbnail", cli.clicks.len());
    }

    let written = write_gallery(&cli.out_dir(), manager.image_list(), cli.images)?;
    manager.tick(now + manager.highlight_duration());

    let summary = SceneCaptureSummary::from_scene(&scene).with_gallery(manager.registry(), manager.image_list());
    Ok(RunReport { summary, written, failed_imports, failed_clicks })
}

/// Writes an HTML page listing the thumbnails. With `ImageSource::File` each thumbnail also goes
/// to `<id>.png` beside the page; inline pages carry the PNGs as data URIs.
pub fn write_gallery(out_dir: &Path, list: &ImageList, images: ImageSource) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(out_dir).with_context(|| format!("Failed to create output directory {}", out_dir.display()))?;
    let mut written = Vec::with_capacity(list.len() + 1);
    if images == ImageSource::File {
        for item in list.items() {
            let path = out_dir.join(item.image_file_name());
            fs::write(&path, &item.image.png)
                .with_context(|| format!("Failed to write thumbnail {}", path.display()))?;
            written.push(path);
        }
    }
    let page = format!(
        "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>Gallery</title></head>\n<body>\n{}</body>\n</html>\n",
        list.to_html_with(images)
    );
    let index = out_dir.join("index.html");
    fs::write(&index, page).with_context(|| format!("Failed to write {}", index.display()))?;
    written.push(index);
    Ok(written)
}
