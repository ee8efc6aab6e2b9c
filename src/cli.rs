use crate::config::GalleryConfigOverrides;
use crate::image_list::ImageSource;
use anyhow::{anyhow, bail, Context, Result};
use std::env;
use std::path::PathBuf;

pub const DEFAULT_OUT_DIR: &str = "gallery_out";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CliOverrides {
    pub config: Option<PathBuf>,
    pub models: Vec<PathBuf>,
    pub out_dir: Option<PathBuf>,
    pub room: Option<PathBuf>,
    pub clicks: Vec<String>,
    pub images: ImageSource,
    thumbnail_size: Option<u32>,
    display_width: Option<u32>,
    highlight_ms: Option<u64>,
}

impl CliOverrides {
    pub fn parse_from_env() -> Result<Self> {
        Self::parse(env::args())
    }

    pub fn parse<I, S>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut overrides = CliOverrides::default();
        let mut iter = args.into_iter();
        let _ = iter.next(); // skip program name if present
        while let Some(raw_flag) = iter.next() {
            let flag = raw_flag.as_ref();
            if !flag.starts_with("--") {
                bail!("Unexpected argument '{flag}'. Flags take the form --name <value>.");
            }
            let key = &flag[2..];
            let value =
                iter.next().ok_or_else(|| anyhow!("Expected a value after '{flag}'"))?.as_ref().to_string();
            match key {
                "config" => overrides.config = Some(PathBuf::from(value)),
                "model" => overrides.models.push(PathBuf::from(value)),
                "out" => overrides.out_dir = Some(PathBuf::from(value)),
                "room" => overrides.room = Some(PathBuf::from(value)),
                "click" => overrides.clicks.push(value),
                "images" => {
                    overrides.images = match value.as_str() {
                        "files" => ImageSource::File,
                        "inline" => ImageSource::Inline,
                        _ => bail!("Invalid --images mode '{value}'. Expected 'files' or 'inline'."),
                    };
                }
                "thumbnail-size" => {
                    let size = value.parse::<u32>().with_context(|| format!("Invalid thumbnail size '{value}'"))?;
                    if size == 0 {
                        bail!("Thumbnail size must be positive");
                    }
                    overrides.thumbnail_size = Some(size);
                }
                "display-width" => {
                    overrides.display_width =
                        Some(value.parse::<u32>().with_context(|| format!("Invalid display width '{value}'"))?);
                }
                "highlight-ms" => {
                    overrides.highlight_ms =
                        Some(value.parse::<u64>().with_context(|| format!("Invalid highlight duration '{value}'"))?);
                }
                _ => bail!(
                    "Unknown flag '{flag}'. Supported flags: --config, --model, --out, --room, --click, \
                     --images, --thumbnail-size, --display-width, --highlight-ms."
                ),
            }
        }
        Ok(overrides)
    }

    pub fn out_dir(&self) -> PathBuf {
        self.out_dir.clone().unwrap_or_else(|| PathBuf::from(DEFAULT_OUT_DIR))
    }

    pub fn config_overrides(&self) -> GalleryConfigOverrides {
        GalleryConfigOverrides {
            capture_size: self.thumbnail_size,
            display_width: self.display_width,
            highlight_ms: self.highlight_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeatable_flags_accumulate_in_order() {
        let args = ["app", "--model", "a.glb", "--click", "0", "--model", "b.gltf", "--click", "1"];
        let overrides = CliOverrides::parse(args).expect("parse overrides");
        assert_eq!(overrides.models, vec![PathBuf::from("a.glb"), PathBuf::from("b.gltf")]);
        assert_eq!(overrides.clicks, vec!["0".to_string(), "1".to_string()]);
        assert_eq!(overrides.out_dir(), PathBuf::from(DEFAULT_OUT_DIR));
        assert_eq!(overrides.images, ImageSource::File);
    }

    #[test]
    fn images_flag_selects_inline_or_files() {
        let inline = CliOverrides::parse(["app", "--images", "inline"]).expect("parse inline");
        assert_eq!(inline.images, ImageSource::Inline);
        let err = CliOverrides::parse(["app", "--images", "svg"]).unwrap_err();
        assert!(err.to_string().contains("files"));
    }

    #[test]
    fn numeric_flags_become_config_overrides() {
        let args = ["app", "--thumbnail-size", "128", "--thumbnail-size", "64", "--highlight-ms", "250"];
        let overrides = CliOverrides::parse(args).expect("parse overrides").config_overrides();
        assert_eq!(overrides.capture_size, Some(64));
        assert_eq!(overrides.highlight_ms, Some(250));
        assert_eq!(overrides.display_width, None);
    }

    #[test]
    fn missing_value_errors() {
        let err = CliOverrides::parse(["app", "--model"]).unwrap_err();
        assert!(err.to_string().contains("Expected a value"), "error should mention missing value");
    }

    #[test]
    fn rejects_unknown_flags_and_zero_size() {
        let err = CliOverrides::parse(["app", "--foo", "bar"]).unwrap_err();
        assert!(err.to_string().contains("Unknown flag"), "unknown flags should error");
        assert!(CliOverrides::parse(["app", "--thumbnail-size", "0"]).is_err());
        assert!(CliOverrides::parse(["app", "--thumbnail-size", "big"]).is_err());
    }
}
