//! Per-map resources: calibration data and the web overview image.

use log::{debug, info};
use shared::{parse_calibration, MapInfo};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::process::Command;

/// Why a map could not be made ready.
#[derive(Debug, Error)]
pub enum PrepareError {
    #[error("map name {0:?} cannot be used as a file name")]
    InvalidMapName(String),

    #[error("could not read calibration {path:?}: {source}")]
    CalibrationRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("could not run {program:?}: {source}")]
    ConversionSpawn {
        program: String,
        source: std::io::Error,
    },

    #[error("converting {input:?} exited with {status}: {stderr}")]
    ConversionFailed {
        input: PathBuf,
        status: String,
        stderr: String,
    },
}

/// Locates and prepares map resources on disk.
#[derive(Debug, Clone)]
pub struct MapAssets {
    overviews_dir: PathBuf,
    images_dir: PathBuf,
    convert_program: String,
}

impl MapAssets {
    /// Asset locations and the image converter to run.
    pub fn new(overviews_dir: PathBuf, images_dir: PathBuf, convert_program: &str) -> Self {
        Self {
            overviews_dir,
            images_dir,
            convert_program: convert_program.to_string(),
        }
    }

    /// `<overviews>/<map>.txt`
    pub fn calibration_path(&self, name: &str) -> PathBuf {
        self.overviews_dir.join(format!("{}.txt", name))
    }

    /// `<overviews>/<map>_radar.dds`
    pub fn radar_path(&self, name: &str) -> PathBuf {
        self.overviews_dir.join(format!("{}_radar.dds", name))
    }

    /// `<images>/<map>.png`
    pub fn image_path(&self, name: &str) -> PathBuf {
        self.images_dir.join(format!("{}.png", name))
    }

    /// Reads the calibration for `name` and makes sure its overview image exists.
    pub async fn prepare(&self, name: &str) -> Result<MapInfo, PrepareError> {
        if !is_safe_map_name(name) {
            return Err(PrepareError::InvalidMapName(name.to_string()));
        }

        let path = self.calibration_path(name);
        let raw = tokio::fs::read(&path)
            .await
            .map_err(|source| PrepareError::CalibrationRead { path, source })?;
        let calibration = parse_calibration(&String::from_utf8_lossy(&raw));
        debug!("Calibration for {}: {:?}", name, calibration);

        self.ensure_overview(name).await?;
        Ok(MapInfo::new(name, calibration))
    }

    /// Converts the radar overview unless the image is already present.
    pub async fn ensure_overview(&self, name: &str) -> Result<PathBuf, PrepareError> {
        let image = self.image_path(name);
        if tokio::fs::metadata(&image).await.is_ok() {
            return Ok(image);
        }

        let input = self.radar_path(name);
        info!("Converting {} to {}", input.display(), image.display());

        if let Err(e) = tokio::fs::create_dir_all(&self.images_dir).await {
            debug!("Could not create {}: {}", self.images_dir.display(), e);
        }

        let output = Command::new(&self.convert_program)
            .arg(&input)
            .arg(&image)
            .output()
            .await
            .map_err(|source| PrepareError::ConversionSpawn {
                program: self.convert_program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(PrepareError::ConversionFailed {
                input,
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(image)
    }
}

/// Map names come off the wire and end up in paths; allow plain names only.
fn is_safe_map_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && Path::new(name).file_name().map(|n| n == name).unwrap_or(false)
        && !name.contains(['/', '\\'])
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::{SystemTime, UNIX_EPOCH};
    use tokio_test::{assert_err, assert_ok};

    fn scratch_dir(label: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or(0);
        let dir = std::env::temp_dir().join(format!(
            "haywire-{}-{}-{}",
            label,
            std::process::id(),
            nanos
        ));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn assets_in(dir: &Path, program: &str) -> MapAssets {
        MapAssets::new(dir.join("overviews"), dir.join("maps"), program)
    }

    fn write(path: &Path, contents: &str) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, contents).unwrap();
    }

    #[test]
    fn test_paths() {
        let assets = MapAssets::new("ov".into(), "img".into(), "convert");
        assert_eq!(assets.calibration_path("de_dust2"), PathBuf::from("ov/de_dust2.txt"));
        assert_eq!(assets.radar_path("de_dust2"), PathBuf::from("ov/de_dust2_radar.dds"));
        assert_eq!(assets.image_path("de_dust2"), PathBuf::from("img/de_dust2.png"));
    }

    #[test]
    fn test_safe_map_names() {
        assert!(is_safe_map_name("de_dust2"));
        assert!(is_safe_map_name("workshop.map-1"));
        assert!(!is_safe_map_name(""));
        assert!(!is_safe_map_name(".."));
        assert!(!is_safe_map_name("../etc/passwd"));
        assert!(!is_safe_map_name("maps/de_dust2"));
        assert!(!is_safe_map_name("..\\boot"));
    }

    #[tokio::test]
    async fn test_prepare_with_existing_image() {
        let dir = scratch_dir("existing");
        let assets = assets_in(&dir, "definitely-not-a-converter");
        write(
            &assets.calibration_path("de_dust2"),
            "\"pos_x\" \"-2476\"\n\"pos_y\" \"3239\"\n\"scale\" \"4.4\"\n",
        );
        write(&assets.image_path("de_dust2"), "png");

        let info = assert_ok!(assets.prepare("de_dust2").await);
        assert_eq!(info.name, "de_dust2");
        assert_eq!(
            serde_json::Value::Object(info.calibration),
            json!({ "pos_x": "-2476", "pos_y": "3239", "scale": "4.4" })
        );
    }

    #[tokio::test]
    async fn test_prepare_missing_calibration() {
        let dir = scratch_dir("missing");
        let assets = assets_in(&dir, "convert");
        let err = assert_err!(assets.prepare("de_nuke").await);
        assert!(matches!(err, PrepareError::CalibrationRead { .. }));
    }

    #[tokio::test]
    async fn test_prepare_rejects_path_names() {
        let dir = scratch_dir("reject");
        let assets = assets_in(&dir, "convert");
        let err = assert_err!(assets.prepare("../secrets").await);
        assert!(matches!(err, PrepareError::InvalidMapName(_)));
    }

    #[tokio::test]
    async fn test_conversion_program_missing() {
        let dir = scratch_dir("spawn");
        let assets = assets_in(&dir, "definitely-not-a-converter");
        write(&assets.calibration_path("de_train"), "\"scale\" \"4.7\"\n");

        let err = assert_err!(assets.prepare("de_train").await);
        assert!(matches!(err, PrepareError::ConversionSpawn { .. }));
        assert!(!assets.image_path("de_train").exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_conversion_program_fails() {
        let dir = scratch_dir("failing");
        let assets = assets_in(&dir, "false");
        write(&assets.calibration_path("de_train"), "\"scale\" \"4.7\"\n");

        let err = assert_err!(assets.ensure_overview("de_train").await);
        assert!(matches!(err, PrepareError::ConversionFailed { .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_conversion_runs_program() {
        let dir = scratch_dir("copying");
        let assets = assets_in(&dir, "cp");
        write(&assets.radar_path("de_train"), "dds");

        let image = assert_ok!(assets.ensure_overview("de_train").await);
        assert_eq!(std::fs::read_to_string(image).unwrap(), "dds");
    }
}
