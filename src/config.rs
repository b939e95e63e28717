use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::capture::CaptureSession;
use crate::geometry::Region;
use crate::input::parse_key;

pub const DEFAULT_CONFIG_PATH: &str = "config.json";

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Set by `pick --save` or by hand.
    pub region: Option<Region>,
    pub pages: u32,
    pub page_key: String,
    pub wait_ms: u64,
    pub start_delay_ms: u64,
    pub output_dir: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            region: None,
            pages: 50,
            page_key: "pagedown".to_string(),
            wait_ms: 1500,
            start_delay_ms: 3000,
            output_dir: PathBuf::from("output"),
        }
    }
}

impl AppConfig {
    /// Loads `path`, falling back to defaults when the file does not exist.
    /// A file that exists but does not parse is an error.
    pub fn load(path: &Path) -> Result<Self> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::info!("{} not found, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(e).with_context(|| format!("reading {}", path.display()));
            }
        };

        let config = if is_toml(path) {
            toml::from_str(&content).with_context(|| format!("parsing {}", path.display()))?
        } else {
            serde_json::from_str(&content)
                .with_context(|| format!("parsing {}", path.display()))?
        };
        log::debug!("config loaded from {}", path.display());
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = if is_toml(path) {
            toml::to_string_pretty(self)?
        } else {
            serde_json::to_string_pretty(self)?
        };
        fs::write(path, content).with_context(|| format!("writing {}", path.display()))?;
        log::info!("config saved to {}", path.display());
        Ok(())
    }

    /// Checks the capture settings and turns them into a session. Runs before
    /// any side effect so a bad config never writes a file or sends a key.
    pub fn capture_session(&self) -> Result<CaptureSession> {
        let region = self
            .region
            .ok_or_else(|| anyhow!("no region configured; run `pick --save` or pass --region"))?;
        if self.pages == 0 {
            bail!("pages must be at least 1");
        }
        let key = parse_key(&self.page_key)
            .ok_or_else(|| anyhow!("unknown page key {:?}", self.page_key))?;

        Ok(CaptureSession {
            region,
            pages: self.pages,
            key,
            wait: Duration::from_millis(self.wait_ms),
            start_delay: Duration::from_millis(self.start_delay_ms),
            output_dir: self.output_dir.clone(),
        })
    }
}

fn is_toml(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let config = AppConfig::load(&tmp.path().join("config.json")).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn partial_json_keeps_defaults_for_absent_fields() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.json");
        fs::write(
            &path,
            r#"{ "region": { "left": -1200, "top": 40, "width": 800, "height": 900 }, "pages": 3 }"#,
        )
        .unwrap();

        let config = AppConfig::load(&path).unwrap();
        assert_eq!(config.region, Some(Region::new(-1200, 40, 800, 900)));
        assert_eq!(config.pages, 3);
        assert_eq!(config.page_key, "pagedown");
        assert_eq!(config.wait_ms, 1500);
    }

    #[test]
    fn toml_extension_selects_toml() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("capture.toml");
        fs::write(
            &path,
            "pages = 12\npage_key = \"right\"\n\n[region]\nleft = 0\ntop = 0\nwidth = 640\nheight = 480\n",
        )
        .unwrap();

        let config = AppConfig::load(&path).unwrap();
        assert_eq!(config.pages, 12);
        assert_eq!(config.region, Some(Region::new(0, 0, 640, 480)));

        let session = config.capture_session().unwrap();
        assert_eq!(session.key, rdev::Key::RightArrow);
        assert_eq!(session.wait, Duration::from_millis(1500));
    }

    #[test]
    fn malformed_file_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.json");
        fs::write(&path, "{ \"pages\": \"many\" }").unwrap();
        assert!(AppConfig::load(&path).is_err());
    }

    #[test]
    fn saved_region_is_loaded_back() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.json");
        let config = AppConfig {
            region: Some(Region::new(-640, -20, 320, 240)),
            ..AppConfig::default()
        };
        config.save(&path).unwrap();
        assert_eq!(AppConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn capture_session_rejects_incomplete_settings() {
        let no_region = AppConfig::default();
        assert!(no_region.capture_session().is_err());

        let region = Some(Region::new(0, 0, 10, 10));
        let zero_pages = AppConfig {
            region,
            pages: 0,
            ..AppConfig::default()
        };
        assert!(zero_pages.capture_session().is_err());

        let bad_key = AppConfig {
            region,
            page_key: "hyper".into(),
            ..AppConfig::default()
        };
        let err = bad_key.capture_session().unwrap_err();
        assert!(err.to_string().contains("hyper"));
    }
}
