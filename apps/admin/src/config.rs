use std::{fs, io, num::NonZeroUsize, path::Path};

use anyhow::{anyhow, bail, Context};
use serde::Deserialize;
use shared::domain::{Physician, Resource, Specialty};
use url::Url;

pub const DEFAULT_CONFIG_PATH: &str = "admin.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub api_base_url: String,
    pub specialties_path: String,
    pub physicians_path: String,
    pub page_size: NonZeroUsize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8080".into(),
            specialties_path: Specialty::DEFAULT_PATH.into(),
            physicians_path: Physician::DEFAULT_PATH.into(),
            page_size: NonZeroUsize::new(10).unwrap_or(NonZeroUsize::MIN),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileSettings {
    api_base_url: Option<String>,
    specialties_path: Option<String>,
    physicians_path: Option<String>,
    page_size: Option<usize>,
}

/// Defaults, then the TOML file at `path` if present, then environment.
pub fn load_settings(path: &Path) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    match fs::read_to_string(path) {
        Ok(raw) => {
            let file_cfg: FileSettings = toml::from_str(&raw)
                .with_context(|| format!("failed to parse config file '{}'", path.display()))?;
            apply_file(&mut settings, file_cfg)?;
        }
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(err) => {
            return Err(err)
                .with_context(|| format!("failed to read config file '{}'", path.display()))
        }
    }

    apply_env(&mut settings, |key| std::env::var(key).ok())?;
    Ok(settings)
}

fn apply_file(settings: &mut Settings, file_cfg: FileSettings) -> anyhow::Result<()> {
    if let Some(v) = file_cfg.api_base_url {
        settings.api_base_url = v;
    }
    if let Some(v) = file_cfg.specialties_path {
        settings.specialties_path = v;
    }
    if let Some(v) = file_cfg.physicians_path {
        settings.physicians_path = v;
    }
    if let Some(v) = file_cfg.page_size {
        settings.page_size =
            NonZeroUsize::new(v).ok_or_else(|| anyhow!("page_size must be greater than 0"))?;
    }
    Ok(())
}

fn apply_env(
    settings: &mut Settings,
    var: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<()> {
    if let Some(v) = var("ADMIN_API_BASE_URL") {
        settings.api_base_url = v;
    }
    if let Some(v) = var("APP__API_BASE_URL") {
        settings.api_base_url = v;
    }

    if let Some(v) = var("APP__SPECIALTIES_PATH") {
        settings.specialties_path = v;
    }
    if let Some(v) = var("APP__PHYSICIANS_PATH") {
        settings.physicians_path = v;
    }

    if let Some(v) = var("APP__PAGE_SIZE") {
        let parsed: usize = v
            .trim()
            .parse()
            .with_context(|| format!("APP__PAGE_SIZE is not a number: '{v}'"))?;
        settings.page_size = NonZeroUsize::new(parsed)
            .ok_or_else(|| anyhow!("APP__PAGE_SIZE must be greater than 0"))?;
    }
    Ok(())
}

/// Joins a resource path onto the API base, e.g.
/// `http://host:8080` + `/api/v1/physicians`.
pub fn resource_url(api_base_url: &str, path: &str) -> anyhow::Result<Url> {
    let base = api_base_url.trim();
    if base.is_empty() {
        bail!("api_base_url must not be empty");
    }
    let base = Url::parse(&format!("{}/", base.trim_end_matches('/')))
        .with_context(|| format!("invalid api_base_url '{api_base_url}'"))?;
    if base.cannot_be_a_base() {
        bail!("api_base_url '{api_base_url}' cannot be used as a base");
    }
    base.join(path.trim().trim_start_matches('/'))
        .with_context(|| format!("invalid resource path '{path}'"))
}
