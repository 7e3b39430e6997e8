use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::Deserialize;
use shared::{
    catalog::{Catalog, CatalogError},
    domain::{EntityKind, Pose, Position},
    orientation::{Orientation, OrientationError, Rpy},
};
use thiserror::Error;
use url::Url;

pub const DEFAULT_SETTINGS_FILE: &str = "launcher.toml";

#[derive(Debug, Clone)]
pub struct Settings {
    pub api_base_url: String,
    pub api_prefix: String,
    pub request_timeout: Duration,
    pub poll_interval: Duration,
    pub catalog: Catalog,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:5000".into(),
            api_prefix: "/api/v1".into(),
            request_timeout: Duration::from_secs(30),
            poll_interval: Duration::from_secs(3),
            catalog: Catalog::builtin(),
        }
    }
}

impl Settings {
    /// Root of the versioned API, e.g. `http://localhost:5000/api/v1`.
    pub fn api_root(&self) -> String {
        let prefix = self.api_prefix.trim().trim_matches('/');
        if prefix.is_empty() {
            self.api_base_url.clone()
        } else {
            format!("{}/{prefix}", self.api_base_url)
        }
    }

    /// The health probe lives outside the versioned prefix.
    pub fn health_url(&self) -> String {
        format!("{}/health", self.api_base_url)
    }

    pub fn set_api_base_url(&mut self, raw: &str) -> Result<(), SettingsError> {
        self.api_base_url = normalize_base_url(raw)?;
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings file '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse settings file '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("invalid API base url '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("invalid value '{value}' for {name}: expected a positive number of seconds")]
    InvalidSeconds { name: String, value: String },
    #[error("invalid catalog entry '{key}': {reason}")]
    InvalidCatalogEntry { key: String, reason: String },
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    api_base_url: Option<String>,
    api_prefix: Option<String>,
    request_timeout_secs: Option<u64>,
    poll_interval_secs: Option<u64>,
    #[serde(default)]
    catalog: FileCatalog,
}

#[derive(Debug, Default, Deserialize)]
struct FileCatalog {
    #[serde(default)]
    objects: Vec<FileCatalogEntry>,
    #[serde(default)]
    environments: Vec<FileCatalogEntry>,
}

#[derive(Debug, Deserialize)]
struct FileCatalogEntry {
    key: String,
    #[serde(default)]
    position: [f64; 3],
    #[serde(default)]
    rpy: [f64; 3],
}

/// Defaults, then the settings file, then the process environment.
///
/// An explicit `path` must exist; without one, `launcher.toml` in the working
/// directory is used when present.
pub fn load_settings(path: Option<&Path>) -> Result<Settings, SettingsError> {
    load_settings_with_env(path, |name| std::env::var(name).ok())
}

pub fn load_settings_with_env(
    path: Option<&Path>,
    env: impl Fn(&str) -> Option<String>,
) -> Result<Settings, SettingsError> {
    let mut settings = Settings::default();

    let file_path = match path {
        Some(path) => Some(path.to_path_buf()),
        None => {
            let fallback = PathBuf::from(DEFAULT_SETTINGS_FILE);
            fallback.exists().then_some(fallback)
        }
    };
    if let Some(file_path) = file_path {
        let raw = fs::read_to_string(&file_path).map_err(|source| SettingsError::Read {
            path: file_path.clone(),
            source,
        })?;
        let file_cfg: FileSettings =
            toml::from_str(&raw).map_err(|source| SettingsError::Parse {
                path: file_path.clone(),
                source,
            })?;
        apply_file_settings(&mut settings, file_cfg)?;
    }

    if let Some(v) = env("SIM_API_URL") {
        settings.api_base_url = v;
    }
    if let Some(v) = env("APP__API_URL") {
        settings.api_base_url = v;
    }
    if let Some(v) = env("APP__API_PREFIX") {
        settings.api_prefix = v;
    }
    if let Some(v) = env("APP__REQUEST_TIMEOUT_SECS") {
        settings.request_timeout = parse_seconds("APP__REQUEST_TIMEOUT_SECS", &v)?;
    }
    if let Some(v) = env("APP__POLL_INTERVAL_SECS") {
        settings.poll_interval = parse_seconds("APP__POLL_INTERVAL_SECS", &v)?;
    }

    settings.api_base_url = normalize_base_url(&settings.api_base_url)?;
    Ok(settings)
}

fn apply_file_settings(settings: &mut Settings, file_cfg: FileSettings) -> Result<(), SettingsError> {
    if let Some(v) = file_cfg.api_base_url {
        settings.api_base_url = v;
    }
    if let Some(v) = file_cfg.api_prefix {
        settings.api_prefix = v;
    }
    if let Some(v) = file_cfg.request_timeout_secs {
        settings.request_timeout = positive_seconds("request_timeout_secs", v)?;
    }
    if let Some(v) = file_cfg.poll_interval_secs {
        settings.poll_interval = positive_seconds("poll_interval_secs", v)?;
    }

    let entries = file_cfg
        .catalog
        .objects
        .into_iter()
        .map(|entry| (EntityKind::Object, entry))
        .chain(
            file_cfg
                .catalog
                .environments
                .into_iter()
                .map(|entry| (EntityKind::Environment, entry)),
        );
    for (kind, entry) in entries {
        let pose = catalog_pose(&entry).map_err(|err| SettingsError::InvalidCatalogEntry {
            key: entry.key.clone(),
            reason: err.to_string(),
        })?;
        settings
            .catalog
            .insert(kind, &entry.key, pose)
            .map_err(|err: CatalogError| SettingsError::InvalidCatalogEntry {
                key: entry.key.clone(),
                reason: err.to_string(),
            })?;
    }
    Ok(())
}

fn catalog_pose(entry: &FileCatalogEntry) -> Result<Pose, OrientationError> {
    let [x, y, z] = entry.position;
    let position = Position::new(x, y, z);
    if !position.is_finite() {
        return Err(OrientationError::NonFinite);
    }
    let [roll, pitch, yaw] = entry.rpy;
    let orientation = Orientation::from_rpy(Rpy::new(roll, pitch, yaw))?;
    Ok(Pose::new(position, orientation))
}

fn parse_seconds(name: &str, raw: &str) -> Result<Duration, SettingsError> {
    let secs = raw
        .trim()
        .parse::<u64>()
        .map_err(|_| SettingsError::InvalidSeconds {
            name: name.to_string(),
            value: raw.to_string(),
        })?;
    positive_seconds(name, secs)
}

fn positive_seconds(name: &str, secs: u64) -> Result<Duration, SettingsError> {
    if secs == 0 {
        return Err(SettingsError::InvalidSeconds {
            name: name.to_string(),
            value: secs.to_string(),
        });
    }
    Ok(Duration::from_secs(secs))
}

fn normalize_base_url(raw: &str) -> Result<String, SettingsError> {
    let trimmed = raw.trim().trim_end_matches('/');
    let parsed = Url::parse(trimmed).map_err(|err| SettingsError::InvalidUrl {
        url: raw.to_string(),
        reason: err.to_string(),
    })?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(SettingsError::InvalidUrl {
            url: raw.to_string(),
            reason: format!("unsupported scheme '{}'", parsed.scheme()),
        });
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use std::{
        collections::HashMap,
        env,
        time::{SystemTime, UNIX_EPOCH},
    };

    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    fn temp_settings_file(contents: &str) -> PathBuf {
        let suffix = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos();
        let path = env::temp_dir().join(format!("sim_launcher_settings_{suffix}.toml"));
        fs::write(&path, contents).expect("write settings");
        path
    }

    #[test]
    fn defaults_point_at_local_service() {
        let settings = Settings::default();
        assert_eq!(settings.api_root(), "http://localhost:5000/api/v1");
        assert_eq!(settings.health_url(), "http://localhost:5000/health");
        assert_eq!(settings.request_timeout, Duration::from_secs(30));
        assert_eq!(settings.poll_interval, Duration::from_secs(3));
    }

    #[test]
    fn env_overrides_file_values() {
        let path = temp_settings_file(
            r#"
api_base_url = "http://sim.local:8000/"
poll_interval_secs = 5
"#,
        );
        let vars: HashMap<&str, &str> = [
            ("APP__API_URL", "http://override:9000"),
            ("APP__REQUEST_TIMEOUT_SECS", "10"),
        ]
        .into_iter()
        .collect();

        let settings = load_settings_with_env(Some(&path), |name| {
            vars.get(name).map(|v| v.to_string())
        })
        .expect("settings");

        assert_eq!(settings.api_base_url, "http://override:9000");
        assert_eq!(settings.poll_interval, Duration::from_secs(5));
        assert_eq!(settings.request_timeout, Duration::from_secs(10));
        fs::remove_file(path).expect("cleanup");
    }

    #[test]
    fn file_catalog_entries_extend_builtin() {
        let path = temp_settings_file(
            r#"
[[catalog.objects]]
key = "pallet"
position = [3.0, 4.0, 0.1]
rpy = [0.0, 0.0, 1.57]
"#,
        );
        let settings = load_settings_with_env(Some(&path), no_env).expect("settings");

        let entry = settings
            .catalog
            .resolve(EntityKind::Object, "pallet")
            .expect("pallet");
        assert_eq!(entry.default_pose.position, Position::new(3.0, 4.0, 0.1));
        assert!(settings.catalog.contains(EntityKind::Object, "box_mini"));
        fs::remove_file(path).expect("cleanup");
    }

    #[test]
    fn trailing_slash_and_prefix_are_normalized() {
        let mut settings = Settings::default();
        settings.set_api_base_url("https://sim.example.com/").expect("url");
        settings.api_prefix = "api/v2/".into();
        assert_eq!(settings.api_root(), "https://sim.example.com/api/v2");
    }

    #[test]
    fn rejects_bad_url_and_zero_interval() {
        let err = load_settings_with_env(None, |name| {
            (name == "SIM_API_URL").then(|| "not a url".to_string())
        })
        .expect_err("bad url");
        assert!(matches!(err, SettingsError::InvalidUrl { .. }));

        let err = load_settings_with_env(None, |name| {
            (name == "APP__POLL_INTERVAL_SECS").then(|| "0".to_string())
        })
        .expect_err("zero interval");
        assert!(matches!(err, SettingsError::InvalidSeconds { .. }));
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let path = env::temp_dir().join("sim_launcher_settings_does_not_exist.toml");
        let err = load_settings_with_env(Some(&path), no_env).expect_err("missing");
        assert!(matches!(err, SettingsError::Read { .. }));
    }
}
