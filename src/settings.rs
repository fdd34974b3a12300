use anyhow::{bail, Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::{
    env, fs,
    path::{Path, PathBuf},
    sync::RwLock,
    time::Duration,
};

pub const SETTINGS_FILE: &str = "settings.json";
const DEBUG_TICK_INTERVAL_MS: u64 = 100;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    pub tick_interval_ms: u64,
    pub database_file: String,
    pub default_interval_ms: u64,
    pub default_target_intervals: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tick_interval_ms: 1000,
            database_file: "pomo.sqlite3".into(),
            default_interval_ms: 25 * 60 * 1000,
            default_target_intervals: 4,
        }
    }
}

impl Settings {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms.max(1))
    }
}

/// `POMO_HOME`, else the platform data directory, else `~/.pomo`.
pub fn data_dir() -> Result<PathBuf> {
    resolve_data_dir(
        env::var_os("POMO_HOME").map(PathBuf::from),
        dirs::data_dir(),
        dirs::home_dir(),
    )
}

fn resolve_data_dir(
    explicit: Option<PathBuf>,
    platform: Option<PathBuf>,
    home: Option<PathBuf>,
) -> Result<PathBuf> {
    if let Some(dir) = explicit.filter(|dir| !dir.as_os_str().is_empty()) {
        return Ok(dir);
    }
    if let Some(dir) = platform {
        return Ok(dir.join("pomo"));
    }
    match home {
        Some(home) => Ok(home.join(".pomo")),
        None => bail!("no data directory found; set POMO_HOME or pass --home"),
    }
}

fn debug_mode() -> bool {
    env::var("POMO_DEBUG")
        .map(|value| value == "1" || value.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

fn with_overrides(mut settings: Settings, debug: bool) -> Settings {
    if debug {
        settings.tick_interval_ms = DEBUG_TICK_INTERVAL_MS;
    }
    settings
}

pub struct SettingsStore {
    path: PathBuf,
    data: RwLock<Settings>,
}

impl SettingsStore {
    pub fn new(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            serde_json::from_str(&contents).unwrap_or_else(|err| {
                warn!("Ignoring malformed settings in {}: {err}", path.display());
                Settings::default()
            })
        } else {
            Settings::default()
        };

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Settings as stored on disk, without environment overrides.
    pub fn stored(&self) -> Settings {
        match self.data.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Current settings with environment overrides applied.
    pub fn current(&self) -> Settings {
        with_overrides(self.stored(), debug_mode())
    }

    pub fn database_path(&self) -> PathBuf {
        let file = self.current().database_file;
        match self.path.parent() {
            Some(dir) => dir.join(file),
            None => PathBuf::from(file),
        }
    }

    pub fn update(&self, settings: Settings) -> Result<()> {
        let mut guard = match self.data.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        self.persist(&settings)?;
        *guard = settings;
        Ok(())
    }

    fn persist(&self, data: &Settings) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create {}", dir.display()))?;
        }
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write settings to {}", self.path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::new(dir.path().join(SETTINGS_FILE)).unwrap();
        let settings = store.current();

        assert_eq!(settings.database_file, "pomo.sqlite3");
        assert_eq!(settings.default_target_intervals, 4);
        assert_eq!(store.database_path(), dir.path().join("pomo.sqlite3"));
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SETTINGS_FILE);
        fs::write(&path, r#"{ "defaultIntervalMs": 1500, "databaseFile": "alt.db" }"#).unwrap();

        let settings = SettingsStore::new(path).unwrap().current();
        assert_eq!(settings.default_interval_ms, 1500);
        assert_eq!(settings.database_file, "alt.db");
        assert_eq!(settings.default_target_intervals, 4);
    }

    #[test]
    fn malformed_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SETTINGS_FILE);
        fs::write(&path, "not json").unwrap();

        let store = SettingsStore::new(path).unwrap();
        assert_eq!(store.current().database_file, Settings::default().database_file);
    }

    #[test]
    fn update_persists_to_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("conf").join(SETTINGS_FILE);
        let store = SettingsStore::new(path.clone()).unwrap();

        let mut settings = store.stored();
        settings.default_target_intervals = 6;
        store.update(settings).unwrap();

        let reloaded = SettingsStore::new(path).unwrap();
        assert_eq!(reloaded.current().default_target_intervals, 6);
    }

    #[test]
    fn debug_mode_speeds_up_ticks() {
        let settings = with_overrides(Settings::default(), true);
        assert_eq!(settings.tick_interval(), Duration::from_millis(DEBUG_TICK_INTERVAL_MS));
        assert_eq!(with_overrides(Settings::default(), false).tick_interval_ms, 1000);
    }

    #[test]
    fn data_dir_prefers_override_then_platform_then_home() {
        let explicit = Some(PathBuf::from("/srv/pomo"));
        let platform = Some(PathBuf::from("/home/ana/.local/share"));
        let home = Some(PathBuf::from("/home/ana"));

        assert_eq!(
            resolve_data_dir(explicit, platform.clone(), home.clone()).unwrap(),
            PathBuf::from("/srv/pomo")
        );
        assert_eq!(
            resolve_data_dir(Some(PathBuf::new()), platform.clone(), home.clone()).unwrap(),
            PathBuf::from("/home/ana/.local/share/pomo")
        );
        assert_eq!(
            resolve_data_dir(None, None, home).unwrap(),
            PathBuf::from("/home/ana/.pomo")
        );
    }

    #[test]
    fn data_dir_without_any_base_is_an_error() {
        let err = resolve_data_dir(None, None, None).unwrap_err();
        assert!(err.to_string().contains("POMO_HOME"));
    }

    #[test]
    fn tick_interval_is_never_zero() {
        let settings = Settings {
            tick_interval_ms: 0,
            ..Settings::default()
        };
        assert_eq!(settings.tick_interval(), Duration::from_millis(1));
    }
}
