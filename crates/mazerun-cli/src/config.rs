//! Run configuration – reads/writes `~/.mazerun/config.toml`.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use mazerun_runtime::{GuideKind, WalkerCalibration};
use serde::{Deserialize, Serialize};

/// Persisted user configuration stored in `~/.mazerun/config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Control loop period in milliseconds.
    #[serde(default = "default_tick_period_ms")]
    pub tick_period_ms: u64,

    /// Decision policy used at intersections.
    #[serde(default)]
    pub guide: GuideKind,

    /// Platform calibration.  Missing keys fall back to the stock values.
    #[serde(default)]
    pub calibration: WalkerCalibration,
}

fn default_tick_period_ms() -> u64 {
    80
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tick_period_ms: default_tick_period_ms(),
            guide: GuideKind::default(),
            calibration: WalkerCalibration::default(),
        }
    }
}

impl Config {
    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.tick_period_ms)
    }
}

/// Return the path to `~/.mazerun/config.toml`.
pub fn config_path() -> PathBuf {
    config_path_for_home(
        &std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .unwrap_or_else(|_| ".".to_string()),
    )
}

pub(crate) fn config_path_for_home(home: &str) -> PathBuf {
    PathBuf::from(home).join(".mazerun").join("config.toml")
}

/// Load the config from disk.  Returns `None` if the file does not exist.
///
/// Environment overrides are not applied here; see [`apply_env_overrides`].
pub fn load() -> Result<Option<Config>, String> {
    load_from(&config_path())
}

pub(crate) fn load_from(path: &Path) -> Result<Option<Config>, String> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config at {}: {}", path.display(), e))?;
    let cfg: Config =
        toml::from_str(&raw).map_err(|e| format!("Failed to parse config: {}", e))?;
    Ok(Some(cfg))
}

/// Apply `MAZERUN_*` environment variable overrides to `cfg`.
///
/// | Variable | Config field |
/// |---|---|
/// | `MAZERUN_TICK_MS` | `tick_period_ms` |
/// | `MAZERUN_GUIDE` | `guide` |
/// | `MAZERUN_CRUISE_SPEED` | `calibration.cruise_speed` |
///
/// Values that do not parse are ignored.
pub fn apply_env_overrides(cfg: &mut Config) {
    if let Ok(v) = std::env::var("MAZERUN_TICK_MS")
        && let Ok(ms) = v.parse::<u64>()
        && ms > 0
    {
        cfg.tick_period_ms = ms;
    }
    if let Ok(v) = std::env::var("MAZERUN_GUIDE")
        && let Ok(kind) = v.parse::<GuideKind>()
    {
        cfg.guide = kind;
    }
    if let Ok(v) = std::env::var("MAZERUN_CRUISE_SPEED")
        && let Ok(speed) = v.parse::<i32>()
    {
        cfg.calibration.cruise_speed = speed;
    }
}

/// Save the config to disk, creating `~/.mazerun/` if necessary.
pub fn save(cfg: &Config) -> Result<(), String> {
    save_to(cfg, &config_path())
}

pub(crate) fn save_to(cfg: &Config, path: &Path) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| format!("Failed to create config directory: {}", e))?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(parent, fs::Permissions::from_mode(0o700))
                .map_err(|e| format!("Failed to set config directory permissions: {}", e))?;
        }
    }
    let raw =
        toml::to_string_pretty(cfg).map_err(|e| format!("Failed to serialize config: {}", e))?;
    #[cfg(unix)]
    {
        use std::io::Write;
        use std::os::unix::fs::OpenOptionsExt;
        fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(0o600)
            .open(path)
            .and_then(|mut f| f.write_all(raw.as_bytes()))
            .map_err(|e| format!("Failed to write config at {}: {}", path.display(), e))?;
    }
    #[cfg(not(unix))]
    fs::write(path, raw)
        .map_err(|e| format!("Failed to write config at {}: {}", path.display(), e))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(unix)]
    #[test]
    fn config_file_has_restrictive_permissions() {
        use std::os::unix::fs::PermissionsExt;
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = config_path_for_home(&dir.path().to_string_lossy());

        save_to(&Config::default(), &path).expect("save");

        let file_mode = std::fs::metadata(&path).expect("file metadata").permissions().mode() & 0o777;
        assert_eq!(file_mode, 0o600);

        let dir_meta = std::fs::metadata(path.parent().unwrap()).expect("dir metadata");
        assert_eq!(dir_meta.permissions().mode() & 0o777, 0o700);
    }

    #[test]
    fn roundtrip_custom_config() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = config_path_for_home(&dir.path().to_string_lossy());

        let mut cfg = Config::default();
        cfg.guide = GuideKind::RightHand;
        cfg.calibration.quarter_turn_ms = 1900;
        save_to(&cfg, &path).expect("save");

        let loaded = load_from(&path).expect("load ok").expect("some");
        assert_eq!(loaded.guide, GuideKind::RightHand);
        assert_eq!(loaded.calibration.quarter_turn_ms, 1900);
        assert_eq!(loaded.tick_period(), Duration::from_millis(80));
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "guide = \"straight\"\n\n[calibration]\ndeadband = 40\n").unwrap();

        let loaded = load_from(&path).expect("load ok").expect("some");
        assert_eq!(loaded.guide, GuideKind::Straight);
        assert_eq!(loaded.calibration.deadband, 40);
        assert_eq!(loaded.calibration.cruise_speed, 500);
        assert_eq!(loaded.tick_period_ms, 80);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "guide = \"left-hand\"\n").unwrap();
        assert!(load_from(&path).is_err());
    }

    #[test]
    fn config_path_points_to_mazerun_dir() {
        let p = config_path_for_home("/home/testuser");
        assert!(p.to_string_lossy().contains(".mazerun"));
        assert!(p.to_string_lossy().ends_with("config.toml"));
    }

    #[test]
    fn load_from_returns_none_when_missing() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = config_path_for_home(&dir.path().to_string_lossy());
        assert!(load_from(&path).expect("no error").is_none());
    }

    // The override tests share one process environment, so they run as a
    // single test.
    #[test]
    fn apply_env_overrides_reads_mazerun_vars() {
        // SAFETY: no other test touches these variables.
        unsafe {
            std::env::set_var("MAZERUN_TICK_MS", "40");
            std::env::set_var("MAZERUN_GUIDE", "right-hand");
            std::env::set_var("MAZERUN_CRUISE_SPEED", "320");
        }
        let mut cfg = Config::default();
        apply_env_overrides(&mut cfg);
        assert_eq!(cfg.tick_period_ms, 40);
        assert_eq!(cfg.guide, GuideKind::RightHand);
        assert_eq!(cfg.calibration.cruise_speed, 320);

        unsafe {
            std::env::set_var("MAZERUN_TICK_MS", "fast");
            std::env::set_var("MAZERUN_GUIDE", "left-hand");
            std::env::set_var("MAZERUN_CRUISE_SPEED", "");
        }
        let mut cfg = Config::default();
        apply_env_overrides(&mut cfg);
        assert_eq!(cfg, Config::default());

        unsafe {
            std::env::remove_var("MAZERUN_TICK_MS");
            std::env::remove_var("MAZERUN_GUIDE");
            std::env::remove_var("MAZERUN_CRUISE_SPEED");
        }
    }
}
