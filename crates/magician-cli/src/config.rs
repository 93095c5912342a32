//! Configuration – reads/writes `~/.magician/config.toml`.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use magician_pose::yaw_to_quaternion;
use magician_types::{MoveType, Pose, Position};

/// Where the arm base sits in the world frame: metres plus yaw in radians.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Mounting {
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default)]
    pub z: f64,
    #[serde(default)]
    pub yaw: f64,
}

impl Mounting {
    pub fn to_pose(self) -> Pose {
        Pose::new(Position::new(self.x, self.y, self.z), yaw_to_quaternion(self.yaw))
    }
}

/// Persisted user configuration stored in `~/.magician/config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Identifier the robot object is registered under.
    #[serde(default = "default_robot_id")]
    pub robot_id: String,

    /// Serial device to use instead of scanning the bus (e.g. `/dev/ttyUSB0`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<String>,

    /// Pose of the arm base in the world frame.
    #[serde(default)]
    pub mounting: Mounting,

    /// Default velocity for `/move`, percent.
    #[serde(default = "default_percent")]
    pub velocity: f64,

    /// Default acceleration for `/move`, percent.
    #[serde(default = "default_percent")]
    pub acceleration: f64,

    /// Default motion type for `/move`.
    #[serde(default = "default_move_type")]
    pub move_type: MoveType,
}

fn default_robot_id() -> String {
    "dobot".to_string()
}
fn default_percent() -> f64 {
    50.0
}
fn default_move_type() -> MoveType {
    MoveType::Jump
}

impl Default for Config {
    fn default() -> Self {
        Self {
            robot_id: default_robot_id(),
            port: None,
            mounting: Mounting::default(),
            velocity: default_percent(),
            acceleration: default_percent(),
            move_type: default_move_type(),
        }
    }
}

/// Return the path to `~/.magician/config.toml`.
pub fn config_path() -> PathBuf {
    config_path_for_home(
        &std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .unwrap_or_else(|_| ".".to_string()),
    )
}

pub(crate) fn config_path_for_home(home: &str) -> PathBuf {
    PathBuf::from(home).join(".magician").join("config.toml")
}

/// Load the config from disk.  Returns `None` if the file does not exist.
///
/// The result is the file as written; callers apply [`apply_env_overrides`]
/// to whichever config they end up using.
pub fn load() -> Result<Option<Config>, String> {
    load_from(&config_path())
}

pub(crate) fn load_from(path: &PathBuf) -> Result<Option<Config>, String> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config at {}: {}", path.display(), e))?;
    let cfg: Config =
        toml::from_str(&raw).map_err(|e| format!("Failed to parse config: {}", e))?;
    Ok(Some(cfg))
}

/// Apply `MAGICIAN_*` environment variable overrides to `cfg`.
///
/// | Variable | Config field |
/// |---|---|
/// | `MAGICIAN_ROBOT_ID` | `robot_id` |
/// | `MAGICIAN_PORT` | `port` |
/// | `MAGICIAN_VELOCITY` | `velocity` |
/// | `MAGICIAN_ACCELERATION` | `acceleration` |
pub fn apply_env_overrides(cfg: &mut Config) {
    apply_overrides(cfg, |key| std::env::var(key).ok());
}

pub(crate) fn apply_overrides(cfg: &mut Config, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(v) = lookup("MAGICIAN_ROBOT_ID") {
        cfg.robot_id = v;
    }
    if let Some(v) = lookup("MAGICIAN_PORT") {
        cfg.port = if v.is_empty() { None } else { Some(v) };
    }
    if let Some(v) = lookup("MAGICIAN_VELOCITY")
        && let Ok(pct) = v.parse::<f64>()
    {
        cfg.velocity = pct;
    }
    if let Some(v) = lookup("MAGICIAN_ACCELERATION")
        && let Ok(pct) = v.parse::<f64>()
    {
        cfg.acceleration = pct;
    }
}

/// Save the config to disk, creating `~/.magician/` if necessary.
pub fn save(cfg: &Config) -> Result<(), String> {
    save_to(cfg, &config_path())
}

pub(crate) fn save_to(cfg: &Config, path: &PathBuf) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| format!("Failed to create config directory: {}", e))?;
    }
    let raw =
        toml::to_string_pretty(cfg).map_err(|e| format!("Failed to serialize config: {}", e))?;
    fs::write(path, raw)
        .map_err(|e| format!("Failed to write config at {}: {}", path.display(), e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn roundtrip_default_config() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = config_path_for_home(&dir.path().to_string_lossy());

        let cfg = Config::default();
        save_to(&cfg, &path).expect("save");

        let loaded = load_from(&path).expect("load ok").expect("some");
        assert_eq!(loaded.robot_id, "dobot");
        assert_eq!(loaded.port, None);
        assert_eq!(loaded.move_type, MoveType::Jump);
        assert!((loaded.velocity - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = config_path_for_home(&dir.path().to_string_lossy());
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(
            &path,
            "port = \"/dev/ttyUSB0\"\nmove_type = \"LINEAR\"\n\n[mounting]\nx = 0.5\nyaw = 1.0\n",
        )
        .unwrap();

        let loaded = load_from(&path).expect("load ok").expect("some");
        assert_eq!(loaded.port.as_deref(), Some("/dev/ttyUSB0"));
        assert_eq!(loaded.move_type, MoveType::Linear);
        assert_eq!(
            loaded.mounting,
            Mounting {
                x: 0.5,
                y: 0.0,
                z: 0.0,
                yaw: 1.0
            }
        );
        assert!((loaded.acceleration - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = config_path_for_home(&dir.path().to_string_lossy());
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "velocity = \"fast\"").unwrap();
        let err = load_from(&path).unwrap_err();
        assert!(err.contains("Failed to parse config"));
    }

    #[test]
    fn mounting_to_pose_applies_yaw() {
        let pose = Mounting {
            x: 1.0,
            y: 2.0,
            z: 0.5,
            yaw: std::f64::consts::FRAC_PI_2,
        }
        .to_pose();
        assert_eq!(pose.position, Position::new(1.0, 2.0, 0.5));
        assert!((pose.orientation.z - std::f64::consts::FRAC_1_SQRT_2).abs() < 1e-12);
    }

    #[test]
    fn config_path_points_to_magician_dir() {
        let p = config_path_for_home("/home/testuser");
        assert!(p.to_string_lossy().contains(".magician"));
        assert!(p.to_string_lossy().ends_with("config.toml"));
    }

    #[test]
    fn load_from_returns_none_when_missing() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = config_path_for_home(&dir.path().to_string_lossy());
        let result = load_from(&path).expect("no error");
        assert!(result.is_none());
    }

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn apply_env_overrides_changes_port() {
        // SAFETY: no other test touches MAGICIAN_PORT in the real environment.
        unsafe { std::env::set_var("MAGICIAN_PORT", "/dev/dobot") };
        let mut cfg = Config::default();
        apply_env_overrides(&mut cfg);
        assert_eq!(cfg.port.as_deref(), Some("/dev/dobot"));
        unsafe { std::env::remove_var("MAGICIAN_PORT") };
    }

    #[test]
    fn overrides_apply_when_no_config_file_exists() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = config_path_for_home(&dir.path().to_string_lossy());
        let loaded = load_from(&path).expect("no error");
        assert!(loaded.is_none());

        let mut cfg = loaded.unwrap_or_default();
        apply_overrides(
            &mut cfg,
            vars(&[("MAGICIAN_ROBOT_ID", "left_arm"), ("MAGICIAN_PORT", "COM4")]),
        );
        assert_eq!(cfg.robot_id, "left_arm");
        assert_eq!(cfg.port.as_deref(), Some("COM4"));
    }

    #[test]
    fn overrides_replace_file_values() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = config_path_for_home(&dir.path().to_string_lossy());
        let saved = Config {
            robot_id: "bench".to_string(),
            port: Some("/dev/ttyUSB0".to_string()),
            ..Config::default()
        };
        save_to(&saved, &path).expect("save");

        let mut cfg = load_from(&path).expect("load ok").expect("some");
        apply_overrides(&mut cfg, vars(&[("MAGICIAN_PORT", "")]));
        assert_eq!(cfg.robot_id, "bench");
        assert_eq!(cfg.port, None);
    }

    #[test]
    fn invalid_velocity_override_is_ignored() {
        let mut cfg = Config::default();
        apply_overrides(&mut cfg, vars(&[("MAGICIAN_VELOCITY", "fast")]));
        assert!((cfg.velocity - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn acceleration_override_is_parsed() {
        let mut cfg = Config::default();
        apply_overrides(&mut cfg, vars(&[("MAGICIAN_ACCELERATION", "75")]));
        assert!((cfg.acceleration - 75.0).abs() < f64::EPSILON);
    }
}
