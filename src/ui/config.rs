use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use vts_dashboard::DashboardError;
use vts_dashboard::session::{
    HEAT_DURATION_S, HISTORY_CAPACITY, INITIAL_ENERGY_AH, SAMPLE_INTERVAL_S, SessionSettings,
};
use vts_dashboard::telemetry::producer::DEFAULT_BAUD_RATE;

use super::REFRESH_RATE_MS;

const CONFIG_DIR_NAME: &str = "vts-dashboard";
const CONFIG_FILE_NAME: &str = "config.json";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub(crate) struct AppConfig {
    pub(crate) refresh_rate_ms: u64,
    pub(crate) port_name: Option<String>,
    pub(crate) baud_rate: u32,
    pub(crate) heat_duration_s: u32,
    pub(crate) initial_energy_ah: f32,
    pub(crate) sample_interval_s: u32,
    pub(crate) history_capacity: usize,
    pub(crate) dark_mode: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            refresh_rate_ms: REFRESH_RATE_MS,
            port_name: None,
            baud_rate: DEFAULT_BAUD_RATE,
            heat_duration_s: HEAT_DURATION_S,
            initial_energy_ah: INITIAL_ENERGY_AH,
            sample_interval_s: SAMPLE_INTERVAL_S,
            history_capacity: HISTORY_CAPACITY,
            dark_mode: true,
        }
    }
}

impl AppConfig {
    fn local_path() -> Option<PathBuf> {
        Some(
            dirs::config_dir()?
                .join(CONFIG_DIR_NAME)
                .join(CONFIG_FILE_NAME),
        )
    }

    pub(crate) fn from_local_file() -> Result<Option<Self>, DashboardError> {
        match Self::local_path() {
            Some(path) => Self::from_path(&path),
            None => Ok(None),
        }
    }

    pub(crate) fn from_path(config_path: &Path) -> Result<Option<Self>, DashboardError> {
        if !config_path.exists() {
            return Ok(None);
        }
        let file = std::fs::File::open(config_path)
            .map_err(|e| DashboardError::ConfigIOError { source: e })?;
        serde_json::from_reader(file)
            .map(Some)
            .map_err(|e| DashboardError::ConfigSerializeError { source: e })
    }

    pub(crate) fn save(&self) -> Result<(), DashboardError> {
        let config_path = Self::local_path().ok_or(DashboardError::NoConfigDir)?;
        self.save_to(&config_path)
    }

    pub(crate) fn save_to(&self, config_path: &Path) -> Result<(), DashboardError> {
        if let Some(parent) = config_path.parent()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent)
                .map_err(|e| DashboardError::ConfigIOError { source: e })?;
        }

        let file = std::fs::File::create(config_path)
            .map_err(|e| DashboardError::ConfigIOError { source: e })?;
        serde_json::to_writer_pretty(file, self)
            .map_err(|e| DashboardError::ConfigSerializeError { source: e })
    }

    pub(crate) fn session_settings(&self) -> SessionSettings {
        SessionSettings {
            heat_duration_s: self.heat_duration_s,
            initial_energy_ah: self.initial_energy_ah,
            sample_interval_s: self.sample_interval_s,
            history_capacity: self.history_capacity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vts_dashboard::SessionState;
    use vts_dashboard::session::MAX_HISTORY_CAPACITY;

    #[test]
    fn test_missing_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::from_path(&dir.path().join(CONFIG_FILE_NAME)).unwrap();
        assert!(config.is_none());
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(CONFIG_FILE_NAME);
        let config = AppConfig {
            port_name: Some("/dev/ttyUSB0".to_string()),
            baud_rate: 115200,
            dark_mode: false,
            ..Default::default()
        };
        config.save_to(&path).unwrap();

        let loaded = AppConfig::from_path(&path).unwrap().unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, r#"{"baud_rate": 57600, "heat_duration_s": 600}"#).unwrap();

        let loaded = AppConfig::from_path(&path).unwrap().unwrap();
        assert_eq!(loaded.baud_rate, 57600);
        assert_eq!(loaded.heat_duration_s, 600);
        assert_eq!(loaded.initial_energy_ah, INITIAL_ENERGY_AH);
        assert!(loaded.dark_mode);
        assert_eq!(loaded.session_settings().heat_duration_s, 600);
    }

    #[test]
    fn test_oversized_config_values_are_clamped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(
            &path,
            format!(
                r#"{{"history_capacity": {}, "sample_interval_s": {}}}"#,
                u64::MAX,
                u32::MAX
            ),
        )
        .unwrap();

        let loaded = AppConfig::from_path(&path).unwrap().unwrap();
        let session = SessionState::new(loaded.session_settings());
        assert_eq!(session.history().capacity(), MAX_HISTORY_CAPACITY);
    }

    #[test]
    fn test_corrupt_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "not json").unwrap();
        assert!(matches!(
            AppConfig::from_path(&path),
            Err(DashboardError::ConfigSerializeError { .. })
        ));
    }
}
