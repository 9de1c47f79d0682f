use super::{
    device::DeviceConfig,
    launch::{LaunchConfig, LaunchLogLevel},
    memory::{MemoryConfig, MemoryLogLevel},
};
use std::sync::Arc;

/// Static mutex holding the global configuration, initialized as `None`.
static CUBEFOLD_GLOBAL_CONFIG: spin::Mutex<Option<Arc<GlobalConfig>>> = spin::Mutex::new(None);

/// Represents the global configuration for cubefold, combining logging and device settings.
#[derive(Default, Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct GlobalConfig {
    /// Configuration for logging kernel launches.
    #[serde(default)]
    pub launch: LaunchConfig,

    /// Configuration for logging allocations.
    #[serde(default)]
    pub memory: MemoryConfig,

    /// Overrides of the device limits.
    #[serde(default)]
    pub device: DeviceConfig,
}

impl GlobalConfig {
    /// Retrieves the current global configuration, loading it from the current directory if not set.
    ///
    /// If no configuration is set, it attempts to load one from `cubefold.toml` or `CubeFold.toml`
    /// in the current directory or its parents. If no file is found, a default configuration is used.
    /// Environment variables are applied on top of the loaded file.
    ///
    /// # Notes
    ///
    /// Calling this function takes a global lock. Runtimes read it once when a client is created
    /// and keep the returned [Arc].
    pub fn get() -> Arc<Self> {
        let mut state = CUBEFOLD_GLOBAL_CONFIG.lock();
        state
            .get_or_insert_with(|| Arc::new(Self::from_current_dir().override_from_env()))
            .clone()
    }

    /// Sets the global configuration to the provided value.
    ///
    /// # Panics
    /// Panics if the configuration has already been set or read, as it cannot be overridden.
    ///
    /// # Warning
    /// This method must be called at the start of the program, before any calls to `get`.
    pub fn set(config: Self) {
        let mut state = CUBEFOLD_GLOBAL_CONFIG.lock();
        if state.is_some() {
            panic!("Cannot set the global configuration multiple times.");
        }
        *state = Some(Arc::new(config));
    }

    /// Overrides configuration fields based on environment variables.
    ///
    /// - `CUBEFOLD_DEBUG_LOG`: `stdout`, `stderr`, `1`/`true` (log to `/tmp/cubefold.log`),
    ///   `0`/`false` (disable) or any other value as a file path. Enables every logger.
    /// - `CUBEFOLD_DEBUG_OPTION`: `debug`, `debug-full`, `launch` or `memory` to pick what is logged.
    pub fn override_from_env(mut self) -> Self {
        if let Ok(val) = std::env::var("CUBEFOLD_DEBUG_LOG") {
            self.launch.logger.level = LaunchLogLevel::Basic;
            self.memory.logger.level = MemoryLogLevel::Full;

            match val.as_str() {
                "stdout" => {
                    self.launch.logger.stdout = true;
                    self.memory.logger.stdout = true;
                }
                "stderr" => {
                    self.launch.logger.stderr = true;
                    self.memory.logger.stderr = true;
                }
                "1" | "true" => {
                    let file_path = "/tmp/cubefold.log";
                    self.launch.logger.file = Some(file_path.into());
                    self.memory.logger.file = Some(file_path.into());
                }
                "0" | "false" => {
                    self.launch.logger.level = LaunchLogLevel::Disabled;
                    self.memory.logger.level = MemoryLogLevel::Disabled;
                }
                file_path => {
                    self.launch.logger.file = Some(file_path.into());
                    self.memory.logger.file = Some(file_path.into());
                }
            }
        };

        if let Ok(val) = std::env::var("CUBEFOLD_DEBUG_OPTION") {
            match val.as_str() {
                "debug" => {
                    self.launch.logger.level = LaunchLogLevel::Basic;
                    self.memory.logger.level = MemoryLogLevel::Full;
                }
                "launch" => {
                    self.launch.logger.level = LaunchLogLevel::Full;
                    self.memory.logger.level = MemoryLogLevel::Disabled;
                }
                "memory" => {
                    self.launch.logger.level = LaunchLogLevel::Disabled;
                    self.memory.logger.level = MemoryLogLevel::Full;
                }
                "debug-full" => {
                    self.launch.logger.level = LaunchLogLevel::Full;
                    self.memory.logger.level = MemoryLogLevel::Full;
                }
                _ => {}
            }
        };

        self
    }

    // Loads configuration from `cubefold.toml` or `CubeFold.toml` in the current directory or its
    // parents, falling back to the default configuration.
    fn from_current_dir() -> Self {
        let Ok(mut dir) = std::env::current_dir() else {
            return Self::default();
        };

        loop {
            for name in ["cubefold.toml", "CubeFold.toml"] {
                let path = dir.join(name);
                if path.is_file() {
                    match Self::from_file_path(&path) {
                        Ok(config) => return config,
                        Err(err) => {
                            log::warn!("Ignoring config file {}: {err}", path.display());
                        }
                    }
                }
            }

            if !dir.pop() {
                break;
            }
        }

        Self::default()
    }

    /// Loads configuration from a specified file path.
    pub fn from_file_path<P: AsRef<std::path::Path>>(path: P) -> std::io::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parses a configuration from its toml representation.
    pub fn from_toml(content: &str) -> std::io::Result<Self> {
        toml::from_str(content)
            .map_err(|err| std::io::Error::new(std::io::ErrorKind::InvalidData, err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn empty_file_is_default() {
        let config = GlobalConfig::from_toml("").unwrap();

        assert_eq!(config.launch.logger.level, LaunchLogLevel::Disabled);
        assert_eq!(config.device, DeviceConfig::default());
    }

    #[test]
    fn parses_sections() {
        let config = GlobalConfig::from_toml(
            r#"
            [launch.logger]
            level = "full"
            stdout = true

            [memory.logger]
            level = "full"
            log = "debug"

            [device]
            max_units_per_cube = 128
            worker_count = 2
            "#,
        )
        .unwrap();

        assert_eq!(config.launch.logger.level, LaunchLogLevel::Full);
        assert!(config.launch.logger.stdout);
        assert!(matches!(config.memory.logger.level, MemoryLogLevel::Full));
        assert_eq!(config.device.max_units_per_cube, Some(128));
        assert_eq!(config.device.worker_count, Some(2));
        assert_eq!(config.device.max_cube_count, None);
    }

    #[test]
    fn invalid_file_is_an_error() {
        assert!(GlobalConfig::from_toml("[launch.logger]\nlevel = 3").is_err());
    }

    #[test]
    fn default_round_trips_through_toml() {
        let content = toml::to_string_pretty(&GlobalConfig::default()).unwrap();
        let config = GlobalConfig::from_toml(&content).unwrap();

        assert_eq!(config.device, DeviceConfig::default());
    }

    #[test]
    #[serial]
    fn env_enables_loggers() {
        std::env::set_var("CUBEFOLD_DEBUG_LOG", "stderr");
        std::env::set_var("CUBEFOLD_DEBUG_OPTION", "launch");

        let config = GlobalConfig::default().override_from_env();

        std::env::remove_var("CUBEFOLD_DEBUG_LOG");
        std::env::remove_var("CUBEFOLD_DEBUG_OPTION");

        assert!(config.launch.logger.stderr);
        assert_eq!(config.launch.logger.level, LaunchLogLevel::Full);
        assert!(matches!(config.memory.logger.level, MemoryLogLevel::Disabled));
    }

    #[test]
    #[serial]
    fn env_can_disable_loggers() {
        std::env::set_var("CUBEFOLD_DEBUG_LOG", "0");

        let config = GlobalConfig::default().override_from_env();

        std::env::remove_var("CUBEFOLD_DEBUG_LOG");

        assert_eq!(config.launch.logger.level, LaunchLogLevel::Disabled);
        assert!(config.launch.logger.file.is_none());
    }
}
