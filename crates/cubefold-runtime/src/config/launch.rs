use super::logger::{LogLevel, LoggerConfig};

/// Configuration for the kernel launch logger.
#[derive(Default, Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct LaunchConfig {
    /// Logger configuration for launches.
    #[serde(default)]
    pub logger: LoggerConfig<LaunchLogLevel>,
}

/// How much is logged for every kernel launch.
#[derive(Default, Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum LaunchLogLevel {
    /// Launches are not logged.
    #[default]
    #[serde(rename = "disabled")]
    Disabled,

    /// The kernel name and its launch geometry are logged.
    #[serde(rename = "basic")]
    Basic,

    /// Same as basic, including the shared memory size and the execution time.
    #[serde(rename = "full")]
    Full,
}

impl LogLevel for LaunchLogLevel {}
