use super::logger::{BinaryLogLevel, LoggerConfig};

/// Configuration for the allocation logger.
#[derive(Default, Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct MemoryConfig {
    /// Logger configuration for allocations and deallocations.
    #[serde(default)]
    pub logger: LoggerConfig<MemoryLogLevel>,
}

/// Allocations are either all logged or not at all.
pub type MemoryLogLevel = BinaryLogLevel;
