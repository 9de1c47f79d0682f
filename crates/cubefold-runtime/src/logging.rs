use crate::{
    config::{GlobalConfig, Logger, launch::LaunchLogLevel, memory::MemoryLogLevel},
    server::{CubeCount, CubeDim},
};
use core::time::Duration;
use cubefold_common::word::WORD_SIZE;
use std::sync::Arc;

/// Logger owned by a compute client, reporting launches and allocations.
#[derive(Debug)]
pub struct ServerLogger {
    kind: ServerLoggerKind,
}

#[derive(Debug)]
enum ServerLoggerKind {
    Activated(Logger),
    None,
}

/// A kernel launch, as it is logged.
#[derive(new, Debug)]
pub struct LaunchRecord<'a> {
    /// Name of the kernel.
    pub name: &'a str,
    /// Number of cubes.
    pub count: CubeCount,
    /// Units per cube.
    pub dim: CubeDim,
    /// Shared memory words per cube.
    pub shared_words: usize,
}

impl ServerLogger {
    /// Creates the logger from the given configuration.
    ///
    /// No output is opened when every logger is disabled.
    pub fn new(config: Arc<GlobalConfig>) -> Self {
        if config.launch.logger.level == LaunchLogLevel::Disabled
            && config.memory.logger.level == MemoryLogLevel::Disabled
        {
            return Self {
                kind: ServerLoggerKind::None,
            };
        }

        Self {
            kind: ServerLoggerKind::Activated(Logger::new(config)),
        }
    }

    /// Whether launches should be timed.
    pub fn profile_launches(&self) -> bool {
        self.launch_level() == LaunchLogLevel::Full
    }

    /// Whether anything is logged for launches.
    pub fn launch_activated(&self) -> bool {
        self.launch_level() != LaunchLogLevel::Disabled
    }

    /// Logs a kernel launch. The duration is only reported at the full level.
    pub fn log_launch(&mut self, launch: &LaunchRecord<'_>, duration: Option<Duration>) {
        let ServerLoggerKind::Activated(logger) = &mut self.kind else {
            return;
        };

        match logger.log_level_launch() {
            LaunchLogLevel::Disabled => {}
            LaunchLogLevel::Basic => logger.log_launch(&format!(
                "[launch] {} cubes={} units={} shared_bytes={}",
                launch.name,
                launch.count.num_cubes(),
                launch.dim.num_elems(),
                launch.shared_words * WORD_SIZE,
            )),
            LaunchLogLevel::Full => logger.log_launch(&format!(
                "[launch] {} cubes={:?} units={:?} shared_bytes={} | {:?}",
                launch.name,
                launch.count,
                launch.dim,
                launch.shared_words * WORD_SIZE,
                duration.unwrap_or_default(),
            )),
        }
    }

    /// Logs an allocation or a deallocation.
    pub fn log_memory<F: FnOnce() -> String>(&mut self, message: F) {
        if let ServerLoggerKind::Activated(logger) = &mut self.kind {
            if logger.log_level_memory() == MemoryLogLevel::Full {
                logger.log_memory(&format!("[memory] {}", message()));
            }
        }
    }

    fn launch_level(&self) -> LaunchLogLevel {
        match &self.kind {
            ServerLoggerKind::Activated(logger) => logger.log_level_launch(),
            ServerLoggerKind::None => LaunchLogLevel::Disabled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_disables_everything() {
        let logger = ServerLogger::new(Arc::new(GlobalConfig::default()));

        assert!(!logger.launch_activated());
        assert!(!logger.profile_launches());
        assert!(matches!(logger.kind, ServerLoggerKind::None));
    }

    #[test]
    fn full_launch_level_profiles() {
        let mut config = GlobalConfig::default();
        config.launch.logger.level = LaunchLogLevel::Full;

        let mut logger = ServerLogger::new(Arc::new(config));
        logger.log_launch(
            &LaunchRecord::new("reduce", CubeCount::new_1d(2), CubeDim::new_1d(8), 9),
            Some(Duration::from_micros(3)),
        );

        assert!(logger.launch_activated());
        assert!(logger.profile_launches());
    }
}
