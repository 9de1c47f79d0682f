use super::{GlobalConfig, launch::LaunchLogLevel, memory::MemoryLogLevel};
use core::fmt::Display;
use hashbrown::HashMap;
use std::{
    fs::{File, OpenOptions},
    io::{BufWriter, Write},
    path::PathBuf,
    sync::Arc,
};

/// Configuration for logging in cubefold, parameterized by a log level type.
///
/// Note that you can use multiple loggers at the same time.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(bound = "")]
pub struct LoggerConfig<L: LogLevel> {
    /// Path to the log file, if file logging is enabled.
    #[serde(default)]
    pub file: Option<PathBuf>,

    /// Whether to append to the log file (true) or overwrite it (false). Defaults to true.
    #[serde(default = "append_default")]
    pub append: bool,

    /// Whether to log to standard output.
    #[serde(default)]
    pub stdout: bool,

    /// Whether to log to standard error.
    #[serde(default)]
    pub stderr: bool,

    /// Optional crate-level logging configuration (e.g., info, debug, trace).
    #[serde(default)]
    pub log: Option<LogCrateLevel>,

    /// The log level for this logger, determining verbosity.
    #[serde(default)]
    pub level: L,
}

impl<L: LogLevel> Default for LoggerConfig<L> {
    fn default() -> Self {
        Self {
            file: None,
            append: true,
            stdout: false,
            stderr: false,
            log: None,
            level: L::default(),
        }
    }
}

/// Log levels using the `log` crate.
#[derive(
    Clone, Copy, Debug, Default, serde::Serialize, serde::Deserialize, Hash, PartialEq, Eq,
)]
pub enum LogCrateLevel {
    /// Logs informational messages.
    #[default]
    #[serde(rename = "info")]
    Info,

    /// Logs debugging messages.
    #[serde(rename = "debug")]
    Debug,

    /// Logs trace-level messages.
    #[serde(rename = "trace")]
    Trace,
}

fn append_default() -> bool {
    true
}

/// Trait for types that can be used as log levels in `LoggerConfig`.
pub trait LogLevel:
    serde::de::DeserializeOwned + serde::Serialize + Clone + Copy + core::fmt::Debug + Default
{
}

/// Binary log level for enabling or disabling logging.
#[derive(Default, Copy, Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum BinaryLogLevel {
    /// Logging is disabled.
    #[default]
    #[serde(rename = "disabled")]
    Disabled,

    /// Logging is fully enabled.
    #[serde(rename = "full")]
    Full,
}

impl LogLevel for BinaryLogLevel {}

/// Central logging utility for cubefold, managing multiple log outputs.
#[derive(Debug)]
pub struct Logger {
    /// Collection of logger instances (file, stdout, stderr, or crate-level).
    loggers: Vec<LoggerKind>,

    /// Indices of loggers used for launch logging.
    launch_index: Vec<usize>,

    /// Indices of loggers used for memory logging.
    memory_index: Vec<usize>,

    /// Configuration the loggers were created from.
    pub config: Arc<GlobalConfig>,
}

impl Default for Logger {
    fn default() -> Self {
        Self::new(GlobalConfig::get())
    }
}

#[derive(Hash, PartialEq, Eq)]
enum LoggerId {
    File(PathBuf),
    Stdout,
    Stderr,
    LogCrate(LogCrateLevel),
}

impl Logger {
    /// Creates the loggers described by the given configuration.
    ///
    /// Outputs shared by the launch and memory loggers are opened once.
    pub fn new(config: Arc<GlobalConfig>) -> Self {
        let mut loggers = Vec::new();
        let mut launch_index = Vec::new();
        let mut memory_index = Vec::new();
        let mut logger2index = HashMap::<LoggerId, usize>::new();

        if config.launch.logger.level != LaunchLogLevel::Disabled {
            register_logger(
                &config.launch.logger,
                &mut launch_index,
                &mut loggers,
                &mut logger2index,
            );
        }

        if config.memory.logger.level != MemoryLogLevel::Disabled {
            register_logger(
                &config.memory.logger,
                &mut memory_index,
                &mut loggers,
                &mut logger2index,
            );
        }

        Self {
            loggers,
            launch_index,
            memory_index,
            config,
        }
    }

    /// Logs a message to every configured launch logger.
    pub fn log_launch<S: Display>(&mut self, msg: &S) {
        log_all(&mut self.loggers, &self.launch_index, msg);
    }

    /// Logs a message to every configured memory logger.
    pub fn log_memory<S: Display>(&mut self, msg: &S) {
        log_all(&mut self.loggers, &self.memory_index, msg);
    }

    /// Returns the current launch log level.
    pub fn log_level_launch(&self) -> LaunchLogLevel {
        self.config.launch.logger.level
    }

    /// Returns the current memory log level.
    pub fn log_level_memory(&self) -> MemoryLogLevel {
        self.config.memory.logger.level
    }
}

fn log_all<S: Display>(loggers: &mut [LoggerKind], indices: &[usize], msg: &S) {
    if indices.len() > 1 {
        let msg = msg.to_string();
        for index in indices {
            loggers[*index].log(&msg);
        }
    } else if let Some(index) = indices.first() {
        loggers[*index].log(msg);
    }
}

fn register_logger<L: LogLevel>(
    config: &LoggerConfig<L>,
    setting_index: &mut Vec<usize>,
    loggers: &mut Vec<LoggerKind>,
    logger2index: &mut HashMap<LoggerId, usize>,
) {
    let mut new_logger = |id: LoggerId, create: &dyn Fn() -> Option<LoggerKind>| {
        if let Some(index) = logger2index.get(&id) {
            setting_index.push(*index);
        } else if let Some(logger) = create() {
            let index = loggers.len();
            logger2index.insert(id, index);
            loggers.push(logger);
            setting_index.push(index);
        }
    };

    if let Some(file) = &config.file {
        new_logger(LoggerId::File(file.clone()), &|| {
            FileLogger::new(file, config.append).map(LoggerKind::File)
        });
    }

    if config.stdout {
        new_logger(LoggerId::Stdout, &|| Some(LoggerKind::Stdout));
    }

    if config.stderr {
        new_logger(LoggerId::Stderr, &|| Some(LoggerKind::Stderr));
    }

    if let Some(level) = config.log {
        new_logger(LoggerId::LogCrate(level), &|| Some(LoggerKind::Log(level)));
    }
}

/// Represents different types of loggers.
#[derive(Debug)]
enum LoggerKind {
    /// Logs to a file.
    File(FileLogger),

    /// Logs to standard output.
    Stdout,

    /// Logs to standard error.
    Stderr,

    /// Logs using the `log` crate with a specified level.
    Log(LogCrateLevel),
}

impl LoggerKind {
    fn log<S: Display>(&mut self, msg: &S) {
        match self {
            LoggerKind::File(file_logger) => file_logger.log(msg),
            LoggerKind::Stdout => println!("{msg}"),
            LoggerKind::Stderr => eprintln!("{msg}"),
            LoggerKind::Log(level) => match level {
                LogCrateLevel::Info => log::info!("{msg}"),
                LogCrateLevel::Debug => log::debug!("{msg}"),
                LogCrateLevel::Trace => log::trace!("{msg}"),
            },
        }
    }
}

/// Logger that writes messages to a file.
#[derive(Debug)]
struct FileLogger {
    writer: BufWriter<File>,
}

impl FileLogger {
    // Opens the file, or returns `None` when it can't be written to.
    fn new(path: &PathBuf, append: bool) -> Option<Self> {
        let file = OpenOptions::new()
            .write(true)
            .append(append)
            .truncate(!append)
            .create(true)
            .open(path);

        match file {
            Ok(file) => Some(Self {
                writer: BufWriter::new(file),
            }),
            Err(err) => {
                log::warn!("Can't open log file {}: {err}", path.display());
                None
            }
        }
    }

    // Logs a message to the file, flushing the buffer to ensure immediate write.
    fn log<S: Display>(&mut self, msg: &S) {
        if let Err(err) = writeln!(self.writer, "{msg}").and_then(|_| self.writer.flush()) {
            log::warn!("Can't write to log file: {err}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_config_creates_no_logger() {
        let logger = Logger::new(Arc::new(GlobalConfig::default()));

        assert!(logger.loggers.is_empty());
        assert_eq!(logger.log_level_launch(), LaunchLogLevel::Disabled);
    }

    #[test]
    fn shared_outputs_are_opened_once() {
        let mut config = GlobalConfig::default();
        config.launch.logger.level = LaunchLogLevel::Basic;
        config.launch.logger.log = Some(LogCrateLevel::Debug);
        config.memory.logger.level = MemoryLogLevel::Full;
        config.memory.logger.log = Some(LogCrateLevel::Debug);
        config.memory.logger.stderr = true;

        let logger = Logger::new(Arc::new(config));

        assert_eq!(logger.loggers.len(), 2);
        assert_eq!(logger.launch_index, vec![0]);
        // Stderr is registered before the log crate output shared with launches.
        assert_eq!(logger.memory_index, vec![1, 0]);
    }

    #[test]
    fn file_logger_writes_lines() {
        let path = std::env::temp_dir().join(format!("cubefold-logger-{}.log", std::process::id()));
        let mut config = GlobalConfig::default();
        config.launch.logger.level = LaunchLogLevel::Full;
        config.launch.logger.file = Some(path.clone());
        config.launch.logger.append = false;

        let mut logger = Logger::new(Arc::new(config));
        logger.log_launch(&"first");
        logger.log_launch(&"second");
        drop(logger);

        let content = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(content, "first\nsecond\n");
    }
}
