//! Configuration builder for flexible configuration loading

use crate::{Config, ConfigError, ConfigResult};
use config::{ConfigBuilder as ConfigBuilderInner, Environment, File, FileFormat};
use std::path::{Component, Path, PathBuf};
use treemirror_types::SyncInterval;

/// Environment variable prefix used by [`ConfigBuilder::add_default_env`]
pub const ENV_PREFIX: &str = "TREEMIRROR";

/// Separator between nested keys in environment variable names
const ENV_SEPARATOR: &str = "__";

/// Configuration builder for loading configuration from multiple sources
#[derive(Debug)]
pub struct ConfigBuilder {
    inner: ConfigBuilderInner<config::builder::DefaultState>,
    sources: Vec<ConfigSource>,
    overrides: Overrides,
}

#[derive(Debug, Clone)]
enum ConfigSource {
    File { path: PathBuf, format: FileFormat },
    Defaults,
    Environment { prefix: String },
}

/// Values applied on top of every other source
#[derive(Debug, Default)]
struct Overrides {
    source: Option<PathBuf>,
    replica: Option<PathBuf>,
    log_file: Option<PathBuf>,
    interval: Option<u64>,
    level: Option<String>,
}

impl ConfigBuilder {
    /// Create a new configuration builder
    pub fn new() -> Self {
        Self {
            inner: config::Config::builder(),
            sources: Vec::new(),
            overrides: Overrides::default(),
        }
    }

    /// Add default configuration values
    pub fn add_defaults(mut self) -> Self {
        self.sources.push(ConfigSource::Defaults);
        self
    }

    /// Add a configuration file source
    pub fn add_source_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let format = Self::detect_format(&path);
        self.sources.push(ConfigSource::File { path, format });
        self
    }

    /// Add environment variable source with prefix
    pub fn add_env_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.sources.push(ConfigSource::Environment {
            prefix: prefix.into(),
        });
        self
    }

    /// Add the `TREEMIRROR__*` environment variables
    pub fn add_default_env(self) -> Self {
        self.add_env_prefix(ENV_PREFIX)
    }

    /// Override the source, replica and log file locations
    pub fn with_paths<P: AsRef<Path>>(mut self, source: P, replica: P, log_file: P) -> Self {
        self.overrides.source = Some(source.as_ref().to_path_buf());
        self.overrides.replica = Some(replica.as_ref().to_path_buf());
        self.overrides.log_file = Some(log_file.as_ref().to_path_buf());
        self
    }

    /// Override the sync interval, in seconds
    pub fn with_interval(mut self, seconds: u64) -> Self {
        self.overrides.interval = Some(seconds);
        self
    }

    /// Override the diagnostic log level
    pub fn with_log_level<S: Into<String>>(mut self, level: S) -> Self {
        self.overrides.level = Some(level.into());
        self
    }

    /// Build the configuration
    pub fn build(mut self) -> ConfigResult<Config> {
        let defaults = Config::default();
        self.inner = self
            .inner
            .add_source(config::Config::try_from(&defaults)?);

        for source in &self.sources {
            match source {
                ConfigSource::File { path, format } => {
                    if !path.exists() {
                        return Err(ConfigError::FileNotFound { path: path.clone() });
                    }
                    self.inner = self
                        .inner
                        .add_source(File::from(path.clone()).format(*format));
                }
                ConfigSource::Environment { prefix } => {
                    self.inner = self.inner.add_source(
                        Environment::with_prefix(prefix)
                            .separator(ENV_SEPARATOR)
                            .try_parsing(true),
                    );
                }
                ConfigSource::Defaults => {
                    // Already handled above
                }
            }
        }

        let mut result: Config = self.inner.build()?.try_deserialize()?;
        Self::apply_overrides(&mut result, self.overrides)?;
        Self::validate(&result)?;

        Ok(result)
    }

    fn apply_overrides(config: &mut Config, overrides: Overrides) -> ConfigResult<()> {
        if let Some(source) = overrides.source {
            config.paths.source = source;
        }
        if let Some(replica) = overrides.replica {
            config.paths.replica = replica;
        }
        if let Some(log_file) = overrides.log_file {
            config.paths.log_file = log_file;
        }
        if let Some(seconds) = overrides.interval {
            config.sync.interval = SyncInterval::new(seconds).map_err(ConfigError::invalid)?;
        }
        if let Some(level) = overrides.level {
            config.logging.level = level;
        }
        Ok(())
    }

    /// Detect file format from extension
    fn detect_format(path: &Path) -> FileFormat {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("yaml" | "yml") => FileFormat::Yaml,
            Some("toml") => FileFormat::Toml,
            Some("json") => FileFormat::Json,
            _ => FileFormat::Yaml, // Default to YAML
        }
    }

    /// Validate the configuration
    fn validate(config: &Config) -> ConfigResult<()> {
        let paths = &config.paths;
        if paths.source.as_os_str().is_empty() {
            return Err(ConfigError::Missing { key: "paths.source" });
        }
        if paths.replica.as_os_str().is_empty() {
            return Err(ConfigError::Missing { key: "paths.replica" });
        }
        if paths.log_file.as_os_str().is_empty() {
            return Err(ConfigError::Missing { key: "paths.log_file" });
        }

        let source = absolute(&paths.source)?;
        let replica = absolute(&paths.replica)?;
        let log_file = absolute(&paths.log_file)?;

        if source == replica {
            return Err(ConfigError::invalid(
                "Source and replica must be different directories",
            ));
        }
        if replica.starts_with(&source) {
            return Err(ConfigError::invalid(
                "Replica must not be located inside the source tree",
            ));
        }
        if source.starts_with(&replica) {
            return Err(ConfigError::invalid(
                "Source must not be located inside the replica tree",
            ));
        }
        if log_file.starts_with(&replica) {
            return Err(ConfigError::invalid(
                "Log file must not be located inside the replica tree",
            ));
        }

        if !["trace", "debug", "info", "warn", "error"].contains(&config.logging.level.as_str()) {
            return Err(ConfigError::invalid(
                "Log level must be one of: trace, debug, info, warn, error",
            ));
        }

        Ok(())
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Make a path absolute and collapse `.` and `..` without touching the filesystem
fn absolute(path: &Path) -> ConfigResult<PathBuf> {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map_err(|source| ConfigError::Resolve {
                path: path.to_path_buf(),
                source,
            })?
            .join(path)
    };

    let mut normalized = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    Ok(normalized)
}
