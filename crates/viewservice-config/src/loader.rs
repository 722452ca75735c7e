//! Merges every configuration source into one [`ViewServiceConfig`].

use std::env;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use config::{Config, Environment, File, FileFormat, Map};

use crate::{ViewServiceConfig, paths};

/// Builder over the configuration sources of one invocation.
///
/// Files are overlaid on the built-in defaults in the order given by
/// [`paths::layered_files`], then environment variables such as
/// `VSVC_DETECTOR__DEAD_PINGS=8` (prefix, `_`, then section and key joined
/// by `__`) win over every file.
pub struct ConfigLoader {
    project_dir: PathBuf,
    env_prefix: String,
    env_vars: Option<Map<String, String>>,
    user_config: bool,
}

impl ConfigLoader {
    /// Loads from the current directory and the process environment.
    pub fn new() -> Self {
        Self {
            project_dir: env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            env_prefix: "VSVC".to_string(),
            env_vars: None,
            user_config: true,
        }
    }

    pub fn with_project_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.project_dir = dir.as_ref().to_path_buf();
        self
    }

    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    /// Reads overrides from `vars` instead of the process environment.
    pub fn with_env_vars<K, V>(mut self, vars: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.env_vars = Some(vars.into_iter().map(|(k, v)| (k.into(), v.into())).collect());
        self
    }

    /// Ignores the per-user file.
    pub fn without_user_config(mut self) -> Self {
        self.user_config = false;
        self
    }

    pub fn load(self) -> Result<ViewServiceConfig> {
        let defaults = Config::try_from(&ViewServiceConfig::default())
            .context("Failed to encode built-in defaults")?;

        let builder = paths::layered_files(&self.project_dir, self.user_config)
            .into_iter()
            .filter(|file| file.exists())
            .fold(Config::builder().add_source(defaults), |builder, file| {
                builder.add_source(File::from(file).format(FileFormat::Toml))
            });

        let environment = Environment::with_prefix(&self.env_prefix)
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true)
            .source(self.env_vars);

        builder
            .add_source(environment)
            .build()
            .context("Failed to merge configuration sources")?
            .try_deserialize()
            .context("Invalid configuration values")
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}
