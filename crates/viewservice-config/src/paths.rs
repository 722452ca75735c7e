//! Where configuration files are looked up.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;

use crate::ConfigError;

/// Project config file name.
pub const PROJECT_CONFIG_FILE: &str = "viewservice.toml";

/// Local override file name (not meant to be checked in).
pub const LOCAL_CONFIG_FILE: &str = "viewservice.local.toml";

const USER_CONFIG_FILE: &str = "config.toml";

/// `~/.config/viewservice/config.toml` on Linux, the platform equivalent
/// elsewhere.
pub fn user_config_file() -> Result<PathBuf, ConfigError> {
    ProjectDirs::from("org", "viewservice", "viewservice")
        .map(|dirs| dirs.config_dir().join(USER_CONFIG_FILE))
        .ok_or_else(|| ConfigError::XdgError("no home directory for user configuration".into()))
}

/// Candidate files in overlay order, lowest precedence first. Missing files
/// are the caller's concern; a user file that cannot be located is left out.
pub fn layered_files(project_dir: &Path, include_user: bool) -> Vec<PathBuf> {
    let user = include_user.then(user_config_file).and_then(Result::ok);
    user.into_iter()
        .chain([PROJECT_CONFIG_FILE, LOCAL_CONFIG_FILE].map(|name| project_dir.join(name)))
        .collect()
}
