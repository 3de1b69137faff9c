// SPDX-FileCopyrightText: 2026 Krzys Comm Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./krzys.toml` > `~/.config/krzys/krzys.toml` > `/etc/krzys/krzys.toml`
//! with environment variable overrides via `KRZYS_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::KrzysConfig;

/// System-wide configuration file.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/krzys/krzys.toml";

/// Configuration file in the working directory.
pub const LOCAL_CONFIG_PATH: &str = "krzys.toml";

/// The per-user configuration file, if a config directory is known.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("krzys/krzys.toml"))
}

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/krzys/krzys.toml` (system-wide)
/// 3. `~/.config/krzys/krzys.toml` (user XDG config)
/// 4. `./krzys.toml` (local directory)
/// 5. `KRZYS_*` environment variables
pub fn load_config() -> Result<KrzysConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no files, no env).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<KrzysConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(KrzysConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<KrzysConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(KrzysConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used for hierarchy loading, before extraction.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(KrzysConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG_PATH))
        .merge(Toml::file(user_config_path().unwrap_or_default()))
        .merge(Toml::file(LOCAL_CONFIG_PATH))
        .merge(env_provider())
}

/// Create the environment variable provider using explicit `map()` for section-to-dot mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` because key names contain
/// underscores: `KRZYS_STORAGE_DATABASE_PATH` must map to
/// `storage.database_path`, not `storage.database.path`.
fn env_provider() -> Env {
    Env::prefixed("KRZYS_").map(|key| map_env_key(key.as_str()).into())
}

/// Maps a prefix-stripped env var name to a dotted, lowercase config key.
///
/// Figment passes the name in its original case (`SERVER_PORT`).
fn map_env_key(key: &str) -> String {
    let key = key.to_ascii_lowercase();
    for section in ["server", "storage", "logging"] {
        if let Some(rest) = key.strip_prefix(section).and_then(|r| r.strip_prefix('_')) {
            return format!("{section}.{rest}");
        }
    }
    key
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_keys_map_to_sections() {
        assert_eq!(map_env_key("server_port"), "server.port");
        assert_eq!(map_env_key("server_frontend_dir"), "server.frontend_dir");
        assert_eq!(map_env_key("storage_database_path"), "storage.database_path");
        assert_eq!(map_env_key("logging_level"), "logging.level");
        assert_eq!(map_env_key("unknown"), "unknown");
    }

    #[test]
    fn uppercase_env_keys_map_to_sections() {
        assert_eq!(map_env_key("SERVER_PORT"), "server.port");
        assert_eq!(map_env_key("STORAGE_DATABASE_PATH"), "storage.database_path");
        assert_eq!(map_env_key("Logging_Level"), "logging.level");
    }

    #[test]
    fn env_port_override_loads() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("KRZYS_SERVER_PORT", "9123");
            jail.set_env("KRZYS_LOGGING_LEVEL", "debug");
            let config = load_config()?;
            assert_eq!(config.server.port, 9123);
            assert_eq!(config.logging.level, "debug");
            Ok(())
        });
    }

    #[test]
    fn env_overrides_file_values() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "custom.toml",
                r#"
[server]
port = 9000

[storage]
database_path = "from-file.db"
"#,
            )?;
            jail.set_env("KRZYS_STORAGE_DATABASE_PATH", "from-env.db");

            let config = load_config_from_path(Path::new("custom.toml"))?;
            assert_eq!(config.server.port, 9000);
            assert_eq!(config.storage.database_path, "from-env.db");
            Ok(())
        });
    }

    #[test]
    fn local_file_is_picked_up_by_hierarchy() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(LOCAL_CONFIG_PATH, "[logging]\nlevel = \"debug\"\n")?;
            let config = load_config()?;
            assert_eq!(config.logging.level, "debug");
            Ok(())
        });
    }
}
