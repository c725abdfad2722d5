// SPDX-FileCopyrightText: 2026 Postpilot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./postpilot.toml` > `~/.config/postpilot/postpilot.toml`
//! > `/etc/postpilot/postpilot.toml`, with environment variable overrides via the
//! `POSTPILOT_` prefix. `ENCRYPTION_KEY` is accepted as an alias for
//! `vault.encryption_key`.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::PostpilotConfig;

/// Bare environment variable holding the vault key.
pub const ENCRYPTION_KEY_ENV_VAR: &str = "ENCRYPTION_KEY";

/// Prefixed environment variable holding the vault key. Wins over the bare one.
pub const PREFIXED_ENCRYPTION_KEY_ENV_VAR: &str = "POSTPILOT_VAULT_ENCRYPTION_KEY";

const SYSTEM_CONFIG_PATH: &str = "/etc/postpilot/postpilot.toml";
const LOCAL_CONFIG_PATH: &str = "postpilot.toml";

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/postpilot/postpilot.toml`
/// 3. `~/.config/postpilot/postpilot.toml`
/// 4. `./postpilot.toml`
/// 5. `POSTPILOT_*` environment variables
/// 6. `ENCRYPTION_KEY`, then `POSTPILOT_VAULT_ENCRYPTION_KEY`
pub fn load_config() -> Result<PostpilotConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no files, no env).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<PostpilotConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(PostpilotConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
///
/// The path is used as given: no parent-directory search. A missing file
/// still reads as empty here; [`crate::load_and_validate_path`] rejects it.
pub fn load_config_from_path(path: &Path) -> Result<PostpilotConfig, figment::Error> {
    with_env(
        Figment::new()
            .merge(Serialized::defaults(PostpilotConfig::default()))
            .merge(Toml::file_exact(path)),
    )
    .extract()
}

/// Build the Figment used for XDG config loading, before extraction.
pub fn build_figment() -> Figment {
    let mut figment = Figment::new().merge(Serialized::defaults(PostpilotConfig::default()));
    for path in config_file_paths() {
        figment = figment.merge(Toml::file(path));
    }
    with_env(figment)
}

/// TOML files consulted by [`load_config`], lowest precedence first.
pub fn config_file_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from(SYSTEM_CONFIG_PATH)];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("postpilot").join("postpilot.toml"));
    }
    paths.push(PathBuf::from(LOCAL_CONFIG_PATH));
    paths
}

fn with_env(figment: Figment) -> Figment {
    let mut figment = figment.merge(env_provider());

    // Keys are merged as serialized strings: the Env provider would parse an
    // all-digit key as a number.
    for var in [ENCRYPTION_KEY_ENV_VAR, PREFIXED_ENCRYPTION_KEY_ENV_VAR] {
        if let Ok(key) = std::env::var(var) {
            figment = figment.merge(("vault.encryption_key", key));
        }
    }
    figment
}

/// Sections that may be overridden through `POSTPILOT_<SECTION>_<FIELD>`.
const ENV_SECTIONS: &[&str] = &["server_", "gateway_", "storage_"];

/// Create the environment variable provider using explicit `map()` for section-to-dot mapping.
///
/// Uses `Env::map()` NOT `Env::split("_")`: `POSTPILOT_STORAGE_DATABASE_PATH`
/// must map to `storage.database_path`, not `storage.database.path`. Other
/// `POSTPILOT_*` variables (the vault key, `POSTPILOT_SECRET_VALUE`) are not
/// config sections and are left out.
fn env_provider() -> Env {
    Env::prefixed("POSTPILOT_")
        .filter(|key| {
            ENV_SECTIONS
                .iter()
                .any(|section| key.as_str().to_ascii_lowercase().starts_with(section))
        })
        .map(|key| {
            let mapped = key
                .as_str()
                .to_ascii_lowercase()
                .replacen("server_", "server.", 1)
                .replacen("gateway_", "gateway.", 1)
                .replacen("storage_", "storage.", 1);
            mapped.into()
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_file_has_highest_file_precedence() {
        let paths = config_file_paths();
        assert_eq!(paths.first().unwrap(), Path::new(SYSTEM_CONFIG_PATH));
        assert_eq!(paths.last().unwrap(), Path::new(LOCAL_CONFIG_PATH));
    }
}
