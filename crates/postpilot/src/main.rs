// SPDX-FileCopyrightText: 2026 Postpilot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Postpilot - encrypted per-user social platform credentials.
//!
//! This is the binary entry point: the HTTP service plus operator commands.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod secrets;
mod serve;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use postpilot_config::PostpilotConfig;
use postpilot_core::{PostpilotError, SecretSlot};

/// Postpilot - encrypted per-user social platform credentials.
#[derive(Parser, Debug)]
#[command(name = "postpilot", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the XDG hierarchy.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the credential configuration API server.
    Serve,
    /// Load and validate configuration, then exit.
    CheckConfig,
    /// Print a fresh random key suitable for ENCRYPTION_KEY.
    GenKey,
    /// Encrypt and store one credential for a user.
    SetSecret {
        /// User id the credential belongs to.
        user: String,
        /// Slot name: facebookApiKey, instagramApiKey or linkedinApiKey.
        slot: SecretSlot,
    },
    /// List a user's stored credentials with masked previews.
    ListSecrets {
        /// User id to list.
        user: String,
    },
    /// Delete every stored credential of a user.
    DeleteUser {
        /// User id to delete.
        user: String,
    },
}

/// Load and validate configuration, rendering diagnostics on failure.
fn load_config(path: Option<&Path>) -> Option<PostpilotConfig> {
    let result = match path {
        Some(path) => postpilot_config::load_and_validate_path(path),
        None => postpilot_config::load_and_validate(),
    };
    match result {
        Ok(config) => Some(config),
        Err(errors) => {
            postpilot_config::render_errors(&errors);
            None
        }
    }
}

fn exit_on_error(result: Result<(), PostpilotError>) {
    if let Err(e) = result {
        eprintln!("postpilot: {e}");
        std::process::exit(1);
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        println!("postpilot: use --help for available commands");
        return;
    };

    if let Commands::GenKey = command {
        exit_on_error(secrets::run_gen_key());
        return;
    }

    let Some(config) = load_config(cli.config.as_deref()) else {
        std::process::exit(1);
    };

    match command {
        Commands::Serve => exit_on_error(serve::run_serve(config).await),
        Commands::CheckConfig => {
            println!(
                "postpilot: config ok (gateway={}:{}, database={}, auth tokens={})",
                config.gateway.host,
                config.gateway.port,
                config.storage.database_path,
                config.auth.tokens.len()
            );
        }
        Commands::SetSecret { user, slot } => {
            serve::init_tracing(&config.server.log_level);
            exit_on_error(secrets::run_set_secret(&config, &user, slot).await);
        }
        Commands::ListSecrets { user } => {
            serve::init_tracing(&config.server.log_level);
            exit_on_error(secrets::run_list_secrets(&config, &user).await);
        }
        Commands::DeleteUser { user } => {
            serve::init_tracing(&config.server.log_level);
            exit_on_error(secrets::run_delete_user(&config, &user).await);
        }
        Commands::GenKey => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    #[cfg(not(target_env = "msvc"))]
    fn jemalloc_is_active() {
        // Only jemalloc supports advancing the stats epoch.
        use tikv_jemalloc_ctl::{epoch, stats};
        epoch::advance().unwrap();
        let allocated = stats::allocated::read().unwrap();
        assert!(allocated > 0, "jemalloc should report non-zero allocation");
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn set_secret_parses_slot_names() {
        let cli = Cli::try_parse_from(["postpilot", "set-secret", "alice", "linkedinApiKey"]).unwrap();
        match cli.command {
            Some(Commands::SetSecret { user, slot }) => {
                assert_eq!(user, "alice");
                assert_eq!(slot, SecretSlot::LinkedinApiKey);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn unknown_slot_is_rejected_by_the_parser() {
        assert!(Cli::try_parse_from(["postpilot", "set-secret", "alice", "twitterApiKey"]).is_err());
    }

    #[test]
    fn config_flag_is_global() {
        let cli = Cli::try_parse_from(["postpilot", "check-config", "--config", "/tmp/p.toml"]).unwrap();
        assert_eq!(cli.config.as_deref(), Some(Path::new("/tmp/p.toml")));
    }
}
