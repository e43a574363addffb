//! Development environment bootstrapper.
//!
//! Renders a directory of YAML templates into concrete configuration files,
//! asking the user for the values each template declares, and applies the
//! result to the host: `git config` entries and shell aliases.
//!
//! The pipeline is organised into layers:
//!
//! - **[`requirements`]**: resolve declared variables from the cache or a prompt
//! - **[`template`]**: platform filtering and placeholder substitution
//! - **[`materialize`]**: render every template of a directory
//! - **[`processor`]**: apply rendered git and shell documents (Nix or Windows)
//! - **[`commands`]**: top-level subcommand orchestration (`setup`, `refresh`)
#![deny(clippy::or_fun_call)]
#![deny(clippy::bool_to_int_with_if)]

pub mod cache;
pub mod cli;
pub mod commands;
pub mod error;
pub mod exec;
pub mod logging;
pub mod materialize;
pub mod platform;
pub mod processor;
pub mod prompt;
pub mod requirements;
pub mod template;
