//! Domain-specific error types for the bootstrapper.
//!
//! Internal modules return typed errors (e.g., [`TemplateError`],
//! [`CacheError`]) while command handlers at the CLI boundary convert them to
//! [`anyhow::Error`] via the standard `?` operator and attach the name of the
//! template file or step that failed.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that arise while rendering a template document.
#[derive(Error, Debug)]
pub enum TemplateError {
    /// The template is not a valid YAML mapping.
    #[error("Invalid YAML template: {message}")]
    Parse {
        /// Parser message.
        message: String,
    },

    /// A `{name}` placeholder has no resolved value.
    #[error("Missing value for placeholder '{{{name}}}': declare it under required_vars")]
    MissingRequirement {
        /// Placeholder name.
        name: String,
    },

    /// A `required_vars` entry does not have the expected shape.
    #[error("Invalid required_vars entry '{name}': {message}")]
    InvalidRequirement {
        /// Variable name.
        name: String,
        /// Why the entry was rejected.
        message: String,
    },

    /// Resolving a required variable failed.
    #[error("Could not resolve '{name}': {source}")]
    Resolve {
        /// Variable name.
        name: String,
        /// Underlying prompt failure.
        source: PromptError,
    },
}

/// Errors that arise from the persistent key-value cache.
#[derive(Error, Debug)]
pub enum CacheError {
    /// The cache file could not be read or written.
    #[error("cache {path} is unavailable: {source}")]
    Unavailable {
        /// Path to the cache file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The cache file exists but is not a JSON object of strings.
    #[error("cache {path} is corrupt: {source}")]
    Corrupt {
        /// Path to the cache file.
        path: PathBuf,
        /// Underlying decode error.
        source: serde_json::Error,
    },

    /// A required run-metadata key is absent.
    #[error("cache {path} has no '{key}' entry")]
    MissingKey {
        /// Path to the cache file.
        path: PathBuf,
        /// Missing key.
        key: String,
    },
}

/// Errors that arise while asking the user for input.
#[derive(Error, Debug)]
pub enum PromptError {
    /// Input ended before an answer was given.
    #[error("input aborted while asking for {question}")]
    Aborted {
        /// The question that was being asked.
        question: String,
    },

    /// Reading from or writing to the terminal failed.
    #[error("terminal I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that arise while applying configuration to the host.
#[derive(Error, Debug)]
pub enum ProcessError {
    /// An external command exited with a non-zero status.
    #[error("'{command}' failed (exit {exit_code}): {stderr}")]
    CommandFailed {
        /// Display form of the command.
        command: String,
        /// Exit code, `-1` when terminated by a signal.
        exit_code: i32,
        /// Captured standard error output.
        stderr: String,
    },

    /// A generated file could not be written.
    #[error("could not write {path}: {source}")]
    Write {
        /// Target path.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}
