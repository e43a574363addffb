//! Git configuration: `scope → section → {name: value}` documents applied
//! with `git config`.
//!
//! ```yaml
//! "":            # no scope flag (repository default)
//!   alias:
//!     co: checkout
//! global:
//!   alias:
//!     lg: log --format="%h %s"
//! ```
use anyhow::{Result, bail};
use serde_yaml::{Mapping, Value};

use super::{Context, StepResult, escape_double_quotes, scalar_text};
use crate::error::ProcessError;
use crate::logging::DRY_RUN_TARGET;
use crate::platform::{Family, Platform};

/// A single `git config` assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitConfigEntry {
    /// Scope flag without dashes (`global`, `system`, …); `None` for default.
    pub scope: Option<String>,
    /// Config section (e.g. `alias`).
    pub section: String,
    /// Key within the section (e.g. `co`).
    pub name: String,
    /// Value to assign.
    pub value: String,
}

impl GitConfigEntry {
    /// Fully qualified key (`section.name`).
    #[must_use]
    pub fn key(&self) -> String {
        format!("{}.{}", self.section, self.name)
    }

    /// Arguments passed to `git`.
    #[must_use]
    pub fn args(&self) -> Vec<String> {
        let mut args = vec!["config".to_string()];
        if let Some(scope) = &self.scope {
            args.push(format!("--{scope}"));
        }
        args.push(self.key());
        args.push(self.value.clone());
        args
    }

    /// Shell form of the invocation, used for logging.
    #[must_use]
    pub fn command_line(&self) -> String {
        let scope = self
            .scope
            .as_ref()
            .map(|s| format!(" --{s}"))
            .unwrap_or_default();
        format!(
            "git config{scope} {} \"{}\"",
            self.key(),
            escape_double_quotes(&self.value)
        )
    }
}

/// All git config entries from a rendered document, in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GitConfig {
    pub entries: Vec<GitConfigEntry>,
}

impl GitConfig {
    /// Collect entries from a rendered git document.
    ///
    /// Top-level keys naming this host's platform family are read as nested
    /// documents after the general scopes; keys naming the other family are
    /// ignored. Malformed levels are skipped.
    #[must_use]
    pub fn from_document(doc: &Mapping, platform: &Platform) -> Self {
        let own = platform.family().section_keys();
        let mut general = Vec::new();
        let mut specific = Vec::new();

        for (key, value) in doc {
            match key.as_str() {
                Some(k) if own.contains(&k) => specific.push(value),
                Some(k) if is_platform_key(k) => {}
                _ => collect_scope(key, value, &mut general),
            }
        }

        let mut entries = general;
        for section in specific {
            if let Value::Mapping(nested) = section {
                for (key, value) in nested {
                    collect_scope(key, value, &mut entries);
                }
            }
        }
        Self { entries }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn is_platform_key(key: &str) -> bool {
    Family::Nix.section_keys().contains(&key) || Family::Windows.section_keys().contains(&key)
}

fn collect_scope(scope: &Value, sections: &Value, out: &mut Vec<GitConfigEntry>) {
    let scope = match scope {
        Value::Null => None,
        other => match scalar_text(other) {
            Some(s) if s.is_empty() => None,
            Some(s) => Some(s),
            None => return,
        },
    };
    let Value::Mapping(sections) = sections else {
        return;
    };
    for (section, values) in sections {
        let (Some(section), Value::Mapping(values)) = (scalar_text(section), values) else {
            continue;
        };
        for (name, value) in values {
            if let (Some(name), Some(value)) = (scalar_text(name), scalar_text(value)) {
                out.push(GitConfigEntry {
                    scope: scope.clone(),
                    section: section.clone(),
                    name,
                    value,
                });
            }
        }
    }
}

/// Run `git config` for every entry.
///
/// Failed invocations are logged and counted; all entries are attempted.
///
/// # Errors
///
/// Returns an error if at least one invocation failed.
pub fn apply(config: &GitConfig, ctx: &Context) -> Result<StepResult> {
    if config.is_empty() {
        return Ok(StepResult::Skipped("no git config entries".to_string()));
    }
    if !ctx.executor.which("git") {
        tracing::warn!("git not found on PATH, skipping git configuration");
        return Ok(StepResult::Skipped("git not found on PATH".to_string()));
    }

    let mut failed = 0usize;
    for entry in &config.entries {
        let line = entry.command_line();
        if ctx.dry_run {
            tracing::info!(target: DRY_RUN_TARGET, "would run: {line}");
            continue;
        }

        tracing::debug!("running: {line}");
        let args = entry.args();
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        match ctx.executor.run_unchecked("git", &args) {
            Ok(result) if result.success => {}
            Ok(result) => {
                let err = ProcessError::CommandFailed {
                    command: line,
                    exit_code: result.code.unwrap_or(-1),
                    stderr: result.stderr.trim().to_string(),
                };
                tracing::warn!("{err}");
                failed += 1;
            }
            Err(e) => {
                tracing::warn!("{line}: {e:#}");
                failed += 1;
            }
        }
    }

    if failed > 0 {
        bail!(
            "{failed} of {} git config commands failed",
            config.entries.len()
        );
    }
    tracing::info!("applied {} git config entries", config.entries.len());
    Ok(StepResult::finished(ctx.dry_run))
}
