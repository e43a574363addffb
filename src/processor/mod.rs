//! Platform processors that apply rendered configuration to the host.
//!
//! Both variants share git handling ([`git`]); shell handling differs:
//!
//! - **[`nix`]**: generated `alias` script sourced from the shell rc file
//! - **[`windows`]**: one batch file per alias in a directory on the user PATH
pub mod aliases;
pub mod git;
pub mod nix;
pub mod windows;

use anyhow::{Context as _, Result};
use serde_yaml::{Mapping, Value};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::cache::Store;
use crate::exec::Executor;
use crate::platform::{Family, Platform};
use crate::prompt::AnswerProvider;
use crate::template::parse_document;

pub use git::GitConfig;
pub use nix::NixProcessor;
pub use windows::WindowsProcessor;

/// File name of the rendered git configuration.
pub const GIT_CONFIG_FILE: &str = "git.yaml";

/// File name of the rendered shell configuration.
pub const SHELL_CONFIG_FILE: &str = "shell.yaml";

/// Collaborators shared by the processor steps.
pub struct Context<'a> {
    /// Detected platform.
    pub platform: Platform,
    /// Runs `git`, `reg` and `setx`.
    pub executor: &'a dyn Executor,
    /// Cache for remembered answers (rc file path).
    pub store: &'a dyn Store,
    /// Source of interactive answers.
    pub answers: &'a dyn AnswerProvider,
    /// User's home directory.
    pub home: PathBuf,
    /// Log side effects instead of performing them.
    pub dry_run: bool,
}

impl std::fmt::Debug for Context<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("platform", &self.platform)
            .field("executor", &self.executor)
            .field("store", &"<dyn Store>")
            .field("answers", &"<dyn AnswerProvider>")
            .field("home", &self.home)
            .field("dry_run", &self.dry_run)
            .finish()
    }
}

/// Outcome of a processor step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepResult {
    /// Changes were applied.
    Ok,
    /// Nothing to do, with the reason.
    Skipped(String),
    /// Changes were only logged.
    DryRun,
}

impl StepResult {
    pub(crate) const fn finished(dry_run: bool) -> Self {
        if dry_run { Self::DryRun } else { Self::Ok }
    }
}

/// Shell aliases in effect for one host, keyed by alias name.
pub type ShellAliases = std::collections::BTreeMap<String, String>;

/// Turns rendered configuration documents into host side effects.
pub trait Processor: std::fmt::Debug {
    /// Short name of the variant.
    fn name(&self) -> &'static str;

    /// Apply git configuration entries.
    ///
    /// # Errors
    ///
    /// Returns an error if any `git config` invocation fails; the remaining
    /// entries are still attempted.
    fn process_git_config(&self, config: &GitConfig, ctx: &Context) -> Result<StepResult> {
        git::apply(config, ctx)
    }

    /// Install shell aliases from the rendered shell document.
    ///
    /// # Errors
    ///
    /// Returns an error if generated files cannot be written or the host
    /// cannot be updated.
    fn process_shell_config(
        &self,
        shell: &Mapping,
        out_dir: &Path,
        ctx: &Context,
    ) -> Result<StepResult>;

    /// Run both steps, git first. The shell step runs even when the git step
    /// fails.
    fn apply(
        &self,
        git_doc: &Mapping,
        shell_doc: &Mapping,
        out_dir: &Path,
        ctx: &Context,
    ) -> Vec<(&'static str, Result<StepResult>)> {
        let config = GitConfig::from_document(git_doc, &ctx.platform);
        vec![
            ("Configure git", self.process_git_config(&config, ctx)),
            (
                "Configure shell aliases",
                self.process_shell_config(shell_doc, out_dir, ctx),
            ),
        ]
    }
}

/// Select the processor for the platform family.
#[must_use]
pub fn for_platform(platform: &Platform) -> Box<dyn Processor> {
    match platform.family() {
        Family::Nix => Box::new(NixProcessor),
        Family::Windows => Box::new(WindowsProcessor),
    }
}

/// Load a rendered document; a missing file is an empty document.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_rendered(path: &Path) -> Result<Mapping> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            tracing::debug!("{} not found, treating as empty", path.display());
            return Ok(Mapping::new());
        }
        Err(e) => return Err(e).with_context(|| format!("reading {}", path.display())),
    };
    parse_document(&raw).with_context(|| format!("parsing {}", path.display()))
}

/// Escape embedded double quotes for a double-quoted shell word.
#[must_use]
pub fn escape_double_quotes(s: &str) -> String {
    s.replace('"', "\\\"")
}

/// Scalar leaf as text; nested collections and nulls yield `None`.
pub(crate) fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}


#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::platform::Os;

    #[test]
    fn processor_selection_follows_family() {
        assert_eq!(for_platform(&Platform::new(Os::Linux)).name(), "nix");
        assert_eq!(for_platform(&Platform::new(Os::Mac)).name(), "nix");
        assert_eq!(for_platform(&Platform::new(Os::Windows)).name(), "windows");
    }

    #[test]
    fn missing_rendered_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let doc = load_rendered(&dir.path().join(GIT_CONFIG_FILE)).unwrap();
        assert!(doc.is_empty());
    }

    #[test]
    fn malformed_rendered_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SHELL_CONFIG_FILE);
        fs::write(&path, "aliases: [oops\n").unwrap();
        let err = load_rendered(&path).unwrap_err();
        assert!(format!("{err:#}").contains(SHELL_CONFIG_FILE));
    }

    #[test]
    fn escape_double_quotes_escapes_every_quote() {
        assert_eq!(
            escape_double_quotes(r#"log --format="%h %s""#),
            r#"log --format=\"%h %s\""#
        );
    }

    #[test]
    fn scalar_text_stringifies_scalars_only() {
        assert_eq!(scalar_text(&Value::from("x")).as_deref(), Some("x"));
        assert_eq!(scalar_text(&Value::from(3)).as_deref(), Some("3"));
        assert_eq!(scalar_text(&Value::from(true)).as_deref(), Some("true"));
        assert_eq!(scalar_text(&Value::Null), None);
        assert_eq!(scalar_text(&Value::Sequence(vec![])), None);
    }
}
