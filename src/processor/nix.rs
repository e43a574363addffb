//! Linux / macOS processor: aliases are written to a generated script that
//! the user's shell rc file sources on startup.
use anyhow::{Context as _, Result};
use serde_yaml::Mapping;
use std::fs;
use std::io::{self, Write as _};
use std::path::{Path, PathBuf};

use super::aliases::merged_aliases;
use super::{Context, Processor, ShellAliases, StepResult};
use crate::error::ProcessError;
use crate::logging::DRY_RUN_TARGET;
use crate::requirements::{Requirement, Resolver};

/// Name of the generated alias script inside the output directory.
pub const ALIAS_SCRIPT_NAME: &str = "main.sh";

/// Conventional rc files, checked in order under the home directory.
pub const RC_CANDIDATES: &[&str] = &[".zshrc", ".bashrc"];

/// Cache key remembering an explicitly entered rc file path.
pub const KEY_RC_PATH: &str = "rc_path";

const DESCRIPTION_RC_PATH: &str = "path of the rc file (~/.bashrc for example)";

/// Processor for the Nix family.
#[derive(Debug, Clone, Copy, Default)]
pub struct NixProcessor;

impl Processor for NixProcessor {
    fn name(&self) -> &'static str {
        "nix"
    }

    fn process_shell_config(
        &self,
        shell: &Mapping,
        out_dir: &Path,
        ctx: &Context,
    ) -> Result<StepResult> {
        let aliases = merged_aliases(shell, &ctx.platform);
        let script = out_dir.join(ALIAS_SCRIPT_NAME);
        let line = source_line(&script);

        if ctx.dry_run {
            tracing::info!(
                target: DRY_RUN_TARGET,
                "would write {} aliases to {}",
                aliases.len(),
                script.display()
            );
            tracing::info!(target: DRY_RUN_TARGET, "would add to shell rc file: {line}");
            return Ok(StepResult::DryRun);
        }

        fs::write(&script, alias_script(&aliases)).map_err(|source| ProcessError::Write {
            path: script.clone(),
            source,
        })?;
        tracing::info!("wrote {} aliases to {}", aliases.len(), script.display());

        let rc_file = locate_rc_file(ctx)?;
        if append_line_once(&rc_file, &line)? {
            tracing::info!("added source line to {}", rc_file.display());
        } else {
            tracing::debug!("{} already sources {}", rc_file.display(), script.display());
        }
        Ok(StepResult::Ok)
    }
}

/// Render aliases as `alias name="command"` lines.
///
/// The shell defines each command verbatim: backslashes, `"`, `$` and
/// backticks are escaped inside the double quotes.
#[must_use]
pub fn alias_script(aliases: &ShellAliases) -> String {
    aliases
        .iter()
        .map(|(name, command)| format!("alias {name}=\"{}\"\n", escape_for_double_quotes(command)))
        .collect()
}

/// Escape the characters a POSIX shell still interprets inside `"..."`.
#[must_use]
pub fn escape_for_double_quotes(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '\\' | '"' | '$' | '`') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// The rc file line that loads the generated script.
#[must_use]
pub fn source_line(script: &Path) -> String {
    format!("source \"{}\"", script.display())
}

/// Find the shell rc file to edit.
///
/// The first existing conventional rc file is offered for confirmation: an
/// empty answer or `y` accepts it, `n` declines it, anything else is taken
/// as the path to use. Without a candidate (or after declining) the path is
/// resolved as a cached requirement.
///
/// # Errors
///
/// Returns an error if the user aborts input.
pub fn locate_rc_file(ctx: &Context) -> Result<PathBuf> {
    if let Some(candidate) = RC_CANDIDATES
        .iter()
        .map(|name| ctx.home.join(name))
        .find(|path| path.is_file())
    {
        let question = format!("Use {} as your shell rc file? [Y/n] ", candidate.display());
        let answer = ctx.answers.ask(&question)?;
        let answer = answer.trim();
        match answer.to_ascii_lowercase().as_str() {
            "" | "y" | "yes" => return Ok(candidate),
            "n" | "no" => {}
            _ => return Ok(expand_path(answer, &ctx.home, &ctx.home)),
        }
    }

    let resolver = Resolver::new(ctx.store, ctx.answers);
    let answer = resolver.resolve(KEY_RC_PATH, &Requirement::new(DESCRIPTION_RC_PATH, true, true))?;
    Ok(expand_path(answer.trim(), &ctx.home, &ctx.home))
}

/// Expand a leading `~` to `home`; a path still relative afterwards is
/// joined to `base`.
#[must_use]
pub fn expand_path(raw: &str, home: &Path, base: &Path) -> PathBuf {
    let expanded = shellexpand::tilde_with_context(raw, || home.to_str());
    let path = PathBuf::from(expanded.as_ref());
    if path.is_absolute() { path } else { base.join(path) }
}

/// Append `line` to `path` unless an identical full line is present.
///
/// Creates the file if needed. Returns whether the line was appended.
///
/// # Errors
///
/// Returns an error if the file cannot be read or written.
pub fn append_line_once(path: &Path, line: &str) -> Result<bool> {
    let existing = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => String::new(),
        Err(e) => return Err(e).with_context(|| format!("reading {}", path.display())),
    };
    if existing.lines().any(|l| l.trim_end_matches('\r') == line) {
        return Ok(false);
    }

    let mut file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("opening {}", path.display()))?;
    let separator = if existing.is_empty() || existing.ends_with('\n') {
        ""
    } else {
        "\n"
    };
    writeln!(file, "{separator}{line}").with_context(|| format!("writing {}", path.display()))?;
    Ok(true)
}
