//! Windows processor: one batch file per alias, made reachable by adding the
//! output directory to the persistent user PATH.
use anyhow::Result;
use serde_yaml::Mapping;
use std::fs;
use std::path::Path;

use super::aliases::merged_aliases;
use super::{Context, Processor, ShellAliases, StepResult};
use crate::error::ProcessError;
use crate::logging::DRY_RUN_TARGET;

/// `setx` silently truncates values longer than this.
const SETX_MAX_LEN: usize = 1024;

/// Registry key holding the persistent user environment.
const USER_ENV_KEY: &str = r"HKCU\Environment";

/// Processor for Windows hosts.
#[derive(Debug, Clone, Copy, Default)]
pub struct WindowsProcessor;

impl Processor for WindowsProcessor {
    fn name(&self) -> &'static str {
        "windows"
    }

    fn process_shell_config(
        &self,
        shell: &Mapping,
        out_dir: &Path,
        ctx: &Context,
    ) -> Result<StepResult> {
        let aliases = merged_aliases(shell, &ctx.platform);
        if aliases.is_empty() {
            return Ok(StepResult::Skipped("no aliases defined".to_string()));
        }

        if ctx.dry_run {
            for name in aliases.keys() {
                tracing::info!(
                    target: DRY_RUN_TARGET,
                    "would write {}",
                    out_dir.join(batch_file_name(name)).display()
                );
            }
            tracing::info!(
                target: DRY_RUN_TARGET,
                "would add {} to the user PATH",
                out_dir.display()
            );
            return Ok(StepResult::DryRun);
        }

        write_batch_files(&aliases, out_dir)?;
        tracing::info!("wrote {} alias batch files", aliases.len());
        ensure_on_user_path(out_dir, ctx)?;
        Ok(StepResult::Ok)
    }
}

/// File name of the batch script for an alias.
#[must_use]
pub fn batch_file_name(alias: &str) -> String {
    format!("{alias}.bat")
}

/// Write each alias command to `<out_dir>/<alias>.bat`.
///
/// # Errors
///
/// Returns an error if a file cannot be written.
pub fn write_batch_files(aliases: &ShellAliases, out_dir: &Path) -> Result<(), ProcessError> {
    for (name, command) in aliases {
        let path = out_dir.join(batch_file_name(name));
        fs::write(&path, format!("{command}\r\n"))
            .map_err(|source| ProcessError::Write { path, source })?;
    }
    Ok(())
}

/// Extract the `Path` value from `reg query HKCU\Environment` output.
#[must_use]
pub fn parse_reg_path(stdout: &str) -> Option<String> {
    stdout.lines().find_map(|line| {
        let (name, rest) = line.trim_start().split_once(char::is_whitespace)?;
        let rest = rest.trim_start();
        let (kind, value) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
        (name.eq_ignore_ascii_case("path") && kind.starts_with("REG_"))
            .then(|| value.trim().to_string())
    })
}

/// Whether `dir` is already an entry of a `;`-separated PATH value.
#[must_use]
pub fn path_contains(path_value: &str, dir: &str) -> bool {
    let normalize = |s: &str| s.trim().trim_end_matches(['\\', '/']).to_ascii_lowercase();
    let wanted = normalize(dir);
    path_value.split(';').any(|entry| normalize(entry) == wanted)
}

/// Read the persistent user PATH.
///
/// The whole environment key is queried so that a key without a `Path`
/// value reads as an empty PATH, while any failed or unrecognised query is
/// an error.
///
/// # Errors
///
/// Returns an error if `reg` cannot be run, fails, or prints output that is
/// not a listing of the environment key.
pub fn read_user_path(ctx: &Context) -> Result<String> {
    let query = ctx.executor.run_unchecked("reg", &["query", USER_ENV_KEY])?;
    if !query.success {
        return Err(ProcessError::CommandFailed {
            command: format!("reg query {USER_ENV_KEY}"),
            exit_code: query.code.unwrap_or(-1),
            stderr: query.stderr.trim().to_string(),
        }
        .into());
    }
    if !query
        .stdout
        .to_ascii_uppercase()
        .contains(r"HKEY_CURRENT_USER\ENVIRONMENT")
    {
        anyhow::bail!("unexpected output from reg query {USER_ENV_KEY}, leaving PATH untouched");
    }
    Ok(parse_reg_path(&query.stdout).unwrap_or_default())
}

/// Add `out_dir` to the persistent user PATH unless already present.
///
/// # Errors
///
/// Returns an error if the current PATH cannot be read, or if `setx` cannot
/// be run or fails.
pub fn ensure_on_user_path(out_dir: &Path, ctx: &Context) -> Result<()> {
    let dir = out_dir.display().to_string();
    let current = read_user_path(ctx)?;

    if path_contains(&current, &dir) {
        tracing::debug!("{dir} already on the user PATH");
        return Ok(());
    }

    let trimmed = current.trim_end_matches(';');
    let updated = if trimmed.is_empty() {
        dir.clone()
    } else {
        format!("{trimmed};{dir}")
    };
    if updated.len() > SETX_MAX_LEN {
        tracing::warn!(
            "user PATH is {} characters; setx truncates at {SETX_MAX_LEN}",
            updated.len()
        );
    }

    let result = ctx.executor.run_unchecked("setx", &["PATH", &updated])?;
    if !result.success {
        return Err(ProcessError::CommandFailed {
            command: format!("setx PATH \"{updated}\""),
            exit_code: result.code.unwrap_or(-1),
            stderr: result.stderr.trim().to_string(),
        }
        .into());
    }
    tracing::info!("added {dir} to the user PATH");
    Ok(())
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::cache::MemoryStore;
    use crate::platform::Os;
    use crate::processor::test_helpers::{RecordingExecutor, context};
    use crate::prompt::ScriptedAnswers;
    use crate::template::parse_document;
    use std::path::PathBuf;

    const REG_OUTPUT: &str = "\r\nHKEY_CURRENT_USER\\Environment\r\n    Path    REG_EXPAND_SZ    C:\\Users\\ava\\bin;C:\\Tools\r\n\r\n";

    #[test]
    fn parse_reg_path_reads_value() {
        assert_eq!(
            parse_reg_path(REG_OUTPUT).as_deref(),
            Some("C:\\Users\\ava\\bin;C:\\Tools")
        );
        assert_eq!(parse_reg_path("ERROR: not found"), None);
    }

    #[test]
    fn parse_reg_path_keeps_spaces_in_value() {
        let out = "    PATH    REG_SZ    C:\\Program Files\\x;C:\\y\r\n";
        assert_eq!(
            parse_reg_path(out).as_deref(),
            Some("C:\\Program Files\\x;C:\\y")
        );
    }

    #[test]
    fn path_contains_ignores_case_and_trailing_separator() {
        assert!(path_contains("C:\\Tools\\;C:\\bin", "c:\\tools"));
        assert!(!path_contains("C:\\Tools2", "C:\\Tools"));
        assert!(!path_contains("", "C:\\Tools"));
    }

    #[test]
    fn writes_one_batch_file_per_alias() {
        let out = tempfile::tempdir().unwrap();
        let aliases: ShellAliases = [
            ("ll".to_string(), "dir".to_string()),
            ("gs".to_string(), "git status".to_string()),
        ]
        .into();
        write_batch_files(&aliases, out.path()).unwrap();
        assert_eq!(fs::read_to_string(out.path().join("ll.bat")).unwrap(), "dir\r\n");
        assert_eq!(
            fs::read_to_string(out.path().join("gs.bat")).unwrap(),
            "git status\r\n"
        );
    }

    #[test]
    fn appends_out_dir_to_user_path() {
        let executor = RecordingExecutor::new().respond(true, REG_OUTPUT);
        let store = MemoryStore::new();
        let answers = ScriptedAnswers::new(Vec::<String>::new());
        let ctx = context(
            Os::Windows,
            &executor,
            &store,
            &answers,
            PathBuf::from("C:\\Users\\ava"),
        );

        ensure_on_user_path(Path::new("D:\\aliases"), &ctx).unwrap();
        let calls = executor.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(
            calls[1],
            vec!["setx", "PATH", "C:\\Users\\ava\\bin;C:\\Tools;D:\\aliases"]
        );
    }

    #[test]
    fn skips_setx_when_already_on_path() {
        let executor = RecordingExecutor::new().respond(true, REG_OUTPUT);
        let store = MemoryStore::new();
        let answers = ScriptedAnswers::new(Vec::<String>::new());
        let ctx = context(
            Os::Windows,
            &executor,
            &store,
            &answers,
            PathBuf::from("C:\\Users\\ava"),
        );

        ensure_on_user_path(Path::new("C:\\Tools"), &ctx).unwrap();
        assert_eq!(executor.calls().len(), 1);
    }

    #[test]
    fn missing_user_path_starts_fresh() {
        let executor = RecordingExecutor::new().respond(
            true,
            "\r\nHKEY_CURRENT_USER\\Environment\r\n    TEMP    REG_EXPAND_SZ    C:\\Temp\r\n\r\n",
        );
        let store = MemoryStore::new();
        let answers = ScriptedAnswers::new(Vec::<String>::new());
        let ctx = context(
            Os::Windows,
            &executor,
            &store,
            &answers,
            PathBuf::from("C:\\Users\\ava"),
        );

        ensure_on_user_path(Path::new("D:\\aliases"), &ctx).unwrap();
        assert_eq!(executor.calls()[1], vec!["setx", "PATH", "D:\\aliases"]);
    }

    #[test]
    fn failed_query_leaves_user_path_untouched() {
        let executor = RecordingExecutor::new().respond(false, "");
        let store = MemoryStore::new();
        let answers = ScriptedAnswers::new(Vec::<String>::new());
        let ctx = context(
            Os::Windows,
            &executor,
            &store,
            &answers,
            PathBuf::from("C:\\Users\\ava"),
        );

        let err = ensure_on_user_path(Path::new("D:\\aliases"), &ctx).unwrap_err();
        assert!(err.to_string().contains("reg query"), "got {err}");
        let calls = executor.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0], vec!["reg", "query", "HKCU\\Environment"]);
    }

    #[test]
    fn unrecognised_query_output_leaves_user_path_untouched() {
        let executor = RecordingExecutor::new().respond(true, "Access is denied.\r\n");
        let store = MemoryStore::new();
        let answers = ScriptedAnswers::new(Vec::<String>::new());
        let ctx = context(
            Os::Windows,
            &executor,
            &store,
            &answers,
            PathBuf::from("C:\\Users\\ava"),
        );

        assert!(ensure_on_user_path(Path::new("D:\\aliases"), &ctx).is_err());
        assert_eq!(executor.calls().len(), 1);
    }

    #[test]
    fn failed_setx_is_an_error() {
        let executor = RecordingExecutor::new()
            .respond(true, REG_OUTPUT)
            .respond(false, "");
        let store = MemoryStore::new();
        let answers = ScriptedAnswers::new(Vec::<String>::new());
        let ctx = context(
            Os::Windows,
            &executor,
            &store,
            &answers,
            PathBuf::from("C:\\Users\\ava"),
        );

        let err = ensure_on_user_path(Path::new("D:\\aliases"), &ctx).unwrap_err();
        assert!(err.to_string().contains("setx"), "got {err}");
    }

    #[test]
    fn process_shell_config_merges_windows_aliases() {
        let out = tempfile::tempdir().unwrap();
        let executor = RecordingExecutor::new().respond(true, REG_OUTPUT);
        let store = MemoryStore::new();
        let answers = ScriptedAnswers::new(Vec::<String>::new());
        let ctx = context(
            Os::Windows,
            &executor,
            &store,
            &answers,
            PathBuf::from("C:\\Users\\ava"),
        );
        let doc = parse_document("aliases:\n  ll: ls -la\nwindows:\n  aliases:\n    ll: dir\n")
            .unwrap();

        let result = WindowsProcessor
            .process_shell_config(&doc, out.path(), &ctx)
            .unwrap();
        assert_eq!(result, StepResult::Ok);
        assert_eq!(fs::read_to_string(out.path().join("ll.bat")).unwrap(), "dir\r\n");
        assert!(!out.path().join("main.sh").exists());
    }

    #[test]
    fn no_aliases_is_skipped() {
        let out = tempfile::tempdir().unwrap();
        let executor = RecordingExecutor::new();
        let store = MemoryStore::new();
        let answers = ScriptedAnswers::new(Vec::<String>::new());
        let ctx = context(
            Os::Windows,
            &executor,
            &store,
            &answers,
            PathBuf::from("C:\\Users\\ava"),
        );

        let result = WindowsProcessor
            .process_shell_config(&Mapping::new(), out.path(), &ctx)
            .unwrap();
        assert!(matches!(result, StepResult::Skipped(_)));
        assert!(executor.calls().is_empty());
    }
}
