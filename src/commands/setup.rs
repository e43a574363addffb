//! Command: first-time setup of an output directory.
use anyhow::{Context as _, Result};
use std::fs;
use std::path::{Path, PathBuf};

use super::{Host, REPO_ENV_VAR, TEMPLATE_DIR, canonical_dir, ensure_template_dir, render_and_apply};
use crate::cache::{FileStore, KEY_OUT_DIR, KEY_REPOSITORY_PATH, Store as _};
use crate::cli::{GlobalOpts, SetupOpts};
use crate::logging::Logger;
use crate::processor::nix::expand_path;
use crate::requirements::question_for;

/// Description used when asking for the output directory.
pub const DESCRIPTION_OUT_DIR: &str = "directory path where all the config files will be stored";

/// Run the setup command.
///
/// # Errors
///
/// Returns an error if the repository or output directory cannot be
/// resolved, the run metadata cannot be cached, or the pipeline fails.
pub fn run(global: &GlobalOpts, opts: &SetupOpts, host: &Host, log: &Logger) -> Result<()> {
    log.info(&format!("devstrap {}", super::version::version()));

    log.stage("Resolving directories");
    let repo = resolve_repo(opts.repo.as_deref())?;
    log.info(&format!("repository: {}", repo.display()));

    let out_dir = match &opts.out_dir {
        Some(dir) => std::path::absolute(dir)
            .with_context(|| format!("resolving {}", dir.display()))?,
        None => {
            let answer = host.answers.ask(&question_for(DESCRIPTION_OUT_DIR))?;
            expand_path(answer.trim(), &host.home, &repo)
        }
    };
    fs::create_dir_all(&out_dir)
        .with_context(|| format!("creating output directory {}", out_dir.display()))?;
    let out_dir = canonical_dir(&out_dir)?;
    log.info(&format!("output: {}", out_dir.display()));

    let store = FileStore::in_dir(&out_dir);
    store.write(KEY_OUT_DIR, &out_dir.display().to_string())?;
    store.write(KEY_REPOSITORY_PATH, &repo.display().to_string())?;
    log.debug(&format!("run metadata cached in {}", store.path().display()));

    render_and_apply(&repo, &out_dir, host, &store, global.dry_run, log)
}

/// Locate the template repository: the explicit path, then `DEVSTRAP_REPO`,
/// then the current directory if it contains `config_template/`.
///
/// # Errors
///
/// Returns an error if no candidate exists or it has no template directory.
pub fn resolve_repo(explicit: Option<&Path>) -> Result<PathBuf> {
    let candidate = if let Some(repo) = explicit {
        repo.to_path_buf()
    } else if let Some(repo) = std::env::var_os(REPO_ENV_VAR) {
        PathBuf::from(repo)
    } else {
        let cwd = std::env::current_dir()?;
        if !cwd.join(TEMPLATE_DIR).is_dir() {
            anyhow::bail!(
                "cannot find {TEMPLATE_DIR}/ in the current directory. Use --repo or set {REPO_ENV_VAR}"
            );
        }
        cwd
    };
    let repo = canonical_dir(&candidate)?;
    ensure_template_dir(&repo)?;
    Ok(repo)
}
