//! Command: re-render and re-apply an existing output directory.
use anyhow::Result;
use std::path::Path;

use super::{Host, canonical_dir, ensure_template_dir, render_and_apply};
use crate::cache::{FileStore, KEY_REPOSITORY_PATH, Store as _};
use crate::cli::{GlobalOpts, RefreshOpts};
use crate::error::CacheError;
use crate::logging::Logger;

/// Run the refresh command.
///
/// The repository path comes from the cache written by `setup`; cached
/// answers are reused wherever templates allow it.
///
/// # Errors
///
/// Returns an error if the output directory has no cache, the cache lacks the
/// repository path, the repository is gone, or the pipeline fails.
pub fn run(global: &GlobalOpts, opts: &RefreshOpts, host: &Host, log: &Logger) -> Result<()> {
    log.info(&format!("devstrap {}", super::version::version()));

    log.stage("Reading run metadata");
    let out_dir = canonical_dir(&opts.out_dir)?;
    let store = FileStore::in_dir(&out_dir);
    if !store.exists() {
        anyhow::bail!(
            "{} has no cache; run `devstrap setup` first",
            out_dir.display()
        );
    }

    let repo = store
        .get(KEY_REPOSITORY_PATH)?
        .ok_or_else(|| CacheError::MissingKey {
            path: store.path().to_path_buf(),
            key: KEY_REPOSITORY_PATH.to_string(),
        })?;
    let repo = canonical_dir(Path::new(&repo))?;
    ensure_template_dir(&repo)?;
    log.info(&format!("repository: {}", repo.display()));
    log.info(&format!("output: {}", out_dir.display()));

    render_and_apply(&repo, &out_dir, host, &store, global.dry_run, log)
}
