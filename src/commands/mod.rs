pub mod refresh;
pub mod setup;
pub mod version;

use anyhow::{Context as _, Result};
use std::path::{Path, PathBuf};

use crate::cache::Store;
use crate::exec::Executor;
use crate::logging::{Logger, TaskStatus};
use crate::materialize::materialize;
use crate::platform::Platform;
use crate::processor::{self, Context, GIT_CONFIG_FILE, SHELL_CONFIG_FILE, load_rendered};
use crate::prompt::AnswerProvider;
use crate::requirements::Resolver;
use crate::template::Renderer;

/// Directory inside the repository holding the templates.
pub const TEMPLATE_DIR: &str = "config_template";

/// Directory inside the output directory receiving rendered files.
pub const RENDERED_DIR: &str = "config";

/// Environment variable naming the default template repository.
pub const REPO_ENV_VAR: &str = "DEVSTRAP_REPO";

/// The machine being configured and the ways of talking to it.
pub struct Host<'a> {
    /// Detected platform.
    pub platform: Platform,
    /// Runs external commands.
    pub executor: &'a dyn Executor,
    /// Source of interactive answers.
    pub answers: &'a dyn AnswerProvider,
    /// User's home directory.
    pub home: PathBuf,
}

impl std::fmt::Debug for Host<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Host")
            .field("platform", &self.platform)
            .field("executor", &self.executor)
            .field("answers", &"<dyn AnswerProvider>")
            .field("home", &self.home)
            .finish()
    }
}

/// Render `<repo>/config_template` into `<out_dir>/config` and apply the
/// rendered git and shell documents, then print the summary.
///
/// # Errors
///
/// Returns an error if rendering fails, a rendered document is malformed, or
/// any processor step failed.
pub fn render_and_apply(
    repo: &Path,
    out_dir: &Path,
    host: &Host,
    store: &dyn Store,
    dry_run: bool,
    log: &Logger,
) -> Result<()> {
    let template_dir = repo.join(TEMPLATE_DIR);
    let rendered_dir = out_dir.join(RENDERED_DIR);

    log.stage("Rendering templates");
    log.debug(&format!("templates: {}", template_dir.display()));
    let renderer = Renderer::new(Resolver::new(store, host.answers), host.platform);
    let written = materialize(&template_dir, &rendered_dir, &renderer)?;
    if written.is_empty() {
        log.warn(&format!("no templates found in {}", template_dir.display()));
    } else {
        log.info(&format!(
            "rendered {} file(s) into {}",
            written.len(),
            rendered_dir.display()
        ));
    }

    let processor = processor::for_platform(&host.platform);
    log.stage(&format!("Applying configuration ({})", processor.name()));
    if dry_run {
        log.dry_run("git, alias and PATH changes are logged but not applied");
    }
    let git_doc = load_rendered(&rendered_dir.join(GIT_CONFIG_FILE))?;
    let shell_doc = load_rendered(&rendered_dir.join(SHELL_CONFIG_FILE))?;

    let ctx = Context {
        platform: host.platform,
        executor: host.executor,
        store,
        answers: host.answers,
        home: host.home.clone(),
        dry_run,
    };
    for (name, result) in processor.apply(&git_doc, &shell_doc, out_dir, &ctx) {
        let (status, message) = TaskStatus::from_step(&result);
        if let Some(msg) = message.as_deref()
            && status == TaskStatus::Failed
        {
            log.error(&format!("{name}: {msg}"));
        }
        log.record_task(name, status, message.as_deref());
    }

    log.print_summary();

    let count = log.failure_count();
    if count > 0 {
        anyhow::bail!("{count} step(s) failed");
    }
    Ok(())
}

/// Fail unless `repo` contains a template directory.
///
/// # Errors
///
/// Returns an error naming the missing directory.
pub fn ensure_template_dir(repo: &Path) -> Result<()> {
    let dir = repo.join(TEMPLATE_DIR);
    if !dir.is_dir() {
        anyhow::bail!("{} has no {TEMPLATE_DIR}/ directory", repo.display());
    }
    Ok(())
}

/// Canonicalize an existing directory, keeping Windows paths free of `\\?\`.
///
/// # Errors
///
/// Returns an error if the path does not exist.
pub fn canonical_dir(path: &Path) -> Result<PathBuf> {
    dunce::canonicalize(path).with_context(|| format!("resolving {}", path.display()))
}
