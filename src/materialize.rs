//! Render a directory of templates into a directory of config files.
use anyhow::{Context as _, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::template::Renderer;

/// Extension of template files.
pub const TEMPLATE_EXTENSION: &str = "yaml";

/// List the template files directly inside `input_dir`, sorted by name.
///
/// # Errors
///
/// Returns an error if the directory cannot be read.
pub fn template_files(input_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(input_dir)
        .with_context(|| format!("reading template directory {}", input_dir.display()))?
    {
        let entry = entry.with_context(|| format!("reading entry in {}", input_dir.display()))?;
        let path = entry.path();
        if path.is_file()
            && path
                .extension()
                .is_some_and(|ext| ext == TEMPLATE_EXTENSION)
        {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Render every template in `input_dir` into `output_dir` under the same file
/// name, overwriting existing files.
///
/// Stops at the first template that fails; files written before it are left
/// in place. Returns the written paths.
///
/// # Errors
///
/// Returns an error naming the template that could not be read, rendered or
/// written.
pub fn materialize(
    input_dir: &Path,
    output_dir: &Path,
    renderer: &Renderer,
) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(output_dir)
        .with_context(|| format!("creating output directory {}", output_dir.display()))?;

    let mut written = Vec::new();
    for template in template_files(input_dir)? {
        let Some(file_name) = template.file_name() else {
            continue;
        };
        let target = output_dir.join(file_name);

        let raw = fs::read_to_string(&template)
            .with_context(|| format!("reading template {}", template.display()))?;
        let rendered = renderer
            .render(&raw)
            .with_context(|| format!("rendering template {}", template.display()))?;
        fs::write(&target, rendered)
            .with_context(|| format!("writing {}", target.display()))?;

        tracing::debug!("rendered {} -> {}", template.display(), target.display());
        written.push(target);
    }
    Ok(written)
}
