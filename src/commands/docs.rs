//! Docs commands - API documentation with pdoc.

use std::fs;

use owo_colors::OwoColorize;

use crate::TaskContext;
use crate::error_fmt::{AppError, IoResultExt};
use crate::runner::CommandLine;

/// Flags shared by the docs commands, config defaults when unset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocsOptions {
    pub format: Option<String>,
    pub output_dir: Option<String>,
    pub port: Option<u16>,
}

fn pdoc(ctx: &TaskContext<'_>, opts: &DocsOptions) -> CommandLine {
    let format = opts.format.as_deref().unwrap_or(&ctx.config().docs.format);
    CommandLine::new("uv")
        .args(["run", "pdoc"])
        .arg(format!("--docformat={}", format))
}

/// Write the HTML docs of `src/<package>` to the output directory.
pub fn api(ctx: &TaskContext<'_>, package: &str, opts: &DocsOptions) -> Result<(), AppError> {
    let output_dir = opts
        .output_dir
        .as_deref()
        .unwrap_or(&ctx.config().docs.output_dir);
    let cmd = pdoc(ctx, opts)
        .arg(format!("--output-directory={}", output_dir))
        .arg(format!("src/{}", package));
    ctx.runner().stream(&cmd)?;
    Ok(())
}

/// Serve the docs of `src/<package>` on localhost.
pub fn serve(ctx: &TaskContext<'_>, package: &str, opts: &DocsOptions) -> Result<(), AppError> {
    let port = opts.port.unwrap_or(ctx.config().docs.port);
    let cmd = pdoc(ctx, opts)
        .arg(format!("--port={}", port))
        .arg(format!("src/{}", package));
    ctx.runner().stream(&cmd)?;
    Ok(())
}

/// Clear the output directory, regenerate the docs, then serve them.
pub fn all(ctx: &TaskContext<'_>, package: &str, opts: &DocsOptions) -> Result<(), AppError> {
    let output_dir = opts
        .output_dir
        .as_deref()
        .unwrap_or(&ctx.config().docs.output_dir);
    let path = ctx.root().join(output_dir);
    if path.is_dir() {
        fs::remove_dir_all(&path)
            .with_context(&format!("failed to remove {}", path.display()))?;
        println!("{} {}", "removed".red(), path.display().to_string().cyan());
    }
    api(ctx, package, opts)?;
    serve(ctx, package, opts)
}
