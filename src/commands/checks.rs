//! Checks commands - format, types, lint, tests, security and coverage.

use crate::TaskContext;
use crate::error_fmt::AppError;
use crate::runner::CommandLine;

/// The configured check folders that exist under the project root, as `dir/`.
pub fn available_folders(ctx: &TaskContext<'_>) -> Vec<String> {
    ctx.config()
        .checks
        .folders
        .iter()
        .filter(|f| ctx.root().join(f).exists())
        .map(|f| format!("{}/", f.trim_end_matches('/')))
        .collect()
}

fn uv_run(tool: &str) -> CommandLine {
    CommandLine::new("uv").args(["run", tool])
}

fn has_tests(ctx: &TaskContext<'_>) -> bool {
    ctx.root().join("tests").is_dir()
}

pub fn format(ctx: &TaskContext<'_>) -> Result<(), AppError> {
    let cmd = uv_run("ruff")
        .args(["format", "--check"])
        .args(available_folders(ctx));
    ctx.runner().stream(&cmd)?;
    Ok(())
}

pub fn types(ctx: &TaskContext<'_>) -> Result<(), AppError> {
    let cmd = uv_run("mypy").args(available_folders(ctx));
    ctx.runner().stream(&cmd)?;
    Ok(())
}

pub fn code(ctx: &TaskContext<'_>) -> Result<(), AppError> {
    let cmd = uv_run("ruff").arg("check").args(available_folders(ctx));
    ctx.runner().stream(&cmd)?;
    Ok(())
}

pub fn test(ctx: &TaskContext<'_>) -> Result<(), AppError> {
    if !has_tests(ctx) {
        println!("No tests folder found.");
        return Ok(());
    }
    let cmd = uv_run("pytest").args(["--numprocesses=auto", "tests/"]);
    ctx.runner().stream(&cmd)?;
    Ok(())
}

pub fn security(ctx: &TaskContext<'_>) -> Result<(), AppError> {
    let cmd = uv_run("bandit").args(["--recursive", "--configfile=pyproject.toml", "src/"]);
    ctx.runner().stream(&cmd)?;
    Ok(())
}

/// Tests with a coverage floor of `checks.coverage_threshold` percent.
pub fn coverage(ctx: &TaskContext<'_>) -> Result<(), AppError> {
    if !has_tests(ctx) {
        println!("No tests folder found.");
        return Ok(());
    }
    let cmd = uv_run("pytest")
        .args(["--numprocesses=auto", "--cov=src/"])
        .arg(format!(
            "--cov-fail-under={}",
            ctx.config().checks.coverage_threshold
        ))
        .arg("tests/");
    ctx.runner().stream(&cmd)?;
    Ok(())
}

/// Every check in turn, stopping at the first failure.
pub fn all(ctx: &TaskContext<'_>) -> Result<(), AppError> {
    format(ctx)?;
    types(ctx)?;
    code(ctx)?;
    security(ctx)?;
    coverage(ctx)
}
