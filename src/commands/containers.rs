//! Container commands - build and run the project image, serve MLflow.

use super::shared::open_browser;
use crate::TaskContext;
use crate::error_fmt::AppError;
use crate::runner::CommandLine;

/// Flags of `containers run`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// Image tag, the configured one when unset.
    pub tag: Option<String>,
    pub port: Option<u16>,
    pub gpus: Option<String>,
    pub source: Option<String>,
    pub dest: Option<String>,
    pub open: bool,
}

/// Flags of `containers mlserver`, config defaults when unset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MlServerOptions {
    pub source: Option<String>,
    pub dest: Option<String>,
    pub port: Option<u16>,
    pub mlflow_version: Option<String>,
    pub open: bool,
}

fn image(ctx: &TaskContext<'_>, tag: Option<&str>) -> Result<String, AppError> {
    let repo = ctx.gh().current_repo()?;
    let tag = tag.unwrap_or(&ctx.config().containers.image_tag);
    Ok(format!("{}:{}", repo.name, tag))
}

pub fn build(ctx: &TaskContext<'_>, tag: Option<&str>) -> Result<(), AppError> {
    let image = image(ctx, tag)?;
    let cmd = CommandLine::new("docker")
        .arg("build")
        .arg(format!("--tag={}", image))
        .arg(".");
    ctx.runner().stream(&cmd)?;
    Ok(())
}

pub fn run(ctx: &TaskContext<'_>, opts: &RunOptions) -> Result<(), AppError> {
    let image = image(ctx, opts.tag.as_deref())?;
    let mut cmd = CommandLine::new("docker").args(["run", "--rm", "-it"]);
    if let Some(port) = opts.port {
        cmd = cmd.args(["-p".to_string(), format!("{}:{}", port, port)]);
    }
    if let Some(gpus) = &opts.gpus {
        cmd = cmd.args(["--gpus", gpus.as_str()]);
    }
    if let (Some(source), Some(dest)) = (&opts.source, &opts.dest) {
        cmd = cmd.args(["-v".to_string(), format!("{}:{}", source, dest)]);
    }
    ctx.runner().stream(&cmd.arg(image))?;

    if opts.open {
        match opts.port {
            Some(port) => open_browser(ctx, &format!("http://localhost:{}", port))?,
            None => tracing::warn!("--open needs --port, not opening a browser"),
        }
    }
    Ok(())
}

/// Serve the MLflow tracking UI from `<root>/<source>` in a container.
pub fn mlserver(ctx: &TaskContext<'_>, opts: &MlServerOptions) -> Result<(), AppError> {
    let defaults = &ctx.config().containers;
    let port = opts.port.unwrap_or(defaults.mlflow_port);
    let version = opts.mlflow_version.as_deref().unwrap_or(&defaults.mlflow_version);
    let source = ctx.root().join(opts.source.as_deref().unwrap_or("mlruns"));
    let dest = opts.dest.as_deref().unwrap_or("mlruns");

    // The server blocks until stopped, so the browser goes first.
    if opts.open {
        open_browser(ctx, &format!("http://localhost:{}", port))?;
    }

    let cmd = CommandLine::new("docker")
        .args(["run".to_string(), "-p".to_string(), format!("{}:{}", port, port)])
        .args(["-e", "MLFLOW_HOST=0.0.0.0"])
        .arg("-v")
        .arg(format!("{}:/{}", source.display(), dest))
        .arg(format!("ghcr.io/mlflow/mlflow:{}", version))
        .args(["mlflow", "server", "--backend-store-uri"])
        .arg(format!("/{}", dest));
    ctx.runner().stream(&cmd)?;
    Ok(())
}

/// Build the image, then run it.
pub fn all(ctx: &TaskContext<'_>, opts: &RunOptions) -> Result<(), AppError> {
    build(ctx, opts.tag.as_deref())?;
    run(ctx, opts)
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::config::Config;
    use crate::prompt::testing::ScriptedPrompter;
    use crate::runner::CommandOutput;
    use crate::runner::testing::ScriptedRunner;

    const REPO: &str = "gh repo view --json owner,name";

    fn runner() -> ScriptedRunner {
        ScriptedRunner::new()
            .respond(REPO, CommandOutput::ok(r#"{"name":"widgets","owner":{"login":"acme"}}"#))
            .respond(REPO, CommandOutput::ok(r#"{"name":"widgets","owner":{"login":"acme"}}"#))
    }

    #[test]
    fn test_build_uses_configured_tag() {
        let mut config = Config::default();
        config.containers.image_tag = "dev".to_string();
        let runner = runner();
        let mut prompter = ScriptedPrompter::default();
        let ctx = TaskContext::new(&config, &runner, &mut prompter);

        build(&ctx, None).unwrap();

        assert_eq!(runner.calls()[1], "docker build --tag=widgets:dev .");
    }

    #[test]
    fn test_run_with_every_flag() {
        let config = Config {
            browser: Some("xdg-open".to_string()),
            ..Config::default()
        };
        let runner = runner();
        let mut prompter = ScriptedPrompter::default();
        let ctx = TaskContext::new(&config, &runner, &mut prompter);
        let opts = RunOptions {
            tag: Some("v1".to_string()),
            port: Some(8000),
            gpus: Some("all".to_string()),
            source: Some("data".to_string()),
            dest: Some("/data".to_string()),
            open: true,
        };

        run(&ctx, &opts).unwrap();

        assert_eq!(
            runner.calls()[1..],
            [
                "docker run --rm -it -p 8000:8000 --gpus all -v data:/data widgets:v1",
                "xdg-open http://localhost:8000",
            ]
        );
    }

    #[test]
    fn test_run_ignores_half_a_mount() {
        let config = Config::default();
        let runner = runner();
        let mut prompter = ScriptedPrompter::default();
        let ctx = TaskContext::new(&config, &runner, &mut prompter);
        let opts = RunOptions {
            source: Some("data".to_string()),
            ..RunOptions::default()
        };

        run(&ctx, &opts).unwrap();

        assert_eq!(runner.calls()[1], "docker run --rm -it widgets:latest");
    }

    #[test]
    fn test_mlserver_mounts_source_under_root() {
        let config = Config::default();
        let runner = ScriptedRunner::new();
        let mut prompter = ScriptedPrompter::default();
        let ctx = TaskContext::new(&config, &runner, &mut prompter).with_root(Path::new("/work"));

        mlserver(&ctx, &MlServerOptions::default()).unwrap();

        assert_eq!(
            runner.calls(),
            vec![
                "docker run -p 5000:5000 -e MLFLOW_HOST=0.0.0.0 -v /work/mlruns:/mlruns \
                 ghcr.io/mlflow/mlflow:v2.19.0 mlflow server --backend-store-uri /mlruns"
            ]
        );
    }

    #[test]
    fn test_all_builds_then_runs() {
        let config = Config::default();
        let runner = runner();
        let mut prompter = ScriptedPrompter::default();
        let ctx = TaskContext::new(&config, &runner, &mut prompter);

        all(&ctx, &RunOptions::default()).unwrap();

        assert_eq!(
            runner.calls(),
            vec![
                REPO,
                "docker build --tag=widgets:latest .",
                REPO,
                "docker run --rm -it widgets:latest",
            ]
        );
    }
}
