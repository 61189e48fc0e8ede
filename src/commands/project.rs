//! Project commands - export requirements and environments, run MLflow jobs.

use std::fs;

use owo_colors::OwoColorize;
use serde::Serialize;

use crate::TaskContext;
use crate::error_fmt::{AppError, IoResultExt};
use crate::runner::CommandLine;

const PYTHON_VERSION: &str = ".python-version";
const REQUIREMENTS: &str = "requirements.txt";
const ENVIRONMENT: &str = "python_env.yaml";

/// Contents of `python_env.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PythonEnvironment {
    pub python: String,
    pub dependencies: Vec<String>,
}

impl PythonEnvironment {
    /// JSON indented by four spaces, which is also valid YAML.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.serialize(&mut ser)?;
        let mut out = String::from_utf8_lossy(&buf).into_owned();
        out.push('\n');
        Ok(out)
    }
}

/// Package pins from a requirements file: the first word of each line,
/// without blank lines, comments and `pywin32`.
pub fn parse_requirements(content: &str) -> Vec<String> {
    content
        .lines()
        .filter_map(|line| line.split(' ').next())
        .map(str::trim)
        .filter(|dep| !dep.is_empty() && !dep.contains('#') && !dep.contains("pywin32"))
        .map(str::to_string)
        .collect()
}

/// `train` -> `Train`
pub fn run_name(job: &str) -> String {
    let mut chars = job.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// Export `requirements.txt` from the uv lock file.
pub fn requirements(ctx: &TaskContext<'_>) -> Result<(), AppError> {
    let cmd = CommandLine::new("uv").args([
        "export".to_string(),
        "--format=requirements-txt".to_string(),
        "--no-dev".to_string(),
        "--no-hashes".to_string(),
        "--no-editable".to_string(),
        "--no-emit-project".to_string(),
        format!("--output-file={}", REQUIREMENTS),
    ]);
    ctx.runner().stream(&cmd)?;
    Ok(())
}

/// Export requirements, then write the MLflow `python_env.yaml`.
pub fn environment(ctx: &TaskContext<'_>) -> Result<(), AppError> {
    requirements(ctx)?;

    let root = ctx.root();
    let version_path = root.join(PYTHON_VERSION);
    if !version_path.exists() {
        return Err(AppError::MissingFile {
            path: version_path.display().to_string(),
            hint: format!("Pin the interpreter: {}", "uv python pin 3.12".cyan()),
        });
    }
    let python = fs::read_to_string(&version_path)
        .with_context(&format!("failed to read {}", version_path.display()))?
        .trim()
        .to_string();

    let requirements_path = root.join(REQUIREMENTS);
    let content = fs::read_to_string(&requirements_path)
        .with_context(&format!("failed to read {}", requirements_path.display()))?;

    let env = PythonEnvironment {
        python,
        dependencies: parse_requirements(&content),
    };
    let json = env.to_json().map_err(|e| AppError::Io {
        context: format!("failed to encode {}", ENVIRONMENT),
        source: e.into(),
    })?;

    let env_path = root.join(ENVIRONMENT);
    fs::write(&env_path, json).with_context(&format!("failed to write {}", env_path.display()))?;
    println!(
        "{} {} ({} dependencies)",
        "wrote".green(),
        env_path.display().to_string().cyan(),
        env.dependencies.len()
    );
    Ok(())
}

/// Export requirements, then run `confs/<job>.yaml` as an MLflow project.
pub fn run(ctx: &TaskContext<'_>, job: &str) -> Result<(), AppError> {
    requirements(ctx)?;
    let repo = ctx.gh().current_repo()?;
    let cmd = CommandLine::new("uv")
        .args(["run", "mlflow", "run"])
        .arg(format!("--experiment-name={}", repo.name))
        .arg(format!("--run-name={}", run_name(job)))
        .arg("-P")
        .arg(format!("conf_file=confs/{}.yaml", job))
        .arg(".");
    ctx.runner().stream(&cmd)?;
    Ok(())
}
