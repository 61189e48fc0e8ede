use std::fmt;
use std::io;

use owo_colors::OwoColorize;

use crate::config::SettingsError;
use crate::gh::ForgeError;
use crate::notes::NoteError;
use crate::prompt::PromptError;
use crate::runner::RunnerError;

/// Application error with context for actionable error messages.
#[derive(Debug)]
pub enum AppError {
    /// IO error with context
    Io { context: String, source: io::Error },
    /// Config file could not be loaded
    Settings { path: String, source: SettingsError },
    /// External command could not run or exited non-zero
    Command(RunnerError),
    /// gh produced output we could not read
    ForgeOutput(ForgeError),
    /// Interactive input failed
    Prompt(PromptError),
    /// Experiment note could not be written
    Note(NoteError),
    /// Body template failed to render
    Template(minijinja::Error),
    /// Issue has no label to prefix the branch name with
    IssueWithoutLabel(String),
    /// Required project file is absent
    MissingFile { path: String, hint: String },
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Io { context, source } => {
                write!(f, "{}", format_cli_error(&format!("{}: {}", context, source)))
            }
            AppError::Settings { path, source } => {
                write!(f, "{}", format_settings_error(path, source))
            }
            AppError::Command(source) => write!(f, "{}", format_command_error(source)),
            AppError::ForgeOutput(source) => write!(f, "{}", format_forge_error(source)),
            AppError::Prompt(source) => write!(f, "{}", format_prompt_error(source)),
            AppError::Note(source) => write!(f, "{}", format_note_error(source)),
            AppError::Template(source) => {
                write!(f, "{}", format_cli_error(&format!("failed to render body: {}", source)))
            }
            AppError::IssueWithoutLabel(issue) => {
                write!(f, "{}", format_issue_without_label(issue))
            }
            AppError::MissingFile { path, hint } => {
                write!(f, "{}", format_missing_file(path, hint))
            }
        }
    }
}

impl std::error::Error for AppError {}

/// Extension trait to add context to IO results.
pub trait IoResultExt<T> {
    fn with_context(self, context: &str) -> Result<T, AppError>;
}

impl<T> IoResultExt<T> for Result<T, io::Error> {
    fn with_context(self, context: &str) -> Result<T, AppError> {
        self.map_err(|e| AppError::Io {
            context: context.to_string(),
            source: e,
        })
    }
}

/// Extension trait to add the config path to settings results.
pub trait SettingsResultExt<T> {
    fn with_config_path(self, path: &str) -> Result<T, AppError>;
}

impl<T> SettingsResultExt<T> for Result<T, SettingsError> {
    fn with_config_path(self, path: &str) -> Result<T, AppError> {
        self.map_err(|e| AppError::Settings {
            path: path.to_string(),
            source: e,
        })
    }
}

// ============================================================================
// Formatting functions (internal implementation)
// ============================================================================

fn format_cli_error(message: &str) -> String {
    format!("{}: {}\n", "error".red().bold(), message)
}

fn format_settings_error(path: &str, error: &SettingsError) -> String {
    let mut out = String::new();

    out.push_str(&format!("{}: ", "error".red().bold()));
    out.push_str(&format!("failed to load {}\n", path.cyan()));
    out.push_str(&format!("  {} {}\n", "•".red(), error));
    out.push('\n');
    out.push_str(&format!("  {}:\n", "To fix this".bold()));
    out.push_str("    1. Check the YAML syntax and field names\n");
    out.push_str(&format!(
        "    2. Point at another file: {}\n",
        "gtasks --config path/to/.gtasks.yml ...".cyan()
    ));

    out
}

fn format_command_error(error: &RunnerError) -> String {
    let mut out = String::new();

    out.push_str(&format!("{}: ", "error".red().bold()));

    match error {
        RunnerError::Spawn { program, source } => {
            out.push_str(&format!("failed to execute {}\n", program.yellow()));
            out.push('\n');
            out.push_str(&format!("  {}\n", source.to_string().dimmed()));
            out.push('\n');
            out.push_str(&format!("  {}:\n", "To fix this".bold()));
            out.push_str(&format!(
                "    Install {} and make sure it is on your PATH\n",
                program.cyan()
            ));
        }
        RunnerError::Failed { command, code, stderr } => {
            match code {
                Some(code) => out.push_str(&format!("command exited with status {}\n", code)),
                None => out.push_str("command was terminated by a signal\n"),
            }
            out.push_str(&format!("  {}\n", command.cyan()));
            if !stderr.is_empty() {
                out.push('\n');
                for line in stderr.lines() {
                    out.push_str(&format!("  {}\n", line.dimmed()));
                }
            }
        }
    }

    out
}

fn format_forge_error(error: &ForgeError) -> String {
    match error {
        ForgeError::Command(e) => format_command_error(e),
        ForgeError::Json { what, source } => {
            let mut out = String::new();

            out.push_str(&format!("{}: ", "error".red().bold()));
            out.push_str(&format!("could not read {} output from gh\n", what));
            out.push('\n');
            out.push_str(&format!("  {}\n", source.to_string().dimmed()));
            out.push('\n');
            out.push_str(&format!("  {}:\n", "To fix this".bold()));
            out.push_str(&format!(
                "    1. Check that you are logged in: {}\n",
                "gh auth status".cyan()
            ));
            out.push_str(&format!(
                "    2. Update gh: {}\n",
                "gh --version".cyan()
            ));

            out
        }
    }
}

fn format_prompt_error(error: &PromptError) -> String {
    match error {
        PromptError::Closed(_) => "Cancelled\n".to_string(),
        PromptError::NoChoices(what) => {
            let mut out = String::new();

            out.push_str(&format!("{}: ", "error".red().bold()));
            out.push_str(&format!("nothing to choose from for '{}'\n", what.yellow()));
            out.push('\n');
            out.push_str(&format!(
                "  {}\n",
                "The list offered by git or gh was empty.".dimmed()
            ));

            out
        }
        PromptError::NotAChoice { .. } => format_cli_error(&error.to_string()),
        PromptError::Io(e) => format_cli_error(&format!("failed to read input: {}", e)),
    }
}

fn format_note_error(error: &NoteError) -> String {
    let mut out = String::new();

    out.push_str(&format!("{}: ", "error".red().bold()));

    match error {
        NoteError::DirMissing(dir) => {
            let dir = dir.display().to_string();
            out.push_str(&format!("notes directory not found: {}\n", dir.yellow()));
            out.push('\n');
            out.push_str(&format!(
                "  {}\n",
                "Experiment notes are saved into an existing directory.".dimmed()
            ));
            out.push('\n');
            out.push_str(&format!("  {}:\n", "To fix this".bold()));
            out.push_str(&format!(
                "    1. Create the directory: {}\n",
                format!("mkdir -p {}", dir).cyan()
            ));
            out.push_str(&format!(
                "    2. Set {} in {}\n",
                "notes_dir".cyan(),
                ".gtasks.yml".cyan()
            ));
        }
        NoteError::Io { path, source } => {
            out.push_str(&format!(
                "failed to write {}: {}\n",
                path.display().to_string().cyan(),
                source
            ));
        }
        NoteError::Yaml(e) => {
            out.push_str(&format!("failed to serialize experiment note: {}\n", e));
        }
    }

    out
}

fn format_issue_without_label(issue: &str) -> String {
    let mut out = String::new();

    out.push_str(&format!("{}: ", "error".red().bold()));
    out.push_str(&format!("issue #{} has no labels\n", issue.yellow()));
    out.push('\n');
    out.push_str(&format!(
        "  {}\n",
        "Branch names start with the issue's label, e.g. feat/12-search.".dimmed()
    ));
    out.push('\n');
    out.push_str(&format!("  {}:\n", "To fix this".bold()));
    out.push_str(&format!(
        "    1. Add a label: {}\n",
        format!("gh issue edit {} --add-label feat", issue).cyan()
    ));
    out.push_str(&format!(
        "    2. Install the standard labels: {}\n",
        "gtasks setup labels".cyan()
    ));

    out
}

fn format_missing_file(path: &str, hint: &str) -> String {
    let mut out = String::new();

    out.push_str(&format!("{}: ", "error".red().bold()));
    out.push_str(&format!("file not found: {}\n", path.yellow()));
    out.push('\n');
    out.push_str(&format!("  {}:\n", "To fix this".bold()));
    out.push_str(&format!("    {}\n", hint));

    out
}

impl From<RunnerError> for AppError {
    fn from(e: RunnerError) -> Self {
        AppError::Command(e)
    }
}

impl From<ForgeError> for AppError {
    fn from(e: ForgeError) -> Self {
        match e {
            ForgeError::Command(e) => AppError::Command(e),
            other => AppError::ForgeOutput(other),
        }
    }
}

impl From<PromptError> for AppError {
    fn from(e: PromptError) -> Self {
        AppError::Prompt(e)
    }
}

impl From<NoteError> for AppError {
    fn from(e: NoteError) -> Self {
        AppError::Note(e)
    }
}

impl From<minijinja::Error> for AppError {
    fn from(e: minijinja::Error) -> Self {
        AppError::Template(e)
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    fn strip_ansi(s: &str) -> String {
        let re = regex::Regex::new(r"\x1b\[[0-9;]*m").unwrap();
        re.replace_all(s, "").to_string()
    }

    #[test]
    fn test_format_command_failed() {
        let err = AppError::Command(RunnerError::Failed {
            command: "git push --set-upstream origin topic-1".to_string(),
            code: Some(1),
            stderr: "rejected\nhint: pull first".to_string(),
        });
        let stripped = strip_ansi(&err.to_string());

        assert!(stripped.contains("error:"));
        assert!(stripped.contains("exited with status 1"));
        assert!(stripped.contains("git push --set-upstream origin topic-1"));
        assert!(stripped.contains("  hint: pull first"));
    }

    #[test]
    fn test_format_missing_program() {
        let err = AppError::Command(RunnerError::Spawn {
            program: "gh".to_string(),
            source: io::Error::new(io::ErrorKind::NotFound, "not found"),
        });
        let stripped = strip_ansi(&err.to_string());

        assert!(stripped.contains("failed to execute gh"));
        assert!(stripped.contains("To fix this"));
        assert!(stripped.contains("PATH"));
    }

    #[test]
    fn test_format_notes_dir_missing() {
        let err = AppError::Note(NoteError::DirMissing(PathBuf::from("notes")));
        let stripped = strip_ansi(&err.to_string());

        assert!(stripped.contains("notes directory not found: notes"));
        assert!(stripped.contains("mkdir -p notes"));
        assert!(stripped.contains("notes_dir"));
    }

    #[test]
    fn test_format_issue_without_label() {
        let err = AppError::IssueWithoutLabel("42".to_string());
        let stripped = strip_ansi(&err.to_string());

        assert!(stripped.contains("issue #42 has no labels"));
        assert!(stripped.contains("gh issue edit 42 --add-label feat"));
        assert!(stripped.contains("gtasks setup labels"));
    }

    #[test]
    fn test_closed_prompt_reads_as_cancel() {
        let err = AppError::Prompt(PromptError::Closed("Title".to_string()));
        assert_eq!(err.to_string(), "Cancelled\n");
    }

    #[test]
    fn test_forge_command_error_unwraps() {
        let err: AppError = ForgeError::Command(RunnerError::Failed {
            command: "gh issue close 3".to_string(),
            code: Some(1),
            stderr: String::new(),
        })
        .into();
        assert!(matches!(err, AppError::Command(_)));
    }

    #[test]
    fn test_extension_trait_io() {
        let result: Result<(), io::Error> = Err(io::Error::other("disk full"));
        let err = result.with_context("failed to write python_env.yaml").unwrap_err();
        assert!(matches!(err, AppError::Io { context, .. } if context == "failed to write python_env.yaml"));
    }
}
