//! Shared prompts and output helpers for commands.

use owo_colors::OwoColorize;

use crate::TaskContext;
use crate::error_fmt::AppError;
use crate::gh::RepoRef;
use crate::prompt::Prompter;
use crate::runner::CommandLine;
use crate::templates::{DOC_ISSUE_KINDS, IssueBody, PullRequestBody};

/// Ask for a repository collaborator to assign.
///
/// Returns `None` when the repository reports no collaborators.
pub fn pick_assignee(ctx: &mut TaskContext<'_>, repo: &RepoRef) -> Result<Option<String>, AppError> {
    let collaborators = ctx.gh().collaborators(repo)?;
    if collaborators.is_empty() {
        println!(
            "{}: no collaborators found for {}, leaving unassigned",
            "warning".yellow(),
            repo.to_string().cyan()
        );
        return Ok(None);
    }
    let assignee = ctx
        .prompter()
        .select("Select an assignee", &collaborators, None)?;
    Ok(Some(assignee))
}

/// Ask for one of the repository's labels.
pub fn pick_label(ctx: &mut TaskContext<'_>, repo: &RepoRef) -> Result<String, AppError> {
    let labels = ctx.gh().labels(repo)?;
    Ok(ctx.prompter().select("Select the label", &labels, None)?)
}

/// Ask for an issue id; only the first word of the answer is kept so that
/// `12 - Fix login` pasted from `gtasks issues list` works.
pub fn ask_issue_id(prompter: &mut dyn Prompter, message: &str) -> Result<String, AppError> {
    let answer = prompter.text(message, None)?;
    Ok(first_word(&answer).to_string())
}

pub fn first_word(s: &str) -> &str {
    s.split_whitespace().next().unwrap_or_default()
}

/// Collect the pull request description.
pub fn ask_pull_request_body(prompter: &mut dyn Prompter) -> Result<PullRequestBody, AppError> {
    println!("{}", "Enter the PR body".bold());
    println!(
        "{}",
        "Describe the feature this PR introduces or the bug it fixes.".dimmed()
    );
    let context = prompter.text("Context: why is it needed?", None)?;
    let solution = prompter.text("Concise description of the implemented solution", None)?;
    let dependencies = prompter.text(
        "If any dependencies are added, list them and justify why they are needed (optional)",
        Some(""),
    )?;
    let self_reviewed = prompter.confirm("I have self-reviewed my code.", true)?;
    let tested = prompter.confirm(
        "I have included test cases validating introduced feature/fix.",
        true,
    )?;
    let documented = prompter.confirm("I have updated the documentation.", true)?;

    Ok(PullRequestBody {
        context,
        solution,
        dependencies,
        self_reviewed,
        tested,
        documented,
    })
}

/// Collect an issue description shaped by `label`.
pub fn ask_issue_body(prompter: &mut dyn Prompter, label: &str) -> Result<IssueBody, AppError> {
    let body = match label {
        "bug" => IssueBody::Bug {
            description: prompter.text("Enter the issue description", None)?,
            steps: prompter.text("Enter the steps to reproduce the problem", None)?,
            expected: prompter.text("Enter the expected behavior", None)?,
            actual: prompter.text("Enter the actual behavior", None)?,
            additional: prompter.text("Enter any additional information (optional)", Some(""))?,
        },
        "docs" => {
            let description = prompter.text("Enter the issue description", None)?;
            let location = prompter.text(
                "Enter the location of the documentation (optional)",
                Some(""),
            )?;
            let kinds: Vec<String> = DOC_ISSUE_KINDS.iter().map(|k| k.to_string()).collect();
            let kind = prompter.select("Select the type of documentation issue", &kinds, None)?;
            IssueBody::Docs {
                description,
                location,
                kind,
                details: prompter.text("Enter the details of the issue (optional)", Some(""))?,
                suggestion: prompter
                    .text("Enter the suggestion to fix the issue (optional)", Some(""))?,
                additional: prompter
                    .text("Enter any additional information (optional)", Some(""))?,
            }
        }
        "feat" => IssueBody::Feat {
            description: prompter.text("Describe the feature you want to add", None)?,
            solution: prompter.text("Describe the solution you have in mind", None)?,
            alternatives: prompter.text(
                "Describe any alternative solutions if the feature is not feasible (optional)",
                Some(""),
            )?,
            additional: prompter.text("Enter any additional information (optional)", Some(""))?,
        },
        _ => IssueBody::Freeform(prompter.text("Describe the issue", None)?),
    };
    Ok(body)
}

/// Open `url` with the configured browser command.
pub fn open_browser(ctx: &TaskContext<'_>, url: &str) -> Result<(), AppError> {
    let mut words = ctx.config().browser_command().split_whitespace();
    let Some(program) = words.next() else {
        return Ok(());
    };
    let cmd = CommandLine::new(program).args(words).arg(url);
    ctx.runner().stream(&cmd)?;
    Ok(())
}

/// Render a Markdown body in the terminal before it is submitted.
pub fn preview_markdown(markdown: &str) {
    let mut skin = termimad::MadSkin::default();
    for header in skin.headers.iter_mut() {
        header.align = termimad::Alignment::Left;
    }
    println!();
    skin.print_text(markdown);
    println!();
}
