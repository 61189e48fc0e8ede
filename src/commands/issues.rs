//! Issue commands - list, file and close GitHub issues.

use owo_colors::OwoColorize;

use super::branch::delete_branch;
use super::shared::{ask_issue_body, first_word, pick_assignee, pick_label, preview_markdown};
use crate::TaskContext;
use crate::error_fmt::AppError;
use crate::gh::{IssueFilter, NewIssue};

const OTHER_ISSUE: &str = "Other";

/// Print open issues matching `filter`, one `<number> - <title>` per line.
pub fn list(ctx: &TaskContext<'_>, filter: &IssueFilter) -> Result<(), AppError> {
    let issues = ctx.gh().issues(filter)?;
    if issues.is_empty() {
        println!("No open issues for {}", filter.to_string().cyan());
        return Ok(());
    }
    for issue in issues {
        println!("{} - {}", issue.number.bright_yellow(), issue.title);
    }
    Ok(())
}

/// File a new issue with a body shaped by its label.
pub fn new_issue(ctx: &mut TaskContext<'_>) -> Result<(), AppError> {
    let repo = ctx.gh().current_repo()?;
    let title = ctx.prompter().text("Enter the issue title", None)?;
    let label = pick_label(ctx, &repo)?;
    let body = ask_issue_body(ctx.prompter(), &label)?.render()?;
    preview_markdown(&body);

    let assignee = if ctx
        .prompter()
        .confirm("Do you want to assign the issue?", true)?
    {
        pick_assignee(ctx, &repo)?
    } else {
        None
    };

    ctx.gh().create_issue(
        &repo,
        &NewIssue {
            title,
            body,
            label,
            assignee,
        },
    )?;
    Ok(())
}

/// Close an issue, then offer to delete the current branch.
pub fn close(ctx: &mut TaskContext<'_>, issue_id: Option<&str>) -> Result<(), AppError> {
    let issue = match issue_id {
        Some(id) => id.to_string(),
        None => pick_issue_to_close(ctx)?,
    };

    ctx.gh().close_issue(&issue)?;
    println!("{} issue #{}", "closed:".green(), issue.bright_yellow());

    let branch = ctx.git().current_branch()?;
    if branch != ctx.config().base_branch
        && ctx
            .prompter()
            .confirm(&format!("Delete the current branch {}?", branch), false)?
    {
        delete_branch(ctx, &branch)?;
    }
    Ok(())
}

fn pick_issue_to_close(ctx: &mut TaskContext<'_>) -> Result<String, AppError> {
    let mut choices: Vec<String> = ctx
        .gh()
        .issues(&IssueFilter::Me)?
        .iter()
        .map(ToString::to_string)
        .collect();
    choices.push(OTHER_ISSUE.to_string());

    let prompter = ctx.prompter();
    let choice = prompter.select("Select the issue to close", &choices, None)?;
    if choice == OTHER_ISSUE {
        let answer = prompter.text("Enter the issue id", None)?;
        return Ok(first_word(&answer).to_string());
    }
    Ok(first_word(&choice).to_string())
}
