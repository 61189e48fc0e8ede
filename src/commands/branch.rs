//! Branch commands - issue branches and branch cleanup.

use owo_colors::OwoColorize;

use super::shared::ask_issue_id;
use crate::TaskContext;
use crate::error_fmt::AppError;

/// Replaces every run of whitespace with a single `-`.
pub fn slugify(name: &str) -> String {
    name.split_whitespace().collect::<Vec<_>>().join("-")
}

/// `<label>/<issue>-<name>`
pub fn issue_branch_name(label: &str, issue: &str, name: &str) -> String {
    format!("{}/{}-{}", label, issue, slugify(name))
}

/// Create a branch for an issue, prefixed with the issue's first label.
pub fn new_branch(ctx: &mut TaskContext<'_>, issue_id: Option<&str>) -> Result<(), AppError> {
    let issue = match issue_id {
        Some(id) => id.to_string(),
        None => ask_issue_id(ctx.prompter(), "Enter the issue id")?,
    };

    let gh = ctx.gh();
    let label = gh
        .issue_labels(&issue)?
        .into_iter()
        .next()
        .ok_or_else(|| AppError::IssueWithoutLabel(issue.clone()))?;

    let name = ctx.prompter().text("Enter the branch name", None)?;
    let branch = issue_branch_name(&label, &issue, &name);
    let base = &ctx.config().base_branch;

    let output = gh.develop_issue(&issue, &branch, base)?;
    if !output.success() {
        tracing::warn!(%issue, %branch, "gh issue develop failed, creating branch locally");
        println!(
            "{}: could not link {} to issue #{}, creating it locally",
            "warning".yellow(),
            branch.cyan(),
            issue
        );
        ctx.git().checkout_new_branch(&branch)?;
    }

    println!("{} {}", "branch:".green(), branch.cyan());
    Ok(())
}

/// Switch to the base branch, then delete `branch` locally and on the remote.
pub fn delete_branch(ctx: &TaskContext<'_>, branch: &str) -> Result<(), AppError> {
    let config = ctx.config();
    let git = ctx.git();
    git.checkout(&config.base_branch)?;
    git.delete_local_branch(branch)?;
    git.delete_remote_branch(&config.remote, branch)?;
    println!("{} {}", "deleted:".red(), branch.cyan());
    Ok(())
}
