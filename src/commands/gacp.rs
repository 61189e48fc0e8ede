//! Gacp command - add, commit, push and optionally open a pull request.

use owo_colors::OwoColorize;

use crate::TaskContext;
use crate::error_fmt::AppError;
use crate::workflow::{CommitWorkflow, PullRequestOutcome, PushOutcome, WorkflowOutcome};

pub fn gacp(ctx: &mut TaskContext<'_>) -> Result<(), AppError> {
    let outcome = CommitWorkflow::new(ctx).run()?;

    if let WorkflowOutcome::Completed {
        commit_type,
        push,
        pull_request,
    } = outcome
    {
        let pushed = match push {
            PushOutcome::Upstream => "pushed",
            PushOutcome::AllBranches => "pushed all branches",
        };
        let pr = match pull_request {
            PullRequestOutcome::Created => "pull request opened",
            PullRequestOutcome::Skipped(_) => "no pull request",
        };
        println!(
            "{} {} commit, {}, {}",
            "done:".green(),
            commit_type.to_string().cyan(),
            pushed,
            pr
        );
    }
    Ok(())
}
