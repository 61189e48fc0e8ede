//! The commit workflow behind `gtasks gacp`.
//!
//! One linear pass: stage files, pick a commit type, commit, push, then
//! optionally open a pull request. Any failing step ends the run.

use chrono::Local;
use owo_colors::OwoColorize;

use crate::TaskContext;
use crate::commands::shared::{ask_pull_request_body, pick_assignee, preview_markdown};
use crate::commit::{COMMIT_TYPES, CommitType, compose_commit_message};
use crate::error_fmt::AppError;
use crate::gh::NewPullRequest;
use crate::notes::{ExperimentNote, NoteError, NoteFields, record_experiment_note};
use crate::prompt::PromptError;

/// Where the workflow currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Idle,
    FilesSelected,
    CommitTypeChosen,
    Committed,
    Pushed,
    Done,
}

/// Why a run stopped before committing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbortReason {
    NoChanges,
    NothingSelected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushOutcome {
    /// `git push --set-upstream` succeeded.
    Upstream,
    /// The upstream push failed and `git push --all` went through instead.
    AllBranches,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The commit type never gets a pull request.
    CommitType(CommitType),
    Declined,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PullRequestOutcome {
    Created,
    Skipped(SkipReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowOutcome {
    Aborted(AbortReason),
    Completed {
        commit_type: CommitType,
        push: PushOutcome,
        pull_request: PullRequestOutcome,
    },
}

pub struct CommitWorkflow<'c, 'a> {
    ctx: &'c mut TaskContext<'a>,
    stage: Stage,
}

impl<'c, 'a> CommitWorkflow<'c, 'a> {
    pub fn new(ctx: &'c mut TaskContext<'a>) -> Self {
        Self {
            ctx,
            stage: Stage::Idle,
        }
    }

    fn advance(&mut self, stage: Stage) {
        tracing::debug!(from = ?self.stage, to = ?stage, "commit workflow");
        self.stage = stage;
    }

    pub fn run(mut self) -> Result<WorkflowOutcome, AppError> {
        let git = self.ctx.git();

        let changed = git.changed_paths()?;
        self.commit_submodule_changes(&changed)?;
        let changed = git.changed_paths()?;

        let selected = self.select_files_to_stage(&changed)?;
        if selected.is_empty() {
            let reason = if changed.is_empty() {
                AbortReason::NoChanges
            } else {
                AbortReason::NothingSelected
            };
            return Ok(WorkflowOutcome::Aborted(reason));
        }
        git.add(&selected)?;
        println!("{}", "Files added to the commit.".green());
        self.advance(Stage::FilesSelected);

        let commit_type = self.select_commit_type()?;
        self.advance(Stage::CommitTypeChosen);

        self.maybe_record_experiment_note(commit_type)?;

        let prompter = self.ctx.prompter();
        let description = prompter.text("Enter a short description of the change", None)?;
        let body = prompter.text(
            "Enter a longer description of the change (optional)",
            Some(""),
        )?;
        let breaking = prompter.text("Are there any breaking changes? (optional)", Some(""))?;
        let message = compose_commit_message(commit_type, &description, &body, Some(&breaking));
        git.commit(&message)?;
        self.advance(Stage::Committed);

        let branch = git.current_branch()?;
        let push = self.push_current_branch(&branch)?;
        self.advance(Stage::Pushed);

        let pull_request = self.maybe_create_pull_request(commit_type, &description)?;
        self.advance(Stage::Done);

        Ok(WorkflowOutcome::Completed {
            commit_type,
            push,
            pull_request,
        })
    }

    /// Commits pending work inside every dirty submodule and stages the new pointers.
    fn commit_submodule_changes(&mut self, changed: &[String]) -> Result<(), AppError> {
        let git = self.ctx.git();
        for sub in git.submodule_paths()? {
            let prefix = format!("{}/", sub);
            if !changed.iter().any(|p| *p == sub || p.starts_with(&prefix)) {
                continue;
            }
            // A plain directory listed in .gitmodules belongs to this repository.
            if !self.ctx.root().join(&sub).join(".git").exists() {
                println!("{} is pushed to the main repository", sub.cyan());
                continue;
            }
            if git.commit_inside(&sub, &format!("Add {} results", sub))? {
                println!("Committed changes inside submodule {}", sub.cyan());
            }
        }
        Ok(())
    }

    /// Asks which of `changed` to stage. An empty result means abort.
    pub fn select_files_to_stage(&mut self, changed: &[String]) -> Result<Vec<String>, AppError> {
        if changed.is_empty() {
            println!("No files to add.");
            return Ok(Vec::new());
        }
        let selected = self
            .ctx
            .prompter()
            .multi_select("Select the files to add to the commit", changed)?;
        if selected.is_empty() {
            println!("No files selected.");
        }
        Ok(selected)
    }

    pub fn select_commit_type(&mut self) -> Result<CommitType, AppError> {
        let message = "Select the type of change you are committing";
        let labels: Vec<String> = COMMIT_TYPES.iter().map(|(t, _)| t.menu_label()).collect();
        let choice = self.ctx.prompter().select(message, &labels, None)?;
        match choice.split_once(" - ").and_then(|(tag, _)| CommitType::from_tag(tag)) {
            Some(commit_type) => Ok(commit_type),
            None => Err(PromptError::NotAChoice {
                message: message.to_string(),
                answer: choice,
            }
            .into()),
        }
    }

    fn maybe_record_experiment_note(&mut self, commit_type: CommitType) -> Result<(), AppError> {
        let wanted = match commit_type {
            CommitType::Exp => true,
            CommitType::Wip => self
                .ctx
                .prompter()
                .confirm("Do you want to add experiment notes?", true)?,
            _ => false,
        };
        if !wanted {
            return Ok(());
        }

        let dir = self.ctx.config().notes_path();
        if !dir.is_dir() {
            tracing::warn!(dir = %dir.display(), "skipping experiment note");
            eprint!("{}", AppError::Note(NoteError::DirMissing(dir)));
            return Ok(());
        }

        let prompter = self.ctx.prompter();
        let fields = NoteFields {
            hypothesis: prompter.text("What was the hypothesis?", None)?,
            results: prompter.text("What were the results?", None)?,
            conclusion: prompter.text("What is the conclusion?", None)?,
            data_risk: prompter.text("What are the risks related to data? (optional)", Some(""))?,
            model_risk: prompter.text(
                "What are the risks related to the model? (optional)",
                Some(""),
            )?,
            code_risk: prompter.text("What are the risks related to the code? (optional)", Some(""))?,
        };

        let git = self.ctx.git();
        let author = git.user_name()?;
        let taken_at = Local::now();
        let note = ExperimentNote::new(&author, taken_at, fields);
        let path = record_experiment_note(&dir, &note, taken_at)?;
        println!("Experiment note saved to {}", path.display().to_string().cyan());

        if dir.join(".git").exists() {
            let dir = dir.display().to_string();
            git.commit_inside(&dir, &format!("Add {} results", dir))?;
        }
        Ok(())
    }

    /// Pushes `branch` upstream, falling back once to `git push --all`.
    pub fn push_current_branch(&mut self, branch: &str) -> Result<PushOutcome, AppError> {
        let git = self.ctx.git();
        let remote = &self.ctx.config().remote;
        let output = git.push_set_upstream(remote, branch)?;
        if output.success() {
            println!("Pushed {} to {}", branch.cyan(), remote);
            return Ok(PushOutcome::Upstream);
        }

        tracing::warn!(%branch, code = ?output.code, "upstream push failed, pushing all branches");
        println!(
            "{}: push of {} failed, trying {}",
            "warning".yellow(),
            branch.cyan(),
            "git push --all".cyan()
        );
        git.push_all()?;
        Ok(PushOutcome::AllBranches)
    }

    /// Opens a pull request against the base branch unless the commit type
    /// rules it out or the user declines.
    pub fn maybe_create_pull_request(
        &mut self,
        commit_type: CommitType,
        default_title: &str,
    ) -> Result<PullRequestOutcome, AppError> {
        if !commit_type.opens_pull_request() {
            return Ok(PullRequestOutcome::Skipped(SkipReason::CommitType(
                commit_type,
            )));
        }
        if !self.ctx.prompter().confirm("Create a PR?", true)? {
            return Ok(PullRequestOutcome::Skipped(SkipReason::Declined));
        }

        let repo = self.ctx.gh().current_repo()?;
        let prompter = self.ctx.prompter();
        let title = prompter.text("Enter the PR title", Some(default_title))?;
        let body = ask_pull_request_body(prompter)?.render()?;
        preview_markdown(&body);
        let assignee = pick_assignee(self.ctx, &repo)?;

        self.ctx.gh().create_pull_request(&NewPullRequest {
            base: self.ctx.config().base_branch.clone(),
            title,
            body,
            assignee,
        })?;
        Ok(PullRequestOutcome::Created)
    }
}
