//! Forge operations through the `gh` CLI.

use std::fmt;

use serde::Deserialize;
use thiserror::Error;

use crate::labels::{ExistingLabel, LabelSpec};
use crate::runner::{CommandLine, CommandOutput, CommandRunner, RunnerError};

#[derive(Debug, Error)]
pub enum ForgeError {
    #[error(transparent)]
    Command(#[from] RunnerError),
    #[error("unexpected {what} output from gh: {source}")]
    Json {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

fn gh() -> CommandLine {
    CommandLine::new("gh")
}

/// `owner/name` of a hosted repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRef {
    pub owner: String,
    pub name: String,
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

#[derive(Deserialize)]
struct RepoView {
    name: String,
    owner: RepoOwner,
}

#[derive(Deserialize)]
struct RepoOwner {
    login: String,
}

/// Which open issues to list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IssueFilter {
    Me,
    AllOpen,
    Unassigned,
    User(String),
}

impl IssueFilter {
    /// `@me`, `all-open`, `none`, or a login.
    pub fn parse(s: &str) -> Self {
        match s {
            "" | "@me" => IssueFilter::Me,
            "all-open" => IssueFilter::AllOpen,
            "none" => IssueFilter::Unassigned,
            login => IssueFilter::User(login.to_string()),
        }
    }
}

impl fmt::Display for IssueFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IssueFilter::Me => f.write_str("@me"),
            IssueFilter::AllOpen => f.write_str("all-open"),
            IssueFilter::Unassigned => f.write_str("none"),
            IssueFilter::User(login) => f.write_str(login),
        }
    }
}

/// One line of `gh issue list`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueSummary {
    pub number: String,
    pub title: String,
}

impl fmt::Display for IssueSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.number, self.title)
    }
}

/// Parses the tab-separated `number, state, title, ...` rows of `gh issue list`.
pub fn parse_issue_list(stdout: &str) -> Vec<IssueSummary> {
    stdout
        .lines()
        .filter_map(|line| {
            let mut cols = line.split('\t');
            let number = cols.next()?.trim();
            let title = cols.nth(1)?.trim();
            (!number.is_empty()).then(|| IssueSummary {
                number: number.to_string(),
                title: title.to_string(),
            })
        })
        .collect()
}

/// Parameters of `gh issue create`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewIssue {
    pub title: String,
    pub body: String,
    pub label: String,
    pub assignee: Option<String>,
}

/// Parameters of `gh pr create`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPullRequest {
    pub base: String,
    pub title: String,
    pub body: String,
    pub assignee: Option<String>,
}

#[derive(Clone, Copy)]
pub struct Gh<'a> {
    runner: &'a dyn CommandRunner,
}

impl<'a> Gh<'a> {
    pub fn new(runner: &'a dyn CommandRunner) -> Self {
        Self { runner }
    }

    /// The repository the working directory belongs to.
    pub fn current_repo(&self) -> Result<RepoRef, ForgeError> {
        let stdout = self
            .runner
            .capture(&gh().args(["repo", "view", "--json", "owner,name"]))?;
        let view: RepoView = serde_json::from_str(&stdout).map_err(|source| ForgeError::Json {
            what: "repository",
            source,
        })?;
        Ok(RepoRef {
            owner: view.owner.login,
            name: view.name,
        })
    }

    pub fn collaborators(&self, repo: &RepoRef) -> Result<Vec<String>, ForgeError> {
        let stdout = self.runner.capture(&gh().args([
            "api".to_string(),
            format!("repos/{}/collaborators", repo),
            "--jq".to_string(),
            ".[].login".to_string(),
        ]))?;
        Ok(non_empty_lines(&stdout))
    }

    pub fn labels(&self, repo: &RepoRef) -> Result<Vec<String>, ForgeError> {
        let stdout = self.runner.capture(&gh().args([
            "label".to_string(),
            "list".to_string(),
            "--repo".to_string(),
            repo.to_string(),
            "--json".to_string(),
            "name".to_string(),
            "--limit".to_string(),
            "1000".to_string(),
        ]))?;
        let labels: Vec<ExistingLabel> =
            serde_json::from_str(&stdout).map_err(|source| ForgeError::Json {
                what: "label list",
                source,
            })?;
        Ok(labels.into_iter().map(|l| l.name).collect())
    }

    pub fn delete_label(&self, repo: &RepoRef, name: &str) -> Result<(), ForgeError> {
        self.runner.capture(&gh().args([
            "label".to_string(),
            "delete".to_string(),
            name.to_string(),
            "--repo".to_string(),
            repo.to_string(),
            "--yes".to_string(),
        ]))?;
        Ok(())
    }

    pub fn create_label(&self, repo: &RepoRef, label: &LabelSpec) -> Result<(), ForgeError> {
        self.runner.capture(&gh().args([
            "label".to_string(),
            "create".to_string(),
            label.name.to_string(),
            "--color".to_string(),
            label.color.to_string(),
            "--description".to_string(),
            label.description.to_string(),
            "--repo".to_string(),
            repo.to_string(),
        ]))?;
        Ok(())
    }

    pub fn issues(&self, filter: &IssueFilter) -> Result<Vec<IssueSummary>, ForgeError> {
        let cmd = gh().args(["issue", "list"]);
        let cmd = match filter {
            IssueFilter::Me => cmd.arg("--assignee=@me"),
            IssueFilter::AllOpen => cmd,
            IssueFilter::Unassigned => cmd.args(["--search", "no:assignee"]),
            IssueFilter::User(login) => cmd.arg(format!("--assignee={}", login)),
        };
        Ok(parse_issue_list(&self.runner.capture(&cmd)?))
    }

    /// Label names attached to an issue, in forge order.
    pub fn issue_labels(&self, issue: &str) -> Result<Vec<String>, ForgeError> {
        let stdout = self.runner.capture(&gh().args([
            "issue",
            "view",
            issue,
            "--json",
            "labels",
            "--jq",
            ".labels[].name",
        ]))?;
        Ok(non_empty_lines(&stdout))
    }

    /// Creates and checks out a branch linked to `issue`; exit status left to the caller.
    pub fn develop_issue(
        &self,
        issue: &str,
        branch: &str,
        base: &str,
    ) -> Result<CommandOutput, ForgeError> {
        Ok(self.runner.interactive(&gh().args([
            "issue",
            "develop",
            issue,
            "--name",
            branch,
            "--base",
            base,
            "--checkout",
        ]))?)
    }

    pub fn create_issue(&self, repo: &RepoRef, issue: &NewIssue) -> Result<(), ForgeError> {
        let cmd = gh()
            .args(["issue", "create"])
            .arg(format!("--title={}", issue.title))
            .arg(format!("--body={}", issue.body))
            .arg(format!("--repo={}", repo))
            .arg(format!("--label={}", issue.label));
        let cmd = match &issue.assignee {
            Some(assignee) => cmd.arg(format!("--assignee={}", assignee)),
            None => cmd,
        };
        Ok(self.runner.stream(&cmd)?)
    }

    pub fn close_issue(&self, issue: &str) -> Result<(), ForgeError> {
        Ok(self.runner.stream(&gh().args(["issue", "close", issue]))?)
    }

    pub fn create_pull_request(&self, pr: &NewPullRequest) -> Result<(), ForgeError> {
        let cmd = gh()
            .args(["pr", "create"])
            .arg(format!("--base={}", pr.base))
            .arg(format!("--title={}", pr.title))
            .arg(format!("--body={}", pr.body));
        let cmd = match &pr.assignee {
            Some(assignee) => cmd.arg(format!("--assignee={}", assignee)),
            None => cmd,
        };
        Ok(self.runner.stream(&cmd)?)
    }
}

fn non_empty_lines(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::testing::ScriptedRunner;

    fn repo() -> RepoRef {
        RepoRef {
            owner: "acme".to_string(),
            name: "widgets".to_string(),
        }
    }

    #[test]
    fn test_current_repo_from_json() {
        let runner = ScriptedRunner::new().respond(
            "gh repo view --json owner,name",
            CommandOutput::ok(r#"{"name":"widgets","owner":{"id":"U_1","login":"acme"}}"#),
        );
        assert_eq!(Gh::new(&runner).current_repo().unwrap(), repo());
    }

    #[test]
    fn test_current_repo_rejects_garbage() {
        let runner = ScriptedRunner::new()
            .respond("gh repo view --json owner,name", CommandOutput::ok("not json"));
        let err = Gh::new(&runner).current_repo().unwrap_err();
        assert!(matches!(err, ForgeError::Json { what: "repository", .. }));
    }

    #[test]
    fn test_parse_issue_list() {
        let stdout = "12\tOPEN\tFix login\tbug\tabout 1 day ago\n7\tOPEN\tDark mode\tfeat\t\n";
        let issues = parse_issue_list(stdout);
        assert_eq!(issues.len(), 2);
        assert_eq!(issues[0].to_string(), "12 - Fix login");
        assert_eq!(issues[1].number, "7");
    }

    #[test]
    fn test_parse_issue_list_skips_malformed_rows() {
        assert!(parse_issue_list("\nno tabs here\n").is_empty());
    }

    #[test]
    fn test_issue_filter_commands() {
        let runner = ScriptedRunner::new();
        let gh = Gh::new(&runner);
        gh.issues(&IssueFilter::parse("@me")).unwrap();
        gh.issues(&IssueFilter::parse("all-open")).unwrap();
        gh.issues(&IssueFilter::parse("none")).unwrap();
        gh.issues(&IssueFilter::parse("octocat")).unwrap();
        assert_eq!(
            runner.calls(),
            vec![
                "gh issue list --assignee=@me",
                "gh issue list",
                "gh issue list --search no:assignee",
                "gh issue list --assignee=octocat",
            ]
        );
    }

    #[test]
    fn test_labels_from_json() {
        let runner = ScriptedRunner::new().respond(
            "gh label list --repo acme/widgets --json name --limit 1000",
            CommandOutput::ok(r#"[{"name":"bug"},{"name":"good first issue"}]"#),
        );
        assert_eq!(
            Gh::new(&runner).labels(&repo()).unwrap(),
            vec!["bug", "good first issue"]
        );
    }

    #[test]
    fn test_create_label_arguments() {
        let runner = ScriptedRunner::new();
        let spec = LabelSpec {
            name: "perf",
            color: "008672",
            description: "Performance",
        };
        Gh::new(&runner).create_label(&repo(), &spec).unwrap();
        assert_eq!(
            runner.calls(),
            vec!["gh label create perf --color 008672 --description Performance --repo acme/widgets"]
        );
    }

    #[test]
    fn test_pull_request_without_assignee() {
        let runner = ScriptedRunner::new();
        let pr = NewPullRequest {
            base: "main".to_string(),
            title: "Search".to_string(),
            body: "Body".to_string(),
            assignee: None,
        };
        Gh::new(&runner).create_pull_request(&pr).unwrap();
        assert_eq!(
            runner.calls(),
            vec!["gh pr create --base=main --title=Search --body=Body"]
        );
    }
}
