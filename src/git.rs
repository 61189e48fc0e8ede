use crate::runner::{CommandLine, CommandOutput, CommandRunner, RunnerError};

fn git() -> CommandLine {
    CommandLine::new("git")
}

/// Local repository operations through the `git` CLI.
#[derive(Clone, Copy)]
pub struct Git<'a> {
    runner: &'a dyn CommandRunner,
}

impl<'a> Git<'a> {
    pub fn new(runner: &'a dyn CommandRunner) -> Self {
        Self { runner }
    }

    /// Name of the checked out branch.
    pub fn current_branch(&self) -> Result<String, RunnerError> {
        self.runner
            .capture(&git().args(["symbolic-ref", "--short", "HEAD"]))
    }

    /// Paths reported by `git status --porcelain -z`, in git's order.
    pub fn changed_paths(&self) -> Result<Vec<String>, RunnerError> {
        let cmd = git().args(["status", "--porcelain", "-z"]);
        // Not trimmed: the leading status column is significant.
        let output = self.runner.output(&cmd)?.check(&cmd)?;
        Ok(parse_porcelain(&output.stdout))
    }

    pub fn add(&self, paths: &[String]) -> Result<(), RunnerError> {
        self.runner.capture(&git().arg("add").args(paths.iter().cloned()))?;
        Ok(())
    }

    pub fn commit(&self, message: &str) -> Result<(), RunnerError> {
        self.runner.stream(&git().args(["commit", "-m", message]))
    }

    /// `git push --set-upstream <remote> <branch>`, exit status left to the caller.
    pub fn push_set_upstream(&self, remote: &str, branch: &str) -> Result<CommandOutput, RunnerError> {
        self.runner
            .interactive(&git().args(["push", "--set-upstream", remote, branch]))
    }

    pub fn push_all(&self) -> Result<(), RunnerError> {
        self.runner.stream(&git().args(["push", "--all"]))
    }

    /// `user.name` from git config, empty when unset.
    pub fn user_name(&self) -> Result<String, RunnerError> {
        let output = self.runner.output(&git().args(["config", "user.name"]))?;
        Ok(if output.success() {
            output.stdout.trim().to_string()
        } else {
            String::new()
        })
    }

    pub fn set_config(&self, key: &str, value: &str) -> Result<(), RunnerError> {
        self.runner.capture(&git().args(["config", key, value]))?;
        Ok(())
    }

    /// Paths of the submodules registered in `.gitmodules`.
    ///
    /// A repository without `.gitmodules` has no submodules.
    pub fn submodule_paths(&self) -> Result<Vec<String>, RunnerError> {
        let output = self.runner.output(&git().args([
            "config",
            "--file",
            ".gitmodules",
            "--get-regexp",
            "path",
        ]))?;
        if !output.success() {
            return Ok(Vec::new());
        }
        Ok(output
            .stdout
            .lines()
            .filter_map(|line| line.split_whitespace().nth(1))
            .map(str::to_string)
            .collect())
    }

    /// Commits everything inside the checkout at `path`, then stages the
    /// updated pointer in the enclosing repository.
    ///
    /// Returns false when the checkout had nothing to commit.
    pub fn commit_inside(&self, path: &str, message: &str) -> Result<bool, RunnerError> {
        let status = git().args(["-C", path, "status", "--porcelain"]);
        let output = self.runner.output(&status)?.check(&status)?;
        if output.stdout.trim().is_empty() {
            return Ok(false);
        }

        self.runner.capture(&git().args(["-C", path, "add", "."]))?;
        self.runner
            .capture(&git().args(["-C", path, "commit", "-m", message]))?;
        self.runner.capture(&git().args(["add", path]))?;
        Ok(true)
    }

    pub fn checkout(&self, branch: &str) -> Result<(), RunnerError> {
        self.runner.stream(&git().args(["checkout", branch]))
    }

    pub fn checkout_new_branch(&self, branch: &str) -> Result<(), RunnerError> {
        self.runner.stream(&git().args(["checkout", "-b", branch]))
    }

    pub fn delete_local_branch(&self, branch: &str) -> Result<(), RunnerError> {
        self.runner.stream(&git().args(["branch", "-d", branch]))
    }

    pub fn delete_remote_branch(&self, remote: &str, branch: &str) -> Result<(), RunnerError> {
        self.runner
            .stream(&git().args(["push", remote, "--delete", branch]))
    }
}

/// Extracts paths from NUL-separated porcelain v1 entries (`XY path`).
///
/// Paths arrive verbatim. A rename or copy entry is followed by its source
/// path, which is skipped so only the new path is reported.
pub fn parse_porcelain(stdout: &str) -> Vec<String> {
    let mut paths = Vec::new();
    let mut entries = stdout.split('\0');
    while let Some(entry) = entries.next() {
        let (Some(status), Some(path)) = (entry.get(..2), entry.get(3..)) else {
            continue;
        };
        if path.is_empty() {
            continue;
        }
        if status.contains(['R', 'C']) {
            entries.next();
        }
        paths.push(path.to_string());
    }
    paths
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::testing::ScriptedRunner;

    #[test]
    fn test_parse_porcelain() {
        let stdout = " M src/main.rs\0?? notes/\0A  Cargo.toml\0R  new.rs\0old.rs\0?? with space.txt\0";
        assert_eq!(
            parse_porcelain(stdout),
            vec!["src/main.rs", "notes/", "Cargo.toml", "new.rs", "with space.txt"]
        );
    }

    #[test]
    fn test_parse_porcelain_keeps_unusual_paths_verbatim() {
        let stdout = " M café.txt\0?? say \"hi\".txt\0?? tab\there.txt\0";
        assert_eq!(
            parse_porcelain(stdout),
            vec!["café.txt", "say \"hi\".txt", "tab\there.txt"]
        );
    }

    #[test]
    fn test_changed_paths_keeps_leading_status_column() {
        let runner = ScriptedRunner::new().respond(
            "git status --porcelain -z",
            CommandOutput::ok(" M a.rs\0 M b.rs\0"),
        );
        let paths = Git::new(&runner).changed_paths().unwrap();
        assert_eq!(paths, vec!["a.rs", "b.rs"]);
    }

    #[test]
    fn test_submodule_paths_without_gitmodules() {
        let runner = ScriptedRunner::new().respond(
            "git config --file .gitmodules --get-regexp path",
            CommandOutput::failed(1, ""),
        );
        assert!(Git::new(&runner).submodule_paths().unwrap().is_empty());
    }

    #[test]
    fn test_submodule_paths() {
        let runner = ScriptedRunner::new().respond(
            "git config --file .gitmodules --get-regexp path",
            CommandOutput::ok("submodule.notes.path notes\nsubmodule.data.path data/raw\n"),
        );
        assert_eq!(
            Git::new(&runner).submodule_paths().unwrap(),
            vec!["notes", "data/raw"]
        );
    }

    #[test]
    fn test_commit_inside_skips_clean_checkout() {
        let runner = ScriptedRunner::new();
        let committed = Git::new(&runner).commit_inside("notes", "Add notes results").unwrap();
        assert!(!committed);
        assert_eq!(runner.calls(), vec!["git -C notes status --porcelain"]);
    }

    #[test]
    fn test_commit_inside_stages_pointer() {
        let runner = ScriptedRunner::new().respond(
            "git -C notes status --porcelain",
            CommandOutput::ok("?? 2024.yaml\n"),
        );
        let committed = Git::new(&runner).commit_inside("notes", "Add notes results").unwrap();
        assert!(committed);
        assert_eq!(
            runner.calls(),
            vec![
                "git -C notes status --porcelain",
                "git -C notes add .",
                "git -C notes commit -m 'Add notes results'",
                "git add notes",
            ]
        );
    }

    #[test]
    fn test_user_name_unset() {
        let runner = ScriptedRunner::new()
            .respond("git config user.name", CommandOutput::failed(1, ""));
        assert_eq!(Git::new(&runner).user_name().unwrap(), "");
    }
}
