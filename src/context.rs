//! Shared state handed to every task.

use std::path::Path;

use crate::config::Config;
use crate::gh::Gh;
use crate::git::Git;
use crate::prompt::Prompter;
use crate::runner::CommandRunner;

/// Everything a task needs: settings, process runner, prompter and the
/// directory the project lives in.
///
/// Tasks never spawn processes or read stdin directly, so the same task code
/// runs against the terminal in the binary and against scripted doubles in
/// tests.
pub struct TaskContext<'a> {
    config: &'a Config,
    runner: &'a dyn CommandRunner,
    prompter: &'a mut dyn Prompter,
    root: &'a Path,
}

impl std::fmt::Debug for TaskContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskContext")
            .field("config", &self.config)
            .field("root", &self.root)
            .finish_non_exhaustive()
    }
}

impl<'a> TaskContext<'a> {
    pub fn new(
        config: &'a Config,
        runner: &'a dyn CommandRunner,
        prompter: &'a mut dyn Prompter,
    ) -> Self {
        Self {
            config,
            runner,
            prompter,
            root: Path::new("."),
        }
    }

    /// Resolve project files against `root` instead of the working directory.
    pub fn with_root(mut self, root: &'a Path) -> Self {
        self.root = root;
        self
    }

    pub fn config(&self) -> &'a Config {
        self.config
    }

    pub fn root(&self) -> &'a Path {
        self.root
    }

    pub fn runner(&self) -> &'a dyn CommandRunner {
        self.runner
    }

    pub fn prompter(&mut self) -> &mut (dyn Prompter + 'a) {
        &mut *self.prompter
    }

    pub fn git(&self) -> Git<'a> {
        Git::new(self.runner)
    }

    pub fn gh(&self) -> Gh<'a> {
        Gh::new(self.runner)
    }
}
