//! Setup commands - one-off repository configuration.

use owo_colors::OwoColorize;

use crate::TaskContext;
use crate::error_fmt::AppError;
use crate::labels::LABELS;

/// Replace every label of the repository with the standard label set.
pub fn labels(ctx: &TaskContext<'_>) -> Result<(), AppError> {
    let gh = ctx.gh();
    let repo = gh.current_repo()?;

    for name in gh.labels(&repo)? {
        gh.delete_label(&repo, &name)?;
        println!("{} {}", "Deleted label:".red(), name);
    }
    for label in LABELS {
        gh.create_label(&repo, label)?;
        println!("{} {}", "Created label:".green(), label.name.cyan());
    }
    Ok(())
}

/// Make `git push` push submodule commits the superproject points at.
pub fn submodule(ctx: &TaskContext<'_>) -> Result<(), AppError> {
    ctx.git().set_config("push.recurseSubmodules", "on-demand")?;
    println!("push.recurseSubmodules set to {}", "on-demand".cyan());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::prompt::testing::ScriptedPrompter;
    use crate::runner::CommandOutput;
    use crate::runner::testing::ScriptedRunner;

    #[test]
    fn test_labels_replaces_existing() {
        let config = Config::default();
        let runner = ScriptedRunner::new()
            .respond(
                "gh repo view --json owner,name",
                CommandOutput::ok(r#"{"name":"widgets","owner":{"login":"acme"}}"#),
            )
            .respond(
                "gh label list --repo acme/widgets --json name --limit 1000",
                CommandOutput::ok(r#"[{"name":"enhancement"},{"name":"good first issue"}]"#),
            );
        let mut prompter = ScriptedPrompter::default();
        let ctx = TaskContext::new(&config, &runner, &mut prompter);

        labels(&ctx).unwrap();

        let calls = runner.calls();
        assert_eq!(calls[2], "gh label delete enhancement --repo acme/widgets --yes");
        assert_eq!(
            calls[3],
            "gh label delete 'good first issue' --repo acme/widgets --yes"
        );
        let created: Vec<_> = calls
            .iter()
            .filter(|c| c.starts_with("gh label create"))
            .collect();
        assert_eq!(created.len(), LABELS.len());
        assert_eq!(
            created[0],
            "gh label create bug --color d73a4a --description 'Something isn'\\''t working' --repo acme/widgets"
        );
    }

    #[test]
    fn test_submodule_sets_push_config() {
        let config = Config::default();
        let runner = ScriptedRunner::new();
        let mut prompter = ScriptedPrompter::default();
        let ctx = TaskContext::new(&config, &runner, &mut prompter);

        submodule(&ctx).unwrap();

        assert_eq!(
            runner.calls(),
            vec!["git config push.recurseSubmodules on-demand"]
        );
    }
}
