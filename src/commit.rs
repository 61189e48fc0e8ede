//! Commit types and commit message formatting.

use std::fmt;

/// Kind of change recorded by a commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommitType {
    Fix,
    Feat,
    Wip,
    Exp,
    Refactor,
    Perf,
    Docs,
    Test,
    Build,
    Chore,
    Ci,
    Backup,
}

/// Every commit type with its description, in menu order.
pub const COMMIT_TYPES: &[(CommitType, &str)] = &[
    (CommitType::Fix, "A bug fix."),
    (CommitType::Feat, "A new feature."),
    (CommitType::Wip, "Work in progress."),
    (CommitType::Exp, "Code to recreate an experiment or its results."),
    (CommitType::Refactor, "A code change that neither fixes a bug nor adds a feature."),
    (CommitType::Perf, "A code change that improves performance."),
    (CommitType::Docs, "Documentation only changes."),
    (CommitType::Test, "Adding missing tests or correcting existing tests."),
    (
        CommitType::Build,
        "Changes that affect the build system or external dependencies (pip, docker, .toml).",
    ),
    (CommitType::Chore, "Chores like changing folder structure, renaming files, etc."),
    (CommitType::Ci, "Changes to CI configuration files and scripts."),
    (CommitType::Backup, "Backup."),
];

impl CommitType {
    /// The tag written in front of the commit subject.
    pub fn tag(self) -> &'static str {
        match self {
            CommitType::Fix => "fix",
            CommitType::Feat => "feat",
            CommitType::Wip => "WIP",
            CommitType::Exp => "exp",
            CommitType::Refactor => "refactor",
            CommitType::Perf => "perf",
            CommitType::Docs => "docs",
            CommitType::Test => "test",
            CommitType::Build => "build",
            CommitType::Chore => "chore",
            CommitType::Ci => "ci",
            CommitType::Backup => "backup",
        }
    }

    pub fn description(self) -> &'static str {
        COMMIT_TYPES
            .iter()
            .find(|(t, _)| *t == self)
            .map(|(_, d)| *d)
            .unwrap_or_default()
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        COMMIT_TYPES
            .iter()
            .map(|(t, _)| *t)
            .find(|t| t.tag() == tag)
    }

    /// Work in progress, experiments and backups never get a pull request.
    pub fn opens_pull_request(self) -> bool {
        !matches!(self, CommitType::Wip | CommitType::Exp | CommitType::Backup)
    }

    /// Menu line shown when picking a type, `tag - description`.
    pub fn menu_label(self) -> String {
        format!("{} - {}", self.tag(), self.description())
    }
}

impl fmt::Display for CommitType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Builds `<type>: <description>\n\n<body>` plus an optional
/// `BREAKING CHANGE:` trailer when `breaking` is non-empty.
pub fn compose_commit_message(
    commit_type: CommitType,
    description: &str,
    body: &str,
    breaking: Option<&str>,
) -> String {
    let mut message = format!("{}: {}\n\n{}", commit_type.tag(), description, body);
    if let Some(text) = breaking.filter(|t| !t.is_empty()) {
        message.push_str("\n\nBREAKING CHANGE: ");
        message.push_str(text);
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feat_without_body() {
        let message = compose_commit_message(CommitType::Feat, "add search", "", Some(""));
        assert_eq!(message, "feat: add search\n\n");
    }

    #[test]
    fn test_breaking_change_trailer() {
        let message = compose_commit_message(
            CommitType::Refactor,
            "rename config keys",
            "Moves keys under `containers`.",
            Some("image_tag moved"),
        );
        assert_eq!(
            message,
            "refactor: rename config keys\n\nMoves keys under `containers`.\n\nBREAKING CHANGE: image_tag moved"
        );
    }

    #[test]
    fn test_every_type_prefixes_subject() {
        for (commit_type, _) in COMMIT_TYPES {
            let without = compose_commit_message(*commit_type, "subject", "body", None);
            assert!(without.starts_with(&format!("{}: subject", commit_type.tag())));
            assert!(!without.contains("BREAKING CHANGE:"));

            let with = compose_commit_message(*commit_type, "subject", "body", Some("api"));
            assert!(with.starts_with(&format!("{}: subject", commit_type.tag())));
            assert!(with.contains("BREAKING CHANGE: api"));
        }
    }

    #[test]
    fn test_table_covers_twelve_types() {
        assert_eq!(COMMIT_TYPES.len(), 12);
        for (commit_type, description) in COMMIT_TYPES {
            assert_eq!(commit_type.description(), *description);
            assert_eq!(CommitType::from_tag(commit_type.tag()), Some(*commit_type));
        }
    }

    #[test]
    fn test_pull_request_eligibility() {
        let skipped: Vec<_> = COMMIT_TYPES
            .iter()
            .map(|(t, _)| *t)
            .filter(|t| !t.opens_pull_request())
            .collect();
        assert_eq!(
            skipped,
            vec![CommitType::Wip, CommitType::Exp, CommitType::Backup]
        );
    }

    #[test]
    fn test_menu_label() {
        assert_eq!(CommitType::Fix.menu_label(), "fix - A bug fix.");
        assert_eq!(CommitType::Wip.to_string(), "WIP");
    }
}
