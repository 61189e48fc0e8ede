//! The repository label set installed by `gtasks setup labels`.

use serde::Deserialize;

/// A label as created on the forge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabelSpec {
    pub name: &'static str,
    pub color: &'static str,
    pub description: &'static str,
}

pub const LABELS: &[LabelSpec] = &[
    LabelSpec {
        name: "bug",
        color: "d73a4a",
        description: "Something isn't working",
    },
    LabelSpec {
        name: "docs",
        color: "0075ca",
        description: "Improvements or additions to documentation",
    },
    LabelSpec {
        name: "exp",
        color: "cfd3d7",
        description: "Experiment to validate an hypothesis",
    },
    LabelSpec {
        name: "perf",
        color: "008672",
        description: "Performance",
    },
    LabelSpec {
        name: "refact",
        color: "7057ff",
        description: "Refactor the code",
    },
    LabelSpec {
        name: "chore",
        color: "8F7122",
        description: "Anything outside of code and documentation",
    },
    LabelSpec {
        name: "feat",
        color: "E6F574",
        description: "feature",
    },
];

/// A label as reported by the forge. Extra JSON fields are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ExistingLabel {
    pub name: String,
}
