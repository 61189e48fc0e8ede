pub mod commands;
pub mod commit;
pub mod config;
pub mod context;
pub mod error_fmt;
pub mod gh;
pub mod git;
pub mod labels;
pub mod notes;
pub mod prompt;
pub mod runner;
pub mod templates;
pub mod workflow;

// Re-export commonly used types for the binary
pub use commit::{COMMIT_TYPES, CommitType, compose_commit_message};
pub use config::{Config, DEFAULT_CONFIG_FILE, SettingsError};
pub use context::TaskContext;
pub use notes::{ExperimentNote, record_experiment_note};
pub use prompt::{Prompter, TerminalPrompter};
pub use runner::{CommandLine, CommandOutput, CommandRunner, SystemRunner};
pub use workflow::{CommitWorkflow, WorkflowOutcome};
