//! Experiment notes.
//!
//! An experiment note records the hypothesis behind an `exp` commit and is
//! written as a YAML file named after the moment it was taken.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Format of the `date` field.
pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
/// Format of the file stem; no `:` so the name is valid everywhere.
const FILE_STEM_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

#[derive(Debug, Error)]
pub enum NoteError {
    #[error("notes directory not found: {0}")]
    DirMissing(PathBuf),
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to serialize experiment note: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExperimentNote {
    pub author: String,
    pub date: String,
    pub hypothesis: String,
    pub results: String,
    pub conclusion: String,
    #[serde(default)]
    pub data_risk: String,
    #[serde(default)]
    pub model_risk: String,
    #[serde(default)]
    pub code_risk: String,
}

/// Answers collected from the user, before author and date are attached.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteFields {
    pub hypothesis: String,
    pub results: String,
    pub conclusion: String,
    pub data_risk: String,
    pub model_risk: String,
    pub code_risk: String,
}

impl ExperimentNote {
    pub fn new(author: &str, taken_at: DateTime<Local>, fields: NoteFields) -> Self {
        Self {
            author: author.to_string(),
            date: taken_at.format(DATE_FORMAT).to_string(),
            hypothesis: fields.hypothesis,
            results: fields.results,
            conclusion: fields.conclusion,
            data_risk: fields.data_risk,
            model_risk: fields.model_risk,
            code_risk: fields.code_risk,
        }
    }

    pub fn to_yaml(&self) -> Result<String, NoteError> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn load(path: &Path) -> Result<Self, NoteError> {
        let content = std::fs::read_to_string(path).map_err(|source| NoteError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_yaml::from_str(&content)?)
    }
}

/// Writes `note` into `dir` as `<timestamp>.yaml` and returns the file path.
///
/// The directory must already exist. A note taken in the same second as an
/// existing one gets a numeric suffix instead of overwriting it.
pub fn record_experiment_note(
    dir: &Path,
    note: &ExperimentNote,
    taken_at: DateTime<Local>,
) -> Result<PathBuf, NoteError> {
    if !dir.is_dir() {
        return Err(NoteError::DirMissing(dir.to_path_buf()));
    }

    let stem = taken_at.format(FILE_STEM_FORMAT).to_string();
    let mut path = dir.join(format!("{}.yaml", stem));
    let mut n = 1;
    while path.exists() {
        path = dir.join(format!("{}-{}.yaml", stem, n));
        n += 1;
    }

    let yaml = note.to_yaml()?;
    std::fs::write(&path, yaml).map_err(|source| NoteError::Io {
        path: path.clone(),
        source,
    })?;

    tracing::debug!(path = %path.display(), "recorded experiment note");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use tempfile::TempDir;

    use super::*;

    fn taken_at() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 3, 9, 14, 5, 30).single().unwrap()
    }

    fn sample() -> ExperimentNote {
        ExperimentNote::new(
            "ada",
            taken_at(),
            NoteFields {
                hypothesis: "Smaller batches converge faster".to_string(),
                results: "loss: 0.31 -> 0.27".to_string(),
                conclusion: "Keep batch size 32".to_string(),
                data_risk: String::new(),
                model_risk: "May overfit: watch validation".to_string(),
                code_risk: String::new(),
            },
        )
    }

    #[test]
    fn test_date_format() {
        assert_eq!(sample().date, "2024-03-09 14:05:30");
    }

    #[test]
    fn test_record_and_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let note = sample();

        let path = record_experiment_note(dir.path(), &note, taken_at()).unwrap();
        assert_eq!(path.file_name().unwrap(), "2024-03-09_14-05-30.yaml");

        let loaded = ExperimentNote::load(&path).unwrap();
        assert_eq!(loaded, note);
    }

    #[test]
    fn test_record_does_not_overwrite() {
        let dir = TempDir::new().unwrap();
        let note = sample();

        let first = record_experiment_note(dir.path(), &note, taken_at()).unwrap();
        let second = record_experiment_note(dir.path(), &note, taken_at()).unwrap();
        assert_ne!(first, second);
        assert_eq!(second.file_name().unwrap(), "2024-03-09_14-05-30-1.yaml");
    }

    #[test]
    fn test_missing_dir_fails() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("notes");

        let err = record_experiment_note(&missing, &sample(), taken_at()).unwrap_err();
        assert!(matches!(err, NoteError::DirMissing(p) if p == missing));
    }

    #[test]
    fn test_yaml_has_every_field() {
        let yaml = sample().to_yaml().unwrap();
        for key in [
            "author:",
            "date:",
            "hypothesis:",
            "results:",
            "conclusion:",
            "data_risk:",
            "model_risk:",
            "code_risk:",
        ] {
            assert!(yaml.contains(key), "missing {key} in {yaml}");
        }
    }
}
