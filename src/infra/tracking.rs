// ============================================================
// Layer 5 — Experiment Tracking Store
// ============================================================
// A file-backed experiment tracker. Layout under the root:
//
//   <root>/experiments.json                  name → experiment id
//   <root>/<exp_id>/<run_id>/meta.json       status, params, times
//   <root>/<exp_id>/<run_id>/artifacts/      logged files
//
// activate() hands back an ActiveRun. A run that is dropped
// without finish() is recorded as Failed, so every exit path
// (early return, `?`, panic unwind) leaves a closed run.

use std::collections::BTreeMap;
use std::fmt::Display;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

const EXPERIMENTS_FILE: &str = "experiments.json";
const META_FILE:        &str = "meta.json";
const ARTIFACTS_DIR:    &str = "artifacts";

#[derive(Debug, Error)]
pub enum TrackingError {
    #[error("tracking store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("tracking metadata is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("run '{0}' not found")]
    RunNotFound(String),

    #[error("artifact '{0}' has no file name")]
    InvalidArtifact(String),
}

pub type Result<T> = std::result::Result<T, TrackingError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunStatus {
    Running,
    Finished,
    Failed,
}

/// What meta.json holds for one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunMeta {
    pub run_id:        String,
    pub run_name:      Option<String>,
    pub experiment_id: String,
    pub status:        RunStatus,
    pub start_time:    DateTime<Utc>,
    pub end_time:      Option<DateTime<Utc>>,
    #[serde(default)]
    pub params:        BTreeMap<String, String>,
    #[serde(default)]
    pub artifacts:     Vec<String>,
}

// ─── FileTrackingStore ────────────────────────────────────────────────────────
#[derive(Debug, Clone)]
pub struct FileTrackingStore {
    root: PathBuf,
}

impl FileTrackingStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Id of the named experiment, if it was ever created.
    pub fn experiment_id(&self, name: &str) -> Result<Option<String>> {
        Ok(self.experiments()?.remove(name))
    }

    /// Id of the named experiment, creating it on first use.
    pub fn get_or_create_experiment(&self, name: &str) -> Result<String> {
        let mut experiments = self.experiments()?;
        if let Some(id) = experiments.get(name) {
            return Ok(id.clone());
        }

        let id = experiments.len().to_string();
        experiments.insert(name.to_string(), id.clone());
        fs::create_dir_all(self.root.join(&id))?;
        fs::write(
            self.root.join(EXPERIMENTS_FILE),
            serde_json::to_string_pretty(&experiments)?,
        )?;

        tracing::info!("Created experiment '{}' (id {})", name, id);
        Ok(id)
    }

    /// Resume `run_id` when given, otherwise start a new run in
    /// `experiment_name`.
    pub fn activate(
        &self,
        experiment_name: &str,
        run_id:          Option<&str>,
        run_name:        Option<&str>,
    ) -> Result<ActiveRun> {
        let meta = match run_id {
            Some(id) => {
                let mut meta = self.load_run(id)?;
                meta.status   = RunStatus::Running;
                meta.end_time = None;
                if let Some(name) = run_name {
                    meta.run_name = Some(name.to_string());
                }
                tracing::info!("Resuming run {} in experiment {}", meta.run_id, meta.experiment_id);
                meta
            }
            None => {
                let experiment_id = self.get_or_create_experiment(experiment_name)?;
                let meta = RunMeta {
                    run_id: Uuid::new_v4().simple().to_string(),
                    run_name: run_name.map(str::to_string),
                    experiment_id,
                    status: RunStatus::Running,
                    start_time: Utc::now(),
                    end_time: None,
                    params: BTreeMap::new(),
                    artifacts: Vec::new(),
                };
                tracing::info!(
                    "Started run {} in experiment '{}'",
                    meta.run_id,
                    experiment_name
                );
                meta
            }
        };

        let run = ActiveRun {
            dir:      self.run_dir(&meta.experiment_id, &meta.run_id),
            meta,
            finished: false,
        };
        fs::create_dir_all(run.artifact_dir())?;
        run.save()?;
        Ok(run)
    }

    /// Read a run's metadata from whichever experiment holds it.
    pub fn load_run(&self, run_id: &str) -> Result<RunMeta> {
        for experiment_id in self.experiments()?.values() {
            let path = self.run_dir(experiment_id, run_id).join(META_FILE);
            if path.is_file() {
                return Ok(serde_json::from_str(&fs::read_to_string(path)?)?);
            }
        }
        Err(TrackingError::RunNotFound(run_id.to_string()))
    }

    fn run_dir(&self, experiment_id: &str, run_id: &str) -> PathBuf {
        self.root.join(experiment_id).join(run_id)
    }

    fn experiments(&self) -> Result<BTreeMap<String, String>> {
        let path = self.root.join(EXPERIMENTS_FILE);
        if !path.exists() {
            fs::create_dir_all(&self.root)?;
            return Ok(BTreeMap::new());
        }
        Ok(serde_json::from_str(&fs::read_to_string(path)?)?)
    }
}

// ─── ActiveRun ────────────────────────────────────────────────────────────────
/// An open run. Call `finish()` on success; dropping it otherwise
/// marks the run Failed.
#[derive(Debug)]
pub struct ActiveRun {
    dir:      PathBuf,
    meta:     RunMeta,
    finished: bool,
}

impl ActiveRun {
    pub fn run_id(&self) -> &str {
        &self.meta.run_id
    }

    pub fn experiment_id(&self) -> &str {
        &self.meta.experiment_id
    }

    pub fn run_name(&self) -> Option<&str> {
        self.meta.run_name.as_deref()
    }

    pub fn meta(&self) -> &RunMeta {
        &self.meta
    }

    pub fn artifact_dir(&self) -> PathBuf {
        self.dir.join(ARTIFACTS_DIR)
    }

    /// `file://` URI of the artifact directory
    pub fn artifact_uri(&self) -> String {
        let dir = self.artifact_dir();
        let dir = fs::canonicalize(&dir).unwrap_or(dir);
        format!("file://{}", dir.display())
    }

    pub fn log_param(&mut self, key: &str, value: impl Display) -> Result<()> {
        self.meta.params.insert(key.to_string(), value.to_string());
        self.save()
    }

    /// Copy `path` into the run's artifact directory.
    pub fn log_artifact(&mut self, path: &Path) -> Result<PathBuf> {
        let name = path
            .file_name()
            .ok_or_else(|| TrackingError::InvalidArtifact(path.display().to_string()))?
            .to_string_lossy()
            .into_owned();

        let target = self.artifact_dir().join(&name);
        fs::copy(path, &target)?;
        if !self.meta.artifacts.contains(&name) {
            self.meta.artifacts.push(name);
        }
        self.save()?;

        tracing::debug!("Logged artifact '{}'", target.display());
        Ok(target)
    }

    pub fn finish(mut self) -> Result<()> {
        self.close(RunStatus::Finished)
    }

    fn close(&mut self, status: RunStatus) -> Result<()> {
        self.finished      = true;
        self.meta.status   = status;
        self.meta.end_time = Some(Utc::now());
        tracing::info!("Run {} {:?}", self.meta.run_id, status);
        self.save()
    }

    fn save(&self) -> Result<()> {
        fs::write(
            self.dir.join(META_FILE),
            serde_json::to_string_pretty(&self.meta)?,
        )?;
        Ok(())
    }
}

impl Drop for ActiveRun {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        if let Err(e) = self.close(RunStatus::Failed) {
            tracing::warn!("Could not record failed run {}: {}", self.meta.run_id, e);
        }
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_run_creates_experiment_and_meta() {
        let dir   = tempfile::tempdir().unwrap();
        let store = FileTrackingStore::new(dir.path());

        let run = store.activate("cls", None, Some("baseline")).unwrap();
        let run_id = run.run_id().to_string();

        assert_eq!(run.experiment_id(), "0");
        assert_eq!(run.run_name(), Some("baseline"));
        assert!(run.artifact_uri().starts_with("file://"));
        assert!(dir.path().join("0").join(&run_id).join(META_FILE).is_file());
        run.finish().unwrap();

        let meta = store.load_run(&run_id).unwrap();
        assert_eq!(meta.status, RunStatus::Finished);
        assert!(meta.end_time.is_some());
    }

    #[test]
    fn test_experiments_keep_their_ids() {
        let dir   = tempfile::tempdir().unwrap();
        let store = FileTrackingStore::new(dir.path());

        assert_eq!(store.get_or_create_experiment("a").unwrap(), "0");
        assert_eq!(store.get_or_create_experiment("b").unwrap(), "1");
        assert_eq!(store.get_or_create_experiment("a").unwrap(), "0");
        assert_eq!(store.experiment_id("b").unwrap().as_deref(), Some("1"));
        assert_eq!(store.experiment_id("c").unwrap(), None);
    }

    #[test]
    fn test_dropped_run_is_failed() {
        let dir   = tempfile::tempdir().unwrap();
        let store = FileTrackingStore::new(dir.path());

        let run_id = {
            let run = store.activate("cls", None, None).unwrap();
            run.run_id().to_string()
        };

        assert_eq!(store.load_run(&run_id).unwrap().status, RunStatus::Failed);
    }

    #[test]
    fn test_resume_keeps_params_and_experiment() {
        let dir   = tempfile::tempdir().unwrap();
        let store = FileTrackingStore::new(dir.path());

        let mut run = store.activate("cls", None, None).unwrap();
        run.log_param("batch_size", 16).unwrap();
        let run_id = run.run_id().to_string();
        run.finish().unwrap();

        let resumed = store.activate("ignored", Some(&run_id), None).unwrap();
        assert_eq!(resumed.run_id(), run_id);
        assert_eq!(resumed.experiment_id(), "0");
        assert_eq!(resumed.meta().status, RunStatus::Running);
        assert_eq!(resumed.meta().params.get("batch_size").map(String::as_str), Some("16"));
        resumed.finish().unwrap();
    }

    #[test]
    fn test_resume_unknown_run_fails() {
        let dir   = tempfile::tempdir().unwrap();
        let store = FileTrackingStore::new(dir.path());

        let err = store.activate("cls", Some("nope"), None).unwrap_err();
        assert!(matches!(err, TrackingError::RunNotFound(id) if id == "nope"));
    }

    #[test]
    fn test_log_artifact_copies_file() {
        let dir   = tempfile::tempdir().unwrap();
        let store = FileTrackingStore::new(dir.path().join("mlruns"));
        let file  = dir.path().join("config.yaml");
        fs::write(&file, "a: 1\n").unwrap();

        let mut run = store.activate("cls", None, None).unwrap();
        let copied  = run.log_artifact(&file).unwrap();

        assert_eq!(fs::read_to_string(copied).unwrap(), "a: 1\n");
        assert_eq!(run.meta().artifacts, vec!["config.yaml".to_string()]);
        run.finish().unwrap();
    }
}
