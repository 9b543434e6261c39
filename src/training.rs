//! Training orchestration
//!
//! The orchestrator is the only component that writes to the registry. Both
//! entry points validate synchronously; the async path then hands the fit to
//! a bounded background pool and exposes progress through job records, while
//! the sync path blocks its caller until the record is committed (no timeout,
//! by contract).

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::sync::{RwLock, Semaphore};
use tracing::{error, info};
use uuid::Uuid;

use crate::dataset::{Holiday, Observation, Series};
use crate::error::{ForesightError, Result};
use crate::model::{ArtifactEnvelope, ForecastParams, Forecaster};
use crate::registry::{validate_name, ModelMetadata, ModelRecord, ModelRegistry};

/// A training request, as accepted at the boundary
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TrainRequest {
    pub observations: Vec<Observation>,
    pub model_name: Option<String>,
    pub params: Option<Map<String, Value>>,
    pub holidays: Option<Vec<Holiday>>,
}

/// Lifecycle of a background training job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    Pending,
    Running,
    Succeeded,
    Failed,
}

/// Job record for an accepted `train_async` request
#[derive(Debug, Clone, Serialize)]
pub struct TrainingJob {
    pub job_id: String,
    pub model_name: String,
    pub state: JobState,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// How many job records are retained before the oldest finished ones
/// are evicted. Keeps the job map bounded in a long-lived server.
const MAX_JOB_RECORDS: usize = 1000;

/// Builds models from datasets and commits them to the registry
pub struct TrainingOrchestrator {
    registry: Arc<ModelRegistry>,
    jobs: RwLock<HashMap<String, TrainingJob>>,
    workers: Arc<Semaphore>,
    job_capacity: usize,
}

impl TrainingOrchestrator {
    /// `workers` bounds how many background fits run concurrently
    pub fn new(registry: Arc<ModelRegistry>, workers: usize) -> Self {
        Self {
            registry,
            jobs: RwLock::new(HashMap::new()),
            workers: Arc::new(Semaphore::new(workers.max(1))),
            job_capacity: MAX_JOB_RECORDS,
        }
    }

    /// Train a model and block until its record is committed.
    ///
    /// Returns the model name. On any failure nothing is written: the
    /// registry put is the last step of the fit.
    pub fn train_sync(&self, request: TrainRequest) -> Result<String> {
        let (name, series) = self.prepare(&request)?;
        fit_and_store(
            &self.registry,
            &name,
            &series,
            request.params.unwrap_or_default(),
            request.holidays,
        )?;
        Ok(name)
    }

    /// Validate a request, then schedule the fit on the background pool.
    ///
    /// Malformed input is rejected here, before acceptance. Returns the job
    /// record in its `Pending` state; the caller can poll the job or the
    /// registry for the returned model name. Background failures update the
    /// job record and the log, never the original caller.
    pub async fn train_async(self: &Arc<Self>, request: TrainRequest) -> Result<TrainingJob> {
        let (name, series) = self.prepare(&request)?;

        let job = TrainingJob {
            job_id: Uuid::new_v4().simple().to_string(),
            model_name: name.clone(),
            state: JobState::Pending,
            created_at: Utc::now(),
            completed_at: None,
            error: None,
        };
        {
            let mut jobs = self.jobs.write().await;
            prune_terminal_jobs(&mut jobs, self.job_capacity);
            jobs.insert(job.job_id.clone(), job.clone());
        }

        let orchestrator = Arc::clone(self);
        let job_id = job.job_id.clone();
        let params = request.params.unwrap_or_default();
        let holidays = request.holidays;

        tokio::spawn(async move {
            let permit = match orchestrator.workers.clone().acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => return, // pool shut down
            };

            orchestrator
                .update_job(&job_id, |job| job.state = JobState::Running)
                .await;

            let registry = Arc::clone(&orchestrator.registry);
            let fit_name = name.clone();
            let outcome = tokio::task::spawn_blocking(move || {
                fit_and_store(&registry, &fit_name, &series, params, holidays)
            })
            .await
            .unwrap_or_else(|e| {
                Err(ForesightError::Training(format!(
                    "training task panicked: {}",
                    e
                )))
            });

            match outcome {
                Ok(()) => {
                    orchestrator
                        .update_job(&job_id, |job| {
                            job.state = JobState::Succeeded;
                            job.completed_at = Some(Utc::now());
                        })
                        .await;
                }
                Err(e) => {
                    error!(job = %job_id, model = %name, error = %e, "background training failed");
                    orchestrator
                        .update_job(&job_id, |job| {
                            job.state = JobState::Failed;
                            job.completed_at = Some(Utc::now());
                            job.error = Some(e.to_string());
                        })
                        .await;
                }
            }

            drop(permit);
        });

        Ok(job)
    }

    /// Snapshot of one job record
    pub async fn job(&self, job_id: &str) -> Result<TrainingJob> {
        self.jobs
            .read()
            .await
            .get(job_id)
            .cloned()
            .ok_or_else(|| ForesightError::NotFound(format!("job '{}' not found", job_id)))
    }

    /// Validation shared by both entry points. Runs before any acceptance.
    fn prepare(&self, request: &TrainRequest) -> Result<(String, Series)> {
        let series = Series::from_observations(&request.observations)?;
        let name = match &request.model_name {
            Some(name) => {
                validate_name(name)?;
                name.clone()
            }
            None => self.generate_name(),
        };
        Ok((name, series))
    }

    /// Random name in the original service's `model_{hex8}` shape.
    /// Collisions are negligible but cheap to rule out entirely.
    fn generate_name(&self) -> String {
        loop {
            let name = format!("model_{}", &Uuid::new_v4().simple().to_string()[..8]);
            if !self.registry.exists(&name) {
                return name;
            }
        }
    }

    async fn update_job(&self, job_id: &str, apply: impl FnOnce(&mut TrainingJob)) {
        if let Some(job) = self.jobs.write().await.get_mut(job_id) {
            apply(job);
        }
    }
}

/// Make room for one more record by evicting the oldest finished jobs.
/// Running and pending jobs are never evicted, so the map can exceed the
/// capacity only while that many fits are actually in flight.
fn prune_terminal_jobs(jobs: &mut HashMap<String, TrainingJob>, capacity: usize) {
    if jobs.len() < capacity {
        return;
    }

    let mut finished: Vec<(DateTime<Utc>, String)> = jobs
        .values()
        .filter(|job| matches!(job.state, JobState::Succeeded | JobState::Failed))
        .map(|job| (job.created_at, job.job_id.clone()))
        .collect();
    finished.sort();

    let excess = jobs.len() + 1 - capacity;
    for (_, job_id) in finished.into_iter().take(excess) {
        jobs.remove(&job_id);
    }
}

/// Fit a model and commit its record. The put is the final step, so a fit
/// failure leaves the registry untouched.
fn fit_and_store(
    registry: &ModelRegistry,
    name: &str,
    series: &Series,
    params: Map<String, Value>,
    holidays: Option<Vec<Holiday>>,
) -> Result<()> {
    let parsed = ForecastParams::from_bag(&params)?;
    let model = Forecaster::fit(series, holidays.as_deref().unwrap_or(&[]), &parsed)?;

    let record = ModelRecord {
        metadata: ModelMetadata {
            trained_at: Utc::now(),
            params,
            row_count: series.len(),
            holidays,
        },
        artifact: ArtifactEnvelope::wrap(&model)?,
    };
    registry.put(name, &record)?;

    info!(model = name, rows = series.len(), "trained and stored model");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;

    fn observations(n: usize) -> Vec<Observation> {
        (0..n)
            .map(|i| Observation {
                ds: Some(format!("2024-01-{:02}", i + 1)),
                y: Some(10.0 + i as f64),
            })
            .collect()
    }

    fn orchestrator(dir: &std::path::Path) -> Arc<TrainingOrchestrator> {
        let registry = Arc::new(ModelRegistry::open(dir).unwrap());
        Arc::new(TrainingOrchestrator::new(registry, 2))
    }

    #[test]
    fn test_train_sync_commits_record() {
        let dir = tempfile::tempdir().unwrap();
        let registry = Arc::new(ModelRegistry::open(dir.path()).unwrap());
        let orch = TrainingOrchestrator::new(Arc::clone(&registry), 2);

        let name = orch
            .train_sync(TrainRequest {
                observations: observations(5),
                model_name: Some("demand".to_string()),
                ..TrainRequest::default()
            })
            .unwrap();

        assert_eq!(name, "demand");
        assert_eq!(registry.get("demand").unwrap().metadata.row_count, 5);
    }

    #[test]
    fn test_train_sync_generates_name() {
        let dir = tempfile::tempdir().unwrap();
        let registry = Arc::new(ModelRegistry::open(dir.path()).unwrap());
        let orch = TrainingOrchestrator::new(Arc::clone(&registry), 2);

        let name = orch
            .train_sync(TrainRequest {
                observations: observations(3),
                ..TrainRequest::default()
            })
            .unwrap();

        assert!(name.starts_with("model_"));
        assert!(registry.exists(&name));
    }

    #[test]
    fn test_failed_fit_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let registry = Arc::new(ModelRegistry::open(dir.path()).unwrap());
        let orch = TrainingOrchestrator::new(Arc::clone(&registry), 2);

        let bag = json!({"no_such_param": 1}).as_object().unwrap().clone();
        let err = orch
            .train_sync(TrainRequest {
                observations: observations(3),
                model_name: Some("demand".to_string()),
                params: Some(bag),
                ..TrainRequest::default()
            })
            .unwrap_err();

        assert!(matches!(err, ForesightError::Training(_)));
        assert!(!registry.exists("demand"));
        assert!(registry.list().unwrap().is_empty());
    }

    #[test]
    fn test_invalid_dataset_rejected_before_fit() {
        let dir = tempfile::tempdir().unwrap();
        let orch = orchestrator(dir.path());

        let err = orch
            .train_sync(TrainRequest::default())
            .unwrap_err();
        assert!(matches!(err, ForesightError::Validation(_)));
    }

    #[tokio::test]
    async fn test_train_async_accepts_then_completes() {
        let dir = tempfile::tempdir().unwrap();
        let orch = orchestrator(dir.path());

        let job = orch
            .train_async(TrainRequest {
                observations: observations(5),
                ..TrainRequest::default()
            })
            .await
            .unwrap();
        assert_eq!(job.state, JobState::Pending);

        let mut state = job.state;
        for _ in 0..100 {
            state = orch.job(&job.job_id).await.unwrap().state;
            if state == JobState::Succeeded || state == JobState::Failed {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        assert_eq!(state, JobState::Succeeded);
        assert!(orch.registry.exists(&job.model_name));
    }

    #[tokio::test]
    async fn test_train_async_rejects_bad_input_synchronously() {
        let dir = tempfile::tempdir().unwrap();
        let orch = orchestrator(dir.path());

        let err = orch.train_async(TrainRequest::default()).await.unwrap_err();
        assert!(matches!(err, ForesightError::Validation(_)));
    }

    #[tokio::test]
    async fn test_background_failure_recorded_on_job() {
        let dir = tempfile::tempdir().unwrap();
        let orch = orchestrator(dir.path());

        let bag = json!({"bogus": true}).as_object().unwrap().clone();
        let job = orch
            .train_async(TrainRequest {
                observations: observations(3),
                model_name: Some("doomed".to_string()),
                params: Some(bag),
                ..TrainRequest::default()
            })
            .await
            .unwrap();

        let mut finished = None;
        for _ in 0..100 {
            let snapshot = orch.job(&job.job_id).await.unwrap();
            if snapshot.state == JobState::Failed || snapshot.state == JobState::Succeeded {
                finished = Some(snapshot);
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }

        let snapshot = finished.expect("job should finish");
        assert_eq!(snapshot.state, JobState::Failed);
        assert!(snapshot.error.is_some());
        assert!(!orch.registry.exists("doomed"));
    }

    async fn wait_terminal(orch: &TrainingOrchestrator, job_id: &str) -> JobState {
        for _ in 0..200 {
            let state = orch.job(job_id).await.unwrap().state;
            if state == JobState::Succeeded || state == JobState::Failed {
                return state;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("job {} never finished", job_id);
    }

    #[tokio::test]
    async fn test_finished_jobs_evicted_at_capacity() {
        let dir = tempfile::tempdir().unwrap();
        let registry = Arc::new(ModelRegistry::open(dir.path()).unwrap());
        let orch = Arc::new(TrainingOrchestrator {
            registry,
            jobs: RwLock::new(HashMap::new()),
            workers: Arc::new(Semaphore::new(1)),
            job_capacity: 3,
        });

        let mut job_ids = Vec::new();
        for i in 0..5 {
            let job = orch
                .train_async(TrainRequest {
                    observations: observations(4),
                    model_name: Some(format!("m{}", i)),
                    ..TrainRequest::default()
                })
                .await
                .unwrap();
            assert_eq!(wait_terminal(&orch, &job.job_id).await, JobState::Succeeded);
            job_ids.push(job.job_id);
        }

        assert!(orch.jobs.read().await.len() <= 3);
        // the oldest finished record is gone, the newest survives
        assert!(orch.job(&job_ids[0]).await.is_err());
        assert!(orch.job(job_ids.last().unwrap()).await.is_ok());
    }

    #[tokio::test]
    async fn test_unknown_job_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let orch = orchestrator(dir.path());
        assert!(matches!(
            orch.job("nope").await.unwrap_err(),
            ForesightError::NotFound(_)
        ));
    }
}
