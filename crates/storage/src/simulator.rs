#![forbid(unsafe_code)]

use crate::memory::{MemoryBackend, ResultManifest};
use jg_core::jobs::JobStatus;
use jg_core::ports::BackendGateway;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

const BYTES_PER_INSTANCE: u64 = 1024 * 1024;
const PROGRESS_STEP: f64 = 25.0;

/// Drives every active job one step per tick so the lifecycle can be observed
/// end-to-end without a real compute service behind the gateway.
pub struct Simulator {
    backend: Arc<MemoryBackend>,
    tick: Duration,
}

impl Simulator {
    pub fn new(backend: Arc<MemoryBackend>, tick: Duration) -> Self {
        Self { backend, tick }
    }

    /// Advances each non-terminal job once. Returns how many jobs moved.
    pub async fn step(&self) -> usize {
        let mut advanced = 0;
        for job_id in self.backend.active_job_ids().await {
            let job = match self.backend.get_status(&job_id).await {
                Ok(job) => job,
                Err(err) => {
                    tracing::debug!(job_id = %job_id, error = %err, "simulator skipped job");
                    continue;
                }
            };
            let outcome = match job.status() {
                JobStatus::Submitted => self.backend.mark_queued(&job_id).await,
                JobStatus::Queued => self.backend.mark_running(&job_id).await,
                JobStatus::Running if job.progress() + PROGRESS_STEP < 100.0 => {
                    self.backend
                        .report_progress(&job_id, job.progress() + PROGRESS_STEP)
                        .await
                }
                JobStatus::Running => {
                    let instances = u64::from(job.instance_count());
                    self.backend
                        .complete(
                            &job_id,
                            ResultManifest {
                                file_count: instances,
                                file_size_bytes: instances * BYTES_PER_INSTANCE,
                            },
                        )
                        .await
                }
                _ => continue,
            };
            // A concurrent cancel can land between the read and the write.
            match outcome {
                Ok(_) => advanced += 1,
                Err(err) => {
                    tracing::debug!(job_id = %job_id, error = %err, "simulator lost a race")
                }
            }
        }
        advanced
    }

    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            tracing::info!(tick_ms = self.tick.as_millis() as u64, "job simulator started");
            let mut interval = tokio::time::interval(self.tick);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                let advanced = self.step().await;
                if advanced > 0 {
                    tracing::trace!(advanced, "simulator tick");
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jg_core::jobs::{JobSpec, ResourceType};

    #[tokio::test]
    async fn step_walks_a_job_to_completion() {
        let backend = Arc::new(MemoryBackend::new());
        let job = backend
            .submit(JobSpec::new("render", ResourceType::Gpu, 3))
            .await
            .unwrap();
        let sim = Simulator::new(backend.clone(), Duration::from_millis(10));

        let mut seen = Vec::new();
        for _ in 0..10 {
            sim.step().await;
            let current = backend.get_status(job.job_id()).await.unwrap();
            seen.push((current.status(), current.progress()));
            if current.is_terminal() {
                break;
            }
        }
        assert_eq!(seen[0], (JobStatus::Queued, 0.0));
        assert_eq!(seen[1], (JobStatus::Running, 0.0));
        assert_eq!(seen[2], (JobStatus::Running, 25.0));
        assert_eq!(seen.last(), Some(&(JobStatus::Completed, 100.0)));
        // Progress never goes backwards.
        assert!(seen.windows(2).all(|w| w[0].1 <= w[1].1));

        let result = backend.retrieve_results(job.job_id(), None).await.unwrap();
        assert_eq!(result.file_count(), 3);
        assert_eq!(result.file_size_bytes(), 3 * BYTES_PER_INSTANCE);
        assert_eq!(sim.step().await, 0);
    }

    #[tokio::test]
    async fn step_leaves_cancelled_jobs_alone() {
        let backend = Arc::new(MemoryBackend::new());
        let job = backend
            .submit(JobSpec::new("render", ResourceType::Cpu, 1))
            .await
            .unwrap();
        backend.cancel(job.job_id(), None).await.unwrap();
        let sim = Simulator::new(backend.clone(), Duration::from_millis(10));
        assert_eq!(sim.step().await, 0);
        assert_eq!(
            backend.get_status(job.job_id()).await.unwrap().status(),
            JobStatus::Cancelled
        );
    }

    #[tokio::test(start_paused = true)]
    async fn spawned_simulator_advances_on_its_own() {
        let backend = Arc::new(MemoryBackend::new());
        let job = backend
            .submit(JobSpec::new("render", ResourceType::Cpu, 1))
            .await
            .unwrap();
        let handle = Simulator::new(backend.clone(), Duration::from_millis(50)).spawn();
        tokio::time::sleep(Duration::from_millis(1000)).await;
        assert_eq!(
            backend.get_status(job.job_id()).await.unwrap().status(),
            JobStatus::Completed
        );
        handle.abort();
    }
}
