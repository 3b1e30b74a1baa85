//! Polling compute worker.
//!
//! Runs N independent loops (the configured computing power) against the
//! coordinator's internal task endpoints: fetch, wait out the task's
//! simulated latency, compute, report. There is no push channel and no
//! failure-reporting path: a task the worker cannot compute (division by
//! zero) is logged and abandoned, and the coordinator never hears about
//! it again.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::config::WorkerConfig;
use crate::expr::BinaryOp;

const IDLE_BACKOFF: Duration = Duration::from_secs(2);

/// Wire form of a task as the coordinator hands it out.
#[derive(Debug, Deserialize)]
struct FetchedTask {
    id: String,
    arg1: f64,
    arg2: f64,
    operation: BinaryOp,
    operation_time: u64,
}

#[derive(Deserialize)]
struct TaskEnvelope {
    task: FetchedTask,
}

#[derive(Serialize)]
struct ResultReport<'a> {
    id: &'a str,
    result: f64,
}

pub struct Worker {
    config: WorkerConfig,
    client: reqwest::Client,
}

impl Worker {
    pub fn new(config: WorkerConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    /// Spawn one polling loop per unit of computing power and run until
    /// the process is killed. The loops never return on their own.
    pub async fn run(self) -> Result<()> {
        let worker = Arc::new(self);
        let mut handles = Vec::with_capacity(worker.config.computing_power);
        for slot in 0..worker.config.computing_power {
            info!(slot, "starting worker loop");
            let worker = worker.clone();
            handles.push(tokio::spawn(async move { worker.poll_loop(slot).await }));
        }
        for handle in handles {
            handle.await?;
        }
        Ok(())
    }

    async fn poll_loop(&self, slot: usize) {
        loop {
            let Some(task) = self.fetch_task(slot).await else {
                tokio::time::sleep(IDLE_BACKOFF).await;
                continue;
            };

            debug!(
                slot,
                task_id = %task.id,
                "processing {} {} {} ({} ms)",
                task.arg1,
                task.operation,
                task.arg2,
                task.operation_time
            );
            tokio::time::sleep(Duration::from_millis(task.operation_time)).await;

            match task.operation.apply(task.arg1, task.arg2) {
                Ok(result) => self.send_result(slot, &task.id, result).await,
                Err(err) => {
                    // No failure protocol exists; the task is abandoned.
                    error!(slot, task_id = %task.id, "cannot compute task: {err}");
                }
            }
        }
    }

    async fn fetch_task(&self, slot: usize) -> Option<FetchedTask> {
        let url = format!("{}/internal/task", self.config.coordinator_url);
        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(err) => {
                warn!(slot, "failed to fetch task: {err}");
                return None;
            }
        };

        match response.status() {
            StatusCode::OK => {}
            StatusCode::NOT_FOUND => return None,
            status => {
                warn!(slot, %status, "unexpected status fetching task");
                return None;
            }
        }

        match response.json::<TaskEnvelope>().await {
            Ok(envelope) => Some(envelope.task),
            Err(err) => {
                warn!(slot, "failed to decode task: {err}");
                None
            }
        }
    }

    async fn send_result(&self, slot: usize, task_id: &str, result: f64) {
        let url = format!("{}/internal/task", self.config.coordinator_url);
        let report = ResultReport {
            id: task_id,
            result,
        };
        let response = match self.client.post(url).json(&report).send().await {
            Ok(response) => response,
            Err(err) => {
                warn!(slot, task_id, "failed to send result: {err}");
                return;
            }
        };

        if response.status().is_success() {
            info!(slot, task_id, result, "task completed");
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            warn!(slot, task_id, %status, "result rejected: {body}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn task_envelope_decodes_the_coordinator_wire_format() {
        let json = r#"{"task":{"id":"3","arg1":2.0,"arg2":4.0,"operation":"*","operation_time":250}}"#;
        let envelope: TaskEnvelope = serde_json::from_str(json).unwrap();
        assert_eq!(envelope.task.id, "3");
        assert_eq!(envelope.task.operation, BinaryOp::Mul);
        assert_eq!(envelope.task.operation_time, 250);
    }

    #[test]
    fn result_report_matches_the_report_endpoint() {
        let report = ResultReport {
            id: "3",
            result: 8.0,
        };
        assert_eq!(
            serde_json::to_string(&report).unwrap(),
            r#"{"id":"3","result":8.0}"#
        );
    }
}
