// Isolated analytics execution context
//
// One OS thread owns an `AnalyticsEngine` and drains a bounded request
// channel, one request at a time to completion. Callers talk to it purely by
// message passing: `AnalyticsRequest` in, `AnalyticsResponse` out.

use super::engine::AnalyticsEngine;
use super::types::{AnalyticsRequest, AnalyticsResponse};
use crate::error::{WorkerError, WorkerResult};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread::JoinHandle;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

static NEXT_WORKER_ID: AtomicUsize = AtomicUsize::new(0);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkerConfig {
    /// Requests that may queue before `send` waits
    #[serde(default = "default_capacity")]
    pub request_capacity: usize,

    /// Completed responses held until the caller reads them
    #[serde(default = "default_capacity")]
    pub response_capacity: usize,
}

fn default_capacity() -> usize {
    64
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            request_capacity: default_capacity(),
            response_capacity: default_capacity(),
        }
    }
}

impl WorkerConfig {
    pub fn validate(&self) -> WorkerResult<()> {
        if self.request_capacity == 0 || self.response_capacity == 0 {
            return Err(WorkerError::InvalidConfig(
                "channel capacities must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

pub struct AnalyticsWorker {
    name: String,
    requests: mpsc::Sender<AnalyticsRequest>,
    responses: mpsc::Receiver<AnalyticsResponse>,
    /// Responses read past by `request` while waiting for its own id
    pending: VecDeque<AnalyticsResponse>,
    thread: Option<JoinHandle<()>>,
}

impl AnalyticsWorker {
    /// Start a worker thread with its own engine
    pub fn spawn(config: WorkerConfig) -> WorkerResult<Self> {
        config.validate()?;

        let (request_tx, mut request_rx) =
            mpsc::channel::<AnalyticsRequest>(config.request_capacity);
        let (response_tx, response_rx) =
            mpsc::channel::<AnalyticsResponse>(config.response_capacity);

        let name = format!(
            "analytics-worker-{}",
            NEXT_WORKER_ID.fetch_add(1, Ordering::Relaxed)
        );
        let thread_name = name.clone();

        let thread = std::thread::Builder::new()
            .name(name.clone())
            .spawn(move || {
                log::info!("{} started", thread_name);
                let engine = AnalyticsEngine::new();
                let mut handled = 0usize;

                while let Some(request) = request_rx.blocking_recv() {
                    let response = engine.handle(request);
                    handled += 1;
                    if response_tx.blocking_send(response).is_err() {
                        log::debug!("{}: response receiver dropped", thread_name);
                        break;
                    }
                }

                log::info!("{} stopped after {} requests", thread_name, handled);
            })?;

        Ok(Self {
            name,
            requests: request_tx,
            responses: response_rx,
            pending: VecDeque::new(),
            thread: Some(thread),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Enqueue a request, waiting while the queue is full
    pub async fn send(&self, request: AnalyticsRequest) -> WorkerResult<()> {
        self.requests
            .send(request)
            .await
            .map_err(|_| WorkerError::ChannelClosed)
    }

    /// Enqueue without waiting
    pub fn try_send(&self, request: AnalyticsRequest) -> WorkerResult<()> {
        self.requests.try_send(request).map_err(|e| match e {
            TrySendError::Full(_) => WorkerError::Full,
            TrySendError::Closed(_) => WorkerError::ChannelClosed,
        })
    }

    /// Next completed response, in completion order
    ///
    /// Returns `None` once the worker has stopped and every response has
    /// been read.
    pub async fn recv(&mut self) -> Option<AnalyticsResponse> {
        if let Some(response) = self.pending.pop_front() {
            return Some(response);
        }
        self.responses.recv().await
    }

    /// Submit `task` under a fresh id and wait for its response
    ///
    /// Responses to other outstanding requests that arrive first are kept
    /// and returned by later `recv` calls.
    pub async fn request(
        &mut self,
        task: impl Into<String>,
        data: serde_json::Value,
    ) -> WorkerResult<AnalyticsResponse> {
        let id = uuid::Uuid::new_v4().to_string();
        let mut request = AnalyticsRequest::new(id.clone(), task, data);

        // A full queue means the worker owes us a response; reading it frees
        // the worker to take the next request.
        loop {
            match self.requests.try_send(request) {
                Ok(()) => break,
                Err(TrySendError::Full(rejected)) => {
                    request = rejected;
                    match self.responses.recv().await {
                        Some(other) => self.pending.push_back(other),
                        None => return Err(WorkerError::ChannelClosed),
                    }
                }
                Err(TrySendError::Closed(_)) => return Err(WorkerError::ChannelClosed),
            }
        }

        loop {
            match self.responses.recv().await {
                Some(response) if response.id == id => return Ok(response),
                Some(other) => self.pending.push_back(other),
                None => return Err(WorkerError::ChannelClosed),
            }
        }
    }

    /// Stop accepting requests, finish the queued ones and join the thread
    ///
    /// Returns every response not yet read.
    pub async fn shutdown(self) -> WorkerResult<Vec<AnalyticsResponse>> {
        let Self {
            name,
            requests,
            mut responses,
            pending,
            thread,
        } = self;

        // The worker loop ends once the queue drains and the sender is gone
        drop(requests);

        let mut remaining: Vec<AnalyticsResponse> = pending.into_iter().collect();
        while let Some(response) = responses.recv().await {
            remaining.push(response);
        }

        if let Some(handle) = thread {
            handle.join().map_err(|_| WorkerError::ThreadPanicked)?;
        }
        log::info!("{} shut down", name);
        Ok(remaining)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_round_trip_preserves_order() {
        let mut worker = AnalyticsWorker::spawn(WorkerConfig::default()).unwrap();
        assert!(worker.name().starts_with("analytics-worker-"));

        let requests = [
            ("a", "aggregate", json!({"data": [1.0, 2.0, 3.0, 4.0], "windowSize": 2, "method": "mean"})),
            ("b", "bogus", json!({})),
            ("c", "smooth", json!({"data": [1.0, 2.0, 3.0, 4.0], "method": "exponential"})),
        ];
        for (id, task, data) in requests {
            worker.send(AnalyticsRequest::new(id, task, data)).await.unwrap();
        }

        let first = worker.recv().await.unwrap();
        assert_eq!(first.id, "a");
        assert_eq!(first.result_value(), Some(&json!([1.5, 3.5])));

        let second = worker.recv().await.unwrap();
        assert_eq!(second.id, "b");
        assert_eq!(second.error_message(), Some("Unknown task: bogus"));

        let third = worker.recv().await.unwrap();
        assert_eq!(third.id, "c");
        assert!(!third.is_error());

        assert!(worker.shutdown().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_request_correlates_by_id() {
        let mut worker = AnalyticsWorker::spawn(WorkerConfig::default()).unwrap();
        worker
            .send(AnalyticsRequest::new("queued", "fft", json!({"data": [1.0, 0.0]})))
            .await
            .unwrap();

        let response = worker
            .request("correlate", json!({"x": [1, 2, 3], "y": [3, 2, 1]}))
            .await
            .unwrap();
        assert_eq!(response.result_value().unwrap()["coefficient"], json!(-1.0));

        // the response read past while waiting is still delivered
        assert_eq!(worker.recv().await.unwrap().id, "queued");
        worker.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_request_with_saturated_channels() {
        let mut worker = AnalyticsWorker::spawn(WorkerConfig {
            request_capacity: 1,
            response_capacity: 1,
        })
        .unwrap();
        for id in ["x", "y", "z"] {
            worker
                .send(AnalyticsRequest::new(id, "fft", json!({"data": [1.0, 0.0]})))
                .await
                .unwrap();
        }

        let response = tokio::time::timeout(
            std::time::Duration::from_secs(5),
            worker.request("fft", json!({"data": [0.0, 1.0]})),
        )
        .await
        .expect("request stalled behind unread responses")
        .unwrap();
        assert!(!response.is_error());

        let mut earlier = Vec::new();
        while earlier.len() < 3 {
            earlier.push(worker.recv().await.unwrap().id);
        }
        assert_eq!(earlier, vec!["x", "y", "z"]);
        assert!(worker.shutdown().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_shutdown_drains_queued_requests() {
        let worker = AnalyticsWorker::spawn(WorkerConfig::default()).unwrap();
        for i in 0..5 {
            worker
                .try_send(AnalyticsRequest::new(
                    i.to_string(),
                    "calculateStats",
                    json!({"data": [i, i + 1]}),
                ))
                .unwrap();
        }

        let remaining = worker.shutdown().await.unwrap();
        let ids: Vec<&str> = remaining.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["0", "1", "2", "3", "4"]);
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let config = WorkerConfig {
            request_capacity: 0,
            ..Default::default()
        };
        assert!(matches!(
            AnalyticsWorker::spawn(config),
            Err(WorkerError::InvalidConfig(_))
        ));
    }
}
